//! Random number streams.
//!
//! Two kinds of stream exist. The scene stream is seeded with a fixed
//! constant and consumed once, synchronously, while a device builds its
//! world; every device uses the same seed so they all build the same world.
//! Pixel streams are seeded from the same kind of constant plus the pixel's
//! absolute index in the full image, and live for the whole sampling loop of
//! that pixel.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use strata_math::Vec3;

/// The stream type used everywhere in the renderer.
pub type Stream = Xoshiro256PlusPlus;

/// Seed shared by every device's scene construction.
pub const SCENE_SEED: u64 = 1984;

/// Base seed for the per-pixel sampling streams.
pub const PIXEL_SEED: u64 = 1984;

/// The scene-construction stream.
pub fn scene_stream(seed: u64) -> Stream {
    Stream::seed_from_u64(seed)
}

/// The sampling stream for the pixel at absolute index `pixel_index`.
///
/// The index is mixed into the seed with a splitmix finalizer so neighbouring
/// pixels start from unrelated states.
pub fn pixel_stream(seed: u64, pixel_index: u64) -> Stream {
    Stream::seed_from_u64(mix(seed, pixel_index))
}

fn mix(seed: u64, index: u64) -> u64 {
    let mut v = seed ^ index.wrapping_mul(0x9e3779b97f4a7c15);
    v = (v ^ (v >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    v = (v ^ (v >> 27)).wrapping_mul(0x94d049bb133111eb);
    v ^ (v >> 31)
}

/// Uniform sample in [0, 1).
#[inline]
pub fn gen_f32<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>()
}

/// Rejection-sample a point strictly inside the unit sphere.
pub fn random_in_unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Rejection-sample a point strictly inside the unit disk (z = 0).
pub fn random_in_unit_disk<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = Vec3::new(gen_f32(rng) * 2.0 - 1.0, gen_f32(rng) * 2.0 - 1.0, 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}
