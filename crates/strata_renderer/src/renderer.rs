//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Iterative bounce loop with a hard depth cap
//! - Sky gradient as the only light source
//! - Anti-aliasing via multi-sampling with persistent per-pixel streams
//! - Gamma-2 encoding of the averaged result

use crate::band::Band;
use crate::error::RenderError;
use crate::rng::{gen_f32, pixel_stream, Stream, PIXEL_SEED, SCENE_SEED};
use crate::{Color, Hittable, World};
use rand::RngCore;
use rayon::prelude::*;
use strata_math::{Interval, Ray};

/// Paths still bouncing after this many steps contribute black.
pub const MAX_DEPTH: u32 = 50;

/// Render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub image_width: u32,
    pub image_height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Work-group shape in pixels; pixels are handed to workers in runs of
    /// `block_width * block_height`
    pub block_width: u32,
    pub block_height: u32,
    /// Seed of the scene-construction stream, shared by every device
    pub scene_seed: u64,
    /// Base seed of the per-pixel streams
    pub pixel_seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_width: 1200,
            image_height: 675,
            samples_per_pixel: 50,
            max_depth: MAX_DEPTH,
            block_width: 8,
            block_height: 8,
            scene_seed: SCENE_SEED,
            pixel_seed: PIXEL_SEED,
        }
    }
}

impl RenderConfig {
    /// Defaults, with `STRATA_WIDTH`, `STRATA_HEIGHT` and `STRATA_SAMPLES`
    /// overrides read from the environment.
    pub fn from_env() -> Result<Self, RenderError> {
        let mut config = Self::default();
        if let Some(width) = env_u32("STRATA_WIDTH")? {
            config.image_width = width;
        }
        if let Some(height) = env_u32("STRATA_HEIGHT")? {
            config.image_height = height;
        }
        if let Some(samples) = env_u32("STRATA_SAMPLES")? {
            config.samples_per_pixel = samples;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "image must be at least 1x1, got {}x{}",
                self.image_width, self.image_height
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(RenderError::InvalidConfig(
                "samples per pixel must be at least 1".to_string(),
            ));
        }
        if self.block_width == 0 || self.block_height == 0 {
            return Err(RenderError::InvalidConfig(
                "block shape must be at least 1x1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn pixel_count(&self) -> usize {
        self.image_width as usize * self.image_height as usize
    }
}

fn env_u32(name: &str) -> Result<Option<u32>, RenderError> {
    match std::env::var(name) {
        Ok(value) => value.trim().parse().map(Some).map_err(|_| {
            RenderError::InvalidConfig(format!("{} is not a count: {:?}", name, value))
        }),
        Err(_) => Ok(None),
    }
}

/// Compute the color seen by a ray.
///
/// Bounces iteratively rather than recursively so stack use stays flat no
/// matter the depth. Absorption and an exhausted bounce budget both give
/// black; escaping to the sky gives the accumulated attenuation times the
/// sky color.
pub fn ray_color(ray: &Ray, world: &Hittable, max_depth: u32, rng: &mut dyn RngCore) -> Color {
    let mut cur_ray = *ray;
    let mut cur_attenuation = Color::ONE;

    for _ in 0..max_depth {
        // t_min keeps a bounce from re-hitting the surface it left
        match world.hit(&cur_ray, Interval::new(0.001, f32::INFINITY)) {
            Some(rec) => match rec.material.scatter(&cur_ray, &rec, rng) {
                Some((attenuation, scattered)) => {
                    cur_attenuation *= attenuation;
                    cur_ray = scattered;
                }
                None => return Color::ZERO,
            },
            None => return cur_attenuation * sky_gradient(&cur_ray),
        }
    }

    // Exceeded the bounce budget
    Color::ZERO
}

/// Compute sky gradient background.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// One sampling stream per pixel of `band`, in band-local row-major order,
/// seeded from each pixel's absolute index in the full image.
fn pixel_streams(
    band: &Band,
    image_width: u32,
    pixel_seed: u64,
) -> impl IndexedParallelIterator<Item = Stream> {
    let first = band.pixel_offset(image_width) as u64;
    (0..band.pixel_count(image_width))
        .into_par_iter()
        .map(move |local_index| pixel_stream(pixel_seed, first + local_index as u64))
}

/// Seed the stream of every pixel in `band` into `states`.
///
/// `states` is cleared first; callers hand in a buffer that already has
/// room for the band so seeding never allocates. Runs on the current rayon
/// pool.
pub fn render_init(band: &Band, image_width: u32, pixel_seed: u64, states: &mut Vec<Stream>) {
    states.clear();
    states.par_extend(pixel_streams(band, image_width, pixel_seed));
}

/// Render every pixel of the world camera's band into `pixels`.
///
/// `pixels` and `states` are band-local and row-major. Each pixel reads its
/// stream, draws all of its samples from it and writes it back, so a second
/// call continues the same sequences. Runs on the current rayon pool.
pub fn render_band(
    world: &World,
    config: &RenderConfig,
    pixels: &mut [Color],
    states: &mut [Stream],
) {
    let band = world.camera().band();
    let width = config.image_width as usize;
    let band_height = band.height() as f32;
    let samples = config.samples_per_pixel.max(1);
    let block = (config.block_width * config.block_height) as usize;
    let hittable = world.hittable();
    debug_assert_eq!(pixels.len(), band.pixel_count(config.image_width));
    debug_assert_eq!(states.len(), pixels.len());

    pixels
        .par_iter_mut()
        .zip(states.par_iter_mut())
        .enumerate()
        .with_min_len(block.max(1))
        .for_each(|(local_index, (pixel, state))| {
            let i = (local_index % width) as f32;
            let j = (local_index / width) as f32;
            let mut rng = state.clone();

            let mut color = Color::ZERO;
            for _ in 0..samples {
                let u = (i + gen_f32(&mut rng)) / config.image_width as f32;
                let v = (j + gen_f32(&mut rng)) / band_height;
                let ray = world.camera().get_ray(u, v, &mut rng);
                color += ray_color(&ray, &hittable, config.max_depth, &mut rng);
            }

            *state = rng;
            color /= samples as f32;
            *pixel = Color::new(
                linear_to_gamma(color.x),
                linear_to_gamma(color.y),
                linear_to_gamma(color.z),
            );
        });
}

/// Dense framebuffer of gamma-encoded colors.
///
/// Row-major with row 0 at the bottom of the image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[y as usize * self.width as usize + x as usize] = color;
    }

    /// Split the buffer into one disjoint mutable region per band.
    ///
    /// `bands` must tile the image's rows in order.
    pub fn band_regions_mut(&mut self, bands: &[Band]) -> Vec<&mut [Color]> {
        let width = self.width;
        let mut rest: &mut [Color] = &mut self.pixels;
        bands
            .iter()
            .map(|band| {
                let (region, tail) =
                    std::mem::take(&mut rest).split_at_mut(band.pixel_count(width));
                rest = tail;
                region
            })
            .collect()
    }

    /// Mean color over rows `[min_y, max_y)`.
    ///
    /// Gives a quick exposure summary of part of a finished frame, such as
    /// the sky or ground half of a render.
    pub fn mean_of_rows(&self, min_y: u32, max_y: u32) -> Color {
        let start = min_y as usize * self.width as usize;
        let end = max_y as usize * self.width as usize;
        let rows = &self.pixels[start..end];
        if rows.is_empty() {
            return Color::ZERO;
        }
        rows.iter().copied().sum::<Color>() / rows.len() as f32
    }
}
