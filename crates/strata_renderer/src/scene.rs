//! Scene construction.
//!
//! A [`World`] is the arena that owns every sphere (and through them every
//! material) plus the camera. Each device builds its own world from the same
//! seed and drops it when its band is done.

use crate::band::Slice;
use crate::rng::{gen_f32, scene_stream};
use crate::{Camera, Color, Hittable, HittableList, Material, Sphere};
use strata_math::Vec3;

/// Number of spheres in the generated scene: the 22x22 grid of small
/// spheres, the ground and the three feature spheres.
pub const RANDOM_SCENE_SPHERES: usize = 22 * 22 + 1 + 3;

/// Spheres and the camera looking at them.
#[derive(Debug, Clone)]
pub struct World {
    spheres: Vec<Sphere>,
    camera: Camera,
}

impl World {
    pub fn new(spheres: Vec<Sphere>, camera: Camera) -> Self {
        Self { spheres, camera }
    }

    /// Borrowed view of the arena used for intersection.
    pub fn hittable(&self) -> Hittable<'_> {
        Hittable::List(self.spheres.iter().collect::<HittableList>())
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }
}

/// Build the fixed random scene for one device.
///
/// Every call with the same `seed` produces the same spheres and materials;
/// only the camera's band depends on `slice`.
pub fn random_scene(image_width: u32, image_height: u32, slice: Slice, seed: u64) -> World {
    let mut rng = scene_stream(seed);
    let mut rnd = || gen_f32(&mut rng);
    let mut spheres = Vec::with_capacity(RANDOM_SCENE_SPHERES);

    // Ground
    spheres.push(Sphere::new(
        Vec3::new(0.0, -1000.0, -1.0),
        1000.0,
        Material::lambertian(Color::new(0.5, 0.5, 0.5)),
    ));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = rnd();
            let center = Vec3::new(a as f32 + rnd(), 0.2, b as f32 + rnd());

            let material = if choose_mat < 0.8 {
                let albedo = Color::new(rnd() * rnd(), rnd() * rnd(), rnd() * rnd());
                Material::lambertian(albedo)
            } else if choose_mat < 0.95 {
                let albedo = Color::new(
                    0.5 * (1.0 + rnd()),
                    0.5 * (1.0 + rnd()),
                    0.5 * (1.0 + rnd()),
                );
                Material::metal(albedo, 0.5 * rnd())
            } else {
                Material::dielectric(1.5)
            };

            spheres.push(Sphere::new(center, 0.2, material));
        }
    }

    spheres.push(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, Material::dielectric(1.5)));
    spheres.push(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Material::lambertian(Color::new(0.4, 0.2, 0.1)),
    ));
    spheres.push(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Material::metal(Color::new(0.7, 0.6, 0.5), 0.0),
    ));

    let camera = Camera::builder()
        .with_resolution(image_width, image_height)
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(30.0, 0.1, 10.0)
        .with_slice(slice)
        .build();

    log::debug!(
        "Built scene with {} spheres for slice {}/{}",
        spheres.len(),
        slice.index,
        slice.count
    );

    World::new(spheres, camera)
}
