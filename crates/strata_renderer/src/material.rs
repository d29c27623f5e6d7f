//! Surface materials.
//!
//! The variant set is closed, so materials are a plain enum dispatched with
//! `match` rather than trait objects.

use crate::hittable::HitRecord;
use crate::rng::{gen_f32, random_in_unit_sphere};
use rand::RngCore;
use strata_math::{Ray, Vec3};

/// Color type alias (linear RGB, 0-1)
pub type Color = Vec3;

/// How light interacts with a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    /// Diffuse surface.
    Lambertian { albedo: Color },
    /// Specular surface. `fuzz` of 0 is a perfect mirror, 1 is very rough.
    Metal { albedo: Color, fuzz: f32 },
    /// Clear refractive surface (1.0 = air, 1.5 = glass, 2.4 = diamond).
    Dielectric { refractive_index: f32 },
}

impl Material {
    pub fn lambertian(albedo: Color) -> Self {
        Material::Lambertian { albedo }
    }

    pub fn metal(albedo: Color, fuzz: f32) -> Self {
        Material::Metal {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn dielectric(refractive_index: f32) -> Self {
        Material::Dielectric { refractive_index }
    }

    /// Scatter an incoming ray.
    ///
    /// Returns Some((attenuation, scattered_ray)) if the ray scatters,
    /// or None if the ray is absorbed.
    pub fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<(Color, Ray)> {
        match *self {
            Material::Lambertian { albedo } => {
                let target = rec.p + rec.normal + random_in_unit_sphere(rng);
                Some((albedo, Ray::new(rec.p, target - rec.p)))
            }
            Material::Metal { albedo, fuzz } => {
                let reflected = reflect(ray_in.direction().normalize(), rec.normal);
                let scattered = Ray::new(rec.p, reflected + fuzz * random_in_unit_sphere(rng));

                // Fuzz pushed the ray below the surface: absorbed
                if scattered.direction().dot(rec.normal) > 0.0 {
                    Some((albedo, scattered))
                } else {
                    None
                }
            }
            Material::Dielectric { refractive_index } => {
                Some((Color::ONE, dielectric_scatter(refractive_index, ray_in, rec, rng)))
            }
        }
    }
}

fn dielectric_scatter(
    refractive_index: f32,
    ray_in: &Ray,
    rec: &HitRecord,
    rng: &mut dyn RngCore,
) -> Ray {
    let direction = ray_in.direction();
    let d_dot_n = direction.dot(rec.normal);
    let reflected = reflect(direction, rec.normal);

    // The stored normal always points out of the sphere
    let (outward_normal, ni_over_nt, cosine) = if d_dot_n > 0.0 {
        let cosine = d_dot_n / direction.length();
        let cosine = (1.0 - refractive_index * refractive_index * (1.0 - cosine * cosine)).sqrt();
        (-rec.normal, refractive_index, cosine)
    } else {
        (rec.normal, 1.0 / refractive_index, -d_dot_n / direction.length())
    };

    match refract(direction, outward_normal, ni_over_nt) {
        Some(refracted) if gen_f32(rng) >= schlick(cosine, refractive_index) => {
            Ray::new(rec.p, refracted)
        }
        // Total internal reflection, or Fresnel picked reflection
        _ => Ray::new(rec.p, reflected),
    }
}

/// Schlick's approximation for reflectance
fn schlick(cosine: f32, refractive_index: f32) -> f32 {
    let r0 = ((1.0 - refractive_index) / (1.0 + refractive_index)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a vector through a surface, or None on total internal reflection.
#[inline]
fn refract(v: Vec3, n: Vec3, ni_over_nt: f32) -> Option<Vec3> {
    let uv = v.normalize();
    let dt = uv.dot(n);
    let discriminant = 1.0 - ni_over_nt * ni_over_nt * (1.0 - dt * dt);
    if discriminant > 0.0 {
        Some(ni_over_nt * (uv - n * dt) - n * discriminant.sqrt())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{pixel_stream, PIXEL_SEED};

    fn record(material: &Material, p: Vec3, normal: Vec3) -> HitRecord<'_> {
        HitRecord {
            t: 1.0,
            p,
            normal,
            material,
        }
    }

    #[test]
    fn test_lambertian_always_scatters() {
        let mat = Material::lambertian(Color::new(0.8, 0.3, 0.3));
        let rec = record(&mat, Vec3::ZERO, Vec3::Y);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let mut rng = pixel_stream(PIXEL_SEED, 0);

        for _ in 0..1000 {
            let (attenuation, scattered) = mat.scatter(&ray, &rec, &mut rng).unwrap();
            assert_eq!(attenuation, Color::new(0.8, 0.3, 0.3));
            assert_eq!(scattered.origin(), Vec3::ZERO);
            // Target lies in the unit sphere tangent at the hit point
            assert!((scattered.direction() - Vec3::Y).length() < 1.0);
        }
    }

    #[test]
    fn test_mirror_metal_reflects_exactly() {
        let mat = Material::metal(Color::new(0.7, 0.6, 0.5), 0.0);
        let normal = Vec3::Y;
        let d = Vec3::new(1.0, -1.0, 0.0).normalize();
        let rec = record(&mat, Vec3::ZERO, normal);
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), d);
        let mut rng = pixel_stream(PIXEL_SEED, 1);

        let (attenuation, scattered) = mat.scatter(&ray, &rec, &mut rng).unwrap();
        let expected = d - 2.0 * d.dot(normal) * normal;
        assert_eq!(attenuation, Color::new(0.7, 0.6, 0.5));
        assert!((scattered.direction() - expected).length() < 1e-6);
    }

    #[test]
    fn test_metal_absorbs_below_surface() {
        // Grazing ray with maximum fuzz: some samples must end up inside
        let mat = Material::metal(Color::ONE, 1.0);
        let rec = record(&mat, Vec3::ZERO, Vec3::Y);
        let ray = Ray::new(Vec3::new(-1.0, 0.01, 0.0), Vec3::new(1.0, -0.01, 0.0));
        let mut rng = pixel_stream(PIXEL_SEED, 2);

        let absorbed = (0..1000)
            .filter(|_| mat.scatter(&ray, &rec, &mut rng).is_none())
            .count();
        assert!(absorbed > 0);
    }

    #[test]
    fn test_metal_fuzz_is_clamped() {
        match Material::metal(Color::ONE, 3.0) {
            Material::Metal { fuzz, .. } => assert_eq!(fuzz, 1.0),
            other => panic!("unexpected material {:?}", other),
        }
    }

    #[test]
    fn test_index_matched_dielectric_passes_straight_through() {
        let mat = Material::dielectric(1.0);
        let rec = record(&mat, Vec3::new(0.0, 0.0, 1.0), Vec3::Z);
        let mut rng = pixel_stream(PIXEL_SEED, 3);

        for d in [Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.01, 0.0, -1.0).normalize()] {
            let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), d);
            let (attenuation, scattered) = mat.scatter(&ray, &rec, &mut rng).unwrap();
            assert_eq!(attenuation, Color::ONE);
            assert!(scattered.direction().normalize().cross(d).length() < 1e-5);
            assert!(scattered.direction().dot(d) > 0.0);
        }
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        // Leaving glass at a grazing angle cannot refract
        let mat = Material::dielectric(1.5);
        let rec = record(&mat, Vec3::ZERO, Vec3::Y);
        let d = Vec3::new(1.0, 0.2, 0.0).normalize();
        let ray = Ray::new(Vec3::new(-1.0, -0.2, 0.0), d);
        let mut rng = pixel_stream(PIXEL_SEED, 4);

        for _ in 0..100 {
            let (attenuation, scattered) = mat.scatter(&ray, &rec, &mut rng).unwrap();
            assert_eq!(attenuation, Color::ONE);
            assert!((scattered.direction() - reflect(d, Vec3::Y)).length() < 1e-6);
        }
    }

    /// Scatter `ray` `draws` times and return the share that stayed on the
    /// incoming side of the surface.
    fn reflected_share(mat: &Material, rec: &HitRecord, ray: &Ray, draws: usize) -> f32 {
        let side = ray.direction().dot(rec.normal).signum();
        let mut rng = pixel_stream(PIXEL_SEED, 5);
        let reflected = (0..draws)
            .filter(|_| {
                let (_, scattered) = mat.scatter(ray, rec, &mut rng).unwrap();
                scattered.direction().dot(rec.normal).signum() != side
            })
            .count();
        reflected as f32 / draws as f32
    }

    #[test]
    fn test_dielectric_fresnel_split_entering_glass() {
        // 80 degrees off the normal, arriving from outside
        let mat = Material::dielectric(1.5);
        let rec = record(&mat, Vec3::ZERO, Vec3::Y);
        let theta = 80f32.to_radians();
        let d = Vec3::new(theta.sin(), -theta.cos(), 0.0);
        let ray = Ray::new(-d, d);

        let share = reflected_share(&mat, &rec, &ray, 4000);
        let expected = schlick(theta.cos(), 1.5);
        assert!(share > 0.0 && share < 1.0);
        assert!((share - expected).abs() < 0.04, "{} vs {}", share, expected);
    }

    #[test]
    fn test_dielectric_fresnel_split_leaving_glass() {
        // 40 degrees off the normal from inside, just under the critical angle
        let mat = Material::dielectric(1.5);
        let rec = record(&mat, Vec3::ZERO, Vec3::Y);
        let theta = 40f32.to_radians();
        let d = Vec3::new(theta.sin(), theta.cos(), 0.0);
        let ray = Ray::new(-d, d);

        let share = reflected_share(&mat, &rec, &ray, 4000);
        // Fresnel is evaluated on the transmitted side when leaving
        let sin_t = 1.5 * theta.sin();
        let expected = schlick((1.0 - sin_t * sin_t).sqrt(), 1.5);
        assert!(share > 0.0 && share < 1.0);
        assert!((share - expected).abs() < 0.04, "{} vs {}", share, expected);
    }

    #[test]
    fn test_schlick_normal_incidence() {
        assert!((schlick(1.0, 1.5) - 0.04).abs() < 1e-6);
        assert_eq!(schlick(1.0, 1.0), 0.0);
    }
}
