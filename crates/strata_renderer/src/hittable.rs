//! Hit protocol for ray-object intersection.

use crate::{Material, Sphere};
use strata_math::{Interval, Ray, Vec3};

/// Record of a ray-object intersection.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Outward surface normal (unit length for spheres)
    pub normal: Vec3,
    /// Material of the struck surface, owned by the world
    pub material: &'a Material,
}

/// Anything a ray can intersect.
///
/// A closed set of variants dispatched by `match`. Neither variant owns
/// geometry: spheres live in the world's arena and are borrowed here.
#[derive(Debug, Clone)]
pub enum Hittable<'a> {
    Sphere(&'a Sphere),
    List(HittableList<'a>),
}

impl<'a> Hittable<'a> {
    /// Closest intersection with parameter strictly inside `ray_t`.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        match *self {
            Hittable::Sphere(sphere) => sphere.hit(ray, ray_t),
            Hittable::List(ref list) => list.hit(ray, ray_t),
        }
    }
}

/// An ordered collection of hittables.
#[derive(Debug, Clone, Default)]
pub struct HittableList<'a> {
    objects: Vec<Hittable<'a>>,
}

impl<'a> HittableList<'a> {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Hittable<'a>) {
        self.objects.push(object);
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Linear scan keeping the nearest hit. Each hit shrinks the search
    /// interval so later members only report something closer.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let mut closest_so_far = ray_t.max;
        let mut closest = None;

        for object in &self.objects {
            if let Some(rec) = object.hit(ray, ray_t.with_max(closest_so_far)) {
                closest_so_far = rec.t;
                closest = Some(rec);
            }
        }

        closest
    }
}

impl<'a> FromIterator<&'a Sphere> for HittableList<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Sphere>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().map(Hittable::Sphere).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn spheres() -> Vec<Sphere> {
        vec![
            Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0, Material::lambertian(Color::ONE)),
            Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, Material::dielectric(1.5)),
            Sphere::new(Vec3::new(0.0, 0.0, -6.0), 1.0, Material::metal(Color::ONE, 0.0)),
        ]
    }

    #[test]
    fn test_list_returns_nearest_regardless_of_order() {
        let arena = spheres();
        let list: HittableList = arena.iter().collect();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let rec = list.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.t - 2.0).abs() < 1e-5);
        assert_eq!(*rec.material, Material::dielectric(1.5));
    }

    #[test]
    fn test_list_respects_interval() {
        let arena = spheres();
        let list: HittableList = arena.iter().collect();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        // Skip everything before the metal sphere
        let rec = list.hit(&ray, Interval::new(4.5, f32::INFINITY)).unwrap();
        assert!((rec.t - 5.0).abs() < 1e-5);

        assert!(list.hit(&ray, Interval::new(0.001, 1.5)).is_none());
    }

    #[test]
    fn test_nested_list() {
        let arena = spheres();
        let inner: HittableList = arena[1..].iter().collect();
        let mut outer = HittableList::new();
        outer.add(Hittable::Sphere(&arena[0]));
        outer.add(Hittable::List(inner));
        assert_eq!(outer.len(), 2);

        let world = Hittable::List(outer);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = world.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_list_misses() {
        let list = HittableList::new();
        assert!(list.is_empty());
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(list.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }
}
