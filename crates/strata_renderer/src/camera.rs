//! Thin-lens camera for ray generation.

use crate::band::{Band, Slice};
use crate::rng::random_in_unit_disk;
use rand::RngCore;
use strata_math::{Ray, Vec3};

/// Camera placement and lens settings, turned into a [`Camera`] by
/// [`CameraSettings::build`].
#[derive(Debug, Clone)]
pub struct CameraSettings {
    // Image settings
    image_width: u32,
    image_height: u32,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    // Lens settings
    vfov: f32,       // Vertical field of view in degrees
    aperture: f32,   // Lens diameter
    focus_dist: f32, // Distance from camera to plane of perfect focus

    slice: Slice,
}

impl CameraSettings {
    /// Set image resolution. Only the aspect ratio and the band layout
    /// depend on it.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Restrict the camera to one device's band of the frame.
    pub fn with_slice(mut self, slice: Slice) -> Self {
        self.slice = slice;
        self
    }

    pub fn build(&self) -> Camera {
        let aspect = self.image_width as f32 / self.image_height as f32;
        let half_height = (self.vfov.to_radians() / 2.0).tan();
        let half_width = aspect * half_height;

        // Calculate camera basis vectors
        let w = (self.look_from - self.look_at).normalize();
        let u = self.vup.cross(w).normalize();
        let v = w.cross(u);

        let origin = self.look_from;
        let horizontal = 2.0 * half_width * self.focus_dist * u;
        let full_vertical = 2.0 * half_height * self.focus_dist * v;
        let frame_lower_left =
            origin - horizontal / 2.0 - full_vertical / 2.0 - self.focus_dist * w;

        // The band covers [min_y, max_y) of the frame's rows
        let band = self.slice.band(self.image_height);
        let rows = self.image_height as f32;
        let lower_left_corner = frame_lower_left + (band.min_y as f32 / rows) * full_vertical;
        let vertical = (band.height() as f32 / rows) * full_vertical;

        Camera {
            origin,
            lower_left_corner,
            horizontal,
            vertical,
            u,
            v,
            w,
            lens_radius: self.aperture / 2.0,
            band,
        }
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            image_width: 800,
            image_height: 450,
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            aperture: 0.0,
            focus_dist: 1.0,
            slice: Slice::FULL,
        }
    }
}

/// Camera for generating rays into the scene. Fixed once built.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f32,
    band: Band,
}

impl Camera {
    /// Start configuring a camera.
    pub fn builder() -> CameraSettings {
        CameraSettings::default()
    }

    /// Ray through image-plane coordinates `(s, t)`, both in [0, 1].
    ///
    /// `s` spans the full width; `t` spans this camera's band, bottom to
    /// top. The origin is jittered over the lens for depth of field.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let rd = self.lens_radius * random_in_unit_disk(rng);
        let offset = self.u * rd.x + self.v * rd.y;
        let origin = self.origin + offset;
        let target = self.lower_left_corner + s * self.horizontal + t * self.vertical;

        Ray::new(origin, target - origin)
    }

    /// The rows of the frame this camera covers.
    pub fn band(&self) -> Band {
        self.band
    }
}
