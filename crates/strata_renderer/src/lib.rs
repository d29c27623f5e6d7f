//! Strata Renderer - banded multi-device path tracing
//!
//! A Monte Carlo path tracer for scenes of spheres. The frame is cut into
//! horizontal bands and each band is rendered by its own device, every
//! device holding a private copy of the scene.

mod band;
mod camera;
mod device;
mod error;
mod hittable;
mod material;
mod multi_device;
mod output;
mod renderer;
mod rng;
mod scene;
mod sphere;

pub use band::{partition_rows, Band, Slice};
pub use camera::{Camera, CameraSettings};
pub use device::{enumerate_devices, query_device_count, Device};
pub use error::{check, RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Color, Material};
pub use multi_device::{render_frame, render_frame_with};
pub use output::{quantize, save_png, write_ppm};
pub use renderer::{
    linear_to_gamma, ray_color, render_band, render_init, sky_gradient, ImageBuffer, RenderConfig,
    MAX_DEPTH,
};
pub use rng::{pixel_stream, scene_stream, Stream, PIXEL_SEED, SCENE_SEED};
pub use scene::{random_scene, World, RANDOM_SCENE_SPHERES};
pub use sphere::Sphere;

/// Re-export Vec3 and common math types from strata_math
pub use strata_math::{Interval, Ray, Vec3};
