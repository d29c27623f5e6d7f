//! Simple banded render example.
//!
//! Renders a small three-sphere scene on two devices and saves it as PPM.

use std::fs::File;
use std::io::BufWriter;
use strata_renderer::{
    enumerate_devices, render_frame_with, write_ppm, Camera, Color, Material, RenderConfig,
    Slice, Sphere, Vec3, World,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = RenderConfig {
        image_width: 400,
        image_height: 225,
        samples_per_pixel: 32,
        ..RenderConfig::default()
    };
    let devices = enumerate_devices(2)?;

    let image = render_frame_with(&config, &devices, |slice| build_scene(&config, slice))?;

    let filename = "output.ppm";
    let mut writer = BufWriter::new(File::create(filename)?);
    write_ppm(&image, &mut writer)?;
    println!("Saved to {}", filename);
    Ok(())
}

fn build_scene(config: &RenderConfig, slice: Slice) -> World {
    let spheres = vec![
        // Ground
        Sphere::new(
            Vec3::new(0.0, -100.5, -1.0),
            100.0,
            Material::lambertian(Color::new(0.8, 0.8, 0.0)),
        ),
        Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Material::lambertian(Color::new(0.1, 0.2, 0.5)),
        ),
        Sphere::new(Vec3::new(-1.0, 0.0, -1.0), 0.5, Material::dielectric(1.5)),
        Sphere::new(
            Vec3::new(1.0, 0.0, -1.0),
            0.5,
            Material::metal(Color::new(0.8, 0.6, 0.2), 0.0),
        ),
    ];

    let camera = Camera::builder()
        .with_resolution(config.image_width, config.image_height)
        .with_position(Vec3::new(-2.0, 2.0, 1.0), Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
        .with_lens(40.0, 0.0, 3.4)
        .with_slice(slice)
        .build();

    World::new(spheres, camera)
}
