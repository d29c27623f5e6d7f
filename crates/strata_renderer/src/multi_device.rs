//! Multi-device frame rendering.
//!
//! The frame is split into horizontal bands, one per device. Every device
//! runs on its own control thread: it builds a private world, seeds one
//! stream per pixel of its band, renders into a private buffer and finally
//! copies that buffer into its disjoint region of the shared framebuffer.
//! The frame is complete once every control thread has joined.

use crate::band::{partition_rows, Band, Slice};
use crate::device::Device;
use crate::error::{RenderError, RenderResult};
use crate::renderer::{render_band, render_init, ImageBuffer, RenderConfig};
use crate::rng::Stream;
use crate::scene::{random_scene, World};
use crate::Color;
use std::thread;
use std::time::{Duration, Instant};

/// Render the fixed random scene across `devices`.
pub fn render_frame(config: &RenderConfig, devices: &[Device]) -> RenderResult<ImageBuffer> {
    render_frame_with(config, devices, |slice| {
        random_scene(config.image_width, config.image_height, slice, config.scene_seed)
    })
}

/// Render across `devices`, building each device's world with
/// `build_world`.
///
/// `build_world` is called once per device with that device's slice and must
/// return a world whose camera covers the slice's band of a
/// `config.image_width` x `config.image_height` frame.
pub fn render_frame_with<F>(
    config: &RenderConfig,
    devices: &[Device],
    build_world: F,
) -> RenderResult<ImageBuffer>
where
    F: Fn(Slice) -> World + Sync,
{
    config.validate()?;
    if devices.is_empty() {
        return Err(RenderError::NoDevices);
    }

    log::info!(
        "Rendering a {}x{} image with {} samples per pixel on {} device(s) in {}x{} blocks",
        config.image_width,
        config.image_height,
        config.samples_per_pixel,
        devices.len(),
        config.block_width,
        config.block_height
    );

    let start = Instant::now();
    let bands = partition_rows(config.image_height, devices.len());
    let mut image = ImageBuffer::new(config.image_width, config.image_height);
    let regions = image.band_regions_mut(&bands);
    let build_world = &build_world;

    let timings = thread::scope(|scope| {
        let handles: Vec<_> = devices
            .iter()
            .zip(bands.iter().copied())
            .zip(regions)
            .map(|((device, band), region)| {
                let handle = thread::Builder::new()
                    .name(format!("strata-control-{}", device.id()))
                    .spawn_scoped(scope, move || {
                        render_on_device(device, band, config, build_world, region)
                    });
                (device.id(), handle)
            })
            .collect();

        // Wait for every device before reporting the first failure
        let results: Vec<RenderResult<Duration>> = handles
            .into_iter()
            .map(|(id, handle)| match handle {
                Ok(handle) => handle.join().unwrap_or_else(|_| {
                    Err(RenderError::device(id, "render", "control thread panicked"))
                }),
                Err(err) => Err(RenderError::device(id, "spawn control thread", err)),
            })
            .collect();
        results.into_iter().collect::<RenderResult<Vec<_>>>()
    })?;

    for (device, elapsed) in devices.iter().zip(&timings) {
        log::debug!("Device {} finished in {:.2?}", device.id(), elapsed);
    }
    log::info!("Frame rendered in {:.2?}", start.elapsed());

    Ok(image)
}

/// Everything one device does for its band. Runs on the device's control
/// thread; the world it builds is dropped before returning.
fn render_on_device<F>(
    device: &Device,
    band: Band,
    config: &RenderConfig,
    build_world: &F,
    region: &mut [Color],
) -> RenderResult<Duration>
where
    F: Fn(Slice) -> World,
{
    let start = Instant::now();
    if band.is_empty() {
        log::info!("Device {} has no rows to render", device.id());
        return Ok(start.elapsed());
    }

    let world = build_world(band.slice);
    if world.camera().band() != band {
        return Err(RenderError::InvalidConfig(format!(
            "device {} world covers rows {:?}, expected {:?}",
            device.id(),
            world.camera().band().rows(),
            band.rows()
        )));
    }

    let pixel_count = band.pixel_count(config.image_width);
    let mut pixels: Vec<Color> = device.alloc(pixel_count, "alloc framebuffer")?;
    pixels.resize(pixel_count, Color::ZERO);
    let mut states: Vec<Stream> = device.alloc(pixel_count, "alloc rng states")?;

    log::info!(
        "Device {} rendering rows {}..{} on {} workers",
        device.id(),
        band.min_y,
        band.max_y,
        device.threads()
    );

    device.install(|| {
        render_init(&band, config.image_width, config.pixel_seed, &mut states);
        render_band(&world, config, &mut pixels, &mut states);
    });

    if region.len() != pixels.len() {
        return Err(RenderError::device(
            device.id(),
            "copy band to framebuffer",
            format!("region holds {} pixels, band has {}", region.len(), pixels.len()),
        ));
    }
    region.copy_from_slice(&pixels);

    let elapsed = start.elapsed();
    log::info!("Device {} done in {:.2?}", device.id(), elapsed);
    Ok(elapsed)
}
