use anyhow::{Context, Result};
use std::io::{self, BufWriter};
use std::process::ExitCode;
use std::time::Instant;
use strata_renderer::{
    enumerate_devices, query_device_count, render_frame, save_png, write_ppm, RenderConfig,
    RenderError,
};

/// No device to render on.
const EXIT_NO_DEVICES: u8 = 1;
/// Any device or runtime failure.
const EXIT_DEVICE_FAILURE: u8 = 99;

fn run() -> Result<()> {
    let config = RenderConfig::from_env().context("Failed to read render settings")?;

    // Zero devices stops here, before anything is rendered
    let devices = enumerate_devices(query_device_count()?)?;

    let start = Instant::now();
    let image = render_frame(&config, &devices)?;
    log::info!("Took {:.2?}", start.elapsed());

    // Devices are released before the image is emitted
    drop(devices);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_ppm(&image, &mut out).context("Failed to write image to stdout")?;

    if let Ok(path) = std::env::var("STRATA_PNG") {
        save_png(&image, &path).with_context(|| format!("Failed to save PNG to {}", path))?;
    }

    Ok(())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<RenderError>() {
        Some(RenderError::NoDevices) => EXIT_NO_DEVICES,
        _ => EXIT_DEVICE_FAILURE,
    }
}

/// Logger settings read from `var`, falling back to `info` when it is unset.
fn log_env(var: &str) -> env_logger::Env<'_> {
    env_logger::Env::default().filter_or(var, "info")
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(log_env(env_logger::DEFAULT_FILTER_ENV)).init();

    log::info!("Starting Strata");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let none = anyhow::Error::from(RenderError::NoDevices);
        assert_eq!(exit_code(&none), EXIT_NO_DEVICES);

        let failed = anyhow::Error::from(RenderError::device(0, "render", "boom"));
        assert_eq!(exit_code(&failed), EXIT_DEVICE_FAILURE);

        let wrapped = anyhow::Error::from(RenderError::NoDevices).context("while starting");
        assert_eq!(exit_code(&wrapped), EXIT_NO_DEVICES);
    }

    #[test]
    fn test_log_filter_defaults_to_info() {
        std::env::remove_var("STRATA_TEST_LOG_UNSET");
        let logger = env_logger::Builder::from_env(log_env("STRATA_TEST_LOG_UNSET")).build();
        assert_eq!(logger.filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_log_filter_follows_environment() {
        std::env::set_var("STRATA_TEST_LOG_WARN", "warn");
        let logger = env_logger::Builder::from_env(log_env("STRATA_TEST_LOG_WARN")).build();
        assert_eq!(logger.filter(), log::LevelFilter::Warn);
    }
}
