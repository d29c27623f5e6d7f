//! Error taxonomy for rendering.
//!
//! Geometric edge cases and an exhausted bounce budget are not errors. What
//! remains is either environmental (no device to render on), a device
//! failure (fatal, never retried), bad configuration or output I/O.

use std::fmt::Display;
use std::panic::Location;
use thiserror::Error;

/// Errors that can occur while rendering a frame.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No render devices available")]
    NoDevices,

    #[error("Device {device} error: '{call}' failed at {file}:{line}: {message}")]
    Device {
        device: usize,
        call: &'static str,
        file: &'static str,
        line: u32,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

pub type RenderResult<T> = Result<T, RenderError>;

impl RenderError {
    /// A device failure attributed to the caller's source location.
    #[track_caller]
    pub fn device(device: usize, call: &'static str, message: impl Display) -> Self {
        let location = Location::caller();
        RenderError::Device {
            device,
            call,
            file: location.file(),
            line: location.line(),
            message: message.to_string(),
        }
    }
}

/// Wrap the result of a device call, recording the call and where it was
/// made.
#[track_caller]
pub fn check<T, E: Display>(
    device: usize,
    call: &'static str,
    result: Result<T, E>,
) -> RenderResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => Err(RenderError::device(device, call, err)),
    }
}
