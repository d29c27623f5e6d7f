//! Horizontal band partitioning across devices.
//!
//! The image is cut into contiguous row ranges, one per device. Every device
//! gets `height / devices` rows and the last device also takes the remainder,
//! so the bands always tile `[0, height)` exactly.

use std::ops::Range;

/// Which slice of the frame a device renders: its index and the total
/// number of devices sharing the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub index: usize,
    pub count: usize,
}

impl Slice {
    pub fn new(index: usize, count: usize) -> Self {
        debug_assert!(index < count, "slice {} out of {}", index, count);
        Self { index, count }
    }

    /// The whole frame on a single device.
    pub const FULL: Slice = Slice { index: 0, count: 1 };

    /// The rows this slice owns in an image `height` rows tall.
    pub fn band(&self, height: u32) -> Band {
        let chunk = height / self.count as u32;
        let min_y = self.index as u32 * chunk;
        let max_y = if self.index + 1 == self.count {
            height
        } else {
            min_y + chunk
        };
        Band {
            slice: *self,
            min_y,
            max_y,
        }
    }
}

/// A contiguous row range `[min_y, max_y)` of the output image.
///
/// Row 0 is the bottom of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub slice: Slice,
    pub min_y: u32,
    pub max_y: u32,
}

impl Band {
    pub fn height(&self) -> u32 {
        self.max_y - self.min_y
    }

    pub fn is_empty(&self) -> bool {
        self.max_y == self.min_y
    }

    pub fn rows(&self) -> Range<u32> {
        self.min_y..self.max_y
    }

    /// Number of pixels in the band for an image `width` pixels wide.
    pub fn pixel_count(&self, width: u32) -> usize {
        width as usize * self.height() as usize
    }

    /// Offset of the band's first pixel in a row-major framebuffer.
    pub fn pixel_offset(&self, width: u32) -> usize {
        width as usize * self.min_y as usize
    }
}

/// Split `height` rows into one band per device, in device order.
pub fn partition_rows(height: u32, devices: usize) -> Vec<Band> {
    (0..devices)
        .map(|index| Slice::new(index, devices).band(height))
        .collect()
}
