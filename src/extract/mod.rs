//! Per-topic data extraction.
//!
//! Extractors turn raw frame buffers into topic-ready samples. They never
//! fail a tick: a missing or inconsistent buffer produces an empty sample
//! with zero dimensions, which payload builders treat as "skip this topic
//! this tick".

mod color;
mod confidence;
mod depth;
mod intrinsics;

pub use color::{downsample_color, strip_alpha};
pub use confidence::extract_confidence;
pub use depth::{downsample_depth, extract_raw_depth};
pub use intrinsics::{scaled_calibration, CameraCalibration};

/// Topic-ready image buffer: tightly packed unless `step` says otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSample {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
    /// Bytes per row as it should appear on the wire
    pub step: usize,
}

impl ImageSample {
    /// Zero-dimension sample signalling "nothing to publish this tick".
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            width: 0,
            height: 0,
            step: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }
}
