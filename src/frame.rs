//! Frame record delivered by the sensing subsystem.
//!
//! A `Frame` is the unit of work for one tick: raw buffers, camera pose
//! and intrinsics, captured together. Frames are created per tick and
//! discarded after processing; nothing here is retained by the pipeline.

use crate::geometry::{Mat3, Mat4};

/// Native pixel layout of the color buffer.
///
/// The sensing stack delivers 4-byte pixels; the bridge always strips the
/// alpha channel before publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// R, G, B, A byte order
    Rgba8,
    /// B, G, R, A byte order (common capture format on Apple hardware)
    Bgra8,
}

/// Confidence map with its reported row stride.
///
/// Rows may be padded, so `bytes_per_row` is authoritative; it is not
/// necessarily `width`.
#[derive(Debug, Clone)]
pub struct ConfidenceBuffer {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub bytes_per_row: usize,
}

/// One sensing tick worth of data.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Monotonic source timestamp in seconds (device timebase, not epoch)
    pub timestamp: f64,

    /// Depth map in meters, row-major, tightly packed
    pub depth: Vec<f32>,
    pub depth_width: usize,
    pub depth_height: usize,

    /// Depth confidence map; `None` when the device does not provide one
    pub confidence: Option<ConfidenceBuffer>,

    /// Color image, 4 bytes per pixel in `color_format` layout
    pub color: Vec<u8>,
    pub color_width: usize,
    pub color_height: usize,
    pub color_format: PixelFormat,

    /// Camera-to-world transform in the source axis convention
    /// (right-handed, camera facing -Z, X right, Y up)
    pub camera_pose: Mat4,

    /// Camera intrinsics: fx, fy on the diagonal, cx, cy in the last column
    pub intrinsics: Mat3,

    /// Capture resolution the intrinsics refer to
    pub capture_width: usize,
    pub capture_height: usize,
}

/// Boundary to the sensing subsystem.
///
/// The real implementation lives outside this crate (the AR session
/// delivering frames); `source::SyntheticFrameSource` implements it for
/// the demo binary and tests.
pub trait FrameSource {
    /// Produce the next frame, or `None` when the source has stopped.
    fn next_frame(&mut self) -> Option<Frame>;

    /// Latest out-of-band angular-rate sample in the source convention,
    /// rad/s. Delivered independently of frames.
    fn angular_rate(&self) -> [f64; 3];
}
