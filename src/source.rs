//! Synthetic frame source for the demo binary and tests.
//!
//! Produces a deterministic 30 Hz stream: gradient depth, gradient color,
//! a camera pose drifting along source X, and a constant yaw rate. No
//! capture hardware involved; the values only need to be stable enough to
//! assert on.

use crate::frame::{ConfidenceBuffer, Frame, FrameSource, PixelFormat};
use crate::geometry::{Mat3, Mat4, Vec3};

const SOURCE_HZ: f64 = 30.0;

/// Deterministic frame generator.
pub struct SyntheticFrameSource {
    tick: u64,
    depth_width: usize,
    depth_height: usize,
    color_width: usize,
    color_height: usize,
}

impl SyntheticFrameSource {
    pub fn new() -> Self {
        Self::with_dimensions(64, 48, 128, 96)
    }

    pub fn with_dimensions(
        depth_width: usize,
        depth_height: usize,
        color_width: usize,
        color_height: usize,
    ) -> Self {
        Self {
            tick: 0,
            depth_width,
            depth_height,
            color_width,
            color_height,
        }
    }

    fn intrinsics(&self) -> Mat3 {
        let w = self.color_width as f64;
        let h = self.color_height as f64;
        Mat3::from_rows([w, 0.0, w / 2.0], [0.0, w, h / 2.0], [0.0, 0.0, 1.0])
    }
}

impl Default for SyntheticFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for SyntheticFrameSource {
    fn next_frame(&mut self) -> Option<Frame> {
        let timestamp = self.tick as f64 / SOURCE_HZ;

        let mut depth = Vec::with_capacity(self.depth_width * self.depth_height);
        for y in 0..self.depth_height {
            for x in 0..self.depth_width {
                // Planar gradient between roughly 0.5m and 3m
                depth.push(0.5 + (x + y) as f32 * 0.01);
            }
        }

        let mut color = Vec::with_capacity(self.color_width * self.color_height * 4);
        for y in 0..self.color_height {
            for x in 0..self.color_width {
                color.push((x % 256) as u8);
                color.push((y % 256) as u8);
                color.push((self.tick % 256) as u8);
                color.push(255);
            }
        }

        let confidence = ConfidenceBuffer {
            data: vec![2u8; self.depth_width * self.depth_height],
            width: self.depth_width,
            height: self.depth_height,
            bytes_per_row: self.depth_width,
        };

        // Drift 1cm per tick along source X
        let camera_pose = Mat4::from_parts(
            Mat3::IDENTITY,
            Vec3::new(0.01 * self.tick as f64, 0.0, 0.0),
        );

        let frame = Frame {
            timestamp,
            depth,
            depth_width: self.depth_width,
            depth_height: self.depth_height,
            confidence: Some(confidence),
            color,
            color_width: self.color_width,
            color_height: self.color_height,
            color_format: PixelFormat::Bgra8,
            camera_pose,
            intrinsics: self.intrinsics(),
            capture_width: self.color_width,
            capture_height: self.color_height,
        };

        self.tick += 1;
        Some(frame)
    }

    fn angular_rate(&self) -> [f64; 3] {
        [0.0, 0.0, 0.02]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_advance_at_source_rate() {
        let mut source = SyntheticFrameSource::new();
        let f0 = source.next_frame().unwrap();
        let f1 = source.next_frame().unwrap();
        assert_eq!(f0.timestamp, 0.0);
        assert!((f1.timestamp - 1.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_buffers_consistent_with_dimensions() {
        let mut source = SyntheticFrameSource::with_dimensions(16, 12, 32, 24);
        let frame = source.next_frame().unwrap();
        assert_eq!(frame.depth.len(), 16 * 12);
        assert_eq!(frame.color.len(), 32 * 24 * 4);
        let conf = frame.confidence.unwrap();
        assert_eq!(conf.data.len(), 16 * 12);
        assert_eq!(conf.bytes_per_row, 16);
    }

    #[test]
    fn test_pose_drifts_along_source_x() {
        let mut source = SyntheticFrameSource::new();
        source.next_frame().unwrap();
        let frame = source.next_frame().unwrap();
        assert!((frame.camera_pose.translation().x - 0.01).abs() < 1e-12);
    }
}
