//! Camera calibration extraction.
//!
//! Builds the standard K / R / P calibration triple from the frame
//! intrinsics, rescaled to match a downsampled image topic. The input is
//! assumed pre-rectified, so the distortion vector is all zeros and R is
//! identity.

use crate::geometry::Mat3;

/// Camera calibration for one image resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraCalibration {
    /// Image dimensions the calibration refers to (post-downsample)
    pub width: usize,
    pub height: usize,
    /// 3x3 intrinsic matrix, row-major
    pub k: [f64; 9],
    /// 3x3 rectification matrix (identity for a single camera)
    pub r: [f64; 9],
    /// 3x4 projection matrix: K's columns with a zero last column
    pub p: [f64; 12],
    /// Five-element distortion vector (all zeros, input is pre-rectified)
    pub d: [f64; 5],
}

/// Scale fx, fy, cx, cy by the factor used for the paired image topic and
/// assemble K, R and P.
///
/// `width`/`height` are the dimensions of the already-downsampled image
/// this calibration describes.
pub fn scaled_calibration(
    intrinsics: &Mat3,
    width: usize,
    height: usize,
    scale: f64,
) -> CameraCalibration {
    let fx = intrinsics.m[0][0] * scale;
    let fy = intrinsics.m[1][1] * scale;
    let cx = intrinsics.m[0][2] * scale;
    let cy = intrinsics.m[1][2] * scale;

    #[rustfmt::skip]
    let k = [
        fx,  0.0, cx,
        0.0, fy,  cy,
        0.0, 0.0, 1.0,
    ];

    #[rustfmt::skip]
    let r = [
        1.0, 0.0, 0.0,
        0.0, 1.0, 0.0,
        0.0, 0.0, 1.0,
    ];

    #[rustfmt::skip]
    let p = [
        fx,  0.0, cx,  0.0,
        0.0, fy,  cy,  0.0,
        0.0, 0.0, 1.0, 0.0,
    ];

    CameraCalibration {
        width,
        height,
        k,
        r,
        p,
        d: [0.0; 5],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_intrinsics() -> Mat3 {
        Mat3::from_rows(
            [500.0, 0.0, 320.0],
            [0.0, 510.0, 240.0],
            [0.0, 0.0, 1.0],
        )
    }

    #[test]
    fn test_unit_scale_passthrough() {
        let cal = scaled_calibration(&test_intrinsics(), 640, 480, 1.0);
        assert_relative_eq!(cal.k[0], 500.0);
        assert_relative_eq!(cal.k[4], 510.0);
        assert_relative_eq!(cal.k[2], 320.0);
        assert_relative_eq!(cal.k[5], 240.0);
        assert_eq!(cal.width, 640);
        assert_eq!(cal.height, 480);
    }

    #[test]
    fn test_scale_applied_to_all_four() {
        let cal = scaled_calibration(&test_intrinsics(), 64, 48, 0.1);
        assert_relative_eq!(cal.k[0], 50.0);
        assert_relative_eq!(cal.k[4], 51.0);
        assert_relative_eq!(cal.k[2], 32.0);
        assert_relative_eq!(cal.k[5], 24.0);
    }

    #[test]
    fn test_projection_is_k_with_zero_column() {
        let cal = scaled_calibration(&test_intrinsics(), 640, 480, 1.0);
        // P rows are K rows with a trailing zero
        for row in 0..3 {
            for col in 0..3 {
                assert_relative_eq!(cal.p[row * 4 + col], cal.k[row * 3 + col]);
            }
            assert_relative_eq!(cal.p[row * 4 + 3], 0.0);
        }
    }

    #[test]
    fn test_rectification_identity_and_zero_distortion() {
        let cal = scaled_calibration(&test_intrinsics(), 640, 480, 1.0);
        assert_eq!(cal.r, [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(cal.d, [0.0; 5]);
    }
}
