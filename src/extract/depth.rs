//! Depth map extraction: raw pass-through and uniform downsampling.

use super::ImageSample;

const BYTES_PER_DEPTH: usize = 4;

/// Full-resolution depth buffer as little-endian f32 bytes, tightly
/// packed, row-major. `step = width * 4`.
pub fn extract_raw_depth(depth: &[f32], width: usize, height: usize) -> ImageSample {
    if depth.len() != width * height || width == 0 || height == 0 {
        log::warn!(
            "Depth buffer inconsistent ({} values for {}x{}), skipping",
            depth.len(),
            width,
            height
        );
        return ImageSample::empty();
    }

    let mut data = Vec::with_capacity(depth.len() * BYTES_PER_DEPTH);
    for v in depth {
        data.extend_from_slice(&v.to_le_bytes());
    }

    ImageSample {
        data,
        width,
        height,
        step: width * BYTES_PER_DEPTH,
    }
}

/// Depth buffer resampled by a uniform factor on both dimensions.
///
/// Output dimensions are `floor(width * scale) x floor(height * scale)`,
/// bilinear filter, re-rendered into a tightly packed f32 buffer with
/// `step = width' * 4`. The caller must apply the same factor to the
/// paired camera-info intrinsics.
pub fn downsample_depth(depth: &[f32], width: usize, height: usize, scale: f64) -> ImageSample {
    if depth.len() != width * height || width == 0 || height == 0 || scale <= 0.0 {
        log::warn!("Depth downsample input invalid, skipping");
        return ImageSample::empty();
    }

    let new_width = (width as f64 * scale) as usize;
    let new_height = (height as f64 * scale) as usize;
    if new_width == 0 || new_height == 0 {
        log::warn!(
            "Downsample factor {} collapses {}x{} to zero size, skipping",
            scale,
            width,
            height
        );
        return ImageSample::empty();
    }

    let mut data = Vec::with_capacity(new_width * new_height * BYTES_PER_DEPTH);
    let x_ratio = width as f64 / new_width as f64;
    let y_ratio = height as f64 / new_height as f64;

    for oy in 0..new_height {
        let sy = ((oy as f64 + 0.5) * y_ratio - 0.5).clamp(0.0, (height - 1) as f64);
        let y0 = sy.floor() as usize;
        let y1 = (y0 + 1).min(height - 1);
        let fy = sy - y0 as f64;

        for ox in 0..new_width {
            let sx = ((ox as f64 + 0.5) * x_ratio - 0.5).clamp(0.0, (width - 1) as f64);
            let x0 = sx.floor() as usize;
            let x1 = (x0 + 1).min(width - 1);
            let fx = sx - x0 as f64;

            let top = f64::from(depth[y0 * width + x0]) * (1.0 - fx)
                + f64::from(depth[y0 * width + x1]) * fx;
            let bottom = f64::from(depth[y1 * width + x0]) * (1.0 - fx)
                + f64::from(depth[y1 * width + x1]) * fx;
            let value = (top * (1.0 - fy) + bottom * fy) as f32;
            data.extend_from_slice(&value.to_le_bytes());
        }
    }

    ImageSample {
        data,
        width: new_width,
        height: new_height,
        step: new_width * BYTES_PER_DEPTH,
    }
}
