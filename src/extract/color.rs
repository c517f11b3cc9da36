//! Color image extraction: alpha stripping and uniform downsampling.
//!
//! The sensing stack delivers 4-byte pixels (RGBA or BGRA); the broker
//! side expects tightly packed rgb8.

use super::ImageSample;
use crate::frame::PixelFormat;

/// Convert a 4-byte-per-pixel buffer to tightly packed rgb8.
///
/// `step = width * 3`, no row padding. BGRA input has its channels
/// reordered while stripping.
pub fn strip_alpha(color: &[u8], width: usize, height: usize, format: PixelFormat) -> ImageSample {
    if color.len() != width * height * 4 || width == 0 || height == 0 {
        log::warn!(
            "Color buffer inconsistent ({} bytes for {}x{}), skipping",
            color.len(),
            width,
            height
        );
        return ImageSample::empty();
    }

    let mut data = Vec::with_capacity(width * height * 3);
    for px in color.chunks_exact(4) {
        match format {
            PixelFormat::Rgba8 => data.extend_from_slice(&px[0..3]),
            PixelFormat::Bgra8 => {
                data.push(px[2]);
                data.push(px[1]);
                data.push(px[0]);
            }
        }
    }

    ImageSample {
        data,
        width,
        height,
        step: width * 3,
    }
}

/// Downsample a 4-byte-per-pixel buffer by a uniform factor and strip the
/// alpha channel, producing tightly packed rgb8 with `step = width' * 3`.
pub fn downsample_color(
    color: &[u8],
    width: usize,
    height: usize,
    format: PixelFormat,
    scale: f64,
) -> ImageSample {
    if color.len() != width * height * 4 || width == 0 || height == 0 || scale <= 0.0 {
        log::warn!("Color downsample input invalid, skipping");
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

    // Channel offsets into the source pixel for (r, g, b)
    let (ro, go, bo) = match format {
        PixelFormat::Rgba8 => (0, 1, 2),
        PixelFormat::Bgra8 => (2, 1, 0),
    };

    let mut data = Vec::with_capacity(new_width * new_height * 3);
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

            for offset in [ro, go, bo] {
                let p00 = f64::from(color[(y0 * width + x0) * 4 + offset]);
                let p01 = f64::from(color[(y0 * width + x1) * 4 + offset]);
                let p10 = f64::from(color[(y1 * width + x0) * 4 + offset]);
                let p11 = f64::from(color[(y1 * width + x1) * 4 + offset]);
                let top = p00 * (1.0 - fx) + p01 * fx;
                let bottom = p10 * (1.0 - fx) + p11 * fx;
                data.push((top * (1.0 - fy) + bottom * fy).round() as u8);
            }
        }
    }

    ImageSample {
        data,
        width: new_width,
        height: new_height,
        step: new_width * 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_alpha_property() {
        // out[3i..3i+2] == in[4i..4i+2] for every pixel
        let width = 4;
        let height = 3;
        let rgba: Vec<u8> = (0..width * height * 4).map(|i| (i % 251) as u8).collect();

        let sample = strip_alpha(&rgba, width, height, PixelFormat::Rgba8);
        assert_eq!(sample.data.len(), width * height * 3);
        assert_eq!(sample.step, width * 3);
        for i in 0..width * height {
            assert_eq!(&sample.data[3 * i..3 * i + 3], &rgba[4 * i..4 * i + 3]);
        }
    }

    #[test]
    fn test_strip_alpha_bgra_reorders() {
        let bgra = vec![10u8, 20, 30, 255];
        let sample = strip_alpha(&bgra, 1, 1, PixelFormat::Bgra8);
        assert_eq!(sample.data, vec![30, 20, 10]);
    }

    #[test]
    fn test_strip_alpha_bad_length_is_empty() {
        let rgba = vec![0u8; 10];
        let sample = strip_alpha(&rgba, 2, 2, PixelFormat::Rgba8);
        assert!(sample.is_empty());
    }

    #[test]
    fn test_downsample_color_dimensions() {
        let rgba = vec![128u8; 40 * 30 * 4];
        let sample = downsample_color(&rgba, 40, 30, PixelFormat::Rgba8, 0.1);
        assert_eq!(sample.width, 4);
        assert_eq!(sample.height, 3);
        assert_eq!(sample.step, 12);
        assert_eq!(sample.data.len(), 4 * 3 * 3);
    }

    #[test]
    fn test_downsample_color_constant_image() {
        let mut rgba = Vec::new();
        for _ in 0..16 * 16 {
            rgba.extend_from_slice(&[50, 100, 150, 255]);
        }
        let sample = downsample_color(&rgba, 16, 16, PixelFormat::Rgba8, 0.5);
        for px in sample.data.chunks_exact(3) {
            assert_eq!(px, &[50, 100, 150]);
        }
    }

    #[test]
    fn test_downsample_color_bgra() {
        let mut bgra = Vec::new();
        for _ in 0..8 * 8 {
            bgra.extend_from_slice(&[150, 100, 50, 255]);
        }
        let sample = downsample_color(&bgra, 8, 8, PixelFormat::Bgra8, 0.5);
        for px in sample.data.chunks_exact(3) {
            assert_eq!(px, &[50, 100, 150]);
        }
    }
}
