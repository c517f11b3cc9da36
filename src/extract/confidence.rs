//! Confidence map extraction.
//!
//! Confidence rows may be padded by the capture hardware, so the copy uses
//! the reported row stride rather than `width * 1`, and the stride is what
//! goes on the wire as `step`.

use super::ImageSample;
use crate::frame::ConfidenceBuffer;

/// Raw confidence buffer with its reported stride.
///
/// A missing map (device without confidence support) yields an empty
/// sample rather than failing the tick.
pub fn extract_confidence(confidence: Option<&ConfidenceBuffer>) -> ImageSample {
    let Some(buf) = confidence else {
        return ImageSample::empty();
    };

    let total = buf.bytes_per_row * buf.height;
    if buf.width == 0 || buf.height == 0 || buf.bytes_per_row < buf.width || buf.data.len() < total
    {
        log::warn!(
            "Confidence buffer inconsistent ({} bytes, {}x{}, stride {}), skipping",
            buf.data.len(),
            buf.width,
            buf.height,
            buf.bytes_per_row
        );
        return ImageSample::empty();
    }

    ImageSample {
        data: buf.data[..total].to_vec(),
        width: buf.width,
        height: buf.height,
        step: buf.bytes_per_row,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_confidence_is_empty() {
        let sample = extract_confidence(None);
        assert!(sample.is_empty());
        assert_eq!(sample.width, 0);
        assert_eq!(sample.height, 0);
    }

    #[test]
    fn test_confidence_keeps_reported_stride() {
        // 5 valid bytes per row, stride 8 (3 bytes padding)
        let buf = ConfidenceBuffer {
            data: (0..8 * 4).map(|i| i as u8).collect(),
            width: 5,
            height: 4,
            bytes_per_row: 8,
        };
        let sample = extract_confidence(Some(&buf));
        assert_eq!(sample.width, 5);
        assert_eq!(sample.height, 4);
        assert_eq!(sample.step, 8);
        assert_eq!(sample.data.len(), 32);
        // Padding bytes travel with the row
        assert_eq!(sample.data[8], 8);
    }

    #[test]
    fn test_confidence_short_buffer_is_empty() {
        let buf = ConfidenceBuffer {
            data: vec![0u8; 10],
            width: 5,
            height: 4,
            bytes_per_row: 8,
        };
        assert!(extract_confidence(Some(&buf)).is_empty());
    }
}
