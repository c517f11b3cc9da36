//! Image payload builder (`sensor_msgs/msg/Image`).
//!
//! Serves the depth, confidence and color topics; only the encoding
//! string and the frame's byte layout differ between them.

use super::Header;
use crate::extract::ImageSample;
use crate::throttle::RosStamp;
use serde::Serialize;

/// Image message body. `data` stays raw here; the serializer decides
/// between base64 (JSON) and native binary (BSON).
#[derive(Debug, Clone, Serialize)]
pub struct ImageMsg {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    pub encoding: String,
    pub is_bigendian: u8,
    pub step: u32,
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// Accumulated state for one image topic.
#[derive(Debug)]
pub struct ImagePayload {
    frame_id: String,
    encoding: String,
    sample: ImageSample,
}

impl ImagePayload {
    pub fn new(frame_id: &str, encoding: &str) -> Self {
        Self {
            frame_id: frame_id.to_string(),
            encoding: encoding.to_string(),
            sample: ImageSample::empty(),
        }
    }

    /// Replace the accumulated sample. An empty sample parks the topic
    /// until real data arrives.
    pub fn update(&mut self, sample: ImageSample) {
        self.sample = sample;
    }

    /// Build the message body, or `None` for zero-dimension state.
    pub fn build(&self, stamp: RosStamp) -> Option<ImageMsg> {
        if self.sample.is_empty() {
            return None;
        }
        Some(ImageMsg {
            header: Header {
                stamp,
                frame_id: self.frame_id.clone(),
            },
            height: self.sample.height as u32,
            width: self.sample.width as u32,
            encoding: self.encoding.clone(),
            is_bigendian: 0,
            step: self.sample.step as u32,
            data: self.sample.data.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp() -> RosStamp {
        RosStamp {
            sec: 100,
            nanosec: 500,
        }
    }

    #[test]
    fn test_build_carries_sample_fields() {
        let mut payload = ImagePayload::new("camera_depth_frame", "32FC1");
        payload.update(ImageSample {
            data: vec![0u8; 24],
            width: 3,
            height: 2,
            step: 12,
        });

        let msg = payload.build(stamp()).unwrap();
        assert_eq!(msg.width, 3);
        assert_eq!(msg.height, 2);
        assert_eq!(msg.step, 12);
        assert_eq!(msg.encoding, "32FC1");
        assert_eq!(msg.is_bigendian, 0);
        assert_eq!(msg.header.frame_id, "camera_depth_frame");
        assert_eq!(msg.data.len(), 24);
    }

    #[test]
    fn test_empty_sample_skips_tick() {
        let payload = ImagePayload::new("camera_depth_frame", "rgb8");
        assert!(payload.build(stamp()).is_none());
    }

    #[test]
    fn test_stale_sample_retained_across_ticks() {
        let mut payload = ImagePayload::new("camera_depth_frame", "8UC1");
        payload.update(ImageSample {
            data: vec![7u8; 6],
            width: 3,
            height: 2,
            step: 3,
        });
        // No update this tick; previous sample is still published
        let msg = payload.build(stamp()).unwrap();
        assert_eq!(msg.data, vec![7u8; 6]);
    }
}
