//! Camera-info payload builder (`sensor_msgs/msg/CameraInfo`).

use super::Header;
use crate::extract::CameraCalibration;
use crate::throttle::RosStamp;
use serde::Serialize;

/// CameraInfo message body.
#[derive(Debug, Clone, Serialize)]
pub struct CameraInfoMsg {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    pub distortion_model: String,
    pub d: [f64; 5],
    pub k: [f64; 9],
    pub r: [f64; 9],
    pub p: [f64; 12],
}

/// Accumulated calibration for the camera-info topic.
#[derive(Debug, Default)]
pub struct CameraInfoPayload {
    frame_id: String,
    calibration: Option<CameraCalibration>,
}

impl CameraInfoPayload {
    pub fn new(frame_id: &str) -> Self {
        Self {
            frame_id: frame_id.to_string(),
            calibration: None,
        }
    }

    pub fn update(&mut self, calibration: CameraCalibration) {
        self.calibration = Some(calibration);
    }

    /// Build the message body, or `None` before the first calibration or
    /// for zero-dimension calibration.
    pub fn build(&self, stamp: RosStamp) -> Option<CameraInfoMsg> {
        let cal = self.calibration.as_ref()?;
        if cal.width == 0 || cal.height == 0 {
            return None;
        }
        Some(CameraInfoMsg {
            header: Header {
                stamp,
                frame_id: self.frame_id.clone(),
            },
            height: cal.height as u32,
            width: cal.width as u32,
            distortion_model: "plumb_bob".to_string(),
            d: cal.d,
            k: cal.k,
            r: cal.r,
            p: cal.p,
        })
    }
}
