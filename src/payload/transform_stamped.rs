//! Pose payload builder (`geometry_msgs/msg/TransformStamped`).
//!
//! Publishes the camera pose as the odom -> base_link transform.

use super::Header;
use crate::throttle::RosStamp;
use crate::transform::{emitted_orientation, TargetPose};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Vector3Msg {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Quaternion in ROS field order (x, y, z, w).
#[derive(Debug, Clone, Serialize)]
pub struct QuaternionMsg {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransformField {
    pub translation: Vector3Msg,
    pub rotation: QuaternionMsg,
}

/// TransformStamped message body.
#[derive(Debug, Clone, Serialize)]
pub struct TransformMsg {
    pub header: Header,
    pub child_frame_id: String,
    pub transform: TransformField,
}

/// Accumulated pose for the transform topic.
#[derive(Debug, Default)]
pub struct TransformStampedPayload {
    pose: TargetPose,
}

impl TransformStampedPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, pose: TargetPose) {
        self.pose = pose;
    }

    pub fn build(&self, stamp: RosStamp) -> TransformMsg {
        let q = emitted_orientation(&self.pose.orientation);
        TransformMsg {
            header: Header {
                stamp,
                frame_id: "odom".to_string(),
            },
            child_frame_id: "base_link".to_string(),
            transform: TransformField {
                translation: Vector3Msg {
                    x: self.pose.translation.x,
                    y: self.pose.translation.y,
                    z: self.pose.translation.z,
                },
                rotation: QuaternionMsg {
                    x: q.x,
                    y: q.y,
                    z: q.z,
                    w: q.w,
                },
            },
        }
    }
}
