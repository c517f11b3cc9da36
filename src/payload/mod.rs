//! Per-topic message construction.
//!
//! Each topic owns a payload builder: `update` mutates accumulated state
//! without serializing, `build(stamp)` emits a wire message body. Fields
//! not updated on a given tick keep their previous value; that staleness
//! is deliberate, not an error.
//!
//! The four payload kinds form a closed sum type so that an unhandled
//! kind is a compile error rather than a missed virtual override.

mod camera_info;
mod image;
mod odometry;
mod transform_stamped;

pub use camera_info::{CameraInfoMsg, CameraInfoPayload};
pub use image::{ImageMsg, ImagePayload};
pub use odometry::{OdometryMsg, OdometryPayload};
pub use transform_stamped::{QuaternionMsg, TransformMsg, TransformStampedPayload, Vector3Msg};

use crate::throttle::RosStamp;
use crate::wire::WireFormat;
use serde::Serialize;

/// Standard message header shared by every body.
#[derive(Debug, Clone, Serialize)]
pub struct Header {
    pub stamp: RosStamp,
    pub frame_id: String,
}

/// Which sensor stream feeds a topic. Determines the extractor the
/// orchestrator runs for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Depth,
    Confidence,
    Color,
    CameraInfo,
    Pose,
    Odometry,
}

/// Payload builder for one topic.
#[derive(Debug)]
pub enum Payload {
    Image(ImagePayload),
    CameraInfo(CameraInfoPayload),
    TransformStamped(TransformStampedPayload),
    Odometry(OdometryPayload),
}

impl Payload {
    /// ROS type string advertised for this payload kind.
    pub fn ros_type(&self) -> &'static str {
        match self {
            Payload::Image(_) => "sensor_msgs/msg/Image",
            Payload::CameraInfo(_) => "sensor_msgs/msg/CameraInfo",
            Payload::TransformStamped(_) => "geometry_msgs/msg/TransformStamped",
            Payload::Odometry(_) => "nav_msgs/msg/Odometry",
        }
    }

    /// Emit the message body for this tick, or `None` when the
    /// accumulated state is not publishable (zero-dimension image, no
    /// calibration yet).
    pub fn build(&self, stamp: RosStamp) -> Option<MessageBody> {
        match self {
            Payload::Image(p) => p.build(stamp).map(MessageBody::Image),
            Payload::CameraInfo(p) => p.build(stamp).map(MessageBody::CameraInfo),
            Payload::TransformStamped(p) => Some(MessageBody::Transform(p.build(stamp))),
            Payload::Odometry(p) => Some(MessageBody::Odometry(p.build(stamp))),
        }
    }
}

/// Built message body, ready for the serializer.
#[derive(Debug, Clone)]
pub enum MessageBody {
    Image(image::ImageMsg),
    CameraInfo(camera_info::CameraInfoMsg),
    Transform(transform_stamped::TransformMsg),
    Odometry(odometry::OdometryMsg),
}

/// One named, typed stream on the broker.
///
/// Topics are created once at startup, in declared enablement order, and
/// live for the process lifetime. The containing `Vec` order is the
/// transmission order contract.
#[derive(Debug)]
pub struct Topic {
    pub name: String,
    pub kind: StreamKind,
    pub format: WireFormat,
    pub payload: Payload,
}

impl Topic {
    pub fn new(name: &str, kind: StreamKind, format: WireFormat, payload: Payload) -> Self {
        log::info!(
            "Topic {} ({}, {:?} wire format)",
            name,
            payload.ros_type(),
            format
        );
        Self {
            name: name.to_string(),
            kind,
            format,
            payload,
        }
    }

    pub fn ros_type(&self) -> &'static str {
        self.payload.ros_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ImageSample;

    #[test]
    fn test_ros_type_strings() {
        let image = Payload::Image(ImagePayload::new("camera_depth_frame", "32FC1"));
        assert_eq!(image.ros_type(), "sensor_msgs/msg/Image");

        let info = Payload::CameraInfo(CameraInfoPayload::new("camera_depth_frame"));
        assert_eq!(info.ros_type(), "sensor_msgs/msg/CameraInfo");

        let tf = Payload::TransformStamped(TransformStampedPayload::new());
        assert_eq!(tf.ros_type(), "geometry_msgs/msg/TransformStamped");

        let odom = Payload::Odometry(OdometryPayload::new());
        assert_eq!(odom.ros_type(), "nav_msgs/msg/Odometry");
    }

    #[test]
    fn test_empty_image_builds_nothing() {
        let mut p = ImagePayload::new("camera_depth_frame", "32FC1");
        p.update(ImageSample::empty());
        let payload = Payload::Image(p);
        assert!(payload
            .build(RosStamp {
                sec: 1,
                nanosec: 0
            })
            .is_none());
    }
}
