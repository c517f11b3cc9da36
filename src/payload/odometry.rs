//! Odometry payload builder (`nav_msgs/msg/Odometry`).
//!
//! Combines the transformed camera pose with the finite-difference twist.
//! Covariances are unknown and published as 36 zeros.

use super::transform_stamped::{QuaternionMsg, Vector3Msg};
use super::Header;
use crate::geometry::Vec3;
use crate::throttle::RosStamp;
use crate::transform::{emitted_orientation, TargetPose};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// serde derives `Serialize` for arrays only up to 32 elements, so the
/// 6x6 covariance needs an explicit flat-sequence impl.
fn serialize_covariance<S>(cov: &[f64; 36], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut seq = serializer.serialize_seq(Some(cov.len()))?;
    for v in cov {
        seq.serialize_element(v)?;
    }
    seq.end()
}

#[derive(Debug, Clone, Serialize)]
pub struct PoseField {
    pub position: Vector3Msg,
    pub orientation: QuaternionMsg,
}

#[derive(Debug, Clone, Serialize)]
pub struct PoseWithCovariance {
    pub pose: PoseField,
    #[serde(serialize_with = "serialize_covariance")]
    pub covariance: [f64; 36],
}

#[derive(Debug, Clone, Serialize)]
pub struct TwistField {
    pub linear: Vector3Msg,
    pub angular: Vector3Msg,
}

#[derive(Debug, Clone, Serialize)]
pub struct TwistWithCovariance {
    pub twist: TwistField,
    #[serde(serialize_with = "serialize_covariance")]
    pub covariance: [f64; 36],
}

/// Odometry message body.
#[derive(Debug, Clone, Serialize)]
pub struct OdometryMsg {
    pub header: Header,
    pub child_frame_id: String,
    pub pose: PoseWithCovariance,
    pub twist: TwistWithCovariance,
}

/// Accumulated pose and twist for the odometry topic.
#[derive(Debug, Default)]
pub struct OdometryPayload {
    pose: TargetPose,
    linear: Vec3,
    angular: Vec3,
}

impl OdometryPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_pose(&mut self, pose: TargetPose) {
        self.pose = pose;
    }

    pub fn update_twist(&mut self, linear: Vec3, angular: Vec3) {
        self.linear = linear;
        self.angular = angular;
    }

    pub fn build(&self, stamp: RosStamp) -> OdometryMsg {
        let q = emitted_orientation(&self.pose.orientation);
        OdometryMsg {
            header: Header {
                stamp,
                frame_id: "odom".to_string(),
            },
            child_frame_id: "base_link".to_string(),
            pose: PoseWithCovariance {
                pose: PoseField {
                    position: Vector3Msg {
                        x: self.pose.translation.x,
                        y: self.pose.translation.y,
                        z: self.pose.translation.z,
                    },
                    orientation: QuaternionMsg {
                        x: q.x,
                        y: q.y,
                        z: q.z,
                        w: q.w,
                    },
                },
                covariance: [0.0; 36],
            },
            twist: TwistWithCovariance {
                twist: TwistField {
                    linear: Vector3Msg {
                        x: self.linear.x,
                        y: self.linear.y,
                        z: self.linear.z,
                    },
                    angular: Vector3Msg {
                        x: self.angular.x,
                        y: self.angular.y,
                        z: self.angular.z,
                    },
                },
                covariance: [0.0; 36],
            },
        }
    }
}
