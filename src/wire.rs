//! Wire format serialization for the broker protocol.
//!
//! Two encodings of the same publish envelope are supported:
//!
//! - **JSON** (default): byte payloads are base64-encoded into the `data`
//!   string field; everything else maps to nested key/value structures.
//! - **BSON** (optional, per topic): byte payloads travel as native BSON
//!   binary values, avoiding the ~33% base64 inflation. At least one
//!   broker implementation is known to mishandle binary documents, so
//!   this mode must be validated against the target broker before being
//!   enabled, and every topic defaults to JSON.
//!
//! Advertise control messages are always JSON regardless of the per-topic
//! publish format.

use crate::error::{Error, Result};
use crate::payload::MessageBody;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bson::spec::BinarySubtype;
use serde::{Deserialize, Serialize};

/// Supported wire formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// JSON with base64 byte payloads - safe default for every broker
    #[default]
    Json,
    /// BSON with native binary payloads - compact, broker-dependent
    Bson,
}

/// Serializer for one topic's wire format
#[derive(Debug, Clone, Copy)]
pub struct Serializer {
    format: WireFormat,
}

impl Serializer {
    pub fn new(format: WireFormat) -> Self {
        Self { format }
    }

    /// Encode a publish envelope for the broker.
    pub fn serialize_publish(
        &self,
        topic: &str,
        ros_type: &str,
        body: &MessageBody,
    ) -> Result<Vec<u8>> {
        match self.format {
            WireFormat::Json => publish_json(topic, ros_type, body),
            WireFormat::Bson => publish_bson(topic, ros_type, body),
        }
    }
}

/// Encode an advertise control message. Always JSON.
pub fn serialize_advertise(topic: &str, ros_type: &str) -> Result<Vec<u8>> {
    let envelope = serde_json::json!({
        "op": "advertise",
        "topic": topic,
        "type": ros_type,
    });
    serde_json::to_vec(&envelope).map_err(|e| Error::Serialization(e.to_string()))
}

fn publish_json(topic: &str, ros_type: &str, body: &MessageBody) -> Result<Vec<u8>> {
    let msg = match body {
        MessageBody::Image(m) => {
            let mut value =
                serde_json::to_value(m).map_err(|e| Error::Serialization(e.to_string()))?;
            value["data"] = serde_json::Value::String(BASE64.encode(&m.data));
            value
        }
        MessageBody::CameraInfo(m) => {
            serde_json::to_value(m).map_err(|e| Error::Serialization(e.to_string()))?
        }
        MessageBody::Transform(m) => {
            serde_json::to_value(m).map_err(|e| Error::Serialization(e.to_string()))?
        }
        MessageBody::Odometry(m) => {
            serde_json::to_value(m).map_err(|e| Error::Serialization(e.to_string()))?
        }
    };

    let envelope = serde_json::json!({
        "op": "publish",
        "topic": topic,
        "type": ros_type,
        "msg": msg,
        "queue_length": 1,
    });
    serde_json::to_vec(&envelope).map_err(|e| Error::Serialization(e.to_string()))
}

fn publish_bson(topic: &str, ros_type: &str, body: &MessageBody) -> Result<Vec<u8>> {
    let msg = match body {
        MessageBody::Image(m) => {
            let mut doc =
                bson::to_document(m).map_err(|e| Error::Serialization(e.to_string()))?;
            doc.insert(
                "data",
                bson::Binary {
                    subtype: BinarySubtype::Generic,
                    bytes: m.data.clone(),
                },
            );
            doc
        }
        MessageBody::CameraInfo(m) => {
            bson::to_document(m).map_err(|e| Error::Serialization(e.to_string()))?
        }
        MessageBody::Transform(m) => {
            bson::to_document(m).map_err(|e| Error::Serialization(e.to_string()))?
        }
        MessageBody::Odometry(m) => {
            bson::to_document(m).map_err(|e| Error::Serialization(e.to_string()))?
        }
    };

    let envelope = bson::doc! {
        "op": "publish",
        "topic": topic,
        "type": ros_type,
        "msg": msg,
        "queue_length": 1_i32,
    };
    bson::to_vec(&envelope).map_err(|e| Error::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ImageSample;
    use crate::payload::{ImagePayload, OdometryPayload};
    use crate::throttle::RosStamp;

    fn image_body() -> MessageBody {
        let mut payload = ImagePayload::new("camera_depth_frame", "32FC1");
        payload.update(ImageSample {
            data: vec![1u8, 2, 3, 4, 5, 6, 7, 8],
            width: 2,
            height: 1,
            step: 8,
        });
        MessageBody::Image(
            payload
                .build(RosStamp {
                    sec: 1700000000,
                    nanosec: 250_000_000,
                })
                .unwrap(),
        )
    }

    #[test]
    fn test_json_publish_envelope() {
        let encoded = Serializer::new(WireFormat::Json)
            .serialize_publish("/arkit/depth/image_raw", "sensor_msgs/msg/Image", &image_body())
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&encoded).unwrap();

        assert_eq!(value["op"], "publish");
        assert_eq!(value["topic"], "/arkit/depth/image_raw");
        assert_eq!(value["type"], "sensor_msgs/msg/Image");
        assert_eq!(value["queue_length"], 1);
        assert_eq!(value["msg"]["width"], 2);
        assert_eq!(value["msg"]["encoding"], "32FC1");
        assert_eq!(value["msg"]["is_bigendian"], 0);
        assert_eq!(value["msg"]["header"]["stamp"]["sec"], 1700000000);
        assert_eq!(value["msg"]["header"]["stamp"]["nanosec"], 250000000u32);
    }

    #[test]
    fn test_json_image_data_base64() {
        let encoded = Serializer::new(WireFormat::Json)
            .serialize_publish("/t", "sensor_msgs/msg/Image", &image_body())
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&encoded).unwrap();

        let data = value["msg"]["data"].as_str().unwrap();
        let decoded = BASE64.decode(data).unwrap();
        assert_eq!(decoded, vec![1u8, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_bson_image_data_native_binary() {
        let encoded = Serializer::new(WireFormat::Bson)
            .serialize_publish("/t", "sensor_msgs/msg/Image", &image_body())
            .unwrap();

        let doc = bson::Document::from_reader(&mut std::io::Cursor::new(&encoded)).unwrap();
        assert_eq!(doc.get_str("op").unwrap(), "publish");
        let msg = doc.get_document("msg").unwrap();
        let data = msg.get_binary_generic("data").unwrap();
        assert_eq!(data, &vec![1u8, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_json_odometry_covariance_length() {
        let body = MessageBody::Odometry(OdometryPayload::new().build(RosStamp {
            sec: 1,
            nanosec: 0,
        }));
        let encoded = Serializer::new(WireFormat::Json)
            .serialize_publish("/arkit/odom", "nav_msgs/msg/Odometry", &body)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&encoded).unwrap();

        assert_eq!(value["msg"]["pose"]["covariance"].as_array().unwrap().len(), 36);
        assert_eq!(
            value["msg"]["twist"]["covariance"].as_array().unwrap().len(),
            36
        );
        assert_eq!(value["msg"]["child_frame_id"], "base_link");
    }

    #[test]
    fn test_advertise_is_json() {
        let encoded = serialize_advertise("/arkit/odom", "nav_msgs/msg/Odometry").unwrap();
        let value: serde_json::Value = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(value["op"], "advertise");
        assert_eq!(value["topic"], "/arkit/odom");
        assert_eq!(value["type"], "nav_msgs/msg/Odometry");
        assert!(value.get("msg").is_none());
    }

    #[test]
    fn test_wire_format_toml_names() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrap {
            format: WireFormat,
        }
        let wrapped: Wrap = toml::from_str("format = \"bson\"").unwrap();
        assert_eq!(wrapped.format, WireFormat::Bson);
        let s = toml::to_string(&Wrap {
            format: WireFormat::Json,
        })
        .unwrap();
        assert!(s.contains("format = \"json\""));
    }
}
