//! Per-frame pipeline: throttle, extract, build, serialize, send.
//!
//! The orchestrator owns the topic list, the throttler, the velocity
//! state and the broker client, and runs the whole pipeline synchronously
//! inside `process_frame`. A rejected frame has zero side effects; an
//! accepted frame refreshes every enabled stream and publishes them in
//! declared order (depth, confidence, color, camera_info, pose, odometry).

use crate::client::{BridgeClient, ClientEvent};
use crate::config::AppConfig;
use crate::error::Result;
use crate::extract::{
    downsample_color, downsample_depth, extract_confidence, extract_raw_depth, scaled_calibration,
    strip_alpha, ImageSample,
};
use crate::frame::Frame;
use crate::payload::{
    CameraInfoPayload, ImagePayload, OdometryPayload, Payload, StreamKind, Topic,
    TransformStampedPayload,
};
use crate::throttle::FrameThrottler;
use crate::transform::{angular_velocity, pose_to_target, VelocityState};
use crate::wire::{serialize_advertise, Serializer};
use log::{debug, error, info, warn};

const DEPTH_FRAME_ID: &str = "camera_depth_frame";
const COLOR_FRAME_ID: &str = "camera_color_frame";

/// Owns every per-stream state machine and the broker client.
pub struct Orchestrator {
    client: BridgeClient,
    topics: Vec<Topic>,
    throttler: FrameThrottler,
    velocity: VelocityState,
    angular_rate: [f64; 3],
    depth_scale: f64,
    color_scale: f64,
}

impl Orchestrator {
    /// Build the topic list from configuration, in declared enablement
    /// order. Topic creation order is the transmission order for the
    /// lifetime of the process.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = BridgeClient::new(&config.bridge.host, config.bridge.port)?;

        let t = &config.topics;
        let mut topics = Vec::new();
        if t.depth.enabled {
            topics.push(Topic::new(
                &t.depth.name,
                StreamKind::Depth,
                t.depth.format,
                Payload::Image(ImagePayload::new(DEPTH_FRAME_ID, "32FC1")),
            ));
        }
        if t.confidence.enabled {
            topics.push(Topic::new(
                &t.confidence.name,
                StreamKind::Confidence,
                t.confidence.format,
                Payload::Image(ImagePayload::new(DEPTH_FRAME_ID, "8UC1")),
            ));
        }
        if t.color.enabled {
            topics.push(Topic::new(
                &t.color.name,
                StreamKind::Color,
                t.color.format,
                Payload::Image(ImagePayload::new(COLOR_FRAME_ID, "rgb8")),
            ));
        }
        if t.camera_info.enabled {
            topics.push(Topic::new(
                &t.camera_info.name,
                StreamKind::CameraInfo,
                t.camera_info.format,
                Payload::CameraInfo(CameraInfoPayload::new(DEPTH_FRAME_ID)),
            ));
        }
        if t.pose.enabled {
            topics.push(Topic::new(
                &t.pose.name,
                StreamKind::Pose,
                t.pose.format,
                Payload::TransformStamped(TransformStampedPayload::new()),
            ));
        }
        if t.odometry.enabled {
            topics.push(Topic::new(
                &t.odometry.name,
                StreamKind::Odometry,
                t.odometry.format,
                Payload::Odometry(OdometryPayload::new()),
            ));
        }
        info!("Orchestrator configured with {} topics", topics.len());

        Ok(Self {
            client,
            topics,
            throttler: FrameThrottler::new(config.publish.target_fps()),
            velocity: VelocityState::new(),
            angular_rate: [0.0; 3],
            depth_scale: config.publish.depth_scale,
            color_scale: config.publish.color_scale,
        })
    }

    /// Start connecting to the broker in the background.
    pub fn connect(&self) -> Result<()> {
        self.client.connect()
    }

    pub fn client(&self) -> &BridgeClient {
        &self.client
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Record the latest out-of-band angular-rate sample. Picked up by the
    /// odometry topic on the next accepted frame.
    pub fn update_angular_rate(&mut self, rate: [f64; 3]) {
        self.angular_rate = rate;
    }

    /// Drain connection events; a fresh connection triggers the advertise
    /// handshake for every topic, in declared order, always as JSON.
    ///
    /// Handshake failures are logged and dropped per topic; they never
    /// surface to the frame callback.
    fn pump_events(&self) {
        while let Ok(event) = self.client.events().try_recv() {
            match event {
                ClientEvent::Connected => {
                    info!("Broker connected, advertising {} topics", self.topics.len());
                    for topic in &self.topics {
                        match serialize_advertise(&topic.name, topic.ros_type()) {
                            Ok(bytes) => {
                                if let Err(e) = self.client.send(&bytes) {
                                    error!("Advertise send failed for {}: {}", topic.name, e);
                                }
                            }
                            Err(e) => {
                                error!("Advertise serialization failed for {}: {}", topic.name, e);
                            }
                        }
                    }
                }
                ClientEvent::Disconnected => {
                    warn!("Broker connection lost");
                }
            }
        }
    }

    /// Run one frame through the pipeline.
    pub fn process_frame(&mut self, frame: &Frame) -> Result<()> {
        self.pump_events();

        if !self.throttler.should_publish(frame.timestamp) {
            return Ok(());
        }
        let stamp = self.throttler.stamp(frame.timestamp);

        let wants = |kind: StreamKind| self.topics.iter().any(|t| t.kind == kind);
        let wants_depth = wants(StreamKind::Depth);
        let wants_camera_info = wants(StreamKind::CameraInfo);
        let wants_odometry = wants(StreamKind::Odometry);

        let depth_sample = if wants_depth {
            if self.depth_scale >= 1.0 {
                extract_raw_depth(&frame.depth, frame.depth_width, frame.depth_height)
            } else {
                downsample_depth(
                    &frame.depth,
                    frame.depth_width,
                    frame.depth_height,
                    self.depth_scale,
                )
            }
        } else {
            ImageSample::empty()
        };

        // Calibration is paired with the depth topic: same output
        // dimensions, intrinsics scaled by the same factor as the depth
        // image.
        let calibration = if wants_camera_info {
            let (out_w, out_h) = if wants_depth && !depth_sample.is_empty() {
                (depth_sample.width, depth_sample.height)
            } else {
                depth_output_dims(frame.depth_width, frame.depth_height, self.depth_scale)
            };
            let scale = if self.depth_scale >= 1.0 {
                1.0
            } else {
                self.depth_scale
            };
            Some(scaled_calibration(&frame.intrinsics, out_w, out_h, scale))
        } else {
            None
        };

        let target = pose_to_target(&frame.camera_pose);
        let twist = if wants_odometry {
            let linear = self
                .velocity
                .linear_velocity(frame.camera_pose.translation(), frame.timestamp);
            Some((linear, angular_velocity(self.angular_rate)))
        } else {
            None
        };

        for topic in &mut self.topics {
            match (&topic.kind, &mut topic.payload) {
                (StreamKind::Depth, Payload::Image(p)) => p.update(depth_sample.clone()),
                (StreamKind::Confidence, Payload::Image(p)) => {
                    p.update(extract_confidence(frame.confidence.as_ref()));
                }
                (StreamKind::Color, Payload::Image(p)) => {
                    let sample = if self.color_scale >= 1.0 {
                        strip_alpha(
                            &frame.color,
                            frame.color_width,
                            frame.color_height,
                            frame.color_format,
                        )
                    } else {
                        downsample_color(
                            &frame.color,
                            frame.color_width,
                            frame.color_height,
                            frame.color_format,
                            self.color_scale,
                        )
                    };
                    p.update(sample);
                }
                (StreamKind::CameraInfo, Payload::CameraInfo(p)) => {
                    if let Some(cal) = calibration.clone() {
                        p.update(cal);
                    }
                }
                (StreamKind::Pose, Payload::TransformStamped(p)) => p.update(target),
                (StreamKind::Odometry, Payload::Odometry(p)) => {
                    p.update_pose(target);
                    if let Some((linear, angular)) = twist {
                        p.update_twist(linear, angular);
                    }
                }
                (kind, _) => debug!("Topic kind {:?} has mismatched payload, skipping", kind),
            }
        }

        for topic in &self.topics {
            let Some(body) = topic.payload.build(stamp) else {
                continue;
            };
            match Serializer::new(topic.format).serialize_publish(&topic.name, topic.ros_type(), &body)
            {
                Ok(bytes) => self.client.send(&bytes)?,
                Err(e) => {
                    // Drop this topic for the tick; the stream refreshes on
                    // the next accepted frame
                    error!("Serialization failed for {}: {}", topic.name, e);
                }
            }
        }

        Ok(())
    }
}

fn depth_output_dims(width: usize, height: usize, scale: f64) -> (usize, usize) {
    if scale >= 1.0 {
        (width, height)
    } else {
        ((width as f64 * scale) as usize, (height as f64 * scale) as usize)
    }
}
