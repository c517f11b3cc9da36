//! Configuration for the SetuBridge daemon
//!
//! Loads configuration from TOML file: broker endpoint, publish rate,
//! per-topic enablement and wire format, downsample scales.

use crate::error::Result;
use crate::wire::WireFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub bridge: BridgeConfig,
    pub publish: PublishConfig,
    pub topics: TopicsConfig,
    pub logging: LoggingConfig,
}

/// Broker connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeConfig {
    /// Hostname or IP of the machine running the rosbridge server
    pub host: String,
    /// Broker port (rosbridge convention is 9090)
    pub port: u16,
}

/// Publishing rate and downsampling configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublishConfig {
    /// Target publish frequency in Hz. Values below 1 are clamped to 1.
    pub target_fps: u32,
    /// Uniform downsample factor for the depth topic (1.0 = full size)
    pub depth_scale: f64,
    /// Uniform downsample factor for the color topic (1.0 = full size)
    pub color_scale: f64,
}

impl PublishConfig {
    /// Target frequency with the >= 1 Hz clamp applied.
    pub fn target_fps(&self) -> u32 {
        self.target_fps.max(1)
    }

    /// Minimum interval between published frames, in seconds.
    pub fn interval(&self) -> f64 {
        1.0 / f64::from(self.target_fps())
    }
}

/// Per-topic enablement and wire format.
///
/// Declaration order here is the transmission order contract: depth,
/// confidence, color, camera_info, pose, odometry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TopicsConfig {
    pub depth: TopicConfig,
    pub confidence: TopicConfig,
    pub color: TopicConfig,
    pub camera_info: TopicConfig,
    pub pose: TopicConfig,
    pub odometry: TopicConfig,
}

/// Single topic configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TopicConfig {
    /// Whether this stream is published at all
    pub enabled: bool,
    /// Topic name on the broker
    pub name: String,
    /// Wire format for publish messages on this topic.
    ///
    /// Defaults to JSON. The binary leg must be validated against the
    /// target broker before enabling it per topic.
    #[serde(default)]
    pub format: WireFormat,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Default configuration for an ARKit-style frame source.
    ///
    /// Suitable for testing and development. Production deployments
    /// should use a proper TOML configuration file.
    pub fn arkit_defaults() -> Self {
        Self {
            bridge: BridgeConfig {
                host: "127.0.0.1".to_string(),
                port: 9090,
            },
            publish: PublishConfig {
                target_fps: 10,
                depth_scale: 1.0,
                color_scale: 0.25,
            },
            topics: TopicsConfig {
                depth: TopicConfig {
                    enabled: true,
                    name: "/arkit/depth/image_raw".to_string(),
                    format: WireFormat::Json,
                },
                confidence: TopicConfig {
                    enabled: true,
                    name: "/arkit/depth/confidence".to_string(),
                    format: WireFormat::Json,
                },
                color: TopicConfig {
                    enabled: true,
                    name: "/arkit/color/image_raw".to_string(),
                    format: WireFormat::Json,
                },
                camera_info: TopicConfig {
                    enabled: true,
                    name: "/arkit/depth/camera_info".to_string(),
                    format: WireFormat::Json,
                },
                pose: TopicConfig {
                    enabled: true,
                    name: "/arkit/pose".to_string(),
                    format: WireFormat::Json,
                },
                odometry: TopicConfig {
                    enabled: true,
                    name: "/arkit/odom".to_string(),
                    format: WireFormat::Json,
                },
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::arkit_defaults()
    }
}
