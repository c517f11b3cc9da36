//! SetuBridge - sensor-to-ROS bridge library
//!
//! Takes frames from an AR-style sensing stack (depth, confidence, color,
//! pose, intrinsics) and publishes them to a rosbridge-compatible broker
//! over plain TCP, throttled to a configurable rate, with coordinate
//! conventions mapped to REP-103.

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod frame;
pub mod geometry;
pub mod orchestrator;
pub mod payload;
pub mod source;
pub mod throttle;
pub mod transform;
pub mod wire;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
pub use frame::{Frame, FrameSource};
pub use orchestrator::Orchestrator;
