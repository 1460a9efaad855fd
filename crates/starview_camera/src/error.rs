//! Camera core error types

use crate::pose::CameraPose;
use thiserror::Error;

/// Errors raised while building or configuring the camera core
///
/// Steady-state camera operations never fail; only configuration
/// loading and construction return these.
#[derive(Error, Debug)]
pub enum CameraError {
    /// Config file could not be read
    #[error("Failed to read camera config: {0}")]
    Io(#[from] std::io::Error),

    /// Config text is not valid TOML for [`CameraConfig`](crate::CameraConfig)
    #[error("Failed to parse camera config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be written back out
    #[error("Failed to serialize camera config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A tuning value is out of range
    #[error("Invalid camera config: {0}")]
    InvalidConfig(String),

    /// The store holds a pose with non-finite components
    #[error("Invalid initial camera pose: {0:?}")]
    InvalidPose(CameraPose),
}

/// Result type for camera core operations
pub type Result<T> = std::result::Result<T, CameraError>;
