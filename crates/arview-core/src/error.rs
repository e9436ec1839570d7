//! Error types for arview-rs.

use thiserror::Error;

/// The main error type for arview-rs operations.
#[derive(Error, Debug)]
pub enum ArViewError {
    /// The user denied access to the capture device.
    ///
    /// Terminal but local: the affected viewer omits its video background
    /// and keeps rendering the 3D content.
    #[error("camera capture permission denied")]
    CapturePermissionDenied,

    /// No usable capture device, or the device failed to start its stream.
    #[error("capture device unavailable: {0}")]
    CaptureDeviceUnavailable(String),

    /// An asset bundle could not be loaded. Surfaced to the caller because
    /// without geometry there is nothing meaningful to render.
    #[error("failed to load asset '{path}': {reason}")]
    AssetLoadFailure {
        /// Path of the asset that failed to load.
        path: String,
        /// Human-readable failure description.
        reason: String,
    },

    /// A requested animation clip index is out of range for its bundle.
    ///
    /// Recovered locally by falling back to clip 0 plus a logged warning;
    /// never surfaced as a failure.
    #[error("animation clip index {requested} out of range (bundle has {available} clips)")]
    AnimationClipIndexInvalid {
        /// The clip index that was requested.
        requested: usize,
        /// Number of clips the bundle actually holds.
        available: usize,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for arview-rs operations.
pub type Result<T> = std::result::Result<T, ArViewError>;
