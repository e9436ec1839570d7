//! Rendering error types.

use thiserror::Error;

/// Errors that can occur while managing GPU resources.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create a wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create a wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// A texture upload did not match the texture's dimensions.
    #[error("texture upload mismatch: {0}")]
    TextureUploadMismatch(String),
}

/// A specialized Result type for GPU resource operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
