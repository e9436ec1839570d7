//! GPU resource management for arview-rs.
//!
//! The render *passes* of the pipeline belong to the embedding
//! application's rendering engine; this crate owns only the GPU
//! resources the viewer core allocates and must release:
//! - [`RenderEngine`] — wgpu instance/adapter/device/queue (headless)
//! - [`GpuGeometry`] — uploaded vertex/index buffers with explicit
//!   destruction
//! - [`VideoTexture`] — a live-updating RGBA8 texture fed by decoded
//!   capture frames

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod buffer;
pub mod engine;
pub mod error;
pub mod texture;

pub use buffer::{upload_geometry, GpuGeometry, MeshVertex};
pub use engine::RenderEngine;
pub use error::{RenderError, RenderResult};
pub use texture::VideoTexture;
