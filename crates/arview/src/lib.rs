//! arview-rs: a markerless AR viewer core.
//!
//! Composites a live camera feed behind a rendered 3D scene and lets a
//! caller auto-place an animated asset, anchor it to a virtual ground
//! surface, or place it interactively by pointing at the live view.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use arview::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     let assets = BundleCache::new(Arc::new(GltfAssetSource::new()));
//!     let mut capture = SyntheticCaptureBackend::new(CapturePolicy::Allow);
//!
//!     let config = ViewerConfig::for_variant("models/fox.glb", ViewerVariant::Animated);
//!     let mut viewer = SceneViewer::mount(
//!         ViewerVariant::Animated,
//!         config,
//!         &assets,
//!         Some(&mut capture),
//!     )?;
//!
//!     // Once per render frame, with the pose from your camera rig:
//!     let pose = CameraPose::look_at(Vec3::new(0.0, 1.5, 5.0), Vec3::ZERO, Vec3::Y);
//!     viewer.advance(1.0 / 60.0, &pose);
//!
//!     viewer.unmount();
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Each mounted [`SceneViewer`] owns its render subgraph:
//!
//! - [`VideoBackgroundSurface`] keeps a video quad a fixed distance in
//!   front of the viewing camera every frame
//! - [`AssetInstance`] wraps a *clone* of the shared [`AssetBundle`]
//!   so simultaneous instances never share transform or disposal state
//! - [`PlacementResolver`] turns pointer-down events into world-space
//!   placements by ray casting against an invisible interaction plane
//!
//! The rendering engine itself (passes, shaders, window) belongs to the
//! embedding application; the viewer only allocates, streams, and
//! releases the GPU resources behind an optional [`RenderEngine`].

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod placement;
pub mod sources;
pub mod viewer;

// Re-export core types
pub use arview_core::{
    ArViewError, AssetBundle, AssetSource, BackgroundConfig, BundleCache, CameraConfig,
    CameraPose, CaptureBackend, CaptureHandle, ControlsConfig, InteractionConfig, LightingConfig,
    MediaStream, ModelConfig, Ray, Result, VideoFrame, ViewerConfig, ViewerVariant,
};

// Re-export render types
pub use arview_render::{RenderEngine, VideoTexture};

// Re-export structures
pub use arview_structures::{
    AssetInstance, BackgroundStage, DisposalStats, GltfAssetSource, GroundPlane,
    InteractionPlane, LightingRig, VideoBackgroundSurface,
};

pub use placement::{PlacementResolver, PlacementState};
pub use sources::{CapturePolicy, StillImageBackend, SyntheticCaptureBackend};
pub use viewer::SceneViewer;

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

/// Installs the default `env_logger` backend.
///
/// Embedding applications that configure their own logger can skip this;
/// repeated calls are harmless.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
