//! Core abstractions for arview-rs.
//!
//! This crate provides the engine-independent foundation of the viewer:
//! - Error taxonomy ([`ArViewError`]) and `Result` alias
//! - Per-viewer configuration structs with documented defaults
//! - Camera pose and pointer-ray math
//! - The capture contract: [`CaptureBackend`], [`MediaStream`],
//!   [`CaptureHandle`]
//! - The asset contract: [`AssetBundle`], [`AssetSource`], and the
//!   path-keyed [`BundleCache`]
//! - Animation clip data and playback actions

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Config structs legitimately have many boolean flags
#![allow(clippy::struct_excessive_bools)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod animation;
pub mod asset;
pub mod capture;
pub mod config;
pub mod error;
pub mod pose;

pub use animation::{AnimationChannel, AnimationClip, ChannelOutput, ClipAction, NodePose};
pub use asset::{
    AssetBundle, AssetSource, BundleCache, BundleNode, GeometryData, LoadTicket, MaterialBinding,
    MaterialSpec, MeshPrototype,
};
pub use capture::{deliver_or_release, CaptureBackend, CaptureHandle, CaptureTicket, MediaStream, VideoFrame};
pub use config::{
    BackgroundConfig, CameraConfig, ControlsConfig, InteractionConfig, LightingConfig, ModelConfig,
    ViewerConfig, ViewerVariant,
};
pub use error::{ArViewError, Result};
pub use pose::{ray_through_ndc, CameraPose, Ray};

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
