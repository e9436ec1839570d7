//! Scene structures for arview-rs.
//!
//! The concrete objects a viewer composes into its render graph:
//! - [`VideoBackgroundSurface`] — the camera-facing live-video quad
//! - [`AssetInstance`] — one placed, animated copy of an asset bundle
//! - [`GroundPlane`] — the shadow-receiving virtual ground
//! - [`InteractionPlane`] — the invisible pointer-event surface
//! - [`LightingRig`] — ambient + directional key light
//! - [`GltfAssetSource`] — the built-in glTF asset source

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod asset_instance;
pub mod background;
pub mod gltf_source;
pub mod ground;
pub mod interaction;
pub mod lighting;
pub mod mesh;

pub use asset_instance::{AssetInstance, DisposalStats};
pub use background::{BackgroundStage, VideoBackgroundSurface};
pub use gltf_source::GltfAssetSource;
pub use ground::GroundPlane;
pub use interaction::InteractionPlane;
pub use lighting::{DirectionalLight, LightingRig};
pub use mesh::{InstanceGeometry, Material, MaterialSlot, MeshNode};
