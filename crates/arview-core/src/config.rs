//! Per-viewer configuration.
//!
//! Every option is enumerated with a documented default and resolved once
//! when the viewer is constructed; nothing here is mutated implicitly
//! afterwards.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The composition variant a viewer is mounted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewerVariant {
    /// One asset instance at a fixed configured position.
    #[default]
    Static,
    /// Like `Static`, but the bundle must carry at least one animation
    /// clip and one is always played.
    Animated,
    /// Adds a shadow-receiving ground plane sized to the orbit bounds and
    /// a shadow-casting key light.
    SurfaceAnchored,
    /// No instance until a pointer placement resolves; each new placement
    /// replaces (and disposes) the previous instance.
    Interactive,
}

/// Viewing camera intrinsics handed to the external camera rig.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial world-space camera position.
    pub position: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.5, 5.0),
            fov_degrees: 50.0,
            near: 0.1,
            far: 2000.0,
        }
    }
}

/// Scene lighting: one ambient term plus one directional key light.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Ambient light intensity.
    pub ambient_intensity: f32,
    /// World-space position of the directional key light.
    pub directional_position: Vec3,
    /// Intensity of the directional key light.
    pub directional_intensity: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_intensity: 0.6,
            directional_position: Vec3::new(2.0, 2.0, 2.0),
            directional_intensity: 1.0,
        }
    }
}

/// The asset to display and how to place and play it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Asset path; an opaque identifier resolved by the asset source.
    pub path: String,
    /// Uniform scale applied to the instance.
    pub scale: f32,
    /// World-space position for non-interactive variants.
    pub position: Vec3,
    /// Animation clip index to play (animated variants).
    pub clip_index: usize,
    /// Fade-in duration for the selected clip, in seconds.
    pub fade_in_seconds: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            scale: 1.5,
            position: Vec3::new(0.0, -1.0, 1.0),
            clip_index: 0,
            fade_in_seconds: 0.5,
        }
    }
}

/// Orbit-style interaction bounds consumed by the external camera rig.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Whether zooming is enabled.
    pub enable_zoom: bool,
    /// Zoom speed multiplier.
    pub zoom_speed: f32,
    /// Whether panning is enabled.
    pub enable_pan: bool,
    /// Whether rotation is enabled.
    pub enable_rotate: bool,
    /// Minimum orbit distance, if bounded.
    pub min_distance: Option<f32>,
    /// Maximum orbit distance, if bounded.
    pub max_distance: Option<f32>,
}

impl ControlsConfig {
    /// Fallback orbit bound used when `max_distance` is unset (ground
    /// plane sizing needs a finite extent).
    pub const DEFAULT_MAX_ORBIT: f32 = 100.0;

    /// The maximum orbit distance, falling back to
    /// [`Self::DEFAULT_MAX_ORBIT`].
    #[must_use]
    pub fn max_orbit_distance(&self) -> f32 {
        self.max_distance.unwrap_or(Self::DEFAULT_MAX_ORBIT)
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_zoom: true,
            zoom_speed: 0.8,
            enable_pan: false,
            enable_rotate: true,
            min_distance: None,
            max_distance: None,
        }
    }
}

/// Video background quad configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Whether the camera-feed background is enabled.
    pub enabled: bool,
    /// Side length of the (square) background plane.
    pub plane_size: f32,
    /// Distance the plane is kept in front of the viewing camera.
    pub plane_distance: f32,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            plane_size: 20.0,
            plane_distance: 10.0,
        }
    }
}

/// Pointer interaction surface (interactive variant only).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Width of the invisible interaction plane.
    pub plane_width: f32,
    /// Height of the invisible interaction plane.
    pub plane_height: f32,
    /// Distance along the pointer ray at which placements land.
    pub placement_distance: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            plane_width: 200.0,
            plane_height: 200.0,
            placement_distance: 2.0,
        }
    }
}

/// Complete configuration for one viewer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Camera intrinsics.
    #[serde(default)]
    pub camera: CameraConfig,
    /// Lighting rig.
    #[serde(default)]
    pub lighting: LightingConfig,
    /// Asset selection and placement.
    #[serde(default)]
    pub model: ModelConfig,
    /// Orbit interaction bounds.
    #[serde(default)]
    pub controls: ControlsConfig,
    /// Video background.
    #[serde(default)]
    pub background: BackgroundConfig,
    /// Pointer interaction surface.
    #[serde(default)]
    pub interaction: InteractionConfig,
}

impl ViewerConfig {
    /// Creates a configuration with every field at its default for the
    /// given asset path.
    pub fn new(model_path: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.model.path = model_path.into();
        config
    }

    /// Creates a configuration with variant-specific defaults applied.
    ///
    /// The interactive variant brightens the ambient term; the
    /// surface-anchored variant extends the far clip and bounds the orbit
    /// so the ground plane gets a finite extent.
    pub fn for_variant(model_path: impl Into<String>, variant: ViewerVariant) -> Self {
        let mut config = Self::new(model_path);
        match variant {
            ViewerVariant::Interactive => {
                config.lighting.ambient_intensity = 0.7;
            }
            ViewerVariant::SurfaceAnchored => {
                config.camera.far = 10_000.0;
                config.controls.max_distance = Some(100.0);
            }
            ViewerVariant::Static | ViewerVariant::Animated => {}
        }
        config
    }

    /// Parses a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes this configuration to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
