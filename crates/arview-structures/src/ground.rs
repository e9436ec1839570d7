//! The shadow-receiving virtual ground plane.
//!
//! A fixed plane standing in for a detected surface; no environmental
//! sensing is involved.

use glam::{Mat4, Quat, Vec3};

/// A horizontal plane at the origin that receives shadows and renders
/// nothing else.
#[derive(Debug, Clone)]
pub struct GroundPlane {
    size: f32,
    shadow_opacity: f32,
}

impl GroundPlane {
    /// Shadow darkness used by the surface-anchored variant.
    pub const DEFAULT_SHADOW_OPACITY: f32 = 0.7;

    /// Creates a ground plane sized so the camera can never orbit past
    /// its edge: `size = max(configured, max_orbit_distance * 2)`.
    #[must_use]
    pub fn sized_for_orbit(configured_size: f32, max_orbit_distance: f32) -> Self {
        Self {
            size: configured_size.max(max_orbit_distance * 2.0),
            shadow_opacity: Self::DEFAULT_SHADOW_OPACITY,
        }
    }

    /// Side length of the plane.
    #[must_use]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Opacity of received shadows.
    #[must_use]
    pub fn shadow_opacity(&self) -> f32 {
        self.shadow_opacity
    }

    /// The plane's transform: rotated from its local XY plane to lie
    /// flat in XZ.
    #[must_use]
    pub fn transform(&self) -> Mat4 {
        Mat4::from_quat(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2))
    }

    /// The plane's world-space normal.
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        Vec3::Y
    }
}
