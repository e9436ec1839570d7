//! Scene lighting configured per viewer.

use glam::Vec3;

use arview_core::config::LightingConfig;

/// The directional key light.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    /// World-space position the light shines from (toward the origin).
    pub position: Vec3,
    /// Light intensity.
    pub intensity: f32,
    /// Whether the light casts shadows.
    pub cast_shadow: bool,
}

impl DirectionalLight {
    /// Direction of the light's rays.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        (-self.position).normalize_or_zero()
    }
}

/// One ambient term plus one directional key light, resolved once from
/// the viewer configuration.
#[derive(Debug, Clone, Copy)]
pub struct LightingRig {
    /// Ambient light intensity.
    pub ambient_intensity: f32,
    /// The key light.
    pub key_light: DirectionalLight,
}

impl LightingRig {
    /// Builds the rig from a viewer's lighting configuration.
    #[must_use]
    pub fn from_config(config: &LightingConfig) -> Self {
        Self {
            ambient_intensity: config.ambient_intensity,
            key_light: DirectionalLight {
                position: config.directional_position,
                intensity: config.directional_intensity,
                cast_shadow: false,
            },
        }
    }

    /// Enables shadow casting on the key light (surface-anchored
    /// variant).
    pub fn enable_shadows(&mut self) {
        self.key_light.cast_shadow = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rig_mirrors_config() {
        let rig = LightingRig::from_config(&LightingConfig::default());
        assert_eq!(rig.ambient_intensity, 0.6);
        assert_eq!(rig.key_light.position, Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(rig.key_light.intensity, 1.0);
        assert!(!rig.key_light.cast_shadow);
    }

    #[test]
    fn test_shadow_enable() {
        let mut rig = LightingRig::from_config(&LightingConfig::default());
        rig.enable_shadows();
        assert!(rig.key_light.cast_shadow);
    }

    #[test]
    fn test_light_direction_points_at_origin() {
        let rig = LightingRig::from_config(&LightingConfig::default());
        let dir = rig.key_light.direction();
        assert!((dir - (-Vec3::new(2.0, 2.0, 2.0).normalize())).length() < 1e-6);
    }
}
