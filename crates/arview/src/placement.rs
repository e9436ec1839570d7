//! Pointer-to-world placement.

use glam::{Vec2, Vec3};

use arview_core::config::{CameraConfig, InteractionConfig};
use arview_core::pose::{ray_through_ndc, CameraPose};
use arview_structures::InteractionPlane;

/// The current placement: an optional world-space point.
///
/// Starts unset; each successful resolve overwrites it. There is no
/// history and no undo.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlacementState {
    point: Option<Vec3>,
}

impl PlacementState {
    /// The placed point, if any.
    #[must_use]
    pub fn point(&self) -> Option<Vec3> {
        self.point
    }

    /// Overwrites the placement.
    pub fn set(&mut self, point: Vec3) {
        self.point = Some(point);
    }
}

/// Converts pointer events into world-space placement points.
///
/// A ray is cast from the camera through the pointer's normalized device
/// coordinates; if it strikes the invisible interaction plane, the point
/// `placement_distance` along the ray becomes the new placement. Rays
/// that miss the finite plane change nothing.
#[derive(Debug)]
pub struct PlacementResolver {
    plane: InteractionPlane,
    placement_distance: f32,
    fov_y_degrees: f32,
    state: PlacementState,
}

impl PlacementResolver {
    /// Creates a resolver from the viewer's interaction and camera
    /// configuration.
    #[must_use]
    pub fn new(interaction: &InteractionConfig, camera: &CameraConfig) -> Self {
        Self {
            plane: InteractionPlane::new(interaction),
            placement_distance: interaction.placement_distance,
            fov_y_degrees: camera.fov_degrees,
            state: PlacementState::default(),
        }
    }

    /// Distance along the ray at which placements land.
    #[must_use]
    pub fn placement_distance(&self) -> f32 {
        self.placement_distance
    }

    /// The current placement.
    #[must_use]
    pub fn placement(&self) -> Option<Vec3> {
        self.state.point()
    }

    /// Resolves one pointer-down event.
    ///
    /// Returns the new placement point, or `None` (state untouched) when
    /// the pointer ray misses the interaction plane.
    pub fn resolve(&mut self, ndc: Vec2, pose: &CameraPose, aspect_ratio: f32) -> Option<Vec3> {
        let ray = ray_through_ndc(pose, self.fov_y_degrees, aspect_ratio, ndc);
        self.plane.intersect(&ray)?;

        let point = ray.at(self.placement_distance);
        self.state.set(point);
        Some(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PlacementResolver {
        PlacementResolver::new(&InteractionConfig::default(), &CameraConfig::default())
    }

    /// Camera in front of the interaction plane, looking at its center.
    fn facing_pose() -> CameraPose {
        CameraPose::look_at(glam::Vec3::new(0.0, 1.5, 5.0), Vec3::ZERO, Vec3::Y)
    }

    #[test]
    fn test_center_ray_places_along_camera_forward() {
        let mut resolver = resolver();
        let pose = facing_pose();
        let point = resolver.resolve(Vec2::ZERO, &pose, 16.0 / 9.0).expect("hit");
        let expected = pose.position + pose.forward() * 2.0;
        assert!((point - expected).length() < 1e-5);
        assert_eq!(resolver.placement(), Some(point));
    }

    #[test]
    fn test_miss_leaves_placement_unchanged() {
        let mut resolver = resolver();
        let pose = facing_pose();
        let first = resolver.resolve(Vec2::ZERO, &pose, 16.0 / 9.0).expect("hit");

        // Turn the camera away from the plane; the ray cannot hit.
        let away = CameraPose::look_at(
            Vec3::new(0.0, 1.5, 5.0),
            Vec3::new(0.0, 1.5, 50.0),
            Vec3::Y,
        );
        assert!(resolver.resolve(Vec2::ZERO, &away, 16.0 / 9.0).is_none());
        assert_eq!(resolver.placement(), Some(first));
    }

    #[test]
    fn test_second_hit_overwrites_first() {
        let mut resolver = resolver();
        let pose = facing_pose();
        let first = resolver.resolve(Vec2::ZERO, &pose, 16.0 / 9.0).expect("hit");
        let second = resolver
            .resolve(Vec2::new(0.3, -0.2), &pose, 16.0 / 9.0)
            .expect("hit");
        assert_ne!(first, second);
        assert_eq!(resolver.placement(), Some(second));
    }

    #[test]
    fn test_placement_state_starts_unset() {
        assert!(resolver().placement().is_none());
    }
}
