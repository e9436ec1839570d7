//! The invisible pointer-event surface.

use glam::Vec3;

use arview_core::config::InteractionConfig;
use arview_core::pose::Ray;

/// A finite plane in XY at the origin whose only purpose is to receive
/// pointer rays. Never rendered.
#[derive(Debug, Clone)]
pub struct InteractionPlane {
    half_width: f32,
    half_height: f32,
}

impl InteractionPlane {
    /// Creates the plane from its configuration.
    #[must_use]
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            half_width: config.plane_width * 0.5,
            half_height: config.plane_height * 0.5,
        }
    }

    /// Full extent of the plane.
    #[must_use]
    pub fn extent(&self) -> (f32, f32) {
        (self.half_width * 2.0, self.half_height * 2.0)
    }

    /// Intersects a ray with the plane quad.
    ///
    /// Returns the hit point, or `None` when the ray is parallel, points
    /// away, or lands outside the finite extent.
    #[must_use]
    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        let normal = Vec3::Z;
        let denom = normal.dot(ray.direction);
        if denom.abs() < 1e-6 {
            return None;
        }

        let t = -ray.origin.dot(normal) / denom;
        if t < 0.0 {
            return None;
        }

        let hit = ray.at(t);
        if hit.x.abs() <= self.half_width && hit.y.abs() <= self.half_height {
            Some(hit)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane() -> InteractionPlane {
        InteractionPlane::new(&InteractionConfig::default())
    }

    #[test]
    fn test_head_on_ray_hits_center() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let hit = plane().intersect(&ray).expect("hit");
        assert!((hit - Vec3::ZERO).length() < 1e-6);
    }

    #[test]
    fn test_parallel_ray_misses() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::X);
        assert!(plane().intersect(&ray).is_none());
    }

    #[test]
    fn test_ray_pointing_away_misses() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(plane().intersect(&ray).is_none());
    }

    #[test]
    fn test_finite_extent_bounds_hits() {
        // Past the 200x200 extent on x.
        let ray = Ray::new(Vec3::new(150.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(plane().intersect(&ray).is_none());

        let ray = Ray::new(Vec3::new(99.0, -99.0, 5.0), Vec3::NEG_Z);
        assert!(plane().intersect(&ray).is_some());
    }
}
