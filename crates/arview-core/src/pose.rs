//! Camera pose and pointer-ray math.

use glam::{Mat3, Quat, Vec2, Vec3};

/// A camera pose read each frame from the external camera rig.
///
/// Read-only input to the background surface and the placement resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// World-space camera position.
    pub position: Vec3,
    /// World-space camera orientation. Identity looks down -Z with +Y up.
    pub orientation: Quat,
}

impl CameraPose {
    /// Creates a pose from position and orientation.
    #[must_use]
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation: orientation.normalize(),
        }
    }

    /// Creates a pose at `position` looking at `target`.
    #[must_use]
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - position).normalize();
        let right = forward.cross(up).normalize();
        let true_up = right.cross(forward);
        // Columns map camera axes (+X right, +Y up, -Z forward) to world.
        let rotation = Mat3::from_cols(right, true_up, -forward);
        Self {
            position,
            orientation: Quat::from_mat3(&rotation).normalize(),
        }
    }

    /// The camera's forward (view) direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    /// The camera's right direction.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    /// The camera's up direction.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

/// A world-space ray.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin.
    pub origin: Vec3,
    /// Normalized ray direction.
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray, normalizing the direction.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// The point at parameter `t` along the ray.
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Builds the world-space ray through a pointer position given in
/// normalized device coordinates (x and y in `[-1, 1]`, `(0, 0)` at the
/// viewport center, +y up).
#[must_use]
pub fn ray_through_ndc(pose: &CameraPose, fov_y_degrees: f32, aspect_ratio: f32, ndc: Vec2) -> Ray {
    let tan_half_fov = (fov_y_degrees.to_radians() * 0.5).tan();
    let direction = pose.forward()
        + pose.right() * (ndc.x * tan_half_fov * aspect_ratio)
        + pose.up() * (ndc.y * tan_half_fov);
    Ray::new(pose.position, direction)
}
