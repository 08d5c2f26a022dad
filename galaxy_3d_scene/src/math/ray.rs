/// Picking ray: origin + direction.

use glam::Vec3;
use super::BoundingSphere;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Direction (normalized by `Ray::new`)
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray. A zero direction is kept as-is (such a ray only hits
    /// spheres that contain its origin).
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Distance along the ray to the first hit with `sphere`, if any.
    ///
    /// Returns `Some(0.0)` when the origin is inside the sphere.
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> Option<f32> {
        let to_center = sphere.center - self.origin;
        let radius_sq = sphere.radius * sphere.radius;
        let dist_sq = to_center.length_squared();

        if dist_sq <= radius_sq {
            return Some(0.0);
        }

        let along = to_center.dot(self.direction);
        if along < 0.0 {
            // Sphere is behind the origin
            return None;
        }

        let perpendicular_sq = dist_sq - along * along;
        if perpendicular_sq > radius_sq {
            return None;
        }

        Some(along - (radius_sq - perpendicular_sq).sqrt())
    }
}
