/// Bounding sphere (center + radius).
///
/// Conservative approximation of the space an object (or an octree node)
/// occupies. Used for frustum rejection, ray picking and LOD selection.

use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingSphere {
    /// World-space center
    pub center: Vec3,
    /// Radius (>= 0)
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Test if two spheres overlap or touch.
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) <= reach * reach
    }

    /// Test if a point lies inside (or on) the sphere.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }

    /// Squared distance between `point` and the sphere center.
    pub fn distance_squared(&self, point: Vec3) -> f32 {
        self.center.distance_squared(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersects_overlapping_and_touching() {
        let a = BoundingSphere::new(Vec3::ZERO, 1.0);
        let b = BoundingSphere::new(Vec3::new(1.5, 0.0, 0.0), 1.0);
        let touching = BoundingSphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0);
        let far = BoundingSphere::new(Vec3::new(5.0, 0.0, 0.0), 1.0);

        assert!(a.intersects(&b));
        assert!(a.intersects(&touching));
        assert!(!a.intersects(&far));
    }

    #[test]
    fn test_contains_point() {
        let s = BoundingSphere::new(Vec3::new(1.0, 1.0, 1.0), 2.0);
        assert!(s.contains_point(Vec3::new(2.0, 1.0, 1.0)));
        assert!(!s.contains_point(Vec3::new(4.0, 1.0, 1.0)));
    }

    #[test]
    fn test_distance_squared() {
        let s = BoundingSphere::new(Vec3::new(3.0, 0.0, 0.0), 1.0);
        assert_eq!(s.distance_squared(Vec3::new(0.0, 4.0, 0.0)), 25.0);
    }
}
