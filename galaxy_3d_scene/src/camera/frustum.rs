/// Frustum: six clipping planes for visibility culling.
///
/// Planes are stored as `Vec4(A, B, C, D)` with a unit inward normal
/// `(A, B, C)`: a point is inside when `A*x + B*y + C*z + D >= 0` for all
/// six. `from_view_projection()` is provided for cameras that do not
/// compute their own.

use glam::{Mat4, Vec3, Vec4};
use crate::math::BoundingSphere;

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    /// Frustum planes: left, right, bottom, top, near, far
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Uses the Gribb & Hartmann method. Works for both perspective
    /// and orthographic projections.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let (r0, r1, r2, r3) = (vp.row(0), vp.row(1), vp.row(2), vp.row(3));
        let mut planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r3 + r2, r3 - r2];

        for plane in &mut planes {
            let normal_len = plane.truncate().length();
            if normal_len > 0.0 {
                *plane /= normal_len;
            }
        }

        Self { planes }
    }

    /// Test if a bounding sphere intersects this frustum.
    ///
    /// A sphere is rejected as soon as its center lies further than its
    /// radius behind any plane. Conservative: spheres near a frustum corner
    /// may be reported as intersecting although they are just outside.
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        self.planes.iter().all(|plane| plane.truncate().dot(sphere.center) + plane.w >= -sphere.radius)
    }

    /// Signed distance from `point` to one of the six planes
    /// (positive = inside half-space).
    pub fn plane_distance(&self, plane_index: usize, point: Vec3) -> f32 {
        let plane = self.planes[plane_index];
        plane.truncate().dot(point) + plane.w
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
