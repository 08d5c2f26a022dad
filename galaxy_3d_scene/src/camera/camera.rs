/// Camera: low-level passive data container.
///
/// The scene layer never drives cameras: the caller (game code) computes
/// the view and projection matrices and hands them over. The camera only
/// keeps the derived data the scene layer reads every frame: the frustum
/// and the eye position.

use glam::{Mat4, Vec3};
use super::frustum::Frustum;

/// Low-level camera consumed read-only by scene managers and passes.
#[derive(Debug, Clone)]
pub struct Camera {
    view_matrix: Mat4,
    projection_matrix: Mat4,
    inverse_view_matrix: Mat4,
    frustum: Frustum,
}

impl Camera {
    /// Create a camera, extracting the frustum from `projection * view`.
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        let frustum = Frustum::from_view_projection(&(projection * view));
        Self::with_frustum(view, projection, frustum)
    }

    /// Create a camera with a caller-computed frustum.
    pub fn with_frustum(view: Mat4, projection: Mat4, frustum: Frustum) -> Self {
        Self {
            view_matrix: view,
            projection_matrix: projection,
            inverse_view_matrix: view.inverse(),
            frustum,
        }
    }

    // ===== GETTERS =====

    /// View matrix (inverse of the camera's world transform).
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// Projection matrix (perspective or orthographic).
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Inverse view matrix (the camera's world transform).
    pub fn inverse_view_matrix(&self) -> &Mat4 {
        &self.inverse_view_matrix
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// Frustum planes for culling.
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// World-space eye position, the translation of the inverse view matrix.
    pub fn eye_position(&self) -> Vec3 {
        self.inverse_view_matrix.col(3).truncate()
    }

    // ===== SETTERS =====

    /// Set the view matrix. The frustum is recomputed.
    pub fn set_view(&mut self, matrix: Mat4) {
        self.view_matrix = matrix;
        self.inverse_view_matrix = matrix.inverse();
        self.frustum = Frustum::from_view_projection(&self.view_projection_matrix());
    }

    /// Set the projection matrix. The frustum is recomputed.
    pub fn set_projection(&mut self, matrix: Mat4) {
        self.projection_matrix = matrix;
        self.frustum = Frustum::from_view_projection(&self.view_projection_matrix());
    }

    /// Override the frustum (e.g. a tighter frustum for a shadow split).
    pub fn set_frustum(&mut self, frustum: Frustum) {
        self.frustum = frustum;
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
