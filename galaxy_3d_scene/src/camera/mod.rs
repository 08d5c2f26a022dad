//! Camera module: camera and view frustum.
//!
//! Passive data consumed read-only by the scene layer: the frustum drives
//! visibility culling, the inverse view matrix gives the eye position
//! used for level-of-detail selection.

mod camera;
mod frustum;

pub use camera::Camera;
pub use frustum::{
    Frustum,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
