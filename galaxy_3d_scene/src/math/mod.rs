//! Bounding volume primitives.
//!
//! Small value types with the intersection and distance tests the scene
//! layer needs for culling and picking.

mod bounding_sphere;
mod ray;

pub use bounding_sphere::BoundingSphere;
pub use ray::Ray;
