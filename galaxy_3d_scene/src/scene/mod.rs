//! Scene management module
//!
//! Provides the scene object contract, the octree spatial index and the
//! octree scene manager with its far-object and dynamic-object lists.

mod scene_object;
mod scene_node;
mod octree_scene_node;
mod scene_manager;
mod octree_scene_manager;

#[cfg(test)]
pub(crate) mod test_object;

pub use scene_object::{SceneObject, SceneObjectKey};
pub use scene_node::{NodeId, SceneNode};
pub use octree_scene_node::{OctreeBox, OctreeSceneNode, OFFSET_VECTOR_TABLE};
pub use scene_manager::{ObjectFilter, SceneManager};
pub use octree_scene_manager::{OctreeSceneManager, OctreeSceneManagerConfig};
