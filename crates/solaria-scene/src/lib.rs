//! Scene graph: hierarchical nodes with local transforms, per-node animators
//! and materials, and the per-frame pre-render registration pass.

mod animator;
mod graph;
mod material;
mod transform;

pub use animator::{Animator, RotationAnimator};
pub use graph::{MeshKey, NodeId, SceneError, SceneGraph, SceneNode};
pub use material::{Material, MaterialType};
pub use transform::Transform;
