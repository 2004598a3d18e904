//! # Scene Management Module
//!
//! Holds the viewer's scene state: the camera manager, the material library,
//! and the single currently loaded model. Unlike a general scene graph there
//! is deliberately room for exactly one model; swapping in a new one drops
//! the previous model and its GPU buffers.

pub mod model;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use model::{Aabb, DrawMesh, Mesh, Model};
pub use scene::Scene;
pub use vertex::Vertex3D;
