//! # Resource Management
//!
//! Materials, global uniforms (camera + light rig), and texture helpers.

pub mod global_bindings;
pub mod material;
pub mod texture_resource;

pub use global_bindings::{GlobalBindings, GlobalUBO, LightRig};
pub use material::{Material, MaterialManager};
pub use texture_resource::TextureResource;
