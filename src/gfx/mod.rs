//! # Graphics Module
//!
//! All rendering-related functionality for the viewer: the orbit camera
//! system, the wgpu render engine and pipeline handling, scene state with
//! the single-model slot, and material/uniform resources.

pub mod camera;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
