//! # Rendering Module
//!
//! The wgpu render engine, pipeline management, and the model shader.

pub mod pipeline_manager;
pub mod render_engine;

pub use render_engine::RenderEngine;
