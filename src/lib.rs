// src/lib.rs
//! Gander 3D Model Viewer
//!
//! A native model viewer built on wgpu and winit. It discovers OBJ/MTL pairs
//! from an HTTP directory listing, loads them in the background, and renders
//! the selected model with an orbit camera and a fixed light rig.

pub mod app;
pub mod catalog;
pub mod gfx;
pub mod loader;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::GanderApp;
pub use catalog::CatalogEntry;

/// Creates a viewer pointed at the default asset endpoint
pub fn default() -> GanderApp {
    pollster::block_on(GanderApp::new(app::DEFAULT_ASSETS_URL))
}
