//! # User Interface Module
//!
//! ImGui integration for the viewer: the wgpu/winit plumbing in
//! [`UiManager`] and the searchable catalog panel in [`CatalogPanel`].

pub mod manager;
pub mod panel;

pub use manager::UiManager;
pub use panel::{CatalogPanel, LoadStatus};
