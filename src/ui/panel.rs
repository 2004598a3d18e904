// src/ui/panel.rs
//! Catalog panel for the viewer
//!
//! A searchable model picker: a filter field over the discovered catalog,
//! a selectable entry list, a load action, and a status line that follows
//! the load state machine. The search behavior is built in at startup, not
//! resolved at runtime.

use crate::catalog::CatalogEntry;
use crate::loader::LoadPhase;

/// What the status line reports about the current/last load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading(LoadPhase),
    Ready(String),
    Failed(String),
}

impl LoadStatus {
    pub fn in_flight(&self) -> bool {
        matches!(self, LoadStatus::Loading(_))
    }
}

/// Searchable catalog picker drawn as an ImGui window.
pub struct CatalogPanel {
    entries: Vec<CatalogEntry>,
    filter: String,
    selected: Option<usize>,
    scanning: bool,
    status: LoadStatus,
    requested: Option<CatalogEntry>,
}

impl CatalogPanel {
    /// Creates the panel in its scanning state; entries arrive once the
    /// background discovery finishes.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            filter: String::new(),
            selected: None,
            scanning: true,
            status: LoadStatus::Idle,
            requested: None,
        }
    }

    /// Installs the discovered catalog and leaves the scanning state.
    pub fn set_entries(&mut self, entries: Vec<CatalogEntry>) {
        self.entries = entries;
        self.selected = None;
        self.scanning = false;
    }

    pub fn set_status(&mut self, status: LoadStatus) {
        self.status = status;
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// Takes the load request made through the panel this frame, if any.
    pub fn take_request(&mut self) -> Option<CatalogEntry> {
        self.requested.take()
    }

    /// Entry indices matching the current filter, case-insensitively.
    fn filtered_indices(&self) -> Vec<usize> {
        let needle = self.filter.to_lowercase();
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| needle.is_empty() || e.name.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn draw(&mut self, ui: &imgui::Ui) {
        let display_size = ui.io().display_size;
        if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
            return;
        }

        ui.window("Model Catalog")
            .size([300.0, 380.0], imgui::Condition::FirstUseEver)
            .position([20.0, 20.0], imgui::Condition::FirstUseEver)
            .resizable(true)
            .collapsible(true)
            .build(|| {
                if self.scanning {
                    ui.text("Scanning asset library...");
                    return;
                }

                if self.entries.is_empty() {
                    ui.text_wrapped("No models available.");
                    return;
                }

                ui.input_text("Search", &mut self.filter).build();
                ui.spacing();

                let visible = self.filtered_indices();

                ui.child_window("catalog_list")
                    .size([0.0, -60.0])
                    .border(true)
                    .build(|| {
                        for index in visible {
                            let is_selected = self.selected == Some(index);
                            if ui
                                .selectable_config(&self.entries[index].name)
                                .selected(is_selected)
                                .build()
                            {
                                self.selected = Some(index);
                            }
                        }
                    });

                ui.spacing();

                let loadable = self.selected.is_some() && !self.status.in_flight();
                ui.enabled(loadable, || {
                    if ui.button("Load") {
                        if let Some(index) = self.selected {
                            self.requested = Some(self.entries[index].clone());
                        }
                    }
                });

                ui.same_line();
                match &self.status {
                    LoadStatus::Idle => ui.text_disabled("select a model"),
                    LoadStatus::Loading(LoadPhase::Material) => ui.text("loading materials..."),
                    LoadStatus::Loading(LoadPhase::Geometry) => ui.text("loading geometry..."),
                    LoadStatus::Ready(name) => ui.text(format!("showing {name}")),
                    LoadStatus::Failed(reason) => {
                        ui.text_colored([1.0, 0.4, 0.4, 1.0], format!("failed: {reason}"))
                    }
                }
            });
    }
}

impl Default for CatalogPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> CatalogEntry {
        CatalogEntry {
            name: name.to_string(),
            obj_file: format!("{name}.obj"),
            mtl_file: format!("{name}.mtl"),
        }
    }

    #[test]
    fn test_filter_matches_case_insensitively() {
        let mut panel = CatalogPanel::new();
        panel.set_entries(vec![entry("Teapot"), entry("crate"), entry("lamp")]);

        panel.filter = "TEA".to_string();
        assert_eq!(panel.filtered_indices(), vec![0]);

        panel.filter.clear();
        assert_eq!(panel.filtered_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_request_is_taken_once() {
        let mut panel = CatalogPanel::new();
        panel.requested = Some(entry("teapot"));

        assert!(panel.take_request().is_some());
        assert!(panel.take_request().is_none());
    }

    #[test]
    fn test_status_in_flight_only_while_loading() {
        assert!(LoadStatus::Loading(LoadPhase::Material).in_flight());
        assert!(LoadStatus::Loading(LoadPhase::Geometry).in_flight());
        assert!(!LoadStatus::Idle.in_flight());
        assert!(!LoadStatus::Ready("x".into()).in_flight());
        assert!(!LoadStatus::Failed("x".into()).in_flight());
    }
}
