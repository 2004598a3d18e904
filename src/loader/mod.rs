//! # Model Loader
//!
//! Two-stage, strictly sequential model loading: the material definition is
//! fetched and parsed first, then the geometry is parsed with those materials
//! already bound. Each load runs on its own worker thread and reports phase
//! changes and the final outcome over an `mpsc` channel that the frame loop
//! drains.
//!
//! Overlapping loads are resolved with a generation counter: every request
//! gets a fresh generation from [`LoadSequencer`], and events carrying a
//! stale generation are discarded on arrival. The most recently requested
//! load always wins, regardless of which worker finishes first.

use std::io::Cursor;
use std::sync::mpsc::Sender;
use std::thread;

use crate::catalog::{self, CatalogEntry};
use crate::gfx::resources::material::{self, Material};
use crate::gfx::scene::model::smooth_vertex_normals;

/// Errors from either stage of a load.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("asset fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("material definition failed to parse: {0}")]
    Material(tobj::LoadError),
    #[error("geometry failed to parse: {0}")]
    Geometry(tobj::LoadError),
}

/// The in-flight stage of a load, surfaced in the catalog panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Material,
    Geometry,
}

/// Worker-to-session messages. Every event carries the generation of the
/// request that produced it so the session can drop stale ones.
pub enum LoadEvent {
    Phase {
        generation: u64,
        phase: LoadPhase,
    },
    Finished {
        generation: u64,
        result: Result<LoadedModel, LoadError>,
    },
}

/// CPU-side mesh data produced by a worker, ready for GPU upload.
pub struct MeshData {
    pub name: String,
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
    pub material: Option<String>,
}

/// A fully parsed model: mesh parts plus the materials they reference.
pub struct LoadedModel {
    pub name: String,
    pub meshes: Vec<MeshData>,
    pub materials: Vec<Material>,
}

/// Hands out load generations and decides which events are still current.
pub struct LoadSequencer {
    issued: u64,
}

impl LoadSequencer {
    pub fn new() -> Self {
        Self { issued: 0 }
    }

    /// Starts a new request, invalidating every earlier one.
    pub fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// True if `generation` belongs to the most recent request.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.issued
    }

    /// True if at least one request has been issued.
    pub fn any_issued(&self) -> bool {
        self.issued > 0
    }
}

impl Default for LoadSequencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns a worker that loads `entry` from the assets endpoint.
pub fn spawn_load(generation: u64, base_url: &str, entry: CatalogEntry, tx: Sender<LoadEvent>) {
    let mtl_url = catalog::asset_url(base_url, &entry.mtl_file);
    let obj_url = catalog::asset_url(base_url, &entry.obj_file);

    thread::spawn(move || {
        let result = run_load(generation, &entry.name, &mtl_url, &obj_url, &tx);
        // The session may already have moved on; a closed channel is fine
        let _ = tx.send(LoadEvent::Finished { generation, result });
    });
}

fn run_load(
    generation: u64,
    name: &str,
    mtl_url: &str,
    obj_url: &str,
    tx: &Sender<LoadEvent>,
) -> Result<LoadedModel, LoadError> {
    // Stage 1: material definition. Geometry is not touched until this
    // stage has fully succeeded.
    let _ = tx.send(LoadEvent::Phase {
        generation,
        phase: LoadPhase::Material,
    });

    let mtl_text = fetch_text(mtl_url)?;
    let preloaded = tobj::load_mtl_buf(&mut Cursor::new(mtl_text.as_bytes()))
        .map_err(LoadError::Material)?;

    // Stage 2: geometry, with the stage-1 materials bound through the
    // material loader instead of re-reading the mtllib reference.
    let _ = tx.send(LoadEvent::Phase {
        generation,
        phase: LoadPhase::Geometry,
    });

    let obj_text = fetch_text(obj_url)?;
    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };
    let bound_materials = preloaded.clone();
    let (models, obj_materials) = tobj::load_obj_buf(
        &mut Cursor::new(obj_text.as_bytes()),
        &load_options,
        move |_| Ok(bound_materials.clone()),
    )
    .map_err(LoadError::Geometry)?;

    // The geometry references materials by index into whatever the loader
    // callback produced; fall back to the stage-1 list when the OBJ carried
    // no mtllib statement at all.
    let referenced = match obj_materials {
        Ok(mats) if !mats.is_empty() => mats,
        _ => preloaded.0.clone(),
    };

    let meshes = models
        .into_iter()
        .map(|model| {
            let mesh = model.mesh;
            let normals = if !mesh.normals.is_empty() && mesh.normals.len() == mesh.positions.len()
            {
                mesh.normals
            } else {
                smooth_vertex_normals(&mesh.positions, &mesh.indices)
            };

            let material_name = mesh.material_id.and_then(|id| {
                referenced
                    .get(id)
                    .map(|mtl| material::mtl_material_name(mtl, id))
            });

            MeshData {
                name: model.name,
                positions: mesh.positions,
                normals,
                indices: mesh.indices,
                material: material_name,
            }
        })
        .collect();

    let materials = preloaded
        .0
        .iter()
        .enumerate()
        .map(|(i, mtl)| Material::from_mtl(mtl, i))
        .collect();

    Ok(LoadedModel {
        name: name.to_string(),
        meshes,
        materials,
    })
}

fn fetch_text(url: &str) -> Result<String, LoadError> {
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    Ok(response.text()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequencer_latest_request_wins() {
        let mut sequencer = LoadSequencer::new();

        let first = sequencer.begin();
        let second = sequencer.begin();

        // Events from the first request are stale no matter when they land
        assert!(!sequencer.is_current(first));
        assert!(sequencer.is_current(second));
    }

    #[test]
    fn test_sequencer_generations_increase() {
        let mut sequencer = LoadSequencer::new();
        assert!(!sequencer.any_issued());

        let a = sequencer.begin();
        let b = sequencer.begin();
        assert!(b > a);
        assert!(sequencer.any_issued());
    }

    #[test]
    fn test_failed_fetch_is_a_load_error() {
        // Unroutable endpoint; both stages surface transport failures
        let err = fetch_text("http://127.0.0.1:9/assets/missing.mtl").unwrap_err();
        assert!(matches!(err, LoadError::Fetch(_)));
    }
}
