use wgpu::Device;

use crate::gfx::{
    camera::camera_utils::CameraManager,
    resources::material::{Material, MaterialManager},
    scene::model::{Mesh, Model},
};

/// Scene state: camera, material library, and the current model slot.
///
/// At most one model is resident at a time. Installing a new model drops the
/// previous one, so its GPU buffers are released before the replacement is
/// uploaded.
pub struct Scene {
    pub camera_manager: CameraManager,
    model: Option<Model>,
    pub material_manager: MaterialManager,
}

impl Scene {
    /// Creates a new scene with the given camera manager
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            model: None,
            material_manager: MaterialManager::new(),
        }
    }

    /// Per-frame update: camera integration and view-projection refresh.
    pub fn update(&mut self) {
        self.camera_manager.update();
        self.camera_manager.camera.update_view_proj();
    }

    /// Installs `model` as the current model, replacing the material library
    /// with the model's own materials. Any previously resident model is
    /// dropped first.
    pub fn set_model(&mut self, model: Model, materials: Vec<Material>) {
        self.model = None;
        self.material_manager.replace_materials(materials);
        self.model = Some(model);
    }

    /// Drops the current model, leaving the scene empty.
    pub fn clear_model(&mut self) {
        self.model = None;
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Initializes GPU resources for the current model and all materials
    ///
    /// Must be called after the GPU context is available and before rendering.
    pub fn init_gpu_resources(&mut self, device: &Device, queue: &wgpu::Queue) {
        if let Some(model) = self.model.as_mut() {
            model.init_gpu_resources(device);
        }

        self.material_manager.update_all_gpu_resources(device, queue);
    }

    /// Material for one mesh part, falling back to the default material
    /// when the part has none assigned or the name is unknown.
    pub fn material_for_mesh(&self, mesh: &Mesh) -> &Material {
        self.material_manager.material_or_default(mesh.material.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{camera_controller::CameraController, orbit_camera::OrbitCamera};
    use cgmath::Vector3;

    fn scene() -> Scene {
        let camera = OrbitCamera::new(5.0, 0.4, 0.2, Vector3::new(0.0, 0.0, 0.0), 1.0);
        let controller = CameraController::new(0.005, 0.1);
        Scene::new(CameraManager::new(camera, controller))
    }

    fn model(name: &str) -> Model {
        Model::new(name.to_string(), Vec::new())
    }

    #[test]
    fn test_scene_starts_empty() {
        let scene = scene();
        assert!(!scene.has_model());
    }

    #[test]
    fn test_at_most_one_model_resident() {
        let mut scene = scene();

        scene.set_model(model("first"), Vec::new());
        scene.set_model(model("second"), Vec::new());

        assert!(scene.has_model());
        assert_eq!(scene.model().unwrap().name, "second");
    }

    #[test]
    fn test_clear_model_empties_scene() {
        let mut scene = scene();

        scene.set_model(model("only"), Vec::new());
        scene.clear_model();

        assert!(!scene.has_model());
    }

    #[test]
    fn test_set_model_replaces_material_library() {
        let mut scene = scene();
        let first = vec![Material::new("wood", [0.5, 0.3, 0.1, 1.0], 0.0, 0.8)];
        let second = vec![Material::new("steel", [0.6, 0.6, 0.7, 1.0], 1.0, 0.3)];

        scene.set_model(model("a"), first);
        assert!(scene.material_manager.get_material(&"wood".to_string()).is_some());

        scene.set_model(model("b"), second);
        assert!(scene.material_manager.get_material(&"wood".to_string()).is_none());
        assert!(scene.material_manager.get_material(&"steel".to_string()).is_some());
    }
}
