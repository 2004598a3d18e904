//! Material system for model rendering
//!
//! Materials come from the MTL definitions paired with each model and are
//! stored centrally in MaterialManager; mesh parts reference them by name.
//! Installing a new model replaces the library wholesale (the default
//! material always survives as the fallback).

use std::collections::HashMap;
use wgpu::Device;

use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// Material ID for referencing materials
pub type MaterialId = String;

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    // Keeps `emissive` on the 16-byte boundary WGSL expects for vec3
    _pad0: [f32; 2],
    pub emissive: [f32; 3],
    _pad1: f32,
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

/// Material bind group management
pub struct MaterialBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl MaterialBindings {
    pub fn new(device: &Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .create(device, "Material Bind Group");

        MaterialBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    pub fn create_bind_group(&mut self, device: &Device, ubo: &MaterialUBO) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .create(device, "Material Bind Group"),
        );
    }

    pub fn bind_group_layouts(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_groups(&self) -> &wgpu::BindGroup {
        self.bind_group
            .as_ref()
            .expect("Bind group has not been created yet!")
    }
}

/// Display name for an MTL entry; unnamed entries get an index-based one so
/// mesh parts can still reference them.
pub fn mtl_material_name(mtl: &tobj::Material, index: usize) -> String {
    if mtl.name.is_empty() {
        format!("material_{}", index)
    } else {
        mtl.name.clone()
    }
}

/// Surface appearance for mesh parts
///
/// Holds the shading parameters plus lazily created GPU resources shared by
/// every mesh part that references this material.
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: [f32; 3],

    material_ubo: Option<MaterialUBO>,
    material_bindings: Option<MaterialBindings>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            metallic: 0.0,
            roughness: 0.5,
            emissive: [0.0, 0.0, 0.0],
            material_ubo: None,
            material_bindings: None,
        }
    }
}

impl Material {
    /// Creates a new material with basic shading properties
    pub fn new(name: &str, base_color: [f32; 4], metallic: f32, roughness: f32) -> Self {
        Self {
            name: name.to_string(),
            base_color,
            metallic: metallic.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
            emissive: [0.0, 0.0, 0.0],
            material_ubo: None,
            material_bindings: None,
        }
    }

    /// Converts an MTL definition into viewer shading parameters.
    ///
    /// MTL has no metallic term; shininess maps inversely onto roughness so
    /// glossy definitions stay glossy.
    pub fn from_mtl(mtl: &tobj::Material, index: usize) -> Self {
        let diffuse = mtl.diffuse.unwrap_or([0.8, 0.8, 0.8]);
        let alpha = mtl.dissolve.unwrap_or(1.0);
        let roughness = 1.0 - (mtl.shininess.unwrap_or(32.0) / 128.0).clamp(0.0, 1.0);

        Self::new(
            &mtl_material_name(mtl, index),
            [diffuse[0], diffuse[1], diffuse[2], alpha],
            0.0,
            roughness,
        )
    }

    /// Updates GPU resources for this material
    ///
    /// Must be called after material properties change to sync with GPU.
    pub fn update_gpu_resources(&mut self, device: &Device, queue: &wgpu::Queue) {
        if self.material_ubo.is_none() {
            self.material_ubo = Some(MaterialUBO::new(device));
        }

        if self.material_bindings.is_none() {
            let mut bindings = MaterialBindings::new(device);
            bindings.create_bind_group(device, self.material_ubo.as_ref().unwrap());
            self.material_bindings = Some(bindings);
        }

        let uniform_data = MaterialUniform {
            base_color: self.base_color,
            metallic: self.metallic,
            roughness: self.roughness,
            _pad0: [0.0; 2],
            emissive: self.emissive,
            _pad1: 0.0,
        };

        if let Some(ubo) = &mut self.material_ubo {
            ubo.update_content(queue, uniform_data);
        }
    }

    /// Gets the bind group for rendering
    pub fn get_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.material_bindings.as_ref().map(|b| b.bind_groups())
    }

    /// Gets the bind group layout for pipeline creation
    pub fn get_bind_group_layout(&self) -> Option<&wgpu::BindGroupLayout> {
        self.material_bindings
            .as_ref()
            .map(|b| b.bind_group_layouts())
    }
}

/// Centralized material storage
///
/// Mesh parts reference materials by name rather than holding material data
/// directly, so GPU resources are shared between parts.
pub struct MaterialManager {
    materials: HashMap<MaterialId, Material>,
    default_material_id: MaterialId,
}

impl MaterialManager {
    /// Creates a new material manager with a default material
    pub fn new() -> Self {
        let mut manager = Self {
            materials: HashMap::new(),
            default_material_id: "default".to_string(),
        };

        manager
            .materials
            .insert("default".to_string(), Material::default());

        manager
    }

    /// Replaces the library with a new model's materials, keeping only the
    /// default material as the fallback.
    pub fn replace_materials(&mut self, materials: Vec<Material>) {
        self.materials.retain(|id, _| *id == self.default_material_id);
        for material in materials {
            self.materials.insert(material.name.clone(), material);
        }
    }

    pub fn add_material(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    pub fn get_material(&self, id: &MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn get_material_mut(&mut self, id: &MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    /// Gets the default material
    pub fn get_default_material(&self) -> &Material {
        self.materials.get(&self.default_material_id).unwrap()
    }

    /// Material lookup with fallback to the default
    ///
    /// This is the rendering path: a part with no material, or one whose
    /// name is missing from the library, still draws with the default.
    pub fn material_or_default(&self, material_id: Option<&MaterialId>) -> &Material {
        match material_id {
            Some(id) => self
                .get_material(id)
                .unwrap_or_else(|| self.get_default_material()),
            None => self.get_default_material(),
        }
    }

    /// Lists all material IDs
    pub fn list_materials(&self) -> Vec<&MaterialId> {
        self.materials.keys().collect()
    }

    /// Updates GPU resources for all materials
    ///
    /// Should be called when the GPU context is available or when
    /// materials have been modified.
    pub fn update_all_gpu_resources(&mut self, device: &Device, queue: &wgpu::Queue) {
        for material in self.materials.values_mut() {
            material.update_gpu_resources(device, queue);
        }
    }
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_materials_keeps_default_fallback() {
        let mut manager = MaterialManager::new();
        manager.replace_materials(vec![Material::new("brass", [0.9, 0.7, 0.2, 1.0], 1.0, 0.4)]);

        manager.replace_materials(vec![]);

        assert!(manager.get_material(&"brass".to_string()).is_none());
        assert_eq!(manager.get_default_material().name, "default");
    }

    #[test]
    fn test_lookup_falls_back_to_default() {
        let manager = MaterialManager::new();

        let missing = "nope".to_string();
        assert_eq!(manager.material_or_default(Some(&missing)).name, "default");
        assert_eq!(manager.material_or_default(None).name, "default");
    }

    #[test]
    fn test_mtl_conversion_maps_shininess_to_roughness() {
        let mut mtl = tobj::Material::default();
        mtl.name = "glossy".to_string();
        mtl.diffuse = Some([0.2, 0.4, 0.6]);
        mtl.shininess = Some(128.0);
        mtl.dissolve = Some(0.75);

        let material = Material::from_mtl(&mtl, 0);

        assert_eq!(material.name, "glossy");
        assert_eq!(material.base_color, [0.2, 0.4, 0.6, 0.75]);
        assert!(material.roughness.abs() < 1e-6);
    }

    #[test]
    fn test_unnamed_mtl_entries_get_indexed_names() {
        let mtl = tobj::Material::default();
        assert_eq!(mtl_material_name(&mtl, 3), "material_3");
    }
}
