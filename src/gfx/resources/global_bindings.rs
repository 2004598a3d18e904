//! Global uniform bindings for camera and lighting
//!
//! Manages the GPU uniform buffer and bind group for per-frame global state:
//! the camera matrices and the viewer's fixed light rig. Bound to slot 0 in
//! the render pipeline.

use cgmath::InnerSpace;

use crate::{
    gfx::camera::camera_utils::CameraUniform,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// One directional light, packed for the shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuDirectionalLight {
    /// Normalized direction the light travels (toward the scene)
    pub direction: [f32; 3],
    pub intensity: f32,
    pub color: [f32; 3],
    _padding: f32,
}

impl GpuDirectionalLight {
    fn new(from: [f32; 3], color: [f32; 3], intensity: f32) -> Self {
        // Lights are specified by the position they shine from; the shader
        // wants the direction of travel
        let direction = -cgmath::Vector3::from(from).normalize();
        Self {
            direction: direction.into(),
            intensity,
            color,
            _padding: 0.0,
        }
    }
}

/// Global uniform buffer content structure
///
/// MUST match the Globals struct in the model shader exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    // Camera data (matches CameraUniform)
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],

    // Light rig
    ambient_color: [f32; 3],
    ambient_intensity: f32,
    directional: [GpuDirectionalLight; 3], // key, fill, overhead
    hemisphere_sky: [f32; 3],
    hemisphere_intensity: f32,
    hemisphere_ground: [f32; 3],
    _padding: f32,
}

/// The viewer's fixed five-light rig: ambient, key, fill, overhead, and a
/// sky/ground hemisphere. All values are hard-coded viewer constants.
#[derive(Copy, Clone, Debug)]
pub struct LightRig {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub key: GpuDirectionalLight,
    pub fill: GpuDirectionalLight,
    pub overhead: GpuDirectionalLight,
    pub hemisphere_sky: [f32; 3],
    pub hemisphere_ground: [f32; 3],
    pub hemisphere_intensity: f32,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 0.35,
            key: GpuDirectionalLight::new([5.0, 6.0, 8.0], [1.0, 1.0, 1.0], 0.9),
            fill: GpuDirectionalLight::new([-6.0, 2.0, -4.0], [0.8, 0.85, 1.0], 0.4),
            overhead: GpuDirectionalLight::new([0.0, 10.0, 0.0], [1.0, 1.0, 1.0], 0.3),
            hemisphere_sky: [0.55, 0.65, 0.8],
            hemisphere_ground: [0.25, 0.2, 0.15],
            hemisphere_intensity: 0.45,
        }
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Updates the global uniform buffer with camera and light rig data
///
/// Called each frame; the buffer wrapper skips the GPU write when nothing
/// changed.
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: CameraUniform,
    rig: &LightRig,
) {
    let content = GlobalUBOContent {
        view_position: camera.view_position,
        view_proj: camera.view_proj,

        ambient_color: rig.ambient_color,
        ambient_intensity: rig.ambient_intensity,
        directional: [rig.key, rig.fill, rig.overhead],
        hemisphere_sky: rig.hemisphere_sky,
        hemisphere_intensity: rig.hemisphere_intensity,
        hemisphere_ground: rig.hemisphere_ground,
        _padding: 0.0,
    };

    ubo.update_content(queue, content);
}

/// Manages the bind group layout and bind group for global uniforms
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    /// Sets up the bind group layout for global uniforms; the bind group
    /// itself is created once the uniform buffer exists.
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    /// Creates the bind group with the provided uniform buffer
    pub fn create_bind_group(&mut self, device: &wgpu::Device, ubo: &GlobalUBO) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .create(device, "Global Bind Group"),
        );
    }

    /// Returns the bind group layout for pipeline creation
    pub fn bind_group_layouts(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    /// Returns the bind group for rendering
    ///
    /// # Panics
    /// Panics if `create_bind_group()` hasn't been called yet
    pub fn bind_groups(&self) -> &wgpu::BindGroup {
        self.bind_group
            .as_ref()
            .expect("Bind group has not been created yet!")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_directions_are_normalized() {
        let rig = LightRig::default();

        for light in [rig.key, rig.fill, rig.overhead] {
            let d = cgmath::Vector3::from(light.direction);
            assert!((d.magnitude() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_overhead_light_points_straight_down() {
        let rig = LightRig::default();
        assert_eq!(rig.overhead.direction, [0.0, -1.0, 0.0]);
    }
}
