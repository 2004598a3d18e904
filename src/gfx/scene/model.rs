use cgmath::{Deg, InnerSpace, Matrix4, SquareMatrix, Vector3};
use wgpu::Device;

use super::vertex::Vertex3D;

/// One part of a model: geometry plus the name of the material it uses.
pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    /// Material name this part was bound to, resolved against the
    /// material library at draw time
    pub material: Option<String>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    index_count: u32,
}

impl Mesh {
    /// Builds a mesh from flat position/normal arrays as produced by the
    /// OBJ loader. `positions` and `normals` must have equal length.
    pub fn new(
        positions: Vec<f32>,
        normals: Vec<f32>,
        indices: Vec<u32>,
        material: Option<String>,
    ) -> Self {
        let index_count = indices.len() as u32;

        let mut vertices = Vec::with_capacity(positions.len() / 3);
        for i in 0..positions.len() / 3 {
            vertices.push(Vertex3D {
                position: [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]],
                normal: [normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]],
            });
        }

        Self {
            vertices,
            indices,
            material,
            vertex_buffer: None,
            index_buffer: None,
            index_count,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    fn init_gpu_resources(&mut self, device: &Device) {
        let vertex_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );

        let index_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&self.indices),
                usage: wgpu::BufferUsages::INDEX,
            },
        );

        self.vertex_buffer = Some(vertex_buffer);
        self.index_buffer = Some(index_buffer);
    }
}

/// Reconstructs smooth per-vertex normals by accumulating area-weighted
/// face normals and normalizing. Used when the OBJ carries no normals;
/// shared vertices end up shaded smoothly rather than faceted.
pub fn smooth_vertex_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let mut normals = vec![0.0f32; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];

        let v0 = Vector3::new(positions[i0 * 3], positions[i0 * 3 + 1], positions[i0 * 3 + 2]);
        let v1 = Vector3::new(positions[i1 * 3], positions[i1 * 3 + 1], positions[i1 * 3 + 2]);
        let v2 = Vector3::new(positions[i2 * 3], positions[i2 * 3 + 1], positions[i2 * 3 + 2]);

        // Cross product magnitude carries the face area, weighting larger
        // faces more heavily in the accumulated normal
        let face_normal = (v1 - v0).cross(v2 - v0);

        for &index in &[i0, i1, i2] {
            normals[index * 3] += face_normal.x;
            normals[index * 3 + 1] += face_normal.y;
            normals[index * 3 + 2] += face_normal.z;
        }
    }

    for normal in normals.chunks_exact_mut(3) {
        let v = Vector3::new(normal[0], normal[1], normal[2]);
        if v.magnitude2() > 0.0 {
            let unit = v.normalize();
            normal[0] = unit.x;
            normal[1] = unit.y;
            normal[2] = unit.z;
        }
    }

    normals
}

/// Axis-aligned bounding box over mesh-local vertex positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn from_points(points: impl IntoIterator<Item = Vector3<f32>>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut aabb = Aabb {
            min: first,
            max: first,
        };

        for p in points {
            aabb.min = Vector3::new(
                aabb.min.x.min(p.x),
                aabb.min.y.min(p.y),
                aabb.min.z.min(p.z),
            );
            aabb.max = Vector3::new(
                aabb.max.x.max(p.x),
                aabb.max.y.max(p.y),
                aabb.max.z.max(p.z),
            );
        }

        Some(aabb)
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) / 2.0
    }

    pub fn extents(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn largest_extent(&self) -> f32 {
        let e = self.extents();
        e.x.max(e.y).max(e.z)
    }
}

// GPU resources for the model's transform uniform
pub struct ModelGpuResources {
    pub transform_buffer: wgpu::Buffer,
    pub transform_bind_group: wgpu::BindGroup,
}

/// A loaded model: named mesh parts sharing one transform.
pub struct Model {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub transform: Matrix4<f32>,
    gpu_resources: Option<ModelGpuResources>,
}

impl Model {
    pub fn new(name: String, meshes: Vec<Mesh>) -> Self {
        Self {
            name,
            meshes,
            transform: Matrix4::identity(),
            gpu_resources: None,
        }
    }

    /// Bounding box over all mesh parts in model-local space.
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(
            self.meshes
                .iter()
                .flat_map(|mesh| mesh.vertices.iter())
                .map(|v| Vector3::from(v.position)),
        )
        .unwrap_or(Aabb {
            min: Vector3::new(0.0, 0.0, 0.0),
            max: Vector3::new(0.0, 0.0, 0.0),
        })
    }

    /// Centers the model at the origin and turns it to face the default
    /// camera with a fixed 180° yaw. Returns the largest bounding-box
    /// extent, used to back the camera off proportionally.
    pub fn orient_for_viewing(&mut self) -> f32 {
        let bounds = self.bounding_box();
        self.transform =
            Matrix4::from_angle_y(Deg(180.0)) * Matrix4::from_translation(-bounds.center());
        bounds.largest_extent()
    }

    /// Uploads vertex, index, and transform buffers. Must be called before
    /// the model is drawn.
    pub fn init_gpu_resources(&mut self, device: &Device) {
        for mesh in self.meshes.iter_mut() {
            mesh.init_gpu_resources(device);
        }

        // cgmath matrices are already column-major for GPU
        let transform_data: &[f32; 16] = self.transform.as_ref();

        let transform_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Transform Uniform Buffer"),
                contents: bytemuck::cast_slice(transform_data),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        let transform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Transform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let transform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Transform Bind Group"),
            layout: &transform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.as_entire_binding(),
            }],
        });

        self.gpu_resources = Some(ModelGpuResources {
            transform_buffer,
            transform_bind_group,
        });
    }

    pub fn transform_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu_resources
            .as_ref()
            .map(|res| &res.transform_bind_group)
    }
}

pub trait DrawMesh<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        let vertex_buffer = match &mesh.vertex_buffer {
            Some(buffer) => buffer,
            None => return, // Skip drawing if not uploaded
        };
        let index_buffer = match &mesh.index_buffer {
            Some(buffer) => buffer,
            None => return,
        };

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{EuclideanSpace, Transform};

    fn quad_mesh() -> Mesh {
        // Unit quad in the XY plane at z = 0, wound to face +Z
        let positions = vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0,
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];
        let normals = smooth_vertex_normals(&positions, &indices);
        Mesh::new(positions, normals, indices, None)
    }

    #[test]
    fn test_bounding_box_spans_all_parts() {
        let a = Mesh::new(
            vec![-1.0, 0.0, 0.0, 0.0, 2.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            vec![],
            None,
        );
        let b = Mesh::new(
            vec![4.0, -3.0, 1.0],
            vec![0.0, 0.0, 1.0],
            vec![],
            None,
        );
        let model = Model::new("test".into(), vec![a, b]);

        let bounds = model.bounding_box();
        assert_eq!(bounds.min, Vector3::new(-1.0, -3.0, 0.0));
        assert_eq!(bounds.max, Vector3::new(4.0, 2.0, 1.0));
        assert_eq!(bounds.largest_extent(), 5.0);
    }

    #[test]
    fn test_orient_for_viewing_centers_model_at_origin() {
        let mesh = Mesh::new(
            vec![
                2.0, 4.0, 6.0, //
                4.0, 8.0, 10.0, //
                3.0, 5.0, 7.0,
            ],
            vec![0.0; 9],
            vec![0, 1, 2],
            None,
        );
        let mut model = Model::new("offset".into(), vec![mesh]);

        let extent = model.orient_for_viewing();
        assert_eq!(extent, 4.0);

        // The transformed bounding-box center must land on the origin,
        // 180° yaw included
        let bounds = model.bounding_box();
        let transformed_center = model
            .transform
            .transform_point(cgmath::Point3::from_vec(bounds.center()));
        assert!(transformed_center.x.abs() < 1e-5);
        assert!(transformed_center.y.abs() < 1e-5);
        assert!(transformed_center.z.abs() < 1e-5);
    }

    #[test]
    fn test_smooth_normals_are_unit_length_and_planar() {
        let positions = vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0,
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];

        let normals = smooth_vertex_normals(&positions, &indices);

        assert_eq!(normals.len(), positions.len());
        for normal in normals.chunks_exact(3) {
            assert!((normal[0]).abs() < 1e-6);
            assert!((normal[1]).abs() < 1e-6);
            assert!((normal[2] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_quad_mesh_counts() {
        let mesh = quad_mesh();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.index_count, 6);
    }
}
