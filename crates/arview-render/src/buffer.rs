//! Geometry buffer upload.

use wgpu::util::DeviceExt;

use arview_core::asset::GeometryData;

/// Vertex layout for uploaded meshes.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
    /// Texture coordinates.
    pub uv: [f32; 2],
}

/// Uploaded vertex/index buffers of one mesh, owned by exactly one
/// instance.
#[derive(Debug)]
pub struct GpuGeometry {
    /// Vertex buffer.
    pub vertex_buffer: wgpu::Buffer,
    /// Index buffer.
    pub index_buffer: wgpu::Buffer,
    /// Number of indices.
    pub index_count: u32,
}

impl GpuGeometry {
    /// Frees the GPU memory backing both buffers.
    pub fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

/// Uploads mesh geometry to the GPU.
///
/// Missing normals/uvs are padded with zeroes so partially attributed
/// assets still upload.
#[must_use]
pub fn upload_geometry(device: &wgpu::Device, data: &GeometryData, label: &str) -> GpuGeometry {
    let vertices: Vec<MeshVertex> = (0..data.positions.len())
        .map(|i| MeshVertex {
            position: data.positions[i],
            normal: data.normals.get(i).copied().unwrap_or([0.0, 0.0, 0.0]),
            uv: data.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect();

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    });

    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&data.indices),
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
    });

    GpuGeometry {
        vertex_buffer,
        index_buffer,
        index_count: u32::try_from(data.indices.len()).unwrap_or(u32::MAX),
    }
}
