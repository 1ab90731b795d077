//! Vertex and index buffer management for GPU rendering.

use solaria_terrain::{TerrainMesh, TerrainVertex};
use wgpu::util::DeviceExt;

/// A complete mesh buffer containing vertex and index data ready for GPU rendering.
pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub index_format: wgpu::IndexFormat,
}

impl MeshBuffer {
    /// Bind vertex and index buffers to a render pass.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), self.index_format);
    }

    /// Draw the entire mesh using indexed rendering.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Index data that can be either u16 or u32 format.
pub enum IndexData<'a> {
    U16(&'a [u16]),
    U32(&'a [u32]),
}

impl IndexData<'_> {
    pub fn format(&self) -> wgpu::IndexFormat {
        match self {
            IndexData::U16(_) => wgpu::IndexFormat::Uint16,
            IndexData::U32(_) => wgpu::IndexFormat::Uint32,
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            IndexData::U16(data) => data.len() as u32,
            IndexData::U32(data) => data.len() as u32,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexData::U16(data) => bytemuck::cast_slice(data),
            IndexData::U32(data) => bytemuck::cast_slice(data),
        }
    }
}

/// GPU buffer allocator for creating vertex and index buffers.
pub struct BufferAllocator<'a> {
    device: &'a wgpu::Device,
}

impl<'a> BufferAllocator<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }

    /// Create a complete mesh buffer from raw vertex bytes and index data.
    pub fn create_mesh(&self, label: &str, vertices: &[u8], indices: IndexData) -> MeshBuffer {
        let vertex_buffer = self.create_vertex_buffer(&format!("{label}-vertices"), vertices);
        let index_buffer = self.create_index_buffer(&format!("{label}-indices"), &indices);

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: indices.count(),
            index_format: indices.format(),
        }
    }

    /// Upload a generated terrain surface. Terrain indices always fit in u16.
    pub fn create_terrain_mesh(&self, label: &str, mesh: &TerrainMesh) -> MeshBuffer {
        log::debug!(
            "Uploading terrain '{label}': {} vertices, {} triangles",
            mesh.vertices.len(),
            mesh.triangle_count()
        );
        self.create_mesh(
            label,
            bytemuck::cast_slice(&mesh.vertices),
            IndexData::U16(&mesh.indices),
        )
    }

    pub fn create_vertex_buffer(&self, label: &str, data: &[u8]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            })
    }

    pub fn create_index_buffer(&self, label: &str, indices: &IndexData) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: indices.as_bytes(),
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            })
    }
}

const TERRAIN_ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x3,
    2 => Float32x2,
    3 => Float32x4
];

/// Vertex layout matching [`TerrainVertex`]: position, normal, uv, colour.
pub fn terrain_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<TerrainVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &TERRAIN_ATTRIBUTES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;
    use solaria_terrain::TerrainParams;

    #[test]
    fn test_terrain_layout_matches_vertex_struct() {
        let layout = terrain_vertex_layout();
        assert_eq!(layout.array_stride, 48);
        let offsets: Vec<_> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24, 32]);
        let locations: Vec<_> = layout
            .attributes
            .iter()
            .map(|a| a.shader_location)
            .collect();
        assert_eq!(locations, vec![0, 1, 2, 3]);
        assert_eq!(layout.attributes[3].format, wgpu::VertexFormat::Float32x4);
    }

    #[test]
    fn test_u16_vs_u32_format_selection() {
        assert_eq!(IndexData::U16(&[0, 1, 2]).format(), wgpu::IndexFormat::Uint16);
        assert_eq!(IndexData::U32(&[0, 1, 2]).format(), wgpu::IndexFormat::Uint32);
    }

    #[test]
    fn test_index_data_as_bytes() {
        assert_eq!(IndexData::U16(&[0, 1, 2]).as_bytes().len(), 6);
        assert_eq!(IndexData::U32(&[0, 1, 2]).as_bytes().len(), 12);
    }

    #[test]
    fn test_mesh_buffer_creation_u32() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let allocator = BufferAllocator::new(&device);
        let mesh = allocator.create_mesh("quad", &[0u8; 128], IndexData::U32(&[0, 1, 2, 2, 3, 0]));
        assert_eq!(mesh.index_count, 6);
        assert_eq!(mesh.index_format, wgpu::IndexFormat::Uint32);
    }

    #[test]
    fn test_terrain_upload_sizes() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let terrain = TerrainMesh::generate(&TerrainParams::with_seed(3));
        let allocator = BufferAllocator::new(&device);
        let mesh = allocator.create_terrain_mesh("terrain", &terrain);

        assert_eq!(mesh.index_count as usize, terrain.indices.len());
        assert_eq!(mesh.index_format, wgpu::IndexFormat::Uint16);
        assert_eq!(
            mesh.vertex_buffer.size() as usize,
            terrain.vertices.len() * std::mem::size_of::<TerrainVertex>()
        );
    }
}
