//! wgpu rendering: device and surface management, depth, camera, mesh
//! buffers, per-frame pass encoding, and the two-layer terrain pipeline.

pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod pass;
pub mod surface;
pub mod terrain_pipeline;
pub mod texture;

pub use buffer::{BufferAllocator, IndexData, MeshBuffer, terrain_vertex_layout};
pub use camera::Camera;
pub use depth::DepthBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pass::{DEEP_SPACE, FrameEncoder, RenderPassBuilder};
pub use surface::{PhysicalSize, SurfaceResizeEvent, SurfaceWrapper};
pub use terrain_pipeline::{
    FrameBinding, FrameUniform, NodeBinding, NodeUniform, PipelineKey, TERRAIN_SHADER_SOURCE,
    TerrainPipeline, draw_node,
};
pub use texture::{LayerTexture, TextureError};
