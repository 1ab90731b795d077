//! Lit, two-layer textured pipeline used for every scene mesh.
//!
//! Bind groups:
//! - group 0: [`FrameUniform`] (camera and light), shared by all draws
//! - group 1: [`NodeUniform`] (model matrix and material colours), one per node
//! - group 2: two layer textures and a repeating sampler, one per material
//!
//! Render pipelines are cached per [`PipelineKey`], which captures the
//! material state that wgpu bakes into a pipeline (fill mode, culling, depth).

use std::collections::HashMap;
use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use solaria_scene::Material;
use wgpu::util::DeviceExt;

use crate::buffer::{MeshBuffer, terrain_vertex_layout};
use crate::camera::Camera;
use crate::depth::DepthBuffer;
use crate::texture::LayerTexture;

/// Per-frame uniform: camera and directional light.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    /// xyz: direction the light travels, w: ambient strength.
    pub light_dir: [f32; 4],
}

static_assertions::const_assert_eq!(std::mem::size_of::<FrameUniform>(), 96);

impl FrameUniform {
    pub fn new(camera: &Camera, light_dir: Vec3, ambient: f32) -> Self {
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
            light_dir: light_dir.normalize_or_zero().extend(ambient).to_array(),
        }
    }
}

/// Per-node uniform: world transform and material colours.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct NodeUniform {
    pub model: [[f32; 4]; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    /// x: lighting, y: layer count, z: gouraud shading, w: unused.
    pub flags: [u32; 4],
}

static_assertions::const_assert_eq!(std::mem::size_of::<NodeUniform>(), 112);

impl NodeUniform {
    pub fn new(model: Mat4, material: &Material) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            ambient: material.ambient,
            diffuse: material.diffuse,
            flags: [
                u32::from(material.lighting),
                material.layer_count() as u32,
                u32::from(material.gouraud_shading),
                0,
            ],
        }
    }
}

/// Fixed-function state baked into a render pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub wireframe: bool,
    pub cull: bool,
    pub depth_test: bool,
    pub depth_write: bool,
}

impl PipelineKey {
    /// Wireframe is dropped when the device has no line polygon mode.
    pub fn for_material(material: &Material, wireframe_supported: bool) -> Self {
        Self {
            wireframe: material.wireframe && wireframe_supported,
            cull: material.backface_culling,
            depth_test: material.depth_test,
            depth_write: material.depth_write,
        }
    }

    fn polygon_mode(&self) -> wgpu::PolygonMode {
        if self.wireframe {
            wgpu::PolygonMode::Line
        } else {
            wgpu::PolygonMode::Fill
        }
    }

    fn cull_mode(&self) -> Option<wgpu::Face> {
        self.cull.then_some(wgpu::Face::Back)
    }

    fn depth_stencil(&self) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: DepthBuffer::FORMAT,
            depth_write_enabled: self.depth_write,
            depth_compare: if self.depth_test {
                DepthBuffer::COMPARE_FUNCTION
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

/// Shader, layouts and the pipeline cache for scene meshes.
pub struct TerrainPipeline {
    pub frame_layout: wgpu::BindGroupLayout,
    pub node_layout: wgpu::BindGroupLayout,
    pub layer_layout: wgpu::BindGroupLayout,
    layout: wgpu::PipelineLayout,
    shader: wgpu::ShaderModule,
    sampler: wgpu::Sampler,
    surface_format: wgpu::TextureFormat,
    wireframe_supported: bool,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl TerrainPipeline {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        wireframe_supported: bool,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("terrain-shader"),
            source: wgpu::ShaderSource::Wgsl(TERRAIN_SHADER_SOURCE.into()),
        });

        let frame_layout = uniform_layout(
            device,
            "terrain-frame-bgl",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            std::mem::size_of::<FrameUniform>() as u64,
        );
        let node_layout = uniform_layout(
            device,
            "terrain-node-bgl",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            std::mem::size_of::<NodeUniform>() as u64,
        );

        let layer_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let layer_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("terrain-layer-bgl"),
            entries: &[
                layer_entry(0),
                layer_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("terrain-pipeline-layout"),
            bind_group_layouts: &[&frame_layout, &node_layout, &layer_layout],
            immediate_size: 0,
        });

        // UVs run past 1.0 so the layers tile across the grid.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("terrain-layer-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self {
            frame_layout,
            node_layout,
            layer_layout,
            layout,
            shader,
            sampler,
            surface_format,
            wireframe_supported,
            pipelines: HashMap::new(),
        }
    }

    /// Ensure a pipeline exists for `material` and return its key.
    pub fn prepare(&mut self, device: &wgpu::Device, material: &Material) -> PipelineKey {
        let key = PipelineKey::for_material(material, self.wireframe_supported);
        if material.wireframe && !key.wireframe {
            log::warn!("Wireframe requested but unsupported, drawing filled");
        }
        if !self.pipelines.contains_key(&key) {
            log::debug!("Creating terrain pipeline for {key:?}");
            let pipeline = self.build(device, key);
            self.pipelines.insert(key, pipeline);
        }
        key
    }

    pub fn pipeline(&self, key: &PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(key)
    }

    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    pub fn wireframe_supported(&self) -> bool {
        self.wireframe_supported
    }

    /// Bind two layer textures. Single-layer materials pass the same texture twice.
    pub fn create_layer_binding(
        &self,
        device: &wgpu::Device,
        layer0: &LayerTexture,
        layer1: &LayerTexture,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("terrain-layer-bg"),
            layout: &self.layer_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&layer0.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&layer1.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    fn build(&self, device: &wgpu::Device, key: PipelineKey) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("terrain-pipeline"),
            layout: Some(&self.layout),
            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some("vs_main"),
                buffers: &[terrain_vertex_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: key.cull_mode(),
                unclipped_depth: false,
                polygon_mode: key.polygon_mode(),
                conservative: false,
            },
            depth_stencil: Some(key.depth_stencil()),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        })
    }
}

fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
    size: u64,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(size),
            },
            count: None,
        }],
    })
}

fn uniform_binding<T: Pod>(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    label: &str,
    value: &T,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(value),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    });
    (buffer, bind_group)
}

/// GPU copy of the [`FrameUniform`].
pub struct FrameBinding {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl FrameBinding {
    pub fn new(device: &wgpu::Device, pipeline: &TerrainPipeline, uniform: &FrameUniform) -> Self {
        let (buffer, bind_group) =
            uniform_binding(device, &pipeline.frame_layout, "terrain-frame", uniform);
        Self { buffer, bind_group }
    }

    pub fn update(&self, queue: &wgpu::Queue, uniform: &FrameUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniform));
    }
}

/// GPU copy of one node's [`NodeUniform`].
pub struct NodeBinding {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl NodeBinding {
    pub fn new(device: &wgpu::Device, pipeline: &TerrainPipeline, uniform: &NodeUniform) -> Self {
        let (buffer, bind_group) =
            uniform_binding(device, &pipeline.node_layout, "terrain-node", uniform);
        Self { buffer, bind_group }
    }

    pub fn update(&self, queue: &wgpu::Queue, uniform: &NodeUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniform));
    }
}

/// Draw one scene node.
pub fn draw_node(
    render_pass: &mut wgpu::RenderPass<'_>,
    pipeline: &wgpu::RenderPipeline,
    frame: &FrameBinding,
    node: &NodeBinding,
    layers: &wgpu::BindGroup,
    mesh: &MeshBuffer,
) {
    render_pass.set_pipeline(pipeline);
    render_pass.set_bind_group(0, &frame.bind_group, &[]);
    render_pass.set_bind_group(1, &node.bind_group, &[]);
    render_pass.set_bind_group(2, layers, &[]);
    mesh.bind(render_pass);
    mesh.draw(render_pass);
}

/// WGSL source for the scene pipeline.
pub const TERRAIN_SHADER_SOURCE: &str = r#"
struct FrameUniform {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    light_dir: vec4<f32>,
};

struct NodeUniform {
    model: mat4x4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    flags: vec4<u32>,
};

@group(0) @binding(0)
var<uniform> frame: FrameUniform;

@group(1) @binding(0)
var<uniform> node: NodeUniform;

@group(2) @binding(0)
var t_layer0: texture_2d<f32>;
@group(2) @binding(1)
var t_layer1: texture_2d<f32>;
@group(2) @binding(2)
var s_layer: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) color: vec4<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world = node.model * vec4<f32>(in.position, 1.0);
    out.clip_position = frame.view_proj * world;
    out.world_position = world.xyz;
    out.normal = (node.model * vec4<f32>(in.normal, 0.0)).xyz;
    out.uv = in.uv;
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let c0 = textureSample(t_layer0, s_layer, in.uv);
    let c1 = textureSample(t_layer1, s_layer, in.uv);
    let face = cross(dpdx(in.world_position), dpdy(in.world_position));

    // Vertex alpha carries the blend weight of the second layer.
    var base = c0;
    if node.flags.y == 2u {
        base = mix(c0, c1, clamp(in.color.a, 0.0, 1.0));
    }
    let albedo = base.rgb * in.color.rgb;

    if node.flags.x == 0u {
        return vec4<f32>(albedo, 1.0);
    }

    var n = normalize(in.normal);
    if node.flags.z == 0u && dot(face, face) > 0.0 {
        let flat_n = normalize(face);
        n = select(-flat_n, flat_n, dot(flat_n, n) >= 0.0);
    }

    let l = normalize(-frame.light_dir.xyz);
    let lambert = max(dot(n, l), 0.0);
    let light = node.ambient.rgb * frame.light_dir.w + node.diffuse.rgb * lambert;
    return vec4<f32>(albedo * light, node.diffuse.a);
}
"#;
