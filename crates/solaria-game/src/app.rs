//! Window, GPU setup and the per-frame loop.
//!
//! [`App`] implements winit's [`ApplicationHandler`]. The scene, sun and
//! camera are built up front; GPU resources appear once the window exists.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec3;
use solaria_config::Config;
use solaria_render::{
    BufferAllocator, DepthBuffer, FrameBinding, FrameEncoder, FrameUniform, LayerTexture,
    MeshBuffer, NodeBinding, NodeUniform, PipelineKey, RenderContext, RenderPassBuilder,
    SurfaceError, SurfaceWrapper, TerrainPipeline, draw_node, init_render_context_blocking,
};
use solaria_scene::{Material, MeshKey, NodeId, SceneGraph};
use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::camera::FollowCamera;
use crate::clock::FrameClock;
use crate::error::GameError;
use crate::input::{KeyboardState, OrbitInput};
use crate::sun::{SUN_MESH, Sun};

/// Colour used for a missing first layer.
const ROCK_FALLBACK: [u8; 4] = [120, 110, 100, 255];
/// Colour used for a missing second layer.
const GRASS_FALLBACK: [u8; 4] = [60, 160, 60, 255];

pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attributes = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ));
    if config.window.fullscreen {
        attributes.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attributes
    }
}

pub fn clear_color(config: &Config) -> wgpu::Color {
    let [r, g, b, a] = config.render.clear_color;
    wgpu::Color { r, g, b, a }
}

/// GPU resources for one drawable node.
struct NodeResources {
    pipeline: PipelineKey,
    uniform: NodeBinding,
    layers: wgpu::BindGroup,
}

/// Nodes that need GPU resources: every node carrying a mesh, visible or not,
/// so one shown later can be drawn without another upload.
fn mesh_nodes(scene: &SceneGraph) -> Vec<NodeId> {
    scene
        .descendants()
        .into_iter()
        .filter(|&id| scene.node(id).is_some_and(|node| node.mesh.is_some()))
        .collect()
}

/// Everything that only exists once a window and device are available.
struct Renderer {
    gpu: RenderContext,
    queue: Arc<wgpu::Queue>,
    depth: DepthBuffer,
    pipeline: TerrainPipeline,
    frame: FrameBinding,
    meshes: HashMap<MeshKey, MeshBuffer>,
    nodes: HashMap<NodeId, NodeResources>,
}

impl Renderer {
    fn new(gpu: RenderContext, scene: &SceneGraph, sun: &Sun, frame: &FrameUniform) -> Self {
        let queue = Arc::new(gpu.queue.clone());
        let depth = DepthBuffer::new(
            &gpu.device,
            gpu.surface_config.width,
            gpu.surface_config.height,
        );
        let mut pipeline =
            TerrainPipeline::new(&gpu.device, gpu.surface_format, gpu.wireframe_supported);
        let frame = FrameBinding::new(&gpu.device, &pipeline, frame);

        let mut meshes = HashMap::new();
        meshes.insert(
            SUN_MESH,
            BufferAllocator::new(&gpu.device).create_terrain_mesh("sun-terrain", sun.terrain()),
        );

        let mut nodes = HashMap::new();
        for id in mesh_nodes(scene) {
            let Some(node) = scene.node(id) else {
                continue;
            };
            let key = pipeline.prepare(&gpu.device, &node.material);
            let (layer0, layer1) = load_layers(&gpu, &node.material);
            let layers = pipeline.create_layer_binding(&gpu.device, &layer0, &layer1);
            let uniform = NodeBinding::new(
                &gpu.device,
                &pipeline,
                &NodeUniform::new(node.absolute_transform(), &node.material),
            );
            nodes.insert(
                id,
                NodeResources {
                    pipeline: key,
                    uniform,
                    layers,
                },
            );
        }
        info!(
            nodes = nodes.len(),
            pipelines = pipeline.pipeline_count(),
            "Scene uploaded to GPU"
        );

        Self {
            gpu,
            queue,
            depth,
            pipeline,
            frame,
            meshes,
            nodes,
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.depth.resize(&self.gpu.device, width, height);
    }
}

fn load_layers(gpu: &RenderContext, material: &Material) -> (LayerTexture, LayerTexture) {
    let load = |path: Option<&std::path::Path>, fallback| match path {
        Some(path) => LayerTexture::load_or_solid(&gpu.device, &gpu.queue, path, fallback),
        None => LayerTexture::solid(&gpu.device, &gpu.queue, [255; 4]),
    };
    let layer0 = load(material.layers[0].as_deref(), ROCK_FALLBACK);
    let layer1 = if material.layer_count() > 1 {
        load(material.layers[1].as_deref(), GRASS_FALLBACK)
    } else {
        LayerTexture::solid(&gpu.device, &gpu.queue, [255; 4])
    };
    (layer0, layer1)
}

pub struct App {
    config: Config,
    scene: SceneGraph,
    sun: Sun,
    follow: FollowCamera,
    clock: FrameClock,
    keyboard: KeyboardState,
    surface_wrapper: SurfaceWrapper,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    error: Option<GameError>,
}

impl App {
    /// Build the scene and camera. No window or GPU is touched yet.
    pub fn new(config: Config) -> Result<Self, GameError> {
        let mut scene = SceneGraph::new();
        let sun = Sun::new(&mut scene, Vec3::from(config.sun.position), &config)?;
        scene.update_absolute_transforms();

        let focus = scene
            .node(sun.node())
            .map_or(Vec3::ZERO, |node| node.transform.position);
        let aspect = config.window.width as f32 / config.window.height.max(1) as f32;
        let follow = FollowCamera::from_config(&config.camera, focus, aspect);
        let surface_wrapper = SurfaceWrapper::new(config.window.width, config.window.height, 1.0);

        Ok(Self {
            config,
            scene,
            sun,
            follow,
            clock: FrameClock::new(),
            keyboard: KeyboardState::new(),
            surface_wrapper,
            window: None,
            renderer: None,
            error: None,
        })
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn sun(&self) -> &Sun {
        &self.sun
    }

    pub fn follow_camera(&self) -> &FollowCamera {
        &self.follow
    }

    pub fn keyboard_mut(&mut self) -> &mut KeyboardState {
        &mut self.keyboard
    }

    /// One fixed simulation step at simulated time `sim_ms`.
    pub fn step(&mut self, sim_ms: u64) {
        let orbit = OrbitInput::from_keyboard(&self.keyboard);
        if !orbit.is_idle() {
            let step = self.config.camera.orbit_step_degrees.to_radians();
            self.follow.orbit(orbit.yaw * step, orbit.pitch * step);
        }
        self.scene.animate(sim_ms);
        self.follow.update();
    }

    /// Run the steps covered by `frame_time` seconds and resolve transforms.
    pub fn advance(&mut self, frame_time: f64) {
        let mut steps = Vec::new();
        self.clock.advance(frame_time, |_, sim_ms| steps.push(sim_ms));
        self.run_steps(&steps);
    }

    fn tick(&mut self) {
        let mut steps = Vec::new();
        self.clock.tick(|_, sim_ms| steps.push(sim_ms));
        self.run_steps(&steps);
    }

    fn run_steps(&mut self, steps: &[u64]) {
        for &sim_ms in steps {
            self.step(sim_ms);
        }
        self.keyboard.clear_transients();
        self.scene.update_absolute_transforms();
    }

    fn render(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if !self.surface_wrapper.is_configured() {
            return;
        }

        let light = Vec3::from(self.config.render.light_direction);
        renderer.frame.update(
            &renderer.queue,
            &FrameUniform::new(&self.follow.camera, light, self.config.render.ambient),
        );

        let visible = self.scene.pre_render();
        for &id in &visible {
            if let (Some(node), Some(resources)) = (self.scene.node(id), renderer.nodes.get(&id)) {
                resources.uniform.update(
                    &renderer.queue,
                    &NodeUniform::new(node.absolute_transform(), &node.material),
                );
            }
        }

        let surface_texture = match renderer.gpu.get_current_texture() {
            Ok(texture) => texture,
            Err(SurfaceError::Timeout) => {
                debug!("Surface timeout, skipping frame");
                return;
            }
            Err(e) => {
                warn!("Failed to acquire surface texture: {e}");
                return;
            }
        };

        let mut frame = FrameEncoder::new(
            &renderer.gpu.device,
            Arc::clone(&renderer.queue),
            surface_texture,
        );
        let builder = RenderPassBuilder::new()
            .clear_color(clear_color(&self.config))
            .depth(renderer.depth.view.clone(), DepthBuffer::CLEAR_VALUE)
            .label("scene-pass");

        if let Some(mut pass) = frame.begin_render_pass(&builder) {
            for id in &visible {
                let Some(mesh_key) = self.scene.node(*id).and_then(|node| node.mesh) else {
                    continue;
                };
                let (Some(resources), Some(mesh)) =
                    (renderer.nodes.get(id), renderer.meshes.get(&mesh_key))
                else {
                    continue;
                };
                let Some(pipeline) = renderer.pipeline.pipeline(&resources.pipeline) else {
                    continue;
                };
                draw_node(
                    &mut pass,
                    pipeline,
                    &renderer.frame,
                    &resources.uniform,
                    &resources.layers,
                    mesh,
                );
            }
        }
        frame.submit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: GameError) {
        error!("{err}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn apply_resize(&mut self, width: u32, height: u32) {
        self.follow
            .camera
            .set_aspect_ratio(width as f32, height as f32);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.resize(width, height);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(window_attributes_from_config(&self.config)) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let size = window.inner_size();
        self.surface_wrapper = SurfaceWrapper::new(size.width, size.height, window.scale_factor());
        let physical = self.surface_wrapper.physical_size();
        self.follow
            .camera
            .set_aspect_ratio(physical.width as f32, physical.height as f32);

        let gpu = match init_render_context_blocking(Arc::clone(&window), self.config.window.vsync)
        {
            Ok(gpu) => gpu,
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let frame = FrameUniform::new(
            &self.follow.camera,
            Vec3::from(self.config.render.light_direction),
            self.config.render.ambient,
        );
        self.renderer = Some(Renderer::new(gpu, &self.scene, &self.sun, &frame));
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(resize) = self.surface_wrapper.handle_resize(size.width, size.height) {
                    self.apply_resize(resize.physical.width, resize.physical.height);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let Some(size) = self.window.as_ref().map(|w| w.inner_size()) else {
                    return;
                };
                if let Some(resize) = self.surface_wrapper.handle_scale_factor_changed(
                    scale_factor,
                    size.width,
                    size.height,
                ) {
                    self.apply_resize(resize.physical.width, resize.physical.height);
                }
            }
            WindowEvent::Focused(false) => self.keyboard.reset(),
            WindowEvent::KeyboardInput { event, .. } => {
                self.keyboard.process_event(&event);
                if event.state == ElementState::Pressed
                    && self.keyboard.just_pressed(KeyCode::Escape)
                {
                    info!("Escape pressed, shutting down");
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                self.tick();
                self.render();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Open the window and run until the user quits.
pub fn run(config: Config) -> Result<(), GameError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config)?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::PhysicalKey;

    use crate::input::RawKeyEvent;

    fn app() -> App {
        let mut config = Config::default();
        config.terrain.seed = Some(5);
        App::new(config).unwrap()
    }

    #[test]
    fn test_new_app_focuses_camera_on_sun() {
        let app = app();
        let sun_pos = app.scene().node(app.sun().node()).unwrap().transform.position;
        assert_eq!(app.follow_camera().target(), sun_pos);
        assert!(app.follow_camera().is_settled());
        assert_eq!(app.scene().pre_render(), vec![app.sun().node()]);
    }

    #[test]
    fn test_advance_spins_sun() {
        let mut app = app();
        app.advance(0.1);
        let before = app.scene().node(app.sun().node()).unwrap().transform.rotation_deg.y;
        app.advance(0.1);
        let after = app.scene().node(app.sun().node()).unwrap().transform.rotation_deg.y;
        assert!(after > before);
    }

    #[test]
    fn test_arrow_key_orbits_camera() {
        let mut app = app();
        let start = app.follow_camera().desired_position();
        app.keyboard_mut().process_raw(RawKeyEvent {
            key: PhysicalKey::Code(KeyCode::ArrowRight),
            state: ElementState::Pressed,
            repeat: false,
        });
        app.advance(0.1);
        let moved = app.follow_camera().desired_position();
        assert_ne!(start, moved);

        let target = app.follow_camera().desired_target();
        assert!(((start - target).length() - (moved - target).length()).abs() < 1e-2);
        // The real camera lags behind its goal.
        assert!(!app.follow_camera().is_settled());
    }

    #[test]
    fn test_hidden_sun_still_gets_gpu_resources() {
        let mut app = app();
        let sun = app.sun().node();
        app.scene.set_visible(sun, false).unwrap();
        assert!(app.scene().pre_render().is_empty());
        assert_eq!(mesh_nodes(app.scene()), vec![sun]);
    }

    #[test]
    fn test_world_bounds_follow_node_transform() {
        let app = app();
        let node = app.scene().node(app.sun().node()).unwrap();
        let bounds = node.world_bounds().unwrap();
        assert!(bounds.contains(node.transform.position));
    }

    #[test]
    fn test_clear_color_from_config() {
        let mut config = Config::default();
        config.render.clear_color = [0.1, 0.2, 0.3, 1.0];
        let color = clear_color(&config);
        assert_eq!((color.r, color.g, color.b, color.a), (0.1, 0.2, 0.3, 1.0));
    }

    #[test]
    fn test_window_attributes_use_config_title() {
        let mut config = Config::default();
        config.window.title = "Solaria test".into();
        let attrs = window_attributes_from_config(&config);
        assert_eq!(attrs.title, "Solaria test");
        assert!(attrs.fullscreen.is_none());
    }
}
