//! The sun: a procedurally shaped, slowly spinning terrain body.

use glam::Vec3;
use solaria_config::{Config, TerrainConfig, TerrainKernel};
use solaria_scene::{
    Material, MaterialType, MeshKey, NodeId, RotationAnimator, SceneError, SceneGraph, Transform,
};
use solaria_terrain::{BumpKernel, TerrainMesh, TerrainParams};
use tracing::info;

/// Scene id given to the sun's node.
pub const SUN_NODE_ID: i32 = 0;

/// Renderer mesh slot holding the sun's terrain.
pub const SUN_MESH: MeshKey = MeshKey(0);

pub const SUN_NODE_POSITION: Vec3 = Vec3::new(0.0, 100.0, 0.0);
pub const SUN_NODE_ROTATION_DEG: Vec3 = Vec3::new(0.0, 0.0, -110.0);
pub const SUN_NODE_SCALE: f32 = 260.0;
/// Degrees per 10 ms.
pub const SUN_SPIN: Vec3 = Vec3::new(0.0, 0.3, 0.0);

/// How the sun radiates heat.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum HeatModel {
    /// No heat is emitted anywhere.
    #[default]
    Disabled,
    /// Point source: `power / (4 * PI * d^2)`.
    InverseSquare { power: f32 },
}

impl HeatModel {
    pub fn from_power(power: Option<f32>) -> Self {
        power.map_or(Self::Disabled, |power| Self::InverseSquare { power })
    }

    /// Heat flux at `distance` from the source. Distances under one unit are
    /// treated as one so the flux stays finite.
    pub fn flux_at(&self, distance: f32) -> f32 {
        match *self {
            Self::Disabled => 0.0,
            Self::InverseSquare { power } => {
                let d = distance.max(1.0);
                power / (4.0 * std::f32::consts::PI * d * d)
            }
        }
    }
}

pub fn kernel_from(kernel: TerrainKernel) -> BumpKernel {
    match kernel {
        TerrainKernel::Arctangent => BumpKernel::Arctangent,
        TerrainKernel::PotentialField => BumpKernel::PotentialField,
        TerrainKernel::Paraboloid => BumpKernel::Paraboloid,
    }
}

pub fn terrain_params(config: &TerrainConfig) -> TerrainParams {
    TerrainParams {
        seed: config.seed,
        kernel: kernel_from(config.kernel),
        bump_count: config.bump_count,
    }
}

/// The sun's look: green wireframe over rock and grass layers, lit, visible
/// from both sides.
pub fn sun_material(config: &Config) -> Material {
    Material {
        material_type: MaterialType::SolidTwoLayer,
        ambient: Material::rgba8(255, 255, 255, 255),
        diffuse: Material::rgba8(0, 192, 0, 255),
        wireframe: config.render.wireframe,
        backface_culling: false,
        lighting: true,
        layers: [
            Some(config.sun.rock_texture.clone()),
            Some(config.sun.grass_texture.clone()),
        ],
        ..Material::default()
    }
}

/// Game-side sun entity. The terrain mesh lives on a scene node; the entity
/// keeps the physical properties.
pub struct Sun {
    node: NodeId,
    position: Vec3,
    mass: f32,
    heat: HeatModel,
    terrain: TerrainMesh,
}

impl Sun {
    /// Generate the terrain and attach it under the scene root.
    pub fn new(
        scene: &mut SceneGraph,
        position: Vec3,
        config: &Config,
    ) -> Result<Self, SceneError> {
        let terrain = TerrainMesh::generate(&terrain_params(&config.terrain));

        let transform = Transform::from_position(SUN_NODE_POSITION)
            .with_rotation_deg(SUN_NODE_ROTATION_DEG)
            .with_scale(Vec3::splat(SUN_NODE_SCALE));
        let node = scene.add_node(scene.root(), SUN_NODE_ID, transform)?;
        if let Some(scene_node) = scene.node_mut(node) {
            scene_node.material = sun_material(config);
            scene_node.mesh = Some(SUN_MESH);
            scene_node.bounds = Some(terrain.bounds);
        }
        scene.add_animator(node, Box::new(RotationAnimator::new(SUN_SPIN)))?;

        let heat = HeatModel::from_power(config.sun.heat_power);
        info!(
            seed = terrain.seed,
            triangles = terrain.triangle_count(),
            mass = config.sun.mass,
            ?heat,
            "Sun created"
        );

        Ok(Self {
            node,
            position,
            mass: config.sun.mass,
            heat,
            terrain,
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn heat_model(&self) -> HeatModel {
        self.heat
    }

    /// Heat flux received at `at`.
    pub fn heat_emitted(&self, at: Vec3) -> f32 {
        self.heat.flux_at(self.position.distance(at))
    }

    pub fn terrain(&self) -> &TerrainMesh {
        &self.terrain
    }
}
