//! Heightfield mesh generation pipeline.
//!
//! `flat grid -> bumps -> recenter -> indices -> normals -> grass mask -> bounds`

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::bounds::Aabb;
use crate::grid::{
    GRID_HEIGHT, GRID_WIDTH, TRIANGLE_COUNT, TerrainVertex, flat_grid, grid_indices, vertex_index,
};
use crate::kernel::BumpKernel;
use crate::normals::{accumulate_normals, apply_grass_mask};

/// Inputs to [`TerrainMesh::generate`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerrainParams {
    /// RNG seed. `None` draws a fresh one from OS entropy.
    pub seed: Option<u64>,
    pub kernel: BumpKernel,
    /// Number of bumps summed into the heightfield. `None` uses the
    /// kernel's default.
    pub bump_count: Option<usize>,
}

impl TerrainParams {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    fn resolved_bump_count(&self) -> usize {
        self.bump_count
            .unwrap_or_else(|| self.kernel.default_bump_count())
    }
}

/// A generated, immutable terrain mesh ready for upload.
#[derive(Clone, Debug)]
pub struct TerrainMesh {
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u16>,
    pub bounds: Aabb,
    /// Seed actually used, so an unseeded run can be reproduced.
    pub seed: u64,
}

/// Subtract the mean height so the surface is centred on `y = 0`.
pub fn recenter(vertices: &mut [TerrainVertex]) {
    if vertices.is_empty() {
        return;
    }
    // Accumulate in f64; ten thousand f32 additions drift noticeably.
    let sum: f64 = vertices.iter().map(|v| v.position[1] as f64).sum();
    let mean = (sum / vertices.len() as f64) as f32;
    for v in vertices {
        v.position[1] -= mean;
    }
}

impl TerrainMesh {
    pub fn generate(params: &TerrainParams) -> Self {
        let seed = params.seed.unwrap_or_else(rand::random);
        if params.seed.is_none() {
            log::info!("Terrain seed not set, using random seed {seed}");
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut vertices = flat_grid();
        let bump_count = params.resolved_bump_count();
        for _ in 0..bump_count {
            params.kernel.sample(&mut rng).apply(&mut vertices);
        }
        recenter(&mut vertices);

        let indices = grid_indices();
        accumulate_normals(&mut vertices, &indices);
        apply_grass_mask(&mut vertices);

        let bounds = Aabb::from_points(vertices.iter().map(|v| Vec3::from(v.position)))
            .unwrap_or(Aabb::from_point(Vec3::ZERO));

        let mesh = Self {
            vertices,
            indices,
            bounds,
            seed,
        };
        let (lo, hi) = mesh.height_range();
        log::info!(
            "Generated terrain: {:?} x{bump_count}, seed {seed}, {} vertices, {} triangles, height [{lo:.4}, {hi:.4}]",
            params.kernel,
            mesh.vertices.len(),
            mesh.triangle_count(),
        );
        mesh
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Lowest and highest vertex elevation.
    pub fn height_range(&self) -> (f32, f32) {
        (self.bounds.min.y, self.bounds.max.y)
    }

    /// Vertex at grid coordinate `(x, y)`, or `None` outside the grid.
    pub fn vertex_at(&self, x: usize, y: usize) -> Option<&TerrainVertex> {
        if x >= GRID_WIDTH || y >= GRID_HEIGHT {
            return None;
        }
        self.vertices.get(vertex_index(x, y))
    }

    /// Whether the mesh has the expected fixed grid shape.
    pub fn is_full_grid(&self) -> bool {
        self.vertices.len() == GRID_WIDTH * GRID_HEIGHT && self.triangle_count() == TRIANGLE_COUNT
    }
}
