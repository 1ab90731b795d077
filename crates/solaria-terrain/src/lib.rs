//! Procedural heightfield terrain: a fixed vertex grid displaced by random
//! radial bumps, with accumulated normals and a slope-driven layer mask.

mod bounds;
mod grid;
mod kernel;
mod mesh;
mod normals;

pub use bounds::Aabb;
pub use grid::{
    GRID_HEIGHT, GRID_SPACING, GRID_WIDTH, TRIANGLE_COUNT, TerrainVertex, UV_TILING, VERTEX_COUNT,
    flat_grid, grid_indices, vertex_index,
};
pub use kernel::{Bump, BumpKernel};
pub use mesh::{TerrainMesh, TerrainParams, recenter};
pub use normals::{accumulate_normals, apply_grass_mask};
