//! Fixed-size vertex grid and its triangle-list index buffer.
//!
//! Vertex `(x, y)` lives at index `y * GRID_WIDTH + x`. The grid lies in the
//! local XZ plane, centred on the origin, with grid row `y` running along +Z.

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert;

/// Number of vertices along the local X axis.
pub const GRID_WIDTH: usize = 100;
/// Number of vertices along the local Z axis.
pub const GRID_HEIGHT: usize = 100;
/// Total vertex count.
pub const VERTEX_COUNT: usize = GRID_WIDTH * GRID_HEIGHT;
/// Number of triangles in the index buffer (two per cell).
pub const TRIANGLE_COUNT: usize = (GRID_WIDTH - 1) * (GRID_HEIGHT - 1) * 2;
/// Distance between adjacent vertices in local units.
pub const GRID_SPACING: f32 = 0.01;
/// Grid cells per texture repeat.
pub const UV_TILING: f32 = 10.0;

// Every vertex must be addressable with a 16-bit index.
const_assert!(VERTEX_COUNT <= u16::MAX as usize + 1);

/// A single terrain vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// Linear RGBA. Alpha carries the second-layer blend weight.
    pub color: [f32; 4],
}

impl TerrainVertex {
    /// Vertical elevation (local Y).
    pub fn height(&self) -> f32 {
        self.position[1]
    }
}

/// Index of grid vertex `(x, y)`.
#[inline]
pub fn vertex_index(x: usize, y: usize) -> usize {
    y * GRID_WIDTH + x
}

/// Build the flat, untouched grid.
pub fn flat_grid() -> Vec<TerrainVertex> {
    let half_w = (GRID_WIDTH / 2) as f32;
    let half_h = (GRID_HEIGHT / 2) as f32;

    let mut vertices = vec![TerrainVertex::zeroed(); VERTEX_COUNT];
    for x in 0..GRID_WIDTH {
        for y in 0..GRID_HEIGHT {
            vertices[vertex_index(x, y)] = TerrainVertex {
                position: [
                    (x as f32 - half_w) * GRID_SPACING,
                    0.0,
                    (y as f32 - half_h) * GRID_SPACING,
                ],
                normal: [0.0; 3],
                uv: [x as f32 / UV_TILING, y as f32 / UV_TILING],
                color: [1.0; 4],
            };
        }
    }
    vertices
}

/// Build the triangle-list index buffer: two triangles per cell, x-major.
pub fn grid_indices() -> Vec<u16> {
    let mut indices = Vec::with_capacity(TRIANGLE_COUNT * 3);
    for x in 0..GRID_WIDTH - 1 {
        for y in 0..GRID_HEIGHT - 1 {
            let i00 = vertex_index(x, y) as u16;
            let i10 = vertex_index(x + 1, y) as u16;
            let i01 = vertex_index(x, y + 1) as u16;
            let i11 = vertex_index(x + 1, y + 1) as u16;

            indices.extend_from_slice(&[i00, i11, i01]);
            indices.extend_from_slice(&[i00, i10, i11]);
        }
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_grid_layout() {
        let grid = flat_grid();
        assert_eq!(grid.len(), VERTEX_COUNT);

        let corner = grid[vertex_index(0, 0)];
        assert!((corner.position[0] + 0.5).abs() < 1e-6);
        assert!((corner.position[2] + 0.5).abs() < 1e-6);

        let centre = grid[vertex_index(GRID_WIDTH / 2, GRID_HEIGHT / 2)];
        assert_eq!(centre.position, [0.0, 0.0, 0.0]);

        let far = grid[vertex_index(GRID_WIDTH - 1, GRID_HEIGHT - 1)];
        assert!((far.position[0] - 0.49).abs() < 1e-5);
        assert!((far.position[2] - 0.49).abs() < 1e-5);
    }

    #[test]
    fn test_flat_grid_uvs_tile_every_ten_cells() {
        let grid = flat_grid();
        let v = grid[vertex_index(20, 35)];
        assert!((v.uv[0] - 2.0).abs() < 1e-6);
        assert!((v.uv[1] - 3.5).abs() < 1e-6);
    }

    #[test]
    fn test_flat_grid_starts_white_opaque_with_no_normal() {
        for v in flat_grid() {
            assert_eq!(v.color, [1.0; 4]);
            assert_eq!(v.normal, [0.0; 3]);
            assert_eq!(v.height(), 0.0);
        }
    }

    #[test]
    fn test_index_count_is_two_triangles_per_cell() {
        let indices = grid_indices();
        assert_eq!(indices.len(), TRIANGLE_COUNT * 3);
        assert_eq!(TRIANGLE_COUNT, 99 * 99 * 2);
    }

    #[test]
    fn test_indices_are_in_range() {
        assert!(
            grid_indices()
                .iter()
                .all(|&i| (i as usize) < VERTEX_COUNT)
        );
    }

    #[test]
    fn test_first_cell_triangles() {
        let indices = grid_indices();
        let w = GRID_WIDTH as u16;
        assert_eq!(&indices[0..3], &[0, w + 1, w]);
        assert_eq!(&indices[3..6], &[0, 1, w + 1]);
    }

    #[test]
    fn test_vertex_struct_is_48_bytes() {
        assert_eq!(std::mem::size_of::<TerrainVertex>(), 48);
    }
}
