//! Per-vertex normals and the slope-driven layer mask.

use glam::Vec3;

use crate::grid::TerrainVertex;

/// Accumulate face normals into every vertex, then normalise.
///
/// The face normal of triangle `(a, b, c)` is `-(b - a) x (c - a)`, which
/// points up (+Y) for the grid's winding. It is summed unnormalised, so each
/// face contributes in proportion to its area. Vertices touched by no
/// triangle keep a zero normal.
pub fn accumulate_normals(vertices: &mut [TerrainVertex], indices: &[u16]) {
    let mut sums = vec![Vec3::ZERO; vertices.len()];

    for tri in indices.chunks_exact(3) {
        let [ia, ib, ic] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let a = Vec3::from(vertices[ia].position);
        let b = Vec3::from(vertices[ib].position);
        let c = Vec3::from(vertices[ic].position);

        let n = -(b - a).cross(c - a);
        sums[ia] += n;
        sums[ib] += n;
        sums[ic] += n;
    }

    for (vertex, sum) in vertices.iter_mut().zip(sums) {
        vertex.normal = sum.normalize_or_zero().to_array();
    }
}

/// Write the grass mask into each vertex's alpha channel.
///
/// Flat ground (normal close to +Y) gets alpha 1 and shows the second layer;
/// steep slopes fall toward 0 and show the first.
pub fn apply_grass_mask(vertices: &mut [TerrainVertex]) {
    for vertex in vertices {
        let ny = vertex.normal[1].clamp(0.0, 1.0);
        vertex.color = [1.0, 1.0, 1.0, ny];
    }
}
