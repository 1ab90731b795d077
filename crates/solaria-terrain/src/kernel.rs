//! Radial bump kernels that displace the grid vertically.
//!
//! Each bump has a centre in grid-index space and a pair of randomly drawn
//! shape parameters. Distances are measured in grid cells, not local units.

use rand::Rng;

use crate::grid::{GRID_HEIGHT, GRID_WIDTH, TerrainVertex, vertex_index};

/// Truncated pi used by the arctangent kernel. Only affects the constant
/// offset, which recentring removes.
const ARCTAN_PI: f32 = 3.1416;

/// Shape of the bumps summed into the heightfield.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BumpKernel {
    /// Soft plateau: `mag * atan(1 - d / rad) / PI + PI / 2`.
    #[default]
    Arctangent,
    /// Inverse-power spike: `mag / (d^2)^exp`. Magnitude may be negative.
    PotentialField,
    /// Paraboloid of revolution clipped at zero: `mag - d^4 / rad`.
    Paraboloid,
}

impl BumpKernel {
    /// How many bumps a heightfield gets when no count is specified.
    pub fn default_bump_count(self) -> usize {
        match self {
            BumpKernel::Arctangent => 10,
            BumpKernel::PotentialField | BumpKernel::Paraboloid => 1000,
        }
    }

    /// Draw one bump's parameters and centre from `rng`.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> Bump {
        let (magnitude, shape) = match self {
            BumpKernel::Arctangent => {
                let mag = rng.random_range(0..200) as f32 + 300.0;
                let rad = rng.random_range(0..1000) as f32 + 1000.0;
                (mag / 4000.0, rad / 150.0)
            }
            BumpKernel::PotentialField => {
                let mag = rng.random_range(0..100) as f32 - 50.0;
                let exp = rng.random_range(0..20) as f32 + 10.0;
                (mag / 500.0, exp / 100.0)
            }
            BumpKernel::Paraboloid => {
                let mag = rng.random_range(0..100) as f32;
                let rad = rng.random_range(0..50_000_000) as f32 + 1_000_000.0;
                (mag / 4000.0, rad / 100.0)
            }
        };
        let cx = rng.random_range(0..GRID_WIDTH) as f32 + 0.5;
        let cy = rng.random_range(0..GRID_HEIGHT) as f32 + 0.5;

        Bump {
            kernel: self,
            magnitude,
            shape,
            center: [cx, cy],
        }
    }
}

/// A single sampled bump.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bump {
    pub kernel: BumpKernel,
    /// Peak height scale.
    pub magnitude: f32,
    /// Radius for the arctangent and paraboloid kernels, exponent for the
    /// potential field.
    pub shape: f32,
    /// Centre in grid-index coordinates. Always offset by half a cell so no
    /// vertex sits exactly on it.
    pub center: [f32; 2],
}

impl Bump {
    /// Height contribution at squared grid distance `dist_sq`.
    pub fn height_at(&self, dist_sq: f32) -> f32 {
        match self.kernel {
            BumpKernel::Arctangent => {
                let k = 1.0 / self.shape;
                let dist = dist_sq.sqrt();
                self.magnitude * (1.0 - dist * k).atan() / ARCTAN_PI + ARCTAN_PI / 2.0
            }
            BumpKernel::PotentialField => self.magnitude / dist_sq.powf(self.shape),
            BumpKernel::Paraboloid => {
                let falloff = dist_sq * dist_sq / self.shape;
                if falloff < self.magnitude {
                    self.magnitude - falloff
                } else {
                    0.0
                }
            }
        }
    }

    /// Add this bump to every vertex of the grid.
    pub fn apply(&self, vertices: &mut [TerrainVertex]) {
        let [cx, cy] = self.center;
        for x in 0..GRID_WIDTH {
            for y in 0..GRID_HEIGHT {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                vertices[vertex_index(x, y)].position[1] += self.height_at(dx * dx + dy * dy);
            }
        }
    }
}
