//! Per-node animators, run once per frame before transforms are resolved.

use glam::Vec3;

use crate::transform::Transform;

/// Mutates a node's local transform as time passes.
pub trait Animator {
    /// Advance to `now_ms`, a monotonic timestamp in milliseconds.
    fn animate(&mut self, transform: &mut Transform, now_ms: u64);
}

/// Spins a node at a constant rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationAnimator {
    /// Degrees added per 10 ms of elapsed time, per axis.
    pub degrees_per_10ms: Vec3,
    last_ms: Option<u64>,
}

impl RotationAnimator {
    pub fn new(degrees_per_10ms: Vec3) -> Self {
        Self {
            degrees_per_10ms,
            last_ms: None,
        }
    }
}

impl Animator for RotationAnimator {
    fn animate(&mut self, transform: &mut Transform, now_ms: u64) {
        // The first call only establishes the time origin.
        if let Some(last) = self.last_ms {
            let elapsed = now_ms.saturating_sub(last) as f32;
            transform.rotation_deg += self.degrees_per_10ms * (elapsed / 10.0);
            transform.wrap_rotation();
        }
        self.last_ms = Some(now_ms);
    }
}
