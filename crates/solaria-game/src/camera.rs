//! Smoothed follow camera.
//!
//! [`FollowCamera::focus_on`] sets where the camera should be and what it
//! should look at; [`FollowCamera::update`] eases the real camera toward that
//! goal once per simulation step.

use glam::{Quat, Vec3};
use solaria_config::CameraConfig;
use solaria_render::Camera;

/// Distance below which the camera jumps straight to its goal.
pub const SNAP_EPSILON: f32 = 0.01;

/// Orbit elevation limit, keeping the camera off the poles where the
/// look-at basis degenerates.
pub const MAX_ELEVATION: f32 = 85.0 * std::f32::consts::PI / 180.0;

#[derive(Debug, Clone)]
pub struct FollowCamera {
    pub camera: Camera,
    target: Vec3,
    desired_target: Vec3,
    desired_position: Vec3,
    /// Fraction of the remaining distance covered per update, in `(0, 1]`.
    follow_speed: f32,
}

impl FollowCamera {
    /// Camera already resting at `position` and looking at `target`.
    pub fn new(mut camera: Camera, follow_speed: f32, target: Vec3, position: Vec3) -> Self {
        camera.position = position;
        camera.look_at(target);
        Self {
            camera,
            target,
            desired_target: target,
            desired_position: position,
            follow_speed: follow_speed.clamp(f32::EPSILON, 1.0),
        }
    }

    /// Build from config, placed at `target + offset`.
    pub fn from_config(config: &CameraConfig, target: Vec3, aspect_ratio: f32) -> Self {
        let camera = Camera {
            fov_y: config.fov_degrees.to_radians(),
            aspect_ratio,
            near: config.near,
            far: config.far,
            ..Camera::default()
        };
        Self::new(
            camera,
            config.follow_speed,
            target,
            target + Vec3::from(config.offset),
        )
    }

    /// Set the goal the camera eases toward.
    pub fn focus_on(&mut self, target: Vec3, position: Vec3) {
        self.desired_target = target;
        self.desired_position = position;
    }

    /// Advance one step toward the goal and refresh the render camera.
    pub fn update(&mut self) {
        let position = approach(self.camera.position, self.desired_position, self.follow_speed);
        self.target = approach(self.target, self.desired_target, self.follow_speed);
        self.camera.position = position;
        self.camera.look_at(self.target);
    }

    /// Swing the desired position around the desired target. `yaw` turns
    /// about world +Y; `pitch` raises or lowers, limited to [`MAX_ELEVATION`].
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let mut offset = Quat::from_rotation_y(yaw) * (self.desired_position - self.desired_target);

        let length = offset.length();
        if pitch != 0.0
            && length > 0.0
            && let Some(axis) = offset.cross(Vec3::Y).try_normalize()
        {
            let elevation = (offset.y / length).clamp(-1.0, 1.0).asin();
            let clamped = (elevation + pitch).clamp(-MAX_ELEVATION, MAX_ELEVATION);
            offset = Quat::from_axis_angle(axis, clamped - elevation) * offset;
        }

        self.desired_position = self.desired_target + offset;
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn desired_target(&self) -> Vec3 {
        self.desired_target
    }

    pub fn desired_position(&self) -> Vec3 {
        self.desired_position
    }

    /// Whether the camera has reached its goal.
    pub fn is_settled(&self) -> bool {
        self.camera.position == self.desired_position && self.target == self.desired_target
    }
}

fn approach(current: Vec3, desired: Vec3, t: f32) -> Vec3 {
    let next = current.lerp(desired, t);
    if next.distance(desired) <= SNAP_EPSILON {
        desired
    } else {
        next
    }
}
