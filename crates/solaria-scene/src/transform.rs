use glam::{EulerRot, Mat4, Quat, Vec3};

/// Local placement of a scene node relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in degrees, applied X first, then Y, then Z.
    pub rotation_deg: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_deg: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_rotation_deg(mut self, rotation_deg: Vec3) -> Self {
        self.rotation_deg = rotation_deg;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn rotation(&self) -> Quat {
        let r = self.rotation_deg;
        Quat::from_euler(
            EulerRot::ZYX,
            r.z.to_radians(),
            r.y.to_radians(),
            r.x.to_radians(),
        )
    }

    /// `translation * rotation * scale`.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation(), self.position)
    }

    /// Keep every rotation angle within `[0, 360)`.
    pub fn wrap_rotation(&mut self) {
        self.rotation_deg = Vec3::new(
            self.rotation_deg.x.rem_euclid(360.0),
            self.rotation_deg.y.rem_euclid(360.0),
            self.rotation_deg.z.rem_euclid(360.0),
        );
    }
}
