use glam::Vec3;

/// Axis-aligned bounding box in local f32 space.
///
/// Invariant: `min <= max` on every axis. Built by starting from a single
/// point and growing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// A degenerate box containing exactly `point`.
    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let mut aabb = Self::from_point(iter.next()?);
        for p in iter {
            aabb.add_point(p);
        }
        Some(aabb)
    }

    /// Grow to include `point`.
    pub fn add_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full size along each axis.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Bounding box of this box's eight corners under `transform`.
    pub fn transformed(&self, transform: glam::Mat4) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];
        let mut out = Self::from_point(transform.transform_point3(corners[0]));
        for c in &corners[1..] {
            out.add_point(transform.transform_point3(*c));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_empty_is_none() {
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_grows_to_contain_points() {
        let aabb = Aabb::from_points([
            Vec3::new(1.0, -2.0, 0.5),
            Vec3::new(-1.0, 3.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
        ])
        .unwrap();
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 3.0, 2.0));
        assert!(aabb.contains(Vec3::new(0.0, 0.0, 1.0)));
        assert!(aabb.contains(aabb.max));
        assert!(!aabb.contains(Vec3::new(0.0, 3.5, 1.0)));
    }

    #[test]
    fn test_center_and_extent() {
        let aabb = Aabb {
            min: Vec3::new(-1.0, 0.0, 2.0),
            max: Vec3::new(3.0, 4.0, 2.0),
        };
        assert_eq!(aabb.center(), Vec3::new(1.0, 2.0, 2.0));
        assert_eq!(aabb.extent(), Vec3::new(4.0, 4.0, 0.0));
    }

    #[test]
    fn test_transformed_by_scale_and_translation() {
        let aabb = Aabb {
            min: Vec3::splat(-0.5),
            max: Vec3::splat(0.5),
        };
        let m = glam::Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            glam::Quat::IDENTITY,
            Vec3::new(0.0, 10.0, 0.0),
        );
        let t = aabb.transformed(m);
        assert!((t.min - Vec3::new(-1.0, 9.0, -1.0)).length() < 1e-5);
        assert!((t.max - Vec3::new(1.0, 11.0, 1.0)).length() < 1e-5);
    }
}
