//! Axis-aligned boxes and spheres used as model and mesh bounds.

use serde::{Deserialize, Serialize};

use crate::math::{Mat4, Vec3, max_axis_scale, transform_point};

/// Axis-aligned bounding box.
///
/// The empty box has `min > max` on every axis and is the identity for
/// [`merge`](BoundingBox::merge).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// The empty box.
    pub fn empty() -> Self {
        Self {
            min: Vec3::repeat(f32::MAX),
            max: Vec3::repeat(f32::MIN),
        }
    }

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Whether the box contains no points.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Smallest box containing all `points`.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points
            .into_iter()
            .fold(Self::empty(), |acc, p| acc.include(p))
    }

    /// Grow the box to contain `point`.
    #[must_use]
    pub fn include(&self, point: Vec3) -> Self {
        Self {
            min: self.min.inf(&point),
            max: self.max.sup(&point),
        }
    }

    /// Smallest box containing both boxes.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// The eight corners.
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Box containing this box after transformation by `m`.
    #[must_use]
    pub fn transform(&self, m: &Mat4) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self::from_points(self.corners().into_iter().map(|c| transform_point(m, c)))
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

/// Bounding sphere.
///
/// A negative radius marks the empty sphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    /// The empty sphere.
    pub fn empty() -> Self {
        Self {
            center: Vec3::zeros(),
            radius: -1.0,
        }
    }

    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn is_empty(&self) -> bool {
        self.radius < 0.0
    }

    /// Sphere centered on the box center enclosing every point.
    pub fn from_points_around(center: Vec3, points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut radius = -1.0f32;
        for p in points {
            radius = radius.max((p - center).norm());
        }
        Self { center, radius }
    }

    /// Smallest sphere enclosing both spheres.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }

        let offset = other.center - self.center;
        let distance = offset.norm();

        // One sphere contains the other.
        if distance + other.radius <= self.radius {
            return *self;
        }
        if distance + self.radius <= other.radius {
            return *other;
        }

        let direction = offset / distance;
        let near = self.center - direction * self.radius;
        let far = other.center + direction * other.radius;
        Self {
            center: (near + far) * 0.5,
            radius: (far - near).norm() * 0.5,
        }
    }

    /// Sphere enclosing this sphere after transformation by `m`.
    #[must_use]
    pub fn transform(&self, m: &Mat4) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self {
            center: transform_point(m, self.center),
            radius: self.radius * max_axis_scale(m),
        }
    }
}

impl Default for BoundingSphere {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::mat4_from_translation;

    #[test]
    fn empty_box_is_merge_identity() {
        let b = BoundingBox::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 3.0));
        assert!(BoundingBox::empty().is_empty());
        assert_eq!(BoundingBox::empty().merge(&b), b);
        assert_eq!(b.merge(&BoundingBox::empty()), b);
    }

    #[test]
    fn box_from_points() {
        let b = BoundingBox::from_points([
            Vec3::new(1.0, -2.0, 0.5),
            Vec3::new(-1.0, 3.0, 0.0),
        ]);
        assert_eq!(b.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 3.0, 0.5));
        assert_eq!(b.center(), Vec3::new(0.0, 0.5, 0.25));
    }

    #[test]
    fn box_transform_translates() {
        let b = BoundingBox::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let t = b.transform(&mat4_from_translation(Vec3::new(5.0, 0.0, 0.0)));
        assert_eq!(t.min, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(t.max, Vec3::new(6.0, 1.0, 1.0));
    }

    #[test]
    fn sphere_merge_disjoint() {
        let a = BoundingSphere::new(Vec3::zeros(), 1.0);
        let b = BoundingSphere::new(Vec3::new(4.0, 0.0, 0.0), 1.0);
        let m = a.merge(&b);
        assert!((m.center - Vec3::new(2.0, 0.0, 0.0)).norm() < 1e-5);
        assert!((m.radius - 3.0).abs() < 1e-5);
    }

    #[test]
    fn sphere_merge_contained() {
        let big = BoundingSphere::new(Vec3::zeros(), 5.0);
        let small = BoundingSphere::new(Vec3::new(1.0, 0.0, 0.0), 1.0);
        assert_eq!(big.merge(&small), big);
        assert_eq!(small.merge(&big), big);
        assert_eq!(BoundingSphere::empty().merge(&small), small);
    }

    #[test]
    fn sphere_around_center() {
        let s = BoundingSphere::from_points_around(
            Vec3::zeros(),
            [Vec3::new(3.0, 4.0, 0.0), Vec3::new(1.0, 0.0, 0.0)],
        );
        assert!((s.radius - 5.0).abs() < 1e-6);
    }
}
