//! Axis-aligned bounding boxes.

use crate::Vec3;

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl BoundingBox {
    /// Creates a bounding box from its corners.
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Whether the boxes overlap, including touching faces.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Whether `point` lies inside the box, including the boundary.
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Center point of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Extent of the box per axis.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersects() {
        let a = BoundingBox::new(Vec3::ZERO, Vec3::new(2.0, 2.0, 2.0));
        let b = BoundingBox::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(3.0, 3.0, 3.0));
        let c = BoundingBox::new(Vec3::new(3.0, 3.0, 3.0), Vec3::new(4.0, 4.0, 4.0));

        assert!(a.intersects(&b));
        assert!(b.intersects(&c));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_contains_point() {
        let b = BoundingBox::new(Vec3::ZERO, Vec3::new(10.0, 2.0, 10.0));

        assert!(b.contains_point(Vec3::new(5.0, 1.0, 5.0)));
        assert!(b.contains_point(Vec3::ZERO));
        assert!(!b.contains_point(Vec3::new(5.0, 3.0, 5.0)));
    }

    #[test]
    fn test_union() {
        let a = BoundingBox::new(Vec3::ZERO, Vec3::ONE);
        let b = BoundingBox::new(Vec3::new(-1.0, 0.0, 0.5), Vec3::new(0.5, 2.0, 0.5));
        let u = a.union(&b);

        assert_eq!(u.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(u.max, Vec3::new(1.0, 2.0, 1.0));
    }

    #[test]
    fn test_center_and_size() {
        let b = BoundingBox::new(Vec3::ZERO, Vec3::new(10.0, 4.0, 6.0));

        assert_eq!(b.center(), Vec3::new(5.0, 2.0, 3.0));
        assert_eq!(b.size(), Vec3::new(10.0, 4.0, 6.0));
    }
}
