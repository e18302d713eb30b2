//! Rays for picking

use super::frustum::{Plane, AABB};
use crate::foundation::math::{Vec3, EPSILON};

/// Half-line with a unit direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing the direction
    ///
    /// Returns `None` when the direction has (near) zero length.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        direction
            .try_normalize(EPSILON)
            .map(|direction| Self { origin, direction })
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to a plane, if the ray hits it going forward
    pub fn intersect_plane(&self, plane: &Plane) -> Option<f32> {
        let denom = plane.normal.dot(&self.direction);
        if denom.abs() < EPSILON {
            return None;
        }
        let t = -plane.distance_to_point(self.origin) / denom;
        (t >= 0.0).then_some(t)
    }

    /// Distance along the ray to a box
    pub fn intersect_aabb(&self, aabb: &AABB) -> Option<f32> {
        aabb.intersect_ray(self.origin, self.direction)
    }

    /// Shortest distance from the ray to a point
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        let t = (point - self.origin).dot(&self.direction).max(0.0);
        (point - self.point_at(t)).norm()
    }
}
