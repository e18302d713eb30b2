//! Bounding volumes for visibility queries
//!
//! Planes face inward: a point is inside a plane's half-space when its
//! signed distance is non-negative.

use crate::foundation::math::{Mat4, Vec3, Vec4, EPSILON};

/// Axis-Aligned Bounding Box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Slab test against a ray
    ///
    /// Returns the distance to the entry point, or 0 when the origin is
    /// inside the box.
    pub fn intersect_ray(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let inv = direction.map(|d| if d == 0.0 { f32::INFINITY } else { 1.0 / d });

        let t1 = (self.min - origin).component_mul(&inv);
        let t2 = (self.max - origin).component_mul(&inv);

        let tmin = t1.x.min(t2.x).max(t1.y.min(t2.y)).max(t1.z.min(t2.z));
        let tmax = t1.x.max(t2.x).min(t1.y.max(t2.y)).min(t1.z.max(t2.z));

        if tmax >= tmin && tmax >= 0.0 {
            Some(tmin.max(0.0))
        } else {
            None
        }
    }
}

/// Plane defined by normal and distance from origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal
    pub normal: Vec3,
    /// Signed offset so that `normal · p + distance = 0` on the plane
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from normal and distance
    pub fn new(normal: Vec3, distance: f32) -> Self {
        let length = normal.norm();
        if length < EPSILON {
            return Self { normal, distance };
        }
        Self {
            normal: normal / length,
            distance: distance / length,
        }
    }

    /// Create a plane from `(a, b, c, d)` coefficients of `ax + by + cz + d = 0`
    pub fn from_coefficients(coefficients: Vec4) -> Self {
        Self::new(coefficients.xyz(), coefficients.w)
    }

    /// Calculate signed distance from plane to point
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.distance
    }
}

/// Six-plane view volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Planes in the order left, right, bottom, top, near, far
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create a frustum from six planes
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix
    ///
    /// Gribb-Hartmann extraction for clip-space depth in `[-w, w]`.
    pub fn from_matrix(view_projection: &Mat4) -> Self {
        let row = |i: usize| -> Vec4 { view_projection.row(i).transpose() };
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        Self {
            planes: [
                Plane::from_coefficients(r3 + r0),
                Plane::from_coefficients(r3 - r0),
                Plane::from_coefficients(r3 + r1),
                Plane::from_coefficients(r3 - r1),
                Plane::from_coefficients(r3 + r2),
                Plane::from_coefficients(r3 - r2),
            ],
        }
    }

    /// Near clipping plane
    pub fn near(&self) -> &Plane {
        &self.planes[4]
    }

    /// Far clipping plane
    pub fn far(&self) -> &Plane {
        &self.planes[5]
    }

    /// Whether a point lies inside every plane
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|plane| plane.distance_to_point(point) >= -EPSILON)
    }

    /// Whether a sphere touches the volume
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes.iter().all(|plane| plane.distance_to_point(center) >= -radius)
    }

    /// Check if an AABB is inside or intersects the frustum
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        for plane in &self.planes {
            // Corner furthest along the plane normal
            let mut p = aabb.min;
            if plane.normal.x >= 0.0 { p.x = aabb.max.x; }
            if plane.normal.y >= 0.0 { p.y = aabb.max.y; }
            if plane.normal.z >= 0.0 { p.z = aabb.max.z; }

            if plane.distance_to_point(p) < 0.0 {
                return false;
            }
        }
        true
    }
}

impl Default for Frustum {
    /// Frustum of the identity matrix: the `[-1, 1]` cube
    fn default() -> Self {
        Self::from_matrix(&Mat4::identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{utils, Mat4Ext};
    use approx::assert_relative_eq;

    #[test]
    fn test_aabb_contains_point() {
        let aabb = AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        assert!(aabb.contains_point(Vec3::zeros()));
        assert!(aabb.contains_point(Vec3::new(0.5, 0.5, 0.5)));
        assert!(!aabb.contains_point(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_aabb_ray_slab() {
        let aabb = AABB::from_center_extents(Vec3::new(0.0, 0.0, -10.0), Vec3::new(1.0, 1.0, 1.0));
        let hit = aabb.intersect_ray(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(hit.unwrap(), 9.0);
        assert!(aabb.intersect_ray(Vec3::zeros(), Vec3::new(0.0, 0.0, 1.0)).is_none());
    }

    #[test]
    fn test_identity_frustum_is_unit_cube() {
        let frustum = Frustum::default();
        assert!(frustum.contains_point(Vec3::new(0.99, -0.99, 0.5)));
        assert!(!frustum.contains_point(Vec3::new(1.5, 0.0, 0.0)));
    }

    #[test]
    fn test_perspective_frustum_planes() {
        let projection = Mat4::perspective(utils::deg_to_rad(90.0), 1.0, 1.0, 100.0);
        let frustum = Frustum::from_matrix(&projection);

        // Near plane faces down -Z, one unit in front of the eye
        assert_relative_eq!(frustum.near().normal, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
        assert_relative_eq!(frustum.near().distance, -1.0, epsilon = 1e-4);
        assert_relative_eq!(frustum.far().distance, 100.0, epsilon = 1e-2);

        assert!(frustum.contains_point(Vec3::new(0.0, 0.0, -50.0)));
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 5.0)));
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, -0.5)));
        assert!(!frustum.contains_point(Vec3::new(0.0, 60.0, -50.0)));

        assert!(frustum.intersects_sphere(Vec3::new(0.0, 0.0, -0.5), 1.0));
        let boxed = AABB::from_center_extents(Vec3::new(0.0, 0.0, -200.0), Vec3::new(150.0, 150.0, 150.0));
        assert!(frustum.intersects_aabb(&boxed));
        let behind = AABB::from_center_extents(Vec3::new(0.0, 0.0, 10.0), Vec3::new(1.0, 1.0, 1.0));
        assert!(!frustum.intersects_aabb(&behind));
    }
}
