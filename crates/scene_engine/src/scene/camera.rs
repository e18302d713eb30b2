//! # Runtime Camera
//!
//! A camera owns its projection parameters and derives the view,
//! projection and combined matrices from them and from the world transform
//! of the node it is attached to.
//!
//! ## Lazy Matrix Cache
//! Derived values are cached behind a set of dirty bits:
//!
//! | Change                    | Marks dirty                                        |
//! |---------------------------|----------------------------------------------------|
//! | construction              | everything                                         |
//! | projection parameter set  | projection, view-projection, inverse view-projection |
//! | node transform changed    | view, view-projection, inverse view, inverse view-projection |
//!
//! A getter recomputes its matrix only if the bit is set, then clears it,
//! so any number of mutations between reads costs one recomputation. The
//! frustum is rebuilt whenever the view-projection matrix is.
//!
//! ## Coordinate System
//! Right-handed, Y-up view space looking down -Z. Clip-space depth is in
//! `[-1, 1]`; screen space has its origin at the viewport's top-left corner
//! and depth in `[0, 1]`.
//!
//! The cache uses `Cell`, so a `Camera` is not `Sync`. Callers that share a
//! camera between threads must serialize access themselves.

use std::cell::Cell;

use bitflags::bitflags;
use thiserror::Error;

use super::frustum::Frustum;
use super::graph::TransformListener;
use super::ray::Ray;
use super::viewport::Viewport;
use crate::foundation::collections::NodeId;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3, Vec4, EPSILON};

bitflags! {
    /// Derived values that must be recomputed before their next read
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CameraDirty: u8 {
        /// World-to-view matrix
        const VIEW = 1 << 0;
        /// Projection matrix
        const PROJECTION = 1 << 1;
        /// Combined view-projection matrix (and the frustum)
        const VIEW_PROJECTION = 1 << 2;
        /// View-to-world matrix
        const INVERSE_VIEW = 1 << 3;
        /// Inverse of the combined matrix
        const INVERSE_VIEW_PROJECTION = 1 << 4;
    }
}

impl CameraDirty {
    /// Bits invalidated by a projection parameter change
    pub const PROJECTION_CHANGED: Self = Self::PROJECTION
        .union(Self::VIEW_PROJECTION)
        .union(Self::INVERSE_VIEW_PROJECTION);

    /// Bits invalidated by a node transform change
    pub const TRANSFORM_CHANGED: Self = Self::VIEW
        .union(Self::VIEW_PROJECTION)
        .union(Self::INVERSE_VIEW)
        .union(Self::INVERSE_VIEW_PROJECTION);
}

/// Invalid projection parameters
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CameraError {
    /// Field of view outside (0, 180) degrees
    #[error("Field of view must be in (0, 180) degrees, got {0}")]
    InvalidFieldOfView(f32),

    /// Aspect ratio not positive
    #[error("Aspect ratio must be positive, got {0}")]
    InvalidAspectRatio(f32),

    /// Clip planes with near <= 0 or near >= far
    #[error("Clip planes must satisfy 0 < near < far, got near {near}, far {far}")]
    InvalidClipPlanes {
        /// Near plane distance
        near: f32,
        /// Far plane distance
        far: f32,
    },

    /// Orthographic zoom not positive
    #[error("Zoom must be positive, got {0}")]
    InvalidZoom(f32),
}

/// Degenerate screen-space queries
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ProjectionError {
    /// Viewport with no area
    #[error("Viewport {width}x{height} has no area")]
    EmptyViewport {
        /// Viewport width
        width: f32,
        /// Viewport height
        height: f32,
    },

    /// Homogeneous W at or below zero: the point is at or behind the eye
    #[error("Degenerate homogeneous coordinate w = {0}")]
    DegenerateW(f32),

    /// Near and far unprojected points coincide
    #[error("Pick ray has no direction")]
    DegenerateRay,
}

/// Projection kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraType {
    /// Field-of-view frustum
    Perspective,
    /// Zoom-scaled box
    Orthographic,
}

/// Screen-space result of [`Camera::project`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// Horizontal pixel coordinate
    pub x: f32,
    /// Vertical pixel coordinate, growing downward
    pub y: f32,
    /// Depth in `[0, 1]` for points between the clip planes
    pub depth: f32,
}

/// Number of times each cached value has been recomputed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// View matrix recomputations
    pub view: u32,
    /// Projection matrix recomputations
    pub projection: u32,
    /// View-projection (and frustum) recomputations
    pub view_projection: u32,
    /// Inverse view recomputations
    pub inverse_view: u32,
    /// Inverse view-projection recomputations
    pub inverse_view_projection: u32,
}

#[derive(Debug, Clone)]
struct MatrixCache {
    view: Cell<Mat4>,
    projection: Cell<Mat4>,
    view_projection: Cell<Mat4>,
    inverse_view: Cell<Mat4>,
    inverse_view_projection: Cell<Mat4>,
    frustum: Cell<Frustum>,
    dirty: Cell<CameraDirty>,
    stats: Cell<CacheStats>,
}

impl Default for MatrixCache {
    fn default() -> Self {
        Self {
            view: Cell::new(Mat4::identity()),
            projection: Cell::new(Mat4::identity()),
            view_projection: Cell::new(Mat4::identity()),
            inverse_view: Cell::new(Mat4::identity()),
            inverse_view_projection: Cell::new(Mat4::identity()),
            frustum: Cell::new(Frustum::default()),
            dirty: Cell::new(CameraDirty::all()),
            stats: Cell::new(CacheStats::default()),
        }
    }
}

impl MatrixCache {
    fn mark(&self, bits: CameraDirty) {
        self.dirty.set(self.dirty.get() | bits);
    }

    /// Clear `bit` and return whether it was set
    fn take(&self, bit: CameraDirty) -> bool {
        let dirty = self.dirty.get();
        if dirty.contains(bit) {
            self.dirty.set(dirty - bit);
            true
        } else {
            false
        }
    }

    fn count(&self, update: impl FnOnce(&mut CacheStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }
}

/// Camera with lazily derived matrices
#[derive(Debug, Clone)]
pub struct Camera {
    camera_type: CameraType,
    /// Vertical field of view in degrees
    field_of_view: f32,
    zoom: [f32; 2],
    aspect_ratio: f32,
    near_plane: f32,
    far_plane: f32,

    node: Option<NodeId>,
    /// World transform last delivered by the node
    world: Mat4,

    cache: MatrixCache,
}

fn check_field_of_view(degrees: f32) -> Result<(), CameraError> {
    if degrees > 0.0 && degrees < 180.0 {
        Ok(())
    } else {
        Err(CameraError::InvalidFieldOfView(degrees))
    }
}

fn check_aspect_ratio(aspect: f32) -> Result<(), CameraError> {
    if aspect > 0.0 && aspect.is_finite() {
        Ok(())
    } else {
        Err(CameraError::InvalidAspectRatio(aspect))
    }
}

fn check_clip_planes(near: f32, far: f32) -> Result<(), CameraError> {
    if near > 0.0 && far.is_finite() && near < far {
        Ok(())
    } else {
        Err(CameraError::InvalidClipPlanes { near, far })
    }
}

fn check_zoom(zoom: f32) -> Result<(), CameraError> {
    if zoom > 0.0 && zoom.is_finite() {
        Ok(())
    } else {
        Err(CameraError::InvalidZoom(zoom))
    }
}

impl Camera {
    /// Create a perspective camera
    ///
    /// # Arguments
    /// * `field_of_view` - Vertical field of view in degrees, in (0, 180)
    /// * `aspect_ratio` - Viewport width / height, positive
    /// * `near_plane` - Distance to near clipping plane (must be > 0)
    /// * `far_plane` - Distance to far clipping plane (must be > near)
    pub fn perspective(field_of_view: f32, aspect_ratio: f32, near_plane: f32, far_plane: f32) -> Result<Self, CameraError> {
        check_field_of_view(field_of_view)?;
        check_aspect_ratio(aspect_ratio)?;
        check_clip_planes(near_plane, far_plane)?;
        Ok(Self {
            camera_type: CameraType::Perspective,
            field_of_view,
            zoom: [1.0, 1.0],
            aspect_ratio,
            near_plane,
            far_plane,
            node: None,
            world: Mat4::identity(),
            cache: MatrixCache::default(),
        })
    }

    /// Create an orthographic camera
    ///
    /// The visible box is `zoom_x * aspect_ratio` wide and `zoom_y` tall,
    /// centred on the view axis.
    pub fn orthographic(zoom_x: f32, zoom_y: f32, aspect_ratio: f32, near_plane: f32, far_plane: f32) -> Result<Self, CameraError> {
        check_zoom(zoom_x)?;
        check_zoom(zoom_y)?;
        check_aspect_ratio(aspect_ratio)?;
        check_clip_planes(near_plane, far_plane)?;
        Ok(Self {
            camera_type: CameraType::Orthographic,
            field_of_view: 45.0,
            zoom: [zoom_x, zoom_y],
            aspect_ratio,
            near_plane,
            far_plane,
            node: None,
            world: Mat4::identity(),
            cache: MatrixCache::default(),
        })
    }

    /// Projection kind
    pub fn camera_type(&self) -> CameraType {
        self.camera_type
    }

    /// Vertical field of view in degrees
    pub fn field_of_view(&self) -> f32 {
        self.field_of_view
    }

    /// Horizontal orthographic zoom
    pub fn zoom_x(&self) -> f32 {
        self.zoom[0]
    }

    /// Vertical orthographic zoom
    pub fn zoom_y(&self) -> f32 {
        self.zoom[1]
    }

    /// Aspect ratio
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Near plane distance
    pub fn near_plane(&self) -> f32 {
        self.near_plane
    }

    /// Far plane distance
    pub fn far_plane(&self) -> f32 {
        self.far_plane
    }

    fn projection_changed(&self) {
        self.cache.mark(CameraDirty::PROJECTION_CHANGED);
    }

    /// Set the vertical field of view in degrees
    pub fn set_field_of_view(&mut self, degrees: f32) -> Result<(), CameraError> {
        check_field_of_view(degrees)?;
        self.field_of_view = degrees;
        self.projection_changed();
        log::trace!("Camera field of view set to {}", degrees);
        Ok(())
    }

    /// Set the horizontal orthographic zoom
    pub fn set_zoom_x(&mut self, zoom: f32) -> Result<(), CameraError> {
        check_zoom(zoom)?;
        self.zoom[0] = zoom;
        self.projection_changed();
        log::trace!("Camera zoom x set to {}", zoom);
        Ok(())
    }

    /// Set the vertical orthographic zoom
    pub fn set_zoom_y(&mut self, zoom: f32) -> Result<(), CameraError> {
        check_zoom(zoom)?;
        self.zoom[1] = zoom;
        self.projection_changed();
        log::trace!("Camera zoom y set to {}", zoom);
        Ok(())
    }

    /// Set the aspect ratio
    pub fn set_aspect_ratio(&mut self, aspect: f32) -> Result<(), CameraError> {
        check_aspect_ratio(aspect)?;
        self.aspect_ratio = aspect;
        self.projection_changed();
        log::trace!("Camera aspect ratio set to {}", aspect);
        Ok(())
    }

    /// Set the near plane distance
    pub fn set_near_plane(&mut self, near: f32) -> Result<(), CameraError> {
        check_clip_planes(near, self.far_plane)?;
        self.near_plane = near;
        self.projection_changed();
        log::trace!("Camera near plane set to {}", near);
        Ok(())
    }

    /// Set the far plane distance
    pub fn set_far_plane(&mut self, far: f32) -> Result<(), CameraError> {
        check_clip_planes(self.near_plane, far)?;
        self.far_plane = far;
        self.projection_changed();
        log::trace!("Camera far plane set to {}", far);
        Ok(())
    }

    /// Node this camera is attached to
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub(crate) fn set_node(&mut self, node: Option<NodeId>) {
        self.node = node;
    }

    /// World transform last delivered to this camera
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world
    }

    /// Accept a new world transform for the camera's node
    pub fn transform_changed(&mut self, world: &Mat4) {
        self.world = *world;
        self.cache.mark(CameraDirty::TRANSFORM_CHANGED);
    }

    /// Currently stale derived values
    pub fn dirty(&self) -> CameraDirty {
        self.cache.dirty.get()
    }

    /// Recomputation counters
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats.get()
    }

    /// World-to-view matrix
    pub fn view_matrix(&self) -> Mat4 {
        if self.cache.take(CameraDirty::VIEW) {
            let view = self.world.try_inverse().unwrap_or_else(|| {
                log::warn!("Camera node transform is not invertible, using identity view");
                Mat4::identity()
            });
            self.cache.view.set(view);
            self.cache.count(|s| s.view += 1);
            log::trace!("Camera view matrix recomputed");
        }
        self.cache.view.get()
    }

    /// View-to-world matrix
    pub fn inverse_view_matrix(&self) -> Mat4 {
        if self.cache.take(CameraDirty::INVERSE_VIEW) {
            let view = self.view_matrix();
            let inverse = view.try_inverse().unwrap_or_else(Mat4::identity);
            self.cache.inverse_view.set(inverse);
            self.cache.count(|s| s.inverse_view += 1);
        }
        self.cache.inverse_view.get()
    }

    /// Projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        if self.cache.take(CameraDirty::PROJECTION) {
            let projection = match self.camera_type {
                CameraType::Perspective => Mat4::perspective(
                    utils::deg_to_rad(self.field_of_view),
                    self.aspect_ratio,
                    self.near_plane,
                    self.far_plane,
                ),
                CameraType::Orthographic => Mat4::orthographic(
                    self.zoom[0] * self.aspect_ratio,
                    self.zoom[1],
                    self.near_plane,
                    self.far_plane,
                ),
            };
            self.cache.projection.set(projection);
            self.cache.count(|s| s.projection += 1);
            log::trace!("Camera projection matrix recomputed");
        }
        self.cache.projection.get()
    }

    /// Combined world-to-clip matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        if self.cache.take(CameraDirty::VIEW_PROJECTION) {
            let view_projection = self.projection_matrix() * self.view_matrix();
            self.cache.view_projection.set(view_projection);
            self.cache.frustum.set(Frustum::from_matrix(&view_projection));
            self.cache.count(|s| s.view_projection += 1);
        }
        self.cache.view_projection.get()
    }

    /// Clip-to-world matrix
    pub fn inverse_view_projection_matrix(&self) -> Mat4 {
        if self.cache.take(CameraDirty::INVERSE_VIEW_PROJECTION) {
            let inverse = self.view_projection_matrix().try_inverse().unwrap_or_else(|| {
                log::warn!("Camera view-projection matrix is not invertible");
                Mat4::identity()
            });
            self.cache.inverse_view_projection.set(inverse);
            self.cache.count(|s| s.inverse_view_projection += 1);
        }
        self.cache.inverse_view_projection.get()
    }

    /// World-space view volume
    pub fn frustum(&self) -> Frustum {
        self.view_projection_matrix();
        self.cache.frustum.get()
    }

    /// Map a world position to viewport pixels and depth
    ///
    /// Fails for an empty viewport and for points whose clip-space W is at
    /// or below [`EPSILON`], which includes every point at or behind the
    /// eye of a perspective camera.
    pub fn project(&self, viewport: &Viewport, position: &Vec3) -> Result<ProjectedPoint, ProjectionError> {
        check_viewport(viewport)?;

        let clip = self.view_projection_matrix() * position.push(1.0);
        if clip.w <= EPSILON {
            return Err(ProjectionError::DegenerateW(clip.w));
        }
        let ndc = clip.xyz() / clip.w;

        Ok(ProjectedPoint {
            x: viewport.x + (ndc.x + 1.0) * 0.5 * viewport.width,
            y: viewport.y + (1.0 - ndc.y) * 0.5 * viewport.height,
            depth: (ndc.z + 1.0) * 0.5,
        })
    }

    /// Map viewport pixels and depth back to a world position
    ///
    /// Depth 0 is the near plane and 1 the far plane. Depths outside
    /// `[0, 1]` are extrapolated.
    pub fn unproject(&self, viewport: &Viewport, x: f32, y: f32, depth: f32) -> Result<Vec3, ProjectionError> {
        check_viewport(viewport)?;

        let ndc = Vec4::new(
            (x - viewport.x) / viewport.width * 2.0 - 1.0,
            1.0 - (y - viewport.y) / viewport.height * 2.0,
            depth * 2.0 - 1.0,
            1.0,
        );
        let world = self.inverse_view_projection_matrix() * ndc;
        if world.w.abs() <= EPSILON {
            return Err(ProjectionError::DegenerateW(world.w));
        }
        Ok(world.xyz() / world.w)
    }

    /// Ray from the near plane through the far plane under a pixel
    pub fn pick_ray(&self, viewport: &Viewport, x: f32, y: f32) -> Result<Ray, ProjectionError> {
        let near = self.unproject(viewport, x, y, 0.0)?;
        let far = self.unproject(viewport, x, y, 1.0)?;
        Ray::new(near, far - near).ok_or(ProjectionError::DegenerateRay)
    }
}

fn check_viewport(viewport: &Viewport) -> Result<(), ProjectionError> {
    if viewport.is_empty() {
        Err(ProjectionError::EmptyViewport {
            width: viewport.width,
            height: viewport.height,
        })
    } else {
        Ok(())
    }
}

impl TransformListener for Camera {
    fn transform_changed(&mut self, _node: NodeId, world: &Mat4) {
        Camera::transform_changed(self, world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Quat, Transform};
    use approx::assert_relative_eq;

    fn viewport() -> Viewport {
        Viewport::new(10.0, 20.0, 800.0, 600.0)
    }

    /// Camera at (0, 2, 10) looking down -Z
    fn placed_camera() -> Camera {
        let mut camera = Camera::perspective(60.0, 800.0 / 600.0, 1.0, 100.0).unwrap();
        camera.transform_changed(&Transform::from_position(Vec3::new(0.0, 2.0, 10.0)).to_matrix());
        camera
    }

    #[test]
    fn test_construction_marks_everything_dirty() {
        let camera = Camera::perspective(45.0, 1.0, 0.1, 10.0).unwrap();
        assert_eq!(camera.dirty(), CameraDirty::all());
        assert_eq!(camera.node(), None);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert_eq!(Camera::perspective(0.0, 1.0, 1.0, 10.0).unwrap_err(), CameraError::InvalidFieldOfView(0.0));
        assert!(Camera::perspective(180.0, 1.0, 1.0, 10.0).is_err());
        assert!(Camera::perspective(45.0, 0.0, 1.0, 10.0).is_err());
        assert!(Camera::perspective(45.0, 1.0, 0.0, 10.0).is_err());
        assert!(Camera::perspective(45.0, 1.0, 10.0, 10.0).is_err());
        assert!(Camera::orthographic(0.0, 1.0, 1.0, 1.0, 10.0).is_err());
    }

    #[test]
    fn test_rejected_setter_leaves_state_untouched() {
        let mut camera = placed_camera();
        camera.view_projection_matrix();
        camera.inverse_view_projection_matrix();
        camera.inverse_view_matrix();
        assert!(camera.dirty().is_empty());

        assert!(camera.set_near_plane(200.0).is_err());
        assert!(camera.set_far_plane(0.5).is_err());
        assert!(camera.set_field_of_view(-5.0).is_err());

        assert_relative_eq!(camera.near_plane(), 1.0);
        assert_relative_eq!(camera.far_plane(), 100.0);
        assert!(camera.dirty().is_empty());
    }

    #[test]
    fn test_projection_mutations_coalesce() {
        let mut camera = placed_camera();
        camera.view_projection_matrix();
        let before = camera.cache_stats();

        camera.set_field_of_view(50.0).unwrap();
        camera.set_aspect_ratio(2.0).unwrap();
        camera.set_near_plane(0.5).unwrap();
        camera.set_far_plane(500.0).unwrap();
        camera.set_field_of_view(70.0).unwrap();

        camera.projection_matrix();
        camera.projection_matrix();
        camera.view_projection_matrix();

        let after = camera.cache_stats();
        assert_eq!(after.projection - before.projection, 1);
        assert_eq!(after.view_projection - before.view_projection, 1);
        assert_eq!(after.view, before.view);
    }

    #[test]
    fn test_clip_plane_change_keeps_view_clean() {
        let mut camera = placed_camera();
        camera.view_matrix();
        camera.inverse_view_matrix();
        camera.projection_matrix();

        camera.set_near_plane(2.0).unwrap();
        camera.set_far_plane(50.0).unwrap();

        let dirty = camera.dirty();
        assert!(!dirty.contains(CameraDirty::VIEW));
        assert!(!dirty.contains(CameraDirty::INVERSE_VIEW));
        assert!(dirty.contains(CameraDirty::PROJECTION));
        assert!(dirty.contains(CameraDirty::VIEW_PROJECTION | CameraDirty::INVERSE_VIEW_PROJECTION));
    }

    #[test]
    fn test_transform_change_keeps_projection_clean() {
        let mut camera = placed_camera();
        camera.projection_matrix();
        camera.view_matrix();

        camera.transform_changed(&Transform::from_position(Vec3::new(5.0, 0.0, 0.0)).to_matrix());

        let dirty = camera.dirty();
        assert!(!dirty.contains(CameraDirty::PROJECTION));
        assert_eq!(dirty, CameraDirty::TRANSFORM_CHANGED);
        assert_relative_eq!(camera.view_matrix()[(0, 3)], -5.0);
    }

    #[test]
    fn test_clean_read_does_not_recompute() {
        let camera = placed_camera();
        let first = camera.inverse_view_projection_matrix();
        let stats = camera.cache_stats();
        let second = camera.inverse_view_projection_matrix();
        assert_eq!(first, second);
        assert_eq!(camera.cache_stats(), stats);
    }

    #[test]
    fn test_project_centre_of_view() {
        let camera = placed_camera();
        let vp = viewport();
        let point = camera.project(&vp, &Vec3::new(0.0, 2.0, 0.0)).unwrap();
        assert_relative_eq!(point.x, 410.0, epsilon = 1e-3);
        assert_relative_eq!(point.y, 320.0, epsilon = 1e-3);
        assert!(point.depth > 0.0 && point.depth < 1.0);
    }

    #[test]
    fn test_project_y_axis_points_down() {
        let camera = placed_camera();
        let vp = viewport();
        let above = camera.project(&vp, &Vec3::new(0.0, 4.0, 0.0)).unwrap();
        assert!(above.y < 320.0);
    }

    #[test]
    fn test_project_unproject_roundtrip() {
        let camera = placed_camera();
        let vp = viewport();
        for world in [
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(1.5, -0.5, -20.0),
            Vec3::new(-3.0, 4.0, 5.0),
            Vec3::new(10.0, 8.0, -60.0),
        ] {
            let p = camera.project(&vp, &world).unwrap();
            let back = camera.unproject(&vp, p.x, p.y, p.depth).unwrap();
            assert_relative_eq!(back, world, epsilon = 1e-2);
        }
    }

    #[test]
    fn test_orthographic_roundtrip_and_extent() {
        let mut camera = Camera::orthographic(10.0, 5.0, 2.0, 1.0, 50.0).unwrap();
        let rotated = Transform::from_position_rotation(
            Vec3::new(3.0, 0.0, 0.0),
            Quat::from_axis_angle(&Vec3::y_axis(), 0.5),
        );
        camera.transform_changed(&rotated.to_matrix());
        let vp = Viewport::from_size(400.0, 200.0);

        // Width = zoom_x * aspect = 20, height = 5
        let edge = (rotated.to_matrix() * Vec4::new(10.0, 2.5, -10.0, 1.0)).xyz();
        let p = camera.project(&vp, &edge).unwrap();
        assert_relative_eq!(p.x, 400.0, epsilon = 1e-2);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-2);

        let back = camera.unproject(&vp, p.x, p.y, p.depth).unwrap();
        assert_relative_eq!(back, edge, epsilon = 1e-3);
    }

    #[test]
    fn test_pick_ray_passes_through_unprojected_points() {
        let camera = placed_camera();
        let vp = viewport();
        let (x, y) = (123.0, 456.0);

        let ray = camera.pick_ray(&vp, x, y).unwrap();
        let near = camera.unproject(&vp, x, y, 0.0).unwrap();
        let far = camera.unproject(&vp, x, y, 1.0).unwrap();

        assert_relative_eq!(ray.origin, near, epsilon = 1e-4);
        assert!(ray.distance_to_point(far) < 1e-2);
        assert_relative_eq!(ray.direction.norm(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_pick_ray_hits_projected_point() {
        let camera = placed_camera();
        let vp = viewport();
        let target = Vec3::new(2.0, 1.0, -15.0);
        let p = camera.project(&vp, &target).unwrap();

        let ray = camera.pick_ray(&vp, p.x, p.y).unwrap();
        assert!(ray.distance_to_point(target) < 1e-2);
    }

    #[test]
    fn test_point_behind_eye_is_degenerate() {
        let camera = placed_camera();
        let result = camera.project(&viewport(), &Vec3::new(0.0, 2.0, 20.0));
        assert!(matches!(result, Err(ProjectionError::DegenerateW(w)) if w < 0.0));

        let at_eye = camera.project(&viewport(), &Vec3::new(0.0, 2.0, 10.0));
        assert!(matches!(at_eye, Err(ProjectionError::DegenerateW(_))));
    }

    #[test]
    fn test_empty_viewport_rejected() {
        let camera = placed_camera();
        let empty = Viewport::from_size(0.0, 600.0);
        assert!(matches!(
            camera.project(&empty, &Vec3::zeros()),
            Err(ProjectionError::EmptyViewport { .. })
        ));
        assert!(camera.unproject(&empty, 0.0, 0.0, 0.5).is_err());
        assert!(camera.pick_ray(&empty, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_frustum_follows_transform() {
        let mut camera = placed_camera();
        assert!(camera.frustum().contains_point(Vec3::new(0.0, 2.0, 0.0)));

        camera.transform_changed(&Transform::from_position(Vec3::new(0.0, 2.0, -100.0)).to_matrix());
        assert!(!camera.frustum().contains_point(Vec3::new(0.0, 2.0, 0.0)));
    }

    #[test]
    fn test_non_invertible_transform_falls_back_to_identity() {
        let mut camera = placed_camera();
        camera.transform_changed(&Mat4::zeros());
        assert_eq!(camera.view_matrix(), Mat4::identity());
    }
}
