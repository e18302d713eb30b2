//! Runtime scene: transform hierarchy, cameras and picking
//!
//! The [`SceneGraph`] owns nodes and the cameras attached to them. A
//! [`Camera`] derives its matrices lazily from its projection parameters and
//! the world transform its node last delivered.

pub mod camera;
pub mod frustum;
pub mod graph;
pub mod ray;
pub mod viewport;

pub use camera::{CacheStats, Camera, CameraDirty, CameraError, CameraType, ProjectedPoint, ProjectionError};
pub use frustum::{Frustum, Plane, AABB};
pub use graph::{SceneError, SceneGraph, TransformListener};
pub use ray::Ray;
pub use viewport::Viewport;
