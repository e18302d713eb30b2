//! # Scene Engine
//!
//! Content-pipeline scene encoding and runtime camera math.
//!
//! ## Features
//!
//! - **Object Container**: Binary envelopes for scenes, nodes, lights and
//!   cameras with id-based cross-references resolved by offset
//! - **Text Dump**: Indented element form of the same objects for diffing
//! - **Runtime Camera**: Lazily cached view/projection matrices, frustum,
//!   projection, unprojection and pick rays
//! - **Scene Graph**: Arena-backed transform hierarchy with synchronous
//!   change notification
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//! use std::io::Cursor;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut document = Document::new();
//!     document.add_light(Light::new("sun"));
//!
//!     let mut lamp = Node::new("lamp");
//!     lamp.set_light("sun");
//!     let mut scene = Scene::new("level");
//!     scene.add_node(lamp);
//!     document.add_scene(scene);
//!
//!     let (cursor, summary) = document.write_binary(Cursor::new(Vec::new()), &EncoderConfig::default())?;
//!     println!("{} objects, {} bytes", summary.objects, cursor.get_ref().len());
//!
//!     let mut graph = SceneGraph::new();
//!     let eye = graph.create_node("eye");
//!     graph.attach_camera(eye, Camera::perspective(60.0, 16.0 / 9.0, 0.1, 100.0)?)?;
//!     graph.set_transform(eye, Transform::from_position(Vec3::new(0.0, 2.0, 10.0)))?;
//!
//!     let viewport = Viewport::from_size(1280.0, 720.0);
//!     if let Some(camera) = graph.camera(eye) {
//!         let ray = camera.pick_ray(&viewport, 640.0, 360.0)?;
//!         println!("pick ray {:?}", ray.direction);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;
pub mod config;
pub mod encoder;
pub mod foundation;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        core::{ApplicationConfig, CameraConfig, Config, EncoderConfig, EngineConfig},
        encoder::{
            CameraDescriptor, Document, DocumentDescription, EncodeError, Light, LightType, Node,
            Object, ObjectWriter, PackageReader, Scene,
        },
        foundation::{
            collections::NodeId,
            math::{Mat4, Transform, Vec3},
            time::PlatformClock,
        },
        scene::{Camera, CameraError, Frustum, ProjectionError, Ray, SceneGraph, TransformListener, Viewport},
    };
}
