//! Scene object encoder
//!
//! Serializes content-pipeline objects into a self-describing binary
//! container. Objects are written depth-first; each records its own file
//! offset, and references between objects are written as offsets resolved
//! through the [`ObjectRegistry`], with forward references patched when the
//! pass is finalized.

pub mod binary;
pub mod camera;
pub mod description;
pub mod document;
pub mod error;
pub mod light;
pub mod node;
pub mod object;
pub mod reader;
pub mod registry;
pub mod scene;
pub mod text;
pub mod writer;

pub use binary::BinaryContainer;
pub use camera::{CameraDescriptor, CameraProjection, CameraType};
pub use description::{
    CameraDescription, DocumentDescription, LightDescription, LightKind, NodeDescription,
    ProjectionDescription, SceneDescription,
};
pub use document::Document;
pub use error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
pub use light::{Light, LightType};
pub use node::{Node, NodeType};
pub use object::{Object, ObjectHeader, TypeId};
pub use reader::{DocumentRecord, Envelope, NodeRecord, PackageReader, SceneRecord};
pub use registry::{ObjectRegistry, ReferenceEntry};
pub use scene::Scene;
pub use text::TextWriter;
pub use writer::{EncodeSummary, ObjectWriter, UNRESOLVED_XREF};
