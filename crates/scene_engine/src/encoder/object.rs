//! Serializable object contract
//!
//! Every content object (scene, node, light, camera, ...) carries an
//! [`ObjectHeader`] and implements [`Object`]. The envelope written for an
//! object is:
//!
//! ```text
//! [type tag u32][id length u32][id bytes][type-specific payload]
//! ```
//!
//! The offset of the first byte of the envelope is recorded into the
//! object's header before anything else is emitted; readers locate objects
//! purely by that offset.

use std::io::{Seek, Write};

use super::error::{EncodeError, EncodeResult};
use super::text::TextWriter;
use super::writer::ObjectWriter;

/// Numeric type tags written at the start of every envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TypeId {
    /// Scene root
    Scene = 1,
    /// Scene node or joint
    Node = 2,
    /// Animation clip
    Animation = 3,
    /// Animation channel
    AnimationChannel = 4,
    /// Node instance
    NodeInstance = 8,
    /// Camera instance
    CameraInstance = 9,
    /// Light instance
    LightInstance = 10,
    /// Model (mesh + material binding)
    Model = 11,
    /// Material
    Material = 16,
    /// Effect
    Effect = 17,
    /// Camera descriptor
    Camera = 32,
    /// Light
    Light = 33,
    /// Mesh
    Mesh = 34,
    /// Mesh part
    MeshPart = 35,
    /// Mesh skin
    MeshSkin = 36,
    /// Font
    Font = 128,
}

impl TypeId {
    /// The tag value as written to the stream
    pub fn tag(self) -> u32 {
        self as u32
    }

    /// Decode a tag read from the stream
    pub fn from_tag(tag: u32) -> Option<Self> {
        Some(match tag {
            1 => Self::Scene,
            2 => Self::Node,
            3 => Self::Animation,
            4 => Self::AnimationChannel,
            8 => Self::NodeInstance,
            9 => Self::CameraInstance,
            10 => Self::LightInstance,
            11 => Self::Model,
            16 => Self::Material,
            17 => Self::Effect,
            32 => Self::Camera,
            33 => Self::Light,
            34 => Self::Mesh,
            35 => Self::MeshPart,
            36 => Self::MeshSkin,
            128 => Self::Font,
            _ => return None,
        })
    }
}

/// Identity and write state shared by every object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectHeader {
    id: String,
    file_position: Option<u32>,
}

impl ObjectHeader {
    /// Create a header with the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            file_position: None,
        }
    }

    /// The object's id (may be empty)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Replace the object's id
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Offset the envelope was written at, `None` while unwritten
    pub fn file_position(&self) -> Option<u32> {
        self.file_position
    }

    /// Record the envelope offset. Only the first call succeeds.
    pub(crate) fn record_position(&mut self, offset: u32) -> EncodeResult<()> {
        if self.file_position.is_some() {
            return Err(EncodeError::AlreadyWritten(self.id.clone()));
        }
        self.file_position = Some(offset);
        Ok(())
    }
}

/// Serialization contract implemented by every content object
pub trait Object {
    /// Type tag written at the start of the envelope
    fn type_id(&self) -> TypeId;

    /// Element name used by the text form
    fn element_name(&self) -> &'static str;

    /// Shared header
    fn header(&self) -> &ObjectHeader;

    /// Shared header, mutable
    fn header_mut(&mut self) -> &mut ObjectHeader;

    /// Write the type-specific payload that follows the id
    fn write_binary_payload<W: Write + Seek>(&mut self, out: &mut ObjectWriter<W>) -> EncodeResult<()>;

    /// Write the nested child elements of the text form
    fn write_text_body(&self, out: &mut TextWriter<'_>) -> EncodeResult<()>;

    /// The object's id
    fn id(&self) -> &str {
        self.header().id()
    }

    /// Offset of this object's envelope once written
    fn file_position(&self) -> Option<u32> {
        self.header().file_position()
    }

    /// Write the full text element for this object
    fn write_text(&self, out: &mut TextWriter<'_>) -> EncodeResult<()> {
        out.element_start(self.element_name(), self.id())?;
        self.write_text_body(out)?;
        out.element_end(self.element_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags_roundtrip() {
        for tag in [1, 2, 3, 4, 8, 9, 10, 11, 16, 17, 32, 33, 34, 35, 36, 128] {
            let type_id = TypeId::from_tag(tag).unwrap();
            assert_eq!(type_id.tag(), tag);
        }
        assert_eq!(TypeId::Light.tag(), 33);
        assert!(TypeId::from_tag(5).is_none());
    }

    #[test]
    fn test_position_recorded_once() {
        let mut header = ObjectHeader::new("lamp");
        assert_eq!(header.file_position(), None);

        header.record_position(0).unwrap();
        assert_eq!(header.file_position(), Some(0));

        let again = header.record_position(64);
        assert!(matches!(again, Err(EncodeError::AlreadyWritten(id)) if id == "lamp"));
        assert_eq!(header.file_position(), Some(0));
    }
}
