//! Container reader
//!
//! Reads back what [`ObjectWriter`](super::writer::ObjectWriter) produced.
//! Used by tests and by the encoder tool's verification step; it locates
//! objects purely by offset, the same way an engine-side loader would.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use super::camera::CameraDescriptor;
use super::error::{DecodeError, DecodeResult};
use super::light::Light;
use super::node::NodeType;
use super::object::TypeId;
use super::registry::ReferenceEntry;
use super::writer::{HEADER_SIZE, MAGIC, REFERENCE_TABLE_SLOT, VERSION};
use crate::foundation::math::Mat4;

/// Decoded envelope prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Object type
    pub type_id: TypeId,
    /// Object id (may be empty)
    pub id: String,
    /// Offset of the first payload byte
    pub payload_offset: u64,
}

/// Decoded node with xrefs left as file offsets
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    /// Node id
    pub id: String,
    /// Node kind
    pub node_type: NodeType,
    /// Local transform
    pub transform: Mat4,
    /// Children in stored order
    pub children: Vec<NodeRecord>,
    /// Offset of the referenced camera descriptor
    pub camera: Option<u32>,
    /// Offset of the referenced light
    pub light: Option<u32>,
}

/// Decoded scene with xrefs left as file offsets
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRecord {
    /// Scene id
    pub id: String,
    /// Root nodes in stored order
    pub nodes: Vec<NodeRecord>,
    /// Offset of the node carrying the active camera
    pub active_camera: Option<u32>,
    /// Ambient colour
    pub ambient_color: [f32; 3],
}

/// Every top-level list of a container
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
    /// Lights in stored order
    pub lights: Vec<Light>,
    /// Camera descriptors in stored order
    pub cameras: Vec<CameraDescriptor>,
    /// Scenes in stored order
    pub scenes: Vec<SceneRecord>,
}

/// Read-only view over an encoded container
pub struct PackageReader<'a> {
    data: &'a [u8],
    version: Option<(u8, u8)>,
    has_table: bool,
    references: Vec<ReferenceEntry>,
}

impl<'a> PackageReader<'a> {
    /// Validate the header and load the reference table
    pub fn open(data: &'a [u8]) -> DecodeResult<Self> {
        if data.len() < MAGIC.len() || data[..MAGIC.len()] != MAGIC {
            return Err(DecodeError::InvalidMagic);
        }

        let mut cursor = Cursor::new(data);
        cursor.set_position(MAGIC.len() as u64);
        let major = cursor.read_u8()?;
        let minor = cursor.read_u8()?;
        if major != VERSION.0 {
            return Err(DecodeError::UnsupportedVersion(major, minor));
        }

        let mut reader = Self {
            data,
            version: Some((major, minor)),
            has_table: false,
            references: Vec::new(),
        };

        let table_offset = reader.read_u32_at(REFERENCE_TABLE_SLOT)?;
        if table_offset != 0 {
            reader.references = reader.read_reference_table(u64::from(table_offset))?;
            reader.has_table = true;
        }
        log::debug!(
            "Opened container v{}.{} with {} references",
            major,
            minor,
            reader.references.len()
        );
        Ok(reader)
    }

    /// Wrap headerless envelope data
    pub fn raw(data: &'a [u8]) -> Self {
        Self {
            data,
            version: None,
            has_table: false,
            references: Vec::new(),
        }
    }

    /// Container version, `None` for raw data
    pub fn version(&self) -> Option<(u8, u8)> {
        self.version
    }

    /// Reference table entries in write order
    pub fn references(&self) -> &[ReferenceEntry] {
        &self.references
    }

    fn entry(&self, id: &str) -> DecodeResult<&ReferenceEntry> {
        if !self.has_table {
            return Err(DecodeError::MissingReferenceTable);
        }
        self.references
            .iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| DecodeError::MissingObject(id.to_string()))
    }

    /// Envelope offset of the object with this id
    pub fn offset_of(&self, id: &str) -> DecodeResult<u32> {
        self.entry(id).map(|entry| entry.offset)
    }

    /// Type of the object with this id
    pub fn type_of(&self, id: &str) -> DecodeResult<TypeId> {
        self.entry(id).map(|entry| entry.type_id)
    }

    fn cursor_at(&self, at: u64) -> DecodeResult<Cursor<&'a [u8]>> {
        if at > self.data.len() as u64 {
            return Err(eof());
        }
        let mut cursor = Cursor::new(self.data);
        cursor.set_position(at);
        Ok(cursor)
    }

    /// Read a little-endian u32 at an absolute offset
    pub fn read_u32_at(&self, at: u64) -> DecodeResult<u32> {
        Ok(self.cursor_at(at)?.read_u32::<LittleEndian>()?)
    }

    /// Read the count prefix of a list
    pub fn read_list_count(&self, at: u64) -> DecodeResult<u32> {
        self.read_u32_at(at)
    }

    /// Decode the envelope prefix at `offset`
    pub fn read_envelope(&self, offset: u32) -> DecodeResult<Envelope> {
        let mut cursor = self.cursor_at(u64::from(offset))?;
        read_envelope(&mut cursor)
    }

    /// Decode the light at `offset`
    pub fn read_light(&self, offset: u32) -> DecodeResult<Light> {
        let mut cursor = self.cursor_at(u64::from(offset))?;
        read_light(&mut cursor)
    }

    /// Decode the camera descriptor at `offset`
    pub fn read_camera(&self, offset: u32) -> DecodeResult<CameraDescriptor> {
        let mut cursor = self.cursor_at(u64::from(offset))?;
        read_camera(&mut cursor)
    }

    /// Decode the node (and its subtree) at `offset`
    pub fn read_node(&self, offset: u32) -> DecodeResult<NodeRecord> {
        let mut cursor = self.cursor_at(u64::from(offset))?;
        read_node(&mut cursor)
    }

    /// Decode the scene at `offset`
    pub fn read_scene(&self, offset: u32) -> DecodeResult<SceneRecord> {
        let mut cursor = self.cursor_at(u64::from(offset))?;
        read_scene(&mut cursor)
    }

    /// Decode the lights, cameras and scenes that follow the header
    pub fn read_document(&self) -> DecodeResult<DocumentRecord> {
        let start = if self.version.is_some() { HEADER_SIZE } else { 0 };
        let mut cursor = self.cursor_at(start)?;
        Ok(DocumentRecord {
            lights: read_list(&mut cursor, read_light)?,
            cameras: read_list(&mut cursor, read_camera)?,
            scenes: read_list(&mut cursor, read_scene)?,
        })
    }

    fn read_reference_table(&self, at: u64) -> DecodeResult<Vec<ReferenceEntry>> {
        let mut cursor = self.cursor_at(at)?;
        let count = cursor.read_u32::<LittleEndian>()?;
        let mut entries = Vec::new();
        for _ in 0..count {
            let id = read_string(&mut cursor)?;
            let tag = cursor.read_u32::<LittleEndian>()?;
            let type_id = TypeId::from_tag(tag).ok_or(DecodeError::UnknownTypeTag(tag))?;
            let offset = cursor.read_u32::<LittleEndian>()?;
            entries.push(ReferenceEntry { id, type_id, offset });
        }
        Ok(entries)
    }
}

type Input<'a> = Cursor<&'a [u8]>;

fn eof() -> DecodeError {
    DecodeError::Io(std::io::ErrorKind::UnexpectedEof.into())
}

fn read_string(input: &mut Input<'_>) -> DecodeResult<String> {
    let len = u64::from(input.read_u32::<LittleEndian>()?);
    let remaining = input.get_ref().len() as u64 - input.position().min(input.get_ref().len() as u64);
    if len > remaining {
        return Err(eof());
    }
    let mut bytes = vec![0; len as usize];
    input.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)
}

fn read_envelope(input: &mut Input<'_>) -> DecodeResult<Envelope> {
    let tag = input.read_u32::<LittleEndian>()?;
    let type_id = TypeId::from_tag(tag).ok_or(DecodeError::UnknownTypeTag(tag))?;
    let id = read_string(input)?;
    Ok(Envelope {
        type_id,
        id,
        payload_offset: input.position(),
    })
}

fn expect_envelope(input: &mut Input<'_>, expected: TypeId) -> DecodeResult<String> {
    let envelope = read_envelope(input)?;
    if envelope.type_id != expected {
        return Err(DecodeError::UnexpectedType {
            expected,
            found: envelope.type_id,
        });
    }
    Ok(envelope.id)
}

fn read_list<T>(input: &mut Input<'_>, read: fn(&mut Input<'_>) -> DecodeResult<T>) -> DecodeResult<Vec<T>> {
    let count = input.read_u32::<LittleEndian>()?;
    (0..count).map(|_| read(input)).collect()
}

fn read_optional_xref(input: &mut Input<'_>) -> DecodeResult<Option<u32>> {
    match input.read_u8()? {
        0 => Ok(None),
        _ => Ok(Some(input.read_u32::<LittleEndian>()?)),
    }
}

fn read_light(input: &mut Input<'_>) -> DecodeResult<Light> {
    let id = expect_envelope(input, TypeId::Light)?;
    Light::read_payload(id, input)
}

fn read_camera(input: &mut Input<'_>) -> DecodeResult<CameraDescriptor> {
    let id = expect_envelope(input, TypeId::Camera)?;
    CameraDescriptor::read_payload(id, input)
}

fn read_node(input: &mut Input<'_>) -> DecodeResult<NodeRecord> {
    let id = expect_envelope(input, TypeId::Node)?;
    let raw_type = input.read_u32::<LittleEndian>()?;
    let node_type = NodeType::from_u32(raw_type).ok_or(DecodeError::UnknownNodeType(raw_type))?;

    let mut values = [0.0f32; 16];
    input.read_f32_into::<LittleEndian>(&mut values)?;

    Ok(NodeRecord {
        id,
        node_type,
        transform: Mat4::from_column_slice(&values),
        children: read_list(input, read_node)?,
        camera: read_optional_xref(input)?,
        light: read_optional_xref(input)?,
    })
}

fn read_scene(input: &mut Input<'_>) -> DecodeResult<SceneRecord> {
    let id = expect_envelope(input, TypeId::Scene)?;
    let nodes = read_list(input, read_node)?;
    let active_camera = read_optional_xref(input)?;
    let mut ambient_color = [0.0f32; 3];
    input.read_f32_into::<LittleEndian>(&mut ambient_color)?;
    Ok(SceneRecord {
        id,
        nodes,
        active_camera,
        ambient_color,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EncoderConfig;
    use crate::encoder::document::Document;
    use crate::encoder::node::Node;
    use crate::encoder::object::Object;
    use crate::encoder::scene::Scene;
    use crate::encoder::writer::ObjectWriter;

    fn container() -> Vec<u8> {
        let writer = ObjectWriter::with_header(Cursor::new(Vec::new()), true).unwrap();
        writer.finish().unwrap().0.into_inner()
    }

    #[test]
    fn test_header_validated() {
        let mut bytes = container();
        assert_eq!(bytes.len() as u64, HEADER_SIZE + 4);
        assert!(PackageReader::open(&bytes).is_ok());

        bytes[1] = b'X';
        assert!(matches!(PackageReader::open(&bytes), Err(DecodeError::InvalidMagic)));
    }

    #[test]
    fn test_future_major_version_rejected() {
        let mut bytes = container();
        bytes[MAGIC.len()] = VERSION.0 + 1;
        assert!(matches!(PackageReader::open(&bytes), Err(DecodeError::UnsupportedVersion(2, 0))));
    }

    #[test]
    fn test_truncated_input_is_an_error() {
        assert!(matches!(PackageReader::open(&MAGIC), Err(DecodeError::Io(_))));
        let reader = PackageReader::raw(&[1, 0]);
        assert!(reader.read_u32_at(0).is_err());
        assert!(reader.read_u32_at(100).is_err());
    }

    #[test]
    fn test_wrong_type_reported() {
        let mut light = Light::new("l");
        let mut writer = ObjectWriter::new(Cursor::new(Vec::new())).unwrap();
        writer.write_object(&mut light).unwrap();
        let bytes = writer.finish().unwrap().0.into_inner();

        let result = PackageReader::raw(&bytes).read_camera(0);
        assert!(matches!(
            result,
            Err(DecodeError::UnexpectedType { expected: TypeId::Camera, found: TypeId::Light })
        ));
    }

    #[test]
    fn test_read_document_preserves_order() {
        let mut doc = Document::new();
        doc.add_light(Light::new("a"));
        doc.add_light(Light::new("b"));
        let mut scene = Scene::new("s");
        let mut parent = Node::new("p");
        parent.add_child(Node::new("c1"));
        parent.add_child(Node::new("c2"));
        scene.add_node(parent);
        doc.add_scene(scene);

        let (cursor, _) = doc.write_binary(Cursor::new(Vec::new()), &EncoderConfig::default()).unwrap();
        let bytes = cursor.into_inner();
        let reader = PackageReader::open(&bytes).unwrap();
        let record = reader.read_document().unwrap();

        let light_ids: Vec<_> = record.lights.iter().map(|l| l.id().to_string()).collect();
        assert_eq!(light_ids, vec!["a", "b"]);
        assert!(record.cameras.is_empty());
        let children: Vec<_> = record.scenes[0].nodes[0].children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(children, vec!["c1", "c2"]);

        let ids: Vec<_> = reader.references().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c1", "c2", "p", "s"]);
    }
}
