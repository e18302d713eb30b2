//! Object writer with cross-reference backpatching
//!
//! [`ObjectWriter`] drives a single serialization pass:
//!
//! 1. [`write_object`](ObjectWriter::write_object) records each envelope
//!    offset, writes the envelope and registers the id once the payload is
//!    complete.
//! 2. [`write_xref`](ObjectWriter::write_xref) emits the referent's offset
//!    when it is already known, or reserves a slot and remembers it.
//! 3. [`finish`](ObjectWriter::finish) patches every reserved slot, fails on
//!    ids that were never written, appends the reference table and records
//!    its offset in the header.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ HEADER                                       │
//! │  [0..9]   Magic: b"\xABSGB\xBB\r\n\x1A\n"    │
//! │  [9..11]  Version: major u8, minor u8        │
//! │  [11..15] Reference table offset: u32        │
//! ├──────────────────────────────────────────────┤
//! │ OBJECT ENVELOPES                             │
//! ├──────────────────────────────────────────────┤
//! │ REFERENCE TABLE                              │
//! │  [count u32] then per entry:                 │
//! │  [id string][type tag u32][offset u32]       │
//! └──────────────────────────────────────────────┘
//! ```

use std::io::{Seek, Write};

use super::binary::BinaryContainer;
use super::error::{EncodeError, EncodeResult};
use super::object::Object;
use super::registry::ObjectRegistry;

/// Magic bytes identifying a scene container
pub const MAGIC: [u8; 9] = [0xAB, b'S', b'G', b'B', 0xBB, b'\r', b'\n', 0x1A, b'\n'];

/// Container format version (major, minor)
pub const VERSION: (u8, u8) = (1, 0);

/// Offset of the reference-table slot inside the header
pub const REFERENCE_TABLE_SLOT: u64 = 11;

/// Size of the fixed header in bytes
pub const HEADER_SIZE: u64 = 15;

/// Value held by an xref slot until it is patched
///
/// It never survives a successful [`ObjectWriter::finish`].
pub const UNRESOLVED_XREF: u32 = u32::MAX;

/// An xref slot waiting for its referent to be written
#[derive(Debug, Clone)]
struct PendingXref {
    at: u64,
    id: String,
}

/// Totals reported after finalization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeSummary {
    /// Envelopes written
    pub objects: usize,
    /// Ids recorded in the reference table
    pub references: usize,
    /// Forward references patched during finalization
    pub patched_xrefs: usize,
    /// Total bytes written
    pub bytes: u64,
}

/// Single-pass object serializer
pub struct ObjectWriter<W: Write + Seek> {
    container: BinaryContainer<W>,
    registry: ObjectRegistry,
    pending: Vec<PendingXref>,
    table_slot: Option<u64>,
    objects_written: usize,
    finalized: bool,
}

impl<W: Write + Seek> ObjectWriter<W> {
    /// Create a writer with no container header
    ///
    /// Objects are written from the stream's current position and no
    /// reference table is appended. Useful for embedding envelopes in a
    /// larger stream.
    pub fn new(writer: W) -> EncodeResult<Self> {
        Ok(Self {
            container: BinaryContainer::new(writer)?,
            registry: ObjectRegistry::new(),
            pending: Vec::new(),
            table_slot: None,
            objects_written: 0,
            finalized: false,
        })
    }

    /// Create a writer and emit the container header
    ///
    /// When `reference_table` is false the header slot stays zero, which
    /// readers interpret as "no table".
    pub fn with_header(writer: W, reference_table: bool) -> EncodeResult<Self> {
        let mut this = Self::new(writer)?;
        this.container.write_bytes(&MAGIC)?;
        this.container.write_u8(VERSION.0)?;
        this.container.write_u8(VERSION.1)?;
        let slot = this.container.position();
        this.container.write_u32(0)?;
        if reference_table {
            this.table_slot = Some(slot);
        }
        Ok(this)
    }

    /// Scalar output for payload writers
    pub fn stream(&mut self) -> &mut BinaryContainer<W> {
        &mut self.container
    }

    /// Objects written so far
    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    /// Number of xref slots still waiting for their referent
    pub fn pending_xrefs(&self) -> usize {
        self.pending.len()
    }

    /// Write one object envelope
    ///
    /// The object's file position is recorded before any byte of the
    /// envelope is emitted. Its id is registered once the payload is done.
    pub fn write_object<T: Object>(&mut self, object: &mut T) -> EncodeResult<()> {
        self.ensure_open()?;

        let id = object.id().to_string();
        if !id.is_empty() && self.registry.contains(&id) {
            return Err(EncodeError::DuplicateId(id));
        }

        let offset = self.container.offset_u32()?;
        object.header_mut().record_position(offset)?;

        let type_id = object.type_id();
        self.container.write_u32(type_id.tag())?;
        self.container.write_string(&id)?;
        object.write_binary_payload(self)?;

        if !id.is_empty() {
            self.registry.register(&id, type_id, offset)?;
        }
        self.objects_written += 1;
        log::debug!("Wrote {:?} {:?} at offset {}", type_id, id, offset);
        Ok(())
    }

    /// Write a counted list of objects in slice order
    pub fn write_objects<T: Object>(&mut self, objects: &mut [T]) -> EncodeResult<()> {
        self.ensure_open()?;
        self.container.write_len(objects.len())?;
        for object in objects.iter_mut() {
            self.write_object(object)?;
        }
        Ok(())
    }

    /// Write a reference to another object by id
    pub fn write_xref(&mut self, id: &str) -> EncodeResult<()> {
        self.ensure_open()?;
        if id.is_empty() {
            return Err(EncodeError::EmptyReferenceId);
        }

        match self.registry.resolve(id) {
            Some(offset) => {
                log::trace!("Resolved xref {:?} -> {}", id, offset);
                self.container.write_u32(offset)
            }
            None => {
                log::trace!("Deferring xref {:?} at {}", id, self.container.position());
                self.pending.push(PendingXref {
                    at: self.container.position(),
                    id: id.to_string(),
                });
                self.container.write_u32(UNRESOLVED_XREF)
            }
        }
    }

    /// Write a presence flag followed by the xref when present
    pub fn write_optional_xref(&mut self, id: Option<&str>) -> EncodeResult<()> {
        match id {
            Some(id) => {
                self.container.write_u8(1)?;
                self.write_xref(id)
            }
            None => self.container.write_u8(0),
        }
    }

    /// Resolve deferred references, append the reference table and flush
    ///
    /// Fails with [`EncodeError::UnresolvedReference`] naming the first id
    /// that was referenced but never written.
    pub fn finish(mut self) -> EncodeResult<(W, EncodeSummary)> {
        self.ensure_open()?;
        self.finalized = true;

        let pending = std::mem::take(&mut self.pending);
        for xref in &pending {
            let offset = self
                .registry
                .resolve(&xref.id)
                .ok_or_else(|| EncodeError::UnresolvedReference(xref.id.clone()))?;
            log::trace!("Patching xref {:?} at {} -> {}", xref.id, xref.at, offset);
            self.container.patch_u32(xref.at, offset)?;
        }

        let mut references = 0;
        if let Some(slot) = self.table_slot {
            let table_offset = self.container.offset_u32()?;
            self.container.write_len(self.registry.len())?;
            for entry in self.registry.entries() {
                self.container.write_string(&entry.id)?;
                self.container.write_u32(entry.type_id.tag())?;
                self.container.write_u32(entry.offset)?;
            }
            self.container.patch_u32(slot, table_offset)?;
            references = self.registry.len();
        }

        self.container.flush()?;

        let summary = EncodeSummary {
            objects: self.objects_written,
            references,
            patched_xrefs: pending.len(),
            bytes: self.container.position(),
        };
        log::info!(
            "Finalized container: {} objects, {} references, {} patched xrefs, {} bytes",
            summary.objects,
            summary.references,
            summary.patched_xrefs,
            summary.bytes
        );
        Ok((self.container.into_inner(), summary))
    }

    fn ensure_open(&self) -> EncodeResult<()> {
        if self.finalized {
            Err(EncodeError::AlreadyFinalized)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::light::Light;
    use crate::encoder::node::Node;
    use crate::encoder::reader::PackageReader;
    use std::io::Cursor;

    fn light(id: &str) -> Light {
        let mut light = Light::new(id);
        light.set_point_light();
        light
    }

    #[test]
    fn test_position_recorded_before_payload() {
        let mut writer = ObjectWriter::new(Cursor::new(Vec::new())).unwrap();
        let mut first = light("first");
        let mut second = light("second");

        writer.write_object(&mut first).unwrap();
        writer.write_object(&mut second).unwrap();

        assert_eq!(first.file_position(), Some(0));
        let second_offset = second.file_position().unwrap();
        assert!(second_offset > 0);
        assert_eq!(writer.registry().resolve("first"), Some(0));
        assert_eq!(writer.registry().resolve("second"), Some(second_offset));
    }

    #[test]
    fn test_backward_xref_written_immediately() {
        let mut writer = ObjectWriter::new(Cursor::new(Vec::new())).unwrap();
        let mut target = light("a");
        writer.write_object(&mut target).unwrap();

        let slot = writer.stream().position();
        writer.write_xref("a").unwrap();
        assert_eq!(writer.pending_xrefs(), 0);

        let (cursor, summary) = writer.finish().unwrap();
        let bytes = cursor.into_inner();
        let reader = PackageReader::raw(&bytes);
        // Object "a" sits at offset 0 and the reference must say so.
        assert_eq!(reader.read_u32_at(slot).unwrap(), 0);
        assert_eq!(summary.patched_xrefs, 0);
    }

    #[test]
    fn test_forward_xref_patched_on_finish() {
        let mut writer = ObjectWriter::with_header(Cursor::new(Vec::new()), true).unwrap();
        let slot = writer.stream().position();
        writer.write_xref("later").unwrap();
        assert_eq!(writer.pending_xrefs(), 1);

        let mut target = light("later");
        writer.write_object(&mut target).unwrap();
        let target_offset = target.file_position().unwrap();

        let (cursor, summary) = writer.finish().unwrap();
        let bytes = cursor.into_inner();
        let reader = PackageReader::open(&bytes).unwrap();

        assert_eq!(reader.read_u32_at(slot).unwrap(), target_offset);
        assert_eq!(reader.offset_of("later").unwrap(), target_offset);
        assert_eq!(summary.patched_xrefs, 1);
    }

    #[test]
    fn test_unresolved_xref_fails_finish() {
        let mut writer = ObjectWriter::with_header(Cursor::new(Vec::new()), true).unwrap();
        let mut existing = light("present");
        writer.write_object(&mut existing).unwrap();
        writer.write_xref("ghost").unwrap();

        let result = writer.finish();
        assert!(matches!(result, Err(EncodeError::UnresolvedReference(id)) if id == "ghost"));
    }

    #[test]
    fn test_empty_id_cannot_be_referenced() {
        let mut writer = ObjectWriter::new(Cursor::new(Vec::new())).unwrap();
        assert!(matches!(writer.write_xref(""), Err(EncodeError::EmptyReferenceId)));
    }

    #[test]
    fn test_duplicate_id_rejected_before_writing() {
        let mut writer = ObjectWriter::new(Cursor::new(Vec::new())).unwrap();
        let mut a = light("dup");
        let mut b = light("dup");
        writer.write_object(&mut a).unwrap();
        let before = writer.stream().position();

        let result = writer.write_object(&mut b);
        assert!(matches!(result, Err(EncodeError::DuplicateId(_))));
        assert_eq!(writer.stream().position(), before);
        assert_eq!(b.file_position(), None);
    }

    #[test]
    fn test_object_written_twice_rejected() {
        let mut first = ObjectWriter::new(Cursor::new(Vec::new())).unwrap();
        let mut second = ObjectWriter::new(Cursor::new(Vec::new())).unwrap();
        let mut object = light("");

        first.write_object(&mut object).unwrap();
        assert!(matches!(second.write_object(&mut object), Err(EncodeError::AlreadyWritten(_))));
    }

    #[test]
    fn test_unnamed_objects_are_not_registered() {
        let mut writer = ObjectWriter::new(Cursor::new(Vec::new())).unwrap();
        let mut a = light("");
        let mut b = light("");
        writer.write_object(&mut a).unwrap();
        writer.write_object(&mut b).unwrap();
        assert!(writer.registry().is_empty());
    }

    #[test]
    fn test_list_count_prefix() {
        for count in [0usize, 1, 5] {
            let mut writer = ObjectWriter::new(Cursor::new(Vec::new())).unwrap();
            let mut lights: Vec<Light> = (0..count).map(|i| light(&format!("l{i}"))).collect();
            writer.write_objects(&mut lights).unwrap();

            let (cursor, _) = writer.finish().unwrap();
            let bytes = cursor.into_inner();
            let reader = PackageReader::raw(&bytes);

            assert_eq!(reader.read_u32_at(0).unwrap() as usize, count);
            let mut offset = 4;
            for (i, expected) in lights.iter().enumerate() {
                assert_eq!(Some(offset as u32), expected.file_position());
                let envelope = reader.read_envelope(offset as u32).unwrap();
                assert_eq!(envelope.id, format!("l{i}"));
                let _ = reader.read_light(offset as u32).unwrap();
                offset = envelope.payload_offset as usize + Light::PAYLOAD_SIZE;
            }
            assert_eq!(offset, bytes.len());
        }
    }

    #[test]
    fn test_nested_forward_xref_patched() {
        let mut root = Node::new("root");
        let mut child = Node::new("child");
        child.set_light("lamp");
        root.add_child(child);
        let mut lamp = light("lamp");

        let mut writer = ObjectWriter::with_header(Cursor::new(Vec::new()), true).unwrap();
        writer.write_object(&mut root).unwrap();
        writer.write_object(&mut lamp).unwrap();
        let (cursor, summary) = writer.finish().unwrap();
        assert_eq!(summary.patched_xrefs, 1);

        let bytes = cursor.into_inner();
        let reader = PackageReader::open(&bytes).unwrap();
        let decoded = reader.read_node(root.file_position().unwrap()).unwrap();
        assert_eq!(decoded.children[0].light, lamp.file_position());
    }

    #[test]
    fn test_empty_raw_writer_finishes() {
        let writer = ObjectWriter::new(Cursor::new(Vec::new())).unwrap();
        let (cursor, summary) = writer.finish().unwrap();
        assert_eq!(summary.objects, 0);
        assert!(cursor.into_inner().is_empty());
    }
}
