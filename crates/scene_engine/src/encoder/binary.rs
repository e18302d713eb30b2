//! Little-endian scalar output over a seekable byte stream
//!
//! [`BinaryContainer`] is the only place that touches the underlying sink.
//! It tracks its own write offset so that objects can record where their
//! envelope starts without querying the stream, and it can seek back to
//! overwrite a previously reserved `u32` slot.

use std::io::{Seek, SeekFrom, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use super::error::{EncodeError, EncodeResult};
use crate::foundation::math::Mat4;

/// Binary output stream with position tracking
pub struct BinaryContainer<W: Write + Seek> {
    writer: W,
    pos: u64,
}

impl<W: Write + Seek> BinaryContainer<W> {
    /// Wrap a writer. The current stream position becomes offset zero's
    /// reference point only if the stream is at its start.
    pub fn new(mut writer: W) -> EncodeResult<Self> {
        let pos = writer.stream_position()?;
        Ok(Self { writer, pos })
    }

    /// Current write offset
    #[inline]
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Current write offset as a 32-bit file reference
    pub fn offset_u32(&self) -> EncodeResult<u32> {
        u32::try_from(self.pos).map_err(|_| EncodeError::OffsetOverflow(self.pos))
    }

    /// Write raw bytes and advance position
    pub fn write_bytes(&mut self, data: &[u8]) -> EncodeResult<()> {
        self.writer.write_all(data)?;
        self.pos += data.len() as u64;
        Ok(())
    }

    /// Write a u8 value
    pub fn write_u8(&mut self, value: u8) -> EncodeResult<()> {
        self.writer.write_u8(value)?;
        self.pos += 1;
        Ok(())
    }

    /// Write a u32 value (little-endian)
    pub fn write_u32(&mut self, value: u32) -> EncodeResult<()> {
        self.writer.write_u32::<LittleEndian>(value)?;
        self.pos += 4;
        Ok(())
    }

    /// Write an f32 value (little-endian)
    pub fn write_f32(&mut self, value: f32) -> EncodeResult<()> {
        self.writer.write_f32::<LittleEndian>(value)?;
        self.pos += 4;
        Ok(())
    }

    /// Write a fixed run of f32 values without a length prefix
    pub fn write_f32_slice(&mut self, values: &[f32]) -> EncodeResult<()> {
        for &value in values {
            self.write_f32(value)?;
        }
        Ok(())
    }

    /// Write a length as a u32 count prefix
    pub fn write_len(&mut self, len: usize) -> EncodeResult<()> {
        let len = u32::try_from(len).map_err(|_| EncodeError::OffsetOverflow(len as u64))?;
        self.write_u32(len)
    }

    /// Write a string as `[len u32][utf-8 bytes]`
    pub fn write_string(&mut self, value: &str) -> EncodeResult<()> {
        self.write_len(value.len())?;
        self.write_bytes(value.as_bytes())
    }

    /// Write a 4x4 matrix as 16 column-major floats
    pub fn write_matrix(&mut self, matrix: &Mat4) -> EncodeResult<()> {
        self.write_f32_slice(matrix.as_slice())
    }

    /// Overwrite a previously written u32 at `at`, then return to the end
    pub fn patch_u32(&mut self, at: u64, value: u32) -> EncodeResult<()> {
        let resume = self.pos;
        self.writer.seek(SeekFrom::Start(at))?;
        self.writer.write_u32::<LittleEndian>(value)?;
        self.writer.seek(SeekFrom::Start(resume))?;
        Ok(())
    }

    /// Flush buffered output to the sink
    pub fn flush(&mut self) -> EncodeResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Unwrap the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}
