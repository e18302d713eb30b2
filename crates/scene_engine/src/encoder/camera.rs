//! Camera descriptor object
//!
//! Stores the projection parameters of a camera in the content pipeline.
//! Payload layout:
//!
//! ```text
//! [camera type u8][aspect f32][near f32][far f32]
//! perspective:  [field of view f32]
//! orthographic: [zoom x f32][zoom y f32]
//! ```

use std::io::{Read, Seek, Write};

use byteorder::{LittleEndian, ReadBytesExt};

use super::error::{DecodeError, DecodeResult, EncodeResult};
use super::object::{Object, ObjectHeader, TypeId};
use super::text::TextWriter;
use super::writer::ObjectWriter;
use crate::scene::{Camera, CameraError};

/// Projection kind stored in a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CameraType {
    /// Field-of-view frustum
    Perspective = 1,
    /// Zoom-scaled box
    Orthographic = 2,
}

impl CameraType {
    /// Decode a stored camera type byte
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Perspective),
            2 => Some(Self::Orthographic),
            _ => None,
        }
    }
}

/// Type-specific projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraProjection {
    /// Vertical field of view in degrees
    Perspective {
        /// Field of view in degrees
        field_of_view: f32,
    },
    /// Orthographic zoom factors
    Orthographic {
        /// Horizontal zoom
        zoom_x: f32,
        /// Vertical zoom
        zoom_y: f32,
    },
}

/// Camera descriptor object
#[derive(Debug, Clone, PartialEq)]
pub struct CameraDescriptor {
    header: ObjectHeader,
    projection: CameraProjection,
    aspect_ratio: f32,
    near_plane: f32,
    far_plane: f32,
}

impl CameraDescriptor {
    /// Describe a perspective camera
    pub fn perspective(id: impl Into<String>, field_of_view: f32, aspect_ratio: f32, near_plane: f32, far_plane: f32) -> Self {
        Self {
            header: ObjectHeader::new(id),
            projection: CameraProjection::Perspective { field_of_view },
            aspect_ratio,
            near_plane,
            far_plane,
        }
    }

    /// Describe an orthographic camera
    pub fn orthographic(id: impl Into<String>, zoom_x: f32, zoom_y: f32, aspect_ratio: f32, near_plane: f32, far_plane: f32) -> Self {
        Self {
            header: ObjectHeader::new(id),
            projection: CameraProjection::Orthographic { zoom_x, zoom_y },
            aspect_ratio,
            near_plane,
            far_plane,
        }
    }

    /// Projection kind
    pub fn camera_type(&self) -> CameraType {
        match self.projection {
            CameraProjection::Perspective { .. } => CameraType::Perspective,
            CameraProjection::Orthographic { .. } => CameraType::Orthographic,
        }
    }

    /// Type-specific parameters
    pub fn projection(&self) -> CameraProjection {
        self.projection
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

    /// Build a runtime camera with these parameters
    pub fn to_camera(&self) -> Result<Camera, CameraError> {
        match self.projection {
            CameraProjection::Perspective { field_of_view } => {
                Camera::perspective(field_of_view, self.aspect_ratio, self.near_plane, self.far_plane)
            }
            CameraProjection::Orthographic { zoom_x, zoom_y } => {
                Camera::orthographic(zoom_x, zoom_y, self.aspect_ratio, self.near_plane, self.far_plane)
            }
        }
    }

    /// Check the parameters against the rules the runtime camera enforces
    pub fn validate(&self) -> Result<(), CameraError> {
        self.to_camera().map(|_| ())
    }

    /// Decode a descriptor payload; `id` comes from the envelope
    pub fn read_payload<R: Read>(id: impl Into<String>, input: &mut R) -> DecodeResult<Self> {
        let raw_type = input.read_u8()?;
        let camera_type = CameraType::from_u8(raw_type).ok_or(DecodeError::UnknownCameraType(raw_type))?;
        let aspect_ratio = input.read_f32::<LittleEndian>()?;
        let near_plane = input.read_f32::<LittleEndian>()?;
        let far_plane = input.read_f32::<LittleEndian>()?;

        let descriptor = match camera_type {
            CameraType::Perspective => {
                let field_of_view = input.read_f32::<LittleEndian>()?;
                Self::perspective(id, field_of_view, aspect_ratio, near_plane, far_plane)
            }
            CameraType::Orthographic => {
                let zoom_x = input.read_f32::<LittleEndian>()?;
                let zoom_y = input.read_f32::<LittleEndian>()?;
                Self::orthographic(id, zoom_x, zoom_y, aspect_ratio, near_plane, far_plane)
            }
        };
        Ok(descriptor)
    }
}

impl Object for CameraDescriptor {
    fn type_id(&self) -> TypeId {
        TypeId::Camera
    }

    fn element_name(&self) -> &'static str {
        "Camera"
    }

    fn header(&self) -> &ObjectHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ObjectHeader {
        &mut self.header
    }

    fn write_binary_payload<W: Write + Seek>(&mut self, out: &mut ObjectWriter<W>) -> EncodeResult<()> {
        self.validate()?;
        let stream = out.stream();
        stream.write_u8(self.camera_type() as u8)?;
        stream.write_f32(self.aspect_ratio)?;
        stream.write_f32(self.near_plane)?;
        stream.write_f32(self.far_plane)?;
        match self.projection {
            CameraProjection::Perspective { field_of_view } => stream.write_f32(field_of_view),
            CameraProjection::Orthographic { zoom_x, zoom_y } => {
                stream.write_f32(zoom_x)?;
                stream.write_f32(zoom_y)
            }
        }
    }

    fn write_text_body(&self, out: &mut TextWriter<'_>) -> EncodeResult<()> {
        out.write_field("cameraType", self.camera_type() as u8)?;
        out.write_field("aspectRatio", self.aspect_ratio)?;
        out.write_field("nearPlane", self.near_plane)?;
        out.write_field("farPlane", self.far_plane)?;
        match self.projection {
            CameraProjection::Perspective { field_of_view } => out.write_field("fieldOfView", field_of_view),
            CameraProjection::Orthographic { zoom_x, zoom_y } => {
                out.write_field("zoomX", zoom_x)?;
                out.write_field("zoomY", zoom_y)
            }
        }
    }
}
