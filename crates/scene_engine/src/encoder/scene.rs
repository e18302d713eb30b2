//! Scene object
//!
//! ```text
//! [root count u32][node envelopes...]
//! [has active camera u8][node xref u32]?
//! [ambient r f32][g f32][b f32]
//! ```

use std::io::{Seek, Write};

use super::error::EncodeResult;
use super::node::Node;
use super::object::{Object, ObjectHeader, TypeId};
use super::text::TextWriter;
use super::writer::ObjectWriter;

/// Scene object
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    header: ObjectHeader,
    nodes: Vec<Node>,
    active_camera: Option<String>,
    ambient_color: [f32; 3],
}

impl Scene {
    /// Create an empty scene with black ambient light
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            header: ObjectHeader::new(id),
            nodes: Vec::new(),
            active_camera: None,
            ambient_color: [0.0; 3],
        }
    }

    /// Root nodes in write order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Append a root node
    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Id of the node carrying the active camera
    pub fn active_camera(&self) -> Option<&str> {
        self.active_camera.as_deref()
    }

    /// Select the node whose camera renders this scene
    pub fn set_active_camera(&mut self, node_id: impl Into<String>) {
        self.active_camera = Some(node_id.into());
    }

    /// Ambient colour
    pub fn ambient_color(&self) -> [f32; 3] {
        self.ambient_color
    }

    /// Set the ambient colour
    pub fn set_ambient_color(&mut self, r: f32, g: f32, b: f32) {
        self.ambient_color = [r, g, b];
    }
}

impl Object for Scene {
    fn type_id(&self) -> TypeId {
        TypeId::Scene
    }

    fn element_name(&self) -> &'static str {
        "Scene"
    }

    fn header(&self) -> &ObjectHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ObjectHeader {
        &mut self.header
    }

    fn write_binary_payload<W: Write + Seek>(&mut self, out: &mut ObjectWriter<W>) -> EncodeResult<()> {
        out.write_objects(&mut self.nodes)?;
        out.write_optional_xref(self.active_camera.as_deref())?;
        out.stream().write_f32_slice(&self.ambient_color)
    }

    fn write_text_body(&self, out: &mut TextWriter<'_>) -> EncodeResult<()> {
        for node in &self.nodes {
            node.write_text(out)?;
        }
        if let Some(camera) = &self.active_camera {
            out.write_xref_field("activeCamera", camera)?;
        }
        out.write_floats("ambientColor", &self.ambient_color)
    }
}
