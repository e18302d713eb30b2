//! Node object
//!
//! A node owns its children and refers to cameras and lights by id.
//!
//! ```text
//! [node type u32][transform 16 x f32, column-major]
//! [child count u32][child envelopes...]
//! [has camera u8][camera xref u32]?
//! [has light u8][light xref u32]?
//! ```

use std::io::{Seek, Write};

use super::error::EncodeResult;
use super::object::{Object, ObjectHeader, TypeId};
use super::text::TextWriter;
use super::writer::ObjectWriter;
use crate::foundation::math::{matrix_to_column_major, Mat4, Transform};

/// Node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum NodeType {
    /// Plain transform node
    Node = 1,
    /// Skeleton joint
    Joint = 2,
}

impl NodeType {
    /// Decode a stored node type
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Node),
            2 => Some(Self::Joint),
            _ => None,
        }
    }
}

/// Node object
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    header: ObjectHeader,
    node_type: NodeType,
    transform: Mat4,
    children: Vec<Node>,
    camera: Option<String>,
    light: Option<String>,
}

impl Node {
    /// Create a plain node with an identity transform
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            header: ObjectHeader::new(id),
            node_type: NodeType::Node,
            transform: Mat4::identity(),
            children: Vec::new(),
            camera: None,
            light: None,
        }
    }

    /// Node kind
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Mark this node as a joint or plain node
    pub fn set_joint(&mut self, joint: bool) {
        self.node_type = if joint { NodeType::Joint } else { NodeType::Node };
    }

    /// Local transform matrix
    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    /// Replace the local transform matrix
    pub fn set_transform_matrix(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    /// Replace the local transform
    pub fn set_transform(&mut self, transform: &Transform) {
        self.transform = transform.to_matrix();
    }

    /// Children in write order
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Append a child
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Id of the referenced camera descriptor
    pub fn camera(&self) -> Option<&str> {
        self.camera.as_deref()
    }

    /// Reference a camera descriptor by id
    pub fn set_camera(&mut self, id: impl Into<String>) {
        self.camera = Some(id.into());
    }

    /// Id of the referenced light
    pub fn light(&self) -> Option<&str> {
        self.light.as_deref()
    }

    /// Reference a light by id
    pub fn set_light(&mut self, id: impl Into<String>) {
        self.light = Some(id.into());
    }
}

impl Object for Node {
    fn type_id(&self) -> TypeId {
        TypeId::Node
    }

    fn element_name(&self) -> &'static str {
        "Node"
    }

    fn header(&self) -> &ObjectHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ObjectHeader {
        &mut self.header
    }

    fn write_binary_payload<W: Write + Seek>(&mut self, out: &mut ObjectWriter<W>) -> EncodeResult<()> {
        out.stream().write_u32(self.node_type as u32)?;
        out.stream().write_matrix(&self.transform)?;
        out.write_objects(&mut self.children)?;
        out.write_optional_xref(self.camera.as_deref())?;
        out.write_optional_xref(self.light.as_deref())
    }

    fn write_text_body(&self, out: &mut TextWriter<'_>) -> EncodeResult<()> {
        out.write_field("nodeType", self.node_type as u32)?;
        out.write_floats("transform", &matrix_to_column_major(&self.transform))?;
        for child in &self.children {
            child.write_text(out)?;
        }
        if let Some(camera) = &self.camera {
            out.write_xref_field("camera", camera)?;
        }
        if let Some(light) = &self.light {
            out.write_xref_field("light", light)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::text::TextWriter;
    use crate::foundation::math::Vec3;

    #[test]
    fn test_text_form_nests_children() {
        let mut root = Node::new("root");
        let mut arm = Node::new("arm");
        arm.set_joint(true);
        arm.set_light("lamp");
        root.add_child(arm);

        let mut buffer = Vec::new();
        root.write_text(&mut TextWriter::new(&mut buffer, 2)).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.starts_with("<Node id=\"root\">\n  <nodeType>1</nodeType>\n"));
        assert!(text.contains("  <Node id=\"arm\">\n    <nodeType>2</nodeType>\n"));
        assert!(text.contains("    <light>#lamp</light>\n  </Node>\n"));
        assert!(text.ends_with("</Node>\n"));
    }

    #[test]
    fn test_transform_setter_uses_matrix_form() {
        let mut node = Node::new("n");
        let transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        node.set_transform(&transform);
        assert_eq!(node.transform(), &transform.to_matrix());
    }
}
