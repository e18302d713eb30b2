//! Document: the root of a serialization pass
//!
//! Owns every top-level object. Lists are written in a fixed order (lights,
//! cameras, scenes) so that node references to lights and cameras are
//! normally backward references; forward references still work through
//! finalization patching.

use std::io::{Seek, Write};

use super::camera::CameraDescriptor;
use super::error::EncodeResult;
use super::light::Light;
use super::object::Object;
use super::scene::Scene;
use super::text::TextWriter;
use super::writer::{EncodeSummary, ObjectWriter};
use crate::core::EncoderConfig;

/// Element name of the text-form wrapper
pub const DOCUMENT_ELEMENT: &str = "SceneDocument";

/// Collection of top-level objects written together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    lights: Vec<Light>,
    cameras: Vec<CameraDescriptor>,
    scenes: Vec<Scene>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a light
    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Add a camera descriptor
    pub fn add_camera(&mut self, camera: CameraDescriptor) {
        self.cameras.push(camera);
    }

    /// Add a scene
    pub fn add_scene(&mut self, scene: Scene) {
        self.scenes.push(scene);
    }

    /// Lights in write order
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Camera descriptors in write order
    pub fn cameras(&self) -> &[CameraDescriptor] {
        &self.cameras
    }

    /// Scenes in write order
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Write the binary container and finalize it
    ///
    /// Every object's file position is recorded as a side effect, so a
    /// document can only be written once.
    pub fn write_binary<W: Write + Seek>(&mut self, writer: W, config: &EncoderConfig) -> EncodeResult<(W, EncodeSummary)> {
        let mut out = ObjectWriter::with_header(writer, config.write_reference_table)?;
        out.write_objects(&mut self.lights)?;
        out.write_objects(&mut self.cameras)?;
        out.write_objects(&mut self.scenes)?;
        out.finish()
    }

    /// Write the text form
    pub fn write_text(&self, out: &mut dyn Write, config: &EncoderConfig) -> EncodeResult<()> {
        let mut text = TextWriter::new(out, config.text_indent);
        text.element_start(DOCUMENT_ELEMENT, "")?;
        for light in &self.lights {
            light.write_text(&mut text)?;
        }
        for camera in &self.cameras {
            camera.write_text(&mut text)?;
        }
        for scene in &self.scenes {
            scene.write_text(&mut text)?;
        }
        text.element_end(DOCUMENT_ELEMENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::error::EncodeError;
    use crate::encoder::node::Node;
    use crate::encoder::object::TypeId;
    use crate::encoder::reader::PackageReader;
    use crate::scene::CameraError;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    fn sample() -> Document {
        let mut doc = Document::new();

        let mut sun = Light::new("sun");
        sun.set_color(1.0, 0.9, 0.8);
        doc.add_light(sun);
        doc.add_camera(CameraDescriptor::perspective("lens", 60.0, 1.5, 0.1, 100.0));

        let mut rig = Node::new("rig");
        rig.set_camera("lens");
        let mut lamp = Node::new("lamp");
        lamp.set_light("sun");

        let mut scene = Scene::new("level");
        scene.add_node(rig);
        scene.add_node(lamp);
        scene.set_active_camera("rig");
        scene.set_ambient_color(0.1, 0.1, 0.1);
        doc.add_scene(scene);
        doc
    }

    #[test]
    fn test_xrefs_match_recorded_positions() {
        let mut doc = sample();
        let (cursor, summary) = doc.write_binary(Cursor::new(Vec::new()), &EncoderConfig::default()).unwrap();
        assert_eq!(summary.objects, 5);
        assert_eq!(summary.references, 5);

        let bytes = cursor.into_inner();
        let reader = PackageReader::open(&bytes).unwrap();

        let sun = doc.lights()[0].file_position();
        let lens = doc.cameras()[0].file_position();
        let rig = doc.scenes()[0].nodes()[0].file_position();

        assert_eq!(reader.offset_of("sun").ok(), sun);
        assert_eq!(reader.type_of("lens").unwrap(), TypeId::Camera);

        let scene = reader.read_scene(doc.scenes()[0].file_position().unwrap()).unwrap();
        assert_eq!(scene.nodes.len(), 2);
        assert_eq!(scene.nodes[0].camera, lens);
        assert_eq!(scene.nodes[1].light, sun);
        assert_eq!(scene.active_camera, rig);
        assert_relative_eq!(scene.ambient_color[0], 0.1);
    }

    #[test]
    fn test_missing_light_detected_before_output_completes() {
        let mut doc = sample();
        let mut stray = Node::new("stray");
        stray.set_light("nowhere");
        doc.scenes[0].add_node(stray);

        let result = doc.write_binary(Cursor::new(Vec::new()), &EncoderConfig::default());
        assert!(matches!(result, Err(EncodeError::UnresolvedReference(id)) if id == "nowhere"));
    }

    #[test]
    fn test_duplicate_ids_across_lists_rejected() {
        let mut doc = sample();
        doc.add_camera(CameraDescriptor::perspective("sun", 45.0, 1.0, 0.1, 10.0));

        let result = doc.write_binary(Cursor::new(Vec::new()), &EncoderConfig::default());
        assert!(matches!(result, Err(EncodeError::DuplicateId(id)) if id == "sun"));
    }

    #[test]
    fn test_inverted_clip_planes_rejected() {
        let mut doc = sample();
        doc.add_camera(CameraDescriptor::perspective("inverted", 45.0, 1.0, 5.0, 1.0));

        let result = doc.write_binary(Cursor::new(Vec::new()), &EncoderConfig::default());
        assert!(matches!(
            result,
            Err(EncodeError::InvalidCamera(CameraError::InvalidClipPlanes { .. }))
        ));
    }

    #[test]
    fn test_reference_table_optional() {
        let mut doc = sample();
        let config = EncoderConfig { write_reference_table: false, ..EncoderConfig::default() };
        let (cursor, summary) = doc.write_binary(Cursor::new(Vec::new()), &config).unwrap();
        assert_eq!(summary.references, 0);

        let bytes = cursor.into_inner();
        let reader = PackageReader::open(&bytes).unwrap();
        assert!(reader.references().is_empty());
        assert!(reader.offset_of("sun").is_err());
    }

    #[test]
    fn test_text_form_wraps_objects() {
        let doc = sample();
        let mut buffer = Vec::new();
        doc.write_text(&mut buffer, &EncoderConfig::default()).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.starts_with("<SceneDocument>\n  <Light id=\"sun\">\n"));
        assert!(text.contains("    <activeCamera>#rig</activeCamera>\n"));
        assert!(text.ends_with("</SceneDocument>\n"));
    }
}
