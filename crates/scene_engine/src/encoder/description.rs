//! Serde scene descriptions
//!
//! Authoring format consumed by the encoder tool. A description is loaded
//! from RON or TOML through the [`Config`] trait and turned into a
//! [`Document`].
//!
//! ```ron
//! (
//!     lights: [(id: "sun", kind: Directional, color: (1.0, 0.95, 0.9))],
//!     cameras: [(id: "lens", projection: Perspective(field_of_view: 60.0))],
//!     scenes: [(
//!         id: "level",
//!         active_camera: Some("eye"),
//!         nodes: [(id: "eye", position: (0.0, 2.0, 10.0), camera: Some("lens"))],
//!     )],
//! )
//! ```

use serde::{Deserialize, Serialize};

use super::camera::CameraDescriptor;
use super::document::Document;
use super::light::{Light, LightType};
use super::node::Node;
use super::scene::Scene;
use crate::config::{Config, ConfigError};
use crate::foundation::math::{Quat, Quaternion, Transform, Vec3, EPSILON};

/// Light kind as written in descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LightKind {
    /// Directional light
    #[default]
    Directional,
    /// Point light
    Point,
    /// Spot light
    Spot,
    /// Ambient light
    Ambient,
}

impl From<LightKind> for LightType {
    fn from(kind: LightKind) -> Self {
        match kind {
            LightKind::Directional => Self::Directional,
            LightKind::Point => Self::Point,
            LightKind::Spot => Self::Spot,
            LightKind::Ambient => Self::Ambient,
        }
    }
}

/// Light entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightDescription {
    /// Object id
    pub id: String,
    /// Light kind
    pub kind: LightKind,
    /// RGB colour
    pub color: [f32; 3],
    /// Constant attenuation
    pub constant_attenuation: f32,
    /// Linear attenuation
    pub linear_attenuation: f32,
    /// Quadratic attenuation
    pub quadratic_attenuation: f32,
    /// Spot cone angle
    pub falloff_angle: f32,
    /// Spot cone falloff exponent
    pub falloff_exponent: f32,
}

impl Default for LightDescription {
    fn default() -> Self {
        Self {
            id: String::new(),
            kind: LightKind::Directional,
            color: [1.0, 1.0, 1.0],
            constant_attenuation: 1.0,
            linear_attenuation: 0.0,
            quadratic_attenuation: 0.0,
            falloff_angle: 0.0,
            falloff_exponent: 0.0,
        }
    }
}

impl LightDescription {
    fn build(&self) -> Light {
        let mut light = Light::new(self.id.clone());
        light.set_light_type(self.kind.into());
        let [r, g, b] = self.color;
        light.set_color(r, g, b);
        light.set_constant_attenuation(self.constant_attenuation);
        light.set_linear_attenuation(self.linear_attenuation);
        light.set_quadratic_attenuation(self.quadratic_attenuation);
        light.set_falloff_angle(self.falloff_angle);
        light.set_falloff_exponent(self.falloff_exponent);
        light
    }
}

/// Projection entry of a camera description
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProjectionDescription {
    /// Perspective projection
    Perspective {
        /// Vertical field of view in degrees
        field_of_view: f32,
    },
    /// Orthographic projection
    Orthographic {
        /// Horizontal zoom
        zoom_x: f32,
        /// Vertical zoom
        zoom_y: f32,
    },
}

impl Default for ProjectionDescription {
    fn default() -> Self {
        Self::Perspective { field_of_view: 45.0 }
    }
}

/// Camera entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDescription {
    /// Object id
    pub id: String,
    /// Projection parameters
    pub projection: ProjectionDescription,
    /// Aspect ratio
    pub aspect_ratio: f32,
    /// Near plane distance
    pub near_plane: f32,
    /// Far plane distance
    pub far_plane: f32,
}

impl Default for CameraDescription {
    fn default() -> Self {
        Self {
            id: String::new(),
            projection: ProjectionDescription::default(),
            aspect_ratio: 16.0 / 9.0,
            near_plane: 0.1,
            far_plane: 1000.0,
        }
    }
}

impl CameraDescription {
    fn build(&self) -> CameraDescriptor {
        match self.projection {
            ProjectionDescription::Perspective { field_of_view } => {
                CameraDescriptor::perspective(self.id.clone(), field_of_view, self.aspect_ratio, self.near_plane, self.far_plane)
            }
            ProjectionDescription::Orthographic { zoom_x, zoom_y } => {
                CameraDescriptor::orthographic(self.id.clone(), zoom_x, zoom_y, self.aspect_ratio, self.near_plane, self.far_plane)
            }
        }
    }
}

/// Node entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeDescription {
    /// Object id
    pub id: String,
    /// Whether the node is a skeleton joint
    pub joint: bool,
    /// Local translation
    pub position: [f32; 3],
    /// Local rotation quaternion as (x, y, z, w)
    pub rotation: [f32; 4],
    /// Local scale
    pub scale: [f32; 3],
    /// Child nodes
    pub children: Vec<NodeDescription>,
    /// Referenced camera descriptor id
    pub camera: Option<String>,
    /// Referenced light id
    pub light: Option<String>,
}

impl Default for NodeDescription {
    fn default() -> Self {
        Self {
            id: String::new(),
            joint: false,
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0; 3],
            children: Vec::new(),
            camera: None,
            light: None,
        }
    }
}

impl NodeDescription {
    /// Local transform described by this entry
    ///
    /// Fails for non-finite components and for a rotation that cannot be
    /// normalized.
    pub fn transform(&self) -> Result<Transform, ConfigError> {
        let finite = self
            .position
            .iter()
            .chain(&self.rotation)
            .chain(&self.scale)
            .all(|v| v.is_finite());
        if !finite {
            return Err(ConfigError::Invalid(format!("node {:?} has a non-finite transform", self.id)));
        }

        let [x, y, z, w] = self.rotation;
        let rotation = Quat::try_new(Quaternion::new(w, x, y, z), EPSILON).ok_or_else(|| {
            ConfigError::Invalid(format!("node {:?} has a zero-length rotation", self.id))
        })?;
        Ok(Transform {
            position: Vec3::from(self.position),
            rotation,
            scale: Vec3::from(self.scale),
        })
    }

    fn build(&self) -> Result<Node, ConfigError> {
        let mut node = Node::new(self.id.clone());
        node.set_joint(self.joint);
        node.set_transform(&self.transform()?);
        for child in &self.children {
            node.add_child(child.build()?);
        }
        if let Some(camera) = &self.camera {
            node.set_camera(camera.clone());
        }
        if let Some(light) = &self.light {
            node.set_light(light.clone());
        }
        Ok(node)
    }
}

/// Scene entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    /// Object id
    pub id: String,
    /// Root nodes
    pub nodes: Vec<NodeDescription>,
    /// Id of the node carrying the active camera
    pub active_camera: Option<String>,
    /// Ambient colour
    pub ambient_color: [f32; 3],
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self {
            id: String::new(),
            nodes: Vec::new(),
            active_camera: None,
            ambient_color: [0.0; 3],
        }
    }
}

impl SceneDescription {
    fn build(&self) -> Result<Scene, ConfigError> {
        let mut scene = Scene::new(self.id.clone());
        for node in &self.nodes {
            scene.add_node(node.build()?);
        }
        if let Some(camera) = &self.active_camera {
            scene.set_active_camera(camera.clone());
        }
        let [r, g, b] = self.ambient_color;
        scene.set_ambient_color(r, g, b);
        Ok(scene)
    }
}

/// Complete authoring description of a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentDescription {
    /// Lights
    pub lights: Vec<LightDescription>,
    /// Camera descriptors
    pub cameras: Vec<CameraDescription>,
    /// Scenes
    pub scenes: Vec<SceneDescription>,
}

impl Config for DocumentDescription {}

impl Document {
    /// Build a document from an authoring description
    ///
    /// Node transforms are checked here. Ids, references and camera
    /// parameters are checked when the document is written.
    pub fn from_description(description: &DocumentDescription) -> Result<Self, ConfigError> {
        let mut document = Self::new();
        for light in &description.lights {
            document.add_light(light.build());
        }
        for camera in &description.cameras {
            document.add_camera(camera.build());
        }
        for scene in &description.scenes {
            document.add_scene(scene.build()?);
        }
        Ok(document)
    }
}
