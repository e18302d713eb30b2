//! Light object
//!
//! Fixed-layout payload; every field is written regardless of light type:
//!
//! ```text
//! [light type u8][r f32][g f32][b f32]
//! [constant f32][linear f32][quadratic f32][falloff angle f32][falloff exponent f32]
//! ```

use std::io::{Read, Seek, Write};

use byteorder::{LittleEndian, ReadBytesExt};

use super::error::{DecodeError, DecodeResult, EncodeResult};
use super::object::{Object, ObjectHeader, TypeId};
use super::text::TextWriter;
use super::writer::ObjectWriter;

/// Kind of light
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LightType {
    /// Parallel rays along the node's forward axis
    Directional = 1,
    /// Omnidirectional light at the node's position
    Point = 2,
    /// Cone light at the node's position
    Spot = 3,
    /// Uniform scene-wide contribution
    Ambient = 255,
}

impl LightType {
    /// Decode a stored light type byte
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Directional),
            2 => Some(Self::Point),
            3 => Some(Self::Spot),
            255 => Some(Self::Ambient),
            _ => None,
        }
    }
}

/// Light object
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    header: ObjectHeader,
    light_type: LightType,
    color: [f32; 3],
    constant_attenuation: f32,
    linear_attenuation: f32,
    quadratic_attenuation: f32,
    falloff_angle: f32,
    falloff_exponent: f32,
}

impl Light {
    /// Number of stored colour channels
    pub const COLOR_SIZE: usize = 3;

    /// Size of the payload that follows the envelope id
    pub const PAYLOAD_SIZE: usize = 1 + 4 * Self::COLOR_SIZE + 4 * 5;

    /// Create a white directional light
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            header: ObjectHeader::new(id),
            light_type: LightType::Directional,
            color: [1.0, 1.0, 1.0],
            constant_attenuation: 1.0,
            linear_attenuation: 0.0,
            quadratic_attenuation: 0.0,
            falloff_angle: 0.0,
            falloff_exponent: 0.0,
        }
    }

    /// Current light type
    pub fn light_type(&self) -> LightType {
        self.light_type
    }

    /// Whether this is an ambient light
    pub fn is_ambient(&self) -> bool {
        self.light_type == LightType::Ambient
    }

    /// Make this an ambient light
    pub fn set_ambient_light(&mut self) {
        self.light_type = LightType::Ambient;
    }

    /// Make this a directional light
    pub fn set_directional_light(&mut self) {
        self.light_type = LightType::Directional;
    }

    /// Make this a point light
    pub fn set_point_light(&mut self) {
        self.light_type = LightType::Point;
    }

    /// Make this a spot light
    pub fn set_spot_light(&mut self) {
        self.light_type = LightType::Spot;
    }

    /// Set the light type directly
    pub fn set_light_type(&mut self, light_type: LightType) {
        self.light_type = light_type;
    }

    /// Red channel
    pub fn red(&self) -> f32 {
        self.color[0]
    }

    /// Green channel
    pub fn green(&self) -> f32 {
        self.color[1]
    }

    /// Blue channel
    pub fn blue(&self) -> f32 {
        self.color[2]
    }

    /// All three colour channels
    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    /// Set the light colour
    pub fn set_color(&mut self, r: f32, g: f32, b: f32) {
        self.color = [r, g, b];
    }

    /// Set the light colour from an RGBA source. Alpha is not stored.
    pub fn set_color_rgba(&mut self, r: f32, g: f32, b: f32, a: f32) {
        if (a - 1.0).abs() > f32::EPSILON {
            log::warn!("Light {:?}: alpha {} dropped, lights store RGB only", self.id(), a);
        }
        self.set_color(r, g, b);
    }

    /// Constant attenuation factor
    pub fn constant_attenuation(&self) -> f32 {
        self.constant_attenuation
    }

    /// Linear attenuation factor
    pub fn linear_attenuation(&self) -> f32 {
        self.linear_attenuation
    }

    /// Quadratic attenuation factor
    pub fn quadratic_attenuation(&self) -> f32 {
        self.quadratic_attenuation
    }

    /// Spot cone angle
    pub fn falloff_angle(&self) -> f32 {
        self.falloff_angle
    }

    /// Spot cone falloff exponent
    pub fn falloff_exponent(&self) -> f32 {
        self.falloff_exponent
    }

    /// Set constant attenuation
    pub fn set_constant_attenuation(&mut self, value: f32) {
        self.constant_attenuation = value;
    }

    /// Set linear attenuation
    pub fn set_linear_attenuation(&mut self, value: f32) {
        self.linear_attenuation = value;
    }

    /// Set quadratic attenuation
    pub fn set_quadratic_attenuation(&mut self, value: f32) {
        self.quadratic_attenuation = value;
    }

    /// Set spot cone angle
    pub fn set_falloff_angle(&mut self, value: f32) {
        self.falloff_angle = value;
    }

    /// Set spot cone falloff exponent
    pub fn set_falloff_exponent(&mut self, value: f32) {
        self.falloff_exponent = value;
    }

    /// Decode a light payload; `id` comes from the envelope
    pub fn read_payload<R: Read>(id: impl Into<String>, input: &mut R) -> DecodeResult<Self> {
        let raw_type = input.read_u8()?;
        let light_type = LightType::from_u8(raw_type).ok_or(DecodeError::UnknownLightType(raw_type))?;

        let mut light = Self::new(id);
        light.light_type = light_type;
        for channel in &mut light.color {
            *channel = input.read_f32::<LittleEndian>()?;
        }
        light.constant_attenuation = input.read_f32::<LittleEndian>()?;
        light.linear_attenuation = input.read_f32::<LittleEndian>()?;
        light.quadratic_attenuation = input.read_f32::<LittleEndian>()?;
        light.falloff_angle = input.read_f32::<LittleEndian>()?;
        light.falloff_exponent = input.read_f32::<LittleEndian>()?;
        Ok(light)
    }
}

impl Object for Light {
    fn type_id(&self) -> TypeId {
        TypeId::Light
    }

    fn element_name(&self) -> &'static str {
        "Light"
    }

    fn header(&self) -> &ObjectHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ObjectHeader {
        &mut self.header
    }

    fn write_binary_payload<W: Write + Seek>(&mut self, out: &mut ObjectWriter<W>) -> EncodeResult<()> {
        let stream = out.stream();
        stream.write_u8(self.light_type as u8)?;
        stream.write_f32_slice(&self.color)?;
        stream.write_f32(self.constant_attenuation)?;
        stream.write_f32(self.linear_attenuation)?;
        stream.write_f32(self.quadratic_attenuation)?;
        stream.write_f32(self.falloff_angle)?;
        stream.write_f32(self.falloff_exponent)
    }

    fn write_text_body(&self, out: &mut TextWriter<'_>) -> EncodeResult<()> {
        out.write_field("lightType", self.light_type as u8)?;
        out.write_floats("color", &self.color)?;
        if matches!(self.light_type, LightType::Point | LightType::Spot) {
            out.write_field("constantAttenuation", self.constant_attenuation)?;
            out.write_field("linearAttenuation", self.linear_attenuation)?;
            out.write_field("quadraticAttenuation", self.quadratic_attenuation)?;
        }
        if self.light_type == LightType::Spot {
            out.write_field("falloffAngle", self.falloff_angle)?;
            out.write_field("falloffExponent", self.falloff_exponent)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::reader::PackageReader;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    fn encode(light: &mut Light) -> Vec<u8> {
        let mut writer = ObjectWriter::new(Cursor::new(Vec::new())).unwrap();
        writer.write_object(light).unwrap();
        writer.finish().unwrap().0.into_inner()
    }

    #[test]
    fn test_color_roundtrip() {
        let mut light = Light::new("key");
        light.set_color(0.2, 0.4, 0.6);
        let bytes = encode(&mut light);

        let decoded = PackageReader::raw(&bytes).read_light(0).unwrap();
        assert_relative_eq!(decoded.red(), 0.2);
        assert_relative_eq!(decoded.green(), 0.4);
        assert_relative_eq!(decoded.blue(), 0.6);
    }

    #[test]
    fn test_alpha_not_persisted() {
        let mut with_alpha = Light::new("a");
        with_alpha.set_color_rgba(0.2, 0.4, 0.6, 0.5);
        let mut without_alpha = Light::new("a");
        without_alpha.set_color(0.2, 0.4, 0.6);

        let bytes = encode(&mut with_alpha);
        assert_eq!(bytes, encode(&mut without_alpha));
        // type tag, id "a", then the fixed payload and nothing else
        assert_eq!(bytes.len(), 4 + 4 + 1 + Light::PAYLOAD_SIZE);
    }

    #[test]
    fn test_fixed_layout_for_every_type() {
        for set in [Light::set_ambient_light, Light::set_directional_light, Light::set_point_light, Light::set_spot_light] {
            let mut light = Light::new("");
            set(&mut light);
            assert_eq!(encode(&mut light).len(), 4 + 4 + Light::PAYLOAD_SIZE);
        }
    }

    #[test]
    fn test_spot_attenuation_roundtrip() {
        let mut light = Light::new("spot");
        light.set_spot_light();
        light.set_constant_attenuation(0.5);
        light.set_linear_attenuation(0.25);
        light.set_quadratic_attenuation(0.125);
        light.set_falloff_angle(30.0);
        light.set_falloff_exponent(2.0);

        let bytes = encode(&mut light);
        let decoded = PackageReader::raw(&bytes).read_light(0).unwrap();

        assert_eq!(decoded.light_type(), LightType::Spot);
        assert_relative_eq!(decoded.constant_attenuation(), 0.5);
        assert_relative_eq!(decoded.linear_attenuation(), 0.25);
        assert_relative_eq!(decoded.quadratic_attenuation(), 0.125);
        assert_relative_eq!(decoded.falloff_angle(), 30.0);
        assert_relative_eq!(decoded.falloff_exponent(), 2.0);
    }

    #[test]
    fn test_type_setters_only_change_type() {
        let mut light = Light::new("l");
        light.set_color(0.1, 0.2, 0.3);
        light.set_linear_attenuation(0.7);

        light.set_ambient_light();
        assert!(light.is_ambient());
        assert_eq!(light.color(), [0.1, 0.2, 0.3]);
        assert_relative_eq!(light.linear_attenuation(), 0.7);
    }

    #[test]
    fn test_unknown_light_type_rejected() {
        let payload = [7u8; Light::PAYLOAD_SIZE];
        let result = Light::read_payload("", &mut Cursor::new(&payload[..]));
        assert!(matches!(result, Err(DecodeError::UnknownLightType(7))));
    }
}
