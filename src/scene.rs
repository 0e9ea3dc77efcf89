use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use glam::{EulerRot, Quat, Vec3, Vec4};
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::camera::CameraState;
use crate::config::ShadingStrategy;
use crate::frame::FrameInputs;
use crate::instance::ParticleInstance;
use crate::light::{LightBuffer, PointLight};
use crate::shading::{FilterMode, SurfaceTexture};

/// Scene file contents: one camera, any number of lights and particles, and
/// an optional inline surface texture.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneDescription {
    pub camera: CameraDescription,
    pub lights: Vec<PointLight>,
    pub particles: Vec<ParticleDescription>,
    pub texture: Option<SurfaceTexture>,
    pub strategy: Option<ShadingStrategy>,
}

impl SceneDescription {
    pub fn load(path: &Path) -> Result<Self> {
        let xml = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scene {}", path.display()))?;
        Self::from_xml(&xml).with_context(|| format!("failed to parse scene {}", path.display()))
    }

    /// Parses a `<scene>` document.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let root = document.root_element();
        if !root.has_tag_name("scene") {
            bail!("expected <scene> root element, found <{}>", root.tag_name().name());
        }

        let camera = match child(&root, "camera") {
            Some(node) => CameraDescription::from_node(&node).context("invalid <camera>")?,
            None => CameraDescription::default(),
        };

        let lights = children(&root, "light")
            .enumerate()
            .map(|(index, node)| {
                parse_light(&node).with_context(|| format!("invalid <light> #{index}"))
            })
            .collect::<Result<Vec<_>>>()?;

        let particles = children(&root, "particle")
            .enumerate()
            .map(|(index, node)| {
                ParticleDescription::from_node(&node)
                    .with_context(|| format!("invalid <particle> #{index}"))
            })
            .collect::<Result<Vec<_>>>()?;

        let texture = child(&root, "texture")
            .map(|node| parse_texture(&node).context("invalid <texture>"))
            .transpose()?;

        let strategy = optional_text(&root, "strategy")
            .map(|value| value.parse::<ShadingStrategy>())
            .transpose()?;

        Ok(Self {
            camera,
            lights,
            particles,
            texture,
            strategy,
        })
    }

    pub fn instances(&self) -> Vec<ParticleInstance> {
        self.particles
            .iter()
            .map(ParticleDescription::to_instance)
            .collect()
    }

    pub fn light_buffer(&self) -> LightBuffer {
        self.lights.iter().copied().collect()
    }

    pub fn frame_inputs(&self) -> FrameInputs {
        FrameInputs {
            camera: self.camera.to_state(),
            lights: self.light_buffer(),
            instances: self.instances(),
        }
    }
}

/// Perspective camera parameters as written in a scene file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraDescription {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraDescription {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 1.0, 2.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 45.0,
            aspect: 1.0,
            znear: 0.1,
            zfar: 100.0,
        }
    }
}

impl CameraDescription {
    fn from_node(node: &Node<'_, '_>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            eye: parse_vec3(optional_text(node, "eye"), defaults.eye)?,
            target: parse_vec3(optional_text(node, "target"), defaults.target)?,
            up: parse_vec3(optional_text(node, "up"), defaults.up)?,
            fov: parse_f32(optional_text(node, "fov"), defaults.fov)?,
            aspect: parse_f32(optional_text(node, "aspect"), defaults.aspect)?,
            znear: parse_f32(optional_text(node, "znear"), defaults.znear)?,
            zfar: parse_f32(optional_text(node, "zfar"), defaults.zfar)?,
        })
    }

    pub fn to_state(&self) -> CameraState {
        CameraState::look_at(
            self.eye,
            self.target,
            self.up,
            self.fov,
            self.aspect,
            self.znear,
            self.zfar,
        )
    }
}

/// Particle transform as authored: Euler rotation in degrees, uniform scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleDescription {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
    pub color: Vec4,
}

impl Default for ParticleDescription {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
            color: Vec4::ONE,
        }
    }
}

impl ParticleDescription {
    fn from_node(node: &Node<'_, '_>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            position: parse_vec3(optional_text(node, "position"), defaults.position)?,
            rotation: parse_vec3(optional_text(node, "rotation"), defaults.rotation)?,
            scale: parse_f32(optional_text(node, "scale"), defaults.scale)?,
            color: parse_vec4(optional_text(node, "color"), defaults.color)?,
        })
    }

    /// Rotation applies X, then Y, then Z.
    pub fn to_instance(&self) -> ParticleInstance {
        let rotation = Quat::from_euler(
            EulerRot::ZYX,
            self.rotation.z.to_radians(),
            self.rotation.y.to_radians(),
            self.rotation.x.to_radians(),
        );
        ParticleInstance::from_transform(self.position, rotation, self.scale, self.color)
    }
}

fn parse_light(node: &Node<'_, '_>) -> Result<PointLight> {
    let defaults = PointLight::default();
    Ok(PointLight::new(
        parse_vec3(optional_text(node, "position"), defaults.pos)?,
        parse_vec3(optional_text(node, "color"), defaults.color)?,
    ))
}

fn parse_texture(node: &Node<'_, '_>) -> Result<SurfaceTexture> {
    let [width, height] = parse_floats::<2>(&required_text(node, "size")?, "size")?;
    if width.fract() != 0.0 || height.fract() != 0.0 || width < 1.0 || height < 1.0 {
        bail!("texture size must be two positive integers, got {width} {height}");
    }
    let filter = match optional_text(node, "filter").as_deref() {
        None | Some("linear") => FilterMode::Linear,
        Some("nearest") => FilterMode::Nearest,
        Some(other) => bail!("unknown texture filter `{other}`"),
    };

    let channels = parse_numbers(&required_text(node, "texels")?)?;
    if channels.len() % 4 != 0 {
        bail!("texels must be RGBA quadruples, got {} values", channels.len());
    }
    let texels = channels
        .chunks_exact(4)
        .map(|c| Vec4::new(c[0], c[1], c[2], c[3]))
        .collect();
    Ok(SurfaceTexture::new(width as u32, height as u32, texels)?.with_filter(filter))
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(tag))
}

fn children<'a, 'input: 'a>(
    node: &Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |child| child.has_tag_name(tag))
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_numbers(value: &str) -> Result<Vec<f32>> {
    value
        .split_whitespace()
        .map(|component| {
            component
                .parse::<f32>()
                .map_err(|err| anyhow!("`{component}` is not a number: {err}"))
        })
        .collect()
}

fn parse_floats<const N: usize>(value: &str, what: &str) -> Result<[f32; N]> {
    let numbers = parse_numbers(value)?;
    numbers
        .try_into()
        .map_err(|numbers: Vec<f32>| anyhow!("{what} needs {N} components, got {}", numbers.len()))
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    match value {
        Some(value) => parse_floats::<3>(&value, "vector").map(Vec3::from_array),
        None => Ok(default),
    }
}

fn parse_vec4(value: Option<String>, default: Vec4) -> Result<Vec4> {
    match value {
        Some(value) => parse_floats::<4>(&value, "color").map(Vec4::from_array),
        None => Ok(default),
    }
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    const SAMPLE: &str = r#"
    <scene>
        <strategy>textured</strategy>
        <camera>
            <eye>0 2 6</eye>
            <fov>60</fov>
            <aspect>1.5</aspect>
        </camera>
        <light>
            <position>0 5 0</position>
            <color>1 0.5 0</color>
        </light>
        <light>
            <position>-3 1 2</position>
        </light>
        <particle>
            <position>1 2 3</position>
            <rotation>0 90 0</rotation>
            <scale>0.5</scale>
            <color>0.2 0.4 0.6 0.8</color>
        </particle>
        <particle/>
        <texture>
            <size>2 1</size>
            <filter>nearest</filter>
            <texels>1 0 0 1  0 0 1 1</texels>
        </texture>
    </scene>
    "#;

    #[test]
    fn parse_scene_populates_every_section() {
        let scene = SceneDescription::from_xml(SAMPLE).unwrap();
        assert_eq!(scene.strategy, Some(ShadingStrategy::Textured));
        assert_eq!(scene.camera.eye, Vec3::new(0.0, 2.0, 6.0));
        assert_eq!(scene.camera.fov, 60.0);
        assert_eq!(scene.camera.zfar, 100.0);

        assert_eq!(scene.lights.len(), 2);
        assert_eq!(scene.lights[0].color, Vec3::new(1.0, 0.5, 0.0));
        assert_eq!(scene.lights[1].color, Vec3::ONE);

        assert_eq!(scene.particles.len(), 2);
        assert_eq!(scene.particles[0].scale, 0.5);
        assert_eq!(scene.particles[0].color, Vec4::new(0.2, 0.4, 0.6, 0.8));
        assert_eq!(scene.particles[1], ParticleDescription::default());

        let texture = scene.texture.unwrap();
        assert_eq!((texture.width(), texture.height()), (2, 1));
        assert_eq!(texture.sample(Vec2::new(0.9, 0.5)), Vec4::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn particle_rotation_is_in_degrees() {
        let particle = ParticleDescription {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::new(0.0, 90.0, 0.0),
            scale: 2.0,
            color: Vec4::ONE,
        };
        let instance = particle.to_instance();
        assert_eq!(instance.position(), Vec3::new(1.0, 2.0, 3.0));
        let rotated_x = instance.normal_matrix * Vec3::X;
        assert!(rotated_x.abs_diff_eq(Vec3::NEG_Z, 1e-6));
        let corner = instance.model * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!(corner.abs_diff_eq(Vec4::new(1.0, 2.0, 1.0, 1.0), 1e-5));
    }

    #[test]
    fn frame_inputs_cover_lights_and_instances() {
        let scene = SceneDescription::from_xml(SAMPLE).unwrap();
        let inputs = scene.frame_inputs();
        assert_eq!(inputs.lights.count(), 2);
        assert_eq!(inputs.instances.len(), 2);
        assert_eq!(inputs.camera.view_pos, Vec3::new(0.0, 2.0, 6.0));
    }

    #[test]
    fn empty_scene_uses_defaults() {
        let scene = SceneDescription::from_xml("<scene/>").unwrap();
        assert_eq!(scene.camera, CameraDescription::default());
        assert!(scene.lights.is_empty());
        assert!(scene.particles.is_empty());
        assert!(scene.texture.is_none());
        assert!(scene.strategy.is_none());
    }

    #[test]
    fn malformed_values_are_errors() {
        let short = "<scene><light><position>1 2</position></light></scene>";
        assert!(SceneDescription::from_xml(short).is_err());

        let garbage = "<scene><particle><scale>big</scale></particle></scene>";
        assert!(SceneDescription::from_xml(garbage).is_err());

        let strategy = "<scene><strategy>pbr</strategy></scene>";
        let err = SceneDescription::from_xml(strategy).unwrap_err();
        assert!(format!("{err:#}").contains("pbr"));

        let texels = "<scene><texture><size>2 2</size><texels>1 1 1 1</texels></texture></scene>";
        assert!(SceneDescription::from_xml(texels).is_err());

        assert!(SceneDescription::from_xml("<world/>").is_err());
    }
}
