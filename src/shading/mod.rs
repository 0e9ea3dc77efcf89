//! CPU reference of the particle and marker shading programs.
//!
//! Mirrors the WGSL in [`crate::render::shader`] operation for operation so
//! results can be checked without a GPU.

pub mod lighting;
pub mod marker;
pub mod surface;
pub mod transform;

use glam::{Vec2, Vec3, Vec4};

use crate::camera::CameraState;
use crate::config::ShadingStrategy;
use crate::error::ConfigError;
use crate::light::PointLight;

pub use lighting::{light_terms, LightTerms, LightingAccumulator, AMBIENT_STRENGTH, SHININESS};
pub use marker::{marker_clip_position, marker_color, MARKER_SCALE};
pub use surface::{FilterMode, InstanceColor, SurfaceColorSource, SurfaceTexture};
pub use transform::{transform_vertex, VertexOutput};

/// Values the fragment stage receives from the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentInput {
    pub world_pos: Vec3,
    pub world_normal: Vec3,
    pub uv: Vec2,
    pub color: Vec4,
}

/// Shaded color. Alpha always comes from the instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingOutput {
    pub rgb: Vec3,
    pub alpha: f32,
}

impl ShadingOutput {
    pub fn to_vec4(self) -> Vec4 {
        self.rgb.extend(self.alpha)
    }

    pub fn is_nan(&self) -> bool {
        self.rgb.is_nan() || self.alpha.is_nan()
    }
}

static INSTANCE_COLOR: InstanceColor = InstanceColor;

enum FragmentMode<'a> {
    Flat,
    Lit(&'a dyn SurfaceColorSource),
}

/// Fragment stage configured for one draw.
///
/// Choosing the strategy happens here, once; [`FragmentStage::shade`] never
/// fails and never branches on configuration errors.
pub struct FragmentStage<'a> {
    strategy: ShadingStrategy,
    mode: FragmentMode<'a>,
    accumulator: LightingAccumulator<'a>,
}

impl<'a> FragmentStage<'a> {
    pub fn new(
        strategy: ShadingStrategy,
        camera: &CameraState,
        lights: &'a [PointLight],
        texture: Option<&'a SurfaceTexture>,
    ) -> Result<Self, ConfigError> {
        let mode = match strategy {
            ShadingStrategy::Flat => FragmentMode::Flat,
            ShadingStrategy::Lit => FragmentMode::Lit(&INSTANCE_COLOR),
            ShadingStrategy::Textured => {
                FragmentMode::Lit(texture.ok_or(ConfigError::MissingSurfaceTexture)?)
            }
        };
        Ok(Self {
            strategy,
            mode,
            accumulator: LightingAccumulator::new(camera, lights),
        })
    }

    /// Lit stage with a caller-provided surface color source.
    pub fn with_surface(
        camera: &CameraState,
        lights: &'a [PointLight],
        surface: &'a dyn SurfaceColorSource,
    ) -> Self {
        Self {
            strategy: ShadingStrategy::Lit,
            mode: FragmentMode::Lit(surface),
            accumulator: LightingAccumulator::new(camera, lights),
        }
    }

    pub fn strategy(&self) -> ShadingStrategy {
        self.strategy
    }

    pub fn shade(&self, fragment: &FragmentInput) -> ShadingOutput {
        let rgb = match self.mode {
            FragmentMode::Flat => fragment.color.truncate(),
            FragmentMode::Lit(surface) => self
                .accumulator
                .accumulate(fragment, surface.surface_color(fragment)),
        };
        ShadingOutput {
            rgb,
            alpha: fragment.color.w,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    fn fragment() -> FragmentInput {
        FragmentInput {
            world_pos: Vec3::ZERO,
            world_normal: Vec3::Y,
            uv: Vec2::splat(0.5),
            color: Vec4::new(0.5, 0.25, 1.0, 0.75),
        }
    }

    fn camera() -> CameraState {
        CameraState::new(Mat4::IDENTITY, Vec3::new(0.0, 5.0, 5.0))
    }

    fn lights() -> Vec<PointLight> {
        vec![
            PointLight::new(Vec3::new(0.0, 2.0, 0.0), Vec3::ONE),
            PointLight::new(Vec3::new(3.0, 1.0, 0.0), Vec3::new(0.5, 0.1, 0.1)),
        ]
    }

    #[test]
    fn flat_outputs_instance_color() {
        let lights = lights();
        let stage = FragmentStage::new(ShadingStrategy::Flat, &camera(), &lights, None).unwrap();
        assert_eq!(stage.shade(&fragment()).to_vec4(), fragment().color);
    }

    #[test]
    fn lit_without_lights_is_black_with_alpha_kept() {
        let stage = FragmentStage::new(ShadingStrategy::Lit, &camera(), &[], None).unwrap();
        let out = stage.shade(&fragment());
        assert_eq!(out.rgb, Vec3::ZERO);
        assert_eq!(out.alpha, 0.75);
    }

    #[test]
    fn lit_matches_accumulator_with_instance_color() {
        let lights = lights();
        let camera = camera();
        let stage = FragmentStage::new(ShadingStrategy::Lit, &camera, &lights, None).unwrap();
        let expected = LightingAccumulator::new(&camera, &lights)
            .accumulate(&fragment(), fragment().color.truncate());
        assert_eq!(stage.shade(&fragment()).rgb, expected);
    }

    #[test]
    fn textured_swaps_only_the_surface_color() {
        let lights = lights();
        let camera = camera();
        let texture = SurfaceTexture::solid(Vec4::new(0.5, 0.25, 1.0, 0.1));
        let textured =
            FragmentStage::new(ShadingStrategy::Textured, &camera, &lights, Some(&texture))
                .unwrap();
        let lit = FragmentStage::new(ShadingStrategy::Lit, &camera, &lights, None).unwrap();

        // Texel rgb equals the instance rgb, so both strategies agree; alpha
        // stays the instance alpha rather than the texel's.
        let out = textured.shade(&fragment());
        assert_eq!(out, lit.shade(&fragment()));
        assert_eq!(out.alpha, 0.75);
    }

    #[test]
    fn textured_requires_a_texture() {
        let result = FragmentStage::new(ShadingStrategy::Textured, &camera(), &[], None);
        assert!(matches!(result, Err(ConfigError::MissingSurfaceTexture)));
    }

    #[test]
    fn custom_surface_source_is_used() {
        struct Grey;
        impl SurfaceColorSource for Grey {
            fn surface_color(&self, _fragment: &FragmentInput) -> Vec3 {
                Vec3::splat(0.5)
            }
        }
        let lights = lights();
        let camera = camera();
        let stage = FragmentStage::with_surface(&camera, &lights, &Grey);
        let expected =
            LightingAccumulator::new(&camera, &lights).accumulate(&fragment(), Vec3::splat(0.5));
        assert_eq!(stage.shade(&fragment()).rgb, expected);
        assert_eq!(stage.strategy(), ShadingStrategy::Lit);
    }

    #[test]
    fn nan_is_reported() {
        let out = ShadingOutput {
            rgb: Vec3::new(0.0, f32::NAN, 0.0),
            alpha: 1.0,
        };
        assert!(out.is_nan());
    }
}
