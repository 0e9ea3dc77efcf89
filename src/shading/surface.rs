use glam::{Vec2, Vec3, Vec4};

use crate::error::ConfigError;

use super::FragmentInput;

/// Where the lit strategies take the surface color that tints each light.
pub trait SurfaceColorSource {
    fn surface_color(&self, fragment: &FragmentInput) -> Vec3;
}

/// Uses the instance's base color.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceColor;

impl SurfaceColorSource for InstanceColor {
    fn surface_color(&self, fragment: &FragmentInput) -> Vec3 {
        fragment.color.truncate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

/// Decoded linear RGBA texels sampled with clamp-to-edge addressing.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceTexture {
    width: u32,
    height: u32,
    texels: Vec<Vec4>,
    filter: FilterMode,
}

impl SurfaceTexture {
    pub fn new(width: u32, height: u32, texels: Vec<Vec4>) -> Result<Self, ConfigError> {
        let expected = width as usize * height as usize;
        if expected == 0 || texels.len() != expected {
            return Err(ConfigError::TexelCount {
                width,
                height,
                expected,
                actual: texels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            texels,
            filter: FilterMode::default(),
        })
    }

    /// 1x1 texture of a single color.
    pub fn solid(color: Vec4) -> Self {
        Self {
            width: 1,
            height: 1,
            texels: vec![color],
            filter: FilterMode::Nearest,
        }
    }

    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    /// Row-major texels, top row first.
    pub fn texels(&self) -> &[Vec4] {
        &self.texels
    }

    pub fn sample(&self, uv: Vec2) -> Vec4 {
        match self.filter {
            FilterMode::Nearest => self.sample_nearest(uv),
            FilterMode::Linear => self.sample_linear(uv),
        }
    }

    fn texel(&self, x: i64, y: i64) -> Vec4 {
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        self.texels[y * self.width as usize + x]
    }

    fn sample_nearest(&self, uv: Vec2) -> Vec4 {
        let x = (uv.x * self.width as f32).floor() as i64;
        let y = (uv.y * self.height as f32).floor() as i64;
        self.texel(x, y)
    }

    fn sample_linear(&self, uv: Vec2) -> Vec4 {
        // Texel centers sit at half-integer coordinates.
        let x = uv.x * self.width as f32 - 0.5;
        let y = uv.y * self.height as f32 - 0.5;
        let (x0, y0) = (x.floor(), y.floor());
        let (fx, fy) = (x - x0, y - y0);
        // The casts saturate for huge uv, so the neighbor must too.
        let (x0, y0) = (x0 as i64, y0 as i64);
        let (x1, y1) = (x0.saturating_add(1), y0.saturating_add(1));

        let top = self.texel(x0, y0).lerp(self.texel(x1, y0), fx);
        let bottom = self.texel(x0, y1).lerp(self.texel(x1, y1), fx);
        top.lerp(bottom, fy)
    }
}

impl SurfaceColorSource for SurfaceTexture {
    fn surface_color(&self, fragment: &FragmentInput) -> Vec3 {
        self.sample(fragment.uv).truncate()
    }
}
