//! Flat-colored glyph drawn at a light's position.
//!
//! Independent of the particle path: one light per draw, no lighting math.

use glam::{Vec3, Vec4};

use crate::camera::CameraState;
use crate::light::PointLight;

/// Uniform scale applied to the marker mesh before it is moved onto the light.
pub const MARKER_SCALE: f32 = 0.005;

/// Clip position of a marker mesh vertex, scaled down and centered on the light.
pub fn marker_clip_position(camera: &CameraState, light: &PointLight, local_pos: Vec3) -> Vec4 {
    camera.view_proj * (local_pos * MARKER_SCALE + light.pos).extend(1.0)
}

/// Opaque light color; markers are never lit.
pub fn marker_color(light: &PointLight) -> Vec4 {
    light.color.extend(1.0)
}
