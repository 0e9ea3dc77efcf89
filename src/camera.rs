use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::layout::CameraUniform;

/// Per-frame camera block read by every vertex and fragment invocation.
///
/// Nothing here is validated: a singular or NaN-containing `view_proj`
/// flows straight into clip space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub view_proj: Mat4,
    pub view_pos: Vec3,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY,
            view_pos: Vec3::ZERO,
        }
    }
}

impl CameraState {
    pub fn new(view_proj: Mat4, view_pos: Vec3) -> Self {
        Self {
            view_proj,
            view_pos,
        }
    }

    /// Builds a right-handed perspective camera with wgpu's 0..1 clip depth.
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fovy_degrees: f32,
        aspect: f32,
        znear: f32,
        zfar: f32,
    ) -> Self {
        let view = Mat4::look_at_rh(eye, target, up);
        let projection = Mat4::perspective_rh(fovy_degrees.to_radians(), aspect, znear, zfar);
        Self {
            view_proj: projection * view,
            view_pos: eye,
        }
    }

    /// Packs the camera into the 80-byte uniform block.
    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_proj.to_cols_array_2d(),
            view_pos: self.view_pos.into(),
            _pad: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_at_records_eye_as_view_position() {
        let eye = Vec3::new(0.0, 1.0, 2.0);
        let camera = CameraState::look_at(eye, Vec3::ZERO, Vec3::Y, 45.0, 1.5, 0.5, 100.0);
        assert_eq!(camera.view_pos, eye);
    }

    #[test]
    fn look_at_maps_target_to_screen_center() {
        let camera = CameraState::look_at(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            Vec3::Y,
            60.0,
            1.0,
            0.1,
            100.0,
        );
        let clip = camera.view_proj * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn narrow_aspect_is_used_as_given() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let camera = CameraState::look_at(eye, Vec3::ZERO, Vec3::Y, 60.0, 0.001, 0.1, 100.0);
        let expected = Mat4::perspective_rh(60f32.to_radians(), 0.001, 0.1, 100.0)
            * Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        assert_eq!(camera.view_proj, expected);
    }

    #[test]
    fn uniform_is_column_major() {
        let view_proj = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let uniform = CameraState::new(view_proj, Vec3::new(4.0, 5.0, 6.0)).to_uniform();
        assert_eq!(uniform.view_proj[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(uniform.view_pos, [4.0, 5.0, 6.0]);
    }
}
