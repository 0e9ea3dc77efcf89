use glam::{Mat3, Mat4, Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// One particle's per-draw data.
///
/// `normal_matrix` is trusted as given. Under non-uniform scale the caller
/// must supply the inverse-transpose; nothing here recomputes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleInstance {
    pub model: Mat4,
    pub normal_matrix: Mat3,
    pub color: Vec4,
}

impl Default for ParticleInstance {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY,
            normal_matrix: Mat3::IDENTITY,
            color: Vec4::ONE,
        }
    }
}

impl ParticleInstance {
    /// Builds `translation * rotation * scale`; the rotation doubles as the
    /// normal matrix since the scale is uniform.
    pub fn from_transform(position: Vec3, rotation: Quat, scale: f32, color: Vec4) -> Self {
        Self {
            model: Mat4::from_scale_rotation_translation(Vec3::splat(scale), rotation, position),
            normal_matrix: Mat3::from_quat(rotation),
            color,
        }
    }

    /// World-space origin of the instance.
    pub fn position(&self) -> Vec3 {
        self.model.w_axis.truncate()
    }
}
