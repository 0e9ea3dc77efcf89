use glam::Vec4;

use crate::camera::CameraState;
use crate::instance::ParticleInstance;
use crate::mesh::Vertex;

use super::FragmentInput;

/// Result of one vertex invocation: the clip position plus everything the
/// rasterizer interpolates for the fragment stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexOutput {
    pub clip_pos: Vec4,
    pub fragment: FragmentInput,
}

/// Runs the vertex stage for one (vertex, instance) pair.
///
/// The normal matrix is applied for every shading strategy.
pub fn transform_vertex(
    camera: &CameraState,
    instance: &ParticleInstance,
    vertex: &Vertex,
) -> VertexOutput {
    let world = instance.model * vertex.pos.extend(1.0);
    VertexOutput {
        clip_pos: camera.view_proj * world,
        fragment: FragmentInput {
            world_pos: world.truncate(),
            world_normal: instance.normal_matrix * vertex.normal,
            uv: vertex.uv,
            color: instance.color,
        },
    }
}
