//! Fixed-layout records shared with the GPU.
//!
//! Everything that knows about padding, row packing or attribute slots lives
//! here. The shading stages only ever see the matrix-typed values produced by
//! [`ParticleInstanceRaw::decode`] and friends.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3, Vec4};

use crate::error::LayoutError;
use crate::instance::ParticleInstance;
use crate::light::PointLight;
use crate::mesh::Vertex;

/// Vertex attribute locations used by the particle shader for per-instance rows.
pub const INSTANCE_FIRST_LOCATION: u32 = 5;

/// Camera uniform: column-major `view_proj` followed by the padded viewer position.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view_pos: [f32; 3],
    pub _pad: f32,
}

/// One element of the light storage array.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointLightRaw {
    pub pos: [f32; 3],
    pub _pad0: f32,
    pub color: [f32; 3],
    pub _pad1: f32,
    pub _pad2: [f32; 4],
    pub _pad3: [f32; 4],
}

impl From<&PointLight> for PointLightRaw {
    fn from(light: &PointLight) -> Self {
        Self {
            pos: light.pos.into(),
            color: light.color.into(),
            ..Self::zeroed()
        }
    }
}

impl From<&PointLightRaw> for PointLight {
    fn from(raw: &PointLightRaw) -> Self {
        Self {
            pos: Vec3::from_array(raw.pos),
            color: Vec3::from_array(raw.color),
        }
    }
}

/// Header placed in front of the light array; carries the explicit count.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct LightBufferHeader {
    pub count: u32,
    pub _pad: [u32; 3],
}

/// Single-light uniform consumed by the marker draw.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MarkerLightUniform {
    pub pos: [f32; 3],
    pub _pad0: f32,
    pub color: [f32; 3],
    pub _pad1: f32,
}

impl From<&PointLight> for MarkerLightUniform {
    fn from(light: &PointLight) -> Self {
        Self {
            pos: light.pos.into(),
            _pad0: 0.0,
            color: light.color.into(),
            _pad1: 0.0,
        }
    }
}

/// Per-instance vertex record: four model rows, three normal rows, RGBA.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ParticleInstanceRaw {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 3]; 3],
    pub color: [f32; 4],
}

impl ParticleInstanceRaw {
    /// Assembles the packed rows into matrices. Rows stay rows.
    pub fn decode(&self) -> ParticleInstance {
        let [m0, m1, m2, m3] = self.model;
        let [n0, n1, n2] = self.normal;
        ParticleInstance {
            model: Mat4::from_cols(
                Vec4::from_array(m0),
                Vec4::from_array(m1),
                Vec4::from_array(m2),
                Vec4::from_array(m3),
            )
            .transpose(),
            normal_matrix: Mat3::from_cols(
                Vec3::from_array(n0),
                Vec3::from_array(n1),
                Vec3::from_array(n2),
            )
            .transpose(),
            color: Vec4::from_array(self.color),
        }
    }

    /// Flattens an instance back into its packed rows.
    pub fn encode(instance: &ParticleInstance) -> Self {
        let model = instance.model.transpose();
        let normal = instance.normal_matrix.transpose();
        Self {
            model: [
                model.x_axis.to_array(),
                model.y_axis.to_array(),
                model.z_axis.to_array(),
                model.w_axis.to_array(),
            ],
            normal: [
                normal.x_axis.to_array(),
                normal.y_axis.to_array(),
                normal.z_axis.to_array(),
            ],
            color: instance.color.to_array(),
        }
    }
}

const _: () = assert!(std::mem::size_of::<CameraUniform>() == 80);
const _: () = assert!(std::mem::size_of::<PointLightRaw>() == 64);
const _: () = assert!(std::mem::size_of::<LightBufferHeader>() == 16);
const _: () = assert!(std::mem::size_of::<MarkerLightUniform>() == 32);
const _: () = assert!(std::mem::size_of::<ParticleInstanceRaw>() == 116);
const _: () = assert!(std::mem::size_of::<Vertex>() == 32);

/// Decodes a tightly packed instance buffer.
pub fn decode_instances(bytes: &[u8]) -> Result<Vec<ParticleInstance>, LayoutError> {
    let stride = std::mem::size_of::<ParticleInstanceRaw>();
    if bytes.len() % stride != 0 {
        return Err(LayoutError::Misaligned {
            record: "instance",
            len: bytes.len(),
            stride,
        });
    }
    Ok(bytes
        .chunks_exact(stride)
        .map(|chunk| bytemuck::pod_read_unaligned::<ParticleInstanceRaw>(chunk).decode())
        .collect())
}

/// Packs instances for upload into a vertex buffer.
pub fn encode_instances(instances: &[ParticleInstance]) -> Vec<ParticleInstanceRaw> {
    instances.iter().map(ParticleInstanceRaw::encode).collect()
}

/// Vertex buffer layout for a record type bound to the particle shader.
pub trait VertexLayout {
    fn layout() -> wgpu::VertexBufferLayout<'static>;
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, 1 => Float32x2, 2 => Float32x3
    ];
}

impl VertexLayout for Vertex {
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

impl ParticleInstanceRaw {
    const ATTRIBUTES: [wgpu::VertexAttribute; 8] = wgpu::vertex_attr_array![
        5 => Float32x4,  6 => Float32x4,  7 => Float32x4, 8 => Float32x4,
        9 => Float32x3, 10 => Float32x3, 11 => Float32x3,
       12 => Float32x4
    ];
}

impl VertexLayout for ParticleInstanceRaw {
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
