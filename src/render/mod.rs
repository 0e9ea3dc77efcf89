//! wgpu plumbing for the particle and marker programs.

pub mod buffers;
pub mod draw;
pub mod pipeline;
pub mod shader;

pub use buffers::{CameraBuffer, GpuLightBuffer, GpuSurfaceTexture, InstanceBuffer, MeshBuffers};
pub use draw::DrawParticles;
pub use pipeline::{
    MarkerBindings, MarkerPipeline, ParticleBindings, ParticlePipeline, ParticlePipelineDescriptor,
};
