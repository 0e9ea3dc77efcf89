//! Instanced particle transform and multi-light shading.
//!
//! Each particle is one instance of a shared mesh carrying its own model
//! matrix, normal matrix and color. The vertex stage places the mesh in
//! world and clip space; the fragment stage either passes the instance color
//! through or sums ambient, diffuse and specular terms over every light in
//! the light buffer. A second small program draws a glyph at each light.
//!
//! The programs exist twice: as WGSL in [`render::shader`], bound through the
//! wgpu helpers in [`render`], and as a CPU reference in [`shading`] that is
//! used by the tests and by the `particle-shade` validation tool.

pub mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod frame;
pub mod instance;
pub mod layout;
pub mod light;
pub mod logging;
pub mod mesh;
pub mod render;
pub mod scene;
pub mod shading;

pub use app::{evaluate_frame, print_report, FrameReport, InstanceReport, MarkerReport};
pub use camera::CameraState;
pub use config::{ShadingConfig, ShadingStrategy};
pub use error::{ConfigError, LayoutError};
pub use frame::{FrameInputs, FrameState};
pub use instance::ParticleInstance;
pub use layout::{
    decode_instances, encode_instances, CameraUniform, LightBufferHeader, MarkerLightUniform,
    ParticleInstanceRaw, PointLightRaw, VertexLayout,
};
pub use light::{LightBuffer, PointLight};
pub use logging::{init_logging, LoggingConfig};
pub use mesh::{Mesh, Vertex};
pub use render::{
    CameraBuffer, DrawParticles, GpuLightBuffer, GpuSurfaceTexture, InstanceBuffer,
    MarkerPipeline, MeshBuffers, ParticlePipeline, ParticlePipelineDescriptor,
};
pub use scene::{CameraDescription, ParticleDescription, SceneDescription};
pub use shading::{
    transform_vertex, FilterMode, FragmentInput, FragmentStage, InstanceColor,
    LightingAccumulator, ShadingOutput, SurfaceColorSource, SurfaceTexture,
};
