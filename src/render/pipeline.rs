use log::debug;
use wgpu::util::DeviceExt;

use crate::config::ShadingStrategy;
use crate::error::ConfigError;
use crate::layout::{MarkerLightUniform, ParticleInstanceRaw, VertexLayout};
use crate::light::{LightBuffer, PointLight};
use crate::mesh::Vertex;

use super::buffers::{CameraBuffer, GpuLightBuffer, GpuSurfaceTexture};
use super::shader::{
    MARKER_FRAGMENT_ENTRY, MARKER_SHADER, MARKER_VERTEX_ENTRY, PARTICLE_SHADER,
    PARTICLE_VERTEX_ENTRY,
};

pub fn camera_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("camera-bind-layout"),
        entries: &[uniform_entry(
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            CameraBuffer::SIZE,
        )],
    })
}

pub fn light_storage_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("light-storage-bind-layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(LightBuffer::byte_size(1) as u64),
            },
            count: None,
        }],
    })
}

pub fn surface_texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("surface-texture-bind-layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

pub fn marker_light_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("marker-light-bind-layout"),
        entries: &[uniform_entry(
            wgpu::ShaderStages::VERTEX,
            std::mem::size_of::<MarkerLightUniform>() as u64,
        )],
    })
}

fn uniform_entry(visibility: wgpu::ShaderStages, size: u64) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(size),
        },
        count: None,
    }
}

fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &GpuSurfaceTexture,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
    })
}

fn buffer_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

/// Fixed-function state the caller owns; passed through untouched.
#[derive(Debug, Clone)]
pub struct ParticlePipelineDescriptor<'a> {
    pub label: Option<&'a str>,
    pub strategy: ShadingStrategy,
    pub color_target: wgpu::ColorTargetState,
    pub depth_stencil: Option<wgpu::DepthStencilState>,
    pub primitive: wgpu::PrimitiveState,
    pub multisample: wgpu::MultisampleState,
}

impl ParticlePipelineDescriptor<'_> {
    pub fn new(strategy: ShadingStrategy, format: wgpu::TextureFormat) -> Self {
        Self {
            label: None,
            strategy,
            color_target: wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            },
            depth_stencil: None,
            primitive: wgpu::PrimitiveState::default(),
            multisample: wgpu::MultisampleState::default(),
        }
    }
}

/// Bind groups matching one [`ParticlePipeline`]'s layout.
pub struct ParticleBindings {
    pub camera: wgpu::BindGroup,
    pub lights: Option<wgpu::BindGroup>,
    pub texture: Option<wgpu::BindGroup>,
}

/// Particle render pipeline for a single shading strategy.
///
/// Only the bind groups the strategy reads are part of its layout: `Flat`
/// binds the camera alone, `Lit` adds the light storage buffer and
/// `Textured` adds the surface texture on top.
pub struct ParticlePipeline {
    strategy: ShadingStrategy,
    pipeline: wgpu::RenderPipeline,
    camera_layout: wgpu::BindGroupLayout,
    light_layout: Option<wgpu::BindGroupLayout>,
    texture_layout: Option<wgpu::BindGroupLayout>,
}

impl ParticlePipeline {
    pub fn new(device: &wgpu::Device, descriptor: &ParticlePipelineDescriptor<'_>) -> Self {
        let strategy = descriptor.strategy;
        let camera_layout = camera_bind_group_layout(device);
        let light_layout = strategy
            .uses_lights()
            .then(|| light_storage_bind_group_layout(device));
        let texture_layout = strategy
            .samples_texture()
            .then(|| surface_texture_bind_group_layout(device));

        let bind_group_layouts: Vec<&wgpu::BindGroupLayout> = std::iter::once(&camera_layout)
            .chain(light_layout.as_ref())
            .chain(texture_layout.as_ref())
            .collect();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("particle-shader"),
            source: wgpu::ShaderSource::Wgsl(PARTICLE_SHADER.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("particle-pipeline-layout"),
            bind_group_layouts: &bind_group_layouts,
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: descriptor.label.or(Some("particle-pipeline")),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(PARTICLE_VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout(), ParticleInstanceRaw::layout()],
            },
            primitive: descriptor.primitive,
            depth_stencil: descriptor.depth_stencil.clone(),
            multisample: descriptor.multisample,
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(strategy.fragment_entry_point()),
                compilation_options: Default::default(),
                targets: &[Some(descriptor.color_target.clone())],
            }),
            multiview: None,
            cache: None,
        });
        debug!(
            "created particle pipeline ({strategy}, {} bind groups)",
            bind_group_layouts.len()
        );

        Self {
            strategy,
            pipeline,
            camera_layout,
            light_layout,
            texture_layout,
        }
    }

    pub fn strategy(&self) -> ShadingStrategy {
        self.strategy
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Builds the bind groups this pipeline's strategy needs.
    ///
    /// Must be called again after [`GpuLightBuffer::upload`] reports a
    /// reallocation.
    pub fn bind(
        &self,
        device: &wgpu::Device,
        camera: &CameraBuffer,
        lights: &GpuLightBuffer,
        texture: Option<&GpuSurfaceTexture>,
    ) -> Result<ParticleBindings, ConfigError> {
        let camera = buffer_bind_group(
            device,
            &self.camera_layout,
            camera.buffer(),
            "particle-camera-bind-group",
        );
        let lights = self.light_layout.as_ref().map(|layout| {
            buffer_bind_group(device, layout, lights.buffer(), "particle-light-bind-group")
        });
        let texture = match &self.texture_layout {
            Some(layout) => {
                let texture = texture.ok_or(ConfigError::MissingSurfaceTexture)?;
                Some(texture_bind_group(
                    device,
                    layout,
                    texture,
                    "particle-texture-bind-group",
                ))
            }
            None => None,
        };
        Ok(ParticleBindings {
            camera,
            lights,
            texture,
        })
    }
}

/// One light's uniform and bind group for a marker draw.
pub struct MarkerLightBinding {
    _buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

/// Bind groups shared by every marker draw of a frame.
pub struct MarkerBindings {
    pub camera: wgpu::BindGroup,
    pub texture: wgpu::BindGroup,
    pub lights: Vec<MarkerLightBinding>,
}

/// Pipeline that draws one flat-colored glyph per light.
pub struct MarkerPipeline {
    pipeline: wgpu::RenderPipeline,
    camera_layout: wgpu::BindGroupLayout,
    light_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    placeholder: GpuSurfaceTexture,
}

impl MarkerPipeline {
    pub fn new(device: &wgpu::Device, descriptor: &ParticlePipelineDescriptor<'_>) -> Self {
        let camera_layout = camera_bind_group_layout(device);
        let light_layout = marker_light_bind_group_layout(device);
        // Declared by the marker shader, never sampled.
        let texture_layout = surface_texture_bind_group_layout(device);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("marker-shader"),
            source: wgpu::ShaderSource::Wgsl(MARKER_SHADER.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("marker-pipeline-layout"),
            bind_group_layouts: &[&camera_layout, &light_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: descriptor.label.or(Some("marker-pipeline")),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(MARKER_VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            primitive: descriptor.primitive,
            depth_stencil: descriptor.depth_stencil.clone(),
            multisample: descriptor.multisample,
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(MARKER_FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(descriptor.color_target.clone())],
            }),
            multiview: None,
            cache: None,
        });
        debug!("created light marker pipeline");

        Self {
            pipeline,
            camera_layout,
            light_layout,
            texture_layout,
            placeholder: GpuSurfaceTexture::placeholder(device),
        }
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn bind(
        &self,
        device: &wgpu::Device,
        camera: &CameraBuffer,
        lights: &[PointLight],
    ) -> MarkerBindings {
        let camera = buffer_bind_group(
            device,
            &self.camera_layout,
            camera.buffer(),
            "marker-camera-bind-group",
        );
        let texture = texture_bind_group(
            device,
            &self.texture_layout,
            &self.placeholder,
            "marker-texture-bind-group",
        );
        let lights = lights
            .iter()
            .map(|light| {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("marker-light-uniform"),
                    contents: bytemuck::bytes_of(&MarkerLightUniform::from(light)),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                let bind_group = buffer_bind_group(
                    device,
                    &self.light_layout,
                    &buffer,
                    "marker-light-bind-group",
                );
                MarkerLightBinding {
                    _buffer: buffer,
                    bind_group,
                }
            })
            .collect();
        MarkerBindings {
            camera,
            texture,
            lights,
        }
    }
}
