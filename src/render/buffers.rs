use bytemuck::bytes_of;
use log::{debug, warn};
use wgpu::util::DeviceExt;

use crate::camera::CameraState;
use crate::instance::ParticleInstance;
use crate::layout::{encode_instances, CameraUniform, ParticleInstanceRaw};
use crate::light::LightBuffer;
use crate::mesh::Mesh;
use crate::shading::{FilterMode, SurfaceTexture};

/// Uniform buffer holding the 80-byte camera block.
pub struct CameraBuffer {
    buffer: wgpu::Buffer,
}

impl CameraBuffer {
    pub fn new(device: &wgpu::Device, camera: &CameraState) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera-uniform"),
            contents: bytes_of(&camera.to_uniform()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        Self { buffer }
    }

    pub fn write(&self, queue: &wgpu::Queue, camera: &CameraState) {
        queue.write_buffer(&self.buffer, 0, bytes_of(&camera.to_uniform()));
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub const SIZE: wgpu::BufferAddress =
        std::mem::size_of::<CameraUniform>() as wgpu::BufferAddress;
}

/// Storage buffer mirroring a [`LightBuffer`]: header, then at least one slot.
pub struct GpuLightBuffer {
    buffer: wgpu::Buffer,
    slots: usize,
    count: usize,
}

impl GpuLightBuffer {
    pub fn new(device: &wgpu::Device, lights: &LightBuffer) -> Self {
        let bytes = lights.to_bytes();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("light-storage"),
            contents: &bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            buffer,
            slots: lights.capacity().max(1),
            count: lights.count(),
        }
    }

    fn allocate(device: &wgpu::Device, slots: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("light-storage"),
            size: LightBuffer::byte_size(slots) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Uploads `lights`, reallocating when its storage outgrew the GPU copy.
    ///
    /// Returns `true` when the underlying buffer was replaced; bind groups
    /// referencing the old buffer must then be rebuilt.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        lights: &LightBuffer,
    ) -> bool {
        let needed = lights.capacity().max(1);
        let reallocated = needed > self.slots;
        if reallocated {
            let slots = grown_slots(self.slots, needed);
            debug!(
                "growing light storage from {} to {} slots ({} bytes)",
                self.slots,
                slots,
                LightBuffer::byte_size(slots)
            );
            self.buffer = Self::allocate(device, slots);
            self.slots = slots;
        }
        queue.write_buffer(&self.buffer, 0, &lights.to_bytes());
        self.count = lights.count();
        reallocated
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// Per-instance vertex buffer, step mode `Instance`.
pub struct InstanceBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
    len: usize,
}

impl InstanceBuffer {
    pub fn new(device: &wgpu::Device, instances: &[ParticleInstance]) -> Self {
        let mut raw = encode_instances(instances);
        let len = raw.len();
        if raw.is_empty() {
            raw.push(bytemuck::Zeroable::zeroed());
        }
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("particle-instances"),
            contents: bytemuck::cast_slice(&raw),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            buffer,
            capacity: raw.len(),
            len,
        }
    }

    /// Returns `true` when the buffer had to be reallocated.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        instances: &[ParticleInstance],
    ) -> bool {
        let reallocated = instances.len() > self.capacity;
        if reallocated {
            let capacity = grown_slots(self.capacity, instances.len());
            debug!(
                "growing instance buffer from {} to {} records",
                self.capacity, capacity
            );
            self.buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("particle-instances"),
                size: (capacity * std::mem::size_of::<ParticleInstanceRaw>())
                    as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.capacity = capacity;
        }
        self.len = instances.len();
        if instance_count(self.len) as usize != self.len {
            warn!(
                "{} instances uploaded, draws are capped at {}",
                self.len,
                u32::MAX
            );
        }
        if !instances.is_empty() {
            let raw = encode_instances(instances);
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&raw));
        }
        reallocated
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn len(&self) -> u32 {
        instance_count(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

pub struct MeshBuffers {
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshBuffers {
    pub fn from_mesh(device: &wgpu::Device, mesh: &Mesh, label: &str) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            index_count: mesh.index_count(),
        }
    }
}

/// GPU copy of a [`SurfaceTexture`] plus its clamp-to-edge sampler.
pub struct GpuSurfaceTexture {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl GpuSurfaceTexture {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    pub fn from_surface(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface: &SurfaceTexture,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: surface.width(),
            height: surface.height(),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("surface-texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &rgba8_texels(surface),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * surface.width()),
                rows_per_image: Some(surface.height()),
            },
            size,
        );
        Self::from_texture(device, texture, surface.filter())
    }

    /// 1x1 zeroed texture for slots a shader declares but never samples.
    pub fn placeholder(device: &wgpu::Device) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("placeholder-texture"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        Self::from_texture(device, texture, FilterMode::Nearest)
    }

    fn from_texture(device: &wgpu::Device, texture: wgpu::Texture, filter: FilterMode) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("surface-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu_filter(filter),
            min_filter: wgpu_filter(filter),
            ..Default::default()
        });
        Self {
            _texture: texture,
            view,
            sampler,
        }
    }
}

fn wgpu_filter(filter: FilterMode) -> wgpu::FilterMode {
    match filter {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    }
}

/// Quantizes linear texels to RGBA8, clamping each channel to `[0, 1]`.
pub fn rgba8_texels(surface: &SurfaceTexture) -> Vec<u8> {
    surface
        .texels()
        .iter()
        .flat_map(|texel| texel.to_array())
        .map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect()
}

/// Instances one draw can address. wgpu counts them in `u32`, so larger
/// buffers saturate instead of wrapping.
pub fn instance_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Next allocation size: doubles until `needed` fits.
pub fn grown_slots(current: usize, needed: usize) -> usize {
    let mut slots = current.max(1);
    while slots < needed {
        slots *= 2;
    }
    slots
}
