use super::buffers::{InstanceBuffer, MeshBuffers};
use super::pipeline::{MarkerBindings, MarkerPipeline, ParticleBindings, ParticlePipeline};

/// Draw helpers for particle and light-marker passes.
pub trait DrawParticles {
    /// One instanced draw covering every particle in `instances`.
    fn draw_particles(
        &mut self,
        pipeline: &ParticlePipeline,
        bindings: &ParticleBindings,
        mesh: &MeshBuffers,
        instances: &InstanceBuffer,
    );

    /// One draw per light, each with its own marker uniform.
    fn draw_light_markers(
        &mut self,
        pipeline: &MarkerPipeline,
        bindings: &MarkerBindings,
        mesh: &MeshBuffers,
    );
}

impl DrawParticles for wgpu::RenderPass<'_> {
    fn draw_particles(
        &mut self,
        pipeline: &ParticlePipeline,
        bindings: &ParticleBindings,
        mesh: &MeshBuffers,
        instances: &InstanceBuffer,
    ) {
        if instances.is_empty() {
            return;
        }
        self.set_pipeline(pipeline.pipeline());
        self.set_bind_group(0, &bindings.camera, &[]);
        if let Some(lights) = &bindings.lights {
            self.set_bind_group(1, lights, &[]);
        }
        if let Some(texture) = &bindings.texture {
            self.set_bind_group(2, texture, &[]);
        }
        self.set_vertex_buffer(0, mesh.vertex.slice(..));
        self.set_vertex_buffer(1, instances.buffer().slice(..));
        self.set_index_buffer(mesh.index.slice(..), wgpu::IndexFormat::Uint16);
        self.draw_indexed(0..mesh.index_count, 0, 0..instances.len());
    }

    fn draw_light_markers(
        &mut self,
        pipeline: &MarkerPipeline,
        bindings: &MarkerBindings,
        mesh: &MeshBuffers,
    ) {
        if bindings.lights.is_empty() {
            return;
        }
        self.set_pipeline(pipeline.pipeline());
        self.set_bind_group(0, &bindings.camera, &[]);
        self.set_bind_group(2, &bindings.texture, &[]);
        self.set_vertex_buffer(0, mesh.vertex.slice(..));
        self.set_index_buffer(mesh.index.slice(..), wgpu::IndexFormat::Uint16);
        for light in &bindings.lights {
            self.set_bind_group(1, &light.bind_group, &[]);
            self.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}
