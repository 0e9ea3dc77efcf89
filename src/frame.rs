use std::sync::Arc;

use parking_lot::RwLock;

use crate::camera::CameraState;
use crate::instance::ParticleInstance;
use crate::light::LightBuffer;

/// Everything one draw reads: the camera block, the light buffer and the
/// instance stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInputs {
    pub camera: CameraState,
    pub lights: LightBuffer,
    pub instances: Vec<ParticleInstance>,
}

/// Shared, swappable frame inputs.
///
/// Writers publish a whole new [`FrameInputs`]; readers take an `Arc`
/// snapshot that stays immutable for the duration of their draw, so a frame
/// never observes a half-updated camera or light list.
#[derive(Debug, Default)]
pub struct FrameState {
    current: Arc<RwLock<Arc<FrameInputs>>>,
}

impl Clone for FrameState {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
        }
    }
}

impl FrameState {
    pub fn new(inputs: FrameInputs) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(inputs))),
        }
    }

    /// Replaces the inputs seen by subsequent snapshots.
    pub fn publish(&self, inputs: FrameInputs) {
        *self.current.write() = Arc::new(inputs);
    }

    pub fn snapshot(&self) -> Arc<FrameInputs> {
        Arc::clone(&self.current.read())
    }

    pub fn update_camera(&self, camera: CameraState) {
        self.modify(|inputs| inputs.camera = camera);
    }

    pub fn update_lights(&self, lights: LightBuffer) {
        self.modify(|inputs| inputs.lights = lights);
    }

    pub fn update_instances(&self, instances: Vec<ParticleInstance>) {
        self.modify(|inputs| inputs.instances = instances);
    }

    // Copy-on-write so outstanding snapshots keep their values.
    fn modify<F>(&self, mutate: F)
    where
        F: FnOnce(&mut FrameInputs),
    {
        let mut guard = self.current.write();
        mutate(Arc::make_mut(&mut *guard));
    }
}
