use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::layout::{LightBufferHeader, PointLightRaw};

/// Point light in world space. `color` is linear RGB intensity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub pos: Vec3,
    pub color: Vec3,
}

impl PointLight {
    pub const fn new(pos: Vec3, color: Vec3) -> Self {
        Self { pos, color }
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            pos: Vec3::splat(0.2),
            color: Vec3::ONE,
        }
    }
}

/// Host-side light collection: backing storage plus the count the shader iterates.
///
/// The count is explicit rather than implied by the storage length, so a
/// buffer can be provisioned once and partially filled each frame. The count
/// can never exceed the storage, which is what keeps the shader from reading
/// past the end of the array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightBuffer {
    storage: Vec<PointLight>,
    count: usize,
}

impl LightBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer whose count covers every supplied light.
    pub fn from_lights(lights: Vec<PointLight>) -> Self {
        let count = lights.len();
        Self {
            storage: lights,
            count,
        }
    }

    /// Creates an empty buffer with `capacity` zeroed slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: vec![PointLight::new(Vec3::ZERO, Vec3::ZERO); capacity],
            count: 0,
        }
    }

    /// Appends a light, growing storage only when every slot is in use.
    pub fn push(&mut self, light: PointLight) {
        if self.count < self.storage.len() {
            self.storage[self.count] = light;
        } else {
            self.storage.push(light);
        }
        self.count += 1;
    }

    /// Marks all slots as unused without releasing storage.
    pub fn clear(&mut self) {
        self.count = 0;
    }

    pub fn set_count(&mut self, count: usize) -> Result<(), LayoutError> {
        if count > self.storage.len() {
            return Err(LayoutError::LightCountExceedsStorage {
                count,
                capacity: self.storage.len(),
            });
        }
        self.count = count;
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The lights the shader will iterate.
    pub fn lights(&self) -> &[PointLight] {
        &self.storage[..self.count]
    }

    /// Mutable access to one active light, e.g. to animate its position.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut PointLight> {
        self.storage[..self.count].get_mut(index)
    }

    /// Serialises header and every storage slot in the storage-buffer layout.
    ///
    /// At least one element slot is always written; a runtime-sized WGSL
    /// array cannot be bound with zero elements.
    pub fn to_bytes(&self) -> Vec<u8> {
        let header = LightBufferHeader {
            count: self.count as u32,
            _pad: [0; 3],
        };
        let mut raw: Vec<PointLightRaw> = self.storage.iter().map(PointLightRaw::from).collect();
        if raw.is_empty() {
            raw.push(bytemuck::Zeroable::zeroed());
        }
        let mut bytes = Vec::with_capacity(Self::byte_size(raw.len()));
        bytes.extend_from_slice(bytemuck::bytes_of(&header));
        bytes.extend_from_slice(bytemuck::cast_slice(&raw));
        bytes
    }

    /// Parses the storage-buffer layout, validating the header count against the array.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LayoutError> {
        let header_size = std::mem::size_of::<LightBufferHeader>();
        if bytes.len() < header_size {
            return Err(LayoutError::MissingHeader {
                len: bytes.len(),
                header: header_size,
            });
        }
        let (header_bytes, body) = bytes.split_at(header_size);
        let header: LightBufferHeader = bytemuck::pod_read_unaligned(header_bytes);

        let stride = std::mem::size_of::<PointLightRaw>();
        if body.len() % stride != 0 {
            return Err(LayoutError::Misaligned {
                record: "light",
                len: body.len(),
                stride,
            });
        }
        let storage: Vec<PointLight> = body
            .chunks_exact(stride)
            .map(|chunk| PointLight::from(&bytemuck::pod_read_unaligned::<PointLightRaw>(chunk)))
            .collect();

        let mut buffer = Self { storage, count: 0 };
        buffer.set_count(header.count as usize)?;
        Ok(buffer)
    }

    /// Bytes needed for a buffer with `slots` light elements.
    pub fn byte_size(slots: usize) -> usize {
        std::mem::size_of::<LightBufferHeader>()
            + slots.max(1) * std::mem::size_of::<PointLightRaw>()
    }
}

impl FromIterator<PointLight> for LightBuffer {
    fn from_iter<I: IntoIterator<Item = PointLight>>(iter: I) -> Self {
        Self::from_lights(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_light() -> PointLight {
        PointLight::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 0.0, 0.0))
    }

    #[test]
    fn count_limits_visible_lights() {
        let mut buffer = LightBuffer::with_capacity(4);
        assert!(buffer.lights().is_empty());
        buffer.push(red_light());
        assert_eq!(buffer.count(), 1);
        assert_eq!(buffer.capacity(), 4);
        assert_eq!(buffer.lights(), &[red_light()]);
    }

    #[test]
    fn push_grows_when_storage_is_full() {
        let mut buffer = LightBuffer::new();
        buffer.push(red_light());
        buffer.push(red_light());
        assert_eq!(buffer.count(), 2);
        assert_eq!(buffer.capacity(), 2);
    }

    #[test]
    fn clear_keeps_storage() {
        let mut buffer = LightBuffer::from_lights(vec![red_light(); 3]);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 3);
        buffer.set_count(2).unwrap();
        assert_eq!(buffer.lights().len(), 2);
    }

    #[test]
    fn count_past_storage_is_rejected() {
        let mut buffer = LightBuffer::with_capacity(2);
        let err = buffer.set_count(3).unwrap_err();
        assert_eq!(
            err,
            LayoutError::LightCountExceedsStorage {
                count: 3,
                capacity: 2
            }
        );
        assert_eq!(buffer.count(), 0);
    }

    #[test]
    fn bytes_follow_storage_layout() {
        let mut buffer = LightBuffer::with_capacity(2);
        buffer.push(red_light());
        let bytes = buffer.to_bytes();
        assert_eq!(bytes.len(), 16 + 2 * 64);
        assert_eq!(&bytes[0..4], &1u32.to_le_bytes());
        let pos_x = f32::from_le_bytes(bytes[16..20].try_into().unwrap());
        let color_r = f32::from_le_bytes(bytes[32..36].try_into().unwrap());
        assert_eq!(pos_x, 1.0);
        assert_eq!(color_r, 1.0);

        let parsed = LightBuffer::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.lights(), buffer.lights());
        assert_eq!(parsed.capacity(), 2);
    }

    #[test]
    fn empty_buffer_still_has_one_slot() {
        let bytes = LightBuffer::new().to_bytes();
        assert_eq!(bytes.len(), LightBuffer::byte_size(0));
        assert_eq!(bytes.len(), 80);
        let parsed = LightBuffer::from_bytes(&bytes).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn header_count_past_array_is_rejected() {
        let mut bytes = LightBuffer::from_lights(vec![red_light()]).to_bytes();
        bytes[0..4].copy_from_slice(&5u32.to_le_bytes());
        assert!(matches!(
            LightBuffer::from_bytes(&bytes),
            Err(LayoutError::LightCountExceedsStorage { count: 5, capacity: 1 })
        ));
    }

    #[test]
    fn truncated_header_is_rejected() {
        assert!(matches!(
            LightBuffer::from_bytes(&[0u8; 8]),
            Err(LayoutError::MissingHeader { len: 8, header: 16 })
        ));
    }
}
