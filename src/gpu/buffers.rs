use glam::Vec3;
use wgpu::{Buffer, BufferUsages, Device, Queue};

use crate::config::PARTICLE_SIZE;

/// Scene parameters passed to the particle shader (80 bytes, aligned to 16)
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    // Camera (64 bytes)
    pub view_proj: [[f32; 4]; 4],

    // Group transform and appearance (16 bytes)
    pub offset_y: f32,
    pub opacity: f32,
    pub particle_size: f32,
    pub _padding: f32,
}

/// CPU-side copy of the particle positions plus a dirty flag.
///
/// Staging marks the frame dirty; taking the data clears it, so a frame
/// uploads at most once no matter how often it is staged.
pub struct PositionStaging {
    data: Vec<Vec3>,
    dirty: bool,
}

impl PositionStaging {
    pub fn new(count: usize) -> Self {
        Self {
            data: vec![Vec3::ZERO; count],
            dirty: false,
        }
    }

    pub fn stage(&mut self, positions: &[Vec3]) {
        self.data.copy_from_slice(positions);
        self.dirty = true;
    }

    #[cfg(test)]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Positions to upload, if any were staged since the last call.
    pub fn take_dirty(&mut self) -> Option<&[Vec3]> {
        if self.dirty {
            self.dirty = false;
            Some(self.data.as_slice())
        } else {
            None
        }
    }
}

/// Manages the particle instance buffer and the scene uniform buffer
pub struct ParticleBuffers {
    /// Per-instance particle positions (vec3<f32>)
    pub position_buffer: Buffer,
    /// Uniform buffer for camera and appearance
    pub uniform_buffer: Buffer,
    staging: PositionStaging,
    count: u32,
}

impl ParticleBuffers {
    /// Create buffers sized for `initial` and upload it
    pub fn new(device: &Device, queue: &Queue, initial: &[Vec3]) -> Self {
        let buffer_size = std::mem::size_of_val(initial) as u64;

        let position_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particle-position-buffer"),
            size: buffer_size,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene-uniform-buffer"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        queue.write_buffer(&position_buffer, 0, bytemuck::cast_slice(initial));

        Self {
            position_buffer,
            uniform_buffer,
            staging: PositionStaging::new(initial.len()),
            count: initial.len() as u32,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Copy this frame's positions for upload
    pub fn stage_positions(&mut self, positions: &[Vec3]) {
        self.staging.stage(positions);
    }

    /// Write staged positions to the GPU if the frame is dirty
    pub fn flush(&mut self, queue: &Queue) {
        if let Some(data) = self.staging.take_dirty() {
            queue.write_buffer(&self.position_buffer, 0, bytemuck::cast_slice(data));
        }
    }

    /// Update camera and appearance parameters
    pub fn update_uniforms(&self, queue: &Queue, view_proj: glam::Mat4, offset_y: f32, opacity: f32) {
        let uniforms = SceneUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            offset_y,
            opacity,
            particle_size: PARTICLE_SIZE,
            _padding: 0.0,
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_size() {
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 80);
    }

    #[test]
    fn test_position_layout_is_packed() {
        assert_eq!(std::mem::size_of::<Vec3>(), 12);
        let positions = [Vec3::new(1.0, 2.0, 3.0); 4];
        let bytes: &[u8] = bytemuck::cast_slice(&positions);
        assert_eq!(bytes.len(), 48);
    }

    #[test]
    fn test_staging_uploads_once_per_frame() {
        let mut staging = PositionStaging::new(2);
        assert!(staging.take_dirty().is_none());

        staging.stage(&[Vec3::X, Vec3::Y]);
        staging.stage(&[Vec3::Y, Vec3::Z]);
        assert!(staging.is_dirty());
        assert_eq!(staging.take_dirty(), Some(&[Vec3::Y, Vec3::Z][..]));
        assert!(staging.take_dirty().is_none());
        assert!(!staging.is_dirty());
    }
}
