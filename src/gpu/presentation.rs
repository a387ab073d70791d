use std::sync::Arc;

use glam::Vec3;
use winit::window::Window;

use crate::config::{OPACITY_EASE, TARGET_OPACITY};
use crate::error::GpuError;
use crate::gpu::{GpuContext, ParticleBuffers, RenderPipeline};
use crate::viewport::Viewport;

/// Global particle opacity, faded in once the gate opens.
#[derive(Debug, Default)]
pub struct OpacityFade {
    value: f32,
}

impl OpacityFade {
    pub fn advance(&mut self, ready: bool) -> f32 {
        if ready && self.value < TARGET_OPACITY {
            self.value += (TARGET_OPACITY - self.value) * OPACITY_EASE;
        }
        self.value
    }

    #[cfg(test)]
    pub fn value(&self) -> f32 {
        self.value
    }
}

/// Outcome of presenting one frame
#[derive(Debug, PartialEq, Eq)]
pub enum PresentOutcome {
    Presented,
    /// Frame dropped; the next one rebuilds from current state
    Skipped,
    /// The device cannot continue
    Fatal(wgpu::SurfaceError),
}

impl PresentOutcome {
    /// The error that should end the application, if any.
    pub fn into_error(self) -> Option<GpuError> {
        match self {
            PresentOutcome::Fatal(e) => Some(GpuError::Surface(e)),
            PresentOutcome::Presented | PresentOutcome::Skipped => None,
        }
    }
}

/// Owns every render resource for the particle scene.
///
/// Acquired as a unit by [`Presentation::new`] and released as a unit when
/// dropped, whichever path tears the scene down.
pub struct Presentation {
    // Field order is drop order: GPU objects go before the window they render to.
    buffers: ParticleBuffers,
    bind_group: wgpu::BindGroup,
    pipeline: RenderPipeline,
    gpu: GpuContext,
    window: Arc<Window>,
    viewport: Viewport,
    opacity: OpacityFade,
}

impl Presentation {
    pub fn new(window: Arc<Window>, initial: &[Vec3]) -> Result<Self, GpuError> {
        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;

        let buffers = ParticleBuffers::new(&gpu.device, &gpu.queue, initial);
        let pipeline = RenderPipeline::new(&gpu.device, gpu.format());
        let bind_group = pipeline.create_bind_group(&gpu.device, &buffers.uniform_buffer);

        let size = window.inner_size();
        log::info!("Render resources acquired for {} particles", buffers.count());

        Ok(Self {
            buffers,
            bind_group,
            pipeline,
            gpu,
            window,
            viewport: Viewport::new(size.width, size.height),
            opacity: OpacityFade::default(),
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.gpu.resize(new_size);
        self.viewport = Viewport::new(new_size.width, new_size.height);
        log::info!("Viewport resized to {}x{}", self.viewport.width, self.viewport.height);
    }

    /// Push this frame's positions and draw them.
    pub fn present(&mut self, positions: &[Vec3], scroll_world: f32, ready: bool) -> PresentOutcome {
        let opacity = self.opacity.advance(ready);

        self.buffers.stage_positions(positions);
        self.buffers.flush(&self.gpu.queue);
        self.buffers
            .update_uniforms(&self.gpu.queue, self.viewport.view_proj(), scroll_world, opacity);

        let output = match self.gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu.reconfigure();
                return PresentOutcome::Skipped;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return PresentOutcome::Fatal(wgpu::SurfaceError::OutOfMemory);
            }
            Err(e) => {
                log::warn!("Surface error: {:?}", e);
                return PresentOutcome::Skipped;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        self.pipeline.draw(
            &mut encoder,
            &view,
            &self.bind_group,
            &self.buffers.position_buffer,
            self.buffers.count(),
        );

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        output.present();

        PresentOutcome::Presented
    }
}

impl Drop for Presentation {
    fn drop(&mut self) {
        log::info!("Releasing render resources");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opacity_waits_for_ready() {
        let mut fade = OpacityFade::default();
        for _ in 0..10 {
            assert_eq!(fade.advance(false), 0.0);
        }
    }

    #[test]
    fn test_opacity_fades_in_monotonically() {
        let mut fade = OpacityFade::default();
        let mut last = 0.0;
        for _ in 0..200 {
            let value = fade.advance(true);
            assert!(value >= last);
            assert!(value <= TARGET_OPACITY);
            last = value;
        }
        assert!(last > TARGET_OPACITY * 0.99);
    }

    #[test]
    fn test_opacity_first_step() {
        let mut fade = OpacityFade::default();
        assert!((fade.advance(true) - TARGET_OPACITY * OPACITY_EASE).abs() < 1e-6);
    }

    #[test]
    fn test_fatal_outcome_becomes_error() {
        assert!(PresentOutcome::Presented.into_error().is_none());
        assert!(PresentOutcome::Skipped.into_error().is_none());

        let error = PresentOutcome::Fatal(wgpu::SurfaceError::OutOfMemory).into_error();
        assert!(matches!(
            error,
            Some(GpuError::Surface(wgpu::SurfaceError::OutOfMemory))
        ));
    }

    #[test]
    fn test_opacity_holds_when_gate_closes() {
        let mut fade = OpacityFade::default();
        for _ in 0..20 {
            fade.advance(true);
        }
        let value = fade.value();
        fade.advance(false);
        assert_eq!(fade.value(), value);
    }
}
