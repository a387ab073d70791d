mod context;
mod buffers;
mod presentation;
mod render;

pub use context::GpuContext;
pub use buffers::ParticleBuffers;
pub use presentation::Presentation;
pub use render::RenderPipeline;
