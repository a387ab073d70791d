//! Error types for mounting and running the particle scene.

use std::fmt;

/// Errors that can occur while acquiring render resources.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for the window.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create the GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The adapter cannot present to the window surface.
    UnsupportedSurface,
    /// The surface failed in a way the frame loop cannot recover from.
    Surface(wgpu::SurfaceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found"),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::UnsupportedSurface => write!(f, "Surface not supported by adapter"),
            GpuError::Surface(e) => write!(f, "Surface failed: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::Surface(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that end the application.
#[derive(Debug)]
pub enum AppError {
    /// Failed to create or run the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the window.
    Window(winit::error::OsError),
    /// Render resources could not be acquired.
    Gpu(GpuError),
    /// The configured font shorthand is malformed.
    Font(FontSpecError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EventLoop(e) => write!(f, "Event loop error: {}", e),
            AppError::Window(e) => write!(f, "Failed to create window: {}", e),
            AppError::Gpu(e) => write!(f, "GPU error: {}", e),
            AppError::Font(e) => write!(f, "Font error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::EventLoop(e) => Some(e),
            AppError::Window(e) => Some(e),
            AppError::Gpu(e) => Some(e),
            AppError::Font(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for AppError {
    fn from(e: winit::error::EventLoopError) -> Self {
        AppError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for AppError {
    fn from(e: winit::error::OsError) -> Self {
        AppError::Window(e)
    }
}

impl From<GpuError> for AppError {
    fn from(e: GpuError) -> Self {
        AppError::Gpu(e)
    }
}

impl From<FontSpecError> for AppError {
    fn from(e: FontSpecError) -> Self {
        AppError::Font(e)
    }
}

/// Errors from parsing a font shorthand such as `"900 150px Inter, sans-serif"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSpecError {
    /// The shorthand was empty.
    Empty,
    /// A numeric weight outside 1..=1000.
    InvalidWeight(String),
    /// No family name followed the weight/size tokens.
    MissingFamily,
}

impl fmt::Display for FontSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontSpecError::Empty => write!(f, "Font shorthand is empty"),
            FontSpecError::InvalidWeight(w) => write!(f, "Invalid font weight: {}", w),
            FontSpecError::MissingFamily => write!(f, "Font shorthand has no family"),
        }
    }
}

impl std::error::Error for FontSpecError {}
