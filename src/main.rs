//! Particle formation scene: a chaotic particle field that condenses into text
//! while the pointer is held, then hovers around it once formed.

mod app;
mod config;
mod error;
mod gpu;
mod simulation;
mod viewport;

use winit::event_loop::{ControlFlow, EventLoop};

use crate::app::App;
use crate::error::AppError;

fn main() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new()?;
    event_loop.run_app(&mut app)?;

    app.into_result()
}
