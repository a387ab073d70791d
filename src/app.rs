use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::{
    DEFAULT_SEED, FORMATION_FONT, FORMATION_TEXT, PARTICLE_COUNT, SCROLL_LINE_PX,
    UI_REVEAL_DELAY_MS, WINDOW_HEIGHT, WINDOW_WIDTH,
};
use crate::error::AppError;
use crate::gpu::Presentation;
use crate::simulation::{ControlSignals, FontSpec, Formation, TargetCache};

/// Stand-in for the page that hosts the scene: owns the gate, the formed
/// flag, and the scroll offset.
struct Shell {
    ready: bool,
    active: bool,
    ui_reveal_at: Option<Instant>,
    scroll_px: f32,
}

impl Shell {
    fn new() -> Self {
        Self {
            ready: false,
            active: false,
            ui_reveal_at: None,
            scroll_px: 0.0,
        }
    }

    fn signals(&self) -> ControlSignals {
        ControlSignals {
            ready: self.ready,
            active: self.active,
        }
    }

    fn open_gate(&mut self) {
        if !self.ready {
            self.ready = true;
            log::info!("Intro dismissed, hold to form");
        }
    }

    /// Completion handler: switch to the formed regime and schedule the UI.
    fn complete(&mut self, now: Instant) {
        if !self.active {
            self.active = true;
            self.ui_reveal_at = Some(now + Duration::from_millis(UI_REVEAL_DELAY_MS));
        }
    }

    /// Returns true on the tick the dependent UI becomes visible.
    fn tick(&mut self, now: Instant) -> bool {
        match self.ui_reveal_at {
            Some(at) if now >= at => {
                self.ui_reveal_at = None;
                true
            }
            _ => false,
        }
    }

    fn scroll(&mut self, delta_px: f32) {
        self.scroll_px = (self.scroll_px + delta_px).max(0.0);
    }
}

/// Application state
pub struct App {
    presentation: Option<Presentation>,
    formation: Formation,
    completed: Rc<Cell<bool>>,
    shell: Shell,
    mounted_at: Instant,
    fps_counter: FpsCounter,
    error: Option<AppError>,
}

impl App {
    pub fn new() -> Result<Self, AppError> {
        let font: FontSpec = FORMATION_FONT.parse()?;
        let targets = TargetCache::global().get_or_generate(FORMATION_TEXT, &font, PARTICLE_COUNT);

        let completed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&completed);
        let formation = Formation::new(targets, DEFAULT_SEED, move || flag.set(true));

        Ok(Self {
            presentation: None,
            formation,
            completed,
            shell: Shell::new(),
            mounted_at: Instant::now(),
            fps_counter: FpsCounter::new(),
            error: None,
        })
    }

    /// Hand back the error that stopped the event loop, if any
    pub fn into_result(mut self) -> Result<(), AppError> {
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        log::error!("{}", error);
        self.error = Some(error);
        self.teardown(event_loop);
    }

    fn teardown(&mut self, event_loop: &ActiveEventLoop) {
        // Dropping the presentation releases the surface, buffers and device.
        self.presentation = None;
        event_loop.exit();
    }

    fn mount(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        log::info!("Mounting particle scene ({} particles)...", PARTICLE_COUNT);

        let window_attrs = Window::default_attributes()
            .with_title("Singularity")
            .with_inner_size(winit::dpi::LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let presentation = Presentation::new(window, self.formation.positions())?;
        presentation.window().request_redraw();

        log::info!("Controls:");
        log::info!("  Enter / click: Dismiss intro");
        log::info!("  Hold left mouse / touch: Form text");
        log::info!("  Mouse wheel: Scroll");
        log::info!("  Escape: Quit");

        self.presentation = Some(presentation);
        self.mounted_at = Instant::now();
        Ok(())
    }

    fn press(&mut self) {
        if self.shell.ready {
            let signals = self.shell.signals();
            self.formation.tracker_mut().pressed(signals.ready, signals.active);
        } else {
            self.shell.open_gate();
        }
    }

    fn pointer_moved(&mut self, x: f64, y: f64) {
        if let Some(presentation) = &self.presentation {
            let ndc = presentation.viewport().normalize_cursor(x, y);
            self.formation.tracker_mut().pointer_moved(ndc);
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(presentation) = self.presentation.as_mut() else {
            return;
        };

        let now = Instant::now();
        let time = now.duration_since(self.mounted_at).as_secs_f32();
        let signals = self.shell.signals();
        let scroll_world = presentation.viewport().scroll_to_world(self.shell.scroll_px);

        let report = self.formation.frame(time, signals, scroll_world);

        if self.completed.take() {
            self.shell.complete(now);
        }
        if self.shell.tick(now) {
            log::info!("Dependent UI revealed");
        }

        let outcome = presentation.present(self.formation.positions(), scroll_world, signals.ready);

        if let Some(fps) = self.fps_counter.tick() {
            presentation.window().set_title(&format!(
                "Singularity - {:.0} FPS - {} {:.0}%",
                fps,
                report.phase,
                report.progress * 100.0
            ));
        }

        match outcome.into_error() {
            Some(e) => self.fail(event_loop, e.into()),
            None => presentation.window().request_redraw(),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.presentation.is_some() {
            return;
        }

        if let Err(e) = self.mount(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                self.teardown(event_loop);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() && !event.repeat {
                    match event.physical_key {
                        PhysicalKey::Code(KeyCode::Escape) => {
                            log::info!("Escape pressed, exiting...");
                            self.teardown(event_loop);
                        }
                        PhysicalKey::Code(KeyCode::Enter) => self.shell.open_gate(),
                        _ => {}
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(position.x, position.y);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => self.press(),
                ElementState::Released => self.formation.tracker_mut().released(),
            },
            WindowEvent::Touch(touch) => {
                self.pointer_moved(touch.location.x, touch.location.y);
                match touch.phase {
                    TouchPhase::Started => self.press(),
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        self.formation.tracker_mut().released()
                    }
                    TouchPhase::Moved => {}
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta_px = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * SCROLL_LINE_PX,
                    MouseScrollDelta::PixelDelta(p) => -p.y as f32,
                };
                self.shell.scroll(delta_px);
            }
            WindowEvent::Resized(new_size) => {
                if let Some(presentation) = &mut self.presentation {
                    presentation.resize(new_size);
                }
            }
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.presentation = None;
    }
}

/// Simple FPS counter
struct FpsCounter {
    last_update: Instant,
    frame_count: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    /// Tick the counter, returns Some(fps) every second
    fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed.as_secs_f64() >= 1.0 {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.last_update = Instant::now();
            Some(fps)
        } else {
            None
        }
    }
}
