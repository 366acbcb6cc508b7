//! Native viewer: a winit window showing one particle field.
//!
//! The window owns the field, the pointer tracker and the frame clock; every
//! `RedrawRequested` runs one field step into a recorded [`Frame`] and hands
//! it to the [`Renderer`]. Closing the window or stopping the [`StopToken`]
//! ends the event loop.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::driver::StopToken;
use crate::error::ViewerError;
use crate::field::{FieldConfig, ParticleField};
use crate::gpu::Renderer;
use crate::input::Input;
use crate::surface::Frame;
use crate::time::Time;

/// How often the title's FPS readout refreshes, in frames.
const TITLE_REFRESH_FRAMES: u64 = 30;

/// Viewer settings.
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub title: String,
    pub config: FieldConfig,
    pub seed: u64,
    /// Initial inner size in logical pixels.
    pub size: (u32, u32),
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            title: "constellation".to_string(),
            config: FieldConfig::constellation(),
            seed: 0,
            size: (1280, 720),
        }
    }
}

/// Open a window and run until it is closed or `stop` is triggered.
pub fn run(options: ViewerOptions, stop: StopToken) -> Result<(), ViewerError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(options, stop);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    options: ViewerOptions,
    stop: StopToken,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    field: Option<ParticleField>,
    input: Option<Input>,
    frame: Frame,
    time: Time,
    error: Option<ViewerError>,
}

impl App {
    fn new(options: ViewerOptions, stop: StopToken) -> Self {
        Self {
            options,
            stop,
            window: None,
            renderer: None,
            field: None,
            input: None,
            frame: Frame::new(),
            time: Time::new(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let (w, h) = self.options.size;
        let window_attrs = Window::default_attributes()
            .with_title(self.options.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(w, h));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();
        let input = Input::new(size.width, size.height, window.scale_factor());
        let field = ParticleField::new(self.options.config.clone(), input.viewport(), self.options.seed);
        log::info!(
            "viewer started with {} particles in {}x{}",
            field.len(),
            input.viewport().x,
            input.viewport().y
        );

        let renderer = pollster::block_on(Renderer::new(window.clone()))?;
        self.window = Some(window);
        self.renderer = Some(renderer);
        self.field = Some(field);
        self.input = Some(input);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(renderer), Some(field), Some(input)) = (&mut self.renderer, &mut self.field, &self.input) else {
            return;
        };

        self.time.update();
        let ctx = input.frame_context();
        field.step(&ctx, &mut self.frame);

        match renderer.render(&self.frame, ctx.viewport) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, closing viewer");
                event_loop.exit();
            }
            Err(e) => log::error!("Render error: {:?}", e),
        }

        if let Some(window) = &self.window {
            if self.time.frame() % TITLE_REFRESH_FRAMES == 0 {
                window.set_title(&format!("{} - {:.0} fps", self.options.title, self.time.fps()));
            }
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                log::error!("{}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.stop.is_stopped() {
            event_loop.exit();
            return;
        }

        if let Some(input) = &mut self.input {
            input.handle_event(&event);
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
                // The field regenerates itself when it sees the new viewport.
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.stop.is_stopped() {
            event_loop.exit();
        }
    }
}
