//! Pointer and viewport tracking.
//!
//! [`Input`] turns raw window events into the two values a particle field
//! needs each frame: the viewport size and the pointer position, both in
//! logical pixels. The pointer becomes `None` when the cursor leaves the
//! window and comes back with the next movement.
//!
//! ```ignore
//! input.handle_event(&event);
//! let ctx = input.frame_context();
//! field.step(&ctx, &mut frame);
//! ```

use glam::Vec2;
use winit::event::WindowEvent;

use crate::field::FrameContext;

/// Tracked pointer and viewport state.
#[derive(Debug, Clone)]
pub struct Input {
    pointer: Option<Vec2>,
    /// Physical size in pixels.
    physical_size: (u32, u32),
    scale_factor: f64,
}

impl Input {
    /// Create a tracker for a window of the given physical size.
    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            pointer: None,
            physical_size: (width, height),
            scale_factor: if scale_factor > 0.0 { scale_factor } else { 1.0 },
        }
    }

    /// Pointer position in logical pixels, if the cursor is over the window.
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Viewport size in logical pixels.
    pub fn viewport(&self) -> Vec2 {
        let (w, h) = self.physical_size;
        Vec2::new(w as f32, h as f32) / self.scale_factor as f32
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Inputs for the next field frame.
    pub fn frame_context(&self) -> FrameContext {
        FrameContext::new(self.viewport()).with_pointer(self.pointer)
    }

    /// Record a pointer movement in physical pixels.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        let s = self.scale_factor;
        self.pointer = Some(Vec2::new((x / s) as f32, (y / s) as f32));
    }

    /// Forget the pointer.
    pub fn pointer_left(&mut self) {
        self.pointer = None;
    }

    pub fn set_physical_size(&mut self, width: u32, height: u32) {
        self.physical_size = (width, height);
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        if scale_factor > 0.0 {
            self.scale_factor = scale_factor;
        }
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(position.x, position.y);
            }
            WindowEvent::CursorLeft { .. } => self.pointer_left(),
            WindowEvent::Resized(size) => self.set_physical_size(size.width, size.height),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.set_scale_factor(*scale_factor);
            }
            _ => {}
        }
    }
}
