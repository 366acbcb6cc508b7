//! Drawing surfaces.
//!
//! A particle field draws through the [`Surface`] trait, so the update logic
//! never depends on a particular renderer. [`Frame`] records the calls as a
//! list of [`DrawCommand`]s; the GPU renderer tessellates a recorded frame,
//! and tests inspect it directly.

use glam::Vec2;

use crate::visuals::Rgba;

/// A 2D immediate-mode drawing target.
pub trait Surface {
    /// Erase everything drawn so far.
    fn clear(&mut self, size: Vec2);
    /// Draw a filled circle.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
    /// Draw a straight line of the given stroke width.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba);
}

/// One recorded drawing operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Clear { size: Vec2 },
    Circle { center: Vec2, radius: f32, color: Rgba },
    Line { from: Vec2, to: Vec2, width: f32, color: Rgba },
}

/// What a line connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Between two particles.
    Connection,
    /// From a particle to the pointer.
    Pointer,
}

/// A recorded frame.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// All commands since the last clear, in draw order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
    }

    /// Lines ending at `point`, i.e. pointer lines when `point` is the pointer.
    pub fn lines_to(&self, point: Vec2) -> impl Iterator<Item = &DrawCommand> + '_ {
        self.commands
            .iter()
            .filter(move |c| matches!(c, DrawCommand::Line { to, .. } if *to == point))
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Surface for Frame {
    fn clear(&mut self, size: Vec2) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear { size });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }
}

/// Line counts for one frame, used for logging and statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub particles: usize,
    pub connections: usize,
    pub pointer_lines: usize,
}

impl FrameStats {
    pub fn record(&mut self, kind: LineKind) {
        match kind {
            LineKind::Connection => self.connections += 1,
            LineKind::Pointer => self.pointer_lines += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_discards_previous_commands() {
        let mut frame = Frame::new();
        frame.fill_circle(Vec2::ONE, 2.0, Rgba::WHITE);
        frame.clear(Vec2::new(10.0, 10.0));
        assert_eq!(frame.commands().len(), 1);
        assert_eq!(frame.circles().count(), 0);
    }

    #[test]
    fn test_lines_to_filters_by_endpoint() {
        let mut frame = Frame::new();
        let pointer = Vec2::new(5.0, 5.0);
        frame.stroke_line(Vec2::ZERO, pointer, 1.0, Rgba::ORANGE);
        frame.stroke_line(Vec2::ZERO, Vec2::ONE, 0.5, Rgba::WHITE);
        assert_eq!(frame.lines().count(), 2);
        assert_eq!(frame.lines_to(pointer).count(), 1);
    }
}
