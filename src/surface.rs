// src/surface.rs
use bevy_color::Srgba;
use glam::Vec2;

use crate::models::{DrawCommand, GradientStop};

/// Logical (CSS-pixel) size of a drawing surface plus its backing-store ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height, pixel_ratio: 1.0 }
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        self.pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 { pixel_ratio } else { 1.0 };
        self
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Backing-store size in device pixels.
    pub fn physical(&self) -> (u32, u32) {
        (
            (self.width.max(0.0) * self.pixel_ratio).round() as u32,
            (self.height.max(0.0) * self.pixel_ratio).round() as u32,
        )
    }
}

/// A 2D immediate-mode drawing target. Coordinates are logical pixels.
pub trait Surface {
    fn size(&self) -> SurfaceSize;

    /// Re-reads the host's current dimensions. Returns true when they changed.
    fn sync_size(&mut self) -> bool {
        false
    }

    fn clear(&mut self);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Srgba);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Srgba);
    fn fill_radial_glow(&mut self, center: Vec2, radius: f32, stops: &[GradientStop]);

    /// Called once the frame's draw calls are issued.
    fn present(&mut self) {}
}

/// Keeps every draw call of the current frame. Used headless and in tests.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: SurfaceSize,
    pending_size: Option<SurfaceSize>,
    pub commands: Vec<DrawCommand>,
    pub frames_presented: usize,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: SurfaceSize::new(width, height),
            pending_size: None,
            commands: Vec::new(),
            frames_presented: 0,
        }
    }

    /// Queues a resize; it becomes visible on the next `sync_size`, like a DOM resize event.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.pending_size = Some(SurfaceSize::new(width, height).with_pixel_ratio(self.size.pixel_ratio));
    }

    pub fn circles(&self) -> impl Iterator<Item = (Vec2, f32, Srgba)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Circle { center, radius, color } => Some((*center, *radius, *color)),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Line { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
    }

    pub fn glows(&self) -> impl Iterator<Item = (Vec2, f32)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::RadialGlow { center, radius, .. } => Some((*center, *radius)),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn sync_size(&mut self) -> bool {
        match self.pending_size.take() {
            Some(size) if size != self.size => {
                self.size = size;
                true
            }
            _ => false,
        }
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Srgba) {
        self.commands.push(DrawCommand::Line { from, to, width, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Srgba) {
        self.commands.push(DrawCommand::Circle { center, radius, color });
    }

    fn fill_radial_glow(&mut self, center: Vec2, radius: f32, stops: &[GradientStop]) {
        self.commands.push(DrawCommand::RadialGlow { center, radius, stops: stops.to_vec() });
    }

    fn present(&mut self) {
        self.frames_presented += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::white;

    #[test]
    fn physical_size_scales_by_ratio() {
        let size = SurfaceSize::new(300.0, 150.0).with_pixel_ratio(2.0);
        assert_eq!(size.physical(), (600, 300));
        assert_eq!(SurfaceSize::new(10.0, 10.0).with_pixel_ratio(f32::NAN).pixel_ratio, 1.0);
    }

    #[test]
    fn empty_sizes() {
        assert!(SurfaceSize::new(0.0, 100.0).is_empty());
        assert!(SurfaceSize::new(100.0, f32::NAN).is_empty());
        assert!(!SurfaceSize::new(1.0, 1.0).is_empty());
    }

    #[test]
    fn resize_is_applied_on_sync() {
        let mut surface = RecordingSurface::new(300.0, 300.0);
        surface.resize(600.0, 400.0);
        assert_eq!(surface.size().width, 300.0);
        assert!(surface.sync_size());
        assert_eq!(surface.size().center(), Vec2::new(300.0, 200.0));
        assert!(!surface.sync_size());
    }

    #[test]
    fn clear_starts_a_new_frame() {
        let mut surface = RecordingSurface::new(10.0, 10.0);
        surface.fill_circle(Vec2::ONE, 2.0, white(1.0));
        surface.clear();
        assert_eq!(surface.commands, vec![DrawCommand::Clear]);
    }
}
