// src/ui_events.rs
// 宿主页面的指针与尺寸输入
use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

use crate::config::{StarfieldConfig, VisualizationConfig};

/// Messages from the host page to a running visualization.
#[derive(Debug, Clone)]
pub enum HostCommand {
    /// Pointer position in page (client) coordinates.
    PointerMoved { x: f32, y: f32 },
    /// Browser viewport size, the reference for pointer normalisation.
    ViewportResized { width: f32, height: f32 },
    /// Drawing surface changed size; re-read on the next frame.
    SurfaceResized,
    SetConfig(VisualizationConfig),
    SetStarfieldConfig(StarfieldConfig),
    Start,
    Stop,
}

/// Last known pointer position, in page space, and the viewport it was sampled in.
///
/// No history is kept: each pointer event overwrites the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InteractionSnapshot {
    pub pointer: Vec2,
    pub viewport: Vec2,
}

impl InteractionSnapshot {
    pub fn new(pointer: Vec2, viewport: Vec2) -> Self {
        Self { pointer, viewport }
    }

    /// Pointer offset from the viewport centre, each axis in `[-0.5, 0.5]`
    /// while the pointer is inside the viewport. Zero when the viewport is unknown.
    pub fn normalized(&self) -> Vec2 {
        let axis = |p: f32, extent: f32| {
            if extent > 0.0 && extent.is_finite() && p.is_finite() {
                (p - extent / 2.0) / extent
            } else {
                0.0
            }
        };
        Vec2::new(axis(self.pointer.x, self.viewport.x), axis(self.pointer.y, self.viewport.y))
    }

    /// Applies pointer/viewport commands; returns false for anything else.
    pub fn apply(&mut self, command: &HostCommand) -> bool {
        match *command {
            HostCommand::PointerMoved { x, y } => {
                self.pointer = Vec2::new(x, y);
                true
            }
            HostCommand::ViewportResized { width, height } => {
                self.viewport = Vec2::new(width, height);
                true
            }
            _ => false,
        }
    }
}

/// Pointer and viewport shared between host event listeners and the driver.
///
/// Listeners overwrite it in place, so no matter how many events arrive
/// between frames (or while the animation is stopped) nothing queues up.
#[derive(Debug, Clone, Default)]
pub struct InteractionFeed(Rc<Cell<InteractionSnapshot>>);

impl InteractionFeed {
    pub fn snapshot(&self) -> InteractionSnapshot {
        self.0.get()
    }

    pub fn set_pointer(&self, x: f32, y: f32) {
        let mut snapshot = self.0.get();
        snapshot.pointer = Vec2::new(x, y);
        self.0.set(snapshot);
    }

    pub fn set_viewport(&self, width: f32, height: f32) {
        let mut snapshot = self.0.get();
        snapshot.viewport = Vec2::new(width, height);
        self.0.set(snapshot);
    }

    /// Same as [`InteractionSnapshot::apply`], on the shared value.
    pub fn apply(&self, command: &HostCommand) -> bool {
        let mut snapshot = self.0.get();
        let applied = snapshot.apply(command);
        self.0.set(snapshot);
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_range() {
        let viewport = Vec2::new(800.0, 600.0);
        assert_eq!(InteractionSnapshot::new(Vec2::ZERO, viewport).normalized(), Vec2::new(-0.5, -0.5));
        assert_eq!(InteractionSnapshot::new(viewport, viewport).normalized(), Vec2::new(0.5, 0.5));
        assert_eq!(InteractionSnapshot::new(viewport / 2.0, viewport).normalized(), Vec2::ZERO);
    }

    #[test]
    fn unknown_viewport_means_no_bias() {
        let snapshot = InteractionSnapshot::new(Vec2::new(100.0, 900.0), Vec2::ZERO);
        assert_eq!(snapshot.normalized(), Vec2::ZERO);
    }

    #[test]
    fn last_pointer_write_wins() {
        let mut snapshot = InteractionSnapshot::default();
        assert!(snapshot.apply(&HostCommand::PointerMoved { x: 1.0, y: 2.0 }));
        assert!(snapshot.apply(&HostCommand::PointerMoved { x: 7.0, y: 9.0 }));
        assert!(!snapshot.apply(&HostCommand::Start));
        assert_eq!(snapshot.pointer, Vec2::new(7.0, 9.0));
    }

    #[test]
    fn feed_clones_share_one_snapshot() {
        let feed = InteractionFeed::default();
        let listener = feed.clone();
        for i in 0..10_000 {
            listener.set_pointer(i as f32, 2.0 * i as f32);
        }
        listener.set_viewport(640.0, 480.0);
        assert_eq!(feed.snapshot(), InteractionSnapshot::new(Vec2::new(9_999.0, 19_998.0), Vec2::new(640.0, 480.0)));
        assert!(feed.apply(&HostCommand::PointerMoved { x: 1.0, y: 1.0 }));
        assert!(!feed.apply(&HostCommand::SurfaceResized));
        assert_eq!(listener.snapshot().pointer, Vec2::ONE);
    }
}
