// src/scheduler.rs
// 帧调度抽象
use crate::error::RenderError;

/// Identifies one outstanding "call me before the next repaint" request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle(pub i32);

/// The host's display-refresh scheduler. Requests never block.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> Result<FrameHandle, RenderError>;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler pumped by its owner: it only remembers what was asked of it.
/// Drives the headless renderer and the tests.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: i32,
    pub pending: Option<FrameHandle>,
    pub requested: usize,
    pub cancelled: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the outstanding request, if any, as the host would when firing it.
    pub fn fire(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> Result<FrameHandle, RenderError> {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        self.requested += 1;
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_only_matches_the_pending_request() {
        let mut scheduler = ManualScheduler::new();
        let first = scheduler.request_frame().unwrap();
        scheduler.cancel_frame(FrameHandle(first.0 + 10));
        assert_eq!(scheduler.pending, Some(first));
        scheduler.cancel_frame(first);
        assert_eq!(scheduler.pending, None);
        assert_eq!((scheduler.requested, scheduler.cancelled), (1, 1));
    }

    #[test]
    fn fire_consumes_the_request() {
        let mut scheduler = ManualScheduler::new();
        scheduler.request_frame().unwrap();
        assert!(scheduler.fire().is_some());
        assert!(scheduler.fire().is_none());
    }
}
