// src/error.rs
use thiserror::Error;

/// Failures a visualization can hit while mounting or drawing a frame.
///
/// None of these stop the animation loop on their own: the driver logs them
/// and decides whether the next frame is still scheduled.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The drawing surface (canvas element or 2D context) could not be acquired.
    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// Zero-sized surface or unusable focal length; the frame is skipped.
    #[error("degenerate geometry (surface {width}x{height}, focal length {focal_length})")]
    DegenerateGeometry {
        width: f32,
        height: f32,
        focal_length: f32,
    },

    /// The host refused to schedule another frame.
    #[error("frame scheduler failure: {0}")]
    Scheduler(String),
}

impl RenderError {
    /// Errors that only affect the current frame; the next one may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, RenderError::DegenerateGeometry { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_geometry_is_transient() {
        let err = RenderError::DegenerateGeometry { width: 0.0, height: 300.0, focal_length: 600.0 };
        assert!(err.is_transient());
        assert!(err.to_string().contains("0x300"));
    }

    #[test]
    fn surface_unavailable_is_not_transient() {
        let err = RenderError::SurfaceUnavailable("no 2d context".into());
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "drawing surface unavailable: no 2d context");
    }
}
