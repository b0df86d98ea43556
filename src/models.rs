// src/models.rs
use bevy_color::{Alpha, Srgba};
use glam::Vec2;

// --- Colour helpers ---

/// Pure white at the given opacity; every layer of the graph is white.
pub fn white(alpha: f32) -> Srgba {
    Srgba::WHITE.with_alpha(alpha.clamp(0.0, 1.0))
}

/// CSS `rgba()` string for the canvas fill/stroke style setters.
pub fn css_rgba(color: Srgba) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({}, {}, {}, {:.3})",
        channel(color.red),
        channel(color.green),
        channel(color.blue),
        color.alpha.clamp(0.0, 1.0)
    )
}

// --- Radial gradients ---

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the radius, 0 at the centre and 1 at the rim.
    pub offset: f32,
    pub color: Srgba,
}

impl GradientStop {
    pub fn new(offset: f32, color: Srgba) -> Self {
        Self { offset, color }
    }
}

/// Colour of a radial gradient at normalised radius `t`, with stops sorted by offset.
pub fn sample_gradient(stops: &[GradientStop], t: f32) -> Srgba {
    let Some(first) = stops.first() else {
        return Srgba::NONE;
    };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let k = if span > f32::EPSILON { (t - a.offset) / span } else { 1.0 };
            return Srgba::new(
                a.color.red + (b.color.red - a.color.red) * k,
                a.color.green + (b.color.green - a.color.green) * k,
                a.color.blue + (b.color.blue - a.color.blue) * k,
                a.color.alpha + (b.color.alpha - a.color.alpha) * k,
            );
        }
    }
    stops[stops.len() - 1].color
}

// --- Immediate-mode draw commands (as recorded by `RecordingSurface`) ---

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Srgba,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Srgba,
    },
    RadialGlow {
        center: Vec2,
        radius: f32,
        stops: Vec<GradientStop>,
    },
}

impl DrawCommand {
    /// Every coordinate and radius carried by the command is a finite number.
    pub fn is_finite(&self) -> bool {
        match self {
            DrawCommand::Clear => true,
            DrawCommand::Line { from, to, width, .. } => from.is_finite() && to.is_finite() && width.is_finite(),
            DrawCommand::Circle { center, radius, color } => {
                center.is_finite() && radius.is_finite() && color.alpha.is_finite()
            }
            DrawCommand::RadialGlow { center, radius, stops } => {
                center.is_finite() && radius.is_finite() && stops.iter().all(|s| s.color.alpha.is_finite())
            }
        }
    }
}
