// src/canvas.rs
// 浏览器 <canvas> 2D 上下文的绘制表面
use bevy_color::Srgba;
use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::RenderError;
use crate::models::{GradientStop, css_rgba};
use crate::surface::{Surface, SurfaceSize};

/// Canvas whose backing store is kept at `logical size × devicePixelRatio`,
/// with the context pre-scaled so drawing happens in CSS pixels.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    size: SurfaceSize,
}

fn device_pixel_ratio() -> f32 {
    web_sys::window().map(|w| w.device_pixel_ratio() as f32).unwrap_or(1.0)
}

impl CanvasSurface {
    pub fn from_element_id(canvas_id: &str) -> Result<Self, RenderError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| RenderError::SurfaceUnavailable("no document".into()))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| RenderError::SurfaceUnavailable(format!("missing #{canvas_id}")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| RenderError::SurfaceUnavailable(format!("#{canvas_id} is not a canvas")))?;
        Self::new(canvas)
    }

    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, RenderError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| RenderError::SurfaceUnavailable(format!("{e:?}")))?
            .ok_or_else(|| RenderError::SurfaceUnavailable("no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderError::SurfaceUnavailable("not a 2d context".into()))?;

        let mut surface = Self { canvas, ctx, size: SurfaceSize::new(0.0, 0.0) };
        surface.sync_size();
        log::info!(
            "canvas2d surface: {}x{} @{}x",
            surface.size.width,
            surface.size.height,
            surface.size.pixel_ratio
        );
        Ok(surface)
    }

    fn measure(&self) -> SurfaceSize {
        SurfaceSize::new(self.canvas.client_width() as f32, self.canvas.client_height() as f32)
            .with_pixel_ratio(device_pixel_ratio())
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn sync_size(&mut self) -> bool {
        let measured = self.measure();
        if measured == self.size {
            return false;
        }
        self.size = measured;
        let (width, height) = measured.physical();
        // resizing the backing store also resets the context transform
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        let ratio = measured.pixel_ratio as f64;
        self.ctx.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0).ok();
        true
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.size.width as f64, self.size.height as f64);
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Srgba) {
        self.ctx.set_stroke_style_str(&css_rgba(color));
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Srgba) {
        if !(radius > 0.0) {
            return;
        }
        self.ctx.set_fill_style_str(&css_rgba(color));
        self.ctx.begin_path();
        self.ctx
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, std::f64::consts::TAU)
            .ok();
        self.ctx.fill();
    }

    fn fill_radial_glow(&mut self, center: Vec2, radius: f32, stops: &[GradientStop]) {
        if !(radius > 0.0) {
            return;
        }
        let (x, y, r) = (center.x as f64, center.y as f64, radius as f64);
        let Ok(gradient) = self.ctx.create_radial_gradient(x, y, 0.0, x, y, r) else {
            log::debug!("radial gradient rejected at ({x}, {y}) r={r}");
            return;
        };
        for stop in stops {
            gradient.add_color_stop(stop.offset.clamp(0.0, 1.0), &css_rgba(stop.color)).ok();
        }
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.begin_path();
        self.ctx.arc(x, y, r, 0.0, std::f64::consts::TAU).ok();
        self.ctx.fill();
    }
}
