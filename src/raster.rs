// src/raster.rs
// CPU 光栅化的绘制表面，用于无窗口渲染与截图
use std::path::Path;

use anyhow::Context;
use bevy_color::Srgba;
use glam::Vec2;
use image::{Rgba, RgbaImage};

use crate::models::{GradientStop, sample_gradient};
use crate::surface::{Surface, SurfaceSize};

/// Software surface with canvas-like source-over blending in sRGB space.
pub struct RasterSurface {
    size: SurfaceSize,
    pending_size: Option<SurfaceSize>,
    background: Srgba,
    image: RgbaImage,
}

impl RasterSurface {
    pub fn new(size: SurfaceSize) -> Self {
        let (width, height) = size.physical();
        Self {
            size,
            pending_size: None,
            background: Srgba::NONE,
            image: RgbaImage::new(width, height),
        }
    }

    pub fn with_background(mut self, background: Srgba) -> Self {
        self.background = background;
        self
    }

    /// Applied on the next `sync_size`.
    pub fn resize(&mut self, size: SurfaceSize) {
        self.pending_size = Some(size);
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        self.image
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("failed to write snapshot to {}", path.display()))
    }

    fn to_device(&self, point: Vec2) -> Vec2 {
        point * self.size.pixel_ratio
    }

    /// Pixel box covering `center ± reach` (device pixels), clipped to the image.
    fn pixel_bounds(&self, min: Vec2, max: Vec2) -> Option<(u32, u32, u32, u32)> {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 || !min.is_finite() || !max.is_finite() {
            return None;
        }
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().max(0.0) as u32).min(w - 1);
        let y1 = (max.y.ceil().max(0.0) as u32).min(h - 1);
        (x0 <= x1 && y0 <= y1).then_some((x0, y0, x1, y1))
    }

    fn blend(&mut self, x: u32, y: u32, color: Srgba, coverage: f32) {
        let src_a = (color.alpha * coverage).clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let dst = self.image.get_pixel(x, y).0;
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        let channel = |src: f32, dst: u8| {
            let dst = dst as f32 / 255.0;
            let c = (src.clamp(0.0, 1.0) * src_a + dst * dst_a * (1.0 - src_a)) / out_a;
            (c * 255.0).round() as u8
        };
        self.image.put_pixel(
            x,
            y,
            Rgba([
                channel(color.red, dst[0]),
                channel(color.green, dst[1]),
                channel(color.blue, dst[2]),
                (out_a * 255.0).round() as u8,
            ]),
        );
    }
}

fn background_pixel(color: Srgba) -> Rgba<u8> {
    let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgba([byte(color.red), byte(color.green), byte(color.blue), byte(color.alpha)])
}

impl Surface for RasterSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn sync_size(&mut self) -> bool {
        match self.pending_size.take() {
            Some(size) if size != self.size => {
                let (width, height) = size.physical();
                self.size = size;
                self.image = RgbaImage::new(width, height);
                true
            }
            _ => false,
        }
    }

    fn clear(&mut self) {
        let pixel = background_pixel(self.background);
        for p in self.image.pixels_mut() {
            *p = pixel;
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Srgba) {
        let (a, b) = (self.to_device(from), self.to_device(to));
        let half = (width * self.size.pixel_ratio).max(1.0) / 2.0;
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(a.min(b) - half - 1.0, a.max(b) + half + 1.0) else {
            return;
        };
        let segment = b - a;
        let length_sq = segment.length_squared();
        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if length_sq > f32::EPSILON { ((p - a).dot(segment) / length_sq).clamp(0.0, 1.0) } else { 0.0 };
                let distance = p.distance(a + segment * t);
                let coverage = (half - distance + 0.5).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Srgba) {
        let c = self.to_device(center);
        let r = radius * self.size.pixel_ratio;
        if !(r > 0.0) {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(c - r - 1.0, c + r + 1.0) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let distance = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(c);
                let coverage = (r - distance + 0.5).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    fn fill_radial_glow(&mut self, center: Vec2, radius: f32, stops: &[GradientStop]) {
        let c = self.to_device(center);
        let r = radius * self.size.pixel_ratio;
        if !(r > 0.0) || stops.is_empty() {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(c - r, c + r) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let distance = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(c);
                if distance <= r {
                    self.blend(x, y, sample_gradient(stops, distance / r), 1.0);
                }
            }
        }
    }
}
