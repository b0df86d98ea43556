// src/camera.rs
// 旋转、透视投影
use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

use crate::surface::SurfaceSize;
use crate::ui_events::InteractionSnapshot;

/// 绕 Y 轴旋转 (XZ 平面)
pub fn rotate_y(x: f32, z: f32, angle: f32) -> (f32, f32) {
    let (sin, cos) = angle.sin_cos();
    (x * cos - z * sin, x * sin + z * cos)
}

/// 绕 X 轴旋转 (YZ 平面)
pub fn rotate_x(y: f32, z: f32, angle: f32) -> (f32, f32) {
    let (sin, cos) = angle.sin_cos();
    (y * cos - z * sin, y * sin + z * cos)
}

/// 透视除法，返回 (screen_x, screen_y, scale)
///
/// A non-positive or non-finite denominator yields scale 0 at finite
/// coordinates, so points at or behind the eye vanish instead of blowing up.
pub fn project(x: f32, y: f32, z: f32, width: f32, height: f32, focal_length: f32) -> (f32, f32, f32) {
    let denominator = focal_length + z;
    let scale = if focal_length.is_finite() && focal_length > 0.0 && denominator > f32::EPSILON {
        focal_length / denominator
    } else {
        0.0
    };
    ((x + width / 2.0) * scale, (y + height / 2.0) * scale, scale)
}

/// Global rotation accumulators, threaded through every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub yaw: f32,
    pub pitch: f32,
}

impl RotationState {
    pub fn new(base_pitch: f32) -> Self {
        Self { yaw: 0.0, pitch: base_pitch }
    }

    /// Autorotates yaw by a fixed step (kept in `[0, 2π)`) and re-derives
    /// pitch from the pointer's vertical offset.
    pub fn advance(&mut self, yaw_step: f32, base_pitch: f32, pitch_gain: f32, interaction: &InteractionSnapshot) {
        self.yaw = (self.yaw + yaw_step).rem_euclid(TAU);
        // rem_euclid may round up to exactly TAU
        if self.yaw >= TAU {
            self.yaw = 0.0;
        }
        self.pitch = base_pitch + interaction.normalized().y * pitch_gain;
    }
}

/// 单帧内的投影结果，帧结束即丢弃
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// Index of the node this point was projected from.
    pub index: usize,
    pub screen: Vec2,
    pub scale: f32,
    /// Camera-space z after rotation; only used for sorting and fading.
    pub depth: f32,
}

impl ProjectedPoint {
    /// Above the floor and in front of the eye.
    pub fn is_visible(&self, floor: f32) -> bool {
        self.scale > 0.0 && self.depth > floor
    }

    /// 0 at the visibility floor, rising linearly to 1 at depth 0.
    pub fn depth_alpha(&self, floor: f32) -> f32 {
        if floor >= 0.0 {
            return 1.0;
        }
        ((self.depth - floor) / -floor).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub rotation: RotationState,
    pub focal_length: f32,
}

impl Camera {
    pub fn new(rotation: RotationState, focal_length: f32) -> Self {
        Self { rotation, focal_length }
    }

    /// Yaw first, then pitch, then perspective.
    pub fn project_point(&self, index: usize, position: Vec3, viewport: SurfaceSize) -> ProjectedPoint {
        let (x, z) = rotate_y(position.x, position.z, self.rotation.yaw);
        let (y, depth) = rotate_x(position.y, z, self.rotation.pitch);
        let (sx, sy, scale) = project(x, y, depth, viewport.width, viewport.height, self.focal_length);
        ProjectedPoint { index, screen: Vec2::new(sx, sy), scale, depth }
    }

    pub fn is_degenerate(&self, viewport: SurfaceSize) -> bool {
        !(self.focal_length.is_finite() && self.focal_length > 0.0) || viewport.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn quarter_turn_about_y() {
        let (x, z) = rotate_y(1.0, 0.0, FRAC_PI_2);
        assert!(close(x, 0.0) && close(z, 1.0));
    }

    #[test]
    fn quarter_turn_about_x() {
        let (y, z) = rotate_x(0.0, 1.0, FRAC_PI_2);
        assert!(close(y, -1.0) && close(z, 0.0));
    }

    #[test]
    fn rotation_preserves_length() {
        let (x, z) = rotate_y(3.0, 4.0, 1.234);
        assert!(close((x * x + z * z).sqrt(), 5.0));
    }

    #[test]
    fn huge_focal_length_is_orthographic() {
        let (x, z) = rotate_y(25.0, 40.0, 0.0);
        let (y, z) = rotate_x(-30.0, z, 0.0);
        let (sx, sy, scale) = project(x, y, z, 300.0, 200.0, 1.0e9);
        assert!(close(sx, 25.0 + 150.0));
        assert!(close(sy, -30.0 + 100.0));
        assert!(close(scale, 1.0));
    }

    #[test]
    fn nearer_points_are_larger() {
        let (_, _, near) = project(0.0, 0.0, -100.0, 300.0, 300.0, 600.0);
        let (_, _, far) = project(0.0, 0.0, 100.0, 300.0, 300.0, 600.0);
        assert!(near > 1.0 && far < 1.0);
    }

    #[test]
    fn zero_focal_length_collapses_to_origin() {
        let (sx, sy, scale) = project(10.0, 10.0, 0.0, 300.0, 300.0, 0.0);
        assert_eq!((sx, sy, scale), (0.0, 0.0, 0.0));
    }

    #[test]
    fn behind_the_eye_has_no_scale() {
        let (sx, sy, scale) = project(10.0, 10.0, -600.0, 300.0, 300.0, 600.0);
        assert_eq!(scale, 0.0);
        assert!(sx.is_finite() && sy.is_finite());
    }

    #[test]
    fn yaw_wraps_into_full_turn() {
        let mut rotation = RotationState::new(0.3);
        let idle = InteractionSnapshot::default();
        for _ in 0..1000 {
            rotation.advance(0.05, 0.3, 0.2, &idle);
        }
        let expected = (1000.0_f64 * 0.05).rem_euclid(std::f64::consts::TAU) as f32;
        assert!((rotation.yaw - expected).abs() < 1e-3, "{} vs {}", rotation.yaw, expected);
        assert!((0.0..TAU).contains(&rotation.yaw));
    }

    #[test]
    fn pointer_biases_pitch() {
        let mut rotation = RotationState::new(0.3);
        let bottom = InteractionSnapshot::new(Vec2::new(500.0, 1000.0), Vec2::new(1000.0, 1000.0));
        rotation.advance(0.0, 0.3, 0.2, &bottom);
        assert!(close(rotation.pitch, 0.4));

        let centered = InteractionSnapshot::new(Vec2::new(500.0, 500.0), Vec2::new(1000.0, 1000.0));
        rotation.advance(0.0, 0.3, 0.2, &centered);
        assert!(close(rotation.pitch, 0.3));
    }

    #[test]
    fn depth_alpha_fades_from_floor() {
        let at = |depth| ProjectedPoint { index: 0, screen: Vec2::ZERO, scale: 1.0, depth };
        assert_eq!(at(-500.0).depth_alpha(-500.0), 0.0);
        assert!(close(at(-250.0).depth_alpha(-500.0), 0.5));
        assert_eq!(at(0.0).depth_alpha(-500.0), 1.0);
        assert_eq!(at(80.0).depth_alpha(-500.0), 1.0);
        assert!(!at(-500.0).is_visible(-500.0));
        assert!(at(-499.0).is_visible(-500.0));
    }

    #[test]
    fn camera_projects_around_viewport_center() {
        let camera = Camera::new(RotationState { yaw: 0.0, pitch: 0.0 }, 600.0);
        let point = camera.project_point(3, Vec3::ZERO, SurfaceSize::new(600.0, 400.0));
        assert_eq!(point.index, 3);
        assert!(close(point.screen.x, 300.0) && close(point.screen.y, 200.0));
        assert!(camera.is_degenerate(SurfaceSize::new(0.0, 400.0)));
    }

    #[test]
    fn points_behind_a_short_focal_length_are_hidden() {
        let camera = Camera::new(RotationState { yaw: 0.0, pitch: 0.0 }, 100.0);
        let viewport = SurfaceSize::new(600.0, 400.0);
        let behind = camera.project_point(0, Vec3::new(40.0, 20.0, -150.0), viewport);
        assert!(behind.depth > -500.0);
        assert_eq!(behind.scale, 0.0);
        assert!(!behind.is_visible(-500.0));
        assert!(camera.project_point(1, Vec3::new(40.0, 20.0, -50.0), viewport).is_visible(-500.0));
    }
}
