// src/scene/starfield.rs
// 背景漂浮粒子层
use glam::{Vec2, Vec3};
use rand::Rng;

use super::sample_range;
use crate::config::StarfieldConfig;
use crate::surface::SurfaceSize;

/// One background particle drifting towards the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    /// `x`/`y` in surface pixels, `z` from the far plane down to 0.
    pub position: Vec3,
    pub size: f32,
    pub speed: f32,
}

/// Screen-space result of drawing a star for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarSprite {
    pub center: Vec2,
    pub radius: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Starfield {
    pub stars: Vec<Star>,
}

impl Starfield {
    pub fn generate<R: Rng + ?Sized>(config: &StarfieldConfig, viewport: SurfaceSize, rng: &mut R) -> Self {
        let stars = (0..config.star_count)
            .map(|_| Star {
                position: Vec3::new(
                    rng.random::<f32>() * viewport.width.max(0.0),
                    rng.random::<f32>() * viewport.height.max(0.0),
                    rng.random::<f32>() * config.far_plane,
                ),
                size: sample_range(rng, config.star_size),
                speed: sample_range(rng, config.star_speed),
            })
            .collect();
        Self { stars }
    }

    /// Moves every star closer, respawning the ones that passed the viewer,
    /// and drifts them with the pointer offset. Returns how many respawned.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        config: &StarfieldConfig,
        viewport: SurfaceSize,
        pointer: Vec2,
        rng: &mut R,
    ) -> usize {
        let parallax = (pointer - viewport.center()) * config.parallax;
        let mut respawned = 0;
        for star in &mut self.stars {
            star.position.z -= star.speed;
            if star.position.z <= 0.0 {
                star.position = Vec3::new(
                    rng.random::<f32>() * viewport.width.max(0.0),
                    rng.random::<f32>() * viewport.height.max(0.0),
                    config.far_plane,
                );
                respawned += 1;
            }
            star.position.x += parallax.x * star.speed;
            star.position.y += parallax.y * star.speed;
        }
        respawned
    }

    pub fn sprites<'a>(
        &'a self,
        config: &'a StarfieldConfig,
        viewport: SurfaceSize,
    ) -> impl Iterator<Item = StarSprite> + 'a {
        let center = viewport.center();
        let far = config.far_plane;
        // a star sitting on the far plane is fully transparent and unbounded in size
        self.stars.iter().filter_map(move |star| {
            let alpha = ((far - star.position.z) / far).clamp(0.0, 1.0) * config.max_opacity;
            if !(alpha > 0.0) {
                return None;
            }
            let scale = far / (far - star.position.z);
            Some(StarSprite {
                center: (star.position.truncate() - center) * scale + center,
                radius: star.size * scale,
                alpha,
            })
        })
    }
}
