// src/scene/particle.rs
// 沿连线流动的粒子
use glam::Vec2;
use rand::Rng;

use crate::config::OpacityCurve;

/// A dot travelling between two nodes. Particles are recycled forever, never dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub start_node: usize,
    /// May equal `start_node`; the particle then sits on that node.
    pub end_node: usize,
    /// Interpolation parameter in `[0, 1)` along the projected edge.
    pub progress: f32,
    /// Progress added per frame, always > 0.
    pub speed: f32,
}

impl Particle {
    /// `node_count` must be non-zero.
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, node_count: usize, speed: [f32; 2]) -> Self {
        Self {
            start_node: rng.random_range(0..node_count),
            end_node: rng.random_range(0..node_count),
            progress: rng.random::<f32>(),
            speed: super::sample_range(rng, speed),
        }
    }

    /// Steps along the edge. On reaching the end, restarts at 0 on a freshly
    /// drawn pair of endpoints, however far past 1 the step went.
    /// Returns true when the particle was recycled.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R, node_count: usize) -> bool {
        self.progress += self.speed;
        if self.progress < 1.0 && self.progress >= 0.0 {
            return false;
        }
        self.progress = 0.0;
        if node_count > 0 {
            self.start_node = rng.random_range(0..node_count);
            self.end_node = rng.random_range(0..node_count);
        }
        true
    }

    /// Screen position between the endpoints' projections of the current frame.
    pub fn position(&self, start: Vec2, end: Vec2) -> Vec2 {
        start.lerp(end, self.progress)
    }

    pub fn opacity(&self, curve: OpacityCurve) -> f32 {
        curve.opacity(self.progress)
    }

    pub fn is_degenerate(&self) -> bool {
        self.start_node == self.end_node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn spawned_particles_are_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let p = Particle::spawn(&mut rng, 5, [0.005, 0.015]);
            assert!(p.start_node < 5 && p.end_node < 5);
            assert!((0.0..1.0).contains(&p.progress));
            assert!((0.005..0.015).contains(&p.speed));
        }
    }

    #[test]
    fn large_overshoot_still_resets_to_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = Particle { start_node: 0, end_node: 1, progress: 0.9, speed: 7.5 };
        assert!(p.advance(&mut rng, 4));
        assert_eq!(p.progress, 0.0);
        assert!(p.start_node < 4 && p.end_node < 4);
        // 0 + 7.5 overflows again; the reset is the same every time
        assert!(p.advance(&mut rng, 4));
        assert_eq!(p.progress, 0.0);
    }

    #[test]
    fn exactly_one_wraps() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut p = Particle { start_node: 0, end_node: 0, progress: 0.75, speed: 0.25 };
        assert!(p.advance(&mut rng, 1));
        assert_eq!(p.progress, 0.0);
    }

    #[test]
    fn small_steps_do_not_wrap() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut p = Particle { start_node: 1, end_node: 2, progress: 0.5, speed: 0.01 };
        assert!(!p.advance(&mut rng, 3));
        assert!((p.progress - 0.51).abs() < 1e-6);
        assert_eq!((p.start_node, p.end_node), (1, 2));
    }

    #[test]
    fn self_edge_stays_on_node() {
        let node = Vec2::new(120.0, 80.0);
        let mut p = Particle { start_node: 3, end_node: 3, progress: 0.0, speed: 0.1 };
        while p.progress < 0.95 {
            assert_eq!(p.position(node, node), node);
            p.progress += p.speed;
        }
        assert!(p.is_degenerate());
    }

    #[test]
    fn opacity_peaks_mid_edge() {
        let mut p = Particle { start_node: 0, end_node: 1, progress: 0.5, speed: 0.1 };
        assert!((p.opacity(OpacityCurve::Sine) - 1.0).abs() < 1e-6);
        p.progress = 0.0;
        assert_eq!(p.opacity(OpacityCurve::Sine), 0.0);
    }
}
