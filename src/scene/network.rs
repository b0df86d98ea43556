// src/scene/network.rs
// 随机生成的环形拓扑与粒子推进
use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use super::node::Node;
use super::particle::Particle;
use super::sample_range;
use crate::config::VisualizationConfig;

/// Synthetic network: a ring of nodes with random depth, random links and
/// particles flowing between random node pairs.
#[derive(Debug, Clone, Default)]
pub struct Network {
    pub nodes: Vec<Node>,
    pub particles: Vec<Particle>,
}

impl Network {
    pub fn generate<R: Rng + ?Sized>(config: &VisualizationConfig, rng: &mut R) -> Self {
        let node_count = config.node_count;
        let mut nodes: Vec<Node> = (0..node_count)
            .map(|i| {
                let ring_angle = TAU * i as f32 / node_count as f32;
                let depth_angle = rng.random::<f32>() * TAU;
                let radius = sample_range(rng, config.ring_radius);
                let position = Vec3::new(
                    ring_angle.cos() * radius,
                    ring_angle.sin() * radius,
                    depth_angle.cos() * config.depth_amplitude,
                );
                Node::new(position, sample_range(rng, config.node_size))
            })
            .collect();

        // 1..=3 links per node, each to another node picked uniformly
        if node_count >= 2 {
            for (i, node) in nodes.iter_mut().enumerate() {
                let link_count = rng.random_range(1..=3);
                for _ in 0..link_count {
                    let target = (i + rng.random_range(1..node_count)) % node_count;
                    node.connect(i, target);
                }
            }
        }

        let particles = if node_count == 0 {
            if config.particle_count > 0 {
                log::debug!("No nodes to carry {} particles; scene left empty.", config.particle_count);
            }
            Vec::new()
        } else {
            (0..config.particle_count)
                .map(|_| Particle::spawn(rng, node_count, config.particle_speed))
                .collect()
        };

        log::info!(
            "Generated network with {} nodes, {} links and {} particles.",
            nodes.len(),
            nodes.iter().map(|n| n.connections.len()).sum::<usize>(),
            particles.len()
        );

        Self { nodes, particles }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Steps every particle; returns how many were recycled onto new edges.
    pub fn advance_particles<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let node_count = self.nodes.len();
        self.particles
            .iter_mut()
            .map(|p| usize::from(p.advance(rng, node_count)))
            .sum()
    }

    /// Iterator over `(from, to)` node indices of every link.
    pub fn links(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .flat_map(|(i, node)| node.connections.iter().map(move |&t| (i, t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config(node_count: usize, particle_count: usize) -> VisualizationConfig {
        VisualizationConfig { node_count, particle_count, ..Default::default() }
    }

    #[test]
    fn connections_are_valid_for_many_sizes_and_seeds() {
        for node_count in 2..20 {
            for seed in 0..10 {
                let mut rng = StdRng::seed_from_u64(seed);
                let network = Network::generate(&config(node_count, 5), &mut rng);
                for (i, node) in network.nodes.iter().enumerate() {
                    assert!(!node.connections.is_empty() && node.connections.len() <= 3);
                    for &target in &node.connections {
                        assert!(target < node_count);
                        assert_ne!(target, i);
                    }
                    let mut unique = node.connections.clone();
                    unique.sort_unstable();
                    unique.dedup();
                    assert_eq!(unique.len(), node.connections.len());
                }
            }
        }
    }

    #[test]
    fn single_node_has_no_connections() {
        let mut rng = StdRng::seed_from_u64(11);
        let network = Network::generate(&config(1, 4), &mut rng);
        assert_eq!(network.nodes.len(), 1);
        assert!(network.nodes[0].connections.is_empty());
        assert!(network.particles.iter().all(|p| p.start_node == 0 && p.end_node == 0));
    }

    #[test]
    fn empty_scene_has_no_particles() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut network = Network::generate(&config(0, 20), &mut rng);
        assert!(network.is_empty());
        assert!(network.particles.is_empty());
        assert_eq!(network.advance_particles(&mut rng), 0);
    }

    #[test]
    fn same_seed_same_topology() {
        let a = Network::generate(&config(12, 20), &mut StdRng::seed_from_u64(99));
        let b = Network::generate(&config(12, 20), &mut StdRng::seed_from_u64(99));
        assert_eq!(a.nodes, b.nodes);
        assert_eq!(a.particles, b.particles);
    }

    #[test]
    fn nodes_lie_on_the_ring() {
        let cfg = config(12, 0);
        let network = Network::generate(&cfg, &mut StdRng::seed_from_u64(5));
        for node in &network.nodes {
            let planar = node.position.truncate().length();
            assert!(planar >= cfg.ring_radius[0] - 1e-3 && planar <= cfg.ring_radius[1] + 1e-3);
            assert!(node.position.z.abs() <= cfg.depth_amplitude + 1e-3);
            assert!(node.size >= cfg.node_size[0] && node.size <= cfg.node_size[1]);
        }
    }

    #[test]
    fn particles_stay_below_one_after_every_step() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut cfg = config(6, 30);
        cfg.particle_speed = [0.3, 2.5];
        let mut network = Network::generate(&cfg, &mut rng);
        for _ in 0..200 {
            network.advance_particles(&mut rng);
            for p in &network.particles {
                assert!((0.0..1.0).contains(&p.progress));
                assert!(p.start_node < 6 && p.end_node < 6);
            }
        }
    }
}
