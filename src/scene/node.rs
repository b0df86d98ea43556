// src/scene/node.rs
use glam::Vec3;

/// A point of the synthetic network. Positions never change after generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Model-space position, centred on the origin.
    pub position: Vec3,
    /// Base radius before perspective scaling.
    pub size: f32,
    /// Outgoing links. Never contains the node's own index, never duplicates.
    pub connections: Vec<usize>,
}

impl Node {
    pub fn new(position: Vec3, size: f32) -> Self {
        Self { position, size, connections: Vec::new() }
    }

    /// Adds a link unless it points back at `own_index` or already exists.
    pub fn connect(&mut self, own_index: usize, target: usize) -> bool {
        if target == own_index || self.connections.contains(&target) {
            return false;
        }
        self.connections.push(target);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_rejects_self_and_duplicates() {
        let mut node = Node::new(Vec3::ZERO, 4.0);
        assert!(!node.connect(2, 2));
        assert!(node.connect(2, 5));
        assert!(!node.connect(2, 5));
        assert!(node.connect(2, 0));
        assert_eq!(node.connections, vec![5, 0]);
    }
}
