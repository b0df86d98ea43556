// src/renderer.rs
// 每帧的绘制流程：投影 -> 深度排序 -> 连线 -> 粒子 -> 节点
use rand::Rng;

use crate::camera::{Camera, ProjectedPoint, RotationState};
use crate::config::{StarfieldConfig, VisualizationConfig};
use crate::error::RenderError;
use crate::models::{GradientStop, white};
use crate::scene::network::Network;
use crate::scene::node::Node;
use crate::scene::starfield::Starfield;
use crate::surface::{Surface, SurfaceSize};
use crate::ui_events::InteractionSnapshot;

/// What one frame put on the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameSummary {
    pub nodes_drawn: usize,
    pub connections_drawn: usize,
    pub particles_drawn: usize,
    /// Nodes below the visibility floor.
    pub culled: usize,
}

/// Projects every node, in node order, so `result[i].index == i`.
pub fn project_nodes(nodes: &[Node], camera: &Camera, viewport: SurfaceSize) -> Vec<ProjectedPoint> {
    nodes
        .iter()
        .enumerate()
        .map(|(i, node)| camera.project_point(i, node.position, viewport))
        .collect()
}

/// Painter's order: farthest (largest depth) first.
pub fn depth_sort(points: &mut [ProjectedPoint]) {
    points.sort_by(|a, b| b.depth.total_cmp(&a.depth));
}

/// Lines between linked nodes, both ends above the floor. `by_index` is in node order.
pub fn draw_connections<S: Surface + ?Sized>(
    surface: &mut S,
    nodes: &[Node],
    by_index: &[ProjectedPoint],
    draw_order: &[ProjectedPoint],
    config: &VisualizationConfig,
) -> usize {
    let color = white(config.connection_alpha);
    let mut drawn = 0;
    for from in draw_order.iter().filter(|p| p.is_visible(config.visibility_floor)) {
        for &target in &nodes[from.index].connections {
            let Some(to) = by_index.get(target) else {
                continue;
            };
            if to.is_visible(config.visibility_floor) {
                surface.stroke_line(from.screen, to.screen, config.connection_width, color);
                drawn += 1;
            }
        }
    }
    drawn
}

/// Steps every particle, then draws it between its endpoints' current projections.
pub fn advance_and_draw_particles<S: Surface + ?Sized, R: Rng + ?Sized>(
    surface: &mut S,
    network: &mut Network,
    by_index: &[ProjectedPoint],
    config: &VisualizationConfig,
    rng: &mut R,
) -> usize {
    network.advance_particles(rng);

    let glow_radius = config.particle_radius + config.particle_glow_radius;
    let mut drawn = 0;
    for particle in &network.particles {
        let (Some(start), Some(end)) = (by_index.get(particle.start_node), by_index.get(particle.end_node)) else {
            continue;
        };
        // an endpoint behind the eye collapses onto the origin
        if !(start.scale > 0.0 && end.scale > 0.0) {
            continue;
        }
        let center = particle.position(start.screen, end.screen);
        let opacity = particle.opacity(config.opacity_curve);

        surface.fill_radial_glow(
            center,
            glow_radius,
            &[
                GradientStop::new(0.0, white(opacity * 0.5)),
                GradientStop::new(1.0, white(0.0)),
            ],
        );
        surface.fill_circle(center, config.particle_radius, white(opacity * config.particle_opacity));
        drawn += 1;
    }
    drawn
}

/// Glow, core and centre dot for every node above the floor. Returns `(drawn, culled)`.
pub fn draw_nodes<S: Surface + ?Sized>(
    surface: &mut S,
    nodes: &[Node],
    draw_order: &[ProjectedPoint],
    config: &VisualizationConfig,
) -> (usize, usize) {
    let mut drawn = 0;
    let mut culled = 0;
    for point in draw_order {
        if !point.is_visible(config.visibility_floor) {
            culled += 1;
            continue;
        }
        let alpha = point.depth_alpha(config.visibility_floor);
        let size = nodes[point.index].size * point.scale;

        surface.fill_radial_glow(
            point.screen,
            size * 2.0,
            &[
                GradientStop::new(0.0, white(alpha * 0.6)),
                GradientStop::new(0.5, white(alpha * 0.2)),
                GradientStop::new(1.0, white(0.0)),
            ],
        );
        surface.fill_circle(point.screen, size, white(alpha * 0.9));
        surface.fill_circle(point.screen, size * 0.4, white(alpha));
        drawn += 1;
    }
    (drawn, culled)
}

/// One complete frame of the network graph.
///
/// The rotation advances even when the geometry is degenerate, so a surface
/// that comes back picks up where the animation would have been.
pub fn render_network_frame<S: Surface + ?Sized, R: Rng + ?Sized>(
    surface: &mut S,
    network: &mut Network,
    rotation: &mut RotationState,
    interaction: &InteractionSnapshot,
    config: &VisualizationConfig,
    rng: &mut R,
) -> Result<FrameSummary, RenderError> {
    surface.clear();
    rotation.advance(config.yaw_speed, config.base_pitch, config.pitch_gain, interaction);

    let viewport = surface.size();
    let camera = Camera::new(*rotation, config.focal_length);
    if camera.is_degenerate(viewport) {
        return Err(RenderError::DegenerateGeometry {
            width: viewport.width,
            height: viewport.height,
            focal_length: config.focal_length,
        });
    }

    let by_index = project_nodes(&network.nodes, &camera, viewport);
    let mut draw_order = by_index.clone();
    depth_sort(&mut draw_order);

    let connections_drawn = draw_connections(surface, &network.nodes, &by_index, &draw_order, config);
    let particles_drawn = advance_and_draw_particles(surface, network, &by_index, config, rng);
    let (nodes_drawn, culled) = draw_nodes(surface, &network.nodes, &draw_order, config);
    surface.present();

    Ok(FrameSummary { nodes_drawn, connections_drawn, particles_drawn, culled })
}

/// One frame of the floating-particle background.
pub fn render_starfield_frame<S: Surface + ?Sized, R: Rng + ?Sized>(
    surface: &mut S,
    starfield: &mut Starfield,
    interaction: &InteractionSnapshot,
    config: &StarfieldConfig,
    rng: &mut R,
) -> Result<FrameSummary, RenderError> {
    surface.clear();
    let viewport = surface.size();
    if viewport.is_empty() {
        return Err(RenderError::DegenerateGeometry {
            width: viewport.width,
            height: viewport.height,
            focal_length: config.far_plane,
        });
    }

    starfield.advance(config, viewport, interaction.pointer, rng);
    let mut particles_drawn = 0;
    for sprite in starfield.sprites(config, viewport) {
        surface.fill_circle(sprite.center, sprite.radius, white(sprite.alpha));
        particles_drawn += 1;
    }
    surface.present();

    Ok(FrameSummary { particles_drawn, ..Default::default() })
}
