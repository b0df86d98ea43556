// src/app_state.rs
// 每个可视化的状态与帧率统计
use instant::Instant;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::camera::RotationState;
use crate::config::{StarfieldConfig, VisualizationConfig};
use crate::error::RenderError;
use crate::renderer::{self, FrameSummary};
use crate::scene::network::Network;
use crate::scene::starfield::Starfield;
use crate::surface::Surface;
use crate::ui_events::{HostCommand, InteractionSnapshot};

/// Something the animation driver can tick once per display refresh.
pub trait Visualization {
    fn name(&self) -> &'static str;

    /// Handles configuration commands. Pointer, resize and start/stop
    /// commands are consumed by the driver before they get here.
    fn process_command(&mut self, command: HostCommand);

    fn render_frame(
        &mut self,
        surface: &mut dyn Surface,
        interaction: &InteractionSnapshot,
    ) -> Result<FrameSummary, RenderError>;
}

impl<V: Visualization + ?Sized> Visualization for Box<V> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn process_command(&mut self, command: HostCommand) {
        (**self).process_command(command)
    }

    fn render_frame(
        &mut self,
        surface: &mut dyn Surface,
        interaction: &InteractionSnapshot,
    ) -> Result<FrameSummary, RenderError> {
        (**self).render_frame(surface, interaction)
    }
}

pub(crate) fn fresh_seed() -> u64 {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            (js_sys::Math::random() * u64::MAX as f64) as u64
        } else {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0x5eed)
        }
    }
}

/// The rotating network graph: scene, rotation and the random source that
/// recycles particles.
pub struct State {
    pub config: VisualizationConfig,
    pub network: Network,
    pub rotation: RotationState,
    pub seed: u64,
    rng: StdRng,
}

impl State {
    pub fn new(config: VisualizationConfig) -> Self {
        let seed = config.seed.unwrap_or_else(fresh_seed);
        let mut rng = StdRng::seed_from_u64(seed);
        let network = Network::generate(&config, &mut rng);
        log::info!("Network graph state created (seed {seed}).");
        Self {
            rotation: RotationState::new(config.base_pitch),
            config,
            network,
            seed,
            rng,
        }
    }

    /// Regenerates the scene under a new config. Rotation carries over.
    pub fn apply_config(&mut self, config: VisualizationConfig) {
        if let Err(e) = config.validate() {
            log::warn!("Rejected visualization config: {e:#}");
            return;
        }
        self.seed = config.seed.unwrap_or_else(fresh_seed);
        self.rng = StdRng::seed_from_u64(self.seed);
        self.network = Network::generate(&config, &mut self.rng);
        self.config = config;
    }
}

impl Visualization for State {
    fn name(&self) -> &'static str {
        "network-graph"
    }

    fn process_command(&mut self, command: HostCommand) {
        match command {
            HostCommand::SetConfig(config) => self.apply_config(config),
            other => log::debug!("Network graph ignoring command: {:?}", other),
        }
    }

    fn render_frame(
        &mut self,
        surface: &mut dyn Surface,
        interaction: &InteractionSnapshot,
    ) -> Result<FrameSummary, RenderError> {
        renderer::render_network_frame(
            surface,
            &mut self.network,
            &mut self.rotation,
            interaction,
            &self.config,
            &mut self.rng,
        )
    }
}

/// Background layer of drifting particles.
pub struct StarfieldState {
    pub config: StarfieldConfig,
    pub starfield: Option<Starfield>,
    rng: StdRng,
}

impl StarfieldState {
    pub fn new(config: StarfieldConfig) -> Self {
        let seed = config.seed.unwrap_or_else(fresh_seed);
        Self { config, starfield: None, rng: StdRng::seed_from_u64(seed) }
    }
}

impl Visualization for StarfieldState {
    fn name(&self) -> &'static str {
        "starfield"
    }

    fn process_command(&mut self, command: HostCommand) {
        match command {
            HostCommand::SetStarfieldConfig(config) => {
                if let Err(e) = config.validate() {
                    log::warn!("Rejected starfield config: {e:#}");
                    return;
                }
                if let Some(seed) = config.seed {
                    self.rng = StdRng::seed_from_u64(seed);
                }
                self.config = config;
                // regenerated against the surface size on the next frame
                self.starfield = None;
            }
            other => log::debug!("Starfield ignoring command: {:?}", other),
        }
    }

    fn render_frame(
        &mut self,
        surface: &mut dyn Surface,
        interaction: &InteractionSnapshot,
    ) -> Result<FrameSummary, RenderError> {
        let viewport = surface.size();
        // Stars are scattered over the surface, so wait for a real size.
        if self.starfield.is_none() && viewport.is_empty() {
            surface.clear();
            return Err(RenderError::DegenerateGeometry {
                width: viewport.width,
                height: viewport.height,
                focal_length: self.config.far_plane,
            });
        }
        let starfield = self
            .starfield
            .get_or_insert_with(|| Starfield::generate(&self.config, viewport, &mut self.rng));
        renderer::render_starfield_frame(surface, starfield, interaction, &self.config, &mut self.rng)
    }
}

/// Frames-per-second counter, refreshed once a second.
#[derive(Debug)]
pub struct FrameClock {
    last_frame_instant: Instant,
    frame_count_in_second: u32,
    pub current_fps: u32,
    pub total_frames: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_frame_instant: Instant::now(),
            frame_count_in_second: 0,
            current_fps: 0,
            total_frames: 0,
        }
    }

    /// Counts a frame; returns the new FPS value when a second has elapsed.
    pub fn tick(&mut self) -> Option<u32> {
        self.frame_count_in_second += 1;
        self.total_frames += 1;
        let now = Instant::now();
        let elapsed = (now - self.last_frame_instant).as_secs_f32();

        if elapsed >= 1.0 {
            self.current_fps = self.frame_count_in_second;
            self.frame_count_in_second = 0;
            self.last_frame_instant = now;
            return Some(self.current_fps);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    #[test]
    fn fixed_seed_is_reproducible() {
        let config = VisualizationConfig { seed: Some(1234), ..Default::default() };
        let a = State::new(config.clone());
        let b = State::new(config);
        assert_eq!(a.seed, 1234);
        assert_eq!(a.network.nodes, b.network.nodes);
    }

    #[test]
    fn new_config_regenerates_but_keeps_rotation() {
        let mut state = State::new(VisualizationConfig { seed: Some(1), ..Default::default() });
        let mut surface = RecordingSurface::new(300.0, 300.0);
        for _ in 0..5 {
            state.render_frame(&mut surface, &InteractionSnapshot::default()).unwrap();
        }
        let yaw = state.rotation.yaw;

        state.process_command(HostCommand::SetConfig(VisualizationConfig {
            node_count: 4,
            seed: Some(2),
            ..Default::default()
        }));
        assert_eq!(state.network.nodes.len(), 4);
        assert_eq!(state.rotation.yaw, yaw);
    }

    #[test]
    fn invalid_config_is_ignored() {
        let mut state = State::new(VisualizationConfig { seed: Some(1), ..Default::default() });
        state.apply_config(VisualizationConfig { focal_length: f32::NAN, ..Default::default() });
        assert_eq!(state.config.focal_length, 600.0);
        assert_eq!(state.network.nodes.len(), 12);
    }

    #[test]
    fn starfield_waits_for_a_sized_surface() {
        let mut state = StarfieldState::new(StarfieldConfig { seed: Some(3), ..Default::default() });
        let mut surface = RecordingSurface::new(0.0, 0.0);
        assert!(state.render_frame(&mut surface, &InteractionSnapshot::default()).is_err());
        assert!(state.starfield.is_none());

        surface.resize(320.0, 200.0);
        surface.sync_size();
        let summary = state.render_frame(&mut surface, &InteractionSnapshot::default()).unwrap();
        let field = state.starfield.as_ref().unwrap();
        assert_eq!(field.stars.len(), 50);
        assert_eq!(summary.particles_drawn, field.sprites(&state.config, surface.size()).count());
    }

    #[test]
    fn frame_clock_counts_frames() {
        let mut clock = FrameClock::new();
        clock.tick();
        clock.tick();
        assert_eq!(clock.total_frames, 2);
    }
}
