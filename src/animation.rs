// src/animation.rs
// 动画驱动：显式的 start/stop，每次最多只有一个待执行的帧请求
use crate::app_state::{FrameClock, Visualization};
use crate::renderer::FrameSummary;
use crate::scheduler::{FrameHandle, FrameScheduler};
use crate::surface::Surface;
use crate::ui_events::{HostCommand, InteractionFeed, InteractionSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPhase {
    Idle,
    Running,
}

/// Owns a visualization together with its surface and scheduler, and runs
/// it one frame per host refresh until stopped.
pub struct Driver<V, S, H> {
    pub visualization: V,
    pub surface: S,
    pub scheduler: H,
    interaction: InteractionFeed,
    pub clock: FrameClock,
    pub last_summary: Option<FrameSummary>,
    commands_tx: flume::Sender<HostCommand>,
    commands_rx: flume::Receiver<HostCommand>,
    phase: AnimationPhase,
    pending: Option<FrameHandle>,
    degenerate: bool,
}

impl<V, S, H> Driver<V, S, H>
where
    V: Visualization,
    S: Surface,
    H: FrameScheduler,
{
    pub fn new(visualization: V, surface: S, scheduler: H) -> Self {
        let (commands_tx, commands_rx) = flume::unbounded();
        Self {
            visualization,
            surface,
            scheduler,
            interaction: InteractionFeed::default(),
            clock: FrameClock::new(),
            last_summary: None,
            commands_tx,
            commands_rx,
            phase: AnimationPhase::Idle,
            pending: None,
            degenerate: false,
        }
    }

    /// Handle for event listeners; commands are applied at the start of the next frame.
    pub fn sender(&self) -> flume::Sender<HostCommand> {
        self.commands_tx.clone()
    }

    /// Shared pointer/viewport slot for host listeners. Writes never queue.
    pub fn interaction_feed(&self) -> InteractionFeed {
        self.interaction.clone()
    }

    pub fn interaction(&self) -> InteractionSnapshot {
        self.interaction.snapshot()
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == AnimationPhase::Running
    }

    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        log::info!("Starting {} animation.", self.visualization.name());
        self.phase = AnimationPhase::Running;
        self.schedule_next();
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        if self.is_running() {
            log::info!("Stopped {} animation after {} frames.", self.visualization.name(), self.clock.total_frames);
        }
        self.phase = AnimationPhase::Idle;

        // Nothing drains the channel while idle, so settle what is queued now.
        while let Ok(command) = self.commands_rx.try_recv() {
            if !matches!(command, HostCommand::Start | HostCommand::Stop) {
                self.apply_command(command);
            }
        }
    }

    /// Applies queued host commands. Pointer and viewport updates overwrite
    /// the snapshot, so only the latest position survives.
    pub fn process_commands(&mut self) {
        while let Ok(command) = self.commands_rx.try_recv() {
            self.apply_command(command);
        }
    }

    fn apply_command(&mut self, command: HostCommand) {
        if self.interaction.apply(&command) {
            return;
        }
        match command {
            HostCommand::Start => self.start(),
            HostCommand::Stop => self.stop(),
            HostCommand::SurfaceResized => {
                self.sync_surface();
            }
            other => self.visualization.process_command(other),
        }
    }

    /// Frame callback. Stale callbacks (after `stop`) are ignored.
    pub fn on_frame(&mut self) -> Option<FrameSummary> {
        self.pending = None;
        if !self.is_running() {
            log::debug!("Frame callback for idle {} ignored.", self.visualization.name());
            return None;
        }

        self.process_commands();
        if !self.is_running() {
            return None;
        }
        self.sync_surface();

        let interaction = self.interaction.snapshot();
        let summary = match self.visualization.render_frame(&mut self.surface, &interaction) {
            Ok(summary) => {
                if self.degenerate {
                    log::info!("{} surface usable again.", self.visualization.name());
                    self.degenerate = false;
                }
                Some(summary)
            }
            Err(e) if e.is_transient() => {
                if !self.degenerate {
                    log::warn!("Skipping {} frames: {e}", self.visualization.name());
                    self.degenerate = true;
                }
                None
            }
            Err(e) => {
                log::error!("{} frame failed: {e}", self.visualization.name());
                None
            }
        };
        self.last_summary = summary;

        if let Some(fps) = self.clock.tick() {
            log::debug!("{} FPS: {}", self.visualization.name(), fps);
        }

        if self.is_running() {
            self.schedule_next();
        }
        summary
    }

    fn sync_surface(&mut self) -> bool {
        let resized = self.surface.sync_size();
        if resized {
            let size = self.surface.size();
            log::info!("Resize {}, {} (x{})", size.width, size.height, size.pixel_ratio);
        }
        resized
    }

    fn schedule_next(&mut self) {
        if self.pending.is_some() {
            return;
        }
        match self.scheduler.request_frame() {
            Ok(handle) => self.pending = Some(handle),
            Err(e) => {
                log::error!("Could not schedule next {} frame: {e}", self.visualization.name());
                self.phase = AnimationPhase::Idle;
            }
        }
    }
}
