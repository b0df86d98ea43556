pub mod animation;
pub mod app_state;
pub mod camera;
pub mod config;
pub mod error;
pub mod models;
pub mod raster;
pub mod renderer;
pub mod scene;
pub mod scheduler;
pub mod surface;
pub mod ui_events;

#[cfg(target_arch = "wasm32")]
mod canvas;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub use animation::{AnimationPhase, Driver};
pub use app_state::{State, StarfieldState, Visualization};
pub use config::{OpacityCurve, StarfieldConfig, VisualizationConfig};
pub use error::RenderError;
pub use renderer::FrameSummary;
pub use surface::{RecordingSurface, Surface, SurfaceSize};

use bevy_color::Srgba;
use glam::Vec2;

use raster::RasterSurface;
use scheduler::ManualScheduler;

fn init_logging() {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            console_error_panic_hook::set_once();
            console_log::init_with_level(log::Level::Info).ok();
        } else {
            // tolerate a logger installed by an embedding binary or test
            let _ = env_logger::try_init();
        }
    }
}

/// Renders `frames` frames of the network graph off-screen while a synthetic
/// pointer circles the viewport, and returns the surface holding the last one.
pub fn render_headless(config: VisualizationConfig, frames: usize, size: SurfaceSize) -> RasterSurface {
    let surface = RasterSurface::new(size).with_background(Srgba::rgb_u8(18, 18, 18));
    let mut driver = Driver::new(State::new(config), surface, ManualScheduler::new());
    let pointer = driver.interaction_feed();
    let viewport = Vec2::new(size.width, size.height);
    pointer.set_viewport(viewport.x, viewport.y);

    driver.start();
    for frame in 0..frames {
        if driver.scheduler.fire().is_none() {
            break;
        }
        let angle = frame as f32 * 0.02;
        let position = viewport / 2.0 + Vec2::new(angle.cos(), angle.sin()) * viewport * 0.4;
        pointer.set_pointer(position.x, position.y);
        driver.on_frame();
    }
    driver.stop();

    if let Some(summary) = driver.last_summary {
        log::info!(
            "Last frame: {} nodes, {} links, {} particles, {} culled.",
            summary.nodes_drawn,
            summary.connections_drawn,
            summary.particles_drawn,
            summary.culled
        );
    }
    driver.surface
}

/// Native entry point: `netorbit [config.json|-] [frames] [out.png]`.
#[cfg(not(target_arch = "wasm32"))]
pub fn run() -> anyhow::Result<()> {
    use anyhow::Context;

    init_logging();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) if path != "-" => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("failed to read config {path}"))?;
            VisualizationConfig::from_json(&json)?
        }
        _ => VisualizationConfig::default(),
    };
    let frames = args
        .next()
        .map(|s| s.parse::<usize>())
        .transpose()
        .context("frame count must be a non-negative integer")?
        .unwrap_or(120);
    let output = args.next().unwrap_or_else(|| "netorbit.png".to_string());

    log::info!("Rendering {frames} frames to {output}.");
    let surface = render_headless(config, frames, SurfaceSize::new(600.0, 400.0).with_pixel_ratio(2.0));
    surface.save_png(&output)?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
pub fn run() -> anyhow::Result<()> {
    init_logging();
    log::info!("Starting netorbit.");
    web::auto_mount();
    Ok(())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    run().map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{e:#}")))
}
