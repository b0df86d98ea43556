// src/web.rs
// 浏览器入口：挂载画布、requestAnimationFrame 调度与 JS 句柄
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::animation::Driver;
use crate::app_state::{State, StarfieldState, Visualization};
use crate::canvas::CanvasSurface;
use crate::config::{StarfieldConfig, VisualizationConfig};
use crate::error::RenderError;
use crate::scheduler::{FrameHandle, FrameScheduler};
use crate::ui_events::{HostCommand, InteractionFeed};

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;
type WebDriver = Driver<Box<dyn Visualization>, CanvasSurface, RafScheduler>;

/// `requestAnimationFrame` / `cancelAnimationFrame` on the page's window.
pub struct RafScheduler {
    window: web_sys::Window,
    // The closure lives here so it can hand itself to the next request.
    callback: FrameCallback,
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> Result<FrameHandle, RenderError> {
        let callback = self.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return Err(RenderError::Scheduler("frame callback not installed".into()));
        };
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map(FrameHandle)
            .map_err(|e| RenderError::Scheduler(format!("{e:?}")))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(e) = self.window.cancel_animation_frame(handle.0) {
            log::warn!("cancelAnimationFrame failed: {:?}", e);
        }
    }
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn mount(canvas_id: &str, visualization: Box<dyn Visualization>) -> Result<VisualizationHandle, JsValue> {
    let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
    let surface = CanvasSurface::from_element_id(canvas_id).map_err(|e| {
        log::error!("Not mounting {}: {e}", visualization.name());
        js_error(e)
    })?;

    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let scheduler = RafScheduler { window: window.clone(), callback: callback.clone() };
    let driver = Rc::new(RefCell::new(Driver::new(visualization, surface, scheduler)));

    // Weak, so dropping the handle ends the loop instead of leaking it.
    let weak: Weak<RefCell<WebDriver>> = Rc::downgrade(&driver);
    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if let Some(driver) = weak.upgrade() {
            driver.borrow_mut().on_frame();
        }
    }) as Box<dyn FnMut()>));

    let sender = driver.borrow().sender();
    install_listeners(&window, driver.borrow().interaction_feed())?;

    driver.borrow_mut().start();
    log::info!("Mounted {} on #{}.", driver.borrow().visualization.name(), canvas_id);
    Ok(VisualizationHandle { driver, sender })
}

/// Document pointer tracking and window resize. Both overwrite the shared
/// snapshot; the canvas itself is re-measured at the start of every frame.
fn install_listeners(window: &web_sys::Window, feed: InteractionFeed) -> Result<(), JsValue> {
    let set_viewport = |w: &web_sys::Window, feed: &InteractionFeed| {
        let width = w.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
        let height = w.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
        feed.set_viewport(width, height);
    };
    set_viewport(window, &feed);

    let document = window.document().ok_or_else(|| js_error("no document"))?;
    let pointer_feed = feed.clone();
    let on_move = Closure::wrap(Box::new(move |ev: web_sys::MouseEvent| {
        pointer_feed.set_pointer(ev.client_x() as f32, ev.client_y() as f32);
    }) as Box<dyn FnMut(_)>);
    document.add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())?;
    on_move.forget();

    let resize_window = window.clone();
    let on_resize = Closure::wrap(Box::new(move || {
        set_viewport(&resize_window, &feed);
    }) as Box<dyn FnMut()>);
    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    on_resize.forget();
    Ok(())
}

#[wasm_bindgen]
pub struct VisualizationHandle {
    driver: Rc<RefCell<WebDriver>>,
    sender: flume::Sender<HostCommand>,
}

#[wasm_bindgen]
impl VisualizationHandle {
    pub fn start(&self) {
        self.driver.borrow_mut().start();
    }

    pub fn stop(&self) {
        self.driver.borrow_mut().stop();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.driver.borrow().is_running()
    }

    pub fn fps(&self) -> u32 {
        self.driver.borrow().clock.current_fps
    }

    /// Replaces the configuration. Applied on the next frame, or right away when stopped.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&self, config_json: &str) -> Result<(), JsValue> {
        let command = if self.driver.borrow().visualization.name() == "starfield" {
            HostCommand::SetStarfieldConfig(StarfieldConfig::from_json(config_json).map_err(|e| js_error(format!("{e:#}")))?)
        } else {
            HostCommand::SetConfig(VisualizationConfig::from_json(config_json).map_err(|e| js_error(format!("{e:#}")))?)
        };
        self.sender.send(command).map_err(|_| js_error("visualization is gone"))?;

        let mut driver = self.driver.borrow_mut();
        if !driver.is_running() {
            driver.process_commands();
        }
        Ok(())
    }
}

#[wasm_bindgen(js_name = mountNetworkGraph)]
pub fn mount_network_graph(canvas_id: &str, config_json: Option<String>) -> Result<VisualizationHandle, JsValue> {
    let config = match config_json {
        Some(json) => VisualizationConfig::from_json(&json).map_err(|e| js_error(format!("{e:#}")))?,
        None => VisualizationConfig::default(),
    };
    mount(canvas_id, Box::new(State::new(config)))
}

#[wasm_bindgen(js_name = mountStarfield)]
pub fn mount_starfield(canvas_id: &str, config_json: Option<String>) -> Result<VisualizationHandle, JsValue> {
    let config = match config_json {
        Some(json) => StarfieldConfig::from_json(&json).map_err(|e| js_error(format!("{e:#}")))?,
        None => StarfieldConfig::default(),
    };
    mount(canvas_id, Box::new(StarfieldState::new(config)))
}

thread_local! {
    static AUTO_MOUNTED: RefCell<Vec<VisualizationHandle>> = const { RefCell::new(Vec::new()) };
}

/// Mounts the page's default canvases when they exist. A missing canvas
/// leaves its static fallback content alone.
pub(crate) fn auto_mount() {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let targets: [(&str, fn(&str, Option<String>) -> Result<VisualizationHandle, JsValue>); 2] =
        [("dataVisualization", mount_network_graph), ("particlesCanvas", mount_starfield)];

    for (canvas_id, mount_fn) in targets {
        if document.get_element_by_id(canvas_id).is_none() {
            continue;
        }
        match mount_fn(canvas_id, None) {
            Ok(handle) => AUTO_MOUNTED.with(|mounted| mounted.borrow_mut().push(handle)),
            Err(e) => log::error!("Auto-mount of #{canvas_id} failed: {:?}", e),
        }
    }
}

/// Stops every auto-mounted visualization (e.g. before the page unloads).
#[wasm_bindgen(js_name = stopAll)]
pub fn stop_all() {
    AUTO_MOUNTED.with(|mounted| {
        for handle in mounted.borrow().iter() {
            handle.stop();
        }
    });
}

impl Drop for VisualizationHandle {
    fn drop(&mut self) {
        // the frame callback dies with the driver; no request may outlive it
        if let Ok(mut driver) = self.driver.try_borrow_mut() {
            driver.stop();
        }
    }
}
