#![cfg(target_arch = "wasm32")]

mod dom;
mod events;
mod frame;
mod options;
mod overlay;
mod render;

use std::cell::RefCell;
use std::rc::Rc;

use rig_core::{Rig, RigError, ScaleTuning, ShaderTuning};
use wasm_bindgen::prelude::*;

use crate::dom::WebHost;
use crate::frame::{FrameLoop, ResizeHook, SharedRig};
use crate::overlay::DebugHud;
use crate::render::GpuBackend;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("scroll-rig loaded");
    Ok(())
}

struct Running {
    rig: SharedRig,
    frame_loop: FrameLoop,
    resize: Option<ResizeHook>,
    hud: Rc<RefCell<Option<DebugHud>>>,
}

impl Drop for Running {
    // also reached when JS frees the handle without calling `destroy`
    fn drop(&mut self) {
        self.frame_loop.stop();
        self.resize.take();
        if let Ok(mut r) = self.rig.try_borrow_mut() {
            r.destroy();
            r.host().unmount();
        }
        if let Some(hud) = self.hud.borrow_mut().take() {
            hud.remove();
        }
    }
}

/// JS handle to one overlay. A rig that failed to start is inert: every
/// method is a no-op.
#[wasm_bindgen]
pub struct ScrollRig {
    inner: Option<Running>,
}

/// Mount an overlay over `options.containerElement` and start rendering.
/// Never rejects; failures are logged and yield an inert rig.
#[wasm_bindgen(js_name = createScrollRig)]
pub async fn create_scroll_rig(options: JsValue) -> ScrollRig {
    match build(&options).await {
        Ok(running) => ScrollRig { inner: Some(running) },
        Err(e) => {
            log::error!("[rig] {e}; rig is inert");
            ScrollRig { inner: None }
        }
    }
}

async fn build(options: &JsValue) -> Result<Running, RigError> {
    let (container, config) = options::parse_options(options)?;
    if config.debug_panel {
        log::set_max_level(log::LevelFilter::Debug);
    }

    let host = WebHost::mount(container).map_err(|e| RigError::Configuration(format!("{e:#}")))?;
    let backend = match GpuBackend::new(host.canvas().clone(), config.shader_source.as_deref()).await {
        Ok(b) => b,
        Err(e) => {
            host.unmount();
            return Err(RigError::Gpu(format!("{e:#}")));
        }
    };

    let canvas = host.canvas().clone();
    let container = host.container().clone();
    let debug_panel = config.debug_panel;
    let rig = match Rig::new(host, backend, config) {
        Ok(r) => r,
        Err(e) => {
            // the host went down with the failed rig; take the overlay out too
            if let Some(scroller) = canvas.parent_element() {
                scroller.remove();
            }
            return Err(e);
        }
    };
    log::info!("[rig] started with {} items", rig.item_count());

    let rig: SharedRig = Rc::new(RefCell::new(rig));
    let hud = Rc::new(RefCell::new(if debug_panel { DebugHud::mount(&container) } else { None }));
    let resize = ResizeHook::install(rig.clone());
    if resize.is_none() {
        log::warn!("[rig] window resize listener unavailable");
    }
    let frame_loop = frame::start_loop(rig.clone(), hud.clone());
    Ok(Running {
        rig,
        frame_loop,
        resize,
        hud,
    })
}

#[wasm_bindgen]
impl ScrollRig {
    /// Vertical offset reported by an external smooth-scroll controller, in
    /// CSS pixels. Applied on the next frame.
    #[wasm_bindgen(js_name = setScroll)]
    pub fn set_scroll(&self, y: f32) {
        self.with_rig(|r| r.host_mut().set_scroll_offset(y));
    }

    /// Recompute bounds, rebuild every item and render once.
    pub fn resize(&self) {
        self.with_rig(|r| r.handle_resize());
    }

    /// Rebuild the item set from the current DOM. Returns the item count.
    pub fn rescan(&self) -> u32 {
        self.with_rig(|r| r.rescan() as u32).unwrap_or(0)
    }

    /// Missing keys take their default values.
    #[wasm_bindgen(js_name = setShaderTuning)]
    pub fn set_shader_tuning(&self, tuning: JsValue) {
        match options::parse_partial::<ShaderTuning>(&tuning) {
            Ok(t) => {
                self.with_rig(|r| r.set_shader_tuning(t));
            }
            Err(e) => log::warn!("[rig] shader tuning ignored: {e}"),
        }
    }

    #[wasm_bindgen(js_name = setScaleTuning)]
    pub fn set_scale_tuning(&self, tuning: JsValue) {
        match options::parse_partial::<ScaleTuning>(&tuning) {
            Ok(t) => {
                self.with_rig(|r| r.set_scale_tuning(t));
            }
            Err(e) => log::warn!("[rig] scale tuning ignored: {e}"),
        }
    }

    #[wasm_bindgen(js_name = itemCount)]
    pub fn item_count(&self) -> u32 {
        self.with_rig(|r| r.item_count() as u32).unwrap_or(0)
    }

    #[wasm_bindgen(getter)]
    pub fn active(&self) -> bool {
        self.inner.is_some()
    }

    /// Stop rendering, restore the page and release GPU resources.
    pub fn destroy(&mut self) {
        // teardown lives in `Running::drop`
        self.inner = None;
    }
}

impl ScrollRig {
    fn with_rig<T>(&self, f: impl FnOnce(&mut Rig<WebHost, GpuBackend>) -> T) -> Option<T> {
        let running = self.inner.as_ref()?;
        let mut r = running.rig.try_borrow_mut().ok()?;
        Some(f(&mut r))
    }
}
