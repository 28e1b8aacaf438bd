//! `requestAnimationFrame` loop and window resize wiring.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rig_core::Rig;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::dom::WebHost;
use crate::overlay::DebugHud;
use crate::render::GpuBackend;

pub type SharedRig = Rc<RefCell<Rig<WebHost, GpuBackend>>>;

type Tick = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Handle to a running frame loop. Stopping cancels the pending frame and
/// frees the callback.
pub struct FrameLoop {
    tick: Tick,
    pending: Rc<Cell<Option<i32>>>,
}

impl FrameLoop {
    pub fn stop(&self) {
        if let (Some(id), Some(w)) = (self.pending.take(), web::window()) {
            _ = w.cancel_animation_frame(id);
        }
        // never runs inside the callback: `destroy` comes from JS
        self.tick.borrow_mut().take();
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

pub fn start_loop(rig: SharedRig, hud: Rc<RefCell<Option<DebugHud>>>) -> FrameLoop {
    let tick: Tick = Rc::new(RefCell::new(None));
    let pending: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));

    let tick_clone = tick.clone();
    let pending_tick = pending.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        pending_tick.set(None);
        // a JS call into the rig may hold the borrow; skip this frame then
        let Ok(mut r) = rig.try_borrow_mut() else {
            schedule(&tick_clone, &pending_tick);
            return;
        };
        if !r.is_alive() {
            return;
        }
        r.frame();
        if let Some(h) = hud.borrow_mut().as_mut() {
            let compositor = r.compositor();
            h.update(
                r.item_count(),
                compositor.chain().mode().as_str(),
                compositor.requested_mode().as_str(),
            );
        }
        drop(r);
        schedule(&tick_clone, &pending_tick);
    }) as Box<dyn FnMut()>));

    schedule(&tick, &pending);
    FrameLoop { tick, pending }
}

fn schedule(tick: &Tick, pending: &Cell<Option<i32>>) {
    let Some(w) = web::window() else {
        return;
    };
    if let Some(cb) = tick.borrow().as_ref() {
        if let Ok(id) = w.request_animation_frame(cb.as_ref().unchecked_ref()) {
            pending.set(Some(id));
        }
    }
}

/// Window `resize` listener, removed again on drop.
pub struct ResizeHook {
    window: web::Window,
    closure: Closure<dyn FnMut()>,
}

impl ResizeHook {
    pub fn install(rig: SharedRig) -> Option<Self> {
        let window = web::window()?;
        let closure = Closure::wrap(Box::new(move || {
            if let Ok(mut r) = rig.try_borrow_mut() {
                r.handle_resize();
            }
        }) as Box<dyn FnMut()>);
        window
            .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
            .ok()?;
        Some(Self { window, closure })
    }
}

impl Drop for ResizeHook {
    fn drop(&mut self) {
        _ = self
            .window
            .remove_event_listener_with_callback("resize", self.closure.as_ref().unchecked_ref());
    }
}
