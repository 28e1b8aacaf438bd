// Per-item pointer listeners. Handlers only queue an event keyed by the item;
// the rig applies it on the next frame.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use rig_core::{ItemKey, PointerEvent, PointerKind};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::dom::WebMedia;

const POINTER_EVENTS: [(&str, PointerKind); 3] = [
    ("pointerenter", PointerKind::Enter),
    ("pointerleave", PointerKind::Leave),
    ("pointermove", PointerKind::Move),
];

/// A registered listener. Dropping it without [`detach`] leaves a dangling
/// callback in the page, so the registry always detaches first.
pub struct PointerListener {
    event: &'static str,
    closure: Closure<dyn FnMut(web::PointerEvent)>,
}

/// Listen on the media element; positions are local to the tagged element,
/// whose box the plane mirrors.
pub fn attach(
    element: &web::Element,
    media: &WebMedia,
    key: ItemKey,
    queue: &Rc<RefCell<Vec<PointerEvent>>>,
) -> Vec<PointerListener> {
    POINTER_EVENTS
        .iter()
        .filter_map(|&(event, kind)| {
            let target = element.clone();
            let queue = queue.clone();
            let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
                let rect = target.get_bounding_client_rect();
                let local = Vec2::new(
                    ev.client_x() as f32 - rect.left() as f32,
                    ev.client_y() as f32 - rect.top() as f32,
                );
                queue.borrow_mut().push(PointerEvent { key, kind, local });
            }) as Box<dyn FnMut(_)>);
            match media
                .element()
                .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            {
                Ok(()) => Some(PointerListener { event, closure }),
                Err(e) => {
                    log::warn!("[events] {event} on item {}: {:?}", key.index, e);
                    None
                }
            }
        })
        .collect()
}

pub fn detach(media: &WebMedia, listener: PointerListener) {
    _ = media
        .element()
        .remove_event_listener_with_callback(listener.event, listener.closure.as_ref().unchecked_ref());
}
