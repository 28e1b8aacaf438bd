//! The page side of the rig: mounts the overlay canvas and answers layout
//! queries for the registry.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::anyhow;
use rig_core::{DomHost, ItemKey, MediaKind, PixelBox, PointerEvent};
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::events::{self, PointerListener};

const SCROLLER_STYLE: &str = "position:absolute;left:0;top:0;width:100%;height:100%;pointer-events:none;";
const CANVAS_STYLE: &str = "display:block;width:100%;height:100%;";

/// The primary media element of a tagged item.
#[derive(Clone, Debug)]
pub enum WebMedia {
    Image(web::HtmlImageElement),
    Video(web::HtmlVideoElement),
}

impl WebMedia {
    pub fn element(&self) -> &web::HtmlElement {
        match self {
            WebMedia::Image(img) => img.as_ref(),
            WebMedia::Video(video) => video.as_ref(),
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            WebMedia::Image(_) => MediaKind::Image,
            WebMedia::Video(_) => MediaKind::Video,
        }
    }
}

pub struct WebHost {
    window: web::Window,
    container: web::HtmlElement,
    scroller: web::HtmlElement,
    canvas: web::HtmlCanvasElement,
    queue: Rc<RefCell<Vec<PointerEvent>>>,
    scroll_offset: f32,
}

impl WebHost {
    /// Append `div.scroller > canvas` to `container`.
    pub fn mount(container: web::HtmlElement) -> anyhow::Result<Self> {
        let window = web::window().ok_or_else(|| anyhow!("no window"))?;
        let document = window.document().ok_or_else(|| anyhow!("no document"))?;

        let scroller: web::HtmlElement = document
            .create_element("div")
            .and_then(|el| el.dyn_into::<web::HtmlElement>().map_err(Into::into))
            .map_err(|e| anyhow!(format!("{:?}", e)))?;
        _ = scroller.class_list().add_1("scroller");
        _ = scroller.set_attribute("style", SCROLLER_STYLE);

        let canvas: web::HtmlCanvasElement = document
            .create_element("canvas")
            .and_then(|el| el.dyn_into::<web::HtmlCanvasElement>().map_err(Into::into))
            .map_err(|e| anyhow!(format!("{:?}", e)))?;
        _ = canvas.set_attribute("style", CANVAS_STYLE);

        scroller
            .append_child(&canvas)
            .and_then(|_| container.append_child(&scroller))
            .map_err(|e| anyhow!(format!("{:?}", e)))?;

        let rect = scroller.get_bounding_client_rect();
        sync_canvas_backing_size(&canvas, rect.width() as f32, rect.height() as f32);

        Ok(Self {
            window,
            container,
            scroller,
            canvas,
            queue: Rc::new(RefCell::new(Vec::new())),
            scroll_offset: 0.0,
        })
    }

    /// Take the overlay back out of the page.
    pub fn unmount(&self) {
        self.scroller.remove();
    }

    #[inline]
    pub fn canvas(&self) -> &web::HtmlCanvasElement {
        &self.canvas
    }

    #[inline]
    pub fn container(&self) -> &web::HtmlElement {
        &self.container
    }

    /// Vertical offset from an external smooth-scroll controller that layout
    /// does not reflect yet.
    #[inline]
    pub fn set_scroll_offset(&mut self, y: f32) {
        self.scroll_offset = if y.is_finite() { y } else { 0.0 };
    }

    fn origin(&self) -> (f32, f32) {
        let r = self.scroller.get_bounding_client_rect();
        (r.left() as f32, r.top() as f32)
    }
}

impl DomHost for WebHost {
    type Element = web::Element;
    type Media = WebMedia;
    type Listener = PointerListener;

    fn container_box(&self) -> Option<PixelBox> {
        if !self.scroller.is_connected() {
            return None;
        }
        let r = self.scroller.get_bounding_client_rect();
        Some(PixelBox::new(
            r.left() as f32,
            r.top() as f32,
            r.width() as f32,
            r.height() as f32,
        ))
    }

    fn query_items(&self, selector: &str) -> Vec<web::Element> {
        let list = match self.container.query_selector_all(selector) {
            Ok(list) => list,
            Err(e) => {
                log::warn!("[dom] bad item selector `{selector}`: {:?}", e);
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<web::Element>().ok())
            .collect()
    }

    fn resolve_media(&self, element: &web::Element) -> Option<(WebMedia, MediaKind)> {
        let media = if let Some(img) = element.dyn_ref::<web::HtmlImageElement>() {
            WebMedia::Image(img.clone())
        } else if let Some(img) = first_of::<web::HtmlImageElement>(element, "img") {
            WebMedia::Image(img)
        } else {
            WebMedia::Video(first_of::<web::HtmlVideoElement>(element, "video")?)
        };
        let kind = media.kind();
        Some((media, kind))
    }

    fn bounding_box(&self, element: &web::Element) -> Option<PixelBox> {
        if !element.is_connected() {
            return None;
        }
        let r = element.get_bounding_client_rect();
        let (ox, oy) = self.origin();
        Some(PixelBox::new(
            r.left() as f32 - ox,
            r.top() as f32 - oy,
            r.width() as f32,
            r.height() as f32,
        ))
    }

    /// Computed style first, so stylesheet animations and transitions are
    /// seen mid-flight; the inline value covers detached computed style.
    fn transform(&self, element: &web::Element) -> Option<String> {
        let computed = self
            .window
            .get_computed_style(element)
            .ok()
            .flatten()
            .and_then(|s| s.get_property_value("transform").ok())
            .filter(|v| !v.is_empty());
        computed.or_else(|| {
            element
                .dyn_ref::<web::HtmlElement>()?
                .style()
                .get_property_value("transform")
                .ok()
                .filter(|v| !v.is_empty())
        })
    }

    fn border_radius(&self, media: &WebMedia) -> Option<f32> {
        let style = self.window.get_computed_style(media.element()).ok()??;
        let value = style.get_property_value("border-top-left-radius").ok()?;
        parse_px(&value)
    }

    fn set_media_opacity(&mut self, media: &WebMedia, opacity: Option<f32>) {
        let style = media.element().style();
        match opacity {
            Some(o) => _ = style.set_property("opacity", &o.to_string()),
            None => _ = style.remove_property("opacity"),
        }
    }

    fn attach_listeners(&mut self, element: &web::Element, media: &WebMedia, key: ItemKey) -> Vec<PointerListener> {
        events::attach(element, media, key, &self.queue)
    }

    fn detach_listener(&mut self, media: &WebMedia, listener: PointerListener) {
        events::detach(media, listener);
    }

    fn drain_pointer_events(&mut self) -> Vec<PointerEvent> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }

    fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }
}

fn first_of<T: JsCast>(element: &web::Element, selector: &str) -> Option<T> {
    element.query_selector(selector).ok()??.dyn_into::<T>().ok()
}

/// `"12px"` -> 12. Percentages and other units are not mirrored.
fn parse_px(value: &str) -> Option<f32> {
    // two-value radii ("12px 8px") use the horizontal one
    let first = value.split_whitespace().next()?;
    let v: f32 = first.strip_suffix("px")?.parse().ok()?;
    (v.is_finite() && v >= 0.0).then_some(v)
}

/// Maintain canvas internal pixel size to match CSS size * devicePixelRatio.
/// Returns the backing size in physical pixels.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement, css_width: f32, css_height: f32) -> (u32, u32) {
    let dpr = web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0) as f32;
    let w_px = ((css_width * dpr) as u32).max(1);
    let h_px = ((css_height * dpr) as u32).max(1);
    if canvas.width() != w_px {
        canvas.set_width(w_px);
    }
    if canvas.height() != h_px {
        canvas.set_height(h_px);
    }
    (w_px, h_px)
}
