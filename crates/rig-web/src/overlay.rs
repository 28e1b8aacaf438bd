//! Debug HUD: one line of stats pinned to the container corner.

use instant::Instant;
use wasm_bindgen::JsCast;
use web_sys as web;

const HUD_STYLE: &str = "position:absolute;right:8px;top:8px;z-index:10;padding:2px 6px;\
font:11px/1.4 monospace;color:#fff;background:rgba(0,0,0,0.6);pointer-events:none;";
const REFRESH_SECS: f32 = 0.5;

pub struct DebugHud {
    el: web::HtmlElement,
    window_start: Instant,
    frames: u32,
    fps: f32,
}

impl DebugHud {
    pub fn mount(container: &web::HtmlElement) -> Option<Self> {
        let document = web::window()?.document()?;
        let el = document.create_element("div").ok()?.dyn_into::<web::HtmlElement>().ok()?;
        _ = el.class_list().add_1("rig-debug");
        _ = el.set_attribute("style", HUD_STYLE);
        container.append_child(&el).ok()?;
        Some(Self {
            el,
            window_start: Instant::now(),
            frames: 0,
            fps: 0.0,
        })
    }

    /// Count a frame; the text only changes twice a second.
    pub fn update(&mut self, items: usize, antialias: &str, requested: &str) {
        self.frames += 1;
        let elapsed = self.window_start.elapsed().as_secs_f32();
        if elapsed < REFRESH_SECS {
            return;
        }
        self.fps = self.frames as f32 / elapsed;
        self.frames = 0;
        self.window_start = Instant::now();

        let aa = if antialias == requested {
            antialias.to_string()
        } else {
            format!("{antialias} (wanted {requested})")
        };
        self.el
            .set_text_content(Some(&format!("{:.0} fps | {} items | aa {}", self.fps, items, aa)));
    }

    pub fn remove(&self) {
        self.el.remove();
    }
}
