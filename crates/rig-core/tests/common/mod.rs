// In-memory stand-ins for the page and the GPU, shared by the integration
// tests. Elements and media are addressed by their index in `FakeDom::nodes`.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use rig_core::{
    AntialiasMode, DomHost, FrameInfo, ItemKey, MediaKind, OrthoCamera, PassChain, PixelBox, PointerEvent,
    PointerKind, RenderBackend, Result, Rig, RigConfig, RigError, Scene, TextureId, TextureLoader,
};

pub const SELECTOR: &str = "[data-mx-shader]";

#[derive(Clone, Debug)]
pub struct FakeNode {
    pub tag: String,
    /// `None` simulates an element whose layout can't be read.
    pub rect: Option<PixelBox>,
    pub transform: Option<String>,
    pub media: Option<MediaKind>,
    pub border_radius: Option<f32>,
}

impl FakeNode {
    pub fn image(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            tag: SELECTOR.to_string(),
            rect: Some(PixelBox::new(left, top, width, height)),
            transform: None,
            media: Some(MediaKind::Image),
            border_radius: None,
        }
    }

    pub fn video(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            media: Some(MediaKind::Video),
            ..Self::image(left, top, width, height)
        }
    }

    /// Tagged, but with nothing to mirror.
    pub fn empty(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            media: None,
            ..Self::image(left, top, width, height)
        }
    }
}

#[derive(Debug)]
pub struct FakeListener {
    pub element: usize,
    pub id: u32,
}

#[derive(Default)]
pub struct FakeDom {
    pub container: Option<PixelBox>,
    pub nodes: Vec<FakeNode>,
    pub scroll: f32,
    pub opacity: HashMap<usize, f32>,
    /// Live listener ids per element.
    pub listeners: HashMap<usize, HashSet<u32>>,
    pub next_listener: u32,
    pub pending: Vec<PointerEvent>,
    pub detached: usize,
}

impl FakeDom {
    pub fn new(width: f32, height: f32, nodes: Vec<FakeNode>) -> Self {
        Self {
            container: Some(PixelBox::sized(width, height)),
            nodes,
            ..Self::default()
        }
    }

    pub fn live_listeners(&self) -> usize {
        self.listeners.values().map(HashSet::len).sum()
    }

    /// Queue a pointer event the way a DOM listener would, in client pixels.
    pub fn pointer(&mut self, key: ItemKey, element: usize, kind: PointerKind, client: Vec2) {
        let rect = self.nodes[element].rect.unwrap_or_default();
        self.pending.push(PointerEvent {
            key,
            kind,
            local: rect.local_point(client),
        });
    }
}

impl DomHost for FakeDom {
    type Element = usize;
    type Media = usize;
    type Listener = FakeListener;

    fn container_box(&self) -> Option<PixelBox> {
        self.container
    }

    fn query_items(&self, selector: &str) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.tag == selector)
            .map(|(i, _)| i)
            .collect()
    }

    fn resolve_media(&self, element: &usize) -> Option<(usize, MediaKind)> {
        self.nodes[*element].media.map(|k| (*element, k))
    }

    fn bounding_box(&self, element: &usize) -> Option<PixelBox> {
        self.nodes.get(*element).and_then(|n| n.rect)
    }

    fn transform(&self, element: &usize) -> Option<String> {
        self.nodes.get(*element).and_then(|n| n.transform.clone())
    }

    fn border_radius(&self, media: &usize) -> Option<f32> {
        self.nodes.get(*media).and_then(|n| n.border_radius)
    }

    fn set_media_opacity(&mut self, media: &usize, opacity: Option<f32>) {
        match opacity {
            Some(o) => {
                self.opacity.insert(*media, o);
            }
            None => {
                self.opacity.remove(media);
            }
        }
    }

    fn attach_listeners(&mut self, element: &usize, _media: &usize, _key: ItemKey) -> Vec<FakeListener> {
        (0..3)
            .map(|_| {
                let id = self.next_listener;
                self.next_listener += 1;
                self.listeners.entry(*element).or_default().insert(id);
                FakeListener { element: *element, id }
            })
            .collect()
    }

    fn detach_listener(&mut self, _media: &usize, listener: FakeListener) {
        if let Some(set) = self.listeners.get_mut(&listener.element) {
            set.remove(&listener.id);
        }
        self.detached += 1;
    }

    fn drain_pointer_events(&mut self) -> Vec<PointerEvent> {
        std::mem::take(&mut self.pending)
    }

    fn scroll_offset(&self) -> f32 {
        self.scroll
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawRecord {
    pub mode: AntialiasMode,
    pub frame: u64,
    pub meshes: usize,
    pub jitter_samples: usize,
    pub camera: OrthoCamera,
}

#[derive(Default)]
pub struct FakeBackend {
    pub unsupported: Vec<AntialiasMode>,
    /// Modes whose `prepare` fails.
    pub broken: Vec<AntialiasMode>,
    /// Report the chain as unavailable on the next draw.
    pub lose_chain_on_draw: bool,
    /// Report a transient error on the next draw.
    pub transient_error: bool,
    pub prepared: Vec<AntialiasMode>,
    pub sizes: Vec<(f32, f32)>,
    pub draws: Vec<DrawRecord>,
    pub live_textures: HashSet<TextureId>,
    pub released: Vec<TextureId>,
    pub next_texture: u32,
}

impl FakeBackend {
    pub fn supporting_all() -> Self {
        Self::default()
    }

    pub fn without(mode: AntialiasMode) -> Self {
        Self {
            unsupported: vec![mode],
            ..Self::default()
        }
    }
}

impl RenderBackend for FakeBackend {
    fn supports(&self, mode: AntialiasMode) -> bool {
        !self.unsupported.contains(&mode)
    }

    fn prepare(&mut self, chain: &PassChain) -> Result<()> {
        if self.broken.contains(&chain.mode()) {
            return Err(RigError::ResourceUnavailable {
                mode: chain.mode(),
                reason: "pipeline creation failed".into(),
            });
        }
        self.prepared.push(chain.mode());
        Ok(())
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.sizes.push((width, height));
    }

    fn draw(&mut self, chain: &PassChain, frame: &FrameInfo, camera: &OrthoCamera, scene: &Scene) -> Result<()> {
        if std::mem::take(&mut self.lose_chain_on_draw) {
            return Err(RigError::ResourceUnavailable {
                mode: chain.mode(),
                reason: "target lost".into(),
            });
        }
        if std::mem::take(&mut self.transient_error) {
            return Err(RigError::Gpu("surface outdated".into()));
        }
        self.draws.push(DrawRecord {
            mode: chain.mode(),
            frame: frame.index,
            meshes: scene.len(),
            jitter_samples: frame.jitter.len(),
            camera: *camera,
        });
        Ok(())
    }
}

impl TextureLoader<usize> for FakeBackend {
    fn load(&mut self, _media: &usize, _kind: MediaKind) -> TextureId {
        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.live_textures.insert(id);
        id
    }

    fn release(&mut self, texture: TextureId) {
        self.live_textures.remove(&texture);
        self.released.push(texture);
    }
}

pub type TestRig = Rig<FakeDom, FakeBackend>;

pub fn rig_with(dom: FakeDom, config: RigConfig) -> TestRig {
    Rig::new(dom, FakeBackend::supporting_all(), config).expect("rig builds")
}

pub fn two_card_rig() -> TestRig {
    let dom = FakeDom::new(
        800.0,
        600.0,
        vec![FakeNode::image(0.0, 0.0, 200.0, 100.0), FakeNode::image(300.0, 200.0, 100.0, 50.0)],
    );
    rig_with(dom, RigConfig::default())
}
