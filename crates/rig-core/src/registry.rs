//! DOM-sync registry: one scene item per tagged, resolvable element.

use smallvec::SmallVec;

use crate::config::RigConfig;
use crate::error::RigError;
use crate::geometry::{OrthoCamera, PixelBox, PlaneGeometry};
use crate::host::{DomHost, ItemKey, MediaKind, TextureLoader};
use crate::interaction::InteractionState;
use crate::scene::{Mesh, MeshId, Scene, TextureId};

pub struct SceneItem<H: DomHost> {
    pub key: ItemKey,
    pub element: H::Element,
    pub media: H::Media,
    pub media_kind: MediaKind,
    pub mesh: MeshId,
    pub texture: TextureId,
    /// Box captured at build time; geometry is sized from it and never changes.
    pub initial_box: PixelBox,
    /// DOM order among built items. The mesh sits at z = -depth_index.
    pub depth_index: u32,
    pub border_radius: f32,
    pub interaction: InteractionState,
    listeners: SmallVec<[H::Listener; 3]>,
}

/// Everything a build or teardown needs to touch, borrowed for the call.
pub struct SyncTargets<'a, H: DomHost, T: TextureLoader<H::Media>> {
    pub host: &'a mut H,
    pub loader: &'a mut T,
    pub scene: &'a mut Scene,
}

pub struct Registry<H: DomHost> {
    items: Vec<SceneItem<H>>,
    generation: u32,
}

impl<H: DomHost> Default for Registry<H> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            generation: 0,
        }
    }
}

impl<H: DomHost> Registry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[SceneItem<H>] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [SceneItem<H>] {
        &mut self.items
    }

    /// Look up a live item; stale keys from a previous build return `None`.
    pub fn get_mut(&mut self, key: ItemKey) -> Option<&mut SceneItem<H>> {
        self.items
            .get_mut(key.index as usize)
            .filter(|item| item.key.generation == key.generation)
    }

    /// Query matches once and build an item for each resolvable one.
    /// Returns the number of items built.
    pub fn scan<T: TextureLoader<H::Media>>(
        &mut self,
        t: SyncTargets<'_, H, T>,
        camera: &OrthoCamera,
        config: &RigConfig,
    ) -> usize {
        self.generation = self.generation.wrapping_add(1);
        let elements = t.host.query_items(&config.item_selector);
        let scroll_y = t.host.scroll_offset();
        let matched = elements.len();

        for (dom_index, element) in elements.into_iter().enumerate() {
            let Some((media, kind)) = t.host.resolve_media(&element) else {
                log::warn!("[registry] {}; skipping", RigError::ElementResolution { index: dom_index });
                continue;
            };
            let key = ItemKey {
                index: self.items.len() as u32,
                generation: self.generation,
            };
            let targets = SyncTargets {
                host: &mut *t.host,
                loader: &mut *t.loader,
                scene: &mut *t.scene,
            };
            match build_item(targets, camera, config, scroll_y, element, media, kind, key) {
                Some(item) => self.items.push(item),
                None => log::warn!("[registry] element {dom_index} has no usable layout box; skipping"),
            }
        }

        log::info!(
            "[registry] built {} of {} matched elements for `{}`",
            self.items.len(),
            matched,
            config.item_selector
        );
        self.items.len()
    }

    /// Tear down every item: meshes, listeners, textures, element opacity.
    pub fn clear<T: TextureLoader<H::Media>>(&mut self, t: SyncTargets<'_, H, T>) {
        for item in self.items.drain(..) {
            teardown(
                SyncTargets {
                    host: &mut *t.host,
                    loader: &mut *t.loader,
                    scene: &mut *t.scene,
                },
                item,
            );
        }
    }

    /// Tear everything down, then rebuild from the current DOM.
    pub fn rescan<T: TextureLoader<H::Media>>(
        &mut self,
        t: SyncTargets<'_, H, T>,
        camera: &OrthoCamera,
        config: &RigConfig,
    ) -> usize {
        self.clear(SyncTargets {
            host: &mut *t.host,
            loader: &mut *t.loader,
            scene: &mut *t.scene,
        });
        self.scan(t, camera, config)
    }
}

/// Capture the element box, build overscanned geometry around its center and
/// wire the listeners.
#[allow(clippy::too_many_arguments)]
pub fn build_item<H: DomHost, T: TextureLoader<H::Media>>(
    t: SyncTargets<'_, H, T>,
    camera: &OrthoCamera,
    config: &RigConfig,
    scroll_y: f32,
    element: H::Element,
    media: H::Media,
    kind: MediaKind,
    key: ItemKey,
) -> Option<SceneItem<H>> {
    let rect = t.host.bounding_box(&element).filter(PixelBox::is_finite)?;
    let depth_index = key.index;

    let texture = t.loader.load(&media, kind);
    let geometry = PlaneGeometry::for_box(&rect, config.overscan);
    let border_radius = t
        .host
        .border_radius(&media)
        .filter(|r| r.is_finite() && *r >= 0.0)
        .unwrap_or(config.border_radius);

    let mut mesh = Mesh::new(geometry, texture);
    mesh.position = camera.plane_position(&rect, scroll_y, depth_index);
    mesh.uniforms.resolution = [rect.width, rect.height];
    mesh.uniforms.warp_params = config.shader_tuning.to_array();
    mesh.uniforms.border_radius = border_radius;
    mesh.uniforms.model = mesh.model_matrix().to_cols_array_2d();
    let mesh_id = t.scene.add(mesh);

    t.host.set_media_opacity(&media, Some(config.element_opacity));
    let listeners: SmallVec<[H::Listener; 3]> = t.host.attach_listeners(&element, &media, key).into_iter().collect();

    log::debug!(
        "[registry] item {} depth {} box {:.0}x{:.0}@({:.0},{:.0}) {:?}",
        key.index,
        depth_index,
        rect.width,
        rect.height,
        rect.left,
        rect.top,
        kind
    );

    Some(SceneItem {
        key,
        element,
        media,
        media_kind: kind,
        mesh: mesh_id,
        texture,
        initial_box: rect,
        depth_index,
        border_radius,
        interaction: InteractionState::default(),
        listeners,
    })
}

/// Remove the mesh, detach every listener, release the texture and give the
/// original element its visibility back.
pub fn teardown<H: DomHost, T: TextureLoader<H::Media>>(t: SyncTargets<'_, H, T>, mut item: SceneItem<H>) {
    if t.scene.remove(item.mesh).is_none() {
        log::warn!("[registry] item {} mesh already gone", item.key.index);
    }
    for listener in item.listeners.drain(..) {
        t.host.detach_listener(&item.media, listener);
    }
    t.loader.release(item.texture);
    t.host.set_media_opacity(&item.media, None);
}
