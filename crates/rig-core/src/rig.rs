//! The rig: one synchronization + render pass per frame.
//!
//! Frame order is fixed: pending pointer events, transform sync, interaction
//! tick, render. Every item is processed independently; a failure on one is
//! logged and the rest of the scene still renders.

use crate::compositor::{RenderBackend, SceneCompositor};
use crate::config::{RigConfig, ScaleTuning, ShaderTuning};
use crate::error::{Result, RigError};
use crate::geometry::PixelBox;
use crate::host::{DomHost, PointerEvent, PointerKind, TextureLoader};
use crate::registry::{Registry, SyncTargets};
use crate::scene::Scene;
use crate::sync::{sync_transform, write_interaction_uniforms};

pub struct Rig<H, B>
where
    H: DomHost,
    B: RenderBackend + TextureLoader<H::Media>,
{
    config: RigConfig,
    host: H,
    compositor: SceneCompositor<B>,
    scene: Scene,
    registry: Registry<H>,
    alive: bool,
}

impl<H, B> Rig<H, B>
where
    H: DomHost,
    B: RenderBackend + TextureLoader<H::Media>,
{
    /// Build the compositor and the initial item set.
    ///
    /// Fails only when the host has no container to cover.
    pub fn new(host: H, backend: B, config: RigConfig) -> Result<Self> {
        let config = config.sanitized();
        let container = host
            .container_box()
            .filter(PixelBox::is_finite)
            .ok_or_else(|| RigError::Configuration("no container element".into()))?;

        let compositor = SceneCompositor::initialize(container, config.antialias_mode, backend);
        let mut rig = Self {
            config,
            host,
            compositor,
            scene: Scene::new(),
            registry: Registry::new(),
            alive: true,
        };
        rig.rescan();
        Ok(rig)
    }

    /// One animation frame.
    pub fn frame(&mut self) {
        if !self.alive {
            return;
        }
        self.watch_container();

        for ev in self.host.drain_pointer_events() {
            self.dispatch(ev);
        }

        self.sync_transforms();

        for item in self.registry.items_mut() {
            item.interaction.tick(&self.config.scale_tuning);
            write_interaction_uniforms(&mut self.scene, &self.config, item);
        }

        self.compositor.render(&self.scene);
    }

    /// Container resized: new camera bounds, full rescan, and one render so
    /// the next paint is not stale.
    pub fn handle_resize(&mut self) {
        if !self.alive {
            return;
        }
        match self.host.container_box().filter(PixelBox::is_finite) {
            Some(container) => {
                self.apply_resize(container);
                self.render_now();
            }
            None => log::warn!("[rig] resize ignored: container is gone"),
        }
    }

    /// Sync and draw without advancing interaction state.
    pub fn render_now(&mut self) {
        if !self.alive {
            return;
        }
        self.sync_transforms();
        for item in self.registry.items() {
            write_interaction_uniforms(&mut self.scene, &self.config, item);
        }
        self.compositor.render(&self.scene);
    }

    /// Route a pointer event to its item. Events for torn-down items are
    /// dropped.
    pub fn dispatch(&mut self, ev: PointerEvent) {
        let Some(item) = self.registry.get_mut(ev.key) else {
            log::trace!("[rig] stale pointer event for {:?}", ev.key);
            return;
        };
        match ev.kind {
            PointerKind::Enter => item.interaction.on_enter(ev.local),
            PointerKind::Leave => item.interaction.on_leave(ev.local),
            PointerKind::Move => item.interaction.on_move(ev.local),
        }
    }

    /// Tear down every item and rebuild from the current DOM.
    pub fn rescan(&mut self) -> usize {
        let camera = *self.compositor.camera();
        let targets = SyncTargets {
            host: &mut self.host,
            loader: self.compositor.backend_mut(),
            scene: &mut self.scene,
        };
        self.registry.rescan(targets, &camera, &self.config)
    }

    pub fn set_shader_tuning(&mut self, tuning: ShaderTuning) {
        self.config.shader_tuning = tuning;
        let params = tuning.to_array();
        for item in self.registry.items() {
            if let Some(mesh) = self.scene.get_mut(item.mesh) {
                mesh.uniforms.warp_params = params;
            }
        }
    }

    pub fn set_scale_tuning(&mut self, tuning: ScaleTuning) {
        self.config = RigConfig {
            scale_tuning: tuning,
            ..self.config.clone()
        }
        .sanitized();
    }

    /// Remove every item, restore the page and stop reacting to frames.
    pub fn destroy(&mut self) {
        if !self.alive {
            return;
        }
        self.alive = false;
        self.registry.clear(SyncTargets {
            host: &mut self.host,
            loader: self.compositor.backend_mut(),
            scene: &mut self.scene,
        });
        log::info!("[rig] destroyed");
    }

    fn apply_resize(&mut self, container: PixelBox) {
        self.compositor.resize(container);
        let count = self.rescan();
        log::info!(
            "[rig] resize {}x{} -> {} items",
            container.width,
            container.height,
            count
        );
    }

    /// Pick up container size changes that arrive without a window resize.
    fn watch_container(&mut self) {
        let Some(container) = self.host.container_box().filter(PixelBox::is_finite) else {
            return;
        };
        let camera = self.compositor.camera();
        if camera.width() != container.width || camera.height() != container.height {
            self.apply_resize(container);
        }
    }

    fn sync_transforms(&mut self) {
        let scroll_y = self.host.scroll_offset();
        let camera = *self.compositor.camera();
        for item in self.registry.items() {
            if let Err(e) = sync_transform(&self.host, &mut self.scene, &camera, &self.config, scroll_y, item) {
                log::trace!("[rig] item {} kept last transform: {e}", item.key.index);
            }
        }
    }

    #[inline]
    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn registry(&self) -> &Registry<H> {
        &self.registry
    }

    #[inline]
    pub fn compositor(&self) -> &SceneCompositor<B> {
        &self.compositor
    }

    #[inline]
    pub fn host(&self) -> &H {
        &self.host
    }

    #[inline]
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[inline]
    pub fn item_count(&self) -> usize {
        self.registry.len()
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }
}

impl<H, B> Drop for Rig<H, B>
where
    H: DomHost,
    B: RenderBackend + TextureLoader<H::Media>,
{
    fn drop(&mut self) {
        self.destroy();
    }
}
