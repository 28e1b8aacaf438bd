//! Scene compositor: camera, antialiasing pass chain and frame counter.
//!
//! The chain is chosen once at initialization from the requested
//! [`AntialiasMode`] and what the backend reports it can do. Rendering never
//! fails outward: an antialiasing path that turns out to be unavailable is
//! replaced by direct rendering and the rig carries on.

use glam::Vec2;
use smallvec::{smallvec, SmallVec};

use crate::config::AntialiasMode;
use crate::constants::{MSAA_SAMPLES, TAA_SAMPLES};
use crate::error::{Result, RigError};
use crate::geometry::{OrthoCamera, PixelBox};
use crate::scene::Scene;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    /// Planes straight into the presented surface.
    Direct,
    /// Planes into a multisampled target resolved into the surface.
    Multisampled { samples: u32 },
    /// Planes into an offscreen color target.
    Offscreen,
    /// Fullscreen FXAA from the offscreen target into the surface.
    Fxaa,
    /// Planes rendered once per jitter offset and averaged offscreen.
    JitterAccumulate { samples: u32 },
    /// Copy the offscreen result into the surface.
    Output,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassChain {
    mode: AntialiasMode,
    passes: SmallVec<[Pass; 3]>,
}

impl PassChain {
    pub fn for_mode(mode: AntialiasMode) -> Self {
        let passes = match mode {
            AntialiasMode::None => smallvec![Pass::Direct],
            AntialiasMode::Msaa => smallvec![Pass::Multisampled { samples: MSAA_SAMPLES }],
            AntialiasMode::Fxaa => smallvec![Pass::Offscreen, Pass::Fxaa],
            AntialiasMode::Taa => smallvec![Pass::JitterAccumulate { samples: TAA_SAMPLES }, Pass::Output],
        };
        Self { mode, passes }
    }

    pub fn direct() -> Self {
        Self::for_mode(AntialiasMode::None)
    }

    #[inline]
    pub fn mode(&self) -> AntialiasMode {
        self.mode
    }

    #[inline]
    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    #[inline]
    pub fn is_direct(&self) -> bool {
        self.mode == AntialiasMode::None
    }

    /// Jitter samples per frame the chain needs (1 when not jittering).
    pub fn jitter_samples(&self) -> u32 {
        self.passes
            .iter()
            .find_map(|p| match p {
                Pass::JitterAccumulate { samples } => Some(*samples),
                _ => None,
            })
            .unwrap_or(1)
    }
}

/// Per-frame data handed to the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameInfo {
    pub index: u64,
    /// Sub-pixel offsets in target pixels, one per jitter sample.
    pub jitter: SmallVec<[Vec2; 4]>,
}

pub trait RenderBackend {
    /// Whether the device can run `mode` at all.
    fn supports(&self, mode: AntialiasMode) -> bool;

    /// Allocate pipelines and targets for `chain`.
    fn prepare(&mut self, chain: &PassChain) -> Result<()>;

    /// Container size in CSS pixels, reported on every resize event even
    /// when unchanged: the device pixel ratio may have moved on its own.
    fn resize(&mut self, width: f32, height: f32);

    /// Run the chain once. `ResourceUnavailable` means the chain can't run on
    /// this device; any other error is transient and only drops the frame.
    fn draw(&mut self, chain: &PassChain, frame: &FrameInfo, camera: &OrthoCamera, scene: &Scene) -> Result<()>;
}

pub struct SceneCompositor<B> {
    backend: B,
    camera: OrthoCamera,
    size: PixelBox,
    requested: AntialiasMode,
    chain: PassChain,
    frame: u64,
}

impl<B: RenderBackend> SceneCompositor<B> {
    pub fn initialize(container: PixelBox, mode: AntialiasMode, mut backend: B) -> Self {
        backend.resize(container.width, container.height);
        let chain = select_chain(&mut backend, mode);
        log::info!(
            "[compositor] {}x{} antialias={} (requested {})",
            container.width,
            container.height,
            chain.mode(),
            mode
        );
        Self {
            backend,
            camera: OrthoCamera::new(container.width, container.height),
            size: container,
            requested: mode,
            chain,
            frame: 0,
        }
    }

    /// Recompute camera bounds and pass the size on to the backend, which
    /// decides whether its backing store needs to change. The camera is left
    /// alone when the size is the current one.
    pub fn resize(&mut self, container: PixelBox) {
        self.size = container;
        if self.camera.width() != container.width || self.camera.height() != container.height {
            self.camera.set_size(container.width, container.height);
            log::debug!("[compositor] resized to {}x{}", container.width, container.height);
        }
        self.backend.resize(container.width, container.height);
    }

    /// Draw one frame through the chosen chain.
    pub fn render(&mut self, scene: &Scene) {
        self.frame = self.frame.wrapping_add(1);
        let frame = FrameInfo {
            index: self.frame,
            jitter: jitter_offsets(self.chain.jitter_samples(), self.frame),
        };
        match self.backend.draw(&self.chain, &frame, &self.camera, scene) {
            Ok(()) => {}
            Err(e @ RigError::ResourceUnavailable { .. }) if !self.chain.is_direct() => {
                log::warn!("[compositor] {e}; falling back to direct rendering");
                self.degrade();
            }
            Err(e) => log::debug!("[compositor] frame {} dropped: {e}", self.frame),
        }
    }

    fn degrade(&mut self) {
        self.chain = PassChain::direct();
        if let Err(e) = self.backend.prepare(&self.chain) {
            log::error!("[compositor] direct path failed to prepare: {e}");
        }
    }

    #[inline]
    pub fn camera(&self) -> &OrthoCamera {
        &self.camera
    }

    #[inline]
    pub fn size(&self) -> PixelBox {
        self.size
    }

    #[inline]
    pub fn chain(&self) -> &PassChain {
        &self.chain
    }

    #[inline]
    pub fn requested_mode(&self) -> AntialiasMode {
        self.requested
    }

    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

fn select_chain<B: RenderBackend>(backend: &mut B, mode: AntialiasMode) -> PassChain {
    let wanted = PassChain::for_mode(mode);
    if !backend.supports(mode) {
        log::warn!(
            "[compositor] {}",
            RigError::ResourceUnavailable {
                mode,
                reason: "not supported by this device".into()
            }
        );
    } else {
        match backend.prepare(&wanted) {
            Ok(()) => return wanted,
            Err(e) => log::warn!("[compositor] {e}"),
        }
    }
    let direct = PassChain::direct();
    if let Err(e) = backend.prepare(&direct) {
        log::error!("[compositor] direct path failed to prepare: {e}");
    }
    direct
}

/// Radical inverse of `index` in `base`, in [0, 1).
pub fn halton(mut index: u32, base: u32) -> f32 {
    let mut f = 1.0f32;
    let mut r = 0.0f32;
    while index > 0 {
        f /= base as f32;
        r += f * (index % base) as f32;
        index /= base;
    }
    r
}

/// `samples` Halton(2,3) offsets centered on zero, advancing with `frame` so
/// consecutive frames cover different sub-pixel positions.
pub fn jitter_offsets(samples: u32, frame: u64) -> SmallVec<[Vec2; 4]> {
    if samples <= 1 {
        return smallvec![Vec2::ZERO];
    }
    let period = 16u64;
    (0..samples)
        .map(|s| {
            let i = ((frame * samples as u64 + s as u64) % period) as u32 + 1;
            Vec2::new(halton(i, 2) - 0.5, halton(i, 3) - 0.5)
        })
        .collect()
}
