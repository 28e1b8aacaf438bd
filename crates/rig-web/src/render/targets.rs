use rig_core::{Pass, PassChain};

use super::helpers;

/// Offscreen color targets for the active pass chain.
///
/// - `msaa` is the multisampled plane target resolved into the surface.
/// - `scene` holds single-sample plane output for FXAA and for each TAA sample.
/// - `accum` sums the jittered TAA samples before the output copy.
///
/// Only what the chain needs is allocated; everything matches the surface
/// format and size.
pub(crate) struct RenderTargets {
    format: wgpu::TextureFormat,
    msaa_samples: u32,
    wants_scene: bool,
    wants_accum: bool,
    pub(crate) msaa: Option<(wgpu::Texture, wgpu::TextureView)>,
    pub(crate) scene: Option<(wgpu::Texture, wgpu::TextureView)>,
    pub(crate) accum: Option<(wgpu::Texture, wgpu::TextureView)>,
}

impl RenderTargets {
    pub(crate) fn new(format: wgpu::TextureFormat) -> Self {
        Self {
            format,
            msaa_samples: 1,
            wants_scene: false,
            wants_accum: false,
            msaa: None,
            scene: None,
            accum: None,
        }
    }

    /// Switch to the targets `chain` needs, at `width` x `height` pixels.
    pub(crate) fn configure(&mut self, device: &wgpu::Device, chain: &PassChain, width: u32, height: u32) {
        self.msaa_samples = 1;
        self.wants_scene = false;
        self.wants_accum = false;
        for pass in chain.passes() {
            match *pass {
                Pass::Multisampled { samples } => self.msaa_samples = samples,
                Pass::Offscreen => self.wants_scene = true,
                Pass::JitterAccumulate { .. } => {
                    self.wants_scene = true;
                    self.wants_accum = true;
                }
                Pass::Direct | Pass::Fxaa | Pass::Output => {}
            }
        }
        self.recreate(device, width, height);
    }

    pub(crate) fn recreate(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let sampled = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
        self.msaa = (self.msaa_samples > 1).then(|| {
            helpers::create_color_texture(
                device,
                "msaa_color",
                width,
                height,
                self.format,
                self.msaa_samples,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            )
        });
        self.scene = self
            .wants_scene
            .then(|| helpers::create_color_texture(device, "scene_color", width, height, self.format, 1, sampled));
        self.accum = self
            .wants_accum
            .then(|| helpers::create_color_texture(device, "accum_color", width, height, self.format, 1, sampled));
    }

    #[inline]
    pub(crate) fn msaa_samples(&self) -> u32 {
        self.msaa_samples
    }
}
