//! WebGPU backend: one transparent surface over the container, the plane
//! program, and the offscreen targets the antialiasing chains need.

mod helpers;
mod planes;
mod post;
mod targets;
mod textures;

use std::borrow::Cow;

use glam::Vec2;
use rig_core::uniforms::check_shader_schema;
use rig_core::{
    AntialiasMode, FrameInfo, MediaKind, OrthoCamera, Pass, PassChain, PostUniforms, RenderBackend, RigError, Scene,
    TextureId, TextureLoader, PLANE_WGSL, POST_WGSL,
};
use web_sys as web;

use crate::dom::{sync_canvas_backing_size, WebMedia};
use planes::PlaneResources;
use post::PostResources;
use targets::RenderTargets;
use textures::TextureStore;

pub struct GpuBackend {
    canvas: web::HtmlCanvasElement,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    msaa_ok: bool,
    planes: PlaneResources,
    post: PostResources,
    targets: RenderTargets,
    bg_scene: Option<wgpu::BindGroup>,
    bg_accum: Option<wgpu::BindGroup>,
    textures: TextureStore,
}

impl GpuBackend {
    pub async fn new(canvas: web::HtmlCanvasElement, shader_source: Option<&str>) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;

        let caps = surface.get_capabilities(&adapter);
        // Media is uploaded as stored bytes and blended as-is, so the surface
        // must not re-encode to sRGB.
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| matches!(f, wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Rgba8Unorm))
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .iter()
            .copied()
            .find(|m| *m == wgpu::CompositeAlphaMode::PreMultiplied)
            .or_else(|| caps.alpha_modes.first().copied())
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let msaa_ok = adapter
            .get_texture_format_features(format)
            .flags
            .sample_count_supported(rig_core::constants::MSAA_SAMPLES);

        let planes = PlaneResources::new(&device, format, &plane_program(shader_source));
        let post_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("post_shader"),
            source: wgpu::ShaderSource::Wgsl(POST_WGSL.into()),
        });
        let post = post::create_post_resources(&device, &post_shader, format);
        queue.write_buffer(
            &post.uniform_buffer,
            0,
            bytemuck::bytes_of(&PostUniforms::for_size(width, height)),
        );
        let textures = TextureStore::new(&device, &queue);

        log::info!("[gpu] surface {}x{} format={:?} alpha={:?} msaa={}", width, height, format, alpha_mode, msaa_ok);
        Ok(Self {
            canvas,
            surface,
            device,
            queue,
            config,
            msaa_ok,
            planes,
            post,
            targets: RenderTargets::new(format),
            bg_scene: None,
            bg_accum: None,
            textures,
        })
    }

    fn rebind_targets(&mut self) {
        self.bg_scene = self
            .targets
            .scene
            .as_ref()
            .map(|(_, v)| self.post.bind_source(&self.device, "bg_scene", v));
        self.bg_accum = self
            .targets
            .accum
            .as_ref()
            .map(|(_, v)| self.post.bind_source(&self.device, "bg_accum", v));
    }

    fn target_px(&self) -> Vec2 {
        Vec2::new(self.config.width as f32, self.config.height as f32)
    }

    #[allow(clippy::too_many_arguments)]
    fn plane_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        chain: &PassChain,
        target: &wgpu::TextureView,
        resolve: Option<&wgpu::TextureView>,
        samples: u32,
        camera_slot: usize,
        order: &[rig_core::MeshId],
    ) -> rig_core::Result<()> {
        let pipeline = self
            .planes
            .pipeline(samples)
            .ok_or_else(|| unavailable(chain, format!("no plane pipeline for {samples} samples")))?;
        let mut r = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("plane_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: resolve,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: if resolve.is_some() {
                        wgpu::StoreOp::Discard
                    } else {
                        wgpu::StoreOp::Store
                    },
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        self.planes.record(&mut r, pipeline, camera_slot, order);
        drop(r);
        Ok(())
    }
}

impl RenderBackend for GpuBackend {
    fn supports(&self, mode: AntialiasMode) -> bool {
        match mode {
            AntialiasMode::Msaa => self.msaa_ok,
            AntialiasMode::None | AntialiasMode::Fxaa | AntialiasMode::Taa => true,
        }
    }

    fn prepare(&mut self, chain: &PassChain) -> rig_core::Result<()> {
        if !self.supports(chain.mode()) {
            return Err(unavailable(chain, "not supported by this adapter".into()));
        }
        self.targets
            .configure(&self.device, chain, self.config.width, self.config.height);
        self.planes.ensure_pipeline(&self.device, self.targets.msaa_samples());
        self.rebind_targets();
        log::debug!("[gpu] prepared {} chain", chain.mode());
        Ok(())
    }

    fn resize(&mut self, width: f32, height: f32) {
        let (w_px, h_px) = sync_canvas_backing_size(&self.canvas, width, height);
        if w_px == self.config.width && h_px == self.config.height {
            return;
        }
        self.config.width = w_px;
        self.config.height = h_px;
        self.surface.configure(&self.device, &self.config);
        self.targets.recreate(&self.device, w_px, h_px);
        self.rebind_targets();
        self.queue.write_buffer(
            &self.post.uniform_buffer,
            0,
            bytemuck::bytes_of(&PostUniforms::for_size(w_px, h_px)),
        );
        log::debug!("[gpu] backing store {}x{}", w_px, h_px);
    }

    fn draw(&mut self, chain: &PassChain, frame: &FrameInfo, camera: &OrthoCamera, scene: &Scene) -> rig_core::Result<()> {
        self.textures.refresh(&self.device, &self.queue);
        self.planes.sync(&self.device, &self.queue, scene, &self.textures);
        let target_px = self.target_px();
        self.planes
            .write_cameras(&self.device, &self.queue, camera, &frame.jitter, target_px);

        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.surface.configure(&self.device, &self.config);
                return Err(RigError::Gpu(format!("{e}")));
            }
            Err(e) => return Err(RigError::Gpu(format!("{e}"))),
        };
        let surface_view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let order = scene.draw_order();
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("rig_frame") });

        for pass in chain.passes() {
            match *pass {
                Pass::Direct => {
                    self.plane_pass(&mut encoder, chain, &surface_view, None, 1, 0, &order)?;
                }
                Pass::Multisampled { samples } => {
                    let (_, msaa) = self
                        .targets
                        .msaa
                        .as_ref()
                        .ok_or_else(|| unavailable(chain, "multisampled target missing".into()))?;
                    self.plane_pass(&mut encoder, chain, msaa, Some(&surface_view), samples, 0, &order)?;
                }
                Pass::Offscreen => {
                    let (_, scene_view) = self
                        .targets
                        .scene
                        .as_ref()
                        .ok_or_else(|| unavailable(chain, "scene target missing".into()))?;
                    self.plane_pass(&mut encoder, chain, scene_view, None, 1, 0, &order)?;
                }
                Pass::Fxaa => {
                    let bg = self
                        .bg_scene
                        .as_ref()
                        .ok_or_else(|| unavailable(chain, "scene target missing".into()))?;
                    post::blit(
                        &mut encoder,
                        "fxaa_pass",
                        &surface_view,
                        wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        &self.post.fxaa_pipeline,
                        bg,
                        None,
                    );
                }
                Pass::JitterAccumulate { .. } => {
                    let (_, scene_view) = self
                        .targets
                        .scene
                        .as_ref()
                        .ok_or_else(|| unavailable(chain, "scene target missing".into()))?;
                    let (_, accum_view) = self
                        .targets
                        .accum
                        .as_ref()
                        .ok_or_else(|| unavailable(chain, "accumulation target missing".into()))?;
                    let bg = self
                        .bg_scene
                        .as_ref()
                        .ok_or_else(|| unavailable(chain, "scene target missing".into()))?;
                    let n = frame.jitter.len().max(1);
                    let w = 1.0 / n as f64;
                    let weight = wgpu::Color { r: w, g: w, b: w, a: w };
                    for slot in 0..n {
                        self.plane_pass(&mut encoder, chain, scene_view, None, 1, slot, &order)?;
                        let load = if slot == 0 {
                            wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT)
                        } else {
                            wgpu::LoadOp::Load
                        };
                        post::blit(
                            &mut encoder,
                            "accumulate_pass",
                            accum_view,
                            load,
                            &self.post.accumulate_pipeline,
                            bg,
                            Some(weight),
                        );
                    }
                }
                Pass::Output => {
                    let bg = self
                        .bg_accum
                        .as_ref()
                        .ok_or_else(|| unavailable(chain, "accumulation target missing".into()))?;
                    post::blit(
                        &mut encoder,
                        "output_pass",
                        &surface_view,
                        wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        &self.post.copy_pipeline,
                        bg,
                        None,
                    );
                }
            }
        }

        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl TextureLoader<WebMedia> for GpuBackend {
    fn load(&mut self, media: &WebMedia, kind: MediaKind) -> TextureId {
        let id = self.textures.insert(media.clone());
        log::trace!("[gpu] texture {:?} for {:?}", id, kind);
        id
    }

    fn release(&mut self, texture: TextureId) {
        self.textures.remove(texture);
    }
}

fn unavailable(chain: &PassChain, reason: String) -> RigError {
    RigError::ResourceUnavailable {
        mode: chain.mode(),
        reason,
    }
}

/// The configured plane program if it honors the uniform contract, else the
/// bundled one.
fn plane_program(custom: Option<&str>) -> Cow<'static, str> {
    match custom {
        Some(src) => match check_shader_schema(src) {
            Ok(()) => {
                log::info!("[gpu] using custom plane shader");
                Cow::Owned(src.to_string())
            }
            Err(e) => {
                log::warn!("[gpu] {e}; using the bundled plane shader");
                Cow::Borrowed(PLANE_WGSL)
            }
        },
        None => Cow::Borrowed(PLANE_WGSL),
    }
}
