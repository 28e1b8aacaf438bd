//! Media textures. A handle is returned at once and bound to a 1x1
//! transparent placeholder; the real texture replaces it in place as soon as
//! the image has decoded. Videos re-upload every frame while they have data.

use fnv::FnvHashMap;
use rig_core::TextureId;

use crate::dom::WebMedia;

/// `HTMLMediaElement.HAVE_CURRENT_DATA`
const HAVE_CURRENT_DATA: u16 = 2;
const MEDIA_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

struct TextureEntry {
    media: WebMedia,
    gpu: Option<GpuTexture>,
    /// Bumped whenever `gpu` is (re)created, so bind groups know to rebuild.
    version: u32,
}

pub(crate) struct TextureStore {
    entries: FnvHashMap<TextureId, TextureEntry>,
    next_id: u32,
    placeholder: GpuTexture,
}

impl TextureStore {
    pub(crate) fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let placeholder = create_media_texture(device, "placeholder_tex", 1, 1);
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &placeholder.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &[0u8; 4],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        Self {
            entries: FnvHashMap::default(),
            next_id: 0,
            placeholder,
        }
    }

    pub(crate) fn insert(&mut self, media: WebMedia) -> TextureId {
        let id = TextureId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.insert(
            id,
            TextureEntry {
                media,
                gpu: None,
                version: 0,
            },
        );
        id
    }

    pub(crate) fn remove(&mut self, id: TextureId) {
        if let Some(TextureEntry { gpu: Some(gpu), .. }) = self.entries.remove(&id) {
            gpu.texture.destroy();
        }
    }

    /// Resolve pending images and push the current frame of every video.
    pub(crate) fn refresh(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        for (id, entry) in self.entries.iter_mut() {
            match &entry.media {
                WebMedia::Image(img) => {
                    if entry.gpu.is_some() || !img.complete() || img.natural_width() == 0 {
                        continue;
                    }
                    let (w, h) = (img.natural_width(), img.natural_height());
                    let gpu = create_media_texture(device, "image_tex", w, h);
                    upload(queue, wgpu::ExternalImageSource::HTMLImageElement(img.clone()), &gpu);
                    log::debug!("[texture] {} image ready {}x{}", id.0, w, h);
                    entry.gpu = Some(gpu);
                    entry.version += 1;
                }
                WebMedia::Video(video) => {
                    if video.ready_state() < HAVE_CURRENT_DATA || video.video_width() == 0 {
                        continue;
                    }
                    let (w, h) = (video.video_width(), video.video_height());
                    let stale = entry.gpu.as_ref().map_or(true, |g| g.width != w || g.height != h);
                    if stale {
                        if let Some(old) = entry.gpu.take() {
                            old.texture.destroy();
                        }
                        entry.gpu = Some(create_media_texture(device, "video_tex", w, h));
                        entry.version += 1;
                    }
                    if let Some(gpu) = &entry.gpu {
                        upload(queue, wgpu::ExternalImageSource::HTMLVideoElement(video.clone()), gpu);
                    }
                }
            }
        }
    }

    /// The texture to sample for `id`: the media once ready, else the placeholder.
    pub(crate) fn view(&self, id: TextureId) -> &wgpu::TextureView {
        self.entries
            .get(&id)
            .and_then(|e| e.gpu.as_ref())
            .map(|g| &g.view)
            .unwrap_or(&self.placeholder.view)
    }

    pub(crate) fn version(&self, id: TextureId) -> u32 {
        self.entries.get(&id).map(|e| e.version).unwrap_or(0)
    }
}

fn create_media_texture(device: &wgpu::Device, label: &str, width: u32, height: u32) -> GpuTexture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: MEDIA_FORMAT,
        // external copies require RENDER_ATTACHMENT on the destination
        usage: wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_DST
            | wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTexture {
        texture,
        view,
        width,
        height,
    }
}

fn upload(queue: &wgpu::Queue, source: wgpu::ExternalImageSource, gpu: &GpuTexture) {
    queue.copy_external_image_to_texture(
        &wgpu::CopyExternalImageSourceInfo {
            source,
            origin: wgpu::Origin2d::ZERO,
            flip_y: false,
        },
        wgpu::CopyExternalImageDestInfo {
            texture: &gpu.texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
            color_space: wgpu::PredefinedColorSpace::Srgb,
            premultiplied_alpha: false,
        },
        wgpu::Extent3d {
            width: gpu.width,
            height: gpu.height,
            depth_or_array_layers: 1,
        },
    );
}
