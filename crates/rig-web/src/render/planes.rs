//! Plane program: one pipeline per sample count, and the GPU side of every
//! mesh (vertex buffer, uniform buffer, bind group).

use fnv::FnvHashMap;
use glam::Vec2;
use rig_core::{CameraUniforms, MeshId, OrthoCamera, PlaneUniforms, Scene, TextureId};
use smallvec::SmallVec;
use wgpu::util::DeviceExt;

use super::helpers;
use super::textures::TextureStore;

struct PlaneDraw {
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    texture: TextureId,
    texture_version: u32,
}

struct CameraSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub(crate) struct PlaneResources {
    item_bgl: wgpu::BindGroupLayout, // uniform+tex+sampler
    camera_bgl: wgpu::BindGroupLayout,
    layout: wgpu::PipelineLayout,
    shader: wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    sampler: wgpu::Sampler,
    pipelines: SmallVec<[(u32, wgpu::RenderPipeline); 2]>,
    draws: FnvHashMap<MeshId, PlaneDraw>,
    cameras: SmallVec<[CameraSlot; 4]>,
}

impl PlaneResources {
    pub(crate) fn new(device: &wgpu::Device, format: wgpu::TextureFormat, source: &str) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("plane_shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let item_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("plane_bgl0"),
            entries: &[
                helpers::uniform_layout_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                helpers::texture_layout_entry(1),
                helpers::sampler_layout_entry(2),
            ],
        });
        let camera_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("plane_bgl1"),
            entries: &[helpers::uniform_layout_entry(0, wgpu::ShaderStages::VERTEX)],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl_plane"),
            bind_group_layouts: &[&item_bgl, &camera_bgl],
            push_constant_ranges: &[],
        });
        Self {
            item_bgl,
            camera_bgl,
            layout,
            shader,
            format,
            sampler: helpers::linear_sampler(device, "media_sampler"),
            pipelines: SmallVec::new(),
            draws: FnvHashMap::default(),
            cameras: SmallVec::new(),
        }
    }

    pub(crate) fn ensure_pipeline(&mut self, device: &wgpu::Device, samples: u32) {
        if self.pipeline(samples).is_none() {
            let p = helpers::make_plane_pipeline(device, &self.layout, &self.shader, self.format, samples);
            self.pipelines.push((samples, p));
        }
    }

    pub(crate) fn pipeline(&self, samples: u32) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.iter().find(|(s, _)| *s == samples).map(|(_, p)| p)
    }

    /// Mirror the scene: create GPU state for new meshes, rebind swapped
    /// textures, write this frame's uniforms and drop removed meshes.
    pub(crate) fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &Scene, textures: &TextureStore) {
        self.draws.retain(|id, _| scene.contains(*id));

        for (id, mesh) in scene.iter() {
            let version = textures.version(mesh.texture);
            let stale = self
                .draws
                .get(&id)
                .map_or(true, |d| d.texture != mesh.texture || d.texture_version != version);
            if stale {
                let draw = match self.draws.remove(&id) {
                    Some(mut d) => {
                        d.bind_group = self.bind_item(device, &d.uniform_buffer, textures.view(mesh.texture));
                        d.texture = mesh.texture;
                        d.texture_version = version;
                        d
                    }
                    None => {
                        let vertices = mesh.geometry.vertices();
                        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some("plane_vertices"),
                            contents: bytemuck::cast_slice(&vertices),
                            usage: wgpu::BufferUsages::VERTEX,
                        });
                        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                            label: Some("plane_uniforms"),
                            size: std::mem::size_of::<PlaneUniforms>() as u64,
                            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                            mapped_at_creation: false,
                        });
                        let bind_group = self.bind_item(device, &uniform_buffer, textures.view(mesh.texture));
                        PlaneDraw {
                            vertex_buffer,
                            uniform_buffer,
                            bind_group,
                            texture: mesh.texture,
                            texture_version: version,
                        }
                    }
                };
                self.draws.insert(id, draw);
            }
            if let Some(d) = self.draws.get(&id) {
                queue.write_buffer(&d.uniform_buffer, 0, bytemuck::bytes_of(&mesh.uniforms));
            }
        }
    }

    fn bind_item(&self, device: &wgpu::Device, uniforms: &wgpu::Buffer, view: &wgpu::TextureView) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("plane_bg0"),
            layout: &self.item_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    /// One camera block per jitter offset. Each sample needs its own buffer:
    /// all writes land before the frame's commands execute.
    pub(crate) fn write_cameras(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera: &OrthoCamera,
        jitter: &[Vec2],
        target_px: Vec2,
    ) {
        while self.cameras.len() < jitter.len() {
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("camera_uniforms"),
                size: std::mem::size_of::<CameraUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("plane_bg1"),
                layout: &self.camera_bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            self.cameras.push(CameraSlot { buffer, bind_group });
        }
        for (slot, offset) in self.cameras.iter().zip(jitter) {
            let m = camera.jittered_view_projection(*offset, target_px);
            queue.write_buffer(&slot.buffer, 0, bytemuck::bytes_of(&CameraUniforms::from_matrix(m)));
        }
    }

    /// Record `order` (back to front) into an open pass.
    pub(crate) fn record(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        pipeline: &wgpu::RenderPipeline,
        camera_slot: usize,
        order: &[MeshId],
    ) {
        let Some(camera) = self.cameras.get(camera_slot) else {
            return;
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(1, &camera.bind_group, &[]);
        for id in order {
            if let Some(d) = self.draws.get(id) {
                pass.set_bind_group(0, &d.bind_group, &[]);
                pass.set_vertex_buffer(0, d.vertex_buffer.slice(..));
                pass.draw(0..6, 0..1);
            }
        }
    }
}
