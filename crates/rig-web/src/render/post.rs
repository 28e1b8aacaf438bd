use rig_core::PostUniforms;

use super::helpers;

pub(crate) struct PostResources {
    pub(crate) bgl0: wgpu::BindGroupLayout, // tex+sampler+uniform
    pub(crate) uniform_buffer: wgpu::Buffer,
    pub(crate) sampler: wgpu::Sampler,
    pub(crate) copy_pipeline: wgpu::RenderPipeline,
    pub(crate) fxaa_pipeline: wgpu::RenderPipeline,
    pub(crate) accumulate_pipeline: wgpu::RenderPipeline,
}

/// `dst += src * constant`; the constant is 1/N for N jitter samples.
const ACCUMULATE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::Constant,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::Constant,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

pub(crate) fn create_post_resources(
    device: &wgpu::Device,
    post_shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
) -> PostResources {
    let bgl0 = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("post_bgl0"),
        entries: &[
            helpers::texture_layout_entry(0),
            helpers::sampler_layout_entry(1),
            helpers::uniform_layout_entry(2, wgpu::ShaderStages::FRAGMENT),
        ],
    });
    let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("post_uniforms"),
        size: std::mem::size_of::<PostUniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pl_post"),
        bind_group_layouts: &[&bgl0],
        push_constant_ranges: &[],
    });
    let copy_pipeline = helpers::make_post_pipeline(
        device,
        "copy_pipeline",
        &layout,
        post_shader,
        "fs_copy",
        format,
        Some(wgpu::BlendState::REPLACE),
    );
    let fxaa_pipeline = helpers::make_post_pipeline(
        device,
        "fxaa_pipeline",
        &layout,
        post_shader,
        "fs_fxaa",
        format,
        Some(wgpu::BlendState::REPLACE),
    );
    let accumulate_pipeline = helpers::make_post_pipeline(
        device,
        "accumulate_pipeline",
        &layout,
        post_shader,
        "fs_copy",
        format,
        Some(ACCUMULATE_BLEND),
    );

    PostResources {
        bgl0,
        uniform_buffer,
        sampler: helpers::linear_sampler(device, "post_sampler"),
        copy_pipeline,
        fxaa_pipeline,
        accumulate_pipeline,
    }
}

impl PostResources {
    /// Bind group sampling `source` through the post program.
    pub(crate) fn bind_source(&self, device: &wgpu::Device, label: &str, source: &wgpu::TextureView) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.bgl0,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        })
    }
}

pub(crate) fn blit(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    load: wgpu::LoadOp<wgpu::Color>,
    pipeline: &wgpu::RenderPipeline,
    bg0: &wgpu::BindGroup,
    blend_constant: Option<wgpu::Color>,
) {
    let mut r = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    r.set_pipeline(pipeline);
    r.set_bind_group(0, bg0, &[]);
    if let Some(c) = blend_constant {
        r.set_blend_constant(c);
    }
    r.draw(0..3, 0..1);
    drop(r);
}
