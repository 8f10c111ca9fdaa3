use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use winit::dpi::PhysicalSize;

use crate::coords::Rect;
use crate::device::FramePacket;

use super::EncodeCtx;

/// Instanced quad renderer for frame packets.
///
/// Each frame gets one render pass that clears to the packet's clear color.
/// Quads are drawn as 4-vertex triangle strips whose corners come from
/// `vertex_index`, so the only vertex buffer is the per-instance one. Items
/// sharing a clip rect are batched into a single draw call.
#[derive(Default)]
pub struct QuadRenderer {
    pipeline: Option<QuadPipeline>,
    instances: Option<InstanceBuffer>,

    // Reused between frames.
    staged: Vec<QuadInstance>,
    clips: Vec<Option<Rect>>,
}

/// Pipeline plus the viewport uniform it binds. Rebuilt as a unit when the
/// target format changes.
struct QuadPipeline {
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    viewport: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct InstanceBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
}

impl QuadRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes the clear pass and all packet quads into `ctx.view`.
    pub fn encode(&mut self, ctx: &mut EncodeCtx<'_>, packet: &FramePacket<'_>) {
        self.stage(packet);

        if !self.staged.is_empty() {
            self.upload(ctx);
        }

        let mut pass = ctx.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("lumen frame pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: ctx.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(to_wgpu_color(packet.clear.premultiplied())),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let (Some(pipe), Some(inst)) = (&self.pipeline, &self.instances) else {
            return;
        };
        if self.staged.is_empty() {
            return;
        }

        pass.set_pipeline(&pipe.pipeline);
        pass.set_bind_group(0, &pipe.bind_group, &[]);
        pass.set_vertex_buffer(0, inst.buffer.slice(..));

        for (clip, run) in clip_runs(&self.clips) {
            if let Some((x, y, w, h)) = clip_to_scissor(clip, ctx.output) {
                pass.set_scissor_rect(x, y, w, h);
                pass.draw(0..4, run);
            }
        }
    }

    /// Flattens packet items into instances, keeping each quad's clip.
    fn stage(&mut self, packet: &FramePacket<'_>) {
        self.staged.clear();
        self.clips.clear();

        let (staged, clips) = (&mut self.staged, &mut self.clips);
        for item in packet.items {
            item.cmd.for_each_quad(|rect, color| {
                staged.push(QuadInstance {
                    origin: [rect.origin.x, rect.origin.y],
                    size: [rect.size.x, rect.size.y],
                    color: color.premultiplied(),
                });
                clips.push(item.clip);
            });
        }
    }

    fn upload(&mut self, ctx: &EncodeCtx<'_>) {
        let pipe = match self.pipeline.take() {
            Some(p) if p.format == ctx.format => p,
            _ => QuadPipeline::build(ctx.device, ctx.format),
        };
        let uniform = ViewportUniform {
            size: ctx.output_f32(),
            _pad: [0.0; 2],
        };
        ctx.queue
            .write_buffer(&pipe.viewport, 0, bytemuck::bytes_of(&uniform));
        self.pipeline = Some(pipe);

        let needed = self.staged.len();
        let inst = match self.instances.take() {
            Some(b) if b.capacity >= needed => b,
            _ => InstanceBuffer::with_capacity(ctx.device, needed),
        };
        ctx.queue
            .write_buffer(&inst.buffer, 0, bytemuck::cast_slice(&self.staged));
        self.instances = Some(inst);
    }
}

impl QuadPipeline {
    fn build(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen quad shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/quad.wgsl").into()),
        });

        let uniform_size = std::mem::size_of::<ViewportUniform>() as u64;
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lumen viewport layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(uniform_size),
                },
                count: None,
            }],
        });

        let viewport = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen viewport uniform"),
            size: uniform_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen viewport bind group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lumen quad layout"),
            bind_group_layouts: &[&layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lumen quad pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("quad pipeline built for {format:?}");

        Self {
            format,
            pipeline,
            viewport,
            bind_group,
        }
    }
}

impl InstanceBuffer {
    /// Grows in powers of two, never below 64 instances.
    fn with_capacity(device: &wgpu::Device, needed: usize) -> Self {
        let capacity = needed.next_power_of_two().max(64);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen quad instances"),
            size: (capacity * std::mem::size_of::<QuadInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        log::trace!("quad instance buffer resized to {capacity}");
        Self { buffer, capacity }
    }
}

fn to_wgpu_color([r, g, b, a]: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: r.into(),
        g: g.into(),
        b: b.into(),
        a: a.into(),
    }
}

/// Splits per-instance clips into maximal runs of equal clips.
fn clip_runs(clips: &[Option<Rect>]) -> impl Iterator<Item = (Option<Rect>, Range<u32>)> + '_ {
    let mut start = 0;
    std::iter::from_fn(move || {
        let clip = *clips.get(start)?;
        let len = clips[start..].iter().take_while(|c| **c == clip).count();
        let run = start as u32..(start + len) as u32;
        start += len;
        Some((clip, run))
    })
}

/// Converts a physical clip rect into scissor arguments clamped to the output.
///
/// Edges are rounded outward. `None` clip means the whole output; a result of
/// `None` means the clip has no visible area and the draw is skipped.
fn clip_to_scissor(clip: Option<Rect>, output: PhysicalSize<u32>) -> Option<(u32, u32, u32, u32)> {
    let (ow, oh) = (output.width, output.height);
    let Some(r) = clip else {
        return (ow > 0 && oh > 0).then_some((0, 0, ow, oh));
    };

    let r = r.normalized();
    let edge = |v: f32, max: u32| (v.max(0.0) as u32).min(max);
    let x0 = edge(r.origin.x.floor(), ow);
    let y0 = edge(r.origin.y.floor(), oh);
    let x1 = edge((r.origin.x + r.size.x).ceil(), ow);
    let y1 = edge((r.origin.y + r.size.y).ceil(), oh);

    (x1 > x0 && y1 > y0).then_some((x0, y0, x1 - x0, y1 - y0))
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ViewportUniform {
    size: [f32; 2],
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadInstance {
    origin: [f32; 2],
    size: [f32; 2],
    color: [f32; 4],
}

impl QuadInstance {
    const ATTRS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
