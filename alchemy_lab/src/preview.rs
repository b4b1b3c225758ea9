//! wgpu renderer for the 2D reaction preview
//!
//! Sprites are drawn into a persistent canvas texture so each frame's
//! translucent wash leaves fading trails, then the canvas is copied into a
//! corner of the window.

use common::{Camera2D, CameraUniform, GraphicsContext, Rgba};
use wgpu::util::DeviceExt;

use crate::config::PreviewConfig;
use crate::particles::{Sprite, SpriteList, SpriteShape, PREVIEW_BACKGROUND};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct QuadVertex {
    corner: [f32; 2],
}

impl QuadVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

const QUAD_VERTICES: &[QuadVertex] = &[
    QuadVertex { corner: [-1.0, -1.0] },
    QuadVertex { corner: [1.0, -1.0] },
    QuadVertex { corner: [1.0, 1.0] },
    QuadVertex { corner: [-1.0, -1.0] },
    QuadVertex { corner: [1.0, 1.0] },
    QuadVertex { corner: [-1.0, 1.0] },
];

/// One sprite on the GPU, in y-up canvas space
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteInstance {
    pub center: [f32; 2],
    /// Shape radius and the half size of the quad that covers shape and glow
    pub extent: [f32; 2],
    pub color: [f32; 4],
    pub glow_color: [f32; 4],
    /// shape, stroke, fill alpha, glow blur
    pub params: [f32; 4],
}

impl SpriteInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        1 => Float32x2,
        2 => Float32x2,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }

    /// Canvas sprites have y pointing down; the GPU canvas has y up
    pub fn from_sprite(sprite: &Sprite, canvas_height: f32) -> Self {
        let (shape, stroke, fill_alpha) = match sprite.shape {
            SpriteShape::Disc => (0.0, 0.0, 0.0),
            SpriteShape::Ring { stroke, fill_alpha } => (1.0, stroke, fill_alpha),
            SpriteShape::Square => (2.0, 0.0, 0.0),
        };
        let (glow_color, blur) = match sprite.glow {
            Some(glow) => (glow.color, glow.blur),
            None => ([0.0; 4], 0.0),
        };
        let radius = sprite.radius.max(0.0);
        let outline = if stroke > 0.0 { stroke * 0.5 } else { 0.0 };
        // Squares reach their corners at radius * sqrt(2)
        let reach = if shape == 2.0 { radius * std::f32::consts::SQRT_2 } else { radius };

        Self {
            center: [sprite.center.x, canvas_height - sprite.center.y],
            extent: [radius, reach + outline + blur + 1.0],
            color: sprite.color,
            glow_color,
            params: [shape, stroke, fill_alpha, blur],
        }
    }

    /// A square covering the whole canvas
    pub fn wash(color: Rgba, width: f32, height: f32) -> Self {
        let half = width.max(height) * 0.5;
        Self {
            center: [width * 0.5, height * 0.5],
            extent: [half, half + 1.0],
            color,
            glow_color: [0.0; 4],
            params: [2.0, 0.0, 0.0, 0.0],
        }
    }
}

/// Screen rectangle for the canvas: bottom-right corner, scaled down to fit
pub fn corner_viewport(surface: (u32, u32), config: &PreviewConfig) -> Option<[f32; 4]> {
    let (sw, sh) = (surface.0 as f32, surface.1 as f32);
    let room_w = sw - 2.0 * config.margin;
    let room_h = sh - 2.0 * config.margin;
    let scale = (room_w / config.width).min(room_h / config.height).min(1.0);
    if scale <= 0.0 {
        return None;
    }
    let (w, h) = (config.width * scale, config.height * scale);
    Some([sw - config.margin - w, sh - config.margin - h, w, h])
}

pub struct PreviewRenderer {
    config: PreviewConfig,
    sprite_pipeline: wgpu::RenderPipeline,
    blit_pipeline: wgpu::RenderPipeline,
    quad_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    max_instances: usize,
    camera_bind_group: wgpu::BindGroup,
    canvas_view: wgpu::TextureView,
    blit_bind_group: wgpu::BindGroup,
    instances: Vec<SpriteInstance>,
    clear_canvas: bool,
    visible: bool,
}

impl PreviewRenderer {
    pub fn new(ctx: &GraphicsContext, config: &PreviewConfig) -> Self {
        let device = &ctx.device;
        // The wash and every live particle
        let max_instances = config.capacity + 1;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Preview Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/preview.wgsl").into()),
        });

        let camera = Camera2D::for_canvas(config.width, config.height);
        let camera_buffer = common::create_uniform_buffer(device, &CameraUniform::from_camera_2d(&camera));

        let camera_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Preview Camera Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Preview Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let canvas_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Preview Canvas"),
            size: wgpu::Extent3d {
                width: config.width.max(1.0) as u32,
                height: config.height.max(1.0) as u32,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: ctx.config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let canvas_view = canvas_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Preview Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let blit_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Preview Blit Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let blit_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Preview Blit Bind Group"),
            layout: &blit_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&canvas_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let sprite_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Preview Sprite Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let sprite_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Preview Sprite Pipeline"),
            layout: Some(&sprite_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_sprite",
                buffers: &[QuadVertex::layout(), SpriteInstance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_sprite",
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let blit_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Preview Blit Pipeline Layout"),
            bind_group_layouts: &[&blit_bind_group_layout],
            push_constant_ranges: &[],
        });

        let blit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Preview Blit Pipeline"),
            layout: Some(&blit_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_blit",
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_blit",
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Preview Quad Buffer"),
            contents: bytemuck::cast_slice(QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Preview Instance Buffer"),
            size: (std::mem::size_of::<SpriteInstance>() * max_instances) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            config: *config,
            sprite_pipeline,
            blit_pipeline,
            quad_buffer,
            instance_buffer,
            max_instances,
            camera_bind_group,
            canvas_view,
            blit_bind_group,
            instances: Vec::with_capacity(max_instances),
            clear_canvas: true,
            visible: false,
        }
    }

    /// Start showing a fresh canvas
    pub fn begin(&mut self) {
        self.clear_canvas = true;
        self.visible = true;
        self.instances.clear();
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.instances.clear();
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Upload what the particle run drew this frame
    pub fn prepare(&mut self, queue: &wgpu::Queue, sprites: &SpriteList) {
        self.instances.clear();
        if let Some(color) = sprites.background {
            self.instances
                .push(SpriteInstance::wash(color, self.config.width, self.config.height));
        }
        let height = self.config.height;
        let room = self.max_instances - self.instances.len();
        self.instances.extend(
            sprites
                .sprites
                .iter()
                .take(room)
                .map(|s| SpriteInstance::from_sprite(s, height)),
        );
        if !self.instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&self.instances));
        }
    }

    /// Draw the prepared sprites into the canvas and copy the canvas onto
    /// `view`, which is `surface_size` pixels large
    pub fn encode(&mut self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, surface_size: (u32, u32)) {
        if !self.visible {
            return;
        }

        let [r, g, b] = PREVIEW_BACKGROUND;
        let load = if self.clear_canvas {
            self.clear_canvas = false;
            wgpu::LoadOp::Clear(wgpu::Color {
                r: r as f64 / 255.0,
                g: g as f64 / 255.0,
                b: b as f64 / 255.0,
                a: 1.0,
            })
        } else {
            wgpu::LoadOp::Load
        };

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Preview Canvas Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.canvas_view,
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

            if !self.instances.is_empty() {
                render_pass.set_pipeline(&self.sprite_pipeline);
                render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
                render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                render_pass.draw(0..6, 0..self.instances.len() as u32);
            }
        }
        // Sprites are drawn once; later frames only see them through the canvas
        self.instances.clear();

        let Some([x, y, w, h]) = corner_viewport(surface_size, &self.config) else {
            return;
        };
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Preview Blit Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        render_pass.set_viewport(x, y, w, h, 0.0, 1.0);
        render_pass.set_pipeline(&self.blit_pipeline);
        render_pass.set_bind_group(0, &self.blit_bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}
