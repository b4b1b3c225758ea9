//! wgpu backend for the 3D scene
//!
//! `render` only prepares a frame: it uploads meshes the first time a geometry
//! is seen, packs one instance per visible mesh and writes the light uniform.
//! `encode` records the background, opaque and transparent draws into the
//! caller's encoder so UI passes can follow on the same target.

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::Arc;

use common::graphics::{create_depth_view, DEPTH_FORMAT};
use common::GraphicsContext;
use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::mesh::{MeshData, MeshVertex};
use crate::molecule::{
    DrawItem, GeometryId, Material, MaterialId, MoleculeGraph, PlacedLight, ResourceReleaser, Shading,
};
use crate::scene::{Lights, SceneBackend, SceneFrame};

/// Point lights the shader evaluates, accent light included
pub const MAX_LIGHTS: usize = 8;

pub const BACKGROUND_TOP: u32 = 0x1a1a2e;
pub const BACKGROUND_BOTTOM: u32 = 0x0f0f23;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightRaw {
    /// xyz position, w range
    pub position: [f32; 4],
    /// rgb color, w intensity
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// rgb premultiplied by intensity
    pub ambient: [f32; 4],
    /// Toward the light
    pub sun_direction: [f32; 4],
    pub sun_color: [f32; 4],
    pub background_top: [f32; 4],
    pub background_bottom: [f32; 4],
    pub light_count: [u32; 4],
    pub lights: [LightRaw; MAX_LIGHTS],
}

impl SceneUniform {
    pub fn new(frame: &SceneFrame<'_>, placed: &[PlacedLight]) -> Self {
        let camera = frame.camera;
        let lights: &Lights = frame.lights;
        let scaled = |rgb: [f32; 3], k: f32| [rgb[0] * k, rgb[1] * k, rgb[2] * k, 1.0];

        let mut packed = [LightRaw::default(); MAX_LIGHTS];
        let mut count = 0;
        for light in std::iter::once(&lights.accent).chain(placed).take(MAX_LIGHTS) {
            let p = light.position;
            let c = light.light.color;
            packed[count] = LightRaw {
                position: [p.x, p.y, p.z, light.light.range],
                color: [c[0], c[1], c[2], light.light.intensity],
            };
            count += 1;
        }
        if placed.len() + 1 > MAX_LIGHTS {
            log::trace!("Dropping {} point lights over the limit", placed.len() + 1 - MAX_LIGHTS);
        }

        let sun = lights.directional_direction;
        let top = common::hex(BACKGROUND_TOP);
        let bottom = common::hex(BACKGROUND_BOTTOM);
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_position: [camera.position.x, camera.position.y, camera.position.z, 1.0],
            ambient: scaled(lights.ambient_color, lights.ambient_intensity),
            sun_direction: [sun.x, sun.y, sun.z, 0.0],
            sun_color: scaled(lights.directional_color, lights.directional_intensity),
            background_top: top,
            background_bottom: bottom,
            light_count: [count as u32, 0, 0, 0],
            lights: packed,
        }
    }
}

/// Per-mesh data, one per visible node
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshInstance {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
    /// rgb, w opacity
    pub color: [f32; 4],
    /// rgb premultiplied by intensity, w is 1 for unlit materials
    pub emissive: [f32; 4],
    /// metalness, roughness
    pub surface: [f32; 4],
}

impl MeshInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 10] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32x4,
        9 => Float32x4,
        10 => Float32x4,
        11 => Float32x4,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }

    pub fn new(item: &DrawItem, material: &Material) -> Self {
        let n = item.normal.to_cols_array_2d();
        let pad = |c: [f32; 3]| [c[0], c[1], c[2], 0.0];
        let glow = material.emissive_intensity;
        let unlit = if material.shading == Shading::Unlit { 1.0 } else { 0.0 };
        Self {
            model: item.world.to_cols_array_2d(),
            normal: [pad(n[0]), pad(n[1]), pad(n[2])],
            color: [material.color[0], material.color[1], material.color[2], material.opacity],
            emissive: [
                material.emissive[0] * glow,
                material.emissive[1] * glow,
                material.emissive[2] * glow,
                unlit,
            ],
            surface: [material.metalness, material.roughness, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub geometry: GeometryId,
    pub instances: Range<u32>,
    pub transparent: bool,
}

/// Instances and draw calls for one frame
#[derive(Debug, Default, Clone)]
pub struct FramePlan {
    pub instances: Vec<MeshInstance>,
    pub draws: Vec<DrawCall>,
}

impl FramePlan {
    /// Opaque meshes grouped by geometry, then transparent meshes back to front
    pub fn build(graph: &MoleculeGraph, items: &[DrawItem], eye: Vec3) -> Self {
        let mut opaque = Vec::new();
        let mut transparent = Vec::new();
        for item in items {
            let Some(material) = graph.material(item.material) else {
                continue;
            };
            let instance = MeshInstance::new(item, material);
            if material.is_transparent() {
                let depth = item.world.w_axis.truncate().distance_squared(eye);
                transparent.push((item.geometry, instance, depth));
            } else {
                opaque.push((item.geometry, instance));
            }
        }
        opaque.sort_by_key(|(g, _)| (g.generation, g.index));
        transparent.sort_by(|a, b| b.2.total_cmp(&a.2));

        let mut plan = FramePlan::default();
        for (geometry, instance) in opaque {
            plan.push(geometry, instance, false);
        }
        for (geometry, instance, _) in transparent {
            plan.push(geometry, instance, true);
        }
        plan
    }

    fn push(&mut self, geometry: GeometryId, instance: MeshInstance, transparent: bool) {
        let index = self.instances.len() as u32;
        self.instances.push(instance);
        match self.draws.last_mut() {
            Some(last) if last.geometry == geometry && last.transparent == transparent => {
                last.instances.end = index + 1;
            }
            _ => self.draws.push(DrawCall {
                geometry,
                instances: index..index + 1,
                transparent,
            }),
        }
    }
}

struct GpuMesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

struct Pipelines {
    background: wgpu::RenderPipeline,
    opaque: wgpu::RenderPipeline,
    transparent: wgpu::RenderPipeline,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    depth_view: wgpu::TextureView,
}

pub struct MoleculeRenderer {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    size: Option<(u32, u32)>,
    gpu: Option<Pipelines>,
    meshes: HashMap<GeometryId, GpuMesh>,
    materials: HashSet<MaterialId>,
    plan: FramePlan,
    items: Vec<DrawItem>,
    placed: Vec<PlacedLight>,
}

impl MoleculeRenderer {
    pub fn new(ctx: &GraphicsContext) -> Self {
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Molecule Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/molecule.wgsl").into()),
        });

        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Buffer"),
            size: std::mem::size_of::<SceneUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Molecule Pipeline Layout"),
            bind_group_layouts: &[&scene_bind_group_layout],
            push_constant_ranges: &[],
        });

        let mesh_pipeline = |label: &str, blend: wgpu::BlendState, depth_write: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs_mesh",
                    buffers: &[MeshVertex::desc(), MeshInstance::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "fs_mesh",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.config.format,
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: depth_write,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            })
        };

        let opaque = mesh_pipeline("Opaque Mesh Pipeline", wgpu::BlendState::REPLACE, true);
        let transparent = mesh_pipeline("Transparent Mesh Pipeline", wgpu::BlendState::ALPHA_BLENDING, false);

        // Fullscreen gradient behind everything
        let background = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Background Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_background",
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_background",
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
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let instance_capacity = 256;
        let instance_buffer = Self::create_instance_buffer(device, instance_capacity);
        let depth_view = create_depth_view(device, ctx.size.width, ctx.size.height);

        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            size: Some((ctx.size.width, ctx.size.height)),
            gpu: Some(Pipelines {
                background,
                opaque,
                transparent,
                scene_buffer,
                scene_bind_group,
                instance_buffer,
                instance_capacity,
                depth_view,
            }),
            meshes: HashMap::new(),
            materials: HashSet::new(),
            plan: FramePlan::default(),
            items: Vec::new(),
            placed: Vec::new(),
        }
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Mesh Instance Buffer"),
            size: (std::mem::size_of::<MeshInstance>() * capacity) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Uploaded meshes and materials in use
    pub fn resident(&self) -> (usize, usize) {
        (self.meshes.len(), self.materials.len())
    }

    fn upload(&mut self, graph: &MoleculeGraph) {
        for item in &self.items {
            self.materials.insert(item.material);
            if self.meshes.contains_key(&item.geometry) {
                continue;
            }
            let Some(geometry) = graph.geometry(item.geometry) else {
                continue;
            };
            let data = MeshData::for_geometry(geometry);
            let vertices = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: bytemuck::cast_slice(&data.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let indices = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Index Buffer"),
                contents: bytemuck::cast_slice(&data.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            self.meshes.insert(
                item.geometry,
                GpuMesh {
                    vertices,
                    indices,
                    index_count: data.indices.len() as u32,
                },
            );
        }
    }

    /// Record the scene passes for the last prepared frame
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let Some(gpu) = &self.gpu else {
            return;
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Molecule Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &gpu.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(0, &gpu.scene_bind_group, &[]);
        render_pass.set_pipeline(&gpu.background);
        render_pass.draw(0..3, 0..1);

        if self.plan.draws.is_empty() {
            return;
        }
        render_pass.set_vertex_buffer(1, gpu.instance_buffer.slice(..));

        let mut transparent = None;
        for draw in &self.plan.draws {
            let Some(mesh) = self.meshes.get(&draw.geometry) else {
                continue;
            };
            if transparent != Some(draw.transparent) {
                transparent = Some(draw.transparent);
                render_pass.set_pipeline(if draw.transparent { &gpu.transparent } else { &gpu.opaque });
            }
            render_pass.set_vertex_buffer(0, mesh.vertices.slice(..));
            render_pass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.index_count, 0, draw.instances.clone());
        }
    }
}

impl ResourceReleaser for MoleculeRenderer {
    fn release_geometry(&mut self, id: GeometryId) {
        if let Some(mesh) = self.meshes.remove(&id) {
            mesh.vertices.destroy();
            mesh.indices.destroy();
        }
    }

    fn release_material(&mut self, id: MaterialId) {
        self.materials.remove(&id);
    }
}

impl SceneBackend for MoleculeRenderer {
    fn container_size(&self) -> Option<(u32, u32)> {
        self.size
    }

    fn resize(&mut self, width: u32, height: u32) {
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.depth_view = create_depth_view(&self.device, width, height);
            self.size = Some((width, height));
        }
    }

    fn render(&mut self, frame: &SceneFrame<'_>) {
        if self.gpu.is_none() {
            return;
        }

        self.items.clear();
        self.placed.clear();
        if let Some(graph) = frame.molecule {
            graph.collect(&mut self.items, &mut self.placed);
            self.upload(graph);
            self.plan = FramePlan::build(graph, &self.items, frame.camera.position);
        } else {
            self.plan = FramePlan::default();
        }

        let uniform = SceneUniform::new(frame, &self.placed);
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        self.queue.write_buffer(&gpu.scene_buffer, 0, bytemuck::cast_slice(&[uniform]));

        let needed = self.plan.instances.len();
        if needed > gpu.instance_capacity {
            gpu.instance_capacity = needed.next_power_of_two();
            gpu.instance_buffer = Self::create_instance_buffer(&self.device, gpu.instance_capacity);
            log::debug!("Grew instance buffer to {}", gpu.instance_capacity);
        }
        if needed > 0 {
            self.queue
                .write_buffer(&gpu.instance_buffer, 0, bytemuck::cast_slice(&self.plan.instances));
        }
    }

    fn release(&mut self) {
        for (_, mesh) in self.meshes.drain() {
            mesh.vertices.destroy();
            mesh.indices.destroy();
        }
        self.materials.clear();
        self.plan = FramePlan::default();
        if let Some(gpu) = self.gpu.take() {
            gpu.instance_buffer.destroy();
            gpu.scene_buffer.destroy();
        }
        self.size = None;
        log::debug!("Molecule renderer released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::{Geometry, MoleculeGraph, Transform};

    fn graph_with(materials: &[Material]) -> (MoleculeGraph, Vec<DrawItem>) {
        let mut graph = MoleculeGraph::new(3);
        let root = graph.root();
        let sphere = graph.add_geometry(Geometry::Sphere { radius: 0.5, segments: 8 });
        let cube = graph.add_geometry(Geometry::Cuboid { size: Vec3::ONE });
        for (i, material) in materials.iter().enumerate() {
            let id = graph.add_material(*material);
            let geometry = if i % 2 == 0 { sphere } else { cube };
            graph.add_mesh(root, geometry, id, Transform::at(Vec3::new(0.0, 0.0, -(i as f32))));
        }
        let mut items = Vec::new();
        graph.collect(&mut items, &mut Vec::new());
        (graph, items)
    }

    #[test]
    fn test_opaque_meshes_batch_by_geometry() {
        let solid = Material::standard(0xff0000);
        let (graph, items) = graph_with(&[solid, solid, solid, solid]);
        let plan = FramePlan::build(&graph, &items, Vec3::new(0.0, 0.0, 8.0));
        assert_eq!(plan.instances.len(), 4);
        assert_eq!(plan.draws.len(), 2);
        assert!(plan.draws.iter().all(|d| !d.transparent));
        assert_eq!(plan.draws[0].instances, 0..2);
        assert_eq!(plan.draws[1].instances, 2..4);
    }

    #[test]
    fn test_transparent_meshes_draw_last_back_to_front() {
        let solid = Material::standard(0x00ff00);
        let glass = Material::standard(0x0000ff).translucent(0.5);
        let (graph, items) = graph_with(&[glass, solid, glass, glass]);
        let plan = FramePlan::build(&graph, &items, Vec3::new(0.0, 0.0, 8.0));

        assert!(!plan.draws[0].transparent);
        let transparent: Vec<&DrawCall> = plan.draws.iter().filter(|d| d.transparent).collect();
        let count: u32 = transparent.iter().map(|d| d.instances.len() as u32).sum();
        assert_eq!(count, 3);

        // Farthest from the eye first
        let depths: Vec<f32> = plan.instances[1..].iter().map(|i| i.model[3][2]).collect();
        assert_eq!(depths, vec![-3.0, -2.0, 0.0]);
    }

    #[test]
    fn test_instance_packs_material() {
        let material = Material::unlit(0xffffff, 0.25).glowing(0xff0000, 2.0);
        let (graph, items) = graph_with(&[material]);
        let plan = FramePlan::build(&graph, &items, Vec3::ZERO);
        let instance = plan.instances[0];
        assert_eq!(instance.color[3], 0.25);
        assert_eq!(instance.emissive, [2.0, 0.0, 0.0, 1.0]);
        assert_eq!(instance.model[3], [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_uniform_is_aligned_for_wgsl() {
        assert_eq!(std::mem::size_of::<SceneUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<MeshInstance>(), 4 * 4 * 10);
    }
}
