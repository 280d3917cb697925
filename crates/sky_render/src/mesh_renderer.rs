//! Instanced, lit mesh renderer with a single directional shadow map.
//!
//! Each frame runs two passes into the caller's encoder:
//!
//!   1. shadow pass -- depth-only render of shadow casters from the light
//!   2. scene pass  -- clear to the background colour, draw every instance
//!      lit by ambient + directional light, sampling the shadow map
//!
//! Instances are batched by `ShapeKind` so each shape costs one draw call
//! per pass regardless of how many entities use it.

use std::ops::Range;

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::camera::PerspectiveCamera;
use crate::color::Color;
use crate::light::{AmbientLight, DirectionalLight};
use crate::shaders;
use crate::shapes::ShapeKind;
use crate::vertex::{InstanceRaw, MeshVertex};

const MAX_INSTANCES: usize = 256;
const SHADOW_MAP_SIZE: u32 = 2048;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub light_dir: [f32; 4],
    pub light_color: [f32; 4],
    pub ambient: [f32; 4],
}

impl SceneUniforms {
    pub fn new(camera: &PerspectiveCamera, ambient: &AmbientLight, sun: &DirectionalLight) -> Self {
        let scaled = |color: Color, intensity: f32| {
            let [r, g, b, _] = color.to_linear();
            [r * intensity, g * intensity, b * intensity, 1.0]
        };
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            light_view_proj: sun.shadow_view_projection().to_cols_array_2d(),
            light_dir: sun.to_light().extend(0.0).to_array(),
            light_color: scaled(sun.color, sun.intensity),
            ambient: scaled(ambient.color, ambient.intensity),
        }
    }
}

/// One drawable entity as the renderer sees it.
#[derive(Debug, Clone, Copy)]
pub struct MeshInstance {
    pub shape: ShapeKind,
    pub model: Mat4,
    pub color: Color,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl MeshInstance {
    fn to_raw(self) -> InstanceRaw {
        InstanceRaw {
            model: self.model.to_cols_array_2d(),
            color: self.color.to_linear(),
            params: [if self.receive_shadow { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

/// Everything one frame of rendering needs.
pub struct FrameScene<'a> {
    pub background: Color,
    pub camera: &'a PerspectiveCamera,
    pub ambient: &'a AmbientLight,
    pub sun: &'a DirectionalLight,
    pub instances: &'a [MeshInstance],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub draw_calls: u32,
    pub instance_count: u32,
    pub shadow_casters: u32,
}

/// Instances grouped by shape: raw data plus the instance range of each
/// shape, indexed by `ShapeKind::index()`.
#[derive(Debug, Default)]
pub struct InstanceBatches {
    pub raw: Vec<InstanceRaw>,
    pub ranges: [Range<u32>; 3],
}

impl InstanceBatches {
    pub fn build(instances: &[MeshInstance], include: impl Fn(&MeshInstance) -> bool) -> Self {
        let mut batches = Self::default();
        for &shape in ShapeKind::ALL {
            let start = batches.raw.len() as u32;
            batches.raw.extend(
                instances
                    .iter()
                    .filter(|inst| inst.shape == shape && include(*inst))
                    .map(|inst| inst.to_raw()),
            );
            batches.ranges[shape.index()] = start..batches.raw.len() as u32;
        }
        if batches.raw.len() > MAX_INSTANCES {
            log::warn!(
                "{} instances exceed capacity {}, dropping the excess",
                batches.raw.len(),
                MAX_INSTANCES
            );
            batches.raw.truncate(MAX_INSTANCES);
            let cap = MAX_INSTANCES as u32;
            for range in batches.ranges.iter_mut() {
                *range = range.start.min(cap)..range.end.min(cap);
            }
        }
        batches
    }

    pub fn draw_count(&self) -> u32 {
        self.ranges.iter().filter(|r| !r.is_empty()).count() as u32
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

pub struct MeshRenderer {
    mesh_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    shadow_bind_group: wgpu::BindGroup,
    shadow_view: wgpu::TextureView,
    meshes: Vec<GpuMesh>,
    instance_buffer: wgpu::Buffer,
    caster_buffer: wgpu::Buffer,
    depth_view: wgpu::TextureView,
}

impl MeshRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniform Buffer"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Uniform Layout"),
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
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Uniform Bind Group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // Shadow map and its comparison sampler
        let shadow_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map"),
            size: wgpu::Extent3d {
                width: SHADOW_MAP_SIZE,
                height: SHADOW_MAP_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let shadow_view = shadow_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Map Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });
        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Map Bind Group"),
            layout: &shadow_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                },
            ],
        });

        let mesh_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &shadow_layout],
            push_constant_ranges: &[],
        });
        let shadow_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Shadow Pipeline Layout"),
                bind_group_layouts: &[&uniform_layout],
                push_constant_ranges: &[],
            });

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });
        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SHADOW_SHADER.into()),
        });

        let mesh_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&mesh_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &mesh_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[MeshVertex::layout(), InstanceRaw::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &mesh_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let shadow_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&shadow_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shadow_shader,
                entry_point: Some("vs_shadow"),
                compilation_options: Default::default(),
                buffers: &[MeshVertex::layout(), InstanceRaw::layout()],
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let meshes = ShapeKind::ALL
            .iter()
            .map(|shape| {
                let data = shape.mesh();
                GpuMesh {
                    vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Mesh Vertex Buffer"),
                        contents: bytemuck::cast_slice(&data.vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    }),
                    index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Mesh Index Buffer"),
                        contents: bytemuck::cast_slice(&data.indices),
                        usage: wgpu::BufferUsages::INDEX,
                    }),
                    index_count: data.indices.len() as u32,
                }
            })
            .collect();

        let instance_buffer = create_instance_buffer(device, "Instance Buffer");
        let caster_buffer = create_instance_buffer(device, "Shadow Caster Buffer");
        let depth_view = create_depth_view(device, width, height);

        Self {
            mesh_pipeline,
            shadow_pipeline,
            uniform_buffer,
            uniform_bind_group,
            shadow_bind_group,
            shadow_view,
            meshes,
            instance_buffer,
            caster_buffer,
            depth_view,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_view = create_depth_view(device, width, height);
    }

    /// Record the shadow and scene passes for one frame.
    pub fn render(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        frame: &FrameScene<'_>,
    ) -> RenderStats {
        let uniforms = SceneUniforms::new(frame.camera, frame.ambient, frame.sun);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let all = InstanceBatches::build(frame.instances, |_| true);
        let casters = InstanceBatches::build(frame.instances, |inst| {
            frame.sun.cast_shadow && inst.cast_shadow
        });
        if !all.raw.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&all.raw));
        }
        if !casters.raw.is_empty() {
            queue.write_buffer(&self.caster_buffer, 0, bytemuck::cast_slice(&casters.raw));
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            pass.set_pipeline(&self.shadow_pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            self.draw_batches(&mut pass, &self.caster_buffer, &casters);
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(frame.background.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            pass.set_pipeline(&self.mesh_pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_bind_group(1, &self.shadow_bind_group, &[]);
            self.draw_batches(&mut pass, &self.instance_buffer, &all);
        }

        RenderStats {
            draw_calls: all.draw_count() + casters.draw_count(),
            instance_count: all.raw.len() as u32,
            shadow_casters: casters.raw.len() as u32,
        }
    }

    fn draw_batches(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        instances: &wgpu::Buffer,
        batches: &InstanceBatches,
    ) {
        if batches.raw.is_empty() {
            return;
        }
        pass.set_vertex_buffer(1, instances.slice(..));
        for &shape in ShapeKind::ALL {
            let range = batches.ranges[shape.index()].clone();
            if range.is_empty() {
                continue;
            }
            let mesh = &self.meshes[shape.index()];
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..mesh.index_count, 0, range);
        }
    }
}

fn create_instance_buffer(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (MAX_INSTANCES * std::mem::size_of::<InstanceRaw>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn instance(shape: ShapeKind, x: f32, cast_shadow: bool) -> MeshInstance {
        MeshInstance {
            shape,
            model: Mat4::from_translation(Vec3::new(x, 0.0, 0.0)),
            color: Color::WHITE,
            cast_shadow,
            receive_shadow: true,
        }
    }

    #[test]
    fn batches_group_instances_by_shape() {
        let instances = [
            instance(ShapeKind::Plane, 0.0, false),
            instance(ShapeKind::Box, 1.0, true),
            instance(ShapeKind::Cylinder, 2.0, false),
            instance(ShapeKind::Box, 3.0, true),
        ];
        let batches = InstanceBatches::build(&instances, |_| true);
        assert_eq!(batches.raw.len(), 4);
        assert_eq!(batches.ranges[ShapeKind::Box.index()], 0..2);
        assert_eq!(batches.ranges[ShapeKind::Cylinder.index()], 2..3);
        assert_eq!(batches.ranges[ShapeKind::Plane.index()], 3..4);
        assert_eq!(batches.draw_count(), 3);
        // Order within a shape follows input order.
        assert_eq!(batches.raw[0].model[3][0], 1.0);
        assert_eq!(batches.raw[1].model[3][0], 3.0);
    }

    #[test]
    fn caster_filter_skips_non_casters() {
        let instances = [
            instance(ShapeKind::Plane, 0.0, false),
            instance(ShapeKind::Box, 1.0, true),
        ];
        let casters = InstanceBatches::build(&instances, |inst| inst.cast_shadow);
        assert_eq!(casters.raw.len(), 1);
        assert!(casters.ranges[ShapeKind::Plane.index()].is_empty());
        assert_eq!(casters.draw_count(), 1);
    }

    #[test]
    fn batches_truncate_to_capacity() {
        let instances: Vec<MeshInstance> = (0..MAX_INSTANCES + 10)
            .map(|i| instance(ShapeKind::Box, i as f32, true))
            .collect();
        let batches = InstanceBatches::build(&instances, |_| true);
        assert_eq!(batches.raw.len(), MAX_INSTANCES);
        assert_eq!(batches.ranges[ShapeKind::Box.index()], 0..MAX_INSTANCES as u32);
        assert!(batches.ranges[ShapeKind::Plane.index()].is_empty());
    }

    #[test]
    fn receive_flag_lands_in_params() {
        let mut inst = instance(ShapeKind::Box, 0.0, true);
        assert_eq!(inst.to_raw().params[0], 1.0);
        inst.receive_shadow = false;
        assert_eq!(inst.to_raw().params[0], 0.0);
    }

    #[test]
    fn uniforms_match_wgsl_layout_size() {
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 176);
    }
}
