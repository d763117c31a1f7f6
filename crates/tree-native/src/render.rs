use glam::{Mat4, Vec3, Vec4};
use tree_core::{Camera, InstanceBuffer, Scene, SceneConfig, ORNAMENT_CAPACITY};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.01,
    g: 0.015,
    b: 0.03,
    a: 1.0,
};
const PARTICLE_TINT: [f32; 3] = [0.25, 0.85, 0.45];
const GIFT_PALETTE: [[f32; 3]; 4] = [
    [0.75, 0.1, 0.12],
    [0.1, 0.45, 0.2],
    [0.85, 0.8, 0.75],
    [0.15, 0.25, 0.65],
];
const GIFT_EMISSIVE: f32 = 0.05;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ParticleGlobals {
    view_proj: [[f32; 4]; 4],
    assembly: [[f32; 4]; 4],
    cam_right: [f32; 4],
    cam_up: [f32; 4],
    color: [f32; 4],
    morph: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct InstanceGlobals {
    view_proj: [[f32; 4]; 4],
    assembly: [[f32; 4]; 4],
    light_dir: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct InstanceRaw {
    model: [[f32; 4]; 4],
    // rgb = base color, a = emissive strength
    color: [f32; 4],
}

impl InstanceRaw {
    fn new(model: Mat4, color: Vec4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: color.to_array(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct MeshVertex {
    position: [f32; 3],
    normal: [f32; 3],
}

/// Unit cube as 36 unindexed vertices with flat face normals.
fn cube_vertices() -> Vec<MeshVertex> {
    let faces: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Y, Vec3::NEG_Z),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::NEG_Z, Vec3::X),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    let mut out = Vec::with_capacity(36);
    for (n, u, v) in faces {
        // u x v == n keeps the winding counter-clockwise seen from outside
        let c = n * 0.5;
        let corners = [
            c - u * 0.5 - v * 0.5,
            c + u * 0.5 - v * 0.5,
            c + u * 0.5 + v * 0.5,
            c - u * 0.5 + v * 0.5,
        ];
        for i in [0, 1, 2, 0, 2, 3] {
            out.push(MeshVertex {
                position: corners[i].to_array(),
                normal: n.to_array(),
            });
        }
    }
    out
}

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth"),
        size: wgpu::Extent3d {
            width,
            height,
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

fn instance_buffer(device: &wgpu::Device, label: &str, slots: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (std::mem::size_of::<InstanceRaw>() * slots.max(1)) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

pub struct GpuState<'w> {
    pub window: &'w winit::window::Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    camera: Camera,

    particle_pipeline: wgpu::RenderPipeline,
    particle_globals: wgpu::Buffer,
    particle_bind_group: wgpu::BindGroup,
    quad_vb: wgpu::Buffer,
    particle_vb: wgpu::Buffer,
    particle_count: u32,

    instance_pipeline: wgpu::RenderPipeline,
    instance_globals: wgpu::Buffer,
    instance_bind_group: wgpu::BindGroup,
    cube_vb: wgpu::Buffer,
    cube_vertex_count: u32,
    ornament_vb: wgpu::Buffer,
    gift_vb: wgpu::Buffer,
    topper_vb: wgpu::Buffer,
    gift_slots: usize,
    staging: Vec<InstanceRaw>,
}

impl<'w> GpuState<'w> {
    pub async fn new(window: &'w winit::window::Window, scene: &Scene) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
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
            .await?;
        log::info!("[gpu] adapter: {:?}", adapter.get_info().name);

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("Surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, config.width, config.height);

        let camera = Camera {
            aspect: config.width as f32 / config.height as f32,
            ..Camera::default()
        };

        // ---------------- particle field ----------------
        let particle_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("particles"),
            source: wgpu::ShaderSource::Wgsl(tree_core::PARTICLES_WGSL.into()),
        });
        let particle_globals = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particle_globals"),
            size: std::mem::size_of::<ParticleGlobals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let particle_bgl = uniform_layout(&device, "particle_bgl");
        let particle_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("particle_bg"),
            layout: &particle_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: particle_globals.as_entire_binding(),
            }],
        });
        // Quad corners for two triangles
        let quad_vertices: [f32; 12] = [
            -0.5, -0.5, 0.5, -0.5, 0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, 0.5,
        ];
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vb"),
            contents: bytemuck::cast_slice(&quad_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let particle_vertices = scene.particle_vertices();
        let particle_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("particle_vb"),
            contents: bytemuck::cast_slice(&particle_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let particle_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("particle_pl"),
                bind_group_layouts: &[&particle_bgl],
                push_constant_ranges: &[],
            });
        let particle_buffers = [
            // slot 0: quad corners
            wgpu::VertexBufferLayout {
                array_stride: (std::mem::size_of::<f32>() * 2) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                }],
            },
            // slot 1: per-particle endpoints
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<tree_core::ParticleVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &wgpu::vertex_attr_array![
                    1 => Float32x3,
                    2 => Float32,
                    3 => Float32x3,
                    4 => Float32,
                ],
            },
        ];
        let additive = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        };
        let particle_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("particle_pipeline"),
            layout: Some(&particle_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &particle_shader,
                entry_point: Some("vs_particles"),
                buffers: &particle_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &particle_shader,
                entry_point: Some("fs_particles"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(additive),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        // ---------------- instanced meshes ----------------
        let instance_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("instances"),
            source: wgpu::ShaderSource::Wgsl(tree_core::INSTANCES_WGSL.into()),
        });
        let instance_globals = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_globals"),
            size: std::mem::size_of::<InstanceGlobals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let instance_bgl = uniform_layout(&device, "instance_bgl");
        let instance_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("instance_bg"),
            layout: &instance_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: instance_globals.as_entire_binding(),
            }],
        });
        let cube = cube_vertices();
        let cube_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vb"),
            contents: bytemuck::cast_slice(&cube),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ornament_vb = instance_buffer(&device, "ornament_vb", ORNAMENT_CAPACITY);
        let gift_vb = instance_buffer(&device, "gift_vb", scene.gifts().len());
        let topper_vb = instance_buffer(&device, "topper_vb", 1);

        let instance_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("instance_pl"),
                bind_group_layouts: &[&instance_bgl],
                push_constant_ranges: &[],
            });
        let instance_buffers = [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<MeshVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<InstanceRaw>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &wgpu::vertex_attr_array![
                    2 => Float32x4,
                    3 => Float32x4,
                    4 => Float32x4,
                    5 => Float32x4,
                    6 => Float32x4,
                ],
            },
        ];
        let instance_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("instance_pipeline"),
            layout: Some(&instance_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &instance_shader,
                entry_point: Some("vs_instances"),
                buffers: &instance_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                cull_mode: Some(wgpu::Face::Back),
                ..wgpu::PrimitiveState::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &instance_shader,
                entry_point: Some("fs_instances"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        log::info!(
            "[gpu] particles={} ornament slots={} gifts={}",
            particle_vertices.len(),
            ORNAMENT_CAPACITY,
            scene.gifts().len()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            depth_view,
            camera,
            particle_pipeline,
            particle_globals,
            particle_bind_group,
            quad_vb,
            particle_vb,
            particle_count: particle_vertices.len() as u32,
            instance_pipeline,
            instance_globals,
            instance_bind_group,
            cube_vb,
            cube_vertex_count: cube.len() as u32,
            ornament_vb,
            gift_vb,
            topper_vb,
            gift_slots: scene.gifts().len(),
            staging: Vec::with_capacity(ORNAMENT_CAPACITY),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, new_size.width, new_size.height);
        self.camera.aspect = new_size.width as f32 / new_size.height as f32;
    }

    /// Pack `buf` into its vertex buffer, returning the number of instances written.
    fn upload_instances(
        &mut self,
        target: Target,
        buf: &InstanceBuffer,
        color: impl Fn(usize) -> Vec4,
    ) -> u32 {
        let (vb, slots) = match target {
            Target::Ornaments => (&self.ornament_vb, ORNAMENT_CAPACITY),
            Target::Gifts => (&self.gift_vb, self.gift_slots),
        };
        self.staging.clear();
        self.staging.extend(
            buf.transforms
                .iter()
                .take(slots)
                .enumerate()
                .map(|(i, m)| InstanceRaw::new(*m, color(i))),
        );
        if !self.staging.is_empty() {
            self.queue.write_buffer(vb, 0, bytemuck::cast_slice(&self.staging));
        }
        self.staging.len() as u32
    }

    pub fn render(
        &mut self,
        scene: &Scene,
        config: &SceneConfig,
    ) -> Result<(), wgpu::SurfaceError> {
        let accent = scene.accent();
        let view_proj = self.camera.view_proj().to_cols_array_2d();
        let assembly = accent.assembly_matrix().to_cols_array_2d();
        let (right, up) = self.camera.billboard_axes();
        let morph = scene.particle_uniforms();
        let lights = config.lights_color_vec3();
        let bloom = config.bloom_intensity;

        self.queue.write_buffer(
            &self.particle_globals,
            0,
            bytemuck::bytes_of(&ParticleGlobals {
                view_proj,
                assembly,
                cam_right: right.extend(0.0).to_array(),
                cam_up: up.extend(0.0).to_array(),
                color: [PARTICLE_TINT[0], PARTICLE_TINT[1], PARTICLE_TINT[2], bloom],
                morph: [morph.blend, morph.time, 0.0, 0.0],
            }),
        );
        self.queue.write_buffer(
            &self.instance_globals,
            0,
            bytemuck::bytes_of(&InstanceGlobals {
                view_proj,
                assembly,
                light_dir: Vec3::new(0.4, 0.8, 0.6).normalize().extend(0.0).to_array(),
            }),
        );

        let ornaments = scene.ornaments();
        let lights_glow = accent.lights_glow;
        let ornament_count = self.upload_instances(Target::Ornaments, ornaments, |i| {
            lights.extend(bloom * lights_glow * ornaments.glow[i])
        });
        let gift_count = self.upload_instances(Target::Gifts, scene.gifts(), |i| {
            Vec3::from(GIFT_PALETTE[i % GIFT_PALETTE.len()]).extend(GIFT_EMISSIVE * bloom)
        });
        let topper = InstanceRaw::new(
            accent.topper_matrix(),
            lights.extend(bloom * accent.topper_glow),
        );
        self.queue.write_buffer(&self.topper_vb, 0, bytemuck::bytes_of(&topper));

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rpass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
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
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // opaque meshes first so the additive particles depth-test against them
            rpass.set_pipeline(&self.instance_pipeline);
            rpass.set_bind_group(0, &self.instance_bind_group, &[]);
            rpass.set_vertex_buffer(0, self.cube_vb.slice(..));
            rpass.set_vertex_buffer(1, self.ornament_vb.slice(..));
            rpass.draw(0..self.cube_vertex_count, 0..ornament_count);
            rpass.set_vertex_buffer(1, self.gift_vb.slice(..));
            rpass.draw(0..self.cube_vertex_count, 0..gift_count);
            rpass.set_vertex_buffer(1, self.topper_vb.slice(..));
            rpass.draw(0..self.cube_vertex_count, 0..1);

            rpass.set_pipeline(&self.particle_pipeline);
            rpass.set_bind_group(0, &self.particle_bind_group, &[]);
            rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
            rpass.set_vertex_buffer(1, self.particle_vb.slice(..));
            rpass.draw(0..6, 0..self.particle_count);
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Target {
    Ornaments,
    Gifts,
}
