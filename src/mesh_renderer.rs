//! The fixed mesh draw path.
//!
//! [`MeshRenderer`] owns every GPU resource the viewer needs to put one mesh on
//! screen: the compiled shader pipeline, the position and texcoord vertex
//! buffers, the uniform block, the bound texture and a depth buffer. Its
//! lifecycle is construct-on-init and drop-on-teardown; wgpu releases the
//! resources when the renderer is dropped.
//!
//! # Bind groups
//!
//! - **Group 0**: [`MeshUniforms`] (MVP matrix, swap and show flags)
//! - **Group 1**: Texture and sampler
//!
//! # Example
//!
//! ```ignore
//! use meshview::{MeshData, MeshRenderer, Mat4};
//!
//! let mut renderer = MeshRenderer::new(&gpu)?;
//! renderer.set_mesh(&mesh)?;
//! renderer.set_texture(&image)?;
//! renderer.set_swap_axes(true);
//!
//! renderer.render_frame(&surface_view, mvp, wgpu::Color::BLACK);
//! ```

use std::ops::Range;

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::gpu::GpuContext;
use crate::mesh::{MeshData, MeshError, validate_arrays};
use crate::render_state::{MeshUniforms, RenderState};
use crate::texture::{Texture, TextureError};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const MESH_SHADER: &str = include_str!("shaders/mesh.wgsl");

/// Errors surfaced by the mesh renderer.
#[derive(Debug)]
pub enum RendererError {
    /// The shader failed to compile or the pipeline failed to link.
    /// Carries the collected diagnostics.
    ShaderCompilation(String),
    /// Mesh arrays violated the triangle-list layout.
    Mesh(MeshError),
    /// A vertex buffer would exceed the device's `max_buffer_size`.
    MeshTooLarge { bytes: u64, max: u64 },
    /// The texture image cannot be created on this device.
    Texture(TextureError),
}

impl std::fmt::Display for RendererError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RendererError::ShaderCompilation(log) => {
                write!(f, "Mesh shader failed to compile:\n{}", log)
            }
            RendererError::Mesh(e) => write!(f, "{}", e),
            RendererError::MeshTooLarge { bytes, max } => write!(
                f,
                "Mesh needs a {} byte vertex buffer, larger than the device limit of {} bytes",
                bytes, max
            ),
            RendererError::Texture(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RendererError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RendererError::Mesh(e) => Some(e),
            RendererError::Texture(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MeshError> for RendererError {
    fn from(e: MeshError) -> Self {
        RendererError::Mesh(e)
    }
}

impl From<TextureError> for RendererError {
    fn from(e: TextureError) -> Self {
        RendererError::Texture(e)
    }
}

/// Vertex buffer layout for positions (location 0).
pub const POSITION_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: 12,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[wgpu::VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x3,
    }],
};

/// Vertex buffer layout for texture coordinates (location 1).
pub const TEXCOORD_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: 8,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[wgpu::VertexAttribute {
        offset: 0,
        shader_location: 1,
        format: wgpu::VertexFormat::Float32x2,
    }],
};

/// What a single draw submits: the uniform block and the vertex range.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawPlan {
    pub uniforms: MeshUniforms,
    pub vertices: Range<u32>,
}

/// Decides what a draw of `vertex_count` vertices submits.
///
/// Returns `None` when nothing is loaded, so an empty renderer never
/// rasterizes.
pub fn plan_draw(state: &RenderState, vertex_count: u32, transform: Mat4) -> Option<DrawPlan> {
    if vertex_count == 0 {
        return None;
    }
    Some(DrawPlan {
        uniforms: state.uniforms(transform),
        vertices: 0..vertex_count,
    })
}

/// Checks that a vertex buffer of `bytes` fits in a device buffer of at most
/// `max` bytes.
fn check_buffer_size(bytes: u64, max: u64) -> Result<(), RendererError> {
    if bytes > max {
        return Err(RendererError::MeshTooLarge { bytes, max });
    }
    Ok(())
}

struct MeshBuffers {
    positions: wgpu::Buffer,
    texcoords: wgpu::Buffer,
    vertex_count: u32,
}

/// Renders one textured triangle mesh with a caller-supplied MVP matrix.
///
/// State is three independent switches: whether a mesh is loaded, the Y/Z
/// swap (off initially) and texture display (on initially). Toggles persist
/// across draws until changed.
///
/// # Pipeline Configuration
///
/// - Triangle list, no face culling
/// - Depth write with Less-than comparison
/// - Texture sampled with linear mipmapped filtering and repeat wrapping
pub struct MeshRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    texture_bind_group: wgpu::BindGroup,
    texture: Texture,
    buffers: Option<MeshBuffers>,
    state: RenderState,
    #[allow(dead_code)]
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
}

impl MeshRenderer {
    /// Compiles the mesh program and allocates the renderer's resources for
    /// drawing into `gpu`'s surface.
    ///
    /// No mesh is loaded, a 1x1 white texture is bound, texturing is on and
    /// the axis swap is off.
    pub fn new(gpu: &GpuContext) -> Result<Self, RendererError> {
        Self::with_shader(gpu, MESH_SHADER)
    }

    /// Like [`MeshRenderer::new`] with a custom WGSL source.
    ///
    /// The source must expose `vs`/`fs` entry points and the same bindings as
    /// the built-in program.
    pub fn with_shader(gpu: &GpuContext, source: &str) -> Result<Self, RendererError> {
        Self::build(
            &gpu.device,
            &gpu.queue,
            gpu.target_format(),
            (gpu.width(), gpu.height()),
            source,
        )
    }

    /// Creates a renderer for `format` targets of `size` pixels, without a
    /// window surface.
    pub fn headless(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        size: (u32, u32),
    ) -> Result<Self, RendererError> {
        Self::build(device, queue, format, size, MESH_SHADER)
    }

    fn build(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        size: (u32, u32),
        source: &str,
    ) -> Result<Self, RendererError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Mesh Uniforms"),
            size: std::mem::size_of::<MeshUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Mesh Uniform Bind Group Layout"),
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
            label: Some("Mesh Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Mesh Texture Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[POSITION_LAYOUT, TEXCOORD_LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
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
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            let info = pollster::block_on(shader.get_compilation_info());
            let mut log: Vec<String> = info
                .messages
                .iter()
                .filter(|m| matches!(m.message_type, wgpu::CompilationMessageType::Error))
                .map(|m| match &m.location {
                    Some(loc) => format!("{}:{}: {}", loc.line_number, loc.line_position, m.message),
                    None => m.message.clone(),
                })
                .collect();
            log.push(error.to_string());
            return Err(RendererError::ShaderCompilation(log.join("\n")));
        }

        let texture = Texture::solid(device, queue, [255, 255, 255, 255], "Default White Texture");
        let texture_bind_group =
            Self::create_texture_bind_group(device, &texture_bind_group_layout, &texture);

        let size = (size.0.max(1), size.1.max(1));
        let (depth_texture, depth_view) = Self::create_depth_texture(device, size);

        tracing::info!("mesh renderer initialized");

        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            texture_bind_group_layout,
            texture_bind_group,
            texture,
            buffers: None,
            state: RenderState::default(),
            depth_texture,
            depth_view,
            depth_size: size,
        })
    }

    /// Replaces the loaded mesh.
    ///
    /// Both vertex buffers are reallocated to the new size; nothing from the
    /// previous mesh survives. An empty mesh unloads the renderer. On error the
    /// previous mesh stays loaded.
    pub fn set_mesh(&mut self, mesh: &MeshData) -> Result<(), RendererError> {
        self.upload(mesh.positions(), mesh.texcoords())
    }

    /// Replaces the loaded mesh from raw attribute arrays.
    ///
    /// `positions` holds xyz triples and `texcoords` uv pairs, one per vertex,
    /// with every three vertices forming a triangle.
    pub fn set_mesh_arrays(
        &mut self,
        positions: &[f32],
        texcoords: &[f32],
    ) -> Result<(), RendererError> {
        self.upload(positions, texcoords)
    }

    fn upload(&mut self, positions: &[f32], texcoords: &[f32]) -> Result<(), RendererError> {
        let vertex_count = validate_arrays(positions, texcoords)?;

        if vertex_count == 0 {
            tracing::info!("mesh cleared");
            self.buffers = None;
            return Ok(());
        }

        let max = self.device.limits().max_buffer_size;
        check_buffer_size(std::mem::size_of_val(positions) as u64, max)?;
        check_buffer_size(std::mem::size_of_val(texcoords) as u64, max)?;

        let position_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Positions"),
                contents: bytemuck::cast_slice(positions),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let texcoord_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Texcoords"),
                contents: bytemuck::cast_slice(texcoords),
                usage: wgpu::BufferUsages::VERTEX,
            });

        tracing::info!(vertices = vertex_count, triangles = vertex_count / 3, "mesh uploaded");

        self.buffers = Some(MeshBuffers {
            positions: position_buffer,
            texcoords: texcoord_buffer,
            vertex_count: vertex_count as u32,
        });
        Ok(())
    }

    /// Swap the Y and Z components of every vertex on subsequent draws.
    pub fn set_swap_axes(&mut self, enabled: bool) {
        if self.state.swap_axes != enabled {
            tracing::info!(enabled, "swap Y/Z axes");
        }
        self.state.swap_axes = enabled;
    }

    /// Choose between the bound texture and the depth-tinted fallback color
    /// on subsequent draws.
    pub fn set_show_texture(&mut self, enabled: bool) {
        if self.state.show_texture != enabled {
            tracing::info!(enabled, "show texture");
        }
        self.state.show_texture = enabled;
    }

    /// Replaces the bound texture with one created from `image`.
    ///
    /// Mipmaps are generated for the new texture and the previous texture is
    /// released. An image the device cannot hold is rejected and the previous
    /// texture stays bound.
    pub fn set_texture(&mut self, image: &image::RgbaImage) -> Result<(), RendererError> {
        let texture = Texture::from_image(&self.device, &self.queue, image, "Mesh Texture")?;
        self.bind_texture(texture);
        Ok(())
    }

    /// Replaces the bound texture with an already uploaded one.
    pub fn bind_texture(&mut self, texture: Texture) {
        self.texture_bind_group =
            Self::create_texture_bind_group(&self.device, &self.texture_bind_group_layout, &texture);
        self.texture = texture;
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Number of vertices currently loaded.
    pub fn vertex_count(&self) -> u32 {
        self.buffers.as_ref().map_or(0, |b| b.vertex_count)
    }

    pub fn has_mesh(&self) -> bool {
        self.buffers.is_some()
    }

    /// The currently bound texture.
    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    /// What [`draw`](Self::draw) would submit for `transform`.
    pub fn draw_plan(&self, transform: Mat4) -> Option<DrawPlan> {
        plan_draw(&self.state, self.vertex_count(), transform)
    }

    /// Draws the loaded mesh with `transform` as the MVP matrix.
    ///
    /// The render pass must have a `Depth32Float` depth attachment, such as
    /// [`depth_view`](Self::depth_view). Does nothing if no mesh is loaded.
    ///
    /// The transform goes into a single uniform buffer through the queue, so
    /// every draw recorded before the next submit sees the last transform
    /// written. Draw at most once per submission.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass, transform: Mat4) {
        let (Some(plan), Some(buffers)) = (self.draw_plan(transform), &self.buffers) else {
            return;
        };

        self.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[plan.uniforms]),
        );

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_bind_group(1, &self.texture_bind_group, &[]);
        render_pass.set_vertex_buffer(0, buffers.positions.slice(..));
        render_pass.set_vertex_buffer(1, buffers.texcoords.slice(..));
        render_pass.draw(plan.vertices, 0..1);
    }

    /// Records and submits a full frame into `target`: clear, then draw.
    ///
    /// `target` must have the size last passed to [`resize`](Self::resize).
    pub fn render_frame(&self, target: &wgpu::TextureView, transform: Mat4, clear: wgpu::Color) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Mesh Frame Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Mesh Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
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

            self.draw(&mut render_pass, transform);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// View of the depth buffer, for attaching to external render passes.
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Size of the depth buffer in pixels.
    pub fn depth_size(&self) -> (u32, u32) {
        self.depth_size
    }

    /// Recreates the depth buffer for targets of `width` x `height` pixels.
    ///
    /// Zero sizes, which occur while the window is minimized, are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || self.depth_size == (width, height) {
            return;
        }
        let (texture, view) = Self::create_depth_texture(&self.device, (width, height));
        self.depth_texture = texture;
        self.depth_view = view;
        self.depth_size = (width, height);
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        (width, height): (u32, u32),
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Mesh Depth Texture"),
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
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    fn create_texture_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        texture: &Texture,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    fn renderer() -> MeshRenderer {
        let (device, queue) = crate::gpu::headless_device();
        MeshRenderer::headless(&device, &queue, TARGET_FORMAT, (64, 48)).unwrap()
    }

    fn quad() -> MeshData {
        MeshData::from_vertices(&[
            ([-1.0, -1.0, 0.0], [0.0, 1.0]),
            ([1.0, -1.0, 0.0], [1.0, 1.0]),
            ([1.0, 1.0, 0.0], [1.0, 0.0]),
            ([-1.0, -1.0, 0.0], [0.0, 1.0]),
            ([1.0, 1.0, 0.0], [1.0, 0.0]),
            ([-1.0, 1.0, 0.0], [0.0, 0.0]),
        ])
        .unwrap()
    }

    fn triangle() -> MeshData {
        MeshData::from_vertices(&[
            ([0.0, 1.0, 0.0], [0.5, 0.0]),
            ([-1.0, -1.0, 0.0], [0.0, 1.0]),
            ([1.0, -1.0, 0.0], [1.0, 1.0]),
        ])
        .unwrap()
    }

    #[test]
    fn empty_renderer_plans_nothing() {
        assert!(plan_draw(&RenderState::default(), 0, Mat4::IDENTITY).is_none());
    }

    #[test]
    fn plan_covers_all_vertices() {
        let plan = plan_draw(&RenderState::default(), 9, Mat4::IDENTITY).unwrap();
        assert_eq!(plan.vertices, 0..9);
        assert_eq!(plan.uniforms.show_texture, 1);
        assert_eq!(plan.uniforms.swap_axes, 0);
    }

    #[test]
    fn plan_uses_supplied_transform() {
        let transform = Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0));
        let plan = plan_draw(&RenderState::default(), 3, transform).unwrap();
        assert_eq!(plan.uniforms.mvp, transform.to_cols_array_2d());
    }

    #[test]
    fn toggles_round_trip_to_initial_plan() {
        let mut state = RenderState::default();
        let before = plan_draw(&state, 3, Mat4::IDENTITY);
        state.swap_axes = true;
        assert_ne!(plan_draw(&state, 3, Mat4::IDENTITY), before);
        state.swap_axes = false;
        assert_eq!(plan_draw(&state, 3, Mat4::IDENTITY), before);
    }

    #[test]
    fn vertex_layouts_match_components() {
        assert_eq!(POSITION_LAYOUT.array_stride, 12);
        assert_eq!(TEXCOORD_LAYOUT.array_stride, 8);
        assert_eq!(POSITION_LAYOUT.attributes[0].shader_location, 0);
        assert_eq!(TEXCOORD_LAYOUT.attributes[0].shader_location, 1);
    }

    #[test]
    fn mesh_errors_convert() {
        let err: RendererError = validate_arrays(&[0.0; 9], &[0.0; 2]).unwrap_err().into();
        assert!(matches!(err, RendererError::Mesh(MeshError::InvalidMeshData { .. })));
        assert!(err.to_string().starts_with("Invalid mesh data"));
    }

    #[test]
    fn check_buffer_size_limit() {
        assert!(check_buffer_size(256, 256).is_ok());
        assert!(matches!(
            check_buffer_size(257, 256),
            Err(RendererError::MeshTooLarge { bytes: 257, max: 256 })
        ));
    }

    #[test]
    fn new_renderer_is_empty_with_default_toggles() {
        let renderer = renderer();
        assert!(!renderer.has_mesh());
        assert_eq!(renderer.vertex_count(), 0);
        assert!(renderer.draw_plan(Mat4::IDENTITY).is_none());
        assert_eq!(renderer.state(), RenderState::default());
        assert_eq!((renderer.texture().width, renderer.texture().height), (1, 1));
        assert_eq!(renderer.depth_size(), (64, 48));
    }

    #[test]
    fn set_mesh_twice_is_idempotent() {
        let mut renderer = renderer();
        let mesh = triangle();
        renderer.set_mesh(&mesh).unwrap();
        let first = renderer.draw_plan(Mat4::IDENTITY);
        renderer.set_mesh(&mesh).unwrap();
        assert_eq!(renderer.draw_plan(Mat4::IDENTITY), first);
        assert_eq!(renderer.vertex_count(), 3);
    }

    #[test]
    fn set_mesh_replaces_with_new_size() {
        let mut renderer = renderer();
        renderer.set_mesh(&triangle()).unwrap();
        renderer.set_mesh(&quad()).unwrap();
        assert_eq!(renderer.vertex_count(), 6);
        assert_eq!(renderer.draw_plan(Mat4::IDENTITY).unwrap().vertices, 0..6);

        renderer.set_mesh(&triangle()).unwrap();
        assert_eq!(renderer.draw_plan(Mat4::IDENTITY).unwrap().vertices, 0..3);
    }

    #[test]
    fn empty_mesh_unloads() {
        let mut renderer = renderer();
        renderer.set_mesh(&triangle()).unwrap();
        renderer.set_mesh(&MeshData::empty()).unwrap();
        assert!(!renderer.has_mesh());
        assert!(renderer.draw_plan(Mat4::IDENTITY).is_none());
    }

    #[test]
    fn rejected_mesh_keeps_previous() {
        let mut renderer = renderer();
        renderer.set_mesh(&triangle()).unwrap();

        let err = renderer.set_mesh_arrays(&[0.0; 9], &[0.0; 4]).unwrap_err();
        assert!(matches!(err, RendererError::Mesh(MeshError::InvalidMeshData { .. })));
        assert_eq!(renderer.vertex_count(), 3);

        // Four vertices: not a whole number of triangles.
        assert!(renderer.set_mesh_arrays(&[0.0; 12], &[0.0; 8]).is_err());
        assert_eq!(renderer.vertex_count(), 3);
    }

    #[test]
    fn toggles_persist_and_round_trip() {
        let mut renderer = renderer();
        renderer.set_mesh(&triangle()).unwrap();
        let before = renderer.draw_plan(Mat4::IDENTITY).unwrap();

        renderer.set_swap_axes(true);
        renderer.set_show_texture(false);
        let toggled = renderer.draw_plan(Mat4::IDENTITY).unwrap();
        assert_eq!((toggled.uniforms.swap_axes, toggled.uniforms.show_texture), (1, 0));
        assert_eq!(renderer.draw_plan(Mat4::IDENTITY).unwrap(), toggled);

        renderer.set_swap_axes(false);
        renderer.set_show_texture(true);
        assert_eq!(renderer.draw_plan(Mat4::IDENTITY).unwrap(), before);
    }

    #[test]
    fn toggles_before_mesh_apply_once_loaded() {
        let mut renderer = renderer();
        renderer.set_swap_axes(true);
        renderer.set_mesh(&triangle()).unwrap();
        assert_eq!(renderer.draw_plan(Mat4::IDENTITY).unwrap().uniforms.swap_axes, 1);
    }

    #[test]
    fn set_texture_binds_mipmapped_image() {
        let mut renderer = renderer();
        let image = image::RgbaImage::from_pixel(8, 2, image::Rgba([9, 8, 7, 255]));
        renderer.set_texture(&image).unwrap();
        assert_eq!((renderer.texture().width, renderer.texture().height), (8, 2));
        assert_eq!(renderer.texture().mip_levels, 4);
    }

    #[test]
    fn oversized_texture_keeps_previous() {
        let mut renderer = renderer();
        let image = image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 0, 255]));
        renderer.set_texture(&image).unwrap();

        let max = renderer.device.limits().max_texture_dimension_2d;
        let wide = image::RgbaImage::new(max + 1, 1);
        let err = renderer.set_texture(&wide).unwrap_err();
        assert!(matches!(err, RendererError::Texture(TextureError::TooLarge { .. })));
        assert_eq!((renderer.texture().width, renderer.texture().height), (4, 4));
    }

    #[test]
    fn renders_frame_into_offscreen_target() {
        let mut renderer = renderer();
        renderer.set_mesh(&quad()).unwrap();
        renderer.resize(32, 16);
        assert_eq!(renderer.depth_size(), (32, 16));

        let target = renderer.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Target"),
            size: wgpu::Extent3d {
                width: 32,
                height: 16,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let transform = Mat4::from_translation(Vec3::new(0.0, 0.0, 0.5));
        renderer.render_frame(&view, transform, wgpu::Color::WHITE);

        renderer.set_mesh(&MeshData::empty()).unwrap();
        renderer.render_frame(&view, transform, wgpu::Color::WHITE);
    }

    #[test]
    fn resize_ignores_zero_size() {
        let mut renderer = renderer();
        renderer.resize(0, 10);
        assert_eq!(renderer.depth_size(), (64, 48));
    }

    #[test]
    fn invalid_shader_reports_compilation_error() {
        let (device, queue) = crate::gpu::headless_device();
        let result = MeshRenderer::build(
            &device,
            &queue,
            TARGET_FORMAT,
            (8, 8),
            "@vertex fn vs() -> @builtin(position) vec4<f32> { return undefined_name; }",
        );
        let Err(RendererError::ShaderCompilation(log)) = result else {
            panic!("expected a shader compilation error");
        };
        assert!(!log.is_empty());
    }
}
