//! # Meshview
//!
//! **A minimal interactive viewer for textured triangle meshes.**
//!
//! The crate has two cores. [`model_view_projection`] turns a projection
//! matrix, a translation and two rotation angles into the combined MVP matrix.
//! [`MeshRenderer`] owns the GPU resources of a single fixed draw path and
//! draws the loaded mesh with that matrix, either textured or shaded by depth.
//!
//! ## Quick Start
//!
//! ```no_run
//! use meshview::{ViewerConfig, run};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     run(ViewerConfig::new()
//!         .title("Teapot")
//!         .mesh("models/teapot.obj")
//!         .texture("models/teapot.png"))
//! }
//! ```
//!
//! ## Driving the renderer directly
//!
//! ```ignore
//! use meshview::*;
//!
//! let mut renderer = MeshRenderer::new(&gpu)?;
//! renderer.set_mesh(&load_mesh("cube.obj")?)?;
//!
//! let projection = perspective(gpu.aspect(), 60.0, 0.1, 10.0);
//! let mvp = model_view_projection(projection, Vec3::new(0.0, 0.0, -3.0), 30.0, 45.0);
//! renderer.render_frame(&gpu.target_view(&frame.texture), mvp, wgpu::Color::BLACK);
//! ```

mod app;
mod controls;
mod geometry;
mod gpu;
mod input;
mod mesh;
mod mesh_renderer;
mod projection;
mod render_state;
mod texture;
mod transform;

pub use app::{ViewerConfig, run};
pub use controls::{
    ControlChanges, RESET_KEY, SHOW_TEXTURE_KEY, SWAP_AXES_KEY, ViewControls,
};
pub use geometry::{
    GeometryError, MeshFormat, load_mesh, load_obj, parse_obj, parse_stl, parse_stl_bytes,
};
pub use gpu::{GpuContext, GpuError, preferred_surface_format};
pub use input::Input;
pub use mesh::{MeshData, MeshError, POSITION_COMPONENTS, TEXCOORD_COMPONENTS, validate_arrays};
pub use mesh_renderer::{
    DrawPlan, MeshRenderer, POSITION_LAYOUT, RendererError, TEXCOORD_LAYOUT, plan_draw,
};
pub use projection::{MIN_NEAR, framing_planes, perspective};
pub use render_state::{MeshUniforms, RenderState, fallback_color, vertex_stage};
pub use texture::{
    TEXTURE_FORMAT, Texture, TextureError, check_dimensions, mip_chain, mip_level_count,
};
pub use transform::{model_view_projection, rotation_translation};

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
