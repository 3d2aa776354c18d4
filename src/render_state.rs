//! Draw-mode flags and the uniform block they feed.
//!
//! The mesh shader has two switches: swapping the Y and Z components of each
//! position before transforming it, and choosing between the sampled texture
//! and a depth-tinted fallback color. Both live in [`RenderState`] and travel to
//! the GPU in [`MeshUniforms`] alongside the MVP matrix.
//!
//! [`vertex_stage`] and [`fallback_color`] mirror the WGSL so the shading rules
//! can be checked on the CPU.

use glam::{Mat4, Vec3, Vec4};

/// Persistent draw modes. Changes take effect on the next draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderState {
    /// Swap the Y and Z components of every vertex before projecting.
    pub swap_axes: bool,
    /// Sample the bound texture; when off, shade by fragment depth.
    pub show_texture: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            swap_axes: false,
            show_texture: true,
        }
    }
}

impl RenderState {
    /// Uniform block for a draw with the given transform.
    pub fn uniforms(&self, transform: Mat4) -> MeshUniforms {
        MeshUniforms {
            mvp: transform.to_cols_array_2d(),
            swap_axes: self.swap_axes as u32,
            show_texture: self.show_texture as u32,
            _padding: [0; 2],
        }
    }
}

/// Uniform block bound at group 0, binding 0 of the mesh shader.
///
/// Layout matches the WGSL `MeshUniforms` struct (80 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshUniforms {
    /// Column-major model-view-projection matrix.
    pub mvp: [[f32; 4]; 4],
    pub swap_axes: u32,
    pub show_texture: u32,
    _padding: [u32; 2],
}

/// Clip-space position the vertex shader produces for `position`.
pub fn vertex_stage(state: &RenderState, transform: Mat4, position: Vec3) -> Vec4 {
    let p = if state.swap_axes {
        Vec3::new(position.x, position.z, position.y)
    } else {
        position
    };
    transform * p.extend(1.0)
}

/// Color written when texturing is off: red, with green growing as depth².
pub fn fallback_color(depth: f32) -> [f32; 4] {
    [1.0, depth * depth, 0.0, 1.0]
}
