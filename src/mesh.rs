//! CPU-side triangle mesh data.
//!
//! A [`MeshData`] is a flat, non-indexed triangle list: every three consecutive
//! vertices form one triangle. Positions and texture coordinates live in two
//! separate arrays, matching the two vertex buffers the renderer binds:
//!
//! | Attribute | Components | Format    | Shader Location |
//! |-----------|------------|-----------|-----------------|
//! | position  | 3          | Float32x3 | 0               |
//! | texcoord  | 2          | Float32x2 | 1               |
//!
//! Construction validates the array lengths so the renderer never assembles
//! triangles from mismatched data.
//!
//! # Example
//!
//! ```
//! use meshview::MeshData;
//!
//! let triangle = MeshData::new(
//!     vec![0.0, 1.0, 0.0, -1.0, -1.0, 0.0, 1.0, -1.0, 0.0],
//!     vec![0.5, 0.0, 0.0, 1.0, 1.0, 1.0],
//! )
//! .unwrap();
//!
//! assert_eq!(triangle.vertex_count(), 3);
//! assert_eq!(triangle.triangle_count(), 1);
//! ```

use glam::Vec3;

/// Number of floats per vertex position.
pub const POSITION_COMPONENTS: usize = 3;
/// Number of floats per texture coordinate.
pub const TEXCOORD_COMPONENTS: usize = 2;

/// Errors raised when mesh arrays violate the triangle-list layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// The position or texcoord arrays do not describe whole triangles.
    InvalidMeshData { reason: String },
}

impl std::fmt::Display for MeshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshError::InvalidMeshData { reason } => write!(f, "Invalid mesh data: {}", reason),
        }
    }
}

impl std::error::Error for MeshError {}

impl MeshError {
    fn invalid(reason: impl Into<String>) -> Self {
        MeshError::InvalidMeshData {
            reason: reason.into(),
        }
    }
}

/// Checks the triangle-list invariants for a pair of attribute arrays.
///
/// Returns the vertex count on success.
pub fn validate_arrays(positions: &[f32], texcoords: &[f32]) -> Result<usize, MeshError> {
    if positions.len() % POSITION_COMPONENTS != 0 {
        return Err(MeshError::invalid(format!(
            "position array length {} is not a multiple of {}",
            positions.len(),
            POSITION_COMPONENTS
        )));
    }
    if texcoords.len() % TEXCOORD_COMPONENTS != 0 {
        return Err(MeshError::invalid(format!(
            "texcoord array length {} is not a multiple of {}",
            texcoords.len(),
            TEXCOORD_COMPONENTS
        )));
    }

    let vertex_count = positions.len() / POSITION_COMPONENTS;
    let texcoord_count = texcoords.len() / TEXCOORD_COMPONENTS;
    if vertex_count != texcoord_count {
        return Err(MeshError::invalid(format!(
            "{} positions but {} texture coordinates",
            vertex_count, texcoord_count
        )));
    }
    if vertex_count % 3 != 0 {
        return Err(MeshError::invalid(format!(
            "vertex count {} is not a multiple of 3",
            vertex_count
        )));
    }

    Ok(vertex_count)
}

/// Validated, non-indexed triangle list ready for upload.
///
/// The arrays are replaced wholesale on every load; there is no incremental
/// update path.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    positions: Vec<f32>,
    texcoords: Vec<f32>,
}

impl MeshData {
    /// Creates mesh data from flat position (xyz) and texcoord (uv) arrays.
    pub fn new(positions: Vec<f32>, texcoords: Vec<f32>) -> Result<Self, MeshError> {
        validate_arrays(&positions, &texcoords)?;
        Ok(Self {
            positions,
            texcoords,
        })
    }

    /// Mesh with no vertices. Drawing it is a no-op.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates mesh data from per-vertex tuples.
    pub fn from_vertices(vertices: &[([f32; 3], [f32; 2])]) -> Result<Self, MeshError> {
        let mut positions = Vec::with_capacity(vertices.len() * POSITION_COMPONENTS);
        let mut texcoords = Vec::with_capacity(vertices.len() * TEXCOORD_COMPONENTS);
        for (position, uv) in vertices {
            positions.extend_from_slice(position);
            texcoords.extend_from_slice(uv);
        }
        Self::new(positions, texcoords)
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn texcoords(&self) -> &[f32] {
        &self.texcoords
    }

    /// Number of vertices (three per triangle).
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / POSITION_COMPONENTS
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterates over vertex positions.
    pub fn iter_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.positions
            .chunks_exact(POSITION_COMPONENTS)
            .map(Vec3::from_slice)
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns `(min, max)`; an empty mesh yields `(ZERO, ZERO)`.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        if self.is_empty() {
            return (Vec3::ZERO, Vec3::ZERO);
        }

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for p in self.iter_positions() {
            min = min.min(p);
            max = max.max(p);
        }
        (min, max)
    }

    /// Center of the bounding box.
    pub fn center(&self) -> Vec3 {
        let (min, max) = self.bounds();
        (min + max) * 0.5
    }

    /// Size of the bounding box.
    pub fn size(&self) -> Vec3 {
        let (min, max) = self.bounds();
        max - min
    }

    /// Radius of the sphere around the bounding box center that encloses it.
    pub fn bounding_radius(&self) -> f32 {
        self.size().length() * 0.5
    }

    /// Translates all vertices by the given offset.
    pub fn translate(&mut self, offset: Vec3) {
        for p in self.positions.chunks_exact_mut(POSITION_COMPONENTS) {
            p[0] += offset.x;
            p[1] += offset.y;
            p[2] += offset.z;
        }
    }

    /// Scales all vertices uniformly around the origin.
    pub fn scale(&mut self, factor: f32) {
        for v in &mut self.positions {
            *v *= factor;
        }
    }

    /// Moves the bounding box center to the origin.
    pub fn recenter(&mut self) {
        let center = self.center();
        self.translate(-center);
    }

    /// Scales so the largest bounding box extent is 1.
    pub fn normalize(&mut self) {
        let size = self.size();
        let max_dim = size.max_element();
        if max_dim > 0.0 {
            self.scale(1.0 / max_dim);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshData {
        MeshData::from_vertices(&[
            ([0.0, 0.0, 0.0], [0.0, 0.0]),
            ([2.0, 0.0, 0.0], [1.0, 0.0]),
            ([2.0, 4.0, 0.0], [1.0, 1.0]),
            ([0.0, 0.0, 0.0], [0.0, 0.0]),
            ([2.0, 4.0, 0.0], [1.0, 1.0]),
            ([0.0, 4.0, 6.0], [0.0, 1.0]),
        ])
        .unwrap()
    }

    #[test]
    fn counts() {
        let mesh = quad();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(!mesh.is_empty());
        assert_eq!(mesh.positions().len(), 18);
        assert_eq!(mesh.texcoords().len(), 12);
    }

    #[test]
    fn empty_mesh_is_valid() {
        let mesh = MeshData::new(Vec::new(), Vec::new()).unwrap();
        assert!(mesh.is_empty());
        assert_eq!(mesh, MeshData::empty());
        assert_eq!(mesh.bounds(), (Vec3::ZERO, Vec3::ZERO));
    }

    #[test]
    fn rejects_partial_position() {
        let err = MeshData::new(vec![0.0; 10], vec![0.0; 6]).unwrap_err();
        assert!(matches!(err, MeshError::InvalidMeshData { .. }));
    }

    #[test]
    fn rejects_partial_texcoord() {
        let err = MeshData::new(vec![0.0; 9], vec![0.0; 5]).unwrap_err();
        assert!(err.to_string().contains("texcoord"));
    }

    #[test]
    fn rejects_mismatched_counts() {
        let err = MeshData::new(vec![0.0; 9], vec![0.0; 4]).unwrap_err();
        assert!(err.to_string().contains("3 positions but 2"));
    }

    #[test]
    fn rejects_incomplete_triangle() {
        let err = MeshData::new(vec![0.0; 12], vec![0.0; 8]).unwrap_err();
        assert!(err.to_string().contains("not a multiple of 3"));
    }

    #[test]
    fn bounds_and_center() {
        let mesh = quad();
        let (min, max) = mesh.bounds();
        assert_eq!(min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(mesh.center(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn recenter_and_normalize() {
        let mut mesh = quad();
        mesh.recenter();
        mesh.normalize();

        let center = mesh.center();
        assert!(center.abs_diff_eq(Vec3::ZERO, 1e-6));
        assert!((mesh.size().max_element() - 1.0).abs() < 1e-6);
        // texcoords are untouched
        assert_eq!(mesh.texcoords(), quad().texcoords());
    }
}
