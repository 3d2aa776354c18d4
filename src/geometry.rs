//! Mesh file loading.
//!
//! Loaders turn model files into flat, non-indexed [`MeshData`] triangle lists
//! ready for [`MeshRenderer::set_mesh`](crate::MeshRenderer::set_mesh).
//!
//! # Supported Formats
//!
//! | Format          | Extensions | Notes                                   |
//! |-----------------|------------|-----------------------------------------|
//! | Wavefront OBJ   | `.obj`     | Triangulated; missing UVs become (0, 0) |
//! | STL             | `.stl`     | Binary and ASCII, no UV coordinates     |
//!
//! # Example
//!
//! ```no_run
//! use meshview::load_mesh;
//!
//! let mut mesh = load_mesh("models/teapot.obj").unwrap();
//! mesh.recenter();
//! mesh.normalize();
//! ```

use std::io::{BufRead, Read, Seek};
use std::path::Path;

use crate::mesh::{MeshData, MeshError};

/// Errors that can occur when loading geometry.
#[derive(Debug)]
pub enum GeometryError {
    /// File could not be read.
    Io(std::io::Error),
    /// File format could not be determined from extension.
    UnknownFormat(String),
    /// The geometry data was invalid or corrupt.
    ParseError(String),
    /// The parsed data did not form whole triangles.
    Mesh(MeshError),
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::Io(e) => write!(f, "IO error: {}", e),
            GeometryError::UnknownFormat(ext) => {
                write!(f, "Unknown geometry format: '{}'", ext)
            }
            GeometryError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            GeometryError::Mesh(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for GeometryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeometryError::Io(e) => Some(e),
            GeometryError::Mesh(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GeometryError {
    fn from(e: std::io::Error) -> Self {
        GeometryError::Io(e)
    }
}

impl From<MeshError> for GeometryError {
    fn from(e: MeshError) -> Self {
        GeometryError::Mesh(e)
    }
}

/// Mesh file formats the viewer can open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshFormat {
    Obj,
    Stl,
}

impl MeshFormat {
    /// Picks a format from a file extension, ignoring case.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "obj" => Some(MeshFormat::Obj),
            "stl" => Some(MeshFormat::Stl),
            _ => None,
        }
    }
}

/// Loads a mesh file, detecting the format from its extension.
pub fn load_mesh(path: impl AsRef<Path>) -> Result<MeshData, GeometryError> {
    let path = path.as_ref();
    match MeshFormat::from_path(path) {
        Some(MeshFormat::Obj) => load_obj(path),
        Some(MeshFormat::Stl) => {
            let file = std::fs::File::open(path)?;
            parse_stl(&mut std::io::BufReader::new(file))
        }
        None => Err(GeometryError::UnknownFormat(
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_string(),
        )),
    }
}

fn obj_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Loads a Wavefront OBJ file. Materials are ignored.
pub fn load_obj(path: impl AsRef<Path>) -> Result<MeshData, GeometryError> {
    let (models, _materials) = tobj::load_obj(path.as_ref(), &obj_options())
        .map_err(|e| GeometryError::ParseError(format!("OBJ parse error: {}", e)))?;
    flatten_obj(&models)
}

/// Parses Wavefront OBJ text from a reader. Material libraries are not loaded.
pub fn parse_obj<R: BufRead>(reader: &mut R) -> Result<MeshData, GeometryError> {
    let (models, _materials) =
        tobj::load_obj_buf(reader, &obj_options(), |_| Err(tobj::LoadError::OpenFileFailed))
            .map_err(|e| GeometryError::ParseError(format!("OBJ parse error: {}", e)))?;
    flatten_obj(&models)
}

// Expands indexed OBJ models into one non-indexed triangle list.
// OBJ puts v = 0 at the bottom of the image; textures are stored top row
// first, so v is flipped.
fn flatten_obj(models: &[tobj::Model]) -> Result<MeshData, GeometryError> {
    let total: usize = models.iter().map(|m| m.mesh.indices.len()).sum();
    let mut positions = Vec::with_capacity(total * 3);
    let mut texcoords = Vec::with_capacity(total * 2);

    for model in models {
        let mesh = &model.mesh;
        let has_uvs = !mesh.texcoords.is_empty();

        for &index in &mesh.indices {
            let i = index as usize;
            let p = mesh.positions.get(i * 3..i * 3 + 3).ok_or_else(|| {
                GeometryError::ParseError(format!(
                    "OBJ model '{}' references missing vertex {}",
                    model.name, index
                ))
            })?;
            positions.extend_from_slice(p);

            let uv = if has_uvs {
                mesh.texcoords
                    .get(i * 2..i * 2 + 2)
                    .map_or([0.0, 0.0], |t| [t[0], 1.0 - t[1]])
            } else {
                [0.0, 0.0]
            };
            texcoords.extend_from_slice(&uv);
        }
    }

    Ok(MeshData::new(positions, texcoords)?)
}

/// Parses binary or ASCII STL. Every facet becomes three vertices with
/// texture coordinates at the origin.
pub fn parse_stl<R: Read + Seek>(reader: &mut R) -> Result<MeshData, GeometryError> {
    let stl = stl_io::read_stl(reader)
        .map_err(|e| GeometryError::ParseError(format!("STL parse error: {}", e)))?;

    let mut positions = Vec::with_capacity(stl.faces.len() * 9);
    for face in &stl.faces {
        for &vertex_idx in &face.vertices {
            let vertex = stl.vertices.get(vertex_idx).ok_or_else(|| {
                GeometryError::ParseError(format!("STL face references missing vertex {}", vertex_idx))
            })?;
            let position: [f32; 3] = (*vertex).into();
            positions.extend_from_slice(&position);
        }
    }

    let texcoords = vec![0.0; positions.len() / 3 * 2];
    Ok(MeshData::new(positions, texcoords)?)
}

/// Parses STL from an in-memory buffer.
pub fn parse_stl_bytes(bytes: &[u8]) -> Result<MeshData, GeometryError> {
    parse_stl(&mut std::io::Cursor::new(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD_OBJ: &str = "\
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
";

    const TRIANGLE_STL: &str = "\
solid t
facet normal 0 0 1
outer loop
vertex 0 0 0
vertex 1 0 0
vertex 0 1 0
endloop
endfacet
endsolid t
";

    #[test]
    fn format_from_extension() {
        assert_eq!(MeshFormat::from_path("a/b/model.OBJ"), Some(MeshFormat::Obj));
        assert_eq!(MeshFormat::from_path("model.stl"), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_path("model.ply"), None);
        assert_eq!(MeshFormat::from_path("model"), None);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_mesh("scene.ply").unwrap_err();
        assert!(matches!(err, GeometryError::UnknownFormat(ref ext) if ext == "ply"));
    }

    #[test]
    fn obj_quad_is_triangulated_and_flattened() {
        let mesh = parse_obj(&mut QUAD_OBJ.as_bytes()).unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 2);

        let (min, max) = mesh.bounds();
        assert_eq!(min.to_array(), [0.0, 0.0, 0.0]);
        assert_eq!(max.to_array(), [1.0, 1.0, 0.0]);
    }

    #[test]
    fn obj_texcoords_follow_positions_with_flipped_v() {
        let mesh = parse_obj(&mut QUAD_OBJ.as_bytes()).unwrap();
        for (p, uv) in mesh
            .positions()
            .chunks_exact(3)
            .zip(mesh.texcoords().chunks_exact(2))
        {
            // this quad maps (x, y) directly to (u, v) before the flip
            assert_eq!(uv[0], p[0]);
            assert_eq!(uv[1], 1.0 - p[1]);
        }
    }

    #[test]
    fn obj_without_texcoords_gets_zero_uvs() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = parse_obj(&mut obj.as_bytes()).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert!(mesh.texcoords().iter().all(|&t| t == 0.0));
    }

    #[test]
    fn stl_facets_become_vertices() {
        let mesh = parse_stl_bytes(TRIANGLE_STL.as_bytes()).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.texcoords().len(), 6);
        assert_eq!(&mesh.positions()[3..6], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn garbage_stl_is_a_parse_error() {
        let err = parse_stl_bytes(b"not an stl").unwrap_err();
        assert!(matches!(err, GeometryError::ParseError(_)));
    }
}
