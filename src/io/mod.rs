//! Mesh file io.
//!
//! Reads and writes Wavefront OBJ and OFF text meshes, dispatching on the
//! file extension. Loaders act purely through the public insertion api:
//! all vertices first, then triangles, with quads split at load time.

mod obj;
mod off;

pub use obj::{read_obj, write_obj};
pub use off::{read_off, write_off};

use std::path::Path;

use crate::error::IoError;
use crate::topology::Mesh;

/// Options controlling which attributes [`write_mesh`] emits.
///
/// OBJ honors all flags; OFF always writes positions and faces only. The
/// vertex and face uv flags are mutually exclusive.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Write per-vertex normals (`vn`, indexed like the vertices).
    pub vertex_normals: bool,
    /// Write per-vertex colors inline on the `v` lines.
    pub vertex_colors: bool,
    /// Write per-vertex texture coordinates (`vt`, indexed like the vertices).
    pub vertex_uvs: bool,
    /// Write per-corner texture coordinates (`vt`, three per face).
    pub face_uvs: bool,
}

/// Reads a mesh, choosing the format from the file extension.
///
/// # Errors
///
/// Returns [`IoError::UnknownFormat`] for an unrecognized extension, or
/// the format reader's parse and io errors.
pub fn read_mesh<P: AsRef<Path>>(path: P) -> crate::Result<Mesh> {
    let path = path.as_ref();
    match extension(path).as_deref() {
        Some("obj") => read_obj(path),
        Some("off") => read_off(path),
        other => Err(IoError::UnknownFormat(other.unwrap_or_default().to_string()).into()),
    }
}

/// Writes a mesh, choosing the format from the file extension.
///
/// # Errors
///
/// Returns [`IoError::UnknownFormat`] for an unrecognized extension, or
/// the format writer's option and io errors.
pub fn write_mesh<P: AsRef<Path>>(
    path: P,
    mesh: &Mesh,
    options: &WriteOptions,
) -> crate::Result<()> {
    let path = path.as_ref();
    match extension(path).as_deref() {
        Some("obj") => write_obj(path, mesh, options),
        Some("off") => write_off(path, mesh),
        other => Err(IoError::UnknownFormat(other.unwrap_or_default().to_string()).into()),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn unknown_extension_is_rejected() {
        let err = read_mesh("mesh.stl").unwrap_err();
        assert!(matches!(
            err,
            crate::GeodisError::Io(IoError::UnknownFormat(ref ext)) if ext == "stl"
        ));
    }

    #[test]
    fn extension_is_case_insensitive() {
        assert_eq!(extension(Path::new("a/b/MODEL.OBJ")).as_deref(), Some("obj"));
    }
}
