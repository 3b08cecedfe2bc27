//! OFF reading and writing.
//!
//! The Object File Format: an `OFF` header line, a count line, vertex
//! position lines, and face lines starting with the corner count. Triangle
//! and quad faces are supported; quads are split into two triangles on
//! load.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::Path;

use tracing::debug;

use crate::error::IoError;
use crate::math::Point3;
use crate::topology::Mesh;

/// Reads a mesh from an OFF file.
///
/// # Errors
///
/// Returns [`IoError`] values for unreadable files, a missing `OFF`
/// header, truncated files, and malformed or out-of-range face lines.
pub fn read_off<P: AsRef<Path>>(path: P) -> crate::Result<Mesh> {
    let file = File::open(path.as_ref()).map_err(IoError::from)?;
    let mesh = read_off_from(BufReader::new(file))?;
    debug!(
        path = %path.as_ref().display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "off mesh loaded"
    );
    Ok(mesh)
}

fn read_off_from<R: BufRead>(reader: R) -> crate::Result<Mesh> {
    let mut lines = reader.lines();
    let mut number = 0;

    let header = next_line(&mut lines, &mut number)?;
    if !header.trim_start().starts_with("OFF") {
        return Err(invalid(number, "missing OFF header").into());
    }

    let counts = next_line(&mut lines, &mut number)?;
    let mut fields = counts.split_whitespace();
    let num_vertices = parse_count(fields.next(), number, "vertex count")?;
    let num_faces = parse_count(fields.next(), number, "face count")?;
    // The edge count is part of the format but carries no information.

    let mut mesh = Mesh::new();
    for _ in 0..num_vertices {
        let line = next_line(&mut lines, &mut number)?;
        let mut fields = line.split_whitespace();
        let x = parse_float(fields.next(), number)?;
        let y = parse_float(fields.next(), number)?;
        let z = parse_float(fields.next(), number)?;
        mesh.add_vertex(Point3::new(x, y, z));
    }

    for _ in 0..num_faces {
        let line = next_line(&mut lines, &mut number)?;
        let mut fields = line.split_whitespace();
        let corner_count = parse_count(fields.next(), number, "corner count")?;
        match corner_count {
            3 => {
                let [v0, v1, v2]: [u32; 3] = read_face_indices(&mut fields, number, &mesh)?;
                mesh.add_face(v0, v1, v2)?;
            }
            4 => {
                let [v0, v1, v2, v3]: [u32; 4] = read_face_indices(&mut fields, number, &mesh)?;
                mesh.add_face(v0, v1, v2)?;
                mesh.add_face(v0, v2, v3)?;
            }
            _ => {
                return Err(invalid(number, "faces need exactly 3 or 4 vertices").into());
            }
        }
    }

    Ok(mesh)
}

/// Writes a mesh as OFF text: positions and triangles only.
///
/// Ids are written verbatim in ascending-id order, so the mesh should
/// have dense ids (reindex after removals).
///
/// # Errors
///
/// Returns io errors from the filesystem.
pub fn write_off<P: AsRef<Path>>(path: P, mesh: &Mesh) -> crate::Result<()> {
    let file = File::create(path.as_ref()).map_err(IoError::from)?;
    let mut writer = BufWriter::new(file);
    write_off_to(&mut writer, mesh).map_err(IoError::from)?;
    writer.flush().map_err(IoError::from)?;
    debug!(
        path = %path.as_ref().display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "off mesh written"
    );
    Ok(())
}

fn write_off_to<W: Write>(writer: &mut W, mesh: &Mesh) -> std::io::Result<()> {
    writeln!(writer, "OFF")?;
    writeln!(writer, "{} {} 0", mesh.vertex_count(), mesh.face_count())?;
    for vertex in mesh.vertices() {
        let p = vertex.position;
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }
    for face in mesh.faces() {
        let [v0, v1, v2] = face.vertex_ids();
        writeln!(writer, "3 {v0} {v1} {v2}")?;
    }
    Ok(())
}

fn next_line<R: BufRead>(
    lines: &mut Lines<R>,
    number: &mut usize,
) -> Result<String, IoError> {
    *number += 1;
    match lines.next() {
        Some(line) => Ok(line?),
        None => Err(invalid(*number, "file too short")),
    }
}

fn invalid(line: usize, message: impl Into<String>) -> IoError {
    IoError::InvalidContent {
        line,
        message: message.into(),
    }
}

fn parse_count(token: Option<&str>, line: usize, what: &str) -> Result<usize, IoError> {
    token
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| invalid(line, format!("invalid {what}")))
}

fn parse_float(token: Option<&str>, line: usize) -> Result<f64, IoError> {
    token
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| invalid(line, "invalid coordinate"))
}

#[allow(clippy::cast_possible_truncation)]
// Indices are validated against the mesh size, which fits in u32.
fn read_face_indices<'a, const N: usize>(
    fields: &mut impl Iterator<Item = &'a str>,
    line: usize,
    mesh: &Mesh,
) -> Result<[u32; N], IoError> {
    let mut indices = [0u32; N];
    for slot in &mut indices {
        let index: usize = fields
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| invalid(line, "invalid vertex index"))?;
        if index >= mesh.vertex_count() {
            return Err(invalid(line, format!("vertex index {index} out of range")));
        }
        *slot = index as u32;
    }
    Ok(indices)
}
