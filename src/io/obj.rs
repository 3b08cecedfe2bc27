//! Wavefront OBJ reading and writing.
//!
//! Supports `v` (with optional inline vertex colors), `vn`, `vt`, and
//! triangle or quad `f` commands in the `v`, `v/t`, `v//n`, and `v/t/n`
//! forms. Quads are split into two triangles on load. Unrecognized
//! commands are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::IoError;
use crate::math::{Color, Point2, Point3, Vector3};
use crate::topology::{ColorScheme, Mesh};

use super::WriteOptions;

/// A parsed `f` command before mesh insertion: vertex indices plus
/// optional indices into the `vt` / `vn` buffers.
#[derive(Debug, Clone, Copy)]
struct FaceRef {
    v: [usize; 3],
    t: [Option<usize>; 3],
    n: [Option<usize>; 3],
    line: usize,
}

/// Reads a mesh from an OBJ file.
///
/// Per-corner normals and uvs from `f` index triples are assigned to the
/// face corners and then copied down to the vertices, as shared
/// approximations of the face-local values.
///
/// # Errors
///
/// Returns [`IoError`] values for unreadable files and malformed or
/// out-of-range commands.
pub fn read_obj<P: AsRef<Path>>(path: P) -> crate::Result<Mesh> {
    let file = File::open(path.as_ref()).map_err(IoError::from)?;
    let mesh = read_obj_from(BufReader::new(file))?;
    debug!(
        path = %path.as_ref().display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "obj mesh loaded"
    );
    Ok(mesh)
}

#[allow(clippy::cast_possible_truncation)]
// Vertex indices are validated against the mesh size, which fits in u32.
fn read_obj_from<R: BufRead>(reader: R) -> crate::Result<Mesh> {
    let mut mesh = Mesh::new();
    let mut normals: Vec<Vector3> = Vec::new();
    let mut uvs: Vec<Point2> = Vec::new();
    let mut faces: Vec<FaceRef> = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(IoError::from)?;
        let number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        match parts[0] {
            "v" => match parts.len() {
                4 => {
                    mesh.add_vertex(Point3::new(
                        parse_float(parts[1], number)?,
                        parse_float(parts[2], number)?,
                        parse_float(parts[3], number)?,
                    ));
                }
                7 => {
                    let id = mesh.add_vertex(Point3::new(
                        parse_float(parts[1], number)?,
                        parse_float(parts[2], number)?,
                        parse_float(parts[3], number)?,
                    ));
                    if let Some(vertex) = mesh.vertex_mut(id) {
                        vertex.color = Color::new(
                            parse_float(parts[4], number)?,
                            parse_float(parts[5], number)?,
                            parse_float(parts[6], number)?,
                        );
                    }
                    mesh.set_color_scheme(ColorScheme::VertexColor);
                }
                _ => {
                    return Err(invalid(number, "v command takes 3 or 6 parameters").into());
                }
            },
            "vn" => {
                if parts.len() != 4 {
                    return Err(invalid(number, "vn command takes 3 parameters").into());
                }
                normals.push(Vector3::new(
                    parse_float(parts[1], number)?,
                    parse_float(parts[2], number)?,
                    parse_float(parts[3], number)?,
                ));
            }
            "vt" => {
                if parts.len() != 3 {
                    return Err(invalid(number, "vt command takes 2 parameters").into());
                }
                uvs.push(Point2::new(
                    parse_float(parts[1], number)?,
                    parse_float(parts[2], number)?,
                ));
            }
            "f" => match parts.len() {
                4 => {
                    let c0 = parse_face_vertex(parts[1], number)?;
                    let c1 = parse_face_vertex(parts[2], number)?;
                    let c2 = parse_face_vertex(parts[3], number)?;
                    faces.push(face_ref([c0, c1, c2], number));
                }
                5 => {
                    let c0 = parse_face_vertex(parts[1], number)?;
                    let c1 = parse_face_vertex(parts[2], number)?;
                    let c2 = parse_face_vertex(parts[3], number)?;
                    let c3 = parse_face_vertex(parts[4], number)?;
                    faces.push(face_ref([c0, c1, c2], number));
                    faces.push(face_ref([c0, c2, c3], number));
                }
                _ => {
                    return Err(invalid(number, "f command takes 3 or 4 vertices").into());
                }
            },
            _ => {}
        }
    }

    for parsed in &faces {
        for &v in &parsed.v {
            if v >= mesh.vertex_count() {
                return Err(invalid(
                    parsed.line,
                    format!("vertex index {} out of range", v + 1),
                )
                .into());
            }
        }
        let id = mesh.add_face(parsed.v[0] as u32, parsed.v[1] as u32, parsed.v[2] as u32)?;
        if let Some(face) = mesh.face_mut(id) {
            for (i, corner) in face.corners_mut().iter_mut().enumerate() {
                if let Some(ni) = parsed.n[i] {
                    corner.normal = *normals.get(ni).ok_or_else(|| {
                        invalid(parsed.line, format!("normal index {} out of range", ni + 1))
                    })?;
                }
                if let Some(ti) = parsed.t[i] {
                    corner.uv = *uvs.get(ti).ok_or_else(|| {
                        invalid(parsed.line, format!("uv index {} out of range", ti + 1))
                    })?;
                }
            }
        }
    }

    if !normals.is_empty() {
        mesh.copy_corner_normals_to_vertices();
        mesh.set_has_vertex_normals(true);
        mesh.set_has_face_normals(true);
    }
    if !uvs.is_empty() {
        mesh.copy_corner_uvs_to_vertices();
    }

    Ok(mesh)
}

/// Writes a mesh as OBJ text.
///
/// Ids are written as 1-based indices in ascending-id order, so the mesh
/// should have dense ids (reindex after removals).
///
/// # Errors
///
/// Returns [`IoError::ConflictingOptions`] if both vertex and face uvs are
/// requested, or io errors from the filesystem.
pub fn write_obj<P: AsRef<Path>>(path: P, mesh: &Mesh, options: &WriteOptions) -> crate::Result<()> {
    if options.vertex_uvs && options.face_uvs {
        return Err(IoError::ConflictingOptions("texture coordinate").into());
    }
    let file = File::create(path.as_ref()).map_err(IoError::from)?;
    let mut writer = BufWriter::new(file);
    write_obj_to(&mut writer, mesh, options).map_err(IoError::from)?;
    writer.flush().map_err(IoError::from)?;
    debug!(
        path = %path.as_ref().display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "obj mesh written"
    );
    Ok(())
}

fn write_obj_to<W: Write>(
    writer: &mut W,
    mesh: &Mesh,
    options: &WriteOptions,
) -> std::io::Result<()> {
    for vertex in mesh.vertices() {
        let p = vertex.position;
        if options.vertex_colors {
            let c = vertex.color;
            writeln!(writer, "v {} {} {} {} {} {}", p.x, p.y, p.z, c.x, c.y, c.z)?;
        } else {
            writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
        }
    }

    if options.vertex_uvs {
        for vertex in mesh.vertices() {
            writeln!(writer, "vt {} {}", vertex.uv.x, vertex.uv.y)?;
        }
    } else if options.face_uvs {
        for face in mesh.faces() {
            for corner in face.corners() {
                writeln!(writer, "vt {} {}", corner.uv.x, corner.uv.y)?;
            }
        }
    }

    if options.vertex_normals {
        for vertex in mesh.vertices() {
            let n = vertex.normal;
            writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
        }
    }

    let write_uvs = options.vertex_uvs || options.face_uvs;
    if !write_uvs && !options.vertex_normals {
        for face in mesh.faces() {
            let [v0, v1, v2] = face.vertex_ids();
            writeln!(writer, "f {} {} {}", v0 + 1, v1 + 1, v2 + 1)?;
        }
    } else {
        // With uvs but no normals the trailing separator is dropped,
        // giving "v/t"; otherwise the full "v/t/n" (or "v//n") form.
        let sep2 = if write_uvs && !options.vertex_normals {
            ""
        } else {
            "/"
        };
        for (findex, face) in mesh.faces().enumerate() {
            let mut corners = String::from("f");
            for (cindex, corner) in face.corners().iter().enumerate() {
                let v = (corner.vertex + 1).to_string();
                let t = if options.vertex_uvs {
                    v.clone()
                } else if options.face_uvs {
                    (findex * 3 + cindex + 1).to_string()
                } else {
                    String::new()
                };
                let n = if options.vertex_normals {
                    v.clone()
                } else {
                    String::new()
                };
                corners.push_str(&format!(" {v}/{t}{sep2}{n}"));
            }
            writeln!(writer, "{corners}")?;
        }
    }

    Ok(())
}

fn invalid(line: usize, message: impl Into<String>) -> IoError {
    IoError::InvalidContent {
        line,
        message: message.into(),
    }
}

fn parse_float(token: &str, line: usize) -> Result<f64, IoError> {
    token
        .parse()
        .map_err(|_| invalid(line, format!("invalid number \"{token}\"")))
}

/// Parses a 1-based OBJ index into a 0-based one.
fn parse_index(token: &str, line: usize) -> Result<usize, IoError> {
    let value: usize = token
        .parse()
        .map_err(|_| invalid(line, format!("invalid index \"{token}\"")))?;
    if value == 0 {
        return Err(invalid(line, "obj indices are 1-based"));
    }
    Ok(value - 1)
}

/// Parses one `f` parameter: `v`, `v/t`, `v//n`, or `v/t/n`.
fn parse_face_vertex(
    token: &str,
    line: usize,
) -> Result<(usize, Option<usize>, Option<usize>), IoError> {
    let fields: Vec<&str> = token.split('/').collect();
    match fields.as_slice() {
        [v] => Ok((parse_index(v, line)?, None, None)),
        [v, t] => Ok((parse_index(v, line)?, Some(parse_index(t, line)?), None)),
        [v, t, n] => {
            let t = if t.is_empty() {
                None
            } else {
                Some(parse_index(t, line)?)
            };
            Ok((parse_index(v, line)?, t, Some(parse_index(n, line)?)))
        }
        _ => Err(invalid(
            line,
            "face vertex takes 1 to 3 '/'-separated indices",
        )),
    }
}

fn face_ref(corners: [(usize, Option<usize>, Option<usize>); 3], line: usize) -> FaceRef {
    FaceRef {
        v: [corners[0].0, corners[1].0, corners[2].0],
        t: [corners[0].1, corners[1].1, corners[2].1],
        n: [corners[0].2, corners[1].2, corners[2].2],
        line,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_positions_and_faces() {
        let text = "# comment\n\
                    v 0 0 0\n\
                    v 1 0 0\n\
                    v 0 1 0\n\
                    f 1 2 3\n";
        let mesh = read_obj_from(Cursor::new(text)).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.face(0).unwrap().vertex_ids(), [0, 1, 2]);
        assert_eq!(mesh.vertex(1).unwrap().position, Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn reads_inline_vertex_colors() {
        let text = "v 0 0 0 1 0.5 0.25\nv 1 0 0 0 0 0\nv 0 1 0 0 0 0\nf 1 2 3\n";
        let mesh = read_obj_from(Cursor::new(text)).unwrap();
        assert_eq!(mesh.color_scheme(), ColorScheme::VertexColor);
        assert_eq!(mesh.vertex(0).unwrap().color, Color::new(1.0, 0.5, 0.25));
    }

    #[test]
    fn quad_splits_into_two_triangles() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = read_obj_from(Cursor::new(text)).unwrap();
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.face(0).unwrap().vertex_ids(), [0, 1, 2]);
        assert_eq!(mesh.face(1).unwrap().vertex_ids(), [0, 2, 3]);
    }

    #[test]
    fn corner_attributes_from_index_triples() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
                    vt 0.5 0.5\n\
                    vn 0 0 1\n\
                    f 1/1/1 2/1/1 3/1/1\n";
        let mesh = read_obj_from(Cursor::new(text)).unwrap();
        let face = mesh.face(0).unwrap();
        assert_eq!(face.corners()[0].normal, Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(face.corners()[2].uv, Point2::new(0.5, 0.5));
        // Copied down to the shared vertices.
        assert_eq!(mesh.vertex(0).unwrap().normal, Vector3::new(0.0, 0.0, 1.0));
        assert!(mesh.has_vertex_normals());
    }

    #[test]
    fn missing_uv_field_is_allowed() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n";
        let mesh = read_obj_from(Cursor::new(text)).unwrap();
        assert_eq!(
            mesh.face(0).unwrap().corners()[1].normal,
            Vector3::new(0.0, 0.0, 1.0)
        );
    }

    #[test]
    fn vertex_index_out_of_range() {
        let text = "v 0 0 0\nv 1 0 0\nf 1 2 3\n";
        let err = read_obj_from(Cursor::new(text)).unwrap_err();
        assert!(matches!(
            err,
            crate::GeodisError::Io(IoError::InvalidContent { line: 3, .. })
        ));
    }

    #[test]
    fn malformed_number_is_reported_with_line() {
        let text = "v 0 0 zero\n";
        let err = read_obj_from(Cursor::new(text)).unwrap_err();
        assert!(matches!(
            err,
            crate::GeodisError::Io(IoError::InvalidContent { line: 1, .. })
        ));
    }

    fn square_mesh() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(1.0, 1.0, 0.0));
        mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_face(0, 1, 2).unwrap();
        mesh.add_face(0, 2, 3).unwrap();
        mesh
    }

    #[test]
    fn writes_plain_faces() {
        let mesh = square_mesh();
        let mut buffer = Vec::new();
        write_obj_to(&mut buffer, &mesh, &WriteOptions::default()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 4);
        assert!(text.contains("f 1 2 3"));
        assert!(text.contains("f 1 3 4"));
    }

    #[test]
    fn writes_vertex_normals_with_double_slash() {
        let mut mesh = square_mesh();
        for vertex in mesh.vertices_mut() {
            vertex.normal = Vector3::new(0.0, 0.0, 1.0);
        }
        let mut buffer = Vec::new();
        let options = WriteOptions {
            vertex_normals: true,
            ..WriteOptions::default()
        };
        write_obj_to(&mut buffer, &mesh, &options).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 4);
        assert!(text.contains("f 1//1 2//2 3//3"));
    }

    #[test]
    fn writes_face_uvs_per_corner() {
        let mesh = square_mesh();
        let mut buffer = Vec::new();
        let options = WriteOptions {
            face_uvs: true,
            ..WriteOptions::default()
        };
        write_obj_to(&mut buffer, &mesh, &options).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("vt ")).count(), 6);
        assert!(text.contains("f 1/1 2/2 3/3"));
        assert!(text.contains("f 1/4 3/5 4/6"));
    }

    #[test]
    fn round_trip_preserves_colors() {
        let mut mesh = square_mesh();
        mesh.vertex_mut(2).unwrap().color = Color::new(0.25, 0.5, 0.75);
        mesh.set_color_scheme(ColorScheme::VertexColor);
        let mut buffer = Vec::new();
        let options = WriteOptions {
            vertex_colors: true,
            ..WriteOptions::default()
        };
        write_obj_to(&mut buffer, &mesh, &options).unwrap();

        let reread = read_obj_from(Cursor::new(buffer)).unwrap();
        assert_eq!(reread.color_scheme(), ColorScheme::VertexColor);
        assert_eq!(reread.vertex(2).unwrap().color, Color::new(0.25, 0.5, 0.75));
    }
}
