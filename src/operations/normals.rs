//! Face and vertex normal computation.

use crate::math::{Vector3, TOLERANCE};
use crate::topology::{Face, FaceId, Mesh};

/// Computes the normal and area of every face from its corner positions.
///
/// The normal is the normalized cross product of two face edges and the
/// area is half the cross-product length. Degenerate faces keep a zero
/// normal and zero area.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComputeFaceNormals;

impl ComputeFaceNormals {
    /// Creates the operation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the operation, updating every face in place.
    pub fn execute(&self, mesh: &mut Mesh) {
        face_normal_pass(mesh, false);
        mesh.set_has_face_normals(true);
    }
}

/// Computes face normals and areas, then area-weighted vertex normals.
///
/// Each vertex normal is the sum of its faces' unit normals weighted by
/// face area, normalized at the end. Runs the face pass of
/// [`ComputeFaceNormals`] as a side effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComputeVertexAndFaceNormals;

impl ComputeVertexAndFaceNormals {
    /// Creates the operation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the operation, updating every face and vertex in place.
    pub fn execute(&self, mesh: &mut Mesh) {
        for vertex in mesh.vertices_mut() {
            vertex.normal = Vector3::zeros();
        }
        face_normal_pass(mesh, true);
        for vertex in mesh.vertices_mut() {
            let len = vertex.normal.norm();
            if len > TOLERANCE {
                vertex.normal /= len;
            }
        }
        mesh.set_has_face_normals(true);
        mesh.set_has_vertex_normals(true);
    }
}

fn face_normal_pass(mesh: &mut Mesh, accumulate: bool) {
    let face_ids: Vec<FaceId> = mesh.faces().map(Face::id).collect();
    for id in face_ids {
        let Some(face) = mesh.face(id) else {
            continue;
        };
        let [v0, v1, v2] = face.vertex_ids();
        let (Some(p0), Some(p1), Some(p2)) = (
            mesh.vertex(v0).map(|v| v.position),
            mesh.vertex(v1).map(|v| v.position),
            mesh.vertex(v2).map(|v| v.position),
        ) else {
            continue;
        };

        let cross = (p1 - p0).cross(&(p2 - p0));
        let len = cross.norm();
        let area = len / 2.0;
        let normal = if len > TOLERANCE {
            cross / len
        } else {
            Vector3::zeros()
        };

        if let Some(face) = mesh.face_mut(id) {
            face.normal = normal;
            face.area = area;
        }
        if accumulate {
            for v in [v0, v1, v2] {
                if let Some(vertex) = mesh.vertex_mut(v) {
                    vertex.normal += area * normal;
                }
            }
        }
    }
}
