use crate::math::{Color, Point2, Point3, Vector3};

use super::FaceId;

/// Unique identifier for a vertex in the mesh.
///
/// Ids are assigned sequentially on insertion and stay stable until
/// [`Mesh::reindex_ids`](super::Mesh::reindex_ids) compacts them.
pub type VertexId = u32;

/// A point of the mesh's shared geometry, with per-vertex attributes.
#[derive(Debug, Clone)]
pub struct Vertex {
    id: VertexId,
    /// The 3D position of the vertex.
    pub position: Point3,
    /// The vertex normal.
    pub normal: Vector3,
    /// The vertex color.
    pub color: Color,
    /// The vertex texture coordinate.
    pub uv: Point2,
    // Incident faces; populated only by the connectivity builder.
    faces: Vec<FaceId>,
}

impl Vertex {
    pub(crate) fn new(id: VertexId, position: Point3) -> Self {
        Self {
            id,
            position,
            normal: Vector3::zeros(),
            color: Color::zeros(),
            uv: Point2::origin(),
            faces: Vec::new(),
        }
    }

    /// Returns the vertex id.
    #[must_use]
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// Faces whose corner lists reference this vertex.
    ///
    /// Empty until [`Mesh::compute_connectivity`](super::Mesh::compute_connectivity)
    /// has run. While connectivity is active, the list equals exactly the
    /// set of faces referencing this vertex.
    #[must_use]
    pub fn faces(&self) -> &[FaceId] {
        &self.faces
    }

    pub(crate) fn set_id(&mut self, id: VertexId) {
        self.id = id;
    }

    pub(crate) fn faces_mut(&mut self) -> &mut Vec<FaceId> {
        &mut self.faces
    }
}
