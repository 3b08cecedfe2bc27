use crate::math::{Color, Point2, Vector3};

use super::VertexId;

/// Unique identifier for a face in the mesh.
///
/// Ids are assigned sequentially on insertion and stay stable until
/// [`Mesh::reindex_ids`](super::Mesh::reindex_ids) compacts them.
pub type FaceId = u32;

/// A vertex as seen from one specific face.
///
/// Corners carry face-local attribute values, so adjacent faces can
/// disagree about the normal, color, or uv at a shared vertex (e.g. along
/// a uv seam). The corner does not own its vertex.
#[derive(Debug, Clone)]
pub struct Corner {
    /// The referenced vertex.
    pub vertex: VertexId,
    /// The corner normal.
    pub normal: Vector3,
    /// The corner color.
    pub color: Color,
    /// The corner texture coordinate.
    pub uv: Point2,
}

impl Corner {
    fn new(vertex: VertexId) -> Self {
        Self {
            vertex,
            normal: Vector3::zeros(),
            color: Color::zeros(),
            uv: Point2::origin(),
        }
    }
}

/// A triangle defined by three ordered corners.
///
/// Corner order encodes the face winding, which the adjacency test relies
/// on: two faces are edge-adjacent only when they traverse the shared edge
/// in opposite directions.
#[derive(Debug, Clone)]
pub struct Face {
    id: FaceId,
    corners: [Corner; 3],
    /// The face normal.
    pub normal: Vector3,
    /// The face area.
    pub area: f64,
    /// The face color.
    pub color: Color,
}

impl Face {
    pub(crate) fn new(id: FaceId, v0: VertexId, v1: VertexId, v2: VertexId) -> Self {
        Self {
            id,
            corners: [Corner::new(v0), Corner::new(v1), Corner::new(v2)],
            normal: Vector3::zeros(),
            area: 0.0,
            color: Color::zeros(),
        }
    }

    /// Returns the face id.
    #[must_use]
    pub fn id(&self) -> FaceId {
        self.id
    }

    /// The three corners in winding order.
    #[must_use]
    pub fn corners(&self) -> &[Corner; 3] {
        &self.corners
    }

    /// Mutable access to the corners, for per-corner attribute assignment.
    ///
    /// Corner order defines the winding; reordering or retargeting corners
    /// invalidates previously derived connectivity.
    pub fn corners_mut(&mut self) -> &mut [Corner; 3] {
        &mut self.corners
    }

    /// The corner vertex ids in winding order.
    #[must_use]
    pub fn vertex_ids(&self) -> [VertexId; 3] {
        [
            self.corners[0].vertex,
            self.corners[1].vertex,
            self.corners[2].vertex,
        ]
    }

    /// The directed edges of the face in winding order, wrapping the last
    /// corner back to the first.
    #[must_use]
    pub fn directed_edges(&self) -> [(VertexId, VertexId); 3] {
        let [v0, v1, v2] = self.vertex_ids();
        [(v0, v1), (v1, v2), (v2, v0)]
    }

    /// Orientation-aware shared-edge test.
    ///
    /// True iff this face has a directed edge `(a, b)` and `other` has the
    /// reversed edge `(b, a)`. Faces that merely share one vertex, or that
    /// traverse the shared edge in the same direction (inconsistent
    /// winding), do not match.
    #[must_use]
    pub fn shares_edge_with(&self, other: &Face) -> bool {
        let other_edges = other.directed_edges();
        self.directed_edges()
            .iter()
            .any(|&(a, b)| other_edges.contains(&(b, a)))
    }

    pub(crate) fn set_id(&mut self, id: FaceId) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directed_edges_wrap_around() {
        let face = Face::new(0, 4, 7, 9);
        assert_eq!(face.directed_edges(), [(4, 7), (7, 9), (9, 4)]);
    }

    #[test]
    fn opposite_windings_share_an_edge() {
        // Both faces traverse edge 1-2, in opposite directions.
        let f = Face::new(0, 0, 1, 2);
        let g = Face::new(1, 2, 1, 3);
        assert!(f.shares_edge_with(&g));
        assert!(g.shares_edge_with(&f));
    }

    #[test]
    fn same_winding_does_not_match() {
        // Both faces traverse edge 1-2 in the same direction.
        let f = Face::new(0, 0, 1, 2);
        let g = Face::new(1, 1, 2, 3);
        assert!(!f.shares_edge_with(&g));
    }

    #[test]
    fn shared_vertex_only_is_not_an_edge() {
        let f = Face::new(0, 0, 1, 2);
        let g = Face::new(1, 2, 3, 4);
        assert!(!f.shares_edge_with(&g));
    }
}
