//! Graph-distance fields over the mesh adjacency graphs.
//!
//! Approximates geodesic surface distance by running Dijkstra's algorithm
//! on the 1-skeleton (vertex mode) or on the face-centroid graph across
//! shared edges (face mode). Edge weights are Euclidean distances between
//! the connected elements' positions.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::{debug, info};

use crate::error::GraphDistError;
use crate::topology::Mesh;

/// Which adjacency graph distance fields are computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldType {
    /// Distances between vertices along mesh edges.
    #[default]
    VertexDist,
    /// Distances between face centroids across shared edges.
    FaceDist,
}

/// A dense per-element distance field.
///
/// Indexed by element id; `f64::INFINITY` marks unreachable elements.
/// Reads outside the element range yield infinity and writes outside it are
/// ignored, so ids above the count (sparse meshes that were not reindexed)
/// simply fall outside the field.
#[derive(Debug, Clone)]
pub struct DistanceField {
    distances: Vec<f64>,
}

impl DistanceField {
    fn new(count: usize) -> Self {
        Self {
            distances: vec![f64::INFINITY; count],
        }
    }

    /// The distance to the given element, or infinity if unreachable or
    /// out of range.
    #[inline]
    #[must_use]
    pub fn distance(&self, id: u32) -> f64 {
        self.distances
            .get(id as usize)
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    #[inline]
    fn set_distance(&mut self, id: u32, distance: f64) {
        if let Some(entry) = self.distances.get_mut(id as usize) {
            *entry = distance;
        }
    }

    /// Number of elements covered by the field.
    #[must_use]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// Whether the field covers no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// All distances, indexed by element id.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.distances
    }

    /// The smallest finite distance in the field.
    #[must_use]
    pub fn min_distance(&self) -> f64 {
        self.distances
            .iter()
            .copied()
            .filter(|d| d.is_finite())
            .fold(f64::INFINITY, f64::min)
    }

    /// The largest finite distance in the field.
    #[must_use]
    pub fn max_distance(&self) -> f64 {
        self.distances
            .iter()
            .copied()
            .filter(|d| d.is_finite())
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Heap entry for Dijkstra's algorithm.
#[derive(Debug, Clone, Copy)]
struct State {
    element: u32,
    distance: f64,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.element == other.element && (self.distance - other.distance).abs() < f64::EPSILON
    }
}

impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behavior (BinaryHeap is a max-heap).
        other
            .distance
            .partial_cmp(&self.distance)
            .unwrap_or(Ordering::Equal)
    }
}

/// Multi-source graph-distance engine.
///
/// Holds an ordered list of source element ids, interpreted in the active
/// [`FieldType`], and one dense distance field per source in the same
/// order after [`compute_shortest_paths`](Self::compute_shortest_paths).
///
/// Requires mesh connectivity: without it every adjacency query is empty
/// and all non-source entries stay at infinity. Element ids must be dense
/// (`0..count`), which holds for freshly loaded meshes and after
/// [`Mesh::reindex_ids`].
#[derive(Debug, Clone, Default)]
pub struct GraphDist {
    /// Selects the vertex or the face graph.
    pub field_type: FieldType,
    /// Source element ids, in computation order.
    pub sources: Vec<u32>,
    /// One distance field per source, indexed by source position.
    pub dist: Vec<DistanceField>,
}

impl GraphDist {
    /// Creates an engine for the given graph mode with no sources.
    #[must_use]
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            sources: Vec::new(),
            dist: Vec::new(),
        }
    }

    /// Recomputes every distance field from scratch, in source order.
    ///
    /// There is no incremental update; previously accumulated fields are
    /// cleared first.
    ///
    /// # Errors
    ///
    /// Returns [`GraphDistError::InvalidSourceIndex`] if a source id lies
    /// outside the element-id range of the active mode. Fields already
    /// computed for earlier sources are kept in [`dist`](Self::dist); the
    /// failing source and everything after it produce none.
    pub fn compute_shortest_paths(&mut self, mesh: &Mesh) -> Result<(), GraphDistError> {
        self.dist.clear();
        for &source in &self.sources {
            let field = match self.field_type {
                FieldType::VertexDist => vertex_shortest_path(mesh, source),
                FieldType::FaceDist => face_shortest_path(mesh, source),
            }?;
            self.dist.push(field);
        }
        info!(
            sources = self.sources.len(),
            field_type = ?self.field_type,
            "shortest-path fields computed"
        );
        Ok(())
    }
}

/// Single-source Dijkstra over the vertex graph.
#[allow(clippy::cast_possible_truncation)]
// Element counts fit in u32 alongside the ids.
fn vertex_shortest_path(mesh: &Mesh, source: u32) -> Result<DistanceField, GraphDistError> {
    let count = mesh.vertex_count();
    if source as usize >= count {
        return Err(GraphDistError::InvalidSourceIndex { id: source, count });
    }

    let mut dist = DistanceField::new(count);
    dist.set_distance(source, 0.0);

    let mut heap = BinaryHeap::new();
    heap.push(State {
        element: source,
        distance: 0.0,
    });

    while let Some(State { element, distance }) = heap.pop() {
        // Lazy stale-entry tolerance: entries pushed before a later
        // improvement pop with an outdated distance and are skipped.
        if distance > dist.distance(element) {
            continue;
        }
        let Some(current) = mesh.vertex(element) else {
            continue;
        };
        for n in mesh.vertex_neighbors(element) {
            let Some(neighbor) = mesh.vertex(n) else {
                continue;
            };
            let weight = (neighbor.position - current.position).norm();
            let candidate = dist.distance(element) + weight;
            if candidate < dist.distance(n) {
                dist.set_distance(n, candidate);
                heap.push(State {
                    element: n,
                    distance: candidate,
                });
            }
        }
    }

    debug!(source, count, "vertex distance field complete");
    Ok(dist)
}

/// Single-source Dijkstra over the face graph, weighted by centroid
/// distances.
fn face_shortest_path(mesh: &Mesh, source: u32) -> Result<DistanceField, GraphDistError> {
    let count = mesh.face_count();
    if source as usize >= count {
        return Err(GraphDistError::InvalidSourceIndex { id: source, count });
    }

    let mut dist = DistanceField::new(count);
    dist.set_distance(source, 0.0);

    let mut heap = BinaryHeap::new();
    heap.push(State {
        element: source,
        distance: 0.0,
    });

    while let Some(State { element, distance }) = heap.pop() {
        if distance > dist.distance(element) {
            continue;
        }
        let Some(centroid) = mesh.face_centroid(element) else {
            continue;
        };
        for n in mesh.face_neighbors(element) {
            let Some(neighbor_centroid) = mesh.face_centroid(n) else {
                continue;
            };
            let weight = (neighbor_centroid - centroid).norm();
            let candidate = dist.distance(element) + weight;
            if candidate < dist.distance(n) {
                dist.set_distance(n, candidate);
                heap.push(State {
                    element: n,
                    distance: candidate,
                });
            }
        }
    }

    debug!(source, count, "face distance field complete");
    Ok(dist)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Unit square split along the 0-2 diagonal: faces 0-1-2 and 0-2-3.
    fn square_mesh() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_vertex(p(0.0, 0.0, 0.0));
        mesh.add_vertex(p(1.0, 0.0, 0.0));
        mesh.add_vertex(p(1.0, 1.0, 0.0));
        mesh.add_vertex(p(0.0, 1.0, 0.0));
        mesh.add_face(0, 1, 2).unwrap();
        mesh.add_face(0, 2, 3).unwrap();
        mesh.compute_connectivity();
        mesh
    }

    #[test]
    fn source_distance_is_zero() {
        let mesh = square_mesh();
        let mut gd = GraphDist::new(FieldType::VertexDist);
        gd.sources.push(0);
        gd.compute_shortest_paths(&mesh).unwrap();
        assert!(gd.dist[0].distance(0).abs() < 1e-12);
    }

    #[test]
    fn one_ring_distance_is_euclidean() {
        let mesh = square_mesh();
        let mut gd = GraphDist::new(FieldType::VertexDist);
        gd.sources.push(0);
        gd.compute_shortest_paths(&mesh).unwrap();
        assert!((gd.dist[0].distance(1) - 1.0).abs() < 1e-12);
        assert!((gd.dist[0].distance(3) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn square_diagonal_runs_along_the_shared_edge() {
        let mesh = square_mesh();
        let mut gd = GraphDist::new(FieldType::VertexDist);
        gd.sources.push(0);
        gd.compute_shortest_paths(&mesh).unwrap();
        // 0-2 is a real edge of both triangles, so the distance is √2, not
        // the 2-edge path of length 2.
        assert!((gd.dist[0].distance(2) - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn face_mode_uses_centroid_distances() {
        let mesh = square_mesh();
        let mut gd = GraphDist::new(FieldType::FaceDist);
        gd.sources.push(0);
        gd.compute_shortest_paths(&mesh).unwrap();
        // Centroids (2/3, 1/3) and (1/3, 2/3): distance √2 / 3.
        let expected = 2.0_f64.sqrt() / 3.0;
        assert!(gd.dist[0].distance(0).abs() < 1e-12);
        assert!((gd.dist[0].distance(1) - expected).abs() < 1e-12);
    }

    #[test]
    fn fields_follow_source_order() {
        let mesh = square_mesh();
        let mut gd = GraphDist::new(FieldType::VertexDist);
        gd.sources = vec![2, 0];
        gd.compute_shortest_paths(&mesh).unwrap();
        assert_eq!(gd.dist.len(), 2);
        assert!(gd.dist[0].distance(2).abs() < 1e-12);
        assert!(gd.dist[1].distance(0).abs() < 1e-12);
    }

    #[test]
    fn recompute_clears_previous_fields() {
        let mesh = square_mesh();
        let mut gd = GraphDist::new(FieldType::VertexDist);
        gd.sources = vec![0, 1];
        gd.compute_shortest_paths(&mesh).unwrap();
        gd.sources.truncate(1);
        gd.compute_shortest_paths(&mesh).unwrap();
        assert_eq!(gd.dist.len(), 1);
    }

    #[test]
    fn invalid_source_keeps_earlier_fields() {
        let mesh = square_mesh();
        let mut gd = GraphDist::new(FieldType::VertexDist);
        gd.sources = vec![0, 99, 1];
        let err = gd.compute_shortest_paths(&mesh).unwrap_err();
        assert!(matches!(
            err,
            GraphDistError::InvalidSourceIndex { id: 99, count: 4 }
        ));
        // The field for source 0 survives; 99 and 1 produced none.
        assert_eq!(gd.dist.len(), 1);
        assert!(gd.dist[0].distance(0).abs() < 1e-12);
    }

    #[test]
    fn invalid_first_source_leaves_no_fields() {
        let mesh = square_mesh();
        let mut gd = GraphDist::new(FieldType::FaceDist);
        gd.sources.push(2);
        assert!(gd.compute_shortest_paths(&mesh).is_err());
        assert!(gd.dist.is_empty());
    }

    #[test]
    fn no_connectivity_leaves_others_unreachable() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(p(0.0, 0.0, 0.0));
        mesh.add_vertex(p(1.0, 0.0, 0.0));
        mesh.add_vertex(p(0.0, 1.0, 0.0));
        mesh.add_face(0, 1, 2).unwrap();
        let mut gd = GraphDist::new(FieldType::VertexDist);
        gd.sources.push(0);
        gd.compute_shortest_paths(&mesh).unwrap();
        assert!(gd.dist[0].distance(0).abs() < 1e-12);
        assert!(gd.dist[0].distance(1).is_infinite());
        assert!(gd.dist[0].distance(2).is_infinite());
    }

    #[test]
    fn triangle_inequality_through_intermediate() {
        // Strip of triangles over 6 vertices in two rows.
        let mut mesh = Mesh::new();
        for i in 0..3 {
            mesh.add_vertex(p(f64::from(i), 0.0, 0.0));
        }
        for i in 0..3 {
            mesh.add_vertex(p(f64::from(i) + 0.5, 1.0, 0.0));
        }
        for i in 0..2u32 {
            mesh.add_face(i, i + 1, i + 3).unwrap();
            mesh.add_face(i + 1, i + 4, i + 3).unwrap();
        }
        mesh.compute_connectivity();

        let mut from_source = GraphDist::new(FieldType::VertexDist);
        from_source.sources.push(0);
        from_source.compute_shortest_paths(&mesh).unwrap();
        let intermediate = 4;
        let mut from_intermediate = GraphDist::new(FieldType::VertexDist);
        from_intermediate.sources.push(intermediate);
        from_intermediate.compute_shortest_paths(&mesh).unwrap();

        #[allow(clippy::cast_possible_truncation)]
        for c in 0..mesh.vertex_count() as u32 {
            let direct = from_source.dist[0].distance(c);
            let via = from_source.dist[0].distance(intermediate)
                + from_intermediate.dist[0].distance(c);
            assert!(direct <= via + 1e-9);
        }
    }

    #[test]
    fn distance_field_bounds() {
        let mesh = square_mesh();
        let mut gd = GraphDist::new(FieldType::VertexDist);
        gd.sources.push(0);
        gd.compute_shortest_paths(&mesh).unwrap();
        let field = &gd.dist[0];
        assert_eq!(field.len(), 4);
        assert!(field.distance(100).is_infinite());
        assert!(field.min_distance().abs() < 1e-12);
        assert!((field.max_distance() - 2.0_f64.sqrt()).abs() < 1e-12);
    }
}
