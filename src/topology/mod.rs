pub mod face;
pub mod vertex;

pub use face::{Corner, Face, FaceId};
pub use vertex::{Vertex, VertexId};

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::error::MeshError;
use crate::math::Point3;

/// How color information is carried by a mesh, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    /// No color information.
    #[default]
    NoColor,
    /// One color per vertex.
    VertexColor,
    /// One color per face.
    FaceColor,
}

/// Central store that owns all vertices and faces of a triangle mesh.
///
/// Entities reference each other through plain integer ids (corners hold
/// vertex ids, incident-face lists hold face ids), so there are no owning
/// cycles and removal can never dangle a Rust reference. Collections are
/// keyed by id and iterate in ascending-id order.
///
/// Vertex↔face connectivity is derived on demand by
/// [`compute_connectivity`](Self::compute_connectivity); it is kept valid
/// incrementally by [`add_face`](Self::add_face) and
/// [`remove_face`](Self::remove_face), but not by any other mutation.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: BTreeMap<VertexId, Vertex>,
    faces: BTreeMap<FaceId, Face>,
    next_vertex_id: VertexId,
    next_face_id: FaceId,
    has_connectivity: bool,
    has_vertex_normals: bool,
    has_face_normals: bool,
    color_scheme: ColorScheme,
}

impl Mesh {
    /// Creates a new, empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Insertion ---

    /// Inserts a vertex at `position` and returns its id.
    ///
    /// The remaining attributes are zero-initialized.
    pub fn add_vertex(&mut self, position: Point3) -> VertexId {
        let id = self.next_vertex_id;
        self.next_vertex_id += 1;
        self.vertices.insert(id, Vertex::new(id, position));
        id
    }

    /// Inserts a triangle over the given vertices and returns its id.
    ///
    /// The argument order becomes the corner order and thereby the face
    /// winding. If connectivity has already been computed, the new face is
    /// appended to each corner vertex's incident list, so connectivity
    /// stays valid under pure additions.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidReference`] if any vertex id does not
    /// exist; the mesh is left unchanged.
    pub fn add_face(
        &mut self,
        v0: VertexId,
        v1: VertexId,
        v2: VertexId,
    ) -> Result<FaceId, MeshError> {
        for v in [v0, v1, v2] {
            if !self.vertices.contains_key(&v) {
                return Err(MeshError::InvalidReference { vertex: v });
            }
        }
        let id = self.next_face_id;
        self.next_face_id += 1;
        self.faces.insert(id, Face::new(id, v0, v1, v2));
        if self.has_connectivity {
            for v in [v0, v1, v2] {
                if let Some(vertex) = self.vertices.get_mut(&v) {
                    vertex.faces_mut().push(id);
                }
            }
        }
        Ok(id)
    }

    // --- Removal ---

    /// Removes a vertex, returning its data.
    ///
    /// Faces are neither scanned nor repaired: removing a vertex that is
    /// still referenced by a face leaves that face dangling, and later
    /// queries involving it are undefined. Remove the referencing faces
    /// first.
    pub fn remove_vertex(&mut self, id: VertexId) -> Option<Vertex> {
        self.vertices.remove(&id)
    }

    /// Removes a face, returning its data.
    ///
    /// If connectivity is active, the face is also stripped from the
    /// incident list of each of its corner vertices, symmetric with
    /// [`add_face`](Self::add_face).
    pub fn remove_face(&mut self, id: FaceId) -> Option<Face> {
        let face = self.faces.remove(&id)?;
        if self.has_connectivity {
            for v in face.vertex_ids() {
                if let Some(vertex) = self.vertices.get_mut(&v) {
                    vertex.faces_mut().retain(|&f| f != id);
                }
            }
        }
        Some(face)
    }

    /// Renumbers vertices and faces to dense, zero-based ids.
    ///
    /// Elements are visited in ascending original-id order and assigned new
    /// sequential ids in that same order, so relative ordering is
    /// preserved. Corner references and incident-face lists are remapped to
    /// the new ids; references to elements that no longer exist are left
    /// untouched.
    #[allow(clippy::cast_possible_truncation)]
    // Ids are u32; meshes with more than 4B elements are unsupported.
    pub fn reindex_ids(&mut self) {
        let vertex_map: BTreeMap<VertexId, VertexId> = self
            .vertices
            .keys()
            .enumerate()
            .map(|(new, &old)| (old, new as VertexId))
            .collect();
        let face_map: BTreeMap<FaceId, FaceId> = self
            .faces
            .keys()
            .enumerate()
            .map(|(new, &old)| (old, new as FaceId))
            .collect();

        let vertices = std::mem::take(&mut self.vertices);
        self.vertices = vertices
            .into_iter()
            .map(|(old, mut vertex)| {
                let new = vertex_map.get(&old).copied().unwrap_or(old);
                vertex.set_id(new);
                for f in vertex.faces_mut() {
                    if let Some(&mapped) = face_map.get(f) {
                        *f = mapped;
                    }
                }
                (new, vertex)
            })
            .collect();

        let faces = std::mem::take(&mut self.faces);
        self.faces = faces
            .into_iter()
            .map(|(old, mut face)| {
                let new = face_map.get(&old).copied().unwrap_or(old);
                face.set_id(new);
                for corner in face.corners_mut() {
                    if let Some(&mapped) = vertex_map.get(&corner.vertex) {
                        corner.vertex = mapped;
                    }
                }
                (new, face)
            })
            .collect();

        self.next_vertex_id = self.vertices.len() as VertexId;
        self.next_face_id = self.faces.len() as FaceId;
    }

    /// Removes every element and resets counters, flags, and color scheme.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // --- Lookup and iteration ---

    /// Returns the vertex with the given id.
    #[must_use]
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    /// Returns mutable access to the vertex with the given id.
    pub fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(&id)
    }

    /// Returns the face with the given id.
    #[must_use]
    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(&id)
    }

    /// Returns mutable access to the face with the given id.
    pub fn face_mut(&mut self, id: FaceId) -> Option<&mut Face> {
        self.faces.get_mut(&id)
    }

    /// Number of vertices in the mesh.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces in the mesh.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Iterates over the vertices in ascending-id order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// Iterates mutably over the vertices in ascending-id order.
    pub fn vertices_mut(&mut self) -> impl Iterator<Item = &mut Vertex> {
        self.vertices.values_mut()
    }

    /// Iterates over the faces in ascending-id order.
    pub fn faces(&self) -> impl Iterator<Item = &Face> {
        self.faces.values()
    }

    /// Iterates mutably over the faces in ascending-id order.
    pub fn faces_mut(&mut self) -> impl Iterator<Item = &mut Face> {
        self.faces.values_mut()
    }

    // --- Connectivity ---

    /// Derives, for every vertex, the list of faces that reference it.
    ///
    /// Previously computed lists are cleared first, so repeated calls are
    /// idempotent. Cost is O(3 × face count).
    pub fn compute_connectivity(&mut self) {
        if self.has_connectivity {
            self.clear_connectivity();
        }
        let incidences: Vec<(FaceId, [VertexId; 3])> = self
            .faces
            .iter()
            .map(|(&id, face)| (id, face.vertex_ids()))
            .collect();
        for (face_id, corners) in incidences {
            for v in corners {
                if let Some(vertex) = self.vertices.get_mut(&v) {
                    vertex.faces_mut().push(face_id);
                }
            }
        }
        self.has_connectivity = true;
        debug!(
            vertices = self.vertices.len(),
            faces = self.faces.len(),
            "connectivity computed"
        );
    }

    /// Empties every incident-face list and resets the connectivity flag.
    pub fn clear_connectivity(&mut self) {
        for vertex in self.vertices.values_mut() {
            vertex.faces_mut().clear();
        }
        self.has_connectivity = false;
    }

    /// Whether connectivity is currently computed.
    #[must_use]
    pub fn has_connectivity(&self) -> bool {
        self.has_connectivity
    }

    // --- Neighbor queries ---

    /// The one-ring of a vertex: every other vertex of every face incident
    /// to it, de-duplicated.
    ///
    /// Requires connectivity; before
    /// [`compute_connectivity`](Self::compute_connectivity) the incident
    /// lists are empty and the result is silently empty. An unknown id also
    /// yields an empty set.
    #[must_use]
    pub fn vertex_neighbors(&self, id: VertexId) -> HashSet<VertexId> {
        let mut result = HashSet::new();
        let Some(vertex) = self.vertices.get(&id) else {
            return result;
        };
        for &face_id in vertex.faces() {
            let Some(face) = self.faces.get(&face_id) else {
                continue;
            };
            for v in face.vertex_ids() {
                if v != id {
                    result.insert(v);
                }
            }
        }
        result
    }

    /// The faces sharing an edge with the given face.
    ///
    /// Candidates come from the incident lists of the face's vertices; a
    /// candidate counts only if it traverses a shared edge in the opposite
    /// direction (see [`Face::shares_edge_with`]). Inconsistently wound
    /// input under-reports adjacency. Requires connectivity, like
    /// [`vertex_neighbors`](Self::vertex_neighbors).
    #[must_use]
    pub fn face_neighbors(&self, id: FaceId) -> HashSet<FaceId> {
        let mut result = HashSet::new();
        let Some(face) = self.faces.get(&id) else {
            return result;
        };
        for v in face.vertex_ids() {
            let Some(vertex) = self.vertices.get(&v) else {
                continue;
            };
            for &candidate_id in vertex.faces() {
                if candidate_id == id || result.contains(&candidate_id) {
                    continue;
                }
                if let Some(candidate) = self.faces.get(&candidate_id) {
                    if face.shares_edge_with(candidate) {
                        result.insert(candidate_id);
                    }
                }
            }
        }
        result
    }

    /// The centroid of a face's corner vertices.
    ///
    /// `None` if the face does not exist or references a removed vertex.
    #[must_use]
    pub fn face_centroid(&self, id: FaceId) -> Option<Point3> {
        let face = self.faces.get(&id)?;
        let mut sum = nalgebra::Vector3::zeros();
        for v in face.vertex_ids() {
            sum += self.vertices.get(&v)?.position.coords;
        }
        Some(Point3::from(sum / 3.0))
    }

    // --- Attribute copies ---

    /// Copies every corner's normal, color, and uv onto its vertex.
    ///
    /// Corners are visited in face order, so where faces disagree at a
    /// shared vertex the last face wins.
    pub fn copy_corner_attributes_to_vertices(&mut self) {
        let assignments: Vec<Corner> = self
            .faces
            .values()
            .flat_map(|face| face.corners().iter().cloned())
            .collect();
        for corner in assignments {
            if let Some(vertex) = self.vertices.get_mut(&corner.vertex) {
                vertex.normal = corner.normal;
                vertex.color = corner.color;
                vertex.uv = corner.uv;
            }
        }
    }

    /// Copies every corner's normal onto its vertex.
    pub fn copy_corner_normals_to_vertices(&mut self) {
        let assignments: Vec<(VertexId, crate::math::Vector3)> = self
            .faces
            .values()
            .flat_map(|face| face.corners().iter().map(|c| (c.vertex, c.normal)))
            .collect();
        for (v, normal) in assignments {
            if let Some(vertex) = self.vertices.get_mut(&v) {
                vertex.normal = normal;
            }
        }
    }

    /// Copies every corner's uv onto its vertex.
    pub fn copy_corner_uvs_to_vertices(&mut self) {
        let assignments: Vec<(VertexId, crate::math::Point2)> = self
            .faces
            .values()
            .flat_map(|face| face.corners().iter().map(|c| (c.vertex, c.uv)))
            .collect();
        for (v, uv) in assignments {
            if let Some(vertex) = self.vertices.get_mut(&v) {
                vertex.uv = uv;
            }
        }
    }

    /// Copies each vertex's normal, color, and uv onto every corner that
    /// references it, flattening any per-face discontinuities.
    pub fn copy_vertex_attributes_to_corners(&mut self) {
        let vertices = &self.vertices;
        for face in self.faces.values_mut() {
            for corner in face.corners_mut() {
                if let Some(vertex) = vertices.get(&corner.vertex) {
                    corner.normal = vertex.normal;
                    corner.color = vertex.color;
                    corner.uv = vertex.uv;
                }
            }
        }
    }

    // --- Flags and color scheme ---

    /// The mesh color scheme.
    #[must_use]
    pub fn color_scheme(&self) -> ColorScheme {
        self.color_scheme
    }

    /// Sets the mesh color scheme.
    pub fn set_color_scheme(&mut self, color_scheme: ColorScheme) {
        self.color_scheme = color_scheme;
    }

    /// Whether per-vertex normals have been computed or loaded.
    #[must_use]
    pub fn has_vertex_normals(&self) -> bool {
        self.has_vertex_normals
    }

    /// Whether face normals have been computed or loaded.
    #[must_use]
    pub fn has_face_normals(&self) -> bool {
        self.has_face_normals
    }

    pub(crate) fn set_has_vertex_normals(&mut self, value: bool) {
        self.has_vertex_normals = value;
    }

    pub(crate) fn set_has_face_normals(&mut self, value: bool) {
        self.has_face_normals = value;
    }
}
