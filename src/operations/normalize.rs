//! Position normalization into a target cube.

use crate::math::{Point3, TOLERANCE};
use crate::topology::Mesh;

/// Maps vertex positions into `[target_min, target_max]` along the largest
/// extent, preserving the aspect ratio of the shape.
///
/// The coordinate with the largest range is mapped to the full target
/// interval; the other coordinates are scaled by the same factor.
#[derive(Debug, Clone, Copy)]
pub struct NormalizePositions {
    target_min: f64,
    target_max: f64,
}

impl Default for NormalizePositions {
    fn default() -> Self {
        Self::new(-1.0, 1.0)
    }
}

impl NormalizePositions {
    /// Creates the operation with the given target interval.
    #[must_use]
    pub fn new(target_min: f64, target_max: f64) -> Self {
        Self {
            target_min,
            target_max,
        }
    }

    /// Executes the operation, remapping every vertex position in place.
    ///
    /// Empty meshes and meshes with zero extent are left unchanged.
    pub fn execute(&self, mesh: &mut Mesh) {
        let mut vertices = mesh.vertices();
        let Some(first) = vertices.next() else {
            return;
        };
        let mut min_pos = first.position.coords;
        let mut max_pos = first.position.coords;
        for vertex in vertices {
            min_pos = min_pos.inf(&vertex.position.coords);
            max_pos = max_pos.sup(&vertex.position.coords);
        }

        let diff = max_pos - min_pos;
        let range = diff.x.max(diff.y).max(diff.z);
        if range < TOLERANCE {
            return;
        }

        // For each coordinate i: r = (x * (t_max - t_min)
        //   - min_i * t_max + max_i * t_min) / range.
        // The largest-range coordinate lands exactly on the target
        // interval; the others keep their proportion to it.
        let mult = self.target_max - self.target_min;
        let add = -min_pos * self.target_max + max_pos * self.target_min;
        for vertex in mesh.vertices_mut() {
            vertex.position = Point3::from((vertex.position.coords * mult + add) / range);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use approx::assert_relative_eq;

    #[test]
    fn largest_axis_maps_to_target_interval() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(2.0, 1.0, 0.0));
        NormalizePositions::new(-1.0, 1.0).execute(&mut mesh);

        assert_relative_eq!(mesh.vertex(0).unwrap().position.x, -1.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.vertex(1).unwrap().position.x, 1.0, epsilon = 1e-12);
        // The y extent is half the x extent and stays half as wide.
        let y0 = mesh.vertex(0).unwrap().position.y;
        let y1 = mesh.vertex(1).unwrap().position.y;
        assert_relative_eq!(y1 - y0, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_extent_is_left_unchanged() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(3.0, 3.0, 3.0));
        mesh.add_vertex(Point3::new(3.0, 3.0, 3.0));
        NormalizePositions::default().execute(&mut mesh);
        assert_eq!(mesh.vertex(0).unwrap().position, Point3::new(3.0, 3.0, 3.0));
    }
}
