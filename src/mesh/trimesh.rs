//! Indexed triangle surface mesh.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use super::data::{find_array, upsert_array, DataArray};
use super::edge::{triangle_edges, Edge};
use crate::error::{MeshError, Result};

/// A triangle surface mesh stored as a vertex array and a triangle array.
///
/// Triangle identity is its position in [`TriMesh::faces`]. Per-triangle
/// arrays (partition labels, for instance) live in [`TriMesh::cell_data`].
#[derive(Debug, Clone, Default)]
pub struct TriMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,
    /// Triangles as vertex index triples.
    pub faces: Vec<[usize; 3]>,
    /// Named per-triangle arrays.
    pub cell_data: Vec<DataArray>,
}

impl TriMesh {
    /// Create a mesh from vertices and triangles.
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            cell_data: Vec::new(),
        }
    }

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Check that every triangle references an existing vertex.
    pub fn validate(&self) -> Result<()> {
        for (fi, face) in self.faces.iter().enumerate() {
            for &vi in face {
                if vi >= self.vertices.len() {
                    return Err(MeshError::InvalidVertexIndex {
                        cell: fi,
                        vertex: vi,
                    });
                }
            }
        }
        Ok(())
    }

    /// Unnormalized normal of a triangle (twice its area in length).
    #[inline]
    pub fn face_cross(&self, f: usize) -> Vector3<f64> {
        let [a, b, c] = self.faces[f];
        let p0 = self.vertices[a];
        (self.vertices[b] - p0).cross(&(self.vertices[c] - p0))
    }

    /// Area of a triangle.
    #[inline]
    pub fn face_area(&self, f: usize) -> f64 {
        0.5 * self.face_cross(f).norm()
    }

    /// Areas of all triangles, in triangle order.
    pub fn face_areas(&self) -> Vec<f64> {
        (0..self.faces.len()).map(|f| self.face_area(f)).collect()
    }

    /// Total surface area.
    pub fn surface_area(&self) -> f64 {
        self.face_areas().iter().sum()
    }

    /// Axis-aligned bounding box, or `None` for a mesh without vertices.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), p| {
            (lo.inf(p), hi.sup(p))
        }))
    }

    /// Number of triangles incident to each edge.
    pub fn edge_face_counts(&self) -> HashMap<Edge, usize> {
        let mut counts: HashMap<Edge, usize> = HashMap::with_capacity(self.faces.len() * 3 / 2);
        for face in &self.faces {
            for e in triangle_edges(face) {
                *counts.entry(e).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Flags vertices that lie on a boundary edge (an edge with exactly one triangle).
    pub fn boundary_vertices(&self) -> Vec<bool> {
        let mut flags = vec![false; self.vertices.len()];
        for (e, count) in self.edge_face_counts() {
            if count == 1 && !e.is_degenerate() {
                flags[e.lo()] = true;
                flags[e.hi()] = true;
            }
        }
        flags
    }

    /// One-ring neighbors of every vertex, sorted and deduplicated.
    pub fn vertex_neighbors(&self) -> Vec<Vec<usize>> {
        let mut nbrs: Vec<Vec<usize>> = vec![Vec::new(); self.vertices.len()];
        for face in &self.faces {
            for e in triangle_edges(face) {
                if e.is_degenerate() {
                    continue;
                }
                nbrs[e.lo()].push(e.hi());
                nbrs[e.hi()].push(e.lo());
            }
        }
        for list in &mut nbrs {
            list.sort_unstable();
            list.dedup();
        }
        nbrs
    }

    /// Look up a per-triangle array by name.
    pub fn cell_array(&self, name: &str) -> Option<&DataArray> {
        find_array(&self.cell_data, name)
    }

    /// Attach a per-triangle array, replacing one with the same name.
    pub fn set_cell_array(&mut self, array: DataArray) -> Result<()> {
        if array.num_tuples() != self.faces.len() {
            return Err(MeshError::CellCountMismatch {
                expected: self.faces.len(),
                found: array.num_tuples(),
            });
        }
        upsert_array(&mut self.cell_data, array);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> TriMesh {
        TriMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_face_area() {
        let mesh = square();
        assert_relative_eq!(mesh.face_area(0), 0.5);
        assert_relative_eq!(mesh.surface_area(), 1.0);
    }

    #[test]
    fn test_bounding_box() {
        let (lo, hi) = square().bounding_box().unwrap();
        assert_eq!(lo, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(hi, Point3::new(1.0, 1.0, 0.0));
        assert!(TriMesh::default().bounding_box().is_none());
    }

    #[test]
    fn test_boundary_and_neighbors() {
        let mesh = square();
        assert!(mesh.boundary_vertices().iter().all(|&b| b));
        let nbrs = mesh.vertex_neighbors();
        assert_eq!(nbrs[0], vec![1, 2, 3]);
        assert_eq!(nbrs[1], vec![0, 2]);
    }

    #[test]
    fn test_validate() {
        let mut mesh = square();
        assert!(mesh.validate().is_ok());
        mesh.faces.push([0, 1, 9]);
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::InvalidVertexIndex { cell: 2, vertex: 9 })
        ));
    }

    #[test]
    fn test_set_cell_array_checks_length() {
        let mut mesh = square();
        assert!(mesh.set_cell_array(DataArray::int("p", 1, vec![0, 1])).is_ok());
        assert!(mesh.cell_array("p").is_some());
        assert!(mesh.set_cell_array(DataArray::int("q", 1, vec![0])).is_err());
    }
}
