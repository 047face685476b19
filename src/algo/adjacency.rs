//! Triangle face adjacency.
//!
//! Two triangles are adjacent when they share an edge. The adjacency list is
//! the graph handed to the partitioner: one node per triangle, one arc per
//! shared edge.
//!
//! Construction is purely structural. Vertex coordinates are never read, so
//! zero-area or inverted triangles are handled like any other. Vertex indices
//! are not bounds-checked here; that belongs to the mesh loader.
//!
//! # Non-manifold and degenerate input
//!
//! - An edge shared by three or more triangles makes all of them mutually
//!   adjacent through that edge.
//! - A degenerate triangle such as `[4, 4, 7]` registers itself twice under the
//!   same edge key. Self-registrations are stripped, so a triangle is never its
//!   own neighbor.
//!
//! # Example
//!
//! ```
//! use atrophy::algo::adjacency::FaceAdjacency;
//!
//! let faces = vec![[0, 1, 2], [1, 2, 3]];
//! let adj = FaceAdjacency::from_triangles(&faces);
//!
//! assert_eq!(adj.neighbors(0), &[1]);
//! assert_eq!(adj.neighbors(1), &[0]);
//! ```

use std::collections::HashMap;

use crate::mesh::{triangle_edges, Edge, TriMesh};

/// Per-triangle neighbor lists.
///
/// `neighbors(i)` is sorted ascending and free of duplicates; the outer
/// sequence is indexed by triangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceAdjacency {
    adjacent: Vec<Vec<usize>>,
}

impl FaceAdjacency {
    /// Build the adjacency of a triangle list.
    pub fn from_triangles(faces: &[[usize; 3]]) -> Self {
        let edge_faces = edge_to_triangles(faces);

        let adjacent = faces
            .iter()
            .enumerate()
            .map(|(fi, face)| {
                let mut nbrs: Vec<usize> = triangle_edges(face)
                    .iter()
                    .filter_map(|e| edge_faces.get(e))
                    .flatten()
                    .copied()
                    .filter(|&other| other != fi)
                    .collect();
                nbrs.sort_unstable();
                nbrs.dedup();
                nbrs
            })
            .collect();

        Self { adjacent }
    }

    /// Build the adjacency of a mesh's triangles.
    pub fn from_mesh(mesh: &TriMesh) -> Self {
        Self::from_triangles(&mesh.faces)
    }

    /// Neighbors of triangle `face`; empty if out of range.
    #[inline]
    pub fn neighbors(&self, face: usize) -> &[usize] {
        self.adjacent.get(face).map_or(&[], Vec::as_slice)
    }

    /// Number of triangles.
    #[inline]
    pub fn len(&self) -> usize {
        self.adjacent.len()
    }

    /// True if built from an empty triangle list.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.adjacent.is_empty()
    }

    /// Iterate over neighbor lists in triangle order.
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.adjacent.iter().map(Vec::as_slice)
    }

    /// Check whether two triangles share an edge.
    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        self.neighbors(a).binary_search(&b).is_ok()
    }

    /// Number of undirected adjacency pairs.
    pub fn num_pairs(&self) -> usize {
        self.adjacent.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// True when `b` lists `a` for every `a` listing `b`.
    pub fn is_symmetric(&self) -> bool {
        self.adjacent
            .iter()
            .enumerate()
            .all(|(a, nbrs)| nbrs.iter().all(|&b| self.are_adjacent(b, a)))
    }

    /// Compressed sparse row form `(xadj, adjncy)`.
    ///
    /// The neighbors of triangle `i` are `adjncy[xadj[i]..xadj[i + 1]]`.
    pub fn to_csr(&self) -> (Vec<usize>, Vec<usize>) {
        let mut xadj = Vec::with_capacity(self.adjacent.len() + 1);
        let mut adjncy = Vec::with_capacity(self.adjacent.iter().map(Vec::len).sum());
        xadj.push(0);
        for nbrs in &self.adjacent {
            adjncy.extend_from_slice(nbrs);
            xadj.push(adjncy.len());
        }
        (xadj, adjncy)
    }

    /// Consume into the raw neighbor lists.
    pub fn into_inner(self) -> Vec<Vec<usize>> {
        self.adjacent
    }
}

/// Register every triangle under the canonical key of each of its edges.
///
/// A triangle appears once per edge it has; a degenerate triangle whose two
/// edges share a key appears twice under that key.
pub fn edge_to_triangles(faces: &[[usize; 3]]) -> HashMap<Edge, Vec<usize>> {
    let mut edge_faces: HashMap<Edge, Vec<usize>> = HashMap::with_capacity(faces.len() * 3 / 2);
    for (fi, face) in faces.iter().enumerate() {
        for e in triangle_edges(face) {
            edge_faces.entry(e).or_default().push(fi);
        }
    }
    edge_faces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> Vec<[usize; 3]> {
        vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]]
    }

    #[test]
    fn test_single_triangle() {
        let adj = FaceAdjacency::from_triangles(&[[0, 1, 2]]);
        assert_eq!(adj.len(), 1);
        assert!(adj.neighbors(0).is_empty());
    }

    #[test]
    fn test_shared_edge() {
        let adj = FaceAdjacency::from_triangles(&[[0, 1, 2], [1, 2, 3]]);
        assert_eq!(adj.neighbors(0), &[1]);
        assert_eq!(adj.neighbors(1), &[0]);
        assert_eq!(adj.num_pairs(), 1);
    }

    #[test]
    fn test_closed_tetrahedron() {
        let adj = FaceAdjacency::from_triangles(&tetrahedron());
        for f in 0..4 {
            assert_eq!(adj.neighbors(f).len(), 3, "face {} should have 3 neighbors", f);
            assert!(!adj.neighbors(f).contains(&f));
        }
        assert!(adj.is_symmetric());
        assert_eq!(adj.num_pairs(), 6);
    }

    #[test]
    fn test_non_manifold_fan() {
        // Edge (0, 1) shared by three triangles
        let faces = vec![[0, 1, 2], [1, 0, 3], [0, 1, 4]];
        let adj = FaceAdjacency::from_triangles(&faces);
        assert_eq!(adj.neighbors(0), &[1, 2]);
        assert_eq!(adj.neighbors(1), &[0, 2]);
        assert_eq!(adj.neighbors(2), &[0, 1]);
    }

    #[test]
    fn test_degenerate_triangle_not_self_adjacent() {
        // [4, 4, 7] registers itself twice under edge (4, 7)
        let faces = vec![[4, 4, 7], [4, 7, 8]];
        let map = edge_to_triangles(&faces);
        assert_eq!(map[&Edge::new(4, 7)], vec![0, 0, 1]);

        let adj = FaceAdjacency::from_triangles(&faces);
        assert_eq!(adj.neighbors(0), &[1]);
        assert_eq!(adj.neighbors(1), &[0]);
    }

    #[test]
    fn test_fully_collapsed_triangle() {
        let adj = FaceAdjacency::from_triangles(&[[5, 5, 5]]);
        assert!(adj.neighbors(0).is_empty());
    }

    #[test]
    fn test_boundary_edges_contribute_nothing() {
        // Strip of three triangles: the middle one has two neighbors
        let faces = vec![[0, 1, 2], [1, 3, 2], [2, 3, 4]];
        let adj = FaceAdjacency::from_triangles(&faces);
        assert_eq!(adj.neighbors(0), &[1]);
        assert_eq!(adj.neighbors(1), &[0, 2]);
        assert_eq!(adj.neighbors(2), &[1]);
    }

    #[test]
    fn test_idempotent() {
        let faces = tetrahedron();
        assert_eq!(
            FaceAdjacency::from_triangles(&faces),
            FaceAdjacency::from_triangles(&faces)
        );
    }

    #[test]
    fn test_winding_does_not_matter() {
        let a = FaceAdjacency::from_triangles(&[[0, 1, 2], [1, 2, 3]]);
        let b = FaceAdjacency::from_triangles(&[[0, 2, 1], [2, 1, 3]]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_out_of_range_lookup() {
        let adj = FaceAdjacency::from_triangles(&[[0, 1, 2]]);
        assert!(adj.neighbors(10).is_empty());
    }

    #[test]
    fn test_no_bounds_check_on_vertex_indices() {
        // Vertex indices are taken at face value
        let adj = FaceAdjacency::from_triangles(&[[1000, 2000, 3000], [2000, 3000, 9]]);
        assert!(adj.are_adjacent(0, 1));
    }

    #[test]
    fn test_csr() {
        let adj = FaceAdjacency::from_triangles(&[[0, 1, 2], [1, 2, 3], [7, 8, 9]]);
        let (xadj, adjncy) = adj.to_csr();
        assert_eq!(xadj, vec![0, 1, 2, 2]);
        assert_eq!(adjncy, vec![1, 0]);
    }

    #[test]
    fn test_empty() {
        let adj = FaceAdjacency::from_triangles(&[]);
        assert!(adj.is_empty());
        assert_eq!(adj.to_csr(), (vec![0], vec![]));
    }
}
