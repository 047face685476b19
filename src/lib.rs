//! # Atrophy
//!
//! Surface and volume mesh analysis for longitudinal brain MRI studies.
//!
//! The library covers four tasks, each exposed as a subcommand of the
//! `atrophy` binary:
//!
//! - **Surface partitioning**: split a triangle surface into regions of equal
//!   area by partitioning its face-adjacency graph, optionally after Taubin
//!   smoothing
//! - **Thickness delta**: per-tetrahedron circumradius and volume change
//!   between a baseline and a follow-up mesh
//! - **Center transform**: whole-voxel translation aligning the centers of two
//!   images
//! - **ROI volumes**: label-weighted baseline and follow-up volumes from a
//!   segmentation and a Jacobian mesh
//!
//! ## Quick Start
//!
//! ```no_run
//! use atrophy::prelude::*;
//!
//! let mut mesh = atrophy::io::load_surface("lh.pial.vtk").unwrap();
//! taubin_smooth(&mut mesh, &SmoothOptions::default().with_iterations(10));
//!
//! let adjacency = FaceAdjacency::from_mesh(&mesh);
//! let weights = node_weights_from_areas(&mesh.face_areas(), DEFAULT_WEIGHT_SCALE);
//! let graph = Graph::from_adjacency(&adjacency, weights).unwrap();
//! let parts = partition_graph(&graph, 80, &PartitionOptions::default()).unwrap();
//! println!("edge cut: {}", parts.edge_cut);
//! ```
//!
//! ## Face Adjacency
//!
//! ```
//! use atrophy::prelude::*;
//!
//! // Closed tetrahedron surface
//! let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
//! let adj = FaceAdjacency::from_triangles(&faces);
//!
//! for f in 0..4 {
//!     assert_eq!(adj.neighbors(f).len(), 3);
//! }
//! assert!(adj.is_symmetric());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod image;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use atrophy::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::adjacency::FaceAdjacency;
    pub use crate::algo::partition::{
        node_weights_from_areas, partition_graph, Graph, Partition, PartitionOptions,
        DEFAULT_WEIGHT_SCALE,
    };
    pub use crate::algo::smooth::{taubin_smooth, SmoothOptions};
    pub use crate::algo::Progress;
    pub use crate::error::{MeshError, Result};
    pub use crate::image::{Image, ImageGeometry};
    pub use crate::mesh::{DataArray, Edge, TetMesh, TriMesh};
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_partition_pipeline() {
        // 4 x 4 grid of unit squares, two triangles each
        let n = 4;
        let mut vertices = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        let mut faces = Vec::new();
        for j in 0..n {
            for i in 0..n {
                let v = j * (n + 1) + i;
                faces.push([v, v + 1, v + n + 2]);
                faces.push([v, v + n + 2, v + n + 1]);
            }
        }
        let mesh = TriMesh::new(vertices, faces);

        let adjacency = FaceAdjacency::from_mesh(&mesh);
        assert!(adjacency.is_symmetric());

        let weights = node_weights_from_areas(&mesh.face_areas(), DEFAULT_WEIGHT_SCALE);
        assert!(weights.iter().all(|&w| w == 5000));

        let graph = Graph::from_adjacency(&adjacency, weights).unwrap();
        let parts = partition_graph(&graph, 4, &PartitionOptions::default()).unwrap();
        assert_eq!(parts.labels.len(), mesh.num_faces());
        assert!(parts.labels.iter().all(|&p| p < 4));
        for p in 0..4 {
            assert!(parts.labels.contains(&p), "part {} is empty", p);
        }
    }
}
