//! Core mesh data structures.
//!
//! This module provides the indexed mesh representations used by the
//! analyses in this crate.
//!
//! # Overview
//!
//! - [`TriMesh`] - a triangle surface mesh (vertex array + triangle array)
//! - [`TetMesh`] - a tetrahedral volume mesh with point and cell arrays
//! - [`DataArray`] - a named per-point or per-cell array
//! - [`Edge`] - a canonical undirected edge key
//!
//! Elements are identified by their position in the owning array. No
//! manifoldness is assumed: triangle meshes loaded from disk may contain
//! boundary edges and edges shared by more than two triangles.
//!
//! # Construction
//!
//! Surface meshes are typically constructed from file I/O, which runs the
//! polygon soup through [`build_from_polygons`]:
//!
//! ```
//! use atrophy::mesh::{build_from_polygons, TriMesh};
//! use nalgebra::Point3;
//!
//! let points = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let mesh: TriMesh = build_from_polygons(&points, &[vec![0, 1, 2]], &[]).unwrap();
//! assert_eq!(mesh.num_faces(), 1);
//! ```

mod builder;
mod data;
mod edge;
mod tetmesh;
mod trimesh;

pub use builder::{build_from_polygons, build_with_origins};
pub use data::{find_array, upsert_array, ArrayValues, DataArray};
pub use edge::{triangle_edges, Edge};
pub use tetmesh::TetMesh;
pub use trimesh::TriMesh;
