//! Taubin λ|μ smoothing for triangle surface meshes.
//!
//! Each iteration applies two uniform Laplacian steps: a shrinking step with
//! factor λ > 0 followed by an inflating step with factor μ < 0. With
//! `|μ| > λ` the low-pass filter removes noise without the steady shrinkage of
//! plain Laplacian smoothing.
//!
//! Interior vertices move towards the centroid of their one-ring. Boundary
//! vertices only see the vertices they share a boundary edge with, so open
//! borders are smoothed along themselves instead of collapsing inwards. With
//! [`SmoothOptions::preserve_boundary`] they are pinned instead.
//!
//! # Reference
//!
//! Taubin, G. (1995). "A signal processing approach to fair surface design."
//! SIGGRAPH '95.
//!
//! # Example
//!
//! ```
//! use atrophy::algo::smooth::{taubin_smooth, SmoothOptions};
//! use atrophy::mesh::TriMesh;
//! use nalgebra::Point3;
//!
//! let mut mesh = TriMesh::new(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.5, 1.0, 0.0),
//!         Point3::new(0.5, 0.4, 0.2),
//!     ],
//!     vec![[0, 1, 3], [1, 2, 3], [2, 0, 3]],
//! );
//!
//! taubin_smooth(&mut mesh, &SmoothOptions::default().with_iterations(10));
//! ```

use std::collections::HashSet;

use log::debug;
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::mesh::{Edge, TriMesh};

use super::Progress;

/// Options for Taubin smoothing.
#[derive(Debug, Clone)]
pub struct SmoothOptions {
    /// Number of λ|μ iterations.
    pub iterations: usize,

    /// Positive (shrinking) step factor.
    pub lambda: f64,

    /// Negative (inflating) step factor.
    pub mu: f64,

    /// Whether to keep boundary vertices fixed.
    pub preserve_boundary: bool,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for SmoothOptions {
    fn default() -> Self {
        Self {
            iterations: 1,
            lambda: 0.6,
            mu: -0.4,
            preserve_boundary: false,
            parallel: true,
        }
    }
}

impl SmoothOptions {
    /// Set the number of iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the shrinking factor λ.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Set the inflating factor μ.
    pub fn with_mu(mut self, mu: f64) -> Self {
        self.mu = mu;
        self
    }

    /// Keep boundary vertices fixed.
    pub fn preserving_boundary(mut self) -> Self {
        self.preserve_boundary = true;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Performs Taubin smoothing on a mesh, modifying vertex positions in place.
pub fn taubin_smooth(mesh: &mut TriMesh, options: &SmoothOptions) {
    taubin_smooth_with_progress(mesh, options, &Progress::none());
}

/// Taubin smoothing with progress reporting.
pub fn taubin_smooth_with_progress(
    mesh: &mut TriMesh,
    options: &SmoothOptions,
    progress: &Progress,
) {
    if options.iterations == 0 || mesh.vertices.is_empty() {
        return;
    }

    let rings = smoothing_rings(mesh, options.preserve_boundary);
    debug!(
        "Taubin smoothing: {} iterations, lambda={}, mu={}",
        options.iterations, options.lambda, options.mu
    );

    for iter in 0..options.iterations {
        progress.report(iter, options.iterations, "Taubin smoothing");

        // Positive step (smoothing)
        apply_laplacian_step(&mut mesh.vertices, &rings, options.lambda, options.parallel);
        // Negative step (inflation)
        apply_laplacian_step(&mut mesh.vertices, &rings, options.mu, options.parallel);
    }
    progress.report(options.iterations, options.iterations, "Taubin smoothing");
}

/// The vertices each vertex is averaged over.
///
/// Interior vertices use their full one-ring; boundary vertices use only
/// their neighbors along boundary edges, or nothing when pinned. An empty
/// ring leaves the vertex in place.
fn smoothing_rings(mesh: &TriMesh, preserve_boundary: bool) -> Vec<Vec<usize>> {
    let boundary_edges: HashSet<Edge> = mesh
        .edge_face_counts()
        .into_iter()
        .filter(|&(e, count)| count == 1 && !e.is_degenerate())
        .map(|(e, _)| e)
        .collect();
    let on_boundary = mesh.boundary_vertices();

    mesh.vertex_neighbors()
        .into_iter()
        .enumerate()
        .map(|(v, ring)| {
            if !on_boundary[v] {
                ring
            } else if preserve_boundary {
                Vec::new()
            } else {
                ring.into_iter()
                    .filter(|&u| boundary_edges.contains(&Edge::new(v, u)))
                    .collect()
            }
        })
        .collect()
}

fn apply_laplacian_step(
    positions: &mut [Point3<f64>],
    rings: &[Vec<usize>],
    factor: f64,
    parallel: bool,
) {
    let current: &[Point3<f64>] = positions;
    let new_positions: Vec<Point3<f64>> = if parallel {
        (0..current.len())
            .into_par_iter()
            .map(|i| compute_laplacian_step(current, &rings[i], i, factor))
            .collect()
    } else {
        (0..current.len())
            .map(|i| compute_laplacian_step(current, &rings[i], i, factor))
            .collect()
    };
    positions.copy_from_slice(&new_positions);
}

#[inline]
fn compute_laplacian_step(
    positions: &[Point3<f64>],
    ring: &[usize],
    v: usize,
    factor: f64,
) -> Point3<f64> {
    let p = positions[v];
    if ring.is_empty() {
        return p;
    }
    let sum: Vector3<f64> = ring.iter().map(|&u| positions[u].coords).sum();
    let centroid = Point3::from(sum / ring.len() as f64);
    p + (centroid - p) * factor
}
