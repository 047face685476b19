//! Mesh and image analysis algorithms.
//!
//! - **Adjacency**: triangle face adjacency through shared edges
//! - **Partitioning**: weighted k-way partitioning of the adjacency graph
//! - **Smoothing**: Taubin λ|μ smoothing
//! - **Tetrahedra**: volume and circumradius of tetrahedral cells
//! - **Thickness**: per-cell thickness and volume change between two scans
//! - **Registration**: coarse center-of-image alignment
//! - **ROI volumes**: label-weighted regional volumes from a Jacobian mesh

pub mod adjacency;
pub mod partition;
pub mod register;
pub mod roi;
pub mod smooth;
pub mod tetra;
pub mod thickness;

mod progress;

pub use progress::Progress;
