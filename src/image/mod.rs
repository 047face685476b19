//! 3D scalar images and their physical geometry.
//!
//! - [`Image`] - voxel values plus geometry, with trilinear sampling
//! - [`ImageGeometry`] - voxel index to physical LPS mapping
//!
//! Images are read from NIfTI files by [`crate::io::load_image`].

mod geometry;
mod volume;

pub use geometry::{ras_to_lps, ImageGeometry};
pub use volume::Image;
