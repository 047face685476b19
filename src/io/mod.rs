//! Mesh and image file I/O.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | Legacy VTK | `.vtk` | ✓ | ✓ | POLYDATA surfaces, UNSTRUCTURED_GRID tetrahedra |
//! | PLY | `.ply` | ✓ | ✓ | Surfaces only, ASCII output |
//! | NIfTI-1 | `.nii`, `.nii.gz` | ✓ | ✗ | Scalar images |
//!
//! # Usage
//!
//! Surface meshes use automatic format detection:
//!
//! ```no_run
//! use atrophy::io::{load_surface, save_surface};
//!
//! let mesh = load_surface("lh.pial.vtk").unwrap();
//! save_surface(&mesh, "lh.pial.ply").unwrap();
//! ```
//!
//! Tetrahedral meshes and images have a single format each:
//!
//! ```no_run
//! use atrophy::io::{load_image, vtk};
//!
//! let tets = vtk::load_tetmesh("gm_tetra.vtk").unwrap();
//! let seg = load_image("seg.nii.gz").unwrap();
//! ```

pub mod nifti;
pub mod ply;
pub mod vtk;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::image::Image;
use crate::mesh::TriMesh;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Legacy VTK format.
    Vtk,
    /// PLY (Stanford polygon) format.
    Ply,
    /// NIfTI-1 image format, optionally gzip-compressed.
    Nifti,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "vtk" => Some(Format::Vtk),
            "ply" => Some(Format::Ply),
            "nii" => Some(Format::Nifti),
            _ => None,
        }
    }

    /// Detect format from file path.
    ///
    /// A trailing `.gz` is looked through, so `seg.nii.gz` is NIfTI.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|ext| ext.to_str())?;
        if ext.eq_ignore_ascii_case("gz") {
            return path
                .file_stem()
                .map(Path::new)
                .and_then(|stem| stem.extension())
                .and_then(|ext| ext.to_str())
                .and_then(Format::from_extension);
        }
        Format::from_extension(ext)
    }
}

fn unsupported(path: &Path) -> MeshError {
    MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    }
}

/// Load a surface mesh with automatic format detection.
pub fn load_surface<P: AsRef<Path>>(path: P) -> Result<TriMesh> {
    let path = path.as_ref();
    match Format::from_path(path) {
        Some(Format::Vtk) => vtk::load_polydata(path),
        Some(Format::Ply) => ply::load(path),
        _ => Err(unsupported(path)),
    }
}

/// Save a surface mesh with automatic format detection.
pub fn save_surface<P: AsRef<Path>>(mesh: &TriMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match Format::from_path(path) {
        Some(Format::Vtk) => vtk::save_polydata(mesh, path),
        Some(Format::Ply) => ply::save(mesh, path),
        _ => Err(unsupported(path)),
    }
}

/// Load a NIfTI image.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<Image> {
    let path = path.as_ref();
    match Format::from_path(path) {
        Some(Format::Nifti) => nifti::load(path),
        _ => Err(unsupported(path)),
    }
}
