//! Regional volumes from a segmentation and a Jacobian mesh.
//!
//! Every tetrahedron of a reference mesh carries a Voronoi center. The center
//! is looked up in a segmentation image, and the interpolated share of each
//! label becomes the cell's weight for that label. The baseline volume of a
//! label is then the weighted sum of cell volumes; the follow-up volume also
//! scales each cell by its Jacobian determinant.

use log::{debug, info};
use nalgebra::Point3;

use super::tetra::tetra_volume;
use crate::error::{MeshError, Result};
use crate::image::{ras_to_lps, Image};
use crate::mesh::TetMesh;

/// Cell array holding the RAS Voronoi center of every tetrahedron.
pub const CENTER_ARRAY: &str = "VoronoiCenter";

/// Cell array holding the Jacobian determinant of every tetrahedron.
pub const JACOBIAN_ARRAY: &str = "jacobian";

/// Segmentation labels reported when none are given.
pub const DEFAULT_LABELS: [i64; 6] = [1, 2, 10, 11, 12, 13];

/// Baseline and follow-up volume of one label.
#[derive(Debug, Clone, PartialEq)]
pub struct RoiVolume {
    /// Segmentation label.
    pub label: i64,
    /// Weighted sum of baseline cell volumes.
    pub baseline: f64,
    /// Weighted sum of Jacobian-scaled cell volumes.
    pub followup: f64,
}

impl RoiVolume {
    /// One CSV row: `id,label,baseline,followup`.
    ///
    /// Volumes use Rust's shortest round-trip float format, so whole numbers
    /// keep a trailing `.0`. Very large or small magnitudes switch to
    /// exponent notation without a sign or padding (`1e16`, `1e-7`).
    pub fn csv_row(&self, id: &str) -> String {
        format!("{},{},{:?},{:?}", id, self.label, self.baseline, self.followup)
    }
}

/// Compute regional volumes for each of `labels`.
///
/// `centers` supplies the [`CENTER_ARRAY`] cell array; `jacobian_mesh`
/// supplies the cell geometry and the [`JACOBIAN_ARRAY`] cell array. Both
/// must have one entry per cell, in the same order.
///
/// # Errors
///
/// - [`MeshError::MissingArray`] if either array is absent
/// - [`MeshError::UnsupportedCell`] if the centers are not 3-vectors
/// - [`MeshError::CellCountMismatch`] if the arrays do not line up
pub fn roi_volumes(
    centers: &TetMesh,
    jacobian_mesh: &TetMesh,
    segmentation: &Image,
    labels: &[i64],
) -> Result<Vec<RoiVolume>> {
    let center_array = centers.cell_array(CENTER_ARRAY)?;
    let centers_ras = center_array.to_vec3().ok_or_else(|| MeshError::UnsupportedCell {
        cell: 0,
        kind: format!("{} with {} components", CENTER_ARRAY, center_array.num_comp),
    })?;

    jacobian_mesh.validate()?;
    let n = jacobian_mesh.num_cells();
    let jacobian = jacobian_mesh.cell_array(JACOBIAN_ARRAY)?.to_f64();
    if jacobian.len() != n {
        return Err(MeshError::CellCountMismatch {
            expected: n,
            found: jacobian.len(),
        });
    }
    if centers_ras.len() != n {
        return Err(MeshError::CellCountMismatch {
            expected: n,
            found: centers_ras.len(),
        });
    }

    let volumes: Vec<f64> = (0..n).map(|c| tetra_volume(&jacobian_mesh.tetra(c))).collect();

    let geometry = segmentation.geometry();
    let indices: Vec<[f64; 3]> = centers_ras
        .iter()
        .map(|&[x, y, z]| geometry.physical_to_continuous_index(&ras_to_lps(&Point3::new(x, y, z))))
        .collect();
    debug!("mapped {} cell centers into the segmentation", indices.len());

    let results = labels
        .iter()
        .map(|&label| {
            let mut baseline = 0.0;
            let mut followup = 0.0;
            for ((index, vol), jac) in indices.iter().zip(&volumes).zip(&jacobian) {
                let w = segmentation.label_fraction(*index, label);
                baseline += vol * w;
                followup += vol * jac * w;
            }
            RoiVolume {
                label,
                baseline,
                followup,
            }
        })
        .collect();

    info!("computed volumes of {} labels over {} cells", labels.len(), n);
    Ok(results)
}
