//! Thickness and volume change between a baseline and a follow-up tetrahedral
//! mesh sharing the same connectivity.
//!
//! The thickness of a cell is taken to be its circumradius. For every cell the
//! baseline and follow-up values are stored together with the relative loss
//! `(baseline - followup) / baseline`.

use log::{info, warn};

use super::tetra::tetmesh_stats;
use crate::error::{MeshError, Result};
use crate::mesh::{DataArray, TetMesh};

/// Names of the arrays added by [`thickness_delta`], without prefix.
pub const DELTA_ARRAYS: [&str; 6] = ["r_bl", "r_fu", "r_atrophy", "v_bl", "v_fu", "v_atrophy"];

/// Compute per-cell thickness and volume change and attach them to `baseline`.
///
/// The cells of `baseline` are evaluated once on its own points and once on
/// the points of `followup`. The six arrays of [`DELTA_ARRAYS`] are added as
/// cell arrays, each prefixed with `"<prefix>_"` when a prefix is given.
///
/// Flat cells produce infinite or NaN values; they are reported with a
/// warning and kept.
///
/// # Errors
///
/// Returns [`MeshError::PointCountMismatch`] if the meshes have different
/// point counts and [`MeshError::InvalidVertexIndex`] if a cell references a
/// missing point.
pub fn thickness_delta(
    baseline: &mut TetMesh,
    followup: &TetMesh,
    prefix: Option<&str>,
) -> Result<()> {
    if baseline.num_points() != followup.num_points() {
        return Err(MeshError::PointCountMismatch {
            expected: baseline.num_points(),
            found: followup.num_points(),
        });
    }
    baseline.validate()?;

    let (v_bl, r_bl) = tetmesh_stats(&baseline.points, &baseline.cells);
    let (v_fu, r_fu) = tetmesh_stats(&followup.points, &baseline.cells);

    let r_atrophy = relative_loss(&r_bl, &r_fu);
    let v_atrophy = relative_loss(&v_bl, &v_fu);

    let non_finite = r_atrophy
        .iter()
        .chain(&v_atrophy)
        .filter(|x| !x.is_finite())
        .count();
    if non_finite > 0 {
        warn!("{} non-finite thickness values from degenerate cells", non_finite);
    }

    let name = |base: &str| match prefix {
        Some(p) => format!("{}_{}", p, base),
        None => base.to_string(),
    };

    let columns = [r_bl, r_fu, r_atrophy, v_bl, v_fu, v_atrophy];
    for (base, values) in DELTA_ARRAYS.iter().zip(columns) {
        baseline.set_cell_array(DataArray::float(name(base), 1, values))?;
    }

    info!("computed thickness delta for {} cells", baseline.num_cells());
    Ok(())
}

fn relative_loss(before: &[f64], after: &[f64]) -> Vec<f64> {
    before
        .iter()
        .zip(after)
        .map(|(&b, &a)| (b - a) / b)
        .collect()
}
