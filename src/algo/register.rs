//! Coarse center-of-image registration.
//!
//! Aligns a moving image to a fixed image by translating the moving image's
//! center onto the fixed image's center. The translation is truncated to a
//! whole number of fixed-image voxels on each axis, which keeps a subsequent
//! resampling free of interpolation.

use std::fmt;

use log::debug;
use nalgebra::{Matrix4, Vector3};

use crate::image::Image;

/// A 4x4 homogeneous RAS transform.
#[derive(Debug, Clone, PartialEq)]
pub struct CenterTransform {
    /// The transform matrix; only the translation column differs from identity.
    pub matrix: Matrix4<f64>,
}

impl CenterTransform {
    /// The translation part.
    pub fn translation(&self) -> Vector3<f64> {
        Vector3::new(
            self.matrix[(0, 3)],
            self.matrix[(1, 3)],
            self.matrix[(2, 3)],
        )
    }
}

/// Transform taking the center of `fixed` to the center of `moving`, snapped
/// to whole fixed voxels.
///
/// The offset `center(moving) - center(fixed)` is measured in RAS; on each
/// axis its remainder modulo the fixed spacing (truncated toward zero) is
/// dropped.
pub fn center_transform(fixed: &Image, moving: &Image) -> CenterTransform {
    let offset = moving.center_ras() - fixed.center_ras();
    let spacing = fixed.geometry().spacing();
    let snapped = Vector3::from_fn(|d, _| offset[d] - offset[d] % spacing[d]);
    debug!("center offset {:?}, snapped {:?}", offset, snapped);

    let mut matrix = Matrix4::identity();
    for d in 0..3 {
        matrix[(d, 3)] = snapped[d];
    }
    CenterTransform { matrix }
}

impl fmt::Display for CenterTransform {
    /// Four rows of six-decimal values separated by single spaces.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..4 {
            let row: Vec<String> = (0..4)
                .map(|c| format!("{:.6}", self.matrix[(r, c)]))
                .collect();
            writeln!(f, "{}", row.join(" "))?;
        }
        Ok(())
    }
}
