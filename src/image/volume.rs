//! Scalar 3D image.

use super::geometry::ImageGeometry;
use crate::error::{MeshError, Result};

/// A 3D scalar image with voxel values stored x-fastest.
#[derive(Debug, Clone)]
pub struct Image {
    dims: [usize; 3],
    data: Vec<f64>,
    geometry: ImageGeometry,
}

impl Image {
    /// Create an image from its size, voxel values and geometry.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidImage`] if `data` does not hold exactly
    /// one value per voxel or the image is empty.
    pub fn new(dims: [usize; 3], data: Vec<f64>, geometry: ImageGeometry) -> Result<Self> {
        let expected: usize = dims.iter().product();
        if expected == 0 {
            return Err(MeshError::InvalidImage(format!("empty image of size {:?}", dims)));
        }
        if data.len() != expected {
            return Err(MeshError::InvalidImage(format!(
                "expected {} voxels for size {:?}, found {}",
                expected,
                dims,
                data.len()
            )));
        }
        Ok(Self {
            dims,
            data,
            geometry,
        })
    }

    /// Image size along each axis.
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Voxel-to-physical mapping.
    #[inline]
    pub fn geometry(&self) -> &ImageGeometry {
        &self.geometry
    }

    /// Raw voxel values, x-fastest.
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Value of voxel `(i, j, k)`.
    #[inline]
    pub fn value(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[i + self.dims[0] * (j + self.dims[1] * k)]
    }

    /// RAS position of the center voxel.
    pub fn center_ras(&self) -> nalgebra::Point3<f64> {
        self.geometry.center_ras(self.dims)
    }

    /// Trilinear interpolation of the image values at a continuous index.
    pub fn interpolate(&self, index: [f64; 3]) -> f64 {
        self.interpolate_with(index, |v| v)
    }

    /// Fraction of label `label` around a continuous index.
    ///
    /// This is the trilinear interpolation of the binary mask
    /// `value == label`, so it is 1 deep inside the label, 0 away from it and
    /// fractional near its border.
    pub fn label_fraction(&self, index: [f64; 3], label: i64) -> f64 {
        let label = label as f64;
        self.interpolate_with(index, |v| if v == label { 1.0 } else { 0.0 })
    }

    /// Trilinear interpolation of `f(value)`.
    ///
    /// Indices outside `[-0.5, size - 0.5)` on any axis give 0. Within that
    /// range, neighbors past the last voxel are clamped to the border.
    fn interpolate_with<F: Fn(f64) -> f64>(&self, index: [f64; 3], f: F) -> f64 {
        let mut lo = [0usize; 3];
        let mut hi = [0usize; 3];
        let mut frac = [0.0; 3];
        for d in 0..3 {
            let c = index[d];
            let n = self.dims[d];
            // NaN fails both comparisons
            if !(c >= -0.5 && c < n as f64 - 0.5) {
                return 0.0;
            }
            let base = c.floor();
            frac[d] = c - base;
            let b = base as isize;
            lo[d] = b.clamp(0, n as isize - 1) as usize;
            hi[d] = (b + 1).clamp(0, n as isize - 1) as usize;
        }

        let mut result = 0.0;
        for corner in 0..8 {
            let mut w = 1.0;
            let mut ijk = [0usize; 3];
            for d in 0..3 {
                if corner & (1 << d) != 0 {
                    w *= frac[d];
                    ijk[d] = hi[d];
                } else {
                    w *= 1.0 - frac[d];
                    ijk[d] = lo[d];
                }
            }
            if w != 0.0 {
                result += w * f(self.value(ijk[0], ijk[1], ijk[2]));
            }
        }
        result
    }
}
