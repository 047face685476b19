//! Voxel-to-physical mapping of a 3D image.

use nalgebra::{Matrix3, Matrix4, Point3};

use crate::error::{MeshError, Result};

/// Affine map from voxel indices to physical LPS coordinates.
///
/// LPS (x grows to the patient's left, y to posterior, z to superior) is the
/// convention of ITK-style image tools. NIfTI headers and the meshes handled
/// by this crate use RAS, which differs by the sign of the first two axes.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGeometry {
    voxel_to_lps: Matrix4<f64>,
    lps_to_voxel: Matrix4<f64>,
}

/// Flip between RAS and LPS; the map is its own inverse.
#[inline]
pub fn ras_to_lps(p: &Point3<f64>) -> Point3<f64> {
    Point3::new(-p.x, -p.y, p.z)
}

impl ImageGeometry {
    /// Create a geometry from a voxel-to-LPS affine.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidImage`] if the affine is not invertible.
    pub fn from_lps_affine(voxel_to_lps: Matrix4<f64>) -> Result<Self> {
        let lps_to_voxel = voxel_to_lps
            .try_inverse()
            .ok_or_else(|| MeshError::InvalidImage("voxel-to-world affine is singular".into()))?;
        Ok(Self {
            voxel_to_lps,
            lps_to_voxel,
        })
    }

    /// Create a geometry from a voxel-to-RAS affine, as stored in NIfTI.
    pub fn from_ras_affine(voxel_to_ras: Matrix4<f64>) -> Result<Self> {
        let flip = Matrix4::from_diagonal(&nalgebra::Vector4::new(-1.0, -1.0, 1.0, 1.0));
        Self::from_lps_affine(flip * voxel_to_ras)
    }

    /// Axis-aligned geometry with the given spacing and LPS origin.
    pub fn axis_aligned(spacing: [f64; 3], origin: [f64; 3]) -> Result<Self> {
        let mut m = Matrix4::identity();
        for d in 0..3 {
            m[(d, d)] = spacing[d];
            m[(d, 3)] = origin[d];
        }
        Self::from_lps_affine(m)
    }

    /// The voxel-to-LPS affine.
    pub fn voxel_to_lps(&self) -> &Matrix4<f64> {
        &self.voxel_to_lps
    }

    fn linear(&self) -> Matrix3<f64> {
        self.voxel_to_lps.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// Voxel spacing along each index axis.
    pub fn spacing(&self) -> [f64; 3] {
        let m = self.linear();
        [m.column(0).norm(), m.column(1).norm(), m.column(2).norm()]
    }

    /// LPS position of the voxel origin (index 0, 0, 0).
    pub fn origin(&self) -> Point3<f64> {
        Point3::new(
            self.voxel_to_lps[(0, 3)],
            self.voxel_to_lps[(1, 3)],
            self.voxel_to_lps[(2, 3)],
        )
    }

    /// Physical LPS position of a (possibly fractional) index.
    pub fn index_to_physical(&self, index: [f64; 3]) -> Point3<f64> {
        self.voxel_to_lps
            .transform_point(&Point3::new(index[0], index[1], index[2]))
    }

    /// Continuous index of a physical LPS position.
    pub fn physical_to_continuous_index(&self, p: &Point3<f64>) -> [f64; 3] {
        let idx = self.lps_to_voxel.transform_point(p);
        [idx.x, idx.y, idx.z]
    }

    /// RAS position of the center voxel `dims / 2` (integer division).
    pub fn center_ras(&self, dims: [usize; 3]) -> Point3<f64> {
        let index = dims.map(|n| (n / 2) as f64);
        ras_to_lps(&self.index_to_physical(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_axis_aligned_round_trip() {
        let g = ImageGeometry::axis_aligned([0.5, 0.5, 2.0], [10.0, -4.0, 1.0]).unwrap();
        let p = g.index_to_physical([2.0, 4.0, 1.5]);
        assert_relative_eq!(p, Point3::new(11.0, -2.0, 4.0), epsilon = 1e-12);
        let idx = g.physical_to_continuous_index(&p);
        assert_relative_eq!(idx[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(idx[1], 4.0, epsilon = 1e-12);
        assert_relative_eq!(idx[2], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_ras_affine_flips_first_two_axes() {
        let mut ras = Matrix4::identity();
        ras[(0, 3)] = 5.0;
        ras[(1, 3)] = 6.0;
        ras[(2, 3)] = 7.0;
        let g = ImageGeometry::from_ras_affine(ras).unwrap();
        assert_relative_eq!(g.origin(), Point3::new(-5.0, -6.0, 7.0));
        assert_eq!(g.spacing(), [1.0, 1.0, 1.0]);
        // RAS center of voxel (2, 2, 2) is (7, 8, 9)
        assert_relative_eq!(g.center_ras([4, 5, 4]), Point3::new(7.0, 8.0, 9.0));
    }

    #[test]
    fn test_spacing_of_rotated_axes() {
        let mut m = Matrix4::identity();
        // 90 degree rotation about z, spacing (2, 3, 4)
        m[(0, 0)] = 0.0;
        m[(1, 0)] = 2.0;
        m[(0, 1)] = -3.0;
        m[(1, 1)] = 0.0;
        m[(2, 2)] = 4.0;
        let g = ImageGeometry::from_lps_affine(m).unwrap();
        assert_eq!(g.spacing(), [2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_singular_affine() {
        let mut m = Matrix4::identity();
        m[(2, 2)] = 0.0;
        assert!(matches!(
            ImageGeometry::from_lps_affine(m),
            Err(MeshError::InvalidImage(_))
        ));
    }
}
