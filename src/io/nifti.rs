//! NIfTI-1 image loading.
//!
//! Only the first volume of a 4D image is read. The voxel-to-world affine is
//! taken from the sform when its code is set, otherwise from the qform, and
//! otherwise from the voxel sizes alone.

use std::path::Path;

use log::debug;
use nalgebra::{Matrix3, Matrix4, Vector3};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::error::{MeshError, Result};
use crate::image::{Image, ImageGeometry};

/// Load a NIfTI image (`.nii` or `.nii.gz`).
///
/// # Example
///
/// ```no_run
/// use atrophy::io::nifti;
///
/// let seg = nifti::load("segmentation.nii.gz").unwrap();
/// println!("size {:?}, spacing {:?}", seg.dims(), seg.geometry().spacing());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<Image> {
    let path = path.as_ref();
    let object = ReaderOptions::new()
        .read_file(path)
        .map_err(|e| MeshError::load(path, e.to_string()))?;

    let header = object.header().clone();
    let dims = image_dims(&header)?;
    let geometry = ImageGeometry::from_ras_affine(ras_affine(&header))?;

    let volume = object
        .into_volume()
        .into_ndarray::<f64>()
        .map_err(|e| MeshError::load(path, e.to_string()))?;

    // The array is indexed [x, y, z, ...]; its transpose iterates x fastest
    let n: usize = dims.iter().product();
    let data: Vec<f64> = volume.t().iter().copied().take(n).collect();

    debug!(
        "{}: size {:?}, spacing {:?}",
        path.display(),
        dims,
        geometry.spacing()
    );
    Image::new(dims, data, geometry)
}

/// Spatial size of the image; missing trailing axes count as 1.
pub fn image_dims(header: &NiftiHeader) -> Result<[usize; 3]> {
    let ndim = header.dim[0] as usize;
    if ndim == 0 || ndim > 7 {
        return Err(MeshError::InvalidImage(format!(
            "invalid dimension count {}",
            header.dim[0]
        )));
    }
    let mut dims = [1usize; 3];
    for (d, size) in dims.iter_mut().enumerate().take(ndim) {
        *size = header.dim[d + 1].max(1) as usize;
    }
    Ok(dims)
}

/// Voxel-to-RAS affine stored in the header.
pub fn ras_affine(header: &NiftiHeader) -> Matrix4<f64> {
    if header.sform_code > 0 {
        let rows = [header.srow_x, header.srow_y, header.srow_z];
        let mut m = Matrix4::identity();
        for (r, row) in rows.iter().enumerate() {
            for c in 0..4 {
                m[(r, c)] = row[c] as f64;
            }
        }
        m
    } else if header.qform_code > 0 {
        qform_affine(header)
    } else {
        let mut m = Matrix4::identity();
        for d in 0..3 {
            m[(d, d)] = positive(header.pixdim[d + 1]);
        }
        m
    }
}

fn positive(x: f32) -> f64 {
    if x > 0.0 {
        x as f64
    } else {
        1.0
    }
}

/// Affine from the quaternion representation.
fn qform_affine(header: &NiftiHeader) -> Matrix4<f64> {
    let b = header.quatern_b as f64;
    let c = header.quatern_c as f64;
    let d = header.quatern_d as f64;
    let a = (1.0 - (b * b + c * c + d * d)).max(0.0).sqrt();

    let rotation = Matrix3::new(
        a * a + b * b - c * c - d * d,
        2.0 * (b * c - a * d),
        2.0 * (b * d + a * c),
        2.0 * (b * c + a * d),
        a * a + c * c - b * b - d * d,
        2.0 * (c * d - a * b),
        2.0 * (b * d - a * c),
        2.0 * (c * d + a * b),
        a * a + d * d - c * c - b * b,
    );

    let qfac = if header.pixdim[0] < 0.0 { -1.0 } else { 1.0 };
    let scale = Vector3::new(
        positive(header.pixdim[1]),
        positive(header.pixdim[2]),
        qfac * positive(header.pixdim[3]),
    );
    let linear = rotation * Matrix3::from_diagonal(&scale);

    let mut m = Matrix4::identity();
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(&linear);
    m[(0, 3)] = header.quatern_x as f64;
    m[(1, 3)] = header.quatern_y as f64;
    m[(2, 3)] = header.quatern_z as f64;
    m
}
