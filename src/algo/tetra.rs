//! Tetrahedron measures.
//!
//! Volume and circumradius are computed from corner positions only. A
//! degenerate (flat) tetrahedron has zero volume, so its circumradius comes
//! out as an IEEE infinity or NaN rather than an error.

use nalgebra::Point3;

/// Unsigned volume of the tetrahedron `t`.
///
/// `|(t0 - t3) . ((t1 - t3) x (t2 - t3))| / 6`
#[inline]
pub fn tetra_volume(t: &[Point3<f64>; 4]) -> f64 {
    let a = t[0] - t[3];
    let b = t[1] - t[3];
    let c = t[2] - t[3];
    a.dot(&b.cross(&c)).abs() / 6.0
}

/// Radius of the sphere through the four corners of `t`.
///
/// Uses the products of opposite edge lengths:
/// `R = sqrt((aA+bB+cC)(-aA+bB+cC)(aA-bB+cC)(aA+bB-cC)) / (24 V)`.
pub fn tetra_circumradius(t: &[Point3<f64>; 4]) -> f64 {
    let a = (t[1] - t[0]).norm();
    let b = (t[2] - t[0]).norm();
    let c = (t[3] - t[0]).norm();
    let big_a = (t[3] - t[2]).norm();
    let big_b = (t[3] - t[1]).norm();
    let big_c = (t[2] - t[1]).norm();

    let aa = a * big_a;
    let bb = b * big_b;
    let cc = c * big_c;
    let product = (aa + bb + cc) * (-aa + bb + cc) * (aa - bb + cc) * (aa + bb - cc);

    product.sqrt() / (24.0 * tetra_volume(t))
}

/// Volume and circumradius of every cell.
///
/// Returns `(volumes, radii)` in cell order.
pub fn tetmesh_stats(points: &[Point3<f64>], cells: &[[usize; 4]]) -> (Vec<f64>, Vec<f64>) {
    cells
        .iter()
        .map(|cell| {
            let t = cell.map(|v| points[v]);
            (tetra_volume(&t), tetra_circumradius(&t))
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn regular(edge: f64) -> [Point3<f64>; 4] {
        // Alternate corners of a cube with side edge / sqrt(2)
        let s = edge / 2.0_f64.sqrt();
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(s, s, 0.0),
            Point3::new(s, 0.0, s),
            Point3::new(0.0, s, s),
        ]
    }

    #[test]
    fn test_unit_corner_volume() {
        let t = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        assert_relative_eq!(tetra_volume(&t), 1.0 / 6.0, epsilon = 1e-12);
        // Circumcenter is (0.5, 0.5, 0.5)
        assert_relative_eq!(tetra_circumradius(&t), 0.75_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_regular_tetrahedron() {
        let edge = 2.0;
        let t = regular(edge);
        assert_relative_eq!(
            tetra_volume(&t),
            edge.powi(3) / (6.0 * 2.0_f64.sqrt()),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            tetra_circumradius(&t),
            edge * (6.0_f64).sqrt() / 4.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_orientation_does_not_matter() {
        let t = regular(1.0);
        let flipped = [t[1], t[0], t[2], t[3]];
        assert_relative_eq!(tetra_volume(&t), tetra_volume(&flipped));
        assert_relative_eq!(tetra_circumradius(&t), tetra_circumradius(&flipped), epsilon = 1e-12);
    }

    #[test]
    fn test_flat_tetrahedron() {
        let t = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        assert_eq!(tetra_volume(&t), 0.0);
        assert!(!tetra_circumradius(&t).is_finite());
    }

    #[test]
    fn test_stats() {
        let points = regular(1.0).to_vec();
        let (vols, radii) = tetmesh_stats(&points, &[[0, 1, 2, 3], [3, 2, 1, 0]]);
        assert_eq!(vols.len(), 2);
        assert_relative_eq!(vols[0], vols[1]);
        assert_relative_eq!(radii[0], radii[1], epsilon = 1e-12);
    }
}
