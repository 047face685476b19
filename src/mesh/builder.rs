//! Mesh construction utilities.
//!
//! Surface meshes arrive from files as polygon soups: arbitrary polygons and
//! triangle strips over a point array that may contain duplicate points. This
//! module turns such input into a clean [`TriMesh`].

use std::collections::HashMap;

use log::debug;
use nalgebra::Point3;

use super::trimesh::TriMesh;
use crate::error::{MeshError, Result};

/// Build a clean triangle mesh from polygons and triangle strips.
///
/// The input is processed in this order:
/// 1. points with bit-identical coordinates are merged,
/// 2. polygons are fan-triangulated and strips unrolled into triangles,
/// 3. triangles that reference the same vertex twice are dropped,
/// 4. points no triangle references are removed (original order is kept).
///
/// # Arguments
/// * `points` - Point positions
/// * `polys` - Polygons as vertex index lists (fewer than 3 indices are ignored)
/// * `strips` - Triangle strips as vertex index lists
///
/// # Example
/// ```
/// use atrophy::mesh::build_from_polygons;
/// use nalgebra::Point3;
///
/// let points = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let quad = vec![vec![0, 1, 2, 3]];
///
/// let mesh = build_from_polygons(&points, &quad, &[]).unwrap();
/// assert_eq!(mesh.num_faces(), 2);
/// ```
pub fn build_from_polygons(
    points: &[Point3<f64>],
    polys: &[Vec<usize>],
    strips: &[Vec<usize>],
) -> Result<TriMesh> {
    build_with_origins(points, polys, strips).map(|(mesh, _)| mesh)
}

/// Like [`build_from_polygons`], also returning the input cell of every
/// output triangle.
///
/// Input cells are numbered polygons first, then strips. Cell data can be
/// carried onto the triangles with [`DataArray::select_tuples`].
///
/// [`DataArray::select_tuples`]: super::DataArray::select_tuples
///
/// # Example
/// ```
/// use atrophy::mesh::build_with_origins;
/// use nalgebra::Point3;
///
/// let points = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// // A quad and a triangle with a repeated corner
/// let polys = vec![vec![0, 1, 2, 3], vec![0, 0, 1]];
///
/// let (mesh, origins) = build_with_origins(&points, &polys, &[]).unwrap();
/// assert_eq!(mesh.num_faces(), 2);
/// assert_eq!(origins, vec![0, 0]);
/// ```
pub fn build_with_origins(
    points: &[Point3<f64>],
    polys: &[Vec<usize>],
    strips: &[Vec<usize>],
) -> Result<(TriMesh, Vec<usize>)> {
    // Validate vertex indices
    for (ci, cell) in polys.iter().chain(strips.iter()).enumerate() {
        if let Some(&vi) = cell.iter().find(|&&vi| vi >= points.len()) {
            return Err(MeshError::InvalidVertexIndex {
                cell: ci,
                vertex: vi,
            });
        }
    }

    let merged = merge_coincident(points);

    // (triangle, source cell)
    let mut triangles: Vec<([usize; 3], usize)> = Vec::with_capacity(polys.len());
    for (ci, poly) in polys.iter().enumerate().filter(|(_, p)| p.len() >= 3) {
        for i in 1..poly.len() - 1 {
            triangles.push(([poly[0], poly[i], poly[i + 1]], ci));
        }
    }
    for (si, strip) in strips.iter().enumerate().filter(|(_, s)| s.len() >= 3) {
        let ci = polys.len() + si;
        for i in 0..strip.len() - 2 {
            // Every other triangle in a strip has reversed winding
            if i % 2 == 0 {
                triangles.push(([strip[i], strip[i + 1], strip[i + 2]], ci));
            } else {
                triangles.push(([strip[i + 1], strip[i], strip[i + 2]], ci));
            }
        }
    }

    let before = triangles.len();
    let (triangles, origins): (Vec<[usize; 3]>, Vec<usize>) = triangles
        .into_iter()
        .map(|(t, ci)| (t.map(|v| merged[v]), ci))
        .filter(|(t, _)| t[0] != t[1] && t[1] != t[2] && t[0] != t[2])
        .unzip();

    if triangles.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    // Compact the point array
    let mut used = vec![false; points.len()];
    for t in &triangles {
        for &v in t {
            used[v] = true;
        }
    }
    let mut remap = vec![usize::MAX; points.len()];
    let mut vertices = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        if used[i] {
            remap[i] = vertices.len();
            vertices.push(*p);
        }
    }
    let faces: Vec<[usize; 3]> = triangles.iter().map(|t| t.map(|v| remap[v])).collect();

    debug!(
        "cleaned mesh: {} -> {} points, {} -> {} triangles",
        points.len(),
        vertices.len(),
        before,
        faces.len()
    );

    Ok((TriMesh::new(vertices, faces), origins))
}

/// Map every point to the first point with identical coordinates.
fn merge_coincident(points: &[Point3<f64>]) -> Vec<usize> {
    let mut first: HashMap<[u64; 3], usize> = HashMap::with_capacity(points.len());
    points
        .iter()
        .enumerate()
        .map(|(i, p)| *first.entry(coord_key(p)).or_insert(i))
        .collect()
}

/// Bit pattern key for exact coordinate comparison; `-0.0` and `0.0` coincide.
fn coord_key(p: &Point3<f64>) -> [u64; 3] {
    [p.x, p.y, p.z].map(|c| if c == 0.0 { 0u64 } else { c.to_bits() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_single_triangle() {
        let mesh = build_from_polygons(&unit_square(), &[vec![0, 1, 2]], &[]).unwrap();
        assert_eq!(mesh.num_faces(), 1);
        // Point 3 is unused and removed
        assert_eq!(mesh.num_vertices(), 3);
    }

    #[test]
    fn test_fan_triangulation() {
        let mesh = build_from_polygons(&unit_square(), &[vec![0, 1, 2, 3]], &[]).unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_strip() {
        let mesh = build_from_polygons(&unit_square(), &[], &[vec![0, 1, 3, 2]]).unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 3], [3, 1, 2]]);
    }

    #[test]
    fn test_merge_duplicate_points() {
        let mut points = unit_square();
        points.push(Point3::new(1.0, 0.0, 0.0)); // duplicate of 1
        let polys = vec![vec![0, 1, 2], vec![4, 3, 2]];
        let mesh = build_from_polygons(&points, &polys, &[]).unwrap();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.faces[1], [1, 3, 2]);
    }

    #[test]
    fn test_degenerate_after_merge_dropped() {
        let mut points = unit_square();
        points.push(Point3::new(0.0, 0.0, -0.0)); // same as 0
        let polys = vec![vec![0, 1, 2], vec![0, 4, 3]];
        let mesh = build_from_polygons(&points, &polys, &[]).unwrap();
        assert_eq!(mesh.num_faces(), 1);
    }

    #[test]
    fn test_origins_follow_split_and_dropped_cells() {
        // Quad split in two, degenerate triangle dropped, strip of two
        let polys = vec![vec![0, 1, 2, 3], vec![0, 0, 1]];
        let strips = vec![vec![0, 1, 3, 2]];
        let (mesh, origins) = build_with_origins(&unit_square(), &polys, &strips).unwrap();
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(origins, vec![0, 0, 2, 2]);
    }

    #[test]
    fn test_invalid_vertex_index() {
        let result = build_from_polygons(&unit_square(), &[vec![0, 1, 7]], &[]);
        assert!(matches!(
            result,
            Err(MeshError::InvalidVertexIndex { cell: 0, vertex: 7 })
        ));
    }

    #[test]
    fn test_empty() {
        let result = build_from_polygons(&unit_square(), &[vec![0, 1]], &[]);
        assert!(matches!(result, Err(MeshError::EmptyMesh)));
    }
}
