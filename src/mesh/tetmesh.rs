//! Tetrahedral volume mesh.

use nalgebra::Point3;

use super::data::{find_array, upsert_array, DataArray};
use crate::error::{MeshError, Result};

/// A tetrahedral mesh with named point and cell arrays.
///
/// Arrays read from a file are kept so that writing the mesh back preserves
/// them alongside any arrays added by an analysis.
#[derive(Debug, Clone, Default)]
pub struct TetMesh {
    /// Point positions.
    pub points: Vec<Point3<f64>>,
    /// Tetrahedra as vertex index quadruples.
    pub cells: Vec<[usize; 4]>,
    /// Named per-point arrays.
    pub point_data: Vec<DataArray>,
    /// Named per-cell arrays.
    pub cell_data: Vec<DataArray>,
}

impl TetMesh {
    /// Create a mesh from points and tetrahedra.
    pub fn new(points: Vec<Point3<f64>>, cells: Vec<[usize; 4]>) -> Self {
        Self {
            points,
            cells,
            point_data: Vec::new(),
            cell_data: Vec::new(),
        }
    }

    /// Number of points.
    #[inline]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Number of tetrahedra.
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Corner positions of tetrahedron `c`.
    #[inline]
    pub fn tetra(&self, c: usize) -> [Point3<f64>; 4] {
        self.cells[c].map(|v| self.points[v])
    }

    /// Check that every cell references an existing point.
    pub fn validate(&self) -> Result<()> {
        for (ci, cell) in self.cells.iter().enumerate() {
            for &vi in cell {
                if vi >= self.points.len() {
                    return Err(MeshError::InvalidVertexIndex {
                        cell: ci,
                        vertex: vi,
                    });
                }
            }
        }
        Ok(())
    }

    /// Look up a per-cell array by name.
    pub fn cell_array(&self, name: &str) -> Result<&DataArray> {
        find_array(&self.cell_data, name).ok_or_else(|| MeshError::MissingArray {
            name: name.to_string(),
        })
    }

    /// Attach a per-cell array, replacing one with the same name.
    pub fn set_cell_array(&mut self, array: DataArray) -> Result<()> {
        if array.num_tuples() != self.cells.len() {
            return Err(MeshError::CellCountMismatch {
                expected: self.cells.len(),
                found: array.num_tuples(),
            });
        }
        upsert_array(&mut self.cell_data, array);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tet() -> TetMesh {
        TetMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            vec![[0, 1, 2, 3]],
        )
    }

    #[test]
    fn test_tetra_corners() {
        let mesh = unit_tet();
        let t = mesh.tetra(0);
        assert_eq!(t[3], Point3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_missing_array() {
        let mesh = unit_tet();
        assert!(matches!(
            mesh.cell_array("jacobian"),
            Err(MeshError::MissingArray { .. })
        ));
    }

    #[test]
    fn test_validate_out_of_range() {
        let mut mesh = unit_tet();
        mesh.cells.push([0, 1, 2, 4]);
        assert!(mesh.validate().is_err());
    }
}
