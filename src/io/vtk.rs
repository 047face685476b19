//! Legacy VTK format support.
//!
//! Surface meshes are read from POLYDATA files and tetrahedral meshes from
//! UNSTRUCTURED_GRID files, in ASCII or binary encoding. Files are always
//! written as ASCII legacy version 4.2 with every data array stored as field
//! data, which VTK-based tools read back by name.

use std::path::Path;

use log::debug;
use nalgebra::Point3;
use vtkio::model::{
    Attribute, Attributes, ByteOrder, CellType, Cells, DataSet, ElementType, FieldArray,
    IOBuffer, Piece, PolyDataPiece, UnstructuredGridPiece, Version, VertexNumbers, Vtk,
};

use crate::error::{MeshError, Result};
use crate::mesh::{build_with_origins, ArrayValues, DataArray, TetMesh, TriMesh};

const TITLE: &str = "Written by atrophy";

/// Load a surface mesh from a POLYDATA file.
///
/// Polygons are fan-triangulated and strips unrolled; vertices and lines are
/// ignored. Every triangle inherits the cell data of the polygon or strip it
/// came from.
pub fn load_polydata<P: AsRef<Path>>(path: P) -> Result<TriMesh> {
    let path = path.as_ref();
    let piece = match import(path)?.data {
        DataSet::PolyData { pieces, .. } => inline_piece(path, pieces)?,
        other => {
            return Err(MeshError::load(
                path,
                format!("expected POLYDATA, found {}", kind(&other)),
            ))
        }
    };

    let points = read_points(path, &piece.points)?;
    let polys = match piece.polys {
        Some(v) => vertex_lists(path, v)?,
        None => Vec::new(),
    };
    let strips = match piece.strips {
        Some(v) => vertex_lists(path, v)?,
        None => Vec::new(),
    };
    // Cell data is ordered verts, lines, polys, strips
    let skipped = piece.verts.as_ref().map_or(0, cell_count)
        + piece.lines.as_ref().map_or(0, cell_count);
    let total = skipped + polys.len() + strips.len();

    let (mut mesh, origins) = build_with_origins(&points, &polys, &strips)?;
    let sources: Vec<usize> = origins.iter().map(|&c| c + skipped).collect();

    for array in read_attributes(piece.data.cell) {
        if array.num_tuples() == total {
            mesh.set_cell_array(array.select_tuples(&sources))?;
        } else {
            debug!(
                "{}: cell array {} has {} tuples for {} cells; skipped",
                path.display(),
                array.name,
                array.num_tuples(),
                total
            );
        }
    }
    Ok(mesh)
}

/// Save a surface mesh as an ASCII POLYDATA file.
///
/// # Errors
///
/// Returns [`MeshError::SaveError`] if an index or integer value does not
/// fit the 32-bit types of the legacy format.
pub fn save_polydata<P: AsRef<Path>>(mesh: &TriMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let piece = PolyDataPiece {
        points: write_points(&mesh.vertices),
        verts: None,
        lines: None,
        polys: Some(legacy_cells(path, &mesh.faces)?),
        strips: None,
        data: Attributes {
            point: Vec::new(),
            cell: write_attributes(path, &mesh.cell_data)?,
        },
    };

    export(
        path,
        DataSet::PolyData {
            meta: None,
            pieces: vec![Piece::Inline(Box::new(piece))],
        },
    )
}

/// Load a tetrahedral mesh from an UNSTRUCTURED_GRID file.
///
/// # Errors
///
/// Returns [`MeshError::UnsupportedCell`] for any cell that is not a
/// four-point tetrahedron.
pub fn load_tetmesh<P: AsRef<Path>>(path: P) -> Result<TetMesh> {
    let path = path.as_ref();
    let piece = match import(path)?.data {
        DataSet::UnstructuredGrid { pieces, .. } => inline_piece(path, pieces)?,
        other => {
            return Err(MeshError::load(
                path,
                format!("expected UNSTRUCTURED_GRID, found {}", kind(&other)),
            ))
        }
    };

    let points = read_points(path, &piece.points)?;
    let lists = vertex_lists(path, piece.cells.cell_verts)?;
    if lists.len() != piece.cells.types.len() {
        return Err(MeshError::CellCountMismatch {
            expected: lists.len(),
            found: piece.cells.types.len(),
        });
    }

    let mut cells = Vec::with_capacity(lists.len());
    for (ci, (verts, ty)) in lists.iter().zip(&piece.cells.types).enumerate() {
        match (ty, verts.as_slice()) {
            (CellType::Tetra, &[a, b, c, d]) => cells.push([a, b, c, d]),
            _ => {
                return Err(MeshError::UnsupportedCell {
                    cell: ci,
                    kind: format!("{:?} with {} points", ty, verts.len()),
                })
            }
        }
    }

    let mut mesh = TetMesh::new(points, cells);
    mesh.validate()?;
    mesh.point_data = read_attributes(piece.data.point);
    mesh.cell_data = read_attributes(piece.data.cell);
    debug!(
        "{}: {} points, {} tetrahedra, {} cell arrays",
        path.display(),
        mesh.num_points(),
        mesh.num_cells(),
        mesh.cell_data.len()
    );
    Ok(mesh)
}

/// Save a tetrahedral mesh as an ASCII UNSTRUCTURED_GRID file.
///
/// # Errors
///
/// Same conditions as [`save_polydata`].
pub fn save_tetmesh<P: AsRef<Path>>(mesh: &TetMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let piece = UnstructuredGridPiece {
        points: write_points(&mesh.points),
        cells: Cells {
            cell_verts: legacy_cells(path, &mesh.cells)?,
            types: vec![CellType::Tetra; mesh.num_cells()],
        },
        data: Attributes {
            point: write_attributes(path, &mesh.point_data)?,
            cell: write_attributes(path, &mesh.cell_data)?,
        },
    };

    export(
        path,
        DataSet::UnstructuredGrid {
            meta: None,
            pieces: vec![Piece::Inline(Box::new(piece))],
        },
    )
}

fn import(path: &Path) -> Result<Vtk> {
    if !path.exists() {
        return Err(MeshError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )));
    }
    Vtk::import(path).map_err(|e| MeshError::load(path, format!("{:?}", e)))
}

fn export(path: &Path, data: DataSet) -> Result<()> {
    let vtk = Vtk {
        version: Version { major: 4, minor: 2 },
        title: TITLE.to_string(),
        byte_order: ByteOrder::BigEndian,
        file_path: None,
        data,
    };
    vtk.export_ascii(path)
        .map_err(|e| MeshError::save(path, format!("{:?}", e)))
}

fn kind(data: &DataSet) -> &'static str {
    match data {
        DataSet::PolyData { .. } => "POLYDATA",
        DataSet::UnstructuredGrid { .. } => "UNSTRUCTURED_GRID",
        DataSet::ImageData { .. } => "STRUCTURED_POINTS",
        DataSet::StructuredGrid { .. } => "STRUCTURED_GRID",
        DataSet::RectilinearGrid { .. } => "RECTILINEAR_GRID",
        _ => "FIELD",
    }
}

fn inline_piece<T>(path: &Path, pieces: Vec<Piece<T>>) -> Result<T> {
    match pieces.into_iter().next() {
        Some(Piece::Inline(piece)) => Ok(*piece),
        Some(_) => Err(MeshError::load(path, "only inline data pieces are supported")),
        None => Err(MeshError::load(path, "file contains no data")),
    }
}

fn read_points(path: &Path, buffer: &IOBuffer) -> Result<Vec<Point3<f64>>> {
    let coords = buffer_to_f64(buffer)
        .ok_or_else(|| MeshError::load(path, "point coordinates are not numeric"))?;
    if coords.len() % 3 != 0 {
        return Err(MeshError::load(path, "point coordinate count is not a multiple of 3"));
    }
    Ok(coords
        .chunks_exact(3)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect())
}

fn write_points(points: &[Point3<f64>]) -> IOBuffer {
    IOBuffer::F64(points.iter().flat_map(|p| [p.x, p.y, p.z]).collect())
}

/// Legacy connectivity for fixed-size cells.
fn legacy_cells<const N: usize>(path: &Path, cells: &[[usize; N]]) -> Result<VertexNumbers> {
    let too_large = |what: &str, n: usize| {
        MeshError::save(path, format!("{} {} exceeds the 32-bit legacy limit", what, n))
    };
    let num_cells = u32::try_from(cells.len()).map_err(|_| too_large("cell count", cells.len()))?;
    let mut vertices = Vec::with_capacity(cells.len() * (N + 1));
    for cell in cells {
        vertices.push(N as u32);
        for &v in cell {
            vertices.push(u32::try_from(v).map_err(|_| too_large("point index", v))?);
        }
    }
    Ok(VertexNumbers::Legacy {
        num_cells,
        vertices,
    })
}

fn cell_count(numbers: &VertexNumbers) -> usize {
    match numbers {
        VertexNumbers::Legacy { num_cells, .. } => *num_cells as usize,
        VertexNumbers::XML { offsets, .. } => offsets.len(),
    }
}

/// Split cell connectivity into one vertex list per cell.
fn vertex_lists(path: &Path, numbers: VertexNumbers) -> Result<Vec<Vec<usize>>> {
    let truncated = || MeshError::load(path, "cell connectivity is truncated");
    match numbers {
        VertexNumbers::Legacy {
            num_cells,
            vertices,
        } => {
            let mut lists = Vec::with_capacity(num_cells as usize);
            let mut i = 0;
            for _ in 0..num_cells {
                let n = *vertices.get(i).ok_or_else(truncated)? as usize;
                let cell = vertices.get(i + 1..i + 1 + n).ok_or_else(truncated)?;
                lists.push(cell.iter().map(|&v| v as usize).collect());
                i += 1 + n;
            }
            Ok(lists)
        }
        VertexNumbers::XML {
            connectivity,
            offsets,
        } => {
            let mut lists = Vec::with_capacity(offsets.len());
            let mut start = 0;
            for &end in &offsets {
                let end = end as usize;
                let cell = connectivity.get(start..end).ok_or_else(truncated)?;
                lists.push(cell.iter().map(|&v| v as usize).collect());
                start = end;
            }
            Ok(lists)
        }
    }
}

macro_rules! convert_buffer {
    ($buffer:expr, $ty:ty, $($variant:ident),+) => {
        match $buffer {
            $(IOBuffer::$variant(v) => Some(v.iter().map(|&x| x as $ty).collect()),)+
            _ => None,
        }
    };
}

fn buffer_to_f64(buffer: &IOBuffer) -> Option<Vec<f64>> {
    convert_buffer!(buffer, f64, U8, I8, U16, I16, U32, I32, U64, I64, F32, F64)
}

fn buffer_to_values(buffer: &IOBuffer) -> Option<ArrayValues> {
    match buffer {
        IOBuffer::F32(_) | IOBuffer::F64(_) => buffer_to_f64(buffer).map(ArrayValues::Float),
        _ => convert_buffer!(buffer, i64, U8, I8, U16, I16, U32, I32, U64, I64).map(ArrayValues::Int),
    }
}

fn components(elem: &ElementType) -> usize {
    match elem {
        ElementType::Scalars { num_comp, .. } => *num_comp as usize,
        ElementType::ColorScalars(n) | ElementType::TCoords(n) | ElementType::Generic(n) => {
            *n as usize
        }
        ElementType::Vectors | ElementType::Normals => 3,
        ElementType::Tensors => 9,
        _ => 1,
    }
}

/// Flatten VTK attributes into named arrays; non-numeric arrays are skipped.
fn read_attributes(attributes: Vec<Attribute>) -> Vec<DataArray> {
    let mut arrays = Vec::new();
    for attribute in attributes {
        match attribute {
            Attribute::DataArray(a) => {
                if let Some(values) = buffer_to_values(&a.data) {
                    arrays.push(DataArray {
                        name: a.name,
                        num_comp: components(&a.elem),
                        values,
                    });
                }
            }
            Attribute::Field { data_array, .. } => {
                for a in data_array {
                    if let Some(values) = buffer_to_values(&a.data) {
                        arrays.push(DataArray {
                            name: a.name,
                            num_comp: a.elem as usize,
                            values,
                        });
                    }
                }
            }
        }
    }
    arrays
}

fn write_attributes(path: &Path, arrays: &[DataArray]) -> Result<Vec<Attribute>> {
    if arrays.is_empty() {
        return Ok(Vec::new());
    }
    let mut data_array = Vec::with_capacity(arrays.len());
    for a in arrays {
        let data = match &a.values {
            ArrayValues::Float(v) => IOBuffer::F64(v.clone()),
            ArrayValues::Int(v) => IOBuffer::I32(
                v.iter()
                    .map(|&x| {
                        i32::try_from(x).map_err(|_| {
                            MeshError::save(
                                path,
                                format!("array {} value {} does not fit in int", a.name, x),
                            )
                        })
                    })
                    .collect::<Result<Vec<i32>>>()?,
            ),
        };
        data_array.push(FieldArray {
            name: a.name.clone(),
            elem: a.num_comp as u32,
            data,
        });
    }
    Ok(vec![Attribute::Field {
        name: "FieldData".to_string(),
        data_array,
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_tets() -> TetMesh {
        let mut mesh = TetMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(1.0, 1.0, 1.0),
            ],
            vec![[0, 1, 2, 3], [4, 1, 2, 3]],
        );
        mesh.set_cell_array(DataArray::float("jacobian", 1, vec![0.9, 1.1]))
            .unwrap();
        mesh.set_cell_array(DataArray::float(
            "VoronoiCenter",
            3,
            vec![0.25, 0.25, 0.25, 0.5, 0.5, 0.5],
        ))
        .unwrap();
        mesh
    }

    #[test]
    fn test_tetmesh_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tets.vtk");
        let mesh = two_tets();
        save_tetmesh(&mesh, &path).unwrap();

        let loaded = load_tetmesh(&path).unwrap();
        assert_eq!(loaded.cells, mesh.cells);
        for (a, b) in loaded.points.iter().zip(&mesh.points) {
            assert_relative_eq!(a, b);
        }
        let centers = loaded.cell_array("VoronoiCenter").unwrap();
        assert_eq!(centers.num_comp, 3);
        assert_eq!(centers.to_vec3().unwrap()[1], [0.5, 0.5, 0.5]);
        assert_eq!(loaded.cell_array("jacobian").unwrap().to_f64(), vec![0.9, 1.1]);
    }

    #[test]
    fn test_polydata_round_trip_with_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surface.vtk");
        let mut mesh = TriMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.5),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        );
        mesh.set_cell_array(DataArray::int("MetisPart", 1, vec![1, 0]))
            .unwrap();
        save_polydata(&mesh, &path).unwrap();

        let loaded = load_polydata(&path).unwrap();
        assert_eq!(loaded.faces, mesh.faces);
        assert_eq!(loaded.vertices, mesh.vertices);
        assert_eq!(
            loaded.cell_array("MetisPart").unwrap().values,
            ArrayValues::Int(vec![1, 0])
        );
    }

    #[test]
    fn test_polydata_cleaning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("soup.vtk");
        // A quad plus a duplicated corner point and an unused point
        std::fs::write(
            &path,
            "# vtk DataFile Version 4.2\nsoup\nASCII\nDATASET POLYDATA\n\
             POINTS 6 float\n0 0 0 1 0 0 1 1 0 0 1 0 1 1 0 9 9 9\n\
             POLYGONS 1 5\n4 0 1 4 3\n",
        )
        .unwrap();
        let mesh = load_polydata(&path).unwrap();
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_vertices(), 4);
    }

    #[test]
    fn test_cell_data_follows_source_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("split.vtk");
        // A quad (region 7) and a degenerate triangle (region 9)
        std::fs::write(
            &path,
            "# vtk DataFile Version 4.2\nsplit\nASCII\nDATASET POLYDATA\n\
             POINTS 4 float\n0 0 0 1 0 0 1 1 0 0 1 0\n\
             POLYGONS 2 9\n4 0 1 2 3\n3 0 0 1\n\
             CELL_DATA 2\nSCALARS region int 1\nLOOKUP_TABLE default\n7 9\n",
        )
        .unwrap();
        let mesh = load_polydata(&path).unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(
            mesh.cell_array("region").unwrap().values,
            ArrayValues::Int(vec![7, 7])
        );
    }

    #[test]
    fn test_cell_data_offset_by_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.vtk");
        std::fs::write(
            &path,
            "# vtk DataFile Version 4.2\nlines\nASCII\nDATASET POLYDATA\n\
             POINTS 4 float\n0 0 0 1 0 0 1 1 0 0 1 0\n\
             LINES 1 3\n2 0 1\n\
             POLYGONS 1 4\n3 0 1 2\n\
             CELL_DATA 2\nSCALARS region int 1\nLOOKUP_TABLE default\n4 5\n",
        )
        .unwrap();
        let mesh = load_polydata(&path).unwrap();
        assert_eq!(
            mesh.cell_array("region").unwrap().values,
            ArrayValues::Int(vec![5])
        );
    }

    #[test]
    fn test_save_rejects_wide_ints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.vtk");
        let mut mesh = two_tets();
        mesh.set_cell_array(DataArray::int("id", 1, vec![1, i64::from(i32::MAX) + 1]))
            .unwrap();
        assert!(matches!(
            save_tetmesh(&mesh, &path),
            Err(MeshError::SaveError { .. })
        ));
    }

    #[test]
    fn test_tetmesh_rejects_other_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.vtk");
        std::fs::write(
            &path,
            "# vtk DataFile Version 4.2\nmixed\nASCII\nDATASET UNSTRUCTURED_GRID\n\
             POINTS 4 float\n0 0 0 1 0 0 0 1 0 0 0 1\n\
             CELLS 2 9\n4 0 1 2 3\n3 0 1 2\nCELL_TYPES 2\n10\n5\n",
        )
        .unwrap();
        assert!(matches!(
            load_tetmesh(&path),
            Err(MeshError::UnsupportedCell { cell: 1, .. })
        ));
    }

    #[test]
    fn test_wrong_dataset_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tets.vtk");
        save_tetmesh(&two_tets(), &path).unwrap();
        assert!(matches!(load_polydata(&path), Err(MeshError::LoadError { .. })));
    }
}
