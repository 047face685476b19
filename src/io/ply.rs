//! PLY (Stanford polygon) format support.
//!
//! Faces are read as polygons and triangulated by the mesh builder. Scalar
//! face properties other than the vertex index list are kept as cell arrays,
//! and 1-component cell arrays are written back as face properties, so a
//! partition label survives a PLY round trip.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;
use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{MeshError, Result};
use crate::mesh::{build_with_origins, ArrayValues, DataArray, TriMesh};

const INDEX_PROPERTIES: [&str; 2] = ["vertex_indices", "vertex_index"];

/// Load a surface mesh from a PLY file.
///
/// Each triangle inherits the scalar properties of the face it came from.
///
/// # Example
///
/// ```no_run
/// use atrophy::io::ply;
///
/// let mesh = ply::load("surface.ply").unwrap();
/// println!("{} triangles", mesh.num_faces());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| MeshError::load(path, e.to_string()))?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| MeshError::load(path, "PLY file has no vertex element"))?;

    let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(vertex_element.len());
    for vertex in vertex_element {
        let coord = |name: &str| {
            get_float_property(vertex, name)
                .ok_or_else(|| MeshError::load(path, format!("vertex missing {} coordinate", name)))
        };
        vertices.push(Point3::new(coord("x")?, coord("y")?, coord("z")?));
    }

    let face_element = ply
        .payload
        .get("face")
        .ok_or_else(|| MeshError::load(path, "PLY file has no face element"))?;

    let mut polygons: Vec<Vec<usize>> = Vec::with_capacity(face_element.len());
    for face in face_element {
        let indices = INDEX_PROPERTIES
            .iter()
            .find_map(|name| get_list_property(face, name))
            .ok_or_else(|| MeshError::load(path, "face missing vertex_indices property"))?;
        polygons.push(indices);
    }

    let (mut mesh, origins) = build_with_origins(&vertices, &polygons, &[])?;
    if mesh.num_faces() != polygons.len() {
        debug!("{} faces became {} triangles", polygons.len(), mesh.num_faces());
    }
    for array in face_arrays(face_element) {
        mesh.set_cell_array(array.select_tuples(&origins))?;
    }
    Ok(mesh)
}

/// Scalar face properties as cell arrays, in header order.
fn face_arrays(faces: &[DefaultElement]) -> Vec<DataArray> {
    let Some(first) = faces.first() else {
        return Vec::new();
    };

    first
        .iter()
        .filter(|(name, _)| !INDEX_PROPERTIES.contains(&name.as_str()))
        .filter_map(|(name, prop)| {
            let array = match prop {
                Property::Float(_) | Property::Double(_) => DataArray::float(
                    name.clone(),
                    1,
                    faces
                        .iter()
                        .map(|f| get_float_property(f, name).unwrap_or(f64::NAN))
                        .collect(),
                ),
                Property::Char(_)
                | Property::UChar(_)
                | Property::Short(_)
                | Property::UShort(_)
                | Property::Int(_)
                | Property::UInt(_) => DataArray::int(
                    name.clone(),
                    1,
                    faces
                        .iter()
                        .map(|f| get_float_property(f, name).map_or(0, |v| v as i64))
                        .collect(),
                ),
                _ => return None,
            };
            Some(array)
        })
        .collect()
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    match element.get(name)? {
        Property::ListInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        _ => None,
    }
}

/// Save a surface mesh to an ASCII PLY file.
///
/// Single-component cell arrays become face properties; others are skipped.
pub fn save<P: AsRef<Path>>(mesh: &TriMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let arrays: Vec<&DataArray> = mesh
        .cell_data
        .iter()
        .filter(|a| a.num_comp == 1 && a.num_tuples() == mesh.num_faces())
        .collect();

    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by atrophy")?;
    writeln!(writer, "element vertex {}", mesh.num_vertices())?;
    writeln!(writer, "property double x")?;
    writeln!(writer, "property double y")?;
    writeln!(writer, "property double z")?;
    writeln!(writer, "element face {}", mesh.num_faces())?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    for array in &arrays {
        let kind = match array.values {
            ArrayValues::Float(_) => "double",
            ArrayValues::Int(_) => "int",
        };
        writeln!(writer, "property {} {}", kind, array.name)?;
    }
    writeln!(writer, "end_header")?;

    for v in &mesh.vertices {
        writeln!(writer, "{} {} {}", v.x, v.y, v.z)?;
    }

    for (fi, f) in mesh.faces.iter().enumerate() {
        write!(writer, "3 {} {} {}", f[0], f[1], f[2])?;
        for array in &arrays {
            match &array.values {
                ArrayValues::Float(v) => write!(writer, " {}", v[fi])?,
                ArrayValues::Int(v) => write!(writer, " {}", v[fi])?,
            }
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}
