use crate::geometry::{Mesh, Point3, PointCloud};
use crate::{Error, Result};

use log::info;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Vertex positions and, when all three components are present, normals.
/// A cloud whose normals point down on average is marked to have its faces flipped.
pub fn read_ply(path: &Path) -> Result<PointCloud> {
    let mut reader = BufReader::new(File::open(path)?);

    let ply = Parser::<DefaultElement>::new()
        .read_ply(&mut reader)
        .map_err(|e| Error::Ply(format!("{}: {}", path.to_string_lossy(), e)))?;

    let Some(vertices) = ply.payload.get("vertex") else {
        return Err(Error::Ply(format!(
            "{}: no vertex element",
            path.to_string_lossy()
        )));
    };

    let mut points = Vec::with_capacity(vertices.len());
    let mut normals = Vec::with_capacity(vertices.len());
    for vertex in vertices {
        let [Some(x), Some(y), Some(z)] = ["x", "y", "z"].map(|p| float_property(vertex, p))
        else {
            return Err(Error::Ply(format!(
                "{}: vertex without x, y and z",
                path.to_string_lossy()
            )));
        };
        points.push(Point3::new(x, y, z));

        let normal = ["nx", "ny", "nz"].map(|p| float_property(vertex, p));
        if let [Some(nx), Some(ny), Some(nz)] = normal {
            normals.push([nx, ny, nz]);
        }
    }

    info!(
        "Read {} points from {}",
        points.len(),
        path.to_string_lossy()
    );

    if normals.is_empty() || normals.len() != points.len() {
        return Ok(PointCloud::new(points));
    }

    let mean_nz = normals.iter().map(|n| n[2]).sum::<f64>() / normals.len() as f64;
    let mut cloud = PointCloud::with_normals(points, normals);
    cloud.flip_faces = mean_nz < 0.;
    Ok(cloud)
}

fn float_property(element: &DefaultElement, name: &str) -> Option<f64> {
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

/// ASCII ply with float vertices and triangle faces
pub fn write_mesh(mesh: &Mesh, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);

    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "element vertex {}", mesh.num_vertices())?;
    writeln!(writer, "property float x")?;
    writeln!(writer, "property float y")?;
    writeln!(writer, "property float z")?;
    writeln!(writer, "element face {}", mesh.num_triangles())?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    writeln!(writer, "end_header")?;

    for v in mesh.vertices.iter() {
        writeln!(writer, "{} {} {}", v.x as f32, v.y as f32, v.z as f32)?;
    }
    for t in mesh.triangles.iter() {
        writeln!(writer, "3 {} {} {}", t[0], t[1], t[2])?;
    }
    writer.flush()?;

    info!(
        "Wrote a mesh of {} vertices and {} triangles to {}",
        mesh.num_vertices(),
        mesh.num_triangles(),
        path.to_string_lossy()
    );
    Ok(())
}
