//! PLY export through `ply-rs`.
//!
//! Vertex properties are declared in a fixed order: `x y z`, then optional
//! `nx ny nz`, `u v` floats and `red green blue` uchars. Faces are
//! `property list uchar int vertex_indices`.

use std::io::{self, Write};

use mesh_types::{AttributeValues, Mesh, PointArray};
use ply_rs::ply::{
    Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
    ScalarType,
};
use ply_rs::writer::Writer;

use crate::traits::point_array;
use crate::types::*;

/// Header sentinel separating text from payload.
pub const END_HEADER: &str = "end_header";

/// Attributes resolved against a mesh, ready to encode.
#[derive(Debug)]
pub struct PlyLayout<'m> {
    mesh: &'m Mesh,
    format: PlyFormat,
    normals: Option<&'m PointArray>,
    texcoords: Option<&'m PointArray>,
    colors: Option<&'m PointArray>,
}

fn resolve<'m>(
    mesh: &'m Mesh,
    name: Option<&str>,
    components: usize,
) -> Result<Option<&'m PointArray>, GeometryError> {
    let Some(name) = name else {
        return Ok(None);
    };
    let array = point_array(mesh, name)?;
    if array.components != components {
        return Err(mesh_types::MeshError::ComponentMismatch {
            name: name.to_string(),
            expected: components,
            found: array.components,
        }
        .into());
    }
    Ok(Some(array))
}

/// Float color components map to bytes by `round(255 * clamp(v, 0, 1))`.
fn color_byte(array: &PointArray, i: usize, c: usize) -> u8 {
    match &array.values {
        AttributeValues::UChar(v) => v[i * 3 + c],
        AttributeValues::Float(v) => (255.0 * v[i * 3 + c].clamp(0.0, 1.0)).round() as u8,
    }
}

fn float_component(array: &PointArray, i: usize, c: usize) -> Property {
    Property::Float(array.component(i, c).unwrap_or(0.0) as f32)
}

fn encoding(format: PlyFormat) -> Encoding {
    match format {
        PlyFormat::Ascii => Encoding::Ascii,
        PlyFormat::BinaryLittleEndian => Encoding::BinaryLittleEndian,
        PlyFormat::BinaryBigEndian => Encoding::BinaryBigEndian,
    }
}

const POSITION: [&str; 3] = ["x", "y", "z"];
const NORMAL: [&str; 3] = ["nx", "ny", "nz"];
const TEXCOORD: [&str; 2] = ["u", "v"];
const COLOR: [&str; 3] = ["red", "green", "blue"];

fn add_scalars(def: &mut ElementDef, names: &[&str], scalar: ScalarType) {
    for name in names {
        def.properties.add(PropertyDef::new(
            name.to_string(),
            PropertyType::Scalar(scalar.clone()),
        ));
    }
}

impl<'m> PlyLayout<'m> {
    /// Check the mesh and requested attributes can be encoded.
    pub fn resolve(mesh: &'m Mesh, request: &SerializeRequest) -> Result<Self, GeometryError> {
        if !mesh.strips.is_empty() {
            return Err(GeometryError::NotSupported {
                operation: "writing triangle strips (triangulate first)".to_string(),
            });
        }
        mesh.validate()?;
        if let Some(cell) = mesh.polys.iter().position(|p| p.len() > u8::MAX as usize) {
            return Err(GeometryError::NotSupported {
                operation: format!(
                    "face {} has {} vertices (max {})",
                    cell,
                    mesh.polys[cell].len(),
                    u8::MAX
                ),
            });
        }
        Ok(Self {
            mesh,
            format: request.format,
            normals: resolve(mesh, request.normals.as_deref(), 3)?,
            texcoords: resolve(mesh, request.texcoords.as_deref(), 2)?,
            colors: resolve(mesh, request.colors.as_deref(), 3)?,
        })
    }

    fn vertex_def(&self) -> ElementDef {
        let mut def = ElementDef::new("vertex".to_string());
        add_scalars(&mut def, &POSITION, ScalarType::Float);
        if self.normals.is_some() {
            add_scalars(&mut def, &NORMAL, ScalarType::Float);
        }
        if self.texcoords.is_some() {
            add_scalars(&mut def, &TEXCOORD, ScalarType::Float);
        }
        if self.colors.is_some() {
            add_scalars(&mut def, &COLOR, ScalarType::UChar);
        }
        def.count = self.mesh.vertex_count();
        def
    }

    fn face_def(&self) -> ElementDef {
        let mut def = ElementDef::new("face".to_string());
        def.properties.add(PropertyDef::new(
            "vertex_indices".to_string(),
            PropertyType::List(ScalarType::UChar, ScalarType::Int),
        ));
        def.count = self.mesh.poly_count();
        def
    }

    fn vertex(&self, i: usize) -> DefaultElement {
        let mut element = DefaultElement::new();
        for (name, &c) in POSITION.iter().zip(&self.mesh.points[i]) {
            element.insert(name.to_string(), Property::Float(c));
        }
        if let Some(normals) = self.normals {
            for (c, name) in NORMAL.iter().enumerate() {
                element.insert(name.to_string(), float_component(normals, i, c));
            }
        }
        if let Some(texcoords) = self.texcoords {
            for (c, name) in TEXCOORD.iter().enumerate() {
                element.insert(name.to_string(), float_component(texcoords, i, c));
            }
        }
        if let Some(colors) = self.colors {
            for (c, name) in COLOR.iter().enumerate() {
                element.insert(name.to_string(), Property::UChar(color_byte(colors, i, c)));
            }
        }
        element
    }

    /// Header definitions and payload as a `ply-rs` document.
    pub fn to_ply(&self) -> Ply<DefaultElement> {
        let mut ply = Ply::<DefaultElement>::new();
        ply.header.encoding = encoding(self.format);
        ply.header.comments.push("forcemesh export".to_string());
        ply.header.elements.add(self.vertex_def());
        ply.header.elements.add(self.face_def());

        let vertices = (0..self.mesh.vertex_count()).map(|i| self.vertex(i)).collect();
        ply.payload.insert("vertex".to_string(), vertices);

        let faces = self
            .mesh
            .polys
            .iter()
            .map(|poly| {
                let mut element = DefaultElement::new();
                element.insert(
                    "vertex_indices".to_string(),
                    Property::ListInt(poly.iter().map(|&i| i as i32).collect()),
                );
                element
            })
            .collect();
        ply.payload.insert("face".to_string(), faces);
        ply
    }

    /// Encode header and payload.
    pub fn write<W: Write>(&self, mut w: W) -> io::Result<()> {
        let mut ply = self.to_ply();
        ply.make_consistent()
            .map_err(|e| io::Error::other(format!("PLY consistency error: {:?}", e)))?;
        Writer::new().write_ply(&mut w, &mut ply)?;
        w.flush()
    }
}

/// Encode a mesh as PLY bytes.
pub fn encode_ply(mesh: &Mesh, request: &SerializeRequest) -> Result<Vec<u8>, GeometryError> {
    let layout = PlyLayout::resolve(mesh, request)?;
    let mut buf = Vec::new();
    layout
        .write(&mut buf)
        .expect("writing PLY into a Vec should never fail");
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{PointArray, TexCoordField};

    fn two_triangles() -> Mesh {
        let mut mesh = Mesh::from_triangles(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            &[[0, 1, 2], [0, 2, 3]],
        );
        mesh.point_data
            .insert(TexCoordField(vec![[0.5, 0.5]; 4]).into_array("texCoords"));
        mesh.point_data.insert(PointArray::uchar(
            "texCoords3dAsColor",
            3,
            vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 10, 20, 30],
        ));
        mesh
    }

    fn split_header(bytes: &[u8]) -> (String, &[u8]) {
        let marker = b"end_header\n";
        let pos = bytes
            .windows(marker.len())
            .position(|w| w == marker)
            .unwrap()
            + marker.len();
        (String::from_utf8(bytes[..pos].to_vec()).unwrap(), &bytes[pos..])
    }

    #[test]
    fn header_uses_generic_texcoord_names() {
        let mesh = two_triangles();
        let request = SerializeRequest::default()
            .with_texcoords("texCoords")
            .with_colors("texCoords3dAsColor");
        let bytes = encode_ply(&mesh, &request).unwrap();
        let (header, _) = split_header(&bytes);
        assert!(header.starts_with("ply\nformat binary_little_endian 1.0\n"));
        assert!(header.contains("element vertex 4\n"));
        assert!(header.contains("property float u\nproperty float v\n"));
        assert!(header.contains("property uchar red\nproperty uchar green\nproperty uchar blue\n"));
        assert!(header.contains("element face 2\n"));
    }

    #[test]
    fn binary_payload_size() {
        let mesh = two_triangles();
        let request = SerializeRequest::default()
            .with_texcoords("texCoords")
            .with_colors("texCoords3dAsColor");
        let bytes = encode_ply(&mesh, &request).unwrap();
        let (_, payload) = split_header(&bytes);
        // vertex: 3 pos + 2 uv floats + 3 bytes; face: 1 + 3 * 4 bytes
        assert_eq!(payload.len(), 4 * (5 * 4 + 3) + 2 * (1 + 12));
        // first vertex u
        let u = f32::from_le_bytes([payload[12], payload[13], payload[14], payload[15]]);
        assert_eq!(u, 0.5);
        // first vertex color
        assert_eq!(&payload[20..23], &[255, 0, 0]);
    }

    #[test]
    fn output_reads_back_with_ply_parser() {
        use ply_rs::parser::Parser;

        let mesh = two_triangles();
        let request = SerializeRequest::default()
            .with_texcoords("texCoords")
            .with_colors("texCoords3dAsColor");
        let bytes = encode_ply(&mesh, &request).unwrap();
        let ply = Parser::<DefaultElement>::new()
            .read_ply(&mut bytes.as_slice())
            .unwrap();

        let vertices = &ply.payload["vertex"];
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[3]["u"], Property::Float(0.5));
        assert_eq!(vertices[3]["blue"], Property::UChar(30));
        assert_eq!(
            ply.payload["face"][1]["vertex_indices"],
            Property::ListInt(vec![0, 2, 3])
        );
    }

    #[test]
    fn big_endian_indices() {
        let mesh = two_triangles();
        let bytes = encode_ply(&mesh, &SerializeRequest::new(PlyFormat::BinaryBigEndian)).unwrap();
        let (header, payload) = split_header(&bytes);
        assert!(header.contains("format binary_big_endian 1.0"));
        let faces = &payload[4 * 12..];
        assert_eq!(faces[0], 3);
        assert_eq!(i32::from_be_bytes([faces[5], faces[6], faces[7], faces[8]]), 1);
    }

    #[test]
    fn ascii_payload_lines() {
        let mesh = two_triangles();
        let request = SerializeRequest::new(PlyFormat::Ascii).with_colors("texCoords3dAsColor");
        let bytes = encode_ply(&mesh, &request).unwrap();
        let (_, payload) = split_header(&bytes);
        let text = String::from_utf8(payload.to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[3], "0 1 0 10 20 30");
        assert_eq!(lines[5], "3 0 2 3");
    }

    #[test]
    fn float_colors_are_rounded() {
        let mut mesh = two_triangles();
        mesh.point_data.insert(PointArray::float(
            "rgb",
            3,
            vec![0.5, 1.5, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        ));
        let request = SerializeRequest::new(PlyFormat::Ascii).with_colors("rgb");
        let bytes = encode_ply(&mesh, &request).unwrap();
        let (_, payload) = split_header(&bytes);
        let first = String::from_utf8(payload.to_vec()).unwrap();
        assert!(first.lines().next().unwrap().ends_with(" 128 255 0"));
    }

    #[test]
    fn missing_attribute_is_reported() {
        let mesh = two_triangles();
        let request = SerializeRequest::default().with_normals("Normals");
        assert!(matches!(
            encode_ply(&mesh, &request),
            Err(GeometryError::MissingAttribute { name }) if name == "Normals"
        ));
    }

    #[test]
    fn texcoords_need_two_components() {
        let mesh = two_triangles();
        let request = SerializeRequest::default().with_texcoords("texCoords3dAsColor");
        assert!(matches!(
            encode_ply(&mesh, &request),
            Err(GeometryError::Mesh(_))
        ));
    }

    #[test]
    fn strips_are_rejected() {
        let mut mesh = two_triangles();
        mesh.strips.push(vec![0, 1, 2]);
        assert!(matches!(
            encode_ply(&mesh, &SerializeRequest::default()),
            Err(GeometryError::NotSupported { .. })
        ));
    }
}
