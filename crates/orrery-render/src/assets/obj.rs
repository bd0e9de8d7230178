//! Wavefront OBJ parsing
//!
//! Supports `v`, `vt`, `vn` and `f` records. Faces with more than three
//! corners are fan-triangulated and negative indices count back from the
//! most recent element. Every other record is ignored.
//!
//! Corners sharing the same (position, uv, normal) index triple collapse to
//! one output vertex.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{AssetError, AssetResult, ObjError};
use crate::gpu_types::Vertex;

/// Parsed, single-indexed mesh ready for upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Some corner had no uv index and got `(0, 0)`.
    pub missing_uvs: bool,
    /// Some corner had no normal index and got a zero normal.
    pub missing_normals: bool,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct CornerKey {
    position: usize,
    uv: Option<usize>,
    normal: Option<usize>,
}

#[derive(Default)]
struct Parser {
    positions: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
    corners: HashMap<CornerKey, u32>,
    mesh: MeshData,
}

fn parse_floats<const N: usize>(
    line: usize,
    keyword: &'static str,
    fields: &mut std::str::SplitWhitespace<'_>,
) -> Result<[f32; N], ObjError> {
    let mut out = [0.0; N];
    for slot in out.iter_mut() {
        let text = fields.next().ok_or(ObjError::MissingComponent {
            line,
            keyword,
            expected: N,
        })?;
        *slot = text.parse().map_err(|_| ObjError::InvalidNumber {
            line,
            text: text.to_string(),
        })?;
    }
    Ok(out)
}

/// Resolve a 1-based or negative (relative) OBJ index against `count` elements.
fn resolve_index(
    line: usize,
    attribute: &'static str,
    text: &str,
    count: usize,
) -> Result<usize, ObjError> {
    let raw: i64 = text.parse().map_err(|_| ObjError::InvalidNumber {
        line,
        text: text.to_string(),
    })?;
    let resolved = if raw > 0 { raw - 1 } else { count as i64 + raw };
    if raw == 0 || resolved < 0 || resolved >= count as i64 {
        return Err(ObjError::IndexOutOfRange { line, attribute, index: raw, count });
    }
    Ok(resolved as usize)
}

impl Parser {
    fn corner_key(&self, line: usize, text: &str) -> Result<CornerKey, ObjError> {
        let invalid = || ObjError::InvalidCorner { line, text: text.to_string() };

        let mut parts = text.split('/');
        let position = parts.next().filter(|p| !p.is_empty()).ok_or_else(invalid)?;
        let uv = parts.next().filter(|p| !p.is_empty());
        let normal = parts.next().filter(|p| !p.is_empty());
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(CornerKey {
            position: resolve_index(line, "position", position, self.positions.len())?,
            uv: uv
                .map(|t| resolve_index(line, "uv", t, self.uvs.len()))
                .transpose()?,
            normal: normal
                .map(|t| resolve_index(line, "normal", t, self.normals.len()))
                .transpose()?,
        })
    }

    fn vertex_index(&mut self, key: CornerKey) -> u32 {
        if let Some(&index) = self.corners.get(&key) {
            return index;
        }

        let uv = match key.uv {
            Some(i) => self.uvs[i],
            None => {
                self.mesh.missing_uvs = true;
                [0.0; 2]
            }
        };
        let normal = match key.normal {
            Some(i) => self.normals[i],
            None => {
                self.mesh.missing_normals = true;
                [0.0; 3]
            }
        };

        let index = self.mesh.vertices.len() as u32;
        self.mesh.vertices.push(Vertex {
            position: self.positions[key.position],
            normal,
            uv,
        });
        self.corners.insert(key, index);
        index
    }

    fn face(&mut self, line: usize, fields: std::str::SplitWhitespace<'_>) -> Result<(), ObjError> {
        let keys = fields
            .map(|corner| self.corner_key(line, corner))
            .collect::<Result<Vec<_>, _>>()?;
        if keys.len() < 3 {
            return Err(ObjError::DegenerateFace { line, corners: keys.len() });
        }

        let first = self.vertex_index(keys[0]);
        let mut previous = self.vertex_index(keys[1]);
        for key in &keys[2..] {
            let current = self.vertex_index(*key);
            self.mesh.indices.extend_from_slice(&[first, previous, current]);
            previous = current;
        }
        Ok(())
    }
}

pub fn parse_obj(source: &str) -> Result<MeshData, ObjError> {
    let mut parser = Parser::default();

    for (number, text) in source.lines().enumerate() {
        let line = number + 1;
        let mut fields = text.split_whitespace();
        match fields.next() {
            Some("v") => {
                let p = parse_floats::<3>(line, "v", &mut fields)?;
                parser.positions.push(p);
            }
            Some("vt") => {
                let uv = parse_floats::<2>(line, "vt", &mut fields)?;
                parser.uvs.push(uv);
            }
            Some("vn") => {
                let n = parse_floats::<3>(line, "vn", &mut fields)?;
                parser.normals.push(n);
            }
            Some("f") => parser.face(line, fields)?,
            _ => {}
        }
    }

    // An empty index buffer cannot be bound for drawing.
    if parser.mesh.indices.is_empty() {
        return Err(ObjError::NoFaces);
    }
    Ok(parser.mesh)
}

/// Read and parse an OBJ file, warning about attributes that were zero-filled.
pub fn load_obj(path: &Path) -> AssetResult<MeshData> {
    let source = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mesh = parse_obj(&source).map_err(|source| AssetError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    if mesh.missing_normals {
        tracing::warn!("{}: some normals are missing, written as zero", path.display());
    }
    if mesh.missing_uvs {
        tracing::warn!("{}: some uvs are missing, written as zero", path.display());
    }
    tracing::info!(
        "Loaded {}: {} vertices, {} triangles",
        path.display(),
        mesh.vertices.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD_AS_TRIANGLES: &str = "\
# unit quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/4/1
";

    fn assert_index_invariants(mesh: &MeshData) {
        assert_eq!(mesh.indices.len() % 3, 0);
        let count = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|i| *i < count));
    }

    #[test]
    fn test_shared_corners_collapse() {
        let mesh = parse_obj(QUAD_AS_TRIANGLES).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, [0, 1, 2, 0, 2, 3]);
        assert!(!mesh.missing_uvs && !mesh.missing_normals);
        assert_eq!(mesh.vertices[2].uv, [1.0, 1.0]);
        assert_eq!(mesh.vertices[3].normal, [0.0, 0.0, 1.0]);
        assert_index_invariants(&mesh);
    }

    #[test]
    fn test_same_position_different_uv_stays_distinct() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 1\nf 1/1 2/1 3/1\nf 1/2 2/1 3/1\n";
        let mesh = parse_obj(source).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, [0, 1, 2, 3, 1, 2]);
    }

    #[test]
    fn test_quad_is_fan_triangulated() {
        let source = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv -1 1 0\nf 1 2 3 4 5\n";
        let mesh = parse_obj(source).unwrap();
        assert_eq!(mesh.indices, [0, 1, 2, 0, 2, 3, 0, 3, 4]);
        assert_index_invariants(&mesh);
    }

    #[test]
    fn test_negative_indices_are_relative() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf -3//-1 -2//-1 -1//-1\n";
        let mesh = parse_obj(source).unwrap();
        assert_eq!(mesh.vertices[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[2].position, [0.0, 1.0, 0.0]);
        assert!(mesh.missing_uvs);
        assert!(!mesh.missing_normals);
    }

    #[test]
    fn test_missing_normals_flagged_independently_of_uvs() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.5 0.5\nf 1/1 2/1 3/1\n";
        let mesh = parse_obj(source).unwrap();
        assert!(mesh.missing_normals);
        assert!(!mesh.missing_uvs);
        assert!(mesh.vertices.iter().all(|v| v.normal == [0.0; 3]));
        assert!(mesh.vertices.iter().all(|v| v.uv == [0.5, 0.5]));
    }

    #[test]
    fn test_other_records_are_ignored() {
        let source = "mtllib a.mtl\no Sphere\nv 0 0 0\nv 1 0 0\nv 0 1 0\ns off\nusemtl x\nf 1 2 3\n";
        let mesh = parse_obj(source).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_bad_number_reports_line() {
        let err = parse_obj("v 0 0 0\nv 1 zero 0\n").unwrap_err();
        assert_eq!(err, ObjError::InvalidNumber { line: 2, text: "zero".into() });
    }

    #[test]
    fn test_short_vertex_is_rejected() {
        let err = parse_obj("v 1 2\n").unwrap_err();
        assert_eq!(err, ObjError::MissingComponent { line: 1, keyword: "v", expected: 3 });
    }

    #[test]
    fn test_index_out_of_range() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err();
        assert_eq!(
            err,
            ObjError::IndexOutOfRange { line: 3, attribute: "position", index: 3, count: 2 }
        );
        let err = parse_obj("v 0 0 0\nf 0 1 1\n").unwrap_err();
        assert!(matches!(err, ObjError::IndexOutOfRange { index: 0, .. }));
    }

    #[test]
    fn test_two_corner_face_is_degenerate() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2\n").unwrap_err();
        assert_eq!(err, ObjError::DegenerateFace { line: 3, corners: 2 });
    }

    #[test]
    fn test_mesh_without_faces_is_rejected() {
        assert_eq!(parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\n"), Err(ObjError::NoFaces));
        assert_eq!(parse_obj("# nothing here\n"), Err(ObjError::NoFaces));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = load_obj(Path::new("does/not/exist.obj")).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.obj"));
    }
}
