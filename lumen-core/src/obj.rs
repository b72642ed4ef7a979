/// Wavefront OBJ reader and writer
use std::collections::HashMap;
use std::fmt::Write;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, i64 as index, space0, space1},
    combinator::{all_consuming, map, opt},
    multi::{many0, many1},
    number::complete::double,
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};

use crate::error::ObjError;
use crate::mesh::{Mesh, Vertex};
use crate::vector::Vector3;

/// One `v/t/n` reference of a face, as written (1-based or negative).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Corner {
    position: i64,
    coord: Option<i64>,
    normal: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
enum Statement {
    Position(Vector3),
    Normal(Vector3),
    Coord([f64; 2]),
    Face(Vec<Corner>),
}

/// Any numbers after the ones we keep (`w`, vertex colours) are dropped.
fn trailing(input: &str) -> IResult<&str, Vec<f64>> {
    many0(preceded(space1, double))(input)
}

fn vector3(input: &str) -> IResult<&str, Vector3> {
    map(
        terminated(
            tuple((
                preceded(space1, double),
                preceded(space1, double),
                preceded(space1, double),
            )),
            trailing,
        ),
        |(x, y, z)| Vector3::new(x, y, z),
    )(input)
}

fn coord(input: &str) -> IResult<&str, [f64; 2]> {
    map(
        terminated(
            pair(preceded(space1, double), opt(preceded(space1, double))),
            trailing,
        ),
        |(s, t)| [s, t.unwrap_or(0.0)],
    )(input)
}

fn corner(input: &str) -> IResult<&str, Corner> {
    let (input, position) = index(input)?;
    let (input, coord) = opt(preceded(char('/'), opt(index)))(input)?;
    let (input, normal) = opt(preceded(char('/'), opt(index)))(input)?;
    Ok((
        input,
        Corner {
            position,
            coord: coord.flatten(),
            normal: normal.flatten(),
        },
    ))
}

fn statement(input: &str) -> IResult<&str, Statement> {
    all_consuming(terminated(
        alt((
            map(preceded(tag("vn"), vector3), Statement::Normal),
            map(preceded(tag("vt"), coord), Statement::Coord),
            map(preceded(tag("v"), vector3), Statement::Position),
            map(preceded(tag("f"), many1(preceded(space1, corner))), Statement::Face),
        )),
        space0,
    ))(input)
}

/// Resolves a 1-based or negative (relative) reference into `0..len`.
fn resolve(reference: i64, len: usize) -> Option<usize> {
    let resolved = if reference < 0 {
        len as i64 + reference
    } else {
        reference - 1
    };
    (0..len as i64).contains(&resolved).then_some(resolved as usize)
}

/// Parses OBJ text into a mesh.
///
/// Polygons are fan-triangulated and corners with identical position,
/// normal and texture coordinate share one vertex. Missing or dangling
/// normal/texture references fall back to zero; a dangling position
/// reference is an error. Statements other than `v`, `vn`, `vt` and `f`
/// are skipped.
pub fn parse_obj(input: &str) -> Result<Mesh, ObjError> {
    let mut positions: Vec<Vector3> = Vec::new();
    let mut normals: Vec<Vector3> = Vec::new();
    let mut coords: Vec<[f64; 2]> = Vec::new();
    let mut mesh = Mesh::new();
    let mut vertex_map: HashMap<[u64; 8], usize> = HashMap::new();

    for (number, raw) in input.lines().enumerate() {
        let line = number + 1;
        let text = raw.trim();
        let keyword = text.split_whitespace().next().unwrap_or("");
        if !matches!(keyword, "v" | "vn" | "vt" | "f") {
            continue;
        }

        let parsed = match statement(text) {
            Ok((_, parsed)) => parsed,
            Err(e) => {
                return Err(ObjError::Parse {
                    line,
                    message: format!("malformed '{}' statement: {:?}", keyword, e),
                })
            }
        };

        match parsed {
            Statement::Position(p) => positions.push(p),
            Statement::Normal(n) => normals.push(n),
            Statement::Coord(c) => coords.push(c),
            Statement::Face(corners) => {
                let mut indices = Vec::with_capacity(corners.len());
                for corner in corners {
                    let position = resolve(corner.position, positions.len())
                        .map(|i| positions[i])
                        .ok_or(ObjError::IndexOutOfRange {
                            line,
                            index: corner.position,
                        })?;
                    let normal = corner
                        .normal
                        .and_then(|n| resolve(n, normals.len()))
                        .map_or(Vector3::zero(), |i| normals[i]);
                    let coord = corner
                        .coord
                        .and_then(|c| resolve(c, coords.len()))
                        .map_or([0.0, 0.0], |i| coords[i]);

                    let key = [
                        position.x.to_bits(),
                        position.y.to_bits(),
                        position.z.to_bits(),
                        normal.x.to_bits(),
                        normal.y.to_bits(),
                        normal.z.to_bits(),
                        coord[0].to_bits(),
                        coord[1].to_bits(),
                    ];
                    let vertex = *vertex_map.entry(key).or_insert_with(|| {
                        mesh.vertices.push(Vertex::new(position, normal, coord));
                        mesh.vertices.len() - 1
                    });
                    indices.push(vertex);
                }
                for i in 2..indices.len() {
                    mesh.triangles.push([indices[0], indices[i - 1], indices[i]]);
                }
            }
        }
    }

    log::debug!(
        "loaded OBJ: {} vertices, {} triangles",
        mesh.vertices.len(),
        mesh.triangles.len()
    );
    Ok(mesh)
}

/// Serializes a mesh as OBJ with one `v`/`vt`/`vn` triple per vertex.
pub fn write_obj(mesh: &Mesh) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    for v in &mesh.vertices {
        let _ = writeln!(out, "v {} {} {}", v.position.x, v.position.y, v.position.z);
    }
    for v in &mesh.vertices {
        let _ = writeln!(out, "vt {} {}", v.coord[0], v.coord[1]);
    }
    for v in &mesh.vertices {
        let _ = writeln!(out, "vn {} {} {}", v.normal.x, v.normal.y, v.normal.z);
    }
    for [a, b, c] in &mesh.triangles {
        let _ = writeln!(
            out,
            "f {0}/{0}/{0} {1}/{1}/{1} {2}/{2}/{2}",
            a + 1,
            b + 1,
            c + 1
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# a unit quad
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
vt 0 0
vt 1 1
f 1//1 2//1 3//1 4//1
";

    #[test]
    fn test_quad_is_fan_triangulated() {
        let mesh = parse_obj(QUAD).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.triangles, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(mesh.vertices[2].normal, Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(mesh.vertices[2].coord, [0.0, 0.0]);
    }

    #[test]
    fn test_corner_forms_and_dedup() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.5 0.5\nvn 0 0 1\n\
                    f 1 2 3\nf 1/1 2/1 3/1\nf 1/1/1 2/1/1 -1/1/1\nf 1 2 3\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.triangles.len(), 4);
        // plain, textured, and textured+normal corners are distinct vertices
        assert_eq!(mesh.vertices.len(), 9);
        assert_eq!(mesh.triangles[0], mesh.triangles[3]);
        assert_eq!(mesh.vertices[mesh.triangles[2][2]].position, Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(mesh.vertices[mesh.triangles[1][0]].coord, [0.5, 0.5]);
    }

    #[test]
    fn test_homogeneous_w_is_ignored() {
        let mesh = parse_obj("v 0 0 0 1\nv 1 0 0 1\nv 0 1 0 0.5\nvn 0 0 1 \nf 1//1 2//1 3//1\n").unwrap();
        assert_eq!(mesh.vertices[2].position, Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(mesh.vertices[0].normal, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_vertex_colours_are_ignored() {
        let text = "v 0 0 0 1 0 0\nv 2 0 0 0 1 0\nv 0 2 0 0 0 1\nf 1 2 3\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.triangles, vec![[0, 1, 2]]);
        assert_eq!(mesh.vertices[1].position, Vector3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_one_dimensional_coord() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.5\nvt 0.25 0.75 0\nf 1/1 2/2 3/1\n").unwrap();
        assert_eq!(mesh.vertices[0].coord, [0.5, 0.0]);
        assert_eq!(mesh.vertices[1].coord, [0.25, 0.75]);
    }

    #[test]
    fn test_dangling_normal_defaults_to_zero() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//7 2//7 3//7\n").unwrap();
        assert_eq!(mesh.vertices[0].normal, Vector3::zero());
    }

    #[test]
    fn test_dangling_position_is_an_error() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err();
        assert_eq!(err, ObjError::IndexOutOfRange { line: 3, index: 3 });
    }

    #[test]
    fn test_malformed_line_reports_number() {
        match parse_obj("v 0 0 0\nv 1 zero 0\n") {
            Err(ObjError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_write_then_parse_preserves_geometry() {
        let cube = Mesh::cube();
        let reparsed = parse_obj(&write_obj(&cube)).unwrap();
        assert_eq!(reparsed.triangles.len(), cube.triangles.len());
        assert_eq!(reparsed.vertices.len(), cube.vertices.len());
        let hit = reparsed.hit_test(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!((hit.t - 4.0).abs() < 1e-12);
    }
}
