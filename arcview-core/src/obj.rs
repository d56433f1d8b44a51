/// Line-oriented mesh parser for `v`, `vn` and `f` records
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, space0, space1},
    combinator::{all_consuming, eof, map, map_res, opt},
    multi::separated_list1,
    number::complete::float,
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};
use nalgebra::{Point3, Vector3};
use std::path::Path;

use crate::error::{Error, Result};
use crate::geometry::{Face, FaceRef, Mesh};

/// A face corner as written in the file, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawRef {
    vertex: usize,
    normal: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
enum Record {
    Vertex(Point3<f32>),
    Normal(Vector3<f32>),
    Face(Vec<RawRef>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Vertex,
    Normal,
    Face,
}

/// Loads meshes and normalizes them to a target extent
#[derive(Debug, Clone, Copy)]
pub struct MeshLoader {
    target_extent: f32,
}

impl MeshLoader {
    pub fn new(target_extent: f32) -> Self {
        Self { target_extent }
    }

    /// Read and parse the mesh at `path`
    pub fn load(&self, path: Option<&Path>) -> Result<Mesh> {
        let path = path.ok_or(Error::MissingInput)?;
        log::info!("Loading mesh from {}", path.display());
        let source = std::fs::read_to_string(path)?;
        self.parse(&source)
    }

    /// Parse mesh records from text. Unknown records are skipped, malformed
    /// known records abort the load.
    pub fn parse(&self, source: &str) -> Result<Mesh> {
        let mut vertices = Vec::new();
        let mut normals = Vec::new();
        let mut faces: Vec<(usize, Vec<RawRef>)> = Vec::new();

        for (i, raw) in source.lines().enumerate() {
            let line_no = i + 1;
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let Ok((_, kind)) = keyword(line) else {
                log::trace!("Ignoring line {line_no}: {line}");
                continue;
            };

            let record = match all_consuming(terminated(record, space0))(line) {
                Ok((_, record)) => record,
                Err(_) => return Err(Error::parse(line_no, describe(kind, line))),
            };

            match record {
                Record::Vertex(v) => vertices.push(v),
                Record::Normal(n) => normals.push(n),
                Record::Face(refs) => faces.push((line_no, refs)),
            }
        }

        let faces = resolve_faces(faces, vertices.len(), normals.len())?;

        log::debug!(
            "Parsed {} vertices, {} normals, {} faces",
            vertices.len(),
            normals.len(),
            faces.len()
        );

        let mesh = Mesh::new(vertices, normals, faces, self.target_extent)?;
        log::info!(
            "Mesh bounds {:?}..{:?}, center {:?}, scale {:.4}, {:?} normals",
            mesh.bounds().min.coords.as_slice(),
            mesh.bounds().max.coords.as_slice(),
            mesh.center().coords.as_slice(),
            mesh.scale(),
            mesh.normal_source()
        );
        Ok(mesh)
    }
}

impl Default for MeshLoader {
    fn default() -> Self {
        Self::new(2.0)
    }
}

fn describe(keyword: Keyword, line: &str) -> String {
    let expected = match keyword {
        Keyword::Vertex => "vertex with 3 numeric fields",
        Keyword::Normal => "normal with 3 numeric fields",
        Keyword::Face => "face with at least 3 vertex references",
    };
    format!("expected {expected}, got `{line}`")
}

/// Convert 1-based references to checked 0-based faces
fn resolve_faces(
    faces: Vec<(usize, Vec<RawRef>)>,
    vertex_count: usize,
    normal_count: usize,
) -> Result<Vec<Face>> {
    faces
        .into_iter()
        .map(|(line_no, refs)| {
            let refs = refs
                .into_iter()
                .map(|r| {
                    let vertex = to_index(r.vertex, vertex_count)
                        .ok_or_else(|| Error::parse(line_no, format!("vertex index {} out of range", r.vertex)))?;
                    let normal = match r.normal {
                        Some(n) if normal_count > 0 => Some(
                            to_index(n, normal_count)
                                .ok_or_else(|| Error::parse(line_no, format!("normal index {n} out of range")))?,
                        ),
                        _ => None,
                    };
                    if normal_count > 0 && normal.is_none() && vertex >= normal_count {
                        return Err(Error::parse(
                            line_no,
                            format!("vertex {} has no matching normal", r.vertex),
                        ));
                    }
                    Ok(FaceRef::new(vertex, normal))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Face::new(refs))
        })
        .collect()
}

fn to_index(one_based: usize, count: usize) -> Option<usize> {
    one_based.checked_sub(1).filter(|&i| i < count)
}

/// `vn` is tried before `v`, since `v` is its prefix
fn keyword(input: &str) -> IResult<&str, Keyword> {
    terminated(
        alt((
            map(tag("vn"), |_| Keyword::Normal),
            map(tag("v"), |_| Keyword::Vertex),
            map(tag("f"), |_| Keyword::Face),
        )),
        alt((space1, eof)),
    )(input)
}

fn record(input: &str) -> IResult<&str, Record> {
    let (rest, record) = alt((
        map(preceded(pair(tag("vn"), space1), vector3), |(x, y, z)| {
            Record::Normal(Vector3::new(x, y, z))
        }),
        map(
            preceded(
                pair(tag("v"), space1),
                terminated(vector3, opt(preceded(space1, float))),
            ),
            |(x, y, z)| Record::Vertex(Point3::new(x, y, z)),
        ),
        map(
            preceded(pair(tag("f"), space1), separated_list1(space1, face_ref)),
            Record::Face,
        ),
    ))(input)?;

    if let Record::Face(refs) = &record {
        if refs.len() < 3 {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Count,
            )));
        }
    }
    Ok((rest, record))
}

fn vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    tuple((float, preceded(space1, float), preceded(space1, float)))(input)
}

fn index(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>)(input)
}

/// `v`, `v//n`, `v/t/n` or `v/t`
fn face_ref(input: &str) -> IResult<&str, RawRef> {
    let (input, vertex) = index(input)?;
    let (input, rest) = opt(preceded(
        char('/'),
        pair(opt(index), opt(preceded(char('/'), index))),
    ))(input)?;
    let normal = rest.and_then(|(_texture, normal)| normal);
    Ok((input, RawRef { vertex, normal }))
}
