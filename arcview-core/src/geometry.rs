/// Mesh geometry: faces, bounds, derived normals and the interleaved draw buffer
use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::{Error, Result};

/// One face corner: a vertex index and an optional normal index (both 0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRef {
    pub vertex: usize,
    pub normal: Option<usize>,
}

impl FaceRef {
    pub fn new(vertex: usize, normal: Option<usize>) -> Self {
        Self { vertex, normal }
    }

    /// Index used to look up this corner's normal. Without an explicit
    /// normal index the vertex index doubles as the normal index.
    pub fn normal_index(&self) -> usize {
        self.normal.unwrap_or(self.vertex)
    }
}

/// A polygon face with three or more corners
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub refs: Vec<FaceRef>,
}

impl Face {
    pub fn new(refs: Vec<FaceRef>) -> Self {
        Self { refs }
    }

    /// Build a face from vertex indices only
    pub fn from_vertices(indices: &[usize]) -> Self {
        Self::new(indices.iter().map(|&i| FaceRef::new(i, None)).collect())
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Unnormalized face normal from the first three corners
    pub fn calculate_normal(&self, vertices: &[Point3<f32>]) -> Vector3<f32> {
        let v0 = vertices[self.refs[0].vertex];
        let v1 = vertices[self.refs[1].vertex];
        let v2 = vertices[self.refs[2].vertex];

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2)
    }
}

/// Where a mesh's normals came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalSource {
    Supplied,
    Derived,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    pub fn from_points(points: &[Point3<f32>]) -> Option<Self> {
        let first = points.first()?;
        let (min, max) = points.iter().fold((*first, *first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        });
        Some(Self { min, max })
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Edge lengths along x, y and z
    pub fn edges(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn max_edge(&self) -> f32 {
        self.edges().max()
    }
}

/// A position and normal read back out of a draw buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRecord {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl DrawRecord {
    fn from_slice(s: &[f32]) -> Self {
        Self {
            position: Point3::new(s[0], s[1], s[2]),
            normal: Vector3::new(s[3], s[4], s[5]),
        }
    }
}

/// Interleaved position+normal floats in face order, ready for one draw call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawBuffer {
    data: Vec<f32>,
    corners: Vec<usize>,
}

impl DrawBuffer {
    /// Floats per corner: xyz position then xyz normal
    pub const STRIDE: usize = 6;

    fn build(vertices: &[Point3<f32>], normals: &[Vector3<f32>], faces: &[Face], source: NormalSource) -> Self {
        let total: usize = faces.iter().map(Face::len).sum();
        let mut data = Vec::with_capacity(total * Self::STRIDE);
        let mut corners = Vec::with_capacity(faces.len());

        for face in faces {
            for r in &face.refs {
                let p = vertices[r.vertex];
                let n = match source {
                    NormalSource::Supplied => normals[r.normal_index()],
                    NormalSource::Derived => normals[r.vertex],
                };
                data.extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z]);
            }
            corners.push(face.len());
        }

        Self { data, corners }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of corners (records) in the buffer
    pub fn vertex_count(&self) -> usize {
        self.data.len() / Self::STRIDE
    }

    /// The float slice of each face
    pub fn polygons(&self) -> impl Iterator<Item = &[f32]> + '_ {
        let data = &self.data;
        let mut offset = 0;
        self.corners.iter().map(move |&n| {
            let start = offset;
            offset += n * Self::STRIDE;
            &data[start..offset]
        })
    }

    /// Fan-triangulated records, for renderers that only draw triangles
    pub fn triangles(&self) -> impl Iterator<Item = [DrawRecord; 3]> + '_ {
        self.polygons().flat_map(|poly| {
            let count = poly.len() / Self::STRIDE;
            let first = DrawRecord::from_slice(&poly[..Self::STRIDE]);
            (1..count.saturating_sub(1)).map(move |i| {
                [
                    first,
                    DrawRecord::from_slice(&poly[i * Self::STRIDE..]),
                    DrawRecord::from_slice(&poly[(i + 1) * Self::STRIDE..]),
                ]
            })
        })
    }
}

/// A loaded polygon mesh with its derived data
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Point3<f32>>,
    normals: Vec<Vector3<f32>>,
    faces: Vec<Face>,
    normal_source: NormalSource,
    bounds: BoundingBox,
    scale: f32,
    draw_buffer: DrawBuffer,
}

impl Mesh {
    /// Build a mesh. An empty `normals` list means normals are derived from
    /// the faces; otherwise the supplied normals are normalized and used.
    pub fn new(
        vertices: Vec<Point3<f32>>,
        normals: Vec<Vector3<f32>>,
        faces: Vec<Face>,
        target_extent: f32,
    ) -> Result<Self> {
        if faces.is_empty() {
            return Err(Error::DegenerateGeometry("mesh has no faces".to_string()));
        }
        Self::check_faces(&vertices, &normals, &faces)?;

        let (normals, normal_source) = if normals.is_empty() {
            (Self::compute_vertex_normals(&vertices, &faces), NormalSource::Derived)
        } else {
            let normals = normals.iter().map(|n| unit_or_zero(*n)).collect();
            (normals, NormalSource::Supplied)
        };

        let bounds = BoundingBox::from_points(&vertices)
            .ok_or_else(|| Error::DegenerateGeometry("mesh has no vertices".to_string()))?;
        let max_edge = bounds.max_edge();
        if !(max_edge.is_finite() && max_edge > 0.0) {
            return Err(Error::DegenerateGeometry(format!(
                "bounding box has zero extent (longest edge {max_edge})"
            )));
        }
        let scale = target_extent / max_edge;

        let draw_buffer = DrawBuffer::build(&vertices, &normals, &faces, normal_source);

        Ok(Self {
            vertices,
            normals,
            faces,
            normal_source,
            bounds,
            scale,
            draw_buffer,
        })
    }

    fn check_faces(vertices: &[Point3<f32>], normals: &[Vector3<f32>], faces: &[Face]) -> Result<()> {
        for (i, face) in faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(Error::DegenerateGeometry(format!(
                    "face {i} has {} corners",
                    face.len()
                )));
            }
            for r in &face.refs {
                if r.vertex >= vertices.len() {
                    return Err(Error::DegenerateGeometry(format!(
                        "face {i} references vertex {} of {}",
                        r.vertex,
                        vertices.len()
                    )));
                }
                if !normals.is_empty() && r.normal_index() >= normals.len() {
                    return Err(Error::DegenerateGeometry(format!(
                        "face {i} references normal {} of {}",
                        r.normal_index(),
                        normals.len()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Per-vertex normals: the cross product of each face's first two edges
    /// is added into the slot of every vertex on that face, then normalized.
    pub fn compute_vertex_normals(vertices: &[Point3<f32>], faces: &[Face]) -> Vec<Vector3<f32>> {
        let mut normals = vec![Vector3::zeros(); vertices.len()];

        for face in faces.iter().filter(|f| f.len() >= 3) {
            let n = face.calculate_normal(vertices);
            for r in &face.refs {
                normals[r.vertex] += n;
            }
        }

        normals.into_iter().map(unit_or_zero).collect()
    }

    pub fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vector3<f32>] {
        &self.normals
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn normal_source(&self) -> NormalSource {
        self.normal_source
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn center(&self) -> Point3<f32> {
        self.bounds.center()
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn draw_buffer(&self) -> &DrawBuffer {
        &self.draw_buffer
    }

    /// Scale by `scale`, after translating by `-center`
    pub fn normalize_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_scaling(self.scale) * Matrix4::new_translation(&-self.center().coords)
    }

    /// Height of the lowest point of the normalized mesh
    pub fn ground_height(&self) -> f32 {
        (self.bounds.min.y - self.center().y) * self.scale
    }
}

fn unit_or_zero(n: Vector3<f32>) -> Vector3<f32> {
    n.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros)
}
