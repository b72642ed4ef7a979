/// Indexed triangle meshes for CPU-side picking and raytracing
use std::collections::HashMap;
use std::f64::consts::PI;

use crate::matrix::Matrix4;
use crate::raytracer::{HitTest, Raytracer};
use crate::vector::Vector3;

/// A vertex with position, normal and texture coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vector3,
    pub normal: Vector3,
    pub coord: [f64; 2],
}

impl Vertex {
    pub fn new(position: Vector3, normal: Vector3, coord: [f64; 2]) -> Self {
        Self {
            position,
            normal,
            coord,
        }
    }
}

/// Vertex list plus triangles as index triples into it
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<[usize; 3]>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            triangles: Vec::with_capacity(triangles),
        }
    }

    /// The `[-1, 1]` square in the XY plane facing +Z, split into a grid.
    pub fn plane(detail_x: usize, detail_y: usize) -> Self {
        let detail_x = detail_x.max(1);
        let detail_y = detail_y.max(1);
        let mut mesh = Self::with_capacity((detail_x + 1) * (detail_y + 1), detail_x * detail_y * 2);

        for y in 0..=detail_y {
            let t = y as f64 / detail_y as f64;
            for x in 0..=detail_x {
                let s = x as f64 / detail_x as f64;
                mesh.vertices.push(Vertex::new(
                    Vector3::new(2.0 * s - 1.0, 2.0 * t - 1.0, 0.0),
                    Vector3::new(0.0, 0.0, 1.0),
                    [s, t],
                ));
                if x < detail_x && y < detail_y {
                    let i = x + y * (detail_x + 1);
                    mesh.triangles.push([i, i + 1, i + detail_x + 1]);
                    mesh.triangles.push([i + detail_x + 1, i + 1, i + detail_x + 2]);
                }
            }
        }
        mesh
    }

    /// The `[-1, 1]` cube with four vertices per face and flat normals.
    pub fn cube() -> Self {
        // corner octants per face, then the face normal
        const FACES: [([usize; 4], [f64; 3]); 6] = [
            ([0, 4, 2, 6], [-1.0, 0.0, 0.0]),
            ([1, 3, 5, 7], [1.0, 0.0, 0.0]),
            ([0, 1, 4, 5], [0.0, -1.0, 0.0]),
            ([2, 6, 3, 7], [0.0, 1.0, 0.0]),
            ([0, 2, 1, 3], [0.0, 0.0, -1.0]),
            ([4, 5, 6, 7], [0.0, 0.0, 1.0]),
        ];

        let mut mesh = Self::with_capacity(24, 12);
        for (corners, normal) in FACES {
            let v = mesh.vertices.len();
            for (j, &octant) in corners.iter().enumerate() {
                mesh.vertices.push(Vertex::new(
                    pick_octant(octant),
                    Vector3::from_array(normal),
                    [(j & 1) as f64, ((j & 2) / 2) as f64],
                ));
            }
            mesh.triangles.push([v, v + 1, v + 2]);
            mesh.triangles.push([v + 2, v + 1, v + 3]);
        }
        mesh
    }

    /// Unit sphere built by subdividing each octahedron face `detail` times.
    pub fn sphere(detail: usize) -> Self {
        let detail = detail.max(1);
        let mut mesh = Self::new();
        let mut index: HashMap<(i64, i64, i64), usize> = HashMap::new();

        for octant in 0..8 {
            let sign = pick_octant(octant);
            let flip = sign.x * sign.y * sign.z < 0.0;
            let mut corner = |i: usize, j: usize| -> usize {
                let k = detail - i - j;
                let p = Vector3::new(i as f64, j as f64, k as f64)
                    .divide_scalar(detail as f64)
                    .multiply(sign)
                    .unit();
                let key = quantize(p);
                *index.entry(key).or_insert_with(|| {
                    let angles = p.to_angles();
                    mesh.vertices.push(Vertex::new(
                        p,
                        p,
                        [angles.theta / (2.0 * PI) + 0.5, angles.phi / PI + 0.5],
                    ));
                    mesh.vertices.len() - 1
                })
            };

            let mut faces = Vec::new();
            for i in 0..detail {
                for j in 0..detail - i {
                    faces.push([corner(i, j), corner(i + 1, j), corner(i, j + 1)]);
                    if i + j + 2 <= detail {
                        faces.push([corner(i + 1, j), corner(i + 1, j + 1), corner(i, j + 1)]);
                    }
                }
            }
            for [a, b, c] in faces {
                mesh.triangles.push(if flip { [a, c, b] } else { [a, b, c] });
            }
        }
        mesh
    }

    /// Recomputes smooth vertex normals from the triangle faces.
    pub fn compute_normals(&mut self) {
        for vertex in &mut self.vertices {
            vertex.normal = Vector3::zero();
        }
        for &[a, b, c] in &self.triangles {
            let pa = self.vertices[a].position;
            let pb = self.vertices[b].position;
            let pc = self.vertices[c].position;
            let normal = (pb - pa).cross(pc - pa).unit();
            for i in [a, b, c] {
                self.vertices[i].normal = self.vertices[i].normal + normal;
            }
        }
        for vertex in &mut self.vertices {
            vertex.normal = vertex.normal.unit();
        }
    }

    /// Centers the mesh over the origin on X/Z and drops it onto `y = 0`.
    pub fn center(&mut self) {
        if self.vertices.is_empty() {
            return;
        }
        let mut sum = Vector3::zero();
        let mut min_y = f64::INFINITY;
        for vertex in &self.vertices {
            sum = sum + vertex.position;
            min_y = min_y.min(vertex.position.y);
        }
        let n = self.vertices.len() as f64;
        let shift = Vector3::new(sum.x / n, min_y, sum.z / n);
        for vertex in &mut self.vertices {
            vertex.position = vertex.position - shift;
        }
    }

    /// Applies `matrix` to positions and its inverse-transpose to normals.
    pub fn transform(&mut self, matrix: &Matrix4) {
        let inverse_transpose = matrix.inverse().transpose();
        for vertex in &mut self.vertices {
            vertex.position = matrix.transform_point(vertex.position);
            vertex.normal = inverse_transpose.transform_vector(vertex.normal).unit();
        }
    }

    /// Axis-aligned bounds, or `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<(Vector3, Vector3)> {
        let first = self.vertices.first()?.position;
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (Vector3::min(min, v.position), Vector3::max(max, v.position))
        }))
    }

    /// Nearest triangle hit in front of `origin`.
    pub fn hit_test(&self, origin: Vector3, ray: Vector3) -> HitTest {
        let mut result = HitTest::none();
        for &[a, b, c] in &self.triangles {
            let hit = Raytracer::hit_test_triangle(
                origin,
                ray,
                self.vertices[a].position,
                self.vertices[b].position,
                self.vertices[c].position,
            );
            if let Some(hit) = hit {
                result.merge_with(&hit);
            }
        }
        result
    }
}

fn pick_octant(i: usize) -> Vector3 {
    Vector3::new(
        (i & 1) as f64 * 2.0 - 1.0,
        (i & 2) as f64 - 1.0,
        (i & 4) as f64 / 2.0 - 1.0,
    )
}

fn quantize(p: Vector3) -> (i64, i64, i64) {
    let q = |v: f64| (v * 1e9).round() as i64;
    (q(p.x), q(p.y), q(p.z))
}
