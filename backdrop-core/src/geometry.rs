/// Geometry primitives for the floating wireframe solids
use std::collections::{BTreeSet, HashMap};
use std::f32::consts::TAU;

use nalgebra::{Point3, Vector3};

/// An indexed triangle mesh
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Point3<f32>>,
    pub faces: Vec<[usize; 3]>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            faces: Vec::with_capacity(faces),
        }
    }

    pub fn add_vertex(&mut self, position: Point3<f32>) -> usize {
        self.vertices.push(position);
        self.vertices.len() - 1
    }

    pub fn add_face(&mut self, a: usize, b: usize, c: usize) {
        self.faces.push([a, b, c]);
    }

    /// Unique undirected edges, i.e. what a wireframe draws.
    ///
    /// Each pair is ordered `(low, high)` and the list is sorted.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges = BTreeSet::new();
        for &[a, b, c] in &self.faces {
            for (i, j) in [(a, b), (b, c), (c, a)] {
                edges.insert((i.min(j), i.max(j)));
            }
        }
        edges.into_iter().collect()
    }

    /// Regular icosahedron, subdivided `detail` times with every new vertex
    /// pushed back onto the circumscribed sphere.
    pub fn icosahedron(radius: f32, detail: u32) -> Self {
        let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
        let vertices = [
            [-1.0, t, 0.0],
            [1.0, t, 0.0],
            [-1.0, -t, 0.0],
            [1.0, -t, 0.0],
            [0.0, -1.0, t],
            [0.0, 1.0, t],
            [0.0, -1.0, -t],
            [0.0, 1.0, -t],
            [t, 0.0, -1.0],
            [t, 0.0, 1.0],
            [-t, 0.0, -1.0],
            [-t, 0.0, 1.0],
        ];
        let faces = [
            [0, 11, 5],
            [0, 5, 1],
            [0, 1, 7],
            [0, 7, 10],
            [0, 10, 11],
            [1, 5, 9],
            [5, 11, 4],
            [11, 10, 2],
            [10, 7, 6],
            [7, 1, 8],
            [3, 9, 4],
            [3, 4, 2],
            [3, 2, 6],
            [3, 6, 8],
            [3, 8, 9],
            [4, 9, 5],
            [2, 4, 11],
            [6, 2, 10],
            [8, 6, 7],
            [9, 8, 1],
        ];
        Self::polyhedron(&vertices, &faces, radius, detail)
    }

    pub fn octahedron(radius: f32) -> Self {
        let vertices = [
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0],
        ];
        let faces = [
            [0, 2, 4],
            [0, 4, 3],
            [0, 3, 5],
            [0, 5, 2],
            [1, 2, 5],
            [1, 5, 3],
            [1, 3, 4],
            [1, 4, 2],
        ];
        Self::polyhedron(&vertices, &faces, radius, 0)
    }

    pub fn tetrahedron(radius: f32) -> Self {
        let vertices = [
            [1.0, 1.0, 1.0],
            [-1.0, -1.0, 1.0],
            [-1.0, 1.0, -1.0],
            [1.0, -1.0, -1.0],
        ];
        let faces = [[2, 1, 0], [0, 3, 2], [1, 3, 0], [2, 3, 1]];
        Self::polyhedron(&vertices, &faces, radius, 0)
    }

    /// Torus in the XY plane. `radius` is the distance from the center to the
    /// middle of the tube, `tube` the tube radius.
    pub fn torus(radius: f32, tube: f32, radial_segments: usize, tubular_segments: usize) -> Self {
        let radial = radial_segments.max(3);
        let tubular = tubular_segments.max(3);
        let mut mesh = Self::with_capacity(radial * tubular, radial * tubular * 2);

        for j in 0..radial {
            let v = j as f32 / radial as f32 * TAU;
            for i in 0..tubular {
                let u = i as f32 / tubular as f32 * TAU;
                let ring = radius + tube * v.cos();
                mesh.add_vertex(Point3::new(ring * u.cos(), ring * u.sin(), tube * v.sin()));
            }
        }

        let index = |j: usize, i: usize| (j % radial) * tubular + (i % tubular);
        for j in 0..radial {
            for i in 0..tubular {
                let a = index(j + 1, i);
                let b = index(j, i);
                let c = index(j, i + 1);
                let d = index(j + 1, i + 1);
                mesh.add_face(a, b, d);
                mesh.add_face(b, c, d);
            }
        }

        mesh
    }

    fn polyhedron(vertices: &[[f32; 3]], faces: &[[usize; 3]], radius: f32, detail: u32) -> Self {
        let mut mesh = Self::with_capacity(vertices.len(), faces.len());
        for v in vertices {
            let unit = Vector3::new(v[0], v[1], v[2]).normalize();
            mesh.add_vertex(Point3::from(unit * radius));
        }
        mesh.faces.extend_from_slice(faces);

        for _ in 0..detail {
            mesh.subdivide(radius);
        }
        mesh
    }

    /// Split every face into four, projecting midpoints onto the sphere of `radius`
    fn subdivide(&mut self, radius: f32) {
        let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
        let faces = std::mem::take(&mut self.faces);
        self.faces.reserve(faces.len() * 4);

        for [a, b, c] in faces {
            let ab = self.midpoint(&mut midpoints, a, b, radius);
            let bc = self.midpoint(&mut midpoints, b, c, radius);
            let ca = self.midpoint(&mut midpoints, c, a, radius);
            self.add_face(a, ab, ca);
            self.add_face(ab, b, bc);
            self.add_face(ca, bc, c);
            self.add_face(ab, bc, ca);
        }
    }

    /// Shared midpoint vertex of edge `a`-`b`
    fn midpoint(
        &mut self,
        cache: &mut HashMap<(usize, usize), usize>,
        a: usize,
        b: usize,
        radius: f32,
    ) -> usize {
        let key = (a.min(b), a.max(b));
        if let Some(&index) = cache.get(&key) {
            return index;
        }
        let mid = (self.vertices[a].coords + self.vertices[b].coords) * 0.5;
        let index = self.add_vertex(Point3::from(mid.normalize() * radius));
        cache.insert(key, index);
        index
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}
