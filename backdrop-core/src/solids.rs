/// Wireframe solids that spin in place and bob up and down
use std::f32::consts::TAU;

use nalgebra::{Point3, Vector2};

use crate::color::Rgb;
use crate::geometry::Mesh;
use crate::transform::RotationState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolidKind {
    Icosahedron,
    Octahedron,
    Torus,
    Tetrahedron,
}

impl SolidKind {
    /// Build order of the backdrop
    pub const ALL: [SolidKind; 4] = [
        SolidKind::Icosahedron,
        SolidKind::Octahedron,
        SolidKind::Torus,
        SolidKind::Tetrahedron,
    ];

    pub fn mesh(self) -> Mesh {
        match self {
            SolidKind::Icosahedron => Mesh::icosahedron(3.0, 1),
            SolidKind::Octahedron => Mesh::octahedron(2.5),
            SolidKind::Torus => Mesh::torus(2.0, 0.6, 8, 16),
            SolidKind::Tetrahedron => Mesh::tetrahedron(2.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FloatingSolid {
    pub kind: SolidKind,
    pub mesh: Mesh,
    /// Cached `mesh.edges()`
    pub edges: Vec<(usize, usize)>,
    pub color: Rgb,
    pub base_position: Point3<f32>,
    pub position: Point3<f32>,
    pub rotation: RotationState,
    /// Radians added to (x, y) rotation every frame
    pub rotation_speed: Vector2<f32>,
    /// Phase of the bobbing sine, in [0, 2π)
    pub phase: f32,
}

impl FloatingSolid {
    pub fn new(
        kind: SolidKind,
        color: Rgb,
        base_position: Point3<f32>,
        rotation_speed: Vector2<f32>,
        phase: f32,
    ) -> Self {
        let mesh = kind.mesh();
        let edges = mesh.edges();
        Self {
            kind,
            mesh,
            edges,
            color,
            base_position,
            position: base_position,
            rotation: RotationState::zero(),
            rotation_speed,
            phase,
        }
    }

    /// Pick a rotation speed in `[min, min + jitter)` per axis and a phase in `[0, 2π)`
    pub fn random_motion(
        min_speed: Vector2<f32>,
        jitter: f32,
        rng: &mut fastrand::Rng,
    ) -> (Vector2<f32>, f32) {
        let speed = Vector2::new(
            min_speed.x + rng.f32() * jitter,
            min_speed.y + rng.f32() * jitter,
        );
        let phase = rng.f32() * TAU;
        // f32 rounding can land exactly on TAU
        (speed, if phase >= TAU { 0.0 } else { phase })
    }

    /// Spin by one frame's worth and place on the bobbing curve for `time` seconds
    pub fn update(&mut self, time: f32, amplitude: f32) {
        self.rotation.rotate(self.rotation_speed.x, self.rotation_speed.y, 0.0);
        self.position.y = bob_height(self.base_position.y, amplitude, time, self.phase);
    }
}

/// `base_y + amplitude * sin(time + phase)`
pub fn bob_height(base_y: f32, amplitude: f32, time: f32, phase: f32) -> f32 {
    base_y + amplitude * (time + phase).sin()
}
