/// Scene construction and animation constants
use nalgebra::{Point3, Vector2};

use crate::color::Rgb;

/// Everything the scene builder and frame update need that is fixed at startup.
///
/// `Default` reproduces the portfolio backdrop; tests and frontends may tweak
/// individual fields before building a [`Scene`](crate::scene::Scene).
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Camera distance from the origin along +Z
    pub camera_depth: f32,

    /// Upper bound on the number of particles
    pub particle_cap: usize,
    /// Particles per pixel of viewport width, before the cap applies
    pub particles_per_pixel: f32,
    /// Edge length of the cube the particles are scattered in, centered on the origin
    pub particle_spread: f32,
    /// Color at interpolation factor 1
    pub particle_color_a: Rgb,
    /// Color at interpolation factor 0
    pub particle_color_b: Rgb,
    pub particle_size: f32,
    pub particle_opacity: f32,
    /// Constant per-frame rotation added to the field (x, y)
    pub particle_drift: Vector2<f32>,
    /// Pointer offset (pixels) to radians per frame
    pub pointer_gain: f32,
    /// Fraction of the current field angle removed each frame
    pub rotation_damping: f32,

    /// Base positions of the four floating solids, in build order
    pub solid_positions: [Point3<f32>; 4],
    /// Even-indexed solids use the first color, odd-indexed the second
    pub solid_colors: [Rgb; 2],
    pub solid_opacity: f32,
    /// Minimum per-frame rotation speed (x, y); a random amount up to `solid_speed_jitter` is added
    pub solid_speed_min: Vector2<f32>,
    pub solid_speed_jitter: f32,
    /// Vertical bobbing amplitude in world units
    pub bob_amplitude: f32,

    /// Ceiling for the device pixel ratio used by the web canvas
    pub max_pixel_ratio: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            camera_depth: 30.0,

            particle_cap: 1500,
            particles_per_pixel: 0.8,
            particle_spread: 80.0,
            particle_color_a: Rgb::new(0.0, 0.83, 1.0),
            particle_color_b: Rgb::new(0.48, 0.38, 1.0),
            particle_size: 0.08,
            particle_opacity: 0.7,
            particle_drift: Vector2::new(0.0003, 0.0005),
            pointer_gain: 0.0001,
            rotation_damping: 0.01,

            solid_positions: [
                Point3::new(-15.0, 8.0, -10.0),
                Point3::new(18.0, -6.0, -15.0),
                Point3::new(-10.0, -12.0, -8.0),
                Point3::new(14.0, 10.0, -20.0),
            ],
            solid_colors: [Rgb::from_hex(0x00d4ff), Rgb::from_hex(0x7b61ff)],
            solid_opacity: 0.15,
            solid_speed_min: Vector2::new(0.002, 0.003),
            solid_speed_jitter: 0.005,
            bob_amplitude: 1.5,

            max_pixel_ratio: 2.0,
        }
    }
}

impl SceneConfig {
    /// Number of particles for a viewport of the given width
    pub fn particle_count(&self, width: u32) -> usize {
        let scaled = (width as f32 * self.particles_per_pixel).floor().max(0.0) as usize;
        scaled.min(self.particle_cap)
    }

    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }
}
