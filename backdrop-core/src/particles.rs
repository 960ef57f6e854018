/// Randomly scattered point cloud that slowly turns and leans toward the pointer
use nalgebra::Point3;

use crate::color::Rgb;
use crate::config::SceneConfig;
use crate::input::PointerOffset;
use crate::transform::RotationState;

#[derive(Debug, Clone)]
pub struct ParticleField {
    /// Fixed after construction
    pub positions: Vec<Point3<f32>>,
    pub colors: Vec<Rgb>,
    /// Only `x` and `y` ever change
    pub rotation: RotationState,
}

impl ParticleField {
    /// Scatter `count` points uniformly in the config's cube, each colored at a
    /// random point between the two endpoint colors.
    pub fn generate(count: usize, config: &SceneConfig, rng: &mut fastrand::Rng) -> Self {
        let spread = config.particle_spread;
        let mut positions = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);

        for _ in 0..count {
            positions.push(Point3::new(
                (rng.f32() - 0.5) * spread,
                (rng.f32() - 0.5) * spread,
                (rng.f32() - 0.5) * spread,
            ));

            let t = rng.f32();
            colors.push(Rgb::lerp(config.particle_color_a, config.particle_color_b, t));
        }

        Self {
            positions,
            colors,
            rotation: RotationState::zero(),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// One frame of drift plus pointer lean.
    ///
    /// The damping pulls each angle toward `offset * gain / damping` by a fixed
    /// fraction per frame, independent of frame duration.
    pub fn update(&mut self, pointer: PointerOffset, config: &SceneConfig) {
        self.rotation.x += config.particle_drift.x;
        self.rotation.y += config.particle_drift.y;

        self.rotation.x += pointer_bias(pointer.dy, config) - self.rotation.x * config.rotation_damping;
        self.rotation.y += pointer_bias(pointer.dx, config) - self.rotation.y * config.rotation_damping;
    }
}

/// Pointer contribution to a field angle for one frame
pub fn pointer_bias(offset: f32, config: &SceneConfig) -> f32 {
    offset * config.pointer_gain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_within_cube() {
        let config = SceneConfig::default();
        let mut rng = fastrand::Rng::with_seed(7);
        let field = ParticleField::generate(1500, &config, &mut rng);

        assert_eq!(field.len(), 1500);
        assert_eq!(field.colors.len(), 1500);
        for p in &field.positions {
            for c in [p.x, p.y, p.z] {
                assert!((-40.0..=40.0).contains(&c));
            }
        }
    }

    #[test]
    fn test_colors_between_endpoints() {
        let config = SceneConfig::default();
        let mut rng = fastrand::Rng::with_seed(11);
        let field = ParticleField::generate(200, &config, &mut rng);

        for c in &field.colors {
            assert!(c.r >= 0.0 && c.r <= 0.48 + 1e-6);
            assert!(c.g >= 0.38 - 1e-6 && c.g <= 0.83 + 1e-6);
            assert!((c.b - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        let config = SceneConfig::default();
        let a = ParticleField::generate(64, &config, &mut fastrand::Rng::with_seed(3));
        let b = ParticleField::generate(64, &config, &mut fastrand::Rng::with_seed(3));
        assert_eq!(a.positions, b.positions);
        assert_eq!(a.colors, b.colors);
    }

    #[test]
    fn test_centered_pointer_has_no_bias() {
        let config = SceneConfig::default();
        assert_eq!(pointer_bias(0.0, &config), 0.0);

        let mut field = ParticleField::generate(0, &config, &mut fastrand::Rng::with_seed(1));
        field.update(PointerOffset::default(), &config);
        // drift, then damping of the drifted angle
        assert!((field.rotation.x - 0.000297).abs() < 1e-8);
        assert!((field.rotation.y - 0.000495).abs() < 1e-8);
    }

    #[test]
    fn test_lean_eases_toward_pointer() {
        let config = SceneConfig::default();
        let mut field = ParticleField::generate(0, &config, &mut fastrand::Rng::with_seed(1));
        let pointer = PointerOffset::new(400.0, -300.0);

        field.update(pointer, &config);
        // Roughly drift + gain * offset on the first frame
        assert!((field.rotation.y - 0.040495).abs() < 1e-6);
        assert!((field.rotation.x + 0.029703).abs() < 1e-6);

        // Settles where damping cancels drift and lean
        for _ in 0..5000 {
            field.update(pointer, &config);
        }
        assert!((field.rotation.y - 4.0495).abs() < 1e-3);
        assert!((field.rotation.x + 2.9703).abs() < 1e-3);
    }
}
