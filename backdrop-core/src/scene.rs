/// Scene construction: camera, particle field and floating solids
use log::debug;

use crate::config::SceneConfig;
use crate::particles::ParticleField;
use crate::projection::Camera;
use crate::solids::{FloatingSolid, SolidKind};
use crate::viewport::ViewportSize;

/// Everything drawn each frame. Built once per page and never torn down.
#[derive(Debug, Clone)]
pub struct Scene {
    pub config: SceneConfig,
    pub camera: Camera,
    pub viewport: ViewportSize,
    pub particles: ParticleField,
    pub solids: Vec<FloatingSolid>,
}

impl Scene {
    /// Build the backdrop for a viewport, drawing all randomness from `rng`
    pub fn build(viewport: ViewportSize, config: SceneConfig, rng: &mut fastrand::Rng) -> Self {
        let camera = Camera::perspective(&config, viewport);

        let count = config.particle_count(viewport.width);
        let particles = ParticleField::generate(count, &config, rng);

        let solids: Vec<FloatingSolid> = SolidKind::ALL
            .iter()
            .zip(config.solid_positions.iter())
            .enumerate()
            .map(|(i, (&kind, &position))| {
                let (speed, phase) =
                    FloatingSolid::random_motion(config.solid_speed_min, config.solid_speed_jitter, rng);
                FloatingSolid::new(kind, config.solid_colors[i % 2], position, speed, phase)
            })
            .collect();

        debug!(
            "built scene for {}x{}: {} particles, {} solids",
            viewport.width,
            viewport.height,
            particles.len(),
            solids.len()
        );

        Self {
            config,
            camera,
            viewport,
            particles,
            solids,
        }
    }

    /// Reproducible construction from a seed
    pub fn with_seed(viewport: ViewportSize, config: SceneConfig, seed: u64) -> Self {
        Self::build(viewport, config, &mut fastrand::Rng::with_seed(seed))
    }

    /// Point the camera at a new viewport. Calling twice with the same size changes nothing.
    pub fn resize(&mut self, viewport: ViewportSize) {
        self.viewport = viewport;
        self.camera.set_viewport(viewport);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_count_follows_viewport() {
        let scene = Scene::with_seed(ViewportSize::new(1000, 800), SceneConfig::default(), 1);
        assert_eq!(scene.particles.len(), 800);

        let wide = Scene::with_seed(ViewportSize::new(2560, 1440), SceneConfig::default(), 1);
        assert_eq!(wide.particles.len(), 1500);
    }

    #[test]
    fn test_four_solids_with_alternating_colors() {
        let config = SceneConfig::default();
        let scene = Scene::with_seed(ViewportSize::new(1280, 720), config.clone(), 5);

        assert_eq!(scene.solids.len(), 4);
        let kinds: Vec<SolidKind> = scene.solids.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, SolidKind::ALL.to_vec());

        for (i, solid) in scene.solids.iter().enumerate() {
            assert_eq!(solid.color, config.solid_colors[i % 2]);
            assert_eq!(solid.base_position, config.solid_positions[i]);
            assert_eq!(solid.position, solid.base_position);
        }
    }

    #[test]
    fn test_seeded_build_is_reproducible() {
        let viewport = ViewportSize::new(900, 600);
        let a = Scene::with_seed(viewport, SceneConfig::default(), 42);
        let b = Scene::with_seed(viewport, SceneConfig::default(), 42);
        let c = Scene::with_seed(viewport, SceneConfig::default(), 43);

        assert_eq!(a.particles.positions, b.particles.positions);
        for (sa, sb) in a.solids.iter().zip(&b.solids) {
            assert_eq!(sa.rotation_speed, sb.rotation_speed);
            assert_eq!(sa.phase, sb.phase);
        }
        assert_ne!(a.particles.positions, c.particles.positions);
    }

    #[test]
    fn test_resize_updates_camera() {
        let mut scene = Scene::with_seed(ViewportSize::new(1200, 800), SceneConfig::default(), 1);
        scene.resize(ViewportSize::new(600, 400));
        assert_eq!(scene.camera.aspect, 1.5);
        assert_eq!(scene.viewport, ViewportSize::new(600, 400));

        let projection = *scene.camera.projection_matrix();
        scene.resize(ViewportSize::new(600, 400));
        assert_eq!(*scene.camera.projection_matrix(), projection);
    }

    #[test]
    fn test_particle_count_does_not_change_on_resize() {
        let mut scene = Scene::with_seed(ViewportSize::new(1000, 800), SceneConfig::default(), 1);
        scene.resize(ViewportSize::new(300, 300));
        assert_eq!(scene.particles.len(), 800);
    }
}
