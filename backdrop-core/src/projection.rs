/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

use crate::config::SceneConfig;
use crate::viewport::ViewportSize;

/// Perspective camera looking down -Z at the origin.
///
/// The projection matrix is cached; call [`Camera::update_projection_matrix`]
/// after changing `fov`, `aspect`, `near` or `far` directly.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection: Matrix4<f32>,
}

impl Camera {
    pub fn perspective(config: &SceneConfig, viewport: ViewportSize) -> Self {
        let mut camera = Self {
            position: Point3::new(0.0, 0.0, config.camera_depth),
            target: Point3::origin(),
            up: Vector3::y(),
            fov: config.fov_radians(),
            aspect: viewport.aspect(),
            near: config.near,
            far: config.far,
            projection: Matrix4::identity(),
        };
        camera.update_projection_matrix();
        camera
    }

    /// Match the camera to a new viewport and rebuild the projection
    pub fn set_viewport(&mut self, viewport: ViewportSize) {
        self.aspect = viewport.aspect();
        self.update_projection_matrix();
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection = Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far);
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    pub fn projection_matrix(&self) -> &Matrix4<f32> {
        &self.projection
    }

    /// Combined projection * view
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection * self.view_matrix()
    }

    /// Project a model-space point to surface coordinates.
    ///
    /// Returns `(x, y, depth)` with `depth` in NDC `[-1, 1]`, or `None` when the
    /// point is behind the camera or outside the view volume.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        project_with(&(self.view_projection() * model_matrix), point, width, height)
    }
}

/// Project `point` through a precomputed model-view-projection matrix.
///
/// Renderers use this to avoid rebuilding the MVP for every vertex.
pub fn project_with(
    mvp: &Matrix4<f32>,
    point: &Point3<f32>,
    width: u32,
    height: u32,
) -> Option<(f32, f32, f32)> {
    let clip = mvp * point.to_homogeneous();

    // Behind the camera or degenerate
    if clip.w <= 1e-6 {
        return None;
    }

    let ndc = clip.xyz() / clip.w;
    if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || ndc.z.abs() > 1.0 {
        return None;
    }

    let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

    Some((screen_x, screen_y, ndc.z))
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(&SceneConfig::default(), ViewportSize::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::perspective(&SceneConfig::default(), ViewportSize::new(800, 600));
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 30.0));
        assert!((camera.fov - 75.0_f32.to_radians()).abs() < 1e-6);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
    }

    #[test]
    fn test_view_matrix() {
        let camera = Camera::default();
        let view = camera.view_matrix();
        // The origin sits 30 units in front of the camera
        let origin = view.transform_point(&Point3::origin());
        assert!((origin - Point3::new(0.0, 0.0, -30.0)).norm() < 1e-5);
    }

    #[test]
    fn test_set_viewport_recomputes_projection() {
        let mut camera = Camera::perspective(&SceneConfig::default(), ViewportSize::new(1200, 800));
        let before = *camera.projection_matrix();

        camera.set_viewport(ViewportSize::new(600, 400));
        assert_eq!(camera.aspect, 1.5);
        assert!((camera.projection_matrix() - before).norm() < 1e-6);

        camera.set_viewport(ViewportSize::new(400, 400));
        assert_eq!(camera.aspect, 1.0);
        assert!((camera.projection_matrix() - before).norm() > 1e-3);
    }

    #[test]
    fn test_origin_projects_to_center() {
        let camera = Camera::default();
        let (x, y, depth) = camera
            .project_to_screen(&Point3::origin(), &Matrix4::identity(), 800, 600)
            .unwrap();
        assert!((x - 400.0).abs() < 1e-3);
        assert!((y - 300.0).abs() < 1e-3);
        assert!(depth > -1.0 && depth < 1.0);
    }

    #[test]
    fn test_points_behind_camera_are_clipped() {
        let camera = Camera::default();
        let behind = Point3::new(0.0, 0.0, 40.0);
        assert!(camera
            .project_to_screen(&behind, &Matrix4::identity(), 800, 600)
            .is_none());
    }

    #[test]
    fn test_up_is_up_on_screen() {
        let camera = Camera::default();
        let (_, y, _) = camera
            .project_to_screen(&Point3::new(0.0, 5.0, 0.0), &Matrix4::identity(), 800, 600)
            .unwrap();
        assert!(y < 300.0);
    }
}
