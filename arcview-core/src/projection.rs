/// Viewport, frustum and projection utilities
use nalgebra::{Matrix4, Point3};

use crate::config::ProjectionConfig;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Window dimensions in pixels (or cells)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Zero dimensions are clamped to 1 so the aspect ratios stay finite
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect_width(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn aspect_height(&self) -> f32 {
        self.height as f32 / self.width as f32
    }

    /// Half extents for a fixed half extent on the shorter axis
    pub fn half_extents(&self, half: f32) -> (f32, f32) {
        if self.width <= self.height {
            (half, half * self.aspect_height())
        } else {
            (half * self.aspect_width(), half)
        }
    }
}

/// View volume parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub mode: ProjectionMode,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Frustum {
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        Self {
            mode: ProjectionMode::Orthographic,
            left,
            right,
            bottom,
            top,
            near,
            far,
        }
    }

    pub fn perspective(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        Self {
            mode: ProjectionMode::Perspective,
            left,
            right,
            bottom,
            top,
            near,
            far,
        }
    }

    /// Create the projection matrix
    pub fn matrix(&self) -> Matrix4<f32> {
        let (l, r, b, t, n, f) = (self.left, self.right, self.bottom, self.top, self.near, self.far);
        match self.mode {
            ProjectionMode::Orthographic => Matrix4::new_orthographic(l, r, b, t, n, f),
            ProjectionMode::Perspective => Matrix4::new(
                2.0 * n / (r - l), 0.0, (r + l) / (r - l), 0.0,
                0.0, 2.0 * n / (t - b), (t + b) / (t - b), 0.0,
                0.0, 0.0, -(f + n) / (f - n), -2.0 * f * n / (f - n),
                0.0, 0.0, -1.0, 0.0,
            ),
        }
    }
}

/// Keeps the frustum in step with the viewport and projection mode
#[derive(Debug, Clone)]
pub struct ProjectionController {
    viewport: Viewport,
    mode: ProjectionMode,
    config: ProjectionConfig,
    frustum: Frustum,
}

impl ProjectionController {
    pub fn new(width: u32, height: u32, mode: ProjectionMode, config: ProjectionConfig) -> Self {
        let viewport = Viewport::new(width, height);
        Self {
            viewport,
            mode,
            config,
            frustum: Self::derive(viewport, mode, &config),
        }
    }

    fn derive(viewport: Viewport, mode: ProjectionMode, config: &ProjectionConfig) -> Frustum {
        match mode {
            ProjectionMode::Orthographic => {
                let (w, h) = viewport.half_extents(config.ortho_half_extent);
                Frustum::orthographic(-w, w, -h, h, config.ortho_near, config.ortho_far)
            }
            ProjectionMode::Perspective => {
                let (w, h) = viewport.half_extents(config.perspective_half_extent);
                Frustum::perspective(-w, w, -h, h, config.perspective_near, config.perspective_far)
            }
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        self.frustum = Self::derive(self.viewport, self.mode, &self.config);
        log::debug!("Viewport resized to {}x{}", self.viewport.width, self.viewport.height);
    }

    /// Switch mode and re-derive the frustum from the current viewport
    pub fn set_mode(&mut self, mode: ProjectionMode) {
        self.mode = mode;
        self.frustum = Self::derive(self.viewport, self.mode, &self.config);
        log::debug!("Projection mode set to {:?}", mode);
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn current_frustum(&self) -> Frustum {
        self.frustum
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.frustum.matrix()
    }

    /// Identity for orthographic, a fixed look-at for perspective
    pub fn view_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Orthographic => Matrix4::identity(),
            ProjectionMode::Perspective => {
                Matrix4::look_at_rh(&self.config.eye, &Point3::origin(), &self.config.up)
            }
        }
    }
}

/// Project a point to screen space, returning `(x, y, depth)` with depth in
/// normalized device coordinates
pub fn project_to_screen(
    mvp: &Matrix4<f32>,
    point: &Point3<f32>,
    width: u32,
    height: u32,
) -> Option<(f32, f32, f32)> {
    let clip = mvp * point.to_homogeneous();

    // Prevent division by near-zero w
    if clip.w.abs() < 1e-6 {
        return None;
    }

    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    let depth = clip.z / clip.w;

    // Near/far clip test
    if !(-1.0..=1.0).contains(&depth) {
        return None;
    }

    // Convert to screen space
    let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

    Some((screen_x, screen_y, depth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn controller(width: u32, height: u32) -> ProjectionController {
        ProjectionController::new(width, height, ProjectionMode::Orthographic, ProjectionConfig::default())
    }

    #[test]
    fn test_landscape_scales_horizontal() {
        let frustum = controller(640, 480).current_frustum();
        assert_relative_eq!(frustum.right, 1.5 * 640.0 / 480.0);
        assert_relative_eq!(frustum.top, 1.5);
        assert_eq!(frustum.left, -frustum.right);
        assert_eq!(frustum.bottom, -frustum.top);
    }

    #[test]
    fn test_portrait_scales_vertical() {
        let frustum = controller(480, 640).current_frustum();
        assert_relative_eq!(frustum.right, 1.5);
        assert_relative_eq!(frustum.top, 1.5 * 640.0 / 480.0);
    }

    #[test]
    fn test_resize_round_trip_restores_frustum() {
        let mut projection = controller(640, 480);
        let original = projection.current_frustum();
        projection.resize(480, 640);
        assert_ne!(projection.current_frustum(), original);
        projection.resize(640, 480);
        assert_eq!(projection.current_frustum(), original);
    }

    #[test]
    fn test_mode_round_trip_is_bit_identical() {
        let mut projection = controller(800, 600);
        let ortho = projection.current_frustum();
        projection.set_mode(ProjectionMode::Perspective);
        let perspective = projection.current_frustum();
        assert_eq!(perspective.mode, ProjectionMode::Perspective);
        assert_eq!(perspective.near, 1.5);
        assert_eq!(perspective.far, 25.0);
        projection.set_mode(ProjectionMode::Orthographic);
        let again = projection.current_frustum();
        assert_eq!(again.left.to_bits(), ortho.left.to_bits());
        assert_eq!(again.right.to_bits(), ortho.right.to_bits());
        assert_eq!(again.bottom.to_bits(), ortho.bottom.to_bits());
        assert_eq!(again.top.to_bits(), ortho.top.to_bits());
        assert_eq!(again, ortho);
    }

    #[test]
    fn test_set_mode_uses_current_viewport() {
        let mut projection = controller(640, 480);
        projection.resize(300, 900);
        projection.set_mode(ProjectionMode::Perspective);
        let frustum = projection.current_frustum();
        assert_relative_eq!(frustum.right, 1.0);
        assert_relative_eq!(frustum.top, 3.0);
    }

    #[test]
    fn test_zero_size_is_clamped() {
        let mut projection = controller(640, 480);
        projection.resize(0, 0);
        assert_eq!(projection.viewport(), Viewport::new(1, 1));
        assert!(projection.current_frustum().right.is_finite());
    }

    #[test]
    fn test_perspective_matrix_maps_near_plane() {
        let frustum = Frustum::perspective(-1.0, 1.0, -1.0, 1.0, 1.5, 25.0);
        let m = frustum.matrix();
        let corner = m * Point3::new(1.0, 1.0, -1.5).to_homogeneous();
        assert_relative_eq!(corner.x / corner.w, 1.0, epsilon = 1e-6);
        assert_relative_eq!(corner.y / corner.w, 1.0, epsilon = 1e-6);
        assert_relative_eq!(corner.z / corner.w, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_view_matrix() {
        let mut projection = controller(800, 600);
        assert_eq!(projection.view_matrix(), Matrix4::identity());
        projection.set_mode(ProjectionMode::Perspective);
        let eye = projection.view_matrix().transform_point(&Point3::new(0.0, 1.0, 4.0));
        assert_relative_eq!(eye, Point3::origin(), epsilon = 1e-5);
    }

    #[test]
    fn test_project_to_screen_center() {
        let projection = controller(640, 480);
        let mvp = projection.projection_matrix();
        let (x, y, _) = project_to_screen(&mvp, &Point3::origin(), 640, 480).unwrap();
        assert_relative_eq!(x, 320.0);
        assert_relative_eq!(y, 240.0);
        assert!(project_to_screen(&mvp, &Point3::new(0.0, 0.0, 50.0), 640, 480).is_none());
    }
}
