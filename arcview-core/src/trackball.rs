//! Arcball rotation plus zoom and pan gestures.
//!
//! Cursor positions are projected onto a virtual hemisphere centered in the
//! viewport. Dragging rotates the camera by the arc between the previous and
//! the current projected point, so consecutive samples compose.

use nalgebra::{Unit, Vector2, Vector3};

use crate::config::TrackballConfig;
use crate::transform::CameraOrientation;

/// Below this, an angle or axis length counts as no motion
const MIN_ROTATION: f32 = 1e-6;

/// The rotation produced by one drag sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragRotation {
    pub angle: f32,
    pub axis: Vector3<f32>,
}

impl DragRotation {
    pub fn none() -> Self {
        Self {
            angle: 0.0,
            axis: Vector3::zeros(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.angle <= MIN_ROTATION || self.axis.norm() <= MIN_ROTATION
    }
}

#[derive(Debug, Clone)]
pub struct Trackball {
    width: f32,
    height: f32,
    config: TrackballConfig,
    reference: Option<Vector3<f32>>,
    angle: f32,
    orientation: CameraOrientation,
}

impl Trackball {
    pub fn new(width: u32, height: u32, config: TrackballConfig) -> Self {
        Self {
            width: width.max(1) as f32,
            height: height.max(1) as f32,
            config,
            reference: None,
            angle: 0.0,
            orientation: CameraOrientation::identity(),
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.width = width.max(1) as f32;
        self.height = height.max(1) as f32;
    }

    /// Radius of the virtual sphere used for drags
    pub fn radius(&self) -> f32 {
        self.width.min(self.height) / 2.0
    }

    /// Map a cursor position to a unit vector on the hemisphere. Points
    /// outside the circle of `radius` land on its equator.
    pub fn project_on_sphere(&self, x: f32, y: f32, radius: f32) -> Vector3<f32> {
        let x = x - self.width / 2.0;
        let y = self.height / 2.0 - y;
        let r2 = radius * radius;
        let a = r2.min(x * x + y * y);
        let z = (r2 - a).sqrt();
        Vector3::new(x, y, z).normalize()
    }

    pub fn is_dragging(&self) -> bool {
        self.reference.is_some()
    }

    pub fn begin_drag(&mut self, x: f32, y: f32) {
        self.reference = Some(self.project_on_sphere(x, y, self.radius()));
        self.angle = 0.0;
    }

    /// Rotate by the arc from the last sample to `(x, y)`. Returns a zero
    /// rotation, and leaves the orientation alone, when nothing moved.
    pub fn on_drag(&mut self, x: f32, y: f32) -> DragRotation {
        let Some(reference) = self.reference else {
            return DragRotation::none();
        };

        let current = self.project_on_sphere(x, y, self.radius());
        let rotation = DragRotation {
            angle: reference.dot(&current).clamp(-1.0, 1.0).acos(),
            axis: reference.cross(&current),
        };

        if rotation.is_degenerate() {
            self.angle = 0.0;
            return DragRotation::none();
        }

        let axis = Unit::new_normalize(rotation.axis);
        self.orientation.rotate(&axis, rotation.angle);
        self.reference = Some(current);
        self.angle = rotation.angle;
        log::trace!("Trackball rotated {:.4} rad about {:?}", rotation.angle, axis.as_slice());
        rotation
    }

    pub fn end_drag(&mut self) {
        self.reference = None;
        self.angle = 0.0;
    }

    /// Angle of the most recent drag sample
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Zoom from a vertical cursor delta; only its sign matters
    pub fn zoom(&mut self, delta_y: f32) {
        if delta_y < 0.0 {
            self.orientation.scale(self.config.zoom_out);
        } else if delta_y > 0.0 {
            self.orientation.scale(self.config.zoom_in);
        }
    }

    /// Pan proportionally to the cursor delta relative to the viewport
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let offset = Vector2::new(dx / self.width, -dy / self.height) * self.config.pan_scale;
        self.orientation.translate(offset);
    }

    pub fn orientation(&self) -> &CameraOrientation {
        &self.orientation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn trackball() -> Trackball {
        Trackball::new(640, 480, TrackballConfig::default())
    }

    #[test]
    fn test_projection_is_unit_length() {
        let tb = trackball();
        let coords = [-1.0e6, -640.0, -1.0, 0.0, 0.5, 100.0, 320.0, 479.0, 640.0, 1.0e6];
        for &x in &coords {
            for &y in &coords {
                for radius in [0.001, 1.0, tb.radius(), 1.0e4] {
                    let v = tb.project_on_sphere(x, y, radius);
                    assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-5);
                }
            }
        }
    }

    #[test]
    fn test_center_projects_to_pole() {
        let tb = trackball();
        let v = tb.project_on_sphere(320.0, 240.0, tb.radius());
        assert_relative_eq!(v, Vector3::z(), epsilon = 1e-6);
    }

    #[test]
    fn test_outside_circle_lands_on_equator() {
        let tb = trackball();
        let v = tb.project_on_sphere(10_000.0, 240.0, tb.radius());
        assert_relative_eq!(v, Vector3::x(), epsilon = 1e-6);
    }

    #[test]
    fn test_identical_positions_do_not_rotate() {
        let mut tb = trackball();
        tb.begin_drag(400.0, 200.0);
        let first = tb.on_drag(400.0, 200.0);
        let second = tb.on_drag(400.0, 200.0);
        assert_eq!(first.angle, 0.0);
        assert_eq!(second.angle, 0.0);
        assert_eq!(second.axis, Vector3::zeros());
        assert!(second.is_degenerate());
        assert_eq!(tb.angle(), 0.0);
        assert_eq!(*tb.orientation(), CameraOrientation::identity());
    }

    #[test]
    fn test_horizontal_drag_rotates_about_y() {
        let mut tb = trackball();
        tb.begin_drag(320.0, 240.0);
        let rotation = tb.on_drag(380.0, 240.0);
        assert!(rotation.angle > 0.0);
        let axis = rotation.axis.normalize();
        assert_relative_eq!(axis, Vector3::y(), epsilon = 1e-6);
    }

    #[test]
    fn test_drags_compose_incrementally() {
        let mut split = trackball();
        split.begin_drag(320.0, 240.0);
        split.on_drag(350.0, 240.0);
        split.on_drag(380.0, 240.0);
        split.end_drag();

        let mut single = trackball();
        single.begin_drag(320.0, 240.0);
        single.on_drag(380.0, 240.0);
        single.end_drag();

        // same great circle, so the pieces add up to the whole arc
        assert_relative_eq!(
            split.orientation().rotation.angle(),
            single.orientation().rotation.angle(),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_end_drag_keeps_orientation() {
        let mut tb = trackball();
        tb.begin_drag(320.0, 240.0);
        tb.on_drag(300.0, 260.0);
        let orientation = *tb.orientation();
        tb.end_drag();
        assert_eq!(tb.angle(), 0.0);
        assert!(!tb.is_dragging());
        assert_eq!(*tb.orientation(), orientation);
        assert_eq!(tb.on_drag(100.0, 100.0), DragRotation::none());
    }

    #[test]
    fn test_zoom_direction() {
        let mut tb = trackball();
        tb.zoom(-3.0);
        assert_relative_eq!(tb.orientation().zoom, 0.95);
        tb.zoom(0.0);
        assert_relative_eq!(tb.orientation().zoom, 0.95);
        tb.zoom(12.0);
        assert_relative_eq!(tb.orientation().zoom, 0.95 * 1.05);
    }

    #[test]
    fn test_pan_normalized_by_viewport() {
        let mut tb = trackball();
        tb.pan(64.0, 48.0);
        assert_relative_eq!(tb.orientation().pan, Vector2::new(0.3, -0.3), epsilon = 1e-6);
    }
}
