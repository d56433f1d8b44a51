/// A point bouncing inside a rectangular viewport
use nalgebra::{Point2, Vector2};

/// Position and velocity after a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointState {
    pub position: Vector2<f32>,
    pub velocity: Vector2<f32>,
}

/// Fraction of the velocity applied per tick
const STEP_SCALE: f32 = 0.1;

/// Length of the arrowhead strokes along the vector
const ARROW_LENGTH: f32 = 6.0;

#[derive(Debug, Clone)]
pub struct BounceSimulator {
    position: Vector2<f32>,
    velocity: Vector2<f32>,
    width: f32,
    height: f32,
}

impl BounceSimulator {
    pub fn new(position: Vector2<f32>, velocity: Vector2<f32>, width: u32, height: u32) -> Self {
        Self {
            position,
            velocity,
            width: width as f32,
            height: height as f32,
        }
    }

    /// Move the walls. A point left outside is pulled back onto the nearest wall.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width as f32;
        self.height = height as f32;

        let (half_w, half_h) = (self.width / 2.0, self.height / 2.0);
        self.position.x = self.position.x.clamp(-half_w, half_w);
        self.position.y = self.position.y.clamp(-half_h, half_h);
    }

    pub fn state(&self) -> PointState {
        PointState {
            position: self.position,
            velocity: self.velocity,
        }
    }

    /// Advance one tick and reflect off the first border crossed.
    ///
    /// Borders are checked left, right, top, bottom and only the first hit
    /// reflects, so a point past a corner bounces off one wall per tick.
    pub fn step(&mut self) -> PointState {
        self.position += STEP_SCALE * self.velocity;

        let (half_w, half_h) = (self.width / 2.0, self.height / 2.0);
        let normal = if self.position.x < -half_w {
            Some(Vector2::new(1.0, 0.0))
        } else if self.position.x > half_w {
            Some(Vector2::new(-1.0, 0.0))
        } else if self.position.y < -half_h {
            Some(Vector2::new(0.0, 1.0))
        } else if self.position.y > half_h {
            Some(Vector2::new(0.0, -1.0))
        } else {
            None
        };

        if let Some(n) = normal {
            self.velocity = mirror(&self.velocity, &n);
        }

        self.state()
    }

    /// The velocity as a line from the point, plus two arrowhead strokes
    pub fn vector_segments(&self, point_size: f32) -> Vec<(Point2<f32>, Point2<f32>)> {
        let start = Point2::from(self.position);
        let tip = Point2::from(self.position + self.velocity);
        let mut segments = vec![(start, tip)];

        if let Some(dir) = self.velocity.try_normalize(f32::EPSILON) {
            let perp = Vector2::new(-dir.y, dir.x);
            let base = tip - ARROW_LENGTH * dir;
            let spread = 3.0 * point_size / 2.0 * perp;
            segments.push((tip, base + spread));
            segments.push((tip, base - spread));
        }
        segments
    }
}

/// Reflect `v` off a plane with normal `n`. `n` need not be unit length.
pub fn mirror(v: &Vector2<f32>, n: &Vector2<f32>) -> Vector2<f32> {
    let n = n.normalize();
    let l = (-v).dot(&n);
    v + 2.0 * l * n
}
