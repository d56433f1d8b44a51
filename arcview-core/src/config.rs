/// Tunable constants for the viewer
use nalgebra::{Point3, Vector2, Vector3};
use std::time::Duration;

use crate::style::Rgba;

/// Frustum parameters for both projection modes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionConfig {
    /// Half extent of the shorter viewport axis in orthographic mode
    pub ortho_half_extent: f32,
    pub ortho_near: f32,
    pub ortho_far: f32,
    /// Half extent of the shorter axis on the perspective near plane
    pub perspective_half_extent: f32,
    pub perspective_near: f32,
    pub perspective_far: f32,
    pub eye: Point3<f32>,
    /// Need not be unit length
    pub up: Vector3<f32>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            ortho_half_extent: 1.5,
            ortho_near: -10.0,
            ortho_far: 10.0,
            perspective_half_extent: 1.0,
            perspective_near: 1.5,
            perspective_far: 25.0,
            eye: Point3::new(0.0, 1.0, 4.0),
            up: Vector3::new(0.0, 2.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackballConfig {
    pub zoom_in: f32,
    pub zoom_out: f32,
    pub pan_scale: f32,
}

impl Default for TrackballConfig {
    fn default() -> Self {
        Self {
            zoom_in: 1.05,
            zoom_out: 0.95,
            pan_scale: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceConfig {
    pub start: Vector2<f32>,
    pub velocity: Vector2<f32>,
    pub point_size: f32,
}

impl Default for BounceConfig {
    fn default() -> Self {
        Self {
            start: Vector2::new(0.0, 0.0),
            velocity: Vector2::new(10.0, 10.0),
            point_size: 3.0,
        }
    }
}

/// Viewer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Simulation and render ticks per second
    pub frame_rate: f32,
    pub width: u32,
    pub height: u32,
    /// Length the longest bounding box edge is scaled to
    pub target_extent: f32,
    pub light_position: Point3<f32>,
    pub shadow_color: Rgba,
    pub projection: ProjectionConfig,
    pub trackball: TrackballConfig,
    pub bounce: BounceConfig,
}

impl ViewerConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.frame_rate.max(1.0))
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            frame_rate: 100.0,
            width: 640,
            height: 480,
            target_extent: 2.0,
            light_position: Point3::new(1.0, 5.0, 2.0),
            shadow_color: Rgba::SHADOW,
            projection: ProjectionConfig::default(),
            trackball: TrackballConfig::default(),
            bounce: BounceConfig::default(),
        }
    }
}
