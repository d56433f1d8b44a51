//! The viewer session owns all mutable viewer state.
//!
//! The window driver forwards input events and calls [`ViewerSession::tick`]
//! every loop iteration. Input is applied immediately, so the next produced
//! frame already reflects it.

use nalgebra::{Point2, Vector2};
use std::time::Duration;

use crate::bounce::BounceSimulator;
use crate::config::ViewerConfig;
use crate::geometry::Mesh;
use crate::input::{key_command, ButtonAction, Key, Modifiers, MouseButton, SessionCommand};
use crate::projection::{Frustum, ProjectionController};
use crate::render::{RenderCommand, RenderCommands};
use crate::style::{Rgba, RenderStyle};
use crate::trackball::Trackball;
use crate::transform::Transform;

/// Lifts the shadow plane just under the mesh so the two do not overlap
const SHADOW_OFFSET: f32 = 0.01;

#[derive(Debug)]
enum Content {
    Mesh { mesh: Mesh, uploaded: bool },
    Bounce { sim: BounceSimulator, show_vector: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    Idle,
    Rotate,
    Zoom,
    Pan,
}

#[derive(Debug)]
pub struct ViewerSession {
    config: ViewerConfig,
    content: Content,
    style: RenderStyle,
    projection: ProjectionController,
    trackball: Trackball,
    gesture: Gesture,
    cursor: Vector2<f32>,
    animation: bool,
    exit: bool,
    last_tick: Duration,
}

impl ViewerSession {
    /// A session viewing `mesh`
    pub fn new(mesh: Mesh, config: ViewerConfig) -> Self {
        Self::with_content(Content::Mesh { mesh, uploaded: false }, config)
    }

    /// The bouncing point demo
    pub fn bounce(config: ViewerConfig) -> Self {
        let sim = BounceSimulator::new(
            config.bounce.start,
            config.bounce.velocity,
            config.width,
            config.height,
        );
        Self::with_content(Content::Bounce { sim, show_vector: true }, config)
    }

    fn with_content(content: Content, config: ViewerConfig) -> Self {
        let style = RenderStyle::default();
        Self {
            projection: ProjectionController::new(config.width, config.height, style.projection, config.projection),
            trackball: Trackball::new(config.width, config.height, config.trackball),
            content,
            style,
            gesture: Gesture::Idle,
            cursor: Vector2::zeros(),
            animation: true,
            exit: false,
            last_tick: Duration::ZERO,
            config,
        }
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
        self.trackball.set_viewport(width, height);
        if let Content::Bounce { sim, .. } = &mut self.content {
            sim.resize(width, height);
        }
    }

    /// Press starts a gesture at the last known cursor position
    pub fn on_mouse_button(&mut self, button: MouseButton, action: ButtonAction) {
        log::trace!("Mouse {:?} {:?} at {:?}", button, action, self.cursor.as_slice());
        if !matches!(self.content, Content::Mesh { .. }) {
            return;
        }

        match action {
            ButtonAction::Press => {
                if self.trackball.is_dragging() {
                    self.trackball.end_drag();
                }
                self.gesture = match button {
                    MouseButton::Left => {
                        self.trackball.begin_drag(self.cursor.x, self.cursor.y);
                        Gesture::Rotate
                    }
                    MouseButton::Right => Gesture::Zoom,
                    MouseButton::Middle => Gesture::Pan,
                };
            }
            ButtonAction::Release => {
                if self.trackball.is_dragging() {
                    self.trackball.end_drag();
                }
                self.gesture = Gesture::Idle;
            }
        }
    }

    pub fn on_mouse_move(&mut self, x: f32, y: f32) {
        let position = Vector2::new(x, y);
        let delta = position - self.cursor;
        self.cursor = position;

        match self.gesture {
            Gesture::Idle => {}
            Gesture::Rotate => {
                self.trackball.on_drag(x, y);
            }
            Gesture::Zoom => self.trackball.zoom(delta.y),
            Gesture::Pan => self.trackball.pan(delta.x, delta.y),
        }
    }

    pub fn on_key(&mut self, key: Key, modifiers: Modifiers) {
        let Some(command) = key_command(key, modifiers) else {
            log::trace!("Unbound key {:?}", key);
            return;
        };
        log::debug!("Key {:?} -> {:?}", key, command);

        match command {
            SessionCommand::Quit => self.exit = true,
            SessionCommand::Style(style_command) => {
                if self.style.apply(style_command) {
                    self.projection.set_mode(self.style.projection);
                }
            }
            SessionCommand::ToggleAnimation => self.animation = !self.animation,
            SessionCommand::ToggleVector => {
                if let Content::Bounce { show_vector, .. } = &mut self.content {
                    *show_vector = !*show_vector;
                }
            }
        }
    }

    /// Advance and render when more than one frame interval has passed since
    /// the last tick. `now` is the time since the session started.
    pub fn tick(&mut self, now: Duration) -> Option<RenderCommands> {
        if now.saturating_sub(self.last_tick) <= self.config.frame_interval() {
            return None;
        }
        self.last_tick = now;

        if self.animation {
            if let Content::Bounce { sim, .. } = &mut self.content {
                sim.step();
            }
        }
        Some(self.render())
    }

    /// Build the commands for the current state
    pub fn render(&mut self) -> RenderCommands {
        let mut commands = RenderCommands::new();
        commands.push(RenderCommand::Clear(self.style.background));

        match &mut self.content {
            Content::Mesh { mesh, uploaded } => {
                commands.push(RenderCommand::SetProjection(self.projection.projection_matrix()));

                let normalize = mesh.normalize_matrix();
                if !*uploaded {
                    commands.push(RenderCommand::UploadMesh {
                        vertex_count: mesh.draw_buffer().vertex_count(),
                        normalize,
                    });
                    *uploaded = true;
                }

                let view = self.projection.view_matrix();
                let orientation = self.trackball.orientation();
                commands.push(RenderCommand::DrawMesh {
                    model_view: view * orientation.matrix() * normalize,
                    color: self.style.object,
                });

                if self.style.shadow {
                    let shadow = Transform::ground_shadow_matrix(
                        &self.config.light_position,
                        mesh.ground_height() - SHADOW_OFFSET,
                    );
                    commands.push(RenderCommand::DrawShadow {
                        model_view: view
                            * orientation.view_matrix()
                            * shadow
                            * orientation.rotation_matrix()
                            * normalize,
                        color: self.config.shadow_color,
                    });
                }
            }
            Content::Bounce { sim, show_vector } => {
                let viewport = self.projection.viewport();
                let (w, h) = (viewport.width as f32 / 2.0, viewport.height as f32 / 2.0);
                commands.push(RenderCommand::SetProjection(
                    Frustum::orthographic(-w, w, -h, h, -1.0, 1.0).matrix(),
                ));

                let state = sim.state();
                commands.push(RenderCommand::DrawPoint {
                    position: Point2::from(state.position),
                    size: self.config.bounce.point_size,
                    color: Rgba::BLUE,
                });
                if *show_vector {
                    commands.push(RenderCommand::DrawLines {
                        segments: sim.vector_segments(self.config.bounce.point_size),
                        color: Rgba::RED,
                    });
                }
            }
        }

        commands.push(RenderCommand::SwapBuffers);
        commands
    }

    pub fn exit_requested(&self) -> bool {
        self.exit
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn projection(&self) -> &ProjectionController {
        &self.projection
    }

    pub fn trackball(&self) -> &Trackball {
        &self.trackball
    }

    pub fn is_animating(&self) -> bool {
        self.animation
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.content {
            Content::Mesh { mesh, .. } => Some(mesh),
            Content::Bounce { .. } => None,
        }
    }

    pub fn bounce_state(&self) -> Option<crate::bounce::PointState> {
        match &self.content {
            Content::Bounce { sim, .. } => Some(sim.state()),
            Content::Mesh { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Face;
    use crate::projection::ProjectionMode;
    use crate::transform::CameraOrientation;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix4, Point3};

    const MS: Duration = Duration::from_millis(1);

    fn cube_session() -> ViewerSession {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(2.0, 0.0, 2.0),
            Point3::new(2.0, 2.0, 2.0),
            Point3::new(0.0, 2.0, 2.0),
        ];
        let faces = [
            [0, 3, 2, 1],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [3, 7, 6, 2],
            [0, 4, 7, 3],
            [1, 2, 6, 5],
        ]
        .iter()
        .map(|f| Face::from_vertices(f))
        .collect();
        let mesh = Mesh::new(vertices, Vec::new(), faces, 2.0).unwrap();
        ViewerSession::new(mesh, ViewerConfig::default())
    }

    fn draw_mesh(commands: &RenderCommands) -> Matrix4<f32> {
        commands
            .iter()
            .find_map(|c| match c {
                RenderCommand::DrawMesh { model_view, .. } => Some(*model_view),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_tick_waits_for_frame_interval() {
        let mut session = cube_session();
        assert!(session.tick(Duration::ZERO).is_none());
        assert!(session.tick(9 * MS).is_none());
        assert!(session.tick(11 * MS).is_some());
        assert!(session.tick(15 * MS).is_none());
        assert!(session.tick(22 * MS).is_some());
    }

    #[test]
    fn test_upload_precedes_first_draw_only() {
        let mut session = cube_session();
        let first = session.tick(11 * MS).unwrap();
        let upload = first
            .iter()
            .position(|c| matches!(c, RenderCommand::UploadMesh { .. }))
            .unwrap();
        let draw = first
            .iter()
            .position(|c| matches!(c, RenderCommand::DrawMesh { .. }))
            .unwrap();
        assert!(upload < draw);
        assert!(matches!(first.as_slice()[0], RenderCommand::Clear(_)));
        assert!(matches!(first.as_slice().last(), Some(RenderCommand::SwapBuffers)));

        let second = session.tick(22 * MS).unwrap();
        assert!(!second.iter().any(|c| matches!(c, RenderCommand::UploadMesh { .. })));
    }

    #[test]
    fn test_upload_carries_vertex_count() {
        let mut session = cube_session();
        let commands = session.render();
        let count = commands.iter().find_map(|c| match c {
            RenderCommand::UploadMesh { vertex_count, .. } => Some(*vertex_count),
            _ => None,
        });
        assert_eq!(count, Some(24));
    }

    #[test]
    fn test_projection_keys_switch_modes() {
        let mut session = cube_session();
        let ortho = session.projection().current_frustum();

        session.on_key(Key::Char('p'), Modifiers::NONE);
        assert_eq!(session.style().projection, ProjectionMode::Perspective);
        assert_eq!(session.projection().current_frustum().mode, ProjectionMode::Perspective);

        session.on_key(Key::Char('o'), Modifiers::NONE);
        assert_eq!(session.style().projection, ProjectionMode::Orthographic);
        assert_eq!(session.projection().current_frustum(), ortho);
    }

    #[test]
    fn test_color_keys() {
        let mut session = cube_session();
        session.on_key(Key::Char('b'), Modifiers::NONE);
        assert_eq!(session.style().background, Rgba::BLUE);
        assert_eq!(session.style().object, Rgba::SKY);

        session.on_key(Key::Char('S'), Modifiers::SHIFT);
        assert_eq!(session.style().object, Rgba::BLACK);
        assert_eq!(session.style().background, Rgba::BLUE);

        session.on_key(Key::Char('d'), Modifiers::NONE);
        assert_eq!(session.style().background, Rgba::WHITE);

        let commands = session.render();
        assert_eq!(commands.as_slice()[0], RenderCommand::Clear(Rgba::WHITE));
    }

    #[test]
    fn test_shadow_toggle_visible_next_tick() {
        let mut session = cube_session();
        let has_shadow = |c: &RenderCommands| c.iter().any(|c| matches!(c, RenderCommand::DrawShadow { .. }));

        assert!(!has_shadow(&session.tick(11 * MS).unwrap()));
        session.on_key(Key::Char('h'), Modifiers::NONE);
        assert!(has_shadow(&session.tick(22 * MS).unwrap()));
    }

    #[test]
    fn test_escape_sets_exit_flag() {
        let mut session = cube_session();
        assert!(!session.exit_requested());
        session.on_key(Key::Escape, Modifiers::NONE);
        assert!(session.exit_requested());
    }

    #[test]
    fn test_still_drag_emits_no_rotation() {
        let mut session = cube_session();
        let before = draw_mesh(&session.render());

        session.on_mouse_move(400.0, 200.0);
        session.on_mouse_button(MouseButton::Left, ButtonAction::Press);
        session.on_mouse_move(400.0, 200.0);
        session.on_mouse_move(400.0, 200.0);

        assert_eq!(session.trackball().angle(), 0.0);
        assert_eq!(*session.trackball().orientation(), CameraOrientation::identity());
        assert_eq!(draw_mesh(&session.render()), before);
    }

    #[test]
    fn test_left_drag_rotates_model() {
        let mut session = cube_session();
        let before = draw_mesh(&session.render());

        session.on_mouse_move(320.0, 240.0);
        session.on_mouse_button(MouseButton::Left, ButtonAction::Press);
        session.on_mouse_move(360.0, 240.0);
        session.on_mouse_button(MouseButton::Left, ButtonAction::Release);

        assert_eq!(session.trackball().angle(), 0.0);
        assert_ne!(draw_mesh(&session.render()), before);
    }

    #[test]
    fn test_right_drag_zooms_and_middle_pans() {
        let mut session = cube_session();
        session.on_mouse_move(100.0, 100.0);
        session.on_mouse_button(MouseButton::Right, ButtonAction::Press);
        session.on_mouse_move(100.0, 120.0);
        session.on_mouse_button(MouseButton::Right, ButtonAction::Release);
        assert_relative_eq!(session.trackball().orientation().zoom, 1.05, epsilon = 1e-6);

        session.on_mouse_button(MouseButton::Middle, ButtonAction::Press);
        session.on_mouse_move(164.0, 120.0);
        session.on_mouse_button(MouseButton::Middle, ButtonAction::Release);
        assert_relative_eq!(session.trackball().orientation().pan.x, 0.3, epsilon = 1e-6);

        // moves without a button do nothing
        session.on_mouse_move(500.0, 400.0);
        assert_relative_eq!(session.trackball().orientation().pan.x, 0.3, epsilon = 1e-6);
    }

    #[test]
    fn test_resize_updates_projection() {
        let mut session = cube_session();
        session.on_resize(480, 640);
        let frustum = session.projection().current_frustum();
        assert_relative_eq!(frustum.right, 1.5, epsilon = 1e-6);
        assert_relative_eq!(frustum.top, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_bounce_ticks_move_point() {
        let mut session = ViewerSession::bounce(ViewerConfig::default());
        assert!(session.mesh().is_none());

        let commands = session.tick(11 * MS).unwrap();
        let point = commands.iter().find_map(|c| match c {
            RenderCommand::DrawPoint { position, .. } => Some(*position),
            _ => None,
        });
        assert_eq!(point, Some(Point2::new(1.0, 1.0)));
        assert!(commands.iter().any(|c| matches!(c, RenderCommand::DrawLines { .. })));
    }

    #[test]
    fn test_bounce_toggles() {
        let mut session = ViewerSession::bounce(ViewerConfig::default());
        session.on_key(Key::Char('a'), Modifiers::NONE);
        session.on_key(Key::Char('v'), Modifiers::NONE);
        assert!(!session.is_animating());

        let commands = session.tick(11 * MS).unwrap();
        assert_eq!(session.bounce_state().unwrap().position, Vector2::zeros());
        assert!(!commands.iter().any(|c| matches!(c, RenderCommand::DrawLines { .. })));
    }

    #[test]
    fn test_bounce_recovers_after_shrinking() {
        let mut session = ViewerSession::bounce(ViewerConfig::default());
        for n in 1..=300u32 {
            session.tick(11 * MS * n).unwrap();
        }
        assert!(session.bounce_state().unwrap().position.x > 100.0);

        session.on_resize(200, 200);
        let mut inside = 0;
        for n in 301..=2300u32 {
            session.tick(11 * MS * n).unwrap();
            let position = session.bounce_state().unwrap().position;
            if position.x.abs() <= 100.0 && position.y.abs() <= 100.0 {
                inside += 1;
            }
        }
        assert!(inside > 1900, "only {inside} of 2000 ticks inside");
    }
}
