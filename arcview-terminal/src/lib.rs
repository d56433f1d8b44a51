/// Terminal window driver for the arcview session
use arcview_core::{ButtonAction, Key, Mesh, Modifiers, MouseButton, ProjectionMode, RenderCommands, ViewerSession};
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod cli;
pub mod renderer;

pub use renderer::AsciiRenderer;

/// Terminal cells are about twice as tall as they are wide
const CELL_ASPECT: u16 = 2;

/// Main application struct for terminal viewing
pub struct TerminalApp {
    session: ViewerSession,
    renderer: AsciiRenderer,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(mut session: ViewerSession) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let (w, h) = viewport_size(width, height);
        session.on_resize(w, h);

        Ok(Self {
            session,
            renderer: AsciiRenderer::new(width as usize, height as usize),
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        let result = execute!(stdout(), terminal::EnterAlternateScreen, EnableMouseCapture, cursor::Hide)
            .and_then(|_| self.main_loop());

        // Cleanup runs even when setup failed part way
        let restored = restore_terminal(&mut stdout());
        result.and(restored)
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let start = Instant::now();

        while !self.session.exit_requested() {
            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event);
            }

            let Some(commands) = self.session.tick(start.elapsed()) else {
                std::thread::sleep(Duration::from_millis(1));
                continue;
            };
            self.render(&commands)?;

            // Update FPS counter
            self.frame_count += 1;
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                log::debug!("{:.1} frames per second", self.fps);
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        log::info!("Exit requested");
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => {
                if let Some((key, modifiers)) = translate_key(&key) {
                    self.session.on_key(key, modifiers);
                }
            }
            Event::Mouse(mouse) => self.handle_mouse(&mouse),
            Event::Resize(width, height) => {
                let (w, h) = viewport_size(width, height);
                self.session.on_resize(w, h);
                self.renderer.resize(width as usize, height as usize);
                log::debug!("Resized to {}x{} cells", width, height);
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        let (x, y) = cell_to_viewport(mouse.column, mouse.row);
        self.session.on_mouse_move(x, y);

        match mouse.kind {
            MouseEventKind::Down(button) => self.session.on_mouse_button(translate_button(button), ButtonAction::Press),
            MouseEventKind::Up(button) => self.session.on_mouse_button(translate_button(button), ButtonAction::Release),
            _ => {}
        }
    }

    fn render(&mut self, commands: &RenderCommands) -> io::Result<()> {
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        let buffer = self.session.mesh().map(Mesh::draw_buffer);
        self.renderer.execute(commands, buffer, &mut stdout)?;

        let mode = match self.session.style().projection {
            ProjectionMode::Orthographic => "ortho",
            ProjectionMode::Perspective => "persp",
        };
        let controls = if self.session.mesh().is_some() {
            "Drag: L=Rotate R=Zoom M=Pan | O/P=Projection H=Shadow S/W/R/G/B=Color D=Default"
        } else {
            "A=Animate V=Vector"
        };

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!("Arcview | FPS: {:.1} | {} | {} | Esc/Q=Quit", self.fps, mode, controls)),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Leave raw mode and undo the screen setup. Raw mode is released even when
/// writing the escape sequences fails.
pub fn restore_terminal<W: Write>(writer: &mut W) -> io::Result<()> {
    let raw = terminal::disable_raw_mode();
    let screen = execute!(writer, DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show);
    raw.and(screen)
}

/// Viewport size in square units for a terminal of `columns` x `rows` cells
pub fn viewport_size(columns: u16, rows: u16) -> (u32, u32) {
    (columns as u32, rows as u32 * CELL_ASPECT as u32)
}

/// Cell position to viewport coordinates, at the cell center
pub fn cell_to_viewport(column: u16, row: u16) -> (f32, f32) {
    (
        column as f32 + 0.5,
        (row as f32 + 0.5) * CELL_ASPECT as f32,
    )
}

/// Key presses only; `q` and ctrl-c quit like Esc
pub fn translate_key(event: &KeyEvent) -> Option<(Key, Modifiers)> {
    if event.kind != KeyEventKind::Press {
        return None;
    }

    match event.code {
        KeyCode::Esc | KeyCode::Char('q') => Some((Key::Escape, Modifiers::NONE)),
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => Some((Key::Escape, Modifiers::NONE)),
        KeyCode::Char(c) => {
            let shift = event.modifiers.contains(KeyModifiers::SHIFT) || c.is_ascii_uppercase();
            Some((Key::Char(c), Modifiers { shift }))
        }
        _ => None,
    }
}

fn translate_button(button: event::MouseButton) -> MouseButton {
    match button {
        event::MouseButton::Left => MouseButton::Left,
        event::MouseButton::Right => MouseButton::Right,
        event::MouseButton::Middle => MouseButton::Middle,
    }
}
