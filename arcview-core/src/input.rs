/// Input events from the window system and their key bindings
use crate::projection::ProjectionMode;
use crate::style::{Rgba, StyleCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Press,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Char(char),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false };
    pub const SHIFT: Modifiers = Modifiers { shift: true };
}

/// What a key press asks the session to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionCommand {
    Quit,
    Style(StyleCommand),
    ToggleAnimation,
    ToggleVector,
}

/// Map a key press to a command. Color keys set the background, or the
/// object color when shift is held.
pub fn key_command(key: Key, modifiers: Modifiers) -> Option<SessionCommand> {
    let c = match key {
        Key::Escape => return Some(SessionCommand::Quit),
        Key::Char(c) => c.to_ascii_lowercase(),
    };

    let color = match c {
        's' => Some(Rgba::BLACK),
        'w' => Some(Rgba::WHITE),
        'r' => Some(Rgba::RED),
        'g' => Some(Rgba::YELLOW),
        'b' => Some(Rgba::BLUE),
        _ => None,
    };
    if let Some(color) = color {
        let command = if modifiers.shift {
            StyleCommand::SetObjectColor(color)
        } else {
            StyleCommand::SetBackground(color)
        };
        return Some(SessionCommand::Style(command));
    }

    match c {
        'd' => Some(SessionCommand::Style(StyleCommand::ResetColors)),
        'h' => Some(SessionCommand::Style(StyleCommand::ToggleShadow)),
        'o' => Some(SessionCommand::Style(StyleCommand::SelectProjection(
            ProjectionMode::Orthographic,
        ))),
        'p' => Some(SessionCommand::Style(StyleCommand::SelectProjection(
            ProjectionMode::Perspective,
        ))),
        'a' => Some(SessionCommand::ToggleAnimation),
        'v' => Some(SessionCommand::ToggleVector),
        _ => None,
    }
}
