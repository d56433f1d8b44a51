/// Render style: colors, shadow toggle and projection mode
use crate::projection::ProjectionMode;

/// An RGBA color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 0.0);
    pub const RED: Rgba = Rgba::new(1.0, 0.0, 0.0, 0.0);
    pub const YELLOW: Rgba = Rgba::new(1.0, 1.0, 0.0, 0.0);
    pub const BLUE: Rgba = Rgba::new(0.0, 0.0, 1.0, 0.0);
    pub const SKY: Rgba = Rgba::new(0.05, 0.6, 1.0, 1.0);
    pub const SHADOW: Rgba = Rgba::new(0.2, 0.2, 0.2, 1.0);

    /// Scale the RGB channels by `factor`, leaving alpha alone
    pub fn shade(&self, factor: f32) -> Rgba {
        let factor = factor.clamp(0.0, 1.0);
        Rgba::new(self.r * factor, self.g * factor, self.b * factor, self.a)
    }

    /// Convert to 8-bit RGB channels
    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (channel(self.r), channel(self.g), channel(self.b))
    }
}

/// A discrete change to the render style
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StyleCommand {
    SetBackground(Rgba),
    SetObjectColor(Rgba),
    ResetColors,
    ToggleShadow,
    SelectProjection(ProjectionMode),
}

/// Everything the render step reads each frame that keys can change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub background: Rgba,
    pub object: Rgba,
    pub shadow: bool,
    pub projection: ProjectionMode,
}

impl RenderStyle {
    pub const DEFAULT_BACKGROUND: Rgba = Rgba::WHITE;
    pub const DEFAULT_OBJECT: Rgba = Rgba::SKY;

    /// Apply a command. Returns true when the projection mode changed.
    pub fn apply(&mut self, command: StyleCommand) -> bool {
        match command {
            StyleCommand::SetBackground(color) => self.background = color,
            StyleCommand::SetObjectColor(color) => self.object = color,
            StyleCommand::ResetColors => {
                self.background = Self::DEFAULT_BACKGROUND;
                self.object = Self::DEFAULT_OBJECT;
            }
            StyleCommand::ToggleShadow => self.shadow = !self.shadow,
            StyleCommand::SelectProjection(mode) => {
                if self.projection == mode {
                    return false;
                }
                self.projection = mode;
                return true;
            }
        }
        false
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: Self::DEFAULT_BACKGROUND,
            object: Self::DEFAULT_OBJECT,
            shadow: false,
            projection: ProjectionMode::Orthographic,
        }
    }
}
