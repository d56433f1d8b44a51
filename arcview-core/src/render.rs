/// Per-frame draw commands handed to the window driver
use nalgebra::{Matrix4, Point2};

use crate::style::Rgba;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    Clear(Rgba),
    SetProjection(Matrix4<f32>),
    /// Bind the mesh draw buffer. Sent once, before the first draw.
    UploadMesh {
        vertex_count: usize,
        normalize: Matrix4<f32>,
    },
    DrawMesh {
        model_view: Matrix4<f32>,
        color: Rgba,
    },
    DrawShadow {
        model_view: Matrix4<f32>,
        color: Rgba,
    },
    DrawPoint {
        position: Point2<f32>,
        size: f32,
        color: Rgba,
    },
    DrawLines {
        segments: Vec<(Point2<f32>, Point2<f32>)>,
        color: Rgba,
    },
    SwapBuffers,
}

/// The ordered commands for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderCommands {
    commands: Vec<RenderCommand>,
}

impl RenderCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenderCommand> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn as_slice(&self) -> &[RenderCommand] {
        &self.commands
    }
}

impl<'a> IntoIterator for &'a RenderCommands {
    type Item = &'a RenderCommand;
    type IntoIter = std::slice::Iter<'a, RenderCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
