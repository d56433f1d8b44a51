/// Arcview Core Library - Mesh loading, camera control and frame production
///
/// This library holds everything a window driver needs to show a polygon
/// mesh: the OBJ loader, trackball and projection controllers, and the
/// session that turns input events into per-frame render commands.

pub mod bounce;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod obj;
pub mod projection;
pub mod render;
pub mod session;
pub mod style;
pub mod trackball;
pub mod transform;

// Re-export commonly used types
pub use bounce::{BounceSimulator, PointState};
pub use config::ViewerConfig;
pub use error::{Error, Result};
pub use geometry::{BoundingBox, DrawBuffer, Face, Mesh};
pub use input::{ButtonAction, Key, Modifiers, MouseButton};
pub use obj::MeshLoader;
pub use projection::{Frustum, ProjectionController, ProjectionMode};
pub use render::{RenderCommand, RenderCommands};
pub use session::ViewerSession;
pub use style::{RenderStyle, Rgba};
pub use trackball::Trackball;
pub use transform::{CameraOrientation, Transform};
