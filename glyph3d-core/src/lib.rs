/// Glyph3D Core Library - letter solids, transforms and software rendering
///
/// This library holds everything that does not touch a terminal or a
/// browser: mesh generation for the letter shapes, the transform pipeline,
/// camera projection, shading, and the three render modes producing an RGBA
/// pixel buffer.

pub mod error;
pub mod framebuffer;
pub mod geometry;
pub mod glyph;
pub mod projection;
pub mod raster;
pub mod render;
pub mod scene;
pub mod settings;
pub mod shading;
pub mod solid;
pub mod transform;
pub mod viewer;

// Re-export commonly used types
pub use error::{Glyph3dError, Result};
pub use framebuffer::{Color, PixelBuffer};
pub use geometry::{Edge, Face, Mesh};
pub use glyph::{ShapeKind, ShapeParams};
pub use projection::{Camera, ScreenPoint, Viewport};
pub use render::{render_scene, FrameStats};
pub use scene::{Scene, SolidHandle};
pub use settings::{Config, RenderMode, RenderSettings, StepSettings};
pub use shading::{Light, LightingMethod};
pub use solid::Solid;
pub use transform::{Axis, RotationState, Transform};
pub use viewer::Viewer;
