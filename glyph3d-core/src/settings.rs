/// Render options and RON configuration files
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Glyph3dError, Result};
use crate::framebuffer::Color;
use crate::projection::Camera;
use crate::shading::Light;

/// Rendering strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderMode {
    #[default]
    Wireframe,
    DepthSort,
    ZBuffer,
}

impl RenderMode {
    pub const ALL: [RenderMode; 3] = [RenderMode::Wireframe, RenderMode::DepthSort, RenderMode::ZBuffer];

    /// The next mode in the cycle
    pub fn next(self) -> Self {
        match self {
            RenderMode::Wireframe => RenderMode::DepthSort,
            RenderMode::DepthSort => RenderMode::ZBuffer,
            RenderMode::ZBuffer => RenderMode::Wireframe,
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderMode::Wireframe => "wireframe",
            RenderMode::DepthSort => "depth-sort",
            RenderMode::ZBuffer => "z-buffer",
        };
        f.write_str(name)
    }
}

impl FromStr for RenderMode {
    type Err = Glyph3dError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "wireframe" => Ok(RenderMode::Wireframe),
            "depthsort" | "painter" => Ok(RenderMode::DepthSort),
            "zbuffer" => Ok(RenderMode::ZBuffer),
            _ => Err(Glyph3dError::UnknownName {
                kind: "render mode",
                name: s.to_string(),
            }),
        }
    }
}

/// Options consulted by every render call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub mode: RenderMode,
    pub fill_visible: bool,
    pub edges_visible: bool,
    /// Line width in pixels, at least 1
    pub edge_thickness: u32,
    /// Fill coverage, 255 is opaque
    pub fill_opacity: u8,
    pub edge_color: Color,
    pub background: Color,
    pub show_grid: bool,
    pub show_axes: bool,
    pub show_centers: bool,
    /// Grid spans `-grid_size..=grid_size` on X and Z
    pub grid_size: i32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            mode: RenderMode::Wireframe,
            fill_visible: true,
            edges_visible: true,
            edge_thickness: 1,
            fill_opacity: u8::MAX,
            edge_color: Color::WHITE,
            background: Color::BLACK,
            show_grid: true,
            show_axes: true,
            show_centers: true,
            grid_size: 10,
        }
    }
}

/// Increments used by the step-driven controls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepSettings {
    /// World units per move
    pub movement_step: f32,
    /// Degrees per rotation
    pub rotation_step: f32,
    /// Factor per scale step; shrinking uses its reciprocal
    pub scale_step: f32,
}

impl Default for StepSettings {
    fn default() -> Self {
        Self {
            movement_step: 0.5,
            rotation_step: 5.0,
            scale_step: 1.1,
        }
    }
}

/// Everything a front-end can load from disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub render: RenderSettings,
    pub light: Light,
    pub camera: Camera,
    pub steps: StepSettings,
}

impl Config {
    pub fn from_ron_str(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_mode_cycle_and_names() {
        let mut mode = RenderMode::default();
        for expected in [RenderMode::DepthSort, RenderMode::ZBuffer, RenderMode::Wireframe] {
            mode = mode.next();
            assert_eq!(mode, expected);
        }
        for mode in RenderMode::ALL {
            assert_eq!(mode.to_string().parse::<RenderMode>().unwrap(), mode);
        }
        assert_eq!("Z_Buffer".parse::<RenderMode>().unwrap(), RenderMode::ZBuffer);
        assert!("raytrace".parse::<RenderMode>().is_err());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_ron_str(
            "(render: (mode: ZBuffer, edge_thickness: 2, show_grid: false), steps: (rotation_step: 15.0))",
        )
        .unwrap();
        assert_eq!(config.render.mode, RenderMode::ZBuffer);
        assert_eq!(config.render.edge_thickness, 2);
        assert!(!config.render.show_grid);
        assert!(config.render.fill_visible);
        assert_eq!(config.steps.rotation_step, 15.0);
        assert_eq!(config.steps.movement_step, 0.5);
        assert_eq!(config.light, Light::default());
        assert_eq!(config.camera, Camera::default());
    }

    #[test]
    fn test_empty_config() {
        assert_eq!(Config::from_ron_str("()").unwrap(), Config::default());
    }

    #[test]
    fn test_malformed_config() {
        assert!(matches!(
            Config::from_ron_str("(render: (mode: Raytrace))"),
            Err(Glyph3dError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Config::load("/nonexistent/glyph3d.ron"),
            Err(Glyph3dError::Io(_))
        ));
    }
}
