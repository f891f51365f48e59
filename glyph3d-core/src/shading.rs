/// Per-face visibility, depth keys and lighting
use std::fmt;
use std::str::FromStr;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::{Glyph3dError, Result};
use crate::framebuffer::Color;
use crate::geometry::Face;
use crate::glyph::ShapeKind;
use crate::projection::Camera;
use crate::solid::Solid;

/// Lighting method label
///
/// All three currently shade a whole face with one color computed from the
/// face normal; per-vertex and per-pixel interpolation are not implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LightingMethod {
    #[default]
    Flat,
    Gouraud,
    Phong,
}

impl LightingMethod {
    pub fn next(self) -> Self {
        match self {
            LightingMethod::Flat => LightingMethod::Gouraud,
            LightingMethod::Gouraud => LightingMethod::Phong,
            LightingMethod::Phong => LightingMethod::Flat,
        }
    }
}

impl fmt::Display for LightingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LightingMethod::Flat => "flat",
            LightingMethod::Gouraud => "gouraud",
            LightingMethod::Phong => "phong",
        };
        f.write_str(name)
    }
}

impl FromStr for LightingMethod {
    type Err = Glyph3dError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(LightingMethod::Flat),
            "gouraud" => Ok(LightingMethod::Gouraud),
            "phong" => Ok(LightingMethod::Phong),
            _ => Err(Glyph3dError::UnknownName {
                kind: "lighting method",
                name: s.to_string(),
            }),
        }
    }
}

/// A movable point light with ambient and diffuse terms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Light {
    pub position: Point3<f32>,
    pub enabled: bool,
    pub method: LightingMethod,
    pub ambient: f32,
    pub diffuse: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Point3::new(5.0, -5.0, -10.0),
            enabled: true,
            method: LightingMethod::Flat,
            ambient: 0.3,
            diffuse: 0.7,
        }
    }
}

/// Unlit material color of a shape kind
pub fn material_color(kind: ShapeKind) -> Color {
    match kind {
        ShapeKind::CurvedLetter => Color::new(230, 120, 60),
        ShapeKind::RectilinearLetter => Color::new(70, 160, 230),
    }
}

/// Mean view-space Z of a face; larger is farther
pub fn face_depth(face: &Face, solid: &Solid, camera: &Camera) -> f32 {
    let mut sum = 0.0;
    for p in solid.face_world_points(face) {
        sum += camera.to_view(&p).z;
    }
    sum / face.len().max(1) as f32
}

/// Whether a face points toward the camera position
pub fn is_face_visible(face: &Face, solid: &Solid, camera: &Camera) -> bool {
    let centroid = solid.face_world_centroid(face);
    let Some(to_camera) = (camera.world_position() - centroid).try_normalize(f32::EPSILON) else {
        return false;
    };
    solid.face_world_normal(face).dot(&to_camera) > 0.0
}

/// Lit color of a face: `ambient + diffuse * max(0, n·l)` times the material color
pub fn face_color(face: &Face, solid: &Solid, light: &Light) -> Color {
    let base = material_color(solid.kind());
    if !light.enabled {
        return base;
    }
    let intensity = match light.method {
        LightingMethod::Flat | LightingMethod::Gouraud | LightingMethod::Phong => {
            flat_intensity(face, solid, light)
        }
    };
    base.shade(intensity)
}

fn flat_intensity(face: &Face, solid: &Solid, light: &Light) -> f32 {
    let centroid = solid.face_world_centroid(face);
    let lambert = (light.position - centroid)
        .try_normalize(f32::EPSILON)
        .map_or(0.0, |to_light| solid.face_world_normal(face).dot(&to_light).max(0.0));
    light.ambient + light.diffuse * lambert
}
