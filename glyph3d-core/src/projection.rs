/// Camera and projection utilities
use nalgebra::{Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, Result};

/// Distance from the projection center to the focal plane
pub const FOCAL_LENGTH: f32 = 500.0;

/// Degrees of camera orbit per pixel of pointer drag
pub const ORBIT_DEGREES_PER_PIXEL: f32 = 0.5;

/// Per-unit zoom growth for wheel input
pub const WHEEL_ZOOM_BASE: f32 = 1.001;

/// Pixel dimensions of the render surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A projected point: pixel coordinates plus the view-space depth
///
/// Smaller depth is nearer to the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32, depth: f32) -> Self {
        Self { x, y, depth }
    }
}

/// Camera configuration for 3D rendering
///
/// Angles are in degrees. Roll is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub position: Point3<f32>,
    /// Rotation about the global X axis
    pub pitch: f32,
    /// Rotation about the global Y axis
    pub yaw: f32,
    /// Pixels per world unit at the focal plane
    pub zoom: f32,
    pub focal_length: f32,
}

impl Camera {
    pub fn new(position: Point3<f32>, pitch: f32, yaw: f32, zoom: f32) -> Result<Self> {
        Ok(Self {
            position,
            pitch,
            yaw,
            zoom: ensure_positive("zoom", zoom)?,
            focal_length: FOCAL_LENGTH,
        })
    }

    /// Rotation taking world coordinates to view coordinates: yaw, then pitch
    pub fn view_rotation(&self) -> Rotation3<f32> {
        let yaw = Rotation3::from_axis_angle(&Vector3::y_axis(), self.yaw.to_radians());
        let pitch = Rotation3::from_axis_angle(&Vector3::x_axis(), self.pitch.to_radians());
        pitch * yaw
    }

    /// World point to view space (rotation only)
    pub fn to_view(&self, world: &Point3<f32>) -> Point3<f32> {
        self.view_rotation() * world
    }

    /// Camera position expressed in world space
    pub fn world_position(&self) -> Point3<f32> {
        self.view_rotation().inverse() * self.position
    }

    /// Perspective projection of a view-space point
    ///
    /// Returns `None` only when the point lies exactly on the focal plane.
    pub fn project(&self, view: &Point3<f32>, viewport: Viewport) -> Option<ScreenPoint> {
        let denom = (view.z - self.position.z) + self.focal_length;
        if denom == 0.0 {
            return None;
        }
        let scale_factor = self.focal_length / denom;
        let (cx, cy) = viewport.center();
        Some(ScreenPoint {
            x: view.x * scale_factor * self.zoom + cx,
            y: view.y * scale_factor * self.zoom + cy,
            depth: view.z,
        })
    }

    /// World point straight to the screen
    pub fn project_world(&self, world: &Point3<f32>, viewport: Viewport) -> Option<ScreenPoint> {
        self.project(&self.to_view(world), viewport)
    }

    /// Orbit by a pointer drag measured in pixels
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * ORBIT_DEGREES_PER_PIXEL;
        self.pitch += dy * ORBIT_DEGREES_PER_PIXEL;
    }

    /// Zoom by a mouse wheel delta
    pub fn zoom_by_wheel(&mut self, delta: f32) {
        let zoomed = self.zoom * WHEEL_ZOOM_BASE.powf(delta);
        if zoomed.is_finite() && zoomed > 0.0 {
            self.zoom = zoomed;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, -10.0),
            pitch: 0.0,
            yaw: 0.0,
            zoom: 40.0,
            focal_length: FOCAL_LENGTH,
        }
    }
}
