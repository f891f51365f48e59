/// Local-to-world transform state and the fixed scale → reflect → rotate → translate pipeline
use std::str::FromStr;

use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, Glyph3dError, Result};

/// One of the three global axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of this axis in a 3-vector
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl FromStr for Axis {
    type Err = Glyph3dError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(Glyph3dError::UnknownName {
                kind: "axis",
                name: s.to_string(),
            }),
        }
    }
}

/// Rotation state around the three global axes (in degrees)
///
/// Angles accumulate without wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate about one axis by a delta (in degrees)
    pub fn rotate(&mut self, axis: Axis, delta: f32) {
        match axis {
            Axis::X => self.x += delta,
            Axis::Y => self.y += delta,
            Axis::Z => self.z += delta,
        }
    }

    pub fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Per-object transform record
///
/// A local point goes through scale, reflection, rotation about global X,
/// then Y, then Z, and finally translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Point3<f32>,
    pub rotation: RotationState,
    pub scale: Vector3<f32>,
    /// Each component is `1.0` or `-1.0`
    pub reflection: Vector3<f32>,
}

impl Transform {
    pub fn at(position: Point3<f32>) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x.to_radians(), 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y.to_radians(), 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z.to_radians()));

        // Column vectors: X is applied first, then Y, then Z
        rz * ry * rx
    }

    /// Create a translation matrix
    pub fn translation_matrix(offset: &Point3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(&offset.coords)
    }

    /// Create a scale matrix
    pub fn scale_matrix(factors: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(factors)
    }

    /// Scale combined with the reflection signs
    pub fn signed_scale(&self) -> Vector3<f32> {
        self.scale.component_mul(&self.reflection)
    }

    /// Full local-to-world matrix
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Self::translation_matrix(&self.position)
            * Self::rotation_matrix(&self.rotation)
            * Self::scale_matrix(&self.signed_scale())
    }

    /// Map a local point to world space
    pub fn to_world(&self, local: &Point3<f32>) -> Point3<f32> {
        self.model_matrix().transform_point(local)
    }

    /// Map a local unit normal to a world unit normal
    ///
    /// Normals take the inverse of the diagonal part and then the rotation,
    /// so non-uniform scale and reflection keep them perpendicular and outward.
    pub fn normal_to_world(&self, normal: &Vector3<f32>) -> Vector3<f32> {
        let inverse_scaled = normal.component_div(&self.signed_scale());
        let rotated = Self::rotation_matrix(&self.rotation).transform_vector(&inverse_scaled);
        rotated.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros)
    }

    pub fn translate(&mut self, axis: Axis, delta: f32) {
        self.position[axis.index()] += delta;
    }

    pub fn rotate(&mut self, axis: Axis, delta_degrees: f32) {
        self.rotation.rotate(axis, delta_degrees);
    }

    /// Multiply one scale component by a positive factor
    pub fn scale(&mut self, axis: Axis, factor: f32) -> Result<()> {
        let factor = ensure_positive("scale factor", factor)?;
        self.scale[axis.index()] *= factor;
        Ok(())
    }

    /// Reset all three scale components to `factor`
    pub fn set_uniform_scale(&mut self, factor: f32) -> Result<()> {
        let factor = ensure_positive("uniform scale", factor)?;
        self.scale = Vector3::repeat(factor);
        Ok(())
    }

    pub fn reflect(&mut self, axis: Axis) {
        self.reflection[axis.index()] = -self.reflection[axis.index()];
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            rotation: RotationState::zero(),
            scale: Vector3::repeat(1.0),
            reflection: Vector3::repeat(1.0),
        }
    }
}
