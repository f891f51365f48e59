/// Scene: the ordered set of solids plus camera, light and selection
use log::debug;
use nalgebra::Point3;
use slotmap::SlotMap;

use crate::error::{ensure_positive, Glyph3dError, Result};
use crate::glyph::{ShapeKind, ShapeParams};
use crate::projection::Camera;
use crate::settings::StepSettings;
use crate::shading::{Light, LightingMethod};
use crate::solid::Solid;
use crate::transform::Axis;

slotmap::new_key_type! {
    /// Identifier of a solid in a [`Scene`].
    pub struct SolidHandle;
}

/// All solids in draw order together with the shared camera and light
#[derive(Debug, Clone, Default)]
pub struct Scene {
    solids: SlotMap<SolidHandle, Solid>,
    order: Vec<SolidHandle>,
    selected: Option<SolidHandle>,
    pub camera: Camera,
    pub light: Light,
    pub steps: StepSettings,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A curved letter at x = -3 and a rectilinear letter at x = 3
    pub fn demo() -> Result<Self> {
        let mut scene = Self::new();
        scene.create_solid(ShapeKind::CurvedLetter, 4.0, 2.0, 1.0, Point3::new(-3.0, 0.0, 0.0))?;
        scene.create_solid(ShapeKind::RectilinearLetter, 4.0, 2.0, 1.0, Point3::new(3.0, 0.0, 0.0))?;
        Ok(scene)
    }

    /// Build a solid and append it to the draw order
    ///
    /// The first solid of an empty selection becomes selected.
    pub fn create_solid(
        &mut self,
        kind: ShapeKind,
        height: f32,
        width: f32,
        depth: f32,
        position: Point3<f32>,
    ) -> Result<SolidHandle> {
        let params = ShapeParams::new(height, width, depth)?;
        let solid = Solid::new(kind, params, position)?;
        let handle = self.solids.insert(solid);
        self.order.push(handle);
        if self.selected.is_none() {
            self.selected = Some(handle);
        }
        debug!("created {:?} {}x{}x{} at {:?}", kind, height, width, depth, position);
        Ok(handle)
    }

    /// Remove a solid; selection falls back to the first remaining one
    pub fn remove_solid(&mut self, handle: SolidHandle) -> Result<Solid> {
        let solid = self.solids.remove(handle).ok_or(Glyph3dError::UnknownSolid)?;
        self.order.retain(|&h| h != handle);
        if self.selected == Some(handle) {
            self.selected = self.order.first().copied();
        }
        debug!("removed {:?}, {} solids left", solid.kind(), self.order.len());
        Ok(solid)
    }

    pub fn solid(&self, handle: SolidHandle) -> Result<&Solid> {
        self.solids.get(handle).ok_or(Glyph3dError::UnknownSolid)
    }

    fn solid_mut(&mut self, handle: SolidHandle) -> Result<&mut Solid> {
        self.solids.get_mut(handle).ok_or(Glyph3dError::UnknownSolid)
    }

    /// Solids in creation order
    pub fn solids(&self) -> impl Iterator<Item = (SolidHandle, &Solid)> + '_ {
        self.order
            .iter()
            .filter_map(move |&handle| self.solids.get(handle).map(|solid| (handle, solid)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // --- Selection ---

    pub fn selected(&self) -> Option<SolidHandle> {
        self.selected
    }

    pub fn select(&mut self, handle: SolidHandle) -> Result<()> {
        self.solid(handle)?;
        self.selected = Some(handle);
        Ok(())
    }

    /// Advance the selection in draw order, wrapping around
    pub fn select_next(&mut self) -> Option<SolidHandle> {
        let next = match self.selected.and_then(|s| self.order.iter().position(|&h| h == s)) {
            Some(i) => self.order.get((i + 1) % self.order.len()).copied(),
            None => self.order.first().copied(),
        };
        self.selected = next;
        next
    }

    // --- Per-solid verbs ---

    pub fn set_params(&mut self, handle: SolidHandle, height: f32, width: f32, depth: f32) -> Result<()> {
        self.solid_mut(handle)?.set_params(height, width, depth)
    }

    pub fn set_position(&mut self, handle: SolidHandle, position: Point3<f32>) -> Result<()> {
        self.solid_mut(handle)?.set_position(position);
        Ok(())
    }

    pub fn translate(&mut self, handle: SolidHandle, axis: Axis, delta: f32) -> Result<()> {
        self.solid_mut(handle)?.translate(axis, delta);
        Ok(())
    }

    pub fn rotate(&mut self, handle: SolidHandle, axis: Axis, delta_degrees: f32) -> Result<()> {
        self.solid_mut(handle)?.rotate(axis, delta_degrees);
        Ok(())
    }

    pub fn scale(&mut self, handle: SolidHandle, axis: Axis, factor: f32) -> Result<()> {
        self.solid_mut(handle)?.scale(axis, factor)
    }

    pub fn reflect(&mut self, handle: SolidHandle, axis: Axis) -> Result<()> {
        self.solid_mut(handle)?.reflect(axis);
        Ok(())
    }

    pub fn set_uniform_scale(&mut self, handle: SolidHandle, factor: f32) -> Result<()> {
        self.solid_mut(handle)?.set_uniform_scale(factor)
    }

    pub fn toggle_center(&mut self, handle: SolidHandle) -> Result<bool> {
        Ok(self.solid_mut(handle)?.toggle_center())
    }

    // --- Step-driven controls on the selection ---

    fn selected_mut(&mut self) -> Result<&mut Solid> {
        let handle = self.selected.ok_or(Glyph3dError::UnknownSolid)?;
        self.solid_mut(handle)
    }

    /// Move the selected solid one movement step; `direction` is +1 or -1
    pub fn move_selected(&mut self, axis: Axis, direction: f32) -> Result<()> {
        let delta = self.steps.movement_step * direction.signum();
        self.selected_mut()?.translate(axis, delta);
        Ok(())
    }

    pub fn rotate_selected(&mut self, axis: Axis, direction: f32) -> Result<()> {
        let delta = self.steps.rotation_step * direction.signum();
        self.selected_mut()?.rotate(axis, delta);
        Ok(())
    }

    /// Grow (`direction > 0`) or shrink the selected solid along one axis
    pub fn scale_selected(&mut self, axis: Axis, direction: f32) -> Result<()> {
        let step = ensure_positive("scale_step", self.steps.scale_step)?;
        let factor = if direction >= 0.0 { step } else { step.recip() };
        self.selected_mut()?.scale(axis, factor)
    }

    // --- Camera and light ---

    pub fn set_camera(&mut self, position: Point3<f32>, pitch: f32, yaw: f32, zoom: f32) -> Result<()> {
        self.camera = Camera {
            focal_length: self.camera.focal_length,
            ..Camera::new(position, pitch, yaw, zoom)?
        };
        Ok(())
    }

    pub fn orbit_camera(&mut self, dx: f32, dy: f32) {
        self.camera.orbit(dx, dy);
    }

    pub fn zoom_camera(&mut self, wheel_delta: f32) {
        self.camera.zoom_by_wheel(wheel_delta);
    }

    pub fn set_light(
        &mut self,
        position: Point3<f32>,
        enabled: bool,
        method: LightingMethod,
        ambient: f32,
        diffuse: f32,
    ) {
        self.light = Light {
            position,
            enabled,
            method,
            ambient,
            diffuse,
        };
    }
}
