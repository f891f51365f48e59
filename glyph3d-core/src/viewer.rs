/// The verb set front-ends drive: scene edits, render options, frames
use nalgebra::Point3;

use crate::error::{ensure_positive, Glyph3dError, Result};
use crate::framebuffer::PixelBuffer;
use crate::glyph::ShapeKind;
use crate::projection::Viewport;
use crate::render::{render_scene, FrameStats};
use crate::scene::{Scene, SolidHandle};
use crate::settings::{Config, RenderMode, RenderSettings};
use crate::shading::LightingMethod;
use crate::transform::Axis;

/// A scene together with the options used to render it
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    scene: Scene,
    settings: RenderSettings,
}

impl Viewer {
    pub fn new(scene: Scene, settings: RenderSettings) -> Self {
        Self { scene, settings }
    }

    /// Empty scene with camera, light and steps taken from `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut viewer = Self::default();
        viewer.apply_config(config)?;
        Ok(viewer)
    }

    /// Replace camera, light, steps and render options, keeping the solids
    pub fn apply_config(&mut self, config: &Config) -> Result<()> {
        let edge_thickness = valid_thickness(config.render.edge_thickness)?;
        let camera = &config.camera;
        let focal_length = ensure_positive("focal length", camera.focal_length)?;
        self.scene.set_camera(camera.position, camera.pitch, camera.yaw, camera.zoom)?;
        self.scene.camera.focal_length = focal_length;
        self.scene.light = config.light;
        self.scene.steps = config.steps;
        self.settings = RenderSettings {
            edge_thickness,
            ..config.render
        };
        Ok(())
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    // --- Solids ---

    pub fn create_solid(
        &mut self,
        kind: ShapeKind,
        height: f32,
        width: f32,
        depth: f32,
        position: Point3<f32>,
    ) -> Result<SolidHandle> {
        self.scene.create_solid(kind, height, width, depth, position)
    }

    pub fn remove_solid(&mut self, handle: SolidHandle) -> Result<()> {
        self.scene.remove_solid(handle).map(drop)
    }

    pub fn set_params(&mut self, handle: SolidHandle, height: f32, width: f32, depth: f32) -> Result<()> {
        self.scene.set_params(handle, height, width, depth)
    }

    pub fn translate(&mut self, handle: SolidHandle, axis: Axis, delta: f32) -> Result<()> {
        self.scene.translate(handle, axis, delta)
    }

    pub fn rotate(&mut self, handle: SolidHandle, axis: Axis, delta_degrees: f32) -> Result<()> {
        self.scene.rotate(handle, axis, delta_degrees)
    }

    pub fn scale(&mut self, handle: SolidHandle, axis: Axis, factor: f32) -> Result<()> {
        self.scene.scale(handle, axis, factor)
    }

    pub fn reflect(&mut self, handle: SolidHandle, axis: Axis) -> Result<()> {
        self.scene.reflect(handle, axis)
    }

    pub fn set_uniform_scale(&mut self, handle: SolidHandle, factor: f32) -> Result<()> {
        self.scene.set_uniform_scale(handle, factor)
    }

    // --- Camera and light ---

    pub fn set_camera(&mut self, position: Point3<f32>, pitch: f32, yaw: f32, zoom: f32) -> Result<()> {
        self.scene.set_camera(position, pitch, yaw, zoom)
    }

    /// Orbit by a pointer drag in pixels
    pub fn orbit_camera(&mut self, dx: f32, dy: f32) {
        self.scene.orbit_camera(dx, dy);
    }

    pub fn zoom_camera(&mut self, wheel_delta: f32) {
        self.scene.zoom_camera(wheel_delta);
    }

    pub fn set_light(
        &mut self,
        position: Point3<f32>,
        enabled: bool,
        method: LightingMethod,
        ambient: f32,
        diffuse: f32,
    ) {
        self.scene.set_light(position, enabled, method, ambient, diffuse);
    }

    // --- Render options ---

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.settings.mode = mode;
    }

    pub fn set_fill_visible(&mut self, visible: bool) {
        self.settings.fill_visible = visible;
    }

    pub fn set_edges_visible(&mut self, visible: bool) {
        self.settings.edges_visible = visible;
    }

    pub fn set_edge_thickness(&mut self, thickness: u32) -> Result<()> {
        self.settings.edge_thickness = valid_thickness(thickness)?;
        Ok(())
    }

    pub fn set_fill_opacity(&mut self, opacity: u8) {
        self.settings.fill_opacity = opacity;
    }

    pub fn set_show_grid(&mut self, visible: bool) {
        self.settings.show_grid = visible;
    }

    pub fn set_show_axes(&mut self, visible: bool) {
        self.settings.show_axes = visible;
    }

    pub fn set_show_centers(&mut self, visible: bool) {
        self.settings.show_centers = visible;
    }

    // --- Frames ---

    /// Render an RGBA frame of `width × height` pixels, top-left origin
    pub fn render(&self, width: usize, height: usize) -> PixelBuffer {
        self.render_with_stats(width, height).0
    }

    pub fn render_with_stats(&self, width: usize, height: usize) -> (PixelBuffer, FrameStats) {
        render_scene(&self.scene, &self.settings, Viewport::new(width, height))
    }
}

fn valid_thickness(thickness: u32) -> Result<u32> {
    if thickness == 0 {
        return Err(Glyph3dError::InvalidParameter {
            parameter: "edge thickness",
            value: 0.0,
        });
    }
    Ok(thickness)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::Color;

    #[test]
    fn test_edge_thickness_validation() {
        let mut viewer = Viewer::default();
        assert!(viewer.set_edge_thickness(0).is_err());
        assert_eq!(viewer.settings().edge_thickness, 1);
        viewer.set_edge_thickness(3).unwrap();
        assert_eq!(viewer.settings().edge_thickness, 3);
    }

    #[test]
    fn test_thicker_edges_cover_more_pixels() {
        let mut viewer = Viewer::new(Scene::demo().unwrap(), RenderSettings::default());
        viewer.set_show_grid(false);
        viewer.set_show_axes(false);
        viewer.set_show_centers(false);
        let thin = viewer.render(400, 300).count_not(Color::BLACK);
        viewer.set_edge_thickness(3).unwrap();
        let thick = viewer.render(400, 300).count_not(Color::BLACK);
        assert!(thick > thin);
    }

    #[test]
    fn test_from_config() {
        let config = Config::from_ron_str(
            "(render: (mode: DepthSort), camera: (zoom: 60.0, yaw: 15.0), light: (enabled: false))",
        )
        .unwrap();
        let viewer = Viewer::from_config(&config).unwrap();
        assert_eq!(viewer.settings().mode, RenderMode::DepthSort);
        assert_eq!(viewer.scene().camera.zoom, 60.0);
        assert_eq!(viewer.scene().camera.yaw, 15.0);
        assert!(!viewer.scene().light.enabled);

        let bad = Config::from_ron_str("(camera: (zoom: 0.0))").unwrap();
        assert!(Viewer::from_config(&bad).is_err());
        let bad = Config::from_ron_str("(render: (edge_thickness: 0))").unwrap();
        assert!(Viewer::from_config(&bad).is_err());
    }

    #[test]
    fn test_verbs_reach_solids() {
        let mut viewer = Viewer::default();
        let handle = viewer
            .create_solid(ShapeKind::CurvedLetter, 4.0, 2.0, 1.0, Point3::origin())
            .unwrap();
        viewer.translate(handle, Axis::X, 2.0).unwrap();
        viewer.rotate(handle, Axis::Y, 30.0).unwrap();
        viewer.reflect(handle, Axis::Z).unwrap();
        viewer.set_uniform_scale(handle, 2.0).unwrap();
        viewer.scale(handle, Axis::Y, 0.5).unwrap();

        let transform = viewer.scene().solid(handle).unwrap().transform();
        assert_eq!(transform.position.x, 2.0);
        assert_eq!(transform.rotation.y, 30.0);
        assert_eq!(transform.reflection.z, -1.0);
        assert_eq!(transform.scale.y, 1.0);

        viewer.remove_solid(handle).unwrap();
        assert!(viewer.remove_solid(handle).is_err());
        assert!(viewer.set_params(handle, 1.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_render_size_and_stats() {
        let viewer = Viewer::new(Scene::demo().unwrap(), RenderSettings::default());
        let (pixels, stats) = viewer.render_with_stats(200, 100);
        assert_eq!(pixels.width(), 200);
        assert_eq!(pixels.height(), 100);
        assert!(stats.edges_drawn > 0);
    }
}
