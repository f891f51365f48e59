/// Glyph3D Web - WASM bindings that draw into an HTML canvas
///
/// The frame is rendered on the CPU by `glyph3d-core` and copied into the
/// canvas with `putImageData`.
use glyph3d_core::{
    Axis, Glyph3dError, LightingMethod, RenderMode, RenderSettings, Scene, ShapeKind, SolidHandle,
    Viewer,
};
use nalgebra::Point3;
use slotmap::{Key, KeyData};
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

fn js_error(err: Glyph3dError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Solid handles cross the JS boundary as opaque `BigInt`s
fn handle_to_js(handle: SolidHandle) -> u64 {
    handle.data().as_ffi()
}

fn handle_from_js(id: u64) -> SolidHandle {
    SolidHandle::from(KeyData::from_ffi(id))
}

#[wasm_bindgen]
pub struct WebViewer {
    viewer: Viewer,
}

#[wasm_bindgen]
impl WebViewer {
    /// Start with the demo scene: С on the left, Д on the right
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebViewer, JsValue> {
        let scene = Scene::demo().map_err(js_error)?;
        Ok(WebViewer {
            viewer: Viewer::new(scene, RenderSettings::default()),
        })
    }

    /// Create a letter solid; `kind` is "С", "Д", "curved" or "rectilinear"
    #[wasm_bindgen(js_name = createSolid)]
    pub fn create_solid(
        &mut self,
        kind: &str,
        height: f32,
        width: f32,
        depth: f32,
        x: f32,
        y: f32,
        z: f32,
    ) -> Result<u64, JsValue> {
        let kind: ShapeKind = kind.parse().map_err(js_error)?;
        let handle = self
            .viewer
            .create_solid(kind, height, width, depth, Point3::new(x, y, z))
            .map_err(js_error)?;
        Ok(handle_to_js(handle))
    }

    #[wasm_bindgen(js_name = removeSolid)]
    pub fn remove_solid(&mut self, id: u64) -> Result<(), JsValue> {
        self.viewer.remove_solid(handle_from_js(id)).map_err(js_error)
    }

    /// Handles of all solids in draw order
    pub fn solids(&self) -> Vec<u64> {
        self.viewer.scene().solids().map(|(h, _)| handle_to_js(h)).collect()
    }

    #[wasm_bindgen(js_name = setParams)]
    pub fn set_params(&mut self, id: u64, height: f32, width: f32, depth: f32) -> Result<(), JsValue> {
        self.viewer
            .set_params(handle_from_js(id), height, width, depth)
            .map_err(js_error)
    }

    pub fn translate(&mut self, id: u64, axis: &str, delta: f32) -> Result<(), JsValue> {
        let axis: Axis = axis.parse().map_err(js_error)?;
        self.viewer.translate(handle_from_js(id), axis, delta).map_err(js_error)
    }

    pub fn rotate(&mut self, id: u64, axis: &str, degrees: f32) -> Result<(), JsValue> {
        let axis: Axis = axis.parse().map_err(js_error)?;
        self.viewer.rotate(handle_from_js(id), axis, degrees).map_err(js_error)
    }

    pub fn scale(&mut self, id: u64, axis: &str, factor: f32) -> Result<(), JsValue> {
        let axis: Axis = axis.parse().map_err(js_error)?;
        self.viewer.scale(handle_from_js(id), axis, factor).map_err(js_error)
    }

    pub fn reflect(&mut self, id: u64, axis: &str) -> Result<(), JsValue> {
        let axis: Axis = axis.parse().map_err(js_error)?;
        self.viewer.reflect(handle_from_js(id), axis).map_err(js_error)
    }

    #[wasm_bindgen(js_name = setUniformScale)]
    pub fn set_uniform_scale(&mut self, id: u64, factor: f32) -> Result<(), JsValue> {
        self.viewer
            .set_uniform_scale(handle_from_js(id), factor)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = setCamera)]
    pub fn set_camera(&mut self, x: f32, y: f32, z: f32, pitch: f32, yaw: f32, zoom: f32) -> Result<(), JsValue> {
        self.viewer
            .set_camera(Point3::new(x, y, z), pitch, yaw, zoom)
            .map_err(js_error)
    }

    /// Pointer drag in pixels
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.viewer.orbit_camera(dx, dy);
    }

    /// Mouse wheel delta
    pub fn zoom(&mut self, delta: f32) {
        self.viewer.zoom_camera(delta);
    }

    /// `method` is "flat", "gouraud" or "phong"
    #[wasm_bindgen(js_name = setLight)]
    pub fn set_light(
        &mut self,
        x: f32,
        y: f32,
        z: f32,
        enabled: bool,
        method: &str,
        ambient: f32,
        diffuse: f32,
    ) -> Result<(), JsValue> {
        let method: LightingMethod = method.parse().map_err(js_error)?;
        self.viewer
            .set_light(Point3::new(x, y, z), enabled, method, ambient, diffuse);
        Ok(())
    }

    /// `mode` is "wireframe", "depth-sort" or "z-buffer"
    #[wasm_bindgen(js_name = setRenderMode)]
    pub fn set_render_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode: RenderMode = mode.parse().map_err(js_error)?;
        self.viewer.set_render_mode(mode);
        Ok(())
    }

    #[wasm_bindgen(js_name = setFillVisible)]
    pub fn set_fill_visible(&mut self, visible: bool) {
        self.viewer.set_fill_visible(visible);
    }

    #[wasm_bindgen(js_name = setEdgesVisible)]
    pub fn set_edges_visible(&mut self, visible: bool) {
        self.viewer.set_edges_visible(visible);
    }

    #[wasm_bindgen(js_name = setEdgeThickness)]
    pub fn set_edge_thickness(&mut self, thickness: u32) -> Result<(), JsValue> {
        self.viewer.set_edge_thickness(thickness).map_err(js_error)
    }

    #[wasm_bindgen(js_name = setFillOpacity)]
    pub fn set_fill_opacity(&mut self, opacity: u8) {
        self.viewer.set_fill_opacity(opacity);
    }

    #[wasm_bindgen(js_name = setShowGrid)]
    pub fn set_show_grid(&mut self, visible: bool) {
        self.viewer.set_show_grid(visible);
        self.viewer.set_show_axes(visible);
    }

    /// Render a frame sized to the canvas and blit it
    pub fn render(&self, canvas_id: &str) -> Result<(), JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element #{canvas_id}")))?
            .dyn_into()?;
        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;

        let (width, height) = (canvas.width(), canvas.height());
        let pixels = self.viewer.render(width as usize, height as usize);
        if width == 0 || height == 0 {
            return Ok(());
        }
        let image = ImageData::new_with_u8_clamped_array_and_sh(Clamped(pixels.as_bytes()), width, height)?;
        context.put_image_data(&image, 0.0, 0.0)
    }
}
