/// Glyph3D Terminal Viewer - the letters С and Д
///
/// Usage: glyph3d-terminal [config.ron]
/// Controls:
///   - 1/2/3: Wireframe, depth sort, z-buffer
///   - Arrow Keys / [ ]: Orbit and zoom the camera
///   - WASD R/F, IJKL U/O: Move and rotate the selected letter
///   - Tab: Select the next letter
///   - Q/ESC: Quit
use std::env;
use std::io;

use glyph3d_core::{Config, RenderSettings, Scene, Viewer};
use glyph3d_terminal::{fit_zoom, TerminalApp};
use log::{info, warn};

fn invalid_input(err: glyph3d_core::Glyph3dError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err)
}

fn main() -> io::Result<()> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => match Config::load(&path) {
            Ok(config) => {
                info!("loaded configuration from {}", path);
                Some(config)
            }
            Err(err) => {
                warn!("cannot use {}: {}; falling back to defaults", path, err);
                None
            }
        },
        None => None,
    };

    let mut viewer = Viewer::new(Scene::demo().map_err(invalid_input)?, RenderSettings::default());
    let mut app = match &config {
        Some(config) => {
            viewer.apply_config(config).map_err(invalid_input)?;
            TerminalApp::new(viewer)?
        }
        None => {
            let (_, rows) = crossterm::terminal::size()?;
            let camera = viewer.scene().camera;
            let zoom = fit_zoom(rows as usize * 2);
            viewer
                .set_camera(camera.position, camera.pitch, camera.yaw, zoom)
                .map_err(invalid_input)?;
            TerminalApp::new(viewer)?
        }
    };

    app.run()
}
