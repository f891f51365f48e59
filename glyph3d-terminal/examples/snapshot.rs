/// Example: Print one frame of the demo scene as ASCII and exit
///
/// Usage: cargo run --example snapshot -- [wireframe|depth-sort|z-buffer] [columns] [rows]

use std::env;
use std::io::{self, Write};

use glyph3d_core::{RenderMode, RenderSettings, Scene, Viewer};
use glyph3d_terminal::{fit_zoom, CellStyle, TerminalRenderer};

fn main() -> io::Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let mode: RenderMode = match args.get(1) {
        Some(name) => name
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?,
        None => RenderMode::DepthSort,
    };
    let columns = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);
    let rows = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(30);

    let scene = Scene::demo().map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let mut viewer = Viewer::new(scene, RenderSettings::default());
    viewer.set_render_mode(mode);
    let camera = viewer.scene().camera;
    viewer
        .set_camera(camera.position, camera.pitch, camera.yaw, fit_zoom(rows * 2))
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let mut renderer = TerminalRenderer::new(columns, rows);
    if renderer.style() != CellStyle::Ascii {
        renderer.toggle_style();
    }
    let (width, height) = renderer.pixel_size();
    let (pixels, stats) = viewer.render_with_stats(width, height);

    let mut stdout = io::stdout();
    renderer.draw(&pixels, &mut stdout)?;
    writeln!(stdout)?;
    writeln!(stdout, "{} | {}", mode, stats)?;
    stdout.flush()
}
