/// Terminal front-end: key bindings onto the viewer verbs, frames as cells
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use glyph3d_core::{Axis, FrameStats, RenderMode, Result as CoreResult, Viewer};
use log::warn;
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::{CellStyle, TerminalRenderer};

/// Pointer-drag pixels per orbit key press
const ORBIT_KEY_PIXELS: f32 = 10.0;

/// Wheel delta per zoom key press
const ZOOM_KEY_DELTA: f32 = 120.0;

/// Degrees per frame while spinning
const SPIN_DEGREES: f32 = 1.0;

/// Zoom that fits the default letters into a frame `pixel_height` pixels tall
pub fn fit_zoom(pixel_height: usize) -> f32 {
    (pixel_height as f32 / 12.0).max(1.0)
}

/// Main application struct for terminal rendering
pub struct TerminalApp {
    viewer: Viewer,
    renderer: TerminalRenderer,
    running: bool,
    spinning: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
    stats: FrameStats,
    message: Option<String>,
}

impl TerminalApp {
    pub fn new(viewer: Viewer) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(viewer, width, height))
    }

    /// App for a terminal of `columns × rows` cells
    pub fn with_size(viewer: Viewer, columns: u16, rows: u16) -> Self {
        Self {
            viewer,
            // Bottom row is the status line
            renderer: TerminalRenderer::new(columns as usize, rows.saturating_sub(1) as usize),
            running: true,
            spinning: false,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
            stats: FrameStats::default(),
            message: None,
        }
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?)?;
            }

            self.update();
            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press | KeyEventKind::Repeat,
                ..
            }) => {
                if let Err(err) = self.handle_key(code) {
                    warn!("key {:?} ignored: {}", code, err);
                    self.message = Some(err.to_string());
                }
            }
            Event::Resize(width, height) => {
                self.renderer
                    .resize(width as usize, height.saturating_sub(1) as usize);
                execute!(stdout(), terminal::Clear(ClearType::All))?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Apply one key press to the viewer
    pub fn handle_key(&mut self, code: KeyCode) -> CoreResult<()> {
        let viewer = &mut self.viewer;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Tab => {
                viewer.scene_mut().select_next();
            }

            KeyCode::Char('1') => viewer.set_render_mode(RenderMode::Wireframe),
            KeyCode::Char('2') => viewer.set_render_mode(RenderMode::DepthSort),
            KeyCode::Char('3') => viewer.set_render_mode(RenderMode::ZBuffer),

            KeyCode::Left => viewer.orbit_camera(-ORBIT_KEY_PIXELS, 0.0),
            KeyCode::Right => viewer.orbit_camera(ORBIT_KEY_PIXELS, 0.0),
            KeyCode::Up => viewer.orbit_camera(0.0, -ORBIT_KEY_PIXELS),
            KeyCode::Down => viewer.orbit_camera(0.0, ORBIT_KEY_PIXELS),
            KeyCode::Char(']') => viewer.zoom_camera(ZOOM_KEY_DELTA),
            KeyCode::Char('[') => viewer.zoom_camera(-ZOOM_KEY_DELTA),

            // Screen Y grows downward, so "up" is -Y
            KeyCode::Char('w') => viewer.scene_mut().move_selected(Axis::Y, -1.0)?,
            KeyCode::Char('s') => viewer.scene_mut().move_selected(Axis::Y, 1.0)?,
            KeyCode::Char('a') => viewer.scene_mut().move_selected(Axis::X, -1.0)?,
            KeyCode::Char('d') => viewer.scene_mut().move_selected(Axis::X, 1.0)?,
            KeyCode::Char('r') => viewer.scene_mut().move_selected(Axis::Z, 1.0)?,
            KeyCode::Char('f') => viewer.scene_mut().move_selected(Axis::Z, -1.0)?,

            KeyCode::Char('i') => viewer.scene_mut().rotate_selected(Axis::X, 1.0)?,
            KeyCode::Char('k') => viewer.scene_mut().rotate_selected(Axis::X, -1.0)?,
            KeyCode::Char('j') => viewer.scene_mut().rotate_selected(Axis::Y, -1.0)?,
            KeyCode::Char('l') => viewer.scene_mut().rotate_selected(Axis::Y, 1.0)?,
            KeyCode::Char('u') => viewer.scene_mut().rotate_selected(Axis::Z, -1.0)?,
            KeyCode::Char('o') => viewer.scene_mut().rotate_selected(Axis::Z, 1.0)?,

            KeyCode::Char(c @ ('X' | 'Y' | 'Z')) => {
                let axis: Axis = c.to_string().parse()?;
                let handle = selected(viewer)?;
                viewer.reflect(handle, axis)?;
            }
            KeyCode::Char(c @ ('+' | '=' | '-')) => {
                let direction = if c == '-' { -1.0 } else { 1.0 };
                for axis in Axis::ALL {
                    viewer.scene_mut().scale_selected(axis, direction)?;
                }
            }
            KeyCode::Char('0') => {
                let handle = selected(viewer)?;
                viewer.set_uniform_scale(handle, 1.0)?;
            }

            KeyCode::Char('g') => {
                let show = !viewer.settings().show_grid;
                viewer.set_show_grid(show);
                viewer.set_show_axes(show);
            }
            KeyCode::Char('c') => {
                let handle = selected(viewer)?;
                viewer.scene_mut().toggle_center(handle)?;
            }
            KeyCode::Char('e') => {
                let visible = !viewer.settings().edges_visible;
                viewer.set_edges_visible(visible);
            }
            KeyCode::Char('v') => {
                let visible = !viewer.settings().fill_visible;
                viewer.set_fill_visible(visible);
            }
            KeyCode::Char('L') => {
                let light = &mut viewer.scene_mut().light;
                light.enabled = !light.enabled;
            }
            KeyCode::Char('m') => {
                let light = &mut viewer.scene_mut().light;
                light.method = light.method.next();
            }
            KeyCode::Char('t') => {
                self.renderer.toggle_style();
            }
            KeyCode::Char('p') => self.spinning = !self.spinning,
            _ => return Ok(()),
        }
        self.message = None;
        Ok(())
    }

    fn update(&mut self) {
        if !self.spinning {
            return;
        }
        if let Ok(handle) = selected(&self.viewer) {
            if let Err(err) = self.viewer.rotate(handle, Axis::Y, SPIN_DEGREES) {
                warn!("spin stopped: {}", err);
                self.spinning = false;
            }
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let (width, height) = self.renderer.pixel_size();
        let (pixels, stats) = self.viewer.render_with_stats(width, height);
        self.stats = stats;

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.draw(&pixels, &mut stdout)?;

        // Status line
        let (columns, rows) = terminal::size()?;
        let settings = self.viewer.settings();
        let light = self.viewer.scene().light;
        let mut status = format!(
            "Glyph3D | {} | light {} {} | FPS {:.1} | {} | 1/2/3 mode, arrows orbit, [] zoom, wasdrf move, ijkluo rotate, XYZ mirror, +/- scale, Tab select, q quit",
            settings.mode,
            if light.enabled { "on" } else { "off" },
            light.method,
            self.fps,
            self.stats,
        );
        if let Some(message) = &self.message {
            status = format!("{} | {}", message, status);
        }
        let status: String = status.chars().take(columns as usize).collect();
        queue!(
            stdout,
            cursor::MoveTo(0, rows.saturating_sub(1)),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(status),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

fn selected(viewer: &Viewer) -> CoreResult<glyph3d_core::SolidHandle> {
    viewer
        .scene()
        .selected()
        .ok_or(glyph3d_core::Glyph3dError::UnknownSolid)
}
