/// Frame rendering: wireframe, painter's algorithm and z-buffer
///
/// Every call allocates its own pixel (and depth) buffer and hands the
/// pixels back; nothing is kept between frames. Primitives that cannot be
/// projected or rasterized are skipped and counted in [`FrameStats`].
use std::collections::HashSet;
use std::fmt;

use log::{debug, trace};
use nalgebra::Point3;

use crate::error::{Glyph3dError, Result};
use crate::framebuffer::{Color, DepthTarget, PixelBuffer};
use crate::geometry::{Edge, VertexIndex};
use crate::projection::{Camera, ScreenPoint, Viewport};
use crate::raster::{draw_line, draw_line_depth, fill_circle, fill_polygon, fill_triangle_depth};
use crate::scene::Scene;
use crate::settings::{RenderMode, RenderSettings};
use crate::shading::{face_color, face_depth, is_face_visible};
use crate::solid::Solid;

/// Depth offset toward the camera that lets edges win over the faces they bound
pub const EDGE_DEPTH_BIAS: f32 = 0.01;

/// Radius in pixels of the solid center marker
pub const CENTER_MARKER_RADIUS: i32 = 3;

/// Length of the reference axes in world units
pub const AXIS_LENGTH: f32 = 5.0;

const GRID_COLOR: Color = Color::new(60, 60, 60);
const GRID_ORIGIN_COLOR: Color = Color::new(120, 120, 120);
const CENTER_MARKER_COLOR: Color = Color::RED;

/// Counters describing what one frame drew and skipped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub faces_drawn: usize,
    pub edges_drawn: usize,
    pub skipped_projection: usize,
    pub skipped_degenerate: usize,
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} faces, {} edges, {} unprojectable, {} degenerate",
            self.faces_drawn, self.edges_drawn, self.skipped_projection, self.skipped_degenerate
        )
    }
}

/// Render target; the depth-tested variant is used only in z-buffer mode
enum Surface {
    Flat(PixelBuffer),
    Depth(DepthTarget),
}

impl Surface {
    fn line(&mut self, a: &ScreenPoint, b: &ScreenPoint, color: Color, thickness: u32, bias: f32) {
        match self {
            Surface::Flat(buf) => draw_line(buf, a, b, color, thickness),
            Surface::Depth(target) => draw_line_depth(target, a, b, color, thickness, bias),
        }
    }

    fn into_pixels(self) -> PixelBuffer {
        match self {
            Surface::Flat(buf) => buf,
            Surface::Depth(target) => target.into_pixels(),
        }
    }
}

/// A face that survived culling and projection, waiting for the depth sort
struct SortedFace {
    depth: f32,
    points: Vec<ScreenPoint>,
    outline: Vec<(ScreenPoint, ScreenPoint)>,
    color: Color,
}

/// Render one frame of `scene`
///
/// Always returns a buffer of `viewport` size; a zero-sized viewport gives
/// an empty buffer.
pub fn render_scene(scene: &Scene, settings: &RenderSettings, viewport: Viewport) -> (PixelBuffer, FrameStats) {
    if viewport.is_empty() {
        return (
            PixelBuffer::new(viewport.width, viewport.height, settings.background),
            FrameStats::default(),
        );
    }
    let mut frame = Frame {
        scene,
        settings,
        viewport,
        camera: &scene.camera,
        thickness: settings.edge_thickness.max(1),
        stats: FrameStats::default(),
    };
    let pixels = frame.draw();
    debug!(
        "{} frame {}x{}: {}",
        settings.mode, viewport.width, viewport.height, frame.stats
    );
    (pixels, frame.stats)
}

struct Frame<'a> {
    scene: &'a Scene,
    settings: &'a RenderSettings,
    viewport: Viewport,
    camera: &'a Camera,
    thickness: u32,
    stats: FrameStats,
}

impl<'a> Frame<'a> {
    fn draw(&mut self) -> PixelBuffer {
        let (width, height) = (self.viewport.width, self.viewport.height);
        let background = self.settings.background;
        let mut surface = match self.settings.mode {
            RenderMode::ZBuffer => Surface::Depth(DepthTarget::new(width, height, background)),
            RenderMode::Wireframe | RenderMode::DepthSort => {
                Surface::Flat(PixelBuffer::new(width, height, background))
            }
        };

        self.draw_guides(&mut surface);
        match (self.settings.mode, &mut surface) {
            (RenderMode::Wireframe, Surface::Flat(buf)) => self.draw_wireframe(buf),
            (RenderMode::DepthSort, Surface::Flat(buf)) => self.draw_depth_sorted(buf),
            (RenderMode::ZBuffer, Surface::Depth(target)) => self.draw_depth_buffered(target),
            _ => {}
        }

        let mut pixels = surface.into_pixels();
        self.draw_centers(&mut pixels);
        pixels
    }

    /// Record a skipped primitive
    fn skip(&mut self, what: &str, err: Glyph3dError) {
        match err {
            Glyph3dError::DegenerateProjection => self.stats.skipped_projection += 1,
            Glyph3dError::DegenerateTriangle => self.stats.skipped_degenerate += 1,
            _ => {}
        }
        trace!("skipped {}: {}", what, err);
    }

    fn project(&self, world: &Point3<f32>) -> Result<ScreenPoint> {
        self.camera
            .project_world(world, self.viewport)
            .ok_or(Glyph3dError::DegenerateProjection)
    }

    /// Project every world vertex of a solid once
    fn project_solid(&self, solid: &Solid) -> Vec<Option<ScreenPoint>> {
        solid
            .world_vertices()
            .iter()
            .map(|v| self.camera.project_world(v, self.viewport))
            .collect()
    }

    /// Screen points of `indices`, failing if any vertex did not project
    fn resolve(projected: &[Option<ScreenPoint>], indices: &[VertexIndex]) -> Result<Vec<ScreenPoint>> {
        indices
            .iter()
            .map(|&i| projected.get(i).copied().flatten().ok_or(Glyph3dError::DegenerateProjection))
            .collect()
    }

    fn resolve_edge(projected: &[Option<ScreenPoint>], edge: &Edge) -> Result<(ScreenPoint, ScreenPoint)> {
        let (a, b) = edge.indices();
        match Self::resolve(projected, &[a, b])?.as_slice() {
            [pa, pb] => Ok((*pa, *pb)),
            _ => Err(Glyph3dError::DegenerateProjection),
        }
    }

    fn draw_guides(&mut self, surface: &mut Surface) {
        if self.settings.show_grid {
            let n = self.settings.grid_size.max(0);
            let extent = n as f32;
            for i in -n..=n {
                let color = if i == 0 { GRID_ORIGIN_COLOR } else { GRID_COLOR };
                let c = i as f32;
                self.guide_line(surface, Point3::new(c, 0.0, -extent), Point3::new(c, 0.0, extent), color);
                self.guide_line(surface, Point3::new(-extent, 0.0, c), Point3::new(extent, 0.0, c), color);
            }
        }
        if self.settings.show_axes {
            let origin = Point3::origin();
            self.guide_line(surface, origin, Point3::new(AXIS_LENGTH, 0.0, 0.0), Color::RED);
            self.guide_line(surface, origin, Point3::new(0.0, AXIS_LENGTH, 0.0), Color::GREEN);
            self.guide_line(surface, origin, Point3::new(0.0, 0.0, AXIS_LENGTH), Color::BLUE);
        }
    }

    fn guide_line(&mut self, surface: &mut Surface, from: Point3<f32>, to: Point3<f32>, color: Color) {
        let segment = self.project(&from).and_then(|a| self.project(&to).map(|b| (a, b)));
        match segment {
            Ok((a, b)) => surface.line(&a, &b, color, 1, 0.0),
            Err(err) => self.skip("guide line", err),
        }
    }

    /// Every edge of every solid in list order, no depth handling
    fn draw_wireframe(&mut self, buf: &mut PixelBuffer) {
        let scene = self.scene;
        for (_, solid) in scene.solids() {
            let projected = self.project_solid(solid);
            for edge in solid.edges() {
                match Self::resolve_edge(&projected, edge) {
                    Ok((a, b)) => {
                        draw_line(buf, &a, &b, self.settings.edge_color, self.thickness);
                        self.stats.edges_drawn += 1;
                    }
                    Err(err) => self.skip("edge", err),
                }
            }
        }
    }

    /// Painter's algorithm over the visible faces of all solids
    fn draw_depth_sorted(&mut self, buf: &mut PixelBuffer) {
        let scene = self.scene;
        let mut faces = Vec::new();
        for (_, solid) in scene.solids() {
            let projected = self.project_solid(solid);
            let edges: HashSet<Edge> = solid.edges().iter().copied().collect();
            for face in solid.faces() {
                if !is_face_visible(face, solid, self.camera) {
                    continue;
                }
                let points = match Self::resolve(&projected, face.indices()) {
                    Ok(points) if points.len() >= 3 => points,
                    Ok(_) => continue,
                    Err(err) => {
                        self.skip("face", err);
                        continue;
                    }
                };
                // Only sides that are mesh edges are outlined; internal seams stay hidden
                let indices = face.indices();
                let outline = (0..indices.len())
                    .filter(|&k| edges.contains(&Edge::new(indices[k], indices[(k + 1) % indices.len()])))
                    .map(|k| (points[k], points[(k + 1) % points.len()]))
                    .collect();
                faces.push(SortedFace {
                    depth: face_depth(face, solid, self.camera),
                    points,
                    outline,
                    color: face_color(face, solid, &scene.light),
                });
            }
        }

        // Farthest first; the sort is stable so ties keep list order
        faces.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        for face in &faces {
            if self.settings.fill_visible {
                if let Err(err) = fill_polygon(buf, &face.points, face.color, self.settings.fill_opacity) {
                    self.skip("face fill", err);
                }
            }
            if self.settings.edges_visible {
                for (a, b) in &face.outline {
                    draw_line(buf, a, b, self.settings.edge_color, self.thickness);
                }
                self.stats.edges_drawn += face.outline.len();
            }
            self.stats.faces_drawn += 1;
        }
    }

    /// Per solid: all face fills, then all edges, against one depth buffer
    fn draw_depth_buffered(&mut self, target: &mut DepthTarget) {
        let scene = self.scene;
        for (_, solid) in scene.solids() {
            let projected = self.project_solid(solid);

            if self.settings.fill_visible {
                for face in solid.faces() {
                    let color = face_color(face, solid, &scene.light);
                    let mut filled = false;
                    for tri in face.triangles() {
                        let result = Self::resolve(&projected, &tri).and_then(|points| {
                            let tri = [points[0], points[1], points[2]];
                            fill_triangle_depth(target, &tri, color, self.settings.fill_opacity)
                        });
                        match result {
                            Ok(()) => filled = true,
                            Err(err) => self.skip("triangle", err),
                        }
                    }
                    if filled {
                        self.stats.faces_drawn += 1;
                    }
                }
            }

            if self.settings.edges_visible {
                for edge in solid.edges() {
                    match Self::resolve_edge(&projected, edge) {
                        Ok((a, b)) => {
                            draw_line_depth(
                                target,
                                &a,
                                &b,
                                self.settings.edge_color,
                                self.thickness,
                                EDGE_DEPTH_BIAS,
                            );
                            self.stats.edges_drawn += 1;
                        }
                        Err(err) => self.skip("edge", err),
                    }
                }
            }
        }
    }

    /// Red discs over the centers of solids that show them
    fn draw_centers(&mut self, pixels: &mut PixelBuffer) {
        if !self.settings.show_centers {
            return;
        }
        let scene = self.scene;
        for (_, solid) in scene.solids().filter(|(_, s)| s.show_center()) {
            match self.project(&solid.world_center()) {
                Ok(p) if p.x.is_finite() && p.y.is_finite() => fill_circle(
                    pixels,
                    p.x.floor() as i32,
                    p.y.floor() as i32,
                    CENTER_MARKER_RADIUS,
                    CENTER_MARKER_COLOR,
                ),
                Ok(_) => {}
                Err(err) => self.skip("center marker", err),
            }
        }
    }
}
