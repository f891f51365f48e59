/// Scan conversion: lines, triangles, polygons and discs
///
/// Screen coordinates are pixels with a top-left origin. Pixel `(x, y)`
/// covers `[x, x + 1) × [y, y + 1)`; triangles are sampled at pixel centers.
use crate::error::{Glyph3dError, Result};
use crate::framebuffer::{Color, DepthTarget, PixelBuffer};
use crate::projection::ScreenPoint;

/// Triangles whose doubled screen area is below this are skipped
pub const DEGENERATE_AREA: f32 = 1e-6;

/// Integer Bresenham line, endpoints inclusive
///
/// Steps along the major axis; steep lines swap the roles of X and Y.
#[derive(Debug, Clone)]
pub struct BresenhamLine {
    x: i32,
    y: i32,
    dx: i32,
    dy: i32,
    step_x: i32,
    step_y: i32,
    error: i32,
    steep: bool,
    remaining: u32,
}

impl BresenhamLine {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        let (x0, y0, x1, y1) = if steep {
            (y0, x0, y1, x1)
        } else {
            (x0, y0, x1, y1)
        };
        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        Self {
            x: x0,
            y: y0,
            dx,
            dy,
            step_x: if x0 < x1 { 1 } else { -1 },
            step_y: if y0 < y1 { 1 } else { -1 },
            error: dx / 2,
            steep,
            remaining: dx as u32 + 1,
        }
    }

    /// Number of steps along the major axis
    pub fn major_steps(&self) -> u32 {
        self.dx as u32
    }
}

impl Iterator for BresenhamLine {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let pixel = if self.steep {
            (self.y, self.x)
        } else {
            (self.x, self.y)
        };
        self.error -= self.dy;
        if self.error < 0 {
            self.y += self.step_y;
            self.error += self.dx;
        }
        self.x += self.step_x;
        Some(pixel)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

/// Clip a segment to `[0, width] × [0, height]` (Liang–Barsky)
///
/// Returns the parameter range `(t0, t1)` of the visible part. Runs in
/// `f64` so that far off-screen endpoints keep pixel precision.
pub fn clip_segment(a: &ScreenPoint, b: &ScreenPoint, width: usize, height: usize) -> Option<(f64, f64)> {
    if ![a.x, a.y, b.x, b.y].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (ax, ay) = (f64::from(a.x), f64::from(a.y));
    let (dx, dy) = (f64::from(b.x) - ax, f64::from(b.y) - ay);
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [(-dx, ax), (dx, width as f64 - ax), (-dy, ay), (dy, height as f64 - ay)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

fn lerp_point(a: &ScreenPoint, b: &ScreenPoint, t: f64) -> ScreenPoint {
    let lerp = |from: f32, to: f32| (f64::from(from) + (f64::from(to) - f64::from(from)) * t) as f32;
    ScreenPoint {
        x: lerp(a.x, b.x),
        y: lerp(a.y, b.y),
        depth: lerp(a.depth, b.depth),
    }
}

/// Visit the pixels of a clipped segment with their interpolated depth
fn walk_segment(
    a: &ScreenPoint,
    b: &ScreenPoint,
    width: usize,
    height: usize,
    mut plot: impl FnMut(i32, i32, f32),
) {
    let Some((t0, t1)) = clip_segment(a, b, width, height) else {
        return;
    };
    let start = lerp_point(a, b, t0);
    let end = lerp_point(a, b, t1);
    let line = BresenhamLine::new(
        start.x.floor() as i32,
        start.y.floor() as i32,
        end.x.floor() as i32,
        end.y.floor() as i32,
    );
    let steps = line.major_steps().max(1) as f32;
    for (k, (x, y)) in line.enumerate() {
        let depth = start.depth + (end.depth - start.depth) * (k as f32 / steps);
        plot(x, y, depth);
    }
}

/// Offsets of the parallel strokes that make up a thick line
fn stroke_offsets(a: &ScreenPoint, b: &ScreenPoint, thickness: u32) -> Vec<(f32, f32)> {
    if thickness <= 1 {
        return vec![(0.0, 0.0)];
    }
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len = (dx * dx + dy * dy).sqrt();
    if len < 0.001 {
        return vec![(0.0, 0.0)];
    }
    let (px, py) = (-dy / len, dx / len);
    let half = (thickness - 1) as f32 / 2.0;
    (0..thickness)
        .map(|i| {
            let offset = i as f32 - half;
            (px * offset, py * offset)
        })
        .collect()
}

fn offset_point(p: &ScreenPoint, (ox, oy): (f32, f32)) -> ScreenPoint {
    ScreenPoint {
        x: p.x + ox,
        y: p.y + oy,
        depth: p.depth,
    }
}

/// Draw a line with no depth test
pub fn draw_line(buf: &mut PixelBuffer, a: &ScreenPoint, b: &ScreenPoint, color: Color, thickness: u32) {
    let (width, height) = (buf.width(), buf.height());
    for offset in stroke_offsets(a, b, thickness) {
        walk_segment(&offset_point(a, offset), &offset_point(b, offset), width, height, |x, y, _| {
            if buf.contains(x, y) {
                buf.set_pixel(x as usize, y as usize, color);
            }
        });
    }
}

/// Draw a depth-tested line; `bias` is subtracted from every depth value
pub fn draw_line_depth(
    target: &mut DepthTarget,
    a: &ScreenPoint,
    b: &ScreenPoint,
    color: Color,
    thickness: u32,
    bias: f32,
) {
    let (width, height) = (target.width(), target.height());
    for offset in stroke_offsets(a, b, thickness) {
        walk_segment(&offset_point(a, offset), &offset_point(b, offset), width, height, |x, y, depth| {
            if x >= 0 && y >= 0 {
                target.test_and_set(x as usize, y as usize, depth - bias, color, u8::MAX);
            }
        });
    }
}

/// Signed doubled area of `(a, b, p)`; positive when `p` is left of `a → b` in a y-up frame
fn edge_function(a: &ScreenPoint, b: &ScreenPoint, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

/// Edge function with the endpoints taken in a fixed order
///
/// Two triangles sharing an edge traverse it in opposite directions; this
/// makes both see exactly negated values along it.
fn shared_edge_function(a: &ScreenPoint, b: &ScreenPoint, px: f32, py: f32) -> f32 {
    if (a.x, a.y) <= (b.x, b.y) {
        edge_function(a, b, px, py)
    } else {
        -edge_function(b, a, px, py)
    }
}

/// Top-left fill rule: whether samples exactly on `a → b` belong to the triangle
///
/// `winding` is the sign of the triangle's area. Of the two directions along
/// a shared edge exactly one is owned, so no sample is covered twice.
fn owns_edge(a: &ScreenPoint, b: &ScreenPoint, winding: f32) -> bool {
    let dx = (b.x - a.x) * winding;
    let dy = (b.y - a.y) * winding;
    dy < 0.0 || (dy == 0.0 && dx > 0.0)
}

/// Calculate barycentric coordinates for a point in a triangle
///
/// Returns `None` for degenerate triangles and for points outside. Points
/// exactly on an edge count as inside only for the edges the triangle owns
/// under the top-left rule, so a fan covers each sample once.
pub fn barycentric(tri: &[ScreenPoint; 3], px: f32, py: f32) -> Option<(f32, f32, f32)> {
    let [v0, v1, v2] = tri;
    let area = edge_function(v0, v1, v2.x, v2.y);
    if area.abs() < DEGENERATE_AREA {
        return None;
    }
    let winding = area.signum();
    let mut weights = [0.0; 3];
    for (weight, (a, b)) in weights.iter_mut().zip([(v1, v2), (v2, v0), (v0, v1)]) {
        let e = winding * shared_edge_function(a, b, px, py);
        if e < 0.0 || (e == 0.0 && !owns_edge(a, b, winding)) {
            return None;
        }
        *weight = e / area.abs();
    }
    Some((weights[0], weights[1], weights[2]))
}

/// Pixel bounds of a triangle clipped to the buffer, inclusive
fn triangle_bounds(tri: &[ScreenPoint; 3], width: usize, height: usize) -> Option<(i32, i32, i32, i32)> {
    if width == 0 || height == 0 || tri.iter().any(|v| !v.x.is_finite() || !v.y.is_finite()) {
        return None;
    }
    let min_x = tri.iter().map(|v| v.x).fold(f32::INFINITY, f32::min).floor().max(0.0);
    let max_x = tri.iter().map(|v| v.x).fold(f32::NEG_INFINITY, f32::max).ceil().min(width as f32 - 1.0);
    let min_y = tri.iter().map(|v| v.y).fold(f32::INFINITY, f32::min).floor().max(0.0);
    let max_y = tri.iter().map(|v| v.y).fold(f32::NEG_INFINITY, f32::max).ceil().min(height as f32 - 1.0);
    if min_x > max_x || min_y > max_y {
        return None;
    }
    Some((min_x as i32, max_x as i32, min_y as i32, max_y as i32))
}

fn ensure_area(tri: &[ScreenPoint; 3]) -> Result<()> {
    if edge_function(&tri[0], &tri[1], tri[2].x, tri[2].y).abs() < DEGENERATE_AREA {
        return Err(Glyph3dError::DegenerateTriangle);
    }
    Ok(())
}

/// Fill a triangle with no depth test
pub fn fill_triangle(buf: &mut PixelBuffer, tri: &[ScreenPoint; 3], color: Color, opacity: u8) -> Result<()> {
    ensure_area(tri)?;
    let Some((min_x, max_x, min_y, max_y)) = triangle_bounds(tri, buf.width(), buf.height()) else {
        return Ok(());
    };
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if barycentric(tri, x as f32 + 0.5, y as f32 + 0.5).is_some() {
                buf.blend_pixel(x as usize, y as usize, color, opacity);
            }
        }
    }
    Ok(())
}

/// Fill a triangle, interpolating depth and keeping the nearest sample per pixel
pub fn fill_triangle_depth(target: &mut DepthTarget, tri: &[ScreenPoint; 3], color: Color, opacity: u8) -> Result<()> {
    ensure_area(tri)?;
    let Some((min_x, max_x, min_y, max_y)) = triangle_bounds(tri, target.width(), target.height()) else {
        return Ok(());
    };
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if let Some((w0, w1, w2)) = barycentric(tri, x as f32 + 0.5, y as f32 + 0.5) {
                let depth = w0 * tri[0].depth + w1 * tri[1].depth + w2 * tri[2].depth;
                target.test_and_set(x as usize, y as usize, depth, color, opacity);
            }
        }
    }
    Ok(())
}

/// Fill a convex polygon as a fan around its first vertex
///
/// Degenerate fan triangles are skipped; the error is returned only when
/// every triangle was degenerate.
pub fn fill_polygon(buf: &mut PixelBuffer, points: &[ScreenPoint], color: Color, opacity: u8) -> Result<()> {
    let mut filled = false;
    if let Some((anchor, rest)) = points.split_first() {
        for pair in rest.windows(2) {
            if fill_triangle(buf, &[*anchor, pair[0], pair[1]], color, opacity).is_ok() {
                filled = true;
            }
        }
    }
    if filled {
        Ok(())
    } else {
        Err(Glyph3dError::DegenerateTriangle)
    }
}

/// Draw the closed outline of a polygon
pub fn draw_polygon_outline(buf: &mut PixelBuffer, points: &[ScreenPoint], color: Color, thickness: u32) {
    for (i, a) in points.iter().enumerate() {
        let b = &points[(i + 1) % points.len()];
        draw_line(buf, a, b, color, thickness);
    }
}

/// Draw a filled disc
pub fn fill_circle(buf: &mut PixelBuffer, cx: i32, cy: i32, radius: i32, color: Color) {
    let r_sq = radius * radius;
    for y in (cy - radius).max(0)..=(cy + radius).min(buf.height() as i32 - 1) {
        for x in (cx - radius).max(0)..=(cx + radius).min(buf.width() as i32 - 1) {
            let dx = x - cx;
            let dy = y - cy;
            if dx * dx + dy * dy <= r_sq {
                buf.set_pixel(x as usize, y as usize, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp(x: f32, y: f32, depth: f32) -> ScreenPoint {
        ScreenPoint::new(x, y, depth)
    }

    #[test]
    fn test_bresenham_horizontal() {
        let pixels: Vec<_> = BresenhamLine::new(0, 0, 5, 0).collect();
        assert_eq!(pixels, (0..=5).map(|x| (x, 0)).collect::<Vec<_>>());
    }

    #[test]
    fn test_bresenham_steep_and_reversed() {
        let steep: Vec<_> = BresenhamLine::new(0, 0, 2, 6).collect();
        assert_eq!(steep.len(), 7);
        assert_eq!(steep.first(), Some(&(0, 0)));
        assert_eq!(steep.last(), Some(&(2, 6)));
        for pair in steep.windows(2) {
            assert_eq!(pair[1].1 - pair[0].1, 1);
            assert!((0..=1).contains(&(pair[1].0 - pair[0].0)));
        }

        let reversed: Vec<_> = BresenhamLine::new(5, 3, -1, 1).collect();
        assert_eq!(reversed.first(), Some(&(5, 3)));
        assert_eq!(reversed.last(), Some(&(-1, 1)));
        assert_eq!(reversed.len(), 7);
    }

    #[test]
    fn test_bresenham_single_point() {
        let pixels: Vec<_> = BresenhamLine::new(3, 4, 3, 4).collect();
        assert_eq!(pixels, vec![(3, 4)]);
    }

    #[test]
    fn test_clip_segment() {
        let a = sp(-10.0, 5.0, 0.0);
        let b = sp(30.0, 5.0, 0.0);
        let (t0, t1) = clip_segment(&a, &b, 20, 10).unwrap();
        assert!((t0 - 0.25).abs() < 1e-6);
        assert!((t1 - 0.75).abs() < 1e-6);

        assert!(clip_segment(&sp(-5.0, -5.0, 0.0), &sp(-1.0, -1.0, 0.0), 20, 10).is_none());
        assert!(clip_segment(&sp(f32::INFINITY, 0.0, 0.0), &sp(1.0, 1.0, 0.0), 20, 10).is_none());
    }

    #[test]
    fn test_draw_line_touches_each_pixel_once() {
        let mut buf = PixelBuffer::new(10, 3, Color::BLACK);
        draw_line(&mut buf, &sp(0.0, 0.0, 0.0), &sp(5.0, 0.0, 0.0), Color::WHITE, 1);
        for x in 0..=5 {
            assert_eq!(buf.pixel(x, 0), Some(Color::WHITE));
        }
        assert_eq!(buf.count_not(Color::BLACK), 6);
    }

    #[test]
    fn test_far_off_screen_line_is_cheap_and_clipped() {
        let mut buf = PixelBuffer::new(8, 8, Color::BLACK);
        draw_line(&mut buf, &sp(-1.0e9, 4.0, 0.0), &sp(1.0e9, 4.0, 0.0), Color::WHITE, 1);
        assert_eq!(buf.count_not(Color::BLACK), 8);
    }

    #[test]
    fn test_thick_line() {
        let mut buf = PixelBuffer::new(10, 10, Color::BLACK);
        draw_line(&mut buf, &sp(1.0, 5.0, 0.0), &sp(8.0, 5.0, 0.0), Color::WHITE, 3);
        for y in 4..=6 {
            assert_eq!(buf.pixel(4, y), Some(Color::WHITE));
        }
        assert_eq!(buf.pixel(4, 3), Some(Color::BLACK));
    }

    #[test]
    fn test_line_depth_interpolates() {
        let mut target = DepthTarget::new(11, 1, Color::BLACK);
        draw_line_depth(&mut target, &sp(0.0, 0.0, 0.0), &sp(10.0, 0.0, 10.0), Color::WHITE, 1, 0.0);
        assert_eq!(target.depth_at(0, 0), Some(0.0));
        assert_eq!(target.depth_at(5, 0), Some(5.0));
        assert_eq!(target.depth_at(10, 0), Some(10.0));
    }

    #[test]
    fn test_line_respects_depth() {
        let mut target = DepthTarget::new(6, 1, Color::BLACK);
        draw_line_depth(&mut target, &sp(0.0, 0.0, 1.0), &sp(5.0, 0.0, 1.0), Color::RED, 1, 0.0);
        draw_line_depth(&mut target, &sp(0.0, 0.0, 2.0), &sp(5.0, 0.0, 2.0), Color::GREEN, 1, 0.0);
        assert_eq!(target.color().pixel(3, 0), Some(Color::RED));
        draw_line_depth(&mut target, &sp(0.0, 0.0, 1.0), &sp(5.0, 0.0, 1.0), Color::BLUE, 1, 0.0);
        assert_eq!(target.color().pixel(3, 0), Some(Color::BLUE));
    }

    #[test]
    fn test_barycentric_weights() {
        let tri = [sp(0.0, 0.0, 0.0), sp(4.0, 0.0, 0.0), sp(0.0, 4.0, 0.0)];
        let (w0, w1, w2) = barycentric(&tri, 1.0, 1.0).unwrap();
        assert!((w0 - 0.5).abs() < 1e-6);
        assert!((w1 - 0.25).abs() < 1e-6);
        assert!((w2 - 0.25).abs() < 1e-6);
        // Top and left edges are owned, the diagonal is not
        assert!(barycentric(&tri, 2.0, 0.0).is_some());
        assert!(barycentric(&tri, 0.0, 2.0).is_some());
        assert!(barycentric(&tri, 2.0, 2.0).is_none());
        let flipped = [tri[0], tri[2], tri[1]];
        assert!(barycentric(&flipped, 1.0, 1.0).is_some());
        assert!(barycentric(&tri, 3.0, 3.0).is_none());
    }

    #[test]
    fn test_degenerate_triangle_is_rejected() {
        let mut target = DepthTarget::new(8, 8, Color::BLACK);
        let tri = [sp(0.0, 0.0, 1.0), sp(3.0, 3.0, 1.0), sp(6.0, 6.0, 1.0)];
        assert!(matches!(
            fill_triangle_depth(&mut target, &tri, Color::WHITE, 255),
            Err(Glyph3dError::DegenerateTriangle)
        ));
        assert_eq!(target.color().count_not(Color::BLACK), 0);
    }

    #[test]
    fn test_nearer_triangle_wins_in_any_order() {
        let near = [sp(0.0, 0.0, 1.0), sp(8.0, 0.0, 1.0), sp(0.0, 8.0, 1.0)];
        let far = [sp(0.0, 0.0, 2.0), sp(8.0, 0.0, 2.0), sp(0.0, 8.0, 2.0)];

        let mut target = DepthTarget::new(8, 8, Color::BLACK);
        fill_triangle_depth(&mut target, &near, Color::RED, 255).unwrap();
        fill_triangle_depth(&mut target, &far, Color::GREEN, 255).unwrap();
        assert_eq!(target.color().pixel(2, 2), Some(Color::RED));

        let mut target = DepthTarget::new(8, 8, Color::BLACK);
        fill_triangle_depth(&mut target, &far, Color::GREEN, 255).unwrap();
        fill_triangle_depth(&mut target, &near, Color::RED, 255).unwrap();
        assert_eq!(target.color().pixel(2, 2), Some(Color::RED));
        assert_eq!(target.depth_at(2, 2), Some(1.0));
    }

    #[test]
    fn test_fill_triangle_interpolates_depth() {
        let mut target = DepthTarget::new(10, 10, Color::BLACK);
        let tri = [sp(0.0, 0.0, 0.0), sp(10.0, 0.0, 10.0), sp(0.0, 10.0, 0.0)];
        fill_triangle_depth(&mut target, &tri, Color::WHITE, 255).unwrap();
        let depth = target.depth_at(4, 2).unwrap();
        assert!((depth - 4.5).abs() < 1e-4);
    }

    #[test]
    fn test_adjacent_triangles_leave_no_seam() {
        let mut buf = PixelBuffer::new(8, 8, Color::BLACK);
        let quad = [sp(0.0, 0.0, 0.0), sp(8.0, 0.0, 0.0), sp(8.0, 8.0, 0.0), sp(0.0, 8.0, 0.0)];
        fill_polygon(&mut buf, &quad, Color::WHITE, 255).unwrap();
        assert_eq!(buf.count_not(Color::BLACK), 64);
    }

    #[test]
    fn test_translucent_fill_blends_each_pixel_once() {
        let mut buf = PixelBuffer::new(8, 8, Color::BLACK);
        let quad = [sp(0.0, 0.0, 0.0), sp(8.0, 0.0, 0.0), sp(8.0, 8.0, 0.0), sp(0.0, 8.0, 0.0)];
        fill_polygon(&mut buf, &quad, Color::WHITE, 128).unwrap();
        let expected = buf.pixel(5, 1).unwrap();
        assert_ne!(expected, Color::BLACK);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(buf.pixel(x, y), Some(expected), "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_translucent_depth_fill_blends_each_pixel_once() {
        let mut target = DepthTarget::new(8, 8, Color::BLACK);
        let (a, b, c, d) = (sp(0.0, 0.0, 1.0), sp(8.0, 0.0, 1.0), sp(8.0, 8.0, 1.0), sp(0.0, 8.0, 1.0));
        fill_triangle_depth(&mut target, &[a, b, c], Color::WHITE, 128).unwrap();
        fill_triangle_depth(&mut target, &[a, c, d], Color::WHITE, 128).unwrap();
        let expected = target.color().pixel(5, 1).unwrap();
        assert_eq!(target.color().pixel(3, 3), Some(expected));
        assert_eq!(target.color().pixel(1, 5), Some(expected));
    }

    #[test]
    fn test_fill_polygon_skips_collinear_fan_triangles() {
        let mut buf = PixelBuffer::new(8, 4, Color::BLACK);
        // First fan triangle is collinear along the top edge
        let strip = [
            sp(0.0, 0.0, 0.0),
            sp(4.0, 0.0, 0.0),
            sp(8.0, 0.0, 0.0),
            sp(8.0, 4.0, 0.0),
            sp(0.0, 4.0, 0.0),
        ];
        fill_polygon(&mut buf, &strip, Color::WHITE, 255).unwrap();
        assert_eq!(buf.count_not(Color::BLACK), 32);

        let line = [sp(0.0, 0.0, 0.0), sp(1.0, 1.0, 0.0), sp(2.0, 2.0, 0.0)];
        assert!(fill_polygon(&mut buf, &line, Color::WHITE, 255).is_err());
    }

    #[test]
    fn test_fill_circle() {
        let mut buf = PixelBuffer::new(9, 9, Color::BLACK);
        fill_circle(&mut buf, 4, 4, 3, Color::RED);
        assert_eq!(buf.pixel(4, 4), Some(Color::RED));
        assert_eq!(buf.pixel(7, 4), Some(Color::RED));
        assert_eq!(buf.pixel(7, 7), Some(Color::BLACK));
    }
}
