/// Procedural letter meshes
///
/// Every builder is a pure function of [`ShapeParams`]. The front of a
/// letter lies in the local `z = 0` plane and the back at `z = depth`.
use std::str::FromStr;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, Glyph3dError, Result};
use crate::geometry::{Mesh, VertexIndex};

/// Number of flat segments the curved letter's arc is split into
pub const CURVE_SEGMENTS: usize = 14;
/// Angular span of the curved letter's arc in degrees
pub const CURVE_ARC_DEGREES: f32 = 220.0;
/// Angle of the first arc sample in degrees
pub const CURVE_START_DEGREES: f32 = 110.0;
/// Wall thickness as a fraction of the letter width
pub const WALL_FRACTION: f32 = 0.15;

/// Closed set of letter shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Open arc letter "С"
    CurvedLetter,
    /// Letter "Д" with feet and a roof cap
    RectilinearLetter,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 2] = [ShapeKind::CurvedLetter, ShapeKind::RectilinearLetter];

    /// Builds the mesh for this kind
    pub fn build(self, params: &ShapeParams) -> GlyphMesh {
        let builder: fn(&ShapeParams) -> GlyphMesh = match self {
            ShapeKind::CurvedLetter => build_curved_letter,
            ShapeKind::RectilinearLetter => build_rectilinear_letter,
        };
        builder(params)
    }

    /// Shape-specific center point in local coordinates
    pub fn local_center(self, params: &ShapeParams) -> Point3<f32> {
        let ShapeParams {
            height: h,
            width: w,
            depth: d,
        } = *params;
        match self {
            ShapeKind::CurvedLetter => Point3::new(w * 0.6, h * 0.5, d / 2.0),
            ShapeKind::RectilinearLetter => Point3::new(w / 2.0, h * 0.4, d / 2.0),
        }
    }

    pub fn glyph(self) -> char {
        match self {
            ShapeKind::CurvedLetter => 'С',
            ShapeKind::RectilinearLetter => 'Д',
        }
    }
}

impl FromStr for ShapeKind {
    type Err = Glyph3dError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "С" | "C" | "c" | "curved" => Ok(ShapeKind::CurvedLetter),
            "Д" | "D" | "d" | "rectilinear" => Ok(ShapeKind::RectilinearLetter),
            _ => Err(Glyph3dError::UnknownName {
                kind: "shape kind",
                name: s.to_string(),
            }),
        }
    }
}

/// Letter dimensions, all strictly positive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeParams {
    pub height: f32,
    pub width: f32,
    pub depth: f32,
}

impl ShapeParams {
    pub fn new(height: f32, width: f32, depth: f32) -> Result<Self> {
        Ok(Self {
            height: ensure_positive("height", height)?,
            width: ensure_positive("width", width)?,
            depth: ensure_positive("depth", depth)?,
        })
    }
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            height: 4.0,
            width: 2.0,
            depth: 1.0,
        }
    }
}

/// A generated letter mesh with its local center
#[derive(Debug, Clone)]
pub struct GlyphMesh {
    pub mesh: Mesh,
    pub center: Point3<f32>,
}

/// Sample `CURVE_SEGMENTS + 1` points of an elliptic arc in the `z` plane
pub fn sample_arc(center: (f32, f32), radii: (f32, f32), z: f32) -> Vec<Point3<f32>> {
    (0..=CURVE_SEGMENTS)
        .map(|i| {
            let (sin, cos) = arc_angle(i).sin_cos();
            Point3::new(center.0 + radii.0 * cos, center.1 + radii.1 * sin, z)
        })
        .collect()
}

/// Angle of arc sample `i` in radians, running clockwise
fn arc_angle(i: usize) -> f32 {
    (CURVE_START_DEGREES - CURVE_ARC_DEGREES * i as f32 / CURVE_SEGMENTS as f32).to_radians()
}

/// Wall thickness as `(across, along)` the letter's height
///
/// Across is always `WALL_FRACTION · width`. Along the height it is capped at
/// a quarter of the height so short letters keep a non-empty hollow and
/// every outline stays counter-clockwise.
pub fn wall_thickness(params: &ShapeParams) -> (f32, f32) {
    let t = params.width * WALL_FRACTION;
    (t, t.min(params.height / 4.0))
}

/// Arc samples that get an internal web face
pub fn web_samples() -> [usize; 3] {
    [
        CURVE_SEGMENTS / 4,
        CURVE_SEGMENTS / 2,
        3 * CURVE_SEGMENTS / 4,
    ]
}

fn build_curved_letter(params: &ShapeParams) -> GlyphMesh {
    let ShapeParams {
        height: h,
        width: w,
        depth: d,
    } = *params;
    let (t, tv) = wall_thickness(params);
    let center = (w * 0.6, h * 0.5);
    let outer_radii = (w * 0.4, h * 0.5);
    let inner_radii = (w * 0.4 - t, h * 0.5 - tv);

    let ring = CURVE_SEGMENTS + 1;
    let mut mesh = Mesh::with_capacity(ring * 4);
    let front_outer = mesh.add_vertices(sample_arc(center, outer_radii, 0.0));
    let front_inner = mesh.add_vertices(sample_arc(center, inner_radii, 0.0));
    let back_outer = mesh.add_vertices(sample_arc(center, outer_radii, d));
    let back_inner = mesh.add_vertices(sample_arc(center, inner_radii, d));

    let fo = |i: usize| front_outer + i;
    let fi = |i: usize| front_inner + i;
    let bo = |i: usize| back_outer + i;
    let bi = |i: usize| back_inner + i;
    let chain = |start: VertexIndex| (start..start + ring).collect::<Vec<_>>();
    let last = CURVE_SEGMENTS;

    mesh.add_chain_edges(&chain(front_outer));
    mesh.add_chain_edges(&chain(front_inner));
    mesh.add_chain_edges(&chain(back_outer));
    mesh.add_chain_edges(&chain(back_inner));

    // Open ends: depth edges and the outer/inner rungs
    for i in [0, last] {
        mesh.add_edge(fo(i), bo(i));
        mesh.add_edge(fi(i), bi(i));
        mesh.add_edge(fo(i), fi(i));
        mesh.add_edge(bo(i), bi(i));
    }
    for i in web_samples() {
        mesh.add_edge(fo(i), fi(i));
        mesh.add_edge(bo(i), bi(i));
        mesh.add_edge(fo(i), bo(i));
        mesh.add_edge(fi(i), bi(i));
    }

    for i in 0..CURVE_SEGMENTS {
        let j = i + 1;
        // Front band faces -Z, back band faces +Z
        mesh.add_face(vec![fo(i), fo(j), fi(j), fi(i)]);
        mesh.add_face(vec![bi(i), bi(j), bo(j), bo(i)]);
        // Outer wall faces away from the arc center, inner wall toward it
        mesh.add_face(vec![fo(i), bo(i), bo(j), fo(j)]);
        mesh.add_face(vec![fi(i), fi(j), bi(j), bi(i)]);
    }

    // End caps
    mesh.add_face(vec![fo(0), fi(0), bi(0), bo(0)]);
    mesh.add_face(vec![fo(last), bo(last), bi(last), fi(last)]);

    // Webs across the band, facing along the sweep
    for i in web_samples() {
        mesh.add_face(vec![fo(i), bo(i), bi(i), fi(i)]);
    }

    GlyphMesh {
        mesh,
        center: ShapeKind::CurvedLetter.local_center(params),
    }
}

/// Reverse a counter-clockwise loop while keeping its first vertex
fn reversed(indices: &[VertexIndex]) -> Vec<VertexIndex> {
    let mut out = Vec::with_capacity(indices.len());
    out.extend(indices.first());
    out.extend(indices.iter().skip(1).rev());
    out
}

fn build_rectilinear_letter(params: &ShapeParams) -> GlyphMesh {
    let ShapeParams {
        height: h,
        width: w,
        depth: d,
    } = *params;
    let leg_h = h * 0.15;
    let leg_w = w * 0.1;
    let (t, tv) = wall_thickness(params);

    // Counter-clockwise outlines seen from +Z
    let outer = [
        (-leg_w, -leg_h),
        (w + leg_w, -leg_h),
        (w + leg_w, 0.0),
        (w, 0.0),
        (w, h - tv),
        (0.0, h - tv),
        (0.0, 0.0),
        (-leg_w, 0.0),
    ];
    let roof = [(0.0, h - tv), (w, h - tv), (w - t, h), (t, h)];
    let hollow = [(t, tv), (w - t, tv), (w - t, h - tv * 2.0), (t, h - tv * 2.0)];

    let layer = |z: f32| {
        outer
            .iter()
            .chain(roof.iter())
            .chain(hollow.iter())
            .map(move |&(x, y)| Point3::new(x, y, z))
            .collect::<Vec<_>>()
    };
    let per_layer = outer.len() + roof.len() + hollow.len();

    let mut mesh = Mesh::with_capacity(per_layer * 2);
    let front = mesh.add_vertices(layer(0.0));
    let back = mesh.add_vertices(layer(d));

    let o = |i: usize| i;
    let r = |i: usize| outer.len() + i;
    let ho = |i: usize| outer.len() + roof.len() + i;
    let outer_loop: Vec<_> = (0..outer.len()).map(o).collect();
    let roof_loop: Vec<_> = (0..roof.len()).map(r).collect();
    let hollow_loop: Vec<_> = (0..hollow.len()).map(ho).collect();
    let shift = |base: VertexIndex, ids: &[VertexIndex]| -> Vec<VertexIndex> {
        ids.iter().map(|&i| base + i).collect()
    };

    for ids in [&outer_loop, &roof_loop, &hollow_loop] {
        mesh.add_loop_edges(&shift(front, ids));
        mesh.add_loop_edges(&shift(back, ids));
        for &i in ids.iter() {
            mesh.add_edge(front + i, back + i);
        }
    }
    // Roof corners meet the top of the outline
    for base in [front, back] {
        mesh.add_edge(base + o(5), base + r(0));
        mesh.add_edge(base + o(4), base + r(1));
    }

    // Convex pieces covering the letter's front and back
    let pieces: [Vec<VertexIndex>; 6] = [
        // Foot strip
        vec![o(0), o(1), o(2), o(3), o(6), o(7)],
        // Frame around the hollow
        vec![o(6), o(3), ho(1), ho(0)],
        vec![o(3), o(4), ho(2), ho(1)],
        vec![o(4), o(5), ho(3), ho(2)],
        vec![o(5), o(6), ho(0), ho(3)],
        roof_loop.clone(),
    ];
    for piece in &pieces {
        mesh.add_face(reversed(&shift(front, piece)));
        mesh.add_face(shift(back, piece));
    }

    // Side walls along every boundary edge; the outline's top edge is covered by the roof
    let outer_walls = (0..outer.len()).filter(|&i| i != 4).map(|i| (o(i), o((i + 1) % outer.len())));
    let roof_walls = (1..roof.len()).map(|i| (r(i), r((i + 1) % roof.len())));
    for (a, b) in outer_walls.chain(roof_walls) {
        mesh.add_face(vec![front + a, front + b, back + b, back + a]);
    }
    for i in 0..hollow.len() {
        let (a, b) = (ho(i), ho((i + 1) % hollow.len()));
        mesh.add_face(vec![front + a, back + a, back + b, front + b]);
    }

    GlyphMesh {
        mesh,
        center: ShapeKind::RectilinearLetter.local_center(params),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::newell_normal;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use std::collections::HashSet;

    fn default_mesh(kind: ShapeKind) -> Mesh {
        kind.build(&ShapeParams::default()).mesh
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        assert!(ShapeParams::new(4.0, 2.0, 1.0).is_ok());
        assert!(matches!(
            ShapeParams::new(0.0, 2.0, 1.0),
            Err(Glyph3dError::InvalidParameter { parameter: "height", .. })
        ));
        assert!(ShapeParams::new(4.0, -2.0, 1.0).is_err());
        assert!(ShapeParams::new(4.0, 2.0, 0.0).is_err());
    }

    #[test]
    fn test_arc_has_segments_plus_one_points() {
        let arc = sample_arc((1.2, 2.0), (0.8, 2.0), 0.0);
        assert_eq!(arc.len(), CURVE_SEGMENTS + 1);
        // Opens to the left: first and last samples mirror each other about y = 2
        assert_relative_eq!(arc[0].x, arc[CURVE_SEGMENTS].x, epsilon = 1e-5);
        assert_relative_eq!(arc[0].y - 2.0, 2.0 - arc[CURVE_SEGMENTS].y, epsilon = 1e-5);
        assert!(arc[0].x < 1.2);
    }

    #[test]
    fn test_curved_letter_layout() {
        let mesh = default_mesh(ShapeKind::CurvedLetter);
        assert_eq!(mesh.vertices().len(), 4 * (CURVE_SEGMENTS + 1));
        // Bands, walls, two caps, three webs
        assert_eq!(mesh.faces().len(), 4 * CURVE_SEGMENTS + 2 + 3);
    }

    #[test]
    fn test_no_duplicate_edges() {
        for kind in ShapeKind::ALL {
            let mesh = default_mesh(kind);
            let unique: HashSet<_> = mesh.edges().iter().map(|e| e.indices()).collect();
            assert_eq!(unique.len(), mesh.edges().len(), "{kind:?}");
            for e in mesh.edges() {
                let (a, b) = e.indices();
                assert!(a < b);
                assert!(b < mesh.vertices().len());
            }
        }
    }

    #[test]
    fn test_face_normals_match_winding() {
        for kind in ShapeKind::ALL {
            let mesh = default_mesh(kind);
            for face in mesh.faces() {
                assert!(face.len() >= 3);
                let winding = newell_normal(face.indices().iter().map(|&i| &mesh.vertices()[i]));
                assert!(winding.dot(&face.normal()) > 0.99, "{kind:?} {face:?}");
            }
        }
    }

    #[test]
    fn test_curved_letter_normals_point_outward() {
        let params = ShapeParams::default();
        let mesh = ShapeKind::CurvedLetter.build(&params).mesh;
        let arc_center = Point3::new(params.width * 0.6, params.height * 0.5, params.depth / 2.0);
        let faces = mesh.faces();

        for i in 0..CURVE_SEGMENTS {
            let front = &faces[4 * i];
            let back = &faces[4 * i + 1];
            let outer_wall = &faces[4 * i + 2];
            let inner_wall = &faces[4 * i + 3];
            assert!(front.normal().z < -0.99);
            assert!(back.normal().z > 0.99);

            let radial = |f: &crate::geometry::Face| {
                let mut v = mesh.face_centroid(f) - arc_center;
                v.z = 0.0;
                v
            };
            assert!(outer_wall.normal().dot(&radial(outer_wall)) > 0.0);
            assert!(inner_wall.normal().dot(&radial(inner_wall)) < 0.0);
        }

        // Caps face away from the letter body
        let start_cap = &faces[4 * CURVE_SEGMENTS];
        let end_cap = &faces[4 * CURVE_SEGMENTS + 1];
        let body = mesh.face_centroid(&faces[4 * (CURVE_SEGMENTS / 2)]);
        assert!(start_cap.normal().dot(&(mesh.face_centroid(start_cap) - body)) > 0.0);
        assert!(end_cap.normal().dot(&(mesh.face_centroid(end_cap) - body)) > 0.0);
    }

    #[test]
    fn test_short_letters_keep_outward_normals() {
        let cases = [(0.5, 2.0, 1.0), (0.1, 20.0, 1.0), (1.0, 4.0, 0.5), (20.0, 0.1, 3.0)];
        for (h, w, d) in cases {
            let params = ShapeParams::new(h, w, d).unwrap();
            for kind in ShapeKind::ALL {
                let mesh = kind.build(&params).mesh;
                for face in mesh.faces() {
                    let winding = newell_normal(face.indices().iter().map(|&i| &mesh.vertices()[i]));
                    assert!(winding.norm() > 0.0, "{kind:?} {params:?} {face:?}");
                    assert!(winding.dot(&face.normal()) > 0.99, "{kind:?} {params:?} {face:?}");
                }
            }

            // Front and back pieces of the Д come first, alternating
            let mesh = ShapeKind::RectilinearLetter.build(&params).mesh;
            for pair in mesh.faces()[..12].chunks(2) {
                assert!(pair[0].normal().z < -0.99, "{params:?}");
                assert!(pair[1].normal().z > 0.99, "{params:?}");
            }

            let mesh = ShapeKind::CurvedLetter.build(&params).mesh;
            for i in 0..CURVE_SEGMENTS {
                assert!(mesh.faces()[4 * i].normal().z < -0.99, "{params:?}");
                assert!(mesh.faces()[4 * i + 1].normal().z > 0.99, "{params:?}");
            }
        }
    }

    #[test]
    fn test_wall_thickness_capped_by_height() {
        let (t, tv) = wall_thickness(&ShapeParams::default());
        assert_relative_eq!(t, 0.3);
        assert_relative_eq!(tv, 0.3);
        let (t, tv) = wall_thickness(&ShapeParams::new(0.5, 2.0, 1.0).unwrap());
        assert_relative_eq!(t, 0.3);
        assert_relative_eq!(tv, 0.125);
    }

    #[test]
    fn test_web_faces_follow_the_sweep() {
        let mesh = default_mesh(ShapeKind::CurvedLetter);
        let webs = &mesh.faces()[4 * CURVE_SEGMENTS + 2..];
        assert_eq!(webs.len(), 3);
        for (face, i) in webs.iter().zip(web_samples()) {
            let a = arc_angle(i);
            let sweep = Vector3::new(a.sin(), -a.cos(), 0.0);
            assert!(face.normal().dot(&sweep) > 0.9);
        }
    }

    #[test]
    fn test_rectilinear_letter_layout() {
        let mesh = default_mesh(ShapeKind::RectilinearLetter);
        assert_eq!(mesh.vertices().len(), 32);
        let front: Vec<_> = mesh.faces().iter().filter(|f| f.normal().z < -0.99).collect();
        let back: Vec<_> = mesh.faces().iter().filter(|f| f.normal().z > 0.99).collect();
        assert_eq!(front.len(), 6);
        assert_eq!(back.len(), 6);
        // 7 outline walls, 3 roof walls, 4 hollow walls
        assert_eq!(mesh.faces().len(), 12 + 7 + 3 + 4);
    }

    #[test]
    fn test_rectilinear_front_covers_letter_area() {
        let params = ShapeParams::default();
        let mesh = ShapeKind::RectilinearLetter.build(&params).mesh;
        let (h, w) = (params.height, params.width);
        let t = w * WALL_FRACTION;

        let area: f32 = mesh
            .faces()
            .iter()
            .filter(|f| f.normal().z < -0.99)
            .map(|f| {
                let pts: Vec<_> = f.indices().iter().map(|&i| mesh.vertices()[i]).collect();
                let mut twice = 0.0;
                for k in 0..pts.len() {
                    let (p, q) = (pts[k], pts[(k + 1) % pts.len()]);
                    twice += p.x * q.y - q.x * p.y;
                }
                -twice / 2.0
            })
            .sum();

        let foot = (w + 2.0 * w * 0.1) * h * 0.15;
        let body = w * (h - t) - (w - 2.0 * t) * (h - 3.0 * t);
        let roof = (w + (w - 2.0 * t)) / 2.0 * t;
        assert_relative_eq!(area, foot + body + roof, epsilon = 1e-4);
    }

    #[test]
    fn test_centers_are_shape_specific() {
        let params = ShapeParams::new(5.0, 3.0, 2.0).unwrap();
        assert_relative_eq!(
            ShapeKind::CurvedLetter.build(&params).center,
            Point3::new(1.8, 2.5, 1.0),
            epsilon = 1e-6
        );
        assert_relative_eq!(
            ShapeKind::RectilinearLetter.build(&params).center,
            Point3::new(1.5, 2.0, 1.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_shape_kind_from_str() {
        assert_eq!("С".parse::<ShapeKind>().unwrap(), ShapeKind::CurvedLetter);
        assert_eq!("D".parse::<ShapeKind>().unwrap(), ShapeKind::RectilinearLetter);
        assert!("Q".parse::<ShapeKind>().is_err());
    }
}
