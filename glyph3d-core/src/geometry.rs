/// Indexed polygon mesh primitives
use nalgebra::{Point3, Vector3};

/// Position in a mesh's vertex list
pub type VertexIndex = usize;

/// An undirected edge stored as `(min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    a: VertexIndex,
    b: VertexIndex,
}

impl Edge {
    pub fn new(v0: VertexIndex, v1: VertexIndex) -> Self {
        Self {
            a: v0.min(v1),
            b: v0.max(v1),
        }
    }

    pub fn indices(&self) -> (VertexIndex, VertexIndex) {
        (self.a, self.b)
    }
}

/// A planar polygon referencing mesh vertices by index
///
/// Vertices are wound counter-clockwise when seen from the side the normal
/// points to.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    indices: Vec<VertexIndex>,
    normal: Vector3<f32>,
}

impl Face {
    pub fn indices(&self) -> &[VertexIndex] {
        &self.indices
    }

    /// Outward unit normal in local space
    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Fan of triangles around the first vertex
    pub fn triangles(&self) -> impl Iterator<Item = [VertexIndex; 3]> + '_ {
        let anchor = self.indices.first().copied().unwrap_or_default();
        self.indices
            .get(1..)
            .unwrap_or_default()
            .windows(2)
            .map(move |pair| [anchor, pair[0], pair[1]])
    }
}

/// A 3D mesh of vertices, deduplicated edges, and polygon faces
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: Vec<Point3<f32>>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            edges: Vec::new(),
            faces: Vec::new(),
        }
    }

    pub fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Append vertices and return the index of the first one
    pub fn add_vertices(&mut self, points: impl IntoIterator<Item = Point3<f32>>) -> VertexIndex {
        let first = self.vertices.len();
        self.vertices.extend(points);
        first
    }

    /// Add an edge unless the same unordered pair is already present
    ///
    /// Returns `false` when the edge was a duplicate.
    pub fn add_edge(&mut self, v0: VertexIndex, v1: VertexIndex) -> bool {
        let edge = Edge::new(v0, v1);
        if self.edges.contains(&edge) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    /// Add a face; its normal is derived from the winding
    pub fn add_face(&mut self, indices: Vec<VertexIndex>) {
        let normal = newell_normal(indices.iter().map(|&i| &self.vertices[i]));
        self.faces.push(Face { indices, normal });
    }

    /// Add edges around a closed loop of vertices
    pub fn add_loop_edges(&mut self, indices: &[VertexIndex]) {
        for (i, &v) in indices.iter().enumerate() {
            self.add_edge(v, indices[(i + 1) % indices.len()]);
        }
    }

    /// Add edges along an open chain of vertices
    pub fn add_chain_edges(&mut self, indices: &[VertexIndex]) {
        for pair in indices.windows(2) {
            self.add_edge(pair[0], pair[1]);
        }
    }

    /// Arithmetic mean of a face's local vertices
    pub fn face_centroid(&self, face: &Face) -> Point3<f32> {
        centroid(face.indices().iter().map(|&i| self.vertices[i]))
    }
}

/// Unit normal of a polygon by Newell's method
///
/// Degenerate polygons yield the zero vector.
pub fn newell_normal<'a>(points: impl IntoIterator<Item = &'a Point3<f32>>) -> Vector3<f32> {
    let points: Vec<&Point3<f32>> = points.into_iter().collect();
    let mut normal = Vector3::zeros();
    for (i, current) in points.iter().enumerate() {
        let next = points[(i + 1) % points.len()];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros)
}

/// Arithmetic mean of a set of points
pub fn centroid(points: impl IntoIterator<Item = Point3<f32>>) -> Point3<f32> {
    let mut sum = Vector3::zeros();
    let mut count = 0usize;
    for p in points {
        sum += p.coords;
        count += 1;
    }
    if count == 0 {
        return Point3::origin();
    }
    Point3::from(sum / count as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_vertices([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        mesh
    }

    #[test]
    fn test_edges_are_canonical_and_deduplicated() {
        let mut mesh = unit_square();
        assert!(mesh.add_edge(2, 1));
        assert!(!mesh.add_edge(1, 2));
        assert_eq!(mesh.edges()[0].indices(), (1, 2));

        mesh.add_loop_edges(&[0, 1, 2, 3]);
        assert_eq!(mesh.edges().len(), 4);
    }

    #[test]
    fn test_face_normal_follows_winding() {
        let mut mesh = unit_square();
        mesh.add_face(vec![0, 1, 2, 3]);
        mesh.add_face(vec![0, 3, 2, 1]);
        assert_relative_eq!(mesh.faces()[0].normal(), Vector3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(mesh.faces()[1].normal(), Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_fan_triangles() {
        let mut mesh = unit_square();
        mesh.add_face(vec![0, 1, 2, 3]);
        let triangles: Vec<_> = mesh.faces()[0].triangles().collect();
        assert_eq!(triangles, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_degenerate_normal_is_zero() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert_eq!(newell_normal(points.iter()), Vector3::zeros());
    }

    #[test]
    fn test_centroid() {
        let mesh = unit_square();
        assert_relative_eq!(
            centroid(mesh.vertices().iter().copied()),
            Point3::new(0.5, 0.5, 0.0)
        );
        assert_eq!(centroid(std::iter::empty()), Point3::origin());
    }
}
