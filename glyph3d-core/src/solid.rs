/// A transformable letter solid with an eagerly refreshed world-space cache
use nalgebra::{Point3, Vector3};

use crate::error::Result;
use crate::geometry::{centroid, Edge, Face, Mesh, VertexIndex};
use crate::glyph::{ShapeKind, ShapeParams};
use crate::transform::{Axis, Transform};

#[derive(Debug, Clone)]
pub struct Solid {
    kind: ShapeKind,
    params: ShapeParams,
    transform: Transform,
    mesh: Mesh,
    local_center: Point3<f32>,
    world_vertices: Vec<Point3<f32>>,
    world_center: Point3<f32>,
    show_center: bool,
}

impl Solid {
    /// Build a solid at `position`; fails if any dimension is not positive
    pub fn new(kind: ShapeKind, params: ShapeParams, position: Point3<f32>) -> Result<Self> {
        let params = ShapeParams::new(params.height, params.width, params.depth)?;
        let glyph = kind.build(&params);
        let mut solid = Self {
            kind,
            params,
            transform: Transform::at(position),
            mesh: glyph.mesh,
            local_center: glyph.center,
            world_vertices: Vec::new(),
            world_center: Point3::origin(),
            show_center: true,
        };
        solid.refresh_world();
        Ok(solid)
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn params(&self) -> &ShapeParams {
        &self.params
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn edges(&self) -> &[Edge] {
        self.mesh.edges()
    }

    pub fn faces(&self) -> &[Face] {
        self.mesh.faces()
    }

    pub fn local_center(&self) -> Point3<f32> {
        self.local_center
    }

    pub fn world_center(&self) -> Point3<f32> {
        self.world_center
    }

    pub fn world_vertices(&self) -> &[Point3<f32>] {
        &self.world_vertices
    }

    /// Current world position of a vertex
    pub fn world_vertex(&self, index: VertexIndex) -> Point3<f32> {
        self.world_vertices[index]
    }

    /// World positions of a face's vertices in winding order
    pub fn face_world_points<'a>(&'a self, face: &'a Face) -> impl Iterator<Item = Point3<f32>> + 'a {
        face.indices().iter().map(|&i| self.world_vertices[i])
    }

    pub fn face_world_centroid(&self, face: &Face) -> Point3<f32> {
        centroid(self.face_world_points(face))
    }

    pub fn face_world_normal(&self, face: &Face) -> Vector3<f32> {
        self.transform.normal_to_world(&face.normal())
    }

    pub fn show_center(&self) -> bool {
        self.show_center
    }

    /// Flip the center marker flag and return the new value
    pub fn toggle_center(&mut self) -> bool {
        self.show_center = !self.show_center;
        self.show_center
    }

    /// Replace the shape dimensions and rebuild the mesh
    ///
    /// On error the solid keeps its previous dimensions.
    pub fn set_params(&mut self, height: f32, width: f32, depth: f32) -> Result<()> {
        let params = ShapeParams::new(height, width, depth)?;
        let glyph = self.kind.build(&params);
        self.params = params;
        self.mesh = glyph.mesh;
        self.local_center = glyph.center;
        self.refresh_world();
        Ok(())
    }

    pub fn set_position(&mut self, position: Point3<f32>) {
        self.transform.position = position;
        self.refresh_world();
    }

    pub fn translate(&mut self, axis: Axis, delta: f32) {
        self.transform.translate(axis, delta);
        self.refresh_world();
    }

    pub fn rotate(&mut self, axis: Axis, delta_degrees: f32) {
        self.transform.rotate(axis, delta_degrees);
        self.refresh_world();
    }

    pub fn scale(&mut self, axis: Axis, factor: f32) -> Result<()> {
        self.transform.scale(axis, factor)?;
        self.refresh_world();
        Ok(())
    }

    pub fn set_uniform_scale(&mut self, factor: f32) -> Result<()> {
        self.transform.set_uniform_scale(factor)?;
        self.refresh_world();
        Ok(())
    }

    pub fn reflect(&mut self, axis: Axis) {
        self.transform.reflect(axis);
        self.refresh_world();
    }

    fn refresh_world(&mut self) {
        let model = self.transform.model_matrix();
        self.world_vertices = self
            .mesh
            .vertices()
            .iter()
            .map(|v| model.transform_point(v))
            .collect();
        self.world_center = model.transform_point(&self.local_center);
    }
}
