use itertools::Itertools as _;
use nalgebra::Unit;

use crate::geometry::{
    Aabb, EPSILON, FloatType, GeometryError, Plane, Ray, Surface, SurfaceHits, WorldPoint,
    WorldVector, align_zero, is_zero,
};

/// Convex planar polygon with vertices ordered along the boundary.
///
/// Triangles are just 3-vertex polygons; see [Polygon::triangle].
#[derive(Clone, Debug)]
pub struct Polygon {
    vertices: Vec<WorldPoint>,
    /// Supporting plane derived from the first three vertices.
    plane: Plane,
}

impl Polygon {
    pub fn new(vertices: Vec<WorldPoint>) -> Result<Polygon, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices(vertices.len()));
        }

        let plane = Plane::from_points(vertices[0], vertices[1], vertices[2])
            .map_err(|_| GeometryError::DegenerateEdge)?;
        if vertices.len() == 3 {
            return Ok(Polygon { vertices, plane });
        }

        let n = plane.normal();

        // Walk consecutive edge pairs; the polygon is convex and correctly
        // ordered iff every turn bends the same way relative to the normal.
        let mut edge1 = vertices[vertices.len() - 1] - vertices[vertices.len() - 2];
        let mut edge2 = vertices[0] - vertices[vertices.len() - 1];
        let positive = Self::turn_sign(&edge1, &edge2, &n)? > 0.0;

        for i in 1..vertices.len() {
            if !is_zero((vertices[i] - vertices[0]).dot(&n)) {
                return Err(GeometryError::NonPlanarVertices);
            }
            edge1 = edge2;
            edge2 = vertices[i] - vertices[i - 1];
            if (Self::turn_sign(&edge1, &edge2, &n)? > 0.0) != positive {
                return Err(GeometryError::NonConvex);
            }
        }

        Ok(Polygon { vertices, plane })
    }

    pub fn triangle(
        a: WorldPoint,
        b: WorldPoint,
        c: WorldPoint,
    ) -> Result<Polygon, GeometryError> {
        Polygon::new(vec![a, b, c])
    }

    pub fn vertices(&self) -> &[WorldPoint] {
        &self.vertices
    }

    fn turn_sign(
        edge1: &WorldVector,
        edge2: &WorldVector,
        normal: &Unit<WorldVector>,
    ) -> Result<FloatType, GeometryError> {
        let cross = edge1.cross(edge2);
        if cross.norm() < EPSILON {
            // Zero-length edge or three collinear vertices.
            return Err(GeometryError::DegenerateEdge);
        }
        Ok(cross.dot(normal))
    }
}

impl Surface for Polygon {
    fn intersect(&self, ray: &Ray, max_distance: FloatType) -> SurfaceHits {
        let hits = self.plane.intersect(ray, max_distance);
        if hits.is_empty() {
            return hits;
        }

        // The hit is inside iff the ray direction sees all edges winding the
        // same way: dot(dir, (v_i - origin) x (v_i+1 - origin)) keeps one
        // sign. A zero lands exactly on an edge or vertex and is rejected.
        let mut sign = 0.0;
        for (a, b) in self.vertices.iter().circular_tuple_windows() {
            let edge_normal = (a - ray.origin).cross(&(b - ray.origin));
            let d = align_zero(ray.direction.dot(&edge_normal));
            if d == 0.0 || d * sign < 0.0 {
                return SurfaceHits::new();
            }
            sign = d;
        }
        hits
    }

    fn normal_at(&self, _point: &WorldPoint) -> Unit<WorldVector> {
        self.plane.normal()
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().copied())
            .expect("a polygon always has vertices")
    }
}
