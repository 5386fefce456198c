use nalgebra::Unit;

use crate::geometry::{
    Aabb, EPSILON, FloatType, GeometryError, Ray, Surface, SurfaceHits, WorldPoint, WorldVector,
    align_zero, is_zero,
};

/// Infinite plane given by a reference point and a unit normal.
#[derive(Clone, Debug)]
pub struct Plane {
    point: WorldPoint,
    normal: Unit<WorldVector>,
}

impl Plane {
    pub fn new(point: WorldPoint, normal: WorldVector) -> Result<Plane, GeometryError> {
        let normal = Unit::try_new(normal, EPSILON).ok_or(GeometryError::DegenerateVector)?;
        Ok(Plane { point, normal })
    }

    /// Plane through three points. Fails when the points are collinear or
    /// coincident (the cross product of the edges degenerates).
    pub fn from_points(
        p1: WorldPoint,
        p2: WorldPoint,
        p3: WorldPoint,
    ) -> Result<Plane, GeometryError> {
        Plane::new(p1, (p1 - p2).cross(&(p2 - p3)))
    }

    pub fn normal(&self) -> Unit<WorldVector> {
        self.normal
    }
}

impl Surface for Plane {
    fn intersect(&self, ray: &Ray, max_distance: FloatType) -> SurfaceHits {
        let mut hits = SurfaceHits::new();

        // A ray starting at the reference point has no usable offset vector.
        if ray.origin == self.point {
            return hits;
        }
        let nv = self.normal.dot(&ray.direction);
        if is_zero(nv) {
            // Parallel to the plane (possibly inside it).
            return hits;
        }

        let t = align_zero(self.normal.dot(&(self.point - ray.origin)) / nv);
        if t > 0.0 && align_zero(t - max_distance) <= 0.0 {
            hits.push(ray.point_at(t));
        }
        hits
    }

    fn normal_at(&self, _point: &WorldPoint) -> Unit<WorldVector> {
        self.normal
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::infinite()
    }
}
