use arrayvec::ArrayVec;
use nalgebra::Unit;

use crate::geometry::{
    Aabb, FloatType, GeometryError, Plane, Ray, Surface, SurfaceHits, WorldPoint, WorldVector,
    align_zero, is_zero,
};

/// Infinite cylinder around an axis ray.
#[derive(Clone, Debug)]
pub struct Tube {
    axis: Ray,
    radius: FloatType,
}

impl Tube {
    pub fn new(axis: Ray, radius: FloatType) -> Result<Tube, GeometryError> {
        if radius <= 0.0 {
            return Err(GeometryError::NonPositiveRadius(radius));
        }
        Ok(Tube { axis, radius })
    }

    pub fn radius(&self) -> FloatType {
        self.radius
    }

    pub fn axis(&self) -> &Ray {
        &self.axis
    }

    /// Signed distance of `point`'s projection along the axis from the axis
    /// origin.
    fn axial_offset(&self, point: &WorldPoint) -> FloatType {
        self.axis.direction.dot(&(point - self.axis.origin))
    }

    /// Parametric distances where `ray` crosses the infinite lateral surface.
    fn lateral_roots(&self, ray: &Ray) -> ArrayVec<FloatType, 2> {
        let mut roots = ArrayVec::new();

        let v = self.axis.direction;
        // Components of the ray direction and origin offset perpendicular to
        // the axis; the lateral surface only lives in that subspace.
        let d = ray.direction.as_ref();
        let d_perp = d - v.as_ref() * d.dot(&v);
        let dp = ray.origin - self.axis.origin;
        let dp_perp = dp - v.as_ref() * dp.dot(&v);

        let a = d_perp.norm_squared();
        if is_zero(a) {
            // Ray parallel to the axis never crosses the lateral surface.
            return roots;
        }
        let b = 2.0 * d_perp.dot(&dp_perp);
        let c = dp_perp.norm_squared() - self.radius * self.radius;

        let discriminant = align_zero(b * b - 4.0 * a * c);
        if discriminant <= 0.0 {
            // Miss, or tangent (grazing counts as no hit).
            return roots;
        }

        let sqrt_disc = discriminant.sqrt();
        roots.push((-b - sqrt_disc) / (2.0 * a));
        roots.push((-b + sqrt_disc) / (2.0 * a));
        roots
    }
}

impl Surface for Tube {
    fn intersect(&self, ray: &Ray, max_distance: FloatType) -> SurfaceHits {
        let mut hits = SurfaceHits::new();
        for root in self.lateral_roots(ray) {
            let t = align_zero(root);
            if t > 0.0 && align_zero(t - max_distance) <= 0.0 {
                hits.push(ray.point_at(t));
            }
        }
        hits
    }

    fn normal_at(&self, point: &WorldPoint) -> Unit<WorldVector> {
        // Direction from the point's projection on the axis to the point.
        let t = self.axial_offset(point);
        let foot = if is_zero(t) {
            self.axis.origin
        } else {
            self.axis.point_at(t)
        };
        Unit::new_normalize(point - foot)
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::infinite()
    }
}

/// Finite cylinder: a [Tube] bounded by two cap discs. Composes the tube's
/// lateral math instead of inheriting it so each part stays testable alone.
#[derive(Clone, Debug)]
pub struct Cylinder {
    tube: Tube,
    height: FloatType,
}

impl Cylinder {
    pub fn new(axis: Ray, radius: FloatType, height: FloatType) -> Result<Cylinder, GeometryError> {
        if height <= 0.0 {
            return Err(GeometryError::NonPositiveHeight(height));
        }
        Ok(Cylinder {
            tube: Tube::new(axis, radius)?,
            height,
        })
    }

    pub fn height(&self) -> FloatType {
        self.height
    }

    fn base(&self) -> WorldPoint {
        self.tube.axis.origin
    }

    fn top(&self) -> WorldPoint {
        self.tube.axis.point_at(self.height)
    }

    /// Intersection of `ray` with one cap disc, if strictly inside its rim.
    fn cap_hit(
        &self,
        center: WorldPoint,
        ray: &Ray,
        max_distance: FloatType,
    ) -> Option<WorldPoint> {
        // Cap planes share the axis direction as normal; the axis direction
        // is non-zero by Ray construction, so this cannot fail.
        let plane = Plane::new(center, self.tube.axis.direction.into_inner()).ok()?;
        let hit = plane.intersect(ray, max_distance).into_iter().next()?;
        let r2 = self.tube.radius * self.tube.radius;
        (align_zero(r2 - (hit - center).norm_squared()) > 0.0).then_some(hit)
    }
}

impl Surface for Cylinder {
    fn intersect(&self, ray: &Ray, max_distance: FloatType) -> SurfaceHits {
        let mut hits = SurfaceHits::new();

        // Lateral surface, restricted to the axial span strictly between the caps.
        for root in self.tube.lateral_roots(ray) {
            let t = align_zero(root);
            if t > 0.0 && align_zero(t - max_distance) <= 0.0 {
                let point = ray.point_at(t);
                let h = self.tube.axial_offset(&point);
                if align_zero(h) > 0.0 && align_zero(h - self.height) < 0.0 {
                    hits.push(point);
                }
            }
        }

        // Cap discs. A convex solid is crossed at most twice, so the lateral
        // pass leaves room for every cap hit that can occur.
        for center in [self.base(), self.top()] {
            if hits.len() == 2 {
                break;
            }
            if let Some(point) = self.cap_hit(center, ray, max_distance) {
                hits.push(point);
            }
        }
        hits
    }

    fn normal_at(&self, point: &WorldPoint) -> Unit<WorldVector> {
        let h = align_zero(self.tube.axial_offset(point));
        let v = self.tube.axis.direction;
        if h <= 0.0 {
            // Bottom cap (and its rim) points against the axis.
            -v
        } else if align_zero(h - self.height) >= 0.0 {
            v
        } else {
            self.tube.normal_at(point)
        }
    }

    fn bounding_box(&self) -> Aabb {
        // Conservative: both cap centers padded by the radius on every axis.
        let r = WorldVector::repeat(self.tube.radius);
        let (base, top) = (self.base(), self.top());
        let min = (base.coords.inf(&top.coords) - r).into();
        let max = (base.coords.sup(&top.coords) + r).into();
        Aabb::finite(min, max)
    }
}
