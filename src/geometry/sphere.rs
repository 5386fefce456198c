use nalgebra::Unit;

use crate::geometry::{
    Aabb, FloatType, GeometryError, Ray, Surface, SurfaceHits, WorldPoint, WorldVector,
    align_zero,
};

#[derive(Clone, Debug)]
pub struct Sphere {
    center: WorldPoint,
    radius: FloatType,
}

impl Sphere {
    pub fn new(center: WorldPoint, radius: FloatType) -> Result<Sphere, GeometryError> {
        if radius <= 0.0 {
            return Err(GeometryError::NonPositiveRadius(radius));
        }
        Ok(Sphere { center, radius })
    }

    pub fn center(&self) -> WorldPoint {
        self.center
    }

    pub fn radius(&self) -> FloatType {
        self.radius
    }
}

impl Surface for Sphere {
    fn intersect(&self, ray: &Ray, max_distance: FloatType) -> SurfaceHits {
        let mut hits = SurfaceHits::new();

        // Project the center onto the ray; tm is the distance to the foot of
        // the projection, d2 the squared perpendicular distance. A ray from
        // the center itself trivially has both at zero.
        let (tm, d2) = if ray.origin == self.center {
            (0.0, 0.0)
        } else {
            let u = self.center - ray.origin;
            let tm = ray.direction.dot(&u);
            (tm, u.norm_squared() - tm * tm)
        };

        let r2 = self.radius * self.radius;
        // Tangent rays (d == r) report no hit, boundary-exclusive.
        if align_zero(r2 - d2) <= 0.0 {
            return hits;
        }

        let half_chord = (r2 - d2).sqrt();
        for t in [tm - half_chord, tm + half_chord] {
            let t = align_zero(t);
            if t > 0.0 && align_zero(t - max_distance) <= 0.0 {
                hits.push(ray.point_at(t));
            }
        }
        hits
    }

    fn normal_at(&self, point: &WorldPoint) -> Unit<WorldVector> {
        Unit::new_normalize(point - self.center)
    }

    fn bounding_box(&self) -> Aabb {
        let r = WorldVector::repeat(self.radius);
        Aabb::finite(self.center - r, self.center + r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::test::{nonzero_world_vector, world_point};
    use assert2::assert;
    use proptest::prelude::*;

    fn unit_sphere_at_x1() -> Sphere {
        Sphere::new(WorldPoint::new(1.0, 0.0, 0.0), 1.0).unwrap()
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        assert!(
            Sphere::new(WorldPoint::origin(), 0.0).unwrap_err()
                == GeometryError::NonPositiveRadius(0.0)
        );
        assert!(
            Sphere::new(WorldPoint::origin(), -2.0).unwrap_err()
                == GeometryError::NonPositiveRadius(-2.0)
        );
    }

    #[test]
    fn skewed_ray_hits_twice() {
        // Sphere radius 1 at (1,0,0); ray from (-1,0,0) along (3,1,0).
        let sphere = unit_sphere_at_x1();
        let ray = Ray::new(WorldPoint::new(-1.0, 0.0, 0.0), WorldVector::new(3.0, 1.0, 0.0));

        let hits = sphere.intersect(&ray, FloatType::INFINITY);
        assert!(hits.len() == 2);
        assert!((hits[0] - WorldPoint::new(0.0651530, 0.3550510, 0.0)).norm() < 1e-4);
        assert!((hits[1] - WorldPoint::new(1.5348469, 0.8449489, 0.0)).norm() < 1e-4);
    }

    #[test]
    fn tangent_ray_misses() {
        // Perpendicular distance from center equals the radius.
        let sphere = unit_sphere_at_x1();
        let tangent = Ray::new(WorldPoint::new(1.0, 1.0, -5.0), WorldVector::new(0.0, 0.0, 1.0));
        assert!(sphere.intersect(&tangent, FloatType::INFINITY).is_empty());
    }

    #[test]
    fn origin_inside_yields_one_hit() {
        let sphere = unit_sphere_at_x1();
        let ray = Ray::new(WorldPoint::new(1.0, 0.0, 0.5), WorldVector::new(0.0, 0.0, 1.0));
        let hits = sphere.intersect(&ray, FloatType::INFINITY);
        assert!(hits.len() == 1);
        assert!((hits[0] - WorldPoint::new(1.0, 0.0, 1.0)).norm() < 1e-9);
    }

    #[test]
    fn sphere_behind_the_ray_misses() {
        let sphere = unit_sphere_at_x1();
        let ray = Ray::new(WorldPoint::new(1.0, 0.0, 5.0), WorldVector::new(0.0, 0.0, 1.0));
        assert!(sphere.intersect(&ray, FloatType::INFINITY).is_empty());
    }

    #[test]
    fn max_distance_filters_each_root_separately() {
        let sphere = unit_sphere_at_x1();
        let ray = Ray::new(WorldPoint::new(1.0, 0.0, -3.0), WorldVector::new(0.0, 0.0, 1.0));
        // Roots at t = 2 and t = 4.
        assert!(sphere.intersect(&ray, 1.0).is_empty());
        assert!(sphere.intersect(&ray, 3.0).len() == 1);
        assert!(sphere.intersect(&ray, 10.0).len() == 2);
    }

    #[test]
    fn normal_points_away_from_center() {
        let sphere = unit_sphere_at_x1();
        let n = sphere.normal_at(&WorldPoint::new(2.0, 0.0, 0.0));
        assert!((n.into_inner() - WorldVector::new(1.0, 0.0, 0.0)).norm() < 1e-12);
    }

    proptest! {
        /// A ray through the center exits at two points symmetric about the
        /// center, each at distance r from it.
        #[test]
        fn ray_through_center(
            center in world_point(),
            direction in nonzero_world_vector(),
            radius in 0.1..50.0f64,
        ) {
            let sphere = Sphere::new(center, radius).unwrap();
            let origin = center - direction.normalize() * (radius + 10.0);
            let ray = Ray::new(origin, direction);

            let hits = sphere.intersect(&ray, FloatType::INFINITY);
            prop_assert_eq!(hits.len(), 2);
            for p in &hits {
                prop_assert!(((p - center).norm() - radius).abs() < 1e-6);
            }
            let mid = nalgebra::center(&hits[0], &hits[1]);
            prop_assert!((mid - center).norm() < 1e-6);
        }
    }
}
