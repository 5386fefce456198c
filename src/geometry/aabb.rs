use crate::geometry::{FloatType, Ray, WorldPoint, WorldVector};

/// Padding added around finite boxes so that tangent rays are not lost to
/// epsilon misses at the box surface.
const MARGIN: FloatType = 1e-4;

/// Axis-aligned bounding box.
///
/// Unbounded surfaces (planes, infinite tubes) get the `infinite` flag; such
/// a box contains everything and its ray test always passes.
#[derive(Clone, Copy, Debug)]
pub struct Aabb {
    pub min: WorldPoint,
    pub max: WorldPoint,
    infinite: bool,
}

impl Aabb {
    /// Finite box from raw corners, padded by [MARGIN].
    /// Requires `min <= max` componentwise.
    pub fn finite(min: WorldPoint, max: WorldPoint) -> Aabb {
        debug_assert!(min.iter().zip(max.iter()).all(|(a, b)| a <= b));
        let pad = WorldVector::repeat(MARGIN);
        Aabb {
            min: min - pad,
            max: max + pad,
            infinite: false,
        }
    }

    pub fn infinite() -> Aabb {
        Aabb {
            min: WorldPoint::new(
                FloatType::NEG_INFINITY,
                FloatType::NEG_INFINITY,
                FloatType::NEG_INFINITY,
            ),
            max: WorldPoint::new(
                FloatType::INFINITY,
                FloatType::INFINITY,
                FloatType::INFINITY,
            ),
            infinite: true,
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = WorldPoint>) -> Option<Aabb> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| {
            (min.coords.inf(&p.coords).into(), max.coords.sup(&p.coords).into())
        });
        Some(Aabb::finite(min, max))
    }

    pub fn is_infinite(&self) -> bool {
        self.infinite
    }

    pub fn center(&self) -> WorldPoint {
        ((self.min.coords + self.max.coords) / 2.0).into()
    }

    /// Half the surface area. The SAH cost model only compares areas against
    /// each other, so the constant factor is irrelevant.
    pub fn surface_area(&self) -> FloatType {
        let extent = self.max - self.min;
        extent.x * extent.y + extent.y * extent.z + extent.z * extent.x
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.coords.inf(&other.min.coords).into(),
            max: self.max.coords.sup(&other.max.coords).into(),
            infinite: self.infinite || other.infinite,
        }
    }

    /// Slab-method ray test.
    ///
    /// Accepts when the three per-axis entry/exit intervals have a non-empty
    /// intersection whose exit is positive and whose entry is within
    /// `max_distance`. A ray starting exactly on a slab plane and parallel to
    /// it produces NaN distances; `f64::max`/`min` ignore NaN operands, which
    /// leaves that axis unconstrained, same as treating the slab as infinite.
    pub fn intersects(&self, ray: &Ray, max_distance: FloatType) -> bool {
        if self.infinite {
            return true;
        }

        let mut entry = FloatType::NEG_INFINITY;
        let mut exit = FloatType::INFINITY;
        for axis in 0..3 {
            let inv = ray.inv_direction[axis];
            let to_min = (self.min[axis] - ray.origin[axis]) * inv;
            let to_max = (self.max[axis] - ray.origin[axis]) * inv;
            let (near, far) = if inv < 0.0 {
                (to_max, to_min)
            } else {
                (to_min, to_max)
            };

            entry = entry.max(near);
            exit = exit.min(far);
            if entry > exit {
                return false;
            }
        }

        exit >= 0.0 && entry <= max_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::WorldVector;
    use assert2::assert;
    use test_case::{test_case, test_matrix};

    fn unit_box() -> Aabb {
        Aabb::finite(WorldPoint::new(5.0, 5.0, 5.0), WorldPoint::new(10.0, 10.0, 10.0))
    }

    #[test]
    fn padding_is_applied() {
        let b = unit_box();
        assert!(b.min.x < 5.0);
        assert!(b.max.x > 10.0);
    }

    #[test]
    fn center_and_area() {
        let b = Aabb::finite(WorldPoint::new(0.0, 0.0, 0.0), WorldPoint::new(2.0, 4.0, 6.0));
        assert!((b.center() - WorldPoint::new(1.0, 2.0, 3.0)).norm() < 1e-9);
        // 2*4 + 4*6 + 6*2 = 44, up to the padding
        assert!((b.surface_area() - 44.0).abs() < 0.01);
    }

    #[test]
    fn union_covers_both() {
        let a = Aabb::finite(WorldPoint::new(0.0, 0.0, 0.0), WorldPoint::new(1.0, 1.0, 1.0));
        let b = Aabb::finite(WorldPoint::new(2.0, -1.0, 0.0), WorldPoint::new(3.0, 0.5, 1.0));
        let u = a.union(&b);
        assert!(u.min.x <= 0.0 && u.min.y <= -1.0);
        assert!(u.max.x >= 3.0 && u.max.y >= 1.0);
        assert!(!u.is_infinite());
        assert!(a.union(&Aabb::infinite()).is_infinite());
    }

    #[test]
    fn from_points_spans_input() {
        let b = Aabb::from_points([
            WorldPoint::new(1.0, -2.0, 0.0),
            WorldPoint::new(-1.0, 3.0, 5.0),
        ])
        .unwrap();
        assert!(b.min.x <= -1.0 && b.min.y <= -2.0 && b.min.z <= 0.0);
        assert!(b.max.x >= 1.0 && b.max.y >= 3.0 && b.max.z >= 5.0);
        assert!(Aabb::from_points([]).is_none());
    }

    /// Rays starting in or around the box along various directions must hit.
    #[test_matrix(
        [4.0, 7.0, 11.0],
        [4.0, 7.0, 11.0],
        [-1.0, 0.0, 2.0],
        [-1.0, 0.0, 2.0]
    )]
    fn hits_from_inside(px: FloatType, py: FloatType, dx: FloatType, dy: FloatType) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        // Origin z is inside the box, so the box is always at least partially ahead.
        let ray = Ray::new(
            WorldPoint::new(px, py, 7.0),
            WorldVector::new(dx, dy, 0.1),
        );
        // A box this large around the origin contains every such ray segment start.
        let big = Aabb::finite(WorldPoint::new(0.0, 0.0, 0.0), WorldPoint::new(20.0, 20.0, 20.0));
        assert!(big.intersects(&ray, FloatType::INFINITY));
    }

    #[test_case(0.0, 7.0, 7.0,  0.0, 1.0, 0.0 ; "parallel_outside_low_x")]
    #[test_case(12.0, 7.0, 7.0,  0.0, 1.0, 0.0 ; "parallel_outside_high_x")]
    #[test_case(7.0, 7.0, 12.0,  0.0, 0.0, 1.0 ; "behind_the_origin")]
    #[test_case(0.0, 0.0, 0.0,  -1.0, 1.0, 1.0 ; "corner_miss")]
    fn misses(px: FloatType, py: FloatType, pz: FloatType, dx: FloatType, dy: FloatType, dz: FloatType) {
        let ray = Ray::new(WorldPoint::new(px, py, pz), WorldVector::new(dx, dy, dz));
        assert!(!unit_box().intersects(&ray, FloatType::INFINITY));
    }

    #[test]
    fn hit_along_edge() {
        let ray = Ray::new(
            WorldPoint::new(5.0, 5.0, 0.0),
            WorldVector::new(0.0, 0.0, 1.0),
        );
        assert!(unit_box().intersects(&ray, FloatType::INFINITY));
    }

    #[test]
    fn max_distance_cuts_off() {
        let ray = Ray::new(
            WorldPoint::new(7.0, 7.0, 0.0),
            WorldVector::new(0.0, 0.0, 1.0),
        );
        let b = unit_box();
        assert!(b.intersects(&ray, 100.0));
        assert!(b.intersects(&ray, 6.0));
        assert!(!b.intersects(&ray, 2.0));
    }

    #[test]
    fn infinite_box_accepts_everything() {
        let ray = Ray::new(
            WorldPoint::new(1e6, -1e6, 0.0),
            WorldVector::new(0.0, 1.0, 0.0),
        );
        assert!(Aabb::infinite().intersects(&ray, 1e-3));
    }
}
