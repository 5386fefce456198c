mod aabb;
mod plane;
mod polygon;
mod sphere;
mod tube;

pub use aabb::Aabb;
pub use plane::Plane;
pub use polygon::Polygon;
pub use sphere::Sphere;
pub use tube::{Cylinder, Tube};

use arrayvec::ArrayVec;
use nalgebra::Unit;
use thiserror::Error;

pub type FloatType = f64;

pub type WorldPoint = nalgebra::Point3<FloatType>;
pub type WorldVector = nalgebra::Vector3<FloatType>;

/// Anything closer to zero than this is considered zero.
pub const EPSILON: FloatType = 1e-10;

/// Offset applied to secondary ray origins to keep them off the surface they
/// start from.
pub const DELTA: FloatType = 0.1;

/// Snaps values within [EPSILON] of zero to exactly zero.
///
/// All sign tests in the intersection and shading code go through this (or
/// [is_zero]) so that grazing configurations resolve consistently to "no hit"
/// instead of flickering on floating point noise.
pub fn align_zero(x: FloatType) -> FloatType {
    if x.abs() < EPSILON { 0.0 } else { x }
}

pub fn is_zero(x: FloatType) -> bool {
    x.abs() < EPSILON
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScreenPoint {
    pub x: u32,
    pub y: u32,
}

impl ScreenPoint {
    pub fn new(x: u32, y: u32) -> ScreenPoint {
        ScreenPoint { x, y }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub fn new(width: u32, height: u32) -> ScreenSize {
        ScreenSize { width, height }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Ray {
    pub origin: WorldPoint,
    /// Normalized direction of the ray, fixed at construction
    pub direction: Unit<WorldVector>,

    /// Componentwise inverse of the ray direction.
    /// Zeros in direction get turned into positive infinity regardless of the sign of the zero
    pub inv_direction: WorldVector,
}

impl Ray {
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Ray {
        debug_assert!(direction.norm() > EPSILON);
        let direction = Unit::new_normalize(direction);
        let inv_direction = direction.map(|x| if x == 0.0 { FloatType::INFINITY } else { 1.0 / x });

        Ray {
            origin,
            direction,
            inv_direction,
        }
    }

    /// Secondary ray starting [DELTA] off the surface, on whichever side of
    /// `normal` the direction leaves through. Used for shadow, reflection and
    /// refraction rays to avoid immediate self-intersection.
    pub fn offset(origin: WorldPoint, direction: WorldVector, normal: &Unit<WorldVector>) -> Ray {
        let side = if direction.dot(normal) > 0.0 {
            DELTA
        } else {
            -DELTA
        };
        Ray::new(origin + normal.as_ref() * side, direction)
    }

    pub fn point_at(&self, distance: FloatType) -> WorldPoint {
        self.origin + self.direction.as_ref() * distance
    }
}

/// Intersection points a single surface can report for one ray.
/// Convex surfaces cross a line at most twice.
pub type SurfaceHits = ArrayVec<WorldPoint, 2>;

/// Renderable surface
pub trait Surface {
    /// All intersections with `ray` at parametric distance in `(0, max_distance]`,
    /// epsilon-exclusive at both ends. Empty means no hit; numeric edge cases
    /// (parallel, tangent, grazing) are misses, never errors.
    fn intersect(&self, ray: &Ray, max_distance: FloatType) -> SurfaceHits;

    /// Unit normal at a point assumed to lie on the surface.
    fn normal_at(&self, point: &WorldPoint) -> Unit<WorldVector>;

    fn bounding_box(&self) -> Aabb;
}

/// Closed set of surface variants.
#[derive(Clone, Debug)]
pub enum Shape {
    Plane(Plane),
    Sphere(Sphere),
    Polygon(Polygon),
    Tube(Tube),
    Cylinder(Cylinder),
}

impl Surface for Shape {
    fn intersect(&self, ray: &Ray, max_distance: FloatType) -> SurfaceHits {
        match self {
            Shape::Plane(s) => s.intersect(ray, max_distance),
            Shape::Sphere(s) => s.intersect(ray, max_distance),
            Shape::Polygon(s) => s.intersect(ray, max_distance),
            Shape::Tube(s) => s.intersect(ray, max_distance),
            Shape::Cylinder(s) => s.intersect(ray, max_distance),
        }
    }

    fn normal_at(&self, point: &WorldPoint) -> Unit<WorldVector> {
        match self {
            Shape::Plane(s) => s.normal_at(point),
            Shape::Sphere(s) => s.normal_at(point),
            Shape::Polygon(s) => s.normal_at(point),
            Shape::Tube(s) => s.normal_at(point),
            Shape::Cylinder(s) => s.normal_at(point),
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            Shape::Plane(s) => s.bounding_box(),
            Shape::Sphere(s) => s.bounding_box(),
            Shape::Polygon(s) => s.bounding_box(),
            Shape::Tube(s) => s.bounding_box(),
            Shape::Cylinder(s) => s.bounding_box(),
        }
    }
}

impl From<Plane> for Shape {
    fn from(value: Plane) -> Shape {
        Shape::Plane(value)
    }
}

impl From<Sphere> for Shape {
    fn from(value: Sphere) -> Shape {
        Shape::Sphere(value)
    }
}

impl From<Polygon> for Shape {
    fn from(value: Polygon) -> Shape {
        Shape::Polygon(value)
    }
}

impl From<Tube> for Shape {
    fn from(value: Tube) -> Shape {
        Shape::Tube(value)
    }
}

impl From<Cylinder> for Shape {
    fn from(value: Cylinder) -> Shape {
        Shape::Cylinder(value)
    }
}

/// Scene construction failures. These are fatal and reported before any ray
/// is traced; the rendering hot path assumes all geometry is valid.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("direction or normal vector is degenerate (zero length)")]
    DegenerateVector,

    #[error("a polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("polygon vertices do not lie in a single plane")]
    NonPlanarVertices,

    #[error("polygon vertices are not in convex order")]
    NonConvex,

    #[error("polygon has a zero-length or collinear edge")]
    DegenerateEdge,

    #[error("radius must be positive, got {0}")]
    NonPositiveRadius(FloatType),

    #[error("height must be positive, got {0}")]
    NonPositiveHeight(FloatType),
}
