mod bvh;
mod light;

pub use bvh::Bvh;
pub use light::Light;

use assert2::assert;
use bon::bon;
use index_vec::IndexVec;
use ordered_float::OrderedFloat;

use crate::geometry::{FloatType, Ray, Shape, Surface as _, WorldPoint};
use crate::util::{BLACK, Color};

index_vec::define_index_type! {
    /// Identity of a geometry within one scene.
    pub struct GeometryId = u32;
}

/// An intersection result: the hit geometry plus the point hit on it.
/// Transient, produced per query and discarded.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoPoint {
    pub geometry: GeometryId,
    pub point: WorldPoint,
}

/// Phong-style material coefficients, each channel in [0, 1].
#[derive(Copy, Clone, Debug)]
pub struct Material {
    /// Diffuse reflection
    pub kd: Color,
    /// Specular reflection
    pub ks: Color,
    pub shininess: i32,
    /// Transparency (transmission)
    pub kt: Color,
    /// Mirror reflection
    pub kr: Color,
}

#[bon]
impl Material {
    #[builder]
    pub fn new(
        #[builder(default = BLACK)] kd: Color,
        #[builder(default = BLACK)] ks: Color,
        #[builder(default = 1)] shininess: i32,
        #[builder(default = BLACK)] kt: Color,
        #[builder(default = BLACK)] kr: Color,
    ) -> Material {
        for coefficient in [kd, ks, kt, kr] {
            for channel in [coefficient.r, coefficient.g, coefficient.b] {
                assert!((0.0..=1.0).contains(&channel));
            }
        }
        assert!(shininess >= 1);

        Material {
            kd,
            ks,
            shininess,
            kt,
            kr,
        }
    }
}

impl Default for Material {
    fn default() -> Material {
        Material::builder().build()
    }
}

/// One renderable object: a surface with its optical properties.
#[derive(Clone, Debug)]
pub struct Primitive {
    pub shape: Shape,
    pub material: Material,
    pub emission: Color,
}

#[bon]
impl Primitive {
    #[builder]
    pub fn new(
        #[builder(into)] shape: Shape,
        #[builder(default)] material: Material,
        #[builder(default = BLACK)] emission: Color,
    ) -> Primitive {
        Primitive {
            shape,
            material,
            emission,
        }
    }
}

/// A fully built scene. Construction builds the acceleration structure; the
/// scene is read-only afterwards, which is what lets rendering fan out over
/// threads without locks.
#[derive(Clone, Debug)]
pub struct Scene {
    name: String,
    background: Color,
    ambient: Color,
    lights: Vec<Light>,
    primitives: IndexVec<GeometryId, Primitive>,
    bvh: Bvh,
}

#[bon]
impl Scene {
    #[builder]
    pub fn new(
        #[builder(into)] name: String,
        #[builder(default = BLACK)] background: Color,
        #[builder(default = BLACK)] ambient: Color,
        #[builder(default)] lights: Vec<Light>,
        primitives: Vec<Primitive>,
    ) -> Scene {
        let primitives: IndexVec<GeometryId, Primitive> = primitives.into_iter().collect();
        let bvh = Bvh::build(&primitives);
        Scene {
            name,
            background,
            ambient,
            lights,
            primitives,
            bvh,
        }
    }
}

impl Scene {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn ambient(&self) -> Color {
        self.ambient
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn primitive(&self, id: GeometryId) -> &Primitive {
        &self.primitives[id]
    }

    /// All intersections along `ray` within `max_distance`, in no particular
    /// order. Empty when nothing is hit.
    pub fn find_intersections(&self, ray: &Ray, max_distance: FloatType) -> Vec<GeoPoint> {
        self.bvh.find_intersections(&self.primitives, ray, max_distance)
    }

    /// The intersection nearest to the ray origin, if any.
    pub fn closest_intersection(&self, ray: &Ray) -> Option<GeoPoint> {
        closest_geo_point(ray, self.find_intersections(ray, FloatType::INFINITY))
    }
}

/// Selects the hit nearest to the ray origin.
pub fn closest_geo_point(
    ray: &Ray,
    hits: impl IntoIterator<Item = GeoPoint>,
) -> Option<GeoPoint> {
    hits.into_iter()
        .min_by_key(|gp| OrderedFloat((gp.point - ray.origin).norm_squared()))
}
