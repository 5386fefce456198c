use nalgebra::Unit;

use crate::geometry::{FloatType, Ray, Surface as _, WorldVector, align_zero};
use crate::scene::{GeoPoint, Light, Scene};
use crate::util::{BLACK, Color, ColorExt as _, WHITE};

/// Recursion depth for the secondary (reflection and refraction) rays.
pub const MAX_CALC_COLOR_LEVEL: usize = 10;
/// Contributions attenuated below this on every channel are dropped.
pub const MIN_CALC_COLOR_K: FloatType = 0.001;

/// Whitted-style shader over a read-only scene. Holds no mutable state, so
/// one instance can serve any number of threads.
#[derive(Copy, Clone)]
pub struct RayTracer<'a> {
    scene: &'a Scene,
}

impl<'a> RayTracer<'a> {
    pub fn new(scene: &'a Scene) -> RayTracer<'a> {
        RayTracer { scene }
    }

    /// Color seen along `ray`, background if it escapes the scene.
    pub fn trace_ray(&self, ray: &Ray) -> Color {
        match self.scene.closest_intersection(ray) {
            Some(hit) => {
                self.calc_color(&hit, ray, MAX_CALC_COLOR_LEVEL, WHITE) + self.scene.ambient()
            }
            None => self.scene.background(),
        }
    }

    /// Arithmetic mean over a bundle of rays, for multi-sample pixels.
    pub fn trace_rays(&self, rays: &[Ray]) -> Color {
        debug_assert!(!rays.is_empty());
        let sum = rays
            .iter()
            .fold(BLACK, |sum, ray| sum + self.trace_ray(ray));
        sum * (1.0 / rays.len() as FloatType)
    }

    /// `k` is the product of the attenuation coefficients along the path that
    /// led to this hit; it only shrinks with depth and gates the shadow and
    /// secondary ray work below.
    fn calc_color(&self, hit: &GeoPoint, ray: &Ray, level: usize, k: Color) -> Color {
        let color = self.local_effects(hit, ray, k);
        if level <= 1 {
            color
        } else {
            color + self.global_effects(hit, ray, level, k)
        }
    }

    /// Emission plus the Phong diffuse and specular terms of every light that
    /// reaches the hit point.
    fn local_effects(&self, hit: &GeoPoint, ray: &Ray, k: Color) -> Color {
        let primitive = self.scene.primitive(hit.geometry);
        let mut color = primitive.emission;

        let v = ray.direction;
        let n = primitive.shape.normal_at(&hit.point);
        let nv = align_zero(n.dot(&v));
        if nv == 0.0 {
            // Grazing view direction, no shading possible.
            return color;
        }

        let material = &primitive.material;
        for light in self.scene.lights() {
            let l = light.l(&hit.point);
            let nl = align_zero(n.dot(&l));
            if nl * nv <= 0.0 {
                // Light and viewer on opposite sides of the surface.
                continue;
            }

            let ktr = self.transparency(hit, light, &l, &n);
            if ktr.modulate(k).below(MIN_CALC_COLOR_K) {
                continue;
            }

            let diffuse = material.kd * nl.abs();
            let r = n.as_ref() * (2.0 * nl) - l.as_ref();
            let vr = align_zero(v.dot(&r)).max(0.0);
            let specular = material.ks * vr.powi(material.shininess);

            let intensity = light.intensity_at(&hit.point).modulate(ktr);
            color = color + intensity.modulate(diffuse + specular);
        }
        color
    }

    /// How much of `light` reaches the hit point: the componentwise product
    /// of the transparency of everything standing between them. Fully black
    /// means a hard shadow.
    fn transparency(
        &self,
        hit: &GeoPoint,
        light: &Light,
        l: &Unit<WorldVector>,
        n: &Unit<WorldVector>,
    ) -> Color {
        let to_light = Ray::offset(hit.point, -l.as_ref(), n);
        let light_distance = light.distance(&hit.point);

        let mut ktr = WHITE;
        for occluder in self.scene.find_intersections(&to_light, light_distance) {
            ktr = ktr.modulate(self.scene.primitive(occluder.geometry).material.kt);
            if ktr.below(MIN_CALC_COLOR_K) {
                return BLACK;
            }
        }
        ktr
    }

    fn global_effects(&self, hit: &GeoPoint, ray: &Ray, level: usize, k: Color) -> Color {
        let primitive = self.scene.primitive(hit.geometry);
        let material = &primitive.material;
        let n = primitive.shape.normal_at(&hit.point);
        let v = ray.direction.into_inner();

        let reflected = Ray::offset(hit.point, v - n.as_ref() * (2.0 * v.dot(&n)), &n);
        // Refraction is a straight continuation; the index of refraction is
        // not modeled.
        let refracted = Ray::offset(hit.point, v, &n);

        self.global_ray(&reflected, level, k, material.kr)
            + self.global_ray(&refracted, level, k, material.kt)
    }

    fn global_ray(&self, ray: &Ray, level: usize, k: Color, coefficient: Color) -> Color {
        let kk = k.modulate(coefficient);
        if kk.below(MIN_CALC_COLOR_K) {
            return BLACK;
        }
        match self.scene.closest_intersection(ray) {
            Some(hit) => self.calc_color(&hit, ray, level - 1, kk).modulate(coefficient),
            None => self.scene.background().modulate(coefficient),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Plane, Polygon, Sphere, WorldPoint};
    use crate::scene::{Material, Primitive};
    use crate::util::ColorExt as _;
    use assert2::assert;

    fn floor() -> Primitive {
        Primitive::builder()
            .shape(
                Plane::new(WorldPoint::origin(), WorldVector::new(0.0, 0.0, 1.0)).unwrap(),
            )
            .material(Material::builder().kd(Color::new(0.8, 0.8, 0.8)).build())
            .build()
    }

    fn overhead_light() -> Light {
        Light::point()
            .intensity(WHITE)
            .position(WorldPoint::new(5.0, 0.0, 5.0))
            .build()
    }

    fn down_ray() -> Ray {
        Ray::new(WorldPoint::new(0.0, 0.0, 10.0), WorldVector::new(0.0, 0.0, -1.0))
    }

    fn blocker(kt: Color) -> Primitive {
        // Sits on the segment between the floor origin and the light, but
        // clear of the camera ray along the z axis.
        Primitive::builder()
            .shape(Sphere::new(WorldPoint::new(2.5, 0.0, 2.5), 0.5).unwrap())
            .material(Material::builder().kt(kt).build())
            .build()
    }

    fn lit_floor_scene(extra: Option<Primitive>) -> Scene {
        let mut primitives = vec![floor()];
        primitives.extend(extra);
        Scene::builder()
            .name("lit floor")
            .lights(vec![overhead_light()])
            .primitives(primitives)
            .build()
    }

    #[test]
    fn diffuse_floor_under_a_point_light() {
        let scene = lit_floor_scene(None);
        let color = RayTracer::new(&scene).trace_ray(&down_ray());

        // kd * |n·l| with l at 45 degrees and no attenuation terms.
        let expected = 0.8 / 2.0_f64.sqrt();
        assert!((color.r - expected).abs() < 1e-9);
        assert!((color.g - expected).abs() < 1e-9);
    }

    #[test]
    fn opaque_occluder_casts_a_hard_shadow() {
        let scene = lit_floor_scene(Some(blocker(BLACK)));
        let color = RayTracer::new(&scene).trace_ray(&down_ray());
        assert!(color.below(1e-9));
    }

    #[test]
    fn translucent_occluder_scales_the_light() {
        let clear = RayTracer::new(&lit_floor_scene(None)).trace_ray(&down_ray());

        let scene = lit_floor_scene(Some(blocker(Color::new(0.5, 0.5, 0.5))));
        let filtered = RayTracer::new(&scene).trace_ray(&down_ray());

        // The shadow ray crosses the sphere twice, so its transparency
        // applies twice.
        assert!((filtered.r - clear.r * 0.25).abs() < 1e-9);
    }

    #[test]
    fn occluder_beyond_the_light_does_not_shadow() {
        let behind = Primitive::builder()
            .shape(Sphere::new(WorldPoint::new(10.0, 0.0, 10.0), 0.5).unwrap())
            .build();
        let clear = RayTracer::new(&lit_floor_scene(None)).trace_ray(&down_ray());
        let with_far_sphere = RayTracer::new(&lit_floor_scene(Some(behind))).trace_ray(&down_ray());
        assert!((with_far_sphere.r - clear.r).abs() < 1e-9);
    }

    #[test]
    fn miss_returns_the_background() {
        let scene = Scene::builder()
            .name("empty")
            .background(Color::new(0.1, 0.2, 0.3))
            .primitives(vec![])
            .build();
        let color = RayTracer::new(&scene).trace_ray(&down_ray());
        assert!(color == Color::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn opaque_scene_is_depth_invariant() {
        let scene = lit_floor_scene(None);
        let tracer = RayTracer::new(&scene);
        let ray = down_ray();
        let hit = scene.closest_intersection(&ray).unwrap();

        let shallow = tracer.calc_color(&hit, &ray, 1, WHITE);
        let deep = tracer.calc_color(&hit, &ray, MAX_CALC_COLOR_LEVEL, WHITE);
        assert!((shallow.r - deep.r).abs() < 1e-12);
        assert!((shallow.g - deep.g).abs() < 1e-12);
        assert!((shallow.b - deep.b).abs() < 1e-12);
    }

    #[test]
    fn facing_mirrors_terminate_at_the_depth_bound() {
        // Two large parallel mirror triangles form a corridor. A shallow ray
        // bounces between them a dozen times, more than the recursion limit,
        // so only the depth bound can end the trace.
        let mirror = Material::builder().kr(WHITE).build();
        let wall = |z: FloatType| {
            Primitive::builder()
                .shape(
                    Polygon::triangle(
                        WorldPoint::new(-1000.0, -1000.0, z),
                        WorldPoint::new(1000.0, -1000.0, z),
                        WorldPoint::new(0.0, 1500.0, z),
                    )
                    .unwrap(),
                )
                .material(mirror)
                .build()
        };
        let scene = Scene::builder()
            .name("mirror corridor")
            .primitives(vec![wall(0.0), wall(5.0)])
            .build();

        let ray = Ray::new(
            WorldPoint::new(-550.0, 0.0, 2.5),
            WorldVector::new(1.0, 0.0, 0.05),
        );
        let color = RayTracer::new(&scene).trace_ray(&ray);
        assert!(color.r.is_finite() && color.g.is_finite() && color.b.is_finite());
    }

    #[test]
    fn trace_rays_averages_the_bundle() {
        let glowing = Primitive::builder()
            .shape(Sphere::new(WorldPoint::origin(), 1.0).unwrap())
            .emission(Color::new(1.0, 0.0, 0.0))
            .build();
        let scene = Scene::builder()
            .name("glow")
            .background(Color::new(0.0, 0.0, 1.0))
            .primitives(vec![glowing])
            .build();
        let tracer = RayTracer::new(&scene);

        let hit = Ray::new(WorldPoint::new(0.0, 0.0, 10.0), WorldVector::new(0.0, 0.0, -1.0));
        let miss = Ray::new(WorldPoint::new(5.0, 0.0, 10.0), WorldVector::new(0.0, 0.0, -1.0));

        let mean = tracer.trace_rays(&[hit, miss]);
        assert!((mean.r - 0.5).abs() < 1e-12);
        assert!((mean.b - 0.5).abs() < 1e-12);
    }
}
