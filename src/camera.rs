use assert2::assert;
use bon::bon;
use nalgebra::Unit;
use rand_distr::Distribution as _;

use crate::geometry::{EPSILON, FloatType, Ray, ScreenPoint, ScreenSize, WorldPoint, WorldVector};

/// Thin-lens camera. With `f_number` at infinity the lens collapses to a
/// pinhole and every sample ray passes through `center`.
#[derive(Copy, Clone, Debug)]
pub struct Camera {
    center: WorldPoint,

    resolution: ScreenSize,

    up: Unit<WorldVector>,
    right: Unit<WorldVector>,
    film_origin_offset: WorldVector,

    /// Distance between pixels in meters
    pixel_pitch: FloatType,

    /// Lens radius in meters
    lens_radius: FloatType,
    lens_weight: FloatType,
}

#[bon]
impl Camera {
    #[builder]
    pub fn new(
        center: WorldPoint,
        forward: WorldVector,
        up: WorldVector,
        resolution: ScreenSize,
        film_width: FloatType,
        focal_length: FloatType,
        #[builder(default = FloatType::INFINITY)] f_number: FloatType,
        #[builder(default = 1.0)] focus_distance: FloatType,
    ) -> Camera {
        let forward = Unit::try_new(forward, EPSILON).expect("Forward vector must be non-zero");
        let up = Unit::try_new(up, EPSILON).expect("Up vector must be non-zero");
        let right = Unit::try_new(forward.cross(&up), EPSILON)
            .expect("`up` and `forward` must be linearly independent");
        let up = Unit::new_normalize(right.cross(&forward));

        assert!(resolution.width > 0);
        assert!(resolution.height > 0);
        assert!(film_width > 0.0);
        assert!(focal_length > 0.0);
        assert!(f_number > 0.0);
        assert!(focus_distance > 0.0);

        let pixel_pitch = film_width / (resolution.width as FloatType);
        let film_origin_u = (resolution.width - 1) as FloatType * pixel_pitch / 2.0;
        let film_origin_v = (resolution.height - 1) as FloatType * pixel_pitch / 2.0;
        let film_origin_offset = -forward.as_ref() * focal_length
            + right.as_ref() * film_origin_u
            - up.as_ref() * film_origin_v;

        Camera {
            center,

            resolution,

            up,
            right,
            film_origin_offset,
            pixel_pitch,
            lens_radius: focal_length / (2.0 * f_number),
            lens_weight: focal_length / focus_distance,
        }
    }
}

impl Camera {
    pub fn resolution(&self) -> ScreenSize {
        self.resolution
    }

    /// Samples a new ray from the camera for the given image pixel.
    pub fn sample_ray(&self, point: &ScreenPoint, rng: &mut impl rand::Rng) -> Ray {
        let film_u = point.x as FloatType + rng.random_range(-0.5..=0.5);
        let film_v = point.y as FloatType + rng.random_range(-0.5..=0.5);
        let film_point_offset = self.film_origin_offset
            + self.up.as_ref() * (film_v * self.pixel_pitch)
            - self.right.as_ref() * (film_u * self.pixel_pitch);

        let lens_uv: [FloatType; 2] = rand_distr::UnitDisc.sample(rng);
        let lens_vector = self.right.as_ref() * (self.lens_radius * lens_uv[0])
            + self.up.as_ref() * (self.lens_radius * lens_uv[1]);

        let direction = lens_vector * self.lens_weight - film_point_offset;

        Ray::new(self.center + lens_vector, direction)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::assert;

    #[test]
    fn left_right_up_down() {
        // X goes right, Y goes away, Z goes up
        let camera = Camera::builder()
            .center(WorldPoint::new(0.0, 0.0, 0.0))
            .forward(WorldVector::new(0.0, 1.0, 0.0))
            .up(WorldVector::new(0.0, 0.0, 1.0))
            .resolution(ScreenSize::new(800, 600))
            .film_width(36e-3)
            .focal_length(50e-3)
            .build();
        let mut rng = rand::rng();

        let ray_center = camera.sample_ray(&ScreenPoint::new(400, 300), &mut rng);
        let ray_left = camera.sample_ray(&ScreenPoint::new(0, 300), &mut rng);
        let ray_right = camera.sample_ray(&ScreenPoint::new(799, 300), &mut rng);
        let ray_up = camera.sample_ray(&ScreenPoint::new(400, 0), &mut rng);
        let ray_down = camera.sample_ray(&ScreenPoint::new(400, 599), &mut rng);

        assert!(ray_center.direction.x.abs() < 1e-3);
        assert!(ray_center.direction.z.abs() < 1e-3);
        assert!(ray_left.direction.x < ray_center.direction.x);
        assert!(ray_right.direction.x > ray_center.direction.x);
        assert!(ray_up.direction.z > ray_center.direction.z);
        assert!(ray_down.direction.z < ray_center.direction.z);
    }

    #[test]
    fn pinhole_rays_start_at_the_center() {
        let camera = Camera::builder()
            .center(WorldPoint::new(1.0, 2.0, 3.0))
            .forward(WorldVector::new(0.0, 1.0, 0.0))
            .up(WorldVector::new(0.0, 0.0, 1.0))
            .resolution(ScreenSize::new(100, 100))
            .film_width(36e-3)
            .focal_length(50e-3)
            .build();
        let mut rng = rand::rng();

        let ray = camera.sample_ray(&ScreenPoint::new(17, 80), &mut rng);
        assert!((ray.origin - WorldPoint::new(1.0, 2.0, 3.0)).norm() < 1e-12);
    }
}
