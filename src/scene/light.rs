use bon::bon;
use nalgebra::Unit;

use crate::geometry::{EPSILON, FloatType, WorldPoint, WorldVector};
use crate::util::Color;

/// A light source in the scene.
///
/// `l(p)` is the unit direction the light shines along at `p` (from the light
/// toward the point), matching the convention the shading code expects.
#[derive(Clone, Debug)]
pub enum Light {
    Directional {
        intensity: Color,
        direction: Unit<WorldVector>,
    },
    Point {
        intensity: Color,
        position: WorldPoint,
        kc: FloatType,
        kl: FloatType,
        kq: FloatType,
    },
    Spot {
        intensity: Color,
        position: WorldPoint,
        direction: Unit<WorldVector>,
        kc: FloatType,
        kl: FloatType,
        kq: FloatType,
        narrow_beam: FloatType,
    },
}

#[bon]
impl Light {
    #[builder(finish_fn = build)]
    pub fn directional(intensity: Color, direction: WorldVector) -> Light {
        let direction =
            Unit::try_new(direction, EPSILON).expect("Light direction must be non-zero");
        Light::Directional {
            intensity,
            direction,
        }
    }

    #[builder(finish_fn = build)]
    pub fn point(
        intensity: Color,
        position: WorldPoint,
        #[builder(default = 1.0)] kc: FloatType,
        #[builder(default = 0.0)] kl: FloatType,
        #[builder(default = 0.0)] kq: FloatType,
    ) -> Light {
        Light::Point {
            intensity,
            position,
            kc,
            kl,
            kq,
        }
    }

    #[builder(finish_fn = build)]
    pub fn spot(
        intensity: Color,
        position: WorldPoint,
        direction: WorldVector,
        #[builder(default = 1.0)] kc: FloatType,
        #[builder(default = 0.0)] kl: FloatType,
        #[builder(default = 0.0)] kq: FloatType,
        #[builder(default = 1.0)] narrow_beam: FloatType,
    ) -> Light {
        let direction =
            Unit::try_new(direction, EPSILON).expect("Spot light direction must be non-zero");
        Light::Spot {
            intensity,
            position,
            direction,
            kc,
            kl,
            kq,
            narrow_beam,
        }
    }
}

impl Light {
    /// Unit direction from the light toward `point`.
    pub fn l(&self, point: &WorldPoint) -> Unit<WorldVector> {
        match self {
            Light::Directional { direction, .. } => *direction,
            Light::Point { position, .. } | Light::Spot { position, .. } => {
                Unit::new_normalize(point - position)
            }
        }
    }

    pub fn intensity_at(&self, point: &WorldPoint) -> Color {
        match self {
            Light::Directional { intensity, .. } => *intensity,
            Light::Point {
                intensity,
                position,
                kc,
                kl,
                kq,
            } => *intensity * Self::attenuation(position, point, *kc, *kl, *kq),
            Light::Spot {
                intensity,
                position,
                direction,
                kc,
                kl,
                kq,
                narrow_beam,
            } => {
                let attenuated = *intensity * Self::attenuation(position, point, *kc, *kl, *kq);
                let beam = self.l(point).dot(direction).max(0.0).powf(*narrow_beam);
                attenuated * beam
            }
        }
    }

    /// Distance from the light to `point`; infinite for directional lights.
    pub fn distance(&self, point: &WorldPoint) -> FloatType {
        match self {
            Light::Directional { .. } => FloatType::INFINITY,
            Light::Point { position, .. } | Light::Spot { position, .. } => {
                (point - position).norm()
            }
        }
    }

    fn attenuation(
        position: &WorldPoint,
        point: &WorldPoint,
        kc: FloatType,
        kl: FloatType,
        kq: FloatType,
    ) -> FloatType {
        let d = (point - position).norm();
        1.0 / (kc + kl * d + kq * d * d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;
    use crate::util::{ColorExt as _, WHITE};

    #[test]
    fn directional_light_is_uniform() {
        let light = Light::directional()
            .intensity(WHITE)
            .direction(WorldVector::new(0.0, -1.0, 0.0))
            .build();

        let p = WorldPoint::new(10.0, 3.0, -4.0);
        assert!(light.intensity_at(&p) == WHITE);
        assert!(light.distance(&p) == FloatType::INFINITY);
        assert!(
            (light.l(&p).into_inner() - WorldVector::new(0.0, -1.0, 0.0)).norm() < 1e-12
        );
    }

    #[test]
    fn point_light_attenuates_with_distance() {
        let light = Light::point()
            .intensity(WHITE)
            .position(WorldPoint::origin())
            .kl(1.0)
            .build();

        let near = light.intensity_at(&WorldPoint::new(1.0, 0.0, 0.0));
        let far = light.intensity_at(&WorldPoint::new(9.0, 0.0, 0.0));
        assert!((near.r - 0.5).abs() < 1e-12);
        assert!((far.r - 0.1).abs() < 1e-12);
        assert!(light.distance(&WorldPoint::new(0.0, 3.0, 4.0)) == 5.0);
    }

    #[test]
    fn spot_light_dims_off_axis() {
        let light = Light::spot()
            .intensity(WHITE)
            .position(WorldPoint::origin())
            .direction(WorldVector::new(0.0, 0.0, -1.0))
            .narrow_beam(2.0)
            .build();

        let on_axis = light.intensity_at(&WorldPoint::new(0.0, 0.0, -1.0));
        let off_axis = light.intensity_at(&WorldPoint::new(1.0, 0.0, -1.0));
        let behind = light.intensity_at(&WorldPoint::new(0.0, 0.0, 1.0));
        assert!((on_axis.r - 1.0).abs() < 1e-12);
        assert!(off_axis.r < on_axis.r);
        assert!(behind.below(1e-12));
    }
}
