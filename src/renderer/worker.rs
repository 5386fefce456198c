use image::RgbImage;
use rand::{SeedableRng as _, rngs::SmallRng};

use crate::{
    camera::Camera,
    geometry::Ray,
    renderer::{RenderSettings, tiles::Tile},
    scene::Scene,
    tracer::RayTracer,
    util::color_to_image,
};

pub struct Worker {
    rng: SmallRng,
    /// Scratch for the per-pixel sample rays, reused across pixels.
    ray_buffer: Vec<Ray>,
}

impl Worker {
    pub fn new() -> Worker {
        Worker {
            rng: SmallRng::from_os_rng(),
            ray_buffer: Vec::new(),
        }
    }

    /// Renders one tile into the top-left corner of `buffer`.
    pub fn render_tile(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        settings: &RenderSettings,
        tile: &Tile,
        buffer: &mut RgbImage,
    ) {
        let tracer = RayTracer::new(scene);

        for point in tile.pixels() {
            self.ray_buffer.clear();
            for _ in 0..settings.sample_count.get() {
                self.ray_buffer.push(camera.sample_ray(&point, &mut self.rng));
            }
            let color = tracer.trace_rays(&self.ray_buffer);

            buffer.put_pixel(point.x - tile.min.x, point.y - tile.min.y, color_to_image(color));
        }
    }
}
