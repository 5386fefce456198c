use lucent::{
    Camera, Color, RenderSettings,
    geometry::{Cylinder, Plane, Polygon, Ray, ScreenSize, Sphere, WorldPoint, WorldVector},
    render,
    scene::{Light, Material, Primitive, Scene},
};

use indicatif::ProgressBar;

fn demo_scene() -> anyhow::Result<Scene> {
    let floor = Primitive::builder()
        .shape(Plane::new(
            WorldPoint::new(0.0, 0.0, 0.0),
            WorldVector::new(0.0, 0.0, 1.0),
        )?)
        .material(
            Material::builder()
                .kd(Color::new(0.5, 0.5, 0.55))
                .ks(Color::new(0.1, 0.1, 0.1))
                .shininess(20)
                .build(),
        )
        .build();

    let mirror_sphere = Primitive::builder()
        .shape(Sphere::new(WorldPoint::new(-2.5, 0.0, 1.5), 1.5)?)
        .material(
            Material::builder()
                .kd(Color::new(0.05, 0.05, 0.05))
                .ks(Color::new(0.3, 0.3, 0.3))
                .shininess(100)
                .kr(Color::new(0.8, 0.8, 0.8))
                .build(),
        )
        .build();

    let glass_sphere = Primitive::builder()
        .shape(Sphere::new(WorldPoint::new(2.5, -1.0, 1.2), 1.2)?)
        .material(
            Material::builder()
                .kd(Color::new(0.05, 0.05, 0.1))
                .ks(Color::new(0.3, 0.3, 0.3))
                .shininess(60)
                .kt(Color::new(0.7, 0.7, 0.8))
                .build(),
        )
        .build();

    let mirror_triangle = Primitive::builder()
        .shape(Polygon::triangle(
            WorldPoint::new(-8.0, 6.0, 0.0),
            WorldPoint::new(2.0, 8.0, 0.0),
            WorldPoint::new(-3.0, 7.0, 8.0),
        )?)
        .material(
            Material::builder()
                .kd(Color::new(0.1, 0.1, 0.1))
                .kr(Color::new(0.6, 0.6, 0.6))
                .build(),
        )
        .build();

    let pillar = Primitive::builder()
        .shape(Cylinder::new(
            Ray::new(WorldPoint::new(5.5, 4.0, 0.0), WorldVector::new(0.0, 0.0, 1.0)),
            0.8,
            4.0,
        )?)
        .material(
            Material::builder()
                .kd(Color::new(0.6, 0.3, 0.2))
                .ks(Color::new(0.2, 0.2, 0.2))
                .shininess(30)
                .build(),
        )
        .build();

    Ok(Scene::builder()
        .name("demo")
        .background(Color::new(0.02, 0.02, 0.05))
        .ambient(Color::new(0.02, 0.02, 0.02))
        .lights(vec![
            Light::spot()
                .intensity(Color::new(0.9, 0.9, 0.8))
                .position(WorldPoint::new(0.0, -8.0, 12.0))
                .direction(WorldVector::new(0.0, 8.0, -12.0))
                .kl(0.01)
                .kq(0.0005)
                .narrow_beam(4.0)
                .build(),
            Light::point()
                .intensity(Color::new(0.4, 0.4, 0.5))
                .position(WorldPoint::new(8.0, -4.0, 8.0))
                .kl(0.02)
                .kq(0.001)
                .build(),
            Light::directional()
                .intensity(Color::new(0.15, 0.15, 0.2))
                .direction(WorldVector::new(-1.0, 1.0, -2.0))
                .build(),
        ])
        .primitives(vec![
            floor,
            mirror_sphere,
            glass_sphere,
            mirror_triangle,
            pillar,
        ])
        .build())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let camera = Camera::builder()
        .center(WorldPoint::new(0.0, -12.0, 4.0))
        .forward(WorldVector::new(0.0, 1.0, -0.15))
        .up(WorldVector::new(0.0, 0.0, 1.0))
        .resolution(ScreenSize::new(1024, 768))
        .film_width(36e-3)
        .focal_length(40e-3)
        .f_number(5.6)
        .focus_distance(12.0)
        .build();

    let settings = RenderSettings {
        tile_size: 64.try_into().unwrap(),
        sample_count: 16.try_into().unwrap(),
    };
    let scene = demo_scene()?;

    let bar = ProgressBar::no_length();
    let mut render_progress = render(scene, camera, settings, {
        let bar = bar.clone();
        move |_| bar.inc(1)
    })?;
    bar.set_length(render_progress.progress().1 as u64);

    render_progress.wait();
    bar.finish();

    let image = render_progress.image().lock().expect("Poisoned lock!");
    image.save("render.png")?;
    println!("wrote render.png");

    Ok(())
}
