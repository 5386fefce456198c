mod camera;
pub mod geometry;
mod renderer;
pub mod scene;
pub mod tracer;
mod util;

pub use crate::renderer::{RenderProgress, RenderSettings, render};
pub use camera::Camera;
pub use scene::Scene;
pub use tracer::RayTracer;
pub use util::{BLACK, Color, ColorExt, WHITE, color_to_image};
