use crate::geometry::FloatType;

/// Linear RGB radiance/coefficient triple.
pub type Color = rgb::RGB<FloatType>;

pub const BLACK: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
};

pub const WHITE: Color = Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
};

/// Componentwise operations that `rgb` does not provide out of the box.
pub trait ColorExt {
    /// Componentwise product (filtering one color by another).
    fn modulate(self, other: Color) -> Color;

    /// True when every channel is below `threshold`.
    fn below(self, threshold: FloatType) -> bool;
}

impl ColorExt for Color {
    fn modulate(self, other: Color) -> Color {
        Color::new(self.r * other.r, self.g * other.g, self.b * other.b)
    }

    fn below(self, threshold: FloatType) -> bool {
        self.r < threshold && self.g < threshold && self.b < threshold
    }
}

/// Maps a 0-1 linear color to a pixel type compatible with module image.
pub fn color_to_image(color: Color) -> image::Rgb<u8> {
    image::Rgb([
        (color.r * 255.0).round().clamp(0.0, 255.0) as u8,
        (color.g * 255.0).round().clamp(0.0, 255.0) as u8,
        (color.b * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
