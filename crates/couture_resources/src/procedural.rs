//! Procedurally generated textures.
//!
//! Both generators are pure: the same colour always yields byte-identical
//! pixels.

use couture_core::Color;

use crate::image::Image;
use crate::texture::{Texture, TextureMapping};

/// Side length of generated textures, in pixels.
pub const GENERATED_TEXTURE_SIZE: u32 = 512;
/// Spacing between grid lines, in pixels.
pub const GRID_PERIOD: u32 = 20;
/// Line colour used when none is given.
pub const DEFAULT_GRID_COLOR: Color = Color::new(0.0, 225.0 / 255.0, 202.0 / 255.0);

/// White background crossed by 1-pixel lines every [`GRID_PERIOD`] pixels.
#[must_use]
pub fn grid_image(color: Color) -> Image {
    let size = GENERATED_TEXTURE_SIZE;
    let line = color.to_rgba8();
    let background = [255u8; 4];

    let mut data = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let on_line = x % GRID_PERIOD == 0 || y % GRID_PERIOD == 0;
            data.extend_from_slice(if on_line { &line } else { &background });
        }
    }
    Image::rgba8("grid", size, size, data)
}

/// Uniformly filled image.
#[must_use]
pub fn solid_image(color: Color) -> Image {
    let size = GENERATED_TEXTURE_SIZE;
    let data = color.to_rgba8().repeat((size * size) as usize);
    Image::rgba8("solid", size, size, data)
}

/// Grid texture with linear filtering and mipmaps.
#[must_use]
pub fn create_grid_texture(color: Color) -> Texture {
    Texture::new_2d(&format!("grid {color}"), grid_image(color))
}

#[must_use]
pub fn create_solid_texture(color: Color) -> Texture {
    Texture::new_2d(&format!("solid {color}"), solid_image(color))
}

/// Cube map showing the same grid face on all six sides.
#[must_use]
pub fn create_cube_from_color(color: Color, mapping: TextureMapping) -> Texture {
    let face = grid_image(color);
    let name = format!("grid cube {color}");
    let image = Image::new(
        &name,
        face.width(),
        face.height(),
        6,
        face.format(),
        face.data().repeat(6),
    );
    Texture::new_cube(&name, image, mapping)
}
