use uuid::Uuid;
use wgpu::{AddressMode, TextureViewDimension};

use crate::image::Image;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSampler {
    pub address_mode_u: AddressMode,
    pub address_mode_v: AddressMode,
    pub address_mode_w: AddressMode,
    pub mag_filter: wgpu::FilterMode,
    pub min_filter: wgpu::FilterMode,
    pub mipmap_filter: wgpu::MipmapFilterMode,
}

impl Default for TextureSampler {
    fn default() -> Self {
        Self {
            address_mode_u: AddressMode::Repeat,
            address_mode_v: AddressMode::Repeat,
            address_mode_w: AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
        }
    }
}

impl TextureSampler {
    #[must_use]
    pub fn clamped() -> Self {
        Self {
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            address_mode_w: AddressMode::ClampToEdge,
            ..Self::default()
        }
    }
}

/// How a texture is sampled by an environment-mapped material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureMapping {
    #[default]
    Uv,
    CubeReflection,
    CubeRefraction,
}

#[derive(Debug, Clone)]
pub struct Texture {
    pub uuid: Uuid,
    pub name: String,

    pub image: Image,
    pub view_dimension: TextureViewDimension,

    pub sampler: TextureSampler,
    pub mapping: TextureMapping,
    pub generate_mipmaps: bool,
}

impl Texture {
    #[must_use]
    pub fn new(name: &str, image: Image, view_dimension: TextureViewDimension) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            image,
            view_dimension,
            sampler: TextureSampler::default(),
            mapping: TextureMapping::Uv,
            generate_mipmaps: true,
        }
    }

    #[must_use]
    pub fn new_2d(name: &str, image: Image) -> Self {
        Self::new(name, image, TextureViewDimension::D2)
    }

    /// Cube map over a 6-layer image, clamped at the edges.
    #[must_use]
    pub fn new_cube(name: &str, image: Image, mapping: TextureMapping) -> Self {
        debug_assert_eq!(image.layers(), 6);
        let mut tex = Self::new(name, image, TextureViewDimension::Cube);
        tex.sampler = TextureSampler::clamped();
        tex.mapping = mapping;
        tex
    }

    #[must_use]
    pub fn is_cube(&self) -> bool {
        self.view_dimension == TextureViewDimension::Cube
    }

    /// Same pixels, different mapping. Cube reflection and refraction
    /// variants of an environment share one image this way.
    #[must_use]
    pub fn with_mapping(&self, mapping: TextureMapping) -> Self {
        let mut tex = self.clone();
        tex.uuid = Uuid::new_v4();
        tex.mapping = mapping;
        tex
    }
}
