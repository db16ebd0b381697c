use std::sync::Arc;

use couture_core::{Error, Result, TextureHandle};
use couture_resources::{Image, Texture, TextureMapping};
use wgpu::TextureFormat;

use crate::io::AssetReaderVariant;
use crate::storage::AssetStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    #[default]
    Srgb,
    Linear,
}

impl ColorSpace {
    fn format(self) -> TextureFormat {
        match self {
            Self::Srgb => TextureFormat::Rgba8UnormSrgb,
            Self::Linear => TextureFormat::Rgba8Unorm,
        }
    }
}

/// Loads images through an [`AssetReaderVariant`] and keeps the resulting
/// textures in a shared pool.
///
/// Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct AssetServer {
    reader: AssetReaderVariant,
    pub textures: Arc<AssetStorage<TextureHandle, Texture>>,
}

impl AssetServer {
    #[must_use]
    pub fn new(reader: impl Into<AssetReaderVariant>) -> Self {
        Self {
            reader: reader.into(),
            textures: Arc::new(AssetStorage::new()),
        }
    }

    /// Server rooted at a directory path or an http(s) URL.
    pub fn from_root(root: &str) -> Result<Self> {
        Ok(Self::new(AssetReaderVariant::from_source(root)?))
    }

    #[must_use]
    pub fn reader(&self) -> &AssetReaderVariant {
        &self.reader
    }

    /// Registers an already built texture (e.g. a generated one).
    pub fn add_texture(&self, texture: Texture) -> TextureHandle {
        self.textures.add(texture)
    }

    #[must_use]
    pub fn texture(&self, handle: TextureHandle) -> Option<Arc<Texture>> {
        self.textures.get(handle)
    }

    // ========================================================================
    // Async loading
    // ========================================================================

    pub async fn load_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        self.reader.read_bytes(uri).await
    }

    /// Fetches and decodes one image to RGBA8.
    pub async fn load_image(&self, uri: &str, color_space: ColorSpace) -> Result<Image> {
        let bytes = self.reader.read_bytes(uri).await?;
        decode_image_async(bytes, color_space, uri.to_string()).await
    }

    /// Loads a 2D texture. Loading the same uri twice returns the same
    /// handle.
    pub async fn load_texture(&self, uri: &str) -> Result<TextureHandle> {
        if let Some(handle) = self.textures.handle_by_name(uri) {
            return Ok(handle);
        }
        let image = self.load_image(uri, ColorSpace::Srgb).await?;
        log::info!("Loaded texture '{uri}' ({}x{})", image.width(), image.height());
        Ok(self.textures.add_named(uri, Texture::new_2d(uri, image)))
    }

    /// Fetches six faces concurrently and stacks them (`+x -x +y -y +z -z`).
    pub async fn load_cube_image(&self, label: &str, faces: &[String; 6]) -> Result<Image> {
        let images = futures::future::try_join_all(
            faces
                .iter()
                .map(|uri| self.load_image(uri, ColorSpace::Srgb)),
        )
        .await?;
        Image::cube(label, &images)
    }

    /// Loads a cube texture with the given mapping.
    pub async fn load_cube_texture(
        &self,
        label: &str,
        faces: &[String; 6],
        mapping: TextureMapping,
    ) -> Result<TextureHandle> {
        let image = self.load_cube_image(label, faces).await?;
        Ok(self.add_texture(Texture::new_cube(label, image, mapping)))
    }
}

/// Decodes off the async thread when a tokio runtime is available,
/// inline otherwise.
async fn decode_image_async(bytes: Vec<u8>, color_space: ColorSpace, label: String) -> Result<Image> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if tokio::runtime::Handle::try_current().is_ok() {
            return tokio::task::spawn_blocking(move || decode_image_cpu(&bytes, color_space, &label))
                .await
                .map_err(|e| Error::TaskJoin(e.to_string()))?;
        }
    }
    decode_image_cpu(&bytes, color_space, &label)
}

fn decode_image_cpu(bytes: &[u8], color_space: ColorSpace, label: &str) -> Result<Image> {
    let img = image::load_from_memory(bytes).map_err(|e| Error::asset_load(label, e))?;
    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Image::new(
        label,
        width,
        height,
        1,
        color_space.format(),
        rgba.into_raw(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryAssetReader;

    fn png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn textures_load_once_per_uri() {
        let reader = MemoryAssetReader::new();
        reader.insert("skin.png", png(4, 2, [10, 20, 30]));
        let server = AssetServer::new(reader);

        let a = pollster::block_on(server.load_texture("skin.png")).unwrap();
        let b = pollster::block_on(server.load_texture("skin.png")).unwrap();
        assert_eq!(a, b);

        let texture = server.texture(a).unwrap();
        assert_eq!(texture.image.width(), 4);
        assert_eq!(texture.image.pixel(0, 0, 0), Some([10, 20, 30, 255]));
    }

    #[test]
    fn corrupt_images_are_asset_errors() {
        let reader = MemoryAssetReader::new();
        reader.insert("bad.png", b"not a png".to_vec());
        let server = AssetServer::new(reader);
        let err = pollster::block_on(server.load_texture("bad.png")).unwrap_err();
        assert!(matches!(err, Error::AssetLoad { .. }));
        assert!(server.textures.is_empty());
    }

    #[test]
    fn mismatched_cube_faces_are_rejected() {
        let reader = MemoryAssetReader::new();
        let faces: [String; 6] = std::array::from_fn(|i| format!("{i}.png"));
        for (i, face) in faces.iter().enumerate() {
            let size = if i == 3 { 8 } else { 4 };
            reader.insert(face, png(size, size, [0, 0, 0]));
        }
        let server = AssetServer::new(reader);
        let err = pollster::block_on(server.load_cube_texture(
            "odd",
            &faces,
            TextureMapping::CubeReflection,
        ))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }
}
