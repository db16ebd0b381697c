use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use couture_core::{Error, Result};
use uuid::Uuid;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
pub struct ImageInner {
    pub id: u64,
    pub uuid: Uuid,
    pub label: String,

    pub width: u32,
    pub height: u32,
    /// 1 for 2D images, 6 for cube maps
    pub layers: u32,
    pub format: wgpu::TextureFormat,

    pub data: Vec<u8>,
}

/// Immutable pixel buffer shared between textures.
///
/// Cube maps store their six faces back to back in the order
/// `+x, -x, +y, -y, +z, -z`.
#[derive(Debug, Clone)]
pub struct Image(Arc<ImageInner>);

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}
impl Eq for Image {}
impl std::hash::Hash for Image {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl Image {
    #[must_use]
    pub fn new(
        label: &str,
        width: u32,
        height: u32,
        layers: u32,
        format: wgpu::TextureFormat,
        data: Vec<u8>,
    ) -> Self {
        Self(Arc::new(ImageInner {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            uuid: Uuid::new_v4(),
            label: label.to_string(),
            width,
            height,
            layers,
            format,
            data,
        }))
    }

    /// Tightly packed RGBA8 image.
    #[must_use]
    pub fn rgba8(label: &str, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self::new(label, width, height, 1, wgpu::TextureFormat::Rgba8Unorm, data)
    }

    /// Stacks six equally sized 2D faces into one cube image.
    pub fn cube(label: &str, faces: &[Image]) -> Result<Self> {
        let [first, ..] = faces else {
            return Err(Error::InvalidData(format!("cube '{label}' has no faces")));
        };
        if faces.len() != 6 {
            return Err(Error::InvalidData(format!(
                "cube '{label}' needs 6 faces, got {}",
                faces.len()
            )));
        }
        let (width, height, format) = (first.width(), first.height(), first.format());
        if let Some(odd) = faces
            .iter()
            .find(|f| f.width() != width || f.height() != height || f.format() != format)
        {
            return Err(Error::InvalidData(format!(
                "cube '{label}': face '{}' is {}x{} {:?}, expected {width}x{height} {format:?}",
                odd.label(),
                odd.width(),
                odd.height(),
                odd.format()
            )));
        }

        let mut data = Vec::with_capacity(first.data().len() * 6);
        for face in faces {
            data.extend_from_slice(face.data());
        }
        Ok(Self::new(label, width, height, 6, format, data))
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.0.id
    }
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0.uuid
    }
    #[must_use]
    pub fn label(&self) -> &str {
        &self.0.label
    }
    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height
    }
    #[must_use]
    pub fn layers(&self) -> u32 {
        self.0.layers
    }
    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.0.format
    }
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.0.data
    }

    /// RGBA8 texel, `None` outside the image or for other formats.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32, layer: u32) -> Option<[u8; 4]> {
        if !matches!(
            self.0.format,
            wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb
        ) || x >= self.0.width
            || y >= self.0.height
            || layer >= self.0.layers
        {
            return None;
        }
        let layer_size = self.0.width as usize * self.0.height as usize;
        let i = (layer as usize * layer_size + y as usize * self.0.width as usize + x as usize) * 4;
        let texel = self.0.data.get(i..i + 4)?;
        texel.try_into().ok()
    }
}
