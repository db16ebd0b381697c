//! Resource data for the Couture viewer: geometry, curves, images,
//! textures and materials. Nothing here touches a GPU; renderers read
//! these structures and upload what they need.

pub mod curve;
pub mod geometry;
pub mod image;
pub mod material;
pub mod primitives;
pub mod procedural;
pub mod texture;

pub use curve::{CatmullRomCurve3, Curve3, GrannyKnot};
pub use geometry::{BoundingBox, DEFAULT_EDGE_THRESHOLD_DEG, Geometry};
pub use image::Image;
pub use material::{
    GuideLineMaterial, LineBasicMaterial, Material, MaterialData, MaterialFamily,
    MaterialSettings, MeshBasicMaterial, MeshPhongMaterial, MeshPhysicalMaterial, PropertyKey,
    PropertyKind, PropertyMap, PropertyValue, Side, UpdateMode,
};
pub use texture::{Texture, TextureMapping, TextureSampler};
