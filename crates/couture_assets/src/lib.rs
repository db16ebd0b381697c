//! Asset loading for the Couture viewer.
//!
//! Everything here is a one-shot async load that resolves into a value the
//! caller swaps into its state in one assignment. Nothing is merged
//! incrementally, so a failed or superseded load never leaves partial
//! state behind.

pub mod environment;
pub mod io;
pub mod obj;
pub mod server;
pub mod storage;

pub use environment::{
    CUBE_FACES, ENVIRONMENT_NAMES, EnvironmentCubes, EnvironmentSet, WHITE_ENVIRONMENT, face_paths,
};
pub use io::{AssetReader, AssetReaderVariant, FileAssetReader, MemoryAssetReader};
#[cfg(feature = "http")]
pub use io::HttpAssetReader;
pub use obj::{LoadTicket, ModelAsset, ModelLoader, ModelPart, parse_obj};
pub use server::{AssetServer, ColorSpace};
pub use storage::AssetStorage;
