//! Named environment cubes used for reflections, refraction and the skybox.

use couture_core::{Result, TextureHandle};
use couture_resources::{Texture, TextureMapping};
use rustc_hash::FxHashMap;

use crate::server::AssetServer;

/// The plain white studio environment.
pub const WHITE_ENVIRONMENT: &str = "Wht";

/// Every environment the viewer offers, white first.
pub const ENVIRONMENT_NAMES: [&str; 10] = [
    WHITE_ENVIRONMENT,
    "desert",
    "greenland",
    "horsefarm",
    "mountains",
    "mountainsmoon",
    "nightmoon",
    "starssky",
    "sea",
    "sky",
];

/// Cube face suffixes in layer order.
pub const CUBE_FACES: [&str; 6] = ["x+", "x-", "y+", "y-", "z+", "z-"];

// The white cube ships as loose files in the asset root with mixed formats.
const WHITE_FACES: [&str; 6] = [
    "wht.x+.jpg",
    "wht.x-.png",
    "wht.y-.jpg",
    "wht.y+.jpg",
    "wht.z+.jpg",
    "wht.z-.png",
];

/// Face file paths for an environment, relative to the asset root.
#[must_use]
pub fn face_paths(name: &str) -> [String; 6] {
    if name == WHITE_ENVIRONMENT {
        WHITE_FACES.map(str::to_string)
    } else {
        CUBE_FACES.map(|face| format!("{name}/{face}.jpg"))
    }
}

/// The two mappings of one environment. Both share one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentCubes {
    pub reflection: TextureHandle,
    pub refraction: TextureHandle,
}

impl EnvironmentCubes {
    #[must_use]
    pub fn for_mapping(&self, mapping: TextureMapping) -> TextureHandle {
        match mapping {
            TextureMapping::CubeRefraction => self.refraction,
            TextureMapping::CubeReflection | TextureMapping::Uv => self.reflection,
        }
    }
}

/// Environments loaded at startup. Read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentSet {
    cubes: FxHashMap<String, EnvironmentCubes>,
    order: Vec<String>,
}

impl EnvironmentSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every named environment.
    ///
    /// An environment that fails to load is logged and left out; the call
    /// only fails when none could be loaded.
    pub async fn load(server: &AssetServer, names: &[&str]) -> Result<Self> {
        let results =
            futures::future::join_all(names.iter().map(|name| Self::load_one(server, name))).await;

        let mut set = Self::new();
        let mut last_error = None;
        for (name, result) in names.iter().zip(results) {
            match result {
                Ok(cubes) => set.insert(name, cubes),
                Err(e) => {
                    log::warn!("Environment '{name}' unavailable: {e}");
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) if set.is_empty() => Err(e),
            _ => {
                log::info!("Loaded {} environments", set.len());
                Ok(set)
            }
        }
    }

    async fn load_one(server: &AssetServer, name: &str) -> Result<EnvironmentCubes> {
        let image = server.load_cube_image(name, &face_paths(name)).await?;
        Ok(Self::register(server, name, Texture::new_cube(name, image, TextureMapping::CubeReflection)))
    }

    /// Registers both mappings of a reflection cube texture.
    pub fn register(server: &AssetServer, name: &str, reflection: Texture) -> EnvironmentCubes {
        let refraction = reflection.with_mapping(TextureMapping::CubeRefraction);
        EnvironmentCubes {
            reflection: server.add_texture(reflection.with_mapping(TextureMapping::CubeReflection)),
            refraction: server.add_texture(refraction),
        }
    }

    pub fn insert(&mut self, name: &str, cubes: EnvironmentCubes) {
        if self.cubes.insert(name.to_string(), cubes).is_none() {
            self.order.push(name.to_string());
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<EnvironmentCubes> {
        self.cubes.get(name).copied()
    }

    /// Names in load order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.order
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_uses_loose_root_files() {
        let paths = face_paths(WHITE_ENVIRONMENT);
        assert_eq!(paths[1], "wht.x-.png");
        assert_eq!(paths[2], "wht.y-.jpg");
    }

    #[test]
    fn named_cubes_live_in_subdirectories() {
        assert_eq!(face_paths("sea")[4], "sea/z+.jpg");
    }
}
