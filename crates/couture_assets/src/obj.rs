//! Wavefront OBJ loading.

use std::io::{BufReader, Cursor};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use couture_core::{Error, Result};
use couture_resources::Geometry;
use glam::{Vec2, Vec3};

use crate::server::AssetServer;

/// One named mesh of a loaded model.
#[derive(Debug, Clone)]
pub struct ModelPart {
    pub name: String,
    pub geometry: Arc<Geometry>,
}

/// A loaded model: normalized geometry per OBJ object/group.
#[derive(Debug, Clone)]
pub struct ModelAsset {
    pub source: String,
    pub parts: Vec<ModelPart>,
}

impl ModelAsset {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(|p| p.geometry.vertex_count()).sum()
    }
}

/// Parses OBJ text into a [`ModelAsset`] and runs the post-load pass
/// (vertex merge, smooth normals, planar uvs where missing) on every part.
///
/// Material libraries are ignored; materials come from the style presets.
pub async fn parse_obj(source: &str, text: &str) -> Result<ModelAsset> {
    let mut reader = BufReader::new(Cursor::new(text.as_bytes()));
    let (models, _materials) = tobj::load_obj_buf_async(
        &mut reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_path| async { Err(tobj::LoadError::OpenFileFailed) },
    )
    .await
    .map_err(|e| Error::asset_load(source, e))?;

    let parts: Vec<ModelPart> = models
        .into_iter()
        .filter(|m| !m.mesh.indices.is_empty())
        .map(|m| ModelPart {
            geometry: Arc::new(geometry_from_obj(&m.mesh)),
            name: m.name,
        })
        .collect();

    if parts.is_empty() {
        return Err(Error::asset_load(source, "model contains no triangles"));
    }
    Ok(ModelAsset {
        source: source.to_string(),
        parts,
    })
}

fn geometry_from_obj(mesh: &tobj::Mesh) -> Geometry {
    let positions: Vec<Vec3> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| Vec3::new(p[0], p[1], p[2]))
        .collect();
    let mut geometry = Geometry::new(positions).with_indices(mesh.indices.clone());
    if !mesh.texcoords.is_empty() {
        let uvs = mesh
            .texcoords
            .chunks_exact(2)
            .map(|t| Vec2::new(t[0], t[1]))
            .collect();
        geometry.set_uvs(uvs);
    }
    geometry.normalize();
    geometry
}

/// Loads models so that only the most recently requested one is ever
/// delivered.
///
/// Every call to [`load`](Self::load) takes a new generation; a load whose
/// generation has been superseded by the time it finishes resolves to
/// `Ok(None)` and its result is dropped.
#[derive(Debug, Default)]
pub struct ModelLoader {
    generation: AtomicU64,
}

/// The generation a delivered model was loaded under.
///
/// Holders re-check [`is_current`](Self::is_current) right before applying
/// the model, since a newer request may start after delivery.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    loader: Arc<ModelLoader>,
    generation: u64,
}

impl LoadTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn is_current(&self) -> bool {
        self.loader.is_current(self.generation)
    }
}

impl ModelLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, invalidating all earlier ones.
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    #[must_use]
    pub fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::Acquire) == ticket
    }

    /// Like [`load`](Self::load), but also hands back a [`LoadTicket`] for
    /// checking the model is still the latest request when it is applied.
    pub async fn load_ticketed(
        self: Arc<Self>,
        server: &AssetServer,
        uri: &str,
    ) -> Result<Option<(ModelAsset, LoadTicket)>> {
        let Some((model, generation)) = self.load_generation(server, uri).await? else {
            return Ok(None);
        };
        let ticket = LoadTicket {
            loader: self,
            generation,
        };
        Ok(Some((model, ticket)))
    }

    /// Loads and normalizes `uri`.
    ///
    /// Failures of a superseded request are discarded too.
    pub async fn load(&self, server: &AssetServer, uri: &str) -> Result<Option<ModelAsset>> {
        Ok(self.load_generation(server, uri).await?.map(|(model, _)| model))
    }

    async fn load_generation(&self, server: &AssetServer, uri: &str) -> Result<Option<(ModelAsset, u64)>> {
        let ticket = self.begin();
        let result = async {
            let text = server.reader().read_string(uri).await?;
            parse_obj(uri, &text).await
        }
        .await;

        if !self.is_current(ticket) {
            log::warn!("Discarding superseded load of '{uri}'");
            return Ok(None);
        }
        let model = result?;
        log::info!(
            "Loaded model '{uri}': {} parts, {} vertices",
            model.parts.len(),
            model.vertex_count()
        );
        Ok(Some((model, ticket)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";

    #[test]
    fn parses_and_normalizes() {
        let model = pollster::block_on(parse_obj("quad.obj", QUAD)).unwrap();
        assert_eq!(model.parts.len(), 1);
        let geometry = &model.parts[0].geometry;
        assert_eq!(geometry.triangle_count(), 2);
        assert_eq!(geometry.vertex_count(), 4);
        assert!(geometry.normals().unwrap().iter().all(|n| n.z > 0.99));
        assert!(geometry.uvs().is_some());
    }

    #[test]
    fn empty_models_are_rejected() {
        let err = pollster::block_on(parse_obj("empty.obj", "# nothing\n")).unwrap_err();
        assert!(matches!(err, Error::AssetLoad { .. }));
    }

    #[test]
    fn later_requests_supersede_earlier_ones() {
        let loader = ModelLoader::new();
        let first = loader.begin();
        let second = loader.begin();
        assert!(!loader.is_current(first));
        assert!(loader.is_current(second));
    }

    #[test]
    fn delivered_tickets_go_stale_on_a_newer_request() {
        let reader = crate::io::MemoryAssetReader::new();
        reader.insert("quad.obj", QUAD.as_bytes());
        let server = AssetServer::new(reader);
        let loader = Arc::new(ModelLoader::new());

        let (model, ticket) = pollster::block_on(loader.clone().load_ticketed(&server, "quad.obj"))
            .unwrap()
            .unwrap();
        assert_eq!(model.source, "quad.obj");
        assert!(ticket.is_current());

        loader.begin();
        assert!(!ticket.is_current());
    }
}
