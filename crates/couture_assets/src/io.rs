use std::path::{Path, PathBuf};
use std::sync::Arc;

use couture_core::{Error, Result};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Asynchronous byte source for asset files, addressed relative to a root.
pub trait AssetReader: Send + Sync {
    fn read_bytes(&self, uri: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// Reads from a directory on the local filesystem.
#[derive(Debug)]
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            root_path: path.as_ref().to_path_buf(),
        }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

impl AssetReader for FileAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let path = self.root_path.join(uri);
        #[cfg(not(target_arch = "wasm32"))]
        {
            tokio::fs::read(&path)
                .await
                .map_err(|e| Error::asset_load(path.display().to_string(), e))
        }
        #[cfg(target_arch = "wasm32")]
        {
            Err(Error::asset_load(
                path.display().to_string(),
                "filesystem access is not available on wasm32",
            ))
        }
    }
}

/// Fetches over HTTP(S) relative to a base URL.
#[cfg(feature = "http")]
#[derive(Debug)]
pub struct HttpAssetReader {
    root_url: url::Url,
}

#[cfg(feature = "http")]
impl HttpAssetReader {
    pub fn new(url_str: &str) -> Result<Self> {
        let mut root_url =
            url::Url::parse(url_str).map_err(|e| Error::asset_load(url_str, e))?;
        // Relative joins replace the last segment unless the path ends in '/'.
        if !root_url.path().ends_with('/') {
            let path = format!("{}/", root_url.path());
            root_url.set_path(&path);
        }
        Ok(Self { root_url })
    }

    #[inline]
    #[must_use]
    pub fn root_url(&self) -> &url::Url {
        &self.root_url
    }
}

#[cfg(feature = "http")]
impl AssetReader for HttpAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let url = self
            .root_url
            .join(uri)
            .map_err(|e| Error::asset_load(uri, e))?;
        let response = ehttp::fetch_async(ehttp::Request::get(url.as_str()))
            .await
            .map_err(|e| Error::asset_load(url.as_str(), e))?;
        if !response.ok {
            return Err(Error::asset_load(
                url.as_str(),
                format!("HTTP {} {}", response.status, response.status_text),
            ));
        }
        Ok(response.bytes)
    }
}

/// In-memory files, for embedded assets and tests.
#[derive(Debug, Default)]
pub struct MemoryAssetReader {
    files: RwLock<FxHashMap<String, Arc<[u8]>>>,
}

impl MemoryAssetReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, uri: &str, bytes: impl Into<Arc<[u8]>>) {
        self.files.write().insert(uri.to_string(), bytes.into());
    }
}

impl AssetReader for MemoryAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        self.files
            .read()
            .get(uri)
            .map(|b| b.to_vec())
            .ok_or_else(|| Error::asset_load(uri, "not found"))
    }
}

/// Closed set of readers, dispatched without trait objects.
#[derive(Debug, Clone)]
pub enum AssetReaderVariant {
    File(Arc<FileAssetReader>),
    Memory(Arc<MemoryAssetReader>),
    #[cfg(feature = "http")]
    Http(Arc<HttpAssetReader>),
}

impl AssetReaderVariant {
    /// Picks a reader from a path or URL.
    pub fn from_source(source: &str) -> Result<Self> {
        if source.starts_with("http://") || source.starts_with("https://") {
            #[cfg(feature = "http")]
            {
                Ok(Self::Http(Arc::new(HttpAssetReader::new(source)?)))
            }
            #[cfg(not(feature = "http"))]
            {
                Err(Error::asset_load(
                    source,
                    "HTTP support is not enabled; build with the `http` feature",
                ))
            }
        } else {
            Ok(Self::File(Arc::new(FileAssetReader::new(source))))
        }
    }

    pub async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        match self {
            Self::File(r) => r.read_bytes(uri).await,
            Self::Memory(r) => r.read_bytes(uri).await,
            #[cfg(feature = "http")]
            Self::Http(r) => r.read_bytes(uri).await,
        }
    }

    /// Reads a UTF-8 text asset (lossy).
    pub async fn read_string(&self, uri: &str) -> Result<String> {
        let bytes = self.read_bytes(uri).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl From<FileAssetReader> for AssetReaderVariant {
    fn from(reader: FileAssetReader) -> Self {
        Self::File(Arc::new(reader))
    }
}

impl From<MemoryAssetReader> for AssetReaderVariant {
    fn from(reader: MemoryAssetReader) -> Self {
        Self::Memory(Arc::new(reader))
    }
}

impl From<Arc<MemoryAssetReader>> for AssetReaderVariant {
    fn from(reader: Arc<MemoryAssetReader>) -> Self {
        Self::Memory(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_reader_reports_missing_files() {
        let reader = MemoryAssetReader::new();
        reader.insert("a.txt", b"hello".to_vec());
        let variant = AssetReaderVariant::from(reader);

        let text = pollster::block_on(variant.read_string("a.txt")).unwrap();
        assert_eq!(text, "hello");

        let err = pollster::block_on(variant.read_bytes("b.txt")).unwrap_err();
        assert!(matches!(err, Error::AssetLoad { ref asset, .. } if asset == "b.txt"));
    }

    #[cfg(not(feature = "http"))]
    #[test]
    fn urls_need_the_http_feature() {
        assert!(AssetReaderVariant::from_source("https://example.com/assets/").is_err());
    }
}
