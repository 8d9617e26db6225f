//! Local filesystem elevation provider.
//!
//! Reads tiles from a directory laid out like the tile cache:
//! `{root}/{image_path}`, where the image path already carries the
//! `<prefix>/<level>/<row>/<row>_<column>.<ext>` structure.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;

use super::types::{ElevationProvider, ProviderError, TileRequest};

/// Serves tiles from a local directory tree.
#[derive(Debug, Clone)]
pub struct FileProvider {
    root: PathBuf,
}

impl FileProvider {
    /// Creates a provider rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path of a tile.
    pub fn path_for(&self, request: &TileRequest) -> PathBuf {
        self.root.join(&request.image_path)
    }
}

impl ElevationProvider for FileProvider {
    fn retrieve<'a>(
        &'a self,
        request: &'a TileRequest,
    ) -> BoxFuture<'a, Result<Bytes, ProviderError>> {
        async move {
            let path = self.path_for(request);
            match tokio::fs::read(&path).await {
                Ok(contents) => Ok(Bytes::from(contents)),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    Err(ProviderError::NotFound(path.display().to_string()))
                }
                Err(e) => Err(ProviderError::Io(format!("{}: {}", path.display(), e))),
            }
        }
        .boxed()
    }

    fn name(&self) -> &str {
        "file"
    }
}
