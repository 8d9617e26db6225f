//! HTTP-backed elevation provider.

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::trace;

use super::http::AsyncHttpClient;
use super::types::{ElevationProvider, ProviderError, TileRequest};
use super::url::UrlBuilder;

/// Fetches tiles over HTTP using a pluggable URL scheme.
///
/// # Example
///
/// ```ignore
/// use globe_terrain::provider::{AsyncReqwestClient, RemoteProvider, WmsUrlBuilder};
///
/// let client = AsyncReqwestClient::new()?;
/// let provider = RemoteProvider::new("Earth WMS", client, WmsUrlBuilder::new(address, layers));
/// ```
pub struct RemoteProvider<C: AsyncHttpClient, U: UrlBuilder> {
    name: String,
    http_client: C,
    url_builder: U,
}

impl<C: AsyncHttpClient, U: UrlBuilder> RemoteProvider<C, U> {
    /// Creates a new remote provider.
    ///
    /// # Arguments
    ///
    /// * `name` - Name used in log output
    /// * `http_client` - HTTP client for making requests
    /// * `url_builder` - Maps tile requests to URLs
    pub fn new(name: impl Into<String>, http_client: C, url_builder: U) -> Self {
        Self {
            name: name.into(),
            http_client,
            url_builder,
        }
    }

    pub fn url_builder(&self) -> &U {
        &self.url_builder
    }
}

impl<C: AsyncHttpClient, U: UrlBuilder> ElevationProvider for RemoteProvider<C, U> {
    fn retrieve<'a>(
        &'a self,
        request: &'a TileRequest,
    ) -> BoxFuture<'a, Result<Bytes, ProviderError>> {
        async move {
            let url = self.url_builder.url_for_tile(request);
            trace!(provider = %self.name, tile = %request.key, url = %url, "Requesting elevation tile");
            self.http_client.get(&url).await
        }
        .boxed()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Sector;
    use crate::level::TileKey;
    use crate::provider::http::tests::MockAsyncHttpClient;
    use crate::provider::url::LevelRowColumnUrlBuilder;
    use crate::raster::RasterFormat;

    fn request() -> TileRequest {
        TileRequest {
            key: TileKey::new(0, 1, 2),
            sector: Sector::new(0.0, 45.0, -90.0, -45.0).unwrap(),
            image_path: "cache/0/1/1_2.bil".to_string(),
            format: RasterFormat::Bil16,
            width: 2,
            height: 2,
        }
    }

    #[tokio::test]
    async fn test_retrieve_requests_built_url() {
        let client = MockAsyncHttpClient::returning(Ok(Bytes::from_static(&[0; 8])));
        let provider = RemoteProvider::new(
            "rest",
            client,
            LevelRowColumnUrlBuilder::new("http://tiles.test", "elev"),
        );

        let bytes = provider.retrieve(&request()).await.unwrap();
        assert_eq!(bytes.len(), 8);
        assert_eq!(
            *provider.http_client.requests.lock(),
            vec!["http://tiles.test/elev/0/1/1_2.bil".to_string()]
        );
    }

    #[tokio::test]
    async fn test_retrieve_propagates_errors() {
        let client =
            MockAsyncHttpClient::returning(Err(ProviderError::HttpError("503".to_string())));
        let provider =
            RemoteProvider::new("rest", client, LevelRowColumnUrlBuilder::new("http://x", ""));

        let result = provider.retrieve(&request()).await;
        assert!(matches!(result, Err(ProviderError::HttpError(_))));
        assert_eq!(provider.name(), "rest");
    }
}
