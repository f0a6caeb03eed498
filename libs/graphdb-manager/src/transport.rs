use async_trait::async_trait;
use gdm_http::{HttpClient, HttpClientBuilder, HttpError};
use thiserror::Error;

use crate::config::HttpSettings;

/// `GET url` returning a JSON document
///
/// Implemented by [`HttpTransport`]; tests and embedders may provide their own.
#[async_trait]
pub trait ManagementTransport: Send + Sync {
    /// Fetch `url` and parse the body as JSON.
    ///
    /// # Errors
    /// Any failure to obtain a JSON document from `url`
    async fn get(&self, url: &str) -> Result<serde_json::Value, TransportError>;
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// [`ManagementTransport`] over [`HttpClient`]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: HttpClient,
}

impl HttpTransport {
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Build a client from `settings`.
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// Returns the client build error (TLS roots, invalid user agent)
    pub fn from_settings(settings: &HttpSettings) -> Result<Self, HttpError> {
        let client = HttpClientBuilder::with_config(settings.client_config()).build()?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl ManagementTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<serde_json::Value, TransportError> {
        let value = self
            .client
            .get(url)
            .accept_json()
            .send()
            .await?
            .json()
            .await?;
        Ok(value)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use httpmock::{Method, MockServer};
    use serde_json::json;

    fn transport() -> HttpTransport {
        HttpTransport::from_settings(&HttpSettings::default()).unwrap()
    }

    #[tokio::test]
    async fn test_get_sends_accept_json() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(Method::GET)
                    .path("/db/manage/")
                    .header("accept", "application/json");
                then.status(200).json_body(json!({"services": {}}));
            })
            .await;

        let value = transport().get(&server.url("/db/manage/")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(value, json!({"services": {}}));
    }

    #[tokio::test]
    async fn test_get_non_success_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(Method::GET).path("/db/manage/");
                then.status(404).body("no management here");
            })
            .await;

        let err = transport()
            .get(&server.url("/db/manage/"))
            .await
            .unwrap_err();

        match err {
            TransportError::Http(HttpError::HttpStatus {
                status,
                body_preview,
                ..
            }) => {
                assert_eq!(status.as_u16(), 404);
                assert_eq!(body_preview, "no management here");
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_tls_only_rejects_http() {
        let settings = HttpSettings {
            allow_insecure_http: false,
            ..HttpSettings::default()
        };
        let transport = HttpTransport::from_settings(&settings).unwrap();

        let err = transport
            .get("http://localhost:7474/db/manage/")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransportError::Http(HttpError::InvalidScheme { .. })
        ));
    }
}
