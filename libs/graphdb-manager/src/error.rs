use crate::transport::TransportError;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by [`crate::GraphDatabaseManager`] and [`crate::GraphDatabase`]
///
/// `Clone` so the outcome of the background discovery can be handed to every
/// waiter.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum ManagerError {
    /// The service definition has not been received yet
    ///
    /// Wait for [`crate::DatabaseEvent::ServicesLoaded`] or
    /// [`crate::GraphDatabaseManager::wait_for_discovery`] first.
    #[error("service definition has not been loaded yet")]
    NotDiscovered,

    /// The service definition could not be fetched from the management URL
    #[error("unable to fetch service descriptions for server {url}")]
    DiscoveryFailed {
        url: String,
        #[source]
        source: Arc<DiscoveryError>,
    },

    /// The initial discovery task panicked, typically inside a proxy
    ///
    /// Proxies dispatched before the panic keep their descriptors.
    #[error("service discovery for {url} was aborted")]
    DiscoveryAborted { url: String },

    /// The server URL cannot be turned into a management URL
    #[error("invalid server url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The HTTP transport could not be created
    #[error("failed to create management transport: {0}")]
    Transport(#[source] Arc<gdm_http::HttpError>),
}

impl ManagerError {
    /// URL the error refers to, if any
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::DiscoveryFailed { url, .. }
            | Self::DiscoveryAborted { url }
            | Self::InvalidUrl { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Why one discovery attempt failed
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DiscoveryError {
    /// GET of the management URL failed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response is not a `{ "services": { ... } }` document
    #[error("response is not a service definition: {0}")]
    Malformed(#[from] serde_json::Error),
}
