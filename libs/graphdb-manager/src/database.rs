use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;
use url::Url;

use crate::config::{MANAGE_PATH, ManagerConfig};
use crate::error::ManagerError;
use crate::events::{DatabaseEvent, EventBus};
use crate::transport::{HttpTransport, ManagementTransport};

/// Handle to one graph database server
///
/// Owns what a [`crate::GraphDatabaseManager`] needs from its server: the
/// management URL, the transport used to reach it and the event bus that
/// [`GraphDatabase::trigger`] publishes to.
pub struct GraphDatabase {
    url: String,
    manage_url: String,
    events: EventBus,
    transport: Arc<dyn ManagementTransport>,
}

impl fmt::Debug for GraphDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphDatabase")
            .field("url", &self.url)
            .field("manage_url", &self.manage_url)
            .field("subscribers", &self.events.subscriber_count())
            .finish_non_exhaustive()
    }
}

impl GraphDatabase {
    /// Handle for the server at `url`, managed at `<url>/db/manage/`
    ///
    /// # Errors
    /// Returns [`ManagerError::InvalidUrl`] if `url` is not an absolute URL
    pub fn new(
        url: impl Into<String>,
        transport: Arc<dyn ManagementTransport>,
    ) -> Result<Self, ManagerError> {
        let url = url.into();
        let manage_url = derive_manage_url(&url)?;
        Ok(Self {
            url,
            manage_url,
            events: EventBus::new(),
            transport,
        })
    }

    /// Replace the derived management URL
    #[must_use]
    pub fn with_manage_url(mut self, manage_url: impl Into<String>) -> Self {
        self.manage_url = manage_url.into();
        self
    }

    /// Handle with an HTTP transport built from `config`
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// Returns [`ManagerError::InvalidUrl`] for a bad server URL and
    /// [`ManagerError::Transport`] if the HTTP client cannot be built
    pub fn from_config(config: &ManagerConfig) -> Result<Self, ManagerError> {
        let transport = HttpTransport::from_settings(&config.http)
            .map_err(|e| ManagerError::Transport(Arc::new(e)))?;
        let db = Self::new(config.url.clone(), Arc::new(transport))?;
        Ok(match &config.manage_url {
            Some(manage_url) => db.with_manage_url(manage_url.clone()),
            None => db,
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn manage_url(&self) -> &str {
        &self.manage_url
    }

    #[must_use]
    pub fn transport(&self) -> &Arc<dyn ManagementTransport> {
        &self.transport
    }

    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DatabaseEvent> {
        self.events.subscribe()
    }

    /// Publish `event` to every subscriber of this handle
    pub fn trigger(&self, event: DatabaseEvent) {
        self.events.publish(event);
    }
}

fn derive_manage_url(url: &str) -> Result<String, ManagerError> {
    let invalid = |source| ManagerError::InvalidUrl {
        url: url.to_owned(),
        source,
    };

    let mut base = Url::parse(url).map_err(invalid)?;
    if base.cannot_be_a_base() {
        return Err(invalid(url::ParseError::RelativeUrlWithCannotBeABaseBase));
    }
    // Without the trailing slash join() would replace the last segment
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(MANAGE_PATH)
        .map(String::from)
        .map_err(invalid)
}
