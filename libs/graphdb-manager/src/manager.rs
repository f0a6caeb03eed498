use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, watch};

use crate::database::GraphDatabase;
use crate::error::{DiscoveryError, ManagerError};
use crate::events::DatabaseEvent;
use crate::services::{ServiceDescriptor, ServiceKind, ServiceProxy, ServiceTable};

/// Body of a management URL response
#[derive(Deserialize)]
struct ServiceDefinition {
    services: Map<String, Value>,
}

/// Result of the last successful discovery
struct Discovered {
    /// Services in the order the server listed them
    services: Map<String, Value>,
    /// Filled on the first `available_services()` call
    names: OnceLock<Arc<[String]>>,
}

type FirstAttempt = Option<Result<(), ManagerError>>;

/// Discovers the management services of a [`GraphDatabase`]
///
/// Creating a manager starts discovery in the background. Until it has
/// succeeded [`Self::is_discovered`] is `false` and
/// [`Self::available_services`] fails with [`ManagerError::NotDiscovered`].
/// On success every listed service with a local proxy gets its descriptor and
/// the database publishes [`DatabaseEvent::ServicesLoaded`]; on failure it
/// publishes [`DatabaseEvent::ServicesFailed`].
pub struct GraphDatabaseManager {
    db: Arc<GraphDatabase>,
    manage_url: String,
    services: ServiceTable,
    state: RwLock<Option<Arc<Discovered>>>,
    discovery_lock: Mutex<()>,
    first_attempt: watch::Sender<FirstAttempt>,
}

impl fmt::Debug for GraphDatabaseManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphDatabaseManager")
            .field("manage_url", &self.manage_url)
            .field("discovered", &self.is_discovered())
            .field("services", &self.services)
            .finish_non_exhaustive()
    }
}

impl GraphDatabaseManager {
    /// Manager with the standard proxy for every service kind
    ///
    /// # Panics
    /// Outside a tokio runtime
    #[must_use]
    pub fn new(db: Arc<GraphDatabase>) -> Arc<Self> {
        Self::with_services(db, ServiceTable::standard())
    }

    /// Manager dispatching to the proxies in `services`
    ///
    /// # Panics
    /// Outside a tokio runtime
    #[must_use]
    pub fn with_services(db: Arc<GraphDatabase>, services: ServiceTable) -> Arc<Self> {
        let (first_attempt, _) = watch::channel(None);
        let manager = Arc::new(Self {
            manage_url: db.manage_url().to_owned(),
            db,
            services,
            state: RwLock::new(None),
            discovery_lock: Mutex::new(()),
            first_attempt,
        });

        // The tasks keep their own references; dropping the manager does not
        // cancel the request. Discovery runs in its own task so a panicking
        // proxy still resolves `wait_for_discovery`.
        let task = Arc::clone(&manager);
        tokio::spawn(async move {
            let discovery = Arc::clone(&task);
            let joined = tokio::spawn(async move { discovery.discover_services().await }).await;
            let outcome = joined.unwrap_or_else(|e| {
                tracing::error!(url = %task.manage_url, error = %e, "service discovery aborted");
                Err(ManagerError::DiscoveryAborted {
                    url: task.manage_url.clone(),
                })
            });
            task.first_attempt.send_replace(Some(outcome));
        });

        manager
    }

    /// Whether a service definition has been received
    #[must_use]
    pub fn is_discovered(&self) -> bool {
        self.state.read().is_some()
    }

    /// Names of the services the server listed, in server order
    ///
    /// Includes services without a local proxy. The list is computed once per
    /// discovery and shared by later calls.
    ///
    /// # Errors
    /// [`ManagerError::NotDiscovered`] before the first successful discovery
    pub fn available_services(&self) -> Result<Arc<[String]>, ManagerError> {
        let state = self
            .state
            .read()
            .clone()
            .ok_or(ManagerError::NotDiscovered)?;
        let names = state
            .names
            .get_or_init(|| state.services.keys().cloned().collect());
        Ok(Arc::clone(names))
    }

    /// Descriptor of service `name` as the server sent it
    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<ServiceDescriptor> {
        self.state
            .read()
            .as_ref()?
            .services
            .get(name)
            .cloned()
            .map(ServiceDescriptor::new)
    }

    /// Fetch the service definition and hand each descriptor to its proxy
    ///
    /// Runs once on construction; call again to re-discover. Concurrent calls
    /// run one after another. A failed attempt keeps the previous result.
    ///
    /// # Errors
    /// [`ManagerError::DiscoveryFailed`] if the definition cannot be fetched
    /// or is not a `{ "services": { ... } }` document
    pub async fn discover_services(&self) -> Result<(), ManagerError> {
        let _serial = self.discovery_lock.lock().await;
        tracing::debug!(url = %self.manage_url, "discovering management services");

        match self.fetch_definition().await {
            Ok(services) => {
                self.apply(services);
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    url = %self.manage_url,
                    error = %e,
                    "unable to fetch service descriptions"
                );
                self.db.trigger(DatabaseEvent::ServicesFailed {
                    url: self.manage_url.clone(),
                });
                Err(ManagerError::DiscoveryFailed {
                    url: self.manage_url.clone(),
                    source: Arc::new(e),
                })
            }
        }
    }

    async fn fetch_definition(&self) -> Result<Map<String, Value>, DiscoveryError> {
        let body = self.db.transport().get(&self.manage_url).await?;
        let definition: ServiceDefinition = serde_json::from_value(body)?;
        Ok(definition.services)
    }

    fn apply(&self, services: Map<String, Value>) {
        let discovered = Arc::new(Discovered {
            services,
            names: OnceLock::new(),
        });
        *self.state.write() = Some(Arc::clone(&discovered));

        // One call per proxy: with both a name and its alias listed, the
        // first entry wins
        let mut dispatched = HashSet::new();
        for (name, descriptor) in &discovered.services {
            let Some(kind) = ServiceKind::from_name(name) else {
                tracing::debug!(service = %name, "no local proxy for service");
                continue;
            };
            if !dispatched.insert(kind) {
                tracing::debug!(service = %name, proxy = %kind, "proxy already dispatched");
                continue;
            }
            self.services
                .get(kind)
                .make_available(ServiceDescriptor::new(descriptor.clone()));
        }

        tracing::info!(
            url = %self.manage_url,
            count = discovered.services.len(),
            dispatched = dispatched.len(),
            "management services loaded"
        );
        self.db.trigger(DatabaseEvent::ServicesLoaded);
    }

    /// Wait for the discovery started on construction
    ///
    /// Resolves immediately once it has finished; a discovery task that
    /// panicked resolves to [`ManagerError::DiscoveryAborted`]. Later calls to
    /// [`Self::discover_services`] do not change the outcome reported here.
    ///
    /// # Errors
    /// The error of the initial discovery attempt
    pub async fn wait_for_discovery(&self) -> Result<(), ManagerError> {
        let mut outcome = self.first_attempt.subscribe();
        match outcome.wait_for(Option::is_some).await {
            Ok(done) => done.clone().unwrap_or(Err(ManagerError::NotDiscovered)),
            Err(_) => Err(ManagerError::NotDiscovered),
        }
    }

    #[must_use]
    pub fn manage_url(&self) -> &str {
        &self.manage_url
    }

    #[must_use]
    pub fn database(&self) -> &Arc<GraphDatabase> {
        &self.db
    }

    #[must_use]
    pub fn services(&self) -> &ServiceTable {
        &self.services
    }

    #[must_use]
    pub fn service(&self, kind: ServiceKind) -> &Arc<dyn ServiceProxy> {
        self.services.get(kind)
    }

    #[must_use]
    pub fn backup(&self) -> &Arc<dyn ServiceProxy> {
        self.service(ServiceKind::Backup)
    }

    #[must_use]
    pub fn config(&self) -> &Arc<dyn ServiceProxy> {
        self.service(ServiceKind::Config)
    }

    #[must_use]
    pub fn importing(&self) -> &Arc<dyn ServiceProxy> {
        self.service(ServiceKind::Import)
    }

    #[must_use]
    pub fn exporting(&self) -> &Arc<dyn ServiceProxy> {
        self.service(ServiceKind::Export)
    }

    #[must_use]
    pub fn console(&self) -> &Arc<dyn ServiceProxy> {
        self.service(ServiceKind::Console)
    }

    #[must_use]
    pub fn jmx(&self) -> &Arc<dyn ServiceProxy> {
        self.service(ServiceKind::Jmx)
    }

    #[must_use]
    pub fn lifecycle(&self) -> &Arc<dyn ServiceProxy> {
        self.service(ServiceKind::Lifecycle)
    }

    #[must_use]
    pub fn monitor(&self) -> &Arc<dyn ServiceProxy> {
        self.service(ServiceKind::Monitor)
    }
}
