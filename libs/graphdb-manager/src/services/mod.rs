//! Local proxies for the management services a server can offer.

mod proxy;

pub use proxy::ManagementService;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Management services with a local proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceKind {
    Backup,
    Config,
    Import,
    Export,
    Console,
    Jmx,
    Lifecycle,
    Monitor,
}

impl ServiceKind {
    pub const ALL: [Self; 8] = [
        Self::Backup,
        Self::Config,
        Self::Import,
        Self::Export,
        Self::Console,
        Self::Jmx,
        Self::Lifecycle,
        Self::Monitor,
    ];

    /// Name the server uses for this service
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Backup => "backup",
            Self::Config => "config",
            Self::Import => "importing",
            Self::Export => "exporting",
            Self::Console => "console",
            Self::Jmx => "jmx",
            Self::Lifecycle => "lifecycle",
            Self::Monitor => "monitor",
        }
    }

    /// Kind for a service name from a service definition
    ///
    /// Accepts `import` and `export` as well as the canonical names. When a
    /// definition lists both spellings, only the first one is dispatched.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "backup" => Some(Self::Backup),
            "config" => Some(Self::Config),
            "importing" | "import" => Some(Self::Import),
            "exporting" | "export" => Some(Self::Export),
            "console" => Some(Self::Console),
            "jmx" => Some(Self::Jmx),
            "lifecycle" => Some(Self::Lifecycle),
            "monitor" => Some(Self::Monitor),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Descriptor of one service, exactly as the server sent it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceDescriptor(serde_json::Value);

impl ServiceDescriptor {
    #[must_use]
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> serde_json::Value {
        self.0
    }

    /// Names of the entries in the `resources` object, if any
    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.0
            .get("resources")
            .and_then(serde_json::Value::as_object)
            .into_iter()
            .flat_map(|resources| resources.keys().map(String::as_str))
    }

    /// URL of resource `name` from the `resources` object
    #[must_use]
    pub fn resource_url(&self, name: &str) -> Option<&str> {
        self.0.get("resources")?.get(name)?.as_str()
    }
}

impl From<serde_json::Value> for ServiceDescriptor {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Local stand-in for one management service
///
/// The manager calls [`ServiceProxy::make_available`] once per discovery in
/// which the server lists the service.
pub trait ServiceProxy: Send + Sync {
    fn kind(&self) -> ServiceKind;

    /// Attach the server's descriptor; the proxy is available from now on
    fn make_available(&self, descriptor: ServiceDescriptor);

    fn is_available(&self) -> bool;

    /// Descriptor from the last `make_available` call
    fn descriptor(&self) -> Option<ServiceDescriptor>;
}

/// One proxy per [`ServiceKind`]
#[derive(Clone)]
pub struct ServiceTable {
    proxies: [Arc<dyn ServiceProxy>; 8],
}

impl fmt::Debug for ServiceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.proxies
                    .iter()
                    .map(|proxy| (proxy.kind().name(), proxy.is_available())),
            )
            .finish()
    }
}

impl Default for ServiceTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ServiceTable {
    /// A [`ManagementService`] for every kind
    #[must_use]
    pub fn standard() -> Self {
        Self::from_fn(|kind| Arc::new(ManagementService::new(kind)))
    }

    /// Table built by calling `make` once per kind, in [`ServiceKind::ALL`] order
    ///
    /// # Panics
    /// If `make` returns a proxy whose `kind()` differs from the requested kind
    #[must_use]
    pub fn from_fn(mut make: impl FnMut(ServiceKind) -> Arc<dyn ServiceProxy>) -> Self {
        let proxies = ServiceKind::ALL.map(|kind| {
            let proxy = make(kind);
            assert_eq!(proxy.kind(), kind, "proxy registered under the wrong kind");
            proxy
        });
        Self { proxies }
    }

    #[must_use]
    pub fn get(&self, kind: ServiceKind) -> &Arc<dyn ServiceProxy> {
        &self.proxies[kind.index()]
    }

    /// Proxy for a service name as it appears in a service definition
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Arc<dyn ServiceProxy>> {
        ServiceKind::from_name(name).map(|kind| self.get(kind))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ServiceProxy>> {
        self.proxies.iter()
    }
}
