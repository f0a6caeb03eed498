#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Management services of a graph database server
//!
//! A server with management enabled publishes a service definition document
//! at its management URL (by default `<server>/db/manage/`):
//!
//! ```json
//! { "services": { "jmx": { "resources": { ... } }, "console": { ... } } }
//! ```
//!
//! [`GraphDatabaseManager`] fetches that document in the background as soon
//! as it is created, hands each descriptor to the matching local
//! [`ServiceProxy`] and then emits [`DatabaseEvent::ServicesLoaded`] on the
//! owning [`GraphDatabase`].
//!
//! ```ignore
//! use graphdb_manager::{GraphDatabase, GraphDatabaseManager, ManagerConfig};
//! use std::sync::Arc;
//!
//! let db = Arc::new(GraphDatabase::from_config(&ManagerConfig::default())?);
//! let manager = GraphDatabaseManager::new(db);
//! manager.wait_for_discovery().await?;
//! for name in manager.available_services()?.iter() {
//!     println!("{name}");
//! }
//! ```

mod config;
mod database;
mod error;
mod events;
mod manager;
pub mod services;
mod transport;

pub use config::{DEFAULT_SERVER_URL, HttpSettings, MANAGE_PATH, ManagerConfig};
pub use database::GraphDatabase;
pub use error::{DiscoveryError, ManagerError};
pub use events::{DatabaseEvent, EventBus, SERVICES_FAILED, SERVICES_LOADED};
pub use manager::GraphDatabaseManager;
pub use services::{ManagementService, ServiceDescriptor, ServiceKind, ServiceProxy, ServiceTable};
pub use transport::{HttpTransport, ManagementTransport, TransportError};
