use parking_lot::RwLock;

use super::{ServiceDescriptor, ServiceKind, ServiceProxy};

/// Default proxy: keeps the last descriptor it was given
#[derive(Debug)]
pub struct ManagementService {
    kind: ServiceKind,
    descriptor: RwLock<Option<ServiceDescriptor>>,
}

impl ManagementService {
    #[must_use]
    pub fn new(kind: ServiceKind) -> Self {
        Self {
            kind,
            descriptor: RwLock::new(None),
        }
    }

    /// URL of resource `name` from the current descriptor
    #[must_use]
    pub fn resource_url(&self, name: &str) -> Option<String> {
        self.descriptor
            .read()
            .as_ref()
            .and_then(|d| d.resource_url(name))
            .map(str::to_owned)
    }
}

impl ServiceProxy for ManagementService {
    fn kind(&self) -> ServiceKind {
        self.kind
    }

    fn make_available(&self, descriptor: ServiceDescriptor) {
        tracing::debug!(service = %self.kind, "service available");
        *self.descriptor.write() = Some(descriptor);
    }

    fn is_available(&self) -> bool {
        self.descriptor.read().is_some()
    }

    fn descriptor(&self) -> Option<ServiceDescriptor> {
        self.descriptor.read().clone()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unavailable_until_descriptor_arrives() {
        let service = ManagementService::new(ServiceKind::Backup);
        assert_eq!(service.kind(), ServiceKind::Backup);
        assert!(!service.is_available());
        assert!(service.descriptor().is_none());
        assert!(service.resource_url("trigger").is_none());
    }

    #[test]
    fn test_make_available_stores_descriptor() {
        let service = ManagementService::new(ServiceKind::Backup);
        let descriptor = ServiceDescriptor::new(json!({
            "resources": { "trigger": "http://localhost:7474/db/manage/server/backup/trigger" }
        }));

        service.make_available(descriptor.clone());

        assert!(service.is_available());
        assert_eq!(service.descriptor(), Some(descriptor));
        assert_eq!(
            service.resource_url("trigger").as_deref(),
            Some("http://localhost:7474/db/manage/server/backup/trigger")
        );
    }

    #[test]
    fn test_later_descriptor_replaces_earlier() {
        let service = ManagementService::new(ServiceKind::Config);
        service.make_available(ServiceDescriptor::new(json!({"v": 1})));
        service.make_available(ServiceDescriptor::new(json!({"v": 2})));
        assert_eq!(
            service.descriptor().map(ServiceDescriptor::into_value),
            Some(json!({"v": 2}))
        );
    }
}
