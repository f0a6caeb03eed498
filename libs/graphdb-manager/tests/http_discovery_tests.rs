#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Discovery against a mock management endpoint over real HTTP

use std::sync::{Arc, Mutex};

use gdm_http::HttpError;
use graphdb_manager::{
    DatabaseEvent, DiscoveryError, GraphDatabase, GraphDatabaseManager, HttpSettings,
    ManagerConfig, ManagerError, TransportError,
};
use httpmock::{Method, MockServer};
use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;

fn config_for(server: &MockServer) -> ManagerConfig {
    ManagerConfig {
        url: server.base_url(),
        manage_url: None,
        http: HttpSettings {
            timeout_secs: 5,
            ..HttpSettings::default()
        },
    }
}

#[tokio::test]
async fn test_discovery_over_http() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(Method::GET)
                .path("/db/manage/")
                .header("accept", "application/json")
                .header_exists("user-agent");
            then.status(200).json_body(json!({
                "services": {
                    "console": {
                        "resources": { "exec": server.url("/db/manage/server/console") }
                    },
                    "jmx": {
                        "resources": { "query": server.url("/db/manage/server/jmx/query") }
                    }
                }
            }));
        })
        .await;

    let db = Arc::new(GraphDatabase::from_config(&config_for(&server)).unwrap());
    let mut events = db.subscribe();
    let manager = GraphDatabaseManager::new(db);

    manager.wait_for_discovery().await.unwrap();

    mock.assert_async().await;
    assert_eq!(events.recv().await.unwrap(), DatabaseEvent::ServicesLoaded);
    assert_eq!(
        &*manager.available_services().unwrap(),
        ["console".to_owned(), "jmx".to_owned()]
    );
    let jmx = manager.jmx().descriptor().unwrap();
    assert_eq!(
        jmx.resource_url("query"),
        Some(server.url("/db/manage/server/jmx/query").as_str())
    );
}

#[tokio::test]
async fn test_manage_url_override() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/custom/manage");
            then.status(200).json_body(json!({ "services": { "backup": {} } }));
        })
        .await;

    let config = ManagerConfig {
        manage_url: Some(server.url("/custom/manage")),
        ..config_for(&server)
    };
    let manager = GraphDatabaseManager::new(Arc::new(GraphDatabase::from_config(&config).unwrap()));

    manager.wait_for_discovery().await.unwrap();

    mock.assert_async().await;
    assert!(manager.backup().is_available());
}

#[tokio::test]
async fn test_error_status_fails_discovery() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/db/manage/");
            then.status(503).body("starting up");
        })
        .await;

    let manager = GraphDatabaseManager::new(Arc::new(
        GraphDatabase::from_config(&config_for(&server)).unwrap(),
    ));
    let err = manager.wait_for_discovery().await.unwrap_err();

    assert!(!manager.is_discovered());
    assert_eq!(err.url(), Some(server.url("/db/manage/").as_str()));
    match err {
        ManagerError::DiscoveryFailed { source, .. } => match &*source {
            DiscoveryError::Transport(TransportError::Http(HttpError::HttpStatus {
                status,
                body_preview,
                ..
            })) => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body_preview, "starting up");
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        },
        other => panic!("expected DiscoveryFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_body_fails_discovery() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/db/manage/");
            then.status(200).body("<html>login</html>");
        })
        .await;

    let manager = GraphDatabaseManager::new(Arc::new(
        GraphDatabase::from_config(&config_for(&server)).unwrap(),
    ));
    let err = manager.wait_for_discovery().await.unwrap_err();

    match err {
        ManagerError::DiscoveryFailed { source, .. } => assert!(matches!(
            *source,
            DiscoveryError::Transport(TransportError::Http(HttpError::Json(_)))
        )),
        other => panic!("expected DiscoveryFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_server() {
    // Bind and release a port so nothing listens on it
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let config = ManagerConfig {
        url: format!("http://127.0.0.1:{port}/"),
        ..ManagerConfig::default()
    };

    let db = Arc::new(GraphDatabase::from_config(&config).unwrap());
    let mut events = db.subscribe();
    let manager = GraphDatabaseManager::new(db);
    let err = manager.wait_for_discovery().await.unwrap_err();

    let expected = format!("http://127.0.0.1:{port}/db/manage/");
    assert_eq!(err.url(), Some(expected.as_str()));
    assert_eq!(
        events.recv().await.unwrap(),
        DatabaseEvent::ServicesFailed { url: expected }
    );
}

// =============================================================================
// Logging
// =============================================================================

#[derive(Default)]
struct EventCapture {
    events: Arc<Mutex<Vec<(tracing::Level, String)>>>,
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0));
    }
}

struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

#[tokio::test]
async fn test_discovery_logging() {
    let server = MockServer::start_async().await;
    let ok = server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/db/manage/");
            then.status(200)
                .json_body(json!({ "services": { "shell": {}, "monitor": {} } }));
        })
        .await;

    let capture = EventCapture::default();
    let events = capture.events.clone();
    let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(capture));

    // The discovery task runs on this thread, under the capturing subscriber
    let manager = GraphDatabaseManager::new(Arc::new(
        GraphDatabase::from_config(&config_for(&server)).unwrap(),
    ));
    manager.wait_for_discovery().await.unwrap();

    ok.delete_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/db/manage/");
            then.status(500);
        })
        .await;
    manager.discover_services().await.unwrap_err();

    let events = events.lock().unwrap();
    let has = |level: tracing::Level, text: &str| {
        events
            .iter()
            .any(|(l, message)| *l == level && message.contains(text))
    };
    assert!(has(tracing::Level::DEBUG, "no local proxy for service"), "{events:?}");
    assert!(has(tracing::Level::INFO, "management services loaded"), "{events:?}");
    assert!(has(tracing::Level::ERROR, "unable to fetch service descriptions"), "{events:?}");
}
