use std::time::Duration;

/// Default User-Agent string for management requests
pub const DEFAULT_USER_AGENT: &str = concat!("gdm-http/", env!("CARGO_PKG_VERSION"));

/// Which root certificates verify server certificates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TlsRootConfig {
    /// Mozilla roots bundled at compile time (works in minimal containers)
    #[default]
    WebPki,
    /// Roots from the operating system certificate store
    Native,
}

/// Which URL schemes the client accepts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportSecurity {
    /// Only `https://` URLs are accepted
    #[default]
    TlsOnly,
    /// `http://` is accepted as well; meant for local servers and mocks
    AllowInsecureHttp,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Timeout for one request, including reading the response head (default: 30s)
    pub request_timeout: Duration,

    /// Maximum decompressed response body size in bytes (default: 10 MB)
    pub max_body_size: usize,

    /// Value sent in the User-Agent header unless the request sets its own
    pub user_agent: String,

    /// Accepted URL schemes
    pub transport: TransportSecurity,

    /// Root certificate source for TLS
    pub tls_roots: TlsRootConfig,

    /// Number of requests that may be queued in front of the connection pool
    ///
    /// A value of 0 is clamped to 1 at build time.
    pub buffer_capacity: usize,

    /// How long an idle pooled connection is kept (`None`: hyper-util default)
    pub pool_idle_timeout: Option<Duration>,

    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_body_size: 10 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            transport: TransportSecurity::TlsOnly,
            tls_roots: TlsRootConfig::default(),
            buffer_capacity: 64,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 4,
        }
    }
}

impl HttpClientConfig {
    /// Configuration for talking to a management endpoint
    ///
    /// Management documents are small, so the body limit is 1 MB.
    #[must_use]
    pub fn management() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_body_size: 1024 * 1024,
            ..Self::default()
        }
    }

    /// Configuration for tests against local mock servers
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_body_size: 1024 * 1024,
            transport: TransportSecurity::AllowInsecureHttp,
            buffer_capacity: 16,
            pool_idle_timeout: Some(Duration::from_secs(10)),
            ..Self::default()
        }
    }
}
