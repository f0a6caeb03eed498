use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Level for `-v` count when `RUST_LOG` is unset
fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn env_filter(verbose: u8) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level_for(verbose).into())
        .from_env_lossy()
}

/// Log to stderr, as JSON when `json` is set
///
/// `RUST_LOG` wins over `verbose`. Does nothing if a global subscriber is
/// already installed.
pub fn init(verbose: u8, json: bool) {
    let filter = env_filter(verbose);

    let (text, json) = if json {
        let layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339());
        (None, Some(layer))
    } else {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339());
        (Some(layer), None)
    };

    _ = Registry::default()
        .with(filter)
        .with(text)
        .with(json)
        .try_init();
}
