use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

/// Default filter used when `RUST_LOG` is not set.
///
/// `reqwest` and `hyper` are kept at `warn` so that every proxied call does
/// not produce connection-pool chatter next to the gateway's own request log.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=info,reqwest=warn,hyper=warn";

/// Initializes the gateway's logging and tracing infrastructure.
///
/// The subscriber is layered the same way for every binary in this crate:
/// 1. **Registry**: the dispatcher every layer hangs off
/// 2. **EnvFilter Layer**: verbosity, controlled by `RUST_LOG`
/// 3. **Formatting Layer**: human-readable lines on stdout
///
/// # Environment Variable Configuration
/// - `RUST_LOG=debug` - also shows the upstream URL of every forwarded request
/// - `RUST_LOG=info` - request summaries and upstream status codes (default)
/// - `RUST_LOG=attendance_gateway=debug,tower_http=warn` - per-crate control
///
/// # Usage Example
/// ```rust,no_run
/// attendance_gateway::config::logging::init_logging();
/// tracing::info!("Gateway starting");
/// ```
///
/// Call exactly once, at the start of `main()`. A second call panics because
/// a global subscriber is already installed.
pub fn init_logging() {
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Like [`init_logging`] but tolerates an already-installed subscriber.
/// Tests call this from many places.
pub fn try_init_logging() {
    let _ = tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "warn".into())
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
