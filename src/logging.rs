use std::sync::Once;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "pixtune=info";

static INIT: Once = Once::new();

/// Installs the global `fmt` subscriber, honouring `RUST_LOG`.
///
/// Later calls are no-ops, as is the first one when the host already set a subscriber.
pub fn init() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
        if installed.is_err() {
            tracing::debug!("global subscriber already installed");
        }
    });
}
