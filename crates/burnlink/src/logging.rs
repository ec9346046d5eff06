//! Tracing subscriber setup.

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

/// Install a global fmt subscriber.
///
/// The filter comes from `RUST_LOG` when set, otherwise `default_filter`
/// (for example `"burnlink=info"`). Fails if a subscriber is already set.
pub fn init_tracing(default_filter: &str) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_only_once() {
        assert!(init_tracing("burnlink=debug").is_ok());
        assert!(init_tracing("burnlink=debug").is_err());
        tracing::debug!("subscriber installed");
    }
}
