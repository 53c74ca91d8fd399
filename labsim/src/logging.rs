//! Tracing subscriber setup shared by the binaries.

use tracing_subscriber::EnvFilter;

use crate::constants::LOG_ENV;

/// Install a stderr `fmt` subscriber.
///
/// The filter comes from `LABSIM_LOG` when set, otherwise `debug` with `verbose` and `warn`
/// without. Calling this more than once is harmless; later calls keep the first subscriber.
pub fn init(verbose: bool) {
    let fallback = if verbose { "labsim=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init(false);
        init(true);
        tracing::debug!("still alive");
    }
}
