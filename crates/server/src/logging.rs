//! Process-wide tracing subscriber.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

/// Install the JSON subscriber on stderr. Later calls do nothing.
///
/// Stdout carries the MCP transport, so nothing else may write there.
pub fn init() {
    INIT.get_or_init(|| {
        let installed = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .json()
            .try_init();
        if let Err(e) = installed {
            eprintln!("tracing subscriber already installed: {e}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        assert!(INIT.get().is_some());
    }
}
