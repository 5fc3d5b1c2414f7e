use std::sync::Once;

use tracing_subscriber::{fmt::format::FmtSpan, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Install a compact stderr logger.
///
/// The level comes from the `RUST_LOG` environment variable and
/// defaults to `info`.  Calling it more than once is a no-op.
pub fn setup_logger() {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt::Subscriber::builder()
            .compact()
            .with_file(false)
            .with_target(false)
            .with_thread_names(false)
            .with_env_filter(env_filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(std::io::stderr)
            .finish()
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_twice() {
        setup_logger();
        setup_logger();
        tracing::debug!("logger installed");
    }
}
