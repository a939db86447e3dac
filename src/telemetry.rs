use crate::config::Mode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default
/// level for the mode.
pub fn init_tracing(mode: Mode) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(mode)));

    if mode.is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_line_number(true),
            )
            .init();
    }
}

fn default_filter(mode: Mode) -> &'static str {
    match mode {
        Mode::Production => "info",
        Mode::Development => "club_registry=debug,tower_http=debug,info",
    }
}
