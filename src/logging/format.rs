//! tracing-subscriber setup: JSON lines or human-readable text, written to
//! stderr so one-shot JSON documents on stdout stay clean.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub struct StructuredLogger;

impl StructuredLogger {
    /// `RUST_LOG` wins over `default_level`; an unparsable level falls back to `info`.
    pub fn filter(default_level: &str) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }

    /// Install the global subscriber. Returns false if one was already installed.
    pub fn init(json: bool, default_level: &str) -> bool {
        let filter = Self::filter(default_level);
        let registry = tracing_subscriber::registry().with(filter);
        let installed = if json {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(FmtSpan::CLOSE)
                        .with_current_span(true)
                        .with_writer(std::io::stderr),
                )
                .try_init()
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_span_events(FmtSpan::CLOSE)
                        .with_writer(std::io::stderr),
                )
                .try_init()
        };
        installed.is_ok()
    }
}
