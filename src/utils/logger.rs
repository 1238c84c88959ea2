use anyhow::Result;
use std::fmt::Display;
use tracing::{error, warn};
use tracing::{level_filters::LevelFilter, Subscriber};
use tracing_subscriber::{
    fmt::{format, FormatEvent, FormatFields},
    prelude::*,
    registry::LookupSpan,
    EnvFilter,
};

// A simple way to log without interrupting fluency
pub trait LogMe<T> {
    fn log_warn<C: Display + Send + Sync + 'static>(self, context_msg: C) -> anyhow::Result<T>;
    fn log_error<C: Display + Send + Sync + 'static>(self, context_msg: C) -> anyhow::Result<T>;
}

// Will log a warning in case of error
// WARN {context_msg}: {cause}
impl<T, Error: Into<anyhow::Error> + Display + Send + Sync + 'static> LogMe<T>
    for Result<T, Error>
{
    fn log_warn<C: Display + Send + Sync + 'static>(self, context_msg: C) -> anyhow::Result<T> {
        match self {
            Err(e) => {
                let ae: anyhow::Error = e.into();
                let ae = ae.context(context_msg);
                warn!("{:#}", ae);
                Err(ae)
            }
            Ok(t) => Ok(t),
        }
    }

    fn log_error<C: Display + Send + Sync + 'static>(self, context_msg: C) -> anyhow::Result<T> {
        match self {
            Err(e) => {
                let ae: anyhow::Error = e.into();
                let ae = ae.context(context_msg);
                error!("{:#}", ae);
                Err(ae)
            }
            Ok(t) => Ok(t),
        }
    }
}

/// Prefixes human readable lines with the application name
struct AppNameFormatter<T> {
    app_name: String,
    base_formatter: T,
}

impl<S, N, T> FormatEvent<S, N> for AppNameFormatter<T>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
    T: FormatEvent<S, N>,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        write!(&mut writer, "{} ", &self.app_name)?;
        self.base_formatter.format_event(ctx, writer, event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingMode {
    /// Human readable output on stderr, prefixed with the app name
    Full,
    /// JSON lines, for log collectors
    Json,
}

/// Setup tracing - stderr subscriber, stdout is kept for command output.
/// Defaults to INFO; HTTP client internals stay at INFO even if RUST_LOG is set to e.g. debug
/// (unless RUST_LOG names them).
pub fn setup_tracing(mode: TracingMode, app_name: &str) -> Result<()> {
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?;

    let var = std::env::var("RUST_LOG").unwrap_or("".to_string());
    if !var.contains("hyper") {
        filter = filter.add_directive("hyper=info".parse()?);
    }
    if !var.contains("reqwest") {
        filter = filter.add_directive("reqwest=info".parse()?);
    }

    // Can't use match inline because these are different return types
    match mode {
        TracingMode::Full => register_global_subscriber(
            filter,
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .event_format(AppNameFormatter {
                    app_name: app_name.to_string(),
                    base_formatter: tracing_subscriber::fmt::format(),
                }),
        ),
        TracingMode::Json => register_global_subscriber(
            filter,
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .event_format(tracing_subscriber::fmt::format().json()),
        ),
    };

    Ok(())
}

fn register_global_subscriber<T, S>(filter: EnvFilter, fmt_layer: T)
where
    S: Subscriber,
    T: tracing_subscriber::Layer<S> + Send + Sync,
    tracing_subscriber::filter::Filtered<T, tracing_subscriber::EnvFilter, S>:
        tracing_subscriber::Layer<tracing_subscriber::Registry>,
{
    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();
}
