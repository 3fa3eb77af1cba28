//! Logging setup shared by the deposit binaries.
//!
//! Events go to stdout through an [`EnvFilter`](tracing_subscriber::EnvFilter) read from
//! `RUST_LOG`. When an OTLP collector is configured, spans are exported to it as well; a collector
//! that cannot be set up degrades to stdout-only logging instead of aborting the process.
use std::env;

use opentelemetry::{trace::TracerProvider, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{trace::SdkTracerProvider, Resource};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Environment variable holding the OTLP collector endpoint.
pub const OTLP_URL_ENVVAR: &str = "ROLLUP_DEPOSIT_OTLP_URL";

/// Environment variable holding a label appended to the service name, e.g. to tell apart several
/// depositors feeding the same collector.
pub const SVC_LABEL_ENVVAR: &str = "ROLLUP_DEPOSIT_SVC_LABEL";

/// `LOG_FILE=1` adds the source file to every stdout event.
const LOG_FILE_ENVVAR: &str = "LOG_FILE";

/// `LOG_LINE_NUM=1` adds the source line to every stdout event.
const LOG_LINE_NUM_ENVVAR: &str = "LOG_LINE_NUM";

/// Name of the tracer spans are exported under.
const TRACER_NAME: &str = "rollup-deposit";

/// Which parts of the source location stdout events carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceLocation {
    /// Print the source file.
    pub file: bool,
    /// Print the source line.
    pub line: bool,
}

impl SourceLocation {
    /// Reads [`LOG_FILE_ENVVAR`] and [`LOG_LINE_NUM_ENVVAR`].
    fn from_env() -> Self {
        Self {
            file: flag_enabled(env::var(LOG_FILE_ENVVAR).ok().as_deref()),
            line: flag_enabled(env::var(LOG_LINE_NUM_ENVVAR).ok().as_deref()),
        }
    }
}

/// Configuration for [`init`].
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Identifies this process in logs and as the exported service name.
    whoami: String,

    /// Collector endpoint; spans are only exported when set.
    otel_url: Option<String>,

    location: SourceLocation,
}

impl LoggerConfig {
    /// Creates a config that logs to stdout only, without source locations.
    pub const fn new(whoami: String) -> Self {
        Self {
            whoami,
            otel_url: None,
            location: SourceLocation {
                file: false,
                line: false,
            },
        }
    }

    /// Creates a config from the environment: the service label is appended to `base`, the
    /// collector comes from [`OTLP_URL_ENVVAR`] and source locations from `LOG_FILE` and
    /// `LOG_LINE_NUM`.
    pub fn from_env(base: &str) -> Self {
        Self {
            whoami: get_whoami_string(base),
            otel_url: get_otlp_url_from_env(),
            location: SourceLocation::from_env(),
        }
    }

    /// Sets the collector endpoint and returns the updated config.
    pub fn with_otlp_url(mut self, url: String) -> Self {
        self.otel_url = Some(url);
        self
    }

    /// Sets the source location options and returns the updated config.
    pub const fn with_source_location(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    /// Returns the whoami string.
    pub fn whoami(&self) -> &str {
        &self.whoami
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::from_env("rollup-deposit")
    }
}

/// Installs the global subscriber described by `config`.
///
/// Only the first call in a process installs a subscriber; later calls are no-ops.
pub fn init(config: LoggerConfig) {
    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .event_format(
            tracing_subscriber::fmt::format()
                .with_file(config.location.file)
                .with_line_number(config.location.line),
        )
        .with_filter(tracing_subscriber::EnvFilter::from_default_env());

    let provider = config
        .otel_url
        .as_deref()
        .map(|url| span_exporter_provider(&config.whoami, url));

    let installed = match &provider {
        Some(Ok(provider)) => {
            let otel_layer =
                tracing_opentelemetry::layer().with_tracer(provider.tracer(TRACER_NAME));
            tracing_subscriber::registry()
                .with(stdout_layer)
                .with(otel_layer)
                .try_init()
        }
        _ => tracing_subscriber::registry().with(stdout_layer).try_init(),
    };
    if installed.is_err() {
        return;
    }

    info!(whoami = %config.whoami, otlp = ?config.otel_url, "logging started");
    if let Some(Err(reason)) = provider {
        warn!(%reason, "span export disabled, could not set up the OTLP exporter");
    }
}

/// Builds a tracer provider that batches spans to the collector at `url`.
fn span_exporter_provider(whoami: &str, url: &str) -> Result<SdkTracerProvider, String> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(url)
        .build()
        .map_err(|e| e.to_string())?;

    let resource = Resource::builder()
        .with_attribute(KeyValue::new("service.name", whoami.to_owned()))
        .build();

    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build())
}

/// Whether an on/off environment flag is on. Only the exact value `1` enables it.
fn flag_enabled(value: Option<&str>) -> bool {
    value == Some("1")
}

/// Gets the OTLP URL from the standard envvar.
pub fn get_otlp_url_from_env() -> Option<String> {
    env::var(OTLP_URL_ENVVAR).ok()
}

/// Gets the service label from the standard envvar.
pub fn get_service_label_from_env() -> Option<String> {
    env::var(SVC_LABEL_ENVVAR).ok()
}

/// Computes the whoami string: `base`, or `base%label` when a service label is set.
pub fn get_whoami_string(base: &str) -> String {
    whoami_with_label(base, get_service_label_from_env().as_deref())
}

fn whoami_with_label(base: &str, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{base}%{label}"),
        None => base.to_owned(),
    }
}
