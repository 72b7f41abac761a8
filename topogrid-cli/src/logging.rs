//! Logging initialisation for the topogrid CLI.
//!
//! Diagnostics go to `stderr` so generated artifacts and CSV written to
//! `stdout` stay machine-readable. Records emitted through the `log` facade
//! are forwarded into `tracing`.

use std::{env, str::FromStr, sync::OnceLock};

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, Layer, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Selects between human and JSON output.
pub const LOG_FORMAT_ENV: &str = "TOPOGRID_LOG_FORMAT";

const DEFAULT_DIRECTIVE: &str = "info";

static INSTALLED: OnceLock<LogSettings> = OnceLock::new();

/// Output style of the installed subscriber.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    /// Compact single-line records.
    #[default]
    Human,
    /// One JSON object per record with the active span list attached.
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalised = raw.trim().to_ascii_lowercase();
        match normalised.as_str() {
            "" | "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            _ => Err(LoggingError::UnsupportedFormat {
                provided: normalised,
            }),
        }
    }
}

/// Logging configuration resolved from the environment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogSettings {
    /// Record layout.
    pub format: LogFormat,
    /// Filter directive; `RUST_LOG` when set, otherwise `info`.
    pub directive: String,
}

impl LogSettings {
    /// Reads `TOPOGRID_LOG_FORMAT` and `RUST_LOG`.
    ///
    /// # Errors
    /// Returns [`LoggingError::NotUnicode`] for a non-UTF-8 variable and
    /// [`LoggingError::UnsupportedFormat`] for an unknown format name.
    pub fn from_env() -> Result<Self, LoggingError> {
        let format = read_var(LOG_FORMAT_ENV)?
            .as_deref()
            .map_or(Ok(LogFormat::Human), str::parse)?;
        let directive = read_var(EnvFilter::DEFAULT_ENV)?
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_owned());
        Ok(Self { format, directive })
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
    }
}

/// Errors raised while configuring logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// A logging variable held bytes that are not UTF-8.
    #[error("`{name}` is not valid UTF-8")]
    NotUnicode {
        /// Variable name.
        name: &'static str,
        /// Lookup failure.
        #[source]
        source: env::VarError,
    },
    /// `TOPOGRID_LOG_FORMAT` named an unknown format.
    #[error("log format `{provided}` is not one of `human`, `json`")]
    UnsupportedFormat {
        /// Normalised value that was rejected.
        provided: String,
    },
    /// A global subscriber could not be registered.
    #[error("could not register the tracing subscriber: {source}")]
    InstallFailed {
        /// Registration failure.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
}

fn read_var(name: &'static str) -> Result<Option<String>, LoggingError> {
    match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(LoggingError::NotUnicode { name, source }),
    }
}

/// Installs the global subscriber once per process.
///
/// Later calls are no-ops. When another subscriber already owns the global
/// slot, that subscriber is left in place.
///
/// # Errors
/// Returns [`LoggingError`] when the environment cannot be resolved.
pub fn init_logging() -> Result<(), LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }
    let settings = LogSettings::from_env()?;
    match install(&settings) {
        Ok(()) | Err(LoggingError::InstallFailed { .. }) => {}
        Err(err) => return Err(err),
    }
    let _ = INSTALLED.set(settings);
    Ok(())
}

fn install(settings: &LogSettings) -> Result<(), LoggingError> {
    let base = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let layer = if settings.format == LogFormat::Json {
        base.json().with_current_span(true).with_span_list(true).boxed()
    } else {
        base.with_target(false).boxed()
    };

    // The `log` slot may already be taken by an embedding application.
    let _ = LogTracer::init();

    tracing_subscriber::registry()
        .with(settings.filter())
        .with(layer)
        .try_init()
        .map_err(|source| LoggingError::InstallFailed { source })
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case("", LogFormat::Human)]
    #[case("Human", LogFormat::Human)]
    #[case("json", LogFormat::Json)]
    #[case("\tJSON\n", LogFormat::Json)]
    fn format_names_parse(#[case] raw: &str, #[case] expected: LogFormat) {
        assert_eq!(raw.parse::<LogFormat>().expect("known format"), expected);
    }

    #[rstest]
    #[case("Yaml", "yaml")]
    #[case(" logfmt ", "logfmt")]
    fn unknown_format_reports_normalised_name(#[case] raw: &str, #[case] expected: &str) {
        let err = raw.parse::<LogFormat>().expect_err("unsupported format");
        assert!(
            matches!(&err, LoggingError::UnsupportedFormat { provided } if provided == expected),
            "unexpected error: {err:?}"
        );
    }

    #[rstest]
    fn unparsable_directive_falls_back_to_info() {
        let settings = LogSettings {
            format: LogFormat::Human,
            directive: "topogrid=loud".to_owned(),
        };
        assert_eq!(settings.filter().to_string(), DEFAULT_DIRECTIVE);
    }

    #[rstest]
    fn repeated_initialisation_succeeds() {
        init_logging().expect("first install");
        init_logging().expect("second install is a no-op");
    }
}
