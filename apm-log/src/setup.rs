use std::env;

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::backtrace_enabled;

/// All crates in this workspace, configured to the maximum log level by
/// default. The effective level is still capped by [`LogConfig::level`].
const CRATE_NAMES: &[&str] = &["apm_log", "apm_agent", "apm_lambda"];

/// Controls the log format.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Auto detect the best format.
    ///
    /// This chooses [`LogFormat::Pretty`] for TTY, otherwise
    /// [`LogFormat::Simplified`].
    Auto,

    /// Compact printing with colors.
    Pretty,

    /// Simplified plain text output.
    Simplified,

    /// Dump out JSON lines.
    Json,
}

/// The minimum level of log messages that are emitted.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Do not emit log messages.
    Off,
    /// Emit only error messages.
    Error,
    /// Emit warnings and errors.
    Warn,
    /// Emit messages relevant to the average user.
    #[default]
    Info,
    /// Emit messages usually relevant to debugging.
    Debug,
    /// Emit full auxiliary information.
    Trace,
}

impl LogLevel {
    /// Returns the corresponding subscriber level filter.
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::OFF,
            Self::Error => LevelFilter::ERROR,
            Self::Warn => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }
}

/// Controls the logging system.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// The log level for the instrumentation crates.
    pub level: LogLevel,

    /// Controls the log output format.
    ///
    /// Defaults to [`LogFormat::Auto`], which detects the best format based on
    /// the TTY.
    pub format: LogFormat,

    /// When set to `true`, backtraces are forced on.
    ///
    /// Otherwise, backtraces can be enabled by setting the `RUST_BACKTRACE`
    /// variable to `full`.
    pub enable_backtraces: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Auto,
            enable_backtraces: false,
        }
    }
}

/// Configures the default directives: third-party crates at `INFO`, all
/// workspace crates at the maximum level.
fn default_filter() -> EnvFilter {
    let mut filter = EnvFilter::new("info");

    for name in CRATE_NAMES {
        if let Ok(directive) = format!("{name}=trace").parse() {
            filter = filter.add_directive(directive);
        }
    }

    filter
}

/// Initialize the logging system.
///
/// The `RUST_LOG` environment variable, when set, overrides the default
/// directives but not the configured level cap.
///
/// # Example
///
/// ```
/// let config = apm_log::LogConfig {
///     enable_backtraces: true,
///     ..Default::default()
/// };
///
/// apm_log::init(&config);
/// ```
pub fn init(config: &LogConfig) {
    if config.enable_backtraces && !backtrace_enabled() {
        env::set_var("RUST_BACKTRACE", "full");
    }

    let filter = match env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) => EnvFilter::new(directives),
        Err(_) => default_filter(),
    };

    let format: Box<dyn Layer<Registry> + Send + Sync> =
        match (config.format, console::user_attended()) {
            (LogFormat::Auto, true) | (LogFormat::Pretty, _) => fmt::layer().compact().boxed(),
            (LogFormat::Auto, false) | (LogFormat::Simplified, _) => {
                fmt::layer().with_ansi(false).boxed()
            }
            (LogFormat::Json, _) => fmt::layer().json().flatten_event(true).boxed(),
        };

    tracing_subscriber::registry()
        .with(
            format
                .with_filter(filter)
                .with_filter(config.level.level_filter()),
        )
        .try_init()
        .ok();
}
