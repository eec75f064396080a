use clap::Args;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable that overrides the log filter.
pub const LOG_ENV: &str = "ULPR_LOG";

/// Logging flags shared by every binary.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingArgs {
    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level or filter directive (e.g. `info`, `ulpr_runtime=trace`)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

impl LoggingArgs {
    pub fn init(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        init_tracing(self.verbose, self.log_level.as_deref(), self.log_json)
    }
}

/// Filter directive for the given flags.
pub fn filter_directive(verbose: bool, log_level: Option<&str>) -> String {
    match (verbose, log_level) {
        (_, Some(level)) if level.contains('=') => level.to_string(),
        (_, Some(level)) => format!("ulpr={}", level),
        (true, None) => "ulpr=debug".to_string(),
        (false, None) => "ulpr=warn".to_string(),
    }
}

/// Initialize structured logging on stderr.
///
/// `RUST_LOG` or `ULPR_LOG` take precedence over the flags.
pub fn init_tracing(
    verbose: bool,
    log_level: Option<&str>,
    log_json: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env(LOG_ENV))
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose, log_level)));

    let registry = tracing_subscriber::registry().with(filter);

    if log_json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    }

    Ok(())
}
