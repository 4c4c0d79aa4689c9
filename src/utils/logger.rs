use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;

fn default_filter(verbose: bool, level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| match (verbose, level) {
        (true, _) => EnvFilter::new("lead_crm=debug,info"),
        (false, Some(level)) => EnvFilter::new(format!("lead_crm={}", level)),
        (false, None) => EnvFilter::new("lead_crm=info"),
    })
}

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_logger(format: LogFormat, verbose: bool, level: Option<&str>) {
    let filter = default_filter(verbose, level);

    match format {
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .compact(),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .json(), // 部署環境用 JSON 方便收集
                )
                .init();
        }
    }
}
