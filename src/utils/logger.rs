use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// `RUST_LOG` wins; otherwise crate logs at info, or debug when verbose.
fn run_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("train_times=debug,info")
        } else {
            EnvFilter::new("train_times=info")
        }
    })
}

pub fn init_logger(verbose: bool, format: LogFormat) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let registry = tracing_subscriber::registry().with(run_filter(verbose));
    match format {
        LogFormat::Compact => registry.with(fmt_layer.compact()).init(),
        // one object per line for log shippers
        LogFormat::Json => registry.with(fmt_layer.json()).init(),
    }
}
