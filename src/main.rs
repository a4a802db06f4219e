use clap::Parser;
use train_times::core::ConfigProvider;
use train_times::utils::error::ErrorSeverity;
use train_times::utils::logger::{self, LogFormat};
use train_times::utils::validation::Validate;
use train_times::{CliConfig, EtlEngine, EtlError, LocalStorage, TomlConfig, TravelTimePipeline};

#[derive(Parser)]
#[command(name = "train-times")]
#[command(about = "Builds a teacher × school travel time matrix from transit route searches")]
struct Args {
    #[command(flatten)]
    run: CliConfig,

    /// Load settings from a TOML file instead of the flags above
    #[arg(short, long)]
    config: Option<String>,

    /// Print the planned route queries as JSON lines and exit
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // 初始化日誌
    let format = if args.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(args.verbose, format);

    tracing::info!("🚀 Starting train-times");

    let outcome = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path) {
                Ok(config) => run(config, args.dry_run).await,
                Err(e) => Err(e),
            }
        }
        None => run(args.run.clone(), args.dry_run).await,
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        std::process::exit(exit_code(e.severity()));
    }
}

/// A failed run never exits with 0.
fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    }
}

async fn run<C>(config: C, dry_run: bool) -> Result<(), EtlError>
where
    C: ConfigProvider + Validate,
{
    // 驗證配置
    config.validate()?;
    tracing::debug!(
        "Input: {}, output: {}/{}",
        config.input_path(),
        config.output_path(),
        config.output_filename()
    );

    let storage = LocalStorage::default();
    let pipeline = TravelTimePipeline::new(storage, config)?;

    if dry_run {
        let planned = pipeline.write_plan(&mut std::io::stdout()).await?;
        tracing::info!("📋 {} route queries planned", planned);
        return Ok(());
    }

    let engine = EtlEngine::new(pipeline);
    let output_path = engine.run().await?;
    println!("✅ Finished");
    println!("📁 Output saved to: {}", output_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_severity_exits_non_zero() {
        for severity in [
            ErrorSeverity::Low,
            ErrorSeverity::Medium,
            ErrorSeverity::High,
            ErrorSeverity::Critical,
        ] {
            assert_ne!(exit_code(severity), 0, "{:?}", severity);
        }
        assert_eq!(exit_code(ErrorSeverity::Critical), 3);
    }
}
