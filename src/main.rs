use clap::Parser;
use job_observatory::config::TomlConfig;
use job_observatory::core::ConfigProvider;
use job_observatory::utils::error::{ErrorSeverity, ObservatoryError};
use job_observatory::utils::{logger, validation::Validate};
use job_observatory::{CliConfig, LocalStorage, ObservatoryEngine, ObservatoryPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting job-observatory CLI");
    if cli.verbose {
        tracing::debug!("CLI flags: {:?}", cli);
    }

    let config = match cli.resolve().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    display_config_summary(&config);
    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing fetched");
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let storage = LocalStorage::new(config.output_path());
    let pipeline = match ObservatoryPipeline::new(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => exit_with(e),
    };
    let engine = ObservatoryEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Dashboard refreshed");
            println!("✅ Dashboard refreshed");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn exit_with(e: ObservatoryError) -> ! {
    tracing::error!(
        "❌ Dashboard refresh failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}

fn display_config_summary(config: &TomlConfig) {
    println!("📋 Configuration Summary:");
    println!("  Source: {}", config.api_endpoint());
    println!("  Basemap: {}", config.basemap_endpoint());
    println!("  Output: {}", config.output_path());
    if !config.filters().is_default() {
        println!("  Filters: {:?}", config.filters());
    }
    if let Some(role) = config.drift_role() {
        println!("  Drift role: {}", role);
    }
    if !config.market_worth().skills.is_empty() {
        println!(
            "  Market worth: {} ({:?})",
            config.market_worth().skills.join(", "),
            config.market_worth().experience
        );
    }
    println!();
}
