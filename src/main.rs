use clap::Parser;
use receipt_verifier::utils::error::ErrorCategory;
use receipt_verifier::utils::{logger, validation::validate_provider};
use receipt_verifier::{CliConfig, ConfigProvider, TomlConfig, VerifyError, VerifyServer};

fn exit_with(e: &VerifyError) -> ! {
    tracing::error!("❌ Startup failed: {} (Category: {:?})", e, e.category());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e);
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.category() {
        ErrorCategory::Configuration => 1,
        ErrorCategory::Engine => 3,
        _ => 2,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_logger(cli.verbose, cli.json_logs);

    tracing::info!("Starting receipt-verifier");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config: Box<dyn ConfigProvider> = match &cli.config {
        Some(path) => {
            tracing::info!("Loading config from {}", path.display());
            match TomlConfig::from_file(path) {
                Ok(toml) => Box::new(toml),
                Err(e) => exit_with(&e),
            }
        }
        None => Box::new(cli.clone()),
    };

    if let Err(e) = validate_provider(config.as_ref()) {
        exit_with(&e);
    }

    let server = match VerifyServer::from_config(config.as_ref(), !cli.skip_engine_check).await {
        Ok(server) => server,
        Err(e) => exit_with(&e),
    };

    server.serve().await?;
    Ok(())
}
