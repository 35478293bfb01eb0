use anyhow::Context;
use clap::Parser;
use receipt_verifier::utils::logger;
use receipt_verifier::{
    CliConfig, ConfigProvider, Extractor, HttpLedger, ImageBlob, LedgerSource, TesseractCli,
    TomlConfig, Verification, VerificationResult, VerifyError,
};
use std::path::PathBuf;

/// Runs the verification pipeline against a local image without starting the server.
#[derive(Debug, Parser)]
#[command(name = "check_receipt")]
#[command(about = "Run OCR extraction (and optionally the ledger lookup) on a local image")]
struct Args {
    /// Image file to check
    image: PathBuf,

    #[arg(long, help = "Also check the extracted code against the ledger")]
    lookup: bool,

    #[arg(long, help = "Print the raw recognized text")]
    show_text: bool,

    #[command(flatten)]
    settings: CliConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_logger(args.settings.verbose, args.settings.json_logs);

    let config: Box<dyn ConfigProvider> = match &args.settings.config {
        Some(path) => Box::new(TomlConfig::from_file(path)?),
        None => Box::new(args.settings.clone()),
    };

    let data = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("reading {}", args.image.display()))?;
    let image = ImageBlob::new(data);
    println!("🖼️  {} ({} bytes)", args.image.display(), image.len());

    let ocr = TesseractCli::new(config.tesseract_cmd());
    let extractor = Extractor::from_config(ocr, config.as_ref())?;

    // One OCR pass; the printed text is exactly what extraction decides on.
    let text = match extractor.recognize(&image).await {
        Ok(text) => text,
        Err(e) => {
            println!("❌ {}", e);
            std::process::exit(1);
        }
    };
    if args.show_text {
        println!("--- recognized text ---\n{}\n-----------------------", text.trim_end());
    }
    let extracted = extractor.extract_from_text(&text);

    if !args.lookup {
        match extracted {
            Ok(code) => println!("✅ Receipt code: {}", code),
            Err(e) => {
                println!("❌ {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let ledger = HttpLedger::from_config(config.as_ref());
    println!("📒 Ledger: {}", ledger.url());

    let outcome = match extracted {
        Ok(code) => match ledger.lookup(&code).await {
            Ok(matched) => Ok(Verification { code, matched }),
            Err(e) => Err(VerifyError::from(e)),
        },
        Err(e) => Err(VerifyError::from(e)),
    };

    let (result, failed) = match outcome {
        Ok(verification) => (VerificationResult::from(&verification), !verification.matched),
        Err(e) => {
            tracing::debug!("Verification error: {:?}", e);
            (VerificationResult::failure(e.user_friendly_message()), true)
        }
    };
    println!("{}", serde_json::to_string_pretty(&result)?);

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
