use crate::domain::ports::{ConfigProvider, PreprocessOptions};
use crate::utils::error::Result;
use crate::utils::validation::{validate_provider, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "receipt-verifier")]
#[command(about = "Verifies winning receipts by OCR and a remote ledger")]
pub struct CliConfig {
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = super::DEFAULT_PORT)]
    pub port: u16,

    #[arg(long, env = "LEDGER_URL", default_value = super::DEFAULT_LEDGER_URL)]
    pub ledger_url: String,

    #[arg(long, default_value = super::DEFAULT_RECEIPT_FIELD)]
    pub receipt_field: String,

    #[arg(long, default_value = super::DEFAULT_MARKER)]
    pub marker: String,

    #[arg(long, env = "TESSERACT_CMD", default_value = "tesseract")]
    pub tesseract_cmd: String,

    #[arg(long, default_value = "kor")]
    pub ocr_lang: String,

    #[arg(long, help = "Normalize images (grayscale, sharpen, contrast) before OCR")]
    pub preprocess: bool,

    #[arg(long)]
    pub no_grayscale: bool,

    #[arg(long)]
    pub no_sharpen: bool,

    #[arg(long, default_value_t = 40.0, allow_negative_numbers = true)]
    pub contrast: f32,

    #[arg(long, default_value_t = 10)]
    pub max_upload_mb: usize,

    #[arg(long, help = "Load settings from a TOML file instead of flags")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Start even if the OCR engine or language pack is missing")]
    pub skip_engine_check: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl ConfigProvider for CliConfig {
    fn host(&self) -> &str {
        &self.host
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn ledger_url(&self) -> &str {
        &self.ledger_url
    }

    fn receipt_field(&self) -> &str {
        &self.receipt_field
    }

    fn marker(&self) -> &str {
        &self.marker
    }

    fn tesseract_cmd(&self) -> &str {
        &self.tesseract_cmd
    }

    fn ocr_lang(&self) -> &str {
        &self.ocr_lang
    }

    fn preprocess(&self) -> PreprocessOptions {
        PreprocessOptions {
            enabled: self.preprocess,
            grayscale: !self.no_grayscale,
            sharpen: !self.no_sharpen,
            contrast: self.contrast,
        }
    }

    fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
