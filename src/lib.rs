pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{Preprocessor, TesseractCli};
pub use config::TomlConfig;
pub use crate::core::{extractor::Extractor, ledger::HttpLedger, verifier::Verifier};
pub use domain::model::{ImageBlob, ReceiptCode, Verification, VerificationResult};
pub use domain::ports::{ConfigProvider, LedgerSource, OcrEngine, PreprocessOptions};
pub use server::VerifyServer;
pub use utils::error::{ExtractionFailure, LookupFailure, OcrError, Result, VerifyError};
