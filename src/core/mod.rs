pub mod extractor;
pub mod ledger;
pub mod verifier;

pub use crate::domain::model::{ImageBlob, LedgerSnapshot, ReceiptCode, Verification, VerificationResult};
pub use crate::domain::ports::{ConfigProvider, LedgerSource, OcrEngine, PreprocessOptions};
pub use crate::utils::error::Result;
