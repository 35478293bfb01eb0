use crate::domain::model::ReceiptCode;
use crate::utils::error::{LookupFailure, OcrError};
use async_trait::async_trait;

#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn image_to_text(&self, image: &[u8], lang: &str) -> std::result::Result<String, OcrError>;
}

#[async_trait]
pub trait LedgerSource: Send + Sync {
    async fn lookup(&self, code: &ReceiptCode) -> std::result::Result<bool, LookupFailure>;
}

pub trait ConfigProvider: Send + Sync {
    fn host(&self) -> &str;
    fn port(&self) -> u16;
    fn ledger_url(&self) -> &str;
    fn receipt_field(&self) -> &str;
    fn marker(&self) -> &str;
    fn tesseract_cmd(&self) -> &str;
    fn ocr_lang(&self) -> &str;
    fn preprocess(&self) -> PreprocessOptions;
    fn max_upload_bytes(&self) -> usize;
}

/// Independently toggleable image normalization steps run before OCR.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessOptions {
    pub enabled: bool,
    pub grayscale: bool,
    pub sharpen: bool,
    /// Contrast adjustment passed to `image::DynamicImage::adjust_contrast`; 0.0 disables it.
    pub contrast: f32,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            grayscale: true,
            sharpen: true,
            contrast: 40.0,
        }
    }
}
