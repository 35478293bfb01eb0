use crate::adapters::preprocess::Preprocessor;
use crate::domain::model::{ImageBlob, ReceiptCode};
use crate::domain::ports::{ConfigProvider, OcrEngine};
use crate::utils::error::{ExtractionFailure, Result, VerifyError};
use regex::Regex;
use std::borrow::Cow;

/// Word-bounded run of exactly five digits; `\b` is Unicode-aware so Hangul counts as a word character.
const RECEIPT_CODE_PATTERN: &str = r"\b[0-9]{5}\b";

pub struct Extractor<O: OcrEngine> {
    ocr: O,
    lang: String,
    marker: String,
    code_pattern: Regex,
    preprocessor: Preprocessor,
}

impl<O: OcrEngine> Extractor<O> {
    pub fn new(
        ocr: O,
        lang: impl Into<String>,
        marker: impl Into<String>,
        preprocessor: Preprocessor,
    ) -> Result<Self> {
        let marker = marker.into();
        if marker.is_empty() {
            return Err(VerifyError::ConfigError {
                message: "winner marker cannot be empty".to_string(),
            });
        }

        let code_pattern = Regex::new(RECEIPT_CODE_PATTERN).map_err(|e| VerifyError::ConfigError {
            message: format!("receipt code pattern: {}", e),
        })?;

        Ok(Self {
            ocr,
            lang: lang.into(),
            marker,
            code_pattern,
            preprocessor,
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(ocr: O, config: &C) -> Result<Self> {
        Self::new(
            ocr,
            config.ocr_lang(),
            config.marker(),
            Preprocessor::new(config.preprocess()),
        )
    }

    /// Decision procedure over already-recognized text.
    pub fn extract_from_text(&self, text: &str) -> std::result::Result<ReceiptCode, ExtractionFailure> {
        if !text.contains(self.marker.as_str()) {
            return Err(ExtractionFailure::MarkerNotFound);
        }

        self.code_pattern
            .find(text)
            .and_then(|m| ReceiptCode::parse(m.as_str()))
            .ok_or(ExtractionFailure::CodeNotFound)
    }

    /// Optional preprocessing followed by OCR; the text `extract` decides on.
    pub async fn recognize(&self, image: &ImageBlob) -> std::result::Result<String, ExtractionFailure> {
        let input: Cow<'_, [u8]> = if self.preprocessor.is_enabled() {
            match self.preprocessor.apply(image.as_bytes()) {
                Ok(png) => Cow::Owned(png),
                Err(e) => {
                    tracing::warn!("⚠️ Preprocessing skipped, using original image: {}", e);
                    Cow::Borrowed(image.as_bytes())
                }
            }
        } else {
            Cow::Borrowed(image.as_bytes())
        };

        let text = self.ocr.image_to_text(&input, &self.lang).await?;
        tracing::debug!("Recognized text: {:?}", text);
        Ok(text)
    }

    pub async fn extract(&self, image: &ImageBlob) -> std::result::Result<ReceiptCode, ExtractionFailure> {
        let text = self.recognize(image).await?;

        let result = self.extract_from_text(&text);
        if let Err(ref failure) = result {
            tracing::info!("Extraction failed ({}); recognized text: {:?}", failure, text);
        }
        result
    }
}
