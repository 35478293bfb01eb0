use crate::adapters::preprocess::probe_dimensions;
use crate::core::extractor::Extractor;
use crate::domain::model::{ImageBlob, Verification};
use crate::domain::ports::{LedgerSource, OcrEngine};
use crate::utils::error::{Result, VerifyError};

/// Two-step pipeline: extract the receipt code, then check it against the ledger.
pub struct Verifier<O: OcrEngine, L: LedgerSource> {
    extractor: Extractor<O>,
    ledger: L,
}

impl<O: OcrEngine, L: LedgerSource> Verifier<O, L> {
    pub fn new(extractor: Extractor<O>, ledger: L) -> Self {
        Self { extractor, ledger }
    }

    pub async fn verify(&self, image: &ImageBlob) -> Result<Verification> {
        if image.is_empty() {
            return Err(VerifyError::UnreadableImage {
                reason: "empty upload".to_string(),
            });
        }
        let (width, height) = probe_dimensions(image.as_bytes())?;
        tracing::debug!("Verifying {}x{} image ({} bytes)", width, height, image.len());

        // Extraction failures return before the ledger is ever fetched.
        let code = self.extractor.extract(image).await?;
        tracing::info!("Extracted receipt code {}", code);

        let matched = self.ledger.lookup(&code).await?;
        if matched {
            tracing::info!("✅ Receipt code {} found in ledger", code);
        } else {
            tracing::info!("Receipt code {} not in ledger", code);
        }

        Ok(Verification { code, matched })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::adapters::preprocess::tests::sample_png;
    use crate::adapters::Preprocessor;
    use crate::domain::model::ReceiptCode;
    use crate::domain::ports::PreprocessOptions;
    use crate::utils::error::{ExtractionFailure, LookupFailure, OcrError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    pub(crate) struct StaticOcr(pub std::result::Result<String, OcrError>);

    #[async_trait]
    impl OcrEngine for StaticOcr {
        async fn image_to_text(&self, _image: &[u8], _lang: &str) -> std::result::Result<String, OcrError> {
            self.0.clone()
        }
    }

    /// Ledger with a fixed set of codes that counts how often it is consulted.
    #[derive(Clone)]
    pub(crate) struct CountingLedger {
        codes: Vec<i64>,
        fail: bool,
        pub(crate) calls: Arc<AtomicUsize>,
    }

    impl CountingLedger {
        pub(crate) fn with_codes(codes: &[i64]) -> Self {
            Self {
                codes: codes.to_vec(),
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub(crate) fn unavailable() -> Self {
            Self {
                codes: vec![],
                fail: true,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LedgerSource for CountingLedger {
        async fn lookup(&self, code: &ReceiptCode) -> std::result::Result<bool, LookupFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LookupFailure::LedgerUnavailable("HTTP 500".to_string()));
            }
            Ok(self.codes.contains(&code.numeric_value()))
        }
    }

    pub(crate) fn verifier(text: &str, ledger: CountingLedger) -> Verifier<StaticOcr, CountingLedger> {
        let extractor = Extractor::new(
            StaticOcr(Ok(text.to_string())),
            "kor",
            "당첨",
            Preprocessor::new(PreprocessOptions::default()),
        )
        .unwrap();
        Verifier::new(extractor, ledger)
    }

    #[tokio::test]
    async fn test_verify_matching_code() {
        let ledger = CountingLedger::with_codes(&[54321]);
        let v = verifier("당첨! 접수번호 54321", ledger.clone());

        let result = v.verify(&ImageBlob::new(sample_png(8, 8))).await.unwrap();

        assert_eq!(result.code.as_str(), "54321");
        assert!(result.matched);
        assert_eq!(ledger.calls(), 1);
    }

    #[tokio::test]
    async fn test_verify_unknown_code_is_negative_not_error() {
        let ledger = CountingLedger::with_codes(&[11111]);
        let v = verifier("당첨 22222", ledger.clone());

        let result = v.verify(&ImageBlob::new(sample_png(8, 8))).await.unwrap();

        assert!(!result.matched);
        assert_eq!(ledger.calls(), 1);
    }

    #[tokio::test]
    async fn test_extraction_failure_skips_ledger() {
        let ledger = CountingLedger::with_codes(&[12345]);
        let v = verifier("축하합니다 12345", ledger.clone());

        let err = v.verify(&ImageBlob::new(sample_png(8, 8))).await.unwrap_err();

        assert!(matches!(err, VerifyError::Extraction(ExtractionFailure::MarkerNotFound)));
        assert_eq!(ledger.calls(), 0);
    }

    #[tokio::test]
    async fn test_ledger_unavailable_is_not_a_negative_match() {
        let ledger = CountingLedger::unavailable();
        let v = verifier("당첨 12345", ledger.clone());

        let err = v.verify(&ImageBlob::new(sample_png(8, 8))).await.unwrap_err();

        assert!(matches!(err, VerifyError::Lookup(LookupFailure::LedgerUnavailable(_))));
        assert_eq!(err.http_status(), 500);
    }

    #[tokio::test]
    async fn test_unreadable_image_rejected_before_ocr() {
        let ledger = CountingLedger::with_codes(&[12345]);
        let extractor = Extractor::new(
            StaticOcr(Err(OcrError::Unavailable("must not run".to_string()))),
            "kor",
            "당첨",
            Preprocessor::new(PreprocessOptions::default()),
        )
        .unwrap();
        let v = Verifier::new(extractor, ledger.clone());

        let err = v.verify(&ImageBlob::new(b"plain text".to_vec())).await.unwrap_err();

        assert!(matches!(err, VerifyError::UnreadableImage { .. }));
        assert_eq!(err.http_status(), 400);
        assert_eq!(ledger.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_upload_rejected_before_ocr() {
        let ledger = CountingLedger::with_codes(&[12345]);
        let extractor = Extractor::new(
            StaticOcr(Err(OcrError::Unavailable("must not run".to_string()))),
            "kor",
            "당첨",
            Preprocessor::new(PreprocessOptions::default()),
        )
        .unwrap();
        let v = Verifier::new(extractor, ledger.clone());

        let err = v.verify(&ImageBlob::new(Vec::new())).await.unwrap_err();

        assert!(matches!(err, VerifyError::UnreadableImage { ref reason } if reason == "empty upload"));
        assert_eq!(err.http_status(), 400);
        assert_eq!(ledger.calls(), 0);
    }
}
