//! HTTP surface: `GET /` health check and `POST /verify`.

pub mod handler;
pub mod router;

use crate::adapters::TesseractCli;
use crate::core::extractor::Extractor;
use crate::core::ledger::HttpLedger;
use crate::core::verifier::Verifier;
use crate::domain::ports::{ConfigProvider, LedgerSource, OcrEngine};
use crate::utils::error::{ExtractionFailure, Result};
use std::sync::Arc;
use tokio::net::TcpListener;

pub use router::build_router;

/// Receipt verification server.
pub struct VerifyServer<O: OcrEngine, L: LedgerSource> {
    verifier: Arc<Verifier<O, L>>,
    bind_addr: String,
    max_upload_bytes: usize,
}

impl VerifyServer<TesseractCli, HttpLedger> {
    /// Wires the Tesseract engine and HTTP ledger from config, probing the engine unless told not to.
    pub async fn from_config<C: ConfigProvider + ?Sized>(config: &C, check_engine: bool) -> Result<Self> {
        let ocr = TesseractCli::new(config.tesseract_cmd());

        if check_engine {
            let langs = ocr
                .probe(config.ocr_lang())
                .await
                .map_err(ExtractionFailure::from)?;
            tracing::info!(
                "🔍 OCR engine '{}' ready ({} languages installed)",
                ocr.command(),
                langs.len()
            );
        } else {
            tracing::warn!("⚠️ Skipping OCR engine check");
        }

        let extractor = Extractor::from_config(ocr, config)?;
        let ledger = HttpLedger::from_config(config);
        tracing::info!("📒 Ledger source: {}", ledger.url());

        Ok(Self::new(
            Verifier::new(extractor, ledger),
            format!("{}:{}", config.host(), config.port()),
            config.max_upload_bytes(),
        ))
    }
}

impl<O, L> VerifyServer<O, L>
where
    O: OcrEngine + 'static,
    L: LedgerSource + 'static,
{
    pub fn new(verifier: Verifier<O, L>, bind_addr: impl Into<String>, max_upload_bytes: usize) -> Self {
        Self {
            verifier: Arc::new(verifier),
            bind_addr: bind_addr.into(),
            max_upload_bytes,
        }
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.verifier.clone(), self.max_upload_bytes)
    }

    /// Start serving requests until Ctrl-C.
    pub async fn serve(self) -> Result<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.bind_addr).await?;
        tracing::info!("🚀 Receipt verifier listening on {}", self.bind_addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for shutdown signal: {}", e);
                }
                tracing::info!("Shutting down");
            })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::preprocess::tests::sample_png;
    use crate::core::verifier::tests::{verifier, CountingLedger, StaticOcr};
    use crate::domain::model::VerificationResult;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    const BOUNDARY: &str = "receipt-verifier-test-boundary";

    fn multipart_request(field: &str, data: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"receipt.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/verify")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn call(
        server: &VerifyServer<StaticOcr, CountingLedger>,
        request: Request<Body>,
    ) -> (StatusCode, VerificationResult) {
        let response = server.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn server(text: &str, ledger: CountingLedger) -> VerifyServer<StaticOcr, CountingLedger> {
        VerifyServer::new(verifier(text, ledger), "127.0.0.1:0", 10 * 1024 * 1024)
    }

    #[tokio::test]
    async fn health_endpoint() {
        let server = server("", CountingLedger::with_codes(&[]));
        let response = server
            .router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(bytes, handler::HEALTH_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn verify_success() {
        let ledger = CountingLedger::with_codes(&[54321]);
        let server = server("당첨! 접수번호 54321", ledger.clone());

        let (status, body) = call(&server, multipart_request("image", &sample_png(8, 8))).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert_eq!(body.receipt_code.as_deref(), Some("54321"));
        assert_eq!(ledger.calls(), 1);
    }

    #[tokio::test]
    async fn verify_no_match_is_bad_request() {
        let ledger = CountingLedger::with_codes(&[11111]);
        let server = server("당첨 22222", ledger.clone());

        let (status, body) = call(&server, multipart_request("image", &sample_png(8, 8))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert!(body.message.contains("일치하지"));
        assert_eq!(body.receipt_code.as_deref(), Some("22222"));
    }

    #[tokio::test]
    async fn verify_without_marker_never_fetches_ledger() {
        let ledger = CountingLedger::with_codes(&[12345]);
        let server = server("영수증 12345", ledger.clone());

        let (status, body) = call(&server, multipart_request("image", &sample_png(8, 8))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert!(body.message.contains("당첨"));
        assert!(body.receipt_code.is_none());
        assert_eq!(ledger.calls(), 0);
    }

    #[tokio::test]
    async fn verify_missing_image_field() {
        let ledger = CountingLedger::with_codes(&[12345]);
        let server = server("당첨 12345", ledger.clone());

        let (status, body) = call(&server, multipart_request("photo", &sample_png(8, 8))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.message.contains("업로드"));
        assert_eq!(ledger.calls(), 0);
    }

    #[tokio::test]
    async fn verify_non_multipart_body() {
        let server = server("당첨 12345", CountingLedger::with_codes(&[12345]));
        let request = Request::builder()
            .method("POST")
            .uri("/verify")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let (status, body) = call(&server, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
    }

    #[tokio::test]
    async fn verify_unreadable_image() {
        let server = server("당첨 12345", CountingLedger::with_codes(&[12345]));

        let (status, body) = call(&server, multipart_request("image", b"GIF? no")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.message.contains("이미지 처리 오류"));
    }

    #[tokio::test]
    async fn verify_empty_image_field() {
        let ledger = CountingLedger::with_codes(&[12345]);
        let server = server("당첨 12345", ledger.clone());

        let (status, body) = call(&server, multipart_request("image", b"")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert!(body.message.contains("이미지 처리 오류"));
        assert_eq!(ledger.calls(), 0);
    }

    #[tokio::test]
    async fn verify_ledger_unavailable_is_server_error() {
        let server = server("당첨 12345", CountingLedger::unavailable());

        let (status, body) = call(&server, multipart_request("image", &sample_png(8, 8))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.success);
        assert!(!body.message.contains("일치하지"));
    }

    #[tokio::test]
    async fn verify_engine_unavailable_is_server_error() {
        use crate::adapters::Preprocessor;
        use crate::domain::ports::PreprocessOptions;
        use crate::utils::error::OcrError;

        let extractor = Extractor::new(
            StaticOcr(Err(OcrError::Unavailable("no tesseract".to_string()))),
            "kor",
            "당첨",
            Preprocessor::new(PreprocessOptions::default()),
        )
        .unwrap();
        let server = VerifyServer::new(
            Verifier::new(extractor, CountingLedger::with_codes(&[])),
            "127.0.0.1:0",
            1024 * 1024,
        );

        let (status, _) = call(&server, multipart_request("image", &sample_png(8, 8))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn cors_preflight_is_allowed() {
        let server = server("", CountingLedger::with_codes(&[]));
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/verify")
                    .header("origin", "https://event.example.com")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }
}
