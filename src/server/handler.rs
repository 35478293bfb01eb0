use crate::core::verifier::Verifier;
use crate::domain::model::{ImageBlob, Verification, VerificationResult};
use crate::domain::ports::{LedgerSource, OcrEngine};
use crate::utils::error::{Result, VerifyError};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Json;
use std::sync::Arc;

pub const IMAGE_FIELD: &str = "image";

pub const HEALTH_MESSAGE: &str = "✅ Receipt verification server is running. POST an image to /verify.";

/// `GET /`
pub async fn health_handler() -> &'static str {
    HEALTH_MESSAGE
}

/// `POST /verify` with multipart field `image`.
pub async fn verify_handler<O, L>(
    State(verifier): State<Arc<Verifier<O, L>>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> (StatusCode, Json<VerificationResult>)
where
    O: OcrEngine + 'static,
    L: LedgerSource + 'static,
{
    let outcome = match read_image(multipart).await {
        Ok(image) => verifier.verify(&image).await,
        Err(e) => Err(e),
    };
    render(outcome)
}

async fn read_image(multipart: std::result::Result<Multipart, MultipartRejection>) -> Result<ImageBlob> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Request is not multipart: {}", e.body_text());
        VerifyError::MissingImage
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| VerifyError::UnreadableImage {
            reason: e.body_text(),
        })?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let data = field.bytes().await.map_err(|e| VerifyError::UnreadableImage {
            reason: e.body_text(),
        })?;
        return Ok(ImageBlob::new(data));
    }

    Err(VerifyError::MissingImage)
}

fn render(outcome: Result<Verification>) -> (StatusCode, Json<VerificationResult>) {
    match outcome {
        Ok(verification) => {
            let status = if verification.matched {
                StatusCode::OK
            } else {
                StatusCode::BAD_REQUEST
            };
            (status, Json(VerificationResult::from(&verification)))
        }
        Err(e) => {
            let status =
                StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if status.is_server_error() {
                tracing::error!(
                    "❌ Verification failed: {} (Category: {:?})",
                    e,
                    e.category()
                );
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            } else {
                tracing::warn!("Verification rejected: {} (Category: {:?})", e, e.category());
            }
            (status, Json(VerificationResult::failure(e.user_friendly_message())))
        }
    }
}
