use thiserror::Error;

/// Failure reported by an OCR engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OcrError {
    /// The engine could not be started at all (binary missing, language pack missing).
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),

    /// The engine ran but rejected this particular image.
    #[error("OCR engine failed: {0}")]
    Failed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    #[error("winner marker not found in recognized text")]
    MarkerNotFound,

    #[error("no standalone 5-digit receipt code in recognized text")]
    CodeNotFound,

    #[error(transparent)]
    EngineFailure(#[from] OcrError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),
}

impl From<reqwest::Error> for LookupFailure {
    fn from(err: reqwest::Error) -> Self {
        LookupFailure::LedgerUnavailable(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Multipart field 'image' is missing")]
    MissingImage,

    #[error("Unreadable image: {reason}")]
    UnreadableImage { reason: String },

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionFailure),

    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupFailure),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Extraction,
    Engine,
    Ledger,
    Configuration,
    System,
}

impl VerifyError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            VerifyError::MissingImage | VerifyError::UnreadableImage { .. } => ErrorCategory::Input,
            VerifyError::Extraction(ExtractionFailure::EngineFailure(OcrError::Unavailable(_))) => {
                ErrorCategory::Engine
            }
            VerifyError::Extraction(_) => ErrorCategory::Extraction,
            VerifyError::Lookup(_) => ErrorCategory::Ledger,
            VerifyError::ConfigError { .. } | VerifyError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            VerifyError::IoError(_) => ErrorCategory::System,
        }
    }

    /// HTTP status the request handler answers with for this error.
    pub fn http_status(&self) -> u16 {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Extraction => 400,
            ErrorCategory::Engine
            | ErrorCategory::Ledger
            | ErrorCategory::Configuration
            | ErrorCategory::System => 500,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            VerifyError::MissingImage => "이미지를 업로드해주세요!".to_string(),
            VerifyError::UnreadableImage { reason } => format!("이미지 처리 오류: {}", reason),
            VerifyError::Extraction(ExtractionFailure::MarkerNotFound) => {
                "❌ 인증 실패! '당첨' 문구를 찾을 수 없습니다.".to_string()
            }
            VerifyError::Extraction(ExtractionFailure::CodeNotFound) => {
                "❌ 인증 실패! '당첨' 문구는 있지만 5자리 접수번호를 찾을 수 없습니다.".to_string()
            }
            VerifyError::Extraction(ExtractionFailure::EngineFailure(OcrError::Unavailable(_))) => {
                "❌ 서버 오류: 문자 인식 엔진을 사용할 수 없습니다.".to_string()
            }
            VerifyError::Extraction(ExtractionFailure::EngineFailure(OcrError::Failed(_))) => {
                "❌ 인증 실패! 이미지에서 문자를 인식할 수 없습니다.".to_string()
            }
            VerifyError::Lookup(LookupFailure::LedgerUnavailable(_)) => {
                "❌ 서버 오류: 접수 명단을 불러올 수 없습니다. 잠시 후 다시 시도해주세요.".to_string()
            }
            VerifyError::ConfigError { .. }
            | VerifyError::InvalidConfigValueError { .. }
            | VerifyError::IoError(_) => "❌ 서버 내부 오류가 발생했습니다.".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Send the picture as multipart field 'image' in PNG/JPEG/GIF/BMP/WebP/TIFF format",
            ErrorCategory::Extraction => "Retake the picture so the winner notice and receipt number are clearly visible",
            ErrorCategory::Engine => "Install tesseract with the configured language pack or set TESSERACT_CMD",
            ErrorCategory::Ledger => "Check that LEDGER_URL is reachable and returns a JSON array of rows",
            ErrorCategory::Configuration => "Check command line flags, environment variables and the config file",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, VerifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_client_errors() {
        assert_eq!(VerifyError::MissingImage.http_status(), 400);
        let err = VerifyError::UnreadableImage {
            reason: "bad header".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn test_extraction_failures_are_distinct_client_errors() {
        let marker = VerifyError::from(ExtractionFailure::MarkerNotFound);
        let code = VerifyError::from(ExtractionFailure::CodeNotFound);
        assert_eq!(marker.http_status(), 400);
        assert_eq!(code.http_status(), 400);
        assert_ne!(marker.user_friendly_message(), code.user_friendly_message());
        assert!(marker.user_friendly_message().contains("당첨"));
    }

    #[test]
    fn test_engine_unavailable_is_server_error() {
        let unavailable = VerifyError::from(ExtractionFailure::from(OcrError::Unavailable(
            "not found".to_string(),
        )));
        let rejected = VerifyError::from(ExtractionFailure::from(OcrError::Failed(
            "bad image".to_string(),
        )));
        assert_eq!(unavailable.category(), ErrorCategory::Engine);
        assert_eq!(unavailable.http_status(), 500);
        assert_eq!(rejected.category(), ErrorCategory::Extraction);
        assert_eq!(rejected.http_status(), 400);
    }

    #[test]
    fn test_ledger_unavailable_is_server_error() {
        let err = VerifyError::from(LookupFailure::LedgerUnavailable("HTTP 503".to_string()));
        assert_eq!(err.category(), ErrorCategory::Ledger);
        assert_eq!(err.http_status(), 500);
        assert!(!err.user_friendly_message().contains("일치하지"));
    }
}
