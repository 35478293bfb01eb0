use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, VerifyError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(VerifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(VerifyError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(VerifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(VerifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(VerifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Checks shared by every [`ConfigProvider`] implementation.
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_non_empty_string("host", config.host())?;
    validate_range("port", config.port(), 1, u16::MAX)?;
    validate_url("ledger_url", config.ledger_url())?;
    validate_non_empty_string("receipt_field", config.receipt_field())?;
    validate_non_empty_string("marker", config.marker())?;
    validate_non_empty_string("tesseract_cmd", config.tesseract_cmd())?;
    validate_non_empty_string("ocr_lang", config.ocr_lang())?;
    validate_range("contrast", config.preprocess().contrast, -100.0, 100.0)?;
    validate_range(
        "max_upload_bytes",
        config.max_upload_bytes(),
        1024 * 1024,
        100 * 1024 * 1024,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("ledger_url", "https://script.google.com/macros/s/x/exec").is_ok());
        assert!(validate_url("ledger_url", "http://localhost:8080/rows").is_ok());
        assert!(validate_url("ledger_url", "").is_err());
        assert!(validate_url("ledger_url", "invalid-url").is_err());
        assert!(validate_url("ledger_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("marker", "당첨").is_ok());
        assert!(validate_non_empty_string("marker", "   ").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("port", 10000u16, 1, u16::MAX).is_ok());
        assert!(validate_range("port", 0u16, 1, u16::MAX).is_err());
    }
}
