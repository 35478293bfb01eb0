use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw uploaded image bytes, alive for a single request.
#[derive(Debug, Clone)]
pub struct ImageBlob(Bytes);

impl ImageBlob {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self(data.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Exactly five ASCII digits. Only constructible through [`ReceiptCode::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReceiptCode(String);

impl ReceiptCode {
    pub const LEN: usize = 5;

    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() == Self::LEN && raw.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Integer value used when comparing against ledger rows, so "00042" == 42.
    pub fn numeric_value(&self) -> i64 {
        self.0
            .bytes()
            .fold(0i64, |acc, b| acc * 10 + i64::from(b - b'0'))
    }
}

impl fmt::Display for ReceiptCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerRecord {
    #[serde(flatten)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

/// Rows fetched from the ledger for one verification; never cached.
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    pub records: Vec<LedgerRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub code: ReceiptCode,
    pub matched: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerificationResult {
    pub success: bool,
    pub message: String,
    #[serde(rename = "receiptCode", skip_serializing_if = "Option::is_none", default)]
    pub receipt_code: Option<String>,
}

impl VerificationResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            receipt_code: None,
        }
    }
}

impl From<&Verification> for VerificationResult {
    fn from(verification: &Verification) -> Self {
        if verification.matched {
            Self {
                success: true,
                message: "✅ 인증 성공!".to_string(),
                receipt_code: Some(verification.code.to_string()),
            }
        } else {
            Self {
                success: false,
                message: "❌ 인증 실패! 접수번호가 일치하지 않습니다.".to_string(),
                receipt_code: Some(verification.code.to_string()),
            }
        }
    }
}
