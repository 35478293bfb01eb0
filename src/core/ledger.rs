use crate::domain::model::{LedgerRecord, LedgerSnapshot, ReceiptCode};
use crate::domain::ports::{ConfigProvider, LedgerSource};
use crate::utils::error::LookupFailure;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

type LookupResult<T> = std::result::Result<T, LookupFailure>;

/// Ledger hosted behind a single GET endpoint returning a JSON array of row objects.
pub struct HttpLedger {
    client: Client,
    url: String,
    receipt_field: String,
}

impl HttpLedger {
    pub fn new(url: impl Into<String>, receipt_field: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            receipt_field: receipt_field.into(),
        }
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self::new(config.ledger_url(), config.receipt_field())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch_snapshot(&self) -> LookupResult<LedgerSnapshot> {
        tracing::debug!("Fetching ledger from: {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        tracing::debug!("Ledger response status: {}", status);
        if !status.is_success() {
            return Err(LookupFailure::LedgerUnavailable(format!(
                "ledger returned HTTP {}",
                status
            )));
        }

        let body: Value = response.json().await?;
        let snapshot = LedgerSnapshot::from_json(body)?;
        tracing::debug!("Ledger snapshot has {} rows", snapshot.records.len());
        Ok(snapshot)
    }
}

#[async_trait]
impl LedgerSource for HttpLedger {
    async fn lookup(&self, code: &ReceiptCode) -> LookupResult<bool> {
        let snapshot = self.fetch_snapshot().await?;
        snapshot.contains_code(&self.receipt_field, code)
    }
}

impl LedgerSnapshot {
    pub fn from_json(body: Value) -> LookupResult<Self> {
        let Value::Array(items) = body else {
            return Err(LookupFailure::LedgerUnavailable(
                "ledger body is not a JSON array".to_string(),
            ));
        };

        let records = items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                Value::Object(data) => Ok(LedgerRecord { data }),
                other => Err(LookupFailure::LedgerUnavailable(format!(
                    "ledger row {} is not an object: {}",
                    idx, other
                ))),
            })
            .collect::<LookupResult<Vec<_>>>()?;

        Ok(Self { records })
    }

    /// Numeric comparison of every row's `field` against the code, so "00042" matches 42.
    ///
    /// Every row must carry the field as an integer; one bad row makes the whole
    /// ledger unavailable, whether or not another row matches.
    pub fn contains_code(&self, field: &str, code: &ReceiptCode) -> LookupResult<bool> {
        let wanted = code.numeric_value();
        let mut matched = false;

        for (idx, record) in self.records.iter().enumerate() {
            let value = record.data.get(field).ok_or_else(|| {
                LookupFailure::LedgerUnavailable(format!(
                    "ledger row {} has no '{}' field",
                    idx, field
                ))
            })?;

            let n = integer_value(value).map_err(|reason| {
                LookupFailure::LedgerUnavailable(format!(
                    "ledger row {} field '{}' is not an integer ({}): {}",
                    idx, field, reason, value
                ))
            })?;
            matched |= n == wanted;
        }

        Ok(matched)
    }
}

fn integer_value(value: &Value) -> std::result::Result<i64, &'static str> {
    match value {
        Value::Null => Err("null"),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
                    _ => Err("fractional number"),
                }
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Err("blank text")
            } else {
                trimmed.parse::<i64>().map_err(|_| "non-numeric text")
            }
        }
        Value::Bool(_) => Err("boolean"),
        Value::Array(_) | Value::Object(_) => Err("nested value"),
    }
}
