use crate::domain::ports::{ConfigProvider, PreprocessOptions};
use crate::utils::error::{Result, VerifyError};
use crate::utils::validation::{validate_provider, Validate};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerSection,
    pub ledger: LedgerSection,
    #[serde(default)]
    pub ocr: OcrSection,
    #[serde(default)]
    pub extract: ExtractSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSection {
    pub url: String,
    #[serde(default = "default_receipt_field")]
    pub receipt_field: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrSection {
    #[serde(default = "default_tesseract_cmd")]
    pub command: String,
    #[serde(default = "default_lang")]
    pub lang: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractSection {
    #[serde(default = "default_marker")]
    pub marker: String,
    pub preprocess: Option<PreprocessSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub grayscale: bool,
    #[serde(default = "default_true")]
    pub sharpen: bool,
    #[serde(default = "default_contrast")]
    pub contrast: f32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    super::DEFAULT_PORT
}

fn default_max_upload_mb() -> usize {
    10
}

fn default_receipt_field() -> String {
    super::DEFAULT_RECEIPT_FIELD.to_string()
}

fn default_tesseract_cmd() -> String {
    "tesseract".to_string()
}

fn default_lang() -> String {
    "kor".to_string()
}

fn default_marker() -> String {
    super::DEFAULT_MARKER.to_string()
}

fn default_true() -> bool {
    true
}

fn default_contrast() -> f32 {
    PreprocessOptions::default().contrast
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl Default for OcrSection {
    fn default() -> Self {
        Self {
            command: default_tesseract_cmd(),
            lang: default_lang(),
        }
    }
}

impl Default for ExtractSection {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            preprocess: None,
        }
    }
}

impl TomlConfig {
    /// Loads the config from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses a TOML string after substituting `${VAR}` references.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| VerifyError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Unset variables are left as-is so the parse or validation error names them.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| VerifyError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for TomlConfig {
    fn host(&self) -> &str {
        &self.server.host
    }

    fn port(&self) -> u16 {
        self.server.port
    }

    fn ledger_url(&self) -> &str {
        &self.ledger.url
    }

    fn receipt_field(&self) -> &str {
        &self.ledger.receipt_field
    }

    fn marker(&self) -> &str {
        &self.extract.marker
    }

    fn tesseract_cmd(&self) -> &str {
        &self.ocr.command
    }

    fn ocr_lang(&self) -> &str {
        &self.ocr.lang
    }

    fn preprocess(&self) -> PreprocessOptions {
        match &self.extract.preprocess {
            Some(p) => PreprocessOptions {
                enabled: p.enabled,
                grayscale: p.grayscale,
                sharpen: p.sharpen,
                contrast: p.contrast,
            },
            None => PreprocessOptions::default(),
        }
    }

    fn max_upload_bytes(&self) -> usize {
        self.server.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
