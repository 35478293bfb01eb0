pub mod toml_config;

pub use toml_config::TomlConfig;

pub const DEFAULT_LEDGER_URL: &str = "https://script.google.com/macros/s/AKfycbxyz123/exec";
pub const DEFAULT_RECEIPT_FIELD: &str = "접수번호";
pub const DEFAULT_MARKER: &str = "당첨";
pub const DEFAULT_PORT: u16 = 10000;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
