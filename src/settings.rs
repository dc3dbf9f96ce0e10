//! Application configuration.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::BooksError;
use crate::reports::DEFAULT_TOLERANCE;

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Name printed at the top of exported documents.
    #[serde(default = "default_organization")]
    pub organization: String,
    /// Reporting period label, e.g. "Periode Januari 2025".
    #[serde(default = "default_period")]
    pub period: String,
    /// Largest gap between two totals still reported as balanced.
    #[serde(default = "default_tolerance")]
    pub balance_tolerance: Decimal,
    /// Whether input tables start with a header line.
    #[serde(default = "default_has_headers")]
    pub has_headers: bool,
    #[serde(default)]
    pub document: DocumentConfig,
}

/// Layout of the plain-text document export.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentConfig {
    #[serde(default = "default_page_width")]
    pub page_width: usize,
    #[serde(default = "default_lines_per_page")]
    pub lines_per_page: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        DocumentConfig {
            page_width: default_page_width(),
            lines_per_page: default_lines_per_page(),
        }
    }
}

fn default_organization() -> String {
    "BUMDes".to_string()
}

fn default_period() -> String {
    String::new()
}

fn default_tolerance() -> Decimal {
    DEFAULT_TOLERANCE
}

fn default_has_headers() -> bool {
    true
}

fn default_page_width() -> usize {
    96
}

fn default_lines_per_page() -> usize {
    60
}

impl AppConfig {
    /// Loads `bumdes.toml` (or the given file) and `BUMDES__*` variables.
    pub fn load(path: Option<&str>) -> Result<Self, BooksError> {
        let file = match path {
            Some(p) => config::File::with_name(p).required(true),
            None => config::File::with_name("bumdes").required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix("BUMDES").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Lines printed above every document page.
    pub fn heading(&self) -> Vec<String> {
        [self.organization.as_str(), self.period.as_str()]
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}
