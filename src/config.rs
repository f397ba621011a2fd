use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::constants;
use crate::error::{CertScanError, Result};

/// Top-level configuration, read from `cert_scan.toml` when present.
///
/// Every section is optional; anything left out falls back to the built-in
/// defaults, which reproduce the stock certificate layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ocr: OcrConfig,
    pub pdf: PdfConfig,
    pub report: ReportConfig,
    pub patterns: PatternConfig,
    pub validation: ShapeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract language pack, e.g. `eng`.
    pub lang: String,
    /// Page segmentation mode (`--psm`).
    pub psm: Option<i32>,
    /// OCR engine mode (`--oem`).
    pub oem: Option<i32>,
    pub dpi: Option<i32>,
    /// Restricts recognition to these characters (`tessedit_char_whitelist`).
    pub char_whitelist: Option<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            lang: constants::DEFAULT_OCR_LANG.to_string(),
            psm: None,
            oem: None,
            dpi: None,
            char_whitelist: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Resolution of the rasterized first page.
    pub dpi: u32,
    /// Path or name of poppler's `pdftoppm` binary.
    pub pdftoppm: String,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            dpi: constants::DEFAULT_PDF_DPI,
            pdftoppm: constants::DEFAULT_PDFTOPPM.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Whether results are POSTed to `api_url`.
    pub submit: bool,
    pub api_url: String,
    pub timeout_seconds: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            submit: true,
            api_url: constants::DEFAULT_API_URL.to_string(),
            timeout_seconds: constants::DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

/// Extraction patterns; capture group 1 holds the field value.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    pub name: String,
    pub roll_no: String,
    pub certificate_id: String,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            name: constants::NAME_PATTERN.to_string(),
            roll_no: constants::ROLL_NO_PATTERN.to_string(),
            certificate_id: constants::CERTIFICATE_ID_PATTERN.to_string(),
        }
    }
}

/// Shapes a trimmed field value must match in full.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    pub name: String,
    pub roll_no: String,
    pub certificate_id: String,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            name: constants::NAME_SHAPE.to_string(),
            roll_no: constants::ROLL_NO_SHAPE.to_string(),
            certificate_id: constants::CERTIFICATE_ID_SHAPE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from `cert_scan.toml` if no path is
    /// given. A missing default file yields the built-in defaults; a missing
    /// explicit file is an error. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(constants::DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    debug!("No {} found, using defaults", constants::DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CertScanError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        info!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply `CERT_SCAN_*` overrides using `lookup` to resolve variables.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(constants::ENV_API_URL) {
            self.report.api_url = url;
        }
        if let Some(lang) = lookup(constants::ENV_OCR_LANG) {
            self.ocr.lang = lang;
        }
        if let Some(raw) = lookup(constants::ENV_SUBMIT) {
            self.report.submit = parse_flag(constants::ENV_SUBMIT, &raw)?;
        }
        Ok(())
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(CertScanError::Config(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}
