//! Defaults shared by configuration, parsing and reporting.

// Extraction patterns. Group 1 captures the field value.
pub const NAME_PATTERN: &str = r"(?i)Name\s*[:\-]?\s*([A-Za-z ]{2,})";
pub const ROLL_NO_PATTERN: &str = r"(?i)Roll\s*No\.?\s*[:\-]?\s*([A-Za-z0-9\-]{3,})";
pub const CERTIFICATE_ID_PATTERN: &str = r"(?i)Certificate\s*ID\s*[:\-]?\s*([A-Za-z0-9\-]{5,})";

// Shapes a trimmed field value must fully match.
pub const NAME_SHAPE: &str = r"[A-Za-z ]{2,}";
pub const ROLL_NO_SHAPE: &str = r"[A-Za-z0-9\-]{3,15}";
pub const CERTIFICATE_ID_SHAPE: &str = r"[A-Za-z0-9\-]{5,20}";

pub const DEFAULT_API_URL: &str = "https://example.com/api/test-certificate";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

pub const DEFAULT_OCR_LANG: &str = "eng";
pub const DEFAULT_PDF_DPI: u32 = 200;
pub const DEFAULT_PDFTOPPM: &str = "pdftoppm";

pub const DEFAULT_CONFIG_FILE: &str = "cert_scan.toml";

// Environment overrides
pub const ENV_API_URL: &str = "CERT_SCAN_API_URL";
pub const ENV_OCR_LANG: &str = "CERT_SCAN_OCR_LANG";
pub const ENV_SUBMIT: &str = "CERT_SCAN_SUBMIT";
