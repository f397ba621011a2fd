use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::config::PatternConfig;
use crate::error::{CertScanError, Result};
use crate::types::{CertificateField, CertificateFields};

/// A labeled-field pattern; capture group 1 holds the value.
#[derive(Debug, Clone)]
pub struct FieldPattern {
    pub field: CertificateField,
    pub regex: Regex,
}

/// Pulls certificate fields out of raw OCR text.
#[derive(Debug, Clone)]
pub struct FieldParser {
    patterns: Vec<FieldPattern>,
}

static DEFAULT_PARSER: Lazy<FieldParser> = Lazy::new(|| {
    FieldParser::from_config(&PatternConfig::default()).expect("built-in field patterns compile")
});

impl FieldParser {
    pub fn from_config(config: &PatternConfig) -> Result<Self> {
        let patterns = CertificateField::ALL
            .iter()
            .map(|&field| {
                let source = match field {
                    CertificateField::Name => &config.name,
                    CertificateField::RollNo => &config.roll_no,
                    CertificateField::CertificateId => &config.certificate_id,
                };
                compile_pattern(field, source)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Take the first match of each pattern. A field whose label is not found
    /// stays `None`; a found value is trimmed but otherwise kept as-is, so a
    /// blank capture comes back as an empty string.
    pub fn parse(&self, text: &str) -> CertificateFields {
        let mut fields = CertificateFields::default();
        for pattern in &self.patterns {
            let value = pattern
                .regex
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string());
            debug!(field = %pattern.field, found = value.is_some(), "field pattern applied");
            fields.set(pattern.field, value);
        }
        fields
    }
}

impl Default for FieldParser {
    fn default() -> Self {
        DEFAULT_PARSER.clone()
    }
}

fn compile_pattern(field: CertificateField, source: &str) -> Result<FieldPattern> {
    let regex = Regex::new(source)?;
    // captures_len counts the implicit whole-match group
    if regex.captures_len() < 2 {
        return Err(CertScanError::Config(format!(
            "pattern for {} must contain a capture group: {}",
            field, source
        )));
    }
    Ok(FieldPattern { field, regex })
}

/// Parse fields with the built-in patterns.
pub fn parse_fields(text: &str) -> CertificateFields {
    DEFAULT_PARSER.parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "CERTIFICATE OF COMPLETION\n\
        This is to certify that\n\
        Name: Priya Sharma\n\
        Roll No.: 21CS1044\n\
        Certificate ID: CERT-2024-0091\n\
        has completed the workshop.";

    #[test]
    fn test_parses_all_fields_from_typical_certificate() {
        let fields = parse_fields(SAMPLE);
        assert_eq!(fields.name.as_deref(), Some("Priya Sharma"));
        assert_eq!(fields.roll_no.as_deref(), Some("21CS1044"));
        assert_eq!(fields.certificate_id.as_deref(), Some("CERT-2024-0091"));
    }

    #[test]
    fn test_labels_match_case_insensitively_with_dash_separator() {
        let text = "name - john smith\nroll no 123\ncertificate id abc12";
        let fields = parse_fields(text);
        assert_eq!(fields.name.as_deref(), Some("john smith"));
        assert_eq!(fields.roll_no.as_deref(), Some("123"));
        assert_eq!(fields.certificate_id.as_deref(), Some("abc12"));
    }

    #[test]
    fn test_value_on_following_line_is_captured() {
        let fields = parse_fields("Name:\nRahul Verma\n");
        assert_eq!(fields.name.as_deref(), Some("Rahul Verma"));
    }

    #[test]
    fn test_trailing_whitespace_is_trimmed() {
        let fields = parse_fields("Name: Priya Sharma   \nRoll No: AB-12\n");
        assert_eq!(fields.name.as_deref(), Some("Priya Sharma"));
        assert_eq!(fields.roll_no.as_deref(), Some("AB-12"));
    }

    #[test]
    fn test_missing_labels_yield_none() {
        let fields = parse_fields("Certificate of Excellence\nAwarded 2024");
        assert_eq!(fields, CertificateFields::default());
    }

    #[test]
    fn test_name_with_digits_does_not_match() {
        let fields = parse_fields("Name: 12345");
        assert_eq!(fields.name, None);
    }

    #[test]
    fn test_empty_text_yields_no_fields() {
        assert_eq!(parse_fields(""), CertificateFields::default());
    }

    #[test]
    fn test_custom_pattern_replaces_default() {
        let config = PatternConfig {
            roll_no: r"(?i)Enrollment\s*#\s*(\d+)".to_string(),
            ..PatternConfig::default()
        };
        let parser = FieldParser::from_config(&config).unwrap();
        let fields = parser.parse("Name: Ana Lopez\nEnrollment # 884512");
        assert_eq!(fields.name.as_deref(), Some("Ana Lopez"));
        assert_eq!(fields.roll_no.as_deref(), Some("884512"));
    }

    #[test]
    fn test_pattern_without_capture_group_is_rejected() {
        let config = PatternConfig {
            name: r"Name:\s*\w+".to_string(),
            ..PatternConfig::default()
        };
        let err = FieldParser::from_config(&config).unwrap_err();
        assert!(matches!(err, CertScanError::Config(_)));
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let config = PatternConfig {
            certificate_id: r"Certificate ID ([A-Z".to_string(),
            ..PatternConfig::default()
        };
        let err = FieldParser::from_config(&config).unwrap_err();
        assert!(matches!(err, CertScanError::Regex(_)));
    }
}
