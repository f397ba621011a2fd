use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ShapeConfig;
use crate::error::Result;
use crate::types::{CertificateField, CertificateFields};

/// Outcome of screening a set of extracted fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TamperAssessment {
    pub verdict: Verdict,
    /// Issues in field order: Name, RollNo, CertificateID
    pub issues: Vec<TamperIssue>,
    pub assessed_at: DateTime<Utc>,
}

impl TamperAssessment {
    pub fn is_clean(&self) -> bool {
        self.verdict == Verdict::Clean
    }

    /// Issue messages as sent in the report payload.
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(|issue| issue.to_string()).collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Verdict {
    /// Every field was found and has the expected shape
    Clean,
    /// At least one field is missing or malformed
    Tampered,
}

/// A field that failed screening.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TamperIssue {
    pub field: CertificateField,
    pub kind: TamperIssueKind,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TamperIssueKind {
    /// Label not found, or an empty value
    Missing,
    /// Value present but outside the allowed shape
    InvalidFormat,
}

impl fmt::Display for TamperIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Both kinds share one message; OCR noise and edits look the same here.
        write!(f, "{} field tampered or unreadable", self.field)
    }
}

/// Screens extracted fields for signs of tampering.
pub trait TamperDetector {
    fn assess(&self, fields: &CertificateFields) -> TamperAssessment;
}

/// Checks each field against an anchored shape regex.
#[derive(Debug, Clone)]
pub struct ShapeTamperDetector {
    shapes: Vec<(CertificateField, Regex)>,
}

static DEFAULT_DETECTOR: Lazy<ShapeTamperDetector> = Lazy::new(|| {
    ShapeTamperDetector::from_config(&ShapeConfig::default()).expect("built-in field shapes compile")
});

impl ShapeTamperDetector {
    pub fn from_config(config: &ShapeConfig) -> Result<Self> {
        let shapes = CertificateField::ALL
            .iter()
            .map(|&field| {
                let shape = match field {
                    CertificateField::Name => &config.name,
                    CertificateField::RollNo => &config.roll_no,
                    CertificateField::CertificateId => &config.certificate_id,
                };
                // Anchor so the whole value has to match, not a substring
                Regex::new(&format!("^(?:{})$", shape)).map(|regex| (field, regex))
            })
            .collect::<std::result::Result<Vec<_>, regex::Error>>()?;
        Ok(Self { shapes })
    }

    pub fn detect(&self, fields: &CertificateFields) -> Vec<TamperIssue> {
        self.shapes
            .iter()
            .filter_map(|(field, shape)| {
                let kind = match fields.get(*field) {
                    None | Some("") => TamperIssueKind::Missing,
                    Some(value) if !shape.is_match(value) => TamperIssueKind::InvalidFormat,
                    Some(_) => return None,
                };
                Some(TamperIssue { field: *field, kind })
            })
            .collect()
    }
}

impl TamperDetector for ShapeTamperDetector {
    fn assess(&self, fields: &CertificateFields) -> TamperAssessment {
        let issues = self.detect(fields);
        let verdict = if issues.is_empty() {
            Verdict::Clean
        } else {
            Verdict::Tampered
        };
        TamperAssessment {
            verdict,
            issues,
            assessed_at: Utc::now(),
        }
    }
}

impl Default for ShapeTamperDetector {
    fn default() -> Self {
        DEFAULT_DETECTOR.clone()
    }
}

/// Screen fields against the built-in shapes.
pub fn detect_tampering(fields: &CertificateFields) -> Vec<TamperIssue> {
    DEFAULT_DETECTOR.detect(fields)
}
