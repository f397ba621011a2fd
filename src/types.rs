use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// The labeled fields read off a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CertificateField {
    Name,
    RollNo,
    #[serde(rename = "CertificateID")]
    CertificateId,
}

impl CertificateField {
    /// Fields in the order they are parsed, validated and reported.
    pub const ALL: [CertificateField; 3] = [
        CertificateField::Name,
        CertificateField::RollNo,
        CertificateField::CertificateId,
    ];

    /// Key used in JSON output and issue messages.
    pub fn label(&self) -> &'static str {
        match self {
            CertificateField::Name => "Name",
            CertificateField::RollNo => "RollNo",
            CertificateField::CertificateId => "CertificateID",
        }
    }
}

impl fmt::Display for CertificateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Field values pulled from OCR text. `None` means the label was not found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateFields {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "RollNo")]
    pub roll_no: Option<String>,
    #[serde(rename = "CertificateID")]
    pub certificate_id: Option<String>,
}

impl CertificateFields {
    pub fn get(&self, field: CertificateField) -> Option<&str> {
        match field {
            CertificateField::Name => self.name.as_deref(),
            CertificateField::RollNo => self.roll_no.as_deref(),
            CertificateField::CertificateId => self.certificate_id.as_deref(),
        }
    }

    pub fn set(&mut self, field: CertificateField, value: Option<String>) {
        match field {
            CertificateField::Name => self.name = value,
            CertificateField::RollNo => self.roll_no = value,
            CertificateField::CertificateId => self.certificate_id = value,
        }
    }
}

/// How an input file must be turned into an image before OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Image,
    /// Only the first page is rasterized.
    Pdf,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => SourceKind::Pdf,
            _ => SourceKind::Image,
        }
    }
}
