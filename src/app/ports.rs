use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::error::Result;
use crate::types::CertificateFields;

// Extraction-side ports
#[async_trait]
pub trait TextExtractorPort: Send + Sync {
    /// Raw text recognized in the image at `image_path`.
    async fn extract_text(&self, image_path: &Path) -> Result<String>;
}

#[async_trait]
pub trait PageRasterizerPort: Send + Sync {
    /// Render the first page of a PDF to an image file.
    async fn first_page(&self, pdf_path: &Path) -> Result<RasterizedPage>;
}

/// An image produced from a PDF page. A scratch directory, if any, is
/// removed when the page is dropped.
#[derive(Debug)]
pub struct RasterizedPage {
    image_path: PathBuf,
    _scratch: Option<TempDir>,
}

impl RasterizedPage {
    pub fn in_scratch_dir(image_path: PathBuf, scratch: TempDir) -> Self {
        Self {
            image_path,
            _scratch: Some(scratch),
        }
    }

    /// Wrap an image the caller owns; nothing is cleaned up on drop.
    pub fn existing(image_path: PathBuf) -> Self {
        Self {
            image_path,
            _scratch: None,
        }
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }
}

// Report-side ports
#[async_trait]
pub trait ReportPort: Send + Sync {
    async fn submit(&self, payload: &ReportPayload) -> Result<ReportResponse>;
}

/// Body POSTed to the report endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportPayload {
    pub fields: CertificateFields,
    pub tampering_issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportResponse {
    pub status: u16,
    pub body: String,
}
