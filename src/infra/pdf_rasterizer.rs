use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use tracing::{debug, info};

use crate::app::ports::{PageRasterizerPort, RasterizedPage};
use crate::config::PdfConfig;
use crate::error::{CertScanError, Result};

/// Renders the first page of a PDF to JPEG with poppler's `pdftoppm`.
pub struct PdftoppmRasterizer {
    program: String,
    dpi: u32,
}

impl PdftoppmRasterizer {
    pub fn new(config: &PdfConfig) -> Self {
        Self {
            program: config.pdftoppm.clone(),
            dpi: config.dpi,
        }
    }

    /// Arguments for a single-page JPEG render. `pdftoppm -singlefile`
    /// appends `.jpg` to `output_prefix`.
    pub fn command_args(&self, input: &Path, output_prefix: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-f", "1", "-l", "1", "-singlefile", "-jpeg", "-r"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push(self.dpi.to_string().into());
        args.push(input.as_os_str().to_owned());
        args.push(output_prefix.as_os_str().to_owned());
        args
    }
}

#[async_trait]
impl PageRasterizerPort for PdftoppmRasterizer {
    async fn first_page(&self, pdf_path: &Path) -> Result<RasterizedPage> {
        let scratch = tempfile::Builder::new().prefix("cert_scan").tempdir()?;
        let prefix = scratch.path().join("page1");
        let args = self.command_args(pdf_path, &prefix);
        debug!("PdftoppmRasterizer: {} {:?}", self.program, args);

        let output = tokio::process::Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| CertScanError::Pdf(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CertScanError::Pdf(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let image_path = prefix.with_extension("jpg");
        if !image_path.exists() {
            return Err(CertScanError::Pdf(format!(
                "{} produced no image for {}",
                self.program,
                pdf_path.display()
            )));
        }

        info!("Rasterized first page of {}", pdf_path.display());
        Ok(RasterizedPage::in_scratch_dir(image_path, scratch))
    }
}
