use async_trait::async_trait;
use rusty_tesseract::{Args, Image};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::app::ports::TextExtractorPort;
use crate::config::OcrConfig;
use crate::error::{CertScanError, Result};

/// Runs the `tesseract` binary over an image file.
pub struct TesseractExtractor {
    config: OcrConfig,
}

impl TesseractExtractor {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    pub fn args(&self) -> Args {
        build_args(&self.config)
    }
}

fn build_args(config: &OcrConfig) -> Args {
    let mut config_variables = HashMap::new();
    if let Some(whitelist) = &config.char_whitelist {
        config_variables.insert("tessedit_char_whitelist".to_string(), whitelist.clone());
    }
    Args {
        lang: config.lang.clone(),
        config_variables,
        dpi: config.dpi,
        psm: config.psm,
        oem: config.oem,
    }
}

#[async_trait]
impl TextExtractorPort for TesseractExtractor {
    async fn extract_text(&self, image_path: &Path) -> Result<String> {
        let path = image_path.to_path_buf();
        let args = self.args();
        debug!("TesseractExtractor: start path={} lang={}", path.display(), args.lang);

        // tesseract is a blocking subprocess
        let text = tokio::task::spawn_blocking(move || -> Result<String> {
            let image = Image::from_path(&path).map_err(|e| {
                CertScanError::Ocr(format!("failed to load {}: {:?}", path.display(), e))
            })?;
            rusty_tesseract::image_to_string(&image, &args)
                .map_err(|e| CertScanError::Ocr(format!("{:?}", e)))
        })
        .await??;

        debug!("TesseractExtractor: recognized chars={}", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args_use_english_without_variables() {
        let extractor = TesseractExtractor::new(OcrConfig::default());
        let args = extractor.args();
        assert_eq!(args.lang, "eng");
        assert!(args.config_variables.is_empty());
        assert_eq!(args.psm, None);
        assert_eq!(args.oem, None);
    }

    #[test]
    fn test_whitelist_and_modes_are_forwarded() {
        let config = OcrConfig {
            lang: "eng+hin".to_string(),
            psm: Some(6),
            oem: Some(1),
            dpi: Some(300),
            char_whitelist: Some("ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 .-:".to_string()),
        };
        let args = TesseractExtractor::new(config).args();
        assert_eq!(args.lang, "eng+hin");
        assert_eq!(args.psm, Some(6));
        assert_eq!(args.oem, Some(1));
        assert_eq!(args.dpi, Some(300));
        assert_eq!(
            args.config_variables.get("tessedit_char_whitelist").map(String::as_str),
            Some("ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 .-:")
        );
    }
}
