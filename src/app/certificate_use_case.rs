use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::app::ports::{
    PageRasterizerPort, ReportPayload, ReportPort, ReportResponse, TextExtractorPort,
};
use crate::config::Config;
use crate::error::Result;
use crate::infra::http_reporter::HttpReporter;
use crate::infra::pdf_rasterizer::PdftoppmRasterizer;
use crate::infra::tesseract_extractor::TesseractExtractor;
use crate::parser::FieldParser;
use crate::quality_gate::{ShapeTamperDetector, TamperAssessment, TamperDetector};
use crate::types::{CertificateFields, SourceKind};

/// Runs one certificate through extract → parse → screen → report.
pub struct CertificateUseCase {
    extractor: Box<dyn TextExtractorPort>,
    rasterizer: Box<dyn PageRasterizerPort>,
    parser: FieldParser,
    detector: Box<dyn TamperDetector + Send + Sync>,
    reporter: Option<Box<dyn ReportPort>>,
}

/// Result of processing a single input file.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedCertificate {
    pub source: PathBuf,
    pub fields: CertificateFields,
    pub assessment: TamperAssessment,
    /// Set when OCR failed and the fields were parsed from empty text
    pub extraction_error: Option<String>,
    /// `None` when submission is disabled
    pub submission: Option<SubmissionOutcome>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Delivered(ReportResponse),
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchEntry {
    Processed(ProcessedCertificate),
    /// The input could not be turned into an image; nothing was reported
    Skipped { source: PathBuf, reason: String },
}

impl CertificateUseCase {
    pub fn new(
        extractor: Box<dyn TextExtractorPort>,
        rasterizer: Box<dyn PageRasterizerPort>,
        parser: FieldParser,
        detector: Box<dyn TamperDetector + Send + Sync>,
        reporter: Option<Box<dyn ReportPort>>,
    ) -> Self {
        Self {
            extractor,
            rasterizer,
            parser,
            detector,
            reporter,
        }
    }

    /// Wire the Tesseract, pdftoppm and HTTP adapters from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let reporter: Option<Box<dyn ReportPort>> = if config.report.submit {
            Some(Box::new(HttpReporter::new(
                &config.report.api_url,
                Duration::from_secs(config.report.timeout_seconds),
            )?))
        } else {
            None
        };

        Ok(Self::new(
            Box::new(TesseractExtractor::new(config.ocr.clone())),
            Box::new(PdftoppmRasterizer::new(&config.pdf)),
            FieldParser::from_config(&config.patterns)?,
            Box::new(ShapeTamperDetector::from_config(&config.validation)?),
            reporter,
        ))
    }

    /// Process one certificate. An OCR failure is recorded and processing
    /// continues on empty text; a PDF that cannot be rasterized is an error.
    pub async fn process_certificate(&self, source: &Path) -> Result<ProcessedCertificate> {
        info!("Processing certificate {}", source.display());

        let page = match SourceKind::from_path(source) {
            SourceKind::Pdf => Some(self.rasterizer.first_page(source).await?),
            SourceKind::Image => None,
        };
        let image_path = page.as_ref().map(|p| p.image_path()).unwrap_or(source);

        let (text, extraction_error) = match self.extractor.extract_text(image_path).await {
            Ok(text) => (text, None),
            Err(e) => {
                error!("Text extraction failed for {}: {}", source.display(), e);
                (String::new(), Some(e.to_string()))
            }
        };
        // Scratch image no longer needed
        drop(page);

        let fields = self.parser.parse(&text);
        let assessment = self.detector.assess(&fields);
        if !assessment.is_clean() {
            warn!(
                issues = ?assessment.messages(),
                "Tampering issues detected in {}",
                source.display()
            );
        }

        let submission = match &self.reporter {
            Some(reporter) => Some(submit(reporter.as_ref(), &fields, &assessment).await),
            None => None,
        };

        Ok(ProcessedCertificate {
            source: source.to_path_buf(),
            fields,
            assessment,
            extraction_error,
            submission,
        })
    }

    /// Process inputs in order. `on_entry` sees each entry as soon as it is
    /// ready, so callers can print progressively.
    pub async fn process_batch_with<F>(
        &self,
        sources: &[PathBuf],
        mut on_entry: F,
    ) -> (Vec<BatchEntry>, BatchStats)
    where
        F: FnMut(&BatchEntry),
    {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("certificate_batch", run_id = %run_id);

        async move {
            let mut entries = Vec::with_capacity(sources.len());
            let mut stats = BatchStats::default();

            for source in sources {
                let entry = match self.process_certificate(source).await {
                    Ok(processed) => BatchEntry::Processed(processed),
                    Err(e) => {
                        error!("Skipping {}: {}", source.display(), e);
                        BatchEntry::Skipped {
                            source: source.clone(),
                            reason: e.to_string(),
                        }
                    }
                };
                stats.record(&entry);
                on_entry(&entry);
                entries.push(entry);
            }

            info!(
                "Batch finished: total={} clean={} tampered={} skipped={}",
                stats.total, stats.clean, stats.tampered, stats.skipped
            );
            (entries, stats)
        }
        .instrument(span)
        .await
    }

    pub async fn process_batch(&self, sources: &[PathBuf]) -> (Vec<BatchEntry>, BatchStats) {
        self.process_batch_with(sources, |_| {}).await
    }
}

async fn submit(
    reporter: &dyn ReportPort,
    fields: &CertificateFields,
    assessment: &TamperAssessment,
) -> SubmissionOutcome {
    let payload = ReportPayload {
        fields: fields.clone(),
        tampering_issues: assessment.messages(),
    };
    match reporter.submit(&payload).await {
        Ok(response) => SubmissionOutcome::Delivered(response),
        Err(e) => {
            warn!("Failed to push to API: {}", e);
            SubmissionOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}

/// Counters over a batch of processed certificates
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct BatchStats {
    pub total: usize,
    pub clean: usize,
    pub tampered: usize,
    pub skipped: usize,
    pub extraction_failures: usize,
    pub submitted: usize,
    pub submission_failures: usize,
}

impl BatchStats {
    pub fn record(&mut self, entry: &BatchEntry) {
        self.total += 1;
        match entry {
            BatchEntry::Skipped { .. } => self.skipped += 1,
            BatchEntry::Processed(processed) => {
                if processed.assessment.is_clean() {
                    self.clean += 1;
                } else {
                    self.tampered += 1;
                }
                if processed.extraction_error.is_some() {
                    self.extraction_failures += 1;
                }
                match processed.submission {
                    Some(SubmissionOutcome::Delivered(_)) => self.submitted += 1,
                    Some(SubmissionOutcome::Failed { .. }) => self.submission_failures += 1,
                    None => {}
                }
            }
        }
    }

    /// True when any certificate was flagged or could not be read at all.
    pub fn has_findings(&self) -> bool {
        self.tampered > 0 || self.skipped > 0
    }

    /// Share of inputs that came out clean, as a percentage
    pub fn clean_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.clean as f64 / self.total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::RasterizedPage;
    use crate::error::CertScanError;
    use crate::quality_gate::Verdict;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    const CLEAN_TEXT: &str = "Name: Priya Sharma\nRoll No: 21CS1044\nCertificate ID: CERT-2024-0091";

    /// Returns canned text per image path; unknown paths fail like a broken image.
    struct MockExtractor {
        texts: HashMap<PathBuf, String>,
        seen: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl MockExtractor {
        fn new(texts: &[(&str, &str)]) -> Self {
            Self {
                texts: texts
                    .iter()
                    .map(|(p, t)| (PathBuf::from(p), t.to_string()))
                    .collect(),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl TextExtractorPort for MockExtractor {
        async fn extract_text(&self, image_path: &Path) -> Result<String> {
            self.seen.lock().await.push(image_path.to_path_buf());
            self.texts
                .get(image_path)
                .cloned()
                .ok_or_else(|| CertScanError::Ocr(format!("cannot read {}", image_path.display())))
        }
    }

    struct MockRasterizer {
        fail: bool,
    }

    #[async_trait]
    impl PageRasterizerPort for MockRasterizer {
        async fn first_page(&self, pdf_path: &Path) -> Result<RasterizedPage> {
            if self.fail {
                return Err(CertScanError::Pdf("pdftoppm missing".to_string()));
            }
            Ok(RasterizedPage::existing(pdf_path.with_extension("jpg")))
        }
    }

    struct MockReporter {
        payloads: Arc<Mutex<Vec<ReportPayload>>>,
        fail: bool,
    }

    impl MockReporter {
        fn new(fail: bool) -> Self {
            Self {
                payloads: Arc::new(Mutex::new(Vec::new())),
                fail,
            }
        }
    }

    #[async_trait]
    impl ReportPort for MockReporter {
        async fn submit(&self, payload: &ReportPayload) -> Result<ReportResponse> {
            self.payloads.lock().await.push(payload.clone());
            if self.fail {
                return Err(CertScanError::Config("connection refused".to_string()));
            }
            Ok(ReportResponse {
                status: 200,
                body: "ok".to_string(),
            })
        }
    }

    fn use_case(
        extractor: MockExtractor,
        rasterizer_fails: bool,
        reporter: Option<MockReporter>,
    ) -> CertificateUseCase {
        CertificateUseCase::new(
            Box::new(extractor),
            Box::new(MockRasterizer {
                fail: rasterizer_fails,
            }),
            FieldParser::default(),
            Box::new(ShapeTamperDetector::default()),
            reporter.map(|r| Box::new(r) as Box<dyn ReportPort>),
        )
    }

    #[tokio::test]
    async fn test_clean_certificate_is_reported() {
        let reporter = MockReporter::new(false);
        let payloads = reporter.payloads.clone();
        let uc = use_case(MockExtractor::new(&[("a.png", CLEAN_TEXT)]), false, Some(reporter));

        let processed = uc.process_certificate(Path::new("a.png")).await.unwrap();

        assert_eq!(processed.assessment.verdict, Verdict::Clean);
        assert_eq!(processed.fields.name.as_deref(), Some("Priya Sharma"));
        assert!(processed.extraction_error.is_none());
        assert!(matches!(
            processed.submission,
            Some(SubmissionOutcome::Delivered(ReportResponse { status: 200, .. }))
        ));

        let sent = payloads.lock().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].tampering_issues.is_empty());
        assert_eq!(sent[0].fields, processed.fields);
    }

    #[tokio::test]
    async fn test_ocr_failure_still_reports_all_fields_unreadable() {
        let reporter = MockReporter::new(false);
        let payloads = reporter.payloads.clone();
        let uc = use_case(MockExtractor::new(&[]), false, Some(reporter));

        let processed = uc.process_certificate(Path::new("broken.png")).await.unwrap();

        assert!(processed.extraction_error.is_some());
        assert_eq!(processed.fields, CertificateFields::default());
        assert_eq!(processed.assessment.issues.len(), 3);

        let sent = payloads.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].tampering_issues.len(), 3);
    }

    #[tokio::test]
    async fn test_pdf_is_rasterized_before_extraction() {
        let extractor = MockExtractor::new(&[("docs/cert.jpg", CLEAN_TEXT)]);
        let seen = extractor.seen.clone();
        let uc = use_case(extractor, false, None);

        let processed = uc.process_certificate(Path::new("docs/cert.PDF")).await.unwrap();

        assert!(processed.assessment.is_clean());
        assert!(processed.submission.is_none());
        assert_eq!(*seen.lock().await, vec![PathBuf::from("docs/cert.jpg")]);
    }

    #[tokio::test]
    async fn test_failed_rasterization_skips_without_reporting() {
        let reporter = MockReporter::new(false);
        let payloads = reporter.payloads.clone();
        let uc = use_case(MockExtractor::new(&[]), true, Some(reporter));

        let (entries, stats) = uc.process_batch(&[PathBuf::from("scan.pdf")]).await;

        assert!(matches!(entries[0], BatchEntry::Skipped { .. }));
        assert_eq!(stats.skipped, 1);
        assert!(payloads.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_submission_failure_does_not_abort_batch() {
        let reporter = MockReporter::new(true);
        let uc = use_case(
            MockExtractor::new(&[("a.png", CLEAN_TEXT), ("b.png", "Name: X")]),
            false,
            Some(reporter),
        );

        let mut order = Vec::new();
        let (entries, stats) = uc
            .process_batch_with(&[PathBuf::from("a.png"), PathBuf::from("b.png")], |entry| {
                if let BatchEntry::Processed(p) = entry {
                    order.push(p.source.clone());
                }
            })
            .await;

        assert_eq!(entries.len(), 2);
        assert_eq!(order, vec![PathBuf::from("a.png"), PathBuf::from("b.png")]);
        assert_eq!(
            stats,
            BatchStats {
                total: 2,
                clean: 1,
                tampered: 1,
                skipped: 0,
                extraction_failures: 0,
                submitted: 0,
                submission_failures: 2,
            }
        );
        assert!(stats.has_findings());
        assert!((stats.clean_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_stats_have_no_findings() {
        let stats = BatchStats::default();
        assert!(!stats.has_findings());
        assert_eq!(stats.clean_rate(), 0.0);
    }
}
