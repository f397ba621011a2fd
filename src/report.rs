//! Console rendering of batch entries.

use crate::app::certificate_use_case::{BatchEntry, BatchStats, ProcessedCertificate, SubmissionOutcome};
use crate::error::Result;

/// Human-readable report for one entry, one line per fact.
pub fn render_entry(entry: &BatchEntry) -> Result<String> {
    match entry {
        BatchEntry::Processed(processed) => render_processed(processed),
        BatchEntry::Skipped { source, reason } => Ok(format!(
            "PDF conversion failed for {}: {}",
            source.display(),
            reason
        )),
    }
}

fn render_processed(processed: &ProcessedCertificate) -> Result<String> {
    let mut lines = vec![format!("Processing: {}", processed.source.display())];

    if let Some(error) = &processed.extraction_error {
        lines.push(format!("Error processing {}: {}", processed.source.display(), error));
    }

    lines.push(format!(
        "Extracted Data: {}",
        serde_json::to_string_pretty(&processed.fields)?
    ));

    if processed.assessment.is_clean() {
        lines.push("No tampering detected.".to_string());
    } else {
        lines.push(format!(
            "Tampering Issues Detected: {}",
            serde_json::to_string(&processed.assessment.messages())?
        ));
    }

    match &processed.submission {
        Some(SubmissionOutcome::Delivered(response)) => {
            lines.push(format!("API Response: {} {}", response.status, response.body));
        }
        Some(SubmissionOutcome::Failed { error }) => {
            lines.push(format!("Failed to push to API: {}", error));
        }
        None => {}
    }

    Ok(lines.join("\n"))
}

/// Single-line JSON document for `--json` output.
pub fn render_entry_json(entry: &BatchEntry) -> Result<String> {
    Ok(serde_json::to_string(entry)?)
}

pub fn render_summary(stats: &BatchStats) -> String {
    let mut out = String::from("\n📊 Certificate scan results:\n");
    out.push_str(&format!("   Total inputs: {}\n", stats.total));
    out.push_str(&format!("   Clean: {} ({:.1}%)\n", stats.clean, stats.clean_rate()));
    out.push_str(&format!("   Tampered or unreadable: {}\n", stats.tampered));
    out.push_str(&format!("   Skipped: {}\n", stats.skipped));
    if stats.extraction_failures > 0 {
        out.push_str(&format!("   OCR failures: {}\n", stats.extraction_failures));
    }
    out.push_str(&format!(
        "   Submitted: {} (failed: {})",
        stats.submitted, stats.submission_failures
    ));
    out
}
