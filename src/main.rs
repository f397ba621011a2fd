use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use cert_scan::app::certificate_use_case::{BatchEntry, CertificateUseCase};
use cert_scan::app::ports::ReportPayload;
use cert_scan::config::Config;
use cert_scan::logging;
use cert_scan::parser::FieldParser;
use cert_scan::quality_gate::{ShapeTamperDetector, TamperDetector};
use cert_scan::report;

#[derive(Parser)]
#[command(name = "cert_scan")]
#[command(about = "Extract and screen certificate fields from scanned images")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// OCR certificate images (or PDFs, first page only), screen the fields and report them
    Scan {
        /// Image or PDF files to process, in order
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Configuration file (defaults to ./cert_scan.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Endpoint to POST results to, overriding configuration
        #[arg(long)]
        api_url: Option<String>,
        /// Do not POST results
        #[arg(long)]
        no_submit: bool,
        /// Print one JSON document per input instead of the text report
        #[arg(long)]
        json: bool,
        /// Exit non-zero when any input is tampered, unreadable or skipped
        #[arg(long)]
        fail_on_tamper: bool,
    },
    /// Screen already-extracted text without running OCR or submitting
    Parse {
        /// Text file to read, or `-` for stdin
        input: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
}

fn print_entry(entry: &BatchEntry, json: bool) {
    let rendered = if json {
        report::render_entry_json(entry)
    } else {
        report::render_entry(entry).map(|text| format!("{}\n", text))
    };
    match rendered {
        Ok(text) => println!("{}", text),
        Err(e) => error!("Failed to render report: {}", e),
    }
}

fn read_input(input: &Path) -> anyhow::Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            paths,
            config,
            api_url,
            no_submit,
            json,
            fail_on_tamper,
        } => {
            let mut config = Config::load(config.as_deref()).context("Failed to load configuration")?;
            if let Some(url) = api_url {
                config.report.api_url = url;
            }
            if no_submit {
                config.report.submit = false;
            }
            info!(
                "Scanning {} input(s), submit={} endpoint={}",
                paths.len(),
                config.report.submit,
                config.report.api_url
            );

            let use_case = CertificateUseCase::from_config(&config)?;
            let (_, stats) = use_case
                .process_batch_with(&paths, |entry| print_entry(entry, json))
                .await;

            if !json {
                println!("{}", report::render_summary(&stats));
            }
            if fail_on_tamper && stats.has_findings() {
                std::process::exit(1);
            }
        }
        Commands::Parse {
            input,
            config,
            json,
        } => {
            let config = Config::load(config.as_deref()).context("Failed to load configuration")?;
            let parser = FieldParser::from_config(&config.patterns)?;
            let detector = ShapeTamperDetector::from_config(&config.validation)?;

            let text = read_input(&input)?;
            let fields = parser.parse(&text);
            let assessment = detector.assess(&fields);

            if json {
                let payload = ReportPayload {
                    fields,
                    tampering_issues: assessment.messages(),
                };
                println!("{}", serde_json::to_string(&payload)?);
            } else {
                println!("Extracted Data: {}", serde_json::to_string_pretty(&fields)?);
                if assessment.is_clean() {
                    println!("No tampering detected.");
                } else {
                    println!(
                        "Tampering Issues Detected: {}",
                        serde_json::to_string(&assessment.messages())?
                    );
                }
            }
        }
    }
    Ok(())
}
