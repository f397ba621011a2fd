pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod parser;
pub mod quality_gate;
pub mod report;
pub mod types;

// Use cases and the ports they drive
pub mod app;
// Tesseract, pdftoppm and HTTP adapters
pub mod infra;

pub use parser::parse_fields;
pub use quality_gate::detect_tampering;
