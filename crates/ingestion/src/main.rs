//! PartLookup document ingestion run
//!
//! Scans the configured PDF directory, parses part lines out of every manual
//! and writes the processed documents file read by the gateway at startup.
//!
//! Usage: `ingest [pdf_dir] [output_path]` (defaults from configuration)

use partlookup_common::{config::AppConfig, telemetry, VERSION};
use partlookup_ingestion::processor::write_output;
use partlookup_ingestion::{DocumentLineParser, DocumentProcessor, LineLimits};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    telemetry::init_tracing(&config.observability);

    info!("Starting PartLookup ingestion v{}", VERSION);

    let mut args = std::env::args().skip(1);
    let pdf_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.ingestion.pdf_dir.clone());
    let output_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.ingestion.output_path.clone());

    let parser = DocumentLineParser::new(LineLimits::from(&config.ingestion))?;
    let processor = Arc::new(DocumentProcessor::new(parser, config.ingestion.text_sample_len));

    let output = processor.process_directory(&pdf_dir).await?;
    write_output(&output, &output_path).await?;

    info!(
        documents = output.total_pdfs,
        parts = output.total_parts,
        output = %output_path.display(),
        "Processing complete"
    );

    Ok(())
}
