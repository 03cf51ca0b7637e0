//! Scan and candidates command implementations.

use crate::cli::ScanArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use covenant_extractor::{ClauseExtractor, Extraction};
use std::fs;
use tracing::info;

fn extract(args: &ScanArgs, config: &Config) -> Result<(ClauseExtractor, Extraction)> {
    let text = fs::read_to_string(&args.file)?;
    let extractor = ClauseExtractor::new(config.extractor.clone())?;
    let extraction = extractor.extract(&text)?;
    info!(
        "Extracted {} clauses from {}",
        extraction.tree.len(),
        args.file.display()
    );
    Ok((extractor, extraction))
}

/// Execute the scan command.
pub fn execute_scan(args: ScanArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let (_, extraction) = extract(&args, config)?;
    println!(
        "{}",
        formatter.format_clauses(&extraction.tree, &extraction.events)?
    );
    Ok(())
}

/// Execute the candidates command.
pub fn execute_candidates(args: ScanArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let (extractor, extraction) = extract(&args, config)?;
    let report = extractor.select_candidates(&extraction.tree);
    println!("{}", formatter.format_candidates(&extraction.tree, &report)?);
    Ok(())
}
