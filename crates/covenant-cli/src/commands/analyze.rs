//! Analyze command implementation.

use crate::cli::AnalyzeArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use covenant_analyzer::{persist, Pipeline, PipelineConfig, PipelineOutput};
use covenant_domain::RunId;
use covenant_oracle::{ClassificationOracle, OllamaOracle};
use covenant_store::SqliteStore;
use std::fs;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Execute the analyze command.
///
/// Ctrl-C cancels the run; whatever was accepted before is still printed and
/// persisted.
pub async fn execute_analyze(args: AnalyzeArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let text = fs::read_to_string(&args.file)?;
    let run_id = match &args.run_id {
        Some(id) => RunId::from_string(id).map_err(CliError::InvalidInput)?,
        None => RunId::new(),
    };

    let pipeline_config = pipeline_config(&args, config);
    let endpoint = args
        .endpoint
        .clone()
        .unwrap_or_else(|| config.oracle.endpoint.clone());
    let model = args.model.clone().unwrap_or_else(|| config.oracle.model.clone());
    let oracle = OllamaOracle::new(endpoint, model)?.with_temperature(config.oracle.temperature);

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling analysis");
                cancel.cancel();
            }
        })
    };

    let db = args.db.clone().or_else(|| config.settings.database.clone());
    let result = run_analysis(&text, run_id, pipeline_config, oracle, &cancel).await;
    interrupt.abort();
    let output = result?;

    if output.report.cancelled {
        eprintln!("{}", formatter.warning("Analysis cancelled, showing partial results"));
    }
    println!(
        "{}",
        formatter.format_conflicts(
            run_id,
            &output.extraction.tree,
            &output.report.conflicts,
            Some(&output.report.metrics),
        )?
    );

    if let Some(path) = db {
        save_run(&output, &path)?;
        eprintln!(
            "{}",
            formatter.success(&format!("Run {} saved to {}", run_id, path.display()))
        );
    }

    Ok(())
}

/// Run the pipeline over `text` with any oracle
pub async fn run_analysis<O>(
    text: &str,
    run_id: RunId,
    config: PipelineConfig,
    oracle: O,
    cancel: &CancellationToken,
) -> Result<PipelineOutput>
where
    O: ClassificationOracle + 'static,
{
    let pipeline = Pipeline::new(config, oracle)?;
    Ok(pipeline.run(run_id, text, cancel).await?)
}

/// Persist a finished run into the SQLite database at `path`
pub fn save_run(output: &PipelineOutput, path: &Path) -> Result<()> {
    let mut store = SqliteStore::new(path)?;
    persist(&mut store, output)?;
    info!(
        "Saved run {} ({} clauses, {} conflicts) to {}",
        output.run_id,
        output.extraction.tree.len(),
        output.report.conflicts.len(),
        path.display()
    );
    Ok(())
}

/// File configuration with command-line overrides applied
fn pipeline_config(args: &AnalyzeArgs, config: &Config) -> PipelineConfig {
    let mut pipeline = config.pipeline();
    if let Some(strategy) = args.strategy {
        pipeline.analyzer.strategy = strategy.into();
    }
    if let Some(votes) = args.votes {
        pipeline.analyzer.votes = votes;
    }
    if let Some(concurrency) = args.concurrency {
        pipeline.analyzer.max_concurrency = concurrency;
    }
    if let Some(timeout) = args.timeout {
        pipeline.analyzer.timeout_secs = timeout;
    }
    pipeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StrategyArg;
    use covenant_analyzer::Strategy;
    use std::path::PathBuf;

    fn args() -> AnalyzeArgs {
        AnalyzeArgs {
            file: PathBuf::from("contract.txt"),
            endpoint: None,
            model: None,
            strategy: None,
            votes: None,
            concurrency: None,
            timeout: None,
            db: None,
            run_id: None,
        }
    }

    #[test]
    fn test_overrides_applied() {
        let args = AnalyzeArgs {
            strategy: Some(StrategyArg::Single),
            votes: Some(5),
            concurrency: Some(2),
            timeout: Some(15),
            ..args()
        };
        let pipeline = pipeline_config(&args, &Config::default());
        assert_eq!(pipeline.analyzer.strategy, Strategy::Single);
        assert_eq!(pipeline.analyzer.votes, 5);
        assert_eq!(pipeline.analyzer.max_concurrency, 2);
        assert_eq!(pipeline.analyzer.timeout_secs, 15);
    }

    #[test]
    fn test_no_overrides_keeps_file_values() {
        let config = Config::default();
        let pipeline = pipeline_config(&args(), &config);
        assert_eq!(pipeline.analyzer, config.analyzer);
    }
}
