//! Runs command implementation.

use crate::cli::RunsArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use covenant_domain::RunId;
use covenant_store::SqliteStore;

/// Execute the runs command.
pub fn execute_runs(args: RunsArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let path = args
        .db
        .or_else(|| config.settings.database.clone())
        .ok_or_else(|| {
            CliError::InvalidInput("No database given. Use --db or settings.database".into())
        })?;
    let store = SqliteStore::new(&path)?;

    match args.run_id {
        Some(id) => {
            let run_id = RunId::from_string(&id).map_err(CliError::InvalidInput)?;
            let tree = store.load_tree(run_id)?;
            if tree.is_empty() {
                return Err(CliError::InvalidInput(format!("Run {} not found", run_id)));
            }
            let conflicts = store.load_conflicts(run_id)?;
            println!(
                "{}",
                formatter.format_conflicts(run_id, &tree, &conflicts, None)?
            );
        }
        None => {
            println!("{}", formatter.format_runs(&store.list_runs()?)?);
        }
    }

    Ok(())
}
