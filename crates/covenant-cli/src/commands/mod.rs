//! Command implementations.

pub mod analyze;
pub mod config;
pub mod runs;
pub mod scan;

pub use self::analyze::{execute_analyze, run_analysis, save_run};
pub use self::config::execute_config;
pub use self::runs::execute_runs;
pub use self::scan::{execute_candidates, execute_scan};
