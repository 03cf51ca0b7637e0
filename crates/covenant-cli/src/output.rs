//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use covenant_analyzer::AnalysisMetrics;
use covenant_domain::{Clause, ClauseTree, ConflictCandidate, RunId, Severity, VerifiedConflict};
use covenant_extractor::{CandidateReport, ExtractionEvent};
use colored::*;
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Widest excerpt shown in a table cell
const EXCERPT_CHARS: usize = 60;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Output format in use.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format an extracted clause tree.
    pub fn format_clauses(&self, tree: &ClauseTree, events: &[ExtractionEvent]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let clauses: Vec<Value> = tree.iter().map(clause_json).collect();
                let events: Vec<Value> = events
                    .iter()
                    .map(|e| json!({ "kind": e.kind(), "message": e.to_string() }))
                    .collect();
                Ok(serde_json::to_string_pretty(&json!({
                    "clauses": clauses,
                    "events": events,
                }))?)
            }
            OutputFormat::Table => {
                if tree.is_empty() {
                    return Ok(self.colorize("No clauses found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Number", "Heading", "Category", "Topics", "Flags", "Text"]);
                for clause in tree.iter() {
                    let indent = "  ".repeat(clause.depth);
                    builder.push_record([
                        format!("{}{}", indent, clause.number),
                        clause.heading.clone().unwrap_or_default(),
                        clause.category.map(|c| c.to_string()).unwrap_or_default(),
                        join(clause.topics.iter()),
                        flags(clause),
                        excerpt(clause.body()),
                    ]);
                }

                let mut out = self.table(builder);
                for event in events {
                    out.push('\n');
                    out.push_str(&self.warning(&event.to_string()));
                }
                Ok(out)
            }
        }
    }

    /// Format candidate pairs.
    pub fn format_candidates(&self, tree: &ClauseTree, report: &CandidateReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let candidates: Vec<Value> = report
                    .candidates
                    .iter()
                    .map(|c| candidate_json(tree, c))
                    .collect();
                let truncations: Vec<Value> = report
                    .truncations
                    .iter()
                    .map(|t| json!({ "topic": t.topic, "members": t.members, "kept": t.kept }))
                    .collect();
                Ok(serde_json::to_string_pretty(&json!({
                    "candidates": candidates,
                    "truncations": truncations,
                }))?)
            }
            OutputFormat::Table => {
                if report.candidates.is_empty() {
                    return Ok(self.colorize("No candidate pairs.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Clause A", "Clause B", "Shared topics", "Override"]);
                for candidate in &report.candidates {
                    builder.push_record([
                        label(tree, candidate.clause_a),
                        label(tree, candidate.clause_b),
                        join(candidate.shared_topics.iter()),
                        if candidate.via_override { "yes" } else { "" }.to_string(),
                    ]);
                }

                let mut out = self.table(builder);
                for t in &report.truncations {
                    out.push('\n');
                    out.push_str(&self.warning(&format!(
                        "Topic '{}' truncated: kept {} of {} clauses",
                        t.topic, t.kept, t.members
                    )));
                }
                Ok(out)
            }
        }
    }

    /// Format verified conflicts of one run.
    pub fn format_conflicts(
        &self,
        run_id: RunId,
        tree: &ClauseTree,
        conflicts: &[VerifiedConflict],
        metrics: Option<&AnalysisMetrics>,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let conflicts: Vec<Value> = conflicts
                    .iter()
                    .map(|c| conflict_json(tree, c))
                    .collect();
                let mut doc = json!({
                    "run_id": run_id.to_string(),
                    "conflicts": conflicts,
                });
                if let Some(m) = metrics {
                    doc["metrics"] = metrics_json(m);
                }
                Ok(serde_json::to_string_pretty(&doc)?)
            }
            OutputFormat::Table => {
                let mut out = self.info(&format!("Run {}", run_id));
                out.push('\n');

                if conflicts.is_empty() {
                    out.push_str(&self.colorize("No conflicts found.", "green"));
                } else {
                    let mut builder = Builder::default();
                    builder.push_record([
                        "Severity", "Clause A", "Clause B", "Confidence", "Votes", "Summary",
                    ]);
                    for c in conflicts {
                        builder.push_record([
                            self.severity(c.severity),
                            label(tree, c.clause_a),
                            label(tree, c.clause_b),
                            format!("{:.2}", c.confidence),
                            format!("{}/{}", c.vote_count, c.votes_cast),
                            excerpt(&c.summary),
                        ]);
                    }
                    out.push_str(&self.table(builder));

                    for c in conflicts {
                        out.push_str(&format!(
                            "\n\n{} {} / {}\n  A: \"{}\"\n  B: \"{}\"",
                            self.severity(c.severity),
                            label(tree, c.clause_a),
                            label(tree, c.clause_b),
                            c.quote_a.text,
                            c.quote_b.text
                        ));
                        if !c.explanation.is_empty() {
                            out.push_str(&format!("\n  {}", c.explanation));
                        }
                    }
                }

                if let Some(m) = metrics {
                    out.push_str("\n\n");
                    out.push_str(&m.summary());
                }
                Ok(out)
            }
        }
    }

    /// Format a list of stored runs.
    pub fn format_runs(&self, runs: &[RunId]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let runs: Vec<String> = runs.iter().map(|r| r.to_string()).collect();
                Ok(serde_json::to_string_pretty(&runs)?)
            }
            OutputFormat::Table => {
                if runs.is_empty() {
                    return Ok(self.colorize("No stored runs.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Run", "Created (ms)"]);
                for run in runs {
                    builder.push_record([run.to_string(), run.timestamp().to_string()]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn severity(&self, severity: Severity) -> String {
        let color = match severity {
            Severity::Critical => "magenta",
            Severity::High => "red",
            Severity::Medium => "yellow",
            Severity::Low => "cyan",
        };
        self.colorize(severity.as_str(), color)
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().bold().to_string(),
            _ => text.to_string(),
        }
    }
}

fn label(tree: &ClauseTree, id: covenant_domain::ClauseId) -> String {
    tree.get(id)
        .map(|c| c.display_label())
        .unwrap_or_else(|| id.to_string())
}

fn join<'a>(items: impl Iterator<Item = &'a String>) -> String {
    items.map(String::as_str).collect::<Vec<_>>().join(", ")
}

fn flags(clause: &Clause) -> String {
    [
        (clause.is_override, "override"),
        (clause.is_stub, "stub"),
        (clause.is_toc, "toc"),
        (clause.is_synthetic, "synthetic"),
    ]
    .iter()
    .filter(|(set, _)| *set)
    .map(|(_, name)| *name)
    .collect::<Vec<_>>()
    .join(",")
}

/// First line of `text`, shortened to fit a table cell
fn excerpt(text: &str) -> String {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    if line.chars().count() <= EXCERPT_CHARS {
        return line.to_string();
    }
    let cut: String = line.chars().take(EXCERPT_CHARS - 1).collect();
    format!("{}…", cut)
}

fn clause_json(c: &Clause) -> Value {
    json!({
        "id": c.id.to_string(),
        "number": c.number,
        "raw_label": c.raw_label,
        "parent": c.parent_id.map(|p| p.to_string()),
        "depth": c.depth,
        "heading": c.heading,
        "category": c.category.map(|cat| cat.as_str()),
        "topics": c.topics,
        "start_char": c.start_char,
        "end_char": c.end_char,
        "is_override": c.is_override,
        "is_stub": c.is_stub,
        "is_toc": c.is_toc,
        "is_synthetic": c.is_synthetic,
        "text": c.body(),
    })
}

fn candidate_json(tree: &ClauseTree, c: &ConflictCandidate) -> Value {
    json!({
        "clause_a": label(tree, c.clause_a),
        "clause_b": label(tree, c.clause_b),
        "shared_topics": c.shared_topics,
        "via_override": c.via_override,
    })
}

fn conflict_json(tree: &ClauseTree, c: &VerifiedConflict) -> Value {
    json!({
        "clause_a": label(tree, c.clause_a),
        "clause_b": label(tree, c.clause_b),
        "shared_topics": c.shared_topics,
        "classification": c.classification.as_str(),
        "confidence": c.confidence,
        "severity": c.severity.as_str(),
        "summary": c.summary,
        "explanation": c.explanation,
        "quote_a": { "text": c.quote_a.text, "start": c.quote_a.start, "end": c.quote_a.end, "match_ratio": c.quote_a.match_ratio },
        "quote_b": { "text": c.quote_b.text, "start": c.quote_b.start, "end": c.quote_b.end, "match_ratio": c.quote_b.match_ratio },
        "vote_count": c.vote_count,
        "votes_cast": c.votes_cast,
    })
}

fn metrics_json(m: &AnalysisMetrics) -> Value {
    json!({
        "candidates": m.candidates,
        "truncated_buckets": m.truncated_buckets,
        "screened": m.screened,
        "oracle_calls": m.oracle_calls,
        "failures": m.failures,
        "rejections": m.rejections,
        "no_conflict": m.no_conflict,
        "votes_cast": m.votes_cast,
        "votes_affirming": m.votes_affirming,
        "accepted": m.accepted,
        "cancelled_items": m.cancelled_items,
        "runtime_ms": m.runtime_ms,
    })
}
