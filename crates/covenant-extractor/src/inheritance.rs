//! Heading and category inheritance

use crate::config::{CategoryKeywords, CategoryTable};
use crate::error::ExtractorError;
use covenant_domain::{Category, Clause};
use regex::Regex;

/// Three-tier category keyword matcher
pub struct CategoryMatcher {
    tiers: Vec<Vec<(Category, Regex)>>,
    scan_chars: usize,
}

impl CategoryMatcher {
    /// Compile a category table
    pub fn new(table: &CategoryTable, scan_chars: usize) -> Result<Self, ExtractorError> {
        let tiers = [&table.specific, &table.moderate, &table.generic]
            .into_iter()
            .map(|tier| compile_tier(tier))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { tiers, scan_chars })
    }

    /// Category of a clause's own text, first tier hit wins
    pub fn classify(&self, text: &str) -> Option<Category> {
        let end = text
            .char_indices()
            .nth(self.scan_chars)
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        let prefix = &text[..end];

        self.tiers.iter().find_map(|tier| {
            tier.iter()
                .find(|(_, pattern)| pattern.is_match(prefix))
                .map(|(category, _)| *category)
        })
    }
}

fn compile_tier(tier: &[CategoryKeywords]) -> Result<Vec<(Category, Regex)>, ExtractorError> {
    let mut compiled = Vec::with_capacity(tier.len());
    for entry in tier {
        let category = Category::parse(&entry.category)
            .ok_or_else(|| ExtractorError::Config(format!("Unknown category: {}", entry.category)))?;

        let alternatives: Vec<String> = entry
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();
        if alternatives.is_empty() {
            continue;
        }

        let pattern = Regex::new(&format!(r"(?i)\b(?:{})", alternatives.join("|")))?;
        compiled.push((category, pattern));
    }
    Ok(compiled)
}

/// Resolve categories and headings, inheriting from parents
///
/// Clauses must be in document order so every parent is resolved before its
/// children.
pub fn inherit(clauses: &mut [Clause], matcher: &CategoryMatcher) {
    for i in 0..clauses.len() {
        let inherited = clauses[i]
            .parent_id
            .and_then(|p| clauses.get(p.index()))
            .map(|parent| (parent.category, parent.heading.clone()));

        let clause = &mut clauses[i];
        clause.category = matcher.classify(clause.body());

        if let Some((category, heading)) = inherited {
            if clause.category.is_none() {
                clause.category = category;
            }
            if clause.heading.is_none() {
                clause.heading = heading;
            }
        }
    }
}
