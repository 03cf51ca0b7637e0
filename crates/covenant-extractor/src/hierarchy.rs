//! Hierarchy building
//!
//! Turns namespaced markers into a flat, document-ordered clause list with
//! parent indices. Parents are resolved by numbering arithmetic against the
//! chain of still-open clauses; spans end where the next clause at the same or
//! a shallower depth begins, so sibling spans never overlap.

use crate::namespace::{parent_number, ResolvedMarker};
use crate::scanner::MarkerKind;
use crate::types::ExtractionEvent;
use covenant_domain::{Clause, ClauseId};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

struct Draft {
    number: String,
    raw_label: String,
    parent: Option<usize>,
    depth: usize,
    heading: Option<String>,
    start: usize,
    /// Numbered clauses, appendix headers and gap parents
    structural: bool,
    synthetic: bool,
    appendix: bool,
}

impl Draft {
    fn marked(resolved: &ResolvedMarker, start: usize, heading: Option<String>, structural: bool) -> Self {
        Self {
            number: resolved.number.clone(),
            raw_label: resolved.marker.label.clone(),
            parent: None,
            depth: 0,
            heading,
            start,
            structural,
            synthetic: false,
            appendix: resolved.marker.kind == MarkerKind::AppendixHeader,
        }
    }

    fn synthetic(number: &str, start: usize, heading: Option<String>, structural: bool) -> Self {
        Self {
            number: number.to_string(),
            raw_label: number.to_string(),
            parent: None,
            depth: 0,
            heading,
            start,
            structural,
            synthetic: true,
            appendix: false,
        }
    }
}

struct PendingHeading {
    position: usize,
    text: String,
}

/// Builds the clause list for one document
pub struct HierarchyBuilder<'a> {
    text: &'a str,
    gap_search_window: usize,
    heading_attach_window: usize,
    drafts: Vec<Draft>,
    stack: Vec<usize>,
    seen: HashSet<String>,
    events: Vec<ExtractionEvent>,
    floor: usize,
    standalone_headings: usize,
}

impl<'a> HierarchyBuilder<'a> {
    /// Create a builder over normalized text
    pub fn new(text: &'a str, gap_search_window: usize, heading_attach_window: usize) -> Self {
        Self {
            text,
            gap_search_window,
            heading_attach_window,
            drafts: Vec::new(),
            stack: Vec::new(),
            seen: HashSet::new(),
            events: Vec::new(),
            floor: 0,
            standalone_headings: 0,
        }
    }

    /// Build clauses from deduplicated, namespaced markers in document order
    ///
    /// Returned clauses carry structure only; categories, topics and flags
    /// are filled in by later stages.
    pub fn build(mut self, markers: &[ResolvedMarker]) -> (Vec<Clause>, Vec<ExtractionEvent>) {
        if markers.is_empty() {
            warn!("No clause boundaries found, treating document as one clause");
            self.events.push(ExtractionEvent::NoBoundaries);
            self.push(Draft::synthetic("DOCUMENT", 0, None, false), None);
            return self.finish();
        }

        let mut pending: Option<PendingHeading> = None;

        for (i, resolved) in markers.iter().enumerate() {
            let marker = &resolved.marker;
            match marker.kind {
                MarkerKind::AppendixHeader => {
                    let draft = Draft::marked(resolved, marker.position, marker.title.clone(), true);
                    self.push(draft, None);
                }
                MarkerKind::AllCapsHeading => {
                    let attaches = markers
                        .get(i + 1)
                        .map(|next| {
                            next.marker.kind.is_numbered()
                                && next.marker.position <= marker.line_end + self.heading_attach_window
                        })
                        .unwrap_or(false);

                    if attaches {
                        pending = Some(PendingHeading {
                            position: marker.position,
                            text: marker.label.clone(),
                        });
                    } else {
                        self.place_standalone_heading(resolved);
                    }
                }
                MarkerKind::MainNumbered | MarkerKind::HierarchicalNumbered => {
                    self.place_numbered(resolved, pending.take());
                }
                MarkerKind::Lettered => {
                    let slot = self.stack.iter().rposition(|&idx| self.drafts[idx].structural);
                    let draft = Draft::marked(resolved, marker.position, marker.title.clone(), false);
                    self.push(draft, slot);
                }
            }
            self.floor = marker.line_end;
        }

        self.finish()
    }

    fn place_numbered(&mut self, resolved: &ResolvedMarker, pending: Option<PendingHeading>) {
        let marker = &resolved.marker;
        let number = resolved.number.clone();

        let slot = match parent_number(&number) {
            None => None,
            Some(parent) => match self.open_slot(parent) {
                Some(slot) => Some(slot),
                None if self.seen.contains(parent) => {
                    warn!(parent, child = %number, "Parent clause already closed, attaching as root");
                    self.events.push(ExtractionEvent::ClosedParent {
                        parent: parent.to_string(),
                        child: number.clone(),
                    });
                    None
                }
                None => {
                    self.place_gap_child(resolved, parent.to_string(), pending);
                    return;
                }
            },
        };

        let draft = match pending {
            Some(heading) => {
                let title = marker.title.clone().or(Some(heading.text));
                Draft::marked(resolved, heading.position, title, true)
            }
            None => Draft::marked(resolved, marker.position, marker.title.clone(), true),
        };
        self.push(draft, slot);
    }

    fn place_gap_child(&mut self, resolved: &ResolvedMarker, missing: String, pending: Option<PendingHeading>) {
        let marker = &resolved.marker;
        let source = match pending {
            Some(heading) => Some((heading.position, heading.text)),
            None => self.heading_line_before(marker.position),
        };

        match source {
            Some((start, heading)) => {
                warn!(number = %missing, child = %resolved.number, heading = %heading, "Synthesized missing parent clause");
                self.events.push(ExtractionEvent::GapParentSynthesized {
                    number: missing.clone(),
                    child: resolved.number.clone(),
                });

                let slot = self.open_ancestor_slot(&missing);
                self.push(Draft::synthetic(&missing, start, Some(heading), true), slot);

                let parent_slot = self.stack.len().checked_sub(1);
                let child = Draft::marked(resolved, marker.position, marker.title.clone(), true);
                self.push(child, parent_slot);
            }
            None => {
                warn!(number = %missing, child = %resolved.number, "Missing parent clause could not be inferred");
                self.events.push(ExtractionEvent::GapUnresolved {
                    number: missing.clone(),
                    child: resolved.number.clone(),
                });

                let slot = self.open_ancestor_slot(&missing);
                let child = Draft::marked(resolved, marker.position, marker.title.clone(), true);
                self.push(child, slot);
            }
        }
    }

    fn place_standalone_heading(&mut self, resolved: &ResolvedMarker) {
        self.standalone_headings += 1;
        let marker = &resolved.marker;

        let mut draft = Draft::synthetic(
            &format!("H{}", self.standalone_headings),
            marker.position,
            Some(marker.label.clone()),
            false,
        );
        draft.raw_label = marker.label.clone();

        // Inside an appendix the heading stays under the header
        let slot = match self.stack.first() {
            Some(&root) if self.drafts[root].appendix => Some(0),
            _ => None,
        };
        debug!(label = %draft.number, heading = %marker.label, "Standalone heading");
        self.push(draft, slot);
    }

    /// Heading-like line immediately before `position`, after the previous marker
    fn heading_line_before(&self, position: usize) -> Option<(usize, String)> {
        let text = self.text;
        let line_start = text[..position].rfind('\n').map(|i| i + 1).unwrap_or(0);

        let mut lower = position.saturating_sub(self.gap_search_window).max(self.floor);
        while lower < line_start && !text.is_char_boundary(lower) {
            lower += 1;
        }
        if lower >= line_start {
            return None;
        }

        let region = text[lower..line_start].trim_end();
        if region.is_empty() {
            return None;
        }

        let line_offset = region.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let absolute = lower + line_offset;
        if absolute > 0 && !text[..absolute].ends_with('\n') {
            return None;
        }

        let line = &region[line_offset..];
        let heading = line.trim();
        if !is_heading_like(heading) {
            return None;
        }

        let start = absolute + (line.len() - line.trim_start().len());
        Some((start, heading.to_string()))
    }

    fn open_slot(&self, number: &str) -> Option<usize> {
        self.stack.iter().rposition(|&idx| {
            let draft = &self.drafts[idx];
            draft.structural && draft.number == number
        })
    }

    fn open_ancestor_slot(&self, number: &str) -> Option<usize> {
        let mut current = Some(number);
        while let Some(candidate) = current {
            if let Some(slot) = self.open_slot(candidate) {
                return Some(slot);
            }
            current = parent_number(candidate);
        }
        None
    }

    fn push(&mut self, mut draft: Draft, slot: Option<usize>) {
        match slot.and_then(|s| self.stack.get(s).copied().map(|parent| (s, parent))) {
            Some((slot, parent)) => {
                self.stack.truncate(slot + 1);
                draft.parent = Some(parent);
                draft.depth = self.drafts[parent].depth + 1;
            }
            None => {
                self.stack.clear();
                draft.parent = None;
                draft.depth = 0;
            }
        }

        if draft.structural {
            self.seen.insert(draft.number.clone());
        }
        self.stack.push(self.drafts.len());
        self.drafts.push(draft);
    }

    fn finish(mut self) -> (Vec<Clause>, Vec<ExtractionEvent>) {
        let needs_preamble = self
            .drafts
            .first()
            .map(|first| !self.text[..first.start].trim().is_empty())
            .unwrap_or(false);
        if needs_preamble {
            for draft in &mut self.drafts {
                draft.parent = draft.parent.map(|p| p + 1);
            }
            self.drafts.insert(0, Draft::synthetic("PREAMBLE", 0, None, false));
        }

        let text_len = self.text.len();
        let drafts = &self.drafts;
        let clauses = drafts
            .iter()
            .enumerate()
            .map(|(i, draft)| {
                let end = drafts[i + 1..]
                    .iter()
                    .find(|next| next.depth <= draft.depth)
                    .map(|next| next.start)
                    .unwrap_or(text_len);
                let body_end = match drafts.get(i + 1) {
                    Some(next) if next.parent == Some(i) => next.start,
                    _ => end,
                };

                Clause {
                    id: ClauseId::from_index(i),
                    number: draft.number.clone(),
                    raw_label: draft.raw_label.clone(),
                    parent_id: draft.parent.map(ClauseId::from_index),
                    depth: draft.depth,
                    heading: draft.heading.clone(),
                    category: None,
                    topics: BTreeSet::new(),
                    text: self.text[draft.start..end].to_string(),
                    start_char: draft.start,
                    end_char: end,
                    body_end,
                    is_override: false,
                    is_stub: false,
                    is_toc: false,
                    is_synthetic: draft.synthetic,
                }
            })
            .collect();

        (clauses, self.events)
    }
}

fn is_heading_like(line: &str) -> bool {
    let len = line.chars().count();
    let starts_upper = line.chars().next().map(|c| c.is_uppercase()).unwrap_or(false);
    (3..=100).contains(&len)
        && starts_upper
        && !line.ends_with(['.', ';', ','])
        && line.split_whitespace().count() <= 12
}
