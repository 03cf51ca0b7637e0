//! Boundary scanning: locate clause, heading and appendix markers in raw text

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use regex::{Captures, Regex};

/// Family of a boundary marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// `4.`, `4)`, `Article 4`
    MainNumbered,
    /// `4.1`, `4.1.2.`, `Section 4.1`
    HierarchicalNumbered,
    /// `(a)`, `a)`, `(iv)`, `(2)`
    Lettered,
    /// A stand-alone ALL-CAPS line
    AllCapsHeading,
    /// `APPENDIX A`, `Schedule 2`, `Annex III`; labelled `A`, `SCHEDULE-2`, `ANNEX-III`
    AppendixHeader,
}

impl MarkerKind {
    /// Snake-case name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerKind::MainNumbered => "main_numbered",
            MarkerKind::HierarchicalNumbered => "hierarchical_numbered",
            MarkerKind::Lettered => "lettered",
            MarkerKind::AllCapsHeading => "all_caps_heading",
            MarkerKind::AppendixHeader => "appendix_header",
        }
    }

    /// Main or hierarchical numbering
    pub fn is_numbered(&self) -> bool {
        matches!(self, MarkerKind::MainNumbered | MarkerKind::HierarchicalNumbered)
    }

    fn rank(&self) -> u8 {
        match self {
            MarkerKind::AppendixHeader => 4,
            MarkerKind::HierarchicalNumbered => 3,
            MarkerKind::MainNumbered => 2,
            MarkerKind::Lettered => 1,
            MarkerKind::AllCapsHeading => 0,
        }
    }
}

/// A detected clause boundary
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryMarker {
    /// Byte offset where the marker token starts
    pub position: usize,

    /// Byte offset of the end of the marker's line
    pub line_end: usize,

    /// Raw label (`4.1`, `(a)`, appendix id, or the heading text)
    pub label: String,

    /// Nesting level implied by the label (segments - 1 for numbers)
    pub level: usize,

    /// Pattern family
    pub kind: MarkerKind,

    /// Title printed on the marker's line, if any
    pub title: Option<String>,
}

impl BoundaryMarker {
    /// Cluster resolution priority, higher wins
    ///
    /// appendix > deepest hierarchical > main > lettered > heading
    pub fn priority(&self) -> (u8, usize) {
        let depth = match self.kind {
            MarkerKind::HierarchicalNumbered => self.level,
            _ => 0,
        };
        (self.kind.rank(), depth)
    }

    /// Main-numbered marker whose title is ALL-CAPS (`4) FEE`)
    pub fn is_article_heading(&self) -> bool {
        self.kind == MarkerKind::MainNumbered
            && self.title.as_deref().map(is_all_caps).unwrap_or(false)
    }
}

/// A pluggable boundary-detection rule set
pub trait BoundaryRules {
    /// Return every marker candidate in `text`, in any order
    ///
    /// Clustering and deduplication are applied by the caller.
    fn scan(&self, text: &str) -> Vec<BoundaryMarker>;
}

/// Line-anchored regular-expression boundary rules
pub struct RegexBoundaryRules {
    appendix: Regex,
    keyword_numbered: Regex,
    hierarchical: Regex,
    main: Regex,
    lettered: Regex,
    caps: Regex,
    heading_min_len: usize,
    heading_max_len: usize,
    stoplist: Vec<String>,
}

impl RegexBoundaryRules {
    /// Compile the rules for a configuration
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractorError> {
        Ok(Self {
            appendix: Regex::new(
                r"(?m)^[ \t]*(?P<marker>(?P<kw>(?i:appendix|annex|schedule|exhibit))[ \t]+(?P<id>[A-Z]|[0-9]{1,3}|[IVX]{1,6})\b)(?P<rest>[^\n]*)$",
            )?,
            keyword_numbered: Regex::new(
                r"(?m)^[ \t]*(?P<marker>(?i:article|section|clause)[ \t]+(?P<num>\d{1,3}(?:\.\d{1,3})*)\.?)(?P<rest>[^\n]*)$",
            )?,
            hierarchical: Regex::new(
                r"(?m)^[ \t]*(?P<marker>(?P<num>\d{1,3}(?:\.\d{1,3})+)\.?)(?:[ \t]+|\)[ \t]*|$)(?P<rest>[^\n]*)$",
            )?,
            main: Regex::new(
                r"(?m)^[ \t]*(?P<marker>(?P<num>\d{1,3})[.)])(?:[ \t]+(?P<rest>[^\n]*))?$",
            )?,
            lettered: Regex::new(
                r"(?m)^[ \t]*(?P<marker>\((?P<id>[a-zA-Z]{1,2}|[ivxlcIVXLC]{1,6}|\d{1,2})\)|(?P<bare>[a-z])\))(?:[ \t]+(?P<rest>[^\n]*))?$",
            )?,
            caps: Regex::new(r"(?m)^[ \t]*(?P<marker>[A-Z][A-Z0-9 ,&'/()\-]*[A-Z)])[ \t]*:?[ \t]*$")?,
            heading_min_len: config.heading_min_len,
            heading_max_len: config.heading_max_len,
            stoplist: config
                .heading_stoplist
                .iter()
                .map(|s| s.trim().to_uppercase())
                .collect(),
        })
    }

    fn scan_appendix(&self, text: &str, out: &mut Vec<BoundaryMarker>) {
        for caps in self.appendix.captures_iter(text) {
            let rest = group(&caps, "rest").trim();
            let stripped = rest
                .trim_start_matches(|c: char| matches!(c, '-' | '–' | '—' | ':' | '.' | ')'))
                .trim();
            let separated = stripped.len() < rest.len();
            if !(stripped.is_empty() || separated || is_all_caps(stripped)) {
                continue;
            }
            let title = Some(stripped.trim_end_matches(':').trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            let label = appendix_namespace(group(&caps, "kw"), group(&caps, "id"));
            out.push(self.marker(text, &caps, label, 0, MarkerKind::AppendixHeader, title));
        }
    }

    fn scan_keyword_numbered(&self, text: &str, out: &mut Vec<BoundaryMarker>) {
        for caps in self.keyword_numbered.captures_iter(text) {
            let rest = group(&caps, "rest").trim();
            let stripped = rest
                .trim_start_matches(|c: char| matches!(c, '-' | '–' | '—' | ':' | '.'))
                .trim();
            let separated = stripped.len() < rest.len();
            if !(stripped.is_empty() || separated || is_all_caps(stripped)) {
                continue;
            }
            let number = group(&caps, "num").to_string();
            let level = number.matches('.').count();
            let kind = if level == 0 {
                MarkerKind::MainNumbered
            } else {
                MarkerKind::HierarchicalNumbered
            };
            out.push(self.marker(text, &caps, number, level, kind, extract_title(stripped)));
        }
    }

    fn scan_numbered(&self, text: &str, out: &mut Vec<BoundaryMarker>) {
        for caps in self.hierarchical.captures_iter(text) {
            let number = group(&caps, "num").to_string();
            let level = number.matches('.').count();
            let title = extract_title(group(&caps, "rest"));
            out.push(self.marker(text, &caps, number, level, MarkerKind::HierarchicalNumbered, title));
        }
        for caps in self.main.captures_iter(text) {
            let number = group(&caps, "num").to_string();
            let title = extract_title(group(&caps, "rest"));
            out.push(self.marker(text, &caps, number, 0, MarkerKind::MainNumbered, title));
        }
    }

    fn scan_lettered(&self, text: &str, out: &mut Vec<BoundaryMarker>) {
        for caps in self.lettered.captures_iter(text) {
            let id = caps
                .name("id")
                .or_else(|| caps.name("bare"))
                .map(|m| m.as_str())
                .unwrap_or_default();
            let title = extract_title(group(&caps, "rest"));
            out.push(self.marker(text, &caps, format!("({})", id), 0, MarkerKind::Lettered, title));
        }
    }

    fn scan_headings(&self, text: &str, out: &mut Vec<BoundaryMarker>) {
        for caps in self.caps.captures_iter(text) {
            let heading = group(&caps, "marker").trim();
            let len = heading.chars().count();
            if len < self.heading_min_len || len > self.heading_max_len {
                continue;
            }
            if self.stoplist.iter().any(|s| s == heading) {
                continue;
            }
            out.push(self.marker(text, &caps, heading.to_string(), 0, MarkerKind::AllCapsHeading, None));
        }
    }

    fn marker(
        &self,
        text: &str,
        caps: &Captures<'_>,
        label: String,
        level: usize,
        kind: MarkerKind,
        title: Option<String>,
    ) -> BoundaryMarker {
        let position = caps
            .name("marker")
            .map(|m| m.start())
            .unwrap_or_else(|| caps.get(0).map(|m| m.start()).unwrap_or(0));
        BoundaryMarker {
            position,
            line_end: line_end(text, position),
            label,
            level,
            kind,
            title,
        }
    }
}

/// Namespace label for an appendix header
///
/// Letter ids stand alone (`A`). Numeric and roman ids keep their keyword
/// (`SCHEDULE-1`, `ANNEX-III`) so they never read as a main-body number.
fn appendix_namespace(keyword: &str, id: &str) -> String {
    if id.len() == 1 && id.chars().all(|c| c.is_ascii_uppercase()) {
        id.to_string()
    } else {
        format!("{}-{}", keyword.to_uppercase(), id)
    }
}

impl BoundaryRules for RegexBoundaryRules {
    fn scan(&self, text: &str) -> Vec<BoundaryMarker> {
        let mut markers = Vec::new();
        self.scan_appendix(text, &mut markers);
        self.scan_keyword_numbered(text, &mut markers);
        self.scan_numbered(text, &mut markers);
        self.scan_lettered(text, &mut markers);
        self.scan_headings(text, &mut markers);
        markers.sort_by_key(|m| m.position);
        markers
    }
}

/// Collapse marker clusters, keeping the highest-priority marker of each
///
/// A cluster is a run of markers on one line whose positions lie within
/// `window` bytes of the cluster's first marker.
pub fn dedupe(mut markers: Vec<BoundaryMarker>, text: &str, window: usize) -> Vec<BoundaryMarker> {
    markers.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then_with(|| b.priority().cmp(&a.priority()))
    });

    let mut result: Vec<BoundaryMarker> = Vec::with_capacity(markers.len());
    let mut cluster_start = None;

    for marker in markers {
        let joins = match cluster_start {
            Some(start) => {
                marker.position - start <= window && !text[start..marker.position].contains('\n')
            }
            None => false,
        };

        match result.last_mut() {
            Some(best) if joins => {
                if marker.priority() > best.priority() {
                    *best = marker;
                }
            }
            _ => {
                cluster_start = Some(marker.position);
                result.push(marker);
            }
        }
    }

    result
}

/// Whether `s` has at least two letters and no lowercase letters
pub fn is_all_caps(s: &str) -> bool {
    let mut letters = 0;
    for c in s.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_alphabetic() {
            letters += 1;
        }
    }
    letters >= 2
}

/// Title printed after a number on the same line
///
/// Either the whole rest of line in ALL-CAPS, or a short capitalized lead-in
/// ending with a period (`Payment Terms. The Client shall ...`).
pub fn extract_title(rest: &str) -> Option<String> {
    let rest = rest.trim();
    if rest.is_empty() {
        return None;
    }

    if is_all_caps(rest) && rest.chars().count() <= 100 {
        let title = rest.trim_end_matches([':', '.', ';']).trim();
        return Some(title.to_string()).filter(|t| !t.is_empty());
    }

    let idx = rest.find(". ")?;
    if idx > 60 {
        return None;
    }
    let lead = &rest[..idx];
    let words: Vec<&str> = lead.split_whitespace().collect();
    let capitalized = words.iter().all(|w| {
        w.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
            || matches!(*w, "and" | "of" | "or" | "the" | "to" | "for" | "in" | "on")
    });
    if !words.is_empty() && words.len() <= 6 && capitalized {
        Some(lead.to_string())
    } else {
        None
    }
}

/// Byte offset of the end of the line containing `position`
pub fn line_end(text: &str, position: usize) -> usize {
    text[position..]
        .find('\n')
        .map(|i| position + i)
        .unwrap_or(text.len())
}

fn group<'t>(caps: &Captures<'t>, name: &str) -> &'t str {
    caps.name(name).map(|m| m.as_str()).unwrap_or_default()
}
