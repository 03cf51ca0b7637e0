//! Numbering namespaces for articles and appendices
//!
//! Contracts often restart numbering: items `1)`, `2)` inside article
//! `4) FEE`, or a second `1.2` inside `APPENDIX A`. The resolver records the
//! ranges owned by such articles and appendices and relabels the markers
//! inside them (`4.1`, `A.1.2`, `SCHEDULE-1.2`) so labels never collide across
//! contexts.

use crate::scanner::{BoundaryMarker, MarkerKind};

/// Range owned by an appendix header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendixContext {
    /// Appendix namespace (`A`, `SCHEDULE-2`, `ANNEX-III`)
    pub id: String,

    /// Byte offset of the header
    pub start: usize,

    /// Byte offset where the next appendix starts, or end of document
    pub end: usize,
}

/// Range owned by a top-level article whose items restart at `1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleContext {
    /// Article number (`4`)
    pub number: String,

    /// Byte offset of the article marker
    pub start: usize,

    /// Byte offset of the next article, appendix, or end of document
    pub end: usize,
}

/// All article and appendix contexts of one document
#[derive(Debug, Clone, Default)]
pub struct ContextMap {
    /// Appendix contexts in document order
    pub appendices: Vec<AppendixContext>,

    /// Renumbering article contexts in document order
    pub articles: Vec<ArticleContext>,
}

impl ContextMap {
    /// Compute contexts from deduplicated markers in document order
    pub fn build(markers: &[BoundaryMarker], text_len: usize) -> Self {
        let headers: Vec<&BoundaryMarker> = markers
            .iter()
            .filter(|m| m.kind == MarkerKind::AppendixHeader)
            .collect();

        let appendices: Vec<AppendixContext> = headers
            .iter()
            .enumerate()
            .map(|(i, header)| AppendixContext {
                id: header.label.clone(),
                start: header.position,
                end: headers.get(i + 1).map(|next| next.position).unwrap_or(text_len),
            })
            .collect();

        let mut map = Self {
            appendices,
            articles: Vec::new(),
        };

        for (i, marker) in markers.iter().enumerate() {
            if !marker.is_article_heading() || map.appendix_at(marker.position).is_some() {
                continue;
            }

            let end = markers[i + 1..]
                .iter()
                .find(|m| m.is_article_heading() || m.kind == MarkerKind::AppendixHeader)
                .map(|m| m.position)
                .unwrap_or(text_len);

            let restarts = markers[i + 1..]
                .iter()
                .take_while(|m| m.position < end)
                .find(|m| m.kind == MarkerKind::MainNumbered)
                .map(|m| m.label == "1")
                .unwrap_or(false);

            if restarts {
                map.articles.push(ArticleContext {
                    number: marker.label.clone(),
                    start: marker.position,
                    end,
                });
            }
        }

        map
    }

    /// Appendix context containing `position`
    pub fn appendix_at(&self, position: usize) -> Option<&AppendixContext> {
        self.appendices
            .iter()
            .find(|a| a.start <= position && position < a.end)
    }

    /// Renumbering article context strictly after its own marker
    pub fn article_at(&self, position: usize) -> Option<&ArticleContext> {
        self.articles
            .iter()
            .find(|a| a.start < position && position < a.end)
    }
}

/// A marker with its namespaced number
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMarker {
    /// The scanned marker; `marker.label` keeps the raw label
    pub marker: BoundaryMarker,

    /// Namespaced number (`4.1`, `A.1.2`, `(a)`)
    pub number: String,
}

/// Relabel markers that fall inside article or appendix contexts
pub fn resolve(markers: &[BoundaryMarker], text_len: usize) -> Vec<ResolvedMarker> {
    let contexts = ContextMap::build(markers, text_len);

    markers
        .iter()
        .map(|marker| {
            let number = if marker.kind.is_numbered() {
                match contexts.appendix_at(marker.position) {
                    Some(appendix) => format!("{}.{}", appendix.id, marker.label),
                    None => match contexts.article_at(marker.position) {
                        Some(article) => format!("{}.{}", article.number, marker.label),
                        None => marker.label.clone(),
                    },
                }
            } else {
                marker.label.clone()
            };

            ResolvedMarker {
                marker: marker.clone(),
                number,
            }
        })
        .collect()
}

/// Parent number by numbering arithmetic: `4.1.2` → `4.1`, `A.1` → `A`
pub fn parent_number(number: &str) -> Option<&str> {
    number.rsplit_once('.').map(|(parent, _)| parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use crate::scanner::{dedupe, BoundaryRules, RegexBoundaryRules};

    fn resolved(text: &str) -> Vec<String> {
        let config = ExtractorConfig::default();
        let rules = RegexBoundaryRules::new(&config).unwrap();
        let markers = dedupe(rules.scan(text), text, config.cluster_window);
        resolve(&markers, text.len())
            .into_iter()
            .map(|r| r.number)
            .collect()
    }

    #[test]
    fn test_appendix_numbers_do_not_collide() {
        let text = "1. SCOPE\n1.2 Main body item.\nAPPENDIX A\n1. Pricing\n1.2 Appendix item.\n";
        assert_eq!(resolved(text), vec!["1", "1.2", "A", "A.1", "A.1.2"]);
    }

    #[test]
    fn test_numeric_schedule_is_keyword_namespaced() {
        let text = "1. SCOPE\n1.2 Main body item.\nSCHEDULE 1\n1. Service levels\n1.2 Schedule item.\n";
        assert_eq!(
            resolved(text),
            vec!["1", "1.2", "SCHEDULE-1", "SCHEDULE-1.1", "SCHEDULE-1.1.2"]
        );
    }

    #[test]
    fn test_article_restart_is_namespaced() {
        let text = "4) FEE\n1) The fee is fixed.\n2) Fees are due monthly.\n5) TERM\n1) The term is one year.\n";
        assert_eq!(resolved(text), vec!["4", "4.1", "4.2", "5", "5.1"]);
    }

    #[test]
    fn test_article_without_restart_keeps_labels() {
        let text = "1. DEFINITIONS\n1.1 Words.\n2. PAYMENT\n2.1 Pay.\n";
        assert_eq!(resolved(text), vec!["1", "1.1", "2", "2.1"]);
    }

    #[test]
    fn test_context_lookup() {
        let config = ExtractorConfig::default();
        let rules = RegexBoundaryRules::new(&config).unwrap();
        let text = "1. TERMS\nAPPENDIX B\nSome text.\n";
        let markers = dedupe(rules.scan(text), text, config.cluster_window);
        let map = ContextMap::build(&markers, text.len());

        assert!(map.appendix_at(0).is_none());
        let appendix = map.appendix_at(text.len() - 1).unwrap();
        assert_eq!(appendix.id, "B");
        assert_eq!(appendix.end, text.len());
        assert!(map.articles.is_empty());
    }

    #[test]
    fn test_parent_number() {
        assert_eq!(parent_number("4.1.2"), Some("4.1"));
        assert_eq!(parent_number("A.1"), Some("A"));
        assert_eq!(parent_number("4"), None);
    }
}
