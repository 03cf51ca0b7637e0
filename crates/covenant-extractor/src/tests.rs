//! Integration tests for the Extractor

#[cfg(test)]
mod tests {
    use crate::{
        BoundaryMarker, BoundaryRules, ClauseExtractor, ExtractionEvent, ExtractorConfig,
        ExtractorError, MarkerKind,
    };
    use covenant_domain::{Category, ClauseTree};
    use proptest::prelude::*;

    fn extractor() -> ClauseExtractor {
        ClauseExtractor::default_config().unwrap()
    }

    fn numbers(tree: &ClauseTree) -> Vec<&str> {
        tree.iter().map(|c| c.number.as_str()).collect()
    }

    #[test]
    fn test_empty_document_fails_fast() {
        assert!(matches!(extractor().extract(""), Err(ExtractorError::EmptyDocument)));
        assert!(matches!(
            extractor().extract("  \n\t \n"),
            Err(ExtractorError::EmptyDocument)
        ));
    }

    #[test]
    fn test_unstructured_document_degrades() {
        let text = "The parties agree that the goods will be delivered on Monday.";
        let extraction = extractor().extract(text).unwrap();

        assert_eq!(numbers(&extraction.tree), vec!["DOCUMENT"]);
        assert_eq!(extraction.events, vec![ExtractionEvent::NoBoundaries]);
        assert_eq!(extraction.events[0].kind(), "malformed_document");
    }

    #[test]
    fn test_appendix_numbering_is_distinct() {
        let text = "1. SCOPE\n\
                    1.2 The Supplier shall provide the services described in Appendix A.\n\
                    APPENDIX A - SERVICES\n\
                    1. Service levels\n\
                    1.2 The Supplier shall respond to incidents within 4 hours.\n";
        let extraction = extractor().extract(text).unwrap();
        let tree = &extraction.tree;

        assert_eq!(numbers(tree), vec!["1", "1.2", "A", "A.1", "A.1.2"]);
        assert_eq!(tree.clauses()[4].raw_label, "1.2");
        assert_eq!(tree.clauses()[2].category, Some(Category::Appendix));
        assert_eq!(tree.clauses()[2].heading.as_deref(), Some("SERVICES"));
        assert!(extraction.events.is_empty());
    }

    #[test]
    fn test_numeric_schedule_does_not_collide_with_main_body() {
        let text = "1. SCOPE\n\
                    1.2 The Supplier shall provide the services in the schedule.\n\
                    SCHEDULE 1\n\
                    1. Service levels\n\
                    1.2 The Supplier shall respond to incidents within 4 hours.\n";
        let tree = extractor().extract(text).unwrap().tree;

        assert_eq!(
            numbers(&tree),
            vec!["1", "1.2", "SCHEDULE-1", "SCHEDULE-1.1", "SCHEDULE-1.1.2"]
        );
        let distinct: std::collections::BTreeSet<&str> = numbers(&tree).into_iter().collect();
        assert_eq!(distinct.len(), tree.len());

        let clauses = tree.clauses();
        assert_eq!(clauses[1].parent_id, Some(clauses[0].id));
        assert_eq!(clauses[2].parent_id, None);
        assert_eq!(clauses[4].parent_id, Some(clauses[3].id));
    }

    #[test]
    fn test_heading_and_category_inheritance() {
        let text = "5. LIABILITY\n5.1 Neither side answers for indirect loss.\n";
        let tree = extractor().extract(text).unwrap().tree;

        let child = &tree.clauses()[1];
        assert_eq!(child.category, Some(Category::Liability));
        assert_eq!(child.heading.as_deref(), Some("LIABILITY"));
        assert!(child.topics.is_empty());
    }

    #[test]
    fn test_candidates_from_text() {
        let text = "1. PAYMENT\n\
                    1.1 The Client shall pay every invoice within 30 days of the invoice date.\n\
                    2. FEES\n\
                    2.1 The Client shall pay every invoice within 60 days of receipt.\n\
                    3. LAW\n\
                    3.1 The governing law shall be the law of Abu Dhabi and its courts.\n";
        let ex = extractor();
        let tree = ex.extract(text).unwrap().tree;

        assert_eq!(numbers(&tree), vec!["1", "1.1", "2", "2.1", "3", "3.1"]);
        assert!(tree.clauses()[0].is_stub);
        assert!(!tree.clauses()[1].is_stub);

        let report = ex.select_candidates(&tree);
        assert_eq!(report.candidates.len(), 1);
        let candidate = &report.candidates[0];
        assert_eq!(tree.get(candidate.clause_a).unwrap().number, "1.1");
        assert_eq!(tree.get(candidate.clause_b).unwrap().number, "2.1");
        assert!(candidate.shared_topics.contains("payment"));
    }

    #[test]
    fn test_override_clause_pairs_across_topics() {
        let text = "1. PAYMENT\n\
                    1.1 The Client shall pay every invoice within 30 days of the invoice date.\n\
                    2. GENERAL\n\
                    2.1 Notwithstanding anything else, this clause shall prevail over every other term.\n";
        let ex = extractor();
        let tree = ex.extract(text).unwrap().tree;

        assert!(tree.clauses()[3].is_override);
        let report = ex.select_candidates(&tree);
        assert_eq!(report.candidates.len(), 1);
        assert!(report.candidates[0].via_override);
    }

    #[test]
    fn test_sub_clause_overriding_its_parent_is_a_candidate() {
        let text = "5. Payment is due within 30 days of invoice and the Client shall pay by wire transfer.\n\
                    5.1 Notwithstanding clause 5, the Client shall pay within 60 days of invoice.\n";
        let ex = extractor();
        let tree = ex.extract(text).unwrap().tree;

        assert_eq!(numbers(&tree), vec!["5", "5.1"]);
        let (parent, child) = (&tree.clauses()[0], &tree.clauses()[1]);
        assert_eq!(child.parent_id, Some(parent.id));
        assert!(parent.is_eligible() && child.is_eligible());
        assert!(child.is_override);

        let report = ex.select_candidates(&tree);
        assert_eq!(report.candidates.len(), 1);
        assert_eq!(report.candidates[0].key(), (parent.id, child.id));
        assert!(report.candidates[0].shared_topics.contains("payment"));
    }

    #[test]
    fn test_table_of_contents_flagged() {
        let text = "CONTENTS\n\
                    1. DEFINITIONS 2\n\
                    2. PAYMENT 3\n\
                    1. DEFINITIONS\n\
                    1.1 \"Services\" means the services.\n\
                    2. PAYMENT\n\
                    2.1 The Client shall pay all invoices.\n";
        let tree = extractor().extract(text).unwrap().tree;

        let toc: Vec<&str> = tree
            .iter()
            .filter(|c| c.is_toc)
            .map(|c| c.number.as_str())
            .collect();
        assert_eq!(toc, vec!["1", "2"]);
        assert_eq!(tree.clauses()[0].heading.as_deref(), Some("DEFINITIONS 2"));

        let definition = tree.iter().find(|c| c.number == "1.1").unwrap();
        assert!(!definition.is_stub);
    }

    #[test]
    fn test_article_restart() {
        let text = "4) FEE\n\
                    1) The fee shall be fixed for the whole term of this agreement.\n\
                    5) TERM\n\
                    1) The agreement shall run for one year from signature.\n";
        let tree = extractor().extract(text).unwrap().tree;

        assert_eq!(numbers(&tree), vec!["4", "4.1", "5", "5.1"]);
        assert_eq!(tree.clauses()[1].raw_label, "1");
        assert_eq!(tree.clauses()[1].parent_id, Some(tree.clauses()[0].id));
    }

    struct SectionSignRules;

    impl BoundaryRules for SectionSignRules {
        fn scan(&self, text: &str) -> Vec<BoundaryMarker> {
            let mut offset = 0;
            let mut markers = Vec::new();
            for line in text.split_inclusive('\n') {
                if let Some(rest) = line.strip_prefix("§ ") {
                    let label: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                    if !label.is_empty() {
                        markers.push(BoundaryMarker {
                            position: offset,
                            line_end: offset + line.trim_end_matches('\n').len(),
                            label,
                            level: 0,
                            kind: MarkerKind::MainNumbered,
                            title: None,
                        });
                    }
                }
                offset += line.len();
            }
            markers
        }
    }

    #[test]
    fn test_pluggable_boundary_rules() {
        let ex = ClauseExtractor::new(ExtractorConfig::default())
            .unwrap()
            .with_boundary_rules(SectionSignRules);
        let text = "§ 1 The Client shall pay.\n§ 2 The Supplier shall deliver.\n";
        let tree = ex.extract(text).unwrap().tree;

        assert_eq!(numbers(&tree), vec!["1", "2"]);
        assert_eq!(tree.clauses()[1].start_char, text.find("§ 2").unwrap());
    }

    fn document(sections: &[(bool, usize, usize)]) -> String {
        let mut text = String::from("This Agreement is made between the parties.\n");
        for (i, (has_main, subs, letters)) in sections.iter().enumerate() {
            let n = i + 1;
            if *has_main {
                text.push_str(&format!("{}. SECTION {}\n", n, n));
            }
            for j in 1..=*subs {
                text.push_str(&format!("{}.{} The Supplier shall perform obligation {}.\n", n, j, j));
                for k in 0..*letters {
                    let letter = (b'a' + k as u8) as char;
                    text.push_str(&format!("({}) item {};\n", letter, letter));
                }
            }
        }
        text
    }

    proptest! {
        #[test]
        fn prop_tree_invariants(sections in prop::collection::vec((any::<bool>(), 0usize..4, 0usize..3), 1..8)) {
            let text = document(&sections);
            let tree = extractor().extract(&text).unwrap().tree;

            for clause in tree.iter() {
                prop_assert_eq!(&text[clause.start_char..clause.end_char], clause.text.as_str());
                match clause.parent_id {
                    Some(parent) => {
                        let parent = tree.get(parent).unwrap();
                        prop_assert_eq!(clause.depth, parent.depth + 1);
                        prop_assert!(parent.start_char <= clause.start_char);
                        prop_assert!(clause.end_char <= parent.end_char);
                    }
                    None => {
                        prop_assert_eq!(clause.depth, 0);
                    }
                }
            }

            let clauses = tree.clauses();
            for a in clauses {
                for b in clauses {
                    if a.id != b.id && a.parent_id == b.parent_id {
                        prop_assert!(a.end_char <= b.start_char || b.end_char <= a.start_char);
                    }
                }
            }

            let covered = tree.roots().map(|c| c.end_char - c.start_char).sum::<usize>();
            prop_assert_eq!(covered, text.len());
        }
    }
}
