//! Clause module - structural units of a contract and the arena that owns them

use crate::Category;
use std::collections::BTreeSet;
use std::fmt;

/// Identifier of a clause within one extraction run
///
/// The id is the clause's index in its [`ClauseTree`] arena. It is stable for
/// the lifetime of the run and carries no meaning across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClauseId(u32);

impl ClauseId {
    /// Create an id from an arena index
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Arena index of this id
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClauseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// A clause - a contiguous span of the normalized source text
///
/// `text` covers `[start_char, end_char)` and includes the text of every
/// descendant. `body_end` marks where the clause's own body stops (the start
/// of its first child), which is the part detection, tagging and grounding
/// look at.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// Arena id
    pub id: ClauseId,

    /// Display label after namespacing (`4.1`, `(a)`, `A.2`, `PREAMBLE`)
    pub number: String,

    /// Label as printed in the source, before namespacing
    pub raw_label: String,

    /// Owning parent, `None` for roots
    pub parent_id: Option<ClauseId>,

    /// 0 for roots, else parent depth + 1
    pub depth: usize,

    /// Explicit or inherited title
    pub heading: Option<String>,

    /// Resolved (possibly inherited) category
    pub category: Option<Category>,

    /// Topic tags from the keyword taxonomy
    pub topics: BTreeSet<String>,

    /// Full span text, children included
    pub text: String,

    /// Byte offset of the span start in the source
    pub start_char: usize,

    /// Byte offset one past the span end in the source
    pub end_char: usize,

    /// Byte offset where the clause's own body ends
    pub body_end: usize,

    /// Asserts precedence over other provisions
    pub is_override: bool,

    /// Heading-only or content-free
    pub is_stub: bool,

    /// Table-of-contents artifact
    pub is_toc: bool,

    /// Inferred rather than read from an explicit marker
    pub is_synthetic: bool,
}

impl Clause {
    /// The clause's own body, excluding descendants
    pub fn body(&self) -> &str {
        let len = self.body_end.saturating_sub(self.start_char).min(self.text.len());
        &self.text[..len]
    }

    /// Whether this clause takes part in candidate generation
    pub fn is_eligible(&self) -> bool {
        !self.is_stub && !self.is_toc
    }

    /// Whether this clause's span strictly contains `other`'s span
    pub fn contains(&self, other: &Clause) -> bool {
        self.start_char <= other.start_char
            && other.end_char <= self.end_char
            && (self.start_char, self.end_char) != (other.start_char, other.end_char)
    }

    /// Label with heading for logs and reports (`4.1 PAYMENT`)
    pub fn display_label(&self) -> String {
        match &self.heading {
            Some(heading) => format!("{} {}", self.number, heading),
            None => self.number.clone(),
        }
    }
}

/// Arena of clauses in document order
///
/// Parents always precede their children, and clause `i` has id `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClauseTree {
    clauses: Vec<Clause>,
}

impl ClauseTree {
    /// Build a tree from clauses already in document order
    ///
    /// Fails if ids do not match arena positions, a parent does not precede
    /// its child, depths are inconsistent, or spans partially overlap.
    pub fn from_clauses(clauses: Vec<Clause>) -> Result<Self, String> {
        let tree = Self { clauses };
        tree.validate()?;
        Ok(tree)
    }

    /// Number of clauses
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether the tree holds no clauses
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Get a clause by id
    pub fn get(&self, id: ClauseId) -> Option<&Clause> {
        self.clauses.get(id.index())
    }

    /// All clauses in document order
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Iterate clauses in document order
    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// Root clauses in document order
    pub fn roots(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter().filter(|c| c.parent_id.is_none())
    }

    /// Direct children of a clause in document order
    pub fn children(&self, id: ClauseId) -> impl Iterator<Item = &Clause> {
        self.clauses
            .iter()
            .filter(move |c| c.parent_id == Some(id))
    }

    /// Ancestors of a clause, nearest first
    pub fn ancestors(&self, id: ClauseId) -> Vec<ClauseId> {
        let mut chain = Vec::new();
        let mut current = self.get(id).and_then(|c| c.parent_id);
        while let Some(parent) = current {
            chain.push(parent);
            current = self.get(parent).and_then(|c| c.parent_id);
        }
        chain
    }

    /// Whether `ancestor` lies on the parent chain of `descendant`
    pub fn is_ancestor(&self, ancestor: ClauseId, descendant: ClauseId) -> bool {
        self.ancestors(descendant).contains(&ancestor)
    }

    /// Check the structural invariants of the arena
    pub fn validate(&self) -> Result<(), String> {
        for (index, clause) in self.clauses.iter().enumerate() {
            if clause.id.index() != index {
                return Err(format!("clause at {} carries id {}", index, clause.id));
            }
            if clause.start_char > clause.body_end || clause.body_end > clause.end_char {
                return Err(format!(
                    "clause {} has inconsistent offsets {}..{} (body end {})",
                    clause.number, clause.start_char, clause.end_char, clause.body_end
                ));
            }
            if index > 0 && self.clauses[index - 1].start_char > clause.start_char {
                return Err(format!("clause {} is out of document order", clause.number));
            }
            match clause.parent_id {
                None if clause.depth != 0 => {
                    return Err(format!("root {} has depth {}", clause.number, clause.depth));
                }
                None => {}
                Some(parent_id) => {
                    if parent_id.index() >= index {
                        return Err(format!(
                            "parent of {} does not precede it",
                            clause.number
                        ));
                    }
                    let parent = &self.clauses[parent_id.index()];
                    if clause.depth != parent.depth + 1 {
                        return Err(format!(
                            "depth of {} is {} but parent {} has depth {}",
                            clause.number, clause.depth, parent.number, parent.depth
                        ));
                    }
                    if clause.start_char < parent.body_end || clause.end_char > parent.end_char {
                        return Err(format!(
                            "span of {} escapes parent {}",
                            clause.number, parent.number
                        ));
                    }
                }
            }
        }

        for (i, a) in self.clauses.iter().enumerate() {
            for b in &self.clauses[i + 1..] {
                if b.start_char >= a.end_char {
                    break;
                }
                if b.end_char > a.end_char {
                    return Err(format!(
                        "spans of {} and {} partially overlap",
                        a.number, b.number
                    ));
                }
            }
        }

        Ok(())
    }
}
