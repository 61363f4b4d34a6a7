//! Non-fatal problems found while building regions.
//!
//! Bad entities and bad loops don't stop the pipeline. Each one is recorded
//! here (and logged) and the rest of the batch carries on.

use std::fmt;

use crate::error::GeometryError;

/// One recorded anomaly.
#[derive(Debug, Clone, PartialEq)]
pub enum Issue {
    /// A source entity could not be flattened or read.
    EntitySkipped { entity: usize, kind: String, error: GeometryError },
    /// A closed fragment or chain failed loop validation.
    LoopDiscarded { fragments: Vec<usize>, error: GeometryError },
    /// A loop was rejected by the region builder.
    LoopRejected { loop_index: usize, error: GeometryError },
    /// A loop repeats an earlier one and was dropped.
    DuplicateLoop { loop_index: usize, duplicate_of: usize },
    /// Two loop boundaries cross; nesting is best-effort.
    PartialOverlap { loop_index: usize, other: usize },
    /// Fragments that never closed into a loop.
    OpenChain { fragments: Vec<usize> },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::EntitySkipped { entity, kind, error } => {
                write!(f, "entity #{} ({}) skipped: {}", entity, kind, error)
            }
            Issue::LoopDiscarded { fragments, error } => {
                write!(f, "loop from fragments {:?} discarded: {}", fragments, error)
            }
            Issue::LoopRejected { loop_index, error } => {
                write!(f, "loop #{} rejected: {}", loop_index, error)
            }
            Issue::DuplicateLoop { loop_index, duplicate_of } => {
                write!(f, "loop #{} duplicates loop #{}", loop_index, duplicate_of)
            }
            Issue::PartialOverlap { loop_index, other } => {
                write!(f, "loop #{} partially overlaps loop #{}", loop_index, other)
            }
            Issue::OpenChain { fragments } => {
                write!(f, "fragments {:?} do not close", fragments)
            }
        }
    }
}

impl Issue {
    /// Short machine-readable category.
    pub fn category(&self) -> &'static str {
        match self {
            Issue::EntitySkipped { .. } => "entity_skipped",
            Issue::LoopDiscarded { .. } => "loop_discarded",
            Issue::LoopRejected { .. } => "loop_rejected",
            Issue::DuplicateLoop { .. } => "duplicate_loop",
            Issue::PartialOverlap { .. } => "partial_overlap",
            Issue::OpenChain { .. } => "open_chain",
        }
    }
}

/// Accumulated issues for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    pub issues: Vec<Issue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.issues.extend(other.issues);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Number of issues in `category` (see [`Issue::category`]).
    pub fn count(&self, category: &str) -> usize {
        self.issues.iter().filter(|i| i.category() == category).count()
    }

    pub fn skipped_entities(&self) -> usize {
        self.count("entity_skipped")
    }

    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return write!(f, "no issues");
        }
        writeln!(f, "{} issue(s):", self.issues.len())?;
        for issue in &self.issues {
            writeln!(f, "  - {}", issue)?;
        }
        Ok(())
    }
}
