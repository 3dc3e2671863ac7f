use std::fmt;

use serde::Serialize;

use super::category::{Category, CategorySet, Predecessor};

use super::category::Category::{
    CostOfGoodsSold as COGS, FinancingIncomeAfterTax as FIAT, FinancingIncomeBeforeTax as FIBT,
    OperatingExpense as OE, OperatingIncomeBeforeTax as OIBT, OperatingRevenue as OR,
    OtherOperatingIncomeAfterTax as OOIAT, Tax as TAX,
};

/// The graph used for every income statement.
///
/// Pretax financing does not lead back to pretax operating here even though
/// the pair is declared cyclic; [`TransitionGraph::verify`] reports it.
static STANDARD: TransitionGraph = TransitionGraph::from_table(
    CategorySet::of(&[OR, COGS, OE, OIBT, FIBT, TAX, OOIAT, FIAT]),
    [
        CategorySet::of(&[OR, COGS, OE, OIBT, FIBT, TAX, OOIAT, FIAT]),
        CategorySet::of(&[COGS, OE, OIBT, FIBT, TAX, OOIAT, FIAT]),
        CategorySet::of(&[OE, OIBT, FIBT, TAX, OOIAT, FIAT]),
        CategorySet::of(&[OIBT, FIBT, TAX, OOIAT, FIAT]),
        CategorySet::of(&[FIBT, TAX, OOIAT, FIAT]),
        CategorySet::of(&[TAX, OOIAT, FIAT]),
        CategorySet::of(&[OOIAT, FIAT]),
        CategorySet::of(&[OOIAT, FIAT]),
    ],
    &[(OIBT, FIBT), (OOIAT, FIAT)],
);

/// Allowed-next-category table, keyed by [`Predecessor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionGraph {
    start: CategorySet,
    after: [CategorySet; Category::COUNT],
    // Pairs whose members may follow each other in either order.
    cyclic_pairs: &'static [(Category, Category)],
}

/// A problem found by [`TransitionGraph::verify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphIssue {
    /// Nothing may follow this key; a pass reaching it cannot continue.
    EmptySuccessors { key: Predecessor },
    /// A statement may not open with this category.
    StartMissing { category: Category },
    /// A declared cyclic pair only allows `from -> to`, not `to -> from`.
    AsymmetricCycle { from: Category, to: Category },
    /// A backward edge that is not part of a declared cyclic pair.
    UndeclaredBackEdge { from: Category, to: Category },
}

impl GraphIssue {
    /// Whether classification through the graph can fail because of this issue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GraphIssue::EmptySuccessors { .. } | GraphIssue::StartMissing { .. })
    }
}

impl fmt::Display for GraphIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphIssue::EmptySuccessors { key } => {
                write!(f, "no category may follow {key}")
            }
            GraphIssue::StartMissing { category } => {
                write!(f, "a statement may not open with {category}")
            }
            GraphIssue::AsymmetricCycle { from, to } => write!(
                f,
                "{from}/{to} is declared cyclic but only {from} -> {to} is allowed"
            ),
            GraphIssue::UndeclaredBackEdge { from, to } => {
                write!(f, "{from} -> {to} goes backwards outside a cyclic pair")
            }
        }
    }
}

impl TransitionGraph {
    pub const fn from_table(
        start: CategorySet,
        after: [CategorySet; Category::COUNT],
        cyclic_pairs: &'static [(Category, Category)],
    ) -> Self {
        Self {
            start,
            after,
            cyclic_pairs,
        }
    }

    /// The process-wide income-statement graph.
    pub fn standard() -> &'static TransitionGraph {
        &STANDARD
    }

    /// Returns a copy with the successor set for `key` replaced.
    pub fn with_successors(mut self, key: Predecessor, successors: CategorySet) -> Self {
        match key {
            Predecessor::Start => self.start = successors,
            Predecessor::After(c) => self.after[c.index()] = successors,
        }
        self
    }

    pub fn successors(&self, key: Predecessor) -> CategorySet {
        match key {
            Predecessor::Start => self.start,
            Predecessor::After(c) => self.after[c.index()],
        }
    }

    pub fn allows(&self, key: Predecessor, next: Category) -> bool {
        self.successors(key).contains(next)
    }

    pub fn cyclic_pairs(&self) -> &[(Category, Category)] {
        self.cyclic_pairs
    }

    /// Checks the table for keys with no successors, an incomplete start
    /// entry, and back edges that disagree with the declared cyclic pairs.
    pub fn verify(&self) -> Vec<GraphIssue> {
        let mut issues = Vec::new();

        if self.start.is_empty() {
            issues.push(GraphIssue::EmptySuccessors {
                key: Predecessor::Start,
            });
        }
        for category in Category::ALL {
            if !self.start.is_empty() && !self.start.contains(category) {
                issues.push(GraphIssue::StartMissing { category });
            }
        }
        for category in Category::ALL {
            if self.after[category.index()].is_empty() {
                issues.push(GraphIssue::EmptySuccessors {
                    key: Predecessor::After(category),
                });
            }
        }

        for &(a, b) in self.cyclic_pairs {
            let forward = self.allows(a.into(), b);
            let backward = self.allows(b.into(), a);
            if forward && !backward {
                issues.push(GraphIssue::AsymmetricCycle { from: a, to: b });
            } else if backward && !forward {
                issues.push(GraphIssue::AsymmetricCycle { from: b, to: a });
            }
        }

        for from in Category::ALL {
            for to in self.after[from.index()].iter().filter(|to| *to < from) {
                let declared = self
                    .cyclic_pairs
                    .iter()
                    .any(|&(a, b)| (a, b) == (to, from) || (a, b) == (from, to));
                if !declared {
                    issues.push(GraphIssue::UndeclaredBackEdge { from, to });
                }
            }
        }

        issues
    }
}
