use tracing::debug;

use super::row::RowClassifier;
use crate::error::ClassifyError;
use crate::scoring::{Affinities, AffinityScorer};
use crate::statement::{Category, Predecessor, TransitionGraph};
use crate::summary::Row;

/// Upper bound on lookahead, whatever the caller asks for.
pub const MAX_LOOKAHEAD: usize = 4;

/// Lookahead actually used at `idx` in a sequence of `len` rows: never past
/// the final row and never above [`MAX_LOOKAHEAD`].
pub fn effective_lookahead(requested: usize, len: usize, idx: usize) -> usize {
    requested
        .min(MAX_LOOKAHEAD)
        .min(len.saturating_sub(idx + 1))
}

/// Walks a row sequence left to right, classifying every row but the last.
///
/// The final row is a boundary: nothing remains to look ahead into, and it
/// is left without a category (typically a total line).
pub struct SequenceDriver<'g> {
    graph: &'g TransitionGraph,
}

impl Default for SequenceDriver<'static> {
    fn default() -> Self {
        Self::new(TransitionGraph::standard())
    }
}

impl<'g> SequenceDriver<'g> {
    pub fn new(graph: &'g TransitionGraph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &TransitionGraph {
        self.graph
    }

    /// Labels positions `0..len-1` of a sequence given each row's affinities.
    pub fn label(
        &self,
        affinities: &[Affinities],
        lookahead: usize,
    ) -> Result<Vec<Category>, ClassifyError> {
        let classifier = RowClassifier::new(affinities, self.graph);
        let len = affinities.len();
        let mut labels = Vec::with_capacity(len.saturating_sub(1));
        let mut previous = Predecessor::Start;

        for idx in 0..len.saturating_sub(1) {
            let lookahead = effective_lookahead(lookahead, len, idx);
            let category = classifier
                .classify(idx, previous, lookahead)
                .category
                .ok_or(ClassifyError::Unclassifiable {
                    position: idx,
                    previous,
                })?;

            debug!(position = idx, %previous, %category, lookahead, "classified row");
            labels.push(category);
            previous = category.into();
        }

        Ok(labels)
    }

    /// Classifies `rows` in place.
    ///
    /// Rows carrying their own `scores` use them; the rest are scored by
    /// `scorer`. On failure no row is modified.
    pub fn classify_rows<S: AffinityScorer + ?Sized>(
        &self,
        rows: &mut [Row],
        scorer: &S,
        lookahead: usize,
    ) -> Result<(), ClassifyError> {
        let affinities: Vec<Affinities> = rows
            .iter()
            .map(|row| row.scores.unwrap_or_else(|| scorer.affinities(&row.key)))
            .collect();

        let labels = self.label(&affinities, lookahead)?;

        for (row, category) in rows.iter_mut().zip(labels) {
            row.category = Some(category);
        }
        if let Some(last) = rows.last_mut() {
            last.category = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::CategorySet;
    use Category::*;

    fn peaked(categories: &[Category]) -> Vec<Affinities> {
        categories.iter().map(|c| Affinities::peaked(*c, 1.0, 0.0)).collect()
    }

    // Peaked rows followed by a flat sentinel row.
    fn with_sentinel(categories: &[Category]) -> Vec<Affinities> {
        let mut rows = peaked(categories);
        rows.push(Affinities::default());
        rows
    }

    // Deterministic pseudo-random affinities in [-1, 1).
    fn noisy(len: usize, seed: u64) -> Vec<Affinities> {
        let mut state = seed;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) as f64 / (1u64 << 31) as f64) * 2.0 - 1.0
        };
        (0..len)
            .map(|_| {
                let mut scores = [0.0; Category::COUNT];
                for s in &mut scores {
                    *s = next();
                }
                Affinities::new(scores)
            })
            .collect()
    }

    #[test]
    fn effective_lookahead_clamps() {
        assert_eq!(effective_lookahead(2, 5, 0), 2);
        assert_eq!(effective_lookahead(2, 5, 3), 1);
        assert_eq!(effective_lookahead(9, 20, 0), MAX_LOOKAHEAD);
        assert_eq!(effective_lookahead(3, 1, 0), 0);
    }

    #[test]
    fn concrete_statement_scenario() {
        let rows = with_sentinel(&[OperatingRevenue, CostOfGoodsSold, OperatingExpense, Tax]);
        let labels = SequenceDriver::default().label(&rows, 2).unwrap();
        assert_eq!(labels, vec![OperatingRevenue, CostOfGoodsSold, OperatingExpense, Tax]);
    }

    #[test]
    fn monotone_sequence_is_recovered() {
        let rows = with_sentinel(&Category::ALL);
        for lookahead in 1..=3 {
            let labels = SequenceDriver::default().label(&rows, lookahead).unwrap();
            assert_eq!(labels, Category::ALL.to_vec(), "lookahead {lookahead}");
        }
    }

    #[test]
    fn after_tax_cyclic_pair_alternates() {
        let truth = [
            OtherOperatingIncomeAfterTax,
            FinancingIncomeAfterTax,
            OtherOperatingIncomeAfterTax,
            FinancingIncomeAfterTax,
        ];
        let rows = with_sentinel(&truth);
        for lookahead in 0..=2 {
            let labels = SequenceDriver::default().label(&rows, lookahead).unwrap();
            assert_eq!(labels, truth.to_vec(), "lookahead {lookahead}");
        }
    }

    #[test]
    fn repaired_pretax_pair_alternates() {
        let graph = TransitionGraph::standard().clone().with_successors(
            FinancingIncomeBeforeTax.into(),
            CategorySet::of(&[
                OperatingIncomeBeforeTax,
                FinancingIncomeBeforeTax,
                Tax,
                OtherOperatingIncomeAfterTax,
                FinancingIncomeAfterTax,
            ]),
        );
        let truth = [
            OperatingIncomeBeforeTax,
            FinancingIncomeBeforeTax,
            OperatingIncomeBeforeTax,
        ];
        let labels = SequenceDriver::new(&graph).label(&with_sentinel(&truth), 2).unwrap();
        assert_eq!(labels, truth.to_vec());
    }

    #[test]
    fn standard_pretax_pair_does_not_return() {
        let truth = [
            OperatingIncomeBeforeTax,
            FinancingIncomeBeforeTax,
            OperatingIncomeBeforeTax,
        ];
        let labels = SequenceDriver::default().label(&with_sentinel(&truth), 0).unwrap();
        assert_eq!(
            labels,
            vec![
                OperatingIncomeBeforeTax,
                FinancingIncomeBeforeTax,
                FinancingIncomeBeforeTax
            ]
        );
    }

    #[test]
    fn every_label_is_a_legal_successor() {
        let driver = SequenceDriver::default();
        for seed in 1..20 {
            let rows = noisy(12, seed);
            for lookahead in 0..=3 {
                let labels = driver.label(&rows, lookahead).unwrap();
                assert_eq!(labels.len(), rows.len() - 1);
                let mut previous = Predecessor::Start;
                for label in labels {
                    assert!(driver.graph().allows(previous, label), "seed {seed}");
                    previous = label.into();
                }
            }
        }
    }

    #[test]
    fn classification_is_deterministic() {
        let driver = SequenceDriver::default();
        let rows = noisy(10, 42);
        assert_eq!(driver.label(&rows, 3).unwrap(), driver.label(&rows, 3).unwrap());
    }

    #[test]
    fn requested_lookahead_matches_clamped() {
        let driver = SequenceDriver::default();
        let rows = noisy(3, 7);
        assert_eq!(driver.label(&rows, 4).unwrap(), driver.label(&rows, 2).unwrap());
        let rows = noisy(9, 7);
        assert_eq!(driver.label(&rows, 50).unwrap(), driver.label(&rows, 4).unwrap());
    }

    #[test]
    fn short_sequences_are_noops() {
        let driver = SequenceDriver::default();
        assert!(driver.label(&[], 2).unwrap().is_empty());
        assert!(driver.label(&peaked(&[Tax]), 2).unwrap().is_empty());
    }

    #[test]
    fn empty_successor_set_is_fatal() {
        let graph = TransitionGraph::standard()
            .clone()
            .with_successors(Tax.into(), CategorySet::EMPTY);
        let rows = with_sentinel(&[Tax, Tax]);
        let err = SequenceDriver::new(&graph).label(&rows, 0).unwrap_err();
        assert_eq!(
            err,
            ClassifyError::Unclassifiable {
                position: 1,
                previous: Tax.into(),
            }
        );
    }

    #[test]
    fn forced_dead_end_is_fatal_with_lookahead() {
        let graph = TransitionGraph::standard()
            .clone()
            .with_successors(Predecessor::Start, CategorySet::of(&[Tax]))
            .with_successors(Tax.into(), CategorySet::EMPTY);
        let rows = with_sentinel(&[Tax, Tax]);
        let err = SequenceDriver::new(&graph).label(&rows, 2).unwrap_err();
        assert_eq!(
            err,
            ClassifyError::Unclassifiable {
                position: 0,
                previous: Predecessor::Start,
            }
        );
    }

    #[test]
    fn classify_rows_leaves_final_row_unclassified() {
        let mut rows = vec![
            Row::new("Net sales", vec![Some(100.0)]),
            Row::new("Cost of sales", vec![Some(-60.0)]),
            Row::new("Provision for income taxes", vec![Some(-10.0)]),
            Row::new("Net income", vec![Some(30.0)]).with_category(FinancingIncomeAfterTax),
        ];
        SequenceDriver::default()
            .classify_rows(&mut rows, &crate::scoring::KeywordScorer::default(), 4)
            .unwrap();
        let categories: Vec<_> = rows.iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            vec![Some(OperatingRevenue), Some(CostOfGoodsSold), Some(Tax), None]
        );
    }

    #[test]
    fn classify_rows_prefers_recorded_scores() {
        let mut rows = vec![
            Row::new("Mystery line", vec![])
                .with_scores(Affinities::peaked(OperatingExpense, 2.0, 0.0)),
            Row::new("Total", vec![]),
        ];
        let scorer = |_: &str| Affinities::default();
        SequenceDriver::default().classify_rows(&mut rows, &scorer, 1).unwrap();
        assert_eq!(rows[0].category, Some(OperatingExpense));
    }

    #[test]
    fn failed_pass_leaves_rows_untouched() {
        let graph = TransitionGraph::standard()
            .clone()
            .with_successors(Tax.into(), CategorySet::EMPTY);
        let mut rows = vec![
            Row::new("a", vec![]).with_scores(Affinities::peaked(Tax, 1.0, 0.0)),
            Row::new("b", vec![]).with_scores(Affinities::peaked(Tax, 1.0, 0.0)),
            Row::new("c", vec![]),
        ];
        let scorer = |_: &str| Affinities::default();
        let result = SequenceDriver::new(&graph).classify_rows(&mut rows, &scorer, 0);
        assert!(result.is_err());
        assert!(rows.iter().all(|r| r.category.is_none()));
    }
}
