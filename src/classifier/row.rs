use crate::scoring::Affinities;
use crate::statement::{Category, Predecessor, TransitionGraph};

/// What [`RowClassifier::classify`] decided for one position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowChoice {
    /// Best category that may legally follow the predecessor, if any.
    pub category: Option<Category>,
    /// Best unconstrained score minus best legal score. Infinite when no
    /// legal category is feasible.
    pub(crate) cost: f64,
}

/// Bounded-lookahead search for a single row.
///
/// Each candidate category is scored by its own affinity minus the cost of
/// committing to it, measured `lookahead` rows ahead. The cost propagated
/// upward is the price of obeying the transition graph rather than an
/// absolute path score, so the search is a truncated relaxation of Viterbi.
/// Work grows as `8^lookahead`.
pub struct RowClassifier<'a> {
    affinities: &'a [Affinities],
    graph: &'a TransitionGraph,
}

impl<'a> RowClassifier<'a> {
    pub fn new(affinities: &'a [Affinities], graph: &'a TransitionGraph) -> Self {
        Self { affinities, graph }
    }

    /// Chooses a category for the row at `position`.
    ///
    /// `lookahead` is clamped to the rows remaining after `position`.
    /// Panics if `position` is out of range.
    pub fn classify(&self, position: usize, previous: Predecessor, lookahead: usize) -> RowChoice {
        let lookahead = lookahead.min(self.affinities.len().saturating_sub(position + 1));
        let affinities = &self.affinities[position];
        let allowed = self.graph.successors(previous);

        let mut best: Option<f64> = None;
        let mut best_allowed: Option<(Category, f64)> = None;

        for category in Category::ALL {
            let future_cost = if lookahead == 0 {
                0.0
            } else {
                self.classify(position + 1, category.into(), lookahead - 1).cost
            };
            let score = affinities[category] - future_cost;
            if !score.is_finite() {
                continue;
            }

            if best.is_none_or(|b| score > b) {
                best = Some(score);
            }
            if allowed.contains(category) && best_allowed.is_none_or(|(_, b)| score > b) {
                best_allowed = Some((category, score));
            }
        }

        match (best, best_allowed) {
            (Some(best), Some((category, allowed))) => RowChoice {
                category: Some(category),
                cost: best - allowed,
            },
            _ => RowChoice {
                category: None,
                cost: f64::INFINITY,
            },
        }
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

    #[test]
    fn zero_lookahead_picks_best_legal_affinity() {
        let rows = peaked(&[OperatingRevenue]);
        let classifier = RowClassifier::new(&rows, TransitionGraph::standard());
        let choice = classifier.classify(0, Predecessor::Start, 0);
        assert_eq!(choice.category, Some(OperatingRevenue));
        assert_eq!(choice.cost, 0.0);
    }

    #[test]
    fn illegal_favourite_costs_the_gap() {
        let rows = vec![Affinities::peaked(OperatingRevenue, 5.0, 1.0)];
        let classifier = RowClassifier::new(&rows, TransitionGraph::standard());
        let choice = classifier.classify(0, Tax.into(), 0);
        assert_eq!(choice.category, Some(Tax));
        assert_eq!(choice.cost, 4.0);
    }

    #[test]
    fn ties_go_to_the_earlier_category() {
        let rows = vec![Affinities::default()];
        let classifier = RowClassifier::new(&rows, TransitionGraph::standard());
        assert_eq!(
            classifier.classify(0, OperatingExpense.into(), 0).category,
            Some(OperatingExpense)
        );
        assert_eq!(classifier.classify(0, Predecessor::Start, 0).category, Some(OperatingRevenue));
    }

    #[test]
    fn lookahead_avoids_a_dead_end() {
        // Row 0 slightly prefers Tax, but row 1 is strongly revenue-like and
        // Tax cannot be followed by anything earlier than Tax.
        let rows = vec![
            Affinities::peaked(Tax, 1.0, 0.9),
            Affinities::peaked(OperatingRevenue, 10.0, 0.0),
            Affinities::default(),
        ];
        let classifier = RowClassifier::new(&rows, TransitionGraph::standard());
        assert_eq!(classifier.classify(0, Predecessor::Start, 0).category, Some(Tax));
        assert_eq!(
            classifier.classify(0, Predecessor::Start, 1).category,
            Some(OperatingRevenue)
        );
    }

    #[test]
    fn lookahead_past_the_end_is_clamped() {
        let rows = peaked(&[OperatingRevenue, CostOfGoodsSold, Tax]);
        let classifier = RowClassifier::new(&rows, TransitionGraph::standard());
        for position in 0..rows.len() {
            let remaining = rows.len() - 1 - position;
            for previous in [Predecessor::Start, OperatingRevenue.into(), Tax.into()] {
                assert_eq!(
                    classifier.classify(position, previous, 4),
                    classifier.classify(position, previous, remaining)
                );
            }
        }
    }

    #[test]
    fn empty_successor_set_yields_no_choice() {
        let graph = TransitionGraph::standard()
            .clone()
            .with_successors(Tax.into(), CategorySet::EMPTY);
        let rows = peaked(&[Tax]);
        let classifier = RowClassifier::new(&rows, &graph);
        let choice = classifier.classify(0, Tax.into(), 0);
        assert_eq!(choice.category, None);
        assert!(choice.cost.is_infinite());
    }

    #[test]
    fn infeasible_future_is_never_chosen() {
        let graph = TransitionGraph::standard()
            .clone()
            .with_successors(Tax.into(), CategorySet::EMPTY);
        let rows = vec![Affinities::peaked(Tax, 5.0, 0.0), Affinities::default()];
        let classifier = RowClassifier::new(&rows, &graph);
        assert_eq!(
            classifier.classify(0, Predecessor::Start, 1).category,
            Some(OperatingRevenue)
        );
    }
}
