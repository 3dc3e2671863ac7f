//! Affinity scoring: how well a line-item label matches each category.
//!
//! The classifier only needs an [`Affinities`] vector per row. Where those
//! numbers come from is up to the caller: [`KeywordScorer`] sums weighted
//! keyword hits, [`RecordedScorer`] replays scores supplied with the input,
//! and any `Fn(&str) -> Affinities` closure works too.

use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::statement::Category;

/// One score per category, higher meaning a better match.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Affinities([f64; Category::COUNT]);

impl Affinities {
    pub const fn new(scores: [f64; Category::COUNT]) -> Self {
        Self(scores)
    }

    /// `high` for `category`, `low` for every other category.
    pub fn peaked(category: Category, high: f64, low: f64) -> Self {
        let mut scores = [low; Category::COUNT];
        scores[category.index()] = high;
        Self(scores)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.into_iter().map(|c| (c, self.0[c.index()]))
    }

    /// The best-scoring category; ties go to the earlier category.
    pub fn best(&self) -> Category {
        let mut best = Category::ALL[0];
        for (category, score) in self.iter() {
            if score > self[best] {
                best = category;
            }
        }
        best
    }
}

impl Index<Category> for Affinities {
    type Output = f64;

    fn index(&self, category: Category) -> &f64 {
        &self.0[category.index()]
    }
}

impl IndexMut<Category> for Affinities {
    fn index_mut(&mut self, category: Category) -> &mut f64 {
        &mut self.0[category.index()]
    }
}

// Serialized as a `{code: score}` map. Missing categories deserialize to 0.
impl Serialize for Affinities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for Affinities {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = HashMap::<String, f64>::deserialize(deserializer)?;
        let mut affinities = Affinities::default();
        for (code, score) in map {
            let category: Category = code.parse().map_err(serde::de::Error::custom)?;
            if !score.is_finite() {
                return Err(serde::de::Error::custom(format!(
                    "affinity for {category} must be finite"
                )));
            }
            affinities[category] = score;
        }
        Ok(affinities)
    }
}

/// Produces affinities from a line-item label.
///
/// Implementations must return a finite score for every category, including
/// ones that will turn out to be illegal at a given position.
pub trait AffinityScorer {
    fn affinities(&self, label: &str) -> Affinities;
}

impl<F> AffinityScorer for F
where
    F: Fn(&str) -> Affinities,
{
    fn affinities(&self, label: &str) -> Affinities {
        self(label)
    }
}

/// A keyword that adds `weight` to `category` when found in a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub category: Category,
    #[serde(deserialize_with = "finite_weight")]
    pub weight: f64,
}

fn finite_weight<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let weight = f64::deserialize(deserializer)?;
    if weight.is_finite() {
        Ok(weight)
    } else {
        Err(serde::de::Error::custom(format!(
            "keyword weight must be finite, got {weight}"
        )))
    }
}

impl KeywordRule {
    pub fn new(keyword: &str, category: Category, weight: f64) -> Self {
        Self {
            keyword: keyword.to_lowercase(),
            category,
            weight,
        }
    }
}

/// Weighted keyword scoring over lowercased labels.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    rules: Vec<KeywordRule>,
}

impl KeywordScorer {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| KeywordRule {
                keyword: r.keyword.to_lowercase(),
                ..r
            })
            .collect();
        Self { rules }
    }
}

impl Default for KeywordScorer {
    fn default() -> Self {
        use Category::*;

        let table: &[(&str, Category, f64)] = &[
            ("revenue", OperatingRevenue, 10.0),
            ("sales", OperatingRevenue, 8.0),
            ("cost of", CostOfGoodsSold, 10.0),
            ("cost of goods", CostOfGoodsSold, 5.0),
            ("cost of sales", CostOfGoodsSold, 5.0),
            ("cost of revenue", CostOfGoodsSold, 5.0),
            ("gross", CostOfGoodsSold, 3.0),
            ("selling", OperatingExpense, 7.0),
            ("administrative", OperatingExpense, 7.0),
            ("research", OperatingExpense, 7.0),
            ("depreciation", OperatingExpense, 5.0),
            ("operating expense", OperatingExpense, 8.0),
            ("operating income", OperatingIncomeBeforeTax, 8.0),
            ("other income", OperatingIncomeBeforeTax, 6.0),
            ("interest", FinancingIncomeBeforeTax, 8.0),
            ("investment income", FinancingIncomeBeforeTax, 6.0),
            ("before income tax", OperatingIncomeBeforeTax, 4.0),
            ("tax", Tax, 10.0),
            ("before income tax", Tax, -8.0),
            ("discontinued", OtherOperatingIncomeAfterTax, 8.0),
            ("equity in", OtherOperatingIncomeAfterTax, 6.0),
            ("minority", FinancingIncomeAfterTax, 8.0),
            ("noncontrolling", FinancingIncomeAfterTax, 8.0),
            ("net income", FinancingIncomeAfterTax, 4.0),
        ];

        Self::new(
            table
                .iter()
                .map(|&(keyword, category, weight)| KeywordRule::new(keyword, category, weight))
                .collect(),
        )
    }
}

impl AffinityScorer for KeywordScorer {
    fn affinities(&self, label: &str) -> Affinities {
        let lower = label.to_lowercase();
        let mut scores = Affinities::default();

        for rule in &self.rules {
            if lower.contains(&rule.keyword) {
                scores[rule.category] += rule.weight;
            }
        }

        scores
    }
}

/// Replays affinities recorded per label, deferring to `fallback` for
/// labels without a recording.
#[derive(Debug, Clone)]
pub struct RecordedScorer<S> {
    recorded: HashMap<String, Affinities>,
    fallback: S,
}

impl<S: AffinityScorer> RecordedScorer<S> {
    pub fn new(fallback: S) -> Self {
        Self {
            recorded: HashMap::new(),
            fallback,
        }
    }

    pub fn record(&mut self, label: impl Into<String>, affinities: Affinities) {
        self.recorded.insert(label.into(), affinities);
    }

    pub fn len(&self) -> usize {
        self.recorded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recorded.is_empty()
    }
}

impl<S: AffinityScorer> AffinityScorer for RecordedScorer<S> {
    fn affinities(&self, label: &str) -> Affinities {
        match self.recorded.get(label) {
            Some(a) => *a,
            None => self.fallback.affinities(label),
        }
    }
}
