//! Tabular container for a derived statement: labelled rows of value
//! columns, each row optionally tagged with a [`Category`].

use std::collections::HashMap;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::scoring::Affinities;
use crate::statement::Category;

/// One line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub key: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default)]
    pub vals: Vec<Option<f64>>,
    /// Affinities supplied with the input, used instead of the scorer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<Affinities>,
}

impl Row {
    pub fn new(key: impl Into<String>, vals: Vec<Option<f64>>) -> Self {
        Self {
            key: key.into(),
            category: None,
            vals,
            scores: None,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_scores(mut self, scores: Affinities) -> Self {
        self.scores = Some(scores);
        self
    }

    /// Present values, in column order.
    pub fn valid_vals(&self) -> Vec<f64> {
        self.vals.iter().flatten().copied().collect()
    }
}

/// A titled table of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub rows: Vec<Row>,
}

/// Unit applied by [`Summary::auto_scale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Units,
    Thousands,
    Millions,
}

impl Scale {
    pub fn divisor(self) -> f64 {
        match self {
            Scale::Units => 1.0,
            Scale::Thousands => 1_000.0,
            Scale::Millions => 1_000_000.0,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Scale::Units => "",
            Scale::Thousands => " ($KK)",
            Scale::Millions => " ($MM)",
        }
    }
}

impl Summary {
    pub fn new(title: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            title: title.into(),
            rows,
        }
    }

    /// Rows tagged with `category`, under the same title.
    pub fn filter_by_category(&self, category: Category) -> Summary {
        Summary {
            title: self.title.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| r.category == Some(category))
                .cloned()
                .collect(),
        }
    }

    /// Width of the table: the longest row's number of values.
    pub fn num_value_columns(&self) -> usize {
        self.rows.iter().map(|r| r.vals.len()).max().unwrap_or(0)
    }

    /// Inserts an empty cell at `col` in every row. Rows shorter than `col`
    /// are padded with empty cells first.
    pub fn insert_column_before(&mut self, col: usize) {
        for row in &mut self.rows {
            if row.vals.len() < col {
                row.vals.resize(col, None);
            }
            row.vals.insert(col, None);
        }
    }

    /// Picks a unit from the smallest non-zero magnitude in the table,
    /// divides every value by it and tags every key with the unit.
    pub fn auto_scale(&mut self) -> Scale {
        let min_abs = self
            .rows
            .iter()
            .flat_map(|r| r.vals.iter().flatten())
            .map(|v| v.abs())
            .filter(|v| *v > 0.0)
            .fold(f64::INFINITY, f64::min);

        let scale = if min_abs == f64::INFINITY {
            Scale::Units
        } else if min_abs >= 1_000_000.0 {
            Scale::Millions
        } else if min_abs >= 1_000.0 {
            Scale::Thousands
        } else {
            Scale::Units
        };

        if scale != Scale::Units {
            for row in &mut self.rows {
                for v in row.vals.iter_mut().flatten() {
                    *v /= scale.divisor();
                }
                row.key.push_str(scale.suffix());
            }
        }
        scale
    }

    /// Column-wise sums over the rows tagged with `category`.
    pub fn column_totals(&self, category: Category) -> Vec<f64> {
        let mut totals = vec![0.0; self.num_value_columns()];
        for row in self.rows.iter().filter(|r| r.category == Some(category)) {
            for (total, v) in totals.iter_mut().zip(&row.vals) {
                *total += v.unwrap_or(0.0);
            }
        }
        totals
    }

    /// Joins two tables side by side, one row per unique key.
    ///
    /// Each row holds this table's values followed by `other`'s; a side
    /// missing the key contributes empty cells for its full width. Rows come
    /// in `other`'s order, then keys only found here, in this table's order.
    pub fn merge(&self, other: &Summary) -> Summary {
        let left_width = self.num_value_columns();
        let right_width = other.num_value_columns();

        let left: HashMap<&str, &Row> = self.rows.iter().map(|r| (r.key.as_str(), r)).collect();
        let right: HashMap<&str, &Row> = other.rows.iter().map(|r| (r.key.as_str(), r)).collect();

        let mut keys: Vec<&str> = Vec::new();
        for key in other.rows.iter().chain(&self.rows).map(|r| r.key.as_str()) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        let rows = keys
            .into_iter()
            .map(|key| {
                let l = left.get(key);
                let r = right.get(key);
                let mut vals = match l {
                    Some(row) => padded(&row.vals, left_width),
                    None => vec![None; left_width],
                };
                vals.extend(match r {
                    Some(row) => row.vals.clone(),
                    None => vec![None; right_width],
                });
                Row {
                    key: key.to_string(),
                    category: l.and_then(|row| row.category).or(r.and_then(|row| row.category)),
                    vals,
                    scores: None,
                }
            })
            .collect();

        Summary {
            title: self.title.clone(),
            rows,
        }
    }
}

// Left-hand rows are padded so the right-hand columns line up.
fn padded(vals: &[Option<f64>], width: usize) -> Vec<Option<f64>> {
    let mut out = vals.to_vec();
    if out.len() < width {
        out.resize(width, None);
    }
    out
}

impl Add for &Summary {
    type Output = Summary;

    fn add(self, other: &Summary) -> Summary {
        self.merge(other)
    }
}
