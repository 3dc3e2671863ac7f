//! Section labelling for income-statement line items.
//!
//! Each row of a derived income statement is assigned a [`Category`]
//! (revenue, cost of goods sold, tax, ...) by a bounded-lookahead search
//! that only ever moves along the edges of a fixed [`TransitionGraph`].
//! The final row of a statement is a boundary and stays unclassified.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod income;
pub mod io;
pub mod report;
pub mod scoring;
pub mod statement;
pub mod summary;
pub mod ui;

pub use classifier::{MAX_LOOKAHEAD, RowChoice, RowClassifier, SequenceDriver};
pub use error::{ClassifyError, FincatError};
pub use income::IncomeStatement;
pub use scoring::{Affinities, AffinityScorer, KeywordScorer};
pub use statement::{Category, Predecessor, TransitionGraph};
pub use summary::{Row, Summary};
