//! The classification engine: a per-row bounded-lookahead search and the
//! driver that walks a statement top to bottom.

mod row;
mod sequence;

pub use row::{RowChoice, RowClassifier};
pub use sequence::{MAX_LOOKAHEAD, SequenceDriver, effective_lookahead};
