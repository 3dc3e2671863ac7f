mod category;
mod graph;

pub use category::{Category, CategorySet, Predecessor};
pub use graph::{GraphIssue, TransitionGraph};
