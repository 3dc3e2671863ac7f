use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::classifier::{MAX_LOOKAHEAD, SequenceDriver};
use crate::error::FincatError;
use crate::io::load_summary;
use crate::report::ClassificationReport;
use crate::scoring::AffinityScorer;
use crate::statement::TransitionGraph;
use crate::summary::Summary;

/// Classifies the rows of an income statement.
pub struct IncomeStatement<'g> {
    driver: SequenceDriver<'g>,
}

impl Default for IncomeStatement<'static> {
    fn default() -> Self {
        Self::new(TransitionGraph::standard())
    }
}

impl<'g> IncomeStatement<'g> {
    pub fn new(graph: &'g TransitionGraph) -> Self {
        Self {
            driver: SequenceDriver::new(graph),
        }
    }

    /// Labels every row but the last in place and returns a report.
    ///
    /// Lookahead is limited to [`MAX_LOOKAHEAD`] and to the number of rows
    /// after the first.
    pub fn classify<S: AffinityScorer + ?Sized>(
        &self,
        summary: &mut Summary,
        lookahead: usize,
        scorer: &S,
    ) -> Result<ClassificationReport, FincatError> {
        if summary.rows.is_empty() {
            return Err(FincatError::EmptyTable(summary.title.clone()));
        }
        let started_at = Utc::now();
        let lookahead = lookahead.min(MAX_LOOKAHEAD).min(summary.rows.len() - 1);

        let issues = self.driver.graph().verify();
        for issue in &issues {
            warn!(%issue, "transition graph needs review");
        }

        self.driver
            .classify_rows(&mut summary.rows, scorer, lookahead)?;
        info!(
            title = %summary.title,
            rows = summary.rows.len(),
            lookahead,
            "classified statement"
        );

        Ok(ClassificationReport::from_summary(
            summary, lookahead, issues, started_at,
        ))
    }
}

/// A statement after a successful pass.
#[derive(Debug, Clone)]
pub struct ClassifiedStatement {
    pub summary: Summary,
    pub report: ClassificationReport,
}

/// The result of classifying one file in a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub path: PathBuf,
    pub result: Result<ClassifiedStatement, FincatError>,
}

/// Loads and classifies one statement file.
pub fn classify_file<S: AffinityScorer + ?Sized>(
    path: &Path,
    lookahead: usize,
    scorer: &S,
) -> Result<ClassifiedStatement, FincatError> {
    let mut summary = load_summary(path)?;
    let report = IncomeStatement::default().classify(&mut summary, lookahead, scorer)?;
    Ok(ClassifiedStatement { summary, report })
}

/// Classifies independent statement files concurrently, one blocking worker
/// per file. `on_done` is called as each file finishes; outcomes are
/// returned in input order.
pub async fn classify_batch<S>(
    paths: &[PathBuf],
    lookahead: usize,
    scorer: Arc<S>,
    mut on_done: impl FnMut(&Path, bool),
) -> Vec<BatchOutcome>
where
    S: AffinityScorer + Send + Sync + 'static,
{
    let mut workers = JoinSet::new();
    let mut slots = HashMap::new();
    for (idx, path) in paths.iter().cloned().enumerate() {
        let scorer = Arc::clone(&scorer);
        let handle =
            workers.spawn_blocking(move || classify_file(&path, lookahead, scorer.as_ref()));
        slots.insert(handle.id(), idx);
    }

    let mut results: Vec<Option<Result<ClassifiedStatement, FincatError>>> =
        (0..paths.len()).map(|_| None).collect();
    while let Some(joined) = workers.join_next_with_id().await {
        let (id, result) = match joined {
            Ok((id, result)) => (id, result),
            Err(e) => {
                warn!(error = %e, "classification worker failed");
                (e.id(), Err(FincatError::Worker(e)))
            }
        };
        // Every spawned id was recorded above.
        let Some(&idx) = slots.get(&id) else {
            continue;
        };
        on_done(&paths[idx], result.is_ok());
        results[idx] = Some(result);
    }

    paths
        .iter()
        .zip(results)
        .filter_map(|(path, result)| {
            result.map(|result| BatchOutcome {
                path: path.clone(),
                result,
            })
        })
        .collect()
}
