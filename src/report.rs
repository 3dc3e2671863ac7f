use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::statement::{Category, GraphIssue};
use crate::summary::Summary;

/// A row's label and the category it ended up with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRow {
    pub key: String,
    #[serde(rename = "type")]
    pub category: Option<Category>,
}

/// Structured record produced by one classification pass.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationReport {
    pub run_id: Uuid,
    pub title: String,
    pub lookahead: usize,
    pub rows: Vec<ClassifiedRow>,
    pub issues: Vec<GraphIssue>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl ClassificationReport {
    /// Generate a report from a classified summary.
    pub fn from_summary(
        summary: &Summary,
        lookahead: usize,
        issues: Vec<GraphIssue>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            title: summary.title.clone(),
            lookahead,
            rows: summary
                .rows
                .iter()
                .map(|r| ClassifiedRow {
                    key: r.key.clone(),
                    category: r.category,
                })
                .collect(),
            issues,
            started_at,
            completed_at: now,
            duration_ms: (now - started_at).num_milliseconds(),
        }
    }

    /// Number of rows carrying a category.
    pub fn classified(&self) -> usize {
        self.rows.iter().filter(|r| r.category.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::Row;

    #[test]
    fn report_from_summary() {
        let summary = Summary::new(
            "FY2012",
            vec![
                Row::new("Revenue", vec![Some(10.0)]).with_category(Category::OperatingRevenue),
                Row::new("Net income", vec![Some(3.0)]),
            ],
        );
        let record = ClassificationReport::from_summary(&summary, 1, Vec::new(), Utc::now());

        assert_eq!(record.title, "FY2012");
        assert_eq!(record.lookahead, 1);
        assert_eq!(record.classified(), 1);
        assert_eq!(record.rows[1].category, None);
        assert!(record.duration_ms >= 0);
        assert_eq!(record.run_id.get_version_num(), 4);
    }

    #[test]
    fn report_serializes_codes() {
        let summary = Summary::new(
            "",
            vec![Row::new("Tax", vec![]).with_category(Category::Tax)],
        );
        let record = ClassificationReport::from_summary(&summary, 0, Vec::new(), Utc::now());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["rows"][0]["type"], "tax");
        assert_eq!(json["run_id"], record.run_id.to_string());
    }
}
