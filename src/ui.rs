//! Terminal output: classified statements, the transition table and batch
//! progress. Colours come from `console`, the progress bar from `indicatif`.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::report::ClassificationReport;
use crate::statement::{Category, GraphIssue, Predecessor, TransitionGraph};
use crate::summary::Summary;

/// Progress across the files of a batch run.
pub struct BatchProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
}

impl BatchProgress {
    pub fn start(total: usize) -> Self {
        let pb = ProgressBar::new(total as u64);
        // Template is a constant; fall back to the default bar if it is rejected.
        let template = ProgressStyle::default_bar().template("{bar:30.cyan} {pos}/{len} {msg}");
        if let Ok(style) = template {
            pb.set_style(style);
        }

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
        }
    }

    pub fn finished(&self, name: &str, ok: bool) {
        let mark = if ok {
            self.green.apply_to("✓")
        } else {
            self.red.apply_to("✗")
        };
        self.pb.println(format!("  {mark} {name}"));
        self.pb.inc(1);
    }

    pub fn done(&self) {
        self.pb.finish_and_clear();
    }
}

/// Prints a classified statement as a table of category, label and values.
pub fn print_statement(summary: &Summary) {
    let bold = Style::new().bold();
    let dim = Style::new().dim();
    let cyan = Style::new().cyan();

    println!("{}", bold.apply_to(&summary.title));
    let width = summary.rows.iter().map(|r| r.key.len()).max().unwrap_or(0);
    for row in &summary.rows {
        let tag = match row.category {
            Some(c) => cyan.apply_to(format!("{:<6}", c.code())),
            None => dim.apply_to(format!("{:<6}", "-")),
        };
        let vals: Vec<String> = row
            .vals
            .iter()
            .map(|v| match v {
                Some(v) => format!("{v:>12.2}"),
                None => format!("{:>12}", ""),
            })
            .collect();
        println!("  {tag} {:<width$} {}", row.key, vals.join(""));
    }
}

/// Prints per-category column totals for the classified rows.
pub fn print_totals(summary: &Summary) {
    let dim = Style::new().dim();
    println!("{}", dim.apply_to("─── Totals by category ───"));
    for category in Category::ALL {
        if summary.rows.iter().all(|r| r.category != Some(category)) {
            continue;
        }
        let totals: Vec<String> = summary
            .column_totals(category)
            .iter()
            .map(|t| format!("{t:>12.2}"))
            .collect();
        println!("  {:<34} {}", category.label(), totals.join(""));
    }
}

/// Prints the transition table and any verification issues.
pub fn print_graph(graph: &TransitionGraph, issues: &[GraphIssue]) {
    let bold = Style::new().bold();
    let yellow = Style::new().yellow();
    let red = Style::new().red().bold();

    let keys = std::iter::once(Predecessor::Start)
        .chain(Category::ALL.into_iter().map(Predecessor::After));
    for key in keys {
        let key_name = format!("{:<6}", key.to_string());
        println!("  {} -> {}", bold.apply_to(key_name), graph.successors(key));
    }

    let pairs: Vec<String> = graph
        .cyclic_pairs()
        .iter()
        .map(|(a, b)| format!("{a}/{b}"))
        .collect();
    println!("  cyclic pairs: {}", pairs.join(", "));

    if issues.is_empty() {
        println!("  {}", Style::new().green().apply_to("graph verified"));
    }
    for issue in issues {
        let style = if issue.is_fatal() { &red } else { &yellow };
        println!("  {} {issue}", style.apply_to("!"));
    }
}

/// Prints a report as pretty JSON.
pub fn print_report(report: &ClassificationReport) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
