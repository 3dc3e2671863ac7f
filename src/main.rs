use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use fincat::cli::{Cli, Command};
use fincat::config::{FincatConfig, OutputFormat};
use fincat::income::{IncomeStatement, classify_batch, classify_file};
use fincat::summary::{Row, Summary};
use fincat::{TransitionGraph, ui};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn demo_statement() -> Summary {
    Summary::new(
        "Demo Corp FY2012",
        vec![
            Row::new("Net sales", vec![Some(52_400_000.0), Some(48_100_000.0)]),
            Row::new("Cost of sales", vec![Some(-31_900_000.0), Some(-29_700_000.0)]),
            Row::new("Research and development", vec![Some(-4_100_000.0), Some(-3_800_000.0)]),
            Row::new(
                "Selling, general and administrative",
                vec![Some(-7_300_000.0), Some(-6_900_000.0)],
            ),
            Row::new("Other income, net", vec![Some(210_000.0), Some(150_000.0)]),
            Row::new("Interest expense", vec![Some(-640_000.0), Some(-700_000.0)]),
            Row::new("Provision for income taxes", vec![Some(-2_800_000.0), Some(-2_400_000.0)]),
            Row::new(
                "Net income attributable to noncontrolling interests",
                vec![Some(-90_000.0), Some(-80_000.0)],
            ),
            Row::new("Net income", vec![Some(5_180_000.0), Some(4_670_000.0)]),
        ],
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => FincatConfig::load_from(path)?,
        None => FincatConfig::load()?,
    };
    let lookahead = cli.lookahead.unwrap_or(config.lookahead);
    let json = cli.json || config.output == OutputFormat::Json;
    let scorer = config.scorer();

    match cli.command {
        Command::Classify { file, totals } => {
            let classified = classify_file(&file, lookahead, &scorer)?;
            if json {
                ui::print_report(&classified.report)?;
            } else {
                ui::print_statement(&classified.summary);
                if totals {
                    ui::print_totals(&classified.summary);
                }
            }
        }
        Command::Batch { files } => {
            let progress = ui::BatchProgress::start(files.len());
            let outcomes = classify_batch(&files, lookahead, Arc::new(scorer), |path, ok| {
                progress.finished(&path.display().to_string(), ok)
            })
            .await;
            progress.done();

            let mut failed = 0;
            for outcome in &outcomes {
                match &outcome.result {
                    Ok(classified) if json => ui::print_report(&classified.report)?,
                    Ok(classified) => ui::print_statement(&classified.summary),
                    Err(e) => {
                        error!(path = %outcome.path.display(), error = %e, "classification failed");
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                bail!("{failed} of {} statements failed", outcomes.len());
            }
        }
        Command::Graph => {
            let graph = TransitionGraph::standard();
            ui::print_graph(graph, &graph.verify());
        }
        Command::Demo => {
            let mut summary = demo_statement();
            let report = IncomeStatement::default().classify(&mut summary, lookahead, &scorer)?;
            summary.auto_scale();
            if json {
                ui::print_report(&report)?;
            } else {
                ui::print_statement(&summary);
                ui::print_totals(&summary);
            }
        }
    }

    Ok(())
}
