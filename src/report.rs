//! Reporting for colony runs.
//!
//! Turns a finished [`ColonyRun`] into labelled per-ant rows, summary statistics,
//! terminal text, CSV and JSON. Nothing in the engine depends on this module.

use crate::colony::{AntOutcome, ColonyRun, TrailMatrix};
use crate::error::ColonyResult;
use crate::instance::{station_label, ColonyInstance};
use crate::solution::TourStatus;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fs::File;
use std::path::Path;

/// Join station labels with dashes, e.g. `A-C-B-A`.
pub fn format_route(route: &[usize]) -> String {
    route.iter().map(|&s| station_label(s)).collect::<Vec<_>>().join("-")
}

/// Trail matrix as an aligned table with station labels on both axes.
pub fn format_matrix(trail: &TrailMatrix) -> String {
    let n = trail.dimension();
    let labels: Vec<String> = (0..n).map(station_label).collect();
    let width = 10;

    let mut out = String::new();
    out.push_str(&format!("{:>5}", ""));
    for label in &labels {
        out.push_str(&format!(" {:>width$}", label, width = width));
    }
    out.push('\n');

    for (i, label) in labels.iter().enumerate() {
        out.push_str(&format!("{:>5}", label));
        for value in trail.row(i) {
            out.push_str(&format!(" {:>width$.4}", value, width = width));
        }
        out.push('\n');
    }
    out
}

/// One ant, flattened for CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AntRow {
    /// 1-based ant number
    pub ant: usize,
    pub route: String,
    /// complete, partial or skipped
    pub status: String,
    pub total_distance: Option<f64>,
    pub deposit: Option<f64>,
    /// Decay factor applied before this ant
    pub evaporated: Option<f64>,
}

/// Aggregated figures over the ants whose deposit was applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub ants: usize,
    pub complete: usize,
    pub partial: usize,
    pub skipped: usize,
    pub mean_distance: Option<f64>,
    pub std_distance: Option<f64>,
    pub min_distance: Option<f64>,
    pub max_distance: Option<f64>,
}

impl RunSummary {
    fn from_run(run: &ColonyRun) -> Self {
        let distances: Vec<f64> = run.results().map(|r| r.total_distance).collect();
        let complete = run.results().filter(|r| r.status.is_complete()).count();

        let (mean_distance, std_distance, min_distance, max_distance) = if distances.is_empty() {
            (None, None, None, None)
        } else {
            let std = if distances.len() > 1 { distances.iter().std_dev() } else { 0.0 };
            (
                Some(distances.iter().mean()),
                Some(std),
                Some(distances.iter().cloned().fold(f64::INFINITY, f64::min)),
                Some(distances.iter().cloned().fold(0.0, f64::max)),
            )
        };

        RunSummary {
            ants: run.steps.len(),
            complete,
            partial: distances.len() - complete,
            skipped: run.skipped(),
            mean_distance,
            std_distance,
            min_distance,
            max_distance,
        }
    }
}

/// Report over a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub instance: String,
    pub generated_at: String,
    pub start: String,
    pub evaporation: String,
    pub rows: Vec<AntRow>,
    pub summary: RunSummary,
    /// Trail matrix after each ant
    pub trails: Vec<TrailMatrix>,
}

impl RunReport {
    pub fn new(instance: &ColonyInstance, run: &ColonyRun) -> Self {
        let rows = run
            .steps
            .iter()
            .map(|step| match &step.outcome {
                AntOutcome::Deposited(result) => AntRow {
                    ant: step.ant + 1,
                    route: format_route(&result.route),
                    status: match result.status {
                        TourStatus::Complete => "complete".to_string(),
                        TourStatus::Partial { .. } => "partial".to_string(),
                    },
                    total_distance: Some(result.total_distance),
                    deposit: Some(result.deposit),
                    evaporated: step.evaporated,
                },
                AntOutcome::DepositSkipped { route, .. } => AntRow {
                    ant: step.ant + 1,
                    route: format_route(route),
                    status: "skipped".to_string(),
                    total_distance: None,
                    deposit: None,
                    evaporated: step.evaporated,
                },
            })
            .collect();

        RunReport {
            instance: instance.name.clone(),
            generated_at: chrono::Local::now().to_rfc3339(),
            start: station_label(run.start),
            evaporation: run.schedule.clone(),
            rows,
            summary: RunSummary::from_run(run),
            trails: run.steps.iter().map(|s| s.trail.clone()).collect(),
        }
    }

    /// Text for the terminal; `verbose` adds the trail matrix after every ant.
    pub fn render_text(&self, verbose: bool) -> String {
        let mut report = String::new();

        for (row, trail) in self.rows.iter().zip(self.trails.iter()) {
            report.push_str(&format!("\nAnt {}", row.ant));
            if let Some(decay) = row.evaporated {
                report.push_str(&format!(" (trails evaporated x{})", decay));
            }
            report.push('\n');

            match (row.total_distance, row.deposit) {
                (Some(distance), Some(deposit)) => {
                    report.push_str(&format!("  Route: {}{}\n", row.route,
                        if row.status == "partial" { " [partial]" } else { "" }));
                    report.push_str(&format!("  Total distance: {:.2}\n", distance));
                    report.push_str(&format!("  Deposit: {:.4}\n", deposit));
                }
                _ => {
                    report.push_str(&format!("  Route: {} [zero length, deposit skipped]\n", row.route));
                }
            }

            if verbose {
                report.push_str("  Trail matrix:\n");
                for line in format_matrix(trail).lines() {
                    report.push_str("    ");
                    report.push_str(line);
                    report.push('\n');
                }
            }
        }

        let s = &self.summary;
        report.push('\n');
        report.push_str("-".repeat(50).as_str());
        report.push('\n');
        report.push_str(&format!("Ants: {} (complete {}, partial {}, skipped {})\n",
            s.ants, s.complete, s.partial, s.skipped));
        report.push_str(&format!("Evaporation: {}\n", self.evaporation));
        if let (Some(mean), Some(std), Some(min), Some(max)) =
            (s.mean_distance, s.std_distance, s.min_distance, s.max_distance)
        {
            report.push_str(&format!("Distance: mean {:.2}, std {:.2}, min {:.2}, max {:.2}\n",
                mean, std, min, max));
        }
        report
    }

    /// Export one row per ant to CSV
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> ColonyResult<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for row in &self.rows {
            writer.serialize(row)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export the whole report, trail snapshots included, as JSON
    pub fn export_json<P: AsRef<Path>>(&self, path: P) -> ColonyResult<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
