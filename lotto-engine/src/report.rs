use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::simulation::{Rank, SimulationReport, SimulationStats};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub label: String,
    pub count: u64,
    /// Fraction of all tickets, 0..=1.
    pub share: f64,
    pub cost: u64,
    pub revenue: u64,
}

impl SummaryRow {
    pub fn profit(&self) -> i64 {
        self.revenue as i64 - self.cost as i64
    }
}

/// One row per rank, miss included, then a `Total` row.
pub fn summary_rows(stats: &SimulationStats) -> Vec<SummaryRow> {
    let iterations = stats.iterations();
    let price = if iterations == 0 { 0 } else { stats.cost / iterations };
    let share = |count: u64| if iterations == 0 { 0.0 } else { count as f64 / iterations as f64 };

    let mut rows: Vec<SummaryRow> = Rank::ALL
        .iter()
        .map(|&rank| {
            let count = stats.count(rank);
            SummaryRow {
                label: rank.label().to_string(),
                count,
                share: share(count),
                cost: count * price,
                revenue: stats.winnings[rank.index()],
            }
        })
        .collect();
    rows.push(SummaryRow {
        label: "Total".to_string(),
        count: iterations,
        share: share(iterations),
        cost: stats.cost,
        revenue: stats.revenue,
    });
    rows
}

/// `BatchID,1st,2nd,3rd,4th,5th,Miss,Cost,Revenue,Profit`, one line per batch.
pub fn write_batches_csv<W: Write>(report: &SimulationReport, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["BatchID".to_string()];
    header.extend(Rank::ALL.iter().map(|r| r.label().to_string()));
    header.extend(["Cost", "Revenue", "Profit"].map(String::from));
    wtr.write_record(&header)?;

    for batch in &report.batches {
        let stats = &batch.stats;
        let mut record = vec![(batch.batch + 1).to_string()];
        record.extend(stats.counts.iter().map(|c| c.to_string()));
        record.push(stats.cost.to_string());
        record.push(stats.revenue.to_string());
        record.push(stats.profit().to_string());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// `Rank,Count,Share,Cost,Revenue,Profit` from [`summary_rows`].
pub fn write_summary_csv<W: Write>(report: &SimulationReport, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Rank", "Count", "Share", "Cost", "Revenue", "Profit"])?;
    for row in summary_rows(&report.total) {
        wtr.write_record([
            row.label.clone(),
            row.count.to_string(),
            format!("{:.6}", row.share),
            row.cost.to_string(),
            row.revenue.to_string(),
            row.profit().to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `<stem>_batches.csv` and `<stem>_summary.csv` into `dir`.
pub fn export_csv(report: &SimulationReport, dir: &Path, stem: &str) -> Result<(std::path::PathBuf, std::path::PathBuf)> {
    std::fs::create_dir_all(dir).with_context(|| format!("Cannot create directory {:?}", dir))?;
    let batches_path = dir.join(format!("{stem}_batches.csv"));
    let summary_path = dir.join(format!("{stem}_summary.csv"));

    let file = std::fs::File::create(&batches_path)
        .with_context(|| format!("Cannot create {:?}", batches_path))?;
    write_batches_csv(report, file)?;
    let file = std::fs::File::create(&summary_path)
        .with_context(|| format!("Cannot create {:?}", summary_path))?;
    write_summary_csv(report, file)?;

    Ok((batches_path, summary_path))
}
