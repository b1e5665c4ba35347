use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use lotto_history::Draw;

use crate::audit::{AcDistribution, KillBacktest, RuleSurvival};
use crate::candidate::Candidate;
use crate::exclusion::ExclusionSet;
use crate::predictor::PredictionResult;
use crate::report::summary_rows;
use crate::score::ScoreEntry;
use crate::simulation::{Rank, SimulationReport};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn join_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

/// Thousands separated with commas.
pub fn format_won(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if amount < 0 { format!("-{out}") } else { out }
}

pub fn display_history(draws: &[Draw]) {
    println!("\n== Draw history ({} draws) ==\n", draws.len());

    let mut table = new_table();
    table.set_header(vec!["Draw", "Date", "Numbers", "Bonus", "1st prize"]);
    for draw in draws {
        table.add_row(vec![
            Cell::new(draw.draw_id),
            Cell::new(draw.date.map(|d| d.to_string()).unwrap_or_else(|| "—".to_string())),
            Cell::new(join_numbers(&draw.numbers)).fg(Color::Green),
            Cell::new(draw.bonus).fg(Color::Yellow),
            Cell::new(draw.first_prize.map(|p| format_won(p as i64)).unwrap_or_else(|| "—".to_string())),
        ]);
    }
    println!("{table}");
}

pub fn display_prediction(result: &PredictionResult, scores: &[ScoreEntry]) {
    println!("\n== Prediction ==\n");

    let mut table = new_table();
    table.set_header(vec!["Numbers", "Sum", "AC", "Odd:Even", "Attempts"]);
    let color = if result.fallback { Color::Yellow } else { Color::Green };
    let odd = result.numbers.odd_count();
    table.add_row(vec![
        Cell::new(result.numbers.to_string()).fg(color),
        Cell::new(result.numbers.sum()),
        Cell::new(result.numbers.ac()),
        Cell::new(format!("{}:{}", odd, 6 - odd)),
        Cell::new(result.attempts),
    ]);
    println!("{table}");

    if result.fallback {
        println!("  Retry budget exhausted: these numbers did not pass every filter.");
    }

    println!("\n── Analysis ──");
    for line in &result.analysis {
        println!("  - {line}");
    }

    println!("\n── Scores ──");
    let mut table = new_table();
    table.set_header(vec!["Number", "Score"]);
    for entry in scores {
        table.add_row(vec![format!("{:2}", entry.number), entry.score.to_string()]);
    }
    println!("{table}");
}

pub fn display_scores(entries: &[ScoreEntry], top: Option<usize>) {
    println!("\n== Scores ==\n");

    let mut table = new_table();
    table.set_header(vec!["#", "Number", "Score", "Status"]);
    let shown = top.unwrap_or(entries.len());
    for (i, entry) in entries.iter().take(shown).enumerate() {
        let status = if entry.excluded {
            Cell::new("excluded").fg(Color::Red)
        } else {
            Cell::new("")
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(format!("{:2}", entry.number)),
            Cell::new(entry.score),
            status,
        ]);
    }
    println!("{table}");
}

pub fn display_exclusions(set: &ExclusionSet) {
    println!("\n== Kill list ==\n");

    if set.kills().is_empty() {
        println!("  (empty)");
    } else {
        let mut table = new_table();
        table.set_header(vec!["#", "Number", "Reason"]);
        for (i, kill) in set.kills().iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(format!("{:2}", kill.number)).fg(Color::Red),
                Cell::new(kill.reason()),
            ]);
        }
        println!("{table}");
    }

    if !set.streak().is_empty() {
        println!("\n── Streak guard ──");
        println!("  {}", join_numbers(set.streak()));
    }

    if !set.previews().is_empty() {
        println!("\n── Challenge rules (applied from K=5) ──");
        let mut table = new_table();
        table.set_header(vec!["Number", "Rule", "Applied"]);
        for preview in set.previews() {
            let applied = set.is_killed(preview.number);
            table.add_row(vec![
                Cell::new(format!("{:2}", preview.number)),
                Cell::new(preview.reason()),
                Cell::new(if applied { "yes" } else { "no" }),
            ]);
        }
        println!("{table}");
    }
}

pub fn display_simulation(report: &SimulationReport) {
    let target = report
        .target
        .map(|id| format!("draw {id}"))
        .unwrap_or_else(|| "random draws".to_string());
    println!("\n== Simulation: {} on {} (seed {}) ==\n", report.strategy, target, report.seed);

    let mut table = new_table();
    table.set_header(vec!["Rank", "Count", "Share", "Cost", "Revenue"]);
    for row in summary_rows(&report.total) {
        let total = row.label == "Total";
        let label = if total { Cell::new(&row.label).fg(Color::Cyan) } else { Cell::new(&row.label) };
        table.add_row(vec![
            label,
            Cell::new(row.count),
            Cell::new(format!("{:.4}%", row.share * 100.0)),
            Cell::new(format_won(row.cost as i64)),
            Cell::new(format_won(row.revenue as i64)),
        ]);
    }
    println!("{table}");

    let total = &report.total;
    let roi_color = if total.roi() >= 0.0 { Color::Green } else { Color::Red };
    let mut table = new_table();
    table.set_header(vec!["Profit", "ROI", "Fallbacks"]);
    table.add_row(vec![
        Cell::new(format_won(total.profit())).fg(roi_color),
        Cell::new(format!("{:+.2}%", total.roi() * 100.0)).fg(roi_color),
        Cell::new(total.fallbacks),
    ]);
    println!("{table}");
}

pub fn display_batches(report: &SimulationReport) {
    println!("\n── Batches ──");

    let mut table = new_table();
    let mut header = vec!["Batch".to_string()];
    header.extend(Rank::ALL.iter().map(|r| r.label().to_string()));
    header.extend(["Revenue".to_string(), "Profit".to_string()]);
    table.set_header(&header);

    for batch in &report.batches {
        let mut row = vec![(batch.batch + 1).to_string()];
        row.extend(batch.stats.counts.iter().map(|c| c.to_string()));
        row.push(format_won(batch.stats.revenue as i64));
        row.push(format_won(batch.stats.profit()));
        table.add_row(row);
    }
    println!("{table}");
}

pub fn display_comparison(reports: &[SimulationReport]) {
    println!("\n== Strategy comparison ==\n");

    let mut table = new_table();
    let mut header = vec!["Rank".to_string()];
    header.extend(reports.iter().map(|r| r.strategy.clone()));
    table.set_header(&header);

    for rank in Rank::ALL {
        let mut row = vec![rank.label().to_string()];
        row.extend(reports.iter().map(|r| r.total.count(rank).to_string()));
        table.add_row(row);
    }

    let mut revenue = vec![Cell::new("Revenue")];
    revenue.extend(reports.iter().map(|r| Cell::new(format_won(r.total.revenue as i64))));
    table.add_row(revenue);

    let mut roi = vec![Cell::new("ROI")];
    roi.extend(reports.iter().map(|r| {
        let color = if r.total.roi() >= 0.0 { Color::Green } else { Color::Red };
        Cell::new(format!("{:+.2}%", r.total.roi() * 100.0)).fg(color)
    }));
    table.add_row(roi);

    println!("{table}");
}

pub fn display_ticket_check(ticket: &Candidate, draw: &Draw, rank: Rank, prize: u64) {
    println!("\n== Ticket check: draw {} ==\n", draw.draw_id);

    let mut table = new_table();
    table.set_header(vec!["Ticket", "Draw", "Bonus", "Matches", "Rank", "Prize"]);
    let color = if rank == Rank::Miss { Color::Red } else { Color::Green };
    table.add_row(vec![
        Cell::new(ticket.to_string()),
        Cell::new(join_numbers(&draw.numbers)),
        Cell::new(draw.bonus),
        Cell::new(draw.matches(ticket.numbers())),
        Cell::new(rank.label()).fg(color),
        Cell::new(format_won(prize as i64)),
    ]);
    println!("{table}");
}

pub fn display_kill_backtest(results: &[KillBacktest]) {
    println!("\n== Kill list backtest ==\n");

    let mut table = new_table();
    table.set_header(vec!["Draw", "Kill list", "Drawn anyway", "Result"]);
    for result in results {
        let kills = result
            .kills
            .iter()
            .map(|k| format!("{}({})", k.number, k.reason()))
            .collect::<Vec<_>>()
            .join(", ");
        let outcome = if result.success() {
            Cell::new("SAFE").fg(Color::Green)
        } else {
            Cell::new("FAIL").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(result.draw_id),
            Cell::new(kills),
            Cell::new(join_numbers(&result.hits)),
            outcome,
        ]);
    }
    println!("{table}");

    let safe = results.iter().filter(|r| r.success()).count();
    println!("  {safe}/{} kill lists held", results.len());
}

pub fn display_rule_survival(rules: &[RuleSurvival]) {
    println!("\n── Exclusion rules over the history ──");

    let mut table = new_table();
    table.set_header(vec!["Rule", "Cases", "Stayed out", "Rate"]);
    for rule in rules {
        table.add_row(vec![
            Cell::new(rule.rule),
            Cell::new(rule.cases),
            Cell::new(rule.survived),
            Cell::new(format!("{:.2}%", rule.rate() * 100.0)),
        ]);
    }
    println!("{table}");
}

pub fn display_ac_distribution(dist: &AcDistribution, low_threshold: u32) {
    println!("\n── AC distribution ──");

    let total: u64 = dist.counts.values().sum();
    let mut table = new_table();
    table.set_header(vec!["AC", "Draws", "Share", ""]);
    for (&ac, &count) in &dist.counts {
        let share = if total == 0 { 0.0 } else { count as f64 / total as f64 };
        let bar = "█".repeat((share * 40.0).round() as usize);
        let ac_cell = if ac <= low_threshold { Cell::new(ac).fg(Color::Yellow) } else { Cell::new(ac) };
        table.add_row(vec![ac_cell, Cell::new(count), Cell::new(format!("{:.1}%", share * 100.0)), Cell::new(bar)]);
    }
    println!("{table}");

    if !dist.low.is_empty() {
        let ids = dist
            .low
            .iter()
            .map(|(id, ac)| format!("{id} (AC {ac})"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("  Draws with AC <= {low_threshold}: {ids}");
    }
}
