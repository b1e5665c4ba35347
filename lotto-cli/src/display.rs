use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use lotto_engine::PredictorConfig;
use lotto_history::io::ImportResult;

pub fn display_import_summary(result: &ImportResult, total: usize) {
    println!("Import finished:");
    println!("  Rows read         : {}", result.total_records);
    println!("  Inserted          : {}", result.inserted);
    println!("  Duplicates skipped: {}", result.skipped);
    if result.errors > 0 {
        println!("  Errors            : {}", result.errors);
    }
    println!("  Draws in history  : {}", total);
}

pub fn display_config(config: &PredictorConfig) {
    println!("\n== Configuration: {} ==\n", config.preset);

    let windows = config
        .score
        .windows
        .iter()
        .map(|w| format!("{}:{}", w.size, w.weight))
        .collect::<Vec<_>>()
        .join(", ");
    let cold = if config.score.cold_window > 0 {
        format!("+{} after {} draws", config.score.cold_boost, config.score.cold_window)
    } else {
        "—".to_string()
    };
    let injection = config
        .generator
        .cold_injection
        .map(|c| format!("1 ({:.0}%) or 2 from the {} coldest", c.single_probability * 100.0, c.pool_size))
        .unwrap_or_else(|| "—".to_string());

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Setting", "Value"]);
    let rows = vec![
        ("Base score", config.score.base.to_string()),
        ("Windows (size:weight)", windows),
        ("Cold boost", cold),
        ("Kill list size", config.exclusion.kill_count.to_string()),
        ("Jitter", config.generator.jitter.to_string()),
        ("Cold injection", injection),
        ("Sum range", format!("{}~{}", config.validator.min_sum, config.validator.max_sum)),
        ("Pair keep probability", config.validator.pair_keep_probability.to_string()),
        ("History overlap limit", config.validator.max_history_overlap.to_string()),
        ("Minimum AC", config.validator.min_ac.to_string()),
        ("Retry budget", config.max_attempts.to_string()),
    ];
    for (name, value) in rows {
        let cell = if name == "Kill list size" && config.is_challenge() {
            Cell::new(format!("{value} (challenge)")).fg(Color::Yellow)
        } else {
            Cell::new(value)
        };
        table.add_row(vec![Cell::new(name), cell]);
    }
    println!("{table}");
}
