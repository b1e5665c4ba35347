use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use tracing::warn;

use crate::models::{validate_draw, Draw, PICK_COUNT};
use crate::store::History;

/// Reads a JSON array of draws. Every draw is validated, then its numbers sorted.
pub fn load_json(path: &Path) -> Result<History> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read history file {:?}", path))?;
    let mut draws: Vec<Draw> = serde_json::from_str(&json)
        .with_context(|| format!("Invalid history JSON in {:?}", path))?;
    for draw in &mut draws {
        validate_draw(&draw.numbers, draw.bonus)
            .with_context(|| format!("Draw {} is malformed", draw.draw_id))?;
        draw.numbers.sort_unstable();
    }
    Ok(History::new(draws))
}

pub fn save_json(history: &History, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create directory {:?}", parent))?;
        }
    }
    let json = serde_json::to_string_pretty(history.draws())?;
    std::fs::write(path, json).with_context(|| format!("Cannot write {:?}", path))?;
    Ok(())
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    for format in ["%Y-%m-%d", "%Y.%m.%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(date);
        }
    }
    bail!("Invalid date format: '{}'", raw)
}

fn parse_record(record: &csv::StringRecord) -> Result<Draw> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Missing field at index {}", idx))
    };

    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Cannot parse '{}' (index {})", s, idx))
    };

    let raw_id = get(0)?;
    let draw_id: u32 = raw_id
        .parse()
        .with_context(|| format!("Invalid draw id '{}'", raw_id))?;

    let raw_date = get(1)?;
    let date = if raw_date.is_empty() { None } else { Some(parse_date(&raw_date)?) };

    let mut numbers = [0u8; PICK_COUNT];
    for (i, slot) in numbers.iter_mut().enumerate() {
        *slot = get_u8(2 + i)?;
    }
    let bonus = get_u8(2 + PICK_COUNT)?;

    // Prize amounts are exported with thousands separators.
    let first_prize = match record.get(3 + PICK_COUNT).map(str::trim) {
        Some(s) if !s.is_empty() => Some(
            s.replace([',', '_'], "")
                .parse::<u64>()
                .with_context(|| format!("Invalid prize amount '{}'", s))?,
        ),
        _ => None,
    };

    let mut draw = Draw::new(draw_id, numbers, bonus)?;
    draw.date = date;
    draw.first_prize = first_prize;
    Ok(draw)
}

#[derive(Debug, Default)]
pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

/// Imports `draw_id,date,n1..n6,bonus[,first_prize]` rows into `history`.
/// Rows whose id is already known are skipped, malformed rows are counted.
pub fn import_csv(history: History, path: &Path) -> Result<(History, ImportResult)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Cannot open {:?}", path))?;

    let mut by_id: BTreeMap<u32, Draw> = history
        .into_draws()
        .into_iter()
        .map(|d| (d.draw_id, d))
        .collect();
    let mut result = ImportResult::default();

    for record_result in reader.records() {
        result.total_records += 1;
        match record_result {
            Ok(record) => match parse_record(&record) {
                Ok(draw) => {
                    if by_id.contains_key(&draw.draw_id) {
                        result.skipped += 1;
                    } else {
                        by_id.insert(draw.draw_id, draw);
                        result.inserted += 1;
                    }
                }
                Err(e) => {
                    warn!(line = result.total_records, error = %e, "skipping malformed draw row");
                    result.errors += 1;
                }
            },
            Err(e) => {
                warn!(line = result.total_records, error = %e, "unreadable CSV row");
                result.errors += 1;
            }
        }
    }

    Ok((History::new(by_id.into_values().collect()), result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::make_test_draws;
    use std::io::Write;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 2, 14).unwrap();
        assert_eq!(parse_date("2026-02-14").unwrap(), expected);
        assert_eq!(parse_date("2026.02.14").unwrap(), expected);
        assert_eq!(parse_date("14/02/2026").unwrap(), expected);
        assert!(parse_date("14-02").is_err());
    }

    #[test]
    fn test_json_roundtrip_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");
        let history = History::new(make_test_draws(12));
        save_json(&history, &path).unwrap();

        let loaded = load_json(&path).unwrap();
        assert_eq!(loaded.len(), 12);
        assert_eq!(loaded.latest().unwrap().draw_id, 12);
        assert_eq!(loaded.draws(), history.draws());
    }

    #[test]
    fn test_load_json_rejects_malformed_draw() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"[{"draw_id": 1, "numbers": [1, 2, 3, 4, 5, 5], "bonus": 9}]"#).unwrap();
        assert!(load_json(&path).is_err());
    }

    #[test]
    fn test_load_json_sorts_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unsorted.json");
        std::fs::write(&path, r#"[{"drwNo": 3, "numbers": [41, 5, 33, 12, 28, 20], "bonus": 44}]"#).unwrap();
        let history = load_json(&path).unwrap();
        assert_eq!(history.draws()[0].numbers, [5, 12, 20, 28, 33, 41]);
    }

    #[test]
    fn test_import_csv_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draws.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "draw_id,date,n1,n2,n3,n4,n5,n6,bonus,first_prize").unwrap();
        writeln!(file, "1209,2026-02-07,2,17,20,35,37,39,24,\"1,855,000,000\"").unwrap();
        writeln!(file, "1210,2026-02-14,1,7,9,17,27,38,31,").unwrap();
        writeln!(file, "1210,2026-02-14,1,7,9,17,27,38,31,").unwrap();
        writeln!(file, "1211,2026-02-21,1,1,9,17,27,38,31,").unwrap();
        drop(file);

        let (history, result) = import_csv(History::default(), &path).unwrap();
        assert_eq!(result.total_records, 4);
        assert_eq!(result.inserted, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors, 1);
        assert_eq!(history.latest().unwrap().draw_id, 1210);
        assert_eq!(history.find(1209).unwrap().first_prize, Some(1_855_000_000));
    }
}
