use std::path::Path;

use anyhow::Result;
use tracing::info;

use lotto_history::History;
use lotto_history::io::{ImportResult, import_csv, load_json, save_json};

/// Loads `history_path` when it exists, starting empty otherwise.
pub fn load_or_empty(history_path: &Path) -> Result<History> {
    if history_path.exists() {
        load_json(history_path)
    } else {
        Ok(History::default())
    }
}

/// Merges the draws of `csv_path` into the JSON history and writes it back.
pub fn import_into(history_path: &Path, csv_path: &Path) -> Result<(History, ImportResult)> {
    let history = load_or_empty(history_path)?;
    let (history, result) = import_csv(history, csv_path)?;
    if result.inserted > 0 {
        save_json(&history, history_path)?;
        info!(path = %history_path.display(), inserted = result.inserted, "history saved");
    }
    Ok((history, result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_into_creates_history() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("draws.csv");
        std::fs::write(
            &csv_path,
            "draw_id,date,n1,n2,n3,n4,n5,n6,bonus\n1209,2026-02-07,2,17,20,35,37,39,24\n1210,2026-02-14,1,7,9,17,27,38,31\n",
        )
        .unwrap();
        let history_path = dir.path().join("data").join("history.json");

        let (history, result) = import_into(&history_path, &csv_path).unwrap();
        assert_eq!(result.inserted, 2);
        assert_eq!(history.len(), 2);
        assert!(history_path.exists());

        let (_, again) = import_into(&history_path, &csv_path).unwrap();
        assert_eq!(again.inserted, 0);
        assert_eq!(again.skipped, 2);
    }
}
