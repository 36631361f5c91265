// File: src/persistence.rs
use crate::error::{AnalysisError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

fn temp_file_beside(path: &Path) -> Result<NamedTempFile> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;
    Ok(NamedTempFile::new_in(parent_dir)?)
}

/// Writes a bincode snapshot of `value`. The file is written next to its
/// destination and renamed into place, so readers never see a partial file.
pub fn save_to_disk<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let temp_file = temp_file_beside(path)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        bincode::serialize_into(&mut writer, value)?;
        writer.flush()?;
    }
    temp_file.persist(path)?;
    tracing::debug!(path = %path.display(), "snapshot saved");
    Ok(())
}

pub fn load_from_disk<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let value = bincode::deserialize_from(reader)?;
    Ok(value)
}

/// Pretty-printed JSON export, written atomically like [`save_to_disk`].
pub fn export_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let temp_file = temp_file_beside(path)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    temp_file.persist(path)?;
    Ok(())
}

/// Reads a word-frequency list with one `count word` pair per line, as
/// produced by `sort | uniq -c`. Blank lines are skipped; repeated words
/// accumulate.
pub fn load_corpus_frequencies(path: &Path) -> Result<HashMap<String, u64>> {
    let reader = BufReader::new(File::open(path)?);
    let mut frequencies = HashMap::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(count), Some(word), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(AnalysisError::MalformedCorpus(format!(
                "{}:{}: expected 'count word'",
                path.display(),
                number + 1
            )));
        };
        let count: u64 = count.parse().map_err(|_| {
            AnalysisError::MalformedCorpus(format!(
                "{}:{}: invalid count '{}'",
                path.display(),
                number + 1,
                count
            ))
        })?;
        *frequencies.entry(word.to_string()).or_insert(0) += count;
    }
    tracing::info!(path = %path.display(), words = frequencies.len(), "corpus frequencies loaded");
    Ok(frequencies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bilingual::Relationship;
    use crate::core::cooccurrence::CoOccurrenceTable;
    use tempfile::tempdir;

    fn relationship() -> Relationship {
        let mut table = CoOccurrenceTable::new();
        table.add("N_f".to_string(), "N_en".to_string());
        table.add("N_f".to_string(), "N_en".to_string());
        table.add("N_f".to_string(), "Adj_en".to_string());
        Relationship::from_table(&table)
    }

    #[test]
    fn snapshot_survives_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("rel.bin");
        let rel = relationship();
        save_to_disk(&rel, &path).unwrap();
        let loaded: Relationship = load_from_disk(&path).unwrap();
        assert_eq!(loaded, rel);
    }

    #[test]
    fn json_export_is_readable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rel.json");
        export_json(&relationship(), &path).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let score = value["scores"]["N_f"]["N_en"].as_f64().unwrap();
        assert!((score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn missing_snapshot_is_an_io_error() {
        let dir = tempdir().unwrap();
        let result: Result<Relationship> = load_from_disk(&dir.path().join("absent.bin"));
        assert!(matches!(result, Err(AnalysisError::Io(_))));
    }

    #[test]
    fn corpus_counts_accumulate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corpus.txt");
        fs::write(&path, "   12 gato\n3 gatos\n\n1 gato\n").unwrap();
        let freq = load_corpus_frequencies(&path).unwrap();
        assert_eq!(freq["gato"], 13);
        assert_eq!(freq["gatos"], 3);
    }

    #[test]
    fn corpus_rejects_bad_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corpus.txt");
        fs::write(&path, "many gato\n").unwrap();
        assert!(load_corpus_frequencies(&path).is_err());
    }
}
