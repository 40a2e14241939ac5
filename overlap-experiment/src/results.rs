use crate::config::OutputConfig;
use chrono::{DateTime, TimeZone};
use overlap_core::TrialResult;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResultsError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to write {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("failed to write {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Files produced by one save.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedResults {
    pub csv: PathBuf,
    pub json: Option<PathBuf>,
    pub rows: usize,
}

/// Writes a session's results once, at the end of the run.
#[derive(Debug, Clone)]
pub struct ResultWriter {
    dir: PathBuf,
    prefix: String,
    write_json: bool,
}

impl ResultWriter {
    pub fn new(output: &OutputConfig) -> Self {
        Self {
            dir: output.dir.clone(),
            prefix: output.prefix.clone(),
            write_json: output.write_json,
        }
    }

    /// `{prefix}_{participant}_{YYYYmmdd_HHMMSS}` without extension.
    pub fn file_stem<Tz: TimeZone>(&self, participant_id: &str, now: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        format!(
            "{}_{}_{}",
            self.prefix,
            sanitize(participant_id),
            now.format("%Y%m%d_%H%M%S")
        )
    }

    /// Saves `results` and returns what was written. Nothing is written for
    /// an empty session.
    pub fn persist<Tz: TimeZone>(
        &self,
        participant_id: &str,
        results: &[TrialResult],
        now: &DateTime<Tz>,
    ) -> Result<Option<SavedResults>, ResultsError>
    where
        Tz::Offset: std::fmt::Display,
    {
        if results.is_empty() {
            return Ok(None);
        }
        fs_err::create_dir_all(&self.dir)?;

        let stem = self.file_stem(participant_id, now);
        let csv_path = self.dir.join(format!("{stem}.csv"));
        write_csv(&csv_path, results)?;

        let json = if self.write_json {
            let json_path = self.dir.join(format!("{stem}.json"));
            write_json(&json_path, results)?;
            Some(json_path)
        } else {
            None
        };

        Ok(Some(SavedResults {
            csv: csv_path,
            json,
            rows: results.len(),
        }))
    }
}

fn write_csv(path: &Path, results: &[TrialResult]) -> Result<(), ResultsError> {
    let csv_err = |e: csv::Error| ResultsError::Csv {
        path: path.to_path_buf(),
        source: e,
    };
    let file = fs_err::File::create(path)?;
    let mut wtr = csv::Writer::from_writer(file);
    for result in results {
        wtr.serialize(result).map_err(csv_err)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_json(path: &Path, results: &[TrialResult]) -> Result<(), ResultsError> {
    let file = fs_err::File::create(path)?;
    let mut w = io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut w, results).map_err(|e| ResultsError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    // Small outputs sit in the buffer until here
    w.flush()?;
    Ok(())
}

/// Keeps the participant id usable as part of a file name.
fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "overlap-results-{}-{}",
            std::process::id(),
            name
        ));
        let _ = fs_err::remove_dir_all(&dir);
        dir
    }

    fn writer(dir: &Path, write_json: bool) -> ResultWriter {
        ResultWriter::new(&OutputConfig {
            dir: dir.to_path_buf(),
            prefix: "overlap_results".to_string(),
            write_json,
        })
    }

    fn fixed_now() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(9, 26, 53)
            .unwrap()
            .and_utc()
    }

    fn result(trial: usize, size: f64, overlap: f64) -> TrialResult {
        TrialResult {
            participant_id: "P1".to_string(),
            trial,
            label1: "cat".to_string(),
            label2: "dog".to_string(),
            size_percent: size,
            overlap_percent: overlap,
            timestamp: "2026-03-14 09:26:53".to_string(),
            response_time: 1.5,
            order_indicator: 0,
            label_type: None,
        }
    }

    #[test]
    fn file_name_carries_participant_and_time() {
        let w = writer(Path::new("."), false);
        assert_eq!(
            w.file_stem("P/1", &fixed_now()),
            "overlap_results_P_1_20260314_092653"
        );
    }

    #[test]
    fn empty_session_writes_nothing() {
        let dir = scratch_dir("empty");
        let saved = writer(&dir, true).persist("P1", &[], &fixed_now()).unwrap();
        assert_eq!(saved, None);
        assert!(!dir.exists());
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = scratch_dir("rows");
        let saved = writer(&dir, false)
            .persist("P1", &[result(1, 100.0, 0.0), result(2, 400.0, 50.0)], &fixed_now())
            .unwrap()
            .unwrap();
        assert_eq!(saved.rows, 2);
        assert_eq!(saved.json, None);

        let text = fs_err::read_to_string(&saved.csv).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "participant_id,trial,label1,label2,size_percent,overlap_percent,timestamp,\
                 response_time,order_indicator,label_type"
            )
        );
        assert_eq!(
            lines.next(),
            Some("P1,1,cat,dog,100.0,0.0,2026-03-14 09:26:53,1.5,0,")
        );
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn json_mirrors_csv() {
        let dir = scratch_dir("json");
        let saved = writer(&dir, true)
            .persist("P1", &[result(1, 250.0, 10.0)], &fixed_now())
            .unwrap()
            .unwrap();
        let json_path = saved.json.unwrap();
        assert_eq!(json_path.extension().and_then(|e| e.to_str()), Some("json"));
        let back: Vec<TrialResult> =
            serde_json::from_str(&fs_err::read_to_string(json_path).unwrap()).unwrap();
        assert_eq!(back, vec![result(1, 250.0, 10.0)]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn full_device_fails_both_formats() {
        let rows = [result(1, 100.0, 0.0)];
        let full = Path::new("/dev/full");
        assert!(write_csv(full, &rows).is_err());
        assert!(write_json(full, &rows).is_err());
    }
}
