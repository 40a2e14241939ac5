use overlap_core::TrialSpec;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const REQUIRED_COLUMNS: [&str; 2] = ["label1", "label2"];

#[derive(Error, Debug)]
pub enum LabelsError {
    #[error(
        "{} not found. Please provide a CSV file with 'label1' and 'label2' columns",
        .0.display()
    )]
    NotFound(PathBuf),
    #[error(transparent)]
    Io(io::Error),
    #[error("CSV error in {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("CSV must contain 'label1' and 'label2' columns ({} is missing '{column}')", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("{} contains no trials", .0.display())]
    Empty(PathBuf),
}

/// Reads the trial list. Row order is presentation order.
pub fn load_trials(path: &Path) -> Result<Vec<TrialSpec>, LabelsError> {
    let file = fs_err::File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LabelsError::NotFound(path.to_path_buf()),
        _ => LabelsError::Io(e),
    })?;
    let trials = read_trials(file, path)?;
    log::info!("Loaded {} trials from {}", trials.len(), path.display());
    Ok(trials)
}

/// Parses trials from any reader; `source` only names it in errors.
pub fn read_trials<R: io::Read>(reader: R, source: &Path) -> Result<Vec<TrialSpec>, LabelsError> {
    let csv_err = |e: csv::Error| LabelsError::Csv {
        path: source.to_path_buf(),
        source: e,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers().map_err(csv_err)?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LabelsError::MissingColumn {
                path: source.to_path_buf(),
                column,
            });
        }
    }

    let trials = rdr
        .deserialize::<TrialSpec>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_err)?;

    if trials.is_empty() {
        return Err(LabelsError::Empty(source.to_path_buf()));
    }
    Ok(trials)
}
