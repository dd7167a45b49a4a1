use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::{error, info};

use crate::{config::OutputConfig, error::SinkError, model::WeatherRecord};

/// Outcome of both writes. Each side fails independently.
#[derive(Debug)]
pub struct PersistReport {
    pub csv: Result<PathBuf, SinkError>,
    pub json: Result<PathBuf, SinkError>,
}

impl PersistReport {
    pub fn is_complete(&self) -> bool {
        self.csv.is_ok() && self.json.is_ok()
    }

    pub fn errors(&self) -> impl Iterator<Item = &SinkError> {
        [self.csv.as_ref().err(), self.json.as_ref().err()]
            .into_iter()
            .flatten()
    }
}

/// Write the result set to both destinations; a failed CSV write does not stop the JSON write.
pub fn persist(records: &[WeatherRecord], output: &OutputConfig) -> PersistReport {
    let csv = write_csv(&output.csv_path, records).map(|()| output.csv_path.clone());
    match &csv {
        Ok(path) => info!(
            "CSV saved: {} ({} rows, {} columns)",
            path.display(),
            records.len(),
            WeatherRecord::FIELDS.len()
        ),
        Err(e) => error!("Error saving CSV: {e}"),
    }

    let json = write_json(&output.json_path, records).map(|()| output.json_path.clone());
    match &json {
        Ok(path) => info!("JSON saved: {} ({} records)", path.display(), records.len()),
        Err(e) => error!("Error saving JSON: {e}"),
    }

    PersistReport { csv, json }
}

/// One header row with the fixed field names, then one row per record. `None` is an empty cell.
pub fn write_csv(path: &Path, records: &[WeatherRecord]) -> Result<(), SinkError> {
    ensure_parent(path)?;

    let csv_err = |e| SinkError::Csv(path.to_path_buf(), e);

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_err)?;

    writer.write_record(WeatherRecord::FIELDS).map_err(csv_err)?;
    for record in records {
        writer.serialize(record).map_err(csv_err)?;
    }

    writer
        .flush()
        .map_err(|e| SinkError::Io(path.to_path_buf(), e))
}

/// Pretty-printed JSON array, `null` for missing values.
pub fn write_json(path: &Path, records: &[WeatherRecord]) -> Result<(), SinkError> {
    ensure_parent(path)?;

    let file = File::create(path).map_err(|e| SinkError::Io(path.to_path_buf(), e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, records)
        .map_err(|e| SinkError::Json(path.to_path_buf(), e))?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|e| SinkError::Io(path.to_path_buf(), e))
}

fn ensure_parent(path: &Path) -> Result<(), SinkError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .map_err(|e| SinkError::CreateDir(parent.to_path_buf(), e)),
        _ => Ok(()),
    }
}
