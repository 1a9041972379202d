use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{AcceptedEntry, RegistryError, RejectedEntry};

pub const REJECTED_HEADER: &[&str] = &["Origin Location", "File Name", "Note"];
pub const ACCEPTED_HEADER: &[&str] = &[
    "Origin Location",
    "Title",
    "Author",
    "Series",
    "Number",
    "Part",
];

/// Durable append-only storage for registry rows.
pub trait RegistryStore: Send + Sync {
    fn append_rejected(&self, entry: &RejectedEntry) -> Result<(), RegistryError>;

    fn append_accepted(&self, entry: &AcceptedEntry) -> Result<(), RegistryError>;

    /// Every rejected row, oldest first.
    fn load_rejected(&self) -> Result<Vec<RejectedEntry>, RegistryError>;

    /// Every accepted row, oldest first.
    fn load_accepted(&self) -> Result<Vec<AcceptedEntry>, RegistryError>;
}

/// Two CSV files opened in append mode. Each row is flushed as it is written
/// so the logs survive a crash mid-run.
pub struct CsvRegistryStore {
    rejected_path: PathBuf,
    accepted_path: PathBuf,
    rejected: Mutex<csv::Writer<File>>,
    accepted: Mutex<csv::Writer<File>>,
}

impl CsvRegistryStore {
    /// Opens (or creates) both logs, writing the header row into empty files.
    pub fn open(
        rejected_path: impl Into<PathBuf>,
        accepted_path: impl Into<PathBuf>,
    ) -> Result<Self, RegistryError> {
        let rejected_path = rejected_path.into();
        let accepted_path = accepted_path.into();

        let rejected = open_log(&rejected_path, REJECTED_HEADER)?;
        let accepted = open_log(&accepted_path, ACCEPTED_HEADER)?;

        Ok(Self {
            rejected_path,
            accepted_path,
            rejected: Mutex::new(rejected),
            accepted: Mutex::new(accepted),
        })
    }

    pub fn rejected_path(&self) -> &Path {
        &self.rejected_path
    }

    pub fn accepted_path(&self) -> &Path {
        &self.accepted_path
    }
}

fn open_log(path: &Path, header: &[&str]) -> Result<csv::Writer<File>, RegistryError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let is_empty = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if is_empty {
        writer.write_record(header)?;
        writer.flush()?;
    }
    Ok(writer)
}

fn append<T: Serialize>(writer: &Mutex<csv::Writer<File>>, row: &T) -> Result<(), RegistryError> {
    let mut writer = writer.lock().unwrap_or_else(|e| e.into_inner());
    writer.serialize(row)?;
    writer.flush()?;
    Ok(())
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, RegistryError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

impl RegistryStore for CsvRegistryStore {
    fn append_rejected(&self, entry: &RejectedEntry) -> Result<(), RegistryError> {
        append(&self.rejected, entry)
    }

    fn append_accepted(&self, entry: &AcceptedEntry) -> Result<(), RegistryError> {
        append(&self.accepted, entry)
    }

    fn load_rejected(&self) -> Result<Vec<RejectedEntry>, RegistryError> {
        load(&self.rejected_path)
    }

    fn load_accepted(&self) -> Result<Vec<AcceptedEntry>, RegistryError> {
        load(&self.accepted_path)
    }
}

/// Renders rows as a CSV document with a header line.
pub fn to_csv<T: Serialize>(header: &[&str], rows: &[T]) -> Result<Vec<u8>, RegistryError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| RegistryError::Io(e.into_error()))
}
