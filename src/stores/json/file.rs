//! A collection of records persisted as a single JSON array on disk.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use tempfile::Builder;
use time::OffsetDateTime;

use crate::{Error, config::CorruptionPolicy};

/// An in-memory collection of records that mirrors a JSON file.
///
/// The file is read once on open. Every append rewrites the whole file via a
/// temporary sibling and a rename, so the file on disk is always either the
/// old or the new collection and never a partial write. The directory is
/// synced after the rename so the new entry survives a crash.
#[derive(Debug)]
pub(crate) struct JsonFile<T> {
    path: PathBuf,
    records: Vec<T>,
    recovered_from: Option<PathBuf>,
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Load the collection at `path`, creating an empty one if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [Error::CorruptStore] if the file cannot be parsed and `policy`
    /// is [CorruptionPolicy::Fail], or [Error::Io] if the file cannot be read
    /// or created.
    pub(crate) fn open(path: impl Into<PathBuf>, policy: CorruptionPolicy) -> Result<Self, Error> {
        let path = path.into();

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(error) if error.kind() == io::ErrorKind::NotFound => None,
            Err(error) => return Err(error.into()),
        };

        let mut recovered_from = None;
        let records = match contents {
            None => None,
            Some(contents) if contents.trim().is_empty() => None,
            Some(contents) => match serde_json::from_str(&contents) {
                Ok(records) => Some(records),
                Err(error) => match policy {
                    CorruptionPolicy::Fail => {
                        tracing::error!("Could not parse {}: {error}", path.display());
                        return Err(Error::CorruptStore(path.display().to_string()));
                    }
                    CorruptionPolicy::TreatAsEmpty => {
                        let backup = move_aside(&path)?;
                        tracing::warn!(
                            "Could not parse {}: {error}. Starting with an empty collection, \
                             the old file was moved to {}",
                            path.display(),
                            backup.display()
                        );
                        recovered_from = Some(backup);
                        None
                    }
                },
            },
        };

        match records {
            Some(records) => Ok(Self {
                path,
                records,
                recovered_from,
            }),
            None => {
                let file = Self {
                    path,
                    records: Vec::new(),
                    recovered_from,
                };
                file.persist()?;
                tracing::debug!("Created empty collection at {}", file.path.display());
                Ok(file)
            }
        }
    }

    /// Where the corrupt file was moved to, if this collection was started
    /// empty under [CorruptionPolicy::TreatAsEmpty].
    pub(crate) fn recovered_from(&self) -> Option<&Path> {
        self.recovered_from.as_deref()
    }

    /// The records in the order they were appended.
    pub(crate) fn records(&self) -> &[T] {
        &self.records
    }

    /// Add `record` to the end of the collection and write the collection to disk.
    ///
    /// # Errors
    ///
    /// Returns [Error::Io] or [Error::Serialization] if the collection could
    /// not be written, in which case the record is not added.
    pub(crate) fn append(&mut self, record: T) -> Result<&T, Error> {
        self.records.push(record);

        if let Err(error) = self.persist() {
            self.records.pop();
            return Err(error);
        }

        self.records.last().ok_or(Error::NotFound)
    }

    /// Write the collection to a temporary file next to the target, rename it
    /// over the target and sync the directory.
    fn persist(&self) -> Result<(), Error> {
        let contents = serde_json::to_string_pretty(&self.records)?;
        let parent = parent_dir(&self.path);

        // The temporary file is deleted on drop if any step before the rename fails.
        let mut tmp_file = Builder::new()
            .prefix(&format!(".{}.", file_name(&self.path)))
            .suffix(".tmp")
            .tempfile_in(parent)?;
        tmp_file.write_all(contents.as_bytes())?;
        tmp_file.as_file().sync_all()?;
        tmp_file
            .persist(&self.path)
            .map_err(|error| Error::from(error.error))?;

        sync_dir(parent)?;

        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Flush the directory entry so a completed rename survives a crash.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

/// Directories cannot be opened as files here, the rename is as durable as it gets.
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

/// Rename a corrupt file so that it is kept for inspection but no longer read.
fn move_aside(path: &Path) -> Result<PathBuf, Error> {
    let backup = path.with_file_name(format!(
        "{}.corrupt-{}",
        file_name(path),
        OffsetDateTime::now_utc().unix_timestamp_nanos()
    ));

    fs::rename(path, &backup)?;

    Ok(backup)
}
