use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::Local;
use directories::ProjectDirs;
use serde::Serialize;
use thiserror::Error;

use crate::domain::SavedCalendarRecord;

pub const SAVED_CALENDARS_FILE: &str = "saved_calendars.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub fn get_data_dir() -> PathBuf {
    let local = Path::new(SAVED_CALENDARS_FILE);
    if local.exists() {
        return PathBuf::from(".");
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "quickcal", "quickcal") {
        let data_dir = proj_dirs.data_dir().to_path_buf();
        fs::create_dir_all(&data_dir).ok();
        data_dir
    } else {
        PathBuf::from(".")
    }
}

pub fn saved_calendars_path() -> PathBuf {
    get_data_dir().join(SAVED_CALENDARS_FILE)
}

/// Loads the saved-calendar list. A missing file, unreadable content, or JSON
/// that is not a list all degrade to an empty collection with a warning;
/// individual records that fail to parse are skipped so one bad entry cannot
/// take the rest of the collection down.
pub fn load_saved_calendars(path: &Path) -> Vec<SavedCalendarRecord> {
    if !path.exists() {
        return Vec::new();
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Warning: could not read saved calendars: {}", e);
            return Vec::new();
        }
    };

    let value: serde_json::Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Warning: could not parse saved calendars: {}", e);
            return Vec::new();
        }
    };

    let Some(items) = value.as_array() else {
        eprintln!("Warning: saved calendars file is not a list, ignoring it");
        return Vec::new();
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<SavedCalendarRecord>(item.clone()) {
            Ok(record) => records.push(record),
            Err(e) => eprintln!("Warning: skipping malformed saved calendar: {}", e),
        }
    }
    records
}

pub fn save_saved_calendars(
    path: &Path,
    records: &[SavedCalendarRecord],
) -> Result<(), StorageError> {
    write_json_atomic(path, &records)
}

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(value)?;
    atomic_write(path, &json)
}

pub fn write_text_file(path: &Path, content: &str) -> Result<(), StorageError> {
    atomic_write(path, content)
}

pub fn create_backup(path: &Path) -> Result<(), StorageError> {
    if !path.exists() {
        return Ok(());
    }

    let backup_dir = path.parent().unwrap_or(Path::new(".")).join("backups");
    fs::create_dir_all(&backup_dir)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!(
        "{}.{}",
        path.file_name().unwrap_or_default().to_string_lossy(),
        timestamp
    );
    fs::copy(path, backup_dir.join(&filename))?;

    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    if let Ok(entries) = fs::read_dir(&backup_dir) {
        let mut backups: Vec<_> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(&*stem))
            .collect();
        backups.sort_by_key(|entry| entry.metadata().ok().and_then(|m| m.modified().ok()));

        while backups.len() > 10 {
            let oldest = backups.remove(0);
            let _ = fs::remove_file(oldest.path());
        }
    }

    Ok(())
}

pub fn atomic_write(path: &Path, content: &str) -> Result<(), StorageError> {
    if path.exists() {
        create_backup(path)?;
    }

    let tmp_path = path.with_extension("tmp");
    let mut tmp_file = File::create(&tmp_path)?;
    tmp_file.write_all(content.as_bytes())?;
    tmp_file.sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
