//! Append-only log of caller responses
//!
//! Entries are stored as a single JSON array on disk. Every append is a
//! read-modify-write cycle serialized behind a mutex, and the rewritten array
//! replaces the old file through a rename so a failed write never leaves a
//! truncated log behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::{debug, warn};

use crate::{directory::CarrierDirectory, errors::AppError};

const WRITE_FAILED: &str = "Failed to save response data";
const READ_FAILED: &str = "Failed to read response data";

/// Caller-supplied fields plus any enrichment, waiting for a timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseDraft {
    pub carrier_mc: Option<String>,
    pub carrier_name: Option<String>,
    pub phone_number: Option<String>,
    pub dispatcher_name: Option<String>,
    pub carrier_status: Option<String>,
    pub carrier_city: Option<String>,
    pub carrier_zip: Option<String>,
    pub carrier_dot: Option<String>,
}

impl ResponseDraft {
    /// Copies directory fields for the carrier whose mc_number equals
    /// `carrier_mc`. A caller-supplied `carrier_name` wins over the directory's.
    pub fn enrich(mut self, directory: &CarrierDirectory) -> Self {
        let Some(carrier) = self
            .carrier_mc
            .as_deref()
            .and_then(|mc| directory.find_by_mc(mc))
        else {
            return self;
        };

        if self.carrier_name.is_none() {
            self.carrier_name = Some(carrier.carrier_name.clone());
        }
        self.carrier_status = Some(carrier.status.clone());
        self.carrier_city = Some(carrier.city.clone());
        self.carrier_zip = Some(carrier.zip.clone());
        self.carrier_dot = Some(carrier.dot_number.clone());
        self
    }

    pub fn stamp(self, timestamp: String) -> ResponseEntry {
        ResponseEntry {
            carrier_mc: self.carrier_mc,
            carrier_name: self.carrier_name,
            phone_number: self.phone_number,
            dispatcher_name: self.dispatcher_name,
            timestamp,
            carrier_status: self.carrier_status,
            carrier_city: self.carrier_city,
            carrier_zip: self.carrier_zip,
            carrier_dot: self.carrier_dot,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseEntry {
    pub carrier_mc: Option<String>,
    pub carrier_name: Option<String>,
    pub phone_number: Option<String>,
    pub dispatcher_name: Option<String>,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_dot: Option<String>,
}

#[async_trait]
pub trait ResponseStore: Send + Sync {
    async fn append(&self, draft: ResponseDraft) -> Result<ResponseEntry, AppError>;
    /// Stored entries in file order, passed through as raw JSON.
    async fn read_all(&self) -> Result<Vec<Value>, AppError>;
}

#[derive(Debug)]
pub struct FileResponseLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileResponseLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the log as an empty array unless it already exists.
    pub async fn initialize(&self) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;

        if fs::try_exists(&self.path).await.map_err(|err| {
            AppError::storage(WRITE_FAILED, format!("{}: {err}", self.path.display()))
        })? {
            return Ok(());
        }

        if let Some(parent) = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).await.map_err(|err| {
                AppError::storage(WRITE_FAILED, format!("{}: {err}", parent.display()))
            })?;
        }

        self.write_entries(&[]).await
    }

    /// Reads the current log for an append. Anything unreadable counts as an
    /// empty log, which drops prior history on the next write.
    async fn read_for_append(&self) -> Vec<Value> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "response log missing, starting empty");
                return Vec::new();
            }
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "could not read existing responses"
                );
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<Value>>(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "could not parse existing responses"
                );
                Vec::new()
            }
        }
    }

    async fn write_entries(&self, entries: &[Value]) -> Result<(), AppError> {
        let storage_err = |err: std::io::Error| {
            AppError::storage(WRITE_FAILED, format!("{}: {err}", self.path.display()))
        };

        let json = serde_json::to_vec_pretty(entries).map_err(|err| {
            AppError::storage(WRITE_FAILED, format!("serialize responses: {err}"))
        })?;

        let tmp_path = self.tmp_path();
        let mut file = fs::File::create(&tmp_path).await.map_err(storage_err)?;
        file.write_all(&json).await.map_err(storage_err)?;
        file.sync_all().await.map_err(storage_err)?;
        drop(file);

        if let Err(err) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(storage_err(err));
        }

        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[async_trait]
impl ResponseStore for FileResponseLog {
    async fn append(&self, draft: ResponseDraft) -> Result<ResponseEntry, AppError> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.read_for_append().await;
        let entry = draft.stamp(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        let value = serde_json::to_value(&entry).map_err(|err| {
            AppError::storage(WRITE_FAILED, format!("serialize entry: {err}"))
        })?;
        entries.push(value);

        self.write_entries(&entries).await?;
        debug!(total = entries.len(), "response entry appended");
        Ok(entry)
    }

    async fn read_all(&self) -> Result<Vec<Value>, AppError> {
        let bytes = fs::read(&self.path).await.map_err(|err| {
            AppError::storage(READ_FAILED, format!("{}: {err}", self.path.display()))
        })?;

        serde_json::from_slice::<Vec<Value>>(&bytes).map_err(|err| {
            AppError::storage(READ_FAILED, format!("{}: {err}", self.path.display()))
        })
    }
}
