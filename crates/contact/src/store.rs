use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{DateTime, TimeZone};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::PendingContact;

pub const KEY_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("pending store io: {0}")]
    Io(#[from] std::io::Error),

    #[error("pending store json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("pending store {0} is not a JSON object")]
    Malformed(PathBuf),
}

/// File-backed map of submissions that failed delivery.
///
/// The document is a single JSON object keyed by `<email>_<YYYYMMDDHHMMSS>`.
/// Every write reloads the file, inserts one entry and replaces the file
/// through a sibling temporary file, so readers never observe a half-written
/// store. Writers inside the process are serialized.
#[derive(Debug)]
pub struct PendingContactStore {
    path: PathBuf,
    writer: Mutex<()>,
}

impl PendingContactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Inserts `contact` and returns the key it was stored under
    pub async fn append<Tz>(
        &self,
        contact: &PendingContact,
        at: &DateTime<Tz>,
    ) -> Result<String, PersistenceError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let _guard = self.writer.lock().await;

        let mut entries = self.read_entries().await?;
        let key = unique_key(
            &entries,
            format!("{}_{}", contact.email, at.format(KEY_TIMESTAMP_FORMAT)),
        );

        entries.insert(key.to_owned(), serde_json::to_value(contact)?);
        self.write_entries(&entries).await?;

        Ok(key)
    }

    /// All entries in key order
    pub async fn list(&self) -> Result<Vec<(String, PendingContact)>, PersistenceError> {
        let entries = self.read_entries().await?;

        let mut contacts = entries
            .into_iter()
            .map(|(key, value)| -> Result<_, PersistenceError> {
                Ok((key, serde_json::from_value(value)?))
            })
            .collect::<Result<Vec<(String, PendingContact)>, _>>()?;
        contacts.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(contacts)
    }

    async fn read_entries(&self) -> Result<Map<String, Value>, PersistenceError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(err.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        match serde_json::from_slice(&bytes)? {
            Value::Object(entries) => Ok(entries),
            Value::Null => Ok(Map::new()),
            _ => Err(PersistenceError::Malformed(self.path.to_owned())),
        }
    }

    async fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), PersistenceError> {
        // A rename would replace a read-only store regardless of its mode
        match tokio::fs::metadata(&self.path).await {
            Ok(metadata) if metadata.permissions().readonly() => {
                return Err(std::io::Error::new(
                    ErrorKind::PermissionDenied,
                    format!("{} is read-only", self.path.display()),
                )
                .into());
            }
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        let mut bytes = serde_json::to_vec_pretty(entries)?;
        bytes.push(b'\n');

        let tmp = self.temp_path();

        if let Err(err) = tokio::fs::write(&tmp, &bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }

        if let Err(err) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "pending_contacts.json".to_owned());

        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

fn unique_key(entries: &Map<String, Value>, base: String) -> String {
    let mut key = base.to_owned();
    let mut n = 2;

    while entries.contains_key(&key) {
        key = format!("{base}_{n}");
        n += 1;
    }

    key
}
