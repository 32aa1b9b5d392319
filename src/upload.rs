use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use axum::extract::{Multipart, multipart::MultipartError};
use chrono::{DateTime, TimeZone};
use regex::Regex;

pub const ALLOWED_EXTENSIONS: [&str; 8] = ["pdf", "txt", "doc", "docx", "png", "jpg", "jpeg", "gif"];

const STORED_PREFIX_FORMAT: &str = "%Y%m%d_%H%M%S_";

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid filename pattern"));

#[derive(thiserror::Error, Debug)]
pub enum UploadError {
    #[error("file type not allowed: {0}")]
    NotAllowed(String),

    #[error("multipart: {0}")]
    Multipart(#[from] MultipartError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub fn allowed_file(filename: &str) -> bool {
    filename.rsplit_once('.').is_some_and(|(_, ext)| {
        ALLOWED_EXTENSIONS
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    })
}

/// Reduces a client supplied name to a flat, ASCII only file name.
///
/// Returns an empty string when nothing usable is left.
pub fn secure_filename(filename: &str) -> String {
    let flat = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect::<String>();

    let joined = flat.split_whitespace().collect::<Vec<_>>().join("_");

    UNSAFE_CHARS
        .replace_all(&joined, "")
        .trim_matches(|c: char| c == '.' || c == '_')
        .to_owned()
}

pub fn allowed_types() -> String {
    ALLOWED_EXTENSIONS.join(", ")
}

#[derive(Debug, Clone)]
pub struct FilePart {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Text fields and files collected from a multipart body
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, FilePart>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, UploadError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match field.file_name().map(str::to_owned) {
                Some(file_name) => {
                    let data = field.bytes().await?;
                    form.files.insert(
                        name,
                        FilePart {
                            file_name,
                            data: data.to_vec(),
                        },
                    );
                }
                None => {
                    form.fields.insert(name, field.text().await?);
                }
            }
        }

        Ok(form)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// File part for `name`, ignoring empty selections
    pub fn file(&self, name: &str) -> Option<&FilePart> {
        self.files
            .get(name)
            .filter(|f| !f.file_name.is_empty() && !f.data.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    folder: PathBuf,
}

impl UploadStore {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub async fn ensure_folder(&self) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(&self.folder).await?;

        Ok(())
    }

    /// Writes the file under a timestamped, sanitized name and returns that name
    pub async fn save<Tz: TimeZone>(
        &self,
        original_name: &str,
        data: &[u8],
        at: &DateTime<Tz>,
    ) -> Result<String, UploadError>
    where
        Tz::Offset: std::fmt::Display,
    {
        if !allowed_file(original_name) {
            return Err(UploadError::NotAllowed(original_name.to_owned()));
        }

        let safe = secure_filename(original_name);
        if safe.is_empty() || !allowed_file(&safe) {
            return Err(UploadError::NotAllowed(original_name.to_owned()));
        }

        let filename = format!("{}{safe}", at.format(STORED_PREFIX_FORMAT));

        self.ensure_folder().await?;
        tokio::fs::write(self.folder.join(&filename), data).await?;

        tracing::info!(filename = %filename, size = data.len(), "Stored upload");

        Ok(filename)
    }

    /// Reads a stored file; names that are not already sanitized are never resolved
    pub async fn read(&self, filename: &str) -> Result<Option<Vec<u8>>, UploadError> {
        if filename.is_empty() || secure_filename(filename) != filename {
            return Ok(None);
        }

        match tokio::fs::read(self.folder.join(filename)).await {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("cv.pdf"));
        assert!(allowed_file("Photo.JPEG"));
        assert!(allowed_file("archive.tar.docx"));
        assert!(!allowed_file("script.sh"));
        assert!(!allowed_file("pdf"));
        assert!(!allowed_file(""));
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("My Resume.pdf"), "My_Resume.pdf");
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename(r"C:\Users\me\cv.doc"), "C_Users_me_cv.doc");
        assert_eq!(secure_filename("résumé (final).pdf"), "rsum_final.pdf");
        assert_eq!(secure_filename("..."), "");
    }

    #[tokio::test]
    async fn test_save_and_read() -> anyhow::Result<()> {
        let dir = temp_dir::TempDir::new()?;
        let store = UploadStore::new(dir.child("uploads"));
        let at = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 4, 5, 6, 7)
            .unwrap();

        let filename = store.save("My CV.pdf", b"%PDF", &at).await?;
        assert_eq!(filename, "20250304_050607_My_CV.pdf");
        assert_eq!(store.read(&filename).await?, Some(b"%PDF".to_vec()));

        Ok(())
    }

    #[tokio::test]
    async fn test_rejects_disallowed_type() -> anyhow::Result<()> {
        let dir = temp_dir::TempDir::new()?;
        let store = UploadStore::new(dir.path());
        let at = chrono::Local::now();

        let result = store.save("run.exe", b"MZ", &at).await;
        assert!(matches!(result, Err(UploadError::NotAllowed(_))));

        Ok(())
    }

    #[tokio::test]
    async fn test_read_refuses_traversal() -> anyhow::Result<()> {
        let dir = temp_dir::TempDir::new()?;
        std::fs::write(dir.child("secret.txt"), "s")?;
        let store = UploadStore::new(dir.child("uploads"));

        assert_eq!(store.read("../secret.txt").await?, None);
        assert_eq!(store.read("missing.txt").await?, None);

        Ok(())
    }
}
