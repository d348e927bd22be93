//! Multi-file document upload.
//!
//! Files go up one at a time, each awaited before the next starts. A file
//! over the size ceiling or of an unsupported type is skipped locally with a
//! warning. A failed upload does not stop the rest of the batch.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::api::Backend;
use crate::config::MAX_UPLOAD_BYTES;
use crate::error::{ApiError, Result};
use crate::models::{Document, DocumentUpload};
use crate::notify::{Notification, Notifier};

/// Which knowledge base a batch lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget {
    /// The tenant's own documents (`/api/documents/upload`).
    Tenant,
    /// The shared, admin-managed base (`/api/documents/global/upload`).
    Global,
}

/// Content type for an accepted file name, or `None` if the type is unsupported.
pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())?
        .to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "doc" => Some("application/msword"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        "txt" => Some("text/plain"),
        "csv" => Some("text/csv"),
        "xlsx" => Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        _ => None,
    }
}

#[derive(Debug, Clone)]
enum FileSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// One selected file. Contents are only read once the file passes the checks.
#[derive(Debug, Clone)]
pub struct UploadFile {
    name: String,
    size: u64,
    source: FileSource,
}

impl UploadFile {
    /// Stat a file on disk without reading it.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let meta = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file")
            .to_string();
        Ok(Self {
            name,
            size: meta.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            source: FileSource::Bytes(bytes),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Why this file must not be sent, if anything.
    pub fn check(&self) -> Option<SkipReason> {
        if self.size > MAX_UPLOAD_BYTES {
            return Some(SkipReason::TooLarge { size: self.size });
        }
        if content_type_for(&self.name).is_none() {
            return Some(SkipReason::UnsupportedType);
        }
        None
    }

    async fn into_upload(self) -> std::io::Result<DocumentUpload> {
        let content_type = content_type_for(&self.name).unwrap_or("application/octet-stream");
        let bytes = match self.source {
            FileSource::Bytes(b) => b,
            FileSource::Path(p) => tokio::fs::read(&p).await?,
        };
        Ok(DocumentUpload {
            file_name: self.name,
            content_type,
            bytes,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    TooLarge { size: u64 },
    UnsupportedType,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooLarge { size } => write!(
                f,
                "file is {:.1} MB, the limit is {} MB",
                *size as f64 / (1024.0 * 1024.0),
                MAX_UPLOAD_BYTES / (1024 * 1024)
            ),
            Self::UnsupportedType => write!(f, "unsupported file type"),
        }
    }
}

/// What happened to each file in a batch.
#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    /// Documents the backend confirmed, in selection order.
    pub accepted: Vec<Document>,
    pub skipped: Vec<(String, SkipReason)>,
    /// File name and the message shown to the user.
    pub failed: Vec<(String, String)>,
}

impl UploadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }
}

/// Upload a batch sequentially, reporting per-file outcomes.
pub async fn upload_all(
    backend: &dyn Backend,
    notifier: &dyn Notifier,
    target: UploadTarget,
    files: Vec<UploadFile>,
) -> UploadReport {
    let mut report = UploadReport::default();

    for file in files {
        let name = file.name.clone();

        if let Some(reason) = file.check() {
            warn!(file = %name, size = file.size, %reason, "Skipping upload");
            notifier.notify(Notification::warning(format!("{name} skipped: {reason}")));
            report.skipped.push((name, reason));
            continue;
        }

        let upload = match file.into_upload().await {
            Ok(u) => u,
            Err(e) => {
                warn!(file = %name, error = %e, "Could not read file for upload");
                notifier.notify(Notification::error(format!("{name}: could not read file")));
                report.failed.push((name, e.to_string()));
                continue;
            }
        };

        let result: std::result::Result<Document, ApiError> = match target {
            UploadTarget::Tenant => backend.upload_document(upload).await,
            UploadTarget::Global => backend.upload_global_document(upload).await,
        };

        match result {
            Ok(doc) => {
                info!(file = %name, document_id = %doc.id, "Document uploaded");
                report.accepted.push(doc);
            }
            Err(e) => {
                let message = e.user_message();
                warn!(file = %name, error = %e, "Document upload failed");
                notifier.notify(Notification::error(format!("{name}: {message}")));
                report.failed.push((name, message));
            }
        }
    }

    if !report.accepted.is_empty() {
        notifier.notify(Notification::success(format!(
            "{} document(s) uploaded",
            report.accepted.len()
        )));
    }

    report
}
