// src/upload/mod.rs — Upload batch manager
//
// Owns the selected-file set, validates additions against the allowed
// extensions and the batch cap, and runs the concurrent two-step upload
// protocol (issue destination, then PUT the bytes) with an all-settle join:
// a slow or failing file never blocks or cancels its siblings.
//
//   Empty → Selected → Uploading → { Empty on full success,
//                                    Selected on any failure }
//
// On failure the original batch is retained untouched so the whole set can
// be re-attempted; files are cleared only after every one of them landed.

use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;

use crate::infra::errors::SheetlinkError;
use crate::provider::{DestinationIssuer, StorageSink};
use crate::util::truncate_str;

/// Hard cap on how many files one batch may carry.
pub const MAX_BATCH_FILES: usize = 10;

/// Client-side extension filter, matching what the service accepts.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "xlsx", "xls"];

/// One user-chosen document queued for transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = mime_for(&extension_of(&name)).to_string();
        Self {
            name,
            mime_type,
            bytes,
        }
    }

    /// Read a file from disk into a selection candidate.
    pub fn from_path(path: &Path) -> Result<Self, SheetlinkError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                SheetlinkError::Validation(format!("{}: not a readable file name", path.display()))
            })?
            .to_string();
        let bytes = std::fs::read(path)?;
        Ok(Self::new(name, bytes))
    }

    /// Lower-cased suffix of the file name.
    pub fn extension(&self) -> String {
        extension_of(&self.name)
    }

    pub fn is_allowed(&self) -> bool {
        let ext = self.extension();
        ALLOWED_EXTENSIONS.contains(&ext.as_str())
    }
}

fn extension_of(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

fn mime_for(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        _ => "application/octet-stream",
    }
}

/// Shared status of the whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Idle,
    Uploading,
    Succeeded,
    Failed,
}

/// Coarse view of where the manager sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Empty,
    Selected,
    Uploading,
}

/// What an `add_files` call did to the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// All filtered candidates fit; batch now holds `total` files.
    Added { total: usize },
    /// Some filtered candidates were dropped at the cap.
    Truncated { total: usize, dropped: usize },
    /// No candidate had an allowed extension; batch unchanged.
    RejectedAll,
}

pub struct UploadBatch {
    issuer: Arc<dyn DestinationIssuer>,
    sink: Arc<dyn StorageSink>,
    items: Vec<SelectedFile>,
    uploading: bool,
    status: BatchStatus,
    status_message: String,
}

impl UploadBatch {
    pub fn new(issuer: Arc<dyn DestinationIssuer>, sink: Arc<dyn StorageSink>) -> Self {
        Self {
            issuer,
            sink,
            items: Vec::new(),
            uploading: false,
            status: BatchStatus::Idle,
            status_message: String::new(),
        }
    }

    pub fn items(&self) -> &[SelectedFile] {
        &self.items
    }

    pub fn state(&self) -> BatchState {
        if self.uploading {
            BatchState::Uploading
        } else if self.items.is_empty() {
            BatchState::Empty
        } else {
            BatchState::Selected
        }
    }

    pub fn status(&self) -> BatchStatus {
        self.status
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Add candidates to the batch.
    ///
    /// Candidates are filtered to the allowed extensions and appended to the
    /// current selection in input order, up to the batch cap. Accumulating
    /// (rather than replacing the whole batch per gesture) means a user who
    /// selects files in two rounds keeps the first round.
    pub fn add_files(&mut self, candidates: Vec<SelectedFile>) -> AddOutcome {
        let valid: Vec<SelectedFile> = candidates.into_iter().filter(|f| f.is_allowed()).collect();

        if valid.is_empty() {
            self.status_message = "Only PDF or Excel files (.pdf, .xlsx, .xls) are accepted".into();
            return AddOutcome::RejectedAll;
        }

        let room = MAX_BATCH_FILES.saturating_sub(self.items.len());
        let dropped = valid.len().saturating_sub(room);
        self.items.extend(valid.into_iter().take(room));

        if dropped > 0 {
            self.status_message = format!(
                "At most {MAX_BATCH_FILES} files can be uploaded at once; {dropped} dropped"
            );
            AddOutcome::Truncated {
                total: self.items.len(),
                dropped,
            }
        } else {
            self.status_message = format!("{} files selected", self.items.len());
            AddOutcome::Added {
                total: self.items.len(),
            }
        }
    }

    /// Drop the selection and return to `Empty`.
    pub fn clear(&mut self) {
        self.items.clear();
        self.status = BatchStatus::Idle;
        self.status_message.clear();
    }

    /// Transfer every selected file concurrently and wait for all of them
    /// to settle.
    ///
    /// Each file runs its own two-step task (issue destination, PUT bytes);
    /// the tasks are joined with `join_all` over `Result`-returning futures,
    /// so every file gets its chance to complete or fail on its own and no
    /// failure aborts a sibling. Full success clears the batch; any failure
    /// retains it wholesale for a re-attempt.
    pub async fn upload(&mut self) -> Result<usize, SheetlinkError> {
        if self.items.is_empty() {
            self.status_message = "Select files before uploading".into();
            return Err(SheetlinkError::Validation(self.status_message.clone()));
        }
        if self.uploading {
            return Err(SheetlinkError::Validation(
                "an upload is already in progress".into(),
            ));
        }

        let count = self.items.len();
        self.uploading = true;
        self.status = BatchStatus::Uploading;
        self.status_message = format!("Uploading {count} files...");
        tracing::info!("uploading {count} files");

        // The fan-out reads the batch but never mutates it mid-flight; each
        // task gets its own copy of the payload.
        let tasks = self.items.iter().map(|file| {
            let issuer = Arc::clone(&self.issuer);
            let sink = Arc::clone(&self.sink);
            let name = file.name.clone();
            let mime_type = file.mime_type.clone();
            let bytes = file.bytes.clone();
            async move {
                let destination = issuer.issue(&name, &mime_type).await?;
                sink.put(&destination, &mime_type, bytes)
                    .await
                    .map_err(|e| match e {
                        SheetlinkError::Transfer { message, .. } => SheetlinkError::Transfer {
                            file: name.clone(),
                            message,
                        },
                        other => SheetlinkError::Transfer {
                            file: name.clone(),
                            message: other.to_string(),
                        },
                    })?;
                Ok::<(), SheetlinkError>(())
            }
        });

        let results = join_all(tasks).await;
        self.uploading = false;

        let failures: Vec<&SheetlinkError> =
            results.iter().filter_map(|r| r.as_ref().err()).collect();

        if failures.is_empty() {
            self.items.clear();
            self.status = BatchStatus::Succeeded;
            self.status_message = format!("Done. {count} files uploaded.");
            tracing::info!("all {count} files uploaded");
            return Ok(count);
        }

        // One representative error names the failure; the rest are counted.
        let first = failures[0];
        let mut message = format!("Upload failed: {}", truncate_str(&first.to_string(), 200));
        if failures.len() > 1 {
            message.push_str(&format!(" ({} more files failed)", failures.len() - 1));
        }
        for f in &failures {
            tracing::warn!("upload failure: {f}");
        }
        self.status = BatchStatus::Failed;
        self.status_message = message.clone();
        Err(SheetlinkError::Transfer {
            file: first.file_name().unwrap_or("unknown").to_string(),
            message,
        })
    }
}
