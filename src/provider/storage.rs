// src/provider/storage.rs — Object-storage write target
//
// Raw PUT of the file bytes to the issued destination, tagged with the
// file's Content-Type. Non-2xx is a hard failure for that file.

use async_trait::async_trait;

use super::StorageSink;
use crate::infra::errors::SheetlinkError;

pub struct HttpStorageSink {
    client: reqwest::Client,
}

impl HttpStorageSink {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpStorageSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageSink for HttpStorageSink {
    async fn put(
        &self,
        destination: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), SheetlinkError> {
        // The presigned URL embeds the object key; keep only the file name
        // out of it for error reporting.
        let file = file_name_of(destination);

        let response = self
            .client
            .put(destination)
            .header("content-type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| SheetlinkError::Transfer {
                file: file.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SheetlinkError::Transfer {
                file,
                message: format!("HTTP {status}: {error_body}"),
            });
        }
        Ok(())
    }
}

/// Last path segment of a destination URL, query string stripped.
fn file_name_of(destination: &str) -> String {
    url::Url::parse(destination)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|s| s.last().map(|p| p.to_string()))
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| destination.to_string())
}
