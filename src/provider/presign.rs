// src/provider/presign.rs — Presigned-URL destination issuer
//
// GET {endpoint}?fileName=..&fileType=.. against the configured Lambda URL;
// a 2xx response carries `{"uploadUrl": "..."}`. Anything else is a hard
// failure for that one file.

use async_trait::async_trait;
use serde::Deserialize;

use super::DestinationIssuer;
use crate::infra::errors::SheetlinkError;

pub struct PresignEndpoint {
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresignResponse {
    upload_url: String,
}

impl PresignEndpoint {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl DestinationIssuer for PresignEndpoint {
    async fn issue(&self, file_name: &str, file_type: &str) -> Result<String, SheetlinkError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("fileName", file_name), ("fileType", file_type)])
            .send()
            .await
            .map_err(|e| SheetlinkError::Destination {
                file: file_name.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SheetlinkError::Destination {
                file: file_name.to_string(),
                message: format!("HTTP {status}: {error_body}"),
            });
        }

        let parsed: PresignResponse =
            response
                .json()
                .await
                .map_err(|e| SheetlinkError::Destination {
                    file: file_name.to_string(),
                    message: format!("bad response body: {e}"),
                })?;
        Ok(parsed.upload_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_field_name() {
        // The issuing endpoint replies with camelCase `uploadUrl`
        let parsed: PresignResponse =
            serde_json::from_str(r#"{"uploadUrl":"https://bucket.s3.amazonaws.com/key?sig=x"}"#)
                .unwrap();
        assert_eq!(
            parsed.upload_url,
            "https://bucket.s3.amazonaws.com/key?sig=x"
        );
    }
}
