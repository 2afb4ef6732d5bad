//! Job-description endpoints.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Deserialize;
use tracing::info;

use crate::client::resumes::MAX_UPLOAD_BYTES;
use crate::client::{parse_json, Ack, ApiClient};
use crate::errors::ApiError;
use crate::models::catalog::JobDescription;

const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "txt", "doc", "docx"];

#[derive(Debug, Deserialize)]
struct JobDescriptionsEnvelope {
    #[serde(default)]
    job_descriptions: Vec<JobDescription>,
}

impl ApiClient {
    /// `GET /api/job-descriptions/`
    pub async fn job_descriptions(&self) -> Result<Vec<JobDescription>, ApiError> {
        let response = self
            .http()
            .get(self.endpoint("/api/job-descriptions/"))
            .send()
            .await?;
        let envelope: JobDescriptionsEnvelope = parse_json(response).await?;
        Ok(envelope.job_descriptions)
    }

    /// `POST /api/upload-job-description/` — multipart with a `title` text
    /// field and the document under `file`.
    pub async fn upload_job_description(
        &self,
        title: &str,
        path: impl AsRef<Path>,
    ) -> Result<Option<String>, ApiError> {
        let path = path.as_ref();
        validate_job_description(title, path)?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::Validation(format!("Cannot read {}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "job_description".to_string());
        let form = Form::new()
            .text("title", title.trim().to_string())
            .part("file", Part::bytes(bytes).file_name(file_name));

        let request = self
            .mutating(Method::POST, "/api/upload-job-description/")
            .await?;
        let ack: Ack = parse_json(request.multipart(form).send().await?).await?;
        let message = ack.into_result()?;
        info!(title, "Job description uploaded");
        Ok(message)
    }

    /// `DELETE /api/job-descriptions/{id}/delete/`
    pub async fn delete_job_description(&self, id: i64) -> Result<Option<String>, ApiError> {
        let request = self
            .mutating(Method::DELETE, &format!("/api/job-descriptions/{id}/delete/"))
            .await?;
        let ack: Ack = parse_json(request.send().await?).await?;
        let message = ack.into_result()?;
        info!(job_description_id = id, "Job description deleted");
        Ok(message)
    }
}

/// Pre-submit checks: non-empty title, allowed document type, size cap.
pub fn validate_job_description(title: &str, path: &Path) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    let allowed = path
        .extension()
        .map(|ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
        .unwrap_or(false);
    if !allowed {
        return Err(ApiError::Validation(
            "Please upload a PDF, TXT, DOC, or DOCX file".to_string(),
        ));
    }
    let size = std::fs::metadata(path)
        .map_err(|e| ApiError::Validation(format!("Cannot read {}: {e}", path.display())))?
        .len();
    if size > MAX_UPLOAD_BYTES {
        return Err(ApiError::Validation(
            "File size should be less than 10MB".to_string(),
        ));
    }
    Ok(())
}
