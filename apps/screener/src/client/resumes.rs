//! Resume endpoints: listing, detail, upload, delete, download.

use std::path::Path;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Deserialize;
use tracing::info;

use crate::client::{parse_json, Ack, ApiClient};
use crate::errors::ApiError;
use crate::models::resume::{ResumeDetail, ResumeSummary, UploadReport, UploadResponse};

/// Upload limit enforced before anything touches the wire; the backend
/// applies the same cap.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct ResumesEnvelope {
    #[serde(default)]
    resumes: Vec<ResumeSummary>,
}

impl ApiClient {
    /// `GET /api/resumes/{id}/`
    pub async fn resume(&self, id: i64) -> Result<ResumeDetail, ApiError> {
        let response = self
            .http()
            .get(self.endpoint(&format!("/api/resumes/{id}/")))
            .send()
            .await?;
        parse_json(response).await
    }

    /// `GET /api/resumes/`
    pub async fn resumes(&self) -> Result<Vec<ResumeSummary>, ApiError> {
        let response = self
            .http()
            .get(self.endpoint("/api/resumes/"))
            .send()
            .await?;
        let envelope: ResumesEnvelope = parse_json(response).await?;
        Ok(envelope.resumes)
    }

    /// `POST /api/resumes/{id}/delete/`
    pub async fn delete_resume(&self, id: i64) -> Result<Option<String>, ApiError> {
        let request = self
            .mutating(Method::POST, &format!("/api/resumes/{id}/delete/"))
            .await?;
        let ack: Ack = parse_json(request.send().await?).await?;
        let message = ack.into_result()?;
        info!(resume_id = id, "Resume deleted");
        Ok(message)
    }

    /// `GET /api/resumes/{id}/download/` — raw PDF bytes.
    pub async fn download_resume(&self, id: i64) -> Result<Bytes, ApiError> {
        let response = self
            .http()
            .get(self.endpoint(&format!("/api/resumes/{id}/download/")))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: "Failed to download PDF".to_string(),
            });
        }
        Ok(response.bytes().await?)
    }

    /// `POST /api/upload-resume/` — one or more PDFs as multipart form data,
    /// each under the `resume_file` field. Files are validated locally first
    /// so an obviously bad selection never leaves the machine.
    pub async fn upload_resumes(&self, paths: &[impl AsRef<Path>]) -> Result<UploadReport, ApiError> {
        validate_resume_files(paths)?;

        let mut form = Form::new();
        for path in paths {
            let path = path.as_ref();
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| ApiError::Validation(format!("Cannot read {}: {e}", path.display())))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "resume.pdf".to_string());
            let part = Part::bytes(bytes)
                .file_name(file_name)
                .mime_str("application/pdf")?;
            form = form.part("resume_file", part);
        }

        let request = self.mutating(Method::POST, "/api/upload-resume/").await?;
        let response: UploadResponse = parse_json(request.multipart(form).send().await?).await?;
        let report = UploadReport::from(response);
        info!(
            accepted = report.succeeded(),
            submitted = report.outcomes.len(),
            "Resume upload finished"
        );
        Ok(report)
    }
}

/// Pre-submit checks for a resume upload: at least one file, PDF extension,
/// each under the size cap.
pub fn validate_resume_files(paths: &[impl AsRef<Path>]) -> Result<(), ApiError> {
    if paths.is_empty() {
        return Err(ApiError::Validation(
            "Please select at least one PDF".to_string(),
        ));
    }
    for path in paths {
        let path = path.as_ref();
        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if !is_pdf {
            return Err(ApiError::Validation(
                "Please upload PDF files only".to_string(),
            ));
        }
        let size = std::fs::metadata(path)
            .map_err(|e| ApiError::Validation(format!("Cannot read {}: {e}", path.display())))?
            .len();
        if size > MAX_UPLOAD_BYTES {
            return Err(ApiError::Validation(
                "Each file must be smaller than 10MB".to_string(),
            ));
        }
    }
    Ok(())
}
