//! Email-template endpoints.

use reqwest::Method;
use serde::Serialize;
use tracing::info;

use crate::client::{parse_json, Ack, ApiClient};
use crate::errors::ApiError;
use crate::models::catalog::EmailTemplate;

#[derive(Debug, Serialize)]
struct SaveTemplateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    subject: &'a str,
    body: &'a str,
    is_active: bool,
}

impl ApiClient {
    /// `GET /api/email-templates/get/` — the active template, or the
    /// backend's built-in default when none has been saved.
    pub async fn active_email_template(&self) -> Result<EmailTemplate, ApiError> {
        let response = self
            .http()
            .get(self.endpoint("/api/email-templates/get/"))
            .send()
            .await?;
        parse_json(response).await
    }

    /// `POST /api/email-templates/` — create or update a template. Saving an
    /// active template deactivates the previous one server-side.
    pub async fn save_email_template(
        &self,
        id: Option<i64>,
        subject: &str,
        body: &str,
        is_active: bool,
    ) -> Result<Option<String>, ApiError> {
        if subject.trim().is_empty() || body.trim().is_empty() {
            return Err(ApiError::Validation(
                "Subject and body are required".to_string(),
            ));
        }

        let request = self.mutating(Method::POST, "/api/email-templates/").await?;
        let ack: Ack = parse_json(
            request
                .json(&SaveTemplateRequest {
                    id,
                    subject,
                    body,
                    is_active,
                })
                .send()
                .await?,
        )
        .await?;
        let message = ack.into_result()?;
        info!("Email template saved");
        Ok(message)
    }
}
