//! Wire types for job descriptions and email templates.

use serde::{Deserialize, Serialize};

/// One row of `GET /api/job-descriptions/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobDescription {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub upload_date: Option<String>,
}

/// Active email template from `GET /api/email-templates/get/`. The backend
/// falls back to a built-in invitation when nothing has been saved, so `id`
/// may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

impl EmailTemplate {
    /// Subject to use when the template field is blank.
    pub fn subject_or_default(&self) -> &str {
        if self.subject.is_empty() {
            "Interview Invitation"
        } else {
            &self.subject
        }
    }
}
