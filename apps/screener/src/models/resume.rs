//! Wire types for the resume endpoints.
//!
//! The backend owns parsing and scoring; everything it hands back is treated
//! as untrusted and optional. Every field here deserializes with a default so
//! a partial or malformed payload degrades to an empty view instead of a
//! decode failure mid-poll.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Review status of an uploaded resume. Transitions happen on the backend;
/// this side only observes them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    /// Anything the backend invents later. Treated as still-in-review so a
    /// malformed status never ends up looking terminal.
    #[serde(other)]
    Unknown,
}

impl ResumeStatus {
    /// Terminal statuses end the polling loop; nothing else does.
    pub fn is_terminal(self) -> bool {
        matches!(self, ResumeStatus::Completed | ResumeStatus::Failed)
    }
}

/// Full single-resume payload from `GET /api/resumes/{id}/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeDetail {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub status: ResumeStatus,
    #[serde(default)]
    pub overall_score: Option<i64>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_analysis")]
    pub analysis_data: Option<AnalysisData>,
}

/// One row of `GET /api/resumes/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeSummary {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub status: ResumeStatus,
    #[serde(default)]
    pub overall_score: Option<i64>,
    #[serde(default)]
    pub candidate_name: String,
    #[serde(default)]
    pub candidate_email: String,
    #[serde(default)]
    pub candidate_applied_for: String,
}

/// Analysis payload produced by the backend's review pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisData {
    #[serde(default)]
    pub candidate_info: CandidateInfo,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub experience: Vec<ExperienceItem>,
    #[serde(default)]
    pub education: Vec<EducationItem>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub total_experience: String,
    #[serde(default)]
    pub recommendations: String,
    #[serde(default)]
    pub why_hire: String,
    #[serde(default)]
    pub why_not_hire: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub final_decision: Option<FinalDecision>,
    #[serde(default)]
    pub needs_human_review: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub candidate_applied_for: String,
    #[serde(default)]
    pub linkedin_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Skill {
    #[serde(default)]
    pub name: String,
    /// Match percentage 0–100. The backend sometimes omits it.
    #[serde(rename = "match", default)]
    pub match_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExperienceItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EducationItem {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub university: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinalDecision {
    #[serde(default)]
    pub selected_for_applied_position: String,
    #[serde(default)]
    pub preferred_other_position: String,
    /// The backend has emitted both strings and numbers here.
    #[serde(default)]
    pub final_score: Option<Value>,
}

/// Accepts whatever `analysis_data` contains. A payload that is absent,
/// null, or not the object we expect becomes `None` rather than an error.
fn lenient_analysis<'de, D>(deserializer: D) -> Result<Option<AnalysisData>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Per-file result of an upload batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadOutcome {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub resume_id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /api/upload-resume/` answers with a bare object for a single file
/// and a `results` array for a batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UploadResponse {
    Batch { results: Vec<UploadOutcome> },
    Single(UploadOutcome),
}

/// Normalized upload result, one outcome per submitted file.
#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    pub outcomes: Vec<UploadOutcome>,
}

impl From<UploadResponse> for UploadReport {
    fn from(response: UploadResponse) -> Self {
        let outcomes = match response {
            UploadResponse::Batch { results } => results,
            UploadResponse::Single(outcome) => vec![outcome],
        };
        UploadReport { outcomes }
    }
}

impl UploadReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn all_succeeded(&self) -> bool {
        !self.outcomes.is_empty() && self.succeeded() == self.outcomes.len()
    }

    /// First per-file error, for surfacing when nothing was accepted.
    pub fn first_error(&self) -> Option<&str> {
        self.outcomes.iter().find_map(|o| o.error.as_deref())
    }

    pub fn summary(&self) -> String {
        format!(
            "Uploaded {}/{} resumes successfully",
            self.succeeded(),
            self.outcomes.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_deserializes_lowercase() {
        let status: ResumeStatus = serde_json::from_str("\"processing\"").unwrap();
        assert_eq!(status, ResumeStatus::Processing);
    }

    #[test]
    fn test_unknown_status_is_not_terminal() {
        let status: ResumeStatus = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(status, ResumeStatus::Unknown);
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(ResumeStatus::Completed.is_terminal());
        assert!(ResumeStatus::Failed.is_terminal());
        assert!(!ResumeStatus::Pending.is_terminal());
        assert!(!ResumeStatus::Processing.is_terminal());
    }

    #[test]
    fn test_detail_tolerates_missing_fields() {
        let detail: ResumeDetail = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert_eq!(detail.id, 7);
        assert_eq!(detail.status, ResumeStatus::Pending);
        assert!(detail.analysis_data.is_none());
        assert!(detail.overall_score.is_none());
    }

    #[test]
    fn test_detail_tolerates_malformed_analysis_payload() {
        let detail: ResumeDetail = serde_json::from_str(
            r#"{"id": 7, "status": "completed", "analysis_data": "not an object"}"#,
        )
        .unwrap();
        assert_eq!(detail.status, ResumeStatus::Completed);
        assert!(detail.analysis_data.is_none());
    }

    #[test]
    fn test_detail_parses_partial_analysis() {
        let detail: ResumeDetail = serde_json::from_str(
            r#"{
                "id": 7,
                "status": "completed",
                "overall_score": 85,
                "analysis_data": {
                    "candidate_info": {"name": "Ada"},
                    "skills": [{"name": "Rust", "match": 92.0}, {"name": "Go"}]
                }
            }"#,
        )
        .unwrap();
        let analysis = detail.analysis_data.unwrap();
        assert_eq!(analysis.candidate_info.name, "Ada");
        assert_eq!(analysis.skills.len(), 2);
        assert_eq!(analysis.skills[0].match_pct, Some(92.0));
        assert!(analysis.skills[1].match_pct.is_none());
    }

    #[test]
    fn test_upload_response_single() {
        let response: UploadResponse = serde_json::from_str(
            r#"{"success": true, "resume_id": 3, "message": "ok"}"#,
        )
        .unwrap();
        let report = UploadReport::from(response);
        assert_eq!(report.outcomes.len(), 1);
        assert!(report.all_succeeded());
    }

    #[test]
    fn test_upload_response_batch() {
        let response: UploadResponse = serde_json::from_str(
            r#"{"results": [
                {"file_name": "a.pdf", "success": true, "resume_id": 1},
                {"file_name": "b.pdf", "success": false, "error": "Only PDF files are allowed"}
            ]}"#,
        )
        .unwrap();
        let report = UploadReport::from(response);
        assert_eq!(report.succeeded(), 1);
        assert!(!report.all_succeeded());
        assert_eq!(report.first_error(), Some("Only PDF files are allowed"));
        assert_eq!(report.summary(), "Uploaded 1/2 resumes successfully");
    }
}
