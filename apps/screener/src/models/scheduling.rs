//! Wire types for the email + calendar scheduling flow.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize, Serializer};

use crate::errors::ApiError;

/// Upcoming event from `GET /api/google-calendar/events/`. All-day events
/// carry bare dates in `start`/`end`, timed events RFC3339 datetimes; both
/// are kept verbatim.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub description: String,
}

/// Request body for `POST /api/send-email-calendar/`. Placeholder
/// substitution (`{candidate_name}`, `{position}`) happens on the backend.
#[derive(Debug, Clone, Serialize)]
pub struct InterviewInvite {
    pub resume_id: i64,
    pub candidate_email: String,
    pub subject: String,
    pub body: String,
    pub schedule_calendar: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_date: Option<NaiveDate>,
    #[serde(serialize_with = "hhmm", skip_serializing_if = "Option::is_none")]
    pub interview_time: Option<NaiveTime>,
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    pub location: String,
}

impl InterviewInvite {
    pub fn new(resume_id: i64, candidate_email: impl Into<String>) -> Self {
        InterviewInvite {
            resume_id,
            candidate_email: candidate_email.into(),
            subject: "Interview Invitation".to_string(),
            body: String::new(),
            schedule_calendar: false,
            interview_date: None,
            interview_time: None,
            duration_minutes: 60,
            location: String::new(),
        }
    }

    /// Pre-submit checks. Failures block the request; nothing is sent.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.candidate_email.trim().is_empty() || !self.candidate_email.contains('@') {
            return Err(ApiError::Validation(
                "Candidate email is required".to_string(),
            ));
        }
        if self.schedule_calendar && (self.interview_date.is_none() || self.interview_time.is_none())
        {
            return Err(ApiError::Validation(
                "Interview date and time are required when scheduling a calendar event".to_string(),
            ));
        }
        Ok(())
    }
}

/// The backend serves times as `HH:MM`, matching the form inputs it was
/// built against.
fn hhmm<S: Serializer>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
    match time {
        Some(t) => serializer.serialize_str(&t.format("%H:%M").to_string()),
        None => serializer.serialize_none(),
    }
}

/// Links handed back after a successful scheduling request. The caller
/// opens them; nothing is delivered server-side.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleLinks {
    #[serde(default)]
    pub mailto_link: String,
    #[serde(default)]
    pub calendar_link: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
