//! Calendar events and the email + calendar scheduling flow.

use reqwest::Method;
use serde::Deserialize;
use tracing::info;

use crate::client::{parse_json, ApiClient};
use crate::errors::ApiError;
use crate::models::scheduling::{CalendarEvent, InterviewInvite, ScheduleLinks};

#[derive(Debug, Deserialize)]
struct EventsEnvelope {
    #[serde(default)]
    events: Vec<CalendarEvent>,
}

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    mailto_link: Option<String>,
    #[serde(default)]
    calendar_link: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiClient {
    /// `GET /api/google-calendar/events/` — upcoming events for the next 30
    /// days, or an error when no calendar is connected.
    pub async fn calendar_events(&self) -> Result<Vec<CalendarEvent>, ApiError> {
        let response = self
            .http()
            .get(self.endpoint("/api/google-calendar/events/"))
            .send()
            .await?;
        let envelope: EventsEnvelope = parse_json(response).await?;
        Ok(envelope.events)
    }

    /// `POST /api/send-email-calendar/` — validates the invite, submits it,
    /// and returns the `mailto:` and calendar links the backend built. The
    /// caller opens them; nothing is delivered from here.
    pub async fn send_interview_invite(
        &self,
        invite: &InterviewInvite,
    ) -> Result<ScheduleLinks, ApiError> {
        invite.validate()?;

        let request = self.mutating(Method::POST, "/api/send-email-calendar/").await?;
        let response: ScheduleResponse =
            parse_json(request.json(invite).send().await?).await?;

        if !response.success {
            return Err(ApiError::Rejected(
                response
                    .error
                    .unwrap_or_else(|| "Failed to send email".to_string()),
            ));
        }

        info!(resume_id = invite.resume_id, "Interview invite prepared");
        Ok(ScheduleLinks {
            mailto_link: response.mailto_link.unwrap_or_default(),
            calendar_link: response.calendar_link,
            message: response.message,
        })
    }
}
