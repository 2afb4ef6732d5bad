//! Analysis view rendering.
//!
//! Pure functions from fetched resume state to an HTML fragment. The caller
//! hands in raw backend data; this module guarantees that no unescaped text
//! from it ever reaches the markup. Absent or partial analysis payloads
//! render as empty states, never as panics.

use serde_json::Value;

use crate::models::resume::{
    AnalysisData, EducationItem, ExperienceItem, FinalDecision, ResumeDetail, ResumeStatus, Skill,
};

/// Visual band for an overall score, matching the dashboard badge colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    High,
    Mid,
    Low,
}

impl ScoreBand {
    pub fn from_score(score: i64) -> Self {
        if score >= 80 {
            ScoreBand::High
        } else if score >= 70 {
            ScoreBand::Mid
        } else {
            ScoreBand::Low
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            ScoreBand::High => "score-success",
            ScoreBand::Mid => "score-warning",
            ScoreBand::Low => "score-danger",
        }
    }
}

/// Escapes the five HTML-significant characters. Everything user-controlled
/// passes through here before insertion.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Formats a backend date string for display, e.g. "Mar 14, 2025". Strings
/// that do not parse come back unchanged.
pub fn format_date(raw: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.format("%b %-d, %Y").to_string();
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%b %-d, %Y").to_string();
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format("%b %-d, %Y").to_string();
    }
    raw.to_string()
}

/// Renders the analysis page body for one resume. Non-completed statuses get
/// a placeholder instead of the analysis grid.
pub fn render_analysis(detail: &ResumeDetail) -> String {
    match detail.status {
        ResumeStatus::Failed => {
            return r#"<div class="analysis-section card analysis-placeholder">
  <h3>Analysis failed</h3>
  <p>The resume could not be analyzed. You can delete it and upload it again.</p>
</div>"#
                .to_string();
        }
        ResumeStatus::Completed => {}
        _ => {
            return r#"<div class="analysis-section card analysis-placeholder">
  <h3>Resume is being reviewed...</h3>
  <p>Please wait while we analyze the resume. This may take a few moments.</p>
</div>"#
                .to_string();
        }
    }

    let empty = AnalysisData::default();
    let analysis = detail.analysis_data.as_ref().unwrap_or(&empty);
    let info = &analysis.candidate_info;

    let name = if !info.name.is_empty() {
        &info.name
    } else if !detail.file_name.is_empty() {
        &detail.file_name
    } else {
        "Unknown"
    };

    let mut contact = String::new();
    contact.push_str(&escape_html(if info.email.is_empty() {
        "N/A"
    } else {
        &info.email
    }));
    for extra in [&info.phone_number, &info.address] {
        if !extra.is_empty() {
            contact.push_str(" &bull; ");
            contact.push_str(&escape_html(extra));
        }
    }
    if !info.candidate_applied_for.is_empty() {
        contact.push_str(" &bull; Applied for: ");
        contact.push_str(&escape_html(&info.candidate_applied_for));
    }
    if !info.linkedin_url.is_empty() {
        contact.push_str(&format!(
            r#" &bull; <a href="{}" target="_blank" rel="noopener noreferrer">LinkedIn</a>"#,
            escape_html(&info.linkedin_url)
        ));
    }

    let score = detail.overall_score.unwrap_or(0);
    let band = ScoreBand::from_score(score);

    let mut html = String::new();
    html.push_str(&format!(
        r#"<div class="candidate-header">
  <h2 id="candidate-name">{}</h2>
  <p id="candidate-contact">{}</p>
  <div id="score-circle" class="{}"><span id="score-value">{}%</span></div>
</div>
"#,
        escape_html(name),
        contact,
        band.css_class(),
        score
    ));

    if !analysis.summary.is_empty() {
        html.push_str(&section("Summary", &paragraph(&analysis.summary)));
    }
    html.push_str(&section("Skills", &render_skills(&analysis.skills)));
    html.push_str(&section("Experience", &render_experience(&analysis.experience)));
    html.push_str(&section("Education", &render_education(&analysis.education)));
    html.push_str(&section("Languages", &render_languages(&analysis.languages)));
    html.push_str(&section("Projects", &render_projects(&analysis.projects)));
    if !analysis.total_experience.is_empty() {
        html.push_str(&section(
            "Total Experience",
            &paragraph(&analysis.total_experience),
        ));
    }
    for (title, text) in [
        ("Recommendations", &analysis.recommendations),
        ("Why Hire", &analysis.why_hire),
        ("Why Not Hire", &analysis.why_not_hire),
        ("Explanation", &analysis.explanation),
    ] {
        if !text.is_empty() {
            html.push_str(&section(title, &paragraph(text)));
        }
    }
    if let Some(decision) = &analysis.final_decision {
        html.push_str(&section("Final Decision", &render_decision(decision)));
    }
    if analysis.needs_human_review {
        html.push_str(r#"<span id="needs-review-badge" class="status-badge">Needs Human Review</span>"#);
        html.push('\n');
    }

    html
}

fn section(title: &str, body: &str) -> String {
    format!(
        "<div class=\"analysis-section card\">\n  <h4>{title}</h4>\n{body}</div>\n"
    )
}

fn paragraph(text: &str) -> String {
    format!("  <p>{}</p>\n", escape_html(text))
}

fn render_skills(skills: &[Skill]) -> String {
    if skills.is_empty() {
        return empty_state("No skill data available");
    }
    let mut out = String::new();
    for skill in skills {
        // Missing match percentages render as N/A with an empty bar.
        let width = skill
            .match_pct
            .map(|pct| pct.clamp(0.0, 100.0).round() as i64)
            .unwrap_or(0);
        let label = match skill.match_pct {
            Some(_) => format!("{width}%"),
            None => "N/A".to_string(),
        };
        out.push_str(&format!(
            r#"  <div class="skill-item">
    <span class="skill-name">{}</span> <span class="skill-match">{}</span>
    <div class="skill-bar"><div class="skill-bar-fill" style="width: {}%"></div></div>
  </div>
"#,
            escape_html(&skill.name),
            label,
            width
        ));
    }
    out
}

fn render_experience(items: &[ExperienceItem]) -> String {
    if items.is_empty() {
        return empty_state("No experience data available");
    }
    items
        .iter()
        .map(|exp| {
            format!(
                r#"  <div class="experience-item">
    <h5>{}</h5>
    <p><strong>{}</strong> &bull; {}</p>
    <p>{}</p>
  </div>
"#,
                escape_html(&exp.title),
                escape_html(&exp.company),
                escape_html(&exp.duration),
                escape_html(&exp.description)
            )
        })
        .collect()
}

fn render_education(items: &[EducationItem]) -> String {
    if items.is_empty() {
        return empty_state("No education data available");
    }
    items
        .iter()
        .map(|edu| {
            let description = if edu.description.is_empty() {
                String::new()
            } else {
                format!("    <p>{}</p>\n", escape_html(&edu.description))
            };
            format!(
                r#"  <div class="education-item">
    <h5>{}</h5>
    <p><strong>{}</strong> &bull; {}</p>
{}  </div>
"#,
                escape_html(&edu.degree),
                escape_html(&edu.university),
                escape_html(&edu.year),
                description
            )
        })
        .collect()
}

fn render_languages(languages: &[String]) -> String {
    if languages.is_empty() {
        return empty_state("No language data available");
    }
    let tags: Vec<String> = languages
        .iter()
        .map(|lang| format!("<span class=\"language-tag\">{}</span>", escape_html(lang)))
        .collect();
    format!("  {}\n", tags.join(" "))
}

fn render_projects(projects: &[String]) -> String {
    if projects.is_empty() {
        return empty_state("No project data available");
    }
    projects
        .iter()
        .map(|project| {
            format!(
                "  <div class=\"project-item\"><p>{}</p></div>\n",
                escape_html(project)
            )
        })
        .collect()
}

fn render_decision(decision: &FinalDecision) -> String {
    let mut out = String::new();
    if !decision.selected_for_applied_position.is_empty() {
        out.push_str(&format!(
            "  <p><strong>Selected for Applied Position:</strong> {}</p>\n",
            escape_html(&decision.selected_for_applied_position)
        ));
    }
    if !decision.preferred_other_position.is_empty() {
        out.push_str(&format!(
            "  <p><strong>Preferred Other Positions:</strong> {}</p>\n",
            escape_html(&decision.preferred_other_position)
        ));
    }
    let final_score = decision.final_score.as_ref().map(value_text).unwrap_or_default();
    if !final_score.is_empty() {
        out.push_str(&format!(
            "  <p><strong>Final Score:</strong> {}</p>\n",
            escape_html(&final_score)
        ));
    }
    if out.is_empty() {
        return empty_state("No decision data available");
    }
    out
}

/// Stringifies a JSON scalar the backend should have sent as a string.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn empty_state(message: &str) -> String {
    format!("  <p class=\"empty-state\">{message}</p>\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::CandidateInfo;

    fn completed_detail(score: i64) -> ResumeDetail {
        ResumeDetail {
            id: 1,
            file_name: "ada.pdf".to_string(),
            status: ResumeStatus::Completed,
            overall_score: Some(score),
            ..Default::default()
        }
    }

    #[test]
    fn test_escape_html_covers_all_five_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#039;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_never_emits_raw_script_tag() {
        let mut detail = completed_detail(85);
        detail.analysis_data = Some(AnalysisData {
            candidate_info: CandidateInfo {
                name: "<script>alert(1)</script>".to_string(),
                email: "a&b@example.com".to_string(),
                ..Default::default()
            },
            summary: "summary with <b>markup</b>".to_string(),
            skills: vec![Skill {
                name: "C++ & Rust".to_string(),
                match_pct: Some(90.0),
            }],
            ..Default::default()
        });
        let html = render_analysis(&detail);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a&amp;b@example.com"));
        assert!(html.contains("C++ &amp; Rust"));
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::from_score(85), ScoreBand::High);
        assert_eq!(ScoreBand::from_score(80), ScoreBand::High);
        assert_eq!(ScoreBand::from_score(79), ScoreBand::Mid);
        assert_eq!(ScoreBand::from_score(72), ScoreBand::Mid);
        assert_eq!(ScoreBand::from_score(70), ScoreBand::Mid);
        assert_eq!(ScoreBand::from_score(40), ScoreBand::Low);
    }

    #[test]
    fn test_rendered_score_uses_band_class() {
        assert!(render_analysis(&completed_detail(85)).contains("score-success"));
        assert!(render_analysis(&completed_detail(72)).contains("score-warning"));
        assert!(render_analysis(&completed_detail(40)).contains("score-danger"));
    }

    #[test]
    fn test_pending_renders_placeholder() {
        let detail = ResumeDetail {
            status: ResumeStatus::Pending,
            ..Default::default()
        };
        let html = render_analysis(&detail);
        assert!(html.contains("being reviewed"));
        assert!(!html.contains("score-circle"));
    }

    #[test]
    fn test_failed_renders_failure_notice() {
        let detail = ResumeDetail {
            status: ResumeStatus::Failed,
            ..Default::default()
        };
        assert!(render_analysis(&detail).contains("Analysis failed"));
    }

    #[test]
    fn test_completed_without_analysis_payload_does_not_panic() {
        let html = render_analysis(&completed_detail(0));
        assert!(html.contains("No skill data available"));
        assert!(html.contains("ada.pdf"));
    }

    #[test]
    fn test_skill_match_clamped_to_100() {
        let mut detail = completed_detail(85);
        detail.analysis_data = Some(AnalysisData {
            skills: vec![Skill {
                name: "Rust".to_string(),
                match_pct: Some(250.0),
            }],
            ..Default::default()
        });
        let html = render_analysis(&detail);
        assert!(html.contains("width: 100%"));
    }

    #[test]
    fn test_format_date_variants() {
        assert_eq!(format_date("2025-03-14T09:30:00+00:00"), "Mar 14, 2025");
        assert_eq!(format_date("2025-03-14T09:30:00.123456"), "Mar 14, 2025");
        assert_eq!(format_date("2025-03-14"), "Mar 14, 2025");
        assert_eq!(format_date("not a date"), "not a date");
    }

    #[test]
    fn test_numeric_final_score_renders() {
        let mut detail = completed_detail(85);
        detail.analysis_data = Some(AnalysisData {
            final_decision: Some(FinalDecision {
                final_score: Some(serde_json::json!(87)),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert!(render_analysis(&detail).contains("Final Score:</strong> 87"));
    }
}
