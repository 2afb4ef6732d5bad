//! Dashboard view model: search, score filtering, and pagination over the
//! resume list.
//!
//! All state lives in one `Dashboard` instance owned by the caller; there is
//! no shared module-level state. Rendered rows and pagination controls use
//! `data-*` attributes so the embedding layer wires events up at render time.

use crate::models::resume::{ResumeStatus, ResumeSummary};
use crate::render::{escape_html, format_date, ScoreBand};

/// Inclusive score range, parsed from filter values like `"80-100"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreRange {
    pub min: i64,
    pub max: i64,
}

impl ScoreRange {
    pub fn parse(value: &str) -> Option<Self> {
        let (min, max) = value.split_once('-')?;
        let min = min.trim().parse().ok()?;
        let max = max.trim().parse().ok()?;
        if min > max {
            return None;
        }
        Some(ScoreRange { min, max })
    }

    pub fn contains(&self, score: i64) -> bool {
        score >= self.min && score <= self.max
    }
}

pub struct Dashboard {
    resumes: Vec<ResumeSummary>,
    query: String,
    score_filter: Option<ScoreRange>,
    page: usize,
    page_size: usize,
}

impl Dashboard {
    pub fn new(page_size: usize) -> Self {
        Dashboard {
            resumes: Vec::new(),
            query: String::new(),
            score_filter: None,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Replaces the full resume list, keeping filters. The current page is
    /// clamped against the new length on the next read.
    pub fn set_resumes(&mut self, resumes: Vec<ResumeSummary>) {
        self.resumes = resumes;
    }

    /// Case-insensitive substring search over file names. Resets to page 1.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.trim().to_lowercase();
        self.page = 1;
    }

    pub fn set_score_filter(&mut self, range: Option<ScoreRange>) {
        self.score_filter = range;
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.query.clear();
        self.score_filter = None;
        self.page = 1;
    }

    /// Out-of-range pages clamp rather than error.
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn filtered(&self) -> Vec<&ResumeSummary> {
        self.resumes
            .iter()
            .filter(|resume| {
                self.query.is_empty() || resume.file_name.to_lowercase().contains(&self.query)
            })
            .filter(|resume| {
                self.score_filter
                    .map(|range| range.contains(resume.overall_score.unwrap_or(0)))
                    .unwrap_or(true)
            })
            .collect()
    }

    pub fn page_count(&self) -> usize {
        self.filtered().len().div_ceil(self.page_size)
    }

    /// The requested page clamped into `1..=page_count` (1 when empty).
    pub fn current_page(&self) -> usize {
        self.page.clamp(1, self.page_count().max(1))
    }

    pub fn page_items(&self) -> Vec<&ResumeSummary> {
        let filtered = self.filtered();
        let start = (self.current_page() - 1) * self.page_size;
        filtered
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect()
    }

    pub fn total(&self) -> usize {
        self.resumes.len()
    }

    /// Rounded mean of overall scores across the full (unfiltered) list.
    pub fn average_score(&self) -> i64 {
        if self.resumes.is_empty() {
            return 0;
        }
        let sum: i64 = self
            .resumes
            .iter()
            .map(|r| r.overall_score.unwrap_or(0))
            .sum();
        (sum as f64 / self.resumes.len() as f64).round() as i64
    }

    /// Renders the visible page as table rows.
    pub fn render_rows(&self) -> String {
        let items = self.page_items();
        if items.is_empty() {
            return r#"<tr class="empty-row"><td colspan="6" class="text-center">No resumes found matching your criteria.</td></tr>
"#
            .to_string();
        }
        items.iter().map(|resume| render_row(resume)).collect()
    }

    /// Renders the pagination strip: first, last, current ± 2, with
    /// ellipses in between. Empty when everything fits on one page.
    pub fn render_pagination(&self) -> String {
        let total = self.page_count();
        if total <= 1 {
            return String::new();
        }
        let current = self.current_page();

        let mut out = String::new();
        out.push_str(&format!(
            "<button class=\"pagination-btn\"{} data-page=\"{}\">Previous</button>\n",
            disabled(current == 1),
            current.saturating_sub(1).max(1)
        ));
        for page in 1..=total {
            let near = page + 2 >= current && page <= current + 2;
            if page == 1 || page == total || near {
                let active = if page == current { " active" } else { "" };
                out.push_str(&format!(
                    "<button class=\"pagination-btn{active}\" data-page=\"{page}\">{page}</button>\n"
                ));
            } else if page + 3 == current || page == current + 3 {
                out.push_str("<span class=\"pagination-ellipsis\">...</span>\n");
            }
        }
        out.push_str(&format!(
            "<button class=\"pagination-btn\"{} data-page=\"{}\">Next</button>\n",
            disabled(current == total),
            (current + 1).min(total)
        ));
        out
    }
}

fn disabled(condition: bool) -> &'static str {
    if condition {
        " disabled"
    } else {
        ""
    }
}

fn render_row(resume: &ResumeSummary) -> String {
    let status_badge = match resume.status {
        ResumeStatus::Completed => String::new(),
        ResumeStatus::Failed => {
            "<br><span class=\"status-badge status-failed\">Failed</span>".to_string()
        }
        _ => "<br><span class=\"status-badge status-reviewing\">Reviewing...</span>".to_string(),
    };

    let score_cell = if resume.status == ResumeStatus::Completed {
        let score = resume.overall_score.unwrap_or(0);
        format!(
            "<span class=\"score-badge {}\">{}%</span>",
            ScoreBand::from_score(score).css_class(),
            score
        )
    } else {
        "<span class=\"score-badge\">-</span>".to_string()
    };

    let view_link = if resume.status == ResumeStatus::Completed {
        format!(
            "<a href=\"/analysis/{}/\" class=\"btn btn-sm btn-primary\">View</a> ",
            resume.id
        )
    } else {
        String::new()
    };

    let date = resume
        .created_at
        .as_deref()
        .or(resume.upload_date.as_deref())
        .map(format_date)
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        r#"<tr>
  <td>{name}{status_badge}</td>
  <td>{email}</td>
  <td>{applied_for}</td>
  <td>{date}</td>
  <td>{score_cell}</td>
  <td>{view_link}<button class="btn btn-sm btn-danger" data-action="delete-resume" data-resume-id="{id}">Delete</button></td>
</tr>
"#,
        name = text_or_na(&resume.candidate_name),
        email = text_or_na(&resume.candidate_email),
        applied_for = text_or_na(&resume.candidate_applied_for),
        date = escape_html(&date),
        id = resume.id,
    )
}

fn text_or_na(text: &str) -> String {
    if text.is_empty() {
        "N/A".to_string()
    } else {
        escape_html(text)
    }
}
