use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use screener::client::ApiClient;
use screener::config::Config;
use screener::dashboard::Dashboard;
use screener::models::resume::ResumeDetail;
use screener::models::scheduling::InterviewInvite;
use screener::watch::{AnalysisWatcher, ViewSink};

const USAGE: &str = "Usage: screener <command>

Commands:
  list                      Show the resume dashboard
  watch <id>                Follow an analysis until it completes
  upload <pdf>...           Upload one or more resumes
  delete <id>               Delete a resume
  download <id>             Download a resume PDF
  jds                       List job descriptions
  jd-add <title> <file>     Upload a job description
  jd-rm <id>                Delete a job description
  template                  Show the active email template
  invite <id> <email>       Prepare an interview email + calendar links
  events                    List upcoming calendar events";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Screener console v{}", env!("CARGO_PKG_VERSION"));

    let client = ApiClient::new(&config.base_url, config.csrf_token.clone())?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("list") => cmd_list(&client, &config).await,
        Some("watch") => cmd_watch(&client, &config, parse_id(args.get(1))?).await,
        Some("upload") => cmd_upload(&client, &args[1..]).await,
        Some("delete") => cmd_delete(&client, parse_id(args.get(1))?).await,
        Some("download") => cmd_download(&client, parse_id(args.get(1))?).await,
        Some("jds") => cmd_jds(&client).await,
        Some("jd-add") => cmd_jd_add(&client, &args[1..]).await,
        Some("jd-rm") => cmd_jd_rm(&client, parse_id(args.get(1))?).await,
        Some("template") => cmd_template(&client).await,
        Some("invite") => cmd_invite(&client, &args[1..]).await,
        Some("events") => cmd_events(&client).await,
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }
}

fn parse_id(arg: Option<&String>) -> Result<i64> {
    arg.context("Missing resource id")?
        .parse::<i64>()
        .context("Resource id must be a number")
}

async fn cmd_list(client: &ApiClient, config: &Config) -> Result<()> {
    let resumes = client.resumes().await?;
    let mut dashboard = Dashboard::new(config.page_size);
    dashboard.set_resumes(resumes);

    println!(
        "{} resumes, average score {}%",
        dashboard.total(),
        dashboard.average_score()
    );
    let pages = dashboard.page_count().max(1);
    for page in 1..=pages {
        dashboard.go_to_page(page);
        for resume in dashboard.page_items() {
            let score = resume
                .overall_score
                .map(|s| format!("{s}%"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  #{:<5} {:<30} {:<12?} {:>5}  {}",
                resume.id,
                truncate(&resume.file_name, 30),
                resume.status,
                score,
                resume.candidate_name
            );
        }
    }
    Ok(())
}

/// Writes each rendered view to an HTML file next to the working directory,
/// so a browser tab pointed at it follows the analysis.
struct FileSink {
    path: PathBuf,
}

impl ViewSink for FileSink {
    fn apply(&self, detail: &ResumeDetail, html: &str) {
        match std::fs::write(&self.path, html) {
            Ok(()) => info!(
                resume_id = detail.id,
                status = ?detail.status,
                path = %self.path.display(),
                "Analysis view updated"
            ),
            Err(e) => warn!(path = %self.path.display(), error = %e, "Could not write view"),
        }
    }
}

async fn cmd_watch(client: &ApiClient, config: &Config, id: i64) -> Result<()> {
    let sink = Arc::new(FileSink {
        path: PathBuf::from(format!("analysis-{id}.html")),
    });
    let watcher = AnalysisWatcher::new(Arc::new(client.clone()), sink, config.poll_interval);

    let initial = watcher.start(id).await?;
    if initial.status.is_terminal() {
        info!(status = ?initial.status, "Analysis already finished");
        return Ok(());
    }

    info!(status = ?initial.status, "Waiting for review to finish (Ctrl-C to stop)");
    tokio::select! {
        _ = watcher.join() => info!("Review finished"),
        _ = tokio::signal::ctrl_c() => {
            watcher.stop();
            info!("Stopped");
        }
    }
    Ok(())
}

async fn cmd_upload(client: &ApiClient, files: &[String]) -> Result<()> {
    let paths: Vec<PathBuf> = files.iter().map(PathBuf::from).collect();
    let report = client.upload_resumes(&paths).await?;
    for outcome in &report.outcomes {
        match (outcome.success, &outcome.error) {
            (true, _) => println!("  {} uploaded (resume #{})", outcome.file_name, outcome.resume_id.unwrap_or(0)),
            (false, Some(error)) => println!("  {} failed: {error}", outcome.file_name),
            (false, None) => println!("  {} failed", outcome.file_name),
        }
    }
    println!("{}", report.summary());
    if report.succeeded() == 0 {
        bail!("{}", report.first_error().unwrap_or("Upload failed"));
    }
    Ok(())
}

async fn cmd_delete(client: &ApiClient, id: i64) -> Result<()> {
    let message = client.delete_resume(id).await?;
    println!("{}", message.unwrap_or_else(|| "Resume deleted successfully".to_string()));
    Ok(())
}

async fn cmd_download(client: &ApiClient, id: i64) -> Result<()> {
    let bytes = client.download_resume(id).await?;
    let path = format!("resume_{id}.pdf");
    std::fs::write(&path, &bytes).with_context(|| format!("Cannot write {path}"))?;
    println!("Saved {path} ({} bytes)", bytes.len());
    Ok(())
}

async fn cmd_jds(client: &ApiClient) -> Result<()> {
    let jds = client.job_descriptions().await?;
    if jds.is_empty() {
        println!("No job descriptions saved yet.");
        return Ok(());
    }
    for jd in jds {
        println!("  #{:<5} {:<40} {}", jd.id, truncate(&jd.title, 40), jd.file_name);
    }
    Ok(())
}

async fn cmd_jd_add(client: &ApiClient, args: &[String]) -> Result<()> {
    let (title, file) = match args {
        [title, file] => (title, PathBuf::from(file)),
        _ => bail!("Usage: screener jd-add <title> <file>"),
    };
    let message = client.upload_job_description(title, &file).await?;
    println!(
        "{}",
        message.unwrap_or_else(|| "Job description uploaded successfully".to_string())
    );
    Ok(())
}

async fn cmd_jd_rm(client: &ApiClient, id: i64) -> Result<()> {
    let message = client.delete_job_description(id).await?;
    println!(
        "{}",
        message.unwrap_or_else(|| "Job description deleted successfully".to_string())
    );
    Ok(())
}

async fn cmd_template(client: &ApiClient) -> Result<()> {
    let template = client.active_email_template().await?;
    println!("Subject: {}", template.subject_or_default());
    println!("{}", template.body);
    Ok(())
}

async fn cmd_invite(client: &ApiClient, args: &[String]) -> Result<()> {
    let (id, email) = match args {
        [id, email] => (id.parse::<i64>().context("Resume id must be a number")?, email),
        _ => bail!("Usage: screener invite <id> <email>"),
    };

    // Pre-fill from the active template, like the scheduling modal does.
    let template = client.active_email_template().await?;
    let mut invite = InterviewInvite::new(id, email.clone());
    invite.subject = template.subject_or_default().to_string();
    invite.body = template.body;

    let links = client.send_interview_invite(&invite).await?;
    println!("mailto: {}", links.mailto_link);
    if let Some(calendar) = links.calendar_link {
        println!("calendar: {calendar}");
    }
    if let Some(message) = links.message {
        println!("{message}");
    }
    Ok(())
}

async fn cmd_events(client: &ApiClient) -> Result<()> {
    let events = client.calendar_events().await?;
    if events.is_empty() {
        println!("No upcoming events. Connect Google Calendar from Settings.");
        return Ok(());
    }
    for event in events {
        println!("  {:<30} {} - {}", truncate(&event.title, 30), event.start, event.end);
    }
    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
