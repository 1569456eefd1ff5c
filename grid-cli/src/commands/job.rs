//! Job command handlers
//!
//! Handles job submission, polling and the execution-side lifecycle
//! commands (claim, log, status).

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use grid_client::{HubClient, JobPoller};
use grid_core::domain::job::{Job, JobStatus};
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

use crate::config::Config;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Submit a job
    Submit {
        /// Inline script
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        script: Option<String>,

        /// Read the script from a file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Submitting buyer
        #[arg(long, env = "GRID_BUYER_ID")]
        buyer: Option<String>,

        /// Keep polling until the job completes or fails
        #[arg(long)]
        wait: bool,

        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
    /// List jobs
    List {
        /// Only jobs of this buyer
        #[arg(long)]
        buyer: Option<String>,
    },
    /// Get job details
    Get {
        /// Job ID
        id: String,
    },
    /// Get job logs
    Logs {
        /// Job ID
        id: String,
    },
    /// Poll a job until it completes or fails, streaming its logs
    Watch {
        /// Job ID
        id: String,

        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
    /// Hand a pending job to a node
    Claim {
        /// Job ID
        id: String,

        /// Node taking the job
        #[arg(long)]
        node: String,
    },
    /// Append lines to a job's log
    Log {
        /// Job ID
        id: String,

        /// Lines to append, in order
        #[arg(required = true)]
        lines: Vec<String>,
    },
    /// Move a job to its next status
    Status {
        /// Job ID
        id: String,

        /// running, completed or failed
        status: JobStatus,

        /// JSON result (completed/failed only); plain text is sent as a string
        #[arg(long)]
        result: Option<String>,

        /// Report as this node; the hub refuses unless it holds the job
        #[arg(long)]
        node: Option<String>,
    },
}

/// Handle job commands
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    let client = HubClient::new(&config.hub_url);

    match command {
        JobCommands::Submit {
            script,
            file,
            buyer,
            wait,
            interval_ms,
        } => {
            let script = match (script, file) {
                (Some(script), _) => script,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => anyhow::bail!("Either --script or --file is required"),
            };
            submit_job(&client, buyer.as_deref(), &script, wait, interval_ms).await
        }
        JobCommands::List { buyer } => list_jobs(&client, buyer.as_deref()).await,
        JobCommands::Get { id } => get_job(&client, &id).await,
        JobCommands::Logs { id } => get_job_logs(&client, &id).await,
        JobCommands::Watch { id, interval_ms } => {
            watch_job(&client, parse_job_id(&id)?, interval_ms).await
        }
        JobCommands::Claim { id, node } => claim_job(&client, &id, &node).await,
        JobCommands::Log { id, lines } => append_logs(&client, &id, lines).await,
        JobCommands::Status {
            id,
            status,
            result,
            node,
        } => update_status(&client, &id, status, result, node.as_deref()).await,
    }
}

async fn submit_job(
    client: &HubClient,
    buyer: Option<&str>,
    script: &str,
    wait: bool,
    interval_ms: u64,
) -> Result<()> {
    let job_id = client.submit_job(buyer, script).await?;

    println!("{} Submitted job {}", "✓".green(), job_id.to_string().cyan());

    if wait {
        println!();
        watch_job(client, job_id, interval_ms).await?;
    }

    Ok(())
}

async fn list_jobs(client: &HubClient, buyer: Option<&str>) -> Result<()> {
    let jobs = client.list_jobs(buyer).await?;

    if jobs.is_empty() {
        println!("{}", "No jobs found.".yellow());
    } else {
        println!("{}", format!("Found {} job(s):", jobs.len()).bold());
        println!();
        for job in jobs {
            print_job_summary(&job);
        }
    }

    Ok(())
}

async fn get_job(client: &HubClient, id: &str) -> Result<()> {
    let job = client.get_job(parse_job_id(id)?).await?;
    print_job_details(&job);
    Ok(())
}

async fn get_job_logs(client: &HubClient, id: &str) -> Result<()> {
    let job = client.get_job(parse_job_id(id)?).await?;

    println!("{}", format!("Logs for job {}:", job.id).bold());
    println!("{}", "─".repeat(80).dimmed());
    for line in &job.logs {
        println!("{}", line);
    }
    println!("{}", "─".repeat(80).dimmed());

    Ok(())
}

/// Poll until terminal, printing status changes and log lines as they appear
async fn watch_job(client: &HubClient, job_id: Uuid, interval_ms: u64) -> Result<()> {
    let poller = JobPoller::new(Duration::from_millis(interval_ms.max(1)));

    let mut printed = 0;
    let mut last_status = None;

    let job = poller
        .watch(client, job_id, |job| {
            if last_status != Some(job.status) {
                println!("{} {}", "status:".dimmed(), colorize_status(&job.status));
                last_status = Some(job.status);
            }
            for line in job.logs.iter().skip(printed) {
                println!("{}", line);
            }
            printed = printed.max(job.logs.len());
        })
        .await
        .with_context(|| format!("Stopped watching job {}", job_id))?;

    if job.status == JobStatus::Failed {
        anyhow::bail!("Job {} failed", job_id);
    }

    if let Some(result) = &job.result {
        println!("\n{}", "Result:".bold());
        println!("{}", render_value(result));
    }

    Ok(())
}

async fn claim_job(client: &HubClient, id: &str, node: &str) -> Result<()> {
    let job = client.claim_job(parse_job_id(id)?, node).await?;
    println!(
        "{} Job {} claimed by {}",
        "✓".green(),
        job.id.to_string().cyan(),
        node.bold()
    );
    Ok(())
}

async fn append_logs(client: &HubClient, id: &str, lines: Vec<String>) -> Result<()> {
    let count = lines.len();
    client.append_logs(parse_job_id(id)?, lines).await?;
    println!("{} Appended {} line(s)", "✓".green(), count);
    Ok(())
}

async fn update_status(
    client: &HubClient,
    id: &str,
    status: JobStatus,
    result: Option<String>,
    node: Option<&str>,
) -> Result<()> {
    let result = result.map(|raw| parse_result(&raw));
    let job = client
        .update_job_status(parse_job_id(id)?, status, result, node)
        .await?;
    println!(
        "{} Job {} is now {}",
        "✓".green(),
        job.id.to_string().cyan(),
        colorize_status(&job.status)
    );
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_job_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id.trim()).with_context(|| format!("'{}' is not a valid job ID", id))
}

/// Results are opaque JSON; anything that doesn't parse is kept as text
fn parse_result(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Print a job summary
fn print_job_summary(job: &Job) {
    println!("  {} Job {}", "▸".cyan(), job.id.to_string().dimmed());
    println!("    Buyer:    {}", job.buyer_id);
    println!("    Status:   {}", colorize_status(&job.status));
    println!(
        "    Created:  {}",
        job.created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    if let Some(node) = &job.assigned_node_id {
        println!("    Node:     {}", node.dimmed());
    }
    println!();
}

/// Print detailed job information
fn print_job_details(job: &Job) {
    println!("{}", "Job Details:".bold());
    println!("  ID:          {}", job.id.to_string().cyan());
    println!("  Buyer:       {}", job.buyer_id);
    println!("  Status:      {}", colorize_status(&job.status));
    println!("  Created:     {}", job.created_at.format("%Y-%m-%d %H:%M:%S"));

    if let Some(started) = job.started_at {
        println!("  Started:     {}", started.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(completed) = job.completed_at {
        println!("  Completed:   {}", completed.format("%Y-%m-%d %H:%M:%S"));

        if let Some(started) = job.started_at {
            let duration = completed.signed_duration_since(started);
            println!("  Duration:    {}s", duration.num_seconds());
        }
    }

    if let Some(node) = &job.assigned_node_id {
        println!("  Node:        {}", node);
    }

    println!("\n{}", "Script:".bold());
    println!("{}", job.script.dimmed());

    if let Some(result) = &job.result {
        println!("\n{}", "Result:".bold());
        println!("{}", render_value(result));
    }

    println!("\n{} ({} line(s))", "Logs:".bold(), job.logs.len());
    for line in &job.logs {
        println!("  {}", line);
    }
}

/// Colorize job status for display
fn colorize_status(status: &JobStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Pending => status_str.yellow(),
        JobStatus::Running => status_str.cyan(),
        JobStatus::Completed => status_str.green(),
        JobStatus::Failed => status_str.red(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_result_json_or_text() {
        assert_eq!(parse_result(r#"{"exit":0}"#), json!({"exit": 0}));
        assert_eq!(parse_result("42"), json!(42));
        assert_eq!(parse_result("all good"), json!("all good"));
    }

    #[test]
    fn test_parse_job_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_job_id(&format!(" {} ", id)).unwrap(), id);
        assert!(parse_job_id("nonexistent").is_err());
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&json!("plain")), "plain");
        assert_eq!(render_value(&json!([1])), "[\n  1\n]");
    }
}
