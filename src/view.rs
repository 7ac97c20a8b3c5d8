//! Terminal rendering for the front end. Nothing here feeds back into the core.

use colored::*;

use crate::builder::{CharacterBudget, MAX_PROMPT_CHARS, character_budget};
use crate::controller::SubmissionState;
use crate::models::{AnalyticsSnapshot, HealthSnapshot, HealthStatus};
use crate::poller::PollState;
use crate::response::PromptOutcome;

pub fn format_duration_ms(ms: Option<f64>) -> String {
    match ms {
        Some(ms) if ms > 0.0 => format!("{ms:.0}ms"),
        _ => "N/A".to_string(),
    }
}

pub fn format_uptime(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}h {}m {}s", total / 3600, (total % 3600) / 60, total % 60)
}

pub fn render_counter(draft: &str) -> String {
    let count = format!("{}/{}", draft.chars().count(), MAX_PROMPT_CHARS);
    match character_budget(draft) {
        CharacterBudget::Within => count.dimmed().to_string(),
        CharacterBudget::Approaching => format!("{} Approaching character limit", count.yellow()),
        CharacterBudget::AlmostReached => {
            format!("{} Character limit almost reached", count.yellow().bold())
        }
        CharacterBudget::LimitReached => format!("{} Character limit reached", count.red().bold()),
    }
}

pub fn render_outcome(outcome: &PromptOutcome) -> String {
    match outcome {
        PromptOutcome::Answer(answer) => format!(
            "{}\n{}\n{} {}  {} {}",
            "Response".bold().green(),
            answer.response,
            "Model:".dimmed(),
            answer.model_used.as_deref().unwrap_or("N/A"),
            "Processing Time:".dimmed(),
            format_duration_ms(answer.processing_time_ms),
        ),
        PromptOutcome::DebugAnswer(debug) => format!(
            "{}\n{} {}  {} {}  {} {}  {} {}\n\n{}\n{}\n\n{}\n{}\n\n{}\n{}",
            "Debug Response".bold().magenta(),
            "Model:".dimmed(),
            debug.model_used,
            "Total:".dimmed(),
            format_duration_ms(debug.processing_time_ms),
            "Refinement:".dimmed(),
            format_duration_ms(debug.refinement_time_ms),
            "Generation:".dimmed(),
            format_duration_ms(debug.generation_time_ms),
            "Original Input".bold().blue(),
            debug.raw_input,
            "Refined Prompt".bold().blue(),
            debug.refined_prompt,
            "Final Response".bold().green(),
            debug.final_response,
        ),
    }
}

pub fn render_submission(state: &SubmissionState) -> Option<String> {
    match state {
        SubmissionState::Idle => None,
        SubmissionState::Pending => Some("Assistant is typing...".italic().dimmed().to_string()),
        SubmissionState::Resolved(outcome) => Some(render_outcome(outcome)),
        SubmissionState::Failed(message) => Some(render_error(message)),
    }
}

pub fn render_error(message: &str) -> String {
    format!("{} {}", "Error:".red().bold(), message)
}

pub fn render_health(state: &PollState<HealthSnapshot>) -> String {
    if state.error.is_some() {
        return format!("{} API is not responding", "●".red());
    }
    match &state.snapshot {
        None => format!("{} Checking API status...", "●".yellow()),
        Some(health) => {
            let dot = match health.status {
                HealthStatus::Healthy => "●".green(),
                HealthStatus::Degraded | HealthStatus::Unknown => "●".yellow(),
                HealthStatus::Unhealthy => "●".red(),
            };
            format!("{dot} {}", health.message)
        }
    }
}

pub fn render_analytics(state: &PollState<AnalyticsSnapshot>) -> String {
    let mut out = format!("{}\n", "Analytics Dashboard".bold());

    let Some(stats) = &state.snapshot else {
        match &state.error {
            Some(error) => out.push_str(&format!("{}\n", error.red())),
            None => out.push_str(&format!("{}\n", "Loading...".dimmed())),
        }
        return out;
    };

    let database = stats.database_available.unwrap_or(false);
    if !database {
        out.push_str(&format!(
            "{}\n",
            "Database Not Connected: analytics are limited to basic system information.".yellow()
        ));
    }

    let needs_db = if database { "" } else { " *requires database" };
    let counters = [
        ("Total Requests", stats.total_requests.to_string().blue()),
        ("Last 24 Hours", stats.requests_24h.to_string().green()),
        ("Unique Users", stats.unique_users.to_string().purple()),
    ];
    for (label, value) in counters {
        out.push_str(&format!("  {label:<16} {}{}\n", value.bold(), needs_db.dimmed()));
    }
    out.push_str(&format!("  Uptime           {}\n", format_uptime(stats.uptime_seconds)));

    out.push_str(&format!("{}\n", "Model Usage".bold()));
    for usage in &stats.model_usage {
        let plural = if usage.count == 1 { "" } else { "s" };
        let note = if !database && usage.count == 0 { " (configured)" } else { "" };
        out.push_str(&format!(
            "  {:<24} {} request{}{}\n",
            usage.name(),
            usage.count,
            plural,
            note.dimmed()
        ));
    }

    out.push_str(&format!(
        "  Mode: {}  Database: {}\n",
        if stats.mock_mode { "Mock".yellow() } else { "Live".green() },
        if database { "Connected".green() } else { "Not Connected".red() },
    ));

    if let Some(error) = &stats.error {
        out.push_str(&format!("{}\n", error.red()));
    }
    if let Some(error) = &state.error {
        out.push_str(&format!("{} {}\n", "Last refresh failed:".red(), error));
    }
    out
}
