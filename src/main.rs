use std::sync::Arc;

use anyhow::Result;
use colored::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use answer_architect::AnswerClient;
use answer_architect::builder::{
    CharacterBudget, EXAMPLE_PROMPTS, PromptSubmission, character_budget,
};
use answer_architect::config::Config;
use answer_architect::models::ResponseStyle;
use answer_architect::view;

/// Form options that persist between prompts.
struct FormState {
    style: ResponseStyle,
    debug: bool,
    skip_refinement: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(Config::load()?);
    tracing::info!(base_url = %config.api.base_url, "main: Configuration loaded");

    let client = AnswerClient::new(config)?;
    let monitor = client.start_monitor();

    // Announce health only when the status line changes
    let mut health_rx = monitor.subscribe_health();
    let health_task = tokio::spawn(async move {
        let mut last = String::new();
        while health_rx.changed().await.is_ok() {
            let line = view::render_health(&health_rx.borrow_and_update());
            if line != last {
                println!("{line}");
                last = line;
            }
        }
    });

    println!("{}", "AnswerArchitect".bold().purple());
    println!("{}", "Type a prompt and press enter. /help lists commands.".dimmed());

    let mut form = FormState {
        style: ResponseStyle::default(),
        debug: false,
        skip_refinement: false,
    };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let input = line.trim_end_matches(['\r', '\n']);
        if input.trim().is_empty() {
            continue;
        }

        if let Some(command) = input.strip_prefix('/') {
            let mut parts = command.split_whitespace();
            let name = parts.next().unwrap_or_default();
            let arg = parts.next();
            match name {
                "quit" | "exit" => break,
                "help" => print_help(),
                "style" => match arg.map(str::parse::<ResponseStyle>) {
                    Some(Ok(style)) => {
                        form.style = style;
                        println!("Style: {} - {}", style.label().bold(), style.description());
                    }
                    Some(Err(e)) => println!("{}", e.to_string().red()),
                    None => {
                        for style in ResponseStyle::ALL {
                            let marker = if style == form.style { "*" } else { " " };
                            let description = style.description().dimmed();
                            println!("{marker} {:<14} {description}", style.as_str());
                        }
                    }
                },
                "debug" => {
                    form.debug = parse_toggle(arg, form.debug);
                    println!("Debug mode: {}", on_off(form.debug));
                }
                "skip" => {
                    form.skip_refinement = parse_toggle(arg, form.skip_refinement);
                    println!("Skip refinement: {}", on_off(form.skip_refinement));
                }
                "examples" => {
                    for (i, example) in EXAMPLE_PROMPTS.iter().enumerate() {
                        println!("  {}. {}", i + 1, example);
                    }
                }
                "clear" => {
                    client.controller().clear();
                    form = FormState {
                        style: ResponseStyle::default(),
                        debug: form.debug,
                        skip_refinement: false,
                    };
                    println!("{}", "Cleared.".dimmed());
                }
                "health" => println!("{}", view::render_health(&monitor.health())),
                "stats" => print!("{}", view::render_analytics(&monitor.analytics())),
                "refresh" => {
                    monitor.refresh_analytics();
                    println!("{}", "Refreshing analytics...".dimmed());
                }
                "info" => match client.api().service_info().await {
                    Ok(info) => println!(
                        "{} v{} ({})",
                        info.message.bold(),
                        info.version,
                        info.authentication.as_deref().unwrap_or("no auth info")
                    ),
                    Err(e) => println!("{}", view::render_error(&e.to_string())),
                },
                other => println!("Unknown command /{other}. Try /help."),
            }
            continue;
        }

        // A bare number picks one of the example prompts
        let text = match input.parse::<usize>() {
            Ok(n) if (1..=EXAMPLE_PROMPTS.len()).contains(&n) => EXAMPLE_PROMPTS[n - 1].to_string(),
            _ => input.to_string(),
        };

        if character_budget(&text) != CharacterBudget::Within {
            println!("{}", view::render_counter(&text));
        }

        let submission = PromptSubmission::new(text)
            .with_style(form.style)
            .with_skip_refinement(form.skip_refinement);
        println!("{}", "Assistant is typing...".italic().dimmed());
        match client.submit(submission, form.debug).await {
            Ok(outcome) => println!("{}\n", view::render_outcome(&outcome)),
            Err(e) => println!("{}\n", view::render_error(&e.to_string())),
        }
    }

    health_task.abort();
    monitor.stop().await;
    tracing::info!("main: Shut down cleanly");
    Ok(())
}

fn parse_toggle(arg: Option<&str>, current: bool) -> bool {
    match arg {
        Some("on") | Some("true") | Some("1") => true,
        Some("off") | Some("false") | Some("0") => false,
        _ => !current,
    }
}

fn on_off(value: bool) -> ColoredString {
    if value { "on".green() } else { "off".dimmed() }
}

fn print_help() {
    println!("  /style [tag]      show or set the response style");
    println!("  /debug [on|off]   request the three-stage debug response");
    println!("  /skip [on|off]    skip prompt refinement");
    println!("  /examples         list example prompts (enter 1-4 to send one)");
    println!("  /clear            clear the last response and reset options");
    println!("  /health           show service health");
    println!("  /stats            show usage analytics");
    println!("  /refresh          refresh analytics now");
    println!("  /info             show service information");
    println!("  /quit             exit");
}
