use anyhow::Result;
use std::io::{self, Write};
use std::path::Path;

use crate::core::suggestion::SUGGESTED_QUESTIONS;
use crate::session::Controller;

use super::output;

pub async fn run(app: super::App) -> Result<()> {
    let mut controller = app.controller;

    println!("\x1b[1malpha-insights\x1b[0m v{}", env!("CARGO_PKG_VERSION"));
    println!("Backend: \x1b[36m{}\x1b[0m", app.config.base_url);
    println!("Type \x1b[33m/help\x1b[0m for commands, \x1b[33mCtrl-D\x1b[0m to exit.\n");

    controller.start();
    controller.settle().await;
    output::print_cards(&controller.state().metric_cards());
    println!();

    let mut printed = 0;
    flush(&mut controller, &mut printed);
    output::print_suggestions();

    loop {
        eprint!("\x1b[32;1minsights>\x1b[0m ");
        io::stderr().flush().ok();

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => {
                // EOF (Ctrl-D)
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        }

        let input = input.trim().to_string();
        if input.is_empty() {
            continue;
        }

        if input.starts_with('/') {
            match handle_command(&input, &mut controller).await {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => eprintln!("\x1b[31mCommand error: {e}\x1b[0m"),
            }
            flush(&mut controller, &mut printed);
            continue;
        }

        let (sent, typed) = match suggestion_number(&input) {
            Some(n) if controller.state().suggestions_visible() => {
                (controller.submit_suggestion(n), false)
            }
            _ => {
                controller.set_draft(input);
                (controller.submit(), true)
            }
        };
        if sent {
            if typed {
                // Already on screen
                printed += 1;
            } else {
                flush(&mut controller, &mut printed);
            }
            eprint!("\x1b[90mAnalyzing...\x1b[0m");
            io::stderr().flush().ok();
            controller.settle().await;
            eprint!("\r\x1b[K");
        }
        flush(&mut controller, &mut printed);
    }

    controller.shutdown();
    Ok(())
}

fn suggestion_number(input: &str) -> Option<usize> {
    input
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=SUGGESTED_QUESTIONS.len()).contains(n))
}

/// Print messages appended since the last call, then pending notices.
fn flush(controller: &mut Controller, printed: &mut usize) {
    let messages = controller.state().messages();
    for msg in messages.iter().skip(*printed) {
        output::print_message(msg);
    }
    *printed = messages.len();
    output::print_notices(&controller.drain_notices());
}

async fn handle_command(input: &str, controller: &mut Controller) -> Result<bool> {
    let (command, arg) = match input.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (input, ""),
    };

    match command {
        "/help" | "/h" => {
            println!("\x1b[1mCommands:\x1b[0m");
            println!("  /help           Show this help");
            println!("  /sync           Re-read the spreadsheets on the server");
            println!("  /upload <path>  Upload a spreadsheet (.xlsx, .xls, .csv)");
            println!("  /metrics        Refresh and show the dashboard figures");
            println!("  /monthly        Show the per-month breakdown");
            println!("  /stats          Show database statistics");
            println!("  /health         Check the backend");
            println!("  /suggest        Show suggested questions");
            println!("  /hide           Hide suggested questions");
            println!("  /exit           Exit");
            println!("While suggestions are shown, type a number to ask one.");
            Ok(true)
        }
        "/exit" | "/quit" | "/q" => {
            println!("Goodbye!");
            Ok(false)
        }
        "/sync" => {
            if controller.trigger_sync() {
                eprintln!("\x1b[90mSyncing...\x1b[0m");
                controller.settle().await;
                output::print_cards(&controller.state().metric_cards());
            }
            Ok(true)
        }
        "/upload" => {
            if arg.is_empty() {
                eprintln!("Usage: /upload <path>");
                return Ok(true);
            }
            if controller.upload_path(Path::new(arg)).await {
                eprintln!("\x1b[90mUploading...\x1b[0m");
                controller.settle().await;
                output::print_cards(&controller.state().metric_cards());
            }
            Ok(true)
        }
        "/metrics" | "/m" => {
            controller.refresh_metrics();
            controller.settle().await;
            if let Some(m) = controller.state().metrics() {
                println!("\x1b[90mUpdated at {}\x1b[0m", m.updated_time());
            }
            output::print_cards(&controller.state().metric_cards());
            Ok(true)
        }
        "/monthly" => {
            let monthly = controller
                .backend()
                .monthly_metrics()
                .await
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            output::print_monthly(&monthly);
            Ok(true)
        }
        "/stats" => {
            let stats = controller
                .backend()
                .database_stats()
                .await
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            output::print_stats(&stats);
            Ok(true)
        }
        "/health" => {
            let health = controller
                .backend()
                .health()
                .await
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            output::print_health(&health);
            Ok(true)
        }
        "/suggest" | "/s" => {
            controller.set_suggestions_visible(true);
            output::print_suggestions();
            Ok(true)
        }
        "/hide" => {
            if !controller.set_suggestions_visible(false) {
                println!("Suggestions stay open until you ask your first question.");
            }
            Ok(true)
        }
        _ => {
            eprintln!("Unknown command: {input}. Type /help for available commands.");
            Ok(true)
        }
    }
}
