use anyhow::Result;
use std::io::{self, Write};

use crate::session::Completion;

pub async fn run(
    app: super::App,
    prompt: String,
    output_format: super::OutputFormat,
    quiet: bool,
) -> Result<()> {
    let mut controller = app.controller;
    controller.set_draft(prompt);
    if !controller.submit() {
        anyhow::bail!("Nothing to ask: the prompt is empty");
    }

    if !quiet {
        eprint!("\x1b[90mAnalyzing...\x1b[0m");
        io::stderr().flush().ok();
    }

    let mut failure = None;
    while let Some(completion) = controller.next_completion().await {
        if let Completion::Analyze(Err(e)) = &completion {
            failure = Some(e.to_string());
        }
        controller.apply(completion);
    }
    if !quiet {
        eprint!("\r\x1b[K");
    }

    let state = controller.state();
    let question = state
        .messages()
        .iter()
        .rev()
        .find(|m| m.is_user())
        .map(|m| m.content().to_string())
        .unwrap_or_default();
    let answer = state
        .messages()
        .last()
        .map(|m| m.content().to_string())
        .unwrap_or_default();
    let notices = controller.drain_notices();

    match output_format {
        super::OutputFormat::Text => {
            println!("{}", super::output::markup_to_ansi(&crate::render::render(&answer)));
            if !quiet {
                super::output::print_notices(&notices);
            }
        }
        super::OutputFormat::Html => {
            println!("{}", crate::render::render(&answer));
        }
        super::OutputFormat::Json => {
            let output = serde_json::json!({
                "question": question,
                "answer": answer,
                "html": crate::render::render(&answer),
                "error": failure,
                "notices": notices,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
