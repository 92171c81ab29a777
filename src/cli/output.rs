use crate::core::backend::{DatabaseStats, HealthReply, MonthlyMetrics};
use crate::core::message::{Message, MessageRole};
use crate::core::metrics::MetricCard;
use crate::core::notice::{Notice, NoticeLevel};
use crate::core::suggestion::SUGGESTED_QUESTIONS;
use crate::render::styled::{self, StyledSpan};

const RESET: &str = "\x1b[0m";

/// Assistant markup as ANSI-styled terminal text.
pub fn markup_to_ansi(markup: &str) -> String {
    styled::lines(markup)
        .iter()
        .map(|line| line.spans.iter().map(span_to_ansi).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn span_to_ansi(span: &StyledSpan) -> String {
    let style = span.style;
    let code = match (style.bullet, style.strong, style.emphasis) {
        (true, _, _) => "\x1b[36m",
        (_, true, true) => "\x1b[1;3;36m",
        (_, true, false) => "\x1b[1;36m",
        (_, false, true) => "\x1b[3m",
        _ => return span.text.clone(),
    };
    format!("{code}{}{RESET}", span.text)
}

pub fn print_message(msg: &Message) {
    match msg.role() {
        MessageRole::User => println!("\x1b[32;1myou>\x1b[0m {}", msg.content()),
        MessageRole::Assistant => {
            let markup = crate::render::render(msg.content());
            println!("{}\n", markup_to_ansi(&markup));
        }
    }
}

pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        let color = match notice.level {
            NoticeLevel::Info => "\x1b[90m",
            NoticeLevel::Success => "\x1b[32m",
            NoticeLevel::Error => "\x1b[31;1m",
        };
        eprintln!("{color}[{}]{RESET} {}", notice.level, notice.text);
    }
}

pub fn print_cards(cards: &[MetricCard]) {
    for card in cards {
        println!(
            "  \x1b[90m{:<14}\x1b[0m \x1b[1m{}\x1b[0m  \x1b[90m{}\x1b[0m",
            card.title, card.value, card.caption
        );
    }
}

pub fn print_suggestions() {
    println!("\x1b[1mSuggested questions:\x1b[0m");
    for (i, s) in SUGGESTED_QUESTIONS.iter().enumerate() {
        println!(
            "  \x1b[33m{}\x1b[0m {} {}  \x1b[90m({})\x1b[0m",
            i + 1,
            s.icon,
            s.text,
            s.category
        );
    }
}

pub fn print_monthly(monthly: &MonthlyMetrics) {
    if monthly.no_data || monthly.months.is_empty() {
        println!("No monthly data yet. Run /sync first.");
        return;
    }
    for month in &monthly.months {
        println!(
            "  \x1b[1m{:<10}\x1b[0m {:>18}  {:>6} sales",
            month.month, month.total_revenue, month.total_sales
        );
        for product in &month.top_products {
            println!("      \x1b[90m{} ({})\x1b[0m", product.name, product.quantity);
        }
    }
}

pub fn print_stats(stats: &DatabaseStats) {
    println!(
        "Records: {} | Last updated: {}",
        stats.total_records,
        stats.last_updated.as_deref().unwrap_or("never")
    );
}

pub fn print_health(health: &HealthReply) {
    match &health.message {
        Some(message) => println!("Backend: {} ({message})", health.status),
        None => println!("Backend: {}", health.status),
    }
}
