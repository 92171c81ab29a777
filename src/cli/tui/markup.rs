use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::render::styled::{self, StyledSpan};

const BOLD_FG: Color = Color::Rgb(120, 200, 255);
const LIST_BULLET: Color = Color::Rgb(140, 80, 255);
const TEXT_FG: Color = Color::Rgb(210, 210, 225);

/// Render an assistant reply into ratatui Lines, going through the same
/// markup a browser would receive.
pub fn render_reply(text: &str, indent: &str) -> Vec<Line<'static>> {
    let markup = crate::render::render(text);
    styled::lines(&markup)
        .into_iter()
        .map(|line| {
            let mut spans = Vec::with_capacity(line.spans.len() + 1);
            spans.push(Span::raw(indent.to_string()));
            if line.bullet_item {
                spans.push(Span::raw("  "));
            }
            spans.extend(line.spans.iter().map(to_span));
            Line::from(spans)
        })
        .collect()
}

fn to_span(span: &StyledSpan) -> Span<'static> {
    let mut style = Style::default().fg(TEXT_FG);
    if span.style.bullet {
        style = style.fg(LIST_BULLET);
    }
    if span.style.strong {
        style = style.fg(BOLD_FG).add_modifier(Modifier::BOLD);
    }
    if span.style.emphasis {
        style = style.add_modifier(Modifier::ITALIC);
    }
    Span::styled(span.text.clone(), style)
}

pub fn spinner(tick: u64) -> &'static str {
    const FRAMES: &[&str] = &["\u{280B}", "\u{2819}", "\u{2839}", "\u{2838}", "\u{283C}", "\u{2834}", "\u{2826}", "\u{2827}", "\u{2807}", "\u{280F}"];
    FRAMES[(tick as usize) % FRAMES.len()]
}
