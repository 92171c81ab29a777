//! Markdown-subset to markup conversion for assistant replies.
//!
//! Supported: `**strong**`, `*emphasis*`, `•`/`-` bullet lines and blank-line
//! paragraphs. Passes run in a fixed order because each one scans the output
//! of the previous pass.

pub const STRONG_OPEN: &str = r#"<strong class="font-semibold text-primary">"#;
pub const STRONG_CLOSE: &str = "</strong>";
pub const EM_OPEN: &str = "<em>";
pub const EM_CLOSE: &str = "</em>";
pub const BULLET_OPEN: &str =
    r#"<span class="flex gap-2 my-1"><span class="text-primary">•</span><span>"#;
pub const BULLET_CLOSE: &str = "</span></span>";
pub const PARAGRAPH_BREAK: &str = r#"</p><p class="mt-3">"#;

const BULLET_MARKERS: [char; 2] = ['•', '-'];

/// Convert assistant text to display markup. Total: every input yields markup.
pub fn render(text: &str) -> String {
    let escaped = escape(text);
    let strong = wrap_delimited(&escaped, "**", STRONG_OPEN, STRONG_CLOSE);
    let emphasis = wrap_delimited(&strong, "*", EM_OPEN, EM_CLOSE);
    let bullets = bullet_lines(&emphasis);
    let paragraphs = bullets.replace("\n\n", PARAGRAPH_BREAK);

    if paragraphs.starts_with("<p") {
        paragraphs
    } else {
        format!("<p>{paragraphs}</p>")
    }
}

/// Neutralize characters that would otherwise be read as markup structure.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Replace each shortest `marker…marker` run on a single line with `open…close`.
///
/// A marker without a closing partner on the same line is kept literally and
/// scanning resumes one character later, so `***a**` pairs the inner markers.
fn wrap_delimited(text: &str, marker: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(marker) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + marker.len()..];
        let line_end = after_open.find('\n').unwrap_or(after_open.len());

        match after_open[..line_end].find(marker) {
            Some(end) => {
                out.push_str(open);
                out.push_str(&after_open[..end]);
                out.push_str(close);
                rest = &after_open[end + marker.len()..];
            }
            None => {
                // Markers are ASCII, so one byte is one character here.
                out.push_str(&rest[start..start + 1]);
                rest = &rest[start + 1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn bullet_lines(text: &str) -> String {
    text.split('\n')
        .map(|line| match bullet_body(line) {
            Some(body) => format!("{BULLET_OPEN}{body}{BULLET_CLOSE}"),
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Body of a bullet line: indentation, a marker, at least one whitespace, then text.
fn bullet_body(line: &str) -> Option<&str> {
    let trimmed = line.trim_start_matches([' ', '\t']);
    let marker = trimmed.chars().next().filter(|c| BULLET_MARKERS.contains(c))?;
    let after_marker = &trimmed[marker.len_utf8()..];

    if !after_marker.starts_with(char::is_whitespace) {
        return None;
    }
    let body = after_marker.trim_start();
    if body.is_empty() {
        None
    } else {
        Some(body)
    }
}
