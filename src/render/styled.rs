//! Reads markup produced by [`super::markup::render`] back into styled lines
//! for terminal output. Only the renderer's own tags are understood; anything
//! else between `<` and `>` is dropped.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanStyle {
    pub strong: bool,
    pub emphasis: bool,
    /// The bullet glyph of a list item.
    pub bullet: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    pub text: String,
    pub style: SpanStyle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledLine {
    pub spans: Vec<StyledSpan>,
    pub bullet_item: bool,
}

impl StyledLine {
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    fn push_text(&mut self, text: &str, style: SpanStyle) {
        if text.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => self.spans.push(StyledSpan {
                text: text.to_string(),
                style,
            }),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SpanKind {
    Item,
    Glyph,
    Body,
}

struct Reader {
    lines: Vec<StyledLine>,
    current: StyledLine,
    paragraphs: usize,
    strong: usize,
    emphasis: usize,
    spans: Vec<SpanKind>,
}

impl Reader {
    fn style(&self) -> SpanStyle {
        SpanStyle {
            strong: self.strong > 0,
            emphasis: self.emphasis > 0,
            bullet: self.spans.last() == Some(&SpanKind::Glyph),
        }
    }

    fn break_line(&mut self) {
        self.lines.push(std::mem::take(&mut self.current));
    }

    fn text(&mut self, raw: &str) {
        let decoded = decode_entities(raw);
        let mut segments = decoded.split('\n');
        if let Some(first) = segments.next() {
            let style = self.style();
            self.current.push_text(first, style);
        }
        for segment in segments {
            self.break_line();
            let style = self.style();
            self.current.push_text(segment, style);
        }
    }

    fn tag(&mut self, tag: &str) {
        let (closing, body) = match tag.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, tag),
        };
        let name = body.split_whitespace().next().unwrap_or("");

        match (name, closing) {
            ("p", false) => {
                self.paragraphs += 1;
                if self.paragraphs > 1 {
                    self.break_line();
                    self.break_line();
                }
            }
            ("strong", false) => self.strong += 1,
            ("strong", true) => self.strong = self.strong.saturating_sub(1),
            ("em", false) => self.emphasis += 1,
            ("em", true) => self.emphasis = self.emphasis.saturating_sub(1),
            ("span", false) => {
                let kind = if body.contains("flex") {
                    self.current.bullet_item = true;
                    SpanKind::Item
                } else if body.contains("text-primary") {
                    SpanKind::Glyph
                } else {
                    SpanKind::Body
                };
                self.spans.push(kind);
            }
            ("span", true) => {
                if self.spans.pop() == Some(SpanKind::Glyph) {
                    self.current.push_text(" ", SpanStyle::default());
                }
            }
            _ => {}
        }
    }
}

/// Split rendered markup into display lines. Paragraph boundaries become a
/// blank line; the result always holds at least one line.
pub fn lines(markup: &str) -> Vec<StyledLine> {
    let mut reader = Reader {
        lines: Vec::new(),
        current: StyledLine::default(),
        paragraphs: 0,
        strong: 0,
        emphasis: 0,
        spans: Vec::new(),
    };

    let mut rest = markup;
    while let Some(open) = rest.find('<') {
        reader.text(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => {
                reader.tag(&rest[open + 1..open + close]);
                rest = &rest[open + close + 1..];
            }
            None => {
                rest = &rest[open..];
                break;
            }
        }
    }
    if !rest.starts_with('<') {
        reader.text(rest);
    }

    reader.lines.push(reader.current);
    reader.lines
}

/// Markup reduced to its visible text, one display line per `\n`.
pub fn plain_text(markup: &str) -> String {
    lines(markup)
        .iter()
        .map(StyledLine::plain_text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
