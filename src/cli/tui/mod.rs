pub mod markup;

use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::CrosstermBackend,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame, Terminal,
};
use std::io;
use std::path::Path;
use tokio_stream::StreamExt;

use crate::core::message::MessageRole;
use crate::core::notice::{Notice, NoticeLevel};
use crate::core::suggestion::SUGGESTED_QUESTIONS;

// ─── Colors ──────────────────────────────────────────

const BG: Color = Color::Rgb(15, 15, 25);
const SURFACE: Color = Color::Rgb(22, 22, 36);
const BORDER: Color = Color::Rgb(50, 50, 70);
const BORDER_ACTIVE: Color = Color::Rgb(100, 60, 200);
const TEXT: Color = Color::Rgb(210, 210, 225);
const DIM: Color = Color::Rgb(90, 90, 110);
const ACCENT: Color = Color::Rgb(140, 80, 255);
const GREEN: Color = Color::Rgb(80, 200, 120);
const YELLOW: Color = Color::Rgb(230, 190, 60);
const CYAN: Color = Color::Rgb(80, 200, 220);
const RED: Color = Color::Rgb(230, 80, 80);

/// Ticks a notice stays in the status bar (80ms each).
const NOTICE_TICKS: u64 = 60;

// ─── App State ───────────────────────────────────────

struct TuiApp {
    app: super::App,
    input: String,
    input_cursor: usize,
    scroll_offset: u16,
    total_content_height: u16,
    should_quit: bool,
    show_help: bool,
    notice: Option<(Notice, u64)>,
    tick: u64,
}

impl TuiApp {
    fn new(app: super::App) -> Self {
        Self {
            app,
            input: String::new(),
            input_cursor: 0,
            scroll_offset: 0,
            total_content_height: 0,
            should_quit: false,
            show_help: false,
            notice: None,
            tick: 0,
        }
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.total_content_height;
    }

    fn sync_draft(&mut self) {
        self.app.controller.set_draft(self.input.clone());
    }

    fn clear_input(&mut self) {
        self.input.clear();
        self.input_cursor = 0;
        self.sync_draft();
    }

    /// Move pending notices into the status bar; the newest one wins.
    fn take_notices(&mut self) {
        if let Some(latest) = self.app.controller.drain_notices().pop() {
            self.notice = Some((latest, self.tick));
        }
    }
}

// ─── Entry Point ─────────────────────────────────────

pub async fn run(app: super::App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut tui_app = TuiApp::new(app);
    tui_app.app.controller.start();
    let result = run_event_loop(&mut terminal, &mut tui_app).await;
    tui_app.app.controller.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

// ─── Event Loop ──────────────────────────────────────

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut TuiApp,
) -> Result<()> {
    let mut event_reader = EventStream::new();
    let mut tick_interval = tokio::time::interval(std::time::Duration::from_millis(80));

    loop {
        terminal.draw(|f| ui(f, app))?;
        if app.should_quit {
            return Ok(());
        }

        tokio::select! {
            biased;

            completion = app.app.controller.recv() => {
                let flow = app.app.controller.apply(completion);
                tracing::debug!(%flow, "applied completion");
                app.take_notices();
                app.scroll_to_bottom();
            }

            Some(Ok(event)) = event_reader.next() => {
                if let Event::Key(key) = event {
                    handle_key_event(app, key).await;
                    app.take_notices();
                }
            }

            _ = tick_interval.tick() => {
                app.tick += 1;
                if let Some((_, shown)) = &app.notice {
                    if app.tick.saturating_sub(*shown) > NOTICE_TICKS {
                        app.notice = None;
                    }
                }
            }
        }
    }
}

// ─── Key Handling ────────────────────────────────────

async fn handle_key_event(app: &mut TuiApp, key: crossterm::event::KeyEvent) {
    if app.show_help {
        app.show_help = false;
        return;
    }

    let controller = &mut app.app.controller;
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Char('d'), KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        (KeyCode::Char('r'), KeyModifiers::CONTROL) => {
            controller.trigger_sync();
        }
        (KeyCode::Char('g'), KeyModifiers::CONTROL) => {
            let visible = controller.state().suggestions_visible();
            controller.set_suggestions_visible(!visible);
        }
        (KeyCode::F(5), _) => {
            controller.refresh_metrics();
        }
        (KeyCode::F(1), _) => {
            app.show_help = true;
        }
        // Suggestion shortcut while the input is empty
        (KeyCode::Char(c @ '1'..='8'), KeyModifiers::NONE)
            if app.input.is_empty() && controller.state().suggestions_visible() =>
        {
            let number = c as usize - '0' as usize;
            if controller.submit_suggestion(number) {
                app.scroll_to_bottom();
            }
        }
        (KeyCode::Enter, KeyModifiers::NONE) => {
            let input = app.input.trim().to_string();
            if input.starts_with('/') {
                app.clear_input();
                handle_command(app, &input).await;
            } else if app.app.controller.submit() {
                app.input.clear();
                app.input_cursor = 0;
                app.scroll_to_bottom();
            }
        }
        // Text editing
        (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
            app.input.insert(app.input_cursor, c);
            app.input_cursor += c.len_utf8();
            app.sync_draft();
        }
        (KeyCode::Backspace, _) if app.input_cursor > 0 => {
            let prev = app.input[..app.input_cursor].chars().last().map(|c| c.len_utf8()).unwrap_or(1);
            app.input_cursor -= prev;
            app.input.remove(app.input_cursor);
            app.sync_draft();
        }
        (KeyCode::Delete, _) if app.input_cursor < app.input.len() => {
            app.input.remove(app.input_cursor);
            app.sync_draft();
        }
        (KeyCode::Left, _) if app.input_cursor > 0 => {
            let prev = app.input[..app.input_cursor].chars().last().map(|c| c.len_utf8()).unwrap_or(1);
            app.input_cursor -= prev;
        }
        (KeyCode::Right, _) if app.input_cursor < app.input.len() => {
            let next = app.input[app.input_cursor..].chars().next().map(|c| c.len_utf8()).unwrap_or(1);
            app.input_cursor += next;
        }
        (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => { app.input_cursor = 0; }
        (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => { app.input_cursor = app.input.len(); }
        (KeyCode::Up, _) => { app.scroll_offset = app.scroll_offset.saturating_sub(3); }
        (KeyCode::Down, _) => { app.scroll_offset = app.scroll_offset.saturating_add(3); }
        (KeyCode::PageUp, _) => { app.scroll_offset = app.scroll_offset.saturating_sub(20); }
        (KeyCode::PageDown, _) => { app.scroll_offset = app.scroll_offset.saturating_add(20); }
        _ => {}
    }
}

// ─── Commands ────────────────────────────────────────

async fn handle_command(app: &mut TuiApp, input: &str) {
    let (cmd, arg) = match input.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (input, ""),
    };
    let controller = &mut app.app.controller;
    match cmd {
        "/help" | "/h" => { app.show_help = true; }
        "/exit" | "/quit" | "/q" => { app.should_quit = true; }
        "/sync" => { controller.trigger_sync(); }
        "/metrics" | "/m" => { controller.refresh_metrics(); }
        "/suggest" | "/s" => { controller.set_suggestions_visible(true); }
        "/hide" => { controller.set_suggestions_visible(false); }
        "/upload" if arg.is_empty() => {
            controller.push_notice(Notice::info("Usage: /upload <path>"));
        }
        "/upload" => {
            controller.upload_path(Path::new(arg)).await;
        }
        _ => {
            controller.push_notice(Notice::info(format!("Unknown: {cmd}. F1 for help.")));
        }
    }
}

// ─── UI Rendering ────────────────────────────────────

fn ui(f: &mut Frame, app: &mut TuiApp) {
    let area = f.area();
    f.render_widget(Paragraph::new("").style(Style::default().bg(BG)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(4), // Metric cards
            Constraint::Min(5),    // Chat + suggestions
            Constraint::Length(3), // Input
            Constraint::Length(1), // Status
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_cards(f, app, chunks[1]);

    let show_suggestions = app.app.controller.state().suggestions_visible() && area.width > 80;
    if show_suggestions {
        let c = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(44)])
            .split(chunks[2]);
        render_chat(f, app, c[0]);
        render_suggestions(f, c[1]);
    } else {
        render_chat(f, app, chunks[2]);
    }

    render_input(f, app, chunks[3]);
    render_status(f, app, chunks[4]);

    if app.show_help {
        render_help(f, area);
    }
}

fn render_header(f: &mut Frame, app: &TuiApp, area: Rect) {
    let state = app.app.controller.state();
    let mut spans = vec![
        Span::styled(" \u{25C6} ", Style::default().fg(ACCENT)),
        Span::styled(
            "Alpha Insights",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  \u{2502}  ", Style::default().fg(BORDER)),
        Span::styled(app.app.config.base_url.clone(), Style::default().fg(CYAN)),
    ];
    if let Some(m) = state.metrics() {
        spans.push(Span::styled(
            format!("  \u{2502}  updated {}", m.updated_time()),
            Style::default().fg(DIM),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(SURFACE)),
        area,
    );
}

fn render_cards(f: &mut Frame, app: &TuiApp, area: Rect) {
    let cards = app.app.controller.state().metric_cards();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for (card, column) in cards.iter().zip(columns.iter()) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BORDER))
            .title(Span::styled(format!(" {} ", card.title), Style::default().fg(DIM)));
        let body = vec![
            Line::from(Span::styled(
                card.value.clone(),
                Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(card.caption.clone(), Style::default().fg(DIM))),
        ];
        f.render_widget(Paragraph::new(body).block(block), *column);
    }
}

fn render_chat(f: &mut Frame, app: &mut TuiApp, area: Rect) {
    let state = app.app.controller.state();
    let mut lines: Vec<Line> = Vec::new();

    for msg in state.messages() {
        lines.push(Line::from(""));
        match msg.role() {
            MessageRole::User => {
                lines.push(Line::from(vec![
                    Span::styled("  \u{25B6} ", Style::default().fg(GREEN)),
                    Span::styled("You", Style::default().fg(GREEN).add_modifier(Modifier::BOLD)),
                    Span::styled(
                        format!("  {}", msg.created_at().format("%H:%M")),
                        Style::default().fg(DIM),
                    ),
                ]));
                for l in msg.content().lines() {
                    lines.push(Line::from(Span::styled(
                        format!("    {l}"),
                        Style::default().fg(TEXT),
                    )));
                }
            }
            MessageRole::Assistant => {
                lines.push(Line::from(vec![
                    Span::styled("  \u{2728} ", Style::default().fg(ACCENT)),
                    Span::styled(
                        "Assistant",
                        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  {}", msg.created_at().format("%H:%M")),
                        Style::default().fg(DIM),
                    ),
                ]));
                lines.extend(markup::render_reply(msg.content(), "    "));
            }
        }
    }

    if state.is_analyzing() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {} Analyzing...", markup::spinner(app.tick)),
            Style::default().fg(YELLOW),
        )));
    }

    let total = lines.len() as u16;
    let visible = area.height.saturating_sub(2);
    app.total_content_height = total.saturating_sub(visible);
    app.scroll_offset = app.scroll_offset.min(app.total_content_height);

    let chat = Paragraph::new(Text::from(lines))
        .scroll((app.scroll_offset, 0))
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(BORDER)));
    f.render_widget(chat, area);

    if app.total_content_height > 0 {
        let sb = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .thumb_style(Style::default().fg(ACCENT))
            .track_style(Style::default().fg(BORDER));
        let mut state = ScrollbarState::new(app.total_content_height as usize)
            .position(app.scroll_offset as usize);
        f.render_stateful_widget(
            sb,
            area.inner(ratatui::layout::Margin { vertical: 1, horizontal: 0 }),
            &mut state,
        );
    }
}

fn render_suggestions(f: &mut Frame, area: Rect) {
    let mut lines = Vec::new();
    for (i, s) in SUGGESTED_QUESTIONS.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", i + 1), Style::default().fg(YELLOW).add_modifier(Modifier::BOLD)),
            Span::raw(format!("{} ", s.icon)),
            Span::styled(s.category, Style::default().fg(DIM)),
        ]));
        lines.push(Line::from(Span::styled(format!("   {}", s.text), Style::default().fg(TEXT))));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER))
        .title(Span::styled(
            " Suggestions \u{2502} 1-8 ask ",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ));
    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block).style(Style::default().bg(BG)),
        area,
    );
}

fn render_input(f: &mut Frame, app: &TuiApp, area: Rect) {
    let analyzing = app.app.controller.state().is_analyzing();
    let (border, text_style) = if analyzing {
        (BORDER, Style::default().fg(DIM))
    } else {
        (BORDER_ACTIVE, Style::default().fg(TEXT))
    };

    let title = if analyzing {
        format!(" {} Waiting for the answer... ", markup::spinner(app.tick))
    } else {
        " Question \u{2502} Enter send \u{2502} F1 help ".to_string()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(title, Style::default().fg(ACCENT)));

    let input = Paragraph::new(app.input.as_str()).style(text_style).block(block);
    f.render_widget(input, area);

    if !app.show_help {
        let cx = area.x + 1 + app.input[..app.input_cursor].chars().count() as u16;
        f.set_cursor_position((cx.min(area.x + area.width.saturating_sub(2)), area.y + 1));
    }
}

fn render_status(f: &mut Frame, app: &TuiApp, area: Rect) {
    let state = app.app.controller.state();
    let sep = Span::styled(" \u{2502} ", Style::default().fg(BORDER));

    let activity = if state.is_uploading() {
        Span::styled(format!(" {} Uploading ", markup::spinner(app.tick)), Style::default().fg(YELLOW))
    } else if state.is_syncing() {
        Span::styled(format!(" {} Syncing ", markup::spinner(app.tick)), Style::default().fg(YELLOW))
    } else if state.is_analyzing() {
        Span::styled(" Analyzing ", Style::default().fg(YELLOW))
    } else {
        Span::styled(" Ready ", Style::default().fg(GREEN))
    };

    let mut spans = vec![activity, sep.clone()];
    if let Some((notice, _)) = &app.notice {
        let fg = match notice.level {
            NoticeLevel::Info => DIM,
            NoticeLevel::Success => GREEN,
            NoticeLevel::Error => RED,
        };
        spans.push(Span::styled(notice.text.clone(), Style::default().fg(fg)));
        spans.push(sep);
    }
    spans.push(Span::styled(
        "^R sync  F5 metrics  ^G suggestions  F1 help",
        Style::default().fg(Color::Rgb(60, 60, 80)),
    ));
    f.render_widget(Paragraph::new(Line::from(spans)).style(Style::default().bg(SURFACE)), area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let width = 56.min(area.width);
    let height = 16.min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let rows = [
        ("Enter", "Send the question"),
        ("1-8", "Ask a suggestion (empty input)"),
        ("Ctrl+R", "Sync spreadsheets"),
        ("F5", "Refresh metrics"),
        ("Ctrl+G", "Show or hide suggestions"),
        ("Up/Down", "Scroll the chat"),
        ("/upload <path>", "Upload .xlsx, .xls or .csv"),
        ("/sync /metrics", "Same as the keys above"),
        ("/suggest /hide", "Suggestions panel"),
        ("Ctrl+C", "Quit"),
    ];
    let mut lines = vec![Line::from("")];
    for (key, desc) in rows {
        lines.push(Line::from(vec![
            Span::styled(format!("  {key:<16}"), Style::default().fg(YELLOW)),
            Span::styled(desc, Style::default().fg(TEXT)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  Press any key to close", Style::default().fg(DIM))));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER_ACTIVE))
        .title(Span::styled(" Help ", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)));
    f.render_widget(Clear, popup);
    f.render_widget(Paragraph::new(lines).block(block).style(Style::default().bg(SURFACE)), popup);
}
