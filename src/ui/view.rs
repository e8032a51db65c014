//! Form rendering.
//!
//! Inputs on the left, the optimized prompt on the right, session history
//! along the bottom.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};

use crate::form::{ANSWER_SLOTS, Session};
use crate::prompt::Mode;
use crate::ui::input::KEY_HELP;
use crate::ui::state::{App, Field};

const BRAND_PRIMARY: Color = Color::Rgb(0x6C, 0x5C, 0xE7);
const BRAND_ACCENT: Color = Color::Rgb(0x00, 0xCE, 0xC9);

/// Shown in place of the document while the rough idea is empty.
pub const EMPTY_PREVIEW: &str = "← Start by typing a rough prompt on the left.";

/// Draw the whole form for one frame.
pub fn draw(f: &mut Frame, app: &App, session: &Session) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(10),
            Constraint::Length(9),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    draw_inputs(f, app, session, columns[0]);
    draw_output(f, app, columns[1]);

    draw_history(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);
}

fn draw_header(f: &mut Frame, area: Rect) {
    let header = Line::from(vec![
        Span::styled(
            " ✨ Lyra Prompt App ",
            Style::default()
                .fg(Color::Black)
                .bg(BRAND_PRIMARY)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " Turn rough ideas into optimized prompts. ",
            Style::default().fg(Color::Black).bg(BRAND_ACCENT),
        ),
    ]);
    f.render_widget(Paragraph::new(header), area);
}

fn draw_inputs(f: &mut Frame, app: &App, session: &Session, area: Rect) {
    let detail = app.form.mode == Mode::Detail;
    let settings_height = if app.categories.is_empty() { 5 } else { 7 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(settings_height),
            Constraint::Min(4),
            Constraint::Length(if detail { ANSWER_SLOTS as u16 + 3 } else { 0 }),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(area);

    draw_settings(f, app, session, chunks[0]);
    draw_text(
        f,
        app,
        Field::RoughIdea,
        "1) Your Rough Prompt",
        &app.form.rough_idea,
        Some("e.g., Write me a sales email"),
        chunks[1],
    );
    if detail {
        draw_answers(f, app, chunks[2]);
    }
    draw_text(
        f,
        app,
        Field::MaxLength,
        "3) Max length / tokens (optional)",
        &app.form.max_length,
        None,
        chunks[3],
    );
    draw_text(
        f,
        app,
        Field::Extras,
        "Special instructions (style guides, constraints)",
        &app.form.extra_instructions,
        None,
        chunks[4],
    );
}

fn draw_settings(f: &mut Frame, app: &App, session: &Session, area: Rect) {
    let mut lines = vec![
        selector_line(app, Field::TargetAi, "Target AI", app.form.target_ai.as_str()),
        selector_line(app, Field::Mode, "Prompt Style", app.form.mode.as_str()),
    ];

    if app.categories.is_empty() {
        let notice = match session.templates_error() {
            Some(error) => format!("⚠ Templates unavailable: {error}"),
            None => format!(
                "⚠ No templates found. You can add {} later.",
                session.templates_path().display()
            ),
        };
        lines.push(Line::from(Span::styled(
            notice,
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        let category = app.category_filter().to_string();
        lines.push(selector_line(app, Field::Category, "Category", &category));
        let template = app
            .selected_template(session)
            .map(|t| t.label())
            .unwrap_or_else(|| "(none)".to_string());
        lines.push(selector_line(app, Field::Template, "Template", &template));
    }

    let auto_save = if app.form.auto_save { "[x]" } else { "[ ]" };
    lines.push(selector_line(
        app,
        Field::AutoSave,
        "Auto-save session history (CSV)",
        auto_save,
    ));

    let block = Block::default().borders(Borders::ALL).title(" Settings ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn selector_line(app: &App, field: Field, label: &str, value: &str) -> Line<'static> {
    let focused = app.focus == field;
    let marker = if focused { "▸ " } else { "  " };
    Line::from(vec![
        Span::raw(marker),
        Span::styled(format!("{label}: "), Style::default().fg(Color::DarkGray)),
        Span::styled(format!("‹ {value} ›"), field_style(focused)),
    ])
}

fn draw_answers(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::from(Span::styled(
        format!("Suggested prompts: {}", app.form.suggested_questions),
        Style::default().fg(Color::DarkGray),
    ))];
    for (i, answer) in app.form.answer_inputs.iter().enumerate() {
        let focused = app.focus == Field::Answer(i);
        lines.push(Line::from(vec![
            Span::raw(if focused { "▸ " } else { "  " }),
            Span::styled(format!("Answer {}: ", i + 1), Style::default().fg(Color::DarkGray)),
            Span::styled(with_cursor(answer, focused), field_style(focused)),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" 2) Clarifying (auto in DETAIL) ");
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_text(
    f: &mut Frame,
    app: &App,
    field: Field,
    title: &str,
    value: &str,
    placeholder: Option<&str>,
    area: Rect,
) {
    let focused = app.focus == field;
    let text = match placeholder {
        Some(placeholder) if value.is_empty() && !focused => Text::styled(
            placeholder.to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        _ => Text::raw(with_cursor(value, focused)),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "))
        .border_style(field_style(focused));
    f.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_output(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let body = if app.preview.is_empty() {
        Text::styled(EMPTY_PREVIEW, Style::default().fg(Color::DarkGray))
    } else {
        Text::raw(app.preview.as_str())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Your Optimized Prompt ")
        .title_bottom(" Copy this into your chosen AI ");
    f.render_widget(
        Paragraph::new(body).block(block).wrap(Wrap { trim: false }),
        chunks[0],
    );

    let enabled = !app.preview.is_empty();
    let action = |label: &'static str, on: bool| {
        let style = if on {
            Style::default().fg(BRAND_ACCENT)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(label, style)
    };
    let actions = Line::from(vec![
        action("[Ctrl-T] Download .txt", enabled),
        Span::raw("   "),
        action("[Copy to Clipboard: unavailable]", false),
        Span::raw("   "),
        action("[Ctrl-D] Download .md", enabled),
    ]);
    f.render_widget(Paragraph::new(actions), chunks[1]);
}

fn draw_history(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Session History ");

    let rows = match &app.history {
        Err(message) => {
            let text = Text::styled(
                format!("Session history unavailable: {message}"),
                Style::default().fg(Color::Red),
            );
            f.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), area);
            return;
        }
        Ok(rows) if rows.is_empty() => {
            let text = Text::styled(
                "No sessions saved yet. Enable auto-save to log runs.",
                Style::default().fg(Color::DarkGray),
            );
            f.render_widget(Paragraph::new(text).block(block), area);
            return;
        }
        Ok(rows) => rows,
    };

    let header = Row::new(
        ["timestamp", "target_ai", "mode", "rough", "tokens", "extras", "optimized_len"]
            .map(|h| Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))),
    );
    // Newest last, so keep the tail visible.
    let visible = area.height.saturating_sub(3) as usize;
    let skip = rows.len().saturating_sub(visible);
    let body = rows.iter().skip(skip).map(|row| {
        Row::new(vec![
            Cell::from(row.timestamp.clone()),
            Cell::from(row.target_ai.as_str()),
            Cell::from(row.mode.as_str()),
            Cell::from(first_line(&row.rough_idea)),
            Cell::from(row.max_length.clone()),
            Cell::from(first_line(&row.extra_instructions)),
            Cell::from(row.optimized_length.to_string()),
        ])
    });
    let widths = [
        Constraint::Length(26),
        Constraint::Length(9),
        Constraint::Length(6),
        Constraint::Min(16),
        Constraint::Length(8),
        Constraint::Min(10),
        Constraint::Length(13),
    ];
    f.render_widget(Table::new(body, widths).header(header).block(block), area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let line = match &app.status {
        Some(status) if status.is_error => Line::from(Span::styled(
            status.message.clone(),
            Style::default().fg(Color::Red),
        )),
        Some(status) => Line::from(Span::styled(
            status.message.clone(),
            Style::default().fg(Color::Green),
        )),
        None => Line::from(Span::styled(KEY_HELP, Style::default().fg(Color::DarkGray))),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn field_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn with_cursor(value: &str, focused: bool) -> String {
    if focused {
        format!("{value}▏")
    } else {
        value.to_string()
    }
}

fn first_line(value: &str) -> String {
    value.lines().next().unwrap_or_default().to_string()
}
