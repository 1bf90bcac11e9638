use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use comments_shared::Comment;

use crate::app::{App, Focus};
use crate::form::{CommentForm, FormField};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(9), // New comment form
            Constraint::Min(0),    // Comments
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    draw_header(f, chunks[0], app);
    draw_create_form(f, chunks[1], app);
    draw_comments(f, chunks[2], app);
    draw_status_bar(f, chunks[3], app);

    if let Some(ref input) = app.task_prompt {
        draw_task_prompt_popup(f, input);
    }

    if let Some(pending) = app.pending_confirm() {
        draw_confirm_popup(f, &pending.prompt);
    }

    if let Some(notice) = app.notice() {
        draw_notice_popup(f, notice);
    }
}

/// Creation time in the viewer's local zone, or the server's text if it
/// was not a date
pub fn format_timestamp(comment: &Comment) -> String {
    match comment.created_at.as_utc() {
        Some(dt) => dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => comment.created_at.to_string(),
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let header = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            "Task detail",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("id: {}", app.view.task_id()),
            Style::default().fg(Color::Yellow),
        ),
    ])])
    .block(Block::default().borders(Borders::BOTTOM));

    f.render_widget(header, area);
}

fn field_style(form: &CommentForm, field: FormField, focused: bool) -> Style {
    if focused && form.focus() == field {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    }
}

fn draw_create_form(f: &mut Frame, area: Rect, app: &App) {
    let form = app.view.panel.create_form();
    let focused = app.focus == Focus::CreateForm;

    let block = Block::default()
        .title(" Comments ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Yellow } else { Color::Cyan }));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Text
            Constraint::Length(3), // Author
        ])
        .split(inner);

    let text_lines: Vec<Line> = if form.text().is_empty() && !focused {
        vec![Line::from(Span::styled(
            "Write a comment...",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        form.text_lines().iter().map(|l| Line::from(l.as_str())).collect()
    };
    let (row, col) = form.text_cursor();
    let visible_rows = chunks[0].height.saturating_sub(2) as usize;
    let scroll = row.saturating_sub(visible_rows.saturating_sub(1));
    let text = Paragraph::new(text_lines)
        .scroll((scroll as u16, 0))
        .block(
            Block::default()
                .title(" Text ")
                .borders(Borders::ALL)
                .border_style(field_style(form, FormField::Text, focused)),
        );
    f.render_widget(text, chunks[0]);

    let author_text = if form.author().is_empty() && !focused {
        Span::styled("Your name (optional)", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(form.author())
    };
    let author = Paragraph::new(Line::from(author_text)).block(
        Block::default()
            .title(format!(" Name | Ctrl+S: {} ", form.submit_label()))
            .borders(Borders::ALL)
            .border_style(field_style(form, FormField::Author, focused)),
    );
    f.render_widget(author, chunks[1]);

    if focused {
        let (x, y) = match form.focus() {
            FormField::Text => (
                chunks[0].x + 1 + col as u16,
                chunks[0].y + 1 + (row - scroll) as u16,
            ),
            FormField::Author => (
                chunks[1].x + 1 + form.author().chars().count() as u16,
                chunks[1].y + 1,
            ),
        };
        f.set_cursor_position((x, y));
    }
}

/// Lines of the inline edit form shown under a comment
fn edit_form_lines(form: &CommentForm, focused: bool) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let text_style = field_style(form, FormField::Text, focused);
    let author_style = field_style(form, FormField::Author, focused);

    for (i, line) in form.text_lines().iter().enumerate() {
        let prefix = if i == 0 { "  Text: " } else { "        " };
        lines.push(Line::from(vec![
            Span::styled(prefix, text_style),
            Span::raw(line.clone()),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled("  Name: ", author_style),
        Span::raw(form.author().to_string()),
    ]));

    let mut hint = format!("  Ctrl+S: {}", form.submit_label());
    if form.is_cancellable() {
        hint.push_str(" | Esc: Cancel");
    }
    lines.push(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))));
    lines
}

fn draw_comments(f: &mut Frame, area: Rect, app: &App) {
    let panel = &app.view.panel;
    let mut lines: Vec<Line> = Vec::new();
    let mut selected_line = 0;

    if panel.is_loading() {
        lines.push(Line::from(Span::styled(
            "Loading comments...",
            Style::default().fg(Color::Yellow),
        )));
    }

    if let Some(error) = panel.error() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )));
    }

    for (i, comment) in panel.comments().iter().enumerate() {
        let is_selected = i == panel.selected() && app.focus == Focus::List;
        if i == panel.selected() {
            selected_line = lines.len();
        }
        let marker = if is_selected { "> " } else { "  " };

        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(Color::Cyan)),
            Span::styled(
                comment.display_author().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(format_timestamp(comment), Style::default().fg(Color::DarkGray)),
        ]));

        // Keep embedded line breaks
        for line in comment.text.split('\n') {
            lines.push(Line::from(format!("  {}", line)));
        }

        match (panel.editing_id(), panel.edit_form()) {
            (Some(id), Some(form)) if id == &comment.id => {
                lines.extend(edit_form_lines(form, app.focus == Focus::EditForm));
            }
            _ => lines.push(Line::from(Span::styled(
                "  e: Edit | d: Delete",
                Style::default().fg(Color::DarkGray),
            ))),
        }

        lines.push(Line::from(""));
    }

    let visible = area.height.saturating_sub(2) as usize;
    let scroll = selected_line.saturating_sub(visible / 2);

    let list = Paragraph::new(lines)
        .scroll((scroll as u16, 0))
        .block(
            Block::default()
                .title(format!(" {} comment(s) ", panel.comments().len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if app.focus == Focus::List {
                    Color::Cyan
                } else {
                    Color::DarkGray
                })),
        );

    f.render_widget(list, area);
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let (mode, mode_color) = match app.focus {
        Focus::List => ("LIST", Color::Blue),
        Focus::CreateForm => ("NEW", Color::Green),
        Focus::EditForm => ("EDIT", Color::Yellow),
    };

    let hints = match app.focus {
        Focus::List => {
            "j/k: move | a: comment | e: edit | d: delete | r: reload | g: go to task | q: quit"
        }
        Focus::CreateForm => "Tab: field | Ctrl+S: submit | Ctrl+E: $EDITOR | Esc: back",
        Focus::EditForm => {
            "Tab: field | Ctrl+S: update | Ctrl+E: $EDITOR | Ctrl+L: list | Esc: cancel"
        }
    };

    let status = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {} ", mode),
            Style::default().bg(mode_color).fg(Color::White),
        ),
        Span::raw(" "),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]));

    f.render_widget(status, area);
}

fn draw_task_prompt_popup(f: &mut Frame, input: &str) {
    let area = centered_rect(50, 20, f.area());

    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Go to Task ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Input
            Constraint::Length(1), // Hint
            Constraint::Min(0),
        ])
        .split(inner);

    let field = Paragraph::new(input).block(
        Block::default()
            .title(" Task id ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(field, chunks[0]);

    let hint = Paragraph::new("Enter: open | Esc: cancel")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(hint, chunks[1]);

    f.set_cursor_position((
        chunks[0].x + 1 + input.chars().count() as u16,
        chunks[0].y + 1,
    ));
}

fn draw_confirm_popup(f: &mut Frame, prompt: &str) {
    let area = centered_rect(50, 20, f.area());

    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Message
            Constraint::Length(2), // Hint
            Constraint::Min(0),    // Spacer
        ])
        .split(inner);

    let message = Paragraph::new(prompt)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(message, chunks[0]);

    let hint = Paragraph::new("y: yes | n: no")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(hint, chunks[1]);
}

fn draw_notice_popup(f: &mut Frame, message: &str) {
    let area = centered_rect(60, 20, f.area());

    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let text = Paragraph::new(message)
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(block);

    f.render_widget(text, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
