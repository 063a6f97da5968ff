use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::task::{format_date, TaskRecord, TaskStatus};

use super::app::{AppState, StatusKind};

const SIDEBAR_WIDTH: u16 = 20;
const DATE_WIDTH: usize = 10;
const STATUS_WIDTH: usize = 12;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_BG_MUTED: Color = Color::Rgb(52, 56, 60);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_LIST: Color = Color::Rgb(92, 126, 166);

pub fn render(frame: &mut Frame, app: &AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(area);
    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)].as_ref())
        .split(chunks[0]);

    render_sidebar(frame, app, main[0]);
    render_tasks(frame, app, main[1]);
    render_footer(frame, app, chunks[1]);
}

fn render_sidebar(frame: &mut Frame, app: &AppState, area: Rect) {
    let lines: Vec<Line> = app
        .sidebar()
        .enumerate()
        .map(|(idx, name)| {
            if idx == app.selected {
                Line::from(Span::styled(
                    format!("> {name}"),
                    Style::default()
                        .fg(COLOR_TEXT)
                        .bg(COLOR_BG_MUTED)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::styled(
                    format!("  {name}"),
                    Style::default().fg(COLOR_MUTED),
                ))
            }
        })
        .collect();
    let widget = Paragraph::new(lines).block(
        Block::default()
            .title("User")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER_LIST)),
    );
    frame.render_widget(widget, area);
}

fn render_tasks(frame: &mut Frame, app: &AppState, area: Rect) {
    let show_owner = app.selected_user().is_none();
    let title = match app.selected_user() {
        Some(user) => format!("Tasks: {user}"),
        None => "Tasks: all users".to_string(),
    };

    let mut lines = vec![Line::from(Span::styled(
        header_row(show_owner),
        Style::default()
            .fg(COLOR_ACCENT)
            .add_modifier(Modifier::BOLD),
    ))];

    let visible = app.visible();
    if visible.is_empty() {
        lines.push(Line::from(Span::styled(
            "No tasks yet. Add one with: dtt add \"<description>\"",
            Style::default().fg(COLOR_MUTED),
        )));
    }
    for record in visible.iter().skip(app.scroll).take(app.page()) {
        lines.push(task_row(record, show_owner));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER_LIST)),
    );
    frame.render_widget(widget, area);
}

fn header_row(show_owner: bool) -> String {
    let mut row = format!(
        "{:<DATE_WIDTH$}  {:<STATUS_WIDTH$}  {:<DATE_WIDTH$}  ",
        "Date", "Status", "Deadline"
    );
    if show_owner {
        row.push_str("User: ");
    }
    row.push_str("Task");
    row
}

fn task_row(record: &TaskRecord, show_owner: bool) -> Line<'static> {
    let status = record.status.map(TaskStatus::label).unwrap_or("-");
    let mut spans = vec![
        Span::styled(
            format!("{:<DATE_WIDTH$}  ", format_date(record.date)),
            Style::default().fg(COLOR_TEXT),
        ),
        Span::styled(
            format!("{status:<STATUS_WIDTH$}  "),
            Style::default().fg(status_color(record.status)),
        ),
        Span::styled(
            format!("{:<DATE_WIDTH$}  ", format_date(record.deadline)),
            Style::default().fg(COLOR_MUTED),
        ),
    ];
    if show_owner {
        spans.push(Span::styled(
            format!("{}: ", record.user),
            Style::default().fg(COLOR_INFO),
        ));
    }
    spans.push(Span::styled(
        record.task.clone(),
        Style::default().fg(COLOR_TEXT),
    ));
    Line::from(spans)
}

fn status_color(status: Option<TaskStatus>) -> Color {
    match status {
        Some(TaskStatus::Completed) => COLOR_SUCCESS,
        Some(TaskStatus::InProgress) => COLOR_WARNING,
        Some(TaskStatus::YetToStart) => COLOR_ACCENT,
        None => COLOR_MUTED,
    }
}

fn render_footer(frame: &mut Frame, app: &AppState, area: Rect) {
    let hint_span = Span::styled(app.footer_hint(), Style::default().fg(COLOR_INFO));
    let line = if let Some((status, kind)) = app.status_line() {
        let status_style = match kind {
            StatusKind::Error => Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
            StatusKind::Info => Style::default().fg(COLOR_WARNING),
        };
        Line::from(vec![
            hint_span,
            Span::raw("  |  "),
            Span::styled(status.to_string(), status_style),
        ])
    } else {
        Line::from(hint_span)
    };
    let counts_line = Line::from(Span::styled(
        app.count_summary(),
        Style::default().fg(COLOR_ACCENT),
    ));
    let widget = Paragraph::new(vec![line, counts_line])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(COLOR_BORDER_LIST)),
        );
    frame.render_widget(widget, area);
}
