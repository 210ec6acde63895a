//! UI drawing

use batinfo_estimate::{BatteryReport, OverrideField, RowAction};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::{App, Dialog};

/// Draw the UI
pub fn draw_ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Report
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    let report = app.report();

    draw_header(frame, chunks[0], app, &report);
    draw_report(frame, chunks[1], app, &report);
    draw_footer(frame, chunks[2], app);

    match app.dialog {
        Dialog::None => {}
        Dialog::Input(field) => draw_input_dialog(frame, app, field),
        Dialog::Error(field) => draw_error_dialog(frame, app, field),
    }
}

/// Draw header
fn draw_header(frame: &mut Frame, area: Rect, app: &App, report: &BatteryReport) {
    let title = match app.model() {
        Some(model) => format!("{} - {}", report.title, model),
        None => report.title.clone(),
    };

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

/// Draw the sectioned report as one list; only rows are selectable
fn draw_report(frame: &mut Frame, area: Rect, app: &App, report: &BatteryReport) {
    let label_width = report
        .rows()
        .map(|row| row.label.chars().count())
        .max()
        .unwrap_or(0);

    let mut items = Vec::new();
    let mut selected_item = None;
    let mut row_index = 0;

    for section in &report.sections {
        if !items.is_empty() {
            items.push(ListItem::new(""));
        }
        items.push(ListItem::new(Line::from(Span::styled(
            section.title.clone(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))));

        for row in &section.rows {
            if row_index == app.selected {
                selected_item = Some(items.len());
            }
            row_index += 1;

            let value_style = match row.action {
                RowAction::Edit(_) => Style::default().fg(Color::Green),
                RowAction::Placeholder => Style::default().fg(Color::DarkGray),
                RowAction::None => Style::default(),
            };
            let padding = label_width.saturating_sub(row.label.chars().count());

            items.push(ListItem::new(Line::from(vec![
                Span::raw(format!("  {}{}  ", row.label, " ".repeat(padding))),
                Span::styled(row.value.clone(), value_style),
            ])));
        }

        if let Some(footer) = &section.footer {
            items.push(ListItem::new(Text::from(Span::styled(
                format!("  {}", footer),
                Style::default().fg(Color::DarkGray),
            ))));
        }
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(selected_item);

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw footer
fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = match app.dialog {
        Dialog::None => "[↑↓] Navigate  [Enter] Edit  [L] Language  [Q] Quit",
        Dialog::Input(_) => "[0-9] Type  [Enter] Confirm  [Esc] Cancel",
        Dialog::Error(_) => "[Enter] Re-enter  [Esc] Cancel",
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));

    let status = Paragraph::new(app.status.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(help, chunks[0]);
    frame.render_widget(status, chunks[1]);
}

/// Numeric input dialog
fn draw_input_dialog(frame: &mut Frame, app: &App, field: OverrideField) {
    let strings = app.strings();
    let buffer = app.editor(field).buffer().unwrap_or_default();

    let input = if buffer.is_empty() {
        Span::styled(
            strings.placeholder(field, app.design_capacity()),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::styled(
            buffer.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )
    };

    let lines = vec![
        Line::from(strings.dialog_message(field)),
        Line::from(""),
        Line::from(vec![Span::raw("> "), input]),
        Line::from(""),
        Line::from(format!(
            "[Enter] {}   [Esc] {}",
            strings.button_done, strings.button_cancel
        ))
        .alignment(Alignment::Center),
    ];

    draw_popup(frame, strings.dialog_title(field), lines, Color::Cyan);
}

/// Rejected input dialog
fn draw_error_dialog(frame: &mut Frame, app: &App, field: OverrideField) {
    let strings = app.strings();

    let lines = vec![
        Line::from(strings.error_message(field)),
        Line::from(""),
        Line::from(format!(
            "[Enter] {}   [Esc] {}",
            strings.button_reenter, strings.button_cancel
        ))
        .alignment(Alignment::Center),
    ];

    draw_popup(frame, strings.error_title, lines, Color::Red);
}

fn draw_popup(frame: &mut Frame, title: &str, lines: Vec<Line<'_>>, color: Color) {
    let area = centered_rect(60, 40, frame.size());

    let popup = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(color)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

/// Rectangle of the given percentage size centered in `area`
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 40, area);

        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
        assert_eq!(popup.x, 20);
        assert_eq!(popup.y, 15);
    }
}
