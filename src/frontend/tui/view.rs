use super::app::{AuthTab, Dialog, DialogKind, PopupKind, Screen, TuiApp, ACTIONS};
use super::form::Form;
use crate::domain::model::SearchBy;
use crate::domain::ports::Clock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};

const ACCENT: Color = Color::Rgb(0, 102, 204);
const LABEL_WIDTH: usize = 10;

pub fn draw<C: Clock>(frame: &mut Frame, app: &TuiApp<C>) {
    match app.screen() {
        Screen::Auth => draw_auth(frame, app),
        Screen::Main => draw_main(frame, app),
    }

    if let Some(dialog) = app.dialog() {
        draw_dialog(frame, dialog);
    }

    if let Some(popup) = app.popup() {
        let (color, hint) = match popup.kind {
            PopupKind::Info => (ACCENT, "Enter to close"),
            PopupKind::Warning => (Color::Red, "Enter to dismiss"),
        };
        let lines = popup.message.lines().count() as u16;
        let area = centered_rect(56, lines + 4, frame.area());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(format!(" {} ", popup.title))
            .title_bottom(Line::from(format!(" {} ", hint)).right_aligned());
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(popup.message.as_str())
                .wrap(Wrap { trim: false })
                .block(block),
            area,
        );
    }
}

fn draw_auth<C: Clock>(frame: &mut Frame, app: &TuiApp<C>) {
    let area = centered_rect(60, 16, frame.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Length(3), // tabs
            Constraint::Min(4),    // form
            Constraint::Length(1), // hints
        ])
        .split(area);

    let title = Paragraph::new(format!("📖 {} 📖", app.title()))
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(title, chunks[0]);

    let selected = match app.auth_tab {
        AuthTab::Login => 0,
        AuthTab::Register => 1,
    };
    let tabs = Tabs::new(vec!["Login", "Register"])
        .select(selected)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::White).bg(ACCENT));
    frame.render_widget(tabs, chunks[1]);

    let form_title = match app.auth_tab {
        AuthTab::Login => " Login ",
        AuthTab::Register => " Register ",
    };
    render_form(frame, app.auth_form(), form_title, chunks[2]);

    let hints = Paragraph::new("Tab switch form · Enter next/submit · Esc quit")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hints, chunks[3]);
}

fn draw_main<C: Clock>(frame: &mut Frame, app: &TuiApp<C>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // user
            Constraint::Length(4), // actions
            Constraint::Min(3),    // table
        ])
        .split(frame.area());

    let name = app
        .system()
        .current_user()
        .map(|user| user.name.as_str())
        .unwrap_or_default();
    frame.render_widget(
        Paragraph::new(format!("👤 Logged in as: {}", name))
            .style(Style::default().add_modifier(Modifier::BOLD)),
        chunks[0],
    );

    let mut spans = Vec::with_capacity(ACTIONS.len() * 2);
    for (key, label) in ACTIONS {
        spans.push(Span::styled(
            format!(" {} ", key),
            Style::default().fg(Color::White).bg(ACCENT),
        ));
        spans.push(Span::raw(format!(" {}  ", label)));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL)),
        chunks[1],
    );

    let table = app.table();
    let headers = table.kind.headers();
    let header = Row::new(headers.iter().map(|h| Cell::from(*h)))
        .style(Style::default().add_modifier(Modifier::BOLD).fg(ACCENT));
    let rows = table
        .rows
        .iter()
        .map(|row| Row::new(row.iter().map(|value| Cell::from(value.as_str()))));
    let widths = vec![Constraint::Ratio(1, headers.len() as u32); headers.len()];
    let widget = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} books ", table.rows.len())),
    );
    frame.render_widget(widget, chunks[2]);
}

fn draw_dialog(frame: &mut Frame, dialog: &Dialog) {
    let extra = u16::from(dialog.kind == DialogKind::Search);
    let height = dialog.form.fields.len() as u16 + extra + 4;
    let area = centered_rect(52, height, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(format!(" {} ", dialog.kind.title()))
        .title_bottom(Line::from(" Enter submit · Esc cancel ").right_aligned());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    if dialog.kind == DialogKind::Search {
        let mut spans = vec![Span::raw(format!("{:>width$}: ", "By", width = LABEL_WIDTH))];
        for by in SearchBy::ALL {
            let style = if by == dialog.search_by {
                Style::default().fg(Color::White).bg(ACCENT)
            } else {
                Style::default()
            };
            spans.push(Span::styled(format!(" {} ", by.as_str()), style));
        }
        spans.push(Span::styled(" ←/→", Style::default().fg(Color::DarkGray)));
        lines.push(Line::from(spans));
    }
    lines.extend(form_lines(&dialog.form));
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_form(frame: &mut Frame, form: &Form, title: &str, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    frame.render_widget(Paragraph::new(form_lines(form)).block(block), area);
}

fn form_lines(form: &Form) -> Vec<Line<'static>> {
    form.fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let focused = index == form.focus;
            let marker = if focused { "▌" } else { " " };
            let value_style = if focused {
                Style::default().add_modifier(Modifier::UNDERLINED)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::raw(format!("{:>width$}: ", field.label, width = LABEL_WIDTH)),
                Span::styled(field.display_value(), value_style),
                Span::styled(marker, Style::default().fg(ACCENT)),
            ])
        })
        .collect()
}

/// Rect of at most `width` x `height` centred in `area`.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(centered_rect(20, 4, area), Rect::new(10, 3, 20, 4));
        assert_eq!(centered_rect(80, 40, area), area);
    }
}
