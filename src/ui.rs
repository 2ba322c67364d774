use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::game::Phase;
use crate::{App, CELL_KEYS};

const NAME_COL_WIDTH: usize = 16;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.game.phase() {
            Phase::Title => render_title(self, area, buf),
            Phase::Countdown => render_countdown(self, area, buf),
            Phase::Playing => render_playing(self, area, buf),
            Phase::Ended => render_ended(self, area, buf),
        }
    }
}

fn render_title(app: &App, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(4),
            Constraint::Length(2),
        ])
        .split(area);

    Paragraph::new(Span::styled("b l i k k", bold.fg(Color::Yellow)))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    Paragraph::new(Line::from(vec![
        Span::styled("< ", dim),
        Span::styled(app.game.difficulty().label(), bold),
        Span::styled(" >", dim),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled("press enter to start", dim))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    render_ranking(app, chunks[3], buf);

    Paragraph::new(Span::styled(
        "(←/→) difficulty | (c) clear ranking (C) clear all | (esc) quit",
        dim.add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);
}

fn render_countdown(app: &App, area: Rect, buf: &mut Buffer) {
    let mut lines = vec![Line::default(); vertical_pad(area, 1)];
    lines.push(Line::from(Span::styled(
        format!("{}", app.game.countdown()),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )));
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_playing(app: &App, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(2), Constraint::Min(3)])
        .split(area);

    let mut header = vec![
        Span::styled(format!("score {}", app.game.score()), bold),
        Span::styled("   ", dim),
        Span::styled(format!("time {}", app.game.time_left()), bold.fg(Color::Cyan)),
    ];
    if app.game.combo() > 1 {
        header.push(Span::styled("   ", dim));
        header.push(Span::styled(
            format!("combo x{}", app.game.combo()),
            bold.fg(Color::Magenta),
        ));
    }
    Paragraph::new(Line::from(header))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let size = app.game.difficulty().grid_size();
    let mut lines = vec![Line::default(); vertical_pad(chunks[1], size as u16)];
    for row in 0..size {
        let mut spans = Vec::with_capacity(size * 2);
        for col in 0..size {
            let index = row * size + col;
            let label = CELL_KEYS.as_bytes()[index] as char;
            if app.game.active_cell() == Some(index) {
                spans.push(Span::styled(
                    format!("[{}]", label),
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ));
            } else {
                spans.push(Span::styled(format!("[{}]", label), dim));
            }
            if col + 1 < size {
                spans.push(Span::raw(" "));
            }
        }
        lines.push(Line::from(spans));
    }
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
}

fn render_ended(app: &App, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(4),
            Constraint::Length(2),
        ])
        .split(area);

    Paragraph::new(Span::styled("time's up!", bold.fg(Color::Yellow)))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    Paragraph::new(Span::styled(
        format!("final score {}", app.game.score()),
        bold,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "hits {} | misses {} | best combo x{}",
            app.game.hits(),
            app.game.misses(),
            app.game.best_combo()
        ),
        dim,
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    render_ranking(app, chunks[3], buf);

    if app.game.name_required() {
        Paragraph::new(Line::from(vec![
            Span::styled("new record! name: ", bold.fg(Color::Green)),
            Span::styled(app.name_input.as_str(), bold),
            Span::styled("█", dim),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
    } else {
        Paragraph::new(Span::styled(
            "(r) restart | (t) title | (esc) quit",
            dim.add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
    }
}

fn render_ranking(app: &App, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("ranking | {}", app.game.difficulty().label()));

    let rows = app.game.ranking_rows();
    if rows.is_empty() {
        Paragraph::new(Span::styled(
            "no records yet",
            Style::default().add_modifier(Modifier::DIM),
        ))
        .block(block)
        .alignment(Alignment::Center)
        .render(area, buf);
        return;
    }

    let header = Row::new(vec![Cell::from("#"), Cell::from("name"), Cell::from("score")]).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let body: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let row = Row::new(vec![
                Cell::from(format!("{}.", index + 1)),
                Cell::from(fit_width(&entry.name, NAME_COL_WIDTH)),
                Cell::from(entry.score.to_string()),
            ]);
            if app.game.last_rank() == Some(index) {
                row.style(
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                row
            }
        })
        .collect();

    Table::new(
        body,
        &[
            Constraint::Length(4),
            Constraint::Length(NAME_COL_WIDTH as u16 + 2),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(block)
    .render(area, buf);
}

/// Blank lines needed above `content_height` rows to center them in `area`.
fn vertical_pad(area: Rect, content_height: u16) -> usize {
    (area.height.saturating_sub(content_height) / 2) as usize
}

/// Truncate to `max` display columns, wide glyphs included.
fn fit_width(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max.saturating_sub(1) {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}
