//! Rendering functions for the draw screen.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table},
    Frame,
};

use super::theme::Theme;
use crate::models::Step;

/// One row of the admin step table.
pub struct StepRow {
    pub id: String,
    pub title: String,
    pub is_unlocked: bool,
    pub revealed: bool,
}

/// Render the header with logo, trip title, and sign-in state.
pub fn render_header(
    frame: &mut Frame,
    area: Rect,
    spinner: Option<char>,
    trip_title: &Option<String>,
    identity_label: &Option<String>,
) {
    let mut lines: Vec<Line> = crate::LOGO
        .lines()
        .map(|l| Line::from(Span::styled(l, Theme::header())))
        .collect();

    let mut meta = vec![Span::raw("  ")];
    if let Some(spinner) = spinner {
        meta.push(Span::styled(format!("{spinner} "), Theme::header()));
    }
    if let Some(title) = trip_title {
        meta.push(Span::styled(title.clone(), Theme::card_title()));
        meta.push(Span::raw("  "));
    }
    match identity_label {
        Some(label) => meta.push(Span::styled(format!("signed in as {label}"), Theme::dimmed())),
        None => meta.push(Span::styled("signed out", Theme::dimmed())),
    }
    lines.push(Line::from(meta));

    frame.render_widget(Paragraph::new(lines), area);
}

/// Render the big card showing the step the reel is pointing at. A
/// signed-out viewer gets the sign-in hint instead of the itinerary.
pub fn render_step_card(
    frame: &mut Frame,
    area: Rect,
    step: Option<&Step>,
    rolling: bool,
    ready: bool,
    signed_in: bool,
) {
    let title = if rolling { " Drawing " } else { " Current Step " };
    let block = Block::default()
        .title(title)
        .title_style(Theme::header())
        .borders(Borders::ALL)
        .border_style(Theme::border());

    if !signed_in {
        let card = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("You are signed out", Theme::dimmed())),
            Line::from(Span::styled(
                "run `jaunt login` and come back to draw",
                Theme::dimmed(),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(card, area);
        return;
    }

    let lines = match step {
        Some(step) => {
            let style = if rolling {
                Theme::card_rolling()
            } else {
                Theme::card_title()
            };
            let mut lines = vec![
                Line::from(""),
                Line::from(Span::styled(step.title.clone(), style)),
            ];
            if let Some(location) = &step.location {
                lines.push(Line::from(Span::styled(location.clone(), Theme::dimmed())));
            }
            lines
        }
        None => {
            let hint = if ready {
                "press space to draw the first step"
            } else {
                "waiting for a step to be unlocked"
            };
            vec![
                Line::from(""),
                Line::from(Span::styled("Nothing revealed yet", Theme::dimmed())),
                Line::from(Span::styled(hint, Theme::dimmed())),
            ]
        }
    };

    let card = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(card, area);
}

/// Render the strip of already-revealed step titles.
pub fn render_history(frame: &mut Frame, area: Rect, titles: &[String]) {
    let block = Block::default()
        .title(format!(" Revealed ({}) ", titles.len()))
        .title_style(Theme::header())
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let max_width = area.width.saturating_sub(4) as usize;
    let line = if titles.is_empty() {
        Line::from(Span::styled("none yet", Theme::dimmed()))
    } else {
        Line::from(Span::styled(
            history_line(titles, max_width),
            Theme::revealed(),
        ))
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Render the admin step table with lock states and the cursor.
pub fn render_step_table(frame: &mut Frame, area: Rect, rows: &[StepRow], cursor: usize) {
    let block = Block::default()
        .title(format!(" Steps ({}) ", rows.len()))
        .title_style(Theme::header())
        .borders(Borders::ALL)
        .border_style(Theme::border());

    if rows.is_empty() {
        let empty = Paragraph::new("No steps")
            .style(Theme::dimmed())
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec!["", "Step", "Title", "Lock"])
        .style(Theme::header())
        .bottom_margin(1);

    let table_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let glyph = step_glyph(row.is_unlocked, row.revealed);
            let lock = if row.is_unlocked { "unlocked" } else { "locked" };

            let style = if i == cursor {
                Theme::selected()
            } else if row.revealed {
                Theme::revealed()
            } else if row.is_unlocked {
                Theme::unlocked()
            } else {
                Theme::locked()
            };

            Row::new(vec![
                glyph.to_string(),
                row.id.clone(),
                crate::utils::truncate(&row.title, 40),
                lock.to_string(),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        ratatui::layout::Constraint::Length(2),
        ratatui::layout::Constraint::Length(6),
        ratatui::layout::Constraint::Min(15),
        ratatui::layout::Constraint::Length(8),
    ];

    let table = Table::new(table_rows, widths).block(block).header(header);
    frame.render_widget(table, area);
}

/// Render the footer: error banner or status hint, then keybinds.
pub fn render_footer(
    frame: &mut Frame,
    area: Rect,
    banner: &Option<String>,
    hint: &str,
    is_admin: bool,
) {
    let status = if let Some(ref message) = banner {
        Line::from(Span::styled(message.as_str(), Theme::banner()))
    } else {
        Line::from(Span::styled(hint, Theme::dimmed()))
    };

    let mut keys = vec![
        Span::styled("space", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" draw \u{2502} "),
    ];
    if is_admin {
        keys.push(Span::styled(
            "\u{2191}\u{2193}",
            Style::default().add_modifier(Modifier::BOLD),
        ));
        keys.push(Span::raw(" select \u{2502} "));
        keys.push(Span::styled(
            "u",
            Style::default().add_modifier(Modifier::BOLD),
        ));
        keys.push(Span::raw(" lock/unlock \u{2502} "));
    }
    keys.push(Span::styled(
        "q",
        Style::default().add_modifier(Modifier::BOLD),
    ));
    keys.push(Span::raw(" quit"));

    let footer = Paragraph::new(vec![status, Line::from(keys).style(Theme::key_hint())]);
    frame.render_widget(footer, area);
}

/// Indicator glyph for a step's state.
pub fn step_glyph(unlocked: bool, revealed: bool) -> &'static str {
    if revealed {
        "\u{2713}"
    } else if unlocked {
        "\u{2192}"
    } else {
        "\u{2500}"
    }
}

/// Status line shown under the card when no banner is up.
pub fn status_hint(rolling: bool, ready: bool, signed_in: bool) -> &'static str {
    if rolling {
        "rolling..."
    } else if !signed_in {
        "sign in with `jaunt login` to draw"
    } else if ready {
        "press space to draw the next step"
    } else {
        "the next step is locked"
    }
}

/// Join revealed titles into one line, truncated to fit.
pub fn history_line(titles: &[String], max_width: usize) -> String {
    let joined = titles.join(" \u{00B7} ");
    crate::utils::truncate(&joined, max_width.max(4))
}
