use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table};

use crate::grading::{CalculationResult, Mode, Quality};
use crate::output::{format_points, format_status};
use crate::tui::app::{App, FlashLevel, FormRow, InputMode, LoadState, FORM_ROWS};

const FORM_WIDTH: u16 = 44;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 14 || area.width < 60 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    let banner_height = match app.load_state {
        LoadState::Unavailable(_) => 1,
        _ => 0,
    };

    // Layout: Title(1) + Banner(0/1) + Body(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(banner_height),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    if let LoadState::Unavailable(ref reason) = app.load_state {
        render_unavailable_banner(frame, chunks[1], app, reason);
    }

    let body = Layout::horizontal([Constraint::Length(FORM_WIDTH), Constraint::Fill(1)])
        .split(chunks[2]);
    render_form(frame, body[0], app);
    render_result(frame, body[1], app);

    render_status_bar(frame, chunks[3], app);

    if app.input_mode == InputMode::Help {
        render_help_popup(frame, app);
    }

    // Loading overlay appears on top of everything
    if app.is_loading() {
        render_loading_overlay(frame, app);
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let title = "Grade Calculator";
    let mut spans = vec![Span::styled(
        title,
        Style::default().fg(app.theme.title_color).bold(),
    )];

    let padding_len = (area.width as usize).saturating_sub(title.len() + app.source_label.len());
    spans.push(Span::raw(" ".repeat(padding_len)));
    spans.push(Span::styled(
        app.source_label.clone(),
        Style::default().fg(app.theme.muted),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_unavailable_banner(frame: &mut Frame, area: Rect, app: &App, reason: &str) {
    let theme = &app.theme;
    let line = Line::from(vec![
        Span::styled(" ! ", Style::default().fg(theme.banner_key).bold()),
        Span::styled(reason.to_string(), Style::default().fg(theme.banner_fg)),
        Span::styled("  r", Style::default().fg(theme.banner_key).bold()),
        Span::styled(":retry", Style::default().fg(theme.banner_fg)),
    ]);
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(theme.banner_bg)),
        area,
    );
}

fn render_form(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let block = Block::bordered()
        .title(" Marks ")
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let focused = app.focused_row();
    let lines: Vec<Line> = FORM_ROWS
        .iter()
        .map(|row| {
            let is_focused = *row == focused;
            let marker = if is_focused { "> " } else { "  " };
            let label_style = if is_focused {
                theme.field_focused
            } else {
                Style::default().fg(theme.field_label)
            };

            let mut spans = vec![
                Span::styled(marker, theme.field_focused),
                Span::styled(format!("{:<13}", row.label()), label_style),
            ];

            match row {
                FormRow::Field(section) => {
                    let text = app.session.field(*section);
                    let mut value = text.to_string();
                    if is_focused {
                        value.push('|');
                    }
                    spans.push(Span::styled(value, Style::default().fg(theme.field_value)));
                    if let Some(config) = app.session.config() {
                        let range = config.input_range(*section);
                        spans.push(Span::styled(
                            format!("  /{}", range.max),
                            Style::default().fg(theme.muted),
                        ));
                    }
                }
                FormRow::Quality(kind) => {
                    let active = app.session.selection(*kind);
                    for quality in Quality::ALL {
                        let style = if active.map(|s| s.quality) == Some(quality) {
                            theme.quality_active
                        } else {
                            Style::default().fg(theme.quality_inactive)
                        };
                        spans.push(Span::styled(format!(" {} ", quality.label()), style));
                    }
                    if let Some(selection) = active {
                        spans.push(Span::styled(
                            format!(" {}", selection.score),
                            Style::default().fg(theme.muted),
                        ));
                    }
                }
            }
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_result(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let block = Block::bordered()
        .title(" Result ")
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(result) = app.result.as_ref() else {
        let text = match app.load_state {
            LoadState::Unavailable(_) => "Grading configuration unavailable",
            _ => "Waiting for grading configuration",
        };
        frame.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(Style::default().fg(theme.muted)),
            inner,
        );
        return;
    };

    let chunks = Layout::vertical([Constraint::Length(5), Constraint::Fill(1)]).split(inner);
    render_summary(frame, chunks[0], app, result);
    render_targets(frame, chunks[1], app, result);
}

fn render_summary(frame: &mut Frame, area: Rect, app: &App, result: &CalculationResult) {
    let theme = &app.theme;
    let grade_color = theme.band_color(&result.grade);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("{:<14}", "Total"), theme.total_style),
            Span::styled(format_points(result.total), theme.total_style),
        ]),
        Line::from(vec![
            Span::styled(format!("{:<14}", "Grade"), Style::default().fg(theme.muted)),
            Span::styled(
                result.grade.display_label(),
                Style::default().fg(grade_color).bold(),
            ),
        ]),
    ];
    if result.mode == Mode::Prediction {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<14}", "Before final"), Style::default().fg(theme.muted)),
            Span::raw(format_points(result.pre_final_total)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        result.summary.to_string(),
        theme.title_style.fg(theme.title_color),
    )));

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_targets(frame: &mut Frame, area: Rect, app: &App, result: &CalculationResult) {
    let theme = &app.theme;
    let final_max = app
        .session
        .config()
        .map(|c| c.final_max())
        .unwrap_or_default();

    let rows: Vec<Row> = result
        .targets
        .iter()
        .map(|row| {
            let status = format_status(&row.status, final_max);
            Row::new(vec![
                Cell::from(row.band.name.clone())
                    .style(Style::default().fg(theme.band_color(&row.band)).bold()),
                Cell::from(row.band.min.to_string()),
                Cell::from(row.band.remarks.clone()).style(Style::default().fg(theme.muted)),
                Cell::from(status).style(Style::default().fg(theme.status_color(&row.status))),
            ])
        })
        .collect();

    let status_header = match result.mode {
        Mode::Prediction => "Final needed",
        Mode::Result => "Status",
    };

    let widths = [
        Constraint::Length(4),
        Constraint::Length(5),
        Constraint::Fill(1),
        Constraint::Length(18),
    ];

    let table = Table::new(rows, widths).header(
        Row::new(vec!["Band", "Min", "", status_header])
            .style(theme.header_style)
            .bottom_margin(1),
    );

    frame.render_widget(table, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let text = if let Some((ref msg, level, _)) = app.flash_message {
        let msg_color = match level {
            FlashLevel::Warning => theme.flash_warning,
            FlashLevel::Info => theme.flash_info,
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let hints: &[(&str, &str)] = match app.focused_row() {
            FormRow::Field(_) => &[
                ("Tab", ":next "),
                ("0-9", ":type "),
                ("Del", ":clear "),
                ("r", ":reload "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
            FormRow::Quality(_) => &[
                ("Tab", ":next "),
                ("</>", ":quality "),
                ("p/g/e", ":pick "),
                ("r", ":reload "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
        };
        let spans: Vec<Span> = hints
            .iter()
            .flat_map(|(key, desc)| {
                [
                    Span::styled(*key, Style::default().fg(theme.status_key_color)),
                    Span::raw(*desc),
                ]
            })
            .collect();
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(theme.status_bar_bg)),
        area,
    );
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    // Clamp dimensions to area bounds
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let popup_area = centered_rect_fixed(50, 14, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(" Keyboard Shortcuts ")
        .title_style(theme.popup_title)
        .border_style(Style::default().fg(theme.popup_border));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(theme.status_key_color).bold();
    let entries = [
        ("Tab / Down    ", "Next field"),
        ("S-Tab / Up    ", "Previous field"),
        ("0-9 . -       ", "Type a mark"),
        ("Backspace/Del ", "Erase / clear field"),
        ("Left / Right  ", "Cycle quality"),
        ("p / g / e     ", "Poor / Good / Excellent"),
        ("x             ", "Clear the form"),
        ("r             ", "Reload grading configuration"),
        ("?             ", "Show/hide this help"),
        ("q / Ctrl-c    ", "Quit"),
    ];

    let mut help_lines: Vec<Line> = entries
        .iter()
        .map(|(key, desc)| Line::from(vec![Span::styled(*key, key_style), Span::raw(*desc)]))
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(theme.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}

/// Render the loading spinner overlay
fn render_loading_overlay(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(40, 3, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered().border_style(Style::default().fg(app.theme.popup_border));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    // Braille spinner animation
    let spinner_chars = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let spinner = spinner_chars[app.spinner_frame % spinner_chars.len()];

    let loading_text = Paragraph::new(format!("{} Loading grading scale...", spinner))
        .alignment(Alignment::Center)
        .style(Style::default().fg(app.theme.title_color));

    frame.render_widget(loading_text, inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::{GradeError, GradingConfig, Section};
    use crate::tui::theme::ThemeColors;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn render(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_centered_rect_clamps() {
        let area = Rect::new(0, 0, 20, 10);
        let rect = centered_rect_fixed(40, 4, area);
        assert_eq!(rect.width, 20);
        assert_eq!(rect.y, 3);
    }

    #[test]
    fn test_draw_loading() {
        let mut app = App::new_loading("grading.json".to_string(), ThemeColors::dark());
        let screen = render(&mut app);
        assert!(screen.contains("Loading grading scale"));
        assert!(screen.contains("Waiting for grading configuration"));
    }

    #[test]
    fn test_draw_unavailable_banner() {
        let mut app = App::new_loading("grading.json".to_string(), ThemeColors::dark());
        app.config_loaded(Err(GradeError::unavailable("grading.json", "not found")));
        let screen = render(&mut app);
        assert!(screen.contains("not found"));
        assert!(screen.contains(":retry"));
    }

    #[test]
    fn test_draw_prediction() {
        let mut app = App::new_loading("grading.json".to_string(), ThemeColors::dark());
        app.config_loaded(Ok(GradingConfig::standard()));
        app.session.set_field(Section::Midterm, "20").unwrap();
        app.recompute();
        let screen = render(&mut app);
        assert!(screen.contains("Final needed"));
        assert!(screen.contains("Impossible (>40)"));
        assert!(screen.contains("Need 20 for D"));
    }

    #[test]
    fn test_status_bar_color_follows_flash_level() {
        let mut app = App::new_loading("grading.json".to_string(), ThemeColors::dark());
        app.config_loaded(Ok(GradingConfig::standard()));

        let status_fg = |app: &mut App| {
            let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
            terminal.draw(|frame| draw(frame, app)).unwrap();
            terminal.backend().buffer()[(0u16, 23u16)].fg
        };

        app.show_warning("Quiz 1 capped".to_string());
        assert_eq!(status_fg(&mut app), app.theme.flash_warning);

        app.show_flash("Maximum effort".to_string());
        assert_eq!(status_fg(&mut app), app.theme.flash_info);
    }
}
