use ratatui::prelude::*;
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};

use crate::quiz::{format_count, format_mcap, Listing, MatchOutcome, Outcome, Phase, TieredOutcome};
use crate::tui::app::{App, InputMode, StepView};
use crate::tui::theme::ThemeColors;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Widest the quiz body gets on large terminals
const BODY_WIDTH: u16 = 72;

pub fn draw(frame: &mut Frame, app: &App, colors: &ThemeColors) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 8 || area.width < 30 {
        let msg = Paragraph::new("Terminal too small")
            .alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Progress(1) + Body(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),  // Title bar
        Constraint::Length(1),  // Progress
        Constraint::Fill(1),    // Screen for the current phase
        Constraint::Length(1),  // Status bar
    ])
    .split(area);

    render_title(frame, chunks[0], app, colors);
    render_progress(frame, chunks[1], app, colors);

    let body = centered_column(BODY_WIDTH, chunks[2]);
    match app.session.phase() {
        Phase::Intro => render_intro(frame, body, app, colors),
        Phase::Quiz(_) => render_question(frame, body, app, colors),
        Phase::Calculating => render_calculating(frame, body, app, colors),
        Phase::Result => render_result(frame, body, app, colors),
    }

    render_status_bar(frame, chunks[3], app, colors);

    match app.input_mode {
        InputMode::Help => render_help_popup(frame, app, colors),
        InputMode::Breakdown => render_breakdown_popup(frame, app, colors),
        InputMode::Share => render_share_popup(frame, app, colors),
        InputMode::Normal => {}
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App, colors: &ThemeColors) {
    let accent = colors.hex(&app.quiz.accent);
    let left = format!("{} {}", app.quiz.emoji, app.quiz.title);
    let right = "DaFuqBro";
    let padding_len = (area.width as usize).saturating_sub(left.chars().count() + right.len() + 1);

    let title = Line::from(vec![
        Span::styled(left, Style::default().fg(accent).bold()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right, Style::default().fg(colors.muted)),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_progress(frame: &mut Frame, area: Rect, app: &App, colors: &ThemeColors) {
    let Some((step, total)) = app.session.progress() else {
        return;
    };
    let accent = colors.hex(&app.quiz.accent);
    let mut spans = vec![Span::styled(
        format!("{}/{} ", step, total),
        Style::default().fg(colors.muted),
    )];
    spans.extend(progress_bar(step, total, 20, accent, colors).spans);
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_intro(frame: &mut Frame, area: Rect, app: &App, colors: &ThemeColors) {
    let accent = colors.hex(&app.quiz.accent);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(app.quiz.emoji.clone(), Style::default())).centered(),
        Line::from(Span::styled(app.quiz.title.clone(), Style::default().fg(accent).bold())).centered(),
        Line::from(""),
        Line::from(Span::styled(app.quiz.intro.clone(), Style::default().fg(colors.text))).centered(),
        Line::from(""),
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("Enter", Style::default().fg(colors.status_key_color).bold()),
            Span::raw(" to start"),
        ])
        .centered(),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn render_question(frame: &mut Frame, area: Rect, app: &App, colors: &ThemeColors) {
    let Some(view) = app.step_view() else {
        return;
    };

    let mut lines = vec![Line::from(""), prompt_line(&view, colors), Line::from("")];

    if let Some(placeholder) = &view.placeholder {
        lines.extend(text_input_lines(app, placeholder, colors));
    } else {
        for (idx, option) in view.options.iter().enumerate() {
            let selected = idx == app.cursor;
            let marker = match option.severity {
                Some(_) if option.marked => "[x]",
                Some(_) => "[ ]",
                None if option.marked => " ● ",
                None => " ○ ",
            };
            let marker_color = if option.marked {
                if option.severity.is_some() { colors.checked_color } else { colors.hex(&app.quiz.accent) }
            } else {
                colors.muted
            };

            let mut spans = vec![
                Span::styled(format!("{:>2}. ", idx + 1), Style::default().fg(colors.muted)),
                Span::styled(marker, Style::default().fg(marker_color)),
                Span::raw(" "),
            ];
            let label = Span::styled(option.label.clone(), Style::default().fg(colors.text));
            spans.push(if selected { label.patch_style(colors.option_selected) } else { label });
            if let Some(severity) = option.severity {
                spans.push(Span::styled(
                    format!(" {}", "•".repeat(severity as usize)),
                    Style::default().fg(colors.severity_color),
                ));
            }
            lines.push(Line::from(spans));
        }
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn prompt_line(view: &StepView, colors: &ThemeColors) -> Line<'static> {
    let mut spans = Vec::new();
    if !view.emoji.is_empty() {
        spans.push(Span::raw(format!("{} ", view.emoji)));
    }
    spans.push(Span::styled(view.prompt.clone(), Style::default().fg(colors.text).bold()));
    Line::from(spans)
}

fn text_input_lines(app: &App, placeholder: &str, colors: &ThemeColors) -> Vec<Line<'static>> {
    let input = if app.text_input.is_empty() {
        Line::from(vec![
            Span::styled("> ", Style::default().fg(colors.status_key_color)),
            Span::styled(placeholder.to_string(), Style::default().fg(colors.muted).italic()),
        ])
    } else {
        Line::from(vec![
            Span::styled("> ", Style::default().fg(colors.status_key_color)),
            Span::styled(format!("{}|", app.text_input), Style::default().fg(colors.text)),
        ])
    };
    vec![
        input,
        Line::from(""),
        Line::from(Span::styled(
            "Enter: continue | Esc: start over",
            Style::default().fg(colors.muted),
        )),
    ]
}

fn render_calculating(frame: &mut Frame, area: Rect, app: &App, colors: &ThemeColors) {
    let popup_area = centered_rect_fixed(50, 3, area);

    let block = Block::bordered().border_style(Style::default().fg(colors.hex(&app.quiz.accent)));
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    // Braille spinner animation
    let spinner = SPINNER[app.spinner_frame % SPINNER.len()];
    let text = Paragraph::new(format!("{} {}", spinner, app.current_message()))
        .alignment(Alignment::Center)
        .style(Style::default().fg(colors.title_color));
    frame.render_widget(text, inner);
}

fn render_result(frame: &mut Frame, area: Rect, app: &App, colors: &ThemeColors) {
    let lines = match &app.outcome {
        Some(Outcome::Match(m)) => match_lines(m, colors),
        Some(Outcome::Tiered(t)) => tiered_lines(t, colors),
        Some(Outcome::Pitch(listing)) => listing_lines(listing, colors),
        None => vec![
            Line::from(""),
            Line::from(Span::styled("No result for this run.", Style::default().fg(colors.flash_error))).centered(),
        ],
    };
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn match_lines(m: &MatchOutcome, colors: &ThemeColors) -> Vec<Line<'static>> {
    let c = &m.candidate;
    let color = colors.hex(&c.color);
    let mut lines = vec![Line::from("")];

    if let Some(formula) = &c.formula {
        lines.push(Line::from(Span::styled(formula.clone(), Style::default().fg(colors.muted))).centered());
    }
    lines.push(Line::from(c.emoji.clone()).centered());
    lines.push(Line::from(Span::styled(c.name.clone(), Style::default().fg(color).bold())).centered());
    lines.push(Line::from(Span::styled(c.tagline.clone(), Style::default().fg(colors.muted).italic())).centered());
    lines.push(Line::from(""));

    let mut meter = vec![Span::styled(
        format!("{}: {}% ", m.meter_label, m.meter),
        Style::default().fg(colors.text),
    )];
    meter.extend(progress_bar(m.meter as usize, 100, 20, color, colors).spans);
    lines.push(Line::from(meter).centered());
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(c.description.clone(), Style::default().fg(colors.text))));

    for stat in &c.stats {
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", stat.label), Style::default().fg(colors.muted)),
            Span::styled(stat.value.clone(), Style::default().fg(colors.text).bold()),
        ]));
    }
    if let Some(roast) = &c.roast {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("🔥 {}", roast), Style::default().fg(colors.score_high))));
    }
    if let Some(fact) = &c.fact {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(fact.clone(), Style::default().fg(colors.muted).italic())));
    }
    lines
}

fn tiered_lines(t: &TieredOutcome, colors: &ThemeColors) -> Vec<Line<'static>> {
    let tier_color = colors.hex(&t.tier.color);
    let mut lines = vec![
        Line::from(""),
        Line::from(t.tier.emoji.clone()).centered(),
        Line::from(Span::styled(
            format!("{}/100", t.score),
            Style::default().fg(colors.score_color(f64::from(t.score), 100.0)).bold(),
        ))
        .centered(),
        Line::from(Span::styled(t.score_label.clone(), Style::default().fg(colors.muted))).centered(),
        Line::from(Span::styled(t.tier.label.clone(), Style::default().fg(tier_color).bold())).centered(),
    ];
    if let Some(grade) = &t.grade {
        lines.push(Line::from(Span::styled(format!("Grade: {}", grade), Style::default().fg(tier_color))).centered());
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(format!("\"{}\"", t.verdict), Style::default().fg(colors.text).italic())).centered());
    lines.push(Line::from(""));

    for (i, cat) in t.categories.iter().enumerate() {
        let mut spans = vec![Span::styled(
            format!("{} {:<14} {:>2}/{:<2} ", cat.emoji, cat.name, cat.checked, cat.total),
            Style::default().fg(colors.text),
        )];
        spans.extend(progress_bar(cat.checked, cat.total, 12, colors.hex(&cat.color), colors).spans);
        if i == t.worst && t.total_checked > 0 {
            spans.push(Span::styled("  worst", Style::default().fg(colors.score_high)));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("{} checked in total", t.total_checked),
        Style::default().fg(colors.muted),
    )));
    lines
}

fn listing_lines(l: &Listing, colors: &ThemeColors) -> Vec<Line<'static>> {
    let grade_color = colors.hex(&l.grade_color);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(l.ticker.clone(), Style::default().fg(grade_color).bold())).centered(),
        Line::from(Span::styled(l.coin_name.clone(), Style::default().fg(colors.text).bold())).centered(),
        Line::from(Span::styled(format!("\"{}\"", l.tagline), Style::default().fg(colors.muted).italic())).centered(),
        Line::from(""),
        stat_line("Chain", &l.chain, colors),
        stat_line("Mascot", &l.mascot, colors),
        stat_line("Market cap", &format_mcap(l.market_cap), colors),
        stat_line("Holders", &format_count(l.holders), colors),
        stat_line("Rug risk", &format!("{}%", l.rug_risk), colors),
        Line::from(""),
        Line::from(Span::styled("Roadmap", Style::default().fg(colors.text).bold())),
    ];
    for (i, step) in l.roadmap.iter().enumerate() {
        lines.push(Line::from(Span::styled(
            format!("  Q{}: {}", i + 1, step),
            Style::default().fg(colors.text),
        )));
    }
    lines.push(Line::from(""));
    lines.push(
        Line::from(vec![
            Span::styled(format!("Degen grade {} ", l.grade), Style::default().fg(grade_color).bold()),
            Span::styled(format!("({})", l.tier_label), Style::default().fg(colors.muted)),
        ])
        .centered(),
    );
    lines.push(Line::from(Span::styled(format!("\"{}\"", l.verdict), Style::default().fg(colors.text).italic())).centered());
    lines
}

fn stat_line(label: &str, value: &str, colors: &ThemeColors) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), Style::default().fg(colors.muted)),
        Span::styled(value.to_string(), Style::default().fg(colors.text).bold()),
    ])
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App, colors: &ThemeColors) {
    let text = if let Some((ref msg, _)) = app.flash_message {
        let msg_color = if msg.starts_with("Failed") || msg.starts_with("Could not") || msg.starts_with("Type") {
            colors.flash_error
        } else if msg.starts_with("Opened") {
            colors.flash_success
        } else {
            colors.text
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let hints = match app.session.phase() {
            Phase::Intro => vec![("Enter", "", "", ":start "), ("?", "", "", ":help "), ("q", "", "", ":quit")],
            Phase::Quiz(_) if app.is_typing() => vec![
                ("Enter", "", "", ":continue "),
                ("Esc", "", "", ":start over "),
                ("Ctrl-c", "", "", ":quit"),
            ],
            Phase::Quiz(_) => {
                let mut hints = vec![("j", "/", "k", ":nav ")];
                if app.step_view().is_some_and(|v| v.options.iter().any(|o| o.severity.is_some())) {
                    hints.push(("Space", "", "", ":toggle "));
                    hints.push(("Enter", "", "", ":next "));
                } else {
                    hints.push(("Enter", "", "", ":pick "));
                }
                if app.session.can_go_back() {
                    hints.push(("p", "", "", ":back "));
                }
                hints.push(("r", "", "", ":restart "));
                hints.push(("q", "", "", ":quit"));
                hints
            }
            Phase::Calculating => vec![("r", "", "", ":restart "), ("q", "", "", ":quit")],
            Phase::Result => vec![
                ("s", "", "", ":share "),
                ("b", "", "", ":breakdown "),
                ("r", "", "", ":retake "),
                ("q", "", "", ":quit"),
            ],
        };

        let mut spans = Vec::new();
        for (i, (key1, sep, key2, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key1, Style::default().fg(colors.status_key_color)));
            if !sep.is_empty() {
                spans.push(Span::raw(*sep));
                spans.push(Span::styled(*key2, Style::default().fg(colors.status_key_color)));
            }
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(colors.status_bar_bg)),
        area,
    );
}

/// Filled/empty block bar for `value` out of `max`.
fn progress_bar(value: usize, max: usize, width: usize, fill: Color, colors: &ThemeColors) -> Line<'static> {
    let ratio = if max > 0 {
        (value as f64 / max as f64).min(1.0)
    } else {
        0.0
    };
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let mut spans = Vec::new();
    if filled > 0 {
        spans.push(Span::styled("█".repeat(filled), Style::default().fg(fill)));
    }
    if empty > 0 {
        spans.push(Span::styled("░".repeat(empty), Style::default().fg(colors.bar_empty)));
    }

    Line::from(spans)
}

/// Horizontally centered column of at most `width` cells
fn centered_column(width: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    // Clamp dimensions to area bounds
    let width = width.min(area.width);
    let height = height.min(area.height);

    // Calculate centered position
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

fn popup_block(title: &str, colors: &ThemeColors) -> Block<'static> {
    Block::bordered()
        .title(format!(" {} ", title))
        .title_style(colors.popup_title)
        .border_style(Style::default().fg(colors.popup_border))
        .style(Style::default().bg(colors.popup_bg))
}

fn key_line(key: &'static str, action: &'static str, colors: &ThemeColors) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<14}", key), Style::default().fg(colors.status_key_color).bold()),
        Span::raw(action),
    ])
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame, app: &App, colors: &ThemeColors) {
    let popup_area = centered_rect_fixed(50, 16, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = popup_block("Keyboard Shortcuts", colors);
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let mut help_lines = vec![
        key_line("j / Down", "Move down", colors),
        key_line("k / Up", "Move up", colors),
        key_line("Enter", "Pick answer / next page", colors),
        key_line("1-9", "Pick by number", colors),
        key_line("Space / x", "Toggle checklist item", colors),
    ];
    if app.session.steps().len() > 1 {
        help_lines.push(key_line("p / Left", "Previous page (checklists)", colors));
    }
    help_lines.extend([
        key_line("r", "Restart quiz", colors),
        key_line("s", "Share result", colors),
        key_line("b", "Result breakdown", colors),
        key_line("?", "Show/hide this help", colors),
        key_line("q / Ctrl-c", "Quit", colors),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", Style::default().fg(colors.muted))),
    ]);

    frame.render_widget(Paragraph::new(help_lines), inner);
}

/// Trait totals for a match, per-category counts for tiers, points for a pitch.
fn render_breakdown_popup(frame: &mut Frame, app: &App, colors: &ThemeColors) {
    let Some(outcome) = &app.outcome else {
        return;
    };

    let mut lines = Vec::new();
    match outcome {
        Outcome::Match(m) => {
            let max = m.traits.values().copied().max().unwrap_or(0).max(1);
            for (name, total) in &m.traits {
                let dominant = m.candidate.dominant_traits.contains(name);
                let mut spans = vec![Span::styled(
                    format!("{:<14}{:>3} ", name, total),
                    Style::default().fg(if dominant { colors.text } else { colors.muted }),
                )];
                spans.extend(progress_bar(*total as usize, max as usize, 16, colors.hex(&m.candidate.color), colors).spans);
                lines.push(Line::from(spans));
            }
        }
        Outcome::Tiered(t) => {
            lines.push(Line::from(format!("Severity {} of {}", t.severity, t.max_severity)));
            lines.push(Line::from(format!("Tier range {}", t.tier.range)));
            lines.push(Line::from(""));
            for cat in &t.categories {
                lines.push(Line::from(format!("{} {}: {}/{}", cat.emoji, cat.name, cat.checked, cat.total)));
            }
        }
        Outcome::Pitch(l) => {
            lines.push(Line::from(format!("Degen points {} of {}", l.points, l.max_points)));
            lines.push(Line::from(format!("Score {}/100", l.score)));
            lines.push(Line::from(format!("Theme \"{}\"", l.theme)));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Esc: close", Style::default().fg(colors.muted))));

    let height = (lines.len() as u16).saturating_add(2);
    let popup_area = centered_rect_fixed(48, height, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = popup_block("Breakdown", colors);
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_share_popup(frame: &mut Frame, app: &App, colors: &ThemeColors) {
    let links = app.share_links();
    let popup_area = centered_rect_fixed(36, links.len() as u16 + 4, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = popup_block("Share", colors);
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let mut lines: Vec<Line> = links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            Line::from(vec![
                Span::styled(format!("{}  ", i + 1), Style::default().fg(colors.status_key_color).bold()),
                Span::raw(link.network.name()),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Enter: X | Number: open | Esc: close", Style::default().fg(colors.muted))));

    frame.render_widget(Paragraph::new(lines), inner);
}
