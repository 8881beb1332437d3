//! Rendering. Reads [`App`] and never changes it.

#![forbid(unsafe_code)]

use cf_dns_edit_lib::{
    Connect, NoticeLevel, RecordDraft, RecordField, RecordType, Screen, TOKEN_URL,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::app::{App, DetailItem, Mode, ScreenKind, DETAIL_MENU};

pub const MIN_WIDTH: u16 = 71;
pub const MIN_HEIGHT: u16 = 30;

const NAME_WIDTH: usize = 32;
const CONTENT_WIDTH: usize = 40;

pub fn render<C: Connect>(app: &App<C>, frame: &mut Frame) {
    let area = frame.area();
    if is_too_small(area.width, area.height) {
        render_too_small(frame, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(app, frame, chunks[0]);
    match app.nav.screen() {
        Some(Screen::Login) => render_login(app, frame, chunks[1]),
        Some(Screen::DomainList) => render_domains(app, frame, chunks[1]),
        Some(Screen::RecordList { domain }) => {
            render_records(app, &domain.name, frame, chunks[1]);
        }
        Some(Screen::RecordDetail { record, draft }) => {
            render_detail(app, &RecordDraft::from(record), draft, frame, chunks[1]);
        }
        Some(Screen::AddRecord { domain, form }) => {
            render_add_form(&domain.name, form.draft(), form.current_field(), frame, chunks[1]);
        }
        Some(Screen::About) => render_about(frame, chunks[1]),
        None => {}
    }
    render_notice(app, frame, chunks[2]);
    if app.accepts_text() {
        render_input(app, frame, chunks[3]);
    }
    frame.render_widget(
        Paragraph::new(help_text(app.screen_kind(), app.mode))
            .style(Style::default().fg(Color::DarkGray)),
        chunks[4],
    );
}

pub const fn is_too_small(width: u16, height: u16) -> bool {
    width < MIN_WIDTH || height < MIN_HEIGHT
}

/// Colour used for a record type in the record list.
pub fn type_color(record_type: &RecordType) -> Color {
    match record_type {
        RecordType::A | RecordType::AAAA => Color::Green,
        RecordType::CNAME => Color::Blue,
        RecordType::MX => Color::Magenta,
        RecordType::TXT => Color::Yellow,
        RecordType::NS => Color::Cyan,
        RecordType::SRV => Color::Red,
        _ => Color::Gray,
    }
}

/// Shortens `text` to at most `max` characters, ending in `...` when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Key hints for the footer.
pub const fn help_text(screen: ScreenKind, mode: Mode) -> &'static str {
    match (mode, screen) {
        (Mode::Editing(_) | Mode::ConfirmDelete, _) => "Enter confirm  Esc cancel",
        (_, ScreenKind::Login) => "Enter log in  Esc quit",
        (_, ScreenKind::DomainList) => {
            "Up/Down move  Enter open  r refresh  l logout  ? about  q quit"
        }
        (_, ScreenKind::RecordList) => {
            "Up/Down move  Enter edit  a add  r refresh  l logout  Esc back  q quit"
        }
        (_, ScreenKind::RecordDetail) => {
            "Up/Down move  Enter choose  s save  d delete  Esc back  q quit"
        }
        (_, ScreenKind::AddRecord) => "Enter next  Esc cancel",
        (_, ScreenKind::About) => "Any key back  q quit",
        (_, ScreenKind::Closed) => "",
    }
}

fn render_too_small(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::styled(
            "Terminal too small",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Line::from(format!(
            "Current size {}x{}, need at least {MIN_WIDTH}x{MIN_HEIGHT}.",
            area.width, area.height
        )),
    ];
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), area);
}

fn render_header<C: Connect>(app: &App<C>, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::styled(
        "cf-dns-edit",
        Style::default()
            .fg(Color::Rgb(244, 129, 32))
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(domain) = app.nav.current_domain() {
        spans.push(Span::raw("  /  "));
        spans.push(Span::raw(domain.name.clone()));
    }
    if let Some(Screen::RecordDetail { record, .. }) = app.nav.screen() {
        spans.push(Span::raw("  /  "));
        spans.push(Span::raw(format!("{} {}", record.record_type, record.name)));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn render_login<C: Connect>(app: &App<C>, frame: &mut Frame, area: Rect) {
    let muted = Style::default().fg(Color::Gray);
    let text = vec![
        Line::styled(
            "Welcome to cf-dns-edit",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
        Line::from("Enter a Cloudflare API token below. It needs these permissions:"),
        Line::styled("  Zone.Zone:Read", muted),
        Line::styled("  Zone.DNS:Read", muted),
        Line::styled("  Zone.DNS:Write", muted),
        Line::from(""),
        Line::from(vec![
            Span::raw("Create one at "),
            Span::styled(TOKEN_URL, Style::default().fg(Color::Cyan)),
        ]),
        Line::styled(
            format!(
                "A verified token is saved to {}",
                app.nav.store().path().display()
            ),
            muted,
        ),
    ];

    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Log in ")),
        area,
    );
}

fn selected_style() -> Style {
    Style::default()
        .fg(Color::White)
        .bg(Color::Rgb(38, 79, 120))
        .add_modifier(Modifier::BOLD)
}

fn render_domains<C: Connect>(app: &App<C>, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = app
        .nav
        .domains()
        .iter()
        .map(|domain| ListItem::new(format!("  {}", domain.name)))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Domains ({}) ", app.nav.domains().len())),
        )
        .highlight_style(selected_style());

    let mut state = app.list.clone();
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_records<C: Connect>(app: &App<C>, domain: &str, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = app
        .nav
        .records()
        .iter()
        .map(|record| {
            ListItem::new(Line::from(vec![
                Span::raw("  "),
                Span::styled(
                    format!("{:<6}", record.record_type.as_str()),
                    Style::default().fg(type_color(&record.record_type)),
                ),
                Span::raw(" "),
                Span::raw(format!(
                    "{:<NAME_WIDTH$}",
                    truncate(&record.name, NAME_WIDTH)
                )),
                Span::raw(" "),
                Span::styled(
                    format!(
                        "{:<CONTENT_WIDTH$}",
                        truncate(&record.content, CONTENT_WIDTH)
                    ),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw(" "),
                Span::raw(record.ttl.to_string()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " DNS records for {domain} ({}) ",
            app.nav.records().len()
        )))
        .highlight_style(selected_style());

    let mut state = app.list.clone();
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_detail<C: Connect>(
    app: &App<C>,
    original: &RecordDraft,
    draft: &RecordDraft,
    frame: &mut Frame,
    area: Rect,
) {
    let items: Vec<ListItem> = DETAIL_MENU
        .iter()
        .map(|item| match item {
            DetailItem::Field(field) => {
                let value = draft.display_value(*field);
                let changed = value != original.display_value(*field);
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("  {:<9}", field.label()),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::raw(value),
                    Span::styled(
                        if changed { "  (modified)" } else { "" },
                        Style::default().fg(Color::Yellow),
                    ),
                ]))
            }
            DetailItem::Save => ListItem::new("  Save").style(Style::default().fg(Color::Green)),
            DetailItem::Delete => ListItem::new("  Delete").style(Style::default().fg(Color::Red)),
            DetailItem::Back => ListItem::new("  Back"),
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Edit DNS record "),
        )
        .highlight_style(selected_style());

    let mut state = app.list.clone();
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_add_form(
    domain: &str,
    draft: &RecordDraft,
    current: Option<RecordField>,
    frame: &mut Frame,
    area: Rect,
) {
    let mut answered = true;
    let lines: Vec<Line> = RecordField::ALL
        .iter()
        .map(|field| {
            if Some(*field) == current {
                answered = false;
                return Line::from(vec![
                    Span::styled("> ", Style::default().fg(Color::Cyan)),
                    Span::styled(
                        field.prompt(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]);
            }
            if answered {
                Line::from(vec![
                    Span::styled(
                        format!("  {:<9}", field.label()),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::raw(draft.display_value(*field)),
                ])
            } else {
                Line::styled(
                    format!("  {}", field.label()),
                    Style::default().fg(Color::DarkGray),
                )
            }
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Add DNS record to {domain} ")),
        ),
        area,
    );
}

fn render_about(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(60, 50, area);
    let text = vec![
        Line::styled(
            "cf-dns-edit",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::from(format!("Version {}", env!("CARGO_PKG_VERSION"))),
        Line::from(""),
        Line::from("Browse and edit the DNS records of your Cloudflare domains"),
        Line::from("from the terminal."),
        Line::from(""),
        Line::styled("Press any key to go back.", Style::default().fg(Color::Gray)),
    ];

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" About ")),
        popup,
    );
}

fn render_notice<C: Connect>(app: &App<C>, frame: &mut Frame, area: Rect) {
    let line = if app.working {
        Line::styled("Working...", Style::default().fg(Color::Yellow))
    } else if let Some(notice) = app.nav.notice() {
        let color = match notice.level {
            NoticeLevel::Info => Color::White,
            NoticeLevel::Success => Color::Green,
            NoticeLevel::Warning => Color::Yellow,
            NoticeLevel::Error => Color::Red,
        };
        Line::styled(notice.text.clone(), Style::default().fg(color))
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input<C: Connect>(app: &App<C>, frame: &mut Frame, area: Rect) {
    let title = match (app.mode, app.nav.screen()) {
        (Mode::Editing(field), _) => field.prompt(),
        (Mode::ConfirmDelete, _) => "Delete this record? (y/N)",
        (_, Some(Screen::AddRecord { form, .. })) => form
            .current_field()
            .map_or("", RecordField::prompt),
        _ => "API token",
    };
    let shown = if app.screen_kind() == ScreenKind::Login {
        app.input.masked()
    } else {
        app.input.as_str().to_string()
    };

    let cursor_x = area
        .x
        .saturating_add(1)
        .saturating_add(u16::try_from(shown.chars().count()).unwrap_or(u16::MAX));
    frame.render_widget(
        Paragraph::new(shown).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {title} ")),
        ),
        area,
    );
    frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(2)), area.y + 1));
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
