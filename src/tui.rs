use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use crate::catalog::CatalogStore;
use crate::models::{Deadline, DetailView, PostingRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
}

struct AppState {
    store: CatalogStore,
    mode: Mode,
    input: String,
    show_detail: bool,
    scroll_offset: u16,
    notice: Option<&'static str>,
}

impl AppState {
    fn new(store: CatalogStore) -> Self {
        let input = store.query().to_string();
        Self {
            store,
            mode: Mode::Browse,
            input,
            show_detail: false,
            scroll_offset: 0,
            notice: None,
        }
    }

    fn next(&mut self) {
        self.notice = self.store.next().notice();
        self.scroll_offset = 0;
    }

    fn prev(&mut self) {
        self.notice = self.store.previous().notice();
        self.scroll_offset = 0;
    }

    fn push_char(&mut self, c: char) {
        self.input.push(c);
        self.requery();
    }

    fn pop_char(&mut self) {
        if self.input.pop().is_some() {
            self.requery();
        }
    }

    fn requery(&mut self) {
        self.store.set_query(&self.input);
        self.scroll_offset = 0;
        self.notice = None;
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }

    /// Returns false when the browser should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match self.mode {
            Mode::Search => match code {
                KeyCode::Esc | KeyCode::Enter => self.mode = Mode::Browse,
                KeyCode::Backspace => self.pop_char(),
                KeyCode::Char(c) => self.push_char(c),
                _ => {}
            },
            Mode::Browse => match code {
                KeyCode::Char('q') | KeyCode::Esc => return false,
                KeyCode::Down | KeyCode::Char('j') => self.next(),
                KeyCode::Up | KeyCode::Char('k') => self.prev(),
                KeyCode::Char('J') | KeyCode::PageDown => self.scroll_down(),
                KeyCode::Char('K') | KeyCode::PageUp => self.scroll_up(),
                KeyCode::Enter => {
                    self.show_detail = !self.show_detail;
                    self.scroll_offset = 0;
                }
                KeyCode::Char('/') => {
                    self.mode = Mode::Search;
                    self.notice = None;
                }
                _ => {}
            },
        }
        true
    }
}

pub fn run_browse(store: CatalogStore) -> Result<()> {
    if store.postings().is_empty() {
        println!("No postings available.");
        return Ok(());
    }

    let mut state = AppState::new(store);

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw terminal mode")?;
    stdout()
        .execute(EnterAlternateScreen)
        .context("Failed to enter alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))
        .context("Failed to initialize terminal")?;

    let result = run_loop(&mut terminal, &mut state);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
) -> Result<()> {
    let mut list_state = ListState::default();

    loop {
        list_state.select(state.store.cursor().position());
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !state.handle_key(key.code) {
                break;
            }
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    // Search bar
    let search_style = match state.mode {
        Mode::Search => Style::default().fg(Color::Yellow),
        Mode::Browse => Style::default(),
    };
    let search = Paragraph::new(state.input.as_str())
        .style(search_style)
        .block(Block::default().borders(Borders::ALL).title(" Search (/) "));
    frame.render_widget(search, rows[0]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(65),
        ])
        .split(rows[1]);

    // Left panel: filtered postings
    let items: Vec<ListItem> = state
        .store
        .results()
        .iter()
        .map(|posting| {
            let company = posting.company.as_deref().unwrap_or("-");
            ListItem::new(format!("{} | {}", truncate(&posting.title, 30), company))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Postings ({}/{}) ",
            state.store.results().len(),
            state.store.postings().len()
        )))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], list_state);

    // Right panel: card or detail
    let (title, body) = match (state.show_detail, state.store.current()) {
        (_, None) => (" Card ", Text::raw("No results.")),
        (false, Some(posting)) => (" Card ", build_card(posting)),
        (true, Some(_)) => match state.store.current_detail() {
            Some(detail) => (" Detail ", build_detail(&detail)),
            None => (" Detail ", Text::raw("Posting not found.")),
        },
    };
    let panel = Paragraph::new(body)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));
    frame.render_widget(panel, chunks[1]);

    // Footer: notice or help
    let footer = match state.notice {
        Some(notice) => Paragraph::new(format!(" {}", notice)).style(Style::default().fg(Color::Yellow)),
        None => Paragraph::new(
            " j/k:navigate  J/K:scroll  enter:detail  /:search  q:quit",
        )
        .style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(footer, rows[2]);
}

fn build_card(posting: &PostingRecord) -> Text<'static> {
    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        posting.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(posting.location.clone().unwrap_or_else(|| "No location".to_string())));
    if let Some(company) = &posting.company {
        lines.push(Line::from(format!("at {}", company)));
    }
    if let Some(summary) = &posting.summary {
        lines.push(Line::from(""));
        for line in textwrap::fill(summary, 70).lines() {
            lines.push(Line::from(line.to_string()));
        }
    }
    if let Some(link) = &posting.link {
        lines.push(Line::from(""));
        lines.push(Line::from(format!("URL: {}", link)));
    }
    Text::from(lines)
}

fn section(lines: &mut Vec<Line<'static>>, heading: &str, rows: &[(&str, &str)]) {
    lines.push(Line::from(Span::styled(
        heading.to_string(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));
    for (label, value) in rows {
        lines.push(Line::from(format!("  {:<10} {}", label, value)));
    }
    lines.push(Line::from(""));
}

fn build_detail(detail: &DetailView) -> Text<'static> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    if !detail.company.is_empty() {
        lines.push(Line::from(detail.company.clone()));
    }
    lines.push(Line::from(Span::styled(
        detail.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));

    let deadline = match detail.deadline_kind() {
        Deadline::UntilFilled => "Open until filled".to_string(),
        kind @ Deadline::On(_) => {
            let today = chrono::Local::now().date_naive();
            match kind.days_left(today) {
                Some(days) if days >= 0 => format!("D-{}", days),
                _ => "Closed".to_string(),
            }
        }
        Deadline::Unspecified => "Check deadline".to_string(),
    };
    let education = if detail.education_irrelevant() { "Any education" } else { "Education required" };
    let experience = if detail.experience_irrelevant() { "Any experience" } else { "Experience required" };
    let badges = [deadline.as_str(), education, experience];
    lines.push(Line::from(Span::styled(
        format!("[{}]", badges.join("] [")),
        Style::default().fg(Color::Green),
    )));
    if !detail.registered_at.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("Registered: {}", detail.registered_at),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));

    section(&mut lines, "Recruitment", &[
        ("Job type", detail.job_type.as_str()),
        ("Hours", detail.work_hours.as_str()),
        ("Experience", detail.experience.as_str()),
        ("Education", detail.education.as_str()),
        ("Employment", detail.employment_type.as_str()),
    ]);
    section(&mut lines, "Conditions", &[
        ("Wage", detail.wage.as_str()),
        ("Location", detail.work_location.as_str()),
        ("Work form", detail.work_form.as_str()),
        ("Insurance", detail.insurance.as_str()),
        ("Severance", detail.severance.as_str()),
    ]);

    if !detail.job_description.is_empty() {
        lines.push(Line::from(Span::styled(
            "Duties",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        for line in &detail.job_description {
            lines.push(Line::from(format!("  - {}", line.trim_start_matches('-').trim())));
        }
        lines.push(Line::from(""));
    }

    if detail.license_required() || !detail.qualification.major.is_empty() {
        section(&mut lines, "Qualifications", &[
            ("Major", detail.qualification.major.as_str()),
            ("License", detail.qualification.license.as_str()),
        ]);
    }

    section(&mut lines, "How to apply", &[
        ("Screening", detail.screening.as_str()),
        ("Method", detail.application_method.as_str()),
        ("Documents", detail.documents.as_str()),
        ("URL", detail.application_url.as_str()),
        ("Deadline", detail.deadline.as_str()),
    ]);
    section(&mut lines, "Contact", &[
        ("Manager", detail.contact.manager.as_str()),
        ("Phone", detail.contact.phone.as_str()),
        ("Mobile", detail.contact.mobile.as_str()),
        ("Fax", detail.contact.fax.as_str()),
        ("Email", detail.contact.email.as_str()),
    ]);

    Text::from(lines)
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
