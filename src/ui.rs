use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use multi_calc::calculators::CalculatorKind;
use multi_calc::history::HistoryEntry;
use multi_calc::report::flatten;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use serde_json::Value;
use std::io;

const CATEGORIES: [&str; 4] = ["health", "finance", "academic", "utility"];
const FAST_STEP: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    History,
    Summary,
    Views,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterType {
    None,
    Category(&'static str),
    Calculator(String),
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::History => Page::Summary,
            Page::Summary => Page::Views,
            Page::Views => Page::History,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::History => Page::Views,
            Page::Summary => Page::History,
            Page::Views => Page::Summary,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::History => "History",
            Page::Summary => "Summary",
            Page::Views => "Views",
        }
    }
}

/// Category of a stored calculator type; unknown types count as utility
fn category_of(calculator_type: &str) -> &'static str {
    CalculatorKind::parse(calculator_type)
        .map(|k| k.category())
        .unwrap_or("utility")
}

fn category_color(category: &str) -> Color {
    match category {
        "health" => Color::Green,
        "finance" => Color::Yellow,
        "academic" => Color::Magenta,
        _ => Color::Cyan,
    }
}

/// Headline value shown in the table
fn headline(results: &Value) -> String {
    const KEYS: [&str; 10] = [
        "bmi", "emi", "gpa", "percentage", "result", "calories", "bmr", "total_amount",
        "converted_value", "due_date",
    ];
    KEYS.iter()
        .find_map(|k| results.get(*k).map(|v| (*k, v)))
        .map(|(k, v)| match v {
            Value::String(s) => format!("{}: {}", k, s),
            other => format!("{}: {}", k, other),
        })
        .unwrap_or_else(|| "-".to_string())
}

pub struct App {
    pub entries: Vec<HistoryEntry>,
    pub filtered: Vec<HistoryEntry>,
    pub state: TableState,
    pub total_count: i64,
    pub current_page: Page,
    pub summary_state: TableState,
    pub show_detail: bool,
    pub active_filter: FilterType,
}

impl App {
    pub fn new(entries: Vec<HistoryEntry>, total_count: i64) -> Self {
        let mut state = TableState::default();
        if !entries.is_empty() {
            state.select(Some(0));
        }
        let mut summary_state = TableState::default();
        summary_state.select(Some(0));

        Self {
            filtered: entries.clone(),
            entries,
            state,
            total_count,
            current_page: Page::History,
            summary_state,
            show_detail: false,
            active_filter: FilterType::None,
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn selected_entry(&self) -> Option<&HistoryEntry> {
        self.state.selected().and_then(|i| self.filtered.get(i))
    }

    pub fn apply_filter(&mut self, filter: FilterType) {
        self.filtered = match &filter {
            FilterType::None => self.entries.clone(),
            FilterType::Category(category) => self
                .entries
                .iter()
                .filter(|e| category_of(&e.calculator_type) == *category)
                .cloned()
                .collect(),
            FilterType::Calculator(name) => self
                .entries
                .iter()
                .filter(|e| &e.calculator_type == name)
                .cloned()
                .collect(),
        };
        self.active_filter = filter;

        if self.filtered.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn clear_filter(&mut self) {
        self.apply_filter(FilterType::None);
    }

    /// Filter the history page to the calculator highlighted on the summary page
    pub fn drill_into_summary(&mut self) {
        let rows = self.summary();
        if let Some((name, _, _)) = self.summary_state.selected().and_then(|i| rows.get(i)) {
            self.apply_filter(FilterType::Calculator(name.clone()));
            self.current_page = Page::History;
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    /// (calculator, uses, last used date), most used first
    pub fn summary(&self) -> Vec<(String, usize, String)> {
        let mut rows: Vec<(String, usize, String)> = Vec::new();
        for entry in &self.entries {
            if rows.iter().any(|(name, _, _)| *name == entry.calculator_type) {
                continue;
            }
            let count = self
                .entries
                .iter()
                .filter(|e| e.calculator_type == entry.calculator_type)
                .count();
            // entries are newest first, so the first hit is the latest use
            rows.push((entry.calculator_type.clone(), count, entry.date.clone()));
        }
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        rows
    }

    pub fn category_counts(&self) -> [(&'static str, usize); 4] {
        CATEGORIES.map(|c| {
            (
                c,
                self.entries
                    .iter()
                    .filter(|e| category_of(&e.calculator_type) == c)
                    .count(),
            )
        })
    }

    fn move_selection(&mut self, delta: isize, wrap: bool) {
        let len = self.filtered.len();
        if len == 0 {
            return;
        }
        let current = self.state.selected().unwrap_or(0) as isize;
        let target = current + delta;
        let i = if wrap {
            target.rem_euclid(len as isize) as usize
        } else {
            target.clamp(0, len as isize - 1) as usize
        };
        self.state.select(Some(i));
    }

    pub fn next(&mut self) {
        if self.current_page == Page::Summary {
            let len = self.summary().len().max(1);
            let i = self.summary_state.selected().map_or(0, |i| (i + 1) % len);
            self.summary_state.select(Some(i));
        } else {
            self.move_selection(1, true);
        }
    }

    pub fn previous(&mut self) {
        if self.current_page == Page::Summary {
            let len = self.summary().len().max(1);
            let i = self.summary_state.selected().map_or(0, |i| (i + len - 1) % len);
            self.summary_state.select(Some(i));
        } else {
            self.move_selection(-1, true);
        }
    }

    pub fn page_down(&mut self) {
        self.move_selection(FAST_STEP as isize, false);
    }

    pub fn page_up(&mut self) {
        self.move_selection(-(FAST_STEP as isize), false);
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter if app.current_page == Page::Summary => app.drill_into_summary(),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Char('c') => {
                    app.clear_filter();
                    app.current_page = Page::History;
                }
                KeyCode::Char(d @ '1'..='4') if app.current_page == Page::Views => {
                    let index = d as usize - '1' as usize;
                    app.apply_filter(FilterType::Category(CATEGORIES[index]));
                    app.current_page = Page::History;
                }
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => app.state.select(Some(0)),
                KeyCode::End => {
                    if !app.filtered.is_empty() {
                        app.state.select(Some(app.filtered.len() - 1));
                    }
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail && app.current_page == Page::History {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);

        render_history(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        match app.current_page {
            Page::History => render_history(f, chunks[1], app),
            Page::Summary => render_summary(f, chunks[1], app),
            Page::Views => render_views(f, chunks[1], app),
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in [Page::History, Page::Summary, Page::Views].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Saved: {}", app.total_count),
        Style::default().fg(Color::White),
    ));
    for (category, count) in app.category_counts() {
        tab_spans.push(Span::raw("  "));
        tab_spans.push(Span::styled(
            format!("{} {}", category, count),
            Style::default().fg(category_color(category)),
        ));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));
    f.render_widget(header, area);
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn render_history(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = app.filtered.iter().map(|entry| {
        let category = category_of(&entry.calculator_type);
        let color = category_color(category);
        Row::new(vec![
            Cell::from(entry.date.clone()),
            Cell::from(entry.time.clone()),
            Cell::from(entry.calculator_type.clone()).style(Style::default().fg(color)),
            Cell::from(category),
            Cell::from(truncate(&headline(&entry.results), 32)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(20),
            Constraint::Length(10),
            Constraint::Length(34),
        ],
    )
    .header(header_row(&["Date", "Time", "Calculator", "Category", "Result"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Calculations "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_summary(f: &mut Frame, area: Rect, app: &mut App) {
    let summary = app.summary();
    let total = app.entries.len().max(1) as f64;

    let rows = summary.iter().map(|(name, count, last)| {
        Row::new(vec![
            Cell::from(name.clone()).style(Style::default().fg(category_color(category_of(name)))),
            Cell::from(count.to_string()),
            Cell::from(format!("{:.1}%", *count as f64 / total * 100.0)),
            Cell::from(last.clone()),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(22),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(12),
        ],
    )
    .header(header_row(&["Calculator", "Uses", "Share", "Last Used"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Usage by Calculator (Enter to filter) "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.summary_state);
}

fn render_views(f: &mut Frame, area: Rect, app: &App) {
    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Quick Views by Category",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (i, (category, count)) in app.category_counts().iter().enumerate() {
        let marker = if app.active_filter == FilterType::Category(*category) {
            Span::styled("→", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        } else {
            Span::raw(" ")
        };
        content.push(Line::from(vec![
            Span::raw("  "),
            marker,
            Span::styled(format!("{}", i + 1), Style::default().fg(Color::Yellow)),
            Span::raw(format!(". {:<12}", category)),
            Span::styled(format!("{:>5} saved", count), Style::default().fg(category_color(category))),
        ]));
    }

    content.push(Line::from(""));
    content.push(Line::from(vec![
        Span::styled("  Press ", Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)),
        Span::styled("c", Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC)),
        Span::styled(" to clear", Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)),
    ]));

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Views - Quick Access Filters "),
    );
    f.render_widget(paragraph, area);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Calculation Details ");

    let entry = match app.selected_entry() {
        Some(e) => e,
        None => {
            f.render_widget(Paragraph::new("No calculation selected").block(block), area);
            return;
        }
    };

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let section = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

    let mut content = vec![
        Line::from(vec![Span::styled("  Calculator: ", label), Span::raw(entry.calculator_type.clone())]),
        Line::from(vec![
            Span::styled("  Saved: ", label),
            Span::raw(format!("{} {}", entry.date, entry.time)),
        ]),
        Line::from(vec![Span::styled("  Id: ", label), Span::raw(entry.id.clone())]),
        Line::from(""),
        Line::from(Span::styled("  INPUTS", section)),
    ];
    content.extend(flatten(&entry.inputs).into_iter().map(|l| Line::from(format!("  {}", l))));
    content.push(Line::from(""));
    content.push(Line::from(Span::styled("  RESULTS", section)));
    content.extend(flatten(&entry.results).into_iter().map(|l| Line::from(format!("  {}", l))));

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, app.filtered.len()),
        Style::default().fg(Color::Cyan),
    )];

    let filter_name = match &app.active_filter {
        FilterType::None => None,
        FilterType::Category(c) => Some(c.to_string()),
        FilterType::Calculator(name) => Some(name.clone()),
    };
    if let Some(name) = filter_name {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(format!("Filter: {}", name), Style::default().fg(Color::Green)));
        status_spans.push(Span::raw(" ("));
        status_spans.push(Span::styled("c", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" clear)"));
    }

    for (key, action, color) in [
        ("Enter", " Details | ", Color::Yellow),
        ("Tab", " Page | ", Color::Yellow),
        ("↑/↓", " Nav | ", Color::Yellow),
        ("PgUp/PgDn", " Fast | ", Color::Yellow),
        ("q", " Quit", Color::Red),
    ] {
        if key == "Enter" {
            status_spans.push(Span::raw(" | "));
        }
        status_spans.push(Span::styled(key, Style::default().fg(color)));
        status_spans.push(Span::raw(action));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::White)));
    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn entry(day: u32, kind: &str, results: Value) -> HistoryEntry {
        let when = NaiveDate::from_ymd_opt(2024, 5, day).unwrap().and_hms_opt(8, 0, 0).unwrap();
        HistoryEntry::at(when, "local", kind, json!({}), results)
    }

    fn app() -> App {
        // newest first
        let entries = vec![
            entry(4, "bmi", json!({"bmi": 22.0})),
            entry(3, "loan", json!({"emi": 100.0})),
            entry(2, "bmi", json!({"bmi": 23.0})),
            entry(1, "gpa", json!({"gpa": 3.1})),
        ];
        App::new(entries, 4)
    }

    #[test]
    fn test_filters() {
        let mut app = app();
        app.apply_filter(FilterType::Category("health"));
        assert_eq!(app.filtered.len(), 2);
        app.apply_filter(FilterType::Calculator("gpa".to_string()));
        assert_eq!(app.filtered.len(), 1);
        app.apply_filter(FilterType::Category("utility"));
        assert!(app.filtered.is_empty());
        assert_eq!(app.state.selected(), None);
        app.clear_filter();
        assert_eq!(app.filtered.len(), 4);
    }

    #[test]
    fn test_navigation_wraps_and_clamps() {
        let mut app = app();
        app.previous();
        assert_eq!(app.state.selected(), Some(3));
        app.next();
        assert_eq!(app.state.selected(), Some(0));
        app.page_down();
        assert_eq!(app.state.selected(), Some(3));
        app.page_up();
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_summary_and_drill_down() {
        let mut app = app();
        let summary = app.summary();
        assert_eq!(summary[0], ("bmi".to_string(), 2, "2024-05-04".to_string()));
        assert_eq!(summary.len(), 3);

        app.current_page = Page::Summary;
        app.drill_into_summary();
        assert_eq!(app.current_page, Page::History);
        assert_eq!(app.active_filter, FilterType::Calculator("bmi".to_string()));
    }

    #[test]
    fn test_headline_and_truncate() {
        assert_eq!(headline(&json!({"emi": 100.5})), "emi: 100.5");
        assert_eq!(headline(&json!({"other": 1})), "-");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
        assert_eq!(category_of("compound_interest"), "finance");
    }
}
