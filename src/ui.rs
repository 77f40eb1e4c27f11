use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use entity_ledger::{Record, Registry};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    Insertion,
    Age,
    Value,
    Name,
}

impl SortMode {
    pub fn next(&self) -> Self {
        match self {
            SortMode::Insertion => SortMode::Age,
            SortMode::Age => SortMode::Value,
            SortMode::Value => SortMode::Name,
            SortMode::Name => SortMode::Age,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            SortMode::Insertion => "as loaded",
            SortMode::Age => "age",
            SortMode::Value => "value",
            SortMode::Name => "name",
        }
    }
}

pub struct App {
    pub registry: Registry,
    pub state: TableState,
    pub sort_mode: SortMode,
    pub show_detail: bool,
    /// Lines skipped while loading, shown in the header
    pub skipped: usize,
}

impl App {
    pub fn new(registry: Registry, skipped: usize) -> Self {
        let mut state = TableState::default();
        if !registry.is_empty() {
            state.select(Some(0));
        }

        Self {
            registry,
            state,
            sort_mode: SortMode::Insertion,
            show_detail: false,
            skipped,
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    /// Advance to the next sort order and re-sort in place
    pub fn cycle_sort(&mut self) {
        self.sort_mode = self.sort_mode.next();
        match self.sort_mode {
            SortMode::Age => self.registry.sort_by_age(),
            SortMode::Value => self.registry.sort_by_value(),
            SortMode::Name => self.registry.sort_by_name(),
            SortMode::Insertion => {}
        }
    }

    pub fn selected_record(&self) -> Option<&dyn Record> {
        self.state
            .selected()
            .and_then(|i| self.registry.iter().nth(i))
    }

    pub fn next(&mut self) {
        let len = self.registry.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.registry.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.state.select(Some(i));
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

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Char('s') => app.cycle_sort(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Home => app.state.select(Some(0)),
                KeyCode::End => {
                    if !app.registry.is_empty() {
                        app.state.select(Some(app.registry.len() - 1));
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
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Records
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        render_table(f, chunks[1], app);
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled(
            "Entity Ledger",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Records: {}", app.registry.len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Total value: {:.2}", app.registry.total_value()),
            Style::default().fg(Color::Green),
        ),
    ];

    if app.skipped > 0 {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            format!("⚠ {} lines skipped", app.skipped),
            Style::default().fg(Color::Red),
        ));
    }

    let header = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["ID", "Kind", "Name", "Age", "Value"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows: Vec<Row> = app
        .registry
        .iter()
        .map(|record| {
            let color = if record.as_loanable().is_some() {
                Color::Cyan
            } else if record.as_ledger().is_some() {
                Color::Green
            } else {
                Color::White
            };

            Row::new(vec![
                Cell::from(record.id().to_string()),
                Cell::from(record.variant().name()).style(Style::default().fg(color)),
                Cell::from(truncate(record.name(), 30)),
                Cell::from(record.age().to_string()),
                Cell::from(format!("{:.2}", record.value())).style(Style::default().fg(color)),
            ])
            .height(1)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(14),
            Constraint::Length(32),
            Constraint::Length(6),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" Records (sorted by {}) ", app.sort_mode.title())),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Record Details ");

    let record = match app.selected_record() {
        Some(r) => r,
        None => {
            f.render_widget(Paragraph::new("No record selected").block(block), area);
            return;
        }
    };

    let mut content = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            format!("  {}", record.variant().name().to_uppercase()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )]),
        Line::from(""),
    ];

    for line in record.describe() {
        content.push(Line::from(vec![Span::raw("  "), Span::raw(line)]));
    }

    if let Some(loanable) = record.as_loanable() {
        content.push(Line::from(""));
        content.push(Line::from(vec![
            Span::styled(
                "  State: ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(loanable.state().as_str()),
        ]));
    }

    content.push(Line::from(""));
    content.push(Line::from(vec![Span::styled(
        "  Press Enter to close",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )]));

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let status_spans = vec![
        Span::styled(
            format!(" Row: {}/{} ", selected, app.registry.len()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" | "),
        Span::styled("s", Style::default().fg(Color::Yellow)),
        Span::raw(" Sort | "),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Details | "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Nav | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
