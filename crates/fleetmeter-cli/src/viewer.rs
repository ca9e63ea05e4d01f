use std::collections::HashMap;
use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use fleetmeter_core::{build_report, CounterKind, FleetSnapshot, ReportConfig, ReportKind, ReportTable, SortState};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Terminal;
use tracing::debug;

use crate::render::header_label;

pub(crate) struct ViewerState {
    views: Vec<ReportKind>,
    active: usize,
    column: usize,
    sorts: HashMap<ReportKind, SortState>,
    table: ReportTable,
}

impl ViewerState {
    pub(crate) fn new(snapshot: &FleetSnapshot, config: &ReportConfig) -> Self {
        let mut views = vec![ReportKind::Toner];
        views.extend(CounterKind::ALL.into_iter().map(ReportKind::Usage));
        views.extend(snapshot.months(&config.year).into_iter().map(ReportKind::Month));

        let table = build_report(snapshot, config, views[0], &SortState::new());
        Self {
            views,
            active: 0,
            column: 0,
            sorts: HashMap::new(),
            table,
        }
    }

    pub(crate) fn kind(&self) -> ReportKind {
        self.views[self.active]
    }

    pub(crate) fn table(&self) -> &ReportTable {
        &self.table
    }

    pub(crate) fn column(&self) -> usize {
        self.column
    }

    pub(crate) fn sort(&self) -> SortState {
        self.sorts.get(&self.kind()).cloned().unwrap_or_default()
    }

    pub(crate) fn cycle_view(&mut self, forward: bool, snapshot: &FleetSnapshot, config: &ReportConfig) {
        let len = self.views.len();
        self.active = if forward {
            (self.active + 1) % len
        } else {
            (self.active + len - 1) % len
        };
        self.column = 0;
        self.refresh(snapshot, config);
    }

    pub(crate) fn move_column(&mut self, forward: bool) {
        let last = self.table.columns.len().saturating_sub(1);
        self.column = if forward {
            (self.column + 1).min(last)
        } else {
            self.column.saturating_sub(1)
        };
    }

    /// Sorts by the highlighted column, toggling when it is already active.
    pub(crate) fn sort_selected(&mut self, snapshot: &FleetSnapshot, config: &ReportConfig) {
        let Some(column) = self.table.columns.get(self.column) else {
            return;
        };
        let key = column.key.clone();
        let kind = self.kind();
        self.sorts.entry(kind).or_default().select(key);
        self.refresh(snapshot, config);
    }

    fn refresh(&mut self, snapshot: &FleetSnapshot, config: &ReportConfig) {
        let sort = self.sort();
        self.table = build_report(snapshot, config, self.kind(), &sort);
        debug!(view = %self.kind(), rows = self.table.rows.len(), "viewer refreshed");
    }
}

pub fn run_viewer(snapshot: &FleetSnapshot, config: &ReportConfig) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = ViewerState::new(snapshot, config);

    let run_result = (|| -> Result<()> {
        loop {
            terminal.draw(|frame| draw_ui(frame.size(), frame, &state, config))?;

            if !event::poll(Duration::from_millis(250))? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Tab => state.cycle_view(true, snapshot, config),
                KeyCode::BackTab => state.cycle_view(false, snapshot, config),
                KeyCode::Left | KeyCode::Char('h') => state.move_column(false),
                KeyCode::Right | KeyCode::Char('l') => state.move_column(true),
                KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('s') => {
                    state.sort_selected(snapshot, config)
                }
                _ => {}
            }
        }
        Ok(())
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

fn draw_ui(area: Rect, frame: &mut ratatui::Frame<'_>, state: &ViewerState, config: &ReportConfig) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    frame.render_widget(render_header(state, config), rows[0]);
    frame.render_widget(render_table(state), rows[1]);
}

fn render_header(state: &ViewerState, config: &ReportConfig) -> Paragraph<'static> {
    let table = state.table();
    let lines = vec![
        Line::from(vec![
            Span::styled(
                "Fleet Meter  ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "{}  year={}  month={}  devices={}",
                table.title,
                table.year,
                config.current_month,
                table.rows.len()
            )),
        ]),
        Line::from("tab/shift-tab view  left/right column  enter sort  q quit"),
    ];

    Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Report"))
}

fn render_table(state: &ViewerState) -> Table<'static> {
    let table = state.table();
    let sort = state.sort();

    let header = Row::new(table.columns.iter().enumerate().map(|(idx, column)| {
        let style = if idx == state.column() {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        Cell::from(header_label(&column.label, &column.key, &sort)).style(style)
    }));

    let rows: Vec<Row<'static>> = table
        .rows
        .iter()
        .map(|row| Row::new(row.cells.iter().map(|cell| Cell::from(cell.render()))))
        .collect();

    let widths: Vec<Constraint> = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let widest = table
                .rows
                .iter()
                .filter_map(|row| row.cells.get(idx))
                .map(|cell| cell.render().chars().count())
                .max()
                .unwrap_or(0);
            Constraint::Length(widest.max(column.label.chars().count() + 2) as u16)
        })
        .collect();

    Table::new(rows, widths)
        .header(header)
        .column_spacing(2)
        .block(Block::default().borders(Borders::ALL).title(table.title.clone()))
}
