use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph,
    Row, Table, Tabs,
};

use brasileirao_terminal::config::DashConfig;
use brasileirao_terminal::dataset::MatchDataset;
use brasileirao_terminal::export;
use brasileirao_terminal::state::{
    AppState, DashTab, FilterField, WinRateChart, field_label, tab_label,
};
use brasileirao_terminal::views::{Dashboard, DashboardViews, FormationCount, RegionCount};

struct App {
    state: AppState,
    should_quit: bool,
    export_dir: PathBuf,
}

impl App {
    fn new(state: AppState, export_dir: PathBuf) -> Self {
        Self {
            state,
            should_quit: false,
            export_dir,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Tab => self.state.next_tab(),
            KeyCode::BackTab => self.state.prev_tab(),
            KeyCode::Char(c @ '1'..='7') => {
                let idx = c as usize - '1' as usize;
                self.state.tab = DashTab::from_index(idx);
            }
            KeyCode::Char('f') => self.state.cycle_focus_next(),
            KeyCode::Char('F') => self.state.cycle_focus_prev(),
            KeyCode::Left | KeyCode::Char('h') => self.state.adjust_focused(-1),
            KeyCode::Right | KeyCode::Char('l') => self.state.adjust_focused(1),
            KeyCode::PageUp => self.state.page_dates(-30),
            KeyCode::PageDown => self.state.page_dates(30),
            KeyCode::Up | KeyCode::Char('k') => self.state.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.state.move_cursor(1),
            KeyCode::Char(' ') => self.state.toggle_at_cursor(),
            KeyCode::Char('x') => self.state.clear_focused(),
            KeyCode::Char('r') => self.state.reset_filters(),
            KeyCode::Char('[') => self.state.cycle_team_pick(-1),
            KeyCode::Char(']') => self.state.cycle_team_pick(1),
            KeyCode::Enter if self.state.tab == DashTab::Compare => self.state.toggle_compare(),
            KeyCode::Char('g') => self.state.toggle_win_rate_chart(),
            KeyCode::Char('e') => self.export_current(),
            _ => {}
        }
    }

    fn export_current(&mut self) {
        let Dashboard::Ready(views) = self.state.dashboard() else {
            self.state
                .push_log("[WARN] Nothing to export for the current filters");
            return;
        };
        let path = export::default_export_path(&self.export_dir);
        let criteria = self.state.criteria();
        let result = export::export_views(&path, &criteria, &views);
        self.state.record_export(result, Instant::now());
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let cfg = DashConfig::from_env();
    let dataset = MatchDataset::load_csv(&cfg.csv_path, &cfg.draw_sentinel)
        .context("unable to load match dataset (set BRASILEIRAO_CSV)")?;
    let state = AppState::new(dataset, cfg.initial_rounds);
    let mut app = App::new(state, cfg.export_dir.clone());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        app.state.maybe_clear_export(Instant::now());

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let state = &app.state;
    let filtered = state.filtered();
    let dashboard = Dashboard::compute(&filtered, &state.selection());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_lines(state, filtered.len()))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(40)])
        .split(chunks[1]);

    render_sidebar(frame, columns[0], state);

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
        ])
        .split(columns[1]);

    let titles = DashTab::ALL
        .iter()
        .enumerate()
        .map(|(idx, tab)| format!("{} {}", idx + 1, tab_label(*tab)))
        .collect::<Vec<_>>();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL))
        .select(state.tab.index())
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, main[0]);

    match &dashboard {
        Dashboard::NoData => {
            let empty = Paragraph::new("No data found for the selected filters.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().title(tab_label(state.tab)).borders(Borders::ALL));
            frame.render_widget(empty, main[1]);
        }
        Dashboard::Ready(views) => render_tab(frame, main[1], state, views),
    }

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, main[2]);

    let footer = Paragraph::new(footer_text(state));
    frame.render_widget(footer, chunks[2]);

    if state.help_overlay {
        let area = frame.size();
        render_help_overlay(frame, area);
    }
}

fn header_lines(state: &AppState, shown: usize) -> Vec<Line<'static>> {
    let title = format!(
        "  BRASILEIRAO DASHBOARD | {} | {} of {} matches",
        tab_label(state.tab),
        shown,
        state.dataset.len()
    );
    let export_line = if state.export.done {
        let text = match &state.export.path {
            Some(path) => format!("  {} ({path})", state.export.message),
            None => format!("  {}", state.export.message),
        };
        let color = if state.export.failed {
            Color::Red
        } else {
            Color::Green
        };
        Line::styled(text, Style::default().fg(color))
    } else {
        Line::raw("  Use the sidebar to refine the analysis.")
    };
    vec![Line::raw(title), export_line]
}

fn footer_text(state: &AppState) -> String {
    let extra = match state.tab {
        DashTab::Summary => " | g Bars/Table",
        DashTab::Performance => " | [/] Team",
        DashTab::Compare => " | [/] Move | Enter Pick",
        _ => "",
    };
    format!(
        "Tab/1-7 Tabs | f Field | ←/→ Adjust | ↑/↓ Move | Space Toggle | x Clear | r Reset \
         | e Export{extra} | ? Help | q Quit"
    )
}

fn render_sidebar(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Percentage(40),
            Constraint::Min(3),
        ])
        .split(area);

    let focus_style = Style::default().fg(Color::Black).bg(Color::Yellow);
    let field_line = |field: FilterField, value: String| {
        let text = format!("{:<12}{value}", field_label(field));
        if state.focus == field {
            Line::styled(text, focus_style)
        } else {
            Line::raw(text)
        }
    };
    let ranges = vec![
        field_line(FilterField::RoundMin, state.rounds.0.to_string()),
        field_line(FilterField::RoundMax, state.rounds.1.to_string()),
        field_line(FilterField::DateStart, state.dates.0.format("%d/%m/%Y").to_string()),
        field_line(FilterField::DateEnd, state.dates.1.format("%d/%m/%Y").to_string()),
    ];
    let filters = Paragraph::new(ranges)
        .block(Block::default().title("Filters").borders(Borders::ALL));
    frame.render_widget(filters, sections[0]);

    render_option_list(
        frame,
        sections[1],
        state,
        FilterField::Regions,
        &state.regions,
        &state.selected_regions,
        state.region_cursor,
    );
    render_option_list(
        frame,
        sections[2],
        state,
        FilterField::Teams,
        &state.teams,
        &state.selected_teams,
        state.team_cursor,
    );
}

fn render_option_list(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    field: FilterField,
    options: &[String],
    selected: &std::collections::BTreeSet<String>,
    cursor: usize,
) {
    let focused = state.focus == field;
    let title = format!("{} ({} picked)", field_label(field), selected.len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        });
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let (start, end) = visible_range(cursor, options.len(), inner.height as usize);
    let lines = options[start..end]
        .iter()
        .enumerate()
        .map(|(offset, opt)| {
            let idx = start + offset;
            let mark = if selected.contains(opt) { "[x]" } else { "[ ]" };
            let text = format!("{mark} {opt}");
            if focused && idx == cursor {
                Line::styled(text, Style::default().fg(Color::White).bg(Color::DarkGray))
            } else {
                Line::raw(text)
            }
        })
        .collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_tab(frame: &mut Frame, area: Rect, state: &AppState, views: &DashboardViews) {
    match state.tab {
        DashTab::Summary => render_summary(frame, area, state, views),
        DashTab::RegionGames => render_region_games(frame, area, views),
        DashTab::Performance => render_performance(frame, area, state, views),
        DashTab::Compare => render_compare(frame, area, state, views),
        DashTab::Formations => render_formations(frame, area, views),
        DashTab::RegionGamesHorizontal => render_region_games_horizontal(frame, area, views),
        DashTab::GoalsPerRound => render_goals_per_round(frame, area, views),
    }
}

fn render_summary(frame: &mut Frame, area: Rect, state: &AppState, views: &DashboardViews) {
    let block = Block::default()
        .title("Win share of decisive matches (draws ignored)")
        .borders(Borders::ALL);
    let Some(shares) = views.win_rate.as_ref() else {
        let empty = Paragraph::new("Only draws in the current filter").block(block);
        frame.render_widget(empty, area);
        return;
    };

    match state.win_rate_chart {
        WinRateChart::Bars => {
            let bars = shares
                .iter()
                .map(|s| {
                    Bar::default()
                        .value((s.percentage * 100.0).round() as u64)
                        .label(Line::from(s.team.clone()))
                        .text_value(format!("{:.2}%", s.percentage))
                        .style(Style::default().fg(Color::Green))
                })
                .collect::<Vec<_>>();
            let chart = BarChart::default()
                .block(block)
                .data(BarGroup::default().bars(&bars))
                .direction(Direction::Horizontal)
                .bar_width(1)
                .bar_gap(0)
                .max(10_000);
            frame.render_widget(chart, area);
        }
        WinRateChart::Table => {
            let rows = shares.iter().map(|s| {
                Row::new(vec![
                    s.team.clone(),
                    s.wins.to_string(),
                    format!("{:.2}%", s.percentage),
                ])
            });
            let table = Table::new(
                rows,
                [
                    Constraint::Min(20),
                    Constraint::Length(6),
                    Constraint::Length(9),
                ],
            )
            .header(
                Row::new(vec!["Team", "Wins", "Win %"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(block);
            frame.render_widget(table, area);
        }
    }
}

fn region_bars(counts: &[RegionCount]) -> Vec<Bar<'static>> {
    counts
        .iter()
        .map(|r| {
            Bar::default()
                .value(u64::from(r.matches))
                .label(Line::from(r.region.clone()))
                .text_value(r.matches.to_string())
        })
        .collect()
}

fn render_region_games(frame: &mut Frame, area: Rect, views: &DashboardViews) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let bars = region_bars(&views.region_counts);
    let chart = BarChart::default()
        .block(
            Block::default()
                .title("Games per state (home + away)")
                .borders(Borders::ALL),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(4)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan));
    frame.render_widget(chart, cols[0]);

    let rows = views.region_results.iter().map(|r| {
        Row::new(vec![
            r.region.clone(),
            r.wins.to_string(),
            r.draws.to_string(),
            r.losses.to_string(),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Min(6),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(5),
        ],
    )
    .header(
        Row::new(vec!["State", "W", "D", "L"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().title("Results by state").borders(Borders::ALL));
    frame.render_widget(table, cols[1]);
}

fn render_region_games_horizontal(frame: &mut Frame, area: Rect, views: &DashboardViews) {
    let mut ascending = views.region_counts.clone();
    ascending.sort_by_key(|r| r.matches);
    let bars = region_bars(&ascending);
    let chart = BarChart::default()
        .block(
            Block::default()
                .title("Games per state")
                .borders(Borders::ALL),
        )
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::default().fg(Color::Cyan));
    frame.render_widget(chart, area);
}

fn render_performance(frame: &mut Frame, area: Rect, state: &AppState, views: &DashboardViews) {
    let team = state.standings_team.as_deref().unwrap_or("-");
    let block = Block::default()
        .title(format!("Accumulated points: {team}"))
        .borders(Borders::ALL);

    let Some(standings) = views.standings.as_ref().filter(|s| !s.curve.is_empty()) else {
        let empty = Paragraph::new(format!("{team} has no matches in the current filter"))
            .block(block);
        frame.render_widget(empty, area);
        return;
    };

    let points = standings
        .curve
        .iter()
        .map(|p| (f64::from(p.round), f64::from(p.cumulative)))
        .collect::<Vec<_>>();
    let first_round = standings.curve.first().map(|p| p.round).unwrap_or(1);
    let last_round = standings.curve.last().map(|p| p.round).unwrap_or(first_round);
    let x_max = f64::from(last_round.max(first_round + 1));
    let y_max = f64::from(standings.total().max(1));

    let dataset = Dataset::default()
        .name(standings.team.clone())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(&points);
    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .title("Round")
                .bounds([f64::from(first_round), x_max])
                .labels(vec![
                    Span::raw(first_round.to_string()),
                    Span::raw(last_round.to_string()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("Points")
                .bounds([0.0, y_max])
                .labels(vec![Span::raw("0"), Span::raw(standings.total().to_string())]),
        );
    frame.render_widget(chart, area);
}

fn render_compare(frame: &mut Frame, area: Rect, state: &AppState, views: &DashboardViews) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(20)])
        .split(area);

    let picker = Block::default()
        .title(format!("Pick two teams ({}/2)", state.compare.len()))
        .borders(Borders::ALL);
    let inner = picker.inner(cols[0]);
    frame.render_widget(picker, cols[0]);
    let (start, end) = visible_range(
        state.compare_cursor,
        state.teams.len(),
        inner.height as usize,
    );
    let lines = state.teams[start..end]
        .iter()
        .enumerate()
        .map(|(offset, team)| {
            let mark = if state.compare.contains(team) { "[x]" } else { "[ ]" };
            let text = format!("{mark} {team}");
            if start + offset == state.compare_cursor {
                Line::styled(text, Style::default().fg(Color::White).bg(Color::DarkGray))
            } else {
                Line::raw(text)
            }
        })
        .collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(lines), inner);

    let block = Block::default().title("Wins").borders(Borders::ALL);
    let Some(h2h) = views.head_to_head.as_ref() else {
        let idle = Paragraph::new("Select exactly two teams with Enter to compare wins")
            .block(block);
        frame.render_widget(idle, cols[1]);
        return;
    };
    let colors = [Color::Green, Color::Magenta];
    let bars = h2h
        .entries
        .iter()
        .zip(colors)
        .map(|(entry, color)| {
            Bar::default()
                .value(u64::from(entry.wins))
                .label(Line::from(entry.team.clone()))
                .text_value(entry.wins.to_string())
                .style(Style::default().fg(color))
        })
        .collect::<Vec<_>>();
    let chart = BarChart::default()
        .block(block.title_bottom(format!("{} matches involving either team", h2h.matches)))
        .data(BarGroup::default().bars(&bars))
        .bar_width(12)
        .bar_gap(4);
    frame.render_widget(chart, cols[1]);
}

fn formation_chart<'a>(title: &'a str, items: &[FormationCount]) -> BarChart<'a> {
    let bars = items
        .iter()
        .map(|f| {
            Bar::default()
                .value(u64::from(f.count))
                .label(Line::from(f.formation.clone()))
                .text_value(f.count.to_string())
        })
        .collect::<Vec<_>>();
    BarChart::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::default().fg(Color::Blue))
}

fn render_formations(frame: &mut Frame, area: Rect, views: &DashboardViews) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    frame.render_widget(formation_chart("Home", &views.formations.home), cols[0]);
    frame.render_widget(formation_chart("Away", &views.formations.away), cols[1]);
}

fn render_goals_per_round(frame: &mut Frame, area: Rect, views: &DashboardViews) {
    let bars = views
        .goals_per_round
        .iter()
        .map(|g| {
            Bar::default()
                .value((g.average * 100.0).round() as u64)
                .label(Line::from(g.round.to_string()))
                .text_value(format!("{:.1}", g.average))
        })
        .collect::<Vec<_>>();
    let chart = BarChart::default()
        .block(
            Block::default()
                .title("Average goals per match, by round")
                .borders(Borders::ALL),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(4)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Yellow));
    frame.render_widget(chart, area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let mut recent = state.logs.iter().rev().take(3).cloned().collect::<Vec<_>>();
    recent.reverse();
    recent.join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Brasileirao Dashboard - Help",
        "",
        "Tabs:",
        "  Tab / Shift-Tab  Next / previous tab",
        "  1-7              Jump to tab",
        "",
        "Sidebar:",
        "  f / F            Next / previous filter field",
        "  ←/→ or h/l       Adjust round or date (1 step)",
        "  PgUp / PgDn      Move date by 30 days",
        "  ↑/↓ or k/j       Move in state/team list",
        "  Space            Toggle state/team",
        "  x                Clear focused field",
        "  r                Reset all filters",
        "",
        "Views:",
        "  g                Win share bars / table",
        "  [ / ]            Pick team (Performance, Compare)",
        "  Enter            Add/remove team in comparison",
        "  e                Export views to .xlsx",
        "  ?                Toggle help",
        "  q                Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
