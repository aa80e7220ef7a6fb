use std::collections::{BTreeSet, VecDeque};
use std::time::Instant;

use anyhow::Result;
use chrono::{Duration, Local, NaiveDate};

use crate::dataset::{MatchDataset, MatchRecord};
use crate::export::ExportReport;
use crate::filter::{self, FilterCriteria};
use crate::views::{Dashboard, ViewSelection};

pub const TAB_COUNT: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashTab {
    Summary,
    RegionGames,
    Performance,
    Compare,
    Formations,
    RegionGamesHorizontal,
    GoalsPerRound,
}

impl DashTab {
    pub const ALL: [DashTab; TAB_COUNT] = [
        DashTab::Summary,
        DashTab::RegionGames,
        DashTab::Performance,
        DashTab::Compare,
        DashTab::Formations,
        DashTab::RegionGamesHorizontal,
        DashTab::GoalsPerRound,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn from_index(idx: usize) -> Self {
        Self::ALL[idx % TAB_COUNT]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    RoundMin,
    RoundMax,
    DateStart,
    DateEnd,
    Regions,
    Teams,
}

impl FilterField {
    const ORDER: [FilterField; 6] = [
        FilterField::RoundMin,
        FilterField::RoundMax,
        FilterField::DateStart,
        FilterField::DateEnd,
        FilterField::Regions,
        FilterField::Teams,
    ];

    fn step(self, forward: bool) -> Self {
        let len = Self::ORDER.len();
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
        Self::ORDER[next]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinRateChart {
    Bars,
    Table,
}

#[derive(Debug, Clone)]
pub struct ExportState {
    pub done: bool,
    pub path: Option<String>,
    pub message: String,
    pub failed: bool,
    pub last_updated: Option<Instant>,
}

impl Default for ExportState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportState {
    pub fn new() -> Self {
        Self {
            done: false,
            path: None,
            message: String::new(),
            failed: false,
            last_updated: None,
        }
    }

    pub fn clear_if_done_for(&mut self, now: Instant, keep_secs: u64) {
        if !self.done {
            return;
        }
        let Some(last) = self.last_updated else {
            return;
        };
        if now.duration_since(last).as_secs() >= keep_secs {
            *self = Self::new();
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub dataset: MatchDataset,
    pub teams: Vec<String>,
    pub regions: Vec<String>,
    pub round_bounds: (u32, u32),
    pub date_bounds: (NaiveDate, NaiveDate),
    pub initial_rounds: (u32, u32),
    pub rounds: (u32, u32),
    pub dates: (NaiveDate, NaiveDate),
    pub selected_regions: BTreeSet<String>,
    pub selected_teams: BTreeSet<String>,
    pub tab: DashTab,
    pub focus: FilterField,
    pub region_cursor: usize,
    pub team_cursor: usize,
    pub win_rate_chart: WinRateChart,
    pub standings_team: Option<String>,
    pub compare_cursor: usize,
    pub compare: Vec<String>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub export: ExportState,
}

impl AppState {
    pub fn new(dataset: MatchDataset, initial_rounds: (u32, u32)) -> Self {
        let today = Local::now().date_naive();
        let round_bounds = dataset.round_bounds().unwrap_or((1, 1));
        let date_bounds = dataset.date_bounds().unwrap_or((today, today));
        let teams = dataset.teams();
        let regions = dataset.regions();
        let standings_team = teams.first().cloned();
        let mut state = Self {
            dataset,
            teams,
            regions,
            round_bounds,
            date_bounds,
            initial_rounds,
            rounds: filter::clamp_rounds(initial_rounds, round_bounds),
            dates: date_bounds,
            selected_regions: BTreeSet::new(),
            selected_teams: BTreeSet::new(),
            tab: DashTab::Summary,
            focus: FilterField::RoundMin,
            region_cursor: 0,
            team_cursor: 0,
            win_rate_chart: WinRateChart::Bars,
            standings_team,
            compare_cursor: 0,
            compare: Vec::with_capacity(2),
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
            export: ExportState::new(),
        };
        state.push_log(format!(
            "[INFO] Loaded {} matches, {} teams, {} regions",
            state.dataset.len(),
            state.teams.len(),
            state.regions.len()
        ));
        state
    }

    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            round_range: self.rounds,
            date_range: self.dates,
            regions: self.selected_regions.clone(),
            teams: self.selected_teams.clone(),
        }
    }

    pub fn filtered(&self) -> Vec<&MatchRecord> {
        filter::apply(self.dataset.records(), &self.criteria())
    }

    pub fn selection(&self) -> ViewSelection {
        ViewSelection {
            standings_team: self.standings_team.clone(),
            compare: self.compare.clone(),
        }
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::compute(&self.filtered(), &self.selection())
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn record_export(&mut self, result: Result<ExportReport>, now: Instant) {
        match result {
            Ok(report) => {
                let shown = report.path.display().to_string();
                self.export.failed = false;
                self.export.path = Some(shown.clone());
                self.export.message =
                    format!("Exported {} sheets, {} rows", report.sheets, report.rows);
                self.push_log(format!("[INFO] Export written to {shown}"));
            }
            Err(err) => {
                self.export.failed = true;
                self.export.path = None;
                self.export.message = format!("Export failed: {err}");
                self.push_log(format!("[WARN] Export failed: {err:#}"));
            }
        }
        self.export.done = true;
        self.export.last_updated = Some(now);
    }

    pub fn maybe_clear_export(&mut self, now: Instant) {
        self.export.clear_if_done_for(now, 8);
    }

    pub fn next_tab(&mut self) {
        self.tab = DashTab::from_index(self.tab.index() + 1);
    }

    pub fn prev_tab(&mut self) {
        self.tab = DashTab::from_index(self.tab.index() + TAB_COUNT - 1);
    }

    pub fn cycle_focus_next(&mut self) {
        self.focus = self.focus.step(true);
    }

    pub fn cycle_focus_prev(&mut self) {
        self.focus = self.focus.step(false);
    }

    /// Moves the focused round or date field by `delta` (rounds or days),
    /// keeping each range ordered and inside the dataset bounds.
    pub fn adjust_focused(&mut self, delta: i64) {
        let (round_lo, round_hi) = self.round_bounds;
        let (date_lo, date_hi) = self.date_bounds;
        match self.focus {
            FilterField::RoundMin => {
                self.rounds.0 = shift_round(self.rounds.0, delta, round_lo, self.rounds.1);
            }
            FilterField::RoundMax => {
                self.rounds.1 = shift_round(self.rounds.1, delta, self.rounds.0, round_hi);
            }
            FilterField::DateStart => {
                self.dates.0 = shift_date(self.dates.0, delta, date_lo, self.dates.1);
            }
            FilterField::DateEnd => {
                self.dates.1 = shift_date(self.dates.1, delta, self.dates.0, date_hi);
            }
            FilterField::Regions => self.move_cursor(delta),
            FilterField::Teams => self.move_cursor(delta),
        }
    }

    /// PgUp/PgDn: only the date fields take large steps.
    pub fn page_dates(&mut self, days: i64) {
        if matches!(self.focus, FilterField::DateStart | FilterField::DateEnd) {
            self.adjust_focused(days);
        }
    }

    pub fn move_cursor(&mut self, delta: i64) {
        match self.focus {
            FilterField::Regions => {
                self.region_cursor = wrap_index(self.region_cursor, delta, self.regions.len());
            }
            FilterField::Teams => {
                self.team_cursor = wrap_index(self.team_cursor, delta, self.teams.len());
            }
            _ => {}
        }
    }

    pub fn toggle_at_cursor(&mut self) {
        let (options, selected, cursor, label) = match self.focus {
            FilterField::Regions => (
                &self.regions,
                &mut self.selected_regions,
                self.region_cursor,
                "Region",
            ),
            FilterField::Teams => (
                &self.teams,
                &mut self.selected_teams,
                self.team_cursor,
                "Team",
            ),
            _ => return,
        };
        let Some(item) = options.get(cursor) else {
            return;
        };
        let msg = if selected.remove(item) {
            format!("[INFO] {label} {item} removed from filter")
        } else {
            selected.insert(item.clone());
            format!("[INFO] {label} {item} added to filter")
        };
        self.push_log(msg);
    }

    pub fn clear_focused(&mut self) {
        match self.focus {
            FilterField::RoundMin | FilterField::RoundMax => self.rounds = self.round_bounds,
            FilterField::DateStart | FilterField::DateEnd => self.dates = self.date_bounds,
            FilterField::Regions => self.selected_regions.clear(),
            FilterField::Teams => self.selected_teams.clear(),
        }
    }

    pub fn reset_filters(&mut self) {
        self.rounds = filter::clamp_rounds(self.initial_rounds, self.round_bounds);
        self.dates = self.date_bounds;
        self.selected_regions.clear();
        self.selected_teams.clear();
        self.push_log("[INFO] Filters reset");
    }

    /// `[`/`]` on the team-specific tabs.
    pub fn cycle_team_pick(&mut self, delta: i64) {
        if self.teams.is_empty() {
            return;
        }
        match self.tab {
            DashTab::Performance => {
                let current = self
                    .standings_team
                    .as_ref()
                    .and_then(|t| self.teams.iter().position(|x| x == t))
                    .unwrap_or(0);
                let next = wrap_index(current, delta, self.teams.len());
                self.standings_team = self.teams.get(next).cloned();
            }
            DashTab::Compare => {
                self.compare_cursor = wrap_index(self.compare_cursor, delta, self.teams.len());
            }
            _ => {}
        }
    }

    /// Adds or removes the team under the compare cursor; at most two teams.
    pub fn toggle_compare(&mut self) {
        let Some(team) = self.teams.get(self.compare_cursor).cloned() else {
            return;
        };
        if let Some(pos) = self.compare.iter().position(|t| *t == team) {
            self.compare.remove(pos);
            return;
        }
        if self.compare.len() >= 2 {
            self.push_log("[WARN] Comparison already has two teams");
            return;
        }
        self.compare.push(team);
    }

    pub fn toggle_win_rate_chart(&mut self) {
        self.win_rate_chart = match self.win_rate_chart {
            WinRateChart::Bars => WinRateChart::Table,
            WinRateChart::Table => WinRateChart::Bars,
        };
    }
}

fn shift_round(value: u32, delta: i64, lo: u32, hi: u32) -> u32 {
    let shifted = i64::from(value) + delta;
    shifted.clamp(i64::from(lo), i64::from(hi.max(lo))) as u32
}

fn shift_date(value: NaiveDate, delta: i64, lo: NaiveDate, hi: NaiveDate) -> NaiveDate {
    let shifted = value
        .checked_add_signed(Duration::days(delta))
        .unwrap_or(value);
    shifted.clamp(lo, hi.max(lo))
}

fn wrap_index(current: usize, delta: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as i64;
    ((current as i64 + delta).rem_euclid(len)) as usize
}

pub fn tab_label(tab: DashTab) -> &'static str {
    match tab {
        DashTab::Summary => "Summary",
        DashTab::RegionGames => "Games by State",
        DashTab::Performance => "Performance",
        DashTab::Compare => "Compare",
        DashTab::Formations => "Formations",
        DashTab::RegionGamesHorizontal => "States (Horizontal)",
        DashTab::GoalsPerRound => "Goals per Round",
    }
}

pub fn field_label(field: FilterField) -> &'static str {
    match field {
        FilterField::RoundMin => "First round",
        FilterField::RoundMax => "Last round",
        FilterField::DateStart => "From",
        FilterField::DateEnd => "To",
        FilterField::Regions => "States",
        FilterField::Teams => "Teams",
    }
}
