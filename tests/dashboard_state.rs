use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::NaiveDate;

use brasileirao_terminal::dataset::MatchDataset;
use brasileirao_terminal::export;
use brasileirao_terminal::state::{AppState, DashTab, FilterField, WinRateChart};
use brasileirao_terminal::views::Dashboard;

fn sample_state(initial_rounds: (u32, u32)) -> AppState {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("brasileirao_sample.csv");
    let dataset = MatchDataset::load_csv(&path, "-").expect("fixture should load");
    AppState::new(dataset, initial_rounds)
}

#[test]
fn initial_rounds_are_clamped_to_the_dataset() {
    let state = sample_state((1, 10));
    assert_eq!(state.rounds, (1, 4));
    assert_eq!(state.filtered().len(), 8);
    assert_eq!(state.standings_team.as_deref(), Some("Flamengo"));
    assert!(state.logs.back().unwrap().contains("Loaded 8 matches"));
}

#[test]
fn round_fields_stay_ordered() {
    let mut state = sample_state((1, 10));
    state.focus = FilterField::RoundMin;
    state.adjust_focused(2);
    assert_eq!(state.rounds, (3, 4));
    state.adjust_focused(5);
    assert_eq!(state.rounds, (4, 4));

    state.cycle_focus_next();
    assert_eq!(state.focus, FilterField::RoundMax);
    state.adjust_focused(-3);
    assert_eq!(state.rounds, (4, 4));
    assert_eq!(state.filtered().len(), 2);

    state.clear_focused();
    assert_eq!(state.rounds, (1, 4));
}

#[test]
fn date_fields_move_by_days_within_bounds() {
    let mut state = sample_state((1, 4));
    state.focus = FilterField::DateStart;
    state.adjust_focused(7);
    assert_eq!(state.dates.0, NaiveDate::from_ymd_opt(2019, 5, 12).unwrap());
    assert_eq!(state.filtered().len(), 6);

    state.adjust_focused(-30);
    assert_eq!(state.dates.0, NaiveDate::from_ymd_opt(2019, 5, 5).unwrap());

    state.focus = FilterField::DateEnd;
    state.adjust_focused(-30);
    assert_eq!(state.dates.1, state.dates.0);
    assert_eq!(state.filtered().len(), 2);
}

#[test]
fn page_keys_only_move_dates() {
    let mut state = sample_state((2, 3));
    state.focus = FilterField::RoundMin;
    state.page_dates(30);
    assert_eq!(state.rounds, (2, 3));
    state.focus = FilterField::RoundMax;
    state.page_dates(-30);
    assert_eq!(state.rounds, (2, 3));

    state.focus = FilterField::DateEnd;
    state.page_dates(-30);
    assert_eq!(state.dates.1, state.dates.0);
    state.page_dates(30);
    assert_eq!(state.dates.1, NaiveDate::from_ymd_opt(2019, 5, 26).unwrap());
}

#[test]
fn toggling_teams_filters_and_logs() {
    let mut state = sample_state((1, 4));
    state.focus = FilterField::Teams;
    state.move_cursor(1);
    state.toggle_at_cursor();
    assert!(state.selected_teams.contains("Gremio"));
    assert_eq!(state.filtered().len(), 4);
    assert!(state.logs.back().unwrap().contains("Gremio added"));

    state.toggle_at_cursor();
    assert!(state.selected_teams.is_empty());
    assert!(state.logs.back().unwrap().contains("Gremio removed"));
}

#[test]
fn region_cursor_wraps() {
    let mut state = sample_state((1, 4));
    state.focus = FilterField::Regions;
    state.move_cursor(-1);
    assert_eq!(state.region_cursor, 2);
    state.toggle_at_cursor();
    assert!(state.selected_regions.contains("SP"));
    state.move_cursor(1);
    assert_eq!(state.region_cursor, 0);
}

#[test]
fn toggling_needs_a_list_field() {
    let mut state = sample_state((1, 4));
    state.focus = FilterField::RoundMin;
    let logs = state.logs.len();
    state.toggle_at_cursor();
    assert!(state.selected_regions.is_empty());
    assert!(state.selected_teams.is_empty());
    assert_eq!(state.logs.len(), logs);
}

#[test]
fn comparison_holds_at_most_two_teams() {
    let mut state = sample_state((1, 4));
    state.tab = DashTab::Compare;
    state.toggle_compare();
    state.cycle_team_pick(2);
    state.toggle_compare();
    assert_eq!(state.compare, vec!["Flamengo", "Palmeiras"]);

    state.cycle_team_pick(1);
    state.toggle_compare();
    assert_eq!(state.compare.len(), 2);
    assert!(state.logs.back().unwrap().starts_with("[WARN]"));

    let dashboard = state.dashboard();
    let h2h = dashboard.views().unwrap().head_to_head.as_ref().unwrap();
    assert_eq!(h2h.entries[0].wins, 2);
    assert_eq!(h2h.entries[1].wins, 1);

    state.cycle_team_pick(-1);
    state.toggle_compare();
    assert_eq!(state.compare, vec!["Flamengo"]);
    assert!(state.dashboard().views().unwrap().head_to_head.is_none());
}

#[test]
fn performance_team_picker_cycles() {
    let mut state = sample_state((1, 4));
    state.tab = DashTab::Performance;
    state.cycle_team_pick(-1);
    assert_eq!(state.standings_team.as_deref(), Some("Santos"));
    let dashboard = state.dashboard();
    let standings = dashboard.views().unwrap().standings.as_ref().unwrap();
    assert_eq!(standings.team, "Santos");
    assert_eq!(standings.curve.len(), 4);

    // Outside the team tabs the picker does nothing.
    state.tab = DashTab::Summary;
    state.cycle_team_pick(1);
    assert_eq!(state.standings_team.as_deref(), Some("Santos"));
}

#[test]
fn tabs_wrap_both_ways() {
    let mut state = sample_state((1, 4));
    state.prev_tab();
    assert_eq!(state.tab, DashTab::GoalsPerRound);
    state.next_tab();
    assert_eq!(state.tab, DashTab::Summary);
    assert_eq!(DashTab::from_index(11), DashTab::Formations);
}

#[test]
fn empty_selection_gives_no_data_and_reset_restores() {
    let mut state = sample_state((2, 3));
    state.focus = FilterField::Regions;
    state.toggle_at_cursor();
    state.focus = FilterField::Teams;
    state.move_cursor(3);
    state.toggle_at_cursor();
    // Flamengo x Santos, round 3.
    assert_eq!(state.filtered().len(), 1);

    state.focus = FilterField::RoundMax;
    state.adjust_focused(-1);
    assert_eq!(state.rounds, (2, 2));
    assert_eq!(state.dashboard(), Dashboard::NoData);

    state.reset_filters();
    assert_eq!(state.rounds, (2, 3));
    assert!(state.selected_regions.is_empty() && state.selected_teams.is_empty());
    assert_eq!(state.filtered().len(), 4);
}

#[test]
fn win_rate_chart_toggles() {
    let mut state = sample_state((1, 4));
    assert_eq!(state.win_rate_chart, WinRateChart::Bars);
    state.toggle_win_rate_chart();
    assert_eq!(state.win_rate_chart, WinRateChart::Table);
}

#[test]
fn empty_dataset_still_builds_state() {
    let state = AppState::new(MatchDataset::default(), (1, 10));
    assert_eq!(state.rounds, (1, 1));
    assert!(state.standings_team.is_none());
    assert_eq!(state.dashboard(), Dashboard::NoData);
}

#[test]
fn export_writes_a_workbook() {
    let state = sample_state((1, 4));
    let Dashboard::Ready(views) = state.dashboard() else {
        panic!("fixture should produce views");
    };
    let dir = std::env::temp_dir().join(format!("brasileirao-export-{}", std::process::id()));
    let path = export::default_export_path(&dir);
    let report = export::export_views(&path, &state.criteria(), &views).expect("export");
    assert_eq!(report.sheets, 8);
    assert!(report.rows > 0);
    assert!(path.exists());

    let rows = report.rows;
    let mut state = state;
    state.record_export(Ok(report), Instant::now());
    assert!(state.export.done && !state.export.failed);
    assert_eq!(state.export.message, format!("Exported 8 sheets, {rows} rows"));
    assert!(state.logs.back().unwrap().starts_with("[INFO] Export written to"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn failed_export_is_flagged_and_cleared_later() {
    let mut state = sample_state((1, 4));
    let start = Instant::now();
    state.record_export(Err(anyhow::anyhow!("disk full")), start);
    assert!(state.export.done && state.export.failed);
    assert!(state.export.path.is_none());
    assert_eq!(state.export.message, "Export failed: disk full");
    assert!(state.logs.back().unwrap().starts_with("[WARN] Export failed"));

    state.maybe_clear_export(start + Duration::from_secs(3));
    assert!(state.export.failed);
    state.maybe_clear_export(start + Duration::from_secs(8));
    assert!(!state.export.done && !state.export.failed);
}
