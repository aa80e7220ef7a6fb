use std::path::PathBuf;

use chrono::NaiveDate;

use brasileirao_terminal::dataset::{MatchDataset, MatchRecord, Outcome};
use brasileirao_terminal::filter::{FilterCriteria, apply, clamp_rounds};

fn sample() -> MatchDataset {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("brasileirao_sample.csv");
    MatchDataset::load_csv(&path, "-").expect("fixture should load")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn record(round: u32, home: &str, away: &str, outcome: Outcome) -> MatchRecord {
    MatchRecord {
        round,
        date: date(2021, 1, round),
        home_team: home.to_string(),
        away_team: away.to_string(),
        home_region: format!("{home}-state"),
        away_region: format!("{away}-state"),
        home_score: 0,
        away_score: 0,
        outcome,
        home_formation: None,
        away_formation: None,
    }
}

fn ids(view: &[&MatchRecord]) -> Vec<(u32, String, String)> {
    view.iter()
        .map(|m| (m.round, m.home_team.clone(), m.away_team.clone()))
        .collect()
}

#[test]
fn unconstrained_keeps_everything_in_order() {
    let dataset = sample();
    let criteria = FilterCriteria::unconstrained(&dataset);
    let view = apply(dataset.records(), &criteria);
    assert_eq!(view.len(), dataset.len());
    for (kept, original) in view.iter().zip(dataset.records()) {
        assert_eq!(*kept, original);
    }
}

#[test]
fn team_filter_matches_home_or_away() {
    let records = vec![
        record(1, "A", "B", Outcome::HomeWin),
        record(2, "A", "C", Outcome::Draw),
        record(3, "B", "C", Outcome::HomeWin),
    ];
    let dataset = MatchDataset::from_records(records);
    let criteria = FilterCriteria::unconstrained(&dataset).with_teams(["A"]);
    let view = apply(dataset.records(), &criteria);
    assert_eq!(
        ids(&view),
        vec![
            (1, "A".to_string(), "B".to_string()),
            (2, "A".to_string(), "C".to_string())
        ]
    );
}

#[test]
fn region_filter_is_a_disjunction_over_sides() {
    let dataset = sample();
    let criteria = FilterCriteria::unconstrained(&dataset).with_regions(["RJ"]);
    let view = apply(dataset.records(), &criteria);
    assert_eq!(view.len(), 4);
    assert!(view.iter().all(|m| m.home_region == "RJ" || m.away_region == "RJ"));

    let both = FilterCriteria::unconstrained(&dataset).with_regions(["RJ", "RS"]);
    // Every fixture match except the SP derby.
    assert_eq!(apply(dataset.records(), &both).len(), 7);
}

#[test]
fn round_and_date_bounds_are_inclusive() {
    let dataset = sample();
    let by_round = FilterCriteria::unconstrained(&dataset).with_rounds(2, 3);
    let view = apply(dataset.records(), &by_round);
    assert_eq!(view.len(), 4);
    assert!(view.iter().all(|m| (2..=3).contains(&m.round)));

    let by_date =
        FilterCriteria::unconstrained(&dataset).with_dates(date(2019, 5, 12), date(2019, 5, 19));
    assert_eq!(apply(dataset.records(), &by_date), view);
}

#[test]
fn all_constraints_combine_with_and() {
    let dataset = sample();
    let criteria = FilterCriteria::unconstrained(&dataset)
        .with_rounds(1, 3)
        .with_regions(["RS"])
        .with_teams(["Palmeiras"]);
    let view = apply(dataset.records(), &criteria);
    // Palmeiras x Gremio, round 3; round 4 is outside the window.
    assert_eq!(
        ids(&view),
        vec![(3, "Palmeiras".to_string(), "Gremio".to_string())]
    );
}

#[test]
fn every_returned_record_satisfies_every_predicate() {
    let dataset = sample();
    let regions = [vec![], vec!["SP"], vec!["RS", "RJ"]];
    let teams = [vec![], vec!["Santos"], vec!["Gremio", "Flamengo"]];
    let windows = [
        (date(2019, 5, 5), date(2019, 5, 26)),
        (date(2019, 5, 12), date(2019, 5, 12)),
        (date(2019, 5, 13), date(2019, 5, 30)),
        (date(2019, 5, 20), date(2019, 5, 1)),
    ];
    for (lo, hi) in [(1, 4), (2, 2), (3, 4), (4, 1)] {
        for (start, end) in windows {
            for region_set in &regions {
                for team_set in &teams {
                    let criteria = FilterCriteria::unconstrained(&dataset)
                        .with_rounds(lo, hi)
                        .with_dates(start, end)
                        .with_regions(region_set.iter().copied())
                        .with_teams(team_set.iter().copied());
                    let view = apply(dataset.records(), &criteria);
                    let expected = dataset
                        .records()
                        .iter()
                        .filter(|m| criteria.matches(m))
                        .count();
                    assert_eq!(view.len(), expected);
                    for m in &view {
                        assert!(m.round >= lo && m.round <= hi);
                        assert!(m.date >= start && m.date <= end);
                        assert!(
                            region_set.is_empty()
                                || region_set.contains(&m.home_region.as_str())
                                || region_set.contains(&m.away_region.as_str())
                        );
                        assert!(
                            team_set.is_empty()
                                || team_set.contains(&m.home_team.as_str())
                                || team_set.contains(&m.away_team.as_str())
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn inverted_range_yields_empty_view() {
    let dataset = sample();
    let criteria = FilterCriteria::unconstrained(&dataset).with_rounds(4, 1);
    assert!(apply(dataset.records(), &criteria).is_empty());
}

#[test]
fn unknown_team_yields_empty_view() {
    let dataset = sample();
    let criteria = FilterCriteria::unconstrained(&dataset).with_teams(["Juventude"]);
    assert!(apply(dataset.records(), &criteria).is_empty());
}

#[test]
fn clamp_rounds_stays_inside_bounds() {
    assert_eq!(clamp_rounds((1, 10), (1, 4)), (1, 4));
    assert_eq!(clamp_rounds((0, 2), (1, 38)), (1, 2));
    assert_eq!(clamp_rounds((30, 50), (1, 38)), (30, 38));
    assert_eq!(clamp_rounds((9, 3), (1, 38)), (3, 9));
}
