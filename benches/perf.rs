use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use chrono::{Duration, NaiveDate};

use brasileirao_terminal::dataset::{MatchDataset, MatchRecord, Outcome};
use brasileirao_terminal::filter::{FilterCriteria, apply};
use brasileirao_terminal::views::{Dashboard, ViewSelection};

const REGIONS: &[&str] = &["SP", "RJ", "MG", "RS", "PR", "BA", "CE", "GO", "SC", "PE"];
const FORMATIONS: &[&str] = &["4-2-3-1", "4-4-2", "4-3-3", "3-5-2", "4-1-4-1", "5-3-2"];

/// Twenty teams, double round robin shaped: 38 rounds of 10 matches.
fn season(seasons: u32) -> MatchDataset {
    let teams = (0..20).map(|i| format!("Team {i:02}")).collect::<Vec<_>>();
    let start = NaiveDate::from_ymd_opt(2019, 4, 27).unwrap();
    let mut records = Vec::new();
    for s in 0..seasons {
        for round in 1..=38u32 {
            for slot in 0..10usize {
                let home = (slot + round as usize) % 20;
                let away = (home + 1 + slot * 2) % 20;
                let seed = (s as usize * 7919 + round as usize * 31 + slot * 17) % 97;
                let home_score = (seed % 4) as u32;
                let away_score = (seed % 3) as u32;
                let outcome = match home_score.cmp(&away_score) {
                    std::cmp::Ordering::Greater => Outcome::HomeWin,
                    std::cmp::Ordering::Less => Outcome::AwayWin,
                    std::cmp::Ordering::Equal => Outcome::Draw,
                };
                records.push(MatchRecord {
                    round,
                    date: start + Duration::days(i64::from(s * 365 + round * 7)),
                    home_team: teams[home].clone(),
                    away_team: teams[away].clone(),
                    home_region: REGIONS[home % REGIONS.len()].to_string(),
                    away_region: REGIONS[away % REGIONS.len()].to_string(),
                    home_score,
                    away_score,
                    outcome,
                    home_formation: Some(FORMATIONS[seed % FORMATIONS.len()].to_string()),
                    away_formation: Some(FORMATIONS[(seed / 3) % FORMATIONS.len()].to_string()),
                });
            }
        }
    }
    MatchDataset::from_records(records)
}

fn bench_filter(c: &mut Criterion) {
    let dataset = season(10);
    let criteria = FilterCriteria::unconstrained(&dataset)
        .with_rounds(1, 19)
        .with_regions(["SP", "RJ"]);
    c.bench_function("filter_apply", |b| {
        b.iter(|| {
            let view = apply(black_box(dataset.records()), black_box(&criteria));
            black_box(view.len());
        })
    });
}

fn bench_dashboard(c: &mut Criterion) {
    let dataset = season(10);
    let criteria = FilterCriteria::unconstrained(&dataset);
    let selection = ViewSelection {
        standings_team: Some("Team 03".to_string()),
        compare: vec!["Team 03".to_string(), "Team 11".to_string()],
    };
    c.bench_function("dashboard_compute", |b| {
        b.iter(|| {
            let view = apply(dataset.records(), &criteria);
            let dashboard = Dashboard::compute(black_box(&view), black_box(&selection));
            black_box(dashboard.views().map(|v| v.matches));
        })
    });
}

criterion_group!(benches, bench_filter, bench_dashboard);
criterion_main!(benches);
