use std::path::Path;

use anyhow::{Context, Result};

use brasileirao_terminal::config::{DashConfig, ReportArgs};
use brasileirao_terminal::dataset::MatchDataset;
use brasileirao_terminal::export;
use brasileirao_terminal::filter::{self, FilterCriteria};
use brasileirao_terminal::views::{Dashboard, DashboardViews};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let raw = std::env::args().skip(1).collect::<Vec<_>>();
    let args = ReportArgs::parse(&raw)?;
    if args.help {
        print_help();
        return Ok(());
    }

    let cfg = DashConfig::from_env();
    let csv_path = args.csv.clone().unwrap_or(cfg.csv_path);
    let dataset = MatchDataset::load_csv(&csv_path, &cfg.draw_sentinel)?;

    let criteria = args.criteria(&dataset);
    let filtered = filter::apply(dataset.records(), &criteria);
    let dashboard = Dashboard::compute(&filtered, &args.selection());

    if args.json {
        let json = serde_json::to_string_pretty(&dashboard).context("serialize views")?;
        println!("{json}");
    } else {
        print_text(&csv_path, dataset.len(), &criteria, &dashboard);
    }

    if let Some(out) = &args.xlsx {
        let Dashboard::Ready(views) = &dashboard else {
            eprintln!("Skipping export: no matches for the selected filters");
            return Ok(());
        };
        let report = export::export_views(out, &criteria, views)?;
        eprintln!(
            "Exported {} sheets ({} rows) to {}",
            report.sheets,
            report.rows,
            report.path.display()
        );
    }

    Ok(())
}

fn print_text(csv_path: &Path, total: usize, criteria: &FilterCriteria, dashboard: &Dashboard) {
    println!("Brasileirao report");
    println!("CSV: {}", csv_path.display());
    println!(
        "Rounds: {}-{} | Dates: {} to {}",
        criteria.round_range.0,
        criteria.round_range.1,
        criteria.date_range.0,
        criteria.date_range.1
    );
    if !criteria.regions.is_empty() {
        println!("States: {}", join(criteria.regions.iter()));
    }
    if !criteria.teams.is_empty() {
        println!("Teams: {}", join(criteria.teams.iter()));
    }

    let Dashboard::Ready(views) = dashboard else {
        println!("No data found for the selected filters ({total} matches loaded).");
        return;
    };
    println!("Matches: {}/{}", views.matches, total);
    print_views(views);
}

fn print_views(views: &DashboardViews) {
    println!();
    println!("Win share (decisive matches):");
    match &views.win_rate {
        Some(shares) => {
            for s in shares {
                println!("  {:<24} {:>3} {:>7.2}%", s.team, s.wins, s.percentage);
            }
        }
        None => println!("  only draws"),
    }

    println!();
    println!("Games per state:");
    for r in &views.region_counts {
        println!("  {:<6} {:>4}", r.region, r.matches);
    }

    println!();
    println!("Results by state (W/D/L):");
    for r in &views.region_results {
        println!("  {:<6} {:>3} {:>3} {:>3}", r.region, r.wins, r.draws, r.losses);
    }

    if let Some(standings) = &views.standings {
        println!();
        println!("Accumulated points: {}", standings.team);
        if standings.curve.is_empty() {
            println!("  no matches in filter");
        }
        for p in &standings.curve {
            println!("  round {:>2}: +{} = {}", p.round, p.points, p.cumulative);
        }
    }

    println!();
    match &views.head_to_head {
        Some(h2h) => {
            println!("Head to head ({} matches):", h2h.matches);
            for e in &h2h.entries {
                println!("  {:<24} {:>3} wins", e.team, e.wins);
            }
        }
        None => println!("Head to head: pass --compare=A,B with two teams"),
    }

    println!();
    println!("Top formations (home | away):");
    let rows = views.formations.home.len().max(views.formations.away.len());
    for idx in 0..rows {
        let home = views
            .formations
            .home
            .get(idx)
            .map(|f| format!("{} ({})", f.formation, f.count))
            .unwrap_or_default();
        let away = views
            .formations
            .away
            .get(idx)
            .map(|f| format!("{} ({})", f.formation, f.count))
            .unwrap_or_default();
        println!("  {home:<20} | {away}");
    }

    println!();
    println!("Average goals per round:");
    for g in &views.goals_per_round {
        println!(
            "  round {:>2}: {:.2} ({} goals / {} matches)",
            g.round, g.average, g.goals, g.matches
        );
    }
}

fn join<'a>(items: impl Iterator<Item = &'a String>) -> String {
    items.map(String::as_str).collect::<Vec<_>>().join(", ")
}

fn print_help() {
    eprintln!(
        r#"brasileirao_report - filter the match dataset and print every view

Usage:
  brasileirao_report [--csv=PATH] [--rounds=MIN-MAX] [--from=DATE] [--to=DATE]
                     [--region=SP,RJ] [--team=A,B] [--standings=TEAM]
                     [--compare=A,B] [--json] [--xlsx=PATH]

Dates accept DD/MM/YYYY or YYYY-MM-DD. Without --rounds/--from/--to the full
dataset range is used. BRASILEIRAO_CSV and BRASILEIRAO_DRAW_SENTINEL are read
from the environment (or .env)."#
    );
}
