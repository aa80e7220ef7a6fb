use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::filter::FilterCriteria;
use crate::views::{DashboardViews, FormationCount};

#[derive(Debug)]
pub struct ExportReport {
    pub path: PathBuf,
    pub sheets: usize,
    pub rows: usize,
}

pub fn default_export_path(dir: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    dir.join(format!("brasileirao-{stamp}.xlsx"))
}

/// Writes one sheet per view plus a sheet describing the active filters.
pub fn export_views(
    path: &Path,
    criteria: &FilterCriteria,
    views: &DashboardViews,
) -> Result<ExportReport> {
    let sheets: Vec<(&str, Vec<Vec<String>>)> = vec![
        ("Filters", filter_rows(criteria, views.matches)),
        ("WinRate", win_rate_rows(views)),
        ("RegionGames", region_count_rows(views)),
        ("Standings", standings_rows(views)),
        ("HeadToHead", head_to_head_rows(views)),
        ("Formations", formation_rows(views)),
        ("GoalsPerRound", goals_rows(views)),
        ("RegionResults", region_result_rows(views)),
    ];

    let mut workbook = Workbook::new();
    let mut rows = 0usize;
    for (name, sheet_rows) in &sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name)?;
        write_rows(sheet, sheet_rows)?;
        rows += sheet_rows.len().saturating_sub(1);
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create export dir {}", parent.display()))?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        path: path.to_path_buf(),
        sheets: sheets.len(),
        rows,
    })
}

fn header(cols: &[&str]) -> Vec<String> {
    cols.iter().map(|c| c.to_string()).collect()
}

fn filter_rows(criteria: &FilterCriteria, matches: usize) -> Vec<Vec<String>> {
    let join = |set: &std::collections::BTreeSet<String>| {
        if set.is_empty() {
            "(all)".to_string()
        } else {
            set.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    };
    vec![
        header(&["Filter", "Value"]),
        vec![
            "Rounds".to_string(),
            format!("{}-{}", criteria.round_range.0, criteria.round_range.1),
        ],
        vec![
            "Dates".to_string(),
            format!("{} to {}", criteria.date_range.0, criteria.date_range.1),
        ],
        vec!["Regions".to_string(), join(&criteria.regions)],
        vec!["Teams".to_string(), join(&criteria.teams)],
        vec!["Matches".to_string(), matches.to_string()],
    ]
}

fn win_rate_rows(views: &DashboardViews) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Team", "Wins", "Win %"])];
    for share in views.win_rate.iter().flatten() {
        rows.push(vec![
            share.team.clone(),
            share.wins.to_string(),
            format!("{:.2}", share.percentage),
        ]);
    }
    rows
}

fn region_count_rows(views: &DashboardViews) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Region", "Games"])];
    rows.extend(
        views
            .region_counts
            .iter()
            .map(|r| vec![r.region.clone(), r.matches.to_string()]),
    );
    rows
}

fn standings_rows(views: &DashboardViews) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Team", "Round", "Points", "Cumulative"])];
    if let Some(standings) = &views.standings {
        rows.extend(standings.curve.iter().map(|p| {
            vec![
                standings.team.clone(),
                p.round.to_string(),
                p.points.to_string(),
                p.cumulative.to_string(),
            ]
        }));
    }
    rows
}

fn head_to_head_rows(views: &DashboardViews) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Team", "Wins"])];
    if let Some(h2h) = &views.head_to_head {
        rows.extend(
            h2h.entries
                .iter()
                .map(|e| vec![e.team.clone(), e.wins.to_string()]),
        );
    }
    rows
}

fn formation_rows(views: &DashboardViews) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Side", "Formation", "Count"])];
    let side_rows = |side: &str, items: &[FormationCount]| {
        items
            .iter()
            .map(|f| vec![side.to_string(), f.formation.clone(), f.count.to_string()])
            .collect::<Vec<_>>()
    };
    rows.extend(side_rows("Home", &views.formations.home));
    rows.extend(side_rows("Away", &views.formations.away));
    rows
}

fn goals_rows(views: &DashboardViews) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Round", "Matches", "Goals", "Average"])];
    rows.extend(views.goals_per_round.iter().map(|g| {
        vec![
            g.round.to_string(),
            g.matches.to_string(),
            g.goals.to_string(),
            format!("{:.2}", g.average),
        ]
    }));
    rows
}

fn region_result_rows(views: &DashboardViews) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Region", "Wins", "Draws", "Losses"])];
    rows.extend(views.region_results.iter().map(|r| {
        vec![
            r.region.clone(),
            r.wins.to_string(),
            r.draws.to_string(),
            r.losses.to_string(),
        ]
    }));
    rows
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
