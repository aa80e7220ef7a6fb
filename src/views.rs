//! Summary views derived from a filtered slice of matches.
//!
//! Every function here is pure and total: an empty slice yields an empty or
//! inactive result, never a panic or a division by zero.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::dataset::{MatchRecord, Side, TeamResult};

pub const FORMATION_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinShare {
    pub team: String,
    pub wins: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionCount {
    pub region: String,
    pub matches: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StandingPoint {
    pub round: u32,
    pub points: u32,
    pub cumulative: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standings {
    pub team: String,
    pub curve: Vec<StandingPoint>,
}

impl Standings {
    pub fn total(&self) -> u32 {
        self.curve.last().map(|p| p.cumulative).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamWins {
    pub team: String,
    pub wins: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadToHead {
    pub entries: [TeamWins; 2],
    /// Matches involving either team.
    pub matches: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormationCount {
    pub formation: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormationFrequency {
    pub home: Vec<FormationCount>,
    pub away: Vec<FormationCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundGoals {
    pub round: u32,
    pub matches: u32,
    pub goals: u32,
    pub average: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegionRecord {
    pub region: String,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl RegionRecord {
    pub fn played(&self) -> u32 {
        self.wins + self.draws + self.losses
    }
}

/// Share of decisive matches won by each team. Draws are left out of both
/// numerator and denominator; `None` when nothing in the slice was decisive.
///
/// Ordered by wins descending, ties in first-encountered order.
pub fn win_rate_distribution(matches: &[&MatchRecord]) -> Option<Vec<WinShare>> {
    let counts = counts_in_order(matches.iter().filter_map(|m| m.winner()));
    let decisive: u32 = counts.iter().map(|(_, n)| n).sum();
    if decisive == 0 {
        return None;
    }
    Some(
        counts
            .into_iter()
            .map(|(team, wins)| WinShare {
                team: team.to_string(),
                wins,
                percentage: f64::from(wins) / f64::from(decisive) * 100.0,
            })
            .collect(),
    )
}

/// Every match counts once for the home region and once for the away region.
pub fn region_match_counts(matches: &[&MatchRecord]) -> Vec<RegionCount> {
    counts_in_order(
        matches
            .iter()
            .flat_map(|m| [m.home_region.as_str(), m.away_region.as_str()]),
    )
    .into_iter()
    .map(|(region, matches)| RegionCount {
        region: region.to_string(),
        matches,
    })
    .collect()
}

/// Running points total for `team`, one entry per match played, in round order.
pub fn cumulative_standings(matches: &[&MatchRecord], team: &str) -> Standings {
    let mut played: Vec<(&MatchRecord, TeamResult)> = matches
        .iter()
        .filter_map(|m| m.result_for(team).map(|res| (*m, res)))
        .collect();
    played.sort_by_key(|(m, _)| m.round);

    let mut cumulative = 0;
    let curve = played
        .into_iter()
        .map(|(m, res)| {
            let points = res.points();
            cumulative += points;
            StandingPoint {
                round: m.round,
                points,
                cumulative,
            }
        })
        .collect();

    Standings {
        team: team.to_string(),
        curve,
    }
}

/// Win totals for exactly two distinct teams; any other selection is inactive.
pub fn head_to_head(matches: &[&MatchRecord], teams: &[String]) -> Option<HeadToHead> {
    let [first, second] = teams else {
        return None;
    };
    if first == second {
        return None;
    }

    let mut entries = [
        TeamWins {
            team: first.clone(),
            wins: 0,
        },
        TeamWins {
            team: second.clone(),
            wins: 0,
        },
    ];
    let mut involved = 0usize;
    for m in matches
        .iter()
        .filter(|m| m.involves_team(first) || m.involves_team(second))
    {
        involved += 1;
        if let Some(winner) = m.winner()
            && let Some(entry) = entries.iter_mut().find(|e| e.team == winner)
        {
            entry.wins += 1;
        }
    }

    Some(HeadToHead {
        entries,
        matches: involved,
    })
}

/// Most used formations per side. Blank labels are skipped; ties keep the
/// order in which the labels first appear.
pub fn formation_frequency(matches: &[&MatchRecord]) -> FormationFrequency {
    FormationFrequency {
        home: top_formations(matches, Side::Home, FORMATION_TOP_N),
        away: top_formations(matches, Side::Away, FORMATION_TOP_N),
    }
}

pub fn top_formations(matches: &[&MatchRecord], side: Side, limit: usize) -> Vec<FormationCount> {
    counts_in_order(matches.iter().filter_map(|m| m.formation(side)))
        .into_iter()
        .take(limit)
        .map(|(formation, count)| FormationCount {
            formation: formation.to_string(),
            count,
        })
        .collect()
}

/// Mean goals per match for each round present in the slice, ascending.
pub fn goals_per_round(matches: &[&MatchRecord]) -> Vec<RoundGoals> {
    let mut rounds: BTreeMap<u32, (u32, u32)> = BTreeMap::new();
    for m in matches {
        let entry = rounds.entry(m.round).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += m.total_goals();
    }
    rounds
        .into_iter()
        .map(|(round, (count, goals))| RoundGoals {
            round,
            matches: count,
            goals,
            average: f64::from(goals) / f64::from(count),
        })
        .collect()
}

/// Wins, draws and losses of each region's teams, ordered by region name.
pub fn region_results(matches: &[&MatchRecord]) -> Vec<RegionRecord> {
    let mut by_region: BTreeMap<&str, RegionRecord> = BTreeMap::new();
    for m in matches {
        for side in [Side::Home, Side::Away] {
            let region = m.region(side);
            let entry = by_region.entry(region).or_insert_with(|| RegionRecord {
                region: region.to_string(),
                ..RegionRecord::default()
            });
            match m.result_for_side(side) {
                TeamResult::Win => entry.wins += 1,
                TeamResult::Draw => entry.draws += 1,
                TeamResult::Loss => entry.losses += 1,
            }
        }
    }
    by_region.into_values().collect()
}

/// Occurrence counts sorted by count descending. The sort is stable, so ties
/// stay in first-encountered order.
fn counts_in_order<'a>(items: impl Iterator<Item = &'a str>) -> Vec<(&'a str, u32)> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(&'a str, u32)> = Vec::new();
    for item in items {
        match index.get(item) {
            Some(&pos) => counts[pos].1 += 1,
            None => {
                index.insert(item, counts.len());
                counts.push((item, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Teams the caller picked for the team-specific views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSelection {
    pub standings_team: Option<String>,
    pub compare: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardViews {
    pub matches: usize,
    pub win_rate: Option<Vec<WinShare>>,
    pub region_counts: Vec<RegionCount>,
    pub standings: Option<Standings>,
    pub head_to_head: Option<HeadToHead>,
    pub formations: FormationFrequency,
    pub goals_per_round: Vec<RoundGoals>,
    pub region_results: Vec<RegionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Dashboard {
    NoData,
    Ready(DashboardViews),
}

impl Dashboard {
    pub fn compute(matches: &[&MatchRecord], selection: &ViewSelection) -> Self {
        if matches.is_empty() {
            return Dashboard::NoData;
        }
        Dashboard::Ready(DashboardViews {
            matches: matches.len(),
            win_rate: win_rate_distribution(matches),
            region_counts: region_match_counts(matches),
            standings: selection
                .standings_team
                .as_deref()
                .map(|team| cumulative_standings(matches, team)),
            head_to_head: head_to_head(matches, &selection.compare),
            formations: formation_frequency(matches),
            goals_per_round: goals_per_round(matches),
            region_results: region_results(matches),
        })
    }

    pub fn views(&self) -> Option<&DashboardViews> {
        match self {
            Dashboard::NoData => None,
            Dashboard::Ready(views) => Some(views),
        }
    }
}
