use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DRAW_SENTINEL: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Outcome {
    HomeWin,
    AwayWin,
    Draw,
}

/// Result of a match seen from one team's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TeamResult {
    Win,
    Draw,
    Loss,
}

impl TeamResult {
    pub fn points(self) -> u32 {
        match self {
            TeamResult::Win => 3,
            TeamResult::Draw => 1,
            TeamResult::Loss => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    pub round: u32,
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub home_region: String,
    pub away_region: String,
    pub home_score: u32,
    pub away_score: u32,
    pub outcome: Outcome,
    pub home_formation: Option<String>,
    pub away_formation: Option<String>,
}

impl MatchRecord {
    pub fn winner(&self) -> Option<&str> {
        match self.outcome {
            Outcome::HomeWin => Some(&self.home_team),
            Outcome::AwayWin => Some(&self.away_team),
            Outcome::Draw => None,
        }
    }

    pub fn involves_team(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }

    pub fn total_goals(&self) -> u32 {
        self.home_score + self.away_score
    }

    pub fn side_of(&self, team: &str) -> Option<Side> {
        if self.home_team == team {
            Some(Side::Home)
        } else if self.away_team == team {
            Some(Side::Away)
        } else {
            None
        }
    }

    pub fn result_for_side(&self, side: Side) -> TeamResult {
        match (self.outcome, side) {
            (Outcome::Draw, _) => TeamResult::Draw,
            (Outcome::HomeWin, Side::Home) | (Outcome::AwayWin, Side::Away) => TeamResult::Win,
            _ => TeamResult::Loss,
        }
    }

    pub fn result_for(&self, team: &str) -> Option<TeamResult> {
        self.side_of(team).map(|side| self.result_for_side(side))
    }

    pub fn region(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home_region,
            Side::Away => &self.away_region,
        }
    }

    pub fn formation(&self, side: Side) -> Option<&str> {
        let raw = match side {
            Side::Home => self.home_formation.as_deref(),
            Side::Away => self.away_formation.as_deref(),
        };
        raw.map(str::trim).filter(|f| !f.is_empty())
    }
}

// Column names follow the published championship CSV.
#[derive(Debug, Deserialize)]
struct RawMatchRow {
    rodada: u32,
    data: String,
    mandante: String,
    visitante: String,
    #[serde(rename = "mandante_Estado")]
    mandante_estado: String,
    #[serde(rename = "visitante_Estado")]
    visitante_estado: String,
    #[serde(rename = "mandante_Placar")]
    mandante_placar: u32,
    #[serde(rename = "visitante_Placar")]
    visitante_placar: u32,
    vencedor: String,
    #[serde(default)]
    formacao_mandante: Option<String>,
    #[serde(default)]
    formacao_visitante: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MatchDataset {
    records: Vec<MatchRecord>,
}

impl MatchDataset {
    pub fn from_records(records: Vec<MatchRecord>) -> Self {
        Self { records }
    }

    pub fn load_csv(path: &Path, draw_sentinel: &str) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("open match csv {}", path.display()))?;
        Self::from_reader(file, draw_sentinel)
            .with_context(|| format!("load match csv {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R, draw_sentinel: &str) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();
        for (idx, row) in rdr.deserialize::<RawMatchRow>().enumerate() {
            let row_no = idx + 1;
            let raw = row.with_context(|| format!("row {row_no}: unreadable record"))?;
            let record = validate_row(raw, draw_sentinel)
                .with_context(|| format!("row {row_no}: malformed match"))?;
            records.push(record);
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn teams(&self) -> Vec<String> {
        self.records
            .iter()
            .flat_map(|r| [r.home_team.as_str(), r.away_team.as_str()])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn regions(&self) -> Vec<String> {
        self.records
            .iter()
            .flat_map(|r| [r.home_region.as_str(), r.away_region.as_str()])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn round_bounds(&self) -> Option<(u32, u32)> {
        let min = self.records.iter().map(|r| r.round).min()?;
        let max = self.records.iter().map(|r| r.round).max()?;
        Some((min, max))
    }

    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }
}

fn validate_row(raw: RawMatchRow, draw_sentinel: &str) -> Result<MatchRecord> {
    if raw.rodada == 0 {
        return Err(anyhow!("round must be >= 1"));
    }
    let date = parse_match_date(&raw.data)
        .ok_or_else(|| anyhow!("unparseable date {:?}", raw.data))?;
    if raw.mandante.is_empty() || raw.visitante.is_empty() {
        return Err(anyhow!("missing team name"));
    }

    let winner = raw.vencedor.trim();
    let outcome = if winner == draw_sentinel {
        Outcome::Draw
    } else if winner == raw.mandante {
        Outcome::HomeWin
    } else if winner == raw.visitante {
        Outcome::AwayWin
    } else {
        return Err(anyhow!(
            "winner {:?} is neither {:?} nor {:?}",
            winner,
            raw.mandante,
            raw.visitante
        ));
    };

    Ok(MatchRecord {
        round: raw.rodada,
        date,
        home_team: raw.mandante,
        away_team: raw.visitante,
        home_region: raw.mandante_estado,
        away_region: raw.visitante_estado,
        home_score: raw.mandante_placar,
        away_score: raw.visitante_placar,
        outcome,
        home_formation: raw.formacao_mandante.filter(|f| !f.trim().is_empty()),
        away_formation: raw.formacao_visitante.filter(|f| !f.trim().is_empty()),
    })
}

/// Day-first dates (`29/03/2003`), with ISO dates accepted as well.
pub fn parse_match_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    // Some exports carry a time component after the date.
    let date_part = trimmed.split_whitespace().next()?;
    ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::parse_match_date;
    use chrono::NaiveDate;

    #[test]
    fn parse_match_date_is_day_first() {
        assert_eq!(
            parse_match_date("02/03/2019"),
            NaiveDate::from_ymd_opt(2019, 3, 2)
        );
        assert_eq!(
            parse_match_date("2019-03-02"),
            NaiveDate::from_ymd_opt(2019, 3, 2)
        );
        assert_eq!(
            parse_match_date(" 29/03/2003 16:00 "),
            NaiveDate::from_ymd_opt(2003, 3, 29)
        );
        assert!(parse_match_date("31/02/2019").is_none());
        assert!(parse_match_date("").is_none());
    }
}
