use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use chrono::NaiveDate;

use crate::dataset::{DEFAULT_DRAW_SENTINEL, MatchDataset, parse_match_date};
use crate::filter::FilterCriteria;
use crate::views::ViewSelection;

const DEFAULT_CSV_PATH: &str = "data/campeonato-brasileiro.csv";
const DEFAULT_ROUNDS: (u32, u32) = (1, 10);

#[derive(Debug, Clone)]
pub struct DashConfig {
    pub csv_path: PathBuf,
    pub draw_sentinel: String,
    pub initial_rounds: (u32, u32),
    pub export_dir: PathBuf,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            draw_sentinel: DEFAULT_DRAW_SENTINEL.to_string(),
            initial_rounds: DEFAULT_ROUNDS,
            export_dir: PathBuf::from("."),
        }
    }
}

impl DashConfig {
    /// Reads `BRASILEIRAO_*` variables, falling back to defaults for anything
    /// missing or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let csv_path = env_nonempty("BRASILEIRAO_CSV")
            .map(PathBuf::from)
            .unwrap_or(defaults.csv_path);
        let draw_sentinel =
            env_nonempty("BRASILEIRAO_DRAW_SENTINEL").unwrap_or(defaults.draw_sentinel);
        let initial_rounds = env_nonempty("BRASILEIRAO_ROUNDS")
            .and_then(|raw| parse_round_range(&raw))
            .unwrap_or(defaults.initial_rounds);
        let export_dir = env_nonempty("BRASILEIRAO_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.export_dir);
        Self {
            csv_path,
            draw_sentinel,
            initial_rounds,
            export_dir,
        }
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

/// Parses `"3-12"` (or a single round `"7"`) into an inclusive range.
pub fn parse_round_range(raw: &str) -> Option<(u32, u32)> {
    let raw = raw.trim();
    let (min, max) = match raw.split_once('-') {
        Some((a, b)) => (a.trim().parse::<u32>().ok()?, b.trim().parse::<u32>().ok()?),
        None => {
            let round = raw.parse::<u32>().ok()?;
            (round, round)
        }
    };
    (min <= max).then_some((min, max))
}

/// Splits a comma separated list, dropping blanks.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

const VALUE_FLAGS: &[&str] = &[
    "--csv",
    "--rounds",
    "--from",
    "--to",
    "--region",
    "--team",
    "--standings",
    "--compare",
    "--xlsx",
];

/// Command line of the report binary. Flags take `--flag=value` or
/// `--flag value`; anything unknown or missing a value is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportArgs {
    pub csv: Option<PathBuf>,
    pub rounds: Option<(u32, u32)>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub regions: Vec<String>,
    pub teams: Vec<String>,
    pub standings: Option<String>,
    pub compare: Vec<String>,
    pub json: bool,
    pub xlsx: Option<PathBuf>,
    pub help: bool,
}

impl ReportArgs {
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut out = Self::default();
        let mut idx = 0;
        while idx < args.len() {
            let arg = args[idx].as_str();
            idx += 1;
            match arg {
                "--help" | "-h" => {
                    out.help = true;
                    continue;
                }
                "--json" => {
                    out.json = true;
                    continue;
                }
                _ => {}
            }

            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) => (flag, Some(value)),
                None => (arg, None),
            };
            if !VALUE_FLAGS.contains(&flag) {
                bail!("unknown argument {arg:?}");
            }
            let value = match inline {
                Some(value) => value,
                None => {
                    let next = args.get(idx).map(String::as_str).unwrap_or("");
                    if !next.starts_with("--") {
                        idx += 1;
                    }
                    next
                }
            };
            let value = value.trim();
            if value.is_empty() || value.starts_with("--") {
                bail!("missing value for {flag}");
            }
            out.set(flag, value)?;
        }
        Ok(out)
    }

    fn set(&mut self, flag: &str, value: &str) -> Result<()> {
        match flag {
            "--csv" => self.csv = Some(PathBuf::from(value)),
            "--rounds" => {
                let range = parse_round_range(value)
                    .ok_or_else(|| anyhow!("invalid --rounds {value:?}"))?;
                self.rounds = Some(range);
            }
            "--from" => {
                let date =
                    parse_match_date(value).ok_or_else(|| anyhow!("invalid --from {value:?}"))?;
                self.from = Some(date);
            }
            "--to" => {
                let date =
                    parse_match_date(value).ok_or_else(|| anyhow!("invalid --to {value:?}"))?;
                self.to = Some(date);
            }
            "--region" => self.regions = parse_list(value),
            "--team" => self.teams = parse_list(value),
            "--standings" => self.standings = Some(value.to_string()),
            "--compare" => self.compare = parse_list(value),
            "--xlsx" => self.xlsx = Some(PathBuf::from(value)),
            _ => bail!("unknown argument {flag:?}"),
        }
        Ok(())
    }

    /// Full dataset range unless narrowed by `--rounds`, `--from` or `--to`.
    pub fn criteria(&self, dataset: &MatchDataset) -> FilterCriteria {
        let mut criteria = FilterCriteria::unconstrained(dataset);
        if let Some((min, max)) = self.rounds {
            criteria = criteria.with_rounds(min, max);
        }
        let (start, end) = criteria.date_range;
        criteria
            .with_dates(self.from.unwrap_or(start), self.to.unwrap_or(end))
            .with_regions(self.regions.iter().cloned())
            .with_teams(self.teams.iter().cloned())
    }

    pub fn selection(&self) -> ViewSelection {
        ViewSelection {
            standings_team: self.standings.clone(),
            compare: self.compare.clone(),
        }
    }
}
