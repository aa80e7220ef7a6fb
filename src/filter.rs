use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dataset::{MatchDataset, MatchRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub round_range: (u32, u32),
    pub date_range: (NaiveDate, NaiveDate),
    pub regions: BTreeSet<String>,
    pub teams: BTreeSet<String>,
}

impl FilterCriteria {
    /// Full round and date range of the dataset, no region or team constraint.
    pub fn unconstrained(dataset: &MatchDataset) -> Self {
        let round_range = dataset.round_bounds().unwrap_or((1, u32::MAX));
        let date_range = dataset
            .date_bounds()
            .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
        Self {
            round_range,
            date_range,
            regions: BTreeSet::new(),
            teams: BTreeSet::new(),
        }
    }

    pub fn with_rounds(mut self, min: u32, max: u32) -> Self {
        self.round_range = (min, max);
        self
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = (start, end);
        self
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_teams<I, S>(mut self, teams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.teams = teams.into_iter().map(Into::into).collect();
        self
    }

    pub fn matches(&self, record: &MatchRecord) -> bool {
        let (min_round, max_round) = self.round_range;
        if record.round < min_round || record.round > max_round {
            return false;
        }
        let (start, end) = self.date_range;
        if record.date < start || record.date > end {
            return false;
        }
        if !self.regions.is_empty()
            && !self.regions.contains(&record.home_region)
            && !self.regions.contains(&record.away_region)
        {
            return false;
        }
        if !self.teams.is_empty()
            && !self.teams.contains(&record.home_team)
            && !self.teams.contains(&record.away_team)
        {
            return false;
        }
        true
    }
}

/// Records satisfying every active criterion, in dataset order.
pub fn apply<'a>(records: &'a [MatchRecord], criteria: &FilterCriteria) -> Vec<&'a MatchRecord> {
    records.iter().filter(|r| criteria.matches(r)).collect()
}

/// Clamp a requested round window to the dataset's rounds, keeping `min <= max`.
pub fn clamp_rounds(requested: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (lo, hi) = bounds;
    let min = requested.0.clamp(lo, hi);
    let max = requested.1.clamp(lo, hi);
    if min <= max { (min, max) } else { (max, min) }
}
