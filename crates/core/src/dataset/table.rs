use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::dataset::title::{is_placeholder, Title};
use crate::domain::evidence::{Evidence, EvidenceValue};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Country,
    Genre,
    Type,
    Rating,
    ReleaseYear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Count,
    Percentage,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatasetSource {
    Csv(PathBuf),
    Sample,
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv(path) => write!(f, "csv:{}", path.display()),
            Self::Sample => f.write_str("sample"),
        }
    }
}

/// What cleaning did while loading. Counts are per column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rows_read: u64,
    pub rows_missing_title_or_type: u64,
    pub duplicates_dropped: u64,
    pub missing_values: BTreeMap<String, u64>,
}

/// Immutable, cleaned catalog rows.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    titles: Vec<Title>,
    source: DatasetSource,
    report: LoadReport,
}

impl Table {
    pub fn new(titles: Vec<Title>, source: DatasetSource) -> Self {
        Self { titles, source, report: LoadReport::default() }
    }

    pub fn with_report(mut self, report: LoadReport) -> Self {
        self.report = report;
        self
    }

    pub fn titles(&self) -> &[Title] {
        &self.titles
    }

    pub fn source(&self) -> &DatasetSource {
        &self.source
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn filter<P>(&self, predicate: P) -> Table
    where
        P: Fn(&Title) -> bool,
    {
        Table {
            titles: self.titles.iter().filter(|title| predicate(title)).cloned().collect(),
            source: self.source.clone(),
            report: LoadReport::default(),
        }
    }

    pub fn count_where<P>(&self, predicate: P) -> usize
    where
        P: Fn(&Title) -> bool,
    {
        self.titles.iter().filter(|title| predicate(title)).count()
    }

    pub fn movies(&self) -> usize {
        self.count_where(Title::is_movie)
    }

    pub fn tv_shows(&self) -> usize {
        self.len() - self.movies()
    }

    pub fn year_range(&self) -> Option<(i32, i32)> {
        let min = self.titles.iter().map(|title| title.release_year).min()?;
        let max = self.titles.iter().map(|title| title.release_year).max()?;
        Some((min, max))
    }

    pub fn average_release_year(&self) -> Option<f64> {
        if self.titles.is_empty() {
            return None;
        }
        let sum: i64 = self.titles.iter().map(|title| i64::from(title.release_year)).sum();
        Some(round1(sum as f64 / self.titles.len() as f64))
    }

    /// Group sizes, largest first, ties by name. Placeholder values are not a group.
    /// Multi-valued columns (country, genre) count a title once per listed value.
    pub fn group_counts(&self, group_by: GroupBy) -> Vec<(String, u64)> {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for title in &self.titles {
            match group_by {
                GroupBy::Country => {
                    let unique: BTreeSet<&str> = title.countries().collect();
                    for country in unique {
                        *counts.entry(country.to_owned()).or_default() += 1;
                    }
                }
                GroupBy::Genre => {
                    let unique: BTreeSet<&str> = title.genres().collect();
                    for genre in unique {
                        *counts.entry(genre.to_owned()).or_default() += 1;
                    }
                }
                GroupBy::Type => *counts.entry(title.kind.as_str().to_owned()).or_default() += 1,
                GroupBy::Rating => {
                    if !is_placeholder(&title.rating) {
                        *counts.entry(title.rating.clone()).or_default() += 1;
                    }
                }
                GroupBy::ReleaseYear => {
                    *counts.entry(title.release_year.to_string()).or_default() += 1;
                }
            }
        }

        let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
        ranked.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(&right.0)));
        ranked
    }

    pub fn top(&self, group_by: GroupBy, limit: usize) -> Vec<(String, u64)> {
        let mut ranked = self.group_counts(group_by);
        ranked.truncate(limit);
        ranked
    }

    pub fn distinct(&self, group_by: GroupBy) -> usize {
        self.group_counts(group_by).len()
    }

    /// One evidence entry per group. Percentages use the whole table as denominator,
    /// so rows with a missing value still count toward the total.
    pub fn aggregate(&self, group_by: GroupBy, metric: Metric) -> Evidence {
        let total = self.len() as u64;
        let mut evidence = Evidence::new();
        for (name, count) in self.group_counts(group_by) {
            let value = match metric {
                Metric::Count => EvidenceValue::Count(count),
                Metric::Percentage => EvidenceValue::Percentage(percentage(count, total)),
            };
            evidence.insert(name, value);
        }
        evidence
    }
}

/// `part / total * 100`, rounded half away from zero to two decimals. Zero when `total` is zero.
pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(part as f64 * 100.0 / total as f64)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
