use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use serde::Serialize;

use crate::dataset::loader::COLUMNS;
use crate::dataset::table::{percentage, GroupBy, Table};
use crate::dataset::title::is_placeholder;
use crate::domain::evidence::serialize_ranked;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailLevel {
    #[default]
    Basic,
    Detailed,
    Full,
}

impl FromStr for DetailLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "basic" => Ok(Self::Basic),
            "detailed" => Ok(Self::Detailed),
            "full" => Ok(Self::Full),
            other => Err(format!("unknown detail level `{other}` (expected basic|detailed|full)")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DatasetInfo {
    pub status: &'static str,
    pub source: String,
    pub detail_level: DetailLevel,
    pub row_count: usize,
    pub columns: Vec<&'static str>,
    pub summary: DatasetSummary,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total_titles: usize,
    pub movies: usize,
    pub tv_shows: usize,
    pub year_range: Option<YearRange>,
    pub unique_countries: usize,
    pub unique_genres: usize,
    #[serde(flatten)]
    pub detailed: Option<DetailedSummary>,
    #[serde(flatten)]
    pub full: Option<FullSummary>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub earliest: i32,
    pub latest: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DetailedSummary {
    #[serde(serialize_with = "serialize_ranked")]
    pub top_countries: Vec<(String, u64)>,
    #[serde(serialize_with = "serialize_ranked")]
    pub top_genres: Vec<(String, u64)>,
    #[serde(serialize_with = "serialize_ranked")]
    pub rating_distribution: Vec<(String, u64)>,
    pub recent_years: BTreeMap<i32, u64>,
    pub average_release_year: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FullSummary {
    pub missing_values: BTreeMap<String, u64>,
    pub duplicate_titles: usize,
    pub unique_directors: usize,
    pub international_percentage: f64,
    pub most_common_rating: Option<String>,
    pub rows_dropped: u64,
}

const TOP_LIMIT: usize = 10;

pub fn describe(table: &Table, level: DetailLevel) -> DatasetInfo {
    let detailed = matches!(level, DetailLevel::Detailed | DetailLevel::Full);
    let full = level == DetailLevel::Full;

    let summary = DatasetSummary {
        total_titles: table.len(),
        movies: table.movies(),
        tv_shows: table.tv_shows(),
        year_range: table.year_range().map(|(earliest, latest)| YearRange { earliest, latest }),
        unique_countries: table.distinct(GroupBy::Country),
        unique_genres: table.distinct(GroupBy::Genre),
        detailed: detailed.then(|| detailed_summary(table)),
        full: full.then(|| full_summary(table)),
    };

    DatasetInfo {
        status: "success",
        source: table.source().to_string(),
        detail_level: level,
        row_count: table.len(),
        columns: COLUMNS.to_vec(),
        summary,
    }
}

fn detailed_summary(table: &Table) -> DetailedSummary {
    let mut recent_years = BTreeMap::new();
    let mut by_year = table.group_counts(GroupBy::ReleaseYear);
    by_year.sort_by(|left, right| right.0.cmp(&left.0));
    for (year, count) in by_year.into_iter().take(TOP_LIMIT) {
        if let Ok(year) = year.parse::<i32>() {
            recent_years.insert(year, count);
        }
    }

    DetailedSummary {
        top_countries: table.top(GroupBy::Country, TOP_LIMIT),
        top_genres: table.top(GroupBy::Genre, TOP_LIMIT),
        rating_distribution: table.group_counts(GroupBy::Rating),
        recent_years,
        average_release_year: table.average_release_year(),
    }
}

fn full_summary(table: &Table) -> FullSummary {
    let mut title_counts: HashMap<&str, usize> = HashMap::new();
    for title in table.titles() {
        *title_counts.entry(title.title.as_str()).or_default() += 1;
    }
    let duplicate_titles = title_counts.values().filter(|count| **count > 1).count();

    let mut directors: Vec<&str> = table
        .titles()
        .iter()
        .flat_map(|title| title.director.split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty() && !is_placeholder(name))
        .collect();
    directors.sort_unstable();
    directors.dedup();

    let international = table.count_where(|title| {
        title.countries().next().is_some() && !title.has_country("united states")
    });

    let report = table.report();

    FullSummary {
        missing_values: report.missing_values.clone(),
        duplicate_titles,
        unique_directors: directors.len(),
        international_percentage: percentage(international as u64, table.len() as u64),
        most_common_rating: table.top(GroupBy::Rating, 1).into_iter().next().map(|(name, _)| name),
        rows_dropped: report.rows_missing_title_or_type + report.duplicates_dropped,
    }
}
