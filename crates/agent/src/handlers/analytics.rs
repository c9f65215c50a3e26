use marquee_core::dataset::{percentage, GroupBy, Metric, Table, Title, TitleKind};
use marquee_core::domain::{Category, DraftAnswer, Evidence, EvidenceValue, Query};
use marquee_core::errors::PipelineError;

use crate::handlers::{format_breakdown, nationality_in, CategoryHandler};
use crate::text::{matches_keyword, normalize_text};

const RECENT_FROM_YEAR: i32 = 2020;
const TREND_YEARS: std::ops::RangeInclusive<i32> = 2018..=2023;
const US: &str = "United States";

const SHARE_WORDS: &[&str] =
    &["percent*", "share", "proportion", "how many", "how much", "fraction", "portion"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pattern {
    NationalityShare(&'static str, &'static str),
    InternationalTrend,
    PopularGenres,
    CountryDistribution,
    MoviesVsShows,
    Overview,
}

fn detect(normalized: &str) -> Pattern {
    let any =
        |keywords: &[&str]| keywords.iter().any(|keyword| matches_keyword(normalized, keyword));

    let us_terms = ["us", "u s", "united states", "domestic", "american", "trend*"];
    if any(&["international"]) && any(&us_terms) {
        return Pattern::InternationalTrend;
    }
    if let Some((adjective, country)) = nationality_in(normalized) {
        if any(SHARE_WORDS) || any(&["content", "titles"]) {
            return Pattern::NationalityShare(adjective, country);
        }
    }
    if any(&["genre*", "categor*"]) {
        return Pattern::PopularGenres;
    }
    if any(&["countr*", "region*", "where"]) {
        return Pattern::CountryDistribution;
    }
    if any(&["movie*", "film*"]) && any(&["show*", "series"]) {
        return Pattern::MoviesVsShows;
    }
    Pattern::Overview
}

/// Catalog statistics computed from the table: shares, trends and distributions.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnalyticsHandler;

impl CategoryHandler for AnalyticsHandler {
    fn category(&self) -> Category {
        Category::Analytics
    }

    fn handle(&self, query: &Query, table: &Table) -> Result<DraftAnswer, PipelineError> {
        if table.is_empty() {
            return Err(PipelineError::NoMatchingData("the catalog is empty".to_owned()));
        }

        let draft = match detect(&normalize_text(query.text())) {
            Pattern::NationalityShare(adjective, country) => {
                nationality_share(table, adjective, country)
            }
            Pattern::InternationalTrend => international_trend(table),
            Pattern::PopularGenres => popular_genres(table),
            Pattern::CountryDistribution => country_distribution(table),
            Pattern::MoviesVsShows => movies_vs_shows(table),
            Pattern::Overview => overview(table),
        };
        Ok(draft)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn nationality_share(table: &Table, adjective: &str, country: &str) -> DraftAnswer {
    let matching = table.filter(|title| title.has_country(country));
    let total = table.len() as u64;
    let matching_titles = matching.len() as u64;
    let share = percentage(matching_titles, total);
    let top_genres = matching.top(GroupBy::Genre, 5);
    let recent = matching.count_where(|title| title.release_year >= RECENT_FROM_YEAR) as u64;
    let label = capitalize(adjective);

    let mut text = format!(
        "{share}% of the catalog is {label} content ({matching_titles} of {total} titles): \
         {} movies and {} TV shows.",
        matching.movies(),
        matching.tv_shows()
    );
    if !top_genres.is_empty() {
        text.push_str(&format!(" Leading genres: {}.", format_breakdown(&top_genres)));
    }
    text.push_str(&format!(
        " {recent} of these titles were released in {RECENT_FROM_YEAR} or later."
    ));

    let evidence = Evidence::new()
        .with("nationality", EvidenceValue::Text(label))
        .with("matching_titles", EvidenceValue::Count(matching_titles))
        .with("total_titles", EvidenceValue::Count(total))
        .with("percentage", EvidenceValue::Percentage(share))
        .with("movies", EvidenceValue::Count(matching.movies() as u64))
        .with("tv_shows", EvidenceValue::Count(matching.tv_shows() as u64))
        .with("top_genres", EvidenceValue::Breakdown(top_genres))
        .with("recent_titles", EvidenceValue::Count(recent));
    DraftAnswer::new(Category::Analytics, text, evidence)
}

fn is_us(title: &Title) -> bool {
    title.countries().any(|country| country == US)
}

/// Titles with a known country that do not list the United States.
fn is_international(title: &Title) -> bool {
    title.countries().next().is_some() && !is_us(title)
}

fn international_trend(table: &Table) -> DraftAnswer {
    let total = table.len() as u64;
    let us_titles = table.count_where(is_us) as u64;
    let international_titles = table.count_where(is_international) as u64;
    let us_share = percentage(us_titles, total);
    let international_share = percentage(international_titles, total);

    let mut yearly = Vec::new();
    for year in TREND_YEARS {
        let released = table.filter(|title| title.release_year == year);
        if released.is_empty() {
            continue;
        }
        let year_total = released.len() as u64;
        yearly.push(format!(
            "{year}: {year_total} titles, {}% US, {}% international",
            percentage(released.count_where(is_us) as u64, year_total),
            percentage(released.count_where(is_international) as u64, year_total)
        ));
    }

    let top_international = table.filter(is_international).top(GroupBy::Country, 5);
    let text = format!(
        "International titles make up {international_share}% of the catalog ({international_titles} \
         of {total}) against {us_share}% from the US ({us_titles}). By release year: {}.",
        yearly.join("; ")
    );

    let evidence = Evidence::new()
        .with("total_titles", EvidenceValue::Count(total))
        .with("us_titles", EvidenceValue::Count(us_titles))
        .with("international_titles", EvidenceValue::Count(international_titles))
        .with("us_percentage", EvidenceValue::Percentage(us_share))
        .with("international_percentage", EvidenceValue::Percentage(international_share))
        .with("yearly", EvidenceValue::List(yearly))
        .with("top_international_countries", EvidenceValue::Breakdown(top_international));
    DraftAnswer::new(Category::Analytics, text, evidence)
}

fn popular_genres(table: &Table) -> DraftAnswer {
    let total = table.len() as u64;
    let top = table.top(GroupBy::Genre, 10);
    let unique = table.distinct(GroupBy::Genre) as u64;
    let shares = table.aggregate(GroupBy::Genre, Metric::Percentage);
    let recent = table.filter(|title| title.release_year >= RECENT_FROM_YEAR).top(GroupBy::Genre, 5);

    let mut evidence = Evidence::new()
        .with("top_genres", EvidenceValue::Breakdown(top.clone()))
        .with("unique_genres", EvidenceValue::Count(unique));

    let text = match top.first() {
        Some((genre, count)) => {
            let share = shares.percentage(genre).unwrap_or_default();
            evidence.insert("top_genre", EvidenceValue::Text(genre.clone()));
            evidence.insert("top_genre_percentage", EvidenceValue::Percentage(share));
            format!(
                "The catalog spans {unique} genres. {genre} leads with {count} titles ({share}% of \
                 {total}). Top genres: {}.",
                format_breakdown(&top)
            )
        }
        None => format!("No genre information is recorded for the {total} titles in the catalog."),
    };
    evidence.insert("recent_top_genres", EvidenceValue::Breakdown(recent));
    DraftAnswer::new(Category::Analytics, text, evidence)
}

fn country_distribution(table: &Table) -> DraftAnswer {
    let total = table.len() as u64;
    let top = table.top(GroupBy::Country, 10);
    let unique = table.distinct(GroupBy::Country) as u64;
    let shares = table.aggregate(GroupBy::Country, Metric::Percentage);

    let mut evidence = Evidence::new()
        .with("top_countries", EvidenceValue::Breakdown(top.clone()))
        .with("unique_countries", EvidenceValue::Count(unique))
        .with("total_titles", EvidenceValue::Count(total));

    let text = match top.first() {
        Some((country, count)) => {
            let share = shares.percentage(country).unwrap_or_default();
            evidence.insert("top_country_percentage", EvidenceValue::Percentage(share));
            format!(
                "Titles come from {unique} countries. {country} contributes the most with {count} \
                 titles ({share}% of {total}). Top countries: {}.",
                format_breakdown(&top)
            )
        }
        None => {
            format!("No country information is recorded for the {total} titles in the catalog.")
        }
    };
    DraftAnswer::new(Category::Analytics, text, evidence)
}

fn movies_vs_shows(table: &Table) -> DraftAnswer {
    let total = table.len() as u64;
    let counts = table.aggregate(GroupBy::Type, Metric::Count);
    let shares = table.aggregate(GroupBy::Type, Metric::Percentage);
    let movies = counts.count(TitleKind::Movie.as_str()).unwrap_or_default();
    let tv_shows = counts.count(TitleKind::TvShow.as_str()).unwrap_or_default();
    let movie_share = shares.percentage(TitleKind::Movie.as_str()).unwrap_or_default();
    let show_share = shares.percentage(TitleKind::TvShow.as_str()).unwrap_or_default();

    let text = format!(
        "The catalog holds {movies} movies ({movie_share}%) and {tv_shows} TV shows ({show_share}%) \
         out of {total} titles."
    );
    let evidence = Evidence::new()
        .with("total_titles", EvidenceValue::Count(total))
        .with("movies", EvidenceValue::Count(movies))
        .with("tv_shows", EvidenceValue::Count(tv_shows))
        .with("movie_percentage", EvidenceValue::Percentage(movie_share))
        .with("tv_show_percentage", EvidenceValue::Percentage(show_share));
    DraftAnswer::new(Category::Analytics, text, evidence)
}

fn overview(table: &Table) -> DraftAnswer {
    let total = table.len() as u64;
    let movies = table.movies() as u64;
    let tv_shows = table.tv_shows() as u64;
    let unique_countries = table.distinct(GroupBy::Country) as u64;
    let unique_genres = table.distinct(GroupBy::Genre) as u64;

    let mut evidence = Evidence::new()
        .with("total_titles", EvidenceValue::Count(total))
        .with("movies", EvidenceValue::Count(movies))
        .with("tv_shows", EvidenceValue::Count(tv_shows))
        .with("unique_countries", EvidenceValue::Count(unique_countries))
        .with("unique_genres", EvidenceValue::Count(unique_genres));

    let mut text = format!(
        "The catalog contains {total} titles: {movies} movies and {tv_shows} TV shows from \
         {unique_countries} countries across {unique_genres} genres."
    );
    if let Some((earliest, latest)) = table.year_range() {
        evidence.insert("earliest_year", EvidenceValue::Count(earliest.max(0) as u64));
        evidence.insert("latest_year", EvidenceValue::Count(latest.max(0) as u64));
        text.push_str(&format!(" Release years range from {earliest} to {latest}."));
    }
    DraftAnswer::new(Category::Analytics, text, evidence)
}
