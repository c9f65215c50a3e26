use marquee_core::dataset::{percentage, round2, GroupBy, Table, Title};
use marquee_core::domain::{Category, DraftAnswer, Evidence, EvidenceValue, Query};
use marquee_core::errors::PipelineError;

use crate::handlers::{genres_in, nationality_in, CategoryHandler};
use crate::text::normalize_text;

const WINDOW_YEARS: i32 = 3;
const MIN_TITLES_FOR_RANKING: u64 = 5;

/// Release momentum of a genre or national slate: the last three catalog years
/// against the three before.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrategyHandler;

#[derive(Clone, Debug, PartialEq)]
struct Momentum {
    subject: String,
    recent: u64,
    prior: u64,
    total: u64,
}

impl Momentum {
    fn measure<P>(table: &Table, subject: impl Into<String>, latest: i32, predicate: P) -> Self
    where
        P: Fn(&Title) -> bool,
    {
        let recent_from = latest - WINDOW_YEARS + 1;
        let prior_from = recent_from - WINDOW_YEARS;
        let mut momentum = Self { subject: subject.into(), recent: 0, prior: 0, total: 0 };
        for title in table.titles().iter().filter(|title| predicate(title)) {
            momentum.total += 1;
            if title.release_year >= recent_from && title.release_year <= latest {
                momentum.recent += 1;
            } else if title.release_year >= prior_from && title.release_year < recent_from {
                momentum.prior += 1;
            }
        }
        momentum
    }

    /// `None` when nothing was released in the prior window.
    fn growth(&self) -> Option<f64> {
        let (recent, prior) = (self.recent as f64, self.prior as f64);
        (self.prior > 0).then(|| round2((recent - prior) * 100.0 / prior))
    }
}

fn windows(latest: i32) -> (String, String) {
    let recent_from = latest - WINDOW_YEARS + 1;
    let prior_from = recent_from - WINDOW_YEARS;
    (format!("{recent_from}-{latest}"), format!("{prior_from}-{}", recent_from - 1))
}

fn assessment(momentum: &Momentum) -> &'static str {
    match momentum.growth() {
        None if momentum.recent > 0 => "This is a newly emerging area of the catalog.",
        None => "There is no recent release activity to build on.",
        Some(growth) if growth >= 25.0 => {
            "Release volume is accelerating, which supports evaluating further investment."
        }
        Some(growth) if growth > -10.0 => {
            "Release volume is roughly stable; performance data should guide further investment."
        }
        Some(_) => "Release volume is declining; review demand before committing more budget.",
    }
}

impl CategoryHandler for StrategyHandler {
    fn category(&self) -> Category {
        Category::Strategy
    }

    fn handle(&self, query: &Query, table: &Table) -> Result<DraftAnswer, PipelineError> {
        let Some((_, latest)) = table.year_range() else {
            return Err(PipelineError::NoMatchingData("the catalog is empty".to_owned()));
        };
        let normalized = normalize_text(query.text());
        let total = table.len() as u64;
        let (recent_window, prior_window) = windows(latest);

        let momentum = if let Some((adjective, country)) = nationality_in(&normalized) {
            let subject = format!("{adjective} content");
            Momentum::measure(table, subject, latest, |title| title.has_country(country))
        } else if let Some(genre) = genres_in(&normalized).first().copied() {
            let subject = genre_label(table, genre);
            Momentum::measure(table, subject, latest, |title| title.has_genre(genre))
        } else {
            fastest_growing_genre(table, latest)
                .ok_or_else(|| {
                    PipelineError::NoMatchingData("no genre has enough titles to rank".to_owned())
                })?
        };

        if momentum.total == 0 {
            let detail = format!("no titles for {}", momentum.subject);
            return Err(PipelineError::NoMatchingData(detail));
        }

        let share = percentage(momentum.total, total);
        let growth_text = match momentum.growth() {
            Some(growth) => format!("a change of {growth}% in release volume"),
            None => "no prior releases to compare against".to_owned(),
        };
        let text = format!(
            "{subject}: {recent} titles released in {recent_window} versus {prior} in \
             {prior_window}, {growth_text}. It accounts for {share}% of the catalog ({count} of \
             {total} titles). {assessment}",
            subject = momentum.subject,
            recent = momentum.recent,
            prior = momentum.prior,
            count = momentum.total,
            assessment = assessment(&momentum),
        );

        let mut evidence = Evidence::new()
            .with("genre", EvidenceValue::Text(momentum.subject.clone()))
            .with("recent_window", EvidenceValue::Text(recent_window))
            .with("recent_titles", EvidenceValue::Count(momentum.recent))
            .with("prior_titles", EvidenceValue::Count(momentum.prior));
        if let Some(growth) = momentum.growth() {
            evidence.insert("growth_percentage", EvidenceValue::Number(growth));
        }
        evidence.insert("catalog_share", EvidenceValue::Percentage(share));
        evidence.insert("matching_titles", EvidenceValue::Count(momentum.total));
        evidence.insert("total_titles", EvidenceValue::Count(total));

        Ok(DraftAnswer::new(Category::Strategy, text, evidence))
    }
}

/// Most common listed genre containing the fragment, used as the display name.
fn genre_label(table: &Table, fragment: &str) -> String {
    let needle = fragment.to_lowercase();
    table
        .group_counts(GroupBy::Genre)
        .into_iter()
        .map(|(name, _)| name)
        .find(|name| name.to_lowercase().contains(&needle))
        .unwrap_or_else(|| fragment.to_owned())
}

/// Highest growth among genres with enough titles; ties by recent volume, then name.
fn fastest_growing_genre(table: &Table, latest: i32) -> Option<Momentum> {
    table
        .group_counts(GroupBy::Genre)
        .into_iter()
        .filter(|(_, count)| *count >= MIN_TITLES_FOR_RANKING)
        .map(|(genre, _)| {
            let needle = genre.clone();
            Momentum::measure(table, genre, latest, move |title| {
                title.genres().any(|listed| listed == needle)
            })
        })
        .filter(|momentum| momentum.prior > 0)
        .max_by(|left, right| {
            let left_growth = left.growth().unwrap_or(f64::MIN);
            let right_growth = right.growth().unwrap_or(f64::MIN);
            left_growth
                .total_cmp(&right_growth)
                .then_with(|| left.recent.cmp(&right.recent))
                .then_with(|| right.subject.cmp(&left.subject))
        })
}
