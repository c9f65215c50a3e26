use marquee_core::dataset::{Table, Title};
use marquee_core::domain::{Audience, Category, DraftAnswer, Evidence, EvidenceValue, Query};
use marquee_core::errors::PipelineError;

use crate::handlers::{genres_in, nationality_in, suitable_for, CategoryHandler, FAMILY_RATINGS};
use crate::text::{matches_keyword, normalize_text};

const MAX_PICKS: usize = 5;

/// Audience-aware picks, newest first, from the genres named in the question.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecommendationHandler;

/// A general-audience question that mentions children is answered as a kids question.
fn effective_audience(query: &Query, normalized: &str) -> Audience {
    let audience = query.audience();
    if audience == Audience::General
        && ["kid*", "child*", "toddler*"].iter().any(|keyword| matches_keyword(normalized, keyword))
    {
        return Audience::Kids;
    }
    if audience == Audience::General && matches_keyword(normalized, "family") {
        return Audience::Family;
    }
    audience
}

fn rating_filter(audience: Audience) -> Vec<String> {
    match audience {
        Audience::Kids | Audience::Family => {
            FAMILY_RATINGS.iter().map(|rating| (*rating).to_owned()).collect()
        }
        Audience::Teen => vec!["excludes R, NC-17 and TV-MA".to_owned()],
        Audience::General | Audience::Adult => Vec::new(),
    }
}

fn pick_line(title: &Title) -> String {
    format!("{} [{}]", title.summary_line(), title.rating)
}

impl CategoryHandler for RecommendationHandler {
    fn category(&self) -> Category {
        Category::Recommendation
    }

    fn handle(&self, query: &Query, table: &Table) -> Result<DraftAnswer, PipelineError> {
        let normalized = normalize_text(query.text());
        let audience = effective_audience(query, &normalized);
        let mut preferences: Vec<&str> = genres_in(&normalized)
            .into_iter()
            .filter(|genre| !matches!(*genre, "Family" | "Kids"))
            .collect();
        let nationality = nationality_in(&normalized);
        if let Some((adjective, _)) = nationality {
            preferences.push(adjective);
        }

        let mut candidates: Vec<&Title> = table
            .titles()
            .iter()
            .filter(|title| suitable_for(audience, title))
            .filter(|title| {
                preferences.is_empty()
                    || preferences.iter().any(|preference| match nationality {
                        Some((adjective, country)) if *preference == adjective => {
                            title.has_country(country)
                        }
                        _ => title.has_genre(preference),
                    })
            })
            .collect();

        if candidates.is_empty() {
            return Err(PipelineError::NoMatchingData(format!(
                "no {} titles for a {} audience",
                if preferences.is_empty() { "suitable".to_owned() } else { preferences.join("/") },
                audience.as_str()
            )));
        }

        candidates.sort_by(|left, right| {
            right.release_year.cmp(&left.release_year).then_with(|| left.title.cmp(&right.title))
        });
        let candidate_count = candidates.len() as u64;
        let picks: Vec<String> =
            candidates.iter().take(MAX_PICKS).map(|title| pick_line(title)).collect();

        let basis = if preferences.is_empty() {
            "the newest titles".to_owned()
        } else {
            format!("your interest in {}", preferences.join(", ").to_lowercase())
        };
        let text = format!(
            "Here are {} picks for a {} audience based on {basis}: {}.",
            picks.len(),
            audience.as_str(),
            picks.join("; ")
        );

        let evidence = Evidence::new()
            .with("audience", EvidenceValue::Text(audience.as_str().to_owned()))
            .with("rating_filter", EvidenceValue::List(rating_filter(audience)))
            .with(
                "preferences",
                EvidenceValue::List(
                    preferences.iter().map(|preference| (*preference).to_owned()).collect(),
                ),
            )
            .with("candidate_count", EvidenceValue::Count(candidate_count))
            .with("recommendations", EvidenceValue::List(picks));

        Ok(DraftAnswer::new(Category::Recommendation, text, evidence))
    }
}
