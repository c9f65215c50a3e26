//! Category handlers. Every figure in a draft is computed here from the table; the
//! reasoning capability may only rephrase the text afterwards.

pub mod analytics;
pub mod discovery;
pub mod recommendation;
pub mod strategy;
pub mod support;

use marquee_core::dataset::{Table, Title};
use marquee_core::domain::{Audience, Category, DraftAnswer, Query};
use marquee_core::errors::PipelineError;

pub use analytics::AnalyticsHandler;
pub use discovery::DiscoveryHandler;
pub use recommendation::RecommendationHandler;
pub use strategy::StrategyHandler;
pub use support::SupportHandler;

pub trait CategoryHandler: Send + Sync {
    fn category(&self) -> Category;

    fn handle(&self, query: &Query, table: &Table) -> Result<DraftAnswer, PipelineError>;
}

static DISCOVERY: DiscoveryHandler = DiscoveryHandler;
static ANALYTICS: AnalyticsHandler = AnalyticsHandler;
static RECOMMENDATION: RecommendationHandler = RecommendationHandler;
static SUPPORT: SupportHandler = SupportHandler;
static STRATEGY: StrategyHandler = StrategyHandler;

pub fn handler_for(category: Category) -> &'static dyn CategoryHandler {
    match category {
        Category::Discovery => &DISCOVERY,
        Category::Analytics => &ANALYTICS,
        Category::Recommendation => &RECOMMENDATION,
        Category::Support => &SUPPORT,
        Category::Strategy => &STRATEGY,
    }
}

/// Nationality adjective in a query and the country name it refers to.
pub(crate) const NATIONALITIES: &[(&str, &str)] = &[
    ("korean", "Korea"),
    ("japanese", "Japan"),
    ("indian", "India"),
    ("spanish", "Spain"),
    ("british", "United Kingdom"),
    ("french", "France"),
    ("german", "Germany"),
    ("brazilian", "Brazil"),
    ("canadian", "Canada"),
    ("australian", "Australia"),
    ("mexican", "Mexico"),
    ("american", "United States"),
];

/// Finds the first nationality adjective (or plain country name) in normalized text.
pub(crate) fn nationality_in(normalized: &str) -> Option<(&'static str, &'static str)> {
    NATIONALITIES.iter().copied().find(|(adjective, country)| {
        normalized.contains(&format!(" {adjective} "))
            || normalized.contains(&format!(" {} ", country.to_lowercase()))
    })
}

/// Query words mapped to the genre fragment they select.
pub(crate) const GENRE_TERMS: &[(&str, &str)] = &[
    ("action", "Action"),
    ("adventure", "Adventure"),
    ("comedy", "Comed"),
    ("comedies", "Comed"),
    ("funny", "Comed"),
    ("drama", "Drama"),
    ("dramas", "Drama"),
    ("thriller", "Thriller"),
    ("thrillers", "Thriller"),
    ("horror", "Horror"),
    ("scary", "Horror"),
    ("romance", "Romantic"),
    ("romantic", "Romantic"),
    ("documentary", "Documentar"),
    ("documentaries", "Documentar"),
    ("anime", "Anime"),
    ("crime", "Crime"),
    ("fantasy", "Fantasy"),
    ("sci", "Sci-Fi"),
    ("family", "Family"),
    ("kids", "Kids"),
    ("animated", "Anime"),
];

pub(crate) fn genres_in(normalized: &str) -> Vec<&'static str> {
    let mut genres: Vec<&'static str> = Vec::new();
    for (term, genre) in GENRE_TERMS {
        if normalized.contains(&format!(" {term} ")) && !genres.contains(genre) {
            genres.push(genre);
        }
    }
    genres
}

pub const FAMILY_RATINGS: [&str; 6] = ["TV-Y", "TV-Y7", "TV-G", "G", "TV-PG", "PG"];
const TEEN_EXCLUDED_RATINGS: [&str; 3] = ["R", "NC-17", "TV-MA"];
const MATURE_GENRES: [&str; 3] = ["Horror", "Thriller", "Crime"];

/// Rating filter applied to any title list shown to an audience.
pub(crate) fn suitable_for(audience: Audience, title: &Title) -> bool {
    match audience {
        Audience::Kids | Audience::Family => {
            FAMILY_RATINGS.contains(&title.rating.as_str())
                && !MATURE_GENRES.iter().any(|genre| title.has_genre(genre))
        }
        Audience::Teen => !TEEN_EXCLUDED_RATINGS.contains(&title.rating.as_str()),
        Audience::General | Audience::Adult => true,
    }
}

pub(crate) fn format_breakdown(entries: &[(String, u64)]) -> String {
    entries.iter().map(|(name, count)| format!("{name} ({count})")).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
pub(crate) mod test_support {
    use marquee_core::dataset::{sample_table, Table};
    use marquee_core::domain::{Audience, Query, QueryContext};

    pub fn sample() -> Table {
        sample_table()
    }

    pub fn query(text: &str) -> Query {
        Query::new(text, QueryContext::default()).expect("valid query")
    }

    pub fn query_for(text: &str, audience: Audience) -> Query {
        Query::new(text, QueryContext::for_audience(audience)).expect("valid query")
    }
}

#[cfg(test)]
mod tests {
    use marquee_core::domain::Category;

    use super::{genres_in, handler_for, nationality_in};
    use crate::text::normalize_text;

    #[test]
    fn every_category_has_a_handler() {
        for category in Category::PRIORITY {
            assert_eq!(handler_for(category).category(), category);
        }
    }

    #[test]
    fn nationality_and_genre_vocabulary() {
        let normalized = normalize_text("Korean romantic comedies");
        assert_eq!(nationality_in(&normalized), Some(("korean", "Korea")));
        assert_eq!(genres_in(&normalized), vec!["Comed", "Romantic"]);
        assert_eq!(nationality_in(&normalize_text("titles from Japan")), Some(("japanese", "Japan")));
    }
}
