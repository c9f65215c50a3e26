use marquee_core::dataset::{Table, Title, TitleKind};
use marquee_core::domain::{Category, DraftAnswer, Evidence, EvidenceValue, Query};
use marquee_core::errors::PipelineError;

use crate::handlers::{nationality_in, suitable_for, CategoryHandler, GENRE_TERMS};
use crate::text::{normalize_text, tokenize};

const MAX_LISTED: usize = 10;
const MAX_IN_TEXT: usize = 5;

const STOPWORDS: &[&str] = &[
    "find", "search", "searching", "show", "shows", "me", "looking", "for", "the", "a", "an",
    "some", "movie", "movies", "film", "films", "series", "tv", "about", "with", "what", "are",
    "there", "any", "discover", "browse", "list", "titles", "title", "content", "catalog", "i",
    "want", "to", "watch", "in", "of", "and", "or", "by", "directed", "starring", "please",
    "good", "best", "that", "is", "can", "you", "released", "after", "since", "before", "from",
    "all", "do", "have", "we", "our", "featuring", "like", "similar", "new", "my",
];

/// Title search over names, genres, people and descriptions.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscoveryHandler;

#[derive(Debug, Default, PartialEq)]
struct SearchFilters {
    terms: Vec<String>,
    kind: Option<TitleKind>,
    min_year: Option<i32>,
    max_year: Option<i32>,
}

impl SearchFilters {
    fn parse(normalized: &str) -> Self {
        let tokens = tokenize(normalized);
        let mut filters = Self::default();

        let wants_movies =
            tokens.iter().any(|token| matches!(*token, "movie" | "movies" | "film" | "films"));
        let wants_shows = tokens.iter().any(|token| matches!(*token, "show" | "shows" | "series" | "tv"))
            && !normalized.contains(" show me ");
        filters.kind = match (wants_movies, wants_shows) {
            (true, false) => Some(TitleKind::Movie),
            (false, true) => Some(TitleKind::TvShow),
            _ => None,
        };

        for window in tokens.windows(2) {
            let Ok(year) = window[1].parse::<i32>() else {
                continue;
            };
            match window[0] {
                "after" => filters.min_year = year.checked_add(1),
                "since" | "from" => filters.min_year = Some(year),
                "before" => filters.max_year = year.checked_sub(1),
                _ => {}
            }
        }

        for token in tokens {
            let numeric = token.chars().all(|ch| ch.is_ascii_digit());
            if token.len() < 3 || STOPWORDS.contains(&token) || numeric {
                continue;
            }
            if !filters.terms.iter().any(|term| term == token) {
                filters.terms.push(token.to_owned());
            }
        }
        filters
    }

    fn has_constraints(&self) -> bool {
        !self.terms.is_empty()
            || self.kind.is_some()
            || self.min_year.is_some()
            || self.max_year.is_some()
    }

    fn admits(&self, title: &Title) -> bool {
        self.kind.map_or(true, |kind| title.kind == kind)
            && self.min_year.map_or(true, |year| title.release_year >= year)
            && self.max_year.map_or(true, |year| title.release_year <= year)
    }

    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.terms.is_empty() {
            parts.push(format!("terms={}", self.terms.join(" ")));
        }
        if let Some(kind) = self.kind {
            parts.push(format!("type={}", kind.as_str()));
        }
        if let Some(year) = self.min_year {
            parts.push(format!("from={year}"));
        }
        if let Some(year) = self.max_year {
            parts.push(format!("until={year}"));
        }
        parts.join(", ")
    }
}

fn term_matches(term: &str, title: &Title) -> bool {
    let padded = format!(" {term} ");
    if let Some((adjective, country)) = nationality_in(&padded) {
        return title.has_country(country) || title.has_genre(adjective);
    }
    if let Some((_, genre)) = GENRE_TERMS.iter().find(|(word, _)| *word == term) {
        return title.has_genre(genre);
    }

    let stem = if term.len() > 4 { term.trim_end_matches('s') } else { term };
    [&title.title, &title.director, &title.cast, &title.listed_in, &title.description, &title.country]
        .iter()
        .any(|field| field.to_lowercase().contains(stem))
}

impl CategoryHandler for DiscoveryHandler {
    fn category(&self) -> Category {
        Category::Discovery
    }

    fn handle(&self, query: &Query, table: &Table) -> Result<DraftAnswer, PipelineError> {
        let filters = SearchFilters::parse(&normalize_text(query.text()));
        if !filters.has_constraints() {
            return Err(PipelineError::NoMatchingData("no search terms in the question".to_owned()));
        }

        let audience = query.audience();
        let mut scored: Vec<(usize, &Title)> = table
            .titles()
            .iter()
            .filter(|title| filters.admits(title) && suitable_for(audience, title))
            .map(|title| {
                let score = filters.terms.iter().filter(|term| term_matches(term, title)).count();
                (score, title)
            })
            .collect();

        let required = filters.terms.len();
        let full_matches = scored.iter().filter(|(score, _)| *score == required).count();
        let partial = full_matches == 0 && required > 1;
        if partial {
            scored.retain(|(score, _)| *score > 0);
        } else {
            scored.retain(|(score, _)| *score == required);
        }
        if scored.is_empty() {
            let detail = format!("no titles matched {}", filters.describe());
            return Err(PipelineError::NoMatchingData(detail));
        }

        scored.sort_by(|left, right| {
            right
                .0
                .cmp(&left.0)
                .then_with(|| right.1.release_year.cmp(&left.1.release_year))
                .then_with(|| left.1.title.cmp(&right.1.title))
        });

        let lines: Vec<String> =
            scored.iter().take(MAX_LISTED).map(|(_, title)| title.summary_line()).collect();
        let match_count = scored.len() as u64;

        let lead = if partial {
            format!("No title matched every term, but {match_count} titles matched some of them")
        } else {
            format!("Found {match_count} matching titles")
        };
        let text = format!(
            "{lead} ({}). Top results: {}.",
            filters.describe(),
            lines.iter().take(MAX_IN_TEXT).cloned().collect::<Vec<_>>().join("; ")
        );

        let evidence = Evidence::new()
            .with("match_count", EvidenceValue::Count(match_count))
            .with("matches", EvidenceValue::List(lines))
            .with("filters", EvidenceValue::Text(filters.describe()));

        let draft = DraftAnswer::new(Category::Discovery, text, evidence);
        if partial {
            return Ok(draft.with_note("partial match: not every search term matched"));
        }
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use marquee_core::dataset::TitleKind;
    use marquee_core::domain::Audience;
    use marquee_core::errors::PipelineError;

    use super::{DiscoveryHandler, SearchFilters};
    use crate::handlers::test_support::{query, query_for, sample};
    use crate::handlers::CategoryHandler;
    use crate::text::normalize_text;

    #[test]
    fn filters_parse_type_year_and_terms() {
        let filters = SearchFilters::parse(&normalize_text("Find Korean movies released after 2020"));

        assert_eq!(filters.kind, Some(TitleKind::Movie));
        assert_eq!(filters.min_year, Some(2021));
        assert_eq!(filters.terms, vec!["korean".to_owned()]);
    }

    #[test]
    fn year_at_the_integer_limit_drops_the_bound() {
        let filters = SearchFilters::parse(&normalize_text("Find movies after 2147483647"));
        assert_eq!(filters.min_year, None);
        assert_eq!(filters.kind, Some(TitleKind::Movie));

        let draft = DiscoveryHandler
            .handle(&query("Find movies after 2147483647"), &sample())
            .expect("movies without a year bound");
        assert!(draft.evidence.count("match_count").unwrap_or_default() > 0);
    }

    #[test]
    fn korean_search_lists_korean_titles_newest_first() {
        let draft = DiscoveryHandler.handle(&query("Find Korean movies"), &sample()).expect("matches");

        let count = draft.evidence.count("match_count").expect("count");
        assert!(count > 0);
        let Some(marquee_core::domain::EvidenceValue::List(lines)) = draft.evidence.get("matches") else {
            panic!("matches list missing");
        };
        assert!(lines.len() <= 10);
        assert!(lines.iter().all(|line| line.contains("Korean")));
        assert!(draft.text.starts_with("Found"));
    }

    #[test]
    fn cast_search_matches_people() {
        let draft =
            DiscoveryHandler.handle(&query("Show me titles starring Chris Hemsworth"), &sample()).expect("matches");
        assert!(draft.evidence.count("match_count").unwrap_or_default() > 0);
    }

    #[test]
    fn nothing_to_search_for_is_no_matching_data() {
        let result = DiscoveryHandler.handle(&query("find me some"), &sample());
        assert!(matches!(result, Err(PipelineError::NoMatchingData(_))));
    }

    #[test]
    fn unknown_terms_are_no_matching_data() {
        let result = DiscoveryHandler.handle(&query("find zyxwvut"), &sample());
        assert!(matches!(result, Err(PipelineError::NoMatchingData(_))));
    }

    #[test]
    fn kids_audience_only_sees_family_ratings() {
        let draft = DiscoveryHandler
            .handle(&query_for("find comedies", Audience::Kids), &sample())
            .expect("family comedies exist");
        assert!(draft.evidence.count("match_count").unwrap_or_default() > 0);
        assert!(!draft.text.contains("Horror"));
    }
}
