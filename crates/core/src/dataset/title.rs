use std::fmt;

use serde::{Deserialize, Serialize};

pub const UNKNOWN_DIRECTOR: &str = "Unknown Director";
pub const UNKNOWN_CAST: &str = "Unknown Cast";
pub const UNKNOWN_COUNTRY: &str = "Unknown Country";
pub const UNKNOWN_DATE: &str = "Unknown Date";
pub const NOT_RATED: &str = "Not Rated";
pub const UNKNOWN_DURATION: &str = "Unknown Duration";
pub const UNKNOWN_GENRE: &str = "Unknown Genre";
pub const NO_DESCRIPTION: &str = "No description available";
pub const UNKNOWN_SHOW_ID: &str = "unknown_id";
pub const DEFAULT_RELEASE_YEAR: i32 = 2020;

const PLACEHOLDERS: [&str; 8] = [
    UNKNOWN_DIRECTOR,
    UNKNOWN_CAST,
    UNKNOWN_COUNTRY,
    UNKNOWN_DATE,
    NOT_RATED,
    UNKNOWN_DURATION,
    UNKNOWN_GENRE,
    NO_DESCRIPTION,
];

/// Placeholders stand in for missing values and never count as a group of their own.
pub fn is_placeholder(value: &str) -> bool {
    PLACEHOLDERS.contains(&value)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TitleKind {
    Movie,
    TvShow,
}

impl TitleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "Movie",
            Self::TvShow => "TV Show",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "movie" | "film" => Some(Self::Movie),
            "tv show" | "tv" | "show" | "series" => Some(Self::TvShow),
            _ => None,
        }
    }
}

impl fmt::Display for TitleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    pub show_id: String,
    pub kind: TitleKind,
    pub title: String,
    pub director: String,
    pub cast: String,
    pub country: String,
    pub date_added: String,
    pub release_year: i32,
    pub rating: String,
    pub duration: String,
    pub listed_in: String,
    pub description: String,
}

impl Title {
    pub fn is_movie(&self) -> bool {
        self.kind == TitleKind::Movie
    }

    pub fn genres(&self) -> impl Iterator<Item = &str> {
        split_known(&self.listed_in)
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        split_known(&self.country)
    }

    pub fn has_country(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.countries().any(|country| country.to_lowercase().contains(&needle))
    }

    pub fn has_genre(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.genres().any(|genre| genre.to_lowercase().contains(&needle))
    }

    /// `Title (year) - genres`, the form used in answer listings.
    pub fn summary_line(&self) -> String {
        format!("{} ({}) - {}", self.title, self.release_year, self.listed_in)
    }
}

fn split_known(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|part| !part.is_empty() && !is_placeholder(part))
}

#[cfg(test)]
pub(crate) fn fixture(title: &str, kind: TitleKind, country: &str, year: i32) -> Title {
    Title {
        show_id: format!("t-{}", title.to_lowercase().replace(' ', "-")),
        kind,
        title: title.to_owned(),
        director: UNKNOWN_DIRECTOR.to_owned(),
        cast: UNKNOWN_CAST.to_owned(),
        country: country.to_owned(),
        date_added: UNKNOWN_DATE.to_owned(),
        release_year: year,
        rating: "TV-MA".to_owned(),
        duration: "90 min".to_owned(),
        listed_in: "Dramas".to_owned(),
        description: NO_DESCRIPTION.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::{fixture, is_placeholder, TitleKind, UNKNOWN_COUNTRY};

    #[test]
    fn placeholders_are_skipped_when_splitting() {
        let mut title = fixture("Kingdom", TitleKind::TvShow, "South Korea, United States", 2019);
        title.listed_in = "International TV Shows, TV Dramas, ".to_owned();

        assert_eq!(title.countries().collect::<Vec<_>>(), vec!["South Korea", "United States"]);
        assert_eq!(title.genres().count(), 2);
        assert!(title.has_country("korea"));

        title.country = UNKNOWN_COUNTRY.to_owned();
        assert_eq!(title.countries().count(), 0);
        assert!(is_placeholder(UNKNOWN_COUNTRY));
    }

    #[test]
    fn kind_parsing_accepts_catalog_labels() {
        assert_eq!(TitleKind::parse("TV Show"), Some(TitleKind::TvShow));
        assert_eq!(TitleKind::parse(" movie "), Some(TitleKind::Movie));
        assert_eq!(TitleKind::parse("podcast"), None);
    }
}
