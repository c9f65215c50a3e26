//! Deterministic built-in catalog used when no CSV export is available.

use crate::dataset::table::{DatasetSource, Table};
use crate::dataset::title::{Title, TitleKind};

pub const SAMPLE_SIZE: usize = 200;
const MOVIE_COUNT: usize = 120;

const NAMED_TITLES: [&str; 53] = [
    "The Irishman",
    "Bird Box",
    "Extraction",
    "The Old Guard",
    "Enola Holmes",
    "Red Notice",
    "Don't Look Up",
    "The Adam Project",
    "The Gray Man",
    "Purple Hearts",
    "Glass Onion",
    "All Quiet on the Western Front",
    "The Sea Beast",
    "Pinocchio",
    "Blonde",
    "Squid Game: The Movie",
    "Money Heist: Korea",
    "The Call",
    "Space Sweepers",
    "Carter",
    "RRR",
    "Gangubai Kathiawadi",
    "Haseen Dillruba",
    "Shershaah",
    "Sardar Udham",
    "Stranger Things",
    "The Crown",
    "Ozark",
    "Bridgerton",
    "The Witcher",
    "Wednesday",
    "Monster: The Jeffrey Dahmer Story",
    "The Watcher",
    "Inventing Anna",
    "Maid",
    "Squid Game",
    "All of Us Are Dead",
    "Kingdom",
    "My Name",
    "Hellbound",
    "Money Heist",
    "Elite",
    "La Casa de Papel",
    "Control Z",
    "Who Killed Sara?",
    "The Kissing Booth",
    "To All the Boys I've Loved Before",
    "The Princess Switch",
    "A Christmas Prince",
    "The Knight Before Christmas",
    "Holiday in the Wild",
    "The Perfect Date",
    "Sierra Burgess Is a Loser",
];

const DIRECTORS: [&str; 10] = [
    "Martin Scorsese",
    "Susanne Bier",
    "Sam Hargrave",
    "Gina Prince-Bythewood",
    "Harry Bradbeer",
    "Rawson Marshall Thurber",
    "Adam McKay",
    "Shawn Levy",
    "Russo Brothers",
    "Julius Avery",
];

const CAST: [&str; 5] = [
    "Robert De Niro, Al Pacino, Joe Pesci",
    "Sandra Bullock, Trevante Rhodes",
    "Chris Hemsworth, Rudhraksh Jaiswal",
    "Charlize Theron, KiKi Layne",
    "Millie Bobby Brown, Henry Cavill",
];

const COUNTRIES: [(&str, usize); 12] = [
    ("United States", 80),
    ("South Korea", 30),
    ("United Kingdom", 20),
    ("Spain", 15),
    ("India", 15),
    ("Japan", 10),
    ("Germany", 8),
    ("France", 7),
    ("Brazil", 5),
    ("Canada", 5),
    ("Australia", 3),
    ("Mexico", 2),
];

const RELEASE_YEARS: [(i32, usize); 6] =
    [(2023, 40), (2022, 50), (2021, 45), (2020, 35), (2019, 20), (2018, 10)];

const RATINGS: [(&str, usize); 6] =
    [("TV-MA", 60), ("PG-13", 50), ("R", 30), ("TV-14", 25), ("PG", 20), ("TV-PG", 15)];

const MONTHS: [&str; 12] = [
    "January 1",
    "February 15",
    "March 10",
    "April 5",
    "May 20",
    "June 12",
    "July 8",
    "August 25",
    "September 14",
    "October 31",
    "November 18",
    "December 22",
];

const GENRES: [&str; 16] = [
    "Action & Adventure, Crime, Dramas",
    "Horror Movies, Thrillers",
    "Action & Adventure, International Movies",
    "Action & Adventure, Sci-Fi & Fantasy",
    "Children & Family Movies, Comedies",
    "Comedies, Romantic Movies",
    "Comedies, Dramas",
    "Action & Adventure, Thrillers",
    "Crime, Dramas, International Movies",
    "Documentaries, International Movies",
    "Horror Movies, International Movies, Thrillers",
    "International TV Shows, Korean TV Shows, TV Dramas",
    "International TV Shows, Spanish-Language TV Shows",
    "Kids' TV, TV Comedies",
    "Crime, International TV Shows, TV Dramas",
    "Anime, International TV Shows",
];

const MOODS: [&str; 5] = ["drama", "comedy", "thriller", "action", "romance"];

pub fn sample_table() -> Table {
    Table::new(sample_titles(), DatasetSource::Sample)
}

pub fn sample_titles() -> Vec<Title> {
    (0..SAMPLE_SIZE).map(sample_title).collect()
}

fn sample_title(idx: usize) -> Title {
    let kind = if idx < MOVIE_COUNT { TitleKind::Movie } else { TitleKind::TvShow };
    let country = pick_weighted(&COUNTRIES, idx);

    let title = match NAMED_TITLES.get(idx) {
        Some(name) => (*name).to_owned(),
        None => format!("Sample Title {}", idx + 1),
    };

    let listed_in = match country {
        "South Korea" => "International Movies, Korean Movies, Dramas",
        "Spain" => "International Movies, Spanish-Language Movies, Thrillers",
        "India" => "International Movies, Bollywood Movies, Dramas",
        _ => GENRES[idx % GENRES.len()],
    };
    let listed_in = match kind {
        TitleKind::Movie => listed_in.to_owned(),
        TitleKind::TvShow => listed_in.replace("Movies", "TV Shows"),
    };

    let duration = match kind {
        TitleKind::Movie => format!("{} min", 90 + (idx % 60)),
        TitleKind::TvShow => {
            let seasons = 1 + (idx - MOVIE_COUNT) % 5;
            if seasons == 1 {
                "1 Season".to_owned()
            } else {
                format!("{seasons} Seasons")
            }
        }
    };

    let theme = if idx % 2 == 0 {
        "family, love, and redemption"
    } else {
        "adventure, mystery, and discovery"
    };
    let form = if kind == TitleKind::Movie { "movie" } else { "series" };

    Title {
        show_id: format!("s{}", idx + 1),
        kind,
        title,
        director: DIRECTORS[idx % DIRECTORS.len()].to_owned(),
        cast: CAST[idx % CAST.len()].to_owned(),
        country: country.to_owned(),
        date_added: format!("{}, 2023", MONTHS[idx % MONTHS.len()]),
        release_year: pick_weighted(&RELEASE_YEARS, idx),
        rating: pick_weighted(&RATINGS, idx).to_owned(),
        duration,
        listed_in,
        description: format!(
            "An engaging {} with a compelling storyline. This {} explores themes of {}.",
            MOODS[idx % MOODS.len()],
            form,
            theme
        ),
    }
}

/// Value of the run that covers `idx` when the runs are laid end to end.
fn pick_weighted<T: Copy>(runs: &[(T, usize)], idx: usize) -> T {
    let mut offset = 0;
    for (value, len) in runs {
        offset += len;
        if idx < offset {
            return *value;
        }
    }
    runs[runs.len() - 1].0
}

#[cfg(test)]
mod tests {
    use crate::dataset::sample::{sample_table, SAMPLE_SIZE};
    use crate::dataset::table::GroupBy;

    #[test]
    fn sample_has_documented_shape() {
        let table = sample_table();

        assert_eq!(table.len(), SAMPLE_SIZE);
        assert_eq!(table.movies(), 120);
        assert_eq!(table.tv_shows(), 80);
        assert_eq!(table.year_range(), Some((2018, 2023)));

        let countries = table.group_counts(GroupBy::Country);
        assert_eq!(countries[0], ("United States".to_owned(), 80));
        assert_eq!(countries[1], ("South Korea".to_owned(), 30));
        assert_eq!(countries.len(), 12);

        let ratings = table.group_counts(GroupBy::Rating);
        assert_eq!(ratings[0], ("TV-MA".to_owned(), 60));
    }

    #[test]
    fn sample_is_deterministic_and_unique() {
        let first = sample_table();
        let second = sample_table();
        assert_eq!(first, second);

        let mut keys: Vec<_> =
            first.titles().iter().map(|title| (title.title.clone(), title.kind)).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), SAMPLE_SIZE);
    }

    #[test]
    fn korean_titles_carry_korean_genres() {
        let table = sample_table();
        let korean = table.filter(|title| title.has_country("korea"));

        assert_eq!(korean.len(), 30);
        assert!(korean.titles().iter().all(|title| title.listed_in.contains("Korean")));
    }
}
