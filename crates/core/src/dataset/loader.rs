use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use crate::dataset::table::{DatasetSource, LoadReport, Table};
use crate::dataset::title::{
    Title, TitleKind, DEFAULT_RELEASE_YEAR, NOT_RATED, NO_DESCRIPTION, UNKNOWN_CAST,
    UNKNOWN_COUNTRY, UNKNOWN_DATE, UNKNOWN_DIRECTOR, UNKNOWN_DURATION, UNKNOWN_GENRE,
    UNKNOWN_SHOW_ID,
};
use crate::dataset::DatasetError;

/// Columns of a `netflix_titles.csv` export, in file order.
pub const COLUMNS: [&str; 12] = [
    "show_id",
    "type",
    "title",
    "director",
    "cast",
    "country",
    "date_added",
    "release_year",
    "rating",
    "duration",
    "listed_in",
    "description",
];

const REQUIRED_COLUMNS: [&str; 2] = ["title", "type"];

pub fn load_csv(path: &Path) -> Result<Table, DatasetError> {
    if !path.exists() {
        return Err(DatasetError::NotFound { path: path.to_path_buf() });
    }
    let file = File::open(path)
        .map_err(|source| DatasetError::Open { path: path.to_path_buf(), source })?;
    let (titles, report) = read_titles(file, path)?;
    if titles.is_empty() {
        return Err(DatasetError::Empty { path: path.to_path_buf() });
    }

    info!(
        event_name = "dataset.loaded",
        path = %path.display(),
        rows = titles.len(),
        duplicates_dropped = report.duplicates_dropped,
        "catalog loaded from csv"
    );
    Ok(Table::new(titles, DatasetSource::Csv(path.to_path_buf())).with_report(report))
}

/// Parses and cleans catalog rows from any CSV reader. `origin` is only used in errors.
pub fn read_titles<R: Read>(
    reader: R,
    origin: &Path,
) -> Result<(Vec<Title>, LoadReport), DatasetError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader
        .headers()
        .map_err(|source| DatasetError::Parse { path: origin.to_path_buf(), line: 1, source })?
        .clone();
    let columns = ColumnIndex::new(&headers);

    for column in REQUIRED_COLUMNS {
        if columns.position(column).is_none() {
            return Err(DatasetError::MissingColumn {
                path: origin.to_path_buf(),
                column: column.to_owned(),
            });
        }
    }

    let mut report = LoadReport::default();
    let mut seen: HashSet<(String, TitleKind)> = HashSet::new();
    let mut titles = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|source| DatasetError::Parse {
            path: origin.to_path_buf(),
            line: idx + 2,
            source,
        })?;
        report.rows_read += 1;

        let Some(title) = clean_row(&columns, &record, &mut report.missing_values) else {
            report.rows_missing_title_or_type += 1;
            continue;
        };

        if !seen.insert((title.title.clone(), title.kind)) {
            debug!(title = %title.title, kind = title.kind.as_str(), "dropping duplicate row");
            report.duplicates_dropped += 1;
            continue;
        }
        titles.push(title);
    }

    Ok((titles, report))
}

struct ColumnIndex {
    positions: BTreeMap<String, usize>,
}

impl ColumnIndex {
    fn new(headers: &StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim().trim_start_matches('\u{feff}').to_lowercase(), idx))
            .collect();
        Self { positions }
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    fn get<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        self.position(column)
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

fn clean_row(
    columns: &ColumnIndex,
    record: &StringRecord,
    missing: &mut BTreeMap<String, u64>,
) -> Option<Title> {
    let title = columns.get(record, "title")?;
    let kind = columns.get(record, "type").and_then(TitleKind::parse)?;

    let mut text = |column: &str, placeholder: &str| -> String {
        match columns.get(record, column) {
            Some(value) => value.to_owned(),
            None => {
                *missing.entry(column.to_owned()).or_default() += 1;
                placeholder.to_owned()
            }
        }
    };

    let show_id = text("show_id", UNKNOWN_SHOW_ID);
    let director = text("director", UNKNOWN_DIRECTOR);
    let cast = text("cast", UNKNOWN_CAST);
    let country = text("country", UNKNOWN_COUNTRY);
    let date_added = text("date_added", UNKNOWN_DATE);
    let rating = text("rating", NOT_RATED);
    let duration = text("duration", UNKNOWN_DURATION);
    let listed_in = text("listed_in", UNKNOWN_GENRE);
    let description = text("description", NO_DESCRIPTION);

    let release_year = match columns.get(record, "release_year").and_then(parse_year) {
        Some(year) => year,
        None => {
            *missing.entry("release_year".to_owned()).or_default() += 1;
            DEFAULT_RELEASE_YEAR
        }
    };

    Some(Title {
        show_id,
        kind,
        title: title.to_owned(),
        director,
        cast,
        country,
        date_added,
        release_year,
        rating,
        duration,
        listed_in,
        description,
    })
}

fn parse_year(value: &str) -> Option<i32> {
    let parsed = value.parse::<i32>().ok().or_else(|| {
        value.parse::<f64>().ok().filter(|year| year.fract() == 0.0).map(|year| year as i32)
    })?;
    (1800..=2200).contains(&parsed).then_some(parsed)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use crate::dataset::loader::{load_csv, read_titles};
    use crate::dataset::title::{TitleKind, NOT_RATED, UNKNOWN_COUNTRY};
    use crate::dataset::DatasetError;

    const HEADER: &str = "show_id,type,title,director,cast,country,date_added,release_year,rating,duration,listed_in,description\n";

    #[test]
    fn cleaning_fills_placeholders_and_defaults_year() {
        let csv = format!(
            "{HEADER}s1,Movie,  Extraction ,Sam Hargrave,Chris Hemsworth,,\"April 24, 2020\",abc,,117 min,\"Action & Adventure\",Rescue.\n"
        );
        let (titles, report) =
            read_titles(csv.as_bytes(), Path::new("inline.csv")).expect("parse csv");

        assert_eq!(titles.len(), 1);
        let title = &titles[0];
        assert_eq!(title.title, "Extraction");
        assert_eq!(title.country, UNKNOWN_COUNTRY);
        assert_eq!(title.rating, NOT_RATED);
        assert_eq!(title.release_year, 2020);
        assert_eq!(report.missing_values.get("country"), Some(&1));
        assert_eq!(report.missing_values.get("release_year"), Some(&1));
    }

    #[test]
    fn rows_without_title_or_type_are_dropped_and_duplicates_keep_first() {
        let csv = format!(
            "{HEADER}s1,Movie,Kingdom,,,South Korea,,2019,TV-MA,,,first\n\
             s2,TV Show,Kingdom,,,South Korea,,2019,TV-MA,,,show\n\
             s3,Movie,Kingdom,,,Japan,,2020,TV-MA,,,second\n\
             s4,,Nameless Type,,,,,2020,,,,\n\
             s5,Movie,,,,,,2020,,,,\n"
        );
        let (titles, report) =
            read_titles(csv.as_bytes(), Path::new("inline.csv")).expect("parse csv");

        assert_eq!(titles.len(), 2);
        assert_eq!(titles[0].description, "first");
        assert_eq!(titles[1].kind, TitleKind::TvShow);
        assert_eq!(report.rows_read, 5);
        assert_eq!(report.duplicates_dropped, 1);
        assert_eq!(report.rows_missing_title_or_type, 2);
    }

    #[test]
    fn missing_required_column_is_reported() {
        let csv = "show_id,title\ns1,Kingdom\n";
        let result = read_titles(csv.as_bytes(), Path::new("inline.csv"));

        assert!(matches!(result, Err(DatasetError::MissingColumn { ref column, .. }) if column == "type"));
    }

    #[test]
    fn load_csv_reads_file_and_rejects_missing_path() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("netflix_titles.csv");
        fs::write(&path, format!("{HEADER}s1,Movie,RRR,,,India,,2022,TV-14,,Dramas,Epic.\n"))
            .expect("write csv");

        let table = load_csv(&path).expect("load csv");
        assert_eq!(table.len(), 1);
        assert_eq!(table.titles()[0].release_year, 2022);

        let missing = load_csv(&dir.path().join("absent.csv"));
        assert!(matches!(missing, Err(DatasetError::NotFound { .. })));
    }
}
