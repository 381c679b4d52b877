use std::collections::HashMap;
use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use super::model::{ColumnQuality, LoadReport, MovieRecord, MovieTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Default dataset: the movie-industry CSV the dashboard was built around.
pub const DEFAULT_DATASET_URI: &str =
    "https://raw.githubusercontent.com/danielgrijalva/movie-stats/master/movies.csv";

/// Columns the core requires.  Extra columns in the CSV are ignored.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "name", "genre", "year", "country", "score", "runtime", "budget",
];

/// Fatal loading failures.  Either one aborts dashboard startup: a query
/// must never run against a partially-loaded table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read movie dataset from {uri}: {reason}")]
    SourceUnavailable { uri: String, reason: String },

    #[error("dataset at {uri} is missing required column(s): {missing:?}")]
    SchemaMismatch { uri: String, missing: Vec<String> },
}

/// Load the movie dataset from an `http(s)` URI or a local file path.
///
/// Returns the cleaned, immutable table together with the data-quality
/// report (shape, per-column missing values, duplicate count).  The report
/// is also written to the log so a headless operator sees it.
pub fn load(source: &str) -> Result<(MovieTable, LoadReport), LoadError> {
    let text = fetch(source)?;
    let (table, report) = parse(source, &text)?;

    log::info!(
        "loaded {} of {} movies from {source} ({} incomplete rows dropped, {} duplicate rows)",
        report.rows_after,
        report.rows_before,
        report.rows_dropped,
        report.duplicate_rows,
    );
    log::info!("missing values per column: {}", format_missing(&report));

    Ok((table, report))
}

fn fetch(source: &str) -> Result<String, LoadError> {
    let unavailable = |reason: String| LoadError::SourceUnavailable {
        uri: source.to_string(),
        reason,
    };

    if source.starts_with("http://") || source.starts_with("https://") {
        let response = reqwest::blocking::get(source)
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| unavailable(e.to_string()))?;
        response.text().map_err(|e| unavailable(e.to_string()))
    } else {
        std::fs::read_to_string(source).map_err(|e| unavailable(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// CSV parsing and cleaning
// ---------------------------------------------------------------------------

/// One raw row before cleaning.  Every field is optional here; the cleaning
/// policy decides which rows survive.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    genre: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    year: Option<i32>,
    #[serde(default, deserialize_with = "lenient")]
    country: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    score: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    runtime: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    budget: Option<f64>,
}

/// Treat empty, whitespace-only, and unparseable cells uniformly as missing.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let cell: Option<String> = Option::deserialize(deserializer)?;
    Ok(cell.and_then(|s| {
        let s = s.trim();
        if s.is_empty() {
            None
        } else {
            s.parse::<T>().ok()
        }
    }))
}

/// Parse the CSV text, compute the quality report over the raw rows, then
/// apply the cleaning policy: any row with one or more missing fields is
/// dropped whole.  No imputation, no partial-row retention.  Blunt on
/// purpose: a row missing only `budget` is excluded even from queries that
/// never touch budgets, which keeps every query over identical rows.
fn parse(source: &str, text: &str) -> Result<(MovieTable, LoadReport), LoadError> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| LoadError::SourceUnavailable {
            uri: source.to_string(),
            reason: format!("reading CSV header: {e}"),
        })?
        .clone();

    let missing_cols: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing_cols.is_empty() {
        return Err(LoadError::SchemaMismatch {
            uri: source.to_string(),
            missing: missing_cols,
        });
    }

    let mut records = Vec::new();
    let mut missing_counts = [0usize; REQUIRED_COLUMNS.len()];
    let mut seen_rows: HashMap<String, usize> = HashMap::new();
    let mut rows_before = 0usize;
    let mut duplicate_rows = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LoadError::SourceUnavailable {
            uri: source.to_string(),
            reason: format!("CSV row {row_no}: {e}"),
        })?;
        rows_before += 1;

        // Duplicate detection over the full raw row, Pandas-style: every
        // occurrence after the first counts as one duplicate.
        let key = record.iter().collect::<Vec<_>>().join("\u{1f}");
        let seen = seen_rows.entry(key).or_insert(0);
        if *seen > 0 {
            duplicate_rows += 1;
        }
        *seen += 1;

        let raw: RawRecord =
            record
                .deserialize(Some(&headers))
                .map_err(|e| LoadError::SourceUnavailable {
                    uri: source.to_string(),
                    reason: format!("CSV row {row_no}: {e}"),
                })?;

        let fields = [
            raw.name.is_none(),
            raw.genre.is_none(),
            raw.year.is_none(),
            raw.country.is_none(),
            raw.score.is_none(),
            raw.runtime.is_none(),
            raw.budget.is_none(),
        ];
        for (count, absent) in missing_counts.iter_mut().zip(fields) {
            if absent {
                *count += 1;
            }
        }
        if fields.iter().any(|absent| *absent) {
            continue;
        }

        records.push(MovieRecord {
            name: raw.name.unwrap_or_default(),
            genre: raw.genre.unwrap_or_default(),
            year: raw.year.unwrap_or_default(),
            country: raw.country.unwrap_or_default(),
            score: raw.score.unwrap_or_default(),
            runtime: raw.runtime.unwrap_or_default(),
            budget: raw.budget.unwrap_or_default(),
        });
    }

    let rows_after = records.len();
    let missing = REQUIRED_COLUMNS
        .iter()
        .zip(missing_counts)
        .map(|(&column, missing)| ColumnQuality {
            column,
            missing,
            missing_pct: if rows_before == 0 {
                0.0
            } else {
                missing as f64 * 100.0 / rows_before as f64
            },
        })
        .collect();

    let report = LoadReport {
        rows_before,
        rows_after,
        rows_dropped: rows_before - rows_after,
        duplicate_rows,
        columns: REQUIRED_COLUMNS.len(),
        missing,
    };

    Ok((MovieTable::from_records(records), report))
}

fn format_missing(report: &LoadReport) -> String {
    let mut out = String::new();
    for cq in &report.missing {
        let _ = write!(out, "{}={} ({:.1}%) ", cq.column, cq.missing, cq.missing_pct);
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "name,genre,year,country,score,runtime,budget";

    fn parse_ok(text: &str) -> (MovieTable, LoadReport) {
        parse("test.csv", text).expect("parse should succeed")
    }

    #[test]
    fn clean_rows_survive_incomplete_rows_drop() {
        let csv = format!(
            "{HEADER}\n\
             A,Comedy,2020,US,7.0,90,1000\n\
             B,Comedy,2020,US,,100,2000\n\
             C,Drama,2021,UK,5.0,80,500\n"
        );
        let (table, report) = parse_ok(&csv);

        assert_eq!(report.rows_before, 3);
        assert_eq!(report.rows_after, 2);
        assert_eq!(report.rows_dropped, 1);
        assert_eq!(report.rows_after + report.rows_dropped, report.rows_before);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[1].name, "C");
    }

    #[test]
    fn row_missing_only_runtime_is_dropped_entirely() {
        let csv = format!(
            "{HEADER}\n\
             A,Comedy,2020,US,7.0,,1000\n"
        );
        let (table, report) = parse_ok(&csv);

        assert!(table.is_empty());
        assert_eq!(report.rows_dropped, 1);
        let runtime = report
            .missing
            .iter()
            .find(|cq| cq.column == "runtime")
            .unwrap();
        assert_eq!(runtime.missing, 1);
        assert_eq!(runtime.missing_pct, 100.0);
    }

    #[test]
    fn unparseable_numeric_cell_counts_as_missing() {
        let csv = format!(
            "{HEADER}\n\
             A,Comedy,twenty-twenty,US,7.0,90,1000\n\
             B,Drama,2021,UK,5.0,80,500\n"
        );
        let (table, report) = parse_ok(&csv);

        assert_eq!(table.len(), 1);
        let year = report.missing.iter().find(|cq| cq.column == "year").unwrap();
        assert_eq!(year.missing, 1);
    }

    #[test]
    fn duplicates_are_counted_but_kept() {
        let csv = format!(
            "{HEADER}\n\
             A,Comedy,2020,US,7.0,90,1000\n\
             A,Comedy,2020,US,7.0,90,1000\n\
             A,Comedy,2020,US,7.0,90,1000\n\
             B,Drama,2021,UK,5.0,80,500\n"
        );
        let (table, report) = parse_ok(&csv);

        // Two occurrences beyond the first; all four rows stay in the table.
        assert_eq!(report.duplicate_rows, 2);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn extra_columns_are_ignored() {
        let csv = "name,genre,year,country,score,runtime,budget,director\n\
                   A,Comedy,2020,US,7.0,90,1000,Someone\n";
        let (table, _) = parse_ok(csv);

        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].budget, 1000.0);
    }

    #[test]
    fn missing_required_column_is_a_schema_mismatch() {
        let csv = "name,genre,year,country,score,runtime\n\
                   A,Comedy,2020,US,7.0,90\n";
        let err = parse("test.csv", csv).unwrap_err();

        match err {
            LoadError::SchemaMismatch { missing, .. } => {
                assert_eq!(missing, vec!["budget".to_string()]);
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn unreachable_local_path_is_source_unavailable() {
        let err = load("/definitely/not/a/real/path.csv").unwrap_err();
        assert!(matches!(err, LoadError::SourceUnavailable { .. }));
    }

    #[test]
    fn report_shape_matches_required_columns() {
        let csv = format!("{HEADER}\n");
        let (_, report) = parse_ok(&csv);

        assert_eq!(report.columns, 7);
        assert_eq!(report.missing.len(), 7);
        assert_eq!(report.rows_before, 0);
        // Percentages stay defined on an empty dataset.
        assert!(report.missing.iter().all(|cq| cq.missing_pct == 0.0));
    }
}
