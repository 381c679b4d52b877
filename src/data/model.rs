use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// MovieRecord – one cleaned row of the dataset
// ---------------------------------------------------------------------------

/// Lower bound of the rating scale.
pub const SCORE_MIN: f64 = 1.0;
/// Upper bound of the rating scale.
pub const SCORE_MAX: f64 = 10.0;

/// A single movie (one row of the source CSV).  Every field is guaranteed
/// present: rows with any missing value are dropped during loading.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub name: String,
    pub genre: String,
    pub year: i32,
    pub country: String,
    /// Rating on a [`SCORE_MIN`]..=[`SCORE_MAX`] scale.
    pub score: f64,
    /// Runtime in minutes.
    pub runtime: f64,
    /// Production budget in currency units.
    pub budget: f64,
}

// ---------------------------------------------------------------------------
// MovieTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The cleaned dataset with pre-computed unique-value indexes for the
/// filter pickers.  Loaded once, never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct MovieTable {
    records: Vec<MovieRecord>,
    genres: BTreeSet<String>,
    years: BTreeSet<i32>,
    countries: BTreeSet<String>,
}

impl MovieTable {
    /// Build the unique-value indexes from the cleaned records.
    pub fn from_records(records: Vec<MovieRecord>) -> Self {
        let mut genres = BTreeSet::new();
        let mut years = BTreeSet::new();
        let mut countries = BTreeSet::new();

        for rec in &records {
            genres.insert(rec.genre.clone());
            years.insert(rec.year);
            countries.insert(rec.country.clone());
        }

        MovieTable {
            records,
            genres,
            years,
            countries,
        }
    }

    /// All rows, in load order.
    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    /// Number of movies.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted set of distinct genres.
    pub fn genres(&self) -> &BTreeSet<String> {
        &self.genres
    }

    /// Sorted set of distinct release years.
    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    /// Sorted set of distinct production countries.
    pub fn countries(&self) -> &BTreeSet<String> {
        &self.countries
    }
}

// ---------------------------------------------------------------------------
// FilterSelection – the user-chosen constraints for one rendering pass
// ---------------------------------------------------------------------------

/// The constraints the UI applies to a query.  Transient: owned by the
/// presentation layer, passed by reference into the engine, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSelection {
    pub year: i32,
    pub country: String,
    /// Inclusive score bounds, `low <= high` after [`Self::sanitized`].
    pub score_range: (f64, f64),
    pub genres: BTreeSet<String>,
}

impl FilterSelection {
    /// Default selection for a freshly loaded table: every genre selected,
    /// the most recent year, the first country, the full score scale.
    pub fn for_table(table: &MovieTable) -> Self {
        FilterSelection {
            year: table.years().iter().next_back().copied().unwrap_or(0),
            country: table
                .countries()
                .iter()
                .next()
                .cloned()
                .unwrap_or_default(),
            score_range: (SCORE_MIN, SCORE_MAX),
            genres: table.genres().clone(),
        }
    }

    /// Defend against out-of-domain selections: a reversed score range is
    /// swapped, and genres not present in the table are dropped.  Selections
    /// normally come from constrained pickers, but the engine is usable as a
    /// library so arbitrary input must not misbehave.
    pub fn sanitized(&self, table: &MovieTable) -> Self {
        let (low, high) = self.score_range;
        let score_range = if low <= high { (low, high) } else { (high, low) };

        let genres = self
            .genres
            .intersection(table.genres())
            .cloned()
            .collect();

        FilterSelection {
            year: self.year,
            country: self.country.clone(),
            score_range,
            genres,
        }
    }
}

// ---------------------------------------------------------------------------
// LoadReport – data-quality diagnostics from the loader
// ---------------------------------------------------------------------------

/// Missing-value tally for one required column, over the raw (pre-clean) rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnQuality {
    pub column: &'static str,
    pub missing: usize,
    pub missing_pct: f64,
}

/// Diagnostic report produced alongside the cleaned table.  Purely for
/// operator visibility: nothing downstream changes behaviour based on it.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Raw row count before cleaning.
    pub rows_before: usize,
    /// Row count after dropping incomplete rows.
    pub rows_after: usize,
    /// Rows dropped because at least one field was missing.
    pub rows_dropped: usize,
    /// Full-row duplicates found in the raw data.  Counted, not removed.
    pub duplicate_rows: usize,
    /// Number of required columns (the cleaned table's width).
    pub columns: usize,
    /// Per-column missing-value tallies.
    pub missing: Vec<ColumnQuality>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, genre: &str, year: i32) -> MovieRecord {
        MovieRecord {
            name: name.to_string(),
            genre: genre.to_string(),
            year,
            country: "US".to_string(),
            score: 7.0,
            runtime: 90.0,
            budget: 1000.0,
        }
    }

    #[test]
    fn table_indexes_unique_values_sorted() {
        let table = MovieTable::from_records(vec![
            record("B", "Drama", 2021),
            record("A", "Comedy", 2020),
            record("C", "Comedy", 2020),
        ]);

        let genres: Vec<&str> = table.genres().iter().map(String::as_str).collect();
        assert_eq!(genres, vec!["Comedy", "Drama"]);
        assert_eq!(
            table.years().iter().copied().collect::<Vec<_>>(),
            vec![2020, 2021]
        );
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn default_selection_picks_latest_year_and_all_genres() {
        let table = MovieTable::from_records(vec![
            record("A", "Comedy", 2019),
            record("B", "Drama", 2022),
        ]);

        let sel = FilterSelection::for_table(&table);
        assert_eq!(sel.year, 2022);
        assert_eq!(sel.genres.len(), 2);
        assert_eq!(sel.score_range, (SCORE_MIN, SCORE_MAX));
    }

    #[test]
    fn sanitize_swaps_reversed_score_range() {
        let table = MovieTable::from_records(vec![record("A", "Comedy", 2020)]);
        let mut sel = FilterSelection::for_table(&table);
        sel.score_range = (9.0, 4.0);

        assert_eq!(sel.sanitized(&table).score_range, (4.0, 9.0));
    }

    #[test]
    fn sanitize_drops_unknown_genres() {
        let table = MovieTable::from_records(vec![record("A", "Comedy", 2020)]);
        let mut sel = FilterSelection::for_table(&table);
        sel.genres.insert("Western".to_string());

        let clean = sel.sanitized(&table);
        assert!(clean.genres.contains("Comedy"));
        assert!(!clean.genres.contains("Western"));
    }
}
