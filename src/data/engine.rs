use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::model::{MovieRecord, MovieTable};

// ---------------------------------------------------------------------------
// Derived-view types
// ---------------------------------------------------------------------------

/// Fixed bin count for the runtime histogram.
pub const RUNTIME_HISTOGRAM_BINS: usize = 20;

/// One (name, genre) group with a summed field.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSum {
    pub name: String,
    pub genre: String,
    pub total: f64,
}

/// One equal-width histogram bucket over `lower..upper` (upper-inclusive
/// for the last bucket).
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Engine – pure queries over the loaded table
// ---------------------------------------------------------------------------

/// The filter & aggregation engine.  Holds a shared reference to the
/// immutable table; every query recomputes its view from scratch.  Cheap
/// enough that no caching or invalidation is needed.
///
/// Empty matches are never errors: means come back as `None`, counts as 0,
/// grouped views as empty vectors.  The presentation layer needs no
/// per-query error handling.
pub struct Engine {
    table: Arc<MovieTable>,
}

impl Engine {
    pub fn new(table: Arc<MovieTable>) -> Self {
        Engine { table }
    }

    pub fn table(&self) -> &MovieTable {
        &self.table
    }

    fn in_genres<'a>(
        &'a self,
        genres: &'a BTreeSet<String>,
    ) -> impl Iterator<Item = &'a MovieRecord> {
        self.table
            .records()
            .iter()
            .filter(move |rec| genres.contains(&rec.genre))
    }

    fn mean<F>(&self, genres: &BTreeSet<String>, field: F) -> Option<f64>
    where
        F: Fn(&MovieRecord) -> f64,
    {
        let mut sum = 0.0;
        let mut n = 0usize;
        for rec in self.in_genres(genres) {
            sum += field(rec);
            n += 1;
        }
        (n > 0).then(|| sum / n as f64)
    }

    /// Mean score over the selected genres.  `None` when nothing matches,
    /// which the UI must render distinctly from a zero score.
    pub fn average_score(&self, genres: &BTreeSet<String>) -> Option<f64> {
        self.mean(genres, |rec| rec.score)
    }

    /// Mean runtime (minutes) over the selected genres.
    pub fn average_runtime(&self, genres: &BTreeSet<String>) -> Option<f64> {
        self.mean(genres, |rec| rec.runtime)
    }

    /// Number of movies in the selected genres.
    pub fn total_count(&self, genres: &BTreeSet<String>) -> usize {
        self.in_genres(genres).count()
    }

    fn grouped_sum<F>(&self, genres: &BTreeSet<String>, year: i32, field: F) -> Vec<GroupedSum>
    where
        F: Fn(&MovieRecord) -> f64,
    {
        // BTreeMap keying gives the deterministic (name, genre) order the
        // charts rely on for reproducible rendering.
        let mut groups: BTreeMap<(String, String), f64> = BTreeMap::new();
        for rec in self.in_genres(genres) {
            if rec.year == year {
                *groups
                    .entry((rec.name.clone(), rec.genre.clone()))
                    .or_insert(0.0) += field(rec);
            }
        }
        groups
            .into_iter()
            .map(|((name, genre), total)| GroupedSum { name, genre, total })
            .collect()
    }

    /// Movies matching the genre set and year, grouped by (name, genre)
    /// with the `year` field summed.  Summing a year across a group is a
    /// degenerate aggregation kept deliberately (see DESIGN.md):
    /// a name appearing twice in one year reports twice the year.
    pub fn movies_by_year_genre(&self, genres: &BTreeSet<String>, year: i32) -> Vec<GroupedSum> {
        self.grouped_sum(genres, year, |rec| f64::from(rec.year))
    }

    /// Same row filter as [`Self::movies_by_year_genre`], grouped by
    /// (name, genre) with `score` summed (same degenerate-sum caveat).
    pub fn movies_by_genre_score(&self, genres: &BTreeSet<String>, year: i32) -> Vec<GroupedSum> {
        self.grouped_sum(genres, year, |rec| rec.score)
    }

    /// Mean budget per genre over the whole table (ignores the selection),
    /// rounded to the nearest whole currency unit, ordered by genre.
    pub fn average_budget_by_genre(&self) -> Vec<(String, i64)> {
        let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for rec in self.table.records() {
            let entry = groups.entry(&rec.genre).or_insert((0.0, 0));
            entry.0 += rec.budget;
            entry.1 += 1;
        }
        groups
            .into_iter()
            .map(|(genre, (sum, n))| (genre.to_string(), (sum / n as f64).round() as i64))
            .collect()
    }

    /// (runtime, genre) projection of the selected genres, the raw input
    /// for the 20-bin runtime histogram.
    pub fn runtime_distribution(&self, genres: &BTreeSet<String>) -> Vec<(f64, String)> {
        self.in_genres(genres)
            .map(|rec| (rec.runtime, rec.genre.clone()))
            .collect()
    }

    /// Bucket the runtime distribution into [`RUNTIME_HISTOGRAM_BINS`]
    /// equal-width bins over the observed range.  Empty input yields no
    /// bins; a degenerate range (all runtimes equal) collapses into the
    /// first bin.
    pub fn runtime_histogram(&self, genres: &BTreeSet<String>) -> Vec<HistogramBin> {
        let runtimes: Vec<f64> = self
            .in_genres(genres)
            .map(|rec| rec.runtime)
            .collect();
        if runtimes.is_empty() {
            return Vec::new();
        }

        let min = runtimes.iter().copied().fold(f64::INFINITY, f64::min);
        let max = runtimes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let width = ((max - min) / RUNTIME_HISTOGRAM_BINS as f64).max(f64::MIN_POSITIVE);

        let mut bins: Vec<HistogramBin> = (0..RUNTIME_HISTOGRAM_BINS)
            .map(|i| HistogramBin {
                lower: min + i as f64 * width,
                upper: min + (i + 1) as f64 * width,
                count: 0,
            })
            .collect();

        for runtime in runtimes {
            let idx = (((runtime - min) / width) as usize).min(RUNTIME_HISTOGRAM_BINS - 1);
            bins[idx].count += 1;
        }
        bins
    }

    /// Count movies per genre whose score falls inside the range,
    /// inclusive at both ends, ordered by genre.
    pub fn score_count_by_genre(&self, score_range: (f64, f64)) -> Vec<(String, usize)> {
        let (low, high) = score_range;
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for rec in self.table.records() {
            if rec.score >= low && rec.score <= high {
                *counts.entry(&rec.genre).or_insert(0) += 1;
            }
        }
        counts
            .into_iter()
            .map(|(genre, n)| (genre.to_string(), n))
            .collect()
    }

    /// Full matching rows for direct display: genre in the set, exact year
    /// and country.  Unaggregated, in table order.
    pub fn movies_by_genre_year_country(
        &self,
        genres: &BTreeSet<String>,
        year: i32,
        country: &str,
    ) -> Vec<MovieRecord> {
        self.in_genres(genres)
            .filter(|rec| rec.year == year && rec.country == country)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::data::model::{MovieRecord, MovieTable};

    fn movie(
        name: &str,
        genre: &str,
        year: i32,
        country: &str,
        score: f64,
        runtime: f64,
        budget: f64,
    ) -> MovieRecord {
        MovieRecord {
            name: name.to_string(),
            genre: genre.to_string(),
            year,
            country: country.to_string(),
            score,
            runtime,
            budget,
        }
    }

    /// The three-row table used across most tests.
    fn engine() -> Engine {
        Engine::new(Arc::new(MovieTable::from_records(vec![
            movie("A", "Comedy", 2020, "US", 7.0, 90.0, 1000.0),
            movie("B", "Comedy", 2020, "US", 9.0, 100.0, 2000.0),
            movie("C", "Drama", 2021, "UK", 5.0, 80.0, 500.0),
        ])))
    }

    fn genres(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|g| g.to_string()).collect()
    }

    #[test]
    fn average_score_is_the_mean_over_matching_genres() {
        let engine = engine();
        assert_eq!(engine.average_score(&genres(&["Comedy"])), Some(8.0));
        assert_eq!(engine.average_score(&genres(&["Drama"])), Some(5.0));
        assert_eq!(
            engine.average_score(&genres(&["Comedy", "Drama"])),
            Some(7.0)
        );
    }

    #[test]
    fn empty_genre_selection_yields_sentinels_not_errors() {
        let engine = engine();
        let none = genres(&[]);

        assert_eq!(engine.average_score(&none), None);
        assert_eq!(engine.average_runtime(&none), None);
        assert_eq!(engine.total_count(&none), 0);
        assert!(engine.runtime_distribution(&none).is_empty());
        assert!(engine.runtime_histogram(&none).is_empty());
        assert!(engine.movies_by_year_genre(&none, 2020).is_empty());
    }

    #[test]
    fn unknown_genre_matches_nothing() {
        let engine = engine();
        assert_eq!(engine.average_score(&genres(&["Western"])), None);
        assert_eq!(engine.total_count(&genres(&["Western"])), 0);
    }

    #[test]
    fn total_count_is_monotonic_in_the_genre_set() {
        let engine = engine();
        let small = engine.total_count(&genres(&["Comedy"]));
        let large = engine.total_count(&genres(&["Comedy", "Drama"]));

        assert_eq!(small, 2);
        assert_eq!(large, 3);
        assert!(small <= large);
    }

    #[test]
    fn average_budget_by_genre_covers_every_genre_once() {
        let engine = engine();
        let view = engine.average_budget_by_genre();

        assert_eq!(
            view,
            vec![("Comedy".to_string(), 1500), ("Drama".to_string(), 500)]
        );
    }

    #[test]
    fn budget_mean_rounds_to_nearest_integer() {
        let engine = Engine::new(Arc::new(MovieTable::from_records(vec![
            movie("A", "Comedy", 2020, "US", 7.0, 90.0, 1000.0),
            movie("B", "Comedy", 2020, "US", 9.0, 100.0, 1001.0),
        ])));

        // mean 1000.5 rounds away from zero
        assert_eq!(engine.average_budget_by_genre(), vec![("Comedy".to_string(), 1001)]);
    }

    #[test]
    fn score_count_by_genre_is_inclusive_at_both_bounds() {
        let engine = engine();

        // 5.0 and 9.0 sit exactly on the bounds and must count.
        let view = engine.score_count_by_genre((5.0, 9.0));
        assert_eq!(
            view,
            vec![("Comedy".to_string(), 2), ("Drama".to_string(), 1)]
        );

        let narrow = engine.score_count_by_genre((7.0, 7.0));
        assert_eq!(narrow, vec![("Comedy".to_string(), 1)]);
    }

    #[test]
    fn year_and_score_sums_group_by_name_and_genre() {
        let engine = engine();
        let by_year = engine.movies_by_year_genre(&genres(&["Comedy"]), 2020);

        assert_eq!(
            by_year,
            vec![
                GroupedSum {
                    name: "A".to_string(),
                    genre: "Comedy".to_string(),
                    total: 2020.0
                },
                GroupedSum {
                    name: "B".to_string(),
                    genre: "Comedy".to_string(),
                    total: 2020.0
                },
            ]
        );

        let by_score = engine.movies_by_genre_score(&genres(&["Comedy"]), 2020);
        assert_eq!(by_score[0].total, 7.0);
        assert_eq!(by_score[1].total, 9.0);
    }

    #[test]
    fn duplicate_named_groups_sum_their_fields() {
        // Two releases under one name in the same year: the year literally
        // doubles.  Odd, but kept on purpose; see DESIGN.md.
        let engine = Engine::new(Arc::new(MovieTable::from_records(vec![
            movie("Remake", "Drama", 2020, "US", 6.0, 95.0, 800.0),
            movie("Remake", "Drama", 2020, "UK", 8.0, 100.0, 900.0),
        ])));

        let by_year = engine.movies_by_year_genre(&genres(&["Drama"]), 2020);
        assert_eq!(by_year.len(), 1);
        assert_eq!(by_year[0].total, 4040.0);

        let by_score = engine.movies_by_genre_score(&genres(&["Drama"]), 2020);
        assert_eq!(by_score[0].total, 14.0);
    }

    #[test]
    fn runtime_distribution_projects_runtime_and_genre() {
        let engine = engine();
        let view = engine.runtime_distribution(&genres(&["Comedy"]));

        assert_eq!(
            view,
            vec![(90.0, "Comedy".to_string()), (100.0, "Comedy".to_string())]
        );
    }

    #[test]
    fn runtime_histogram_uses_twenty_bins_over_the_observed_range() {
        let engine = engine();
        let bins = engine.runtime_histogram(&genres(&["Comedy", "Drama"]));

        assert_eq!(bins.len(), RUNTIME_HISTOGRAM_BINS);
        assert_eq!(bins.first().unwrap().lower, 80.0);
        assert_eq!(bins.last().unwrap().upper, 100.0);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
        // The maximum lands in the last bin, not past it.
        assert_eq!(bins.last().unwrap().count, 1);
    }

    #[test]
    fn runtime_histogram_handles_a_degenerate_range() {
        let engine = Engine::new(Arc::new(MovieTable::from_records(vec![
            movie("A", "Comedy", 2020, "US", 7.0, 90.0, 1000.0),
            movie("B", "Comedy", 2020, "US", 8.0, 90.0, 2000.0),
        ])));

        let bins = engine.runtime_histogram(&genres(&["Comedy"]));
        assert_eq!(bins.len(), RUNTIME_HISTOGRAM_BINS);
        assert_eq!(bins[0].count, 2);
    }

    #[test]
    fn unaggregated_row_query_filters_on_genre_year_and_country() {
        let engine = engine();
        let rows =
            engine.movies_by_genre_year_country(&genres(&["Comedy", "Drama"]), 2020, "US");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "A");
        assert_eq!(rows[1].name, "B");

        assert!(engine
            .movies_by_genre_year_country(&genres(&["Drama"]), 2020, "US")
            .is_empty());
    }

    #[test]
    fn queries_leave_the_table_untouched() {
        let engine = engine();
        let before = engine.table().records().to_vec();

        let _ = engine.average_score(&genres(&["Comedy"]));
        let _ = engine.movies_by_year_genre(&genres(&["Comedy"]), 2020);
        let _ = engine.average_budget_by_genre();
        let _ = engine.runtime_histogram(&genres(&["Comedy"]));

        assert_eq!(engine.table().records(), before.as_slice());
    }
}
