use std::sync::Arc;

use crate::color::GenreColors;
use crate::data::engine::Engine;
use crate::data::model::{FilterSelection, LoadReport, MovieTable, SCORE_MAX, SCORE_MIN};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// The table is loaded once before the window opens and never mutated;
/// widgets only edit the [`FilterSelection`], and every paint pulls fresh
/// views from the engine with the selection of that frame.
pub struct AppState {
    /// The cleaned dataset, shared read-only with the engine.
    pub table: Arc<MovieTable>,

    /// Data-quality diagnostics from the load, shown in the top bar.
    pub report: LoadReport,

    /// Query engine over `table`.
    pub engine: Engine,

    /// Current filter selection driving every derived view.
    pub selection: FilterSelection,

    /// Genre colour assignments shared by all charts.
    pub colors: GenreColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Build the state around a freshly loaded dataset.
    pub fn new(table: MovieTable, report: LoadReport) -> Self {
        let selection = FilterSelection::for_table(&table);
        let colors = GenreColors::new(table.genres());
        let table = Arc::new(table);

        AppState {
            engine: Engine::new(Arc::clone(&table)),
            table,
            report,
            selection,
            colors,
            status_message: None,
        }
    }

    /// Swap in a newly loaded dataset (File → Open…), resetting the
    /// selection and colours to match the new table.
    pub fn replace_dataset(&mut self, table: MovieTable, report: LoadReport) {
        self.selection = FilterSelection::for_table(&table);
        self.colors = GenreColors::new(table.genres());
        self.table = Arc::new(table);
        self.engine = Engine::new(Arc::clone(&self.table));
        self.report = report;
        self.status_message = None;
    }

    /// Toggle a single genre in the selection.
    pub fn toggle_genre(&mut self, genre: &str) {
        if !self.selection.genres.remove(genre) {
            self.selection.genres.insert(genre.to_string());
        }
    }

    /// Select every genre present in the table.
    pub fn select_all_genres(&mut self) {
        self.selection.genres = self.table.genres().clone();
    }

    /// Clear the genre selection.  Every genre-filtered view goes empty;
    /// that is a defined state, not an error.
    pub fn select_no_genres(&mut self) {
        self.selection.genres.clear();
    }

    pub fn set_year(&mut self, year: i32) {
        self.selection.year = year;
    }

    pub fn set_country(&mut self, country: String) {
        self.selection.country = country;
    }

    /// Update the score bounds, clamped to the rating scale and kept
    /// ordered so the pickers cannot produce an inverted range.
    pub fn set_score_range(&mut self, low: f64, high: f64) {
        let low = low.clamp(SCORE_MIN, SCORE_MAX);
        let high = high.clamp(SCORE_MIN, SCORE_MAX);
        self.selection.score_range = if low <= high { (low, high) } else { (high, low) };
    }
}
