use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::data::engine::Engine;
use crate::data::model::FilterSelection;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central dashboard (metrics, charts, matching rows)
// ---------------------------------------------------------------------------

/// Render the dashboard from the current selection.  Every view is pulled
/// fresh from the engine; nothing here caches or mutates the table.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    if state.table.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No movies survived cleaning – check the source data.");
        });
        return;
    }

    let selection = state.selection.sanitized(&state.table);
    let engine = &state.engine;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            metrics_row(ui, engine, &selection);
            ui.separator();

            ui.columns(2, |cols: &mut [Ui]| {
                budget_chart(&mut cols[0], state);
                score_count_chart(&mut cols[1], state, selection.score_range);
            });
            ui.add_space(8.0);

            runtime_histogram_chart(ui, engine, &selection.genres);
            ui.add_space(8.0);

            grouped_tables(ui, engine, &selection);
            ui.add_space(8.0);

            matching_rows_table(ui, engine, &selection);
        });
}

// ---------------------------------------------------------------------------
// Scalar metrics
// ---------------------------------------------------------------------------

fn metrics_row(ui: &mut Ui, engine: &Engine, selection: &FilterSelection) {
    let avg_score = engine.average_score(&selection.genres);
    let avg_runtime = engine.average_runtime(&selection.genres);
    let count = engine.total_count(&selection.genres);

    ui.horizontal(|ui: &mut Ui| {
        metric(ui, "Average score", format_mean(avg_score));
        ui.separator();
        metric(ui, "Average runtime (min)", format_mean(avg_runtime));
        ui.separator();
        metric(ui, "Movies in selection", count.to_string());
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).small());
        ui.heading(value);
    });
}

/// `None` is the no-matching-rows sentinel; render it distinctly from 0.
fn format_mean(mean: Option<f64>) -> String {
    match mean {
        Some(v) => format!("{v:.2}"),
        None => "n/a".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

fn budget_chart(ui: &mut Ui, state: &AppState) {
    ui.strong("Average budget by genre (all movies)");

    let view = state.engine.average_budget_by_genre();
    Plot::new("budget_by_genre")
        .legend(Legend::default())
        .height(220.0)
        .show_axes([false, true])
        .show(ui, |plot_ui| {
            for (i, (genre, avg_budget)) in view.iter().enumerate() {
                let bar = Bar::new(i as f64, *avg_budget as f64).width(0.7);
                plot_ui.bar_chart(
                    BarChart::new(vec![bar])
                        .name(genre)
                        .color(state.colors.color_for(genre)),
                );
            }
        });
}

fn score_count_chart(ui: &mut Ui, state: &AppState, score_range: (f64, f64)) {
    ui.strong(format!(
        "Movies per genre with score {:.1} – {:.1}",
        score_range.0, score_range.1
    ));

    let view = state.engine.score_count_by_genre(score_range);
    Plot::new("score_count_by_genre")
        .legend(Legend::default())
        .height(220.0)
        .show_axes([false, true])
        .show(ui, |plot_ui| {
            for (i, (genre, count)) in view.iter().enumerate() {
                let bar = Bar::new(i as f64, *count as f64).width(0.7);
                plot_ui.bar_chart(
                    BarChart::new(vec![bar])
                        .name(genre)
                        .color(state.colors.color_for(genre)),
                );
            }
        });
}

fn runtime_histogram_chart(ui: &mut Ui, engine: &Engine, genres: &BTreeSet<String>) {
    ui.strong("Runtime distribution (selected genres)");

    let bins = engine.runtime_histogram(genres);
    Plot::new("runtime_histogram")
        .height(220.0)
        .x_axis_label("Runtime (min)")
        .y_axis_label("Movies")
        .show(ui, |plot_ui| {
            let bars: Vec<Bar> = bins
                .iter()
                .map(|bin| {
                    Bar::new((bin.lower + bin.upper) / 2.0, bin.count as f64)
                        .width(bin.upper - bin.lower)
                })
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::LIGHT_BLUE));
        });
}

// ---------------------------------------------------------------------------
// Grouped tables
// ---------------------------------------------------------------------------

fn grouped_tables(ui: &mut Ui, engine: &Engine, selection: &FilterSelection) {
    let by_year = engine.movies_by_year_genre(&selection.genres, selection.year);
    let by_score = engine.movies_by_genre_score(&selection.genres, selection.year);

    ui.columns(2, |cols: &mut [Ui]| {
        grouped_sum_table(
            &mut cols[0],
            "year_sums",
            &format!("Movies of {} – year totals", selection.year),
            "Year Σ",
            &by_year,
        );
        grouped_sum_table(
            &mut cols[1],
            "score_sums",
            &format!("Movies of {} – score totals", selection.year),
            "Score Σ",
            &by_score,
        );
    });
}

fn grouped_sum_table(
    ui: &mut Ui,
    id: &str,
    title: &str,
    value_header: &str,
    rows: &[crate::data::engine::GroupedSum],
) {
    egui::CollapsingHeader::new(RichText::new(title).strong())
        .id_salt(id)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if rows.is_empty() {
                ui.label("No matching movies.");
                return;
            }
            egui::Grid::new(id).striped(true).show(ui, |ui: &mut Ui| {
                ui.strong("Name");
                ui.strong("Genre");
                ui.strong(value_header);
                ui.end_row();
                for row in rows {
                    ui.label(&row.name);
                    ui.label(&row.genre);
                    ui.label(format!("{}", row.total));
                    ui.end_row();
                }
            });
        });
}

// ---------------------------------------------------------------------------
// Matching rows (unaggregated)
// ---------------------------------------------------------------------------

fn matching_rows_table(ui: &mut Ui, engine: &Engine, selection: &FilterSelection) {
    let rows = engine.movies_by_genre_year_country(
        &selection.genres,
        selection.year,
        &selection.country,
    );

    ui.strong(format!(
        "Matching movies – {} / {}",
        selection.year, selection.country
    ));
    if rows.is_empty() {
        ui.label("No matching movies.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .columns(Column::auto().resizable(true), 7)
        .header(20.0, |mut header| {
            for title in ["Name", "Genre", "Year", "Country", "Score", "Runtime", "Budget"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let rec = &rows[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.label(&rec.name);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&rec.genre);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(rec.year.to_string());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&rec.country);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format!("{:.1}", rec.score));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format!("{:.0}", rec.runtime));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format!("{:.0}", rec.budget));
                });
            });
        });
}
