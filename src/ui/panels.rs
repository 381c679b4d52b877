use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::loader;
use crate::data::model::{SCORE_MAX, SCORE_MIN};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.  Widgets edit the [`FilterSelection`];
/// the central panel pulls fresh views from the engine on every paint.
///
/// [`FilterSelection`]: crate::data::model::FilterSelection
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.table.is_empty() {
        ui.label("No movies loaded.");
        return;
    }

    // Clone the picker domains so we can mutate state inside the loops.
    let genres: Vec<String> = state.table.genres().iter().cloned().collect();
    let years: Vec<i32> = state.table.years().iter().copied().collect();
    let countries: Vec<String> = state.table.countries().iter().cloned().collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Genre checkboxes ----
            let n_selected = state.selection.genres.len();
            let header_text = format!("Genres  ({n_selected}/{})", genres.len());

            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("genre_filter")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_genres();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_genres();
                        }
                    });

                    for genre in &genres {
                        let mut checked = state.selection.genres.contains(genre);
                        let text =
                            RichText::new(genre).color(state.colors.color_for(genre));
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_genre(genre);
                        }
                    }
                });
            ui.separator();

            // ---- Year selector ----
            ui.strong("Year");
            let current_year = state.selection.year;
            egui::ComboBox::from_id_salt("year_filter")
                .selected_text(current_year.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for &year in &years {
                        if ui
                            .selectable_label(current_year == year, year.to_string())
                            .clicked()
                        {
                            state.set_year(year);
                        }
                    }
                });
            ui.separator();

            // ---- Country selector ----
            ui.strong("Country");
            let current_country = state.selection.country.clone();
            egui::ComboBox::from_id_salt("country_filter")
                .selected_text(&current_country)
                .show_ui(ui, |ui: &mut Ui| {
                    for country in &countries {
                        if ui
                            .selectable_label(current_country == *country, country)
                            .clicked()
                        {
                            state.set_country(country.clone());
                        }
                    }
                });
            ui.separator();

            // ---- Score range ----
            ui.strong("Score range");
            let (mut low, mut high) = state.selection.score_range;
            ui.horizontal(|ui: &mut Ui| {
                let low_changed = ui
                    .add(
                        egui::DragValue::new(&mut low)
                            .speed(0.1)
                            .range(SCORE_MIN..=SCORE_MAX),
                    )
                    .changed();
                ui.label("to");
                let high_changed = ui
                    .add(
                        egui::DragValue::new(&mut high)
                            .speed(0.1)
                            .range(SCORE_MIN..=SCORE_MAX),
                    )
                    .changed();
                if low_changed || high_changed {
                    state.set_score_range(low, high);
                }
            });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu bar with the dataset diagnostics.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open CSV…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let report = &state.report;
        ui.label(format!(
            "{} movies × {} columns",
            report.rows_after, report.columns
        ));
        ui.separator();
        ui.label(format!(
            "{} incomplete rows dropped, {} duplicate rows",
            report.rows_dropped, report.duplicate_rows
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Point the dashboard at a local CSV instead of the default remote one.
pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open movie dataset")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match loader::load(&path.to_string_lossy()) {
            Ok((table, report)) => {
                log::info!(
                    "switched dataset to {} ({} movies)",
                    path.display(),
                    table.len()
                );
                state.replace_dataset(table, report);
            }
            Err(e) => {
                log::error!("failed to load dataset: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
