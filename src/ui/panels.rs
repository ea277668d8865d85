use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open dump…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(analysis), Some(source)) = (&state.analysis, &state.source) {
            ui.label(format!(
                "{source}: {} / {} samples",
                analysis.time_from_pos.series.len(),
                analysis.pos_from_time.series.len(),
            ));
        }

        ui.separator();

        if ui.selectable_label(state.show_pulses, "Pulses").clicked() {
            state.show_pulses = !state.show_pulses;
        }
        if ui.selectable_label(state.show_tempo, "Tempo").clicked() {
            state.show_tempo = !state.show_tempo;
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open timing dump")
        .add_filter("Text dumps", &["txt", "tmp", "log"])
        .add_filter("All files", &["*"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}
