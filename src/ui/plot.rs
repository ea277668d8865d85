use eframe::egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::color::SeriesRole;
use crate::data::analysis::MappingAnalysis;
use crate::data::model::{Axis, Section};
use crate::state::AppState;

/// Pulse stems are drawn at this fraction of the highest position.
const STEM_HEIGHT_FRACTION: f64 = 0.2;

// ---------------------------------------------------------------------------
// Diagnostic plots (central panel)
// ---------------------------------------------------------------------------

/// Render the 2×2 diagnostic grid: one row per mapping, timeline on the left,
/// tempo against position on the right.
pub fn diagnostic_plots(ui: &mut Ui, state: &AppState) {
    let analysis = match &state.analysis {
        Some(a) => a,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a dump to view timing  (File → Open dump…)");
            });
            return;
        }
    };

    let row_height = (ui.available_height() - ui.spacing().item_spacing.y) / 2.0;
    for section in Section::ALL {
        let mapping = analysis.get(section);
        ui.columns(2, |cols: &mut [Ui]| {
            timeline_plot(&mut cols[0], state, mapping, row_height);
            tempo_plot(&mut cols[1], state, mapping, row_height);
        });
    }
}

fn titles(section: Section) -> (&'static str, &'static str) {
    match section {
        Section::TimeFromPos => (
            "time computed from position updates",
            "tempo inferred from position updates",
        ),
        Section::PosFromTime => (
            "position computed from time updates",
            "tempo inferred from time updates",
        ),
    }
}

/// Position over time, pulse stems and tempo over (truncated) time.
///
/// Both dumped sections store position in the independent column and time
/// in the dependent one.
fn timeline_plot(ui: &mut Ui, state: &AppState, mapping: &MappingAnalysis, height: f32) {
    let section = mapping.section();
    let (title, _) = titles(section);
    let series = &mapping.series;
    let time = series.axis(Axis::Dependent);
    let pos = series.axis(Axis::Independent);

    ui.label(title);
    Plot::new(("timeline", section.sentinel()))
        .legend(Legend::default())
        .height(height - ui.spacing().interact_size.y)
        .x_axis_label("time")
        .y_axis_label("position / tempo")
        .show(ui, |plot_ui| {
            let points: PlotPoints = time.iter().zip(pos).map(|(&t, &p)| [t, p]).collect();
            plot_ui.line(
                Line::new(points)
                    .name("position")
                    .color(state.colors.color_for(SeriesRole::Position)),
            );

            if state.show_pulses && !mapping.pulses.is_empty() {
                let stem_h = STEM_HEIGHT_FRACTION * max_finite(pos);
                let stems: PlotPoints = mapping
                    .pulses
                    .dependent
                    .iter()
                    .map(|&t| [t, stem_h])
                    .collect();
                plot_ui.points(
                    Points::new(stems)
                        .name(format!("pulses ({})", mapping.pulses.len()))
                        .stems(0.0_f32)
                        .radius(3.0_f32)
                        .color(state.colors.color_for(SeriesRole::Pulse)),
                );
            }

            if state.show_tempo {
                let tempo: PlotPoints = finite_points(mapping.tempo.against(time)).into();
                plot_ui.line(
                    Line::new(tempo)
                        .name("tempo")
                        .color(state.colors.color_for(SeriesRole::Tempo)),
                );
            }
        });
}

/// Tempo over (truncated) position.
fn tempo_plot(ui: &mut Ui, state: &AppState, mapping: &MappingAnalysis, height: f32) {
    let section = mapping.section();
    let (_, title) = titles(section);
    let pos = mapping.series.axis(Axis::Independent);

    ui.label(title);
    Plot::new(("tempo", section.sentinel()))
        .legend(Legend::default())
        .height(height - ui.spacing().interact_size.y)
        .x_axis_label("position")
        .y_axis_label("tempo")
        .show(ui, |plot_ui| {
            let tempo: PlotPoints = finite_points(mapping.tempo.against(pos)).into();
            plot_ui.line(
                Line::new(tempo)
                    .name("tempo")
                    .color(state.colors.color_for(SeriesRole::Tempo)),
            );
        });
}

/// Degenerate tempo steps (inf / NaN) are skipped when drawing.
fn finite_points(points: impl Iterator<Item = [f64; 2]>) -> Vec<[f64; 2]> {
    points
        .filter(|[x, y]| x.is_finite() && y.is_finite())
        .collect()
}

fn max_finite(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max)
}
