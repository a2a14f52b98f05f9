use egui::{Color32, CornerRadius, Grid, RichText, ScrollArea, Sense, Ui, Vec2};

use raceplay::ReplaySession;
use raceplay::palette;

use super::{PALETTE_GREY, PALETTE_MAROON, PALETTE_ORANGE, to_color32};

fn swatch(ui: &mut Ui, color: Color32, size: Vec2, round: bool) {
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    if round {
        ui.painter().circle_filled(rect.center(), size.x / 2., color);
    } else {
        ui.painter().rect_filled(rect, CornerRadius::same(2), color);
    }
}

/// Standings for the current frame. Returns the driver whose row was clicked.
pub(crate) fn leaderboard(ui: &mut Ui, session: &ReplaySession) -> Option<String> {
    let mut clicked = None;
    let entries = session.standings();
    let selected = session.selected_driver();
    let colors = &session.dataset().driver_colors;

    ui.label(RichText::new("Leaderboard").heading().color(PALETTE_ORANGE));
    if entries.is_empty() {
        ui.label(RichText::new("No classified drivers").color(PALETTE_GREY));
        return None;
    }

    ScrollArea::vertical()
        .max_height(ui.available_height() * 0.6)
        .show(ui, |ui| {
            Grid::new("leaderboard_rows")
                .num_columns(6)
                .striped(true)
                .spacing([6., 4.])
                .show(ui, |ui| {
                    for entry in &entries {
                        ui.label(RichText::new(entry.position.to_string()).color(Color32::WHITE));
                        swatch(
                            ui,
                            to_color32(palette::driver_color(colors, &entry.driver_code)),
                            Vec2::new(4., 16.),
                            false,
                        );
                        let is_selected = selected == Some(entry.driver_code.as_str());
                        if ui
                            .selectable_label(
                                is_selected,
                                RichText::new(&entry.driver_code).strong(),
                            )
                            .clicked()
                        {
                            clicked = Some(entry.driver_code.clone());
                        }
                        ui.label(RichText::new(&entry.team).small().color(PALETTE_GREY));
                        swatch(ui, to_color32(entry.compound_color), Vec2::splat(10.), true);
                        if entry.is_out {
                            ui.label(
                                RichText::new("OUT")
                                    .small()
                                    .strong()
                                    .background_color(PALETTE_MAROON)
                                    .color(Color32::WHITE),
                            );
                        } else {
                            ui.label("");
                        }
                        ui.end_row();
                    }
                });
        });

    clicked
}

/// Telemetry readout for the selected driver.
pub(crate) fn driver_panel(ui: &mut Ui, session: &ReplaySession) {
    let Some(readout) = session.driver_readout() else {
        ui.label(RichText::new("Select a driver to see telemetry").color(PALETTE_GREY));
        return;
    };

    let color = to_color32(palette::driver_color(
        &session.dataset().driver_colors,
        &readout.driver_code,
    ));
    ui.label(
        RichText::new(readout.full_name.as_deref().unwrap_or(&readout.driver_code))
            .heading()
            .color(color),
    );

    Grid::new("driver_telemetry")
        .num_columns(2)
        .spacing([12., 4.])
        .show(ui, |ui| {
            ui.label("Speed");
            ui.label(RichText::new(&readout.speed).color(Color32::WHITE));
            ui.end_row();

            ui.label("Gear");
            ui.label(RichText::new(&readout.gear).color(Color32::WHITE));
            ui.end_row();

            ui.label("DRS");
            if readout.drs_active {
                ui.label(RichText::new("On").strong().color(Color32::GREEN));
            } else {
                ui.label(RichText::new("Off").color(PALETTE_GREY));
            }
            ui.end_row();

            ui.label("Lap");
            ui.label(RichText::new(readout.lap.to_string()).color(Color32::WHITE));
            ui.end_row();
        });
}
