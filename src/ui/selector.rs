use egui::{Align, Color32, DragValue, Grid, Layout, RichText, Spinner};
use egui_dropdown::DropDownBox;

use raceplay::shell::{ROUND_RANGE, YEAR_RANGE};
use raceplay::{RaceSelection, SessionType};

use super::{PALETTE_ORANGE, ViewerApp};

impl ViewerApp {
    /// Race selection form. While a load is in flight the form stays visible but disabled.
    pub(crate) fn selector_view(&mut self, ctx: &egui::Context, loading: Option<&str>) {
        let mut selection = self.shell.selection();
        let mut load_race = false;
        let mut open_file = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.with_layout(Layout::top_down(Align::Center), |ui| {
                ui.add_space(ui.available_height() / 4.);
                ui.label(
                    RichText::new("Race Replay")
                        .heading()
                        .strong()
                        .color(PALETTE_ORANGE),
                );
                ui.add_space(20.);

                ui.add_enabled_ui(loading.is_none(), |ui| {
                    Grid::new("race_selector")
                        .num_columns(2)
                        .spacing([12., 8.])
                        .show(ui, |ui| {
                            ui.label(RichText::new("Season").color(Color32::WHITE));
                            ui.add(DragValue::new(&mut selection.year).range(YEAR_RANGE));
                            ui.end_row();

                            ui.label(RichText::new("Round").color(Color32::WHITE));
                            ui.add(DragValue::new(&mut selection.round).range(ROUND_RANGE));
                            ui.end_row();

                            ui.label(RichText::new("Session").color(Color32::WHITE));
                            ui.add(
                                DropDownBox::from_iter(
                                    SessionType::ALL.iter().map(|s| s.label()),
                                    "session_dropbox",
                                    &mut self.selected_session,
                                    |ui, text| ui.selectable_label(false, text),
                                )
                                .filter_by_input(false),
                            );
                            ui.end_row();
                        });

                    ui.add_space(12.);
                    ui.horizontal(|ui| {
                        load_race = ui.button("Load race").clicked();
                        if ui.button("📂 Open file").clicked() {
                            open_file = rfd::FileDialog::new()
                                .add_filter("Race data", &["json"])
                                .pick_file();
                        }
                    });
                });

                if let Some(label) = loading {
                    ui.add_space(20.);
                    ui.add(Spinner::new());
                    ui.label(RichText::new(format!("Loading {}...", label)).color(Color32::WHITE));
                }
            });
        });

        if let Some(session_type) = SessionType::parse(&self.selected_session) {
            selection.session_type = session_type;
        }
        self.shell.set_selection(RaceSelection::new(
            selection.year,
            selection.round,
            selection.session_type,
        ));

        if let Some(path) = open_file {
            self.open_file(path, ctx);
        } else if load_race {
            self.load_selected_race(ctx);
        }
    }
}
