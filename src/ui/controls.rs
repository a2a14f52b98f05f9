use egui::{Align, Color32, Grid, Layout, RichText, Slider, Ui};

use raceplay::ReplaySession;
use raceplay::playback::PlaybackSpeed;
use raceplay::standings::{format_lap, format_short_time};

use super::{PALETTE_GREY, PALETTE_ORANGE};

const KEY_LEGEND: [(&str, &str); 5] = [
    ("Space", "Play / pause"),
    ("←", "Rewind 30 frames"),
    ("→", "Forward 30 frames"),
    ("↑ / ↓", "Cycle speed"),
    ("1 - 4", "0.5x / 1x / 2x / 4x"),
];

/// Transport bar: seek slider, play controls, speed selection and the keyboard legend.
pub(crate) fn transport_controls(ui: &mut Ui, session: &mut ReplaySession, repaint_rate: Option<f32>) {
    let total_laps = session.dataset().total_laps;
    let (time, lap) = session.current_time_and_lap();
    let clock = session.clock_mut();

    ui.add_space(4.);
    ui.horizontal(|ui| {
        let mut frame = clock.current_frame();
        ui.spacing_mut().slider_width = (ui.available_width() - 20.).max(100.);
        if ui
            .add(Slider::new(&mut frame, 0..=clock.last_frame()).show_value(false))
            .changed()
        {
            clock.seek(frame as i64);
        }
    });

    ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
        if ui.button("⏪").on_hover_text("Rewind").clicked() {
            clock.rewind();
        }
        let play_label = if clock.is_playing() { "⏸" } else { "▶" };
        if ui.button(play_label).clicked() {
            clock.toggle();
        }
        if ui.button("⏩").on_hover_text("Fast forward").clicked() {
            clock.fast_forward();
        }

        ui.separator();
        for speed in PlaybackSpeed::ALL {
            if ui
                .selectable_label(clock.speed() == speed, speed.to_string())
                .clicked()
            {
                clock.set_playback_speed(speed);
            }
        }

        ui.separator();
        ui.label(RichText::new(format_lap(lap, total_laps)).color(Color32::WHITE));
        ui.label(RichText::new(format_short_time(time)).color(Color32::WHITE));
        ui.label(
            RichText::new(format!(
                "Frame {} / {}",
                clock.current_frame() + 1,
                clock.frame_count()
            ))
            .color(PALETTE_GREY),
        );

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if let Some(rate) = repaint_rate {
                ui.label(RichText::new(format!("{:.0} Hz", rate)).small().color(PALETTE_GREY));
            }
            ui.menu_button("⌨ Keys", |ui| {
                Grid::new("key_legend").num_columns(2).show(ui, |ui| {
                    for (key, effect) in KEY_LEGEND {
                        ui.label(RichText::new(key).strong().color(PALETTE_ORANGE));
                        ui.label(effect);
                        ui.end_row();
                    }
                });
            });
        });
    });
}
