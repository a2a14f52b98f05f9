mod controls;
mod leaderboard_view;
mod selector;
mod track_view;

use std::path::PathBuf;

use egui::{Align, Color32, Key, Layout, Modifiers, RichText, Visuals, style::Widgets};
use log::debug;
use simple_moving_average::{SMA, SumTreeSMA};

use raceplay::dataset::loader::PendingLoad;
use raceplay::palette::Rgb;
use raceplay::playback::{KeyInput, map_key, suppresses_default};
use raceplay::{AppConfig, RaceSelection, ShellState, ViewMode, ViewerShell};

pub(crate) const PALETTE_BLACK: Color32 = Color32::from_rgb(12, 12, 12);
pub(crate) const PALETTE_BROWN: Color32 = Color32::from_rgb(72, 30, 20);
pub(crate) const PALETTE_MAROON: Color32 = Color32::from_rgb(155, 57, 34);
pub(crate) const PALETTE_ORANGE: Color32 = Color32::from_rgb(242, 97, 63);
pub(crate) const PALETTE_GREY: Color32 = Color32::from_rgb(90, 90, 90);

const REPAINT_SAMPLES: usize = 60;

const KEY_BINDINGS: [(Key, KeyInput); 9] = [
    (Key::Space, KeyInput::Space),
    (Key::ArrowLeft, KeyInput::ArrowLeft),
    (Key::ArrowRight, KeyInput::ArrowRight),
    (Key::ArrowUp, KeyInput::ArrowUp),
    (Key::ArrowDown, KeyInput::ArrowDown),
    (Key::Num1, KeyInput::Digit(1)),
    (Key::Num2, KeyInput::Digit(2)),
    (Key::Num3, KeyInput::Digit(3)),
    (Key::Num4, KeyInput::Digit(4)),
];

pub(crate) fn to_color32(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.r, rgb.g, rgb.b)
}

/// What the window does right after it opens.
pub(crate) enum Startup {
    Browse,
    Race(RaceSelection),
    Open(PathBuf),
}

/// `ViewerApp` drives the whole replay window.
///
/// Each repaint it picks up a finished dataset load, applies keyboard commands, lets the
/// playback clock advance and then draws whichever screen the shell is on. The clock is only
/// ever ticked from here, so a paused or unloaded race costs no repaints.
pub struct ViewerApp {
    app_config: AppConfig,
    shell: ViewerShell,
    selected_session: String,
    view_mode: ViewMode,
    repaint_intervals: SumTreeSMA<f32, f32, REPAINT_SAMPLES>,
    last_repaint_ms: Option<f64>,
}

impl ViewerApp {
    pub(crate) fn new(
        app_config: AppConfig,
        startup: Startup,
        cc: &eframe::CreationContext<'_>,
    ) -> Self {
        let default_visuals = Visuals {
            dark_mode: true,
            hyperlink_color: PALETTE_MAROON,
            faint_bg_color: PALETTE_BLACK,
            extreme_bg_color: PALETTE_BROWN,
            panel_fill: PALETTE_BLACK,
            button_frame: true,
            widgets: Widgets::dark(),
            striped: true,
            ..Default::default()
        };
        cc.egui_ctx.set_visuals(default_visuals);

        let selection = RaceSelection::new(
            app_config.default_year,
            app_config.default_round,
            app_config.default_session,
        );
        let mut app = Self {
            selected_session: selection.session_type.label().to_string(),
            view_mode: app_config.view_mode,
            shell: ViewerShell::new(selection),
            app_config,
            repaint_intervals: SumTreeSMA::new(),
            last_repaint_ms: None,
        };

        match startup {
            Startup::Browse => {}
            Startup::Race(selection) => {
                app.selected_session = selection.session_type.label().to_string();
                app.shell.set_selection(selection);
                app.load_selected_race(&cc.egui_ctx);
            }
            Startup::Open(path) => app.open_file(path, &cc.egui_ctx),
        }
        app
    }

    fn load_selected_race(&mut self, ctx: &egui::Context) {
        let request = self.shell.selection().request();
        let repaint_ctx = ctx.clone();
        let pending = PendingLoad::fetch(&self.app_config.api_base_url, request, move || {
            repaint_ctx.request_repaint()
        });
        self.shell.begin_load(request.to_string(), pending);
    }

    fn open_file(&mut self, path: PathBuf, ctx: &egui::Context) {
        let label = path.display().to_string();
        let repaint_ctx = ctx.clone();
        let pending = PendingLoad::read_file(path, move || repaint_ctx.request_repaint());
        self.shell.begin_load(label, pending);
    }

    fn record_repaint(&mut self, now_ms: f64) {
        if let Some(last) = self.last_repaint_ms {
            let interval = now_ms - last;
            if interval > 0. {
                self.repaint_intervals.add_sample(interval as f32);
            }
        }
        self.last_repaint_ms = Some(now_ms);
    }

    /// Average repaint rate in Hz over the last few repaints.
    fn repaint_rate(&self) -> Option<f32> {
        if self.repaint_intervals.get_num_samples() == 0 {
            return None;
        }
        let average_ms = self.repaint_intervals.get_average();
        (average_ms > 0.).then(|| 1000. / average_ms)
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let Some(session) = self.shell.session_mut() else {
            return;
        };

        let commands: Vec<_> = ctx.input_mut(|input| {
            KEY_BINDINGS
                .iter()
                .filter(|(key, key_input)| {
                    if suppresses_default(*key_input) {
                        input.consume_key(Modifiers::NONE, *key)
                    } else {
                        input.key_pressed(*key)
                    }
                })
                .filter_map(|(_, key_input)| map_key(*key_input))
                .collect()
        });

        for command in commands {
            debug!("Playback command {:?}", command);
            session.clock_mut().apply(command);
        }
    }

    fn error_view(&mut self, ctx: &egui::Context, message: &str) {
        let mut retry = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.with_layout(Layout::top_down(Align::Center), |ui| {
                ui.add_space(ui.available_height() / 3.);
                ui.label(RichText::new("Error").heading().color(PALETTE_ORANGE));
                ui.add_space(10.);
                ui.label(RichText::new(message).color(Color32::WHITE));
                ui.add_space(20.);
                retry = ui.button("Try again").clicked();
            });
        });
        if retry {
            self.shell.retry();
        }
    }

    fn replay_view(&mut self, ctx: &egui::Context) {
        let mut back_to_selection = false;
        let view_mode = &mut self.view_mode;
        let Some(session) = self.shell.session() else {
            return;
        };

        egui::TopBottomPanel::top("race_header")
            .min_height(32.)
            .show(ctx, |ui| {
                ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
                    back_to_selection = ui.button("⬅ Back to selection").clicked();
                    ui.separator();
                    let event = &session.dataset().event;
                    ui.label(RichText::new(&event.name).strong().color(Color32::WHITE));
                    ui.label(format!(
                        "{} · Round {} · {}",
                        event.year, event.round, event.session_type
                    ));

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.selectable_value(view_mode, ViewMode::Scene, "Scene");
                        ui.selectable_value(view_mode, ViewMode::Canvas, "Canvas");
                    });
                });
            });

        if back_to_selection {
            self.shell.back_to_selection();
            return;
        }

        let repaint_rate = self.repaint_rate();
        let Some(session) = self.shell.session_mut() else {
            return;
        };

        egui::TopBottomPanel::bottom("transport")
            .min_height(60.)
            .show(ctx, |ui| controls::transport_controls(ui, session, repaint_rate));

        let mut toggled_driver = None;
        egui::SidePanel::right("leaderboard")
            .resizable(false)
            .exact_width(300.)
            .show(ctx, |ui| {
                toggled_driver = leaderboard_view::leaderboard(ui, session);
                ui.separator();
                leaderboard_view::driver_panel(ui, session);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(PALETTE_BLACK))
            .show(ctx, |ui| {
                if let Some(code) = track_view::track_view(ui, session, &self.app_config, self.view_mode)
                {
                    toggled_driver = Some(code);
                }
            });

        if let Some(code) = toggled_driver {
            session.toggle_driver(&code);
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now_ms = ctx.input(|i| i.time) * 1000.;
        self.record_repaint(now_ms);

        self.shell.poll_load();
        self.handle_keys(ctx);
        if let Some(session) = self.shell.session_mut() {
            session.tick(now_ms);
        }

        match self.shell.state() {
            ShellState::Selecting => self.selector_view(ctx, None),
            ShellState::Loading { label } => {
                let label = label.clone();
                self.selector_view(ctx, Some(&label));
            }
            ShellState::Error { message } => {
                let message = message.clone();
                self.error_view(ctx, &message);
            }
            ShellState::Viewing(_) => self.replay_view(ctx),
        }

        let is_playing = self
            .shell
            .session()
            .is_some_and(|session| session.clock().is_playing());
        if is_playing || self.shell.is_loading() {
            ctx.request_repaint();
        }
    }
}
