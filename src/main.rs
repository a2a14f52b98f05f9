mod ui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use egui::Vec2;
use log::{info, warn};
use raceplay::{AppConfig, RaceSelection, SessionType, ViewerError};
use snafu::Snafu;
use ui::{Startup, ViewerApp};

#[derive(Debug, Snafu)]
enum AppError {
    #[snafu(display("Error managing config file: {source}"))]
    Config { source: ViewerError },
    #[snafu(display("Race data file not found: {path}"))]
    MissingInputFile { path: String },
    #[snafu(display("Could not start the viewer window: {source}"))]
    Window { source: eframe::Error },
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Base URL of the race data API, takes precedence over the config file
    #[arg(long, global = true)]
    api: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the race selection form
    Browse,
    /// Load a race from the API and start on its first frame
    Race {
        #[arg(short, long)]
        year: u32,

        #[arg(short, long)]
        round: u32,

        /// R for the race, S for the sprint
        #[arg(short, long, default_value = "R", value_parser = parse_session_type)]
        session: SessionType,
    },
    /// Replay a race dataset saved as JSON
    Open {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Write the default config file and exit
    InitConfig,
}

fn parse_session_type(value: &str) -> Result<SessionType, String> {
    SessionType::parse(value).ok_or_else(|| format!("unknown session type '{}'", value))
}

fn load_config(api_override: Option<String>) -> AppConfig {
    let mut app_config = match AppConfig::from_local_file() {
        Ok(Some(config)) => config,
        Ok(None) => AppConfig::default(),
        Err(e) => {
            warn!("Ignoring config file: {}", e);
            AppConfig::default()
        }
    };
    if let Some(api) = api_override {
        app_config.api_base_url = api;
    }
    app_config
}

fn init_config(api_override: Option<String>) -> Result<(), AppError> {
    let mut app_config = AppConfig::default();
    if let Some(api) = api_override {
        app_config.api_base_url = api;
    }
    app_config
        .save()
        .map_err(|e| AppError::Config { source: e })?;
    if let Ok(path) = AppConfig::default_path() {
        println!("Config written to {}", path.display());
    }
    Ok(())
}

fn run_viewer(app_config: AppConfig, startup: Startup) -> Result<(), AppError> {
    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_inner_size(Vec2::new(1280., 800.))
        .with_min_inner_size(Vec2::new(800., 500.));

    eframe::run_native(
        "Raceplay",
        native_options,
        Box::new(|cc| Ok(Box::new(ViewerApp::new(app_config, startup, cc)))),
    )
    .map_err(|e| AppError::Window { source: e })
}

fn run(cli: Args) -> Result<(), AppError> {
    match cli.command {
        Commands::InitConfig => init_config(cli.api),
        Commands::Browse => run_viewer(load_config(cli.api), Startup::Browse),
        Commands::Race {
            year,
            round,
            session,
        } => run_viewer(
            load_config(cli.api),
            Startup::Race(RaceSelection::new(year, round, session)),
        ),
        Commands::Open { input } => {
            if !input.exists() {
                return Err(AppError::MissingInputFile {
                    path: input.display().to_string(),
                });
            }
            run_viewer(load_config(cli.api), Startup::Open(input))
        }
    }
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    }) {
        warn!("Could not set Ctrl-C handler: {}", e);
    }

    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    info!("Viewer closed");
}
