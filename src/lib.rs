// Library interface for raceplay
// Everything except the window lives here so it can be tested without a display

pub mod config;
pub mod dataset;
pub mod errors;
pub mod palette;
pub mod playback;
pub mod projection;
pub mod shell;
pub mod standings;

// Re-export commonly used types
pub use config::AppConfig;
pub use dataset::loader::{PendingLoad, RaceRequest, SessionType};
pub use dataset::{DriverPosition, Frame, RaceDataset, TrackOutline};
pub use errors::ViewerError;
pub use playback::{KeyInput, PlaybackClock, PlaybackCommand, PlaybackSpeed};
pub use projection::{Point2D, Projector, ViewMode};
pub use shell::{RaceSelection, ReplaySession, ShellState, ViewerShell};
