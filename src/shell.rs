// Top level viewer state: race selection, loading, load errors and the replay itself

use std::ops::RangeInclusive;

use log::{error, info};

use crate::dataset::loader::{PendingLoad, RaceRequest, SessionType};
use crate::dataset::{Frame, RaceDataset};
use crate::errors::ViewerError;
use crate::playback::PlaybackClock;
use crate::projection::Projector;
use crate::standings::{self, DriverReadout, StandingEntry};

pub const YEAR_RANGE: RangeInclusive<u32> = 2018..=2025;
pub const ROUND_RANGE: RangeInclusive<u32> = 1..=24;

/// Race chosen on the selection form, kept within the ranges the form offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceSelection {
    pub year: u32,
    pub round: u32,
    pub session_type: SessionType,
}

impl RaceSelection {
    pub fn new(year: u32, round: u32, session_type: SessionType) -> Self {
        Self {
            year: year.clamp(*YEAR_RANGE.start(), *YEAR_RANGE.end()),
            round: round.clamp(*ROUND_RANGE.start(), *ROUND_RANGE.end()),
            session_type,
        }
    }

    pub fn request(&self) -> RaceRequest {
        RaceRequest {
            year: self.year,
            round: self.round,
            session_type: self.session_type,
        }
    }
}

/// Playback state of a loaded race. Dropping it tears down the clock, so nothing keeps asking
/// for repaints on behalf of a race that is gone.
pub struct ReplaySession {
    dataset: RaceDataset,
    clock: PlaybackClock,
    projector: Projector,
    selected_driver: Option<String>,
}

impl ReplaySession {
    pub fn new(dataset: RaceDataset) -> Self {
        let clock = PlaybackClock::new(dataset.frame_count());
        let projector = Projector::new(&dataset.track, dataset.circuit_rotation);
        Self {
            dataset,
            clock,
            projector,
            selected_driver: None,
        }
    }

    pub fn dataset(&self) -> &RaceDataset {
        &self.dataset
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut PlaybackClock {
        &mut self.clock
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    /// Frame under the playhead. `None` when the frame has no positions, which is shown as a
    /// placeholder until playback moves on.
    pub fn current_frame(&self) -> Option<&Frame> {
        self.dataset
            .frame(self.clock.current_frame())
            .filter(|frame| frame.positions.is_some())
    }

    /// Race time and lap of the frame under the playhead, available even for frames without
    /// positions.
    pub fn current_time_and_lap(&self) -> (f64, u32) {
        self.dataset
            .frame(self.clock.current_frame())
            .map(|frame| (frame.time, frame.lap))
            .unwrap_or_default()
    }

    pub fn tick(&mut self, timestamp_ms: f64) -> bool {
        self.clock.tick(timestamp_ms)
    }

    /// Selecting the selected driver again clears the selection.
    pub fn toggle_driver(&mut self, driver_code: &str) {
        if self.selected_driver.as_deref() == Some(driver_code) {
            self.selected_driver = None;
        } else {
            self.selected_driver = Some(driver_code.to_string());
        }
    }

    /// The selection if it is still present in the current frame.
    pub fn selected_driver(&self) -> Option<&str> {
        let code = self.selected_driver.as_deref()?;
        self.current_frame()?.position_of(code).map(|_| code)
    }

    pub fn standings(&self) -> Vec<StandingEntry> {
        self.current_frame()
            .map(|frame| standings::standings(frame, &self.dataset.drivers))
            .unwrap_or_default()
    }

    pub fn driver_readout(&self) -> Option<DriverReadout> {
        let frame = self.current_frame()?;
        standings::driver_readout(frame, &self.dataset.drivers, self.selected_driver())
    }
}

pub enum ShellState {
    Selecting,
    Loading { label: String },
    Error { message: String },
    Viewing(Box<ReplaySession>),
}

pub struct ViewerShell {
    state: ShellState,
    selection: RaceSelection,
    pending: Option<PendingLoad>,
}

impl ViewerShell {
    pub fn new(selection: RaceSelection) -> Self {
        Self {
            state: ShellState::Selecting,
            selection,
            pending: None,
        }
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn selection(&self) -> RaceSelection {
        self.selection
    }

    pub fn set_selection(&mut self, selection: RaceSelection) {
        self.selection = selection;
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ShellState::Loading { .. })
    }

    pub fn session(&self) -> Option<&ReplaySession> {
        match &self.state {
            ShellState::Viewing(session) => Some(session.as_ref()),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut ReplaySession> {
        match &mut self.state {
            ShellState::Viewing(session) => Some(session.as_mut()),
            _ => None,
        }
    }

    /// Starts a load. Ignored while another load is in flight.
    pub fn begin_load(&mut self, label: impl Into<String>, pending: PendingLoad) -> bool {
        if self.is_loading() {
            return false;
        }
        let label = label.into();
        info!("Loading {}", label);
        self.pending = Some(pending);
        self.state = ShellState::Loading { label };
        true
    }

    /// Picks up the result of the pending load, if any. Returns true when the state changed.
    pub fn poll_load(&mut self) -> bool {
        let Some(result) = self.pending.as_ref().and_then(|pending| pending.poll()) else {
            return false;
        };
        self.finish_load(result);
        true
    }

    pub fn finish_load(&mut self, result: Result<RaceDataset, ViewerError>) {
        self.pending = None;
        self.state = match result {
            Ok(dataset) => ShellState::Viewing(Box::new(ReplaySession::new(dataset))),
            Err(e) => {
                error!("Race data load failed: {}", e);
                ShellState::Error {
                    message: e.to_string(),
                }
            }
        };
    }

    /// Leaves the error screen for the selection form.
    pub fn retry(&mut self) {
        if matches!(self.state, ShellState::Error { .. }) {
            self.state = ShellState::Selecting;
        }
    }

    /// Drops the loaded race and its playback state.
    pub fn back_to_selection(&mut self) {
        if let ShellState::Viewing(session) = &self.state {
            info!("Unloading {}", session.dataset().event.name);
            self.state = ShellState::Selecting;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DriverPosition, TrackOutline};
    use std::collections::BTreeMap;

    fn frame(time: f64, entries: &[(&str, u32)]) -> Frame {
        Frame {
            time,
            lap: 1,
            positions: Some(
                entries
                    .iter()
                    .map(|(code, rank)| {
                        (
                            code.to_string(),
                            DriverPosition {
                                x: Some(1.),
                                y: Some(2.),
                                position: Some(*rank),
                                status: "OnTrack".to_string(),
                                ..Default::default()
                            },
                        )
                    })
                    .collect::<BTreeMap<_, _>>(),
            ),
        }
    }

    fn dataset() -> RaceDataset {
        RaceDataset {
            track: TrackOutline {
                x: vec![0., 10., 10.],
                y: vec![0., 0., 10.],
            },
            frames: vec![
                frame(0., &[("HAM", 2), ("VER", 1)]),
                Frame {
                    time: 0.5,
                    lap: 1,
                    positions: None,
                },
                frame(1., &[("VER", 1)]),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_selection_is_clamped_to_form_ranges() {
        let selection = RaceSelection::new(2010, 30, SessionType::Sprint);
        assert_eq!(selection.year, 2018);
        assert_eq!(selection.round, 24);
    }

    #[test]
    fn test_successful_load_starts_at_first_frame() {
        let mut shell = ViewerShell::new(RaceSelection::new(2024, 1, SessionType::Race));
        assert!(shell.begin_load("2024 round 1", PendingLoad::ready(Ok(dataset()))));
        assert!(shell.is_loading());
        assert!(shell.poll_load());

        let session = shell.session().unwrap();
        assert_eq!(session.clock().current_frame(), 0);
        assert!(!session.clock().is_playing());
        assert_eq!(session.standings().len(), 2);
    }

    #[test]
    fn test_second_load_ignored_while_loading() {
        let mut shell = ViewerShell::new(RaceSelection::new(2024, 1, SessionType::Race));
        assert!(shell.begin_load("first", PendingLoad::ready(Ok(dataset()))));
        assert!(!shell.begin_load("second", PendingLoad::ready(Ok(dataset()))));
        assert!(matches!(shell.state(), ShellState::Loading { label } if label == "first"));
    }

    #[test]
    fn test_failed_load_then_retry() {
        let mut shell = ViewerShell::new(RaceSelection::new(2024, 1, SessionType::Race));
        shell.begin_load(
            "broken",
            PendingLoad::ready(Err(ViewerError::Network {
                description: "connection refused".to_string(),
            })),
        );
        shell.poll_load();
        assert!(matches!(shell.state(), ShellState::Error { message } if !message.is_empty()));

        shell.retry();
        assert!(matches!(shell.state(), ShellState::Selecting));
        assert!(shell.session().is_none());
    }

    #[test]
    fn test_frame_without_positions_is_placeholder() {
        let mut session = ReplaySession::new(dataset());
        session.clock_mut().seek(1);
        assert!(session.current_frame().is_none());
        assert!(session.standings().is_empty());
        assert_eq!(session.current_time_and_lap(), (0.5, 1));
    }

    #[test]
    fn test_selection_resolves_weakly() {
        let mut session = ReplaySession::new(dataset());
        session.toggle_driver("HAM");
        assert_eq!(session.selected_driver(), Some("HAM"));
        assert!(session.driver_readout().is_some());

        session.clock_mut().seek(2);
        assert_eq!(session.selected_driver(), None);
        assert!(session.driver_readout().is_none());

        session.clock_mut().seek(0);
        session.toggle_driver("HAM");
        assert_eq!(session.selected_driver(), None);
    }

    #[test]
    fn test_back_to_selection_drops_session() {
        let mut shell = ViewerShell::new(RaceSelection::new(2024, 1, SessionType::Race));
        shell.finish_load(Ok(dataset()));
        shell.session_mut().unwrap().clock_mut().play();

        shell.back_to_selection();
        assert!(matches!(shell.state(), ShellState::Selecting));
        assert!(shell.session().is_none());
    }
}
