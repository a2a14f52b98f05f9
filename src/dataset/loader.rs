use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use super::RaceDataset;
use crate::errors::ViewerError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionType {
    #[default]
    Race,
    Sprint,
}

impl SessionType {
    pub const ALL: [SessionType; 2] = [SessionType::Race, SessionType::Sprint];

    /// Session code used by the race data API.
    pub fn code(&self) -> &'static str {
        match self {
            SessionType::Race => "R",
            SessionType::Sprint => "S",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionType::Race => "Race",
            SessionType::Sprint => "Sprint",
        }
    }

    /// Accepts either the API code or the display label, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| {
            s.code().eq_ignore_ascii_case(value) || s.label().eq_ignore_ascii_case(value)
        })
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceRequest {
    pub year: u32,
    pub round: u32,
    pub session_type: SessionType,
}

impl RaceRequest {
    pub fn url(&self, api_base_url: &str) -> String {
        format!(
            "{}/api/race/{}/{}?session_type={}",
            api_base_url.trim_end_matches('/'),
            self.year,
            self.round,
            self.session_type.code()
        )
    }
}

impl fmt::Display for RaceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} round {} ({})",
            self.year, self.round, self.session_type
        )
    }
}

/// Parses and validates a race dataset document.
pub fn parse_dataset(body: &[u8]) -> Result<RaceDataset, ViewerError> {
    let dataset: RaceDataset =
        serde_json::from_slice(body).map_err(|e| ViewerError::DatasetParse { source: e })?;
    dataset.validate()?;

    info!(
        "Loaded {} with {} frames, {} drivers and {} track points",
        dataset.event.name,
        dataset.frame_count(),
        dataset.drivers.len(),
        dataset.track.len()
    );
    Ok(dataset)
}

/// Turns an HTTP response into a dataset. Any status outside 2xx is a load failure carrying the
/// status text.
pub fn decode_response(
    status: u16,
    status_text: &str,
    body: &[u8],
) -> Result<RaceDataset, ViewerError> {
    debug!("Race data response status: {} {}", status, status_text);
    if !(200..300).contains(&status) {
        return Err(ViewerError::HttpStatus {
            status,
            status_text: status_text.to_string(),
        });
    }
    parse_dataset(body)
}

pub fn load_dataset_file(path: &Path) -> Result<RaceDataset, ViewerError> {
    let body = std::fs::read(path).map_err(|e| ViewerError::DatasetFile {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_dataset(&body)
}

/// A dataset load in flight. The result is delivered once through a channel and picked up by
/// polling from the UI thread.
pub struct PendingLoad {
    receiver: Receiver<Result<RaceDataset, ViewerError>>,
}

impl PendingLoad {
    /// Starts fetching `request` from the race data API. `notify` runs on the fetch thread once
    /// the result is available, typically to request a repaint.
    pub fn fetch(
        api_base_url: &str,
        request: RaceRequest,
        notify: impl FnOnce() + Send + 'static,
    ) -> Self {
        let (sender, receiver) = mpsc::channel();
        let url = request.url(api_base_url);
        info!("Loading race {} from {}", request, url);

        ehttp::fetch(ehttp::Request::get(&url), move |response| {
            let result = match response {
                Ok(response) => {
                    decode_response(response.status, &response.status_text, &response.bytes)
                }
                Err(description) => Err(ViewerError::Network { description }),
            };
            if let Err(e) = &result {
                error!("Error loading race data from {}: {}", url, e);
            }
            // the receiver is gone if the viewer was closed while loading
            let _ = sender.send(result);
            notify();
        });

        Self { receiver }
    }

    /// Reads and parses a dataset file on a background thread. `notify` runs on that thread once
    /// the result is available.
    pub fn read_file(path: PathBuf, notify: impl FnOnce() + Send + 'static) -> Self {
        let (sender, receiver) = mpsc::channel();
        info!("Loading race from {}", path.display());

        thread::spawn(move || {
            let result = load_dataset_file(&path);
            if let Err(e) = &result {
                error!("Error loading race data: {}", e);
            }
            let _ = sender.send(result);
            notify();
        });

        Self { receiver }
    }

    /// Wraps an already available result, e.g. a dataset read from a local file.
    pub fn ready(result: Result<RaceDataset, ViewerError>) -> Self {
        let (sender, receiver) = mpsc::channel();
        let _ = sender.send(result);
        Self { receiver }
    }

    /// Returns the load result once it is available.
    pub fn poll(&self) -> Option<Result<RaceDataset, ViewerError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ViewerError::LoadChannelClosed)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL_DATASET: &str = r##"{
        "event": {"name": "Bahrain Grand Prix", "round": 1, "year": 2024, "session_type": "R"},
        "track": {"x": [0.0, 100.0, 100.0], "y": [0.0, 0.0, 50.0]},
        "frames": [
            {"time": 0.0, "lap": 1, "positions": {
                "VER": {"x": 1.0, "y": 2.0, "position": 1, "status": "OnTrack", "compound": "SOFT",
                        "speed": 120.5, "gear": 3, "drs": 0}
            }}
        ],
        "driver_colors": {"VER": "#3671C6"},
        "drivers": {"VER": {"abbreviation": "VER", "full_name": "Max Verstappen",
                            "team": "Red Bull Racing", "number": "1"}},
        "circuit_rotation": 92.0,
        "total_laps": 57
    }"##;

    #[test]
    fn test_request_url() {
        let request = RaceRequest {
            year: 2024,
            round: 5,
            session_type: SessionType::Sprint,
        };
        assert_eq!(
            request.url("http://localhost:8000/"),
            "http://localhost:8000/api/race/2024/5?session_type=S"
        );
    }

    #[test]
    fn test_session_type_parse() {
        assert_eq!(SessionType::parse("r"), Some(SessionType::Race));
        assert_eq!(SessionType::parse("Sprint"), Some(SessionType::Sprint));
        assert_eq!(SessionType::parse("Q"), None);
    }

    #[test]
    fn test_decode_ok_response() {
        let dataset = decode_response(200, "OK", MINIMAL_DATASET.as_bytes()).unwrap();
        assert_eq!(dataset.frame_count(), 1);
        assert_eq!(dataset.total_laps, Some(57));
        assert_eq!(dataset.circuit_rotation, 92.0);
    }

    #[test]
    fn test_decode_server_error() {
        let result = decode_response(500, "Internal Server Error", b"{\"detail\": \"boom\"}");
        match result {
            Err(ViewerError::HttpStatus {
                status,
                status_text,
            }) => {
                assert_eq!(status, 500);
                assert_eq!(status_text, "Internal Server Error");
            }
            _ => panic!("Expected HttpStatus error"),
        }
    }

    #[test]
    fn test_decode_malformed_json() {
        let result = decode_response(200, "OK", b"{\"event\": ");
        assert!(matches!(result, Err(ViewerError::DatasetParse { .. })));
    }

    #[test]
    fn test_load_dataset_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", MINIMAL_DATASET).unwrap();
        file.flush().unwrap();

        let dataset = load_dataset_file(file.path()).unwrap();
        assert_eq!(dataset.event.name, "Bahrain Grand Prix");
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_dataset_file(Path::new("/nonexistent/race.json"));
        assert!(matches!(result, Err(ViewerError::DatasetFile { .. })));
    }

    #[test]
    fn test_odd_shaped_display_fields_still_load() {
        let body = MINIMAL_DATASET
            .replace(r#""gear": 3"#, r#""gear": 7.0"#)
            .replace(
                r#""circuit_rotation""#,
                r#""track_statuses": [{"status": "1", "message": "AllClear"}], "circuit_rotation""#,
            );
        let dataset = parse_dataset(body.as_bytes()).unwrap();
        assert_eq!(dataset.frames[0].position_of("VER").unwrap().gear, Some(7));
        assert_eq!(dataset.track_status_at(0.), None);

        let body = MINIMAL_DATASET.replace(
            r#""circuit_rotation""#,
            r#""track_statuses": {"0.0": 1}, "circuit_rotation""#,
        );
        let dataset = parse_dataset(body.as_bytes()).unwrap();
        assert_eq!(dataset.track_status_at(0.), Some("1".to_string()));
    }

    #[test]
    fn test_read_file_in_background() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", MINIMAL_DATASET).unwrap();
        file.flush().unwrap();

        let (notify_tx, notify_rx) = mpsc::channel();
        let pending = PendingLoad::read_file(file.path().to_path_buf(), move || {
            notify_tx.send(()).unwrap();
        });
        notify_rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .unwrap();

        let dataset = pending.poll().unwrap().unwrap();
        assert_eq!(dataset.event.name, "Bahrain Grand Prix");
    }

    #[test]
    fn test_read_missing_file_in_background() {
        let (notify_tx, notify_rx) = mpsc::channel();
        let pending = PendingLoad::read_file(PathBuf::from("/nonexistent/race.json"), move || {
            notify_tx.send(()).unwrap();
        });
        notify_rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .unwrap();

        assert!(matches!(
            pending.poll(),
            Some(Err(ViewerError::DatasetFile { .. }))
        ));
    }

    #[test]
    fn test_pending_load_ready_delivers_once() {
        let pending = PendingLoad::ready(Err(ViewerError::Network {
            description: "offline".to_string(),
        }));
        assert!(matches!(
            pending.poll(),
            Some(Err(ViewerError::Network { .. }))
        ));
        // sender was dropped after the first message
        assert!(matches!(
            pending.poll(),
            Some(Err(ViewerError::LoadChannelClosed))
        ));
    }
}
