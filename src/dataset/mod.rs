// Race dataset data model, as delivered by the race data API

pub mod loader;

use std::collections::{BTreeMap, HashMap, HashSet};

use itertools::Itertools;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ViewerError;

/// Status value of a driver that is racing. Any other status means retired, stopped or in the
/// pits.
pub const ON_TRACK_STATUS: &str = "OnTrack";

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EventInfo {
    pub name: String,
    pub round: u32,
    pub year: u32,
    pub session_type: String,
}

/// Circuit outline as two parallel coordinate sequences. Index order is path order and the
/// first point is the start/finish reference.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TrackOutline {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl TrackOutline {
    pub fn len(&self) -> usize {
        self.x.len().min(self.y.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn point(&self, index: usize) -> Option<(f64, f64)> {
        Some((*self.x.get(index)?, *self.y.get(index)?))
    }

    pub fn start_finish(&self) -> Option<(f64, f64)> {
        self.point(0)
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DriverPosition {
    /// Raw x coordinate, `None` when there is no telemetry for this frame
    pub x: Option<f64>,
    /// Raw y coordinate, `None` when there is no telemetry for this frame
    pub y: Option<f64>,
    /// Race rank, `None` when the driver is not currently classified
    pub position: Option<u32>,
    #[serde(default)]
    pub status: String,
    /// Tyre compound label, compared case-insensitively
    #[serde(default)]
    pub compound: String,
    /// Speed in km/h
    pub speed: Option<f64>,
    /// Display-only. Values that are not a whole gear number read as missing telemetry.
    #[serde(default, deserialize_with = "lenient_gear")]
    pub gear: Option<u8>,
    pub drs: Option<u32>,
}

impl DriverPosition {
    pub fn is_on_track(&self) -> bool {
        self.status == ON_TRACK_STATUS
    }

    /// Raw coordinates if both axes are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }

    pub fn is_drs_active(&self) -> bool {
        self.drs.is_some_and(|drs| drs != 0)
    }
}

/// One timestamped sample of the whole race.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Frame {
    /// Seconds elapsed since the session start
    pub time: f64,
    pub lap: u32,
    /// Driver code to position. `None` when the upstream frame is missing its positions, which
    /// the viewer shows as a placeholder rather than failing.
    #[serde(default)]
    pub positions: Option<BTreeMap<String, DriverPosition>>,
}

impl Frame {
    pub fn position_of(&self, driver_code: &str) -> Option<&DriverPosition> {
        self.positions.as_ref()?.get(driver_code)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DriverInfo {
    pub abbreviation: String,
    pub full_name: String,
    pub team: String,
    #[serde(deserialize_with = "string_or_number")]
    pub number: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RaceDataset {
    pub event: EventInfo,
    pub track: TrackOutline,
    pub frames: Vec<Frame>,
    /// Session time to track status code. Kept as raw JSON, see `track_status_at`.
    #[serde(default)]
    pub track_statuses: serde_json::Value,
    #[serde(default)]
    pub driver_colors: HashMap<String, String>,
    #[serde(default)]
    pub drivers: HashMap<String, DriverInfo>,
    /// Degrees applied to every track and driver coordinate before projection
    #[serde(default)]
    pub circuit_rotation: f64,
    pub total_laps: Option<u32>,
}

impl RaceDataset {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Latest track status change at or before `time`. Statuses come either as a map keyed by
    /// session time or as a list of `{"time", "status"}` records; any other shape has none.
    pub fn track_status_at(&self, time: f64) -> Option<String> {
        let changes: Vec<(f64, String)> = match &self.track_statuses {
            serde_json::Value::Object(map) => map
                .iter()
                .filter_map(|(t, status)| Some((t.parse::<f64>().ok()?, status_text(status)?)))
                .collect(),
            serde_json::Value::Array(records) => records
                .iter()
                .filter_map(|record| {
                    let t = record.get("time").or_else(|| record.get("t"))?.as_f64()?;
                    Some((t, status_text(record.get("status")?)?))
                })
                .collect(),
            _ => Vec::new(),
        };

        changes
            .into_iter()
            .filter(|(t, _)| *t <= time)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, status)| status)
    }

    /// Checks the structural invariants the viewer depends on. Violations of softer invariants
    /// (time ordering, drivers coming back after retiring) are only logged.
    pub fn validate(&self) -> Result<(), ViewerError> {
        if self.frames.is_empty() {
            return Err(ViewerError::InvalidDataset {
                reason: "race data contains no frames".to_string(),
            });
        }
        if self.track.x.is_empty() {
            return Err(ViewerError::InvalidDataset {
                reason: "track outline contains no points".to_string(),
            });
        }
        if self.track.x.len() != self.track.y.len() {
            return Err(ViewerError::InvalidDataset {
                reason: format!(
                    "track outline has {} x coordinates but {} y coordinates",
                    self.track.x.len(),
                    self.track.y.len()
                ),
            });
        }

        if self.track.len() == 1 {
            warn!("Track outline has a single point, only the start/finish marker will be drawn");
        }

        if let Some((index, _)) = self
            .frames
            .iter()
            .tuple_windows()
            .find_position(|(prev, cur)| cur.time < prev.time)
        {
            warn!("Frame {} goes back in time, playback order is kept", index + 1);
        }

        let reentries = self.reentered_drivers();
        if !reentries.is_empty() {
            warn!(
                "Drivers reappear after disappearing from the frames, which is not supported: {}",
                reentries.iter().join(", ")
            );
        }

        Ok(())
    }

    /// Driver codes that disappear from the frame sequence and later show up again.
    pub fn reentered_drivers(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut gone: HashSet<&str> = HashSet::new();
        let mut reentered: Vec<String> = Vec::new();

        for positions in self.frames.iter().filter_map(|f| f.positions.as_ref()) {
            for code in &seen {
                if !positions.contains_key(*code) {
                    gone.insert(*code);
                }
            }
            for code in positions.keys() {
                if gone.remove(code.as_str()) && !reentered.contains(code) {
                    reentered.push(code.clone());
                }
                seen.insert(code.as_str());
            }
        }

        reentered.sort();
        reentered
    }
}

fn status_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Human readable name of a track status code. Unknown codes are shown as they are.
pub fn track_status_label(code: &str) -> String {
    match code {
        "1" => "Green flag".to_string(),
        "2" => "Yellow flag".to_string(),
        "4" => "Safety car".to_string(),
        "5" => "Red flag".to_string(),
        "6" => "Virtual safety car".to_string(),
        "7" => "VSC ending".to_string(),
        other => format!("Status {}", other),
    }
}

fn lenient_gear<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let gear = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|g| g.fract() == 0. && *g >= 0.).map(|g| g as u64)),
        _ => None,
    };
    Ok(gear.and_then(|g| u8::try_from(g).ok()))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, found {}",
            other
        ))),
    }
}
