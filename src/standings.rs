// Leaderboard and selected driver readout derived from a single frame

use std::collections::HashMap;

use itertools::Itertools;

use crate::dataset::{DriverInfo, Frame};
use crate::palette::{self, Rgb};

const UNKNOWN_TEAM: &str = "Unknown";
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub struct StandingEntry {
    pub driver_code: String,
    pub position: u32,
    pub team: String,
    pub compound: String,
    pub compound_color: Rgb,
    /// Set when the status is anything other than on track
    pub is_out: bool,
}

/// Classified drivers of `frame` in race order. Drivers without a position are left out.
/// Equal positions, which valid data never has, fall back to driver code order.
pub fn standings(frame: &Frame, drivers: &HashMap<String, DriverInfo>) -> Vec<StandingEntry> {
    let Some(positions) = frame.positions.as_ref() else {
        return Vec::new();
    };

    positions
        .iter()
        .filter_map(|(code, pos)| pos.position.map(|rank| (code, rank, pos)))
        .sorted_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(code, rank, pos)| StandingEntry {
            driver_code: code.clone(),
            position: rank,
            team: drivers
                .get(code)
                .map(|d| d.team.clone())
                .unwrap_or_else(|| UNKNOWN_TEAM.to_string()),
            compound: pos.compound.clone(),
            compound_color: palette::compound_color(&pos.compound),
            is_out: !pos.is_on_track(),
        })
        .collect()
}

/// Formatted telemetry of the selected driver.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverReadout {
    pub driver_code: String,
    pub full_name: Option<String>,
    pub speed: String,
    pub gear: String,
    pub drs_active: bool,
    pub lap: u32,
}

/// Resolves the selection against the frame. A selection that is not present in the frame
/// yields nothing.
pub fn driver_readout(
    frame: &Frame,
    drivers: &HashMap<String, DriverInfo>,
    selected: Option<&str>,
) -> Option<DriverReadout> {
    let code = selected?;
    let pos = frame.position_of(code)?;

    Some(DriverReadout {
        driver_code: code.to_string(),
        full_name: drivers.get(code).map(|d| d.full_name.clone()),
        speed: pos
            .speed
            .map(|s| format!("{:.1} km/h", s))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        gear: pos
            .gear
            .map(|g| g.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        drs_active: pos.is_drs_active(),
        lap: frame.lap,
    })
}

/// `HH:MM:SS` race clock.
pub fn format_race_time(seconds: f64) -> String {
    let total = seconds.max(0.).floor() as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// `M:SS` clock used by the transport bar.
pub fn format_short_time(seconds: f64) -> String {
    let total = seconds.max(0.).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// `Lap L / T`, or just `Lap L` when the total is unknown.
pub fn format_lap(lap: u32, total_laps: Option<u32>) -> String {
    match total_laps {
        Some(total) => format!("Lap {} / {}", lap, total),
        None => format!("Lap {}", lap),
    }
}
