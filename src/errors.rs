// Error types for raceplay

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum ViewerError {
    // Errors while fetching a race dataset
    #[snafu(display("Failed to load race data: {status} {status_text}"))]
    HttpStatus { status: u16, status_text: String },
    #[snafu(display("Failed to load race data: {description}"))]
    Network { description: String },
    #[snafu(display("Failed to load race data: malformed JSON ({source})"))]
    DatasetParse { source: serde_json::Error },
    #[snafu(display("Failed to load race data from {path}: {source}"))]
    DatasetFile { path: String, source: io::Error },
    #[snafu(display("Failed to load race data: {reason}"))]
    InvalidDataset { reason: String },
    #[snafu(display("Race data request was dropped before it completed"))]
    LoadChannelClosed,

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIO { source: io::Error },
    #[snafu(display("Error parsing config file"))]
    ConfigParse { source: serde_json::Error },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_message_carries_status_text() {
        let err = ViewerError::HttpStatus {
            status: 500,
            status_text: "Internal Server Error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to load race data: 500 Internal Server Error"
        );
    }

    #[test]
    fn test_dataset_file_message_names_the_path() {
        let err = ViewerError::DatasetFile {
            path: "/tmp/race.json".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to load race data from /tmp/race.json: not found"
        );
    }
}
