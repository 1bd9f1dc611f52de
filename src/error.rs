//! Error types for sources and record parsing.

use thiserror::Error;

/// Errors that can occur while turning a line into a [`SensorRecord`].
///
/// [`SensorRecord`]: crate::data::SensorRecord
#[derive(Debug, Error)]
pub enum RecordError {
    /// The line is not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The line parsed, but not as a JSON object.
    #[error("Expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// A required metric is absent.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// A required metric is present but not a number.
    #[error("Field {0} is not a number")]
    NotANumber(&'static str),
}

/// Errors that can occur when opening a data source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No serial port was specified and none could be picked automatically.
    #[error("No serial device selected: {0}")]
    NoDevice(String),

    /// The serial port could not be opened.
    #[error("Failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// Connecting to a network stream failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Any other I/O failure while setting up a source.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serialport::Error> for SourceError {
    fn from(err: serialport::Error) -> Self {
        match err.kind() {
            serialport::ErrorKind::NoDevice => SourceError::NoDevice(err.to_string()),
            _ => SourceError::Connection(err.to_string()),
        }
    }
}
