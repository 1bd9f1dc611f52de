//! Data source abstraction for receiving sensor lines.
//!
//! This module provides a trait-based abstraction over where device output
//! comes from: a serial port, a network stream or file, or an in-memory
//! channel. Every source frames its input with a [`LineBuffer`] and yields
//! complete, trimmed, non-empty lines in the order they arrived.

mod channel;
mod line_buffer;
mod serial;
mod stream;

pub use channel::ChannelSource;
pub use line_buffer::LineBuffer;
pub use serial::{list_ports, SerialSource, DEFAULT_BAUD_RATE};
pub use stream::StreamSource;

use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::SourceError;

/// Trait for receiving device lines from various sources.
///
/// # Example
///
/// ```
/// use envwatch::{ChannelSource, DataSource};
///
/// let (tx, mut source) = ChannelSource::create("example");
/// tx.send(b"{\"temperature\":21}\n".to_vec()).unwrap();
/// assert_eq!(source.poll().as_deref(), Some(r#"{"temperature":21}"#));
/// ```
pub trait DataSource: Send + Debug {
    /// Take the next complete line, if one is ready.
    ///
    /// This method must not block.
    fn poll(&mut self) -> Option<String>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// The last error reported by the source, if any.
    fn error(&self) -> Option<String>;

    /// True once the underlying stream has ended and every buffered line
    /// has been handed out.
    fn is_finished(&self) -> bool;
}

/// Where device lines come from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    /// A serial port; `None` picks the only port present.
    Serial {
        port: Option<String>,
        baud_rate: u32,
    },
    /// A TCP serial bridge, `host:port`.
    Tcp(String),
    /// A captured session replayed from a file.
    Replay(PathBuf),
}

/// Open the configured source.
///
/// Must be awaited within a tokio runtime; stream sources spawn their
/// reader task on it.
pub async fn open(config: &SourceConfig) -> Result<Box<dyn DataSource>, SourceError> {
    let source: Box<dyn DataSource> = match config {
        SourceConfig::Serial { port, baud_rate } => {
            Box::new(SerialSource::open_auto(port.as_deref(), *baud_rate)?)
        }
        SourceConfig::Tcp(addr) => Box::new(StreamSource::connect(addr).await?),
        SourceConfig::Replay(path) => Box::new(StreamSource::replay(path).await?),
    };
    Ok(source)
}

/// Error slot shared between a source and its background reader.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedStatus(Arc<Mutex<Option<String>>>);

impl SharedStatus {
    pub(crate) fn set(&self, message: impl Into<String>) {
        let mut guard = self.0.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(message.into());
    }

    pub(crate) fn get(&self) -> Option<String> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
