//! Channel-based data source.
//!
//! Receives raw device output via a tokio channel. This is useful for
//! embedding the dashboard in another program that already owns the
//! device connection, and for driving the pipeline in tests.

use std::collections::VecDeque;

use tokio::sync::mpsc;

use super::{DataSource, LineBuffer};

/// A data source fed with byte chunks through a channel.
///
/// Chunks do not need to be line aligned; they are framed with a
/// [`LineBuffer`] exactly like serial input. Polling never blocks and does
/// not need a tokio runtime.
///
/// # Example
///
/// ```
/// use envwatch::{ChannelSource, DataSource};
///
/// let (tx, mut source) = ChannelSource::create("bench rig");
/// tx.send(b"{\"temperature\":21,".to_vec()).unwrap();
/// assert!(source.poll().is_none());
/// tx.send(b"\"airQuality\":90,\"soundLevel\":35}\n".to_vec()).unwrap();
/// assert!(source.poll().is_some());
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::UnboundedReceiver<Vec<u8>>,
    buffer: LineBuffer,
    ready: VecDeque<String>,
    description: String,
    finished: bool,
}

impl ChannelSource {
    /// Create a new channel source from an existing receiver.
    pub fn new(receiver: mpsc::UnboundedReceiver<Vec<u8>>, source_description: &str) -> Self {
        Self {
            receiver,
            buffer: LineBuffer::new(),
            ready: VecDeque::new(),
            description: format!("channel: {}", source_description),
            finished: false,
        }
    }

    /// Create a channel pair.
    ///
    /// Returns (sender, source). Dropping every sender ends the source.
    pub fn create(source_description: &str) -> (mpsc::UnboundedSender<Vec<u8>>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx, source_description))
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<String> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Some(line);
            }

            match self.receiver.try_recv() {
                Ok(chunk) => self.ready.extend(self.buffer.push(&chunk)),
                Err(mpsc::error::TryRecvError::Empty) => return None,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.finished = true;
                    return None;
                }
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.finished.then(|| "Channel closed".to_string())
    }

    fn is_finished(&self) -> bool {
        self.finished && self.ready.is_empty()
    }
}
