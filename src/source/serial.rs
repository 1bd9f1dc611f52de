//! Serial port data source.
//!
//! The port is read with blocking calls on a dedicated thread. Complete
//! lines are handed to the UI thread over a bounded channel, so they are
//! processed strictly in the order the device sent them.

use std::io::{ErrorKind, Read};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::{DataSource, LineBuffer, SharedStatus};
use crate::error::SourceError;

/// Baud rate the sensor firmware talks at.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Read timeout; a timeout is not end of stream, it only lets the reader
/// notice a dropped receiver.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

const CHANNEL_CAPACITY: usize = 256;
const READ_CHUNK_SIZE: usize = 1024;

/// A data source reading newline-delimited JSON from a serial device.
#[derive(Debug)]
pub struct SerialSource {
    receiver: mpsc::Receiver<String>,
    description: String,
    status: SharedStatus,
    finished: bool,
}

impl SerialSource {
    /// Open `port` at `baud_rate` and start reading.
    ///
    /// Failing to open the port is fatal for the session; there is no retry.
    pub fn open(port: &str, baud_rate: u32) -> Result<Self, SourceError> {
        info!("Opening serial port {} at {} baud", port, baud_rate);

        let serial = serialport::new(port, baud_rate)
            .timeout(READ_TIMEOUT)
            .flow_control(serialport::FlowControl::None)
            .open()
            .map_err(|source| SourceError::Open {
                port: port.to_string(),
                source,
            })?;

        Ok(Self::from_reader(
            serial,
            &format!("serial: {} @ {} baud", port, baud_rate),
        ))
    }

    /// Open the given port, or the only port present when none is given.
    pub fn open_auto(port: Option<&str>, baud_rate: u32) -> Result<Self, SourceError> {
        let port = match port {
            Some(port) => port.to_string(),
            None => {
                let ports = serialport::available_ports()?;
                choose_port(ports.into_iter().map(|p| p.port_name).collect())?
            }
        };
        Self::open(&port, baud_rate)
    }

    /// Start reading from any blocking reader.
    ///
    /// A background thread reads chunks until the reader reports end of
    /// stream or a non-transient error.
    pub fn from_reader<R>(reader: R, description: &str) -> Self
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let status = SharedStatus::default();
        let thread_status = status.clone();

        let spawned = std::thread::Builder::new()
            .name("serial-reader".to_string())
            .spawn(move || read_loop(reader, tx, thread_status));

        if let Err(e) = spawned {
            // The sender went down with the closure, so the source reports
            // itself finished on first poll.
            error!("Failed to start serial reader thread: {}", e);
            status.set(format!("Reader thread failed: {}", e));
        }

        Self {
            receiver: rx,
            description: description.to_string(),
            status,
            finished: false,
        }
    }
}

fn read_loop<R: Read>(mut reader: R, tx: mpsc::Sender<String>, status: SharedStatus) {
    let mut buffer = LineBuffer::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        match reader.read(&mut chunk) {
            Ok(0) => {
                info!("Serial stream ended");
                status.set("Serial port closed");
                break;
            }
            Ok(n) => {
                for line in buffer.push(&chunk[..n]) {
                    if tx.blocking_send(line).is_err() {
                        debug!("Receiver dropped, stopping serial reader");
                        return;
                    }
                }
            }
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::Interrupted | ErrorKind::WouldBlock
                ) =>
            {
                if tx.is_closed() {
                    debug!("Receiver dropped, stopping serial reader");
                    return;
                }
            }
            Err(e) => {
                error!("Serial read error: {}", e);
                status.set(format!("Read error: {}", e));
                break;
            }
        }
    }

    if !buffer.is_empty() {
        warn!(
            "Discarding {} bytes of unterminated trailing data",
            buffer.pending().len()
        );
    }
}

/// Pick a port when the user did not name one: only an unambiguous choice
/// is accepted.
fn choose_port(mut names: Vec<String>) -> Result<String, SourceError> {
    match names.len() {
        0 => Err(SourceError::NoDevice("no serial ports found".to_string())),
        1 => Ok(names.remove(0)),
        n => Err(SourceError::NoDevice(format!(
            "{} ports found ({}); choose one with --port",
            n,
            names.join(", ")
        ))),
    }
}

/// Describe every serial port on the system, one line each.
pub fn list_ports() -> Result<Vec<String>, SourceError> {
    let ports = serialport::available_ports()?;
    Ok(ports.iter().map(describe_port).collect())
}

fn describe_port(port: &serialport::SerialPortInfo) -> String {
    match &port.port_type {
        serialport::SerialPortType::UsbPort(info) => {
            let mut line = format!(
                "{} - USB (VID: 0x{:04x}, PID: 0x{:04x})",
                port.port_name, info.vid, info.pid
            );
            if let Some(ref product) = info.product {
                line.push_str(&format!(" {}", product));
            }
            line
        }
        serialport::SerialPortType::BluetoothPort => format!("{} - Bluetooth", port.port_name),
        serialport::SerialPortType::PciPort => format!("{} - PCI", port.port_name),
        serialport::SerialPortType::Unknown => port.port_name.clone(),
    }
}

impl DataSource for SerialSource {
    fn poll(&mut self) -> Option<String> {
        match self.receiver.try_recv() {
            Ok(line) => Some(line),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.finished = true;
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.status.get()
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::{self, Cursor};
    use std::time::Instant;

    /// Poll until the source finishes, collecting every line.
    fn drain(source: &mut SerialSource) -> Vec<String> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut lines = Vec::new();
        while !source.is_finished() && Instant::now() < deadline {
            match source.poll() {
                Some(line) => lines.push(line),
                None => std::thread::sleep(Duration::from_millis(5)),
            }
        }
        lines
    }

    /// A reader that replays scripted results, then reports end of stream.
    struct ScriptedReader(VecDeque<io::Result<Vec<u8>>>);

    impl Read for ScriptedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                Some(Ok(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                Some(Err(e)) => Err(e),
                None => Ok(0),
            }
        }
    }

    #[test]
    fn test_serial_source_reads_lines_in_order() {
        let data = "{\"n\":1}\n{\"n\":2}\n\n   \n{\"n\":3}\npartial";
        let mut source = SerialSource::from_reader(Cursor::new(data), "test");

        let lines = drain(&mut source);
        assert_eq!(lines, vec![r#"{"n":1}"#, r#"{"n":2}"#, r#"{"n":3}"#]);
        assert!(source.is_finished());
        assert_eq!(source.error().as_deref(), Some("Serial port closed"));
    }

    #[test]
    fn test_serial_source_survives_timeouts() {
        let script = VecDeque::from(vec![
            Ok(b"{\"n\":".to_vec()),
            Err(io::Error::new(ErrorKind::TimedOut, "timeout")),
            Ok(b"1}\n".to_vec()),
            Err(io::Error::new(ErrorKind::Interrupted, "interrupted")),
            Ok(b"{\"n\":2}\n".to_vec()),
        ]);
        let mut source = SerialSource::from_reader(ScriptedReader(script), "test");

        assert_eq!(drain(&mut source), vec![r#"{"n":1}"#, r#"{"n":2}"#]);
    }

    #[test]
    fn test_serial_source_stops_on_read_error() {
        let script = VecDeque::from(vec![
            Ok(b"{\"n\":1}\n".to_vec()),
            Err(io::Error::new(ErrorKind::BrokenPipe, "device unplugged")),
            Ok(b"{\"n\":2}\n".to_vec()),
        ]);
        let mut source = SerialSource::from_reader(ScriptedReader(script), "test");

        assert_eq!(drain(&mut source), vec![r#"{"n":1}"#]);
        assert!(source.error().unwrap().starts_with("Read error"));
    }

    #[test]
    fn test_choose_port() {
        assert!(matches!(choose_port(vec![]), Err(SourceError::NoDevice(_))));
        assert_eq!(choose_port(vec!["/dev/ttyACM0".to_string()]).unwrap(), "/dev/ttyACM0");

        let err = choose_port(vec!["/dev/ttyACM0".to_string(), "/dev/ttyUSB0".to_string()])
            .unwrap_err();
        assert!(err.to_string().contains("choose one with --port"));
    }

    #[test]
    fn test_open_missing_port_fails() {
        let result = SerialSource::open("/dev/envwatch-does-not-exist", DEFAULT_BAUD_RATE);
        assert!(matches!(result, Err(SourceError::Open { .. })));
    }
}
