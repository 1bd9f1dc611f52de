//! Newline framing for byte streams.

/// U+FEFF, sent by some devices at the start of a stream.
const BOM: char = '\u{feff}';

/// Accumulates raw bytes and hands out complete lines.
///
/// Bytes are buffered until a `\n` arrives. Everything up to the last
/// newline is split into lines; whatever follows it stays buffered for the
/// next push. The buffer therefore never holds a newline.
///
/// Lines are decoded after splitting, so a multi-byte UTF-8 character cut
/// in half by a read boundary is reassembled before decoding.
///
/// # Example
///
/// ```
/// use envwatch::LineBuffer;
///
/// let mut buffer = LineBuffer::new();
/// assert!(buffer.push(b"{\"temperature\":2").is_empty());
/// let lines = buffer.push(b"1}\n  \n{\"tem");
/// assert_eq!(lines, vec![r#"{"temperature":21}"#.to_string()]);
/// assert_eq!(buffer.pending(), b"{\"tem");
/// ```
#[derive(Debug, Default, Clone)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return the complete lines it finished, without
    /// their terminating `\n` and otherwise untouched.
    pub fn push_raw(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.pending.extend_from_slice(chunk);

        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let rest = self.pending.split_off(last_newline + 1);
        let mut complete = std::mem::replace(&mut self.pending, rest);
        complete.pop(); // trailing '\n'

        complete.split(|&b| b == b'\n').map(<[u8]>::to_vec).collect()
    }

    /// Append a chunk and return the records it completed: each line decoded
    /// as UTF-8, trimmed of whitespace and byte order marks, and dropped if
    /// nothing is left.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.push_raw(chunk)
            .iter()
            .filter_map(|line| {
                let text = String::from_utf8_lossy(line);
                let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == BOM);
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .collect()
    }

    /// Bytes received after the last newline.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM: &[u8] = b"{\"temperature\":21,\"airQuality\":100,\"soundLevel\":40}\r\n\
        \n   \n{\"temperature\":22.5,\"airQuality\":101,\"soundLevel\":41}\n\
        caf\xc3\xa9\n{\"temperature\":2";

    /// Feed `input` in chunks of `size` and collect raw lines.
    fn feed(input: &[u8], size: usize) -> (Vec<Vec<u8>>, Vec<u8>) {
        let mut buffer = LineBuffer::new();
        let mut lines = Vec::new();
        for chunk in input.chunks(size) {
            lines.extend(buffer.push_raw(chunk));
        }
        (lines, buffer.pending().to_vec())
    }

    #[test]
    fn test_reassembly_matches_input_minus_partial_line() {
        let complete_len = STREAM.iter().rposition(|&b| b == b'\n').unwrap() + 1;

        for size in [1, 2, 3, 7, 16, STREAM.len()] {
            let (lines, pending) = feed(STREAM, size);

            let mut rebuilt = Vec::new();
            for line in &lines {
                rebuilt.extend_from_slice(line);
                rebuilt.push(b'\n');
            }

            assert_eq!(rebuilt, &STREAM[..complete_len], "chunk size {}", size);
            assert_eq!(pending, &STREAM[complete_len..], "chunk size {}", size);
        }
    }

    #[test]
    fn test_pending_never_contains_newline() {
        let mut buffer = LineBuffer::new();
        for chunk in STREAM.chunks(5) {
            buffer.push_raw(chunk);
            assert!(!buffer.pending().contains(&b'\n'));
        }
    }

    #[test]
    fn test_whitespace_lines_are_skipped() {
        let mut buffer = LineBuffer::new();
        let lines = buffer.push(b"  \n\t\r\n\nabc\n \n");
        assert_eq!(lines, vec!["abc".to_string()]);
    }

    #[test]
    fn test_lines_are_trimmed() {
        let mut buffer = LineBuffer::new();
        let lines = buffer.push(b"  {\"a\":1}  \r\n");
        assert_eq!(lines, vec![r#"{"a":1}"#.to_string()]);
    }

    #[test]
    fn test_byte_order_mark_is_stripped() {
        let mut buffer = LineBuffer::new();
        let lines = buffer.push(b"\xef\xbb\xbf{\"temperature\":21}\n\xef\xbb\xbf\n");
        assert_eq!(lines, vec![r#"{"temperature":21}"#.to_string()]);

        // Split across reads
        assert!(buffer.push(b"\xef\xbb").is_empty());
        assert_eq!(buffer.push(b"\xbf{\"a\":1}\n"), vec![r#"{"a":1}"#.to_string()]);
    }

    #[test]
    fn test_multibyte_split_across_chunks() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"caf\xc3").is_empty());
        assert_eq!(buffer.push(b"\xa9\n"), vec!["café".to_string()]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_trailing_newline_leaves_empty_buffer() {
        let mut buffer = LineBuffer::new();
        let lines = buffer.push(b"one\ntwo\n");
        assert_eq!(lines, vec!["one".to_string(), "two".to_string()]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_no_newline_emits_nothing() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"partial").is_empty());
        assert!(buffer.push(b" still partial").is_empty());
        assert_eq!(buffer.pending(), b"partial still partial");
    }
}
