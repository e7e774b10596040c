use std::collections::VecDeque;

/// Carry-over buffer for line-based parsing of a byte stream.
///
/// Bytes are appended as they arrive; complete lines are drained off the front, and a
/// partial line waits for the next read.
pub struct CircularLineBuffer {
    buffer: VecDeque<u8>,
}

impl CircularLineBuffer {
    /// Create a new buffer with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    /// Add bytes to the buffer
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Extract next line (up to \n), trimmed of surrounding whitespace.
    ///
    /// Returns None if no complete line is available, `Some(Err(bytes))` if the line is
    /// not valid UTF-8.
    pub fn next_line(&mut self) -> Option<Result<String, Vec<u8>>> {
        let newline_pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
        Some(decode_line(line_bytes))
    }

    /// Drain whatever is left once the source has ended
    pub fn take_remainder(&mut self) -> Option<Result<String, Vec<u8>>> {
        if self.buffer.is_empty() {
            return None;
        }
        let line_bytes: Vec<u8> = self.buffer.drain(..).collect();
        Some(decode_line(line_bytes))
    }

    /// Current buffer size
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

fn decode_line(line_bytes: Vec<u8>) -> Result<String, Vec<u8>> {
    match String::from_utf8(line_bytes) {
        Ok(line) => Ok(line.trim().to_string()),
        Err(e) => Err(e.into_bytes()),
    }
}
