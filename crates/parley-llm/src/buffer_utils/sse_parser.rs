use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::pin::Pin;

use super::buffering::CircularLineBuffer;
use crate::error::{LlmError, Result};

/// One meaningful line of a server-sent event stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseRecord {
    Data(String),
    Done,
}

/// Classify a trimmed line. Blank lines, comments and non-data fields yield `None`.
pub fn parse_sse_line(line: &str) -> Option<SseRecord> {
    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);

    if data == "[DONE]" {
        Some(SseRecord::Done)
    } else {
        Some(SseRecord::Data(data.to_string()))
    }
}

/// Frame a byte stream into `data:` payloads.
///
/// Ends at the `[DONE]` sentinel or when the source ends, whichever comes first. A line
/// that is not valid UTF-8 is logged and skipped. A read error is yielded and ends the
/// stream; dropping the returned stream drops the source.
pub fn parse_sse_stream<S, B, E>(bytes: S) -> Pin<Box<dyn Stream<Item = Result<String>> + Send>>
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(bytes);
        let mut buffer = CircularLineBuffer::with_capacity(4096);

        while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes.as_ref());

                    while let Some(line_result) = buffer.next_line() {
                        match line_result.map(|line| parse_sse_line(&line)) {
                            Ok(Some(SseRecord::Done)) => return,
                            Ok(Some(SseRecord::Data(data))) => yield Ok(data),
                            Ok(None) => {}
                            Err(raw) => {
                                tracing::warn!(bytes = raw.len(), "Skipping stream line with invalid UTF-8");
                            }
                        }
                    }
                }
                Err(e) => {
                    yield Err(LlmError::Stream(e.to_string()));
                    return;
                }
            }
        }

        // Last line may arrive without a trailing newline
        if let Some(Ok(line)) = buffer.take_remainder() {
            if let Some(SseRecord::Data(data)) = parse_sse_line(&line) {
                yield Ok(data);
            }
        }
    })
}
