// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Newline-delimited JSON decoding of Ollama streaming responses.

use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use ragchat_core::{ChunkStream, RagError};
use tracing::{debug, warn};

use crate::types::ChatResponseLine;

/// Splits an arbitrary byte feed into complete lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Next complete, non-blank line, without its terminator.
    pub fn next_line(&mut self) -> Option<String> {
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line);
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        None
    }

    /// Whatever follows the last newline, consumed.
    pub fn take_rest(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buf);
        let text = String::from_utf8_lossy(&rest).trim().to_string();
        (!text.is_empty()).then_some(text)
    }
}

enum Decoded {
    Text(String),
    Done(String),
}

fn decode_line(line: &str) -> Result<Decoded, RagError> {
    let parsed: ChatResponseLine = serde_json::from_str(line).map_err(|e| RagError::Generation {
        message: format!("malformed stream line: {e}"),
        source: Some(Box::new(e)),
    })?;
    if let Some(error) = parsed.error {
        return Err(RagError::generation(error));
    }
    let text = parsed.message.map(|m| m.content).unwrap_or_default();
    Ok(if parsed.done {
        Decoded::Done(text)
    } else {
        Decoded::Text(text)
    })
}

struct ChatState<S> {
    inner: Pin<Box<S>>,
    lines: LineBuffer,
    idle: Duration,
    eof: bool,
    finished: bool,
}

/// Turn a chat response body into a stream of text chunks.
///
/// The stream ends after a `done` line or when the body closes. A transport
/// error, a malformed or `error` line, or `idle` without new bytes yields a
/// single `Err(Generation)` and ends the stream. Empty chunks are skipped.
pub fn chat_chunks<S, E>(body: S, idle: Duration) -> ChunkStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    let state = ChatState {
        inner: Box::pin(body),
        lines: LineBuffer::default(),
        idle,
        eof: false,
        finished: false,
    };

    Box::pin(futures::stream::unfold(state, |mut st| async move {
        loop {
            if st.finished {
                return None;
            }

            if let Some(line) = st.lines.next_line() {
                match decode_line(&line) {
                    Ok(Decoded::Text(text)) if text.is_empty() => continue,
                    Ok(Decoded::Text(text)) => return Some((Ok(text), st)),
                    Ok(Decoded::Done(text)) => {
                        st.finished = true;
                        debug!("generation stream completed");
                        if text.is_empty() {
                            return None;
                        }
                        return Some((Ok(text), st));
                    }
                    Err(e) => {
                        warn!(error = %e, "generation stream failed");
                        st.finished = true;
                        return Some((Err(e), st));
                    }
                }
            }

            if st.eof {
                return None;
            }

            match tokio::time::timeout(st.idle, st.inner.next()).await {
                Ok(Some(Ok(bytes))) => st.lines.push(&bytes),
                Ok(Some(Err(e))) => {
                    warn!(error = %e, "generation stream interrupted");
                    st.finished = true;
                    let err = RagError::Generation {
                        message: format!("stream interrupted: {e}"),
                        source: Some(Box::new(e)),
                    };
                    return Some((Err(err), st));
                }
                Ok(None) => {
                    st.eof = true;
                    if let Some(rest) = st.lines.take_rest() {
                        st.lines.push(rest.as_bytes());
                        st.lines.push(b"\n");
                    }
                }
                Err(_) => {
                    warn!(idle_secs = st.idle.as_secs(), "generation stream idle timeout");
                    st.finished = true;
                    let err = RagError::Generation {
                        message: format!("no output for {:?}", st.idle),
                        source: Some(Box::new(RagError::Timeout { duration: st.idle })),
                    };
                    return Some((Err(err), st));
                }
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    type Feed = Vec<Result<Bytes, std::io::Error>>;

    fn feed(parts: &[&str]) -> Feed {
        parts
            .iter()
            .map(|p| Ok(Bytes::from(p.to_string())))
            .collect()
    }

    async fn collect(stream: ChunkStream) -> Vec<Result<String, RagError>> {
        stream.collect().await
    }

    #[test]
    fn line_buffer_handles_split_lines() {
        let mut lines = LineBuffer::default();
        lines.push(b"{\"a\":1}\n\n{\"b\"");
        assert_eq!(lines.next_line().as_deref(), Some("{\"a\":1}"));
        assert_eq!(lines.next_line(), None);
        lines.push(b":2}\n");
        assert_eq!(lines.next_line().as_deref(), Some("{\"b\":2}"));
        assert_eq!(lines.take_rest(), None);
    }

    #[tokio::test]
    async fn yields_chunks_until_done() {
        let body = futures::stream::iter(feed(&[
            "{\"message\":{\"content\":\"Hel\"},\"done\":false}\n{\"message\":{\"con",
            "tent\":\"lo\"},\"done\":false}\n",
            "{\"message\":{\"content\":\"\"},\"done\":true}\n",
            "{\"message\":{\"content\":\"ignored\"},\"done\":false}\n",
        ]));
        let items = collect(chat_chunks(body, Duration::from_secs(5))).await;
        let texts: Vec<_> = items.into_iter().map(Result::unwrap).collect();
        assert_eq!(texts, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn body_close_without_done_ends_normally() {
        let body = futures::stream::iter(feed(&[
            "{\"message\":{\"content\":\"tail\"},\"done\":false}",
        ]));
        let items = collect(chat_chunks(body, Duration::from_secs(5))).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap(), "tail");
    }

    #[tokio::test]
    async fn transport_error_after_two_chunks_yields_one_error() {
        let mut parts = feed(&[
            "{\"message\":{\"content\":\"It \"},\"done\":false}\n",
            "{\"message\":{\"content\":\"costs\"},\"done\":false}\n",
        ]);
        parts.push(Err(std::io::Error::other("connection reset")));
        parts.extend(feed(&["{\"message\":{\"content\":\"never\"},\"done\":false}\n"]));

        let items = collect(chat_chunks(futures::stream::iter(parts), Duration::from_secs(5))).await;
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap(), "It ");
        assert_eq!(items[1].as_ref().unwrap(), "costs");
        assert!(matches!(items[2], Err(RagError::Generation { .. })));
    }

    #[tokio::test]
    async fn error_line_and_malformed_line_terminate() {
        let body = futures::stream::iter(feed(&["{\"error\":\"model crashed\"}\n{\"message\":{\"content\":\"x\"}}\n"]));
        let items = collect(chat_chunks(body, Duration::from_secs(5))).await;
        assert_eq!(items.len(), 1);
        assert!(items[0].as_ref().unwrap_err().to_string().contains("model crashed"));

        let body = futures::stream::iter(feed(&["not json\n"]));
        let items = collect(chat_chunks(body, Duration::from_secs(5))).await;
        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_stream_times_out() {
        let first = futures::stream::iter(feed(&["{\"message\":{\"content\":\"a\"},\"done\":false}\n"]));
        let body = first.chain(futures::stream::pending());
        let items = collect(chat_chunks(body, Duration::from_secs(2))).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "a");
        assert!(matches!(items[1], Err(RagError::Generation { .. })));
    }
}
