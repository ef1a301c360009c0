//! Server-sent event decoding for streamed chat completions.

use std::collections::VecDeque;
use std::pin::Pin;

use futures_util::stream::{self, Stream, StreamExt};

use infergate_core::types::ChatCompletionChunk;
use infergate_core::{ChatError, TransportError};

/// Stream of assistant text deltas.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send>>;

/// One decoded SSE event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SseEvent {
    /// Payload of one event (`data:` lines joined by `\n`).
    Data(String),
    /// The `[DONE]` terminator.
    Done,
}

/// Incremental SSE decoder: feed raw bytes, get complete events back.
///
/// Only `data:` fields matter for chat completions; other fields and comment
/// lines are skipped.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data_lines: Vec<String>,
}

impl SseDecoder {
    /// Feed a chunk of the body; returns every event it completed.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.is_empty() {
                events.extend(self.flush());
            } else {
                self.handle_line(&line);
            }
        }
        events
    }

    /// Flush whatever is left once the body has ended.
    pub fn finish(&mut self) -> Vec<SseEvent> {
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.handle_line(&line);
        }
        self.flush().into_iter().collect()
    }

    fn handle_line(&mut self, line: &[u8]) {
        if let Some(rest) = line.strip_prefix(b"data:") {
            let rest = rest.strip_prefix(b" ").unwrap_or(rest);
            self.data_lines.push(String::from_utf8_lossy(rest).into_owned());
        }
    }

    fn flush(&mut self) -> Option<SseEvent> {
        if self.data_lines.is_empty() {
            return None;
        }
        let data = self.data_lines.drain(..).collect::<Vec<_>>().join("\n");
        if data.trim() == "[DONE]" {
            Some(SseEvent::Done)
        } else {
            Some(SseEvent::Data(data))
        }
    }
}

struct DeltaState<S> {
    body: S,
    decoder: SseDecoder,
    pending: VecDeque<Result<String, ChatError>>,
    endpoint: String,
    finished: bool,
}

impl<S> DeltaState<S> {
    fn enqueue(&mut self, events: Vec<SseEvent>) {
        for event in events {
            if self.finished {
                return;
            }
            match event {
                SseEvent::Done => self.finished = true,
                SseEvent::Data(data) => match serde_json::from_str::<ChatCompletionChunk>(&data) {
                    Ok(chunk) => {
                        let text = chunk
                            .choices
                            .into_iter()
                            .next()
                            .and_then(|c| c.delta.content)
                            .unwrap_or_default();
                        if !text.is_empty() {
                            self.pending.push_back(Ok(text));
                        }
                    }
                    Err(e) => {
                        self.pending.push_back(Err(ChatError::MalformedResponse {
                            endpoint: self.endpoint.clone(),
                            reason: format!("bad stream chunk: {e}"),
                        }));
                        self.finished = true;
                    }
                },
            }
        }
    }
}

/// Turn an SSE body into a stream of non-empty text deltas.
///
/// Ends at `[DONE]` or at end of body; a malformed chunk or body error is
/// yielded once and ends the stream.
pub(crate) fn text_deltas<S, B>(body: S, endpoint: String) -> ChatStream
where
    S: Stream<Item = Result<B, reqwest::Error>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let state = DeltaState {
        body,
        decoder: SseDecoder::default(),
        pending: VecDeque::new(),
        endpoint,
        finished: false,
    };

    Box::pin(stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.pending.pop_front() {
                return Some((item, st));
            }
            if st.finished {
                return None;
            }
            match st.body.next().await {
                Some(Ok(bytes)) => {
                    let events = st.decoder.push(bytes.as_ref());
                    st.enqueue(events);
                }
                Some(Err(e)) => {
                    st.finished = true;
                    let err = TransportError::network(&st.endpoint, e.to_string(), e.is_timeout());
                    return Some((Err(ChatError::Transport(err)), st));
                }
                None => {
                    let events = st.decoder.finish();
                    st.enqueue(events);
                    st.finished = true;
                }
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_single_event() {
        let mut d = SseDecoder::default();
        let events = d.push(b"data: {\"a\":1}\n\n");
        assert_eq!(events, vec![SseEvent::Data("{\"a\":1}".into())]);
    }

    #[test]
    fn test_decoder_split_across_chunks() {
        let mut d = SseDecoder::default();
        assert!(d.push(b"data: hel").is_empty());
        assert!(d.push(b"lo\r\n").is_empty());
        assert_eq!(d.push(b"\r\n"), vec![SseEvent::Data("hello".into())]);
    }

    #[test]
    fn test_decoder_done_and_comments() {
        let mut d = SseDecoder::default();
        let events = d.push(b": keep-alive\n\ndata: x\n\ndata: [DONE]\n\n");
        assert_eq!(events, vec![SseEvent::Data("x".into()), SseEvent::Done]);
    }

    #[test]
    fn test_decoder_multiline_data() {
        let mut d = SseDecoder::default();
        let events = d.push(b"data: a\ndata: b\n\n");
        assert_eq!(events, vec![SseEvent::Data("a\nb".into())]);
    }

    #[test]
    fn test_decoder_finish_flushes_unterminated_event() {
        let mut d = SseDecoder::default();
        assert!(d.push(b"data: tail").is_empty());
        assert_eq!(d.finish(), vec![SseEvent::Data("tail".into())]);
        assert!(d.finish().is_empty());
    }
}
