use std::collections::VecDeque;

use futures::Stream;
use serde_json::Value;

use crate::client::client_error::ClientError;
use crate::client::crawl_result::CrawlResult;

/// Incrementally delivered crawl results: one JSON record per line, ended by
/// a `{"status": "completed"}` trailer. Results are consumed one at a time in
/// arrival order; this layer does no buffering or reordering of its own.
pub struct CrawlStream {
    response: Option<reqwest::Response>,
    buffer: Vec<u8>,
    pending: VecDeque<CrawlResult>,
}

impl CrawlStream {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self {
            response: Some(response),
            buffer: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    /// Next result in arrival order, `None` once the stream is exhausted.
    /// A transport or decode error ends the stream.
    pub async fn next_result(&mut self) -> Result<Option<CrawlResult>, ClientError> {
        loop {
            if let Some(result) = self.pending.pop_front() {
                return Ok(Some(result));
            }
            let Some(response) = self.response.as_mut() else {
                return Ok(None);
            };
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    self.buffer.extend_from_slice(&chunk);
                    if self.drain_lines()? {
                        self.response = None;
                    }
                }
                Ok(None) => {
                    // Connection closed without the completion trailer;
                    // flush whatever is still buffered.
                    self.response = None;
                    let leftover = std::mem::take(&mut self.buffer);
                    let line = String::from_utf8_lossy(&leftover);
                    let line = line.trim();
                    if !line.is_empty() {
                        if let StreamLine::Result(result) = parse_stream_line(line)? {
                            self.pending.push_back(result);
                        }
                    }
                }
                Err(e) => {
                    self.response = None;
                    return Err(e.into());
                }
            }
        }
    }

    /// Adapts this stream to a `futures::Stream` of results.
    pub fn into_stream(self) -> impl Stream<Item = Result<CrawlResult, ClientError>> {
        futures::stream::unfold(self, |mut stream| async move {
            match stream.next_result().await {
                Ok(Some(result)) => Some((Ok(result), stream)),
                Ok(None) => None,
                Err(e) => Some((Err(e), stream)),
            }
        })
    }

    /// Parses every complete line currently buffered. Returns true once the
    /// completion trailer has been seen.
    fn drain_lines(&mut self) -> Result<bool, ClientError> {
        let mut completed = false;
        while let Some(line) = next_line(&mut self.buffer) {
            if line.is_empty() || completed {
                continue;
            }
            match parse_stream_line(&line)? {
                StreamLine::Result(result) => self.pending.push_back(result),
                StreamLine::Completed => completed = true,
            }
        }
        Ok(completed)
    }
}

enum StreamLine {
    Result(CrawlResult),
    Completed,
}

fn parse_stream_line(line: &str) -> Result<StreamLine, ClientError> {
    let value: Value = serde_json::from_str(line)?;
    if value.get("status").and_then(Value::as_str) == Some("completed") {
        return Ok(StreamLine::Completed);
    }
    Ok(StreamLine::Result(serde_json::from_value(value)?))
}

/// Pops the first newline-terminated line off the buffer, trimmed. Bytes of a
/// partial trailing line stay buffered until the rest arrives.
fn next_line(buffer: &mut Vec<u8>) -> Option<String> {
    let pos = buffer.iter().position(|&b| b == b'\n')?;
    let line: Vec<u8> = buffer.drain(..=pos).collect();
    Some(String::from_utf8_lossy(&line).trim().to_owned())
}
