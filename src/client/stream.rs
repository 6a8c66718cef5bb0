use std::pin::Pin;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use futures_util::stream::{BoxStream, Stream, StreamExt};

use super::ClientError;

/// Lazy sequence of text chunks read from a streaming generation response.
///
/// One chunk per transport frame, in arrival order. A frame is only pulled
/// from the connection when the stream is polled, and dropping the stream
/// drops the response, which aborts the request.
pub struct ChunkStream {
    frames: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: FrameDecoder,
    done: bool,
}

impl ChunkStream {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self {
            frames: response.bytes_stream().boxed(),
            decoder: FrameDecoder::new(),
            done: false,
        }
    }

    pub async fn next_chunk(&mut self) -> Option<Result<String, ClientError>> {
        self.next().await
    }
}

impl Stream for ChunkStream {
    type Item = Result<String, ClientError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        loop {
            match ready!(this.frames.poll_next_unpin(cx)) {
                Some(Ok(frame)) => {
                    if let Some(text) = this.decoder.push(&frame) {
                        return Poll::Ready(Some(Ok(text)));
                    }
                }
                Some(Err(err)) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(ClientError::Transport(err))));
                }
                None => {
                    this.done = true;
                    return Poll::Ready(this.decoder.finish().map(Ok));
                }
            }
        }
    }
}

/// Decodes UTF-8 across frame boundaries.
///
/// A character split between two frames is held until the rest of its bytes
/// arrive. Invalid sequences become U+FFFD.
#[derive(Default)]
pub struct FrameDecoder {
    pending_bytes: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: &[u8]) -> Option<String> {
        if frame.is_empty() {
            return None;
        }

        self.pending_bytes.extend_from_slice(frame);
        self.take_ready_text()
    }

    /// Drains whatever is left once the transport has ended.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending_bytes.is_empty() {
            return None;
        }

        let text = String::from_utf8_lossy(&self.pending_bytes).into_owned();
        self.pending_bytes.clear();
        Some(text)
    }

    pub fn is_empty(&self) -> bool {
        self.pending_bytes.is_empty()
    }

    fn take_ready_text(&mut self) -> Option<String> {
        let mut text = String::new();

        loop {
            match std::str::from_utf8(&self.pending_bytes) {
                Ok(valid) => {
                    text.push_str(valid);
                    self.pending_bytes.clear();
                    break;
                }
                Err(err) => {
                    let valid_up_to = err.valid_up_to();
                    text.push_str(&String::from_utf8_lossy(&self.pending_bytes[..valid_up_to]));

                    match err.error_len() {
                        Some(error_len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            self.pending_bytes.drain(..valid_up_to + error_len);
                        }
                        // incomplete trailing sequence, wait for the next frame
                        None => {
                            self.pending_bytes.drain(..valid_up_to);
                            break;
                        }
                    }
                }
            }
        }

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
