//! Line-framed incremental body copy.
//!
//! The upstream body may be a single JSON document or a continuous stream of
//! newline-delimited event frames. Either way the bytes are re-framed on
//! newlines and each frame is yielded as soon as it completes, so the client
//! starts receiving data before the upstream body ends.

use bytes::Bytes;
use futures::{Stream, StreamExt};

/// Default line predicate: every frame is forwarded.
pub fn forward_all(_line: &str) -> bool {
    true
}

/// Re-frame an upstream byte stream on newlines.
///
/// Each complete line is yielded with its trailing `\n` re-appended (a
/// trailing `\r` is trimmed first); a final unterminated fragment is flushed
/// with a newline when the upstream ends. `forward_line` decides per line
/// whether to pass it through; returning `false` ends the stream, which
/// allows a caller to stop on a terminal sentinel without changing the copy
/// mechanism.
///
/// An upstream read error terminates the stream: by that point the status
/// and headers are already committed, so termination is the only option.
pub fn line_stream<S, F>(
    upstream: S,
    forward_line: F,
) -> impl Stream<Item = std::io::Result<Bytes>>
where
    S: Stream<Item = reqwest::Result<Bytes>>,
    F: Fn(&str) -> bool,
{
    async_stream::stream! {
        futures::pin_mut!(upstream);
        let mut buf: Vec<u8> = Vec::new();
        let mut terminated = false;

        'read: while let Some(chunk) = upstream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    tracing::error!(error = %e, "upstream stream error");
                    terminated = true;
                    break 'read;
                }
            };

            buf.extend_from_slice(&chunk);
            while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                let mut line: Vec<u8> = buf.drain(..=pos).collect();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                let text = String::from_utf8_lossy(&line).into_owned();
                if !forward_line(&text) {
                    terminated = true;
                    break 'read;
                }
                line.push(b'\n');
                yield Ok(Bytes::from(line));
            }
        }

        if !terminated && !buf.is_empty() {
            // Unterminated final fragment
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
            let text = String::from_utf8_lossy(&buf).into_owned();
            if forward_line(&text) {
                buf.push(b'\n');
                yield Ok(Bytes::from(std::mem::take(&mut buf)));
            }
        }
    }
}
