//! Line-delimited JSON loop.
//!
//! Each input line is a context `{"state": .., "action": ..}`. Each output
//! line is either `{"state": ..}` or `{"error": "<message>"}`, in request
//! order. Requests are handled one at a time, so state threading stays with
//! the host.
//!
//! # Important
//!
//! - Uses explicit `\n`, NOT `println!` (which may add `\r\n` on Windows)
//! - Flushes after every line (the host waits for complete lines)

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};

use super::handle_line;
use crate::contract::Dispatcher;
use crate::error::{ContractError, Result};

/// Default maximum request line size (1 MiB).
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// Configuration for [`serve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    /// Maximum size of a request line in bytes.
    pub max_line_bytes: usize,
    /// Stop after the first rejected request.
    pub stop_on_error: bool,
}

impl ServeConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum request line size.
    ///
    /// Default: 1 MiB
    pub fn max_line_bytes(mut self, limit: usize) -> Self {
        self.max_line_bytes = limit;
        self
    }

    /// Stop serving after the first rejected request.
    ///
    /// Default: false
    pub fn stop_on_error(mut self, stop: bool) -> Self {
        self.stop_on_error = stop;
        self
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            stop_on_error: false,
        }
    }
}

/// Counters reported when [`serve`] returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeStats {
    /// Requests answered with a new state.
    pub handled: usize,
    /// Requests answered with an error.
    pub rejected: usize,
}

/// Write a JSON value as a single line and flush.
pub async fn write_line<W, T>(writer: &mut W, value: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let line = serde_json::to_string(value)?;
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Skip the rest of the current line. Returns the number of bytes skipped,
/// not counting the newline.
async fn discard_line<R>(reader: &mut R) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut discarded = 0;
    loop {
        let (used, done) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(discarded);
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (available.len(), false),
            }
        };
        reader.consume(used);

        if done {
            return Ok(discarded + used - 1);
        }
        discarded += used;
    }
}

/// Serve requests from `reader` until EOF, answering on `writer`.
///
/// At most `max_line_bytes + 1` bytes of a line are buffered; the remainder of
/// an oversized line is skipped. Blank lines are skipped. Returns an error
/// only for I/O failures; request failures (including lines that are not
/// UTF-8) are reported on `writer` and counted.
pub async fn serve<S, R, W>(
    mut reader: R,
    mut writer: W,
    dispatcher: &Dispatcher<S>,
    config: &ServeConfig,
) -> Result<ServeStats>
where
    S: Serialize + DeserializeOwned + Send + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let limit = config.max_line_bytes;
    let mut buf = Vec::new();
    let mut stats = ServeStats::default();

    loop {
        buf.clear();
        let n = (&mut reader)
            .take((limit as u64).saturating_add(1))
            .read_until(b'\n', &mut buf)
            .await?;
        if n == 0 {
            break;
        }

        let result = if buf.last() != Some(&b'\n') && buf.len() > limit {
            let size = buf.len() + discard_line(&mut reader).await?;
            Err(ContractError::RequestTooLarge { size, limit })
        } else {
            if buf.last() == Some(&b'\n') {
                buf.pop();
            }
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
            if buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            match std::str::from_utf8(&buf) {
                Ok(line) => handle_line(dispatcher, line).await,
                Err(e) => Err(e.into()),
            }
        };

        match result {
            Ok(response) => {
                stats.handled += 1;
                write_line(&mut writer, &response).await?;
            }
            Err(e) => {
                tracing::warn!("Rejected request: {}", e);
                stats.rejected += 1;
                let response: Value = json!({ "error": e.to_string() });
                write_line(&mut writer, &response).await?;

                if config.stop_on_error {
                    break;
                }
            }
        }
    }

    tracing::debug!(
        "Serve loop finished: {} handled, {} rejected",
        stats.handled,
        stats.rejected
    );
    Ok(stats)
}

/// Serve requests from stdin, answering on stdout.
pub async fn serve_stdio<S>(dispatcher: &Dispatcher<S>, config: &ServeConfig) -> Result<ServeStats>
where
    S: Serialize + DeserializeOwned + Send + 'static,
{
    let reader = BufReader::new(tokio::io::stdin());
    serve(reader, tokio::io::stdout(), dispatcher, config).await
}
