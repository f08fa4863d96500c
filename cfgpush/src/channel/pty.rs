//! PTY channel: send lines to the device shell and read until a prompt.

use std::time::Duration;

use log::trace;
use regex::bytes::Regex;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};
use tokio::time::Instant;

use super::buffer::{DEFAULT_SEARCH_DEPTH, PatternBuffer};
use crate::error::{ChannelError, Result};

/// Interactive shell channel with prompt-based reads.
pub struct PtyChannel {
    channel: Channel<Msg>,
    buffer: PatternBuffer,
    timeout: Duration,
}

impl PtyChannel {
    pub fn new(channel: Channel<Msg>, timeout: Duration) -> Self {
        Self {
            channel,
            buffer: PatternBuffer::new(DEFAULT_SEARCH_DEPTH),
            timeout,
        }
    }

    /// Send one line of input followed by a newline.
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');
        self.channel
            .data(&data[..])
            .await
            .map_err(ChannelError::Ssh)?;
        Ok(())
    }

    /// Read until `pattern` matches in the buffer tail.
    ///
    /// Returns everything up to and including the match. Output after the
    /// match stays buffered for the next read.
    pub async fn read_until(&mut self, pattern: &Regex) -> Result<Vec<u8>> {
        let deadline = Instant::now() + self.timeout;

        loop {
            if let Some(end) = self.buffer.search_tail(pattern) {
                return Ok(self.buffer.take_until(end));
            }

            let msg = tokio::time::timeout_at(deadline, self.channel.wait())
                .await
                .map_err(|_| ChannelError::PatternTimeout(self.timeout))?;

            match msg {
                Some(ChannelMsg::Data { data }) => {
                    trace!("read {} bytes", data.len());
                    self.buffer.extend(&data);
                }
                // stderr is part of what the operator would see on a terminal
                Some(ChannelMsg::ExtendedData { data, .. }) => self.buffer.extend(&data),
                Some(ChannelMsg::Eof | ChannelMsg::Close) | None => {
                    return Err(ChannelError::Closed.into());
                }
                Some(_) => {}
            }
        }
    }

    /// Send EOF and close the channel.
    pub async fn close(self) -> Result<()> {
        // The peer may already have closed its side
        let _ = self.channel.eof().await;
        self.channel.close().await.map_err(ChannelError::Ssh)?;
        Ok(())
    }
}
