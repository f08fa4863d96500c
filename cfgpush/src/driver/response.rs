//! Response type for command execution results.

use std::fmt;
use std::time::Duration;

use memchr::{memchr, memrchr};

/// Output of one command sent to the device.
#[derive(Debug, Clone)]
pub struct Response {
    /// The command that was sent.
    pub command: String,

    /// Output with the command echo and trailing prompt removed.
    pub result: String,

    /// Output exactly as read, minus terminal escapes.
    pub raw_result: String,

    /// Prompt that ended the output.
    pub prompt: String,

    pub elapsed: Duration,

    /// Failure pattern found in the output, if any.
    pub failure_message: Option<String>,
}

impl Response {
    /// Build a response from raw output that ends in `prompt`.
    pub fn from_raw(command: &str, raw: &[u8], prompt: String, elapsed: Duration) -> Self {
        Self {
            command: command.to_string(),
            result: normalize(raw, command),
            raw_result: String::from_utf8_lossy(raw).into_owned(),
            prompt,
            elapsed,
            failure_message: None,
        }
    }

    /// Mark the response as failed.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure_message = Some(message.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.result)
    }
}

/// Strip the echoed command (first line) and the prompt (last line).
fn normalize(raw: &[u8], command: &str) -> String {
    let mut body = raw;

    if let Some(first_nl) = memchr(b'\n', body) {
        if String::from_utf8_lossy(&body[..first_nl]).trim() == command.trim() {
            body = &body[first_nl + 1..];
        }
    } else {
        // Only the prompt came back
        return String::new();
    }

    let body = match memrchr(b'\n', body) {
        Some(last_nl) => &body[..last_nl],
        None => &body[..0],
    };

    String::from_utf8_lossy(body)
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .collect::<Vec<_>>()
        .join("\n")
}
