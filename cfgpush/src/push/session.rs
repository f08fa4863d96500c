//! Device session abstraction and the guard that releases it.

use std::future::Future;

use log::warn;

use crate::config::DeviceAddress;
use crate::credentials::Credentials;
use crate::error::Result;

/// An authenticated shell on one device.
pub trait DeviceSession: Send {
    /// Move to the privileged level, answering the enable prompt if asked.
    fn enter_privileged(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Send commands in configuration mode and return the combined output.
    ///
    /// Stops at the first command the device rejects.
    fn send_command_set(
        &mut self,
        commands: &[String],
    ) -> impl Future<Output = Result<String>> + Send;

    /// Persist the running configuration.
    fn save(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Close the session. Closing twice is a no-op.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;
}

/// Opens sessions for the orchestrator.
pub trait SessionFactory: Send + Sync {
    type Session: DeviceSession;

    fn open(
        &self,
        device_id: &str,
        address: &DeviceAddress,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Self::Session>> + Send;
}

/// Owns an open session until [`release`](Self::release) closes it.
///
/// Dropping the guard without releasing leaves the connection to be torn
/// down by the transport, and logs a warning.
pub struct SessionGuard<S: DeviceSession> {
    device_id: String,
    session: S,
    released: bool,
}

impl<S: DeviceSession> SessionGuard<S> {
    pub fn new(device_id: impl Into<String>, session: S) -> Self {
        Self {
            device_id: device_id.into(),
            session,
            released: false,
        }
    }

    pub fn session(&mut self) -> &mut S {
        &mut self.session
    }

    /// Close the session. A close failure is logged, never returned.
    pub async fn release(mut self) {
        self.released = true;
        if let Err(e) = self.session.close().await {
            warn!("{}: failed to close session: {}", self.device_id, e);
        }
    }
}

impl<S: DeviceSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if !self.released {
            warn!("{}: session dropped without release", self.device_id);
        }
    }
}
