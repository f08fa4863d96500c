//! SSH-backed device sessions.

use log::debug;
use secrecy::ExposeSecret;

use super::session::{DeviceSession, SessionFactory};
use crate::config::{DeviceAddress, SshOptions};
use crate::credentials::Credentials;
use crate::driver::{DriverBuilder, GenericDriver};
use crate::error::Result;

impl DeviceSession for GenericDriver {
    async fn enter_privileged(&mut self) -> Result<()> {
        let target = self.platform().default_privilege.clone();
        self.acquire_privilege(&target).await
    }

    async fn send_command_set(&mut self, commands: &[String]) -> Result<String> {
        let responses = self.send_config_set(commands).await?;
        Ok(responses
            .iter()
            .map(|r| r.raw_result.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn save(&mut self) -> Result<()> {
        let response = self.save_config().await?;
        debug!("{}: {}", self.target(), response.result);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        GenericDriver::close(self).await
    }
}

/// Opens a [`GenericDriver`] per device with the run's SSH options.
pub struct SshSessionFactory {
    options: SshOptions,
}

impl SshSessionFactory {
    pub fn new(options: SshOptions) -> Self {
        Self { options }
    }
}

impl SessionFactory for SshSessionFactory {
    type Session = GenericDriver;

    async fn open(
        &self,
        device_id: &str,
        address: &DeviceAddress,
        credentials: &Credentials,
    ) -> Result<GenericDriver> {
        let mut builder = DriverBuilder::new(address.host.clone(), credentials.username())
            .port(address.port_or(self.options.port))
            .enable_secret(credentials.enable_secret().expose_secret())
            .timeout(self.options.timeout())
            .host_key_verification(self.options.host_key_verification.clone());

        builder = match &self.options.private_key {
            Some(key) => builder.private_key(key),
            None => builder.password(credentials.password().expose_secret()),
        };
        if let Some(known_hosts) = &self.options.known_hosts {
            builder = builder.known_hosts(known_hosts);
        }

        let mut driver = builder.build()?;
        debug!("{}: opening session to {}", device_id, driver.target());
        if let Err(e) = driver.open().await {
            // Tear down whatever part of the session did come up
            let _ = driver.close().await;
            return Err(e);
        }
        Ok(driver)
    }
}
