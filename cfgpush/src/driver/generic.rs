//! Prompt-driven CLI driver over one SSH shell.

use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use regex::bytes::Regex;
use secrecy::{ExposeSecret, SecretString};

use super::privilege::PrivilegeManager;
use super::response::Response;
use crate::channel::{PtyChannel, any_of, last_line};
use crate::error::{ChannelError, DriverError, Result};
use crate::platform::PlatformDefinition;
use crate::transport::{SshConfig, SshTransport};

/// Driver for one device: owns the SSH connection, the shell channel and
/// the current privilege level.
///
/// Every read waits for one of the platform's prompts, so a command is
/// complete when the device is ready for the next one.
pub struct GenericDriver {
    ssh_config: SshConfig,
    platform: PlatformDefinition,
    enable_secret: Option<SecretString>,
    transport: Option<SshTransport>,
    channel: Option<PtyChannel>,
    privileges: PrivilegeManager,
    /// Matches the prompt of any privilege level.
    prompt_pattern: Regex,
    timeout: Duration,
}

impl GenericDriver {
    pub fn new(
        ssh_config: SshConfig,
        platform: PlatformDefinition,
        enable_secret: Option<SecretString>,
    ) -> Result<Self> {
        let prompt_pattern = any_of(platform.privilege_levels.values().map(|l| &l.pattern))
            .map_err(ChannelError::InvalidPattern)?;
        let privileges = PrivilegeManager::new(platform.privilege_levels.clone());
        let timeout = ssh_config.timeout;

        Ok(Self {
            ssh_config,
            platform,
            enable_secret,
            transport: None,
            channel: None,
            privileges,
            prompt_pattern,
            timeout,
        })
    }

    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    /// `host:port` of the device.
    pub fn target(&self) -> String {
        self.ssh_config.target()
    }

    pub fn current_privilege(&self) -> Option<&str> {
        self.privileges.current_name()
    }

    pub fn is_open(&self) -> bool {
        self.channel.is_some()
    }

    /// Open and the SSH session task still running.
    pub fn is_alive(&self) -> bool {
        self.transport.as_ref().is_some_and(|t| !t.is_closed())
    }

    /// Connect, authenticate, open the shell and wait for the first prompt.
    pub async fn open(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Err(DriverError::AlreadyConnected.into());
        }

        let transport = SshTransport::connect(&self.ssh_config).await?;
        let shell = match transport
            .open_shell(self.platform.terminal_width, self.platform.terminal_height)
            .await
        {
            Ok(shell) => shell,
            Err(e) => {
                let _ = transport.close().await;
                return Err(e);
            }
        };
        self.transport = Some(transport);
        self.channel = Some(PtyChannel::new(shell, self.timeout));

        let prompt = self.read_prompt().await?;
        let level = self
            .privileges
            .observe_prompt(&prompt)
            .ok_or_else(|| DriverError::UnknownPrivilege {
                prompt: prompt.clone(),
            })?
            .to_string();
        debug!("{}: logged in at '{}' ({})", self.target(), prompt, level);

        for command in self.platform.on_open_commands.clone() {
            let response = self.send_command(&command).await?;
            if !response.is_success() {
                warn!(
                    "{}: on-open command '{}' was rejected: {}",
                    self.target(),
                    command,
                    response.result
                );
            }
        }

        Ok(())
    }

    /// Read until any known prompt and return that prompt.
    async fn read_prompt(&mut self) -> Result<String> {
        let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;
        let data = channel.read_until(&self.prompt_pattern).await?;
        Ok(last_line(&data))
    }

    /// Send one command and wait for the next prompt.
    ///
    /// A response whose output contains one of the platform's failure
    /// patterns is returned with `failure_message` set; the caller decides
    /// whether that is fatal.
    pub async fn send_command(&mut self, command: &str) -> Result<Response> {
        let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;
        let start = Instant::now();

        trace!("sending: {}", command);
        channel.send_line(command).await?;
        let data = channel.read_until(&self.prompt_pattern).await?;

        let prompt = last_line(&data);
        self.privileges.observe_prompt(&prompt);

        let response = Response::from_raw(command, &data, prompt, start.elapsed());
        match self.platform.detect_failure(&response.raw_result) {
            Some(pattern) => {
                debug!("'{}' matched failure pattern '{}'", command, pattern);
                let pattern = pattern.to_string();
                Ok(response.with_failure(pattern))
            }
            None => Ok(response),
        }
    }

    /// Move to the named privilege level, answering the enable prompt with
    /// the enable secret when one is asked for.
    pub async fn acquire_privilege(&mut self, target: &str) -> Result<()> {
        let current = self
            .privileges
            .current_name()
            .ok_or_else(|| DriverError::UnknownPrivilege {
                prompt: String::new(),
            })?
            .to_string();
        if current == target {
            return Ok(());
        }

        let path = self.privileges.find_path(&current, target)?;
        for step in path.windows(2) {
            let (from, to) = (&step[0], &step[1]);
            let transition =
                self.privileges
                    .transition(from, to)
                    .ok_or_else(|| DriverError::NoPrivilegePath {
                        from: from.clone(),
                        to: to.clone(),
                    })?;

            debug!("{}: {} -> {} via '{}'", self.target(), from, to, transition.command);
            let prompt = match &transition.auth_prompt {
                Some(auth) => self.escalate_with_secret(&transition.command, auth, to).await?,
                None => {
                    let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;
                    channel.send_line(&transition.command).await?;
                    last_line(&channel.read_until(&self.prompt_pattern).await?)
                }
            };

            if self.privileges.observe_prompt(&prompt) != Some(to.as_str()) {
                return Err(DriverError::PrivilegeAcquisitionFailed { target: to.clone() }.into());
            }
        }

        Ok(())
    }

    /// Send an escalation command that may ask for a secret.
    async fn escalate_with_secret(
        &mut self,
        command: &str,
        auth: &Regex,
        target: &str,
    ) -> Result<String> {
        let failed = || DriverError::PrivilegeAcquisitionFailed {
            target: target.to_string(),
        };
        let either = any_of([auth, &self.prompt_pattern]).map_err(ChannelError::InvalidPattern)?;
        let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;

        channel.send_line(command).await?;
        let prompt = last_line(&channel.read_until(&either).await?);
        if !auth.is_match(prompt.as_bytes()) {
            // No secret configured on the device
            return Ok(prompt);
        }

        let secret = self.enable_secret.as_ref().ok_or_else(failed)?;
        trace!("sending: ********");
        channel.send_line(secret.expose_secret()).await?;
        let prompt = last_line(&channel.read_until(&either).await?);
        if auth.is_match(prompt.as_bytes()) {
            // Secret rejected; the device asks again
            return Err(failed().into());
        }
        Ok(prompt)
    }

    /// Send commands in configuration mode, stopping at the first rejected
    /// command. Returns to the default privilege level only when every
    /// command was accepted.
    pub async fn send_config_set(&mut self, commands: &[String]) -> Result<Vec<Response>> {
        let config_privilege = self.platform.config_privilege.clone();
        let default_privilege = self.platform.default_privilege.clone();

        self.acquire_privilege(&config_privilege).await?;

        let mut responses = Vec::with_capacity(commands.len());
        for command in commands {
            let response = self.send_command(command).await?;
            if let Some(failure) = &response.failure_message {
                // The device stays in configuration mode; the caller closes
                return Err(DriverError::CommandFailed {
                    command: command.clone(),
                    message: format!("{failure} ({})", response.result.trim()),
                }
                .into());
            }
            responses.push(response);
        }

        self.acquire_privilege(&default_privilege).await?;
        Ok(responses)
    }

    /// Persist the running configuration.
    pub async fn save_config(&mut self) -> Result<Response> {
        let default_privilege = self.platform.default_privilege.clone();
        self.acquire_privilege(&default_privilege).await?;

        let save_command = self.platform.save_command.clone();
        let response = self.send_command(&save_command).await?;

        if let Some(failure) = &response.failure_message {
            return Err(DriverError::CommandFailed {
                command: save_command,
                message: failure.clone(),
            }
            .into());
        }
        if let Some(confirmation) = &self.platform.save_confirmation {
            if !response.raw_result.contains(confirmation.as_str()) {
                return Err(DriverError::CommandFailed {
                    command: save_command,
                    message: format!("no '{confirmation}' in output"),
                }
                .into());
            }
        }

        Ok(response)
    }

    /// Close the shell and the connection. Safe to call more than once.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(channel) = self.channel.take() {
            if let Err(e) = channel.close().await {
                debug!("{}: closing shell channel: {}", self.target(), e);
            }
        }
        if let Some(transport) = self.transport.take() {
            transport.close().await?;
        }
        Ok(())
    }
}
