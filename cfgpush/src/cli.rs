//! Command-line arguments and credential entry.

use std::path::{Path, PathBuf};

use clap::Parser;
use dialoguer::Input;
use log::debug;

use cfgpush::Credentials;
use cfgpush::config::RunConfig;
use cfgpush::error::ConfigError;

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "cfgpush.toml";

const PASSWORD_ENV: &str = "CFGPUSH_PASSWORD";
const ENABLE_SECRET_ENV: &str = "CFGPUSH_ENABLE_SECRET";

/// Push interface and routing intent to Cisco IOS routers over SSH
#[derive(Parser, Debug)]
#[command(name = "cfgpush", version, about)]
pub struct Cli {
    /// Run configuration file (roster, SSH options)
    #[arg(short, long, env = "CFGPUSH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Intent file, overrides `intent_file` from the config
    #[arg(short, long)]
    pub intent: Option<PathBuf>,

    /// Device a flat intent list belongs to
    #[arg(long)]
    pub flat_device: Option<String>,

    /// Add or replace a roster device, e.g. `--device R1=192.168.15.150`
    #[arg(short, long = "device", value_name = "ID=ADDR")]
    pub devices: Vec<String>,

    /// Print each device's command plan without connecting
    #[arg(long)]
    pub dry_run: bool,

    /// Login username
    #[arg(short, long, env = "CFGPUSH_USERNAME")]
    pub username: Option<String>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }

    /// Load the config file and apply command-line overrides.
    ///
    /// A missing default config file is not an error; an explicit one is.
    pub fn run_config(&self) -> Result<RunConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                RunConfig::load(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                RunConfig::default()
            }
        };

        if let Some(intent) = &self.intent {
            config.intent_file = intent.clone();
        }
        if let Some(device) = &self.flat_device {
            config.flat_device = Some(device.clone());
        }
        for spec in &self.devices {
            config.devices.insert_spec(spec)?;
        }

        if config.devices.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }
        Ok(config)
    }

    /// Collect credentials from flags and the environment, prompting for
    /// whatever is missing.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let username = match self.username.as_deref().filter(|u| !u.is_empty()) {
            Some(username) => username.to_string(),
            None => Input::<String>::new()
                .with_prompt("Username")
                .interact_text()
                .map_err(prompt_err)?,
        };
        if username.trim().is_empty() {
            return Err(ConfigError::Prompt("username cannot be empty".into()));
        }

        let password = match std::env::var(PASSWORD_ENV) {
            Ok(password) => password,
            Err(_) => rpassword::prompt_password("Password: ").map_err(prompt_err)?,
        };

        let enable_secret = match std::env::var(ENABLE_SECRET_ENV) {
            Ok(secret) => secret,
            Err(_) => rpassword::prompt_password("Enable secret (empty to reuse password): ")
                .map_err(prompt_err)?,
        };

        Ok(Credentials::new(username.trim(), password, enable_secret))
    }
}

fn prompt_err(e: impl std::fmt::Display) -> ConfigError {
    ConfigError::Prompt(e.to_string())
}
