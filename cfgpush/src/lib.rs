//! # cfgpush
//!
//! Render interface and routing intent into Cisco IOS configuration
//! commands and push them to a roster of routers over SSH.
//!
//! The pipeline is:
//!
//! ```text
//! device.json -> IntentDocument -> CommandPlan (per device) -> Orchestrator
//!                                                                  |
//!                                                    SessionFactory / DeviceSession
//!                                                                  |
//!                                          GenericDriver -> PtyChannel -> SshTransport
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cfgpush::{Credentials, IntentDocument, Orchestrator, RunConfig, SshSessionFactory};
//!
//! # async fn example() -> Result<(), cfgpush::Error> {
//! let config = RunConfig::load("cfgpush.toml".as_ref())?;
//! let intents = IntentDocument::load(&config.intent_file, config.resolve_flat_device())?;
//! let credentials = Credentials::new("admin", "secret", "");
//!
//! let orchestrator = Orchestrator::new(SshSessionFactory::new(config.ssh.clone()));
//! let results = orchestrator
//!     .run(&config.devices, &intents, &credentials)
//!     .await;
//! println!("{}", cfgpush::push::summary_table(&results));
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod config;
pub mod credentials;
pub mod driver;
pub mod error;
pub mod intent;
pub mod plan;
pub mod platform;
pub mod push;
pub mod render;
pub mod transport;

pub use config::{DeviceAddress, DeviceRoster, RunConfig, SshOptions};
pub use credentials::Credentials;
pub use driver::{DriverBuilder, GenericDriver, Response};
pub use error::{Error, Result};
pub use intent::{IntentDocument, IntentRecord};
pub use plan::CommandPlan;
pub use push::{Orchestrator, PushResult, PushStage, PushStatus, SshSessionFactory};
