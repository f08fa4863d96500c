//! Sequential push of command plans to every roster device.
//!
//! Each device is handled on its own: a failure is recorded in that
//! device's [`PushResult`] and the run moves on to the next one.

mod report;
mod session;
mod ssh;

pub use report::{
    EXIT_CONFIG_ERROR, EXIT_DEVICE_FAILURE, EXIT_OK, PushResult, PushStage, PushStatus, exit_code,
    summary_table,
};
pub use session::{DeviceSession, SessionFactory, SessionGuard};
pub use ssh::SshSessionFactory;

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::config::{DeviceAddress, DeviceRoster};
use crate::credentials::Credentials;
use crate::error::{DriverError, Error, TransportError};
use crate::intent::{IntentDocument, IntentRecord};
use crate::plan::CommandPlan;

/// Why a device stopped short of `Closed`.
type Failure = (PushStatus, String);

/// Drives the push of every roster device through a [`SessionFactory`].
pub struct Orchestrator<F> {
    factory: F,
    push_timeout: Option<Duration>,
}

impl<F: SessionFactory> Orchestrator<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            push_timeout: None,
        }
    }

    /// Bound the send and save step of each device.
    pub fn with_push_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.push_timeout = timeout;
        self
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Push every roster device in order. Returns one result per device.
    pub async fn run(
        &self,
        roster: &DeviceRoster,
        intents: &IntentDocument,
        credentials: &Credentials,
    ) -> Vec<PushResult> {
        for device_id in intents.device_ids() {
            if !roster.contains(device_id) {
                warn!("{}: intent present but device is not in the roster, ignoring", device_id);
            }
        }

        let mut results = Vec::with_capacity(roster.len());
        for (device_id, address) in roster.iter() {
            let result = match intents.records(device_id) {
                Some(records) => {
                    self.push_device(device_id, address, records, credentials)
                        .await
                }
                None => {
                    warn!("{}: no intent found, skipping", device_id);
                    PushResult::skipped(device_id, address.to_string())
                }
            };

            match result.status {
                PushStatus::Success => info!(
                    "{}: pushed {} commands in {:.1}s",
                    device_id,
                    result.commands,
                    result.elapsed.as_secs_f64()
                ),
                PushStatus::Skipped => {}
                status => warn!(
                    "{}: {} at stage '{}': {}",
                    device_id, status, result.stage, result.detail
                ),
            }
            results.push(result);
        }
        results
    }

    async fn push_device(
        &self,
        device_id: &str,
        address: &DeviceAddress,
        records: &[IntentRecord],
        credentials: &Credentials,
    ) -> PushResult {
        let start = Instant::now();
        let mut result = PushResult {
            device_id: device_id.to_string(),
            address: address.to_string(),
            status: PushStatus::Success,
            stage: PushStage::Pending,
            detail: String::new(),
            commands: 0,
            elapsed: Duration::ZERO,
        };

        match self
            .open_and_push(device_id, address, records, credentials, &mut result)
            .await
        {
            Ok(()) => result.stage = PushStage::Closed,
            Err((status, detail)) => {
                result.status = status;
                result.detail = detail;
            }
        }
        result.elapsed = start.elapsed();
        result
    }

    async fn open_and_push(
        &self,
        device_id: &str,
        address: &DeviceAddress,
        records: &[IntentRecord],
        credentials: &Credentials,
        result: &mut PushResult,
    ) -> Result<(), Failure> {
        let plan = CommandPlan::build(device_id, records)
            .map_err(|e| (PushStatus::CommandError, e.to_string()))?;
        result.commands = plan.len();
        result.stage = PushStage::PlanBuilt;
        debug!("{}: plan built with {} commands", device_id, plan.len());

        info!("{}: connecting to {}", device_id, address);
        let session = self
            .factory
            .open(device_id, address, credentials)
            .await
            .map_err(session_failure)?;
        let mut guard = SessionGuard::new(device_id, session);
        result.stage = PushStage::SessionOpen;

        let pushed = self
            .push_plan(guard.session(), &plan, &mut result.stage)
            .await;
        guard.release().await;

        let output = pushed?;
        for line in output.lines() {
            debug!("{}: {}", device_id, line);
        }
        result.detail = format!("{} commands applied, configuration saved", plan.len());
        Ok(())
    }

    async fn push_plan(
        &self,
        session: &mut F::Session,
        plan: &CommandPlan,
        stage: &mut PushStage,
    ) -> Result<String, Failure> {
        session.enter_privileged().await.map_err(session_failure)?;

        let steps = async move {
            let output = session
                .send_command_set(plan.commands())
                .await
                .map_err(command_failure)?;
            *stage = PushStage::Pushed;
            session.save().await.map_err(command_failure)?;
            *stage = PushStage::Saved;
            Ok::<_, Failure>(output)
        };

        match self.push_timeout {
            Some(limit) => tokio::time::timeout(limit, steps)
                .await
                .unwrap_or_else(|_| {
                    Err((
                        PushStatus::CommandError,
                        format!("push timed out after {limit:?}"),
                    ))
                }),
            None => steps.await,
        }
    }
}

/// Classify an error raised while opening the session or entering
/// privileged mode.
fn session_failure(error: Error) -> Failure {
    let status = match &error {
        Error::Transport(TransportError::AuthenticationFailed { .. })
        | Error::Driver(DriverError::PrivilegeAcquisitionFailed { .. }) => PushStatus::AuthFailure,
        _ => PushStatus::ConnectFailure,
    };
    (status, error.to_string())
}

fn command_failure(error: Error) -> Failure {
    (PushStatus::CommandError, error.to_string())
}
