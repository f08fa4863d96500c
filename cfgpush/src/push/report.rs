//! Per-device push outcomes and the run summary.

use std::fmt;
use std::time::Duration;

use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Every device was pushed or skipped.
pub const EXIT_OK: u8 = 0;
/// At least one device failed.
pub const EXIT_DEVICE_FAILURE: u8 = 1;
/// Configuration or intent could not be loaded.
pub const EXIT_CONFIG_ERROR: u8 = 2;

/// Final classification of one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStatus {
    Success,
    /// No intent for the device.
    Skipped,
    /// Login or enable secret rejected.
    AuthFailure,
    /// Device unreachable, or the session broke while opening.
    ConnectFailure,
    /// Plan could not be built, or a command or the save failed.
    CommandError,
}

impl PushStatus {
    pub fn is_failure(self) -> bool {
        !matches!(self, Self::Success | Self::Skipped)
    }
}

impl fmt::Display for PushStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Skipped => "skipped",
            Self::AuthFailure => "auth failure",
            Self::ConnectFailure => "connect failure",
            Self::CommandError => "command error",
        })
    }
}

/// Last stage a device reached.
///
/// ```text
/// Pending -> PlanBuilt -> SessionOpen -> Pushed -> Saved -> Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PushStage {
    Pending,
    PlanBuilt,
    SessionOpen,
    Pushed,
    Saved,
    Closed,
}

impl fmt::Display for PushStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::PlanBuilt => "plan built",
            Self::SessionOpen => "session open",
            Self::Pushed => "pushed",
            Self::Saved => "saved",
            Self::Closed => "closed",
        })
    }
}

/// Outcome of one roster device.
#[derive(Debug, Clone)]
pub struct PushResult {
    pub device_id: String,
    pub address: String,
    pub status: PushStatus,
    /// Stage reached before the device finished or failed.
    pub stage: PushStage,
    /// Failure cause or device output summary.
    pub detail: String,
    /// Number of commands in the plan; zero without one.
    pub commands: usize,
    pub elapsed: Duration,
}

impl PushResult {
    pub fn skipped(device_id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            address: address.into(),
            status: PushStatus::Skipped,
            stage: PushStage::Pending,
            detail: "no intent for device".to_string(),
            commands: 0,
            elapsed: Duration::ZERO,
        }
    }
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Stage")]
    stage: String,
    #[tabled(rename = "Commands")]
    commands: usize,
    #[tabled(rename = "Elapsed")]
    elapsed: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&PushResult> for SummaryRow {
    fn from(r: &PushResult) -> Self {
        Self {
            device: r.device_id.clone(),
            address: r.address.clone(),
            status: r.status.to_string(),
            stage: r.stage.to_string(),
            commands: r.commands,
            elapsed: format!("{:.1}s", r.elapsed.as_secs_f64()),
            detail: r.detail.clone(),
        }
    }
}

/// Render the results as a table followed by a one-line tally.
pub fn summary_table(results: &[PushResult]) -> String {
    let rows: Vec<SummaryRow> = results.iter().map(SummaryRow::from).collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();

    let count = |status: PushStatus| results.iter().filter(|r| r.status == status).count();
    let failed = results.iter().filter(|r| r.status.is_failure()).count();
    format!(
        "{table}\n{} device(s): {} succeeded, {} skipped, {} failed",
        results.len(),
        count(PushStatus::Success),
        count(PushStatus::Skipped),
        failed
    )
}

/// Process exit code for a finished run.
pub fn exit_code(results: &[PushResult]) -> u8 {
    if results.iter().any(|r| r.status.is_failure()) {
        EXIT_DEVICE_FAILURE
    } else {
        EXIT_OK
    }
}
