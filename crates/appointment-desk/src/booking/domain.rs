use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Caller-supplied identifier for an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(pub String);

impl AppointmentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppointmentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Review state of an appointment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl AppointmentStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Pending, Self::Approved, Self::Rejected]
    }

    pub const fn label(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Approved => "approved",
            AppointmentStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown appointment status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for AppointmentStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|status| status.label() == normalized)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

/// Review outcome applied to an existing appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub const fn target_status(self) -> AppointmentStatus {
        match self {
            Decision::Approve => AppointmentStatus::Approved,
            Decision::Reject => AppointmentStatus::Rejected,
        }
    }

    pub(crate) const fn past_tense(self) -> &'static str {
        match self {
            Decision::Approve => "accepted",
            Decision::Reject => "rejected",
        }
    }
}

/// A booking request awaiting admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub id: AppointmentId,
    pub name: String,
    pub email: String,
    /// Requested slot; the offset the caller sent is kept and drives the hour checks.
    pub appointment_time: DateTime<FixedOffset>,
    #[serde(default)]
    pub status: AppointmentStatus,
}

/// Stored appointment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub name: String,
    pub email: String,
    pub appointment_time: DateTime<FixedOffset>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<FixedOffset>,
}

impl Appointment {
    pub fn receipt(&self, message: impl Into<String>) -> AppointmentReceipt {
        AppointmentReceipt {
            message: message.into(),
            appointment_id: self.id.clone(),
        }
    }
}

/// Acknowledgement returned by the create and review operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentReceipt {
    pub message: String,
    pub appointment_id: AppointmentId,
}
