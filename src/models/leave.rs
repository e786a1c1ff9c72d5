//! Leave grant model.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DateRange;

/// Leave type codes.
///
/// Codes the engine does not recognise map to [`LeaveType::Unrecognized`],
/// which is paid at the unpaid rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LeaveType {
    /// Casual leave.
    #[serde(rename = "CL")]
    Casual,
    /// Sick leave.
    #[serde(rename = "SL")]
    Sick,
    /// Earned leave.
    #[serde(rename = "EL")]
    Earned,
    /// Maternity leave.
    #[serde(rename = "ML")]
    Maternity,
    /// Leave without pay.
    #[serde(rename = "unpaid")]
    Unpaid,
    /// Short permission leave.
    #[serde(rename = "permission")]
    Permission,
    /// Any other code.
    #[serde(other)]
    Unrecognized,
}

impl LeaveType {
    /// The stored code for this leave type.
    pub fn code(&self) -> &'static str {
        match self {
            LeaveType::Casual => "CL",
            LeaveType::Sick => "SL",
            LeaveType::Earned => "EL",
            LeaveType::Maternity => "ML",
            LeaveType::Unpaid => "unpaid",
            LeaveType::Permission => "permission",
            LeaveType::Unrecognized => "unrecognized",
        }
    }
}

impl FromStr for LeaveType {
    type Err = std::convert::Infallible;

    /// Parses a leave code case-insensitively; unknown codes never fail.
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Ok(match code.trim().to_ascii_lowercase().as_str() {
            "cl" | "casual" => LeaveType::Casual,
            "sl" | "sick" => LeaveType::Sick,
            "el" | "earned" => LeaveType::Earned,
            "ml" | "maternity" => LeaveType::Maternity,
            "unpaid" | "lop" => LeaveType::Unpaid,
            "permission" => LeaveType::Permission,
            _ => LeaveType::Unrecognized,
        })
    }
}

/// Approval state of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved; affects pay.
    Approved,
    /// Rejected.
    Rejected,
}

/// A leave grant for a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveGrant {
    /// Unique identifier of the grant.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// The staff member on leave.
    pub staff_id: String,
    /// The kind of leave.
    pub leave_type: LeaveType,
    /// Dates covered by the grant.
    pub dates: DateRange,
    /// Approval state.
    pub status: LeaveStatus,
}

impl LeaveGrant {
    /// Creates an approved grant.
    pub fn approved(staff_id: impl Into<String>, leave_type: LeaveType, dates: DateRange) -> Self {
        Self {
            id: Uuid::new_v4(),
            staff_id: staff_id.into(),
            leave_type,
            dates,
            status: LeaveStatus::Approved,
        }
    }

    /// Only approved grants affect pay.
    pub fn is_approved(&self) -> bool {
        self.status == LeaveStatus::Approved
    }
}
