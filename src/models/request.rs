use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Collected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Collected => "collected",
        }
    }

    /// Parses a donor decision. `pending` is never a valid target.
    pub fn parse_decision(value: &str) -> Result<Self> {
        match value.trim() {
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            "collected" => Ok(RequestStatus::Collected),
            other => Err(Error::InvalidStatus(other.to_string())),
        }
    }

    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Approved)
                | (RequestStatus::Pending, RequestStatus::Rejected)
                | (RequestStatus::Approved, RequestStatus::Collected)
        )
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct DonationRequest {
    pub id: i64,
    pub donation_id: i64,
    pub ngo_id: i64,
    pub message: String,
    pub status: RequestStatus,
    pub collection_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A request joined with the donation it targets and the requesting NGO.
#[derive(Serialize, Debug, Clone, sqlx::FromRow)]
pub struct RequestView {
    pub id: i64,
    pub donation_id: i64,
    pub donation_title: String,
    pub donation_quantity: String,
    pub donor_id: i64,
    pub ngo_id: i64,
    pub ngo_name: String,
    pub message: String,
    pub status: RequestStatus,
    pub collection_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
