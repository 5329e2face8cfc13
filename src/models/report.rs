use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminStats {
    pub total_users: i64,
    pub total_donors: i64,
    pub total_ngos: i64,
    pub pending_approvals: i64,
    pub total_donations: i64,
    pub active_donations: i64,
    pub total_requests: i64,
    pub completed_donations: i64,
}

#[derive(Serialize, Debug, Clone)]
pub struct DonationReport {
    pub period: &'static str,
    pub since: DateTime<Utc>,
    pub total_donations: i64,
    pub by_status: BTreeMap<String, i64>,
    pub by_food_type: BTreeMap<String, i64>,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DonorStats {
    pub total_donations: i64,
    pub active_donations: i64,
    pub claimed_donations: i64,
    pub completed_donations: i64,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct NgoStats {
    pub total_requests: i64,
    pub pending_requests: i64,
    pub approved_requests: i64,
    pub completed_requests: i64,
}

/// Per-user dashboard counts; the shape depends on the caller's role.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum UserStats {
    Donor(DonorStats),
    Ngo(NgoStats),
    Admin(AdminStats),
}
