use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum DonationStatus {
    Available,
    Claimed,
    Collected,
    Expired,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Available => "available",
            DonationStatus::Claimed => "claimed",
            DonationStatus::Collected => "collected",
            DonationStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_FOOD_TYPE: &str = "vegetarian";

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Donation {
    pub id: i64,
    pub donor_id: i64,
    pub title: String,
    pub description: String,
    pub quantity: String,
    pub food_type: String,
    pub location: String,
    pub image_url: Option<String>,
    pub expiry_time: DateTime<Utc>,
    pub status: DonationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A donation joined with its donor's display name, as listed to clients.
#[derive(Serialize, Debug, Clone, sqlx::FromRow)]
pub struct DonationView {
    pub id: i64,
    pub donor_id: i64,
    pub donor_name: String,
    pub title: String,
    pub description: String,
    pub quantity: String,
    pub food_type: String,
    pub location: String,
    pub image_url: Option<String>,
    pub expiry_time: DateTime<Utc>,
    pub status: DonationStatus,
    pub created_at: DateTime<Utc>,
}

/// Validated input for a new donation; the expiry is already an instant.
#[derive(Debug, Clone)]
pub struct NewDonation {
    pub title: String,
    pub description: String,
    pub quantity: String,
    pub food_type: String,
    pub location: String,
    pub image_url: Option<String>,
    pub expiry_time: DateTime<Utc>,
}
