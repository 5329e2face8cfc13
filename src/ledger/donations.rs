use chrono::Utc;
use tracing::info;

use super::Ledger;
use crate::{
    errors::{Error, Result},
    models::{
        donation::{Donation, DonationStatus, DonationView, NewDonation},
        permission::{Permission, PermissionChecker, PermissionContext},
        role::Role,
    },
};

const DONATION_VIEW: &str = "SELECT d.id, d.donor_id,
        COALESCE(NULLIF(u.organization_name, ''), u.username) AS donor_name,
        d.title, d.description, d.quantity, d.food_type, d.location, d.image_url,
        d.expiry_time, d.status, d.created_at
    FROM donations d
    JOIN users u ON u.id = d.donor_id";

impl Ledger {
    pub async fn create_donation(
        &self,
        actor: &PermissionContext,
        new_donation: NewDonation,
    ) -> Result<Donation> {
        actor.check_permission(&Permission::DonationCreate)?;

        let now = Utc::now();
        let donation = sqlx::query_as::<_, Donation>(
            "INSERT INTO donations (donor_id, title, description, quantity, food_type, location, image_url, expiry_time, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(actor.user_id())
        .bind(&new_donation.title)
        .bind(&new_donation.description)
        .bind(&new_donation.quantity)
        .bind(&new_donation.food_type)
        .bind(&new_donation.location)
        .bind(&new_donation.image_url)
        .bind(new_donation.expiry_time)
        .bind(DonationStatus::Available)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        info!(donation_id = donation.id, donor_id = donation.donor_id, "donation created");
        Ok(donation)
    }

    /// Donors see their own donations; everyone else browses what is still available.
    pub async fn list_donations(&self, actor: &PermissionContext) -> Result<Vec<DonationView>> {
        let donations = match actor.role() {
            Role::Donor => {
                actor.check_permission(&Permission::DonationReadOwn)?;
                sqlx::query_as::<_, DonationView>(&format!(
                    "{DONATION_VIEW} WHERE d.donor_id = ? ORDER BY d.created_at DESC, d.id DESC"
                ))
                .bind(actor.user_id())
                .fetch_all(&self.pool)
                .await?
            }
            Role::Ngo | Role::Admin => {
                actor.check_permission(&Permission::DonationBrowse)?;
                sqlx::query_as::<_, DonationView>(&format!(
                    "{DONATION_VIEW} WHERE d.status = ? ORDER BY d.created_at DESC, d.id DESC"
                ))
                .bind(DonationStatus::Available)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(donations)
    }

    pub async fn get_donation(&self, donation_id: i64) -> Result<DonationView> {
        sqlx::query_as::<_, DonationView>(&format!("{DONATION_VIEW} WHERE d.id = ?"))
            .bind(donation_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::NotFound("donation"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{
        LedgerPolicy,
        test_support::{actor, ledger, new_donation},
    };

    #[tokio::test]
    async fn test_donor_creates_available_donation() {
        let ledger = ledger(LedgerPolicy::default()).await;
        let donor = actor(&ledger, "dana", Role::Donor).await;

        let donation = ledger
            .create_donation(&donor, new_donation("Bread"))
            .await
            .unwrap();

        assert_eq!(donation.status, DonationStatus::Available);
        assert_eq!(donation.donor_id, donor.user_id());
        let view = ledger.get_donation(donation.id).await.unwrap();
        assert_eq!(view.donor_name, "dana");
    }

    #[tokio::test]
    async fn test_only_donors_create_donations() {
        let ledger = ledger(LedgerPolicy::default()).await;
        let ngo = actor(&ledger, "helpers", Role::Ngo).await;
        let admin = actor(&ledger, "root_admin", Role::Admin).await;

        for who in [&ngo, &admin] {
            let result = ledger.create_donation(who, new_donation("Rice")).await;
            assert!(matches!(
                result,
                Err(Error::AccessDenied(Permission::DonationCreate))
            ));
        }
    }

    #[tokio::test]
    async fn test_listing_is_role_scoped() {
        let ledger = ledger(LedgerPolicy::default()).await;
        let dana = actor(&ledger, "dana", Role::Donor).await;
        let dave = actor(&ledger, "dave", Role::Donor).await;
        let ngo = actor(&ledger, "helpers", Role::Ngo).await;

        let bread = ledger.create_donation(&dana, new_donation("Bread")).await.unwrap();
        ledger.create_donation(&dave, new_donation("Soup")).await.unwrap();
        ledger.create_request(&ngo, bread.id, String::new()).await.unwrap();

        let own: Vec<_> = ledger
            .list_donations(&dana)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.title)
            .collect();
        assert_eq!(own, vec!["Bread".to_string()]);

        let browsable: Vec<_> = ledger
            .list_donations(&ngo)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.title)
            .collect();
        assert_eq!(browsable, vec!["Soup".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_donation_is_not_found() {
        let ledger = ledger(LedgerPolicy::default()).await;
        assert!(matches!(
            ledger.get_donation(77).await,
            Err(Error::NotFound("donation"))
        ));
    }
}
