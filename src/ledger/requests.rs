use chrono::Utc;
use sqlx::{Sqlite, Transaction};
use tracing::info;

use super::Ledger;
use crate::{
    db::{begin_immediate, is_lock_conflict},
    errors::{Error, Result},
    models::{
        donation::{Donation, DonationStatus},
        permission::{Permission, PermissionChecker, PermissionContext},
        request::{DonationRequest, RequestStatus, RequestView},
        role::Role,
    },
};

const REQUEST_VIEW: &str = "SELECT r.id, r.donation_id, d.title AS donation_title,
        d.quantity AS donation_quantity, d.donor_id, r.ngo_id,
        COALESCE(NULLIF(u.organization_name, ''), u.username) AS ngo_name,
        r.message, r.status, r.collection_time, r.created_at
    FROM requests r
    JOIN donations d ON d.id = r.donation_id
    JOIN users u ON u.id = r.ngo_id";

async fn fetch_request(
    tx: &mut Transaction<'_, Sqlite>,
    request_id: i64,
) -> Result<DonationRequest> {
    sqlx::query_as::<_, DonationRequest>("SELECT * FROM requests WHERE id = ?")
        .bind(request_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(Error::NotFound("request"))
}

async fn fetch_donation(tx: &mut Transaction<'_, Sqlite>, donation_id: i64) -> Result<Donation> {
    sqlx::query_as::<_, Donation>("SELECT * FROM donations WHERE id = ?")
        .bind(donation_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(Error::NotFound("donation"))
}

/// Moves a donation out of `claimed`. A donation that has meanwhile left
/// `claimed` (expired, collected) is left untouched.
async fn release_claim(
    tx: &mut Transaction<'_, Sqlite>,
    donation_id: i64,
    status: DonationStatus,
) -> Result<()> {
    sqlx::query("UPDATE donations SET status = ?, updated_at = ? WHERE id = ? AND status = ?")
        .bind(status)
        .bind(Utc::now())
        .bind(donation_id)
        .bind(DonationStatus::Claimed)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn begin_write(pool: &sqlx::SqlitePool) -> Result<Transaction<'static, Sqlite>> {
    begin_immediate(pool).await.map_err(lock_conflict)
}

/// A write lock that cannot be had within the busy timeout means another
/// decision on the same rows is still in flight.
fn lock_conflict(err: sqlx::Error) -> Error {
    if is_lock_conflict(&err) {
        Error::StaleRequest
    } else {
        Error::SqlxError(err)
    }
}

impl Ledger {
    /// Claims an available donation for the acting NGO.
    ///
    /// The `available -> claimed` move is the guard itself: only the caller
    /// whose update matches `status = 'available'` gets to insert a request.
    pub async fn create_request(
        &self,
        actor: &PermissionContext,
        donation_id: i64,
        message: String,
    ) -> Result<DonationRequest> {
        actor.check_permission(&Permission::RequestCreate)?;
        if self.policy.require_ngo_approval && !actor.user.is_approved {
            return Err(Error::AccountNotApproved);
        }

        let now = Utc::now();
        let mut tx = begin_write(&self.pool).await?;

        let claimed = sqlx::query(
            "UPDATE donations SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(DonationStatus::Claimed)
        .bind(now)
        .bind(donation_id)
        .bind(DonationStatus::Available)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if claimed == 0 {
            // Either it never existed or somebody else got there first.
            fetch_donation(&mut tx, donation_id).await?;
            return Err(Error::DonationNotAvailable);
        }

        let request = sqlx::query_as::<_, DonationRequest>(
            "INSERT INTO requests (donation_id, ngo_id, message, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(donation_id)
        .bind(actor.user_id())
        .bind(message.trim())
        .bind(RequestStatus::Pending)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await.map_err(lock_conflict)?;
        info!(
            request_id = request.id,
            donation_id,
            ngo_id = request.ngo_id,
            "donation claimed"
        );
        Ok(request)
    }

    /// Applies a donor decision to a request and the donation behind it.
    pub async fn update_request_status(
        &self,
        actor: &PermissionContext,
        request_id: i64,
        target: &str,
    ) -> Result<DonationRequest> {
        actor.check_permission(&Permission::RequestDecide)?;

        let mut tx = begin_write(&self.pool).await?;
        let request = fetch_request(&mut tx, request_id).await?;
        let donation = fetch_donation(&mut tx, request.donation_id).await?;
        actor.check_owner(donation.donor_id)?;

        let target = RequestStatus::parse_decision(target)?;
        if !request.status.can_transition_to(target) {
            return Err(Error::IllegalTransition {
                from: request.status,
                to: target,
            });
        }

        let now = Utc::now();
        let collection_time = (target == RequestStatus::Collected).then_some(now);
        let moved = sqlx::query(
            "UPDATE requests SET status = ?, collection_time = COALESCE(?, collection_time), updated_at = ?
             WHERE id = ? AND status = ?",
        )
        .bind(target)
        .bind(collection_time)
        .bind(now)
        .bind(request.id)
        .bind(request.status)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if moved == 0 {
            return Err(Error::StaleRequest);
        }

        match target {
            // A pending request already holds the claim.
            RequestStatus::Approved => {}
            RequestStatus::Rejected => {
                release_claim(&mut tx, donation.id, DonationStatus::Available).await?;
                let cascaded = sqlx::query(
                    "UPDATE requests SET status = ?, updated_at = ?
                     WHERE donation_id = ? AND status = ? AND id != ?",
                )
                .bind(RequestStatus::Rejected)
                .bind(now)
                .bind(donation.id)
                .bind(RequestStatus::Pending)
                .bind(request.id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
                if cascaded > 0 {
                    info!(donation_id = donation.id, cascaded, "sibling requests rejected");
                }
            }
            RequestStatus::Collected => {
                release_claim(&mut tx, donation.id, DonationStatus::Collected).await?;
            }
            // Never produced by `parse_decision`.
            RequestStatus::Pending => {}
        }

        let updated = fetch_request(&mut tx, request.id).await?;
        tx.commit().await.map_err(lock_conflict)?;
        info!(
            request_id = updated.id,
            donation_id = donation.id,
            from = %request.status,
            to = %updated.status,
            "request status changed"
        );
        Ok(updated)
    }

    /// Withdraws a pending request. The donation is released once no pending
    /// request is left on it.
    pub async fn delete_request(&self, actor: &PermissionContext, request_id: i64) -> Result<()> {
        actor.check_permission(&Permission::RequestWithdraw)?;

        let mut tx = begin_write(&self.pool).await?;
        let request = fetch_request(&mut tx, request_id).await?;
        actor.check_owner(request.ngo_id)?;

        if request.status != RequestStatus::Pending {
            return Err(Error::Validation(
                "Can only delete pending requests".to_string(),
            ));
        }

        let deleted = sqlx::query("DELETE FROM requests WHERE id = ? AND status = ?")
            .bind(request.id)
            .bind(RequestStatus::Pending)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(Error::StaleRequest);
        }

        let remaining: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM requests WHERE donation_id = ? AND status = ?")
                .bind(request.donation_id)
                .bind(RequestStatus::Pending)
                .fetch_one(&mut *tx)
                .await?;

        if remaining == 0 {
            release_claim(&mut tx, request.donation_id, DonationStatus::Available).await?;
        }

        tx.commit().await.map_err(lock_conflict)?;
        info!(
            request_id = request.id,
            donation_id = request.donation_id,
            remaining,
            "request withdrawn"
        );
        Ok(())
    }

    pub async fn list_requests(&self, actor: &PermissionContext) -> Result<Vec<RequestView>> {
        let order = "ORDER BY r.created_at DESC, r.id DESC";
        let requests = match actor.role() {
            Role::Donor => {
                sqlx::query_as::<_, RequestView>(&format!(
                    "{REQUEST_VIEW} WHERE d.donor_id = ? {order}"
                ))
                .bind(actor.user_id())
                .fetch_all(&self.pool)
                .await?
            }
            Role::Ngo => {
                sqlx::query_as::<_, RequestView>(&format!(
                    "{REQUEST_VIEW} WHERE r.ngo_id = ? {order}"
                ))
                .bind(actor.user_id())
                .fetch_all(&self.pool)
                .await?
            }
            Role::Admin => {
                actor.check_permission(&Permission::RequestReadAll)?;
                sqlx::query_as::<_, RequestView>(&format!("{REQUEST_VIEW} {order}"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(requests)
    }

    /// Visible to the donor who owns the donation, the requesting NGO and admins.
    pub async fn get_request(&self, actor: &PermissionContext, request_id: i64) -> Result<RequestView> {
        let view = sqlx::query_as::<_, RequestView>(&format!("{REQUEST_VIEW} WHERE r.id = ?"))
            .bind(request_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::NotFound("request"))?;
        if actor.is_owner(view.donor_id)
            || actor.is_owner(view.ngo_id)
            || actor.has_permission(&Permission::RequestReadAll)
        {
            Ok(view)
        } else {
            Err(Error::NotOwner)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{
        LedgerPolicy,
        test_support::{actor, file_ledger, ledger, new_donation},
    };

    async fn donation_status(ledger: &Ledger, id: i64) -> DonationStatus {
        ledger.get_donation(id).await.unwrap().status
    }

    async fn request_status(ledger: &Ledger, id: i64) -> RequestStatus {
        sqlx::query_scalar::<_, RequestStatus>("SELECT status FROM requests WHERE id = ?")
            .bind(id)
            .fetch_one(ledger.pool())
            .await
            .unwrap()
    }

    /// Plants a second pending request on an already claimed donation, the
    /// state left behind by two NGOs racing inside the same window.
    async fn insert_pending(ledger: &Ledger, donation_id: i64, ngo_id: i64) -> i64 {
        let now = Utc::now();
        sqlx::query_scalar(
            "INSERT INTO requests (donation_id, ngo_id, message, status, created_at, updated_at)
             VALUES (?, ?, '', 'pending', ?, ?) RETURNING id",
        )
        .bind(donation_id)
        .bind(ngo_id)
        .bind(now)
        .bind(now)
        .fetch_one(ledger.pool())
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_reject_reopens_donation_for_a_new_round() {
        let ledger = ledger(LedgerPolicy::default()).await;
        let donor = actor(&ledger, "dana", Role::Donor).await;
        let n1 = actor(&ledger, "ngo_one", Role::Ngo).await;
        let n2 = actor(&ledger, "ngo_two", Role::Ngo).await;

        let x = ledger.create_donation(&donor, new_donation("X")).await.unwrap();
        assert_eq!(x.status, DonationStatus::Available);

        let r1 = ledger.create_request(&n1, x.id, "for the shelter".into()).await.unwrap();
        assert_eq!(r1.status, RequestStatus::Pending);
        assert_eq!(donation_status(&ledger, x.id).await, DonationStatus::Claimed);

        let second = ledger.create_request(&n2, x.id, String::new()).await;
        assert!(matches!(second, Err(Error::DonationNotAvailable)));

        let rejected = ledger
            .update_request_status(&donor, r1.id, "rejected")
            .await
            .unwrap();
        assert_eq!(rejected.status, RequestStatus::Rejected);
        assert_eq!(donation_status(&ledger, x.id).await, DonationStatus::Available);

        let r2 = ledger.create_request(&n2, x.id, String::new()).await.unwrap();
        assert_eq!(r2.ngo_id, n2.user_id());
        assert_eq!(donation_status(&ledger, x.id).await, DonationStatus::Claimed);
    }

    #[tokio::test]
    async fn test_approve_then_collect() {
        let ledger = ledger(LedgerPolicy::default()).await;
        let donor = actor(&ledger, "dana", Role::Donor).await;
        let ngo = actor(&ledger, "helpers", Role::Ngo).await;

        let y = ledger.create_donation(&donor, new_donation("Y")).await.unwrap();
        let r = ledger.create_request(&ngo, y.id, String::new()).await.unwrap();

        let approved = ledger.update_request_status(&donor, r.id, "approved").await.unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
        assert!(approved.collection_time.is_none());
        assert_eq!(donation_status(&ledger, y.id).await, DonationStatus::Claimed);

        let collected = ledger.update_request_status(&donor, r.id, "collected").await.unwrap();
        assert_eq!(collected.status, RequestStatus::Collected);
        assert!(collected.collection_time.is_some());
        assert_eq!(donation_status(&ledger, y.id).await, DonationStatus::Collected);
    }

    #[tokio::test]
    async fn test_request_against_unavailable_donation_fails_for_any_role() {
        let ledger = ledger(LedgerPolicy::default()).await;
        let donor = actor(&ledger, "dana", Role::Donor).await;
        let ngo = actor(&ledger, "helpers", Role::Ngo).await;
        let late = actor(&ledger, "latecomer", Role::Ngo).await;

        let d = ledger.create_donation(&donor, new_donation("Soup")).await.unwrap();
        let r = ledger.create_request(&ngo, d.id, String::new()).await.unwrap();
        ledger.update_request_status(&donor, r.id, "approved").await.unwrap();
        ledger.update_request_status(&donor, r.id, "collected").await.unwrap();

        assert!(matches!(
            ledger.create_request(&late, d.id, String::new()).await,
            Err(Error::DonationNotAvailable)
        ));
        assert!(matches!(
            ledger.create_request(&late, 9999, String::new()).await,
            Err(Error::NotFound("donation"))
        ));
        assert!(matches!(
            ledger.create_request(&donor, d.id, String::new()).await,
            Err(Error::AccessDenied(Permission::RequestCreate))
        ));
    }

    #[tokio::test]
    async fn test_expired_donation_cannot_be_requested() {
        let ledger = ledger(LedgerPolicy::default()).await;
        let donor = actor(&ledger, "dana", Role::Donor).await;
        let ngo = actor(&ledger, "helpers", Role::Ngo).await;
        let d = ledger.create_donation(&donor, new_donation("Milk")).await.unwrap();

        sqlx::query("UPDATE donations SET status = 'expired' WHERE id = ?")
            .bind(d.id)
            .execute(ledger.pool())
            .await
            .unwrap();

        assert!(matches!(
            ledger.create_request(&ngo, d.id, String::new()).await,
            Err(Error::DonationNotAvailable)
        ));
    }

    #[tokio::test]
    async fn test_decisions_do_not_revive_an_expired_donation() {
        let ledger = ledger(LedgerPolicy::default()).await;
        let donor = actor(&ledger, "dana", Role::Donor).await;
        let n1 = actor(&ledger, "ngo_one", Role::Ngo).await;
        let n2 = actor(&ledger, "ngo_two", Role::Ngo).await;

        let d = ledger.create_donation(&donor, new_donation("Bread")).await.unwrap();
        let r1 = ledger.create_request(&n1, d.id, String::new()).await.unwrap();
        let r2 = insert_pending(&ledger, d.id, n2.user_id()).await;

        sqlx::query("UPDATE donations SET status = 'expired' WHERE id = ?")
            .bind(d.id)
            .execute(ledger.pool())
            .await
            .unwrap();

        ledger.update_request_status(&donor, r1.id, "approved").await.unwrap();
        assert_eq!(donation_status(&ledger, d.id).await, DonationStatus::Expired);

        ledger.update_request_status(&donor, r2, "rejected").await.unwrap();
        assert_eq!(donation_status(&ledger, d.id).await, DonationStatus::Expired);

        ledger.update_request_status(&donor, r1.id, "collected").await.unwrap();
        assert_eq!(donation_status(&ledger, d.id).await, DonationStatus::Expired);
    }

    #[tokio::test]
    async fn test_reject_cascades_to_sibling_pending_requests() {
        let ledger = ledger(LedgerPolicy::default()).await;
        let donor = actor(&ledger, "dana", Role::Donor).await;
        let n1 = actor(&ledger, "ngo_one", Role::Ngo).await;
        let n2 = actor(&ledger, "ngo_two", Role::Ngo).await;
        let n3 = actor(&ledger, "ngo_three", Role::Ngo).await;

        let d = ledger.create_donation(&donor, new_donation("Fruit")).await.unwrap();
        let r1 = ledger.create_request(&n1, d.id, String::new()).await.unwrap();
        let r2 = insert_pending(&ledger, d.id, n2.user_id()).await;
        let r3 = insert_pending(&ledger, d.id, n3.user_id()).await;

        ledger.update_request_status(&donor, r1.id, "rejected").await.unwrap();

        assert_eq!(donation_status(&ledger, d.id).await, DonationStatus::Available);
        for id in [r1.id, r2, r3] {
            assert_eq!(request_status(&ledger, id).await, RequestStatus::Rejected);
        }
    }

    #[tokio::test]
    async fn test_non_owner_donor_cannot_decide() {
        let ledger = ledger(LedgerPolicy::default()).await;
        let owner = actor(&ledger, "dana", Role::Donor).await;
        let stranger = actor(&ledger, "dave", Role::Donor).await;
        let ngo = actor(&ledger, "helpers", Role::Ngo).await;

        let d = ledger.create_donation(&owner, new_donation("Pasta")).await.unwrap();
        let r = ledger.create_request(&ngo, d.id, String::new()).await.unwrap();

        for target in ["approved", "rejected", "collected", "bogus"] {
            let result = ledger.update_request_status(&stranger, r.id, target).await;
            assert!(matches!(result, Err(Error::NotOwner)), "{target}");
        }
        assert!(matches!(
            ledger.update_request_status(&ngo, r.id, "approved").await,
            Err(Error::AccessDenied(Permission::RequestDecide))
        ));

        assert_eq!(request_status(&ledger, r.id).await, RequestStatus::Pending);
        assert_eq!(donation_status(&ledger, d.id).await, DonationStatus::Claimed);
    }

    #[tokio::test]
    async fn test_invalid_targets_and_illegal_moves() {
        let ledger = ledger(LedgerPolicy::default()).await;
        let donor = actor(&ledger, "dana", Role::Donor).await;
        let ngo = actor(&ledger, "helpers", Role::Ngo).await;

        let d = ledger.create_donation(&donor, new_donation("Beans")).await.unwrap();
        let r = ledger.create_request(&ngo, d.id, String::new()).await.unwrap();

        assert!(matches!(
            ledger.update_request_status(&donor, r.id, "pending").await,
            Err(Error::InvalidStatus(_))
        ));
        assert!(matches!(
            ledger.update_request_status(&donor, r.id, "collected").await,
            Err(Error::IllegalTransition {
                from: RequestStatus::Pending,
                to: RequestStatus::Collected
            })
        ));

        ledger.update_request_status(&donor, r.id, "rejected").await.unwrap();
        assert!(matches!(
            ledger.update_request_status(&donor, r.id, "approved").await,
            Err(Error::IllegalTransition { .. })
        ));
        assert!(matches!(
            ledger.update_request_status(&donor, 4040, "approved").await,
            Err(Error::NotFound("request"))
        ));
        assert_eq!(donation_status(&ledger, d.id).await, DonationStatus::Available);
    }

    #[tokio::test]
    async fn test_withdrawing_last_pending_request_releases_donation() {
        let ledger = ledger(LedgerPolicy::default()).await;
        let donor = actor(&ledger, "dana", Role::Donor).await;
        let ngo = actor(&ledger, "helpers", Role::Ngo).await;

        let d = ledger.create_donation(&donor, new_donation("Cake")).await.unwrap();
        let r = ledger.create_request(&ngo, d.id, String::new()).await.unwrap();

        ledger.delete_request(&ngo, r.id).await.unwrap();
        assert_eq!(donation_status(&ledger, d.id).await, DonationStatus::Available);
        assert!(matches!(
            ledger.delete_request(&ngo, r.id).await,
            Err(Error::NotFound("request"))
        ));
    }

    #[tokio::test]
    async fn test_withdrawing_one_of_several_keeps_donation_claimed() {
        let ledger = ledger(LedgerPolicy::default()).await;
        let donor = actor(&ledger, "dana", Role::Donor).await;
        let n1 = actor(&ledger, "ngo_one", Role::Ngo).await;
        let n2 = actor(&ledger, "ngo_two", Role::Ngo).await;

        let d = ledger.create_donation(&donor, new_donation("Curry")).await.unwrap();
        let r1 = ledger.create_request(&n1, d.id, String::new()).await.unwrap();
        insert_pending(&ledger, d.id, n2.user_id()).await;

        ledger.delete_request(&n1, r1.id).await.unwrap();
        assert_eq!(donation_status(&ledger, d.id).await, DonationStatus::Claimed);
    }

    #[tokio::test]
    async fn test_withdraw_rules() {
        let ledger = ledger(LedgerPolicy::default()).await;
        let donor = actor(&ledger, "dana", Role::Donor).await;
        let ngo = actor(&ledger, "helpers", Role::Ngo).await;
        let other = actor(&ledger, "others", Role::Ngo).await;

        let d = ledger.create_donation(&donor, new_donation("Tea")).await.unwrap();
        let r = ledger.create_request(&ngo, d.id, String::new()).await.unwrap();

        assert!(matches!(
            ledger.delete_request(&other, r.id).await,
            Err(Error::NotOwner)
        ));
        assert!(matches!(
            ledger.delete_request(&donor, r.id).await,
            Err(Error::AccessDenied(Permission::RequestWithdraw))
        ));

        ledger.update_request_status(&donor, r.id, "approved").await.unwrap();
        assert!(matches!(
            ledger.delete_request(&ngo, r.id).await,
            Err(Error::Validation(_))
        ));
        assert_eq!(request_status(&ledger, r.id).await, RequestStatus::Approved);
        assert_eq!(donation_status(&ledger, d.id).await, DonationStatus::Claimed);
    }

    #[tokio::test]
    async fn test_ngo_approval_policy() {
        for require_ngo_approval in [false, true] {
            let ledger = ledger(LedgerPolicy { require_ngo_approval }).await;
            let donor = actor(&ledger, "dana", Role::Donor).await;
            let ngo = actor(&ledger, "helpers", Role::Ngo).await;
            assert!(!ngo.user.is_approved);

            let d = ledger.create_donation(&donor, new_donation("Rice")).await.unwrap();
            let result = ledger.create_request(&ngo, d.id, String::new()).await;

            if require_ngo_approval {
                assert!(matches!(result, Err(Error::AccountNotApproved)));
                assert_eq!(donation_status(&ledger, d.id).await, DonationStatus::Available);
            } else {
                assert!(result.is_ok());
                assert_eq!(donation_status(&ledger, d.id).await, DonationStatus::Claimed);
            }
        }
    }

    #[tokio::test]
    async fn test_request_visibility() {
        let ledger = ledger(LedgerPolicy::default()).await;
        let donor = actor(&ledger, "dana", Role::Donor).await;
        let stranger = actor(&ledger, "dave", Role::Donor).await;
        let ngo = actor(&ledger, "helpers", Role::Ngo).await;
        let admin = actor(&ledger, "overseer", Role::Admin).await;

        let d = ledger.create_donation(&donor, new_donation("Salad")).await.unwrap();
        let r = ledger.create_request(&ngo, d.id, "thanks".into()).await.unwrap();

        for who in [&donor, &ngo, &admin] {
            let view = ledger.get_request(who, r.id).await.unwrap();
            assert_eq!(view.donation_title, "Salad");
            assert_eq!(view.donor_id, donor.user_id());
            assert_eq!(view.ngo_name, "helpers");
        }
        assert!(matches!(
            ledger.get_request(&stranger, r.id).await,
            Err(Error::NotOwner)
        ));

        assert_eq!(ledger.list_requests(&donor).await.unwrap().len(), 1);
        assert_eq!(ledger.list_requests(&ngo).await.unwrap().len(), 1);
        assert_eq!(ledger.list_requests(&admin).await.unwrap().len(), 1);
        assert!(ledger.list_requests(&stranger).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_have_a_single_winner() {
        let (ledger, _dir) = file_ledger(LedgerPolicy::default()).await;
        let donor = actor(&ledger, "dana", Role::Donor).await;
        let d = ledger.create_donation(&donor, new_donation("Rice")).await.unwrap();

        let mut ngos = Vec::new();
        for i in 0..8 {
            ngos.push(actor(&ledger, &format!("ngo_{i}"), Role::Ngo).await);
        }

        let donation_id = d.id;
        let claims: Vec<_> = ngos
            .into_iter()
            .map(|ngo| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    ledger.create_request(&ngo, donation_id, String::new()).await
                })
            })
            .collect();

        let mut winners = 0;
        for claim in claims {
            match claim.await.unwrap() {
                Ok(_) => winners += 1,
                Err(Error::DonationNotAvailable) => {}
                Err(other) => panic!("unexpected claim error: {other}"),
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(donation_status(&ledger, d.id).await, DonationStatus::Claimed);

        let requests: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM requests WHERE donation_id = ?")
            .bind(d.id)
            .fetch_one(ledger.pool())
            .await
            .unwrap();
        assert_eq!(requests, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_decisions_apply_once() {
        let (ledger, _dir) = file_ledger(LedgerPolicy::default()).await;
        let donor = actor(&ledger, "dana", Role::Donor).await;
        let ngo = actor(&ledger, "helpers", Role::Ngo).await;

        for round in 0..10 {
            let d = ledger
                .create_donation(&donor, new_donation(&format!("Batch {round}")))
                .await
                .unwrap();
            let request_id = ledger.create_request(&ngo, d.id, String::new()).await.unwrap().id;

            let decisions: Vec<_> = (0..4)
                .map(|_| {
                    let ledger = ledger.clone();
                    let donor = donor.clone();
                    tokio::spawn(async move {
                        ledger.update_request_status(&donor, request_id, "approved").await
                    })
                })
                .collect();

            let mut applied = 0;
            for decision in decisions {
                match decision.await.unwrap() {
                    Ok(_) => applied += 1,
                    Err(Error::StaleRequest | Error::IllegalTransition { .. }) => {}
                    Err(other) => panic!("unexpected decision error: {other}"),
                }
            }
            assert_eq!(applied, 1);
            assert_eq!(request_status(&ledger, request_id).await, RequestStatus::Approved);
            assert_eq!(donation_status(&ledger, d.id).await, DonationStatus::Claimed);
        }
    }
}
