use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use sqlx::{Sqlite, Transaction};

use super::Ledger;
use crate::{
    consts::report_const::{REPORT_PERIOD, REPORT_WINDOW_DAYS},
    errors::Result,
    models::{
        permission::{Permission, PermissionChecker, PermissionContext},
        report::{AdminStats, DonationReport, DonorStats, NgoStats, UserStats},
        role::Role,
        user::User,
    },
};

async fn count(tx: &mut Transaction<'_, Sqlite>, sql: &str) -> Result<i64> {
    let n = sqlx::query_scalar::<_, i64>(sql).fetch_one(&mut **tx).await?;
    Ok(n)
}

async fn admin_counts(tx: &mut Transaction<'_, Sqlite>) -> Result<AdminStats> {
    Ok(AdminStats {
        total_users: count(tx, "SELECT COUNT(*) FROM users").await?,
        total_donors: count(
            tx,
            "SELECT COUNT(*) FROM users WHERE role = 'donor' AND is_approved = 1",
        )
        .await?,
        total_ngos: count(
            tx,
            "SELECT COUNT(*) FROM users WHERE role = 'ngo' AND is_approved = 1",
        )
        .await?,
        pending_approvals: count(tx, "SELECT COUNT(*) FROM users WHERE is_approved = 0").await?,
        total_donations: count(tx, "SELECT COUNT(*) FROM donations").await?,
        active_donations: count(
            tx,
            "SELECT COUNT(*) FROM donations WHERE status = 'available'",
        )
        .await?,
        total_requests: count(tx, "SELECT COUNT(*) FROM requests").await?,
        completed_donations: count(
            tx,
            "SELECT COUNT(*) FROM donations WHERE status = 'collected'",
        )
        .await?,
    })
}

async fn grouped(
    tx: &mut Transaction<'_, Sqlite>,
    sql: &str,
    since: chrono::DateTime<Utc>,
) -> Result<BTreeMap<String, i64>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(sql).bind(since).fetch_all(&mut **tx).await?;
    Ok(rows.into_iter().collect())
}

impl Ledger {
    pub async fn admin_stats(&self, actor: &PermissionContext) -> Result<AdminStats> {
        actor.check_permission(&Permission::StatsRead)?;

        let mut tx = self.pool.begin().await?;
        let stats = admin_counts(&mut tx).await?;
        tx.commit().await?;
        Ok(stats)
    }

    /// Donations created within the trailing report window, grouped by status and food type.
    pub async fn donation_report(&self, actor: &PermissionContext) -> Result<DonationReport> {
        actor.check_permission(&Permission::ReportRead)?;

        let since = Utc::now() - Duration::days(REPORT_WINDOW_DAYS);
        let mut tx = self.pool.begin().await?;

        let total_donations =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM donations WHERE created_at >= ?")
                .bind(since)
                .fetch_one(&mut *tx)
                .await?;
        let by_status = grouped(
            &mut tx,
            "SELECT status, COUNT(*) FROM donations WHERE created_at >= ? GROUP BY status",
            since,
        )
        .await?;
        let by_food_type = grouped(
            &mut tx,
            "SELECT food_type, COUNT(*) FROM donations WHERE created_at >= ? GROUP BY food_type",
            since,
        )
        .await?;
        tx.commit().await?;

        Ok(DonationReport {
            period: REPORT_PERIOD,
            since,
            total_donations,
            by_status,
            by_food_type,
        })
    }

    pub async fn user_stats(&self, actor: &PermissionContext) -> Result<UserStats> {
        let mut tx = self.pool.begin().await?;
        let id = actor.user_id();

        let stats = match actor.role() {
            Role::Donor => {
                let (total, available, claimed, collected): (i64, i64, i64, i64) = sqlx::query_as(
                    "SELECT COUNT(*),
                        COALESCE(SUM(status = 'available'), 0),
                        COALESCE(SUM(status = 'claimed'), 0),
                        COALESCE(SUM(status = 'collected'), 0)
                     FROM donations WHERE donor_id = ?",
                )
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
                UserStats::Donor(DonorStats {
                    total_donations: total,
                    active_donations: available,
                    claimed_donations: claimed,
                    completed_donations: collected,
                })
            }
            Role::Ngo => {
                let (total, pending, approved, collected): (i64, i64, i64, i64) = sqlx::query_as(
                    "SELECT COUNT(*),
                        COALESCE(SUM(status = 'pending'), 0),
                        COALESCE(SUM(status = 'approved'), 0),
                        COALESCE(SUM(status = 'collected'), 0)
                     FROM requests WHERE ngo_id = ?",
                )
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
                UserStats::Ngo(NgoStats {
                    total_requests: total,
                    pending_requests: pending,
                    approved_requests: approved,
                    completed_requests: collected,
                })
            }
            Role::Admin => {
                actor.check_permission(&Permission::StatsRead)?;
                UserStats::Admin(admin_counts(&mut tx).await?)
            }
        };

        tx.commit().await?;
        Ok(stats)
    }

    pub async fn pending_users(&self, actor: &PermissionContext) -> Result<Vec<User>> {
        actor.check_permission(&Permission::UsersRead)?;
        crate::db::users::list_pending(&self.pool).await
    }

    pub async fn approve_user(&self, actor: &PermissionContext, user_id: i64) -> Result<User> {
        actor.check_permission(&Permission::UsersApprove)?;
        let user = crate::db::users::approve_user(&self.pool, user_id).await?;
        tracing::info!(user_id = user.id, approved_by = actor.user_id(), "user approved");
        Ok(user)
    }
}
