//! Per-user credit ledger.
//!
//! Free allotment is consumed before paid packs; paid packs drain
//! oldest-purchase-first, tie-broken on the lowest pack id. The debit runs
//! inside one transaction holding an exclusive lock on the user row, so
//! concurrent debits for the same user serialize and cannot double-spend.

use crate::{
    config::QuotaConfig,
    error::{ApiError, Result},
    models::quota::QuotaSnapshot,
};
use anyhow::anyhow;
use sea_orm::{
    entity::*, query::*, sea_query::OnConflict, DatabaseConnection, DbErr, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

pub struct QuotaService {
    db: DatabaseConnection,
    config: QuotaConfig,
}

impl QuotaService {
    pub fn new(db: DatabaseConnection, config: &QuotaConfig) -> Self {
        Self {
            db,
            config: config.clone(),
        }
    }

    /// Pure read of the current credit position. Never mutates.
    #[instrument(skip(self))]
    pub async fn get_quota(&self, user_id: Uuid) -> Result<QuotaSnapshot> {
        let user = entity::users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {user_id} not found")))?;

        let paid_remaining = self.sum_active_pack_credits(user_id).await?;

        Ok(QuotaSnapshot::compute(
            user.free_credits_used,
            self.config.free_allowance,
            paid_remaining,
        ))
    }

    /// Atomically consume one credit and return the post-debit snapshot.
    ///
    /// The snapshot is recomputed under the user-row lock, so the check and
    /// the mutation cannot interleave with another debit for the same user.
    #[instrument(skip(self))]
    pub async fn debit_one(&self, user_id: Uuid) -> Result<QuotaSnapshot> {
        let txn = self.db.begin().await?;

        // Lock the user row; this is the per-user critical section
        let user = entity::users::Entity::find_by_id(user_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {user_id} not found")))?;

        // Active packs, consumption order: oldest purchase first, then id
        let packs = entity::packs::Entity::find()
            .filter(entity::packs::Column::UserId.eq(user_id))
            .filter(entity::packs::Column::CreditsRemaining.gt(0))
            .order_by_asc(entity::packs::Column::PurchasedAt)
            .order_by_asc(entity::packs::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await?;

        let free_allowance = self.config.free_allowance;
        let paid_remaining: i32 = packs.iter().map(|p| p.credits_remaining).sum();
        let before = QuotaSnapshot::compute(user.free_credits_used, free_allowance, paid_remaining);

        if before.total_remaining <= 0 {
            txn.rollback().await?;
            return Err(ApiError::QuotaExceeded(format!(
                "No credits remaining (free: {}, paid: {})",
                before.free_remaining, before.paid_remaining
            )));
        }

        let after = if before.free_remaining > 0 {
            let free_credits_used = user.free_credits_used + 1;
            let mut user_active: entity::users::ActiveModel = user.into();
            user_active.free_credits_used = Set(free_credits_used);
            user_active.update(&txn).await?;

            QuotaSnapshot::compute(free_credits_used, free_allowance, paid_remaining)
        } else {
            // Ordering above guarantees packs[0] is the oldest active pack
            let pack = packs
                .into_iter()
                .next()
                .ok_or_else(|| ApiError::Internal(anyhow!("Paid quota reported without an active pack")))?;

            let credits_remaining = pack.credits_remaining - 1;
            let mut pack_active: entity::packs::ActiveModel = pack.into();
            pack_active.credits_remaining = Set(credits_remaining);
            pack_active.update(&txn).await?;

            QuotaSnapshot::compute(
                user.free_credits_used,
                free_allowance,
                paid_remaining - 1,
            )
        };

        txn.commit().await?;

        info!(
            "Debited one credit for user {} (free: {}, paid: {}, total: {})",
            user_id, after.free_remaining, after.paid_remaining, after.total_remaining
        );

        Ok(after)
    }

    /// Append a purchased pack from a checkout fulfillment.
    ///
    /// Idempotent on the checkout session id: a retried or duplicated
    /// webhook delivery gets `Conflict` instead of a second pack.
    #[instrument(skip(self))]
    pub async fn grant_pack(
        &self,
        user_id: Uuid,
        credits: i32,
        checkout_session_id: &str,
    ) -> Result<entity::packs::Model> {
        let txn = self.db.begin().await?;

        let pack_id = Uuid::new_v4();
        let now = time::OffsetDateTime::now_utc();

        let new_pack = entity::packs::ActiveModel {
            id: Set(pack_id),
            user_id: Set(user_id),
            credits_total: Set(credits),
            credits_remaining: Set(credits),
            checkout_session_id: Set(checkout_session_id.to_string()),
            purchased_at: Set(now),
        };

        // Insert atomically; if the session id already exists, do nothing
        // instead of erroring.
        let insert_result = entity::packs::Entity::insert(new_pack)
            .on_conflict(
                OnConflict::column(entity::packs::Column::CheckoutSessionId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&txn)
            .await;

        // A fired ON CONFLICT DO NOTHING inserts no row and surfaces as
        // RecordNotInserted; the read-back below decides the outcome
        match insert_result {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }

        // Check whether this pack was inserted or already existed
        let persisted = entity::packs::Entity::find()
            .filter(entity::packs::Column::CheckoutSessionId.eq(checkout_session_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ApiError::Internal(anyhow!(
                    "Failed to read pack after insert for checkout session {}",
                    checkout_session_id
                ))
            })?;

        if persisted.id != pack_id {
            // Another delivery already fulfilled this checkout
            txn.rollback().await?;
            return Err(ApiError::Conflict(format!(
                "Checkout session {} already fulfilled at {}",
                checkout_session_id, persisted.purchased_at
            )));
        }

        txn.commit().await?;

        info!(
            "Granted pack of {} credits to user {} (session {})",
            credits, user_id, checkout_session_id
        );

        Ok(persisted)
    }

    pub fn pack_size(&self) -> i32 {
        self.config.pack_size
    }

    async fn sum_active_pack_credits(&self, user_id: Uuid) -> Result<i32> {
        let packs = entity::packs::Entity::find()
            .filter(entity::packs::Column::UserId.eq(user_id))
            .filter(entity::packs::Column::CreditsRemaining.gt(0))
            .all(&self.db)
            .await?;

        Ok(packs.iter().map(|p| p.credits_remaining).sum())
    }
}
