//! User rows keyed by the identity provider's stable subject.

use crate::error::{ApiError, Result};
use anyhow::anyhow;
use sea_orm::{entity::*, query::*, sea_query::OnConflict, DatabaseConnection, DbErr};
use tracing::{info, instrument};
use uuid::Uuid;

pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Look up a user by external id without creating one.
    #[instrument(skip(self))]
    pub async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<entity::users::Model>> {
        let user = entity::users::Entity::find()
            .filter(entity::users::Column::ExternalId.eq(external_id))
            .one(&self.db)
            .await?;

        Ok(user)
    }

    /// Get the user row for an authenticated subject, creating it on first
    /// access. Concurrent first requests race on the unique external_id
    /// index; the losing insert is a no-op and both callers read the same row.
    #[instrument(skip(self))]
    pub async fn get_or_create(&self, external_id: &str) -> Result<entity::users::Model> {
        if let Some(user) = self.find_by_external_id(external_id).await? {
            return Ok(user);
        }

        let new_user = entity::users::ActiveModel {
            id: Set(Uuid::new_v4()),
            external_id: Set(external_id.to_string()),
            free_credits_used: Set(0),
            created_at: Set(time::OffsetDateTime::now_utc()),
        };

        let insert_result = entity::users::Entity::insert(new_user)
            .on_conflict(
                OnConflict::column(entity::users::Column::ExternalId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.db)
            .await;

        // A losing concurrent insert surfaces as RecordNotInserted; the
        // winner's row is read back below either way
        match insert_result {
            Ok(_) => info!("Created user for external id {}", external_id),
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }

        // Return the existing or newly-inserted row
        self.find_by_external_id(external_id)
            .await?
            .ok_or_else(|| {
                ApiError::Internal(anyhow!("Failed to find user record after upsert"))
            })
    }
}
