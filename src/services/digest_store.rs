//! Persistence for generated digests, keyed by (user, video).

use crate::error::{ApiError, Result};
use anyhow::anyhow;
use sea_orm::{entity::*, query::*, sea_query::OnConflict, DatabaseConnection, DbErr};
use tracing::instrument;
use uuid::Uuid;

pub struct DigestStore {
    db: DatabaseConnection,
}

/// Result of a create attempt. The storage-level unique index on
/// (user_id, video_id) decides races: the second writer is ignored and
/// handed the surviving row, never allowed to overwrite.
#[derive(Debug)]
pub enum CreateOutcome {
    Created(entity::digests::Model),
    AlreadyExists(entity::digests::Model),
}

impl DigestStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Cache lookup; no side effects.
    #[instrument(skip(self))]
    pub async fn find(
        &self,
        user_id: Uuid,
        video_id: &str,
    ) -> Result<Option<entity::digests::Model>> {
        let digest = entity::digests::Entity::find()
            .filter(entity::digests::Column::UserId.eq(user_id))
            .filter(entity::digests::Column::VideoId.eq(video_id))
            .one(&self.db)
            .await?;

        Ok(digest)
    }

    /// Persist a freshly generated digest.
    #[instrument(skip(self, markdown))]
    pub async fn create(
        &self,
        user_id: Uuid,
        video_id: &str,
        video_title: &str,
        markdown: &str,
    ) -> Result<CreateOutcome> {
        let digest_id = Uuid::new_v4();

        let new_digest = entity::digests::ActiveModel {
            id: Set(digest_id),
            user_id: Set(user_id),
            video_id: Set(video_id.to_string()),
            video_title: Set(video_title.to_string()),
            markdown: Set(markdown.to_string()),
            created_at: Set(time::OffsetDateTime::now_utc()),
        };

        let insert_result = entity::digests::Entity::insert(new_digest)
            .on_conflict(
                OnConflict::columns([
                    entity::digests::Column::UserId,
                    entity::digests::Column::VideoId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec(&self.db)
            .await;

        // RecordNotInserted means a concurrent writer won; the read-back
        // below returns its row
        match insert_result {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }

        // Read back to learn which writer won
        let persisted = self.find(user_id, video_id).await?.ok_or_else(|| {
            ApiError::Internal(anyhow!(
                "Failed to read digest after upsert for video {video_id}"
            ))
        })?;

        if persisted.id == digest_id {
            Ok(CreateOutcome::Created(persisted))
        } else {
            Ok(CreateOutcome::AlreadyExists(persisted))
        }
    }

    /// History listing, newest first.
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<entity::digests::Model>> {
        let digests = entity::digests::Entity::find()
            .filter(entity::digests::Column::UserId.eq(user_id))
            .order_by_desc(entity::digests::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(digests)
    }
}
