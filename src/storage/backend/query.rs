//! Query operations for SeaOrmStorage
//!
//! Read-only statements against the `links` table.

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use tracing::trace;

use super::converters::model_to_link;
use super::{SeaOrmStorage, retry};
use crate::errors::Result;
use crate::storage::{Link, OwnerId};

use migration::entities::link;

impl SeaOrmStorage {
    pub(super) async fn code_exists(&self, code: &str) -> Result<bool> {
        let db = &self.db;

        let count = retry::replay(
            &format!("exists({})", code),
            self.backend,
            self.retry_policy,
            || async {
                link::Entity::find()
                    .filter(link::Column::Code.eq(code))
                    .count(db)
                    .await
            },
        )
        .await?;

        Ok(count > 0)
    }

    pub(super) async fn find_by_code(&self, code: &str) -> Result<Option<Link>> {
        let model = link::Entity::find()
            .filter(link::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(|e| retry::classify(self.backend, &format!("get({})", code), e))?;

        trace!("Storage lookup for '{}': found={}", code, model.is_some());
        Ok(model.map(model_to_link))
    }

    pub(super) async fn find_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Link>> {
        let models = link::Entity::find()
            .filter(link::Column::OwnerId.eq(owner_id))
            .order_by_desc(link::Column::CreatedAt)
            .order_by_desc(link::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                retry::classify(self.backend, &format!("list_by_owner({})", owner_id), e)
            })?;

        Ok(models.into_iter().map(model_to_link).collect())
    }
}
