//! Mutation operations for SeaOrmStorage
//!
//! Every write is a single statement; click counting and deactivation are
//! conditional updates evaluated by the database.

use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ExprTrait, QueryFilter};
use tracing::debug;

use super::converters::{model_to_link, new_link_to_active_model};
use super::{SeaOrmStorage, retry};
use crate::errors::Result;
use crate::storage::{DeactivateOutcome, Link, NewLink};

use migration::entities::link;

impl SeaOrmStorage {
    /// Runs once; a unique violation comes back as `CodeConflict`
    pub(super) async fn insert_link(&self, new_link: NewLink) -> Result<Link> {
        let saved = new_link_to_active_model(&new_link)
            .insert(&self.db)
            .await
            .map_err(|e| retry::classify(self.backend, &format!("insert({})", new_link.code), e))?;

        debug!("Link row inserted: {} -> {}", saved.code, saved.target_url);
        Ok(model_to_link(saved))
    }

    /// `click_count = click_count + 1` on an active row, evaluated by the database
    pub(super) async fn add_click(&self, code: &str) -> Result<bool> {
        let db = &self.db;

        let result = retry::replay(
            &format!("increment_clicks({})", code),
            self.backend,
            self.retry_policy,
            || async {
                link::Entity::update_many()
                    .col_expr(
                        link::Column::ClickCount,
                        Expr::col(link::Column::ClickCount).add(Expr::val(1i64)),
                    )
                    .filter(link::Column::Code.eq(code))
                    .filter(link::Column::Active.eq(true))
                    .exec(db)
                    .await
            },
        )
        .await?;

        Ok(result.rows_affected > 0)
    }

    /// `UPDATE links SET active = false WHERE code = ? AND active = true`
    pub(super) async fn deactivate_code(&self, code: &str) -> Result<DeactivateOutcome> {
        let db = &self.db;

        let result = retry::replay(
            &format!("deactivate({})", code),
            self.backend,
            self.retry_policy,
            || async {
                link::Entity::update_many()
                    .col_expr(link::Column::Active, Expr::val(false))
                    .filter(link::Column::Code.eq(code))
                    .filter(link::Column::Active.eq(true))
                    .exec(db)
                    .await
            },
        )
        .await?;

        if result.rows_affected > 0 {
            debug!("Link row deactivated: {}", code);
            return Ok(DeactivateOutcome::Deactivated);
        }

        if self.code_exists(code).await? {
            Ok(DeactivateOutcome::AlreadyInactive)
        } else {
            Ok(DeactivateOutcome::NotFound)
        }
    }
}
