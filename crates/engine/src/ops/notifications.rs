use sea_orm::{QueryFilter, QueryOrder, QuerySelect, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{Notification, ResultEngine, notifications};

use super::Engine;

impl Engine {
    /// Most recent notifications first.
    pub async fn notifications(&self, limit: u64) -> ResultEngine<Vec<Notification>> {
        notifications::Entity::find()
            .order_by_desc(notifications::Column::CreatedAt)
            .limit(limit)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Notification::try_from)
            .collect()
    }

    /// Marks one notification, or all of them when `id` is `None`, as read.
    pub async fn mark_notifications_read(&self, id: Option<Uuid>) -> ResultEngine<u64> {
        let mut update = notifications::Entity::update_many()
            .col_expr(notifications::Column::Read, Expr::value(true))
            .filter(notifications::Column::Read.eq(false));
        if let Some(id) = id {
            update = update.filter(notifications::Column::Id.eq(id.to_string()));
        }
        Ok(update.exec(&self.database).await?.rows_affected)
    }
}
