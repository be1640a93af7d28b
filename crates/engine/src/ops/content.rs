use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, prelude::*};
use serde_json::Value;
use uuid::Uuid;

use crate::{ContentItem, ContentKind, EngineError, ResultEngine, content, keys, util::parse_uuid};

use super::{Engine, with_tx};

impl Engine {
    /// Items of one kind in display order.
    pub async fn content(&self, kind: ContentKind) -> ResultEngine<Vec<ContentItem>> {
        content::Entity::find()
            .filter(content::Column::Kind.eq(kind.as_str()))
            .order_by_asc(content::Column::Position)
            .order_by_asc(content::Column::UpdatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(ContentItem::try_from)
            .collect()
    }

    /// Every content kind, keyed by its label. Kinds without items map to an
    /// empty list.
    pub async fn portfolio(&self) -> ResultEngine<BTreeMap<String, Vec<ContentItem>>> {
        let mut portfolio: BTreeMap<String, Vec<ContentItem>> = ContentKind::ALL
            .iter()
            .map(|kind| (kind.as_str().to_string(), Vec::new()))
            .collect();
        let models = content::Entity::find()
            .order_by_asc(content::Column::Position)
            .order_by_asc(content::Column::UpdatedAt)
            .all(&self.database)
            .await?;
        for model in models {
            let item = ContentItem::try_from(model)?;
            portfolio
                .entry(item.kind.as_str().to_string())
                .or_default()
                .push(item);
        }
        Ok(portfolio)
    }

    /// Appends an item. For hero and config this replaces the single item.
    pub async fn add_content(&self, kind: ContentKind, data: Value) -> ResultEngine<ContentItem> {
        if kind.is_singleton() {
            return self.save_content(kind, data).await;
        }
        kind.validate(&data)?;

        let created: ResultEngine<ContentItem> = with_tx!(self, |db_tx| {
            let position = next_position(&db_tx, kind).await?;
            let item = ContentItem {
                id: Uuid::new_v4(),
                kind,
                position,
                data,
                updated_at: Utc::now(),
            };
            content::ActiveModel::from(&item).insert(&db_tx).await?;
            Ok(item)
        });
        let item = created?;

        tracing::info!(id = %item.id, %kind, "content added");
        self.invalidate_content(kind).await;
        Ok(item)
    }

    /// Creates or replaces the item of a singleton kind.
    pub async fn save_content(&self, kind: ContentKind, data: Value) -> ResultEngine<ContentItem> {
        if !kind.is_singleton() {
            return Err(EngineError::Validation(format!(
                "{kind} holds a list; add or edit items instead"
            )));
        }
        kind.validate(&data)?;

        let saved: ResultEngine<ContentItem> = with_tx!(self, |db_tx| {
            let existing = content::Entity::find()
                .filter(content::Column::Kind.eq(kind.as_str()))
                .one(&db_tx)
                .await?;
            let item = ContentItem {
                id: match &existing {
                    Some(model) => parse_uuid(&model.id, "content")?,
                    None => Uuid::new_v4(),
                },
                kind,
                position: 0,
                data,
                updated_at: Utc::now(),
            };
            let model = content::ActiveModel::from(&item);
            if existing.is_some() {
                model.update(&db_tx).await?;
            } else {
                model.insert(&db_tx).await?;
            }
            Ok(item)
        });
        let item = saved?;

        tracing::info!(id = %item.id, %kind, "content saved");
        self.invalidate_content(kind).await;
        Ok(item)
    }

    /// Replaces the data of an item, keeping its position.
    pub async fn update_content(
        &self,
        kind: ContentKind,
        item_id: Uuid,
        data: Value,
    ) -> ResultEngine<ContentItem> {
        kind.validate(&data)?;

        let updated: ResultEngine<ContentItem> = with_tx!(self, |db_tx| {
            let existing = load_item(&db_tx, kind, item_id).await?;
            let model = content::ActiveModel {
                id: ActiveValue::Set(existing.id.to_string()),
                data: ActiveValue::Set(data.to_string()),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            ContentItem::try_from(model)
        });
        let item = updated?;

        tracing::info!(id = %item.id, %kind, "content updated");
        self.invalidate_content(kind).await;
        Ok(item)
    }

    pub async fn delete_content(
        &self,
        kind: ContentKind,
        item_id: Uuid,
    ) -> ResultEngine<ContentItem> {
        let deleted: ResultEngine<ContentItem> = with_tx!(self, |db_tx| {
            let existing = load_item(&db_tx, kind, item_id).await?;
            content::Entity::delete_by_id(item_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(existing)
        });
        let item = deleted?;

        tracing::info!(id = %item.id, %kind, "content deleted");
        self.invalidate_content(kind).await;
        Ok(item)
    }

    async fn invalidate_content(&self, kind: ContentKind) {
        let keys = keys::content_invalidation(kind);
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        self.after_commit(&keys, None).await;
    }
}

async fn load_item<C: ConnectionTrait>(
    db: &C,
    kind: ContentKind,
    item_id: Uuid,
) -> ResultEngine<ContentItem> {
    let model = content::Entity::find_by_id(item_id.to_string())
        .filter(content::Column::Kind.eq(kind.as_str()))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("{kind} item not exists")))?;
    ContentItem::try_from(model)
}

async fn next_position<C: ConnectionTrait>(db: &C, kind: ContentKind) -> ResultEngine<i32> {
    let max: Option<Option<i32>> = content::Entity::find()
        .select_only()
        .column_as(content::Column::Position.max(), "max_position")
        .filter(content::Column::Kind.eq(kind.as_str()))
        .into_tuple()
        .one(db)
        .await?;
    Ok(max.flatten().map_or(0, |position| position + 1))
}
