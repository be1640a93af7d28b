use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    Category, CategoryCmd, CategoryKind, EngineError, FinanceEntity, ResultEngine, categories,
    expenses, incomes,
    util::{normalize_display, normalize_key},
};

use super::{Engine, new_record_id, normalize_optional_text, with_tx};

impl Engine {
    /// Categories, optionally of one kind, by name.
    pub async fn categories(&self, kind: Option<CategoryKind>) -> ResultEngine<Vec<Category>> {
        let mut query = categories::Entity::find()
            .order_by_asc(categories::Column::Kind)
            .order_by_asc(categories::Column::NameNorm);
        if let Some(kind) = kind {
            query = query.filter(categories::Column::Kind.eq(kind.as_str()));
        }
        query
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }

    pub async fn category(&self, category_id: Uuid) -> ResultEngine<Category> {
        Category::try_from(self.require_category(&self.database, category_id).await?)
    }

    /// Creates a category. Names are unique per kind, ignoring case.
    pub async fn create_category(&self, cmd: CategoryCmd) -> ResultEngine<Category> {
        let created: ResultEngine<Category> = with_tx!(self, |db_tx| {
            let id = new_record_id::<categories::Entity, _>(&db_tx, cmd.id, "category").await?;
            let (category, name_norm) = build_category(id, Utc::now(), cmd)?;
            ensure_unique(&db_tx, &category, &name_norm).await?;
            categories::active_model(&category, name_norm)
                .insert(&db_tx)
                .await?;
            Ok(category)
        });
        let category = created?;

        tracing::info!(id = %category.id, kind = %category.kind, "category created");
        self.after_commit(FinanceEntity::Categories.invalidation_keys(), None)
            .await;
        Ok(category)
    }

    pub async fn update_category(
        &self,
        category_id: Uuid,
        cmd: CategoryCmd,
    ) -> ResultEngine<Category> {
        let updated: ResultEngine<Category> = with_tx!(self, |db_tx| {
            let existing = self.require_category(&db_tx, category_id).await?;
            let (category, name_norm) = build_category(category_id, existing.created_at, cmd)?;
            ensure_unique(&db_tx, &category, &name_norm).await?;
            categories::active_model(&category, name_norm)
                .update(&db_tx)
                .await?;
            Ok(category)
        });
        let category = updated?;

        tracing::info!(id = %category.id, "category updated");
        self.after_commit(FinanceEntity::Categories.invalidation_keys(), None)
            .await;
        Ok(category)
    }

    /// Deletes a category. Expenses and income that pointed at it keep their
    /// free-text category and lose the reference.
    pub async fn delete_category(&self, category_id: Uuid) -> ResultEngine<Category> {
        let deleted: ResultEngine<Category> = with_tx!(self, |db_tx| {
            let category = Category::try_from(self.require_category(&db_tx, category_id).await?)?;
            let id = category_id.to_string();
            expenses::Entity::update_many()
                .col_expr(expenses::Column::CategoryId, Expr::value(Option::<String>::None))
                .filter(expenses::Column::CategoryId.eq(id.as_str()))
                .exec(&db_tx)
                .await?;
            incomes::Entity::update_many()
                .col_expr(incomes::Column::CategoryId, Expr::value(Option::<String>::None))
                .filter(incomes::Column::CategoryId.eq(id.as_str()))
                .exec(&db_tx)
                .await?;
            categories::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(category)
        });
        let category = deleted?;

        tracing::info!(id = %category.id, "category deleted");
        let mut keys = FinanceEntity::Categories.invalidation_keys().to_vec();
        keys.extend_from_slice(FinanceEntity::Expenses.invalidation_keys());
        keys.extend_from_slice(FinanceEntity::Income.invalidation_keys());
        self.after_commit(&keys, None).await;
        Ok(category)
    }
}

fn build_category(
    id: Uuid,
    created_at: DateTime<Utc>,
    cmd: CategoryCmd,
) -> ResultEngine<(Category, String)> {
    let name = normalize_display(&cmd.name, "category")?;
    let name_norm = normalize_key(&name);
    let category = Category {
        id,
        name,
        kind: cmd.kind,
        color: normalize_optional_text(cmd.color.as_deref()),
        icon: normalize_optional_text(cmd.icon.as_deref()),
        created_at,
    };
    Ok((category, name_norm))
}

async fn ensure_unique<C: ConnectionTrait>(
    db: &C,
    category: &Category,
    name_norm: &str,
) -> ResultEngine<()> {
    let clash = categories::Entity::find()
        .filter(categories::Column::Kind.eq(category.kind.as_str()))
        .filter(categories::Column::NameNorm.eq(name_norm))
        .filter(categories::Column::Id.ne(category.id.to_string()))
        .one(db)
        .await?;
    if clash.is_some() {
        return Err(EngineError::ExistingKey(category.name.clone()));
    }
    Ok(())
}
