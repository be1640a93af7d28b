//! Descriptive tags for expenses and income. Categories carry no ledger effect.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

labeled_enum! {
    pub enum CategoryKind {
        Expense => "expense",
        Income => "income",
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub kind: CategoryKind,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub name_norm: String,
    pub kind: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "category")?,
            name: model.name,
            kind: CategoryKind::try_from(model.kind.as_str())?,
            color: model.color,
            icon: model.icon,
            created_at: model.created_at,
        })
    }
}

pub(crate) fn active_model(category: &Category, name_norm: String) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::Set(category.id.to_string()),
        name: ActiveValue::Set(category.name.clone()),
        name_norm: ActiveValue::Set(name_norm),
        kind: ActiveValue::Set(category.kind.as_str().to_string()),
        color: ActiveValue::Set(category.color.clone()),
        icon: ActiveValue::Set(category.icon.clone()),
        created_at: ActiveValue::Set(category.created_at),
    }
}
