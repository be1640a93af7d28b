//! Portfolio content items.
//!
//! Every kind shares one table. The per-kind fields live in a JSON object and
//! are checked by [`ContentKind::validate`] before any write.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

labeled_enum! {
    pub enum ContentKind {
        Hero => "hero",
        Config => "config",
        Skills => "skills",
        Projects => "projects",
        Testimonials => "testimonials",
        Education => "education",
        Experience => "experience",
    }
}

impl ContentKind {
    /// Singletons hold exactly one item that is saved in place.
    pub fn is_singleton(self) -> bool {
        matches!(self, Self::Hero | Self::Config)
    }

    fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Hero | Self::Config => &[],
            Self::Skills => &["name"],
            Self::Projects => &["title", "description", "imageUrl"],
            Self::Testimonials => &["name", "position", "message"],
            Self::Education => &["institution", "degree", "field", "startDate"],
            Self::Experience => &["company", "role", "startDate"],
        }
    }

    /// Check `data` against the fields this kind requires.
    pub fn validate(self, data: &Value) -> ResultEngine<()> {
        let object = data.as_object().ok_or_else(|| {
            EngineError::Validation(format!("{self} content must be a JSON object"))
        })?;

        for field in self.required_fields() {
            if !has_text(object, field) {
                return Err(EngineError::Validation(format!(
                    "{self}: field '{field}' is required"
                )));
            }
        }

        if self == Self::Skills {
            let level = object
                .get("level")
                .and_then(level_value)
                .ok_or_else(|| {
                    EngineError::Validation("skills: field 'level' is required".to_string())
                })?;
            if !(0..=100).contains(&level) {
                return Err(EngineError::Validation(format!(
                    "skills: level must be between 0 and 100, got {level}"
                )));
            }
        }
        Ok(())
    }
}

fn has_text(object: &Map<String, Value>, field: &str) -> bool {
    match object.get(field) {
        Some(Value::String(text)) => !text.trim().is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

/// Form posts carry numbers as text.
fn level_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub kind: ContentKind,
    pub position: i32,
    pub data: Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "content_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub position: i32,
    #[sea_orm(column_type = "Text")]
    pub data: String,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ContentItem> for ActiveModel {
    fn from(value: &ContentItem) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            position: ActiveValue::Set(value.position),
            data: ActiveValue::Set(value.data.to_string()),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for ContentItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let data = serde_json::from_str(&model.data).map_err(|err| {
            EngineError::Validation(format!("stored content {} is not JSON: {err}", model.id))
        })?;
        Ok(Self {
            id: parse_uuid(&model.id, "content")?,
            kind: ContentKind::try_from(model.kind.as_str())?,
            position: model.position,
            data,
            updated_at: model.updated_at,
        })
    }
}
