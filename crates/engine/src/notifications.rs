//! Admin notification feed.
//!
//! Notifications are written after a ledger mutation has committed. Delivery
//! is best-effort: a failing [`Notifier`] is logged and never undoes the
//! mutation it describes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, entity::prelude::*, entity::ActiveValue};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

labeled_enum! {
    pub enum NotificationKind {
        Info => "info",
        Success => "success",
        Warning => "warning",
        Error => "error",
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub read: bool,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            message: message.into(),
            kind: NotificationKind::Info,
            read: false,
            link: None,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: NotificationKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// Sink for notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> ResultEngine<()>;
}

/// Stores notifications in the `notifications` table.
#[derive(Debug, Clone)]
pub struct DbNotifier {
    database: DatabaseConnection,
}

impl DbNotifier {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

#[async_trait]
impl Notifier for DbNotifier {
    async fn notify(&self, notification: Notification) -> ResultEngine<()> {
        ActiveModel::from(&notification).insert(&self.database).await?;
        Ok(())
    }
}

/// Drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _notification: Notification) -> ResultEngine<()> {
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub read: bool,
    pub link: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Notification> for ActiveModel {
    fn from(value: &Notification) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            title: ActiveValue::Set(value.title.clone()),
            message: ActiveValue::Set(value.message.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            read: ActiveValue::Set(value.read),
            link: ActiveValue::Set(value.link.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Notification {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "notification")?,
            title: model.title,
            message: model.message,
            kind: NotificationKind::try_from(model.kind.as_str())?,
            read: model.read,
            link: model.link,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_labels_parse_case_insensitively() {
        assert_eq!(NotificationKind::try_from("error").unwrap(), NotificationKind::Error);
        assert_eq!("Warning".parse::<NotificationKind>().unwrap(), NotificationKind::Warning);
        assert_eq!(NotificationKind::Error.as_str(), "error");
        assert!(NotificationKind::try_from("fatal").is_err());
    }
}
