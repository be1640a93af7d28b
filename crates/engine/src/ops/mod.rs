use std::{fmt, sync::Arc};

use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait};
use uuid::Uuid;

use crate::{Cache, DbNotifier, EngineError, Notification, Notifier, ResultEngine};

mod balances;
mod categories;
mod content;
mod expenses;
mod incomes;
mod ledger;
mod notifications;
mod payments;
mod people;
mod reports;
mod transfers;
mod wallets;

pub use balances::BalanceDrift;
pub use reports::{
    ExpenseBreakdown, FinancialSummary, WalletHistory, WalletHistoryEntry, health_score,
};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = sea_orm::TransactionTrait::begin(&$self.database).await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

pub struct Engine {
    database: DatabaseConnection,
    cache: Cache,
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("database", &self.database)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    /// Runs once a mutation has committed: drops the stale cache keys, then
    /// hands the notification to the notifier. Neither step can fail the
    /// mutation.
    async fn after_commit(&self, keys: &[&str], notification: Option<Notification>) {
        self.cache.invalidate(keys).await;
        if let Some(notification) = notification {
            let title = notification.title.clone();
            if let Err(err) = self.notifier.notify(notification).await {
                tracing::warn!(%title, "notification not delivered: {err}");
            }
        }
    }

    async fn require_wallet<C: ConnectionTrait>(
        &self,
        db: &C,
        wallet_id: Uuid,
    ) -> ResultEngine<crate::wallets::Model> {
        crate::wallets::Entity::find_by_id(wallet_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("wallet not exists".to_string()))
    }

    async fn require_person<C: ConnectionTrait>(
        &self,
        db: &C,
        person_id: Uuid,
    ) -> ResultEngine<crate::people::Model> {
        crate::people::Entity::find_by_id(person_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("person not exists".to_string()))
    }

    async fn require_category<C: ConnectionTrait>(
        &self,
        db: &C,
        category_id: Uuid,
    ) -> ResultEngine<crate::categories::Model> {
        crate::categories::Entity::find_by_id(category_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
    }
}

/// Id of a record about to be created: the caller's when given, else a new one.
///
/// Offline clients pick ids up front so later queued edits can refer to the
/// record. A caller id that is already taken fails with `ExistingKey`.
async fn new_record_id<E, C>(db: &C, requested: Option<Uuid>, what: &str) -> ResultEngine<Uuid>
where
    E: EntityTrait,
    String: Into<<E::PrimaryKey as sea_orm::PrimaryKeyTrait>::ValueType>,
    C: ConnectionTrait,
{
    let Some(id) = requested else {
        return Ok(Uuid::new_v4());
    };
    if E::find_by_id(id.to_string()).one(db).await?.is_some() {
        return Err(EngineError::ExistingKey(format!("{what} {id}")));
    }
    Ok(id)
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    cache: Option<Cache>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Cache for list views. Defaults to a disabled cache.
    pub fn cache(mut self, cache: Cache) -> EngineBuilder {
        self.cache = Some(cache);
        self
    }

    /// Defaults to storing notifications in the engine database.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> EngineBuilder {
        self.notifier = Some(notifier);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(DbNotifier::new(self.database.clone())));
        Ok(Engine {
            database: self.database,
            cache: self.cache.unwrap_or_default(),
            notifier,
        })
    }
}
