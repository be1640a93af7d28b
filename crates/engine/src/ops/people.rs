use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, FinanceEntity, Payment, Person, PersonCmd, PersonSummary, PersonTotals,
    ResultEngine, payments, people, util::normalize_display,
};

use super::{Engine, new_record_id, normalize_optional_text, with_tx};

impl Engine {
    pub async fn people(&self) -> ResultEngine<Vec<Person>> {
        people::Entity::find()
            .order_by_asc(people::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Person::try_from)
            .collect()
    }

    pub async fn person(&self, person_id: Uuid) -> ResultEngine<Person> {
        Person::try_from(self.require_person(&self.database, person_id).await?)
    }

    /// A person with every payment exchanged with them and the derived totals.
    pub async fn person_summary(&self, person_id: Uuid) -> ResultEngine<PersonSummary> {
        let person = self.person(person_id).await?;
        let payments = self.person_payments(person_id).await?;
        Ok(PersonSummary {
            totals: PersonTotals::from_payments(&payments),
            person,
            payments,
        })
    }

    /// Every person with derived totals, as shown on the people list.
    pub async fn person_summaries(&self) -> ResultEngine<Vec<PersonSummary>> {
        let people = self.people().await?;
        let mut by_person: HashMap<Uuid, Vec<Payment>> = HashMap::new();
        for payment in self.payments().await? {
            by_person.entry(payment.person_id).or_default().push(payment);
        }

        Ok(people
            .into_iter()
            .map(|person| {
                let payments = by_person.remove(&person.id).unwrap_or_default();
                PersonSummary {
                    totals: PersonTotals::from_payments(&payments),
                    person,
                    payments,
                }
            })
            .collect())
    }

    pub async fn create_person(&self, cmd: PersonCmd) -> ResultEngine<Person> {
        let id = new_record_id::<people::Entity, _>(&self.database, cmd.id, "person").await?;
        let person = build_person(id, Utc::now(), cmd)?;
        people::ActiveModel::from(&person)
            .insert(&self.database)
            .await?;

        tracing::info!(id = %person.id, "person created");
        self.after_commit(FinanceEntity::People.invalidation_keys(), None)
            .await;
        Ok(person)
    }

    pub async fn update_person(&self, person_id: Uuid, cmd: PersonCmd) -> ResultEngine<Person> {
        let updated: ResultEngine<Person> = with_tx!(self, |db_tx| {
            let existing = self.require_person(&db_tx, person_id).await?;
            let person = build_person(person_id, existing.created_at, cmd)?;
            people::ActiveModel::from(&person).update(&db_tx).await?;
            Ok(person)
        });
        let person = updated?;

        tracing::info!(id = %person.id, "person updated");
        self.after_commit(FinanceEntity::People.invalidation_keys(), None)
            .await;
        Ok(person)
    }

    /// Deletes a person without payments.
    ///
    /// Payments own the wallet effects, so a person who still has payments
    /// cannot be removed; delete the payments first.
    pub async fn delete_person(&self, person_id: Uuid) -> ResultEngine<Person> {
        let deleted: ResultEngine<Person> = with_tx!(self, |db_tx| {
            let person = Person::try_from(self.require_person(&db_tx, person_id).await?)?;
            let outstanding = payments::Entity::find()
                .filter(payments::Column::PersonId.eq(person_id.to_string()))
                .count(&db_tx)
                .await?;
            if outstanding > 0 {
                return Err(EngineError::Conflict(format!(
                    "{} still has {outstanding} payment(s)",
                    person.name
                )));
            }
            people::Entity::delete_by_id(person_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(person)
        });
        let person = deleted?;

        tracing::info!(id = %person.id, "person deleted");
        self.after_commit(FinanceEntity::People.invalidation_keys(), None)
            .await;
        Ok(person)
    }
}

fn build_person(id: Uuid, created_at: DateTime<Utc>, cmd: PersonCmd) -> ResultEngine<Person> {
    Ok(Person {
        id,
        name: normalize_display(&cmd.name, "person")?,
        kind: cmd.kind,
        phone: normalize_optional_text(cmd.phone.as_deref()),
        email: normalize_optional_text(cmd.email.as_deref()).map(|e| e.to_lowercase()),
        address: normalize_optional_text(cmd.address.as_deref()),
        notes: normalize_optional_text(cmd.notes.as_deref()),
        created_at,
    })
}
