use crate::{error::Result, models::Event};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::FindOptions,
    Client, Collection, Database,
};
use tracing::info;

pub const ACTIVE_STATUSES: [&str; 2] = ["live", "upcoming"];

/// Read access to events and registrations
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Ids of every event the user has registered for
    async fn registered_event_ids(&self, user: ObjectId) -> Result<Vec<ObjectId>>;

    async fn events_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Event>>;

    /// Events whose status is live or upcoming
    async fn live_events(&self) -> Result<Vec<Event>>;

    /// Live or upcoming events the user has not registered for
    async fn candidate_events(&self, user: ObjectId) -> Result<Vec<Event>>;

    /// Most recently created events, newest first
    async fn latest_events(&self, limit: usize) -> Result<Vec<Event>>;
}

#[derive(Debug, Clone)]
pub struct MongoEventStore {
    events: Collection<Document>,
    registrations: Collection<Document>,
}

impl MongoEventStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        let store = Self::from_database(&client.database(database));

        let events = store.events.count_documents(doc! {}, None).await?;
        let registrations = store.registrations.count_documents(doc! {}, None).await?;
        info!("Loaded events: {}", events);
        info!("Loaded registrations: {}", registrations);

        Ok(store)
    }

    pub fn from_database(db: &Database) -> Self {
        Self {
            events: db.collection("events"),
            registrations: db.collection("registrations"),
        }
    }

    async fn find_events(&self, filter: Document, options: Option<FindOptions>) -> Result<Vec<Event>> {
        let documents: Vec<Document> = self.events.find(filter, options).await?.try_collect().await?;
        Ok(documents.into_iter().map(Event::new).collect())
    }
}

/// Driver limits are signed and a negative one means "single batch", so
/// oversized values saturate instead of wrapping.
fn find_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait]
impl EventStore for MongoEventStore {
    async fn registered_event_ids(&self, user: ObjectId) -> Result<Vec<ObjectId>> {
        let registrations: Vec<Document> = self
            .registrations
            .find(doc! { "userId": user }, None)
            .await?
            .try_collect()
            .await?;

        Ok(registrations
            .iter()
            .filter_map(|r| r.get_object_id("eventId").ok())
            .collect())
    }

    async fn events_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Event>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.find_events(doc! { "_id": { "$in": ids.to_vec() } }, None)
            .await
    }

    async fn live_events(&self) -> Result<Vec<Event>> {
        self.find_events(doc! { "status": { "$in": ACTIVE_STATUSES.to_vec() } }, None)
            .await
    }

    async fn candidate_events(&self, user: ObjectId) -> Result<Vec<Event>> {
        let registered = self.registered_event_ids(user).await?;
        self.find_events(
            doc! {
                "status": { "$in": ACTIVE_STATUSES.to_vec() },
                "_id": { "$nin": registered },
            },
            None,
        )
        .await
    }

    async fn latest_events(&self, limit: usize) -> Result<Vec<Event>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .limit(find_limit(limit))
            .build();
        self.find_events(doc! {}, Some(options)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_limit_saturates() {
        assert_eq!(find_limit(0), 0);
        assert_eq!(find_limit(3), 3);
        assert_eq!(find_limit(usize::MAX), i64::MAX);
        assert!(find_limit(i64::MAX as usize + 1) > 0);
    }
}
