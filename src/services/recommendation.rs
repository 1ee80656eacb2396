use crate::{
    error::{ApiError, Result},
    ml::{cluster_events, cosine_similarity, TfidfVectorizer, DEFAULT_CLUSTERS},
    models::Event,
    services::event_store::EventStore,
};
use mongodb::bson::oid::ObjectId;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tracing::{debug, info};

const SIMILARITY_WEIGHT: f64 = 0.5;
const CLUSTER_WEIGHT: f64 = 0.3;
const TYPE_WEIGHT: f64 = 0.2;
const NEUTRAL_SCORE: f64 = 0.5;

pub const DEFAULT_TOP_N: usize = 3;

#[derive(Clone)]
pub struct RecommendationService {
    store: Arc<dyn EventStore>,
    n_clusters: usize,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            store,
            n_clusters: DEFAULT_CLUSTERS,
        }
    }

    /// Recommend up to `top_n` live or upcoming events for a user.
    ///
    /// Candidates are ranked by
    /// `0.5 * similarity + 0.3 * cluster_score + 0.2 * type_score`, where
    /// similarity is the mean description cosine similarity to the user's
    /// past events. Users with nothing left to discover get the newest events.
    pub async fn recommend_events(&self, user_id: &str, top_n: usize) -> Result<Vec<Event>> {
        let user = ObjectId::parse_str(user_id.trim())?;

        let registered = self.store.registered_event_ids(user).await?;
        let past = self.store.events_by_ids(&registered).await?;

        let live = self.store.live_events().await?;
        if live.is_empty() {
            info!("No live or upcoming events; nothing to recommend");
            return Ok(Vec::new());
        }

        let clusters = self.cluster_by_id(live).await?;
        let user_clusters: HashSet<usize> = past
            .iter()
            .filter_map(|e| e.id())
            .filter_map(|id| clusters.get(&id).copied())
            .collect();

        let candidates = self.store.candidate_events(user).await?;
        if candidates.is_empty() {
            info!("No unregistered candidates for user {}, falling back to latest events", user_id);
            let mut latest = self.store.latest_events(top_n).await?;
            latest.truncate(top_n);
            return Ok(latest);
        }

        let similarity = description_similarity(&candidates, &past);
        let past_types: HashSet<&str> = past.iter().map(|e| e.event_type().unwrap_or("")).collect();

        let mut scored: Vec<(f64, Event)> = candidates
            .into_iter()
            .zip(similarity)
            .map(|(event, similarity)| {
                let in_user_cluster = event
                    .id()
                    .and_then(|id| clusters.get(&id))
                    .is_some_and(|c| user_clusters.contains(c));
                let cluster_score = if in_user_cluster { 1.0 } else { NEUTRAL_SCORE };

                let type_match = !past.is_empty()
                    && past_types.contains(event.event_type().unwrap_or(""));
                let type_score = if type_match { 1.0 } else { NEUTRAL_SCORE };

                let score = SIMILARITY_WEIGHT * similarity
                    + CLUSTER_WEIGHT * cluster_score
                    + TYPE_WEIGHT * type_score;
                debug!(
                    "Scored event {:?}: similarity={:.3}, cluster={}, type={}, total={:.3}",
                    event.id(),
                    similarity,
                    cluster_score,
                    type_score,
                    score
                );
                (score, event)
            })
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        info!(
            "Recommending {} of {} candidates for user {}",
            top_n.min(scored.len()),
            scored.len(),
            user_id
        );

        Ok(scored
            .into_iter()
            .take(top_n)
            .map(|(_, event)| event)
            .collect())
    }

    /// Cluster live events off the async runtime and index labels by event id
    async fn cluster_by_id(&self, live: Vec<Event>) -> Result<HashMap<ObjectId, usize>> {
        let n_clusters = self.n_clusters;
        tokio::task::spawn_blocking(move || -> Result<HashMap<ObjectId, usize>> {
            let labels = cluster_events(&live, n_clusters)?;
            Ok(live
                .iter()
                .zip(labels)
                .filter_map(|(event, label)| event.id().map(|id| (id, label)))
                .collect())
        })
        .await
        .map_err(|e| ApiError::InternalError(format!("Clustering task failed: {}", e)))?
    }
}

/// Mean cosine similarity of each candidate's description to the past
/// events' descriptions; 0.5 for everyone when there is no history.
fn description_similarity(candidates: &[Event], past: &[Event]) -> Vec<f64> {
    if past.is_empty() {
        return vec![NEUTRAL_SCORE; candidates.len()];
    }

    let corpus: Vec<&str> = candidates
        .iter()
        .chain(past.iter())
        .map(Event::description)
        .collect();
    let tfidf = TfidfVectorizer::new().fit_transform(&corpus);
    let (candidate_rows, past_rows) = tfidf.rows.view().split_at(ndarray::Axis(0), candidates.len());

    candidate_rows
        .rows()
        .into_iter()
        .map(|candidate| {
            let total: f64 = past_rows
                .rows()
                .into_iter()
                .map(|past| cosine_similarity(candidate, past))
                .sum();
            total / past_rows.nrows() as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::event_store::ACTIVE_STATUSES;
    use async_trait::async_trait;
    use mongodb::bson::{doc, DateTime, Document};

    /// In-memory stand-in for the events/registrations collections
    #[derive(Default)]
    struct MemoryStore {
        events: Vec<Document>,
        registrations: Vec<(ObjectId, ObjectId)>,
    }

    impl MemoryStore {
        fn add_event(&mut self, status: &str, event_type: &str, description: &str) -> ObjectId {
            let id = ObjectId::new();
            let created = DateTime::from_millis(1_700_000_000_000 + self.events.len() as i64);
            self.events.push(doc! {
                "_id": id,
                "status": status,
                "eventType": event_type,
                "description": description,
                "createdAt": created,
            });
            id
        }

        fn set_organizer(&mut self, event: ObjectId, organizer: &str) {
            if let Some(doc) = self
                .events
                .iter_mut()
                .find(|d| d.get_object_id("_id").is_ok_and(|id| id == event))
            {
                doc.insert("organizerId", organizer);
            }
        }

        fn register(&mut self, user: ObjectId, event: ObjectId) {
            self.registrations.push((user, event));
        }

        fn active(doc: &Document) -> bool {
            doc.get_str("status")
                .is_ok_and(|s| ACTIVE_STATUSES.contains(&s))
        }
    }

    #[async_trait]
    impl EventStore for MemoryStore {
        async fn registered_event_ids(&self, user: ObjectId) -> Result<Vec<ObjectId>> {
            Ok(self
                .registrations
                .iter()
                .filter(|(u, _)| *u == user)
                .map(|(_, e)| *e)
                .collect())
        }

        async fn events_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Event>> {
            Ok(self
                .events
                .iter()
                .filter(|d| d.get_object_id("_id").is_ok_and(|id| ids.contains(&id)))
                .cloned()
                .map(Event::new)
                .collect())
        }

        async fn live_events(&self) -> Result<Vec<Event>> {
            Ok(self
                .events
                .iter()
                .filter(|d| Self::active(d))
                .cloned()
                .map(Event::new)
                .collect())
        }

        async fn candidate_events(&self, user: ObjectId) -> Result<Vec<Event>> {
            let registered = self.registered_event_ids(user).await?;
            Ok(self
                .events
                .iter()
                .filter(|d| Self::active(d))
                .filter(|d| {
                    d.get_object_id("_id")
                        .is_ok_and(|id| !registered.contains(&id))
                })
                .cloned()
                .map(Event::new)
                .collect())
        }

        async fn latest_events(&self, limit: usize) -> Result<Vec<Event>> {
            let mut events = self.events.clone();
            events.sort_by_key(|d| std::cmp::Reverse(d.get_datetime("createdAt").ok().copied()));
            Ok(events.into_iter().take(limit).map(Event::new).collect())
        }
    }

    fn service(store: MemoryStore) -> RecommendationService {
        RecommendationService::new(Arc::new(store))
    }

    fn ids(events: &[Event]) -> Vec<ObjectId> {
        events.iter().filter_map(Event::id).collect()
    }

    #[tokio::test]
    async fn test_invalid_user_id() {
        let result = service(MemoryStore::default())
            .recommend_events("not-an-object-id", 3)
            .await;
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_no_live_events() {
        let mut store = MemoryStore::default();
        store.add_event("past", "concert", "an old show");
        let result = service(store)
            .recommend_events(&ObjectId::new().to_hex(), 3)
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_similar_events_rank_first() {
        let user = ObjectId::new();
        let mut store = MemoryStore::default();
        let attended = store.add_event("live", "concert", "live jazz concert with saxophone and trumpet");
        let jazz = store.add_event("upcoming", "concert", "late night jazz concert featuring saxophone solos");
        let cleanup = store.add_event("upcoming", "volunteering", "beach cleanup to collect plastic waste");
        let poetry = store.add_event("live", "reading", "poetry reading in the library garden");
        store.add_event("ended", "concert", "jazz concert that already happened");
        store.register(user, attended);

        let result = service(store)
            .recommend_events(&user.to_hex(), 3)
            .await
            .unwrap();

        let ranked = ids(&result);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0], jazz);
        assert!(ranked.contains(&cleanup));
        assert!(ranked.contains(&poetry));
        assert!(!ranked.contains(&attended));
    }

    #[tokio::test]
    async fn test_top_n_limits_results() {
        let user = ObjectId::new();
        let mut store = MemoryStore::default();
        for i in 0..6 {
            store.add_event("live", "meetup", &format!("community meetup number {}", i));
        }

        let result = service(store)
            .recommend_events(&user.to_hex(), 2)
            .await
            .unwrap();
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_new_user_keeps_store_order_on_ties() {
        let user = ObjectId::new();
        let mut store = MemoryStore::default();
        let first = store.add_event("live", "concert", "jazz night");
        let second = store.add_event("upcoming", "workshop", "pottery class");

        // no history: every candidate scores 0.5*0.5 + 0.3*0.5 + 0.2*0.5
        let result = service(store)
            .recommend_events(&user.to_hex(), 3)
            .await
            .unwrap();
        assert_eq!(ids(&result), vec![first, second]);
    }

    #[tokio::test]
    async fn test_fallback_to_latest_when_everything_registered() {
        let user = ObjectId::new();
        let mut store = MemoryStore::default();
        let older = store.add_event("live", "concert", "jazz night");
        let newer = store.add_event("upcoming", "concert", "blues night");
        let newest = store.add_event("ended", "talk", "a finished talk");
        store.register(user, older);
        store.register(user, newer);

        let result = service(store)
            .recommend_events(&user.to_hex(), 2)
            .await
            .unwrap();
        assert_eq!(ids(&result), vec![newest, newer]);
    }

    #[tokio::test]
    async fn test_zero_top_n_fallback_is_empty() {
        let user = ObjectId::new();
        let mut store = MemoryStore::default();
        let only = store.add_event("live", "concert", "jazz night");
        store.add_event("ended", "talk", "a finished talk");
        store.register(user, only);

        let result = service(store)
            .recommend_events(&user.to_hex(), 0)
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_shared_cluster_breaks_tie() {
        let user = ObjectId::new();
        let mut store = MemoryStore::default();
        let attended = store.add_event("live", "concert", "jazz saxophone");
        let elsewhere = store.add_event("live", "concert", "jazz saxophone quartet");
        let nearby = store.add_event("live", "concert", "jazz saxophone quartet");
        store.set_organizer(attended, "club");
        store.set_organizer(elsewhere, "arena");
        store.set_organizer(nearby, "club");
        store.register(user, attended);

        // same description and type, only the organizer puts one in the user's cluster
        let service = RecommendationService {
            store: Arc::new(store),
            n_clusters: 2,
        };
        let result = service.recommend_events(&user.to_hex(), 2).await.unwrap();
        assert_eq!(ids(&result), vec![nearby, elsewhere]);
    }

    #[tokio::test]
    async fn test_matching_event_type_breaks_tie() {
        let user = ObjectId::new();
        let mut store = MemoryStore::default();
        let attended = store.add_event("live", "concert", "jazz saxophone");
        let talk = store.add_event("upcoming", "talk", "street food market");
        let concert = store.add_event("upcoming", "concert", "street food market");
        store.register(user, attended);

        // a single cluster gives every candidate the cluster bonus
        let service = RecommendationService {
            store: Arc::new(store),
            n_clusters: 1,
        };
        let result = service.recommend_events(&user.to_hex(), 2).await.unwrap();
        assert_eq!(ids(&result), vec![concert, talk]);
    }

    #[test]
    fn test_similarity_without_history_is_neutral() {
        let candidates = vec![Event::new(doc! { "description": "jazz" })];
        assert_eq!(description_similarity(&candidates, &[]), vec![0.5]);
    }

    #[test]
    fn test_similarity_with_empty_vocabulary() {
        let candidates = vec![Event::new(doc! { "description": "" })];
        let past = vec![Event::new(doc! {})];
        assert_eq!(description_similarity(&candidates, &past), vec![0.0]);
    }
}
