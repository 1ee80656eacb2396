use mongodb::bson::{oid::ObjectId, Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// An event document as stored in the `events` collection.
///
/// Events carry arbitrary organizer-defined fields, so the raw document is
/// kept and the fields the recommender reads are exposed through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(Document);

impl Event {
    pub fn new(document: Document) -> Self {
        Self(document)
    }

    pub fn id(&self) -> Option<ObjectId> {
        self.0.get_object_id("_id").ok()
    }

    pub fn description(&self) -> &str {
        self.0.get_str("description").unwrap_or("")
    }

    pub fn event_type(&self) -> Option<&str> {
        self.0.get_str("eventType").ok()
    }

    /// Organizer identity as a categorical value; ObjectIds render as hex
    pub fn organizer_key(&self) -> String {
        match self.0.get("organizerId") {
            None | Some(Bson::Null) => "unknown".to_string(),
            Some(Bson::ObjectId(oid)) => oid.to_hex(),
            Some(Bson::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Render for API responses: ObjectIds become hex strings, dates RFC 3339
    pub fn to_json(&self) -> Value {
        bson_to_json(Bson::Document(self.0.clone()))
    }
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => json!(dt.timestamp_millis()),
        },
        Bson::Document(doc) => Value::Object(
            doc.into_iter()
                .map(|(key, value)| (key, bson_to_json(value)))
                .collect::<Map<String, Value>>(),
        ),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}
