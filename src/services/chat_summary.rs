use crate::{
    error::Result,
    models::{ChatMessage, ChatReceipt},
    services::{chat_history::ChatHistory, groq::Summarizer},
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, RwLock},
};
use tracing::{debug, error, info, warn};

pub const SUMMARY_NOT_AVAILABLE: &str = "Summary not available yet.";

#[derive(Debug, Default)]
struct EventBuffer {
    messages: Vec<String>,
    counter: usize,
    next_run: u64,
}

#[derive(Debug, Clone)]
struct StoredSummary {
    run: u64,
    text: String,
}

/// Buffers chat per event and refreshes each event's summary in the
/// background every `threshold` messages.
#[derive(Clone)]
pub struct ChatService {
    history: Arc<ChatHistory>,
    summarizer: Arc<dyn Summarizer>,
    threshold: usize,
    buffers: Arc<Mutex<HashMap<String, EventBuffer>>>,
    summaries: Arc<RwLock<HashMap<String, StoredSummary>>>,
}

impl ChatService {
    pub fn new(history: ChatHistory, summarizer: Arc<dyn Summarizer>, threshold: usize) -> Self {
        Self {
            history: Arc::new(history),
            summarizer,
            threshold: threshold.max(1),
            buffers: Arc::new(Mutex::new(HashMap::new())),
            summaries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Record a message and kick off a summary refresh once the threshold is hit
    pub async fn receive(&self, message: ChatMessage) -> Result<ChatReceipt> {
        let event_id = message.event_id.clone();
        let text = message.message.clone();

        self.history.append(message).await?;

        let (buffered, run) = {
            let mut buffers = self
                .buffers
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let buffer = buffers.entry(event_id.clone()).or_default();
            buffer.messages.push(text);
            buffer.counter += 1;

            let run = if buffer.counter >= self.threshold {
                buffer.counter = 0;
                let run = buffer.next_run;
                buffer.next_run += 1;
                Some(run)
            } else {
                None
            };
            (buffer.messages.len(), run)
        };

        if let Some(run) = run {
            debug!("Threshold reached for eventId={}, summarizing", event_id);
            self.spawn_summary(event_id, run);
        }

        Ok(ChatReceipt::received(buffered))
    }

    fn spawn_summary(&self, event_id: String, run: u64) {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.summarize_event(&event_id, run).await {
                error!("Failed to summarize chat for eventId={}: {}", event_id, e);
            }
        });
    }

    async fn summarize_event(&self, event_id: &str, run: u64) -> Result<()> {
        let combined = self.history.messages_for_event(event_id).await.join("\n");
        let summary = self.summarizer.summarize(&combined).await?;

        let mut summaries = self
            .summaries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match summaries.get(event_id) {
            Some(existing) if existing.run > run => {
                warn!(
                    "Discarding stale summary run {} for eventId={} (have run {})",
                    run, event_id, existing.run
                );
            }
            _ => {
                summaries.insert(
                    event_id.to_string(),
                    StoredSummary { run, text: summary },
                );
                info!("[Summary Updated] eventId={}", event_id);
            }
        }
        Ok(())
    }

    /// Latest summary for an event, if one has been produced
    pub fn summary(&self, event_id: &str) -> Option<String> {
        self.summaries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(event_id)
            .map(|stored| stored.text.clone())
    }
}
