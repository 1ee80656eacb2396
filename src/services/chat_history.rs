use crate::{error::Result, models::ChatMessage};
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};
use tracing::info;

/// Every chat message ever received, mirrored to a JSON file on disk
#[derive(Debug)]
pub struct ChatHistory {
    path: PathBuf,
    entries: Mutex<Vec<ChatMessage>>,
}

impl ChatHistory {
    /// Load the history file, creating it as an empty list if it is missing
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Vec<ChatMessage>>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                fs::write(&path, b"[]").await?;
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            "Loaded {} chat history entries from {}",
            entries.len(),
            path.display()
        );

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Append an entry and rewrite the whole file
    pub async fn append(&self, entry: ChatMessage) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.push(entry);
        let json = serde_json::to_vec_pretty(&*entries)?;
        fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Message texts for one event, oldest first
    pub async fn messages_for_event(&self, event_id: &str) -> Vec<String> {
        self.entries
            .lock()
            .await
            .iter()
            .filter(|entry| entry.event_id == event_id)
            .map(|entry| entry.message.clone())
            .collect()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
