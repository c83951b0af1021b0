//! File-based message store.
//!
//! Messages are grouped into one JSON document per conversation key under
//! `{data_dir}/messages/`, ordered oldest-first within a document. The
//! conversation key is the same canonical pair key the room router uses, so
//! both directions of a pair land in the same document.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::realtime::room_key;
use crate::store::error::StorageResult;
use crate::store::{ConversationEntry, Message, MessageStore};

use super::{load_json_dir, write_json_atomic};

/// File-backed implementation of [`MessageStore`].
pub struct FileMessageStore {
    dir: PathBuf,
    /// Conversation key -> messages, oldest first.
    cache: DashMap<String, Vec<Message>>,
    write_lock: Mutex<()>,
}

impl FileMessageStore {
    /// Open the store, loading all conversation documents into the index.
    pub async fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        let cache = DashMap::new();
        for mut messages in load_json_dir::<Vec<Message>>(&dir).await? {
            if let Some(first) = messages.first() {
                let key = room_key(&first.sender, &first.receiver);
                messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
                cache.insert(key, messages);
            }
        }
        Ok(Self {
            dir,
            cache,
            write_lock: Mutex::new(()),
        })
    }

    async fn persist(&self, key: &str, messages: &[Message]) -> StorageResult<()> {
        write_json_atomic(&self.dir, &format!("{key}.json"), &messages).await
    }
}

#[async_trait]
impl MessageStore for FileMessageStore {
    async fn create(&self, sender: &str, receiver: &str, content: &str) -> StorageResult<Message> {
        let _guard = self.write_lock.lock().await;
        let key = room_key(sender, receiver);
        let message = Message::new(sender, receiver, content);

        let snapshot = {
            let mut entry = self.cache.entry(key.clone()).or_default();
            entry.push(message.clone());
            entry.clone()
        };
        self.persist(&key, &snapshot).await?;

        Ok(message)
    }

    async fn conversation(
        &self,
        user_a: &str,
        user_b: &str,
        page: u32,
        limit: u32,
    ) -> StorageResult<Vec<Message>> {
        let key = room_key(user_a, user_b);
        let page = page.max(1);
        let skip = ((page - 1) as usize).saturating_mul(limit as usize);

        let messages = match self.cache.get(&key) {
            Some(entry) => entry
                .iter()
                .rev()
                .skip(skip)
                .take(limit as usize)
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        Ok(messages)
    }

    async fn mark_read(&self, sender: &str, receiver: &str) -> StorageResult<u64> {
        let _guard = self.write_lock.lock().await;
        let key = room_key(sender, receiver);
        let now = Utc::now();

        let snapshot = {
            let mut entry = match self.cache.get_mut(&key) {
                Some(e) => e,
                None => return Ok(0),
            };
            let mut updated = 0u64;
            for message in entry.iter_mut() {
                if message.sender == sender && message.receiver == receiver && !message.read {
                    message.read = true;
                    message.read_at = Some(now);
                    updated += 1;
                }
            }
            if updated == 0 {
                return Ok(0);
            }
            (entry.clone(), updated)
        };

        self.persist(&key, &snapshot.0).await?;
        Ok(snapshot.1)
    }

    async fn conversations_for(&self, user_id: &str) -> StorageResult<Vec<ConversationEntry>> {
        let mut entries = Vec::new();

        for room in self.cache.iter() {
            let last = match room.value().last() {
                Some(m) if m.involves(user_id) => m.clone(),
                _ => continue,
            };
            let peer_id = if last.sender == user_id {
                last.receiver.clone()
            } else {
                last.sender.clone()
            };
            let unread_count = room
                .value()
                .iter()
                .filter(|m| m.receiver == user_id && !m.read)
                .count() as u64;

            entries.push(ConversationEntry {
                peer_id,
                last_message: last,
                unread_count,
            });
        }

        entries.sort_by(|a, b| b.last_message.created_at.cmp(&a.last_message.created_at));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn create_persists_unread_message() {
        let tmp = TempDir::new().unwrap();
        let store = FileMessageStore::open(tmp.path()).await.unwrap();

        let msg = store.create("u1", "u2", "hello").await.unwrap();
        assert_eq!(msg.sender, "u1");
        assert!(!msg.read);

        let page = store.conversation("u2", "u1", 1, 10).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].content, "hello");
    }

    #[tokio::test]
    async fn conversation_pages_newest_first() {
        let tmp = TempDir::new().unwrap();
        let store = FileMessageStore::open(tmp.path()).await.unwrap();

        for i in 0..5 {
            store
                .create("u1", "u2", &format!("message {i}"))
                .await
                .unwrap();
        }

        let first_page = store.conversation("u1", "u2", 1, 2).await.unwrap();
        assert_eq!(first_page[0].content, "message 4");
        assert_eq!(first_page[1].content, "message 3");

        let last_page = store.conversation("u1", "u2", 3, 2).await.unwrap();
        assert_eq!(last_page.len(), 1);
        assert_eq!(last_page[0].content, "message 0");
    }

    #[tokio::test]
    async fn mark_read_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = FileMessageStore::open(tmp.path()).await.unwrap();

        store.create("u1", "u2", "one").await.unwrap();
        store.create("u1", "u2", "two").await.unwrap();
        store.create("u2", "u1", "reply").await.unwrap();

        // Only u1 -> u2 messages are affected.
        assert_eq!(store.mark_read("u1", "u2").await.unwrap(), 2);
        assert_eq!(store.mark_read("u1", "u2").await.unwrap(), 0);

        let page = store.conversation("u1", "u2", 1, 10).await.unwrap();
        let reply = page.iter().find(|m| m.content == "reply").unwrap();
        assert!(!reply.read);
    }

    #[tokio::test]
    async fn survives_reopen() {
        let tmp = TempDir::new().unwrap();
        {
            let store = FileMessageStore::open(tmp.path()).await.unwrap();
            store.create("u1", "u2", "hello").await.unwrap();
            store.mark_read("u1", "u2").await.unwrap();
        }

        let store = FileMessageStore::open(tmp.path()).await.unwrap();
        let page = store.conversation("u1", "u2", 1, 10).await.unwrap();
        assert_eq!(page.len(), 1);
        assert!(page[0].read);
        assert!(page[0].read_at.is_some());
    }

    #[tokio::test]
    async fn conversations_rollup_counts_unread() {
        let tmp = TempDir::new().unwrap();
        let store = FileMessageStore::open(tmp.path()).await.unwrap();

        store.create("u1", "u2", "hey").await.unwrap();
        store.create("u3", "u2", "hello there").await.unwrap();
        store.create("u2", "u3", "hi").await.unwrap();

        let conversations = store.conversations_for("u2").await.unwrap();
        assert_eq!(conversations.len(), 2);

        // Most recent conversation first.
        assert_eq!(conversations[0].peer_id, "u3");
        assert_eq!(conversations[0].last_message.content, "hi");
        assert_eq!(conversations[0].unread_count, 1);

        assert_eq!(conversations[1].peer_id, "u1");
        assert_eq!(conversations[1].unread_count, 1);
    }
}
