//! Chat rooms and the doctor's conversation list.
//!
//! Messages live in `chats/{chatId}/messages`. Readers are lenient about
//! `createdAt`: RFC 3339 strings, epoch milliseconds and
//! `{"seconds", "nanoseconds"}` timestamps are all accepted, and a message
//! without a usable time is shown as sent "now" (the store clock) rather
//! than dropped.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::app_response::AppResponse;
use crate::doc_model::{DocumentReference, Identified, QuerySnapshot};
use crate::models::{ChatMessage, ChatUser};
use crate::polling::{PollHandle, Poller};
use crate::seed::{chat_messages_path, SAMPLE_CHAT_ID};
use crate::store_state::{CollectionRef, MemoryStore};

pub type MessageEntry = Identified<ChatMessage>;

/// Rooms the doctor dashboard lists by default.
pub const DEFAULT_CHAT_IDS: [&str; 3] = [SAMPLE_CHAT_ID, "chat-doctor-1", "chat-doctor-2"];

pub const ANONYMOUS_PATIENT_NAME: &str = "Sinh viên ẩn danh";
pub const PATIENT_NAME: &str = "Sinh viên";

/// Messages of one chat room, stored in `chats/{chatId}/messages`.
#[derive(Debug, Clone)]
pub struct ChatRoom {
    chat_id: String,
    messages: CollectionRef,
}

impl ChatRoom {
    pub fn new(store: &MemoryStore, chat_id: impl Into<String>) -> Self {
        let chat_id = chat_id.into();
        let messages = store.collection(chat_messages_path(&chat_id));
        Self { chat_id, messages }
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    pub fn messages(&self) -> &CollectionRef {
        &self.messages
    }

    pub fn send(&self, text: impl Into<String>, user: ChatUser) -> Result<DocumentReference, AppResponse> {
        let message = ChatMessage {
            text: text.into(),
            created_at: self.messages.store().clock().now_utc(),
            user,
        };
        self.messages.add_record(&message)
    }

    /// All messages, most recent first. Ties keep the later insert first.
    pub fn messages_newest_first(&self) -> Vec<MessageEntry> {
        let now = self.messages.store().clock().now_utc();
        messages_newest_first(&self.messages.get(), &self.chat_id, now)
    }

    /// Starts a feed refreshing at the store's chat interval.
    pub fn feed(&self) -> Result<ChatFeed, AppResponse> {
        ChatFeed::start(self)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredMessage {
    #[serde(default)]
    text: String,
    #[serde(default)]
    created_at: Option<JsonValue>,
    user: ChatUser,
}

/// Reads a stored `createdAt` in any of the shapes writers have used.
pub fn parse_created_at(value: &JsonValue) -> Option<DateTime<Utc>> {
    match value {
        JsonValue::String(text) => DateTime::parse_from_rfc3339(text)
            .map(|t| t.with_timezone(&Utc))
            .ok()
            .or_else(|| text.parse::<DateTime<Utc>>().ok()),
        JsonValue::Number(millis) => millis.as_i64().and_then(DateTime::from_timestamp_millis),
        JsonValue::Object(fields) => {
            let seconds = fields.get("seconds").and_then(JsonValue::as_i64)?;
            let nanos = fields.get("nanoseconds").and_then(JsonValue::as_u64).unwrap_or(0);
            DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?)
        }
        _ => None,
    }
}

/// Decodes a room snapshot, newest first. `now` stands in for missing or
/// unreadable `createdAt` values.
pub fn messages_newest_first(snapshot: &QuerySnapshot, chat_id: &str, now: DateTime<Utc>) -> Vec<MessageEntry> {
    let mut messages: Vec<MessageEntry> = snapshot
        .iter()
        .filter_map(|doc| {
            let stored = match doc.to_record::<StoredMessage>() {
                Ok(stored) => stored,
                Err(e) => {
                    warn!("Skipping message in chat {chat_id}: {e}");
                    return None;
                }
            };

            let created_at = match stored.created_at.as_ref() {
                None | Some(JsonValue::Null) => now,
                Some(raw) => parse_created_at(raw).unwrap_or_else(|| {
                    warn!("Unreadable createdAt on message {} in chat {chat_id}", doc.id());
                    now
                }),
            };

            Some(Identified {
                id: doc.id().to_string(),
                record: ChatMessage {
                    text: stored.text,
                    created_at,
                    user: stored.user,
                },
            })
        })
        .collect();

    messages.reverse();
    messages.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));
    messages
}

/// One row of the doctor's conversation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub patient_name: String,
    pub last_message: String,
    pub last_message_time: DateTime<Utc>,
    pub unread_count: u32,
    pub is_anonymous: bool,
}

/// Summarises each non-empty room in `chat_ids`, most recent activity first.
pub fn conversations<S: AsRef<str>>(store: &MemoryStore, chat_ids: &[S]) -> Vec<Conversation> {
    let mut rows: Vec<Conversation> = chat_ids
        .iter()
        .filter_map(|chat_id| {
            let room = ChatRoom::new(store, chat_id.as_ref());
            let newest = room.messages_newest_first().into_iter().next()?;
            let is_anonymous = room.chat_id().contains("anonymous");

            Some(Conversation {
                id: room.chat_id().to_string(),
                patient_name: if is_anonymous { ANONYMOUS_PATIENT_NAME } else { PATIENT_NAME }.to_string(),
                last_message: newest.record.text,
                last_message_time: newest.record.created_at,
                unread_count: 0,
                is_anonymous,
            })
        })
        .collect();

    rows.sort_by(|a, b| b.last_message_time.cmp(&a.last_message_time));
    rows
}

/// Live message list of one room. Dropping the feed stops polling.
#[derive(Debug)]
pub struct ChatFeed {
    messages: Arc<RwLock<Vec<MessageEntry>>>,
    handle: PollHandle,
}

impl ChatFeed {
    fn start(room: &ChatRoom) -> Result<Self, AppResponse> {
        let messages = Arc::new(RwLock::new(Vec::new()));
        let sink = Arc::clone(&messages);
        let chat_id = room.chat_id.clone();
        let clock = Arc::clone(room.messages.store().clock());
        let interval = room.messages.store().config().chat_poll_interval();

        let handle = Poller::spawn(room.messages.clone(), interval, move |snapshot| {
            let fresh = messages_newest_first(&snapshot, &chat_id, clock.now_utc());
            *sink.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        })?;

        Ok(Self { messages, handle })
    }

    pub fn messages(&self) -> Vec<MessageEntry> {
        self.messages.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn refresh_count(&self) -> u64 {
        self.handle.refresh_count()
    }

    pub fn stop(self) {
        self.handle.stop();
    }
}

/// Live conversation list over a fixed set of rooms.
#[derive(Debug)]
pub struct ConversationFeed {
    rows: Arc<RwLock<Vec<Conversation>>>,
    handle: PollHandle,
}

impl ConversationFeed {
    pub fn start<S: AsRef<str>>(store: &MemoryStore, chat_ids: &[S]) -> Result<Self, AppResponse> {
        let rows = Arc::new(RwLock::new(Vec::new()));
        let sink = Arc::clone(&rows);
        let ids: Vec<String> = chat_ids.iter().map(|id| id.as_ref().to_string()).collect();
        let reader = store.clone();
        let interval = store.config().conversation_poll_interval();

        let handle = Poller::every("conversations", interval, move || {
            let fresh = conversations(&reader, &ids);
            *sink.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        })?;

        Ok(Self { rows, handle })
    }

    pub fn conversations(&self) -> Vec<Conversation> {
        self.rows.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn refresh_count(&self) -> u64 {
        self.handle.refresh_count()
    }

    pub fn stop(self) {
        self.handle.stop();
    }
}
