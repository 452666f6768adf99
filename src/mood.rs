//! Mood check-ins for one user.
//!
//! [`MoodCheckIns`] saves check-ins and reads a user's history on demand.
//! [`MoodHistoryFeed`] keeps that history fresh in the background so a
//! screen can render whatever is current without issuing reads itself.

use std::sync::{Arc, PoisonError, RwLock};

use log::warn;

use crate::app_response::AppResponse;
use crate::doc_model::{DocumentReference, Identified, QuerySnapshot};
use crate::models::{MoodCheckIn, MoodType};
use crate::polling::{PollHandle, Poller};
use crate::seed::MOOD_CHECK_INS;
use crate::store_state::{CollectionRef, MemoryStore};

pub type MoodEntry = Identified<MoodCheckIn>;

#[derive(Debug, Clone)]
pub struct MoodCheckIns {
    collection: CollectionRef,
    user_id: String,
}

impl MoodCheckIns {
    pub fn new(store: &MemoryStore, user_id: impl Into<String>) -> Self {
        Self {
            collection: store.collection(MOOD_CHECK_INS),
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Records `mood` for today, stamped with the store clock.
    pub fn save(&self, mood: MoodType) -> Result<DocumentReference, AppResponse> {
        let now = self.collection.store().clock().now_utc();
        let check_in = MoodCheckIn {
            user_id: self.user_id.clone(),
            mood,
            date: now.format("%Y-%m-%d").to_string(),
            timestamp: now.timestamp_millis().max(0) as u64,
        };
        self.collection.add_record(&check_in).inspect_err(|e| {
            warn!("Error saving mood check-in for {}: {e}", self.user_id);
        })
    }

    /// This user's check-ins, newest first.
    pub fn history(&self) -> Vec<MoodEntry> {
        history_for(&self.collection.get(), &self.user_id)
    }

    /// Starts a background feed refreshing at the store's configured interval.
    pub fn feed(&self) -> Result<MoodHistoryFeed, AppResponse> {
        MoodHistoryFeed::start(self)
    }
}

/// Filters a full-collection snapshot down to `user_id`, newest first.
///
/// Documents that do not decode as a check-in are skipped.
pub fn history_for(snapshot: &QuerySnapshot, user_id: &str) -> Vec<MoodEntry> {
    let mut entries: Vec<MoodEntry> = snapshot
        .iter()
        .filter_map(|doc| match doc.to_record::<MoodCheckIn>() {
            Ok(record) => Some(Identified {
                id: doc.id().to_string(),
                record,
            }),
            Err(e) => {
                warn!("Skipping mood document: {e}");
                None
            }
        })
        .filter(|entry| entry.record.user_id == user_id)
        .collect();

    entries.sort_by(|a, b| b.record.timestamp.cmp(&a.record.timestamp));
    entries
}

#[derive(Debug, Default)]
struct FeedState {
    entries: Vec<MoodEntry>,
    loading: bool,
}

/// Live mood history backed by a [`Poller`]. Dropping the feed stops polling.
#[derive(Debug)]
pub struct MoodHistoryFeed {
    state: Arc<RwLock<FeedState>>,
    handle: PollHandle,
}

impl MoodHistoryFeed {
    fn start(check_ins: &MoodCheckIns) -> Result<Self, AppResponse> {
        let state = Arc::new(RwLock::new(FeedState {
            entries: Vec::new(),
            loading: true,
        }));
        let sink = Arc::clone(&state);
        let user_id = check_ins.user_id.clone();
        let interval = check_ins.collection.store().config().poll_interval();

        let handle = Poller::spawn(check_ins.collection.clone(), interval, move |snapshot| {
            let entries = history_for(&snapshot, &user_id);
            let mut state = sink.write().unwrap_or_else(PoisonError::into_inner);
            state.entries = entries;
            state.loading = false;
        })?;

        Ok(Self { state, handle })
    }

    pub fn entries(&self) -> Vec<MoodEntry> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).entries.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().unwrap_or_else(PoisonError::into_inner).loading
    }

    pub fn refresh_count(&self) -> u64 {
        self.handle.refresh_count()
    }

    pub fn stop(self) {
        self.handle.stop();
    }
}
