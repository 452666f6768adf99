//! Slash-separated collection paths.
//!
//! The store keys collections by plain strings, so `chats/room1/messages`
//! and `chats/room2/messages` are two unrelated flat collections that only
//! happen to share a prefix. `CollectionPath` builds and inspects those
//! strings without giving them any hierarchical meaning in the store.

use std::fmt::{Display, Formatter};

use crate::app_response::AppResponse;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    segments: Vec<String>,
    key: String,
}

impl CollectionPath {
    fn from_segments(segments: Vec<String>) -> Self {
        let key = segments.join("/");
        Self { segments, key }
    }

    /// Top-level collection.
    pub fn root(name: impl Into<String>) -> Self {
        Self::from_segments(vec![name.into()])
    }

    /// Descends into the document `id` of this collection.
    pub fn doc(self, id: impl Into<String>) -> DocumentPath {
        let mut segments = self.segments;
        segments.push(id.into());
        DocumentPath { segments }
    }

    /// Parses `collection(/document/collection)*`.
    pub fn parse(path: &str) -> Result<Self, AppResponse> {
        let segments: Vec<String> = path.split('/').map(str::to_string).collect();

        if segments.iter().any(String::is_empty) {
            return Err(AppResponse::ValidationError(format!(
                "Collection path '{path}' contains an empty segment"
            )));
        }
        if segments.len() % 2 == 0 {
            return Err(AppResponse::ValidationError(format!(
                "Collection path '{path}' points at a document, not a collection"
            )));
        }
        Ok(Self::from_segments(segments))
    }

    /// The flat store key, e.g. `chats/room1/messages`.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_subcollection(&self) -> bool {
        self.segments.len() > 1
    }

    /// Id of the document this collection hangs off, for subcollections.
    pub fn parent_document_id(&self) -> Option<&str> {
        if self.is_subcollection() {
            self.segments.get(self.segments.len() - 2).map(String::as_str)
        } else {
            None
        }
    }

    /// Last segment: `messages` for `chats/room1/messages`.
    pub fn collection_id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl Display for CollectionPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for CollectionPath {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

/// Intermediate step of the builder: a document inside a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl DocumentPath {
    pub fn collection(self, name: impl Into<String>) -> CollectionPath {
        let mut segments = self.segments;
        segments.push(name.into());
        CollectionPath::from_segments(segments)
    }

    pub fn id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}
