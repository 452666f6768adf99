//! Document and snapshot types returned by the store.
//!
//! A document is a JSON object ([`Fields`]) plus the id the store assigned
//! when it was added. Reads never hand out the stored document itself:
//! every [`QuerySnapshot`] owns copies, so a snapshot stays stable while
//! the collection keeps growing.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::app_response::AppResponse;

/// The field mapping of one document.
pub type Fields = Map<String, JsonValue>;

/// Handle to a freshly added document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReference {
    pub id: String,
}

/// A document as held inside a collection.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StoredDocument {
    pub(crate) id: String,
    pub(crate) fields: Fields,
}

/// One document of a [`QuerySnapshot`].
///
/// ```rust
/// use mindcare_store::store_state::MemoryStore;
/// use serde_json::json;
///
/// let store = MemoryStore::new();
/// let moods = store.collection("moodCheckIns");
/// let added = moods.add_record(&json!({"mood": "happy", "userId": "u1"}))?;
///
/// let snapshot = moods.get();
/// let doc = &snapshot.docs[0];
/// assert_eq!(doc.id(), added.id);
/// assert_eq!(doc.get("mood"), Some(&json!("happy")));
/// assert!(!doc.data().contains_key("id"));
/// # Ok::<(), mindcare_store::app_response::AppResponse>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    id: String,
    data: Fields,
}

impl DocumentSnapshot {
    pub(crate) fn from_stored(doc: &StoredDocument) -> Self {
        Self {
            id: doc.id.clone(),
            data: doc.fields.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Copy of the document's fields. The store-assigned id is not part of it.
    pub fn data(&self) -> Fields {
        self.data.clone()
    }

    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.data.get(field)
    }

    /// Decodes the fields into a typed record.
    pub fn to_record<T: DeserializeOwned>(&self) -> Result<T, AppResponse> {
        serde_json::from_value(JsonValue::Object(self.data.clone())).map_err(|e| {
            AppResponse::SerializationError(format!(
                "Document '{}' does not match the expected shape: {e}",
                self.id
            ))
        })
    }
}

/// Every document of a collection at the time of the read, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySnapshot {
    pub docs: Vec<DocumentSnapshot>,
}

impl QuerySnapshot {
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DocumentSnapshot> {
        self.docs.iter()
    }
}

impl IntoIterator for QuerySnapshot {
    type Item = DocumentSnapshot;
    type IntoIter = std::vec::IntoIter<DocumentSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.into_iter()
    }
}

impl<'a> IntoIterator for &'a QuerySnapshot {
    type Item = &'a DocumentSnapshot;
    type IntoIter = std::slice::Iter<'a, DocumentSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.iter()
    }
}

/// A decoded record together with the id of the document it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identified<T> {
    pub id: String,
    #[serde(flatten)]
    pub record: T,
}
