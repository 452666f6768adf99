//! # MindCare Store
//!
//! The data layer of a university mental-health support app: mood
//! check-ins, appointment booking, doctor/patient chat and the signed-in
//! user. Screens talk to an in-memory document store with a tiny
//! `collection(name).add(..)` / `collection(name).get()` contract, so a
//! real backend can replace it later without touching them.
//!
//! ## Features
//!
//! - **Explicit store instances**: [`store_state::MemoryStore`] is constructed
//!   and passed around, never a global
//! - **Unique ids**: millisecond timestamps with a monotonic tie-break
//! - **Polling refresh**: [`polling::Poller`] re-reads a collection on a timer
//! - **FFI surface**: JSON-in/JSON-out C functions for the mobile host
//!
//! ## Quick Start
//!
//! ```rust
//! use mindcare_store::store_state::MemoryStore;
//! use serde_json::json;
//!
//! let store = MemoryStore::new();
//! let room = store.collection("chats/room1/messages");
//! room.add_record(&json!({"text": "hello"}))?;
//! assert_eq!(room.get().len(), 1);
//! assert!(store.collection("chats/room2/messages").get().is_empty());
//! # Ok::<(), mindcare_store::app_response::AppResponse>(())
//! ```
//!
//! ## FFI Functions
//!
//! - [`create_store`] - Create a store, optionally seeded with sample data
//! - [`collection_add`] - Add a JSON object to a collection
//! - [`collection_get`] - Read a full collection snapshot
//! - [`free_c_string`] - Release a string returned by this library
//! - [`close_store`] - Release a store

pub mod app_response;
pub mod appointments;
pub mod chat;
pub mod collection_path;
pub mod config;
pub mod doc_model;
pub mod file_storage;
pub mod id_generator;
pub mod models;
pub mod mood;
pub mod polling;
pub mod seed;
pub mod session;
pub mod store_state;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};
use serde_json::Value as JsonValue;

use crate::app_response::AppResponse;
use crate::config::StoreConfig;
use crate::store_state::{json_kind, MemoryStore};

/// Creates a new store.
///
/// # Parameters
///
/// * `seed` - When true, the fixed sample records are inserted
///
/// # Returns
///
/// A pointer to the [`MemoryStore`], or null if creation failed. Release it
/// with [`close_store`].
///
/// # Examples
///
/// ```rust
/// use mindcare_store::{close_store, create_store};
///
/// let store = create_store(true);
/// assert!(!store.is_null());
/// close_store(store);
/// ```
#[no_mangle]
pub extern "C" fn create_store(seed: bool) -> *mut MemoryStore {
    let config = StoreConfig::default().with_seed_sample_data(seed);

    match MemoryStore::from_config(config) {
        Ok(store) => {
            info!("Store created for FFI host");
            Box::into_raw(Box::new(store))
        }
        Err(e) => {
            warn!("Failed to create store: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Adds a document to the collection at `path`.
///
/// `json_ptr` must hold a JSON object. On success the response is
/// `{"Ok": "<id>"}`.
///
/// # Safety
///
/// Non-null pointers must point to a store from [`create_store`] and to
/// null-terminated strings. The returned string must be released with
/// [`free_c_string`].
///
/// # Examples
///
/// ```rust
/// use std::ffi::{CStr, CString};
/// use mindcare_store::{close_store, collection_add, create_store, free_c_string};
///
/// let store = create_store(false);
/// let path = CString::new("moodCheckIns").unwrap();
/// let json = CString::new(r#"{"mood":"happy","userId":"u1"}"#).unwrap();
///
/// let result = collection_add(store, path.as_ptr(), json.as_ptr());
/// let text = unsafe { CStr::from_ptr(result) }.to_str().unwrap().to_string();
/// assert!(text.starts_with(r#"{"Ok":"#));
///
/// free_c_string(result as *mut _);
/// close_store(store);
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn collection_add(store: *const MemoryStore, path: *const c_char, json_ptr: *const c_char) -> *const c_char {
    let store = match unsafe { store.as_ref() } {
        Some(s) => s,
        None => {
            let error = AppResponse::BadRequest("Null store pointer passed to collection_add".to_string());
            return response_to_c_string(&error);
        }
    };

    let path = match c_ptr_to_string(path, "path") {
        Ok(p) => p,
        Err(err) => return err,
    };

    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(j) => j,
        Err(err) => return err,
    };

    let fields = match serde_json::from_str::<JsonValue>(&json_str) {
        Ok(JsonValue::Object(fields)) => fields,
        Ok(other) => {
            let error = AppResponse::ValidationError(format!("Documents must be JSON objects, got {}", json_kind(&other)));
            return response_to_c_string(&error);
        }
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    let reference = store.collection(&path).add(fields);
    response_to_c_string(&AppResponse::success(reference.id))
}

/// Reads every document of the collection at `path`.
///
/// On success the response is `{"Ok": "<snapshot json>"}` where the snapshot
/// is `{"docs": [{"id": "...", "data": {...}}, ...]}` in insertion order.
/// An unknown collection yields an empty `docs` array.
///
/// # Safety
///
/// Same requirements as [`collection_add`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn collection_get(store: *const MemoryStore, path: *const c_char) -> *const c_char {
    let store = match unsafe { store.as_ref() } {
        Some(s) => s,
        None => {
            let error = AppResponse::BadRequest("Null store pointer passed to collection_get".to_string());
            return response_to_c_string(&error);
        }
    };

    let path = match c_ptr_to_string(path, "path") {
        Ok(p) => p,
        Err(err) => return err,
    };

    match serde_json::to_string(&store.collection(&path).get()) {
        Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Error serializing snapshot: {e:?}"));
            response_to_c_string(&error)
        }
    }
}

/// Releases a string returned by [`collection_add`] or [`collection_get`].
///
/// # Safety
///
/// `ptr` must come from this library and must not be used afterwards.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_c_string(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr) });
}

/// Releases a store created by [`create_store`]. Other handles onto the same
/// collections (pollers, services) keep working until they are dropped.
///
/// # Safety
///
/// `store` must come from [`create_store`] and must not be used afterwards.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_store(store: *mut MemoryStore) {
    if store.is_null() {
        warn!("Null store pointer passed to close_store");
        return;
    }
    drop(unsafe { Box::from_raw(store) });
    info!("Store released by FFI host");
}

/// Serializes `response` to JSON and hands it out as a C string.
///
/// Returns null if serialization or C string creation fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string pointer to a `String`, or to a ready-made error response.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
