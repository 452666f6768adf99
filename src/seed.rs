use log::info;

use crate::app_response::AppResponse;
use crate::collection_path::CollectionPath;
use crate::models::{Appointment, AppointmentStatus, AppointmentType, ChatMessage, ChatUser, MoodCheckIn, MoodType};
use crate::store_state::MemoryStore;

pub const MOOD_CHECK_INS: &str = "moodCheckIns";
pub const APPOINTMENTS: &str = "appointments";
pub const CLINIC_LOCATION: &str = "BK.D6";
pub const SAMPLE_USER_ID: &str = "user1";
pub const SAMPLE_CHAT_ID: &str = "anonymous-chat-1";

/// Collection holding the messages of one chat room.
pub fn chat_messages_path(chat_id: &str) -> CollectionPath {
    CollectionPath::root("chats").doc(chat_id).collection("messages")
}

/// Inserts the fixed demo records: one mood check-in, one appointment and
/// one chat greeting. Dates come from the store's clock.
pub fn seed_sample_data(store: &MemoryStore) -> Result<(), AppResponse> {
    let now = store.clock().now_utc();

    store.collection(MOOD_CHECK_INS).add_record(&MoodCheckIn {
        user_id: SAMPLE_USER_ID.to_string(),
        mood: MoodType::Happy,
        date: now.format("%Y-%m-%d").to_string(),
        timestamp: now.timestamp_millis().max(0) as u64,
    })?;

    store.collection(APPOINTMENTS).add_record(&Appointment {
        doctor_id: "1".to_string(),
        doctor_name: Some("Mrs. Hanh".to_string()),
        patient_id: SAMPLE_USER_ID.to_string(),
        patient_name: Some("Candy".to_string()),
        date: "11/10/2023".to_string(),
        time: "06:00 PM".to_string(),
        appointment_type: AppointmentType::InPerson,
        location: Some(CLINIC_LOCATION.to_string()),
        status: AppointmentStatus::Confirmed,
        created_at: Some(now),
    })?;

    store.collection(chat_messages_path(SAMPLE_CHAT_ID)).add_record(&ChatMessage {
        text: "Xin chào, tôi có thể giúp gì cho bạn?".to_string(),
        created_at: now,
        user: ChatUser {
            id: "doctor1".to_string(),
            name: Some("Dr. Minh".to_string()),
            avatar: None,
        },
    })?;

    info!("Seeded sample data into {} collections", store.collection_names().len());
    Ok(())
}
