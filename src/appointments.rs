//! Appointment booking and history for one patient.

use log::{info, warn};

use crate::app_response::AppResponse;
use crate::doc_model::{DocumentReference, Identified};
use crate::models::{Appointment, AppointmentStatus, AppointmentType};
use crate::seed::{APPOINTMENTS, CLINIC_LOCATION};
use crate::store_state::{CollectionRef, MemoryStore};

pub type AppointmentEntry = Identified<Appointment>;

/// What the booking form collects. Empty strings count as "not selected".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub doctor_id: String,
    pub date: String,
    pub time: String,
    pub appointment_type: AppointmentType,
}

#[derive(Debug, Clone)]
pub struct Appointments {
    collection: CollectionRef,
    patient_id: String,
}

impl Appointments {
    pub fn new(store: &MemoryStore, patient_id: impl Into<String>) -> Self {
        Self {
            collection: store.collection(APPOINTMENTS),
            patient_id: patient_id.into(),
        }
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    /// Books a pending appointment.
    ///
    /// Doctor, date and time are all required. In-person visits are held at
    /// the clinic; video calls carry no location.
    pub fn book(&self, request: &BookingRequest) -> Result<DocumentReference, AppResponse> {
        let missing: Vec<&str> = [
            ("doctor", request.doctor_id.as_str()),
            ("date", request.date.as_str()),
            ("time", request.time.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(AppResponse::ValidationError(format!(
                "Missing booking information: {}",
                missing.join(", ")
            )));
        }

        let location = match request.appointment_type {
            AppointmentType::InPerson => Some(CLINIC_LOCATION.to_string()),
            AppointmentType::VideoCall => None,
        };

        let appointment = Appointment {
            doctor_id: request.doctor_id.clone(),
            doctor_name: None,
            patient_id: self.patient_id.clone(),
            patient_name: None,
            date: request.date.clone(),
            time: request.time.clone(),
            appointment_type: request.appointment_type,
            location,
            status: AppointmentStatus::Pending,
            created_at: Some(self.collection.store().clock().now_utc()),
        };

        let reference = self.collection.add_record(&appointment).inspect_err(|e| {
            warn!("Error booking appointment for {}: {e}", self.patient_id);
        })?;
        info!("Booked appointment {} with doctor {}", reference.id, request.doctor_id);
        Ok(reference)
    }

    /// This patient's appointments, most recently created first. Records
    /// without a creation time sort last, in insertion order.
    pub fn history(&self) -> Vec<AppointmentEntry> {
        let mut entries: Vec<AppointmentEntry> = self
            .collection
            .get()
            .into_iter()
            .filter_map(|doc| match doc.to_record::<Appointment>() {
                Ok(record) => Some(Identified {
                    id: doc.id().to_string(),
                    record,
                }),
                Err(e) => {
                    warn!("Skipping appointment document: {e}");
                    None
                }
            })
            .filter(|entry| entry.record.patient_id == self.patient_id)
            .collect();

        entries.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));
        entries
    }

    pub fn with_status(&self, status: AppointmentStatus) -> Vec<AppointmentEntry> {
        self.history()
            .into_iter()
            .filter(|entry| entry.record.status == status)
            .collect()
    }
}
