use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque identifier shared by every clinical record.
pub type ClinicalId = u64;

// ==============================================================================
// SLOT TIME
// ==============================================================================

/// A time-of-day slot label such as `09:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(NaiveTime);

impl SlotTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

impl From<NaiveTime> for SlotTime {
    fn from(time: NaiveTime) -> Self {
        Self(time)
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for SlotTime {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        NaiveTime::parse_from_str(value, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
            .map(Self)
            .map_err(|_| format!("Invalid time slot '{}', expected HH:MM", value))
    }
}

impl Serialize for SlotTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ==============================================================================
// CORE ENTITIES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: ClinicalId,
    pub name: String,
    pub specialization: String,
    pub email: String,
    pub phone: String,
    pub available_slots: Vec<SlotTime>,
}

impl Doctor {
    pub fn offers_slot(&self, time: &SlotTime) -> bool {
        self.available_slots.contains(time)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: ClinicalId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
}

impl Patient {
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.date_of_birth.and_then(|dob| today.years_since(dob))
    }
}

/// Fields supplied when a patient record is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    pub fn is_upcoming(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::Confirmed)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: ClinicalId,
    pub patient_id: ClinicalId,
    pub doctor_id: ClinicalId,
    pub date: NaiveDate,
    pub time: SlotTime,
    pub reason: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// Whether this booking takes up its slot. Only cancellation gives the slot back.
    pub fn holds_slot(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }

    pub fn occupies(&self, doctor_id: ClinicalId, date: NaiveDate, time: SlotTime) -> bool {
        self.doctor_id == doctor_id && self.date == date && self.time == time && self.holds_slot()
    }
}

/// Fields supplied when an appointment is created. Status and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_id: ClinicalId,
    pub doctor_id: ClinicalId,
    pub date: NaiveDate,
    pub time: SlotTime,
    #[serde(default)]
    pub reason: String,
}

/// Merge patch for an appointment. Every present field overwrites the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentPatch {
    pub patient_id: Option<ClinicalId>,
    pub doctor_id: Option<ClinicalId>,
    pub date: Option<NaiveDate>,
    pub time: Option<SlotTime>,
    pub reason: Option<String>,
    pub status: Option<AppointmentStatus>,
}

impl AppointmentPatch {
    pub fn status(status: AppointmentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn apply_to(self, appointment: &mut Appointment) {
        if let Some(patient_id) = self.patient_id {
            appointment.patient_id = patient_id;
        }
        if let Some(doctor_id) = self.doctor_id {
            appointment.doctor_id = doctor_id;
        }
        if let Some(date) = self.date {
            appointment.date = date;
        }
        if let Some(time) = self.time {
            appointment.time = time;
        }
        if let Some(reason) = self.reason {
            appointment.reason = reason;
        }
        if let Some(status) = self.status {
            appointment.status = status;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    pub id: ClinicalId,
    pub name: String,
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineLine {
    pub medicine_id: ClinicalId,
    /// Medicine name captured when the prescription was written.
    pub medicine_name: String,
    pub dosage: String,
    pub frequency: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: ClinicalId,
    pub patient_id: ClinicalId,
    pub doctor_id: ClinicalId,
    pub appointment_id: ClinicalId,
    pub medicines: Vec<MedicineLine>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrescription {
    pub patient_id: ClinicalId,
    pub doctor_id: ClinicalId,
    pub appointment_id: ClinicalId,
    pub medicines: Vec<MedicineLine>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment(status: AppointmentStatus) -> Appointment {
        Appointment {
            id: 10,
            patient_id: 1,
            doctor_id: 1,
            date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            time: "09:00".parse().unwrap(),
            reason: "Checkup".to_string(),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn slot_time_uses_hour_minute_labels() {
        let slot: SlotTime = "09:00".parse().unwrap();
        assert_eq!(slot.to_string(), "09:00");
        assert_eq!(serde_json::to_value(slot).unwrap(), serde_json::json!("09:00"));

        let with_seconds: SlotTime = "14:30:00".parse().unwrap();
        assert_eq!(with_seconds, SlotTime::new(14, 30).unwrap());

        assert!("9am".parse::<SlotTime>().is_err());
    }

    #[test]
    fn status_serializes_as_lowercase_words() {
        for status in AppointmentStatus::ALL {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, serde_json::json!(status.to_string()));
        }
        assert!(serde_json::from_str::<AppointmentStatus>("\"no_show\"").is_err());
    }

    #[test]
    fn patch_overwrites_only_present_fields() {
        let mut apt = appointment(AppointmentStatus::Scheduled);
        AppointmentPatch {
            reason: Some("Follow-up".to_string()),
            ..AppointmentPatch::default()
        }
        .apply_to(&mut apt);

        assert_eq!(apt.reason, "Follow-up");
        assert_eq!(apt.status, AppointmentStatus::Scheduled);
        assert_eq!(apt.time.to_string(), "09:00");
    }

    #[test]
    fn cancelled_appointment_frees_its_slot() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        let time = SlotTime::new(9, 0).unwrap();
        assert!(appointment(AppointmentStatus::Confirmed).occupies(1, date, time));
        assert!(!appointment(AppointmentStatus::Cancelled).occupies(1, date, time));
        assert!(appointment(AppointmentStatus::Completed).occupies(1, date, time));
        assert!(!appointment(AppointmentStatus::Confirmed).occupies(2, date, time));
    }
}
