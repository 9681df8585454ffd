use chrono::{NaiveDate, Utc};

use shared_models::clinical::{
    Appointment, AppointmentStatus, Doctor, Medicine, MedicineLine, Patient, Prescription, SlotTime,
};

use crate::store::ClinicalData;

fn slots(labels: &[&str]) -> Vec<SlotTime> {
    labels.iter().filter_map(|l| l.parse().ok()).collect()
}

pub fn demo_doctors() -> Vec<Doctor> {
    vec![
        Doctor {
            id: 1,
            name: "Dr. Sarah Smith".to_string(),
            specialization: "Cardiology".to_string(),
            email: "doctor@hospital.com".to_string(),
            phone: "+1-234-567-8901".to_string(),
            available_slots: slots(&["09:00", "10:00", "11:00", "14:00", "15:00", "16:00"]),
        },
        Doctor {
            id: 2,
            name: "Dr. Michael Brown".to_string(),
            specialization: "Neurology".to_string(),
            email: "michael@hospital.com".to_string(),
            phone: "+1-234-567-8903".to_string(),
            available_slots: slots(&["08:00", "09:00", "10:00", "13:00", "14:00", "15:00"]),
        },
        Doctor {
            id: 3,
            name: "Dr. Emily Davis".to_string(),
            specialization: "Pediatrics".to_string(),
            email: "emily@hospital.com".to_string(),
            phone: "+1-234-567-8904".to_string(),
            available_slots: slots(&["09:00", "11:00", "13:00", "14:00", "16:00", "17:00"]),
        },
    ]
}

pub fn demo_medicines() -> Vec<Medicine> {
    vec![
        Medicine {
            id: 1,
            name: "Aspirin".to_string(),
            category: "Pain Relief".to_string(),
            description: "Pain reliever and fever reducer".to_string(),
        },
        Medicine {
            id: 2,
            name: "Amoxicillin".to_string(),
            category: "Antibiotic".to_string(),
            description: "Antibiotic for bacterial infections".to_string(),
        },
        Medicine {
            id: 3,
            name: "Lisinopril".to_string(),
            category: "Blood Pressure".to_string(),
            description: "ACE inhibitor for high blood pressure".to_string(),
        },
    ]
}

/// Catalog plus one patient with a scheduled visit and an earlier prescription.
pub fn demo_data() -> ClinicalData {
    let mut data = ClinicalData::new(demo_doctors(), demo_medicines());

    data.patients.push(Patient {
        id: 1,
        name: "John Doe".to_string(),
        email: "patient@hospital.com".to_string(),
        phone: "+1-234-567-8900".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 15),
        gender: Some("Male".to_string()),
        address: Some("123 Main St, City, State".to_string()),
    });

    if let (Some(date), Some(time)) = (NaiveDate::from_ymd_opt(2025, 8, 10), SlotTime::new(10, 0)) {
        data.appointments.push(Appointment {
            id: 1,
            patient_id: 1,
            doctor_id: 1,
            date,
            time,
            reason: "Regular checkup".to_string(),
            status: AppointmentStatus::Scheduled,
            created_at: Utc::now(),
        });
    }

    data.prescriptions.push(Prescription {
        id: 1,
        patient_id: 1,
        doctor_id: 1,
        appointment_id: 1,
        medicines: vec![MedicineLine {
            medicine_id: 1,
            medicine_name: "Aspirin".to_string(),
            dosage: "500mg".to_string(),
            frequency: "Twice daily".to_string(),
            duration: "7 days".to_string(),
            instructions: "Take with food".to_string(),
        }],
        notes: Some("Continue current medication".to_string()),
        created_at: Utc::now(),
    });

    data.reconcile_counter();
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_catalog_matches_front_desk_fixtures() {
        let data = demo_data();
        assert_eq!(data.doctors.len(), 3);
        assert_eq!(data.medicines.len(), 3);
        assert_eq!(data.doctors[0].available_slots.len(), 6);
        assert_eq!(data.doctor(1).map(|d| d.name.as_str()), Some("Dr. Sarah Smith"));
        assert_eq!(data.medicine(2).map(|m| m.name.as_str()), Some("Amoxicillin"));
    }

    #[test]
    fn new_ids_never_collide_with_seeded_ones() {
        let mut data = demo_data();
        let id = data.next_id();
        assert!(id > 3);
    }
}
