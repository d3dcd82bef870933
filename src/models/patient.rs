use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A patient record as returned by `GET /api/v1/patients/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub conditions: Vec<String>,
    pub medications: Vec<Medication>,
    pub labs: Vec<LabResult>,
    pub allergies: Vec<String>,
    pub visits: Vec<Visit>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabResult {
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub date: NaiveDate,
    pub reference_range: ReferenceRange,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub min: f64,
    pub max: f64,
}

impl LabResult {
    /// Is the value outside its reference range?
    pub fn is_abnormal(&self) -> bool {
        self.value < self.reference_range.min || self.value > self.reference_range.max
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    pub date: NaiveDate,
    pub reason: String,
}
