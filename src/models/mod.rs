//! Wire-exact data model for the briefing viewer.
//!
//! Field names mirror the backend JSON byte-for-byte; these types are
//! deserialization targets, not an internal re-modeling.

pub mod briefing;
pub mod enums;
pub mod patient;

pub use briefing::{BriefingSummary, Flag, PatientBriefing, SuggestedAction};
pub use enums::{FlagCategory, FlagSource, Severity};
pub use patient::{LabResult, Medication, Patient, ReferenceRange, Visit};
