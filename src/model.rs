use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::BadgeId;
use crate::mood::MoodLabel;

/// Gamification state attached to the current user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub xp: u32,
    pub level: u32,
    pub check_in_streak: u32,
    pub last_check_in: Option<NaiveDate>,
    /// Award order is preserved; the store keeps this duplicate-free.
    pub badges: Vec<BadgeId>,
    pub completed_challenges: Vec<String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        UserProfile {
            xp: 0,
            level: 1,
            check_in_streak: 0,
            last_check_in: None,
            badges: Vec::new(),
            completed_challenges: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub created_at: i64,
    pub completed_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: i64,
    /// Locale display date ("dd/mm/yyyy"), as shown to the user.
    pub date: String,
    pub content: String,
    pub created_at: i64,
    pub mood: MoodLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// One check-in. Append-only log, paired 1:1 with `mood_history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feeling {
    pub emotion: MoodLabel,
    /// ISO calendar date ("YYYY-MM-DD").
    pub date: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Schema-reduced mirror of `feelings` used for charting and trend math.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodEntry {
    pub date: String,
    pub mood: MoodLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pendente"),
            AppointmentStatus::Confirmed => write!(f, "confirmada"),
            AppointmentStatus::Completed => write!(f, "realizada"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    /// Combined "YYYY-MM-DD HH:MM".
    pub date: String,
    pub professional: String,
    pub status: AppointmentStatus,
    pub reason: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub date: String,
    pub time: String,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub sender: String,
    pub content: String,
    pub created_at: i64,
    pub read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfAssessment {
    pub id: i64,
    pub date: String,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The single persisted aggregate. Owned exclusively by `WellnessStore`;
/// everything else reads it through the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellnessDocument {
    pub user_name: Option<String>,
    /// Schedule-browsing cursor, independent of the system clock.
    pub current_date: NaiveDate,
    pub profile: UserProfile,
    /// Newest first.
    pub goals: Vec<Goal>,
    pub journal_entries: Vec<JournalEntry>,
    pub feelings: Vec<Feeling>,
    pub mood_history: Vec<MoodEntry>,
    pub appointments: Vec<Appointment>,
    pub available_slots: Vec<Slot>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub self_assessments: Vec<SelfAssessment>,
}

impl WellnessDocument {
    /// Fresh document, used on first load, login and reset.
    pub fn initial() -> Self {
        let today = Local::now().date_naive();
        WellnessDocument {
            user_name: None,
            current_date: today,
            profile: UserProfile::default(),
            goals: Vec::new(),
            journal_entries: Vec::new(),
            feelings: Vec::new(),
            mood_history: Vec::new(),
            appointments: Vec::new(),
            available_slots: seed_slots(today),
            messages: Vec::new(),
            self_assessments: Vec::new(),
        }
    }

    pub fn find_slot_mut(&mut self, date: &str, time: &str) -> Option<&mut Slot> {
        self.available_slots
            .iter_mut()
            .find(|s| s.date == date && s.time == time)
    }
}

impl Default for WellnessDocument {
    fn default() -> Self {
        Self::initial()
    }
}

/// Hourly 09:00-17:00 slots for the next 7 days, all available.
fn seed_slots(from: NaiveDate) -> Vec<Slot> {
    let mut slots = Vec::new();
    for day in 0..7 {
        let date = (from + Duration::days(day)).format("%Y-%m-%d").to_string();
        for hour in 9..=17 {
            slots.push(Slot {
                date: date.clone(),
                time: format!("{:02}:00", hour),
                available: true,
            });
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_document() {
        let doc = WellnessDocument::initial();
        assert_eq!(doc.profile.level, 1);
        assert_eq!(doc.profile.xp, 0);
        assert!(doc.user_name.is_none());
        assert!(doc.goals.is_empty());
    }

    #[test]
    fn test_seeded_slots_cover_seven_days() {
        let doc = WellnessDocument::initial();
        assert_eq!(doc.available_slots.len(), 7 * 9);
        assert!(doc.available_slots.iter().all(|s| s.available));
    }

    #[test]
    fn test_document_roundtrips_through_json() {
        let doc = WellnessDocument::initial();
        let json = serde_json::to_string(&doc).unwrap();
        let back: WellnessDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back.available_slots.len(), doc.available_slots.len());
        assert_eq!(back.profile.level, 1);
    }

    #[test]
    fn test_find_slot() {
        let mut doc = WellnessDocument::initial();
        let date = doc.available_slots[0].date.clone();
        let slot = doc.find_slot_mut(&date, "09:00").unwrap();
        slot.available = false;
        assert!(!doc.find_slot_mut(&date, "09:00").unwrap().available);
        assert!(doc.find_slot_mut("1999-01-01", "09:00").is_none());
    }
}
