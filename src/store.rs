use chrono::{Local, NaiveDate, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::catalog::{self, BadgeId, Challenge};
use crate::error::{Result, StoreError};
use crate::events::{EventBus, Handler, StoreEvent, SubscriptionId};
use crate::model::{
    Appointment, AppointmentStatus, Feeling, Goal, JournalEntry, Message, MoodEntry,
    SelfAssessment, WellnessDocument,
};
use crate::mood::MoodLabel;
use crate::storage::Storage;

const CHECK_IN_XP: u32 = 10;
const JOURNAL_XP: u32 = 25;
const GOAL_XP: u32 = 50;
const GOAL_MASTER_COUNT: usize = 5;
const SAVE_DELAY: Duration = Duration::from_millis(500);

/// XP required to advance from `level` to `level + 1`.
pub fn xp_for_next_level(level: u32) -> u32 {
    (100.0 * 1.2_f64.powi(level as i32 - 1)).floor() as u32
}

/// Result of a check-in's streak update. `continued` is false when the user
/// had already checked in today.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CheckinOutcome {
    pub streak: u32,
    pub continued: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum DateDirection {
    Prev,
    Next,
}

/// Aggregate counters over the current document.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub total_goals: usize,
    pub completed_goals: usize,
    pub journal_entries: usize,
    pub check_ins: usize,
    pub appointments: usize,
    pub level: u32,
    pub xp: u32,
    pub check_in_streak: u32,
    pub badges: usize,
    /// Mean of `mood_history` on the 1-5 scale; 0.0 with no data.
    pub average_mood: f64,
}

impl Statistics {
    pub fn from_document(doc: &WellnessDocument) -> Self {
        let history = &doc.mood_history;
        let average_mood = if history.is_empty() {
            0.0
        } else {
            history.iter().map(|e| e.mood.value()).sum::<f64>() / history.len() as f64
        };

        Statistics {
            total_goals: doc.goals.len(),
            completed_goals: doc.goals.iter().filter(|g| g.completed).count(),
            journal_entries: doc.journal_entries.len(),
            check_ins: doc.feelings.len(),
            appointments: doc.appointments.len(),
            level: doc.profile.level,
            xp: doc.profile.xp,
            check_in_streak: doc.profile.check_in_streak,
            badges: doc.profile.badges.len(),
            average_mood,
        }
    }
}

/// Debounced persistence: at most one pending write, replaced (not stacked)
/// on each new schedule. Outside a tokio runtime it degrades to an
/// immediate synchronous write.
struct SaveScheduler {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl SaveScheduler {
    fn new(delay: Duration) -> Self {
        SaveScheduler {
            delay,
            pending: None,
        }
    }

    fn schedule(&mut self, storage: Storage, payload: String) {
        self.cancel();
        match Handle::try_current() {
            Ok(handle) => {
                let delay = self.delay;
                self.pending = Some(handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Err(e) = storage.write_raw(&payload) {
                        log::error!("debounced save failed: {}", e);
                    }
                }));
            }
            Err(_) => {
                if let Err(e) = storage.write_raw(&payload) {
                    log::error!("save failed: {}", e);
                }
            }
        }
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

/// Owns the wellness document and is its only writer.
///
/// Every mutation runs synchronously to completion, persists (debounced)
/// and notifies subscribers through the event bus. Validation and not-found
/// failures return before anything is mutated.
pub struct WellnessStore {
    doc: WellnessDocument,
    storage: Storage,
    bus: EventBus,
    saver: SaveScheduler,
    last_id: i64,
}

impl WellnessStore {
    pub fn new(storage: Storage) -> Self {
        let doc = storage.load().unwrap_or_else(|e| {
            log::info!("starting from a fresh document: {}", e);
            WellnessDocument::initial()
        });

        let last_id = max_document_id(&doc);

        let store = WellnessStore {
            doc,
            storage,
            bus: EventBus::new(),
            saver: SaveScheduler::new(SAVE_DELAY),
            last_id,
        };
        store.bus.publish(&StoreEvent::StateLoaded);
        store
    }

    pub fn document(&self) -> &WellnessDocument {
        &self.doc
    }

    pub fn subscribe(&mut self, handler: Handler) -> SubscriptionId {
        self.bus.subscribe(handler)
    }

    // --- session ---

    /// Start a fresh session for `name`. Resets the whole document.
    pub fn login(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.chars().count() < 2 {
            return Err(StoreError::validation(
                "O nome deve ter pelo menos 2 caracteres",
            ));
        }

        self.doc = WellnessDocument::initial();
        self.doc.user_name = Some(name.to_string());
        self.bus.publish(&StoreEvent::UserLogin {
            name: name.to_string(),
        });
        self.persist();
        Ok(())
    }

    /// Clear persisted and in-memory state.
    pub fn reset(&mut self) {
        self.saver.cancel();
        if let Err(e) = self.storage.clear() {
            log::error!("reset could not clear storage: {}", e);
        }
        self.doc = WellnessDocument::initial();
        self.last_id = 0;
        self.bus.publish(&StoreEvent::StateReset);
    }

    // --- gamification ---

    /// Grant XP and normalize the level. Multiple level-ups from a single
    /// grant are all applied; the invariant `xp < xp_for_next_level(level)`
    /// holds on return.
    pub fn add_xp(&mut self, amount: u32, reason: &str) {
        if amount == 0 {
            return;
        }

        self.doc.profile.xp += amount;
        let mut levels_gained = 0u32;
        while self.doc.profile.xp >= xp_for_next_level(self.doc.profile.level) {
            self.doc.profile.xp -= xp_for_next_level(self.doc.profile.level);
            self.doc.profile.level += 1;
            levels_gained += 1;
        }

        let (xp, level) = (self.doc.profile.xp, self.doc.profile.level);
        self.bus.publish(&StoreEvent::XpAdded {
            amount,
            reason: reason.to_string(),
            xp,
            level,
        });
        for i in 0..levels_gained {
            self.bus.publish(&StoreEvent::LevelUp {
                level: level - levels_gained + i + 1,
            });
        }
        if level >= 5 {
            self.award_badge(BadgeId::Level5);
        }
        self.persist();
    }

    /// Idempotent; returns true only on the first award.
    pub fn award_badge(&mut self, id: BadgeId) -> bool {
        if self.doc.profile.badges.contains(&id) {
            return false;
        }
        self.doc.profile.badges.push(id);
        self.bus.publish(&StoreEvent::BadgeAwarded {
            badge: catalog::badge(id),
        });
        self.persist();
        true
    }

    // --- check-ins ---

    /// Record a feeling for today: appends to both `feelings` and
    /// `mood_history`, updates the streak, grants check-in XP.
    pub fn record_feeling(&mut self, emotion: MoodLabel, note: Option<String>) -> CheckinOutcome {
        let now = Utc::now();
        let today = Local::now().date_naive();
        let date = today.format("%Y-%m-%d").to_string();

        let feeling = Feeling {
            emotion,
            date: date.clone(),
            timestamp: now,
            note,
        };
        self.doc.feelings.push(feeling.clone());
        self.doc.mood_history.push(MoodEntry {
            date,
            mood: emotion,
        });

        let outcome = self.update_streak(today);
        self.add_xp(CHECK_IN_XP, "check-in diário");

        self.bus.publish(&StoreEvent::CheckinUpdated {
            streak: outcome.streak,
        });
        self.bus.publish(&StoreEvent::FeelingRecorded {
            feeling,
            streak: outcome.streak,
        });
        self.persist();
        outcome
    }

    /// Consecutive calendar days against the system clock: same day keeps
    /// the streak, yesterday extends it, anything older resets to 1.
    fn update_streak(&mut self, today: NaiveDate) -> CheckinOutcome {
        let yesterday = today - chrono::Duration::days(1);
        let profile = &mut self.doc.profile;

        let (streak, continued) = match profile.last_check_in {
            Some(last) if last == today => (profile.check_in_streak, false),
            Some(last) if last == yesterday => (profile.check_in_streak + 1, true),
            _ => (1, true),
        };
        profile.check_in_streak = streak;
        profile.last_check_in = Some(today);

        if continued {
            match streak {
                3 => {
                    self.award_badge(BadgeId::Streak3);
                }
                7 => {
                    self.award_badge(BadgeId::Streak7);
                }
                _ => {}
            }
        }

        CheckinOutcome { streak, continued }
    }

    // --- goals ---

    pub fn add_goal(&mut self, title: &str) -> Result<Goal> {
        let title = title.trim();
        let len = title.chars().count();
        if len < 3 {
            return Err(StoreError::validation(
                "O título da meta deve ter pelo menos 3 caracteres",
            ));
        }
        if len > 200 {
            return Err(StoreError::validation(
                "O título da meta deve ter no máximo 200 caracteres",
            ));
        }

        let goal = Goal {
            id: self.make_id(),
            title: title.to_string(),
            completed: false,
            created_at: Utc::now().timestamp_millis(),
            completed_at: None,
        };
        // Newest first.
        self.doc.goals.insert(0, goal.clone());
        self.bus.publish(&StoreEvent::GoalAdded { goal: goal.clone() });
        self.persist();
        Ok(goal)
    }

    /// Flip completion. Completing grants XP and may award the goal badge;
    /// un-completing deducts nothing.
    pub fn toggle_goal(&mut self, id: i64) -> Result<Goal> {
        let idx = self
            .doc
            .goals
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| StoreError::not_found(format!("Meta {} não encontrada", id)))?;

        let completed_now = {
            let goal = &mut self.doc.goals[idx];
            goal.completed = !goal.completed;
            goal.completed_at = if goal.completed {
                Some(Utc::now().timestamp_millis())
            } else {
                None
            };
            goal.completed
        };
        let snapshot = self.doc.goals[idx].clone();

        if completed_now {
            self.add_xp(GOAL_XP, "meta concluída");
            let done = self.doc.goals.iter().filter(|g| g.completed).count();
            if done >= GOAL_MASTER_COUNT {
                self.award_badge(BadgeId::GoalMaster);
            }
        }

        self.bus.publish(&StoreEvent::GoalToggled {
            goal: snapshot.clone(),
        });
        self.persist();
        Ok(snapshot)
    }

    /// Returns whether a goal was removed. Unknown ids are not an error.
    pub fn delete_goal(&mut self, id: i64) -> bool {
        let before = self.doc.goals.len();
        self.doc.goals.retain(|g| g.id != id);
        if self.doc.goals.len() == before {
            return false;
        }
        self.bus.publish(&StoreEvent::GoalDeleted { id });
        self.persist();
        true
    }

    // --- journal ---

    /// Create a journal entry, or update an existing one when `entry_id`
    /// is given. New entries carry the mood of the most recent feeling
    /// (neutral with no check-ins yet) and grant XP.
    pub fn save_journal_entry(&mut self, content: &str, entry_id: Option<i64>) -> Result<JournalEntry> {
        let content = content.trim();
        let len = content.chars().count();
        if len < 3 {
            return Err(StoreError::validation(
                "A entrada deve ter pelo menos 3 caracteres",
            ));
        }
        if len > 10_000 {
            return Err(StoreError::validation(
                "A entrada deve ter no máximo 10000 caracteres",
            ));
        }

        if let Some(id) = entry_id {
            let entry = self
                .doc
                .journal_entries
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| StoreError::not_found(format!("Entrada {} não encontrada", id)))?;
            entry.content = content.to_string();
            entry.updated_at = Some(Utc::now().timestamp_millis());
            let snapshot = entry.clone();
            self.bus.publish(&StoreEvent::JournalUpdated {
                entry: snapshot.clone(),
            });
            self.persist();
            return Ok(snapshot);
        }

        let first_entry_ever = self.doc.journal_entries.is_empty();
        let mood = self
            .doc
            .feelings
            .last()
            .map(|f| f.emotion)
            .unwrap_or(MoodLabel::Neutro);

        let entry = JournalEntry {
            id: self.make_id(),
            date: Local::now().format("%d/%m/%Y").to_string(),
            content: content.to_string(),
            created_at: Utc::now().timestamp_millis(),
            mood,
            updated_at: None,
        };
        self.doc.journal_entries.push(entry.clone());

        if first_entry_ever {
            self.award_badge(BadgeId::JournalStart);
        }
        self.add_xp(JOURNAL_XP, "entrada no diário");

        self.bus.publish(&StoreEvent::JournalCreated {
            entry: entry.clone(),
        });
        self.persist();
        Ok(entry)
    }

    pub fn delete_journal_entry(&mut self, id: i64) -> Result<()> {
        let idx = self
            .doc
            .journal_entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::not_found(format!("Entrada {} não encontrada", id)))?;
        self.doc.journal_entries.remove(idx);
        self.bus.publish(&StoreEvent::JournalDeleted { id });
        self.persist();
        Ok(())
    }

    // --- challenges ---

    /// Exactly-once completion against the static catalog.
    pub fn complete_challenge(&mut self, id: &str) -> Result<&'static Challenge> {
        let challenge = catalog::find_challenge(id)
            .ok_or_else(|| StoreError::not_found(format!("Desafio '{}' não existe", id)))?;
        if self
            .doc
            .profile
            .completed_challenges
            .iter()
            .any(|c| c == id)
        {
            return Err(StoreError::AlreadyCompleted(format!(
                "Desafio '{}' já foi completado",
                id
            )));
        }

        self.doc
            .profile
            .completed_challenges
            .push(id.to_string());
        self.add_xp(challenge.xp, challenge.title);
        if self.doc.profile.completed_challenges.len() == catalog::challenges().len() {
            self.award_badge(BadgeId::ChallengeHero);
        }

        self.bus
            .publish(&StoreEvent::ChallengeCompleted { challenge });
        self.persist();
        Ok(challenge)
    }

    // --- scheduling ---

    pub fn schedule_appointment(
        &mut self,
        date: &str,
        time: &str,
        professional: &str,
        reason: &str,
    ) -> Result<Appointment> {
        let (date, time) = (date.trim(), time.trim());
        if date.is_empty() || time.is_empty() {
            return Err(StoreError::validation("Data e horário são obrigatórios"));
        }
        let when = chrono::NaiveDateTime::parse_from_str(
            &format!("{} {}", date, time),
            "%Y-%m-%d %H:%M",
        )
        .map_err(|_| StoreError::validation("Data ou horário inválido"))?;
        if when <= Local::now().naive_local() {
            return Err(StoreError::validation(
                "Não é possível agendar uma consulta no passado",
            ));
        }

        // The slot record is optional; the appointment is created either way.
        if let Some(slot) = self.doc.find_slot_mut(date, time) {
            slot.available = false;
        }

        let appointment = Appointment {
            id: self.make_id(),
            date: format!("{} {}", date, time),
            professional: professional.to_string(),
            status: AppointmentStatus::Pending,
            reason: reason.to_string(),
            created_at: Utc::now().timestamp_millis(),
        };
        self.doc.appointments.push(appointment.clone());
        self.bus.publish(&StoreEvent::AppointmentScheduled {
            appointment: appointment.clone(),
        });
        self.persist();
        Ok(appointment)
    }

    pub fn cancel_appointment(&mut self, id: i64) -> Result<()> {
        let idx = self
            .doc
            .appointments
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| StoreError::not_found(format!("Consulta {} não encontrada", id)))?;
        let appointment = self.doc.appointments.remove(idx);

        if let Some((date, time)) = appointment.date.split_once(' ') {
            if let Some(slot) = self.doc.find_slot_mut(date, time) {
                slot.available = true;
            }
        }

        self.bus.publish(&StoreEvent::AppointmentCancelled { id });
        self.persist();
        Ok(())
    }

    /// Shift the schedule-browsing cursor by one day.
    pub fn change_scheduling_date(&mut self, direction: DateDirection) -> NaiveDate {
        let delta = match direction {
            DateDirection::Prev => chrono::Duration::days(-1),
            DateDirection::Next => chrono::Duration::days(1),
        };
        self.doc.current_date = self.doc.current_date + delta;
        let date = self.doc.current_date;
        self.bus
            .publish(&StoreEvent::SchedulingDateChanged { date });
        self.persist();
        date
    }

    // --- messages & self-assessments ---

    pub fn add_message(&mut self, sender: &str, content: &str) -> Result<Message> {
        let (sender, content) = (sender.trim(), content.trim());
        if sender.is_empty() || content.is_empty() {
            return Err(StoreError::validation(
                "Remetente e mensagem são obrigatórios",
            ));
        }

        let message = Message {
            id: self.make_id(),
            sender: sender.to_string(),
            content: content.to_string(),
            created_at: Utc::now().timestamp_millis(),
            read: false,
        };
        self.doc.messages.push(message.clone());
        self.persist();
        Ok(message)
    }

    /// Mark every unread message as read; returns how many were marked.
    pub fn mark_messages_read(&mut self) -> usize {
        let mut marked = 0;
        for message in self.doc.messages.iter_mut().filter(|m| !m.read) {
            message.read = true;
            marked += 1;
        }
        if marked > 0 {
            self.persist();
        }
        marked
    }

    pub fn add_self_assessment(
        &mut self,
        score: u32,
        notes: Option<String>,
    ) -> Result<SelfAssessment> {
        if score > 10 {
            return Err(StoreError::validation("A nota deve estar entre 0 e 10"));
        }

        let assessment = SelfAssessment {
            id: self.make_id(),
            date: Local::now().format("%Y-%m-%d").to_string(),
            score,
            notes,
        };
        self.doc.self_assessments.push(assessment.clone());
        self.persist();
        Ok(assessment)
    }

    // --- reads ---

    pub fn statistics(&self) -> Statistics {
        Statistics::from_document(&self.doc)
    }

    // --- persistence ---

    /// Flush the document to storage immediately, bypassing the debounce.
    /// Used on exit/logout.
    pub fn flush(&mut self) -> Result<()> {
        self.saver.cancel();
        self.storage.save(&self.doc)?;
        self.bus.publish(&StoreEvent::StateSaved);
        Ok(())
    }

    /// Export the document as the raw persisted JSON, flushing first so the
    /// export always reflects the latest state.
    pub fn export_data(&mut self) -> Result<String> {
        self.flush()?;
        self.storage.export_raw()
    }

    /// Replace the document with externally provided JSON. The text is
    /// validated and written before the in-memory document is touched.
    pub fn import_data(&mut self, text: &str) -> Result<()> {
        self.saver.cancel();
        self.storage.import_raw(text)?;
        self.doc = self.storage.load()?;
        self.last_id = max_document_id(&self.doc);
        self.bus.publish(&StoreEvent::StateLoaded);
        Ok(())
    }

    /// Debounced save. Serialization or write failures are logged; the
    /// in-memory document stays authoritative either way.
    fn persist(&mut self) {
        match serde_json::to_string_pretty(&self.doc) {
            Ok(payload) => self.saver.schedule(self.storage.clone(), payload),
            Err(e) => log::error!("could not serialize document for saving: {}", e),
        }
    }

    /// Millisecond-timestamp ids, bumped to stay unique within a burst.
    fn make_id(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let id = now.max(self.last_id + 1);
        self.last_id = id;
        id
    }
}

/// Highest id across all id-carrying collections, 0 for a fresh document.
fn max_document_id(doc: &WellnessDocument) -> i64 {
    doc.goals
        .iter()
        .map(|g| g.id)
        .chain(doc.journal_entries.iter().map(|j| j.id))
        .chain(doc.appointments.iter().map(|a| a.id))
        .chain(doc.messages.iter().map(|m| m.id))
        .chain(doc.self_assessments.iter().map(|s| s.id))
        .max()
        .unwrap_or(0)
}
