use chrono::NaiveDate;
use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::catalog::{Badge, Challenge};
use crate::model::{Appointment, Feeling, Goal, JournalEntry};

/// Every notification the store can emit, as a closed tagged enum so
/// consumers get compile-time exhaustiveness when matching.
#[derive(Debug, Clone, Serialize)]
pub enum StoreEvent {
    StateLoaded,
    StateSaved,
    StateReset,
    UserLogin { name: String },
    XpAdded { amount: u32, reason: String, xp: u32, level: u32 },
    LevelUp { level: u32 },
    BadgeAwarded { badge: &'static Badge },
    CheckinUpdated { streak: u32 },
    GoalAdded { goal: Goal },
    GoalToggled { goal: Goal },
    GoalDeleted { id: i64 },
    JournalCreated { entry: JournalEntry },
    JournalUpdated { entry: JournalEntry },
    JournalDeleted { id: i64 },
    FeelingRecorded { feeling: Feeling, streak: u32 },
    ChallengeCompleted { challenge: &'static Challenge },
    AppointmentScheduled { appointment: Appointment },
    AppointmentCancelled { id: i64 },
    SchedulingDateChanged { date: NaiveDate },
}

impl StoreEvent {
    /// Wire-style topic name, used for logging and filtering.
    pub fn topic(&self) -> &'static str {
        match self {
            StoreEvent::StateLoaded => "state:loaded",
            StoreEvent::StateSaved => "state:saved",
            StoreEvent::StateReset => "state:reset",
            StoreEvent::UserLogin { .. } => "user:login",
            StoreEvent::XpAdded { .. } => "xp:added",
            StoreEvent::LevelUp { .. } => "user:levelup",
            StoreEvent::BadgeAwarded { .. } => "badge:awarded",
            StoreEvent::CheckinUpdated { .. } => "checkin:updated",
            StoreEvent::GoalAdded { .. } => "goal:added",
            StoreEvent::GoalToggled { .. } => "goal:toggled",
            StoreEvent::GoalDeleted { .. } => "goal:deleted",
            StoreEvent::JournalCreated { .. } => "journal:created",
            StoreEvent::JournalUpdated { .. } => "journal:updated",
            StoreEvent::JournalDeleted { .. } => "journal:deleted",
            StoreEvent::FeelingRecorded { .. } => "feeling:recorded",
            StoreEvent::ChallengeCompleted { .. } => "challenge:completed",
            StoreEvent::AppointmentScheduled { .. } => "appointment:scheduled",
            StoreEvent::AppointmentCancelled { .. } => "appointment:cancelled",
            StoreEvent::SchedulingDateChanged { .. } => "scheduling:date-changed",
        }
    }
}

pub type Handler = Box<dyn Fn(&StoreEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(usize);

/// Minimal synchronous publish-subscribe bus.
///
/// Handlers receive every event and match on the variants they care about.
/// Delivery is in subscription order; a panicking handler is isolated and
/// logged so the remaining handlers still run.
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<(SubscriptionId, Handler)>,
    next_id: usize,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus::default()
    }

    pub fn subscribe(&mut self, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, handler));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.handlers.retain(|(h, _)| *h != id);
    }

    pub fn publish(&self, event: &StoreEvent) {
        log::debug!("event {}", event.topic());
        for (id, handler) in &self.handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                log::error!(
                    "event handler {:?} panicked on {}; continuing",
                    id,
                    event.topic()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s1 = seen.clone();
        bus.subscribe(Box::new(move |_| s1.borrow_mut().push(1)));
        let s2 = seen.clone();
        bus.subscribe(Box::new(move |_| s2.borrow_mut().push(2)));

        bus.publish(&StoreEvent::StateSaved);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));

        let c = count.clone();
        let id = bus.subscribe(Box::new(move |_| *c.borrow_mut() += 1));

        bus.publish(&StoreEvent::StateSaved);
        bus.unsubscribe(id);
        bus.publish(&StoreEvent::StateSaved);

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_panicking_handler_does_not_block_later_handlers() {
        let mut bus = EventBus::new();
        let reached = Rc::new(RefCell::new(false));

        bus.subscribe(Box::new(|_| panic!("boom")));
        let r = reached.clone();
        bus.subscribe(Box::new(move |_| *r.borrow_mut() = true));

        bus.publish(&StoreEvent::StateReset);
        assert!(*reached.borrow());
    }

    #[test]
    fn test_topic_names() {
        assert_eq!(StoreEvent::StateLoaded.topic(), "state:loaded");
        assert_eq!(
            StoreEvent::LevelUp { level: 2 }.topic(),
            "user:levelup"
        );
        assert_eq!(
            StoreEvent::SchedulingDateChanged {
                date: chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
            }
            .topic(),
            "scheduling:date-changed"
        );
    }
}
