use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use recurrence_core::{
    ledger::{Cadence, Category, CategoryKind, RecurrenceTemplate},
    scheduler::Scheduler,
    stores::{LedgerSink, MemoryStore, TemplateStore},
    Clock, Config, RecurrenceEngine,
};

/// Deterministic clock pinned to a single instant.
struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn tick_processes_every_registered_owner() {
    let store = Arc::new(MemoryStore::new());
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    for owner in [alice, bob] {
        let category = store.add_category(Category::new(owner, "Rent", CategoryKind::Expense));
        let template =
            RecurrenceTemplate::new(owner, category, 800.0, Cadence::Monthly, 1, ymd(2025, 6, 1))
                .unwrap();
        store.insert(template).unwrap();
    }

    let engine = Arc::new(RecurrenceEngine::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Config::default(),
    ));
    let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 5).unwrap()));
    let scheduler = Scheduler::new(engine, clock, vec![alice, bob]);

    assert_eq!(scheduler.tick_once(), 2);
    assert_eq!(store.entries_for(alice).unwrap().len(), 1);
    assert_eq!(store.entries_for(bob).unwrap().len(), 1);

    // Same day again: cursors advanced, nothing new materializes.
    assert_eq!(scheduler.tick_once(), 0);
}

#[test]
fn tick_survives_owners_with_nothing_due() {
    let store = Arc::new(MemoryStore::new());
    let engine = Arc::new(RecurrenceEngine::new(
        store.clone(),
        store.clone(),
        store,
        Config::default(),
    ));
    let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()));
    let scheduler = Scheduler::new(engine, clock, vec![Uuid::new_v4()]);
    assert_eq!(scheduler.tick_once(), 0);
}
