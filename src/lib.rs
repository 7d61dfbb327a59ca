#![doc(test(attr(deny(warnings))))]

//! Recurrence Core owns the scheduling and catch-up engine for recurring
//! budget transactions: cadence date math, due selection, and the
//! materialization of templates into ledger entries.

pub mod config;
pub mod engine;
pub mod errors;
pub mod ledger;
pub mod scheduler;
pub mod stores;
pub mod time;
pub mod utils;

use std::sync::Once;

pub use config::{CatchUpMode, Config};
pub use engine::{RecurrenceEngine, RunFailure, RunSummary};
pub use errors::EngineError;
pub use time::{Clock, SystemClock};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Recurrence Core tracing initialized.");
    });
}
