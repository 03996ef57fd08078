// file: src/pipeline/mod.rs
// description: refresh pipeline module exports and public api
// reference: pipeline orchestration

mod coordinator;
mod processor;
mod state;

pub use coordinator::{NewsView, PulseCommit, RefreshCoordinator};
pub use processor::{PulseProcessor, PulseView};
pub use state::{Category, CategorySlot, CategoryState, CommitOutcome, RefreshTicket};
