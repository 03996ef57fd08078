// file: src/pipeline/state.rs
// description: per-category refresh state with sequence-checked atomic replacement
// reference: shared state guarded by parking_lot

use crate::config::FailurePolicy;
use crate::error::Result;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Pulses,
    Cves,
    News,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Pulses => "pulses",
            Category::Cves => "cves",
            Category::News => "news",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issued when a refresh starts; only the latest ticket per category may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    pub category: Category,
    pub sequence: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// The refresh failed and the failure state was committed.
    Failed,
    /// A newer refresh was started; this result was discarded.
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CategoryState<T> {
    Pending,
    Ready {
        view: T,
        refreshed_at: DateTime<Utc>,
    },
    Failed {
        message: String,
        /// Last good view, kept only under `FailurePolicy::KeepStale`.
        stale: Option<T>,
        failed_at: DateTime<Utc>,
    },
}

impl<T> CategoryState<T> {
    /// The view a renderer should show, fresh or stale.
    pub fn view(&self) -> Option<&T> {
        match self {
            CategoryState::Pending => None,
            CategoryState::Ready { view, .. } => Some(view),
            CategoryState::Failed { stale, .. } => stale.as_ref(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CategoryState::Failed { .. })
    }

    fn into_view(self) -> Option<T> {
        match self {
            CategoryState::Pending => None,
            CategoryState::Ready { view, .. } => Some(view),
            CategoryState::Failed { stale, .. } => stale,
        }
    }
}

struct SlotInner<T> {
    committed: u64,
    state: CategoryState<T>,
}

pub struct CategorySlot<T> {
    category: Category,
    policy: FailurePolicy,
    issued: AtomicU64,
    inner: RwLock<SlotInner<T>>,
}

impl<T: Clone> CategorySlot<T> {
    pub fn new(category: Category, policy: FailurePolicy) -> Self {
        Self {
            category,
            policy,
            issued: AtomicU64::new(0),
            inner: RwLock::new(SlotInner {
                committed: 0,
                state: CategoryState::Pending,
            }),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn begin(&self) -> RefreshTicket {
        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        RefreshTicket {
            category: self.category,
            sequence,
        }
    }

    pub fn latest_sequence(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, ticket: &RefreshTicket) -> bool {
        ticket.category == self.category && ticket.sequence == self.latest_sequence()
    }

    /// Replaces the whole state in one step, or discards the result when
    /// `ticket` is no longer the most recently issued one.
    pub fn commit(&self, ticket: RefreshTicket, result: Result<T>) -> CommitOutcome {
        self.commit_with(ticket, result, |_| ()).0
    }

    /// Like [`commit`](Self::commit), but runs `on_commit` against the new
    /// view before the slot lock is released. It only runs for a successful
    /// commit, so side effects are applied in commit order.
    pub fn commit_with<R>(
        &self,
        ticket: RefreshTicket,
        result: Result<T>,
        on_commit: impl FnOnce(&T) -> R,
    ) -> (CommitOutcome, Option<R>) {
        let mut inner = self.inner.write();

        if !self.is_current(&ticket) || ticket.sequence <= inner.committed {
            warn!(
                "Discarding superseded {} refresh #{} (latest #{})",
                self.category,
                ticket.sequence,
                self.latest_sequence()
            );
            return (CommitOutcome::Superseded, None);
        }

        inner.committed = ticket.sequence;
        let now = Utc::now();

        match result {
            Ok(view) => {
                info!("Committed {} refresh #{}", self.category, ticket.sequence);
                let applied = on_commit(&view);
                inner.state = CategoryState::Ready {
                    view,
                    refreshed_at: now,
                };
                (CommitOutcome::Committed, Some(applied))
            }
            Err(e) => {
                error!("Failed to load {}: {}", self.category, e);
                let previous = std::mem::replace(&mut inner.state, CategoryState::Pending);
                let stale = match self.policy {
                    FailurePolicy::KeepStale => previous.into_view(),
                    FailurePolicy::ShowError => None,
                };
                inner.state = CategoryState::Failed {
                    message: format!("Failed to load {}: {}", self.category, e),
                    stale,
                    failed_at: now,
                };
                (CommitOutcome::Failed, None)
            }
        }
    }

    pub fn state(&self) -> CategoryState<T> {
        self.inner.read().state.clone()
    }

    pub fn view(&self) -> Option<T> {
        self.inner.read().state.view().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AggregatorError;

    fn failure() -> Result<Vec<u32>> {
        Err(AggregatorError::transport("test", "timeout"))
    }

    #[test]
    fn test_commit_replaces_state() {
        let slot = CategorySlot::new(Category::Cves, FailurePolicy::KeepStale);
        assert_eq!(slot.state(), CategoryState::Pending);

        let ticket = slot.begin();
        assert_eq!(slot.commit(ticket, Ok(vec![1, 2])), CommitOutcome::Committed);
        assert_eq!(slot.view(), Some(vec![1, 2]));

        let ticket = slot.begin();
        assert_eq!(slot.commit(ticket, Ok(vec![3])), CommitOutcome::Committed);
        assert_eq!(slot.view(), Some(vec![3]));
    }

    #[test]
    fn test_stale_sequence_is_discarded() {
        let slot = CategorySlot::new(Category::News, FailurePolicy::KeepStale);
        let older = slot.begin();
        let newer = slot.begin();

        assert_eq!(slot.commit(newer, Ok(vec![2])), CommitOutcome::Committed);
        assert_eq!(slot.commit(older, Ok(vec![1])), CommitOutcome::Superseded);
        assert_eq!(slot.view(), Some(vec![2]));
    }

    #[test]
    fn test_older_result_arriving_first_is_discarded() {
        let slot = CategorySlot::new(Category::News, FailurePolicy::KeepStale);
        let older = slot.begin();
        let newer = slot.begin();

        assert_eq!(slot.commit(older, Ok(vec![1])), CommitOutcome::Superseded);
        assert_eq!(slot.commit(newer, Ok(vec![2])), CommitOutcome::Committed);
        assert_eq!(slot.view(), Some(vec![2]));
    }

    #[test]
    fn test_ticket_cannot_commit_twice() {
        let slot = CategorySlot::new(Category::Pulses, FailurePolicy::KeepStale);
        let ticket = slot.begin();
        assert_eq!(slot.commit(ticket, Ok(vec![1])), CommitOutcome::Committed);
        assert_eq!(slot.commit(ticket, Ok(vec![9])), CommitOutcome::Superseded);
    }

    #[test]
    fn test_foreign_ticket_rejected() {
        let pulses = CategorySlot::<Vec<u32>>::new(Category::Pulses, FailurePolicy::KeepStale);
        let news = CategorySlot::<Vec<u32>>::new(Category::News, FailurePolicy::KeepStale);
        let ticket = news.begin();
        pulses.begin();

        assert_eq!(pulses.commit(ticket, Ok(vec![1])), CommitOutcome::Superseded);
    }

    #[test]
    fn test_commit_hook_runs_only_for_committed_views() {
        let slot = CategorySlot::new(Category::Pulses, FailurePolicy::KeepStale);
        let older = slot.begin();
        let newer = slot.begin();

        let (outcome, seen) = slot.commit_with(newer, Ok(vec![4, 5]), |view| view.len());
        assert_eq!(outcome, CommitOutcome::Committed);
        assert_eq!(seen, Some(2));

        let (outcome, seen) = slot.commit_with(older, Ok(vec![1]), |view| view.len());
        assert_eq!(outcome, CommitOutcome::Superseded);
        assert_eq!(seen, None);

        let (outcome, seen) = slot.commit_with(slot.begin(), failure(), |view| view.len());
        assert_eq!(outcome, CommitOutcome::Failed);
        assert_eq!(seen, None);
    }

    #[test]
    fn test_keep_stale_policy() {
        let slot = CategorySlot::new(Category::Cves, FailurePolicy::KeepStale);
        slot.commit(slot.begin(), Ok(vec![7]));

        assert_eq!(slot.commit(slot.begin(), failure()), CommitOutcome::Failed);
        let state = slot.state();
        assert!(state.is_failed());
        assert_eq!(state.view(), Some(&vec![7]));

        // recovers on the next good refresh
        assert_eq!(slot.commit(slot.begin(), Ok(vec![8])), CommitOutcome::Committed);
        assert!(!slot.state().is_failed());
    }

    #[test]
    fn test_show_error_policy() {
        let slot = CategorySlot::new(Category::Cves, FailurePolicy::ShowError);
        slot.commit(slot.begin(), Ok(vec![7]));
        slot.commit(slot.begin(), failure());

        match slot.state() {
            CategoryState::Failed { message, stale, .. } => {
                assert!(message.starts_with("Failed to load cves"));
                assert!(stale.is_none());
            }
            other => panic!("unexpected state {:?}", other),
        }
    }
}
