use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::models::Item;

/// Message shown after a successful save.
pub const SAVE_SUCCESS_MESSAGE: &str = "Update successful!";

/// How long a notice stays on screen.
pub const NOTICE_AUTO_CLOSE: Duration = Duration::from_secs(5);

/// A transient notification for the presentation layer.
///
/// A notice is dismissed once `auto_close` has passed since `raised_at`;
/// presenters skip expired notices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub auto_close: Duration,
    pub raised_at: Instant,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            auto_close: NOTICE_AUTO_CLOSE,
            raised_at: Instant::now(),
        }
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= self.auto_close
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}

/// Everything the presentation layer renders.
///
/// Starts in the loading state with an empty collection. Only the
/// controller's load, set_price and save operations change it.
#[derive(Debug, Clone, PartialEq)]
pub struct TableState {
    pub(crate) items: Vec<Item>,
    pub(crate) loading: bool,
    pub(crate) saving: bool,
    pub(crate) notices: Vec<Notice>,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: true,
            saving: false,
            notices: Vec::new(),
        }
    }
}

impl TableState {
    /// A loaded state holding `items`.
    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items,
            loading: false,
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }
}

/// Shared handle to the state. The lock is never held across an await.
pub(crate) type SharedState = Arc<Mutex<TableState>>;

/// The state is plain data, so a panic elsewhere cannot leave it torn.
pub(crate) fn lock(state: &SharedState) -> MutexGuard<'_, TableState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy)]
enum Flag {
    Loading,
    Saving,
}

/// Clears a busy flag when dropped, on every exit path of the operation
/// that holds it.
#[must_use]
pub(crate) struct BusyGuard {
    state: SharedState,
    flag: Flag,
}

impl BusyGuard {
    /// Guard a load. Loading is only ever raised by the initial state, so
    /// this just clears it once the load finishes.
    pub(crate) fn loading(state: &SharedState) -> Self {
        Self {
            state: Arc::clone(state),
            flag: Flag::Loading,
        }
    }

    /// Raise the saving flag, or return `None` if a save already holds it.
    pub(crate) fn saving(state: &SharedState) -> Option<Self> {
        let mut guarded = lock(state);
        if guarded.saving {
            return None;
        }
        guarded.saving = true;
        Some(Self {
            state: Arc::clone(state),
            flag: Flag::Saving,
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        match self.flag {
            Flag::Loading => state.loading = false,
            Flag::Saving => state.saving = false,
        }
    }
}
