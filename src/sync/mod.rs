//! Editable-table data sync.
//!
//! [`TableController`] owns the local item collection and the two busy flags,
//! and changes them only through three operations:
//!
//! - [`TableController::load`] replaces the collection with the server's.
//! - [`TableController::set_price`] patches one price in memory.
//! - [`TableController::save`] pushes the whole collection back, then reloads
//!   so the server's answer becomes the local state.
//!
//! Failures are logged where they happen and returned to the caller. The
//! busy flags are released by [`state::BusyGuard`] whichever way an
//! operation ends.

mod editor;
mod state;

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::client::{ClientError, ItemsClient};
use crate::models::{Item, ItemId, Price};

pub use editor::set_price;
pub use state::{Notice, TableState, NOTICE_AUTO_CLOSE, SAVE_SUCCESS_MESSAGE};

use state::{lock, BusyGuard, SharedState};

/// Loading the collection failed.
#[derive(Debug, Error)]
#[error("Error fetching items: {0}")]
pub struct FetchError(#[from] pub ClientError);

/// Saving the collection failed.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("A save is already in progress")]
    Busy,

    #[error("Error saving items: {0}")]
    Rejected(#[from] ClientError),
}

/// Owns the table state and runs load / edit / save against the items API.
///
/// Cloning shares the same state, so a presentation task can read flags or
/// edit prices while another task awaits a save.
#[derive(Debug, Clone)]
pub struct TableController {
    client: ItemsClient,
    state: SharedState,
}

impl TableController {
    pub fn new(client: ItemsClient) -> Self {
        Self::with_state(client, TableState::default())
    }

    pub fn with_state(client: ItemsClient, state: TableState) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// A copy of the current state for rendering.
    pub fn snapshot(&self) -> TableState {
        lock(&self.state).clone()
    }

    pub fn items(&self) -> Vec<Item> {
        lock(&self.state).items.clone()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.state).loading
    }

    pub fn is_saving(&self) -> bool {
        lock(&self.state).saving
    }

    /// Drain pending notices. Each notice is returned once.
    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut lock(&self.state).notices)
    }

    /// Replace the local collection with the server's.
    ///
    /// On failure the collection is left as it was. Either way the loading
    /// flag ends cleared.
    pub async fn load(&self) -> Result<Vec<Item>, FetchError> {
        let _busy = BusyGuard::loading(&self.state);

        match self.client.fetch_items().await {
            Ok(items) => {
                tracing::info!(count = items.len(), "Loaded items");
                lock(&self.state).items = items.clone();
                Ok(items)
            }
            Err(e) => {
                tracing::error!("Error fetching items: {}", e);
                Err(FetchError(e))
            }
        }
    }

    /// Set the price of the item with `id` in the local collection.
    ///
    /// Nothing is sent to the server until [`save`](Self::save). An unknown
    /// id changes nothing.
    pub fn set_price(&self, id: &ItemId, price: Price) -> Vec<Item> {
        let mut state = lock(&self.state);
        let updated = set_price(&state.items, id, &price);
        if updated == state.items {
            tracing::debug!(%id, "No item matched price edit");
        } else {
            tracing::debug!(%id, %price, "Price edited");
        }
        state.items = updated.clone();
        updated
    }

    /// Send the whole local collection to the server, then reload from it.
    ///
    /// Rejected with [`SaveError::Busy`] while another save is in flight.
    /// A failed reload after an accepted save is logged and does not fail
    /// the save.
    pub async fn save(&self) -> Result<(), SaveError> {
        let Some(_busy) = BusyGuard::saving(&self.state) else {
            tracing::warn!("Save requested while another save is in flight");
            return Err(SaveError::Busy);
        };

        let snapshot = self.items();
        if let Err(e) = self.client.replace_items(&snapshot).await {
            tracing::error!("Error saving items: {}", e);
            return Err(SaveError::Rejected(e));
        }
        tracing::info!(count = snapshot.len(), "Items saved");

        if self.load().await.is_err() {
            tracing::warn!("Items saved but reload failed; showing local copy");
        }

        lock(&self.state)
            .notices
            .push(Notice::success(SAVE_SUCCESS_MESSAGE));
        Ok(())
    }
}
