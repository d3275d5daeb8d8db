//! Board sharing
//!
//! A shared board is a validated snapshot stored under `share:{id}`, where
//! the id is a short opaque token. Shares are immutable; sharing again
//! yields a new id.

use bridge_traits::storage::{KeyValueStore, KeyValueStoreExt};
use core_board::TierListState;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::Result;

pub const SHARE_KEY_PREFIX: &str = "share";
pub const SHARE_ID_LENGTH: usize = 10;

pub fn share_key(share_id: &str) -> String {
    format!("{}:{}", SHARE_KEY_PREFIX, share_id)
}

pub fn new_share_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(SHARE_ID_LENGTH);
    id
}

pub struct ShareStore {
    store: Arc<dyn KeyValueStore>,
}

impl ShareStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Validate and publish `state`, returning its share id.
    #[instrument(skip(self, state), fields(title = %state.title))]
    pub async fn share_board(&self, state: &TierListState) -> Result<String> {
        state.validate()?;

        let mut share_id = new_share_id();
        while self.store.has_key(&share_key(&share_id)).await? {
            share_id = new_share_id();
        }

        self.store.set_json(&share_key(&share_id), state).await?;
        info!(share_id = %share_id, "Board shared");
        Ok(share_id)
    }

    /// Shared board for `share_id`; `None` when unknown or unreadable.
    pub async fn load_shared(&self, share_id: &str) -> Result<Option<TierListState>> {
        let key = share_key(share_id);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<TierListState>(&raw) {
            Ok(mut state) => {
                state.normalize();
                Ok(Some(state))
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring unreadable shared board");
                Ok(None)
            }
        }
    }
}
