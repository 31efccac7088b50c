//! Action ledger
//!
//! Append-only per-user action events, queried over the current UTC day.
//! Daily limits are enforced by counting the window at call time; no counter
//! is stored.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::clock;
use crate::db::ActionStore;
use crate::types::{ActionEvent, Result, TurnkeyError};

/// Records and queries action events
#[derive(Clone)]
pub struct ActionLedger {
    actions: Arc<dyn ActionStore>,
}

impl ActionLedger {
    pub fn new(actions: Arc<dyn ActionStore>) -> Self {
        Self { actions }
    }

    /// Append an event stamped with the current time
    pub async fn record(
        &self,
        uid: &str,
        service: &str,
        action: &str,
        data: Option<serde_json::Value>,
    ) -> Result<ActionEvent> {
        let event = ActionEvent {
            uid: uid.to_string(),
            service: service.to_string(),
            action: action.to_string(),
            data,
            created_at: clock::utcnow(),
        };

        debug!(uid = %uid, service = %service, action = %action, "Recording action");
        self.actions.insert_action(event).await
    }

    /// Events for (uid, service, action) created since the start of today (UTC)
    pub async fn query_today(&self, uid: &str, service: &str, action: &str) -> Result<Vec<ActionEvent>> {
        self.actions
            .find_actions(uid, service, action, clock::start_of_today())
            .await
    }

    /// Fail with `TooManyRequests` once today's count has reached `limit`
    pub async fn ensure_within_limit(
        &self,
        uid: &str,
        service: &str,
        action: &str,
        limit: usize,
    ) -> Result<()> {
        let count = self.query_today(uid, service, action).await?.len();
        if count >= limit {
            warn!(uid = %uid, service = %service, action = %action, count, limit, "Daily action limit reached");
            return Err(TurnkeyError::TooManyRequests);
        }
        Ok(())
    }
}
