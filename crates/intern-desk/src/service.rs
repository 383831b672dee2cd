use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, instrument, warn};

use crate::store::StateStore;
use crate::workflows::access::ActionContext;
use crate::workflows::domain::State;
use crate::workflows::error::DeskError;
use crate::workflows::ledger::{self, LedgerSummary};
use crate::workflows::retention;

/// Runs one desk operation as a committed unit: load the full state, resolve
/// the actor, mutate, save. Nothing is saved when the operation fails.
pub struct DeskService<S> {
    store: Arc<S>,
}

impl<S> Clone for DeskService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> DeskService<S>
where
    S: StateStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn snapshot(&self) -> Result<State, DeskError> {
        Ok(self.store.load()?)
    }

    #[instrument(name = "desk.execute", skip(self, operation), fields(actor = %actor_id))]
    pub fn execute<T, F>(
        &self,
        actor_id: &str,
        now: DateTime<Utc>,
        action: &'static str,
        operation: F,
    ) -> Result<T, DeskError>
    where
        F: FnOnce(&mut State, &ActionContext) -> Result<T, DeskError>,
    {
        let mut state = self.store.load()?;
        let ctx = ActionContext::resolve(&state, actor_id, now)?;

        match operation(&mut state, &ctx) {
            Ok(value) => {
                self.store.save(&state).map_err(|err| {
                    warn!(action, error = %err, "desk action not committed");
                    DeskError::from(err)
                })?;
                info!(action, "desk action committed");
                Ok(value)
            }
            Err(err) => {
                warn!(action, category = err.category(), error = %err, "desk action refused");
                Err(err)
            }
        }
    }

    /// Read-only access on behalf of an actor; nothing is saved.
    pub fn read<T, F>(&self, actor_id: &str, now: DateTime<Utc>, query: F) -> Result<T, DeskError>
    where
        F: FnOnce(&State, &ActionContext) -> Result<T, DeskError>,
    {
        let state = self.store.load()?;
        let ctx = ActionContext::resolve(&state, actor_id, now)?;
        query(&state, &ctx)
    }

    /// Like [`execute`](Self::execute) for operations that have no acting user.
    pub fn execute_system<T, F>(&self, action: &'static str, operation: F) -> Result<T, DeskError>
    where
        F: FnOnce(&mut State) -> Result<T, DeskError>,
    {
        let mut state = self.store.load()?;
        let value = operation(&mut state).inspect_err(|err| {
            warn!(action, category = err.category(), error = %err, "system action refused");
        })?;
        self.store.save(&state)?;
        info!(action, "system action committed");
        Ok(value)
    }

    pub fn summary(&self, intern_id: &str) -> Result<LedgerSummary, DeskError> {
        let state = self.store.load()?;
        Ok(ledger::summarize(state.intern(intern_id)?))
    }

    pub fn sweep_trash(&self, today: NaiveDate) -> Result<Vec<String>, DeskError> {
        self.execute_system("sweep_trash", |state| Ok(retention::sweep(state, today)))
    }
}
