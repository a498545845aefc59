//! Single-flight listing rebuilds
//!
//! The first reader to miss the snapshot leads the rebuild. Readers that miss
//! while it runs follow it: they subscribe to the leader's outcome instead of
//! querying the store themselves.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::error::Result;
use crate::models::Recipe;

type Outcome = Option<Result<Vec<Recipe>>>;

#[derive(Debug)]
struct InFlight {
    id: u64,
    outcome: watch::Receiver<Outcome>,
}

#[derive(Debug, Default)]
struct Slot {
    next_id: u64,
    current: Option<InFlight>,
}

/// Tracks the rebuild currently in flight, if any.
///
/// The lock is only held to inspect or swap the slot, never across an await.
#[derive(Debug, Default)]
pub(crate) struct Flights {
    slot: Mutex<Slot>,
}

pub(crate) enum Role<'a> {
    Leader(Leader<'a>),
    Follower(Follower),
}

impl Flights {
    /// Joins the rebuild in flight, or starts one.
    pub(crate) fn join(&self) -> Role<'_> {
        let mut slot = self.lock();
        if let Some(flight) = &slot.current {
            return Role::Follower(Follower {
                outcome: flight.outcome.clone(),
            });
        }

        let (sender, receiver) = watch::channel(None);
        slot.next_id += 1;
        let id = slot.next_id;
        slot.current = Some(InFlight {
            id,
            outcome: receiver,
        });
        Role::Leader(Leader {
            flights: self,
            id,
            outcome: sender,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The reader running the rebuild. Dropping it, finished or not, ends the
/// flight so the next miss starts a new one.
pub(crate) struct Leader<'a> {
    flights: &'a Flights,
    id: u64,
    outcome: watch::Sender<Outcome>,
}

impl Leader<'_> {
    /// Hands the rebuild's outcome to every follower.
    pub(crate) fn finish(self, outcome: &Result<Vec<Recipe>>) {
        self.outcome.send_replace(Some(outcome.clone()));
    }
}

impl Drop for Leader<'_> {
    fn drop(&mut self) {
        let mut slot = self.flights.lock();
        if slot.current.as_ref().map(|flight| flight.id) == Some(self.id) {
            slot.current = None;
        }
    }
}

pub(crate) struct Follower {
    outcome: watch::Receiver<Outcome>,
}

impl Follower {
    /// Waits for the leader's outcome. `None` if the leader was dropped
    /// before it had one.
    pub(crate) async fn outcome(mut self) -> Outcome {
        self.outcome
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|value| (*value).clone())
    }
}
