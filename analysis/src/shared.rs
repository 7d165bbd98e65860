//! A handle for decoders that dispatch events from more than one worker.
//! Every event is applied under one lock, so no two events ever interleave.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use common::events::Event;

use crate::endofgame::{Aggregator, Config, StreamEnd};
use crate::scoreboard::BoxScore;
use crate::Error;

#[derive(Debug, Clone)]
pub struct SharedAggregator {
    inner: Arc<Mutex<Aggregator>>,
}

impl SharedAggregator {
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Aggregator::new(config))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Aggregator> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Aggregator lock poisoned, continuing with its state");
            poisoned.into_inner()
        })
    }

    pub fn handle(&self, event: &Event) -> Result<(), Error> {
        self.lock().handle(event)
    }

    pub fn rounds_played(&self) -> u32 {
        self.lock().rounds_played()
    }

    /// Finalizes the match once this is the last handle. Otherwise the
    /// handle is given back.
    pub fn finalize(self, end: StreamEnd) -> Result<BoxScore, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(inner) => Ok(inner
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner)
                .finalize(end)),
            Err(inner) => Err(Self { inner }),
        }
    }
}
