use serde::{Deserialize, Serialize};

use crate::binder::Direction;

/// What the manager broadcasts after running one exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub binder: u64,
    pub direction: Direction,
    pub push_ok: bool,
    pub pop_ok: bool,
}

#[cfg(feature = "emitter")]
pub(crate) use emitter::ExchangeEvents;

#[cfg(feature = "emitter")]
mod emitter {
    use std::sync::{Arc, Mutex, PoisonError};

    use event_emitter_rs::EventEmitter;

    use super::ExchangeRecord;

    /// Shared emitter; clones broadcast to the same listeners.
    #[derive(Clone)]
    pub(crate) struct ExchangeEvents {
        emitter: Arc<Mutex<EventEmitter>>,
    }

    impl ExchangeEvents {
        pub(crate) fn new() -> Self {
            ExchangeEvents {
                emitter: Arc::new(Mutex::new(EventEmitter::new())),
            }
        }

        pub(crate) fn on<F>(&self, event: &str, listener: F) -> String
        where
            F: Fn(ExchangeRecord) + Send + Sync + 'static,
        {
            self.emitter
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .on(event, listener)
        }

        pub(crate) fn off(&self, id: &str) -> bool {
            self.emitter
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove_listener(id)
                .is_some()
        }

        /// Listeners run on their own threads; this does not wait for them.
        pub(crate) fn emit(&self, record: ExchangeRecord) {
            let event = record.direction.as_str();
            self.emitter
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .emit(event, record);
        }
    }
}
