use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};

use tracing::{debug, trace, warn};

use crate::binder::{AsBinderRef, Binder, BinderId, BinderRef, BinderReport, Direction};
use crate::dispatch::UiDispatcher;
use crate::error::{BindingError, ConfigurationError, OneWayBindingError};
use crate::selector::{Selector, Subscription};
use crate::value::{BindValue, Handle, Value};

use super::config::BindingConfig;
#[cfg(feature = "emitter")]
use super::events::{ExchangeEvents, ExchangeRecord};
use super::listeners::{BindingLifecycle, ListenerArena, ListenerKey};

/// What happened to a push/pop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Ran synchronously.
    Executed,
    /// The manager is frozen; the request waits for `unfreeze`.
    Queued,
}

/// Result of the `unfreeze` call that reached depth zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Operations run on the calling thread.
    pub inline: usize,
    /// Operations handed to the UI dispatcher.
    pub dispatched: usize,
    /// One-way rejections raised by inline operations.
    pub errors: Vec<OneWayBindingError>,
}

impl ReplaySummary {
    pub fn total(&self) -> usize {
        self.inline + self.dispatched
    }
}

struct PendingOp {
    binder: BinderRef,
    direction: Direction,
}

/// Counts one dispatched replay tail until it has run or been dropped.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn start(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        InFlight(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Runs one exchange and broadcasts its outcome.
#[derive(Clone)]
struct Executor {
    #[cfg(feature = "emitter")]
    events: Option<ExchangeEvents>,
}

impl Executor {
    fn run(&self, binder: &BinderRef, direction: Direction) -> Result<(), OneWayBindingError> {
        trace!(binder = %binder.id(), %direction, "exchange");
        binder.exchange(direction)?;
        #[cfg(feature = "emitter")]
        if let Some(events) = &self.events {
            events.emit(ExchangeRecord {
                binder: binder.id().raw(),
                direction,
                push_ok: binder.is_push_ok(),
                pop_ok: binder.is_pop_ok(),
            });
        }
        Ok(())
    }
}

/// Owns the binders of one binding scope and funnels their exchanges.
///
/// While frozen, push/pop requests queue up and replay in request order on
/// the `unfreeze` that brings the depth back to zero:
///
/// ```
/// use bound_rust::{Bindable, BindingManager, Dispatch, Handle, Property, Selector};
///
/// #[derive(Default, Bindable)]
/// struct Label { text: String }
///
/// #[derive(Default, Bindable)]
/// struct Song { title: String }
///
/// let label = Handle::new(Label::default());
/// let song = Handle::new(Song { title: "Blue".into() });
///
/// let manager = BindingManager::new();
/// let binder = manager.bind_with(
///     Selector::<String>::new(label.clone(), Property::named("Text")),
///     Selector::<String>::new(song, Property::named("Title")),
/// );
///
/// manager.freeze();
/// assert_eq!(manager.pop(&binder), Ok(Dispatch::Queued));
/// assert_eq!(label.read(|l: &Label| l.text.clone()).unwrap(), "");
///
/// let summary = manager.unfreeze();
/// assert_eq!(summary.inline, 1);
/// assert_eq!(label.read(|l: &Label| l.text.clone()).unwrap(), "Blue");
/// ```
pub struct BindingManager {
    config: BindingConfig,
    binders: RwLock<Vec<BinderRef>>,
    freeze_depth: AtomicUsize,
    pending: Mutex<VecDeque<PendingOp>>,
    dispatcher: RwLock<Option<Arc<dyn UiDispatcher>>>,
    /// Replay tails handed to the dispatcher that have not run yet.
    in_flight: Arc<AtomicUsize>,
    listeners: Mutex<ListenerArena>,
    next_id: AtomicU64,
    executor: Executor,
}

impl Default for BindingManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingManager {
    pub fn new() -> Self {
        Self::with_config(BindingConfig::default())
    }

    pub fn with_config(config: BindingConfig) -> Self {
        let executor = Executor {
            #[cfg(feature = "emitter")]
            events: config.emit_exchange_events.then(ExchangeEvents::new),
        };
        BindingManager {
            config,
            binders: RwLock::new(Vec::new()),
            freeze_depth: AtomicUsize::new(0),
            pending: Mutex::new(VecDeque::new()),
            dispatcher: RwLock::new(None),
            in_flight: Arc::new(AtomicUsize::new(0)),
            listeners: Mutex::new(ListenerArena::default()),
            next_id: AtomicU64::new(0),
            executor,
        }
    }

    /// Builder form of [`set_dispatcher`](Self::set_dispatcher).
    pub fn with_dispatcher(self, dispatcher: impl UiDispatcher + 'static) -> Self {
        self.set_dispatcher(dispatcher);
        self
    }

    /// Install the UI context used for replaying UI-confined binders.
    ///
    /// Without one, every replay runs on the thread calling `unfreeze`.
    pub fn set_dispatcher(&self, dispatcher: impl UiDispatcher + 'static) {
        *self
            .dispatcher
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(dispatcher));
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    // ---------------------------------------------------------------
    // Binding
    // ---------------------------------------------------------------

    /// Create an unconfigured binder owned by this manager.
    pub fn bind<V: BindValue, M: BindValue>(&self) -> Arc<Binder<V, M>> {
        let binder = self.new_binder();
        self.track(&binder);
        binder
    }

    /// Create a binder already wired to `view` and `model`.
    pub fn bind_with<V: BindValue, M: BindValue>(
        &self,
        view: Selector<V>,
        model: Selector<M>,
    ) -> Arc<Binder<V, M>> {
        let binder = self.new_binder();
        binder.view(view).model(model);
        self.track(&binder);
        binder
    }

    fn new_binder<V: BindValue, M: BindValue>(&self) -> Arc<Binder<V, M>> {
        let id = BinderId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        Arc::new(Binder::new(
            id,
            self.config.ui_confined_by_default,
            self.config.warn_unconfigured,
        ))
    }

    fn track(&self, binder: &impl AsBinderRef) {
        let binder = binder.binder_ref();
        self.write_binders().push(Arc::clone(&binder));
        debug!(binder = %binder.id(), "bound");
        for listener in self.live_listeners() {
            listener.on_bound(&binder);
        }
    }

    /// Remove one binder. Operations it already queued still replay.
    pub fn detach(&self, binder: &impl AsBinderRef) -> bool {
        let id = binder.binder_ref().id();
        let removed = {
            let mut binders = self.write_binders();
            let index = binders.iter().position(|b| b.id() == id);
            index.map(|index| binders.remove(index))
        };
        let Some(removed) = removed else {
            return false;
        };
        debug!(binder = %id, "detached");
        for listener in self.live_listeners() {
            listener.on_detached(&removed);
        }
        true
    }

    /// Detach every binder and drop the pending queue. Returns how many were detached.
    pub fn teardown(&self) -> usize {
        let removed: Vec<BinderRef> = self.write_binders().drain(..).collect();
        let dropped = {
            let mut pending = self.lock_pending();
            let dropped = pending.len();
            pending.clear();
            dropped
        };
        debug!(binders = removed.len(), pending = dropped, "scope torn down");
        let listeners = self.live_listeners();
        for binder in &removed {
            for listener in &listeners {
                listener.on_detached(binder);
            }
        }
        removed.len()
    }

    // ---------------------------------------------------------------
    // Exchange
    // ---------------------------------------------------------------

    /// View to model on one binder, or queue it while frozen.
    pub fn push(&self, binder: &impl AsBinderRef) -> Result<Dispatch, OneWayBindingError> {
        self.request(binder.binder_ref(), Direction::Push)
    }

    /// Model to view on one binder, or queue it while frozen.
    pub fn pop(&self, binder: &impl AsBinderRef) -> Result<Dispatch, OneWayBindingError> {
        self.request(binder.binder_ref(), Direction::Pop)
    }

    /// Push each binder in order; one-way rejections are collected, not fatal.
    pub fn push_list(&self, binders: &[BinderRef]) -> Result<(), BindingError> {
        self.request_list(binders, Direction::Push)
    }

    pub fn pop_list(&self, binders: &[BinderRef]) -> Result<(), BindingError> {
        self.request_list(binders, Direction::Pop)
    }

    pub fn push_all(&self) -> Result<(), BindingError> {
        self.request_list(&self.bindings(), Direction::Push)
    }

    pub fn pop_all(&self) -> Result<(), BindingError> {
        self.request_list(&self.bindings(), Direction::Pop)
    }

    /// Push every binder whose model side is currently `model`.
    pub fn push_to(&self, model: &Handle) -> Result<(), BindingError> {
        self.request_list(&self.bindings_by_model(model), Direction::Push)
    }

    /// Pop every binder whose view side is currently `view`.
    pub fn pop_to(&self, view: &Handle) -> Result<(), BindingError> {
        self.request_list(&self.bindings_by_view(view), Direction::Pop)
    }

    fn request(&self, binder: BinderRef, direction: Direction) -> Result<Dispatch, OneWayBindingError> {
        {
            let mut pending = self.lock_pending();
            if self.freeze_depth.load(Ordering::SeqCst) > 0 {
                trace!(binder = %binder.id(), %direction, "queued while frozen");
                pending.push_back(PendingOp { binder, direction });
                return Ok(Dispatch::Queued);
            }
        }
        self.executor.run(&binder, direction)?;
        Ok(Dispatch::Executed)
    }

    fn request_list(&self, binders: &[BinderRef], direction: Direction) -> Result<(), BindingError> {
        let errors: Vec<OneWayBindingError> = binders
            .iter()
            .filter_map(|binder| self.request(Arc::clone(binder), direction).err())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(BindingError::OneWay(errors))
        }
    }

    // ---------------------------------------------------------------
    // Freeze
    // ---------------------------------------------------------------

    /// Suspend exchanges. Reentrant: each call needs its own `unfreeze`.
    pub fn freeze(&self) {
        let depth = self.freeze_depth.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(depth, "frozen");
    }

    /// Undo one `freeze`. At depth zero the queue replays in request order.
    ///
    /// Extra calls are ignored. The replay runs the queue up to the first
    /// UI-confined binder on this thread and hands the rest, in order, to
    /// the UI dispatcher as a single task. While a tail from an earlier
    /// replay has not run yet, the whole queue goes to the dispatcher.
    pub fn unfreeze(&self) -> ReplaySummary {
        let ops: Vec<PendingOp> = {
            let mut pending = self.lock_pending();
            let previous = self
                .freeze_depth
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |depth| depth.checked_sub(1));
            match previous {
                Ok(1) => pending.drain(..).collect(),
                Ok(depth) => {
                    debug!(depth = depth - 1, "unfrozen one level");
                    return ReplaySummary::default();
                }
                Err(_) => {
                    trace!("unfreeze while not frozen");
                    return ReplaySummary::default();
                }
            }
        };
        self.replay(ops)
    }

    fn replay(&self, mut ops: Vec<PendingOp>) -> ReplaySummary {
        let dispatcher = self
            .dispatcher
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let split = match dispatcher {
            // An earlier tail is still queued on the UI context; running
            // anything here first would overtake it.
            Some(_) if self.in_flight.load(Ordering::SeqCst) > 0 => 0,
            Some(_) => ops
                .iter()
                .position(|op| op.binder.is_ui_confined())
                .unwrap_or(ops.len()),
            None => ops.len(),
        };
        let tail = ops.split_off(split);

        let mut summary = ReplaySummary::default();
        for op in &ops {
            summary.inline += 1;
            if let Err(err) = self.executor.run(&op.binder, op.direction) {
                warn!(binder = %op.binder.id(), error = %err, "replayed exchange rejected");
                summary.errors.push(err);
            }
        }

        if let (Some(dispatcher), false) = (dispatcher, tail.is_empty()) {
            summary.dispatched = tail.len();
            let executor = self.executor.clone();
            let in_flight = InFlight::start(&self.in_flight);
            dispatcher.dispatch(Box::new(move || {
                let _in_flight = in_flight;
                for op in tail {
                    if let Err(err) = executor.run(&op.binder, op.direction) {
                        warn!(binder = %op.binder.id(), error = %err, "replayed exchange rejected");
                    }
                }
            }));
        }
        debug!(
            inline = summary.inline,
            dispatched = summary.dispatched,
            "pending operations replayed"
        );
        summary
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_depth() > 0
    }

    pub fn freeze_depth(&self) -> usize {
        self.freeze_depth.load(Ordering::SeqCst)
    }

    pub fn pending_len(&self) -> usize {
        self.lock_pending().len()
    }

    // ---------------------------------------------------------------
    // Validation and queries
    // ---------------------------------------------------------------

    /// Resolve every binder, reporting all problems at once.
    pub fn associate(&self) -> Result<(), ConfigurationError> {
        let mut collected = ConfigurationError::default();
        for binder in self.bindings() {
            if let Err(err) = binder.resolve() {
                collected.merge(err);
            }
        }
        let result = collected.into_result();
        match &result {
            Ok(()) => debug!("all bindings resolved"),
            Err(err) => warn!(problems = err.reasons().len(), "binding configuration errors"),
        }
        for listener in self.live_listeners() {
            listener.on_associated(&result);
        }
        result
    }

    /// Every binder, in bind order.
    pub fn bindings(&self) -> Vec<BinderRef> {
        self.read_binders().clone()
    }

    pub fn binding(&self, id: BinderId) -> Option<BinderRef> {
        self.read_binders().iter().find(|b| b.id() == id).cloned()
    }

    pub fn bindings_by_model(&self, model: &Handle) -> Vec<BinderRef> {
        self.filter(|b| b.model_instance().as_ref() == Some(model))
    }

    pub fn bindings_by_view(&self, view: &Handle) -> Vec<BinderRef> {
        self.filter(|b| b.view_instance().as_ref() == Some(view))
    }

    pub fn bindings_by_tag(&self, key: i32) -> Vec<BinderRef> {
        self.filter(|b| b.has_tag(key))
    }

    pub fn bindings_with_tag(&self, key: i32, value: &Value) -> Vec<BinderRef> {
        self.filter(|b| b.tag(key).as_ref() == Some(value))
    }

    /// Binders whose latest push or pop failed.
    pub fn failed_bindings(&self) -> Vec<BinderRef> {
        self.filter(|b| !b.is_pop_ok() || !b.is_push_ok())
    }

    /// Binders with no recorded failure, including never-exercised ones.
    pub fn success_bindings(&self) -> Vec<BinderRef> {
        self.filter(|b| b.is_pop_ok() && b.is_push_ok())
    }

    pub fn len(&self) -> usize {
        self.read_binders().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_binders().is_empty()
    }

    fn filter(&self, predicate: impl Fn(&BinderRef) -> bool) -> Vec<BinderRef> {
        self.bindings().into_iter().filter(|b| predicate(b)).collect()
    }

    pub fn report(&self) -> Vec<BinderReport> {
        self.bindings().iter().map(|b| b.report()).collect()
    }

    pub fn report_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.report())
    }

    // ---------------------------------------------------------------
    // Listeners and notification
    // ---------------------------------------------------------------

    /// Register a lifecycle listener without taking ownership of it.
    pub fn register<L: BindingLifecycle + 'static>(&self, listener: &Arc<L>) -> ListenerKey {
        let weak = Arc::downgrade(listener);
        let weak: Weak<dyn BindingLifecycle> = weak;
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(weak)
    }

    pub fn unregister(&self, key: ListenerKey) -> bool {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Request a push whenever the binder's view side notifies a change.
    ///
    /// Requests go through [`push`](Self::push), so they queue while frozen.
    /// `None` when the view receiver has no notification source.
    pub fn auto_push(self: &Arc<Self>, binder: &impl AsBinderRef) -> Option<Subscription> {
        self.follow(binder.binder_ref(), Direction::Push)
    }

    /// Request a pop whenever the binder's model side notifies a change.
    pub fn auto_pop(self: &Arc<Self>, binder: &impl AsBinderRef) -> Option<Subscription> {
        self.follow(binder.binder_ref(), Direction::Pop)
    }

    fn follow(self: &Arc<Self>, binder: BinderRef, direction: Direction) -> Option<Subscription> {
        let manager = Arc::downgrade(self);
        let target = Arc::downgrade(&binder);
        binder.listen(
            direction,
            Arc::new(move || {
                let (Some(manager), Some(binder)) = (manager.upgrade(), target.upgrade()) else {
                    return;
                };
                if let Err(err) = manager.request(binder, direction) {
                    warn!(error = %err, "notified exchange rejected");
                }
            }),
        )
    }

    /// Listen for exchanges the manager runs; `direction` selects `"push"` or `"pop"`.
    ///
    /// Returns the listener id for [`off_exchange`](Self::off_exchange).
    /// Delivery is asynchronous. `None` when the manager was configured
    /// without exchange events.
    #[cfg(feature = "emitter")]
    pub fn on_exchange<F>(&self, direction: Direction, listener: F) -> Option<String>
    where
        F: Fn(ExchangeRecord) + Send + Sync + 'static,
    {
        let events = self.executor.events.as_ref()?;
        Some(events.on(direction.as_str(), listener))
    }

    #[cfg(feature = "emitter")]
    pub fn off_exchange(&self, id: &str) -> bool {
        self.executor
            .events
            .as_ref()
            .map(|events| events.off(id))
            .unwrap_or(false)
    }

    fn live_listeners(&self) -> Vec<Arc<dyn BindingLifecycle>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .live()
    }

    fn lock_pending(&self) -> MutexGuard<'_, VecDeque<PendingOp>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_binders(&self) -> std::sync::RwLockReadGuard<'_, Vec<BinderRef>> {
        self.binders.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_binders(&self) -> std::sync::RwLockWriteGuard<'_, Vec<BinderRef>> {
        self.binders.write().unwrap_or_else(PoisonError::into_inner)
    }
}
