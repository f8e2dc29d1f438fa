use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, trace, warn};

use crate::error::{ConfigurationError, OneWayBindingError};
use crate::selector::{NotifyCallback, Selector, Subscription};
use crate::value::{BindValue, Handle, Value};

use super::direction::Direction;
use super::exchange::{BinderId, Exchange};
use super::format::{FormatError, Formatter, ValueCast};
use super::report::BinderReport;

type Validator<M> = Arc<dyn Fn(&M) -> bool + Send + Sync>;
type Callback = Arc<dyn Fn(Direction) + Send + Sync>;

struct Wiring<V, M> {
    view: Option<Selector<V>>,
    model: Option<Selector<M>>,
    formatter: Arc<dyn Formatter<V, M>>,
    validator: Validator<M>,
    on_success: Option<Callback>,
    on_failure: Option<Callback>,
}

/// Everything one exchange needs, copied out so no binder lock is held
/// while accessors or callbacks run.
struct Snapshot<V, M> {
    view: Selector<V>,
    model: Selector<M>,
    formatter: Arc<dyn Formatter<V, M>>,
    validator: Validator<M>,
    on_success: Option<Callback>,
    on_failure: Option<Callback>,
}

struct LastSeen<V, M> {
    view: Option<V>,
    model: Option<M>,
}

/// Outcome of one direction, before callbacks run.
enum Step {
    Written,
    /// Formatted value already on the target side.
    InSync,
    WriteFailed,
    Rejected,
}

/// A two-way rule between one view selector and one model selector.
///
/// Built through [`BindingManager::bind`](crate::BindingManager::bind) and
/// configured in place:
///
/// ```
/// use bound_rust::{Bindable, BindingManager, Handle, Property, Selector};
///
/// #[derive(Default, Bindable)]
/// struct Field { text: String }
///
/// #[derive(Default, Bindable)]
/// struct Person { name: String }
///
/// let field = Handle::new(Field::default());
/// let person = Handle::new(Person { name: "Ada".into() });
///
/// let manager = BindingManager::new();
/// let binder = manager.bind::<String, String>();
/// binder
///     .view(Selector::new(field.clone(), Property::named("Text")))
///     .model(Selector::new(person, Property::named("Name")));
///
/// binder.pop().unwrap();
/// assert_eq!(field.read(|f: &Field| f.text.clone()).unwrap(), "Ada");
/// assert!(binder.is_pop_ok());
/// ```
///
/// `is_push_ok` / `is_pop_ok` keep the result of the latest push / pop
/// until that same direction runs again.
pub struct Binder<V, M> {
    id: BinderId,
    wiring: RwLock<Wiring<V, M>>,
    last: Mutex<LastSeen<V, M>>,
    push_ok: AtomicBool,
    pop_ok: AtomicBool,
    ui_confined: AtomicBool,
    warn_unconfigured: bool,
    tags: RwLock<BTreeMap<i32, Value>>,
}

impl<V: BindValue, M: BindValue> Binder<V, M> {
    pub(crate) fn new(id: BinderId, ui_confined: bool, warn_unconfigured: bool) -> Self {
        Binder {
            id,
            wiring: RwLock::new(Wiring {
                view: None,
                model: None,
                formatter: Arc::new(ValueCast),
                validator: Arc::new(|model: &M| {
                    M::value_type().accepts(model.clone().into_value().value_type())
                }),
                on_success: None,
                on_failure: None,
            }),
            last: Mutex::new(LastSeen {
                view: None,
                model: None,
            }),
            push_ok: AtomicBool::new(true),
            pop_ok: AtomicBool::new(true),
            ui_confined: AtomicBool::new(ui_confined),
            warn_unconfigured,
            tags: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn id(&self) -> BinderId {
        self.id
    }

    pub fn view(&self, selector: Selector<V>) -> &Self {
        self.configure(|wiring| wiring.view = Some(selector));
        self
    }

    pub fn model(&self, selector: Selector<M>) -> &Self {
        self.configure(|wiring| wiring.model = Some(selector));
        self
    }

    /// Replace the default [`ValueCast`] formatter.
    pub fn format(&self, formatter: impl Formatter<V, M> + 'static) -> &Self {
        self.configure(|wiring| wiring.formatter = Arc::new(formatter));
        self
    }

    /// Predicate over the model-side value, checked in both directions.
    pub fn validate(&self, validator: impl Fn(&M) -> bool + Send + Sync + 'static) -> &Self {
        self.configure(|wiring| wiring.validator = Arc::new(validator));
        self
    }

    pub fn on_success(&self, callback: impl Fn(Direction) + Send + Sync + 'static) -> &Self {
        self.configure(|wiring| wiring.on_success = Some(Arc::new(callback)));
        self
    }

    pub fn on_failure(&self, callback: impl Fn(Direction) + Send + Sync + 'static) -> &Self {
        self.configure(|wiring| wiring.on_failure = Some(Arc::new(callback)));
        self
    }

    pub fn set_tag(&self, key: i32, value: impl Into<Value>) -> &Self {
        self.tags
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value.into());
        self
    }

    pub fn remove_tag(&self, key: i32) -> Option<Value> {
        self.tags
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key)
    }

    /// Whether replays of this binder must run on the UI context.
    pub fn ui_confined(&self, confined: bool) -> &Self {
        self.ui_confined.store(confined, Ordering::SeqCst);
        self
    }

    pub fn view_selector(&self) -> Option<Selector<V>> {
        self.read_wiring().view.clone()
    }

    pub fn model_selector(&self) -> Option<Selector<M>> {
        self.read_wiring().model.clone()
    }

    /// Model to view.
    pub fn pop(&self) -> Result<(), OneWayBindingError> {
        let Some(snapshot) = self.snapshot() else {
            self.unconfigured(Direction::Pop);
            return Ok(());
        };

        let current = snapshot.model.get();
        let last_view = {
            let last = self.lock_last();
            if last.model.as_ref() == Some(&current) {
                trace!(binder = %self.id, "pop skipped, model unchanged");
                return Ok(());
            }
            last.view.clone()
        };

        let formatted = match snapshot.formatter.to_view(&current) {
            Ok(value) => Ok(value),
            Err(FormatError::OneWay(err)) => return Err(err),
            Err(FormatError::Rejected(reason)) => Err(reason),
        };
        self.lock_last().model = Some(current.clone());

        let step = match formatted {
            Err(reason) => {
                debug!(binder = %self.id, %reason, "pop rejected by formatter");
                Step::Rejected
            }
            Ok(_) if !(snapshot.validator)(&current) => Step::Rejected,
            Ok(formatted) if last_view.as_ref() == Some(&formatted) => Step::InSync,
            Ok(formatted) => {
                if snapshot.view.set(formatted.clone()) {
                    self.lock_last().view = Some(formatted);
                    Step::Written
                } else {
                    Step::WriteFailed
                }
            }
        };
        self.finish(Direction::Pop, step, &snapshot);
        Ok(())
    }

    /// View to model.
    pub fn push(&self) -> Result<(), OneWayBindingError> {
        let Some(snapshot) = self.snapshot() else {
            self.unconfigured(Direction::Push);
            return Ok(());
        };

        let current = snapshot.view.get();
        let last_model = {
            let last = self.lock_last();
            if last.view.as_ref() == Some(&current) {
                trace!(binder = %self.id, "push skipped, view unchanged");
                return Ok(());
            }
            last.model.clone()
        };

        let formatted = match snapshot.formatter.to_model(&current) {
            Ok(value) => Ok(value),
            Err(FormatError::OneWay(err)) => return Err(err),
            Err(FormatError::Rejected(reason)) => Err(reason),
        };
        self.lock_last().view = Some(current.clone());

        let step = match formatted {
            Err(reason) => {
                debug!(binder = %self.id, %reason, "push rejected by formatter");
                Step::Rejected
            }
            Ok(formatted) if !(snapshot.validator)(&formatted) => Step::Rejected,
            Ok(formatted) if last_model.as_ref() == Some(&formatted) => Step::InSync,
            Ok(formatted) => {
                if snapshot.model.set(formatted.clone()) {
                    self.lock_last().model = Some(formatted);
                    Step::Written
                } else {
                    Step::WriteFailed
                }
            }
        };
        self.finish(Direction::Push, step, &snapshot);
        Ok(())
    }

    pub fn exchange(&self, direction: Direction) -> Result<(), OneWayBindingError> {
        match direction {
            Direction::Push => self.push(),
            Direction::Pop => self.pop(),
        }
    }

    /// Force accessor discovery on both sides without moving data.
    ///
    /// Every problem found is collected into one [`ConfigurationError`].
    pub fn resolve(&self) -> Result<(), ConfigurationError> {
        let (view, model) = {
            let wiring = self.read_wiring();
            (wiring.view.clone(), wiring.model.clone())
        };
        let mut reasons = Vec::new();
        match view {
            None => reasons.push(format!("binder {}: view selector is not set", self.id)),
            Some(view) => reasons.extend(
                view.check()
                    .into_iter()
                    .map(|reason| format!("binder {}: view {}: {}", self.id, view, reason)),
            ),
        }
        match model {
            None => reasons.push(format!("binder {}: model selector is not set", self.id)),
            Some(model) => reasons.extend(
                model
                    .check()
                    .into_iter()
                    .map(|reason| format!("binder {}: model {}: {}", self.id, model, reason)),
            ),
        }
        ConfigurationError::new(reasons).into_result()
    }

    pub fn is_push_ok(&self) -> bool {
        self.push_ok.load(Ordering::SeqCst)
    }

    pub fn is_pop_ok(&self) -> bool {
        self.pop_ok.load(Ordering::SeqCst)
    }

    pub fn is_ui_confined(&self) -> bool {
        self.ui_confined.load(Ordering::SeqCst)
    }

    pub fn tag(&self, key: i32) -> Option<Value> {
        self.tags
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    pub fn has_tag(&self, key: i32) -> bool {
        self.tags
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key)
    }

    /// Forget the last exchanged values so the next push/pop always writes.
    pub fn reset(&self) {
        let mut last = self.lock_last();
        last.view = None;
        last.model = None;
    }

    fn finish(&self, direction: Direction, step: Step, snapshot: &Snapshot<V, M>) {
        let flag = match direction {
            Direction::Push => &self.push_ok,
            Direction::Pop => &self.pop_ok,
        };
        let callback = match step {
            Step::Written | Step::InSync => {
                flag.store(true, Ordering::SeqCst);
                snapshot.on_success.as_ref()
            }
            Step::WriteFailed => {
                flag.store(false, Ordering::SeqCst);
                snapshot.on_failure.as_ref()
            }
            Step::Rejected => snapshot.on_failure.as_ref(),
        };
        trace!(
            binder = %self.id,
            %direction,
            ok = flag.load(Ordering::SeqCst),
            "exchange finished"
        );
        if let Some(callback) = callback {
            callback(direction);
        }
    }

    fn unconfigured(&self, direction: Direction) {
        match direction {
            Direction::Push => self.push_ok.store(false, Ordering::SeqCst),
            Direction::Pop => self.pop_ok.store(false, Ordering::SeqCst),
        }
        if self.warn_unconfigured {
            warn!(binder = %self.id, %direction, "exchange on unconfigured binder");
        } else {
            debug!(binder = %self.id, %direction, "exchange on unconfigured binder");
        }
    }

    fn snapshot(&self) -> Option<Snapshot<V, M>> {
        let wiring = self.read_wiring();
        Some(Snapshot {
            view: wiring.view.clone()?,
            model: wiring.model.clone()?,
            formatter: Arc::clone(&wiring.formatter),
            validator: Arc::clone(&wiring.validator),
            on_success: wiring.on_success.clone(),
            on_failure: wiring.on_failure.clone(),
        })
    }

    fn configure(&self, f: impl FnOnce(&mut Wiring<V, M>)) {
        let mut wiring = self.wiring.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut wiring);
    }

    fn read_wiring(&self) -> std::sync::RwLockReadGuard<'_, Wiring<V, M>> {
        self.wiring.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_last(&self) -> std::sync::MutexGuard<'_, LastSeen<V, M>> {
        self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: BindValue, M: BindValue> Exchange for Binder<V, M> {
    fn id(&self) -> BinderId {
        self.id
    }

    fn push(&self) -> Result<(), OneWayBindingError> {
        Binder::push(self)
    }

    fn pop(&self) -> Result<(), OneWayBindingError> {
        Binder::pop(self)
    }

    fn resolve(&self) -> Result<(), ConfigurationError> {
        Binder::resolve(self)
    }

    fn is_push_ok(&self) -> bool {
        Binder::is_push_ok(self)
    }

    fn is_pop_ok(&self) -> bool {
        Binder::is_pop_ok(self)
    }

    fn is_ui_confined(&self) -> bool {
        Binder::is_ui_confined(self)
    }

    fn view_instance(&self) -> Option<Handle> {
        self.read_wiring().view.as_ref()?.runtime_instance()
    }

    fn model_instance(&self) -> Option<Handle> {
        self.read_wiring().model.as_ref()?.runtime_instance()
    }

    fn has_tag(&self, key: i32) -> bool {
        Binder::has_tag(self, key)
    }

    fn tag(&self, key: i32) -> Option<Value> {
        Binder::tag(self, key)
    }

    fn listen(&self, direction: Direction, callback: NotifyCallback) -> Option<Subscription> {
        let wiring = self.read_wiring();
        match direction {
            Direction::Push => wiring.view.as_ref()?.listen(callback),
            Direction::Pop => wiring.model.as_ref()?.listen(callback),
        }
    }

    fn report(&self) -> BinderReport {
        let wiring = self.read_wiring();
        BinderReport {
            id: self.id.raw(),
            view: wiring.view.as_ref().map(ToString::to_string),
            model: wiring.model.as_ref().map(ToString::to_string),
            push_ok: self.is_push_ok(),
            pop_ok: self.is_pop_ok(),
            ui_confined: self.is_ui_confined(),
            tags: self
                .tags
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .map(|(key, value)| (*key, value.to_string()))
                .collect(),
        }
    }
}

impl<V: BindValue, M: BindValue> fmt::Debug for Binder<V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("id", &self.id)
            .field("push_ok", &self.is_push_ok())
            .field("pop_ok", &self.is_pop_ok())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bindable, Property};
    use std::sync::atomic::AtomicUsize;

    #[derive(Default, Bindable)]
    struct Input {
        text: String,
    }

    #[derive(Default, Bindable)]
    struct Account {
        owner: String,
        balance: i64,
    }

    fn text_binder(input: &Handle, account: &Handle) -> Binder<String, String> {
        let binder = Binder::new(BinderId::new(1), true, false);
        binder
            .view(Selector::new(input.clone(), Property::named("Text")))
            .model(Selector::new(account.clone(), Property::named("Owner")));
        binder
    }

    #[test]
    fn pop_writes_model_value_to_view() {
        let input = Handle::new(Input::default());
        let account = Handle::new(Account {
            owner: "Grace".into(),
            balance: 0,
        });
        let binder = text_binder(&input, &account);
        binder.pop().unwrap();
        assert_eq!(input.read(|i: &Input| i.text.clone()).unwrap(), "Grace");
        assert!(binder.is_pop_ok());
    }

    #[test]
    fn rejected_push_keeps_both_flags() {
        let input = Handle::new(Input {
            text: "x".into(),
        });
        let account = Handle::new(Account::default());
        let binder = text_binder(&input, &account);
        let failures = Arc::new(AtomicUsize::new(0));
        let count = failures.clone();
        binder
            .validate(|owner: &String| owner.len() > 1)
            .on_failure(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            });

        binder.push().unwrap();
        assert_eq!(failures.load(Ordering::SeqCst), 1);
        assert!(binder.is_push_ok());
        assert!(binder.is_pop_ok());
        assert_eq!(account.read(|a: &Account| a.owner.clone()).unwrap(), "");
    }

    #[test]
    fn failed_write_clears_flag() {
        let input = Handle::new(Input::default());
        let account = Handle::new(Account {
            owner: String::new(),
            balance: 12,
        });
        // `text` holds a string; there is no int setter to write into.
        let binder: Binder<i64, i64> = Binder::new(BinderId::new(2), false, false);
        binder
            .view(Selector::new(input, Property::named("Text")))
            .model(Selector::new(account, Property::named("Balance")));
        binder.pop().unwrap();
        assert!(!binder.is_pop_ok());
        assert!(binder.is_push_ok());
    }

    #[test]
    fn unconfigured_binder_fails_softly() {
        let binder: Binder<String, String> = Binder::new(BinderId::new(3), true, false);
        binder.push().unwrap();
        assert!(!binder.is_push_ok());
        assert!(binder.is_pop_ok());
        let err = binder.resolve().unwrap_err();
        assert_eq!(err.reasons().len(), 2);
    }

    #[test]
    fn reset_forces_the_next_write() {
        let input = Handle::new(Input::default());
        let account = Handle::new(Account {
            owner: "Lin".into(),
            balance: 0,
        });
        let binder = text_binder(&input, &account);
        binder.pop().unwrap();
        input.write(|i: &mut Input| i.text.clear());

        binder.pop().unwrap();
        assert_eq!(input.read(|i: &Input| i.text.clone()).unwrap(), "");

        binder.reset();
        binder.pop().unwrap();
        assert_eq!(input.read(|i: &Input| i.text.clone()).unwrap(), "Lin");
    }

    #[test]
    fn tags_are_plain_lookups() {
        let binder: Binder<String, String> = Binder::new(BinderId::new(4), true, false);
        binder.set_tag(7, "header").set_tag(8, 3);
        assert!(binder.has_tag(7));
        assert_eq!(binder.tag(8), Some(Value::Int(3)));
        assert_eq!(binder.remove_tag(7), Some(Value::Text("header".into())));
        assert!(!binder.has_tag(7));
    }
}
