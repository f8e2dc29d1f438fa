use bound_rust::{BinderId, BinderRef, BindingLifecycle, BindingManager, ConfigurationError};
use std::sync::{Arc, Mutex};

use crate::name_binding;

#[derive(Default)]
struct Recorder {
    bound: Mutex<Vec<BinderId>>,
    detached: Mutex<Vec<BinderId>>,
    associated: Mutex<Vec<usize>>,
}

impl BindingLifecycle for Recorder {
    fn on_bound(&self, binder: &BinderRef) {
        self.bound.lock().unwrap().push(binder.id());
    }

    fn on_associated(&self, result: &Result<(), ConfigurationError>) {
        let problems = result.as_ref().err().map_or(0, |err| err.reasons().len());
        self.associated.lock().unwrap().push(problems);
    }

    fn on_detached(&self, binder: &BinderRef) {
        self.detached.lock().unwrap().push(binder.id());
    }
}

#[test]
fn bind_and_detach_are_announced() {
    let manager = BindingManager::new();
    let recorder = Arc::new(Recorder::default());
    manager.register(&recorder);

    let (binder, _, _) = name_binding(&manager);
    assert_eq!(*recorder.bound.lock().unwrap(), vec![binder.id()]);

    assert!(manager.detach(&binder));
    assert!(!manager.detach(&binder));
    assert_eq!(*recorder.detached.lock().unwrap(), vec![binder.id()]);
}

#[test]
fn associate_reports_every_problem_once() {
    let manager = BindingManager::new();
    let recorder = Arc::new(Recorder::default());
    manager.register(&recorder);

    name_binding(&manager);
    manager.bind::<String, String>();
    let err = manager.associate().unwrap_err();
    assert_eq!(err.reasons().len(), 2);

    assert_eq!(*recorder.associated.lock().unwrap(), vec![2]);
}

#[test]
fn listeners_are_held_weakly() {
    let manager = BindingManager::new();
    let recorder = Arc::new(Recorder::default());
    manager.register(&recorder);
    assert_eq!(manager.listener_count(), 1);

    drop(recorder);
    name_binding(&manager);
    assert_eq!(manager.listener_count(), 0);
}

#[test]
fn unregister_stops_delivery() {
    let manager = BindingManager::new();
    let recorder = Arc::new(Recorder::default());
    let key = manager.register(&recorder);

    assert!(manager.unregister(key));
    assert!(!manager.unregister(key));
    name_binding(&manager);
    assert!(recorder.bound.lock().unwrap().is_empty());
}

#[test]
fn stale_key_cannot_remove_a_newer_listener() {
    let manager = BindingManager::new();
    let first = Arc::new(Recorder::default());
    let key = manager.register(&first);
    manager.unregister(key);

    let second = Arc::new(Recorder::default());
    manager.register(&second);
    assert!(!manager.unregister(key));

    name_binding(&manager);
    assert_eq!(second.bound.lock().unwrap().len(), 1);
}

#[test]
fn teardown_detaches_everything() {
    let manager = BindingManager::new();
    let recorder = Arc::new(Recorder::default());
    manager.register(&recorder);
    name_binding(&manager);
    name_binding(&manager);

    manager.freeze();
    manager.pop_all().unwrap();
    assert_eq!(manager.teardown(), 2);
    assert!(manager.is_empty());
    assert_eq!(manager.pending_len(), 0);
    assert_eq!(recorder.detached.lock().unwrap().len(), 2);
    assert_eq!(manager.unfreeze().total(), 0);
}
