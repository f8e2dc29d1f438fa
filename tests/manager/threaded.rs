use bound_rust::{ui_channel, BindingConfig, BindingManager, Handle, Property, Selector, UiThread};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::name_binding;
use crate::support::{name_of, rename, text_of, type_text, Address, TextView};

// =============================================================================
// Requests from several threads
// =============================================================================

#[test]
fn requests_from_other_threads_replay_in_arrival_order() {
    let manager = Arc::new(BindingManager::new());
    let (first, _, _) = name_binding(&manager);
    let (second, _, _) = name_binding(&manager);
    let order = Arc::new(Mutex::new(Vec::new()));
    for binder in [&first, &second] {
        let order = order.clone();
        let id = binder.id();
        binder.on_success(move |_| order.lock().unwrap().push(id));
    }

    manager.freeze();
    {
        let manager = manager.clone();
        let first = first.clone();
        thread::spawn(move || manager.pop(&first).unwrap())
            .join()
            .unwrap();
    }
    {
        let manager = manager.clone();
        let second = second.clone();
        thread::spawn(move || manager.pop(&second).unwrap())
            .join()
            .unwrap();
    }
    assert!(order.lock().unwrap().is_empty());

    manager.unfreeze();
    assert_eq!(*order.lock().unwrap(), vec![first.id(), second.id()]);
}

#[test]
fn concurrent_freezes_balance_out() {
    let manager = Arc::new(BindingManager::new());
    let (binder, view, _) = name_binding(&manager);
    manager.freeze();

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let manager = manager.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    manager.freeze();
                    manager.unfreeze();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(manager.freeze_depth(), 1);
    manager.pop(&binder).unwrap();
    manager.unfreeze();
    assert_eq!(text_of(&view), "Ada");
}

// =============================================================================
// UI-confined dispatch
// =============================================================================

#[test]
fn ui_confined_tail_runs_on_the_ui_thread() {
    let (dispatcher, queue) = ui_channel();
    let ui = UiThread::spawn(queue, Duration::from_millis(5));
    let ui_thread = ui.thread_id();
    let manager = BindingManager::new().with_dispatcher(dispatcher);

    let (plain, plain_view, _) = name_binding(&manager);
    plain.ui_confined(false);
    let (confined, confined_view, _) = name_binding(&manager);
    let ran_on = Arc::new(Mutex::new(None));
    let slot = ran_on.clone();
    confined.on_success(move |_| *slot.lock().unwrap() = Some(thread::current().id()));

    manager.freeze();
    manager.pop(&plain).unwrap();
    manager.pop(&confined).unwrap();
    let summary = manager.unfreeze();

    assert_eq!(summary.inline, 1);
    assert_eq!(summary.dispatched, 1);
    assert_eq!(text_of(&plain_view), "Ada");

    let stats = ui.stop();
    assert!(stats.tasks_run >= 1);
    assert_eq!(text_of(&confined_view), "Ada");
    assert_eq!(*ran_on.lock().unwrap(), Some(ui_thread));
}

#[test]
fn everything_after_the_first_confined_op_is_dispatched() {
    let (dispatcher, queue) = ui_channel();
    let manager = BindingManager::new().with_dispatcher(dispatcher);

    let (confined, confined_view, _) = name_binding(&manager);
    let (plain, plain_view, _) = name_binding(&manager);
    plain.ui_confined(false);

    manager.freeze();
    manager.pop(&confined).unwrap();
    manager.pop(&plain).unwrap();
    let summary = manager.unfreeze();

    assert_eq!(summary.inline, 0);
    assert_eq!(summary.dispatched, 2);
    assert_eq!(text_of(&plain_view), "");

    assert_eq!(queue.run_pending(), 1);
    assert_eq!(text_of(&confined_view), "Ada");
    assert_eq!(text_of(&plain_view), "Ada");
}

#[test]
fn confined_replay_without_dispatcher_runs_inline() {
    let config = BindingConfig {
        ui_confined_by_default: true,
        ..BindingConfig::default()
    };
    let manager = BindingManager::with_config(config);
    let (binder, view, _) = name_binding(&manager);
    assert!(binder.is_ui_confined());

    manager.freeze();
    manager.pop(&binder).unwrap();
    let summary = manager.unfreeze();
    assert_eq!(summary.inline, 1);
    assert_eq!(text_of(&view), "Ada");
}

// =============================================================================
// Change notification
// =============================================================================

#[test]
fn typing_pushes_through_the_manager() {
    let manager = Arc::new(BindingManager::new());
    let (binder, view, person) = name_binding(&manager);
    let subscription = manager.auto_push(&binder).unwrap();

    type_text(&view, "Zed");
    assert_eq!(name_of(&person), "Zed");

    manager.freeze();
    type_text(&view, "Amy");
    assert_eq!(name_of(&person), "Zed");
    assert_eq!(manager.pending_len(), 1);
    manager.unfreeze();
    assert_eq!(name_of(&person), "Amy");

    assert!(subscription.cancel());
    type_text(&view, "Bo");
    assert_eq!(name_of(&person), "Amy");
}

#[test]
fn model_changes_pop_into_the_view() {
    let manager = Arc::new(BindingManager::new());
    let (binder, view, person) = name_binding(&manager);
    let _subscription = manager.auto_pop(&binder).unwrap();

    rename(&person, "Lin");
    assert_eq!(text_of(&view), "Lin");
}

#[test]
fn notifications_after_the_manager_is_gone_are_ignored() {
    let manager = Arc::new(BindingManager::new());
    let (binder, view, person) = name_binding(&manager);
    let _subscription = manager.auto_push(&binder).unwrap();
    drop(manager);

    type_text(&view, "Zed");
    assert_eq!(name_of(&person), "Ada");
    assert!(binder.is_push_ok());
}

#[test]
fn receivers_without_notifier_cannot_be_followed() {
    let manager = Arc::new(BindingManager::new());
    let view = Handle::new(TextView::default());
    let address = Handle::new(Address::new("Main St", "Oslo"));
    let binder = manager.bind_with(
        Selector::<String>::new(view, Property::named("Text")),
        Selector::<String>::new(address, Property::named("City")),
    );
    assert!(manager.auto_pop(&binder).is_none());
    assert!(manager.auto_push(&binder).is_some());
}
