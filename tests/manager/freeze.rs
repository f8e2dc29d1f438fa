use bound_rust::{BindingManager, Dispatch};
use proptest::prelude::*;

use crate::name_binding;
use crate::support::{name_of, text_of, TextView};

// =============================================================================
// Queue and replay
// =============================================================================

#[test]
fn requests_queue_while_frozen() {
    let manager = BindingManager::new();
    let (binder, view, _person) = name_binding(&manager);

    manager.freeze();
    assert_eq!(manager.pop(&binder), Ok(Dispatch::Queued));
    assert_eq!(manager.pending_len(), 1);
    assert_eq!(text_of(&view), "");

    let summary = manager.unfreeze();
    assert_eq!(summary.inline, 1);
    assert_eq!(summary.dispatched, 0);
    assert_eq!(text_of(&view), "Ada");
    assert_eq!(manager.pending_len(), 0);
}

#[test]
fn replay_keeps_request_order() {
    let manager = BindingManager::new();
    let (binder, view, person) = name_binding(&manager);
    view.write(|v: &mut TextView| v.text = "Grace".into());

    manager.freeze();
    manager.push(&binder).unwrap();
    manager.pop(&binder).unwrap();
    manager.unfreeze();

    // Push moved "Grace" into the model; the pop that followed saw nothing new.
    assert_eq!(name_of(&person), "Grace");
    assert_eq!(text_of(&view), "Grace");
    assert!(binder.is_push_ok());
    assert!(binder.is_pop_ok());
}

#[test]
fn duplicate_requests_are_all_kept() {
    let manager = BindingManager::new();
    let (binder, _view, _person) = name_binding(&manager);

    manager.freeze();
    for _ in 0..3 {
        manager.pop(&binder).unwrap();
    }
    assert_eq!(manager.pending_len(), 3);
    assert_eq!(manager.unfreeze().total(), 3);
}

#[test]
fn unfreeze_when_not_frozen_is_ignored() {
    let manager = BindingManager::new();
    let summary = manager.unfreeze();
    assert_eq!(summary.total(), 0);
    assert_eq!(manager.freeze_depth(), 0);

    let (binder, _view, _person) = name_binding(&manager);
    assert_eq!(manager.pop(&binder), Ok(Dispatch::Executed));
}

#[test]
fn extra_unfreeze_does_not_unbalance_the_next_freeze() {
    let manager = BindingManager::new();
    let (binder, view, _person) = name_binding(&manager);

    manager.unfreeze();
    manager.unfreeze();
    manager.freeze();
    assert!(manager.is_frozen());
    manager.pop(&binder).unwrap();
    assert_eq!(text_of(&view), "");
    manager.unfreeze();
    assert_eq!(text_of(&view), "Ada");
}

proptest! {
    #[test]
    fn replay_waits_for_the_outermost_unfreeze(depth in 1usize..8) {
        let manager = BindingManager::new();
        let (binder, view, _person) = name_binding(&manager);

        for _ in 0..depth {
            manager.freeze();
        }
        manager.pop(&binder).unwrap();

        for remaining in (1..depth).rev() {
            prop_assert_eq!(manager.unfreeze().total(), 0);
            prop_assert_eq!(manager.freeze_depth(), remaining);
            prop_assert_eq!(text_of(&view), "");
        }
        prop_assert_eq!(manager.unfreeze().total(), 1);
        prop_assert!(!manager.is_frozen());
        prop_assert_eq!(text_of(&view), "Ada");
    }
}
