use bound_rust::{BindingConfig, BindingManager, Direction, ExchangeRecord};
use std::sync::mpsc;
use std::time::Duration;

use crate::name_binding;

#[test]
fn exchanges_are_broadcast_by_direction() {
    let manager = BindingManager::new();
    let (binder, _, _) = name_binding(&manager);

    let (tx, rx) = mpsc::channel();
    let pops = tx.clone();
    manager
        .on_exchange(Direction::Pop, move |record: ExchangeRecord| {
            pops.send(record).unwrap();
        })
        .unwrap();

    manager.pop(&binder).unwrap();
    let record = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(record.binder, binder.id().raw());
    assert_eq!(record.direction, Direction::Pop);
    assert!(record.pop_ok);

    // No push listener: nothing else arrives.
    manager.push(&binder).unwrap();
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    drop(tx);
}

#[test]
fn replayed_exchanges_are_broadcast_too() {
    let manager = BindingManager::new();
    let (binder, _, _) = name_binding(&manager);
    let (tx, rx) = mpsc::channel();
    manager
        .on_exchange(Direction::Pop, move |record: ExchangeRecord| {
            tx.send(record.binder).unwrap();
        })
        .unwrap();

    manager.freeze();
    manager.pop(&binder).unwrap();
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    manager.unfreeze();
    assert_eq!(
        rx.recv_timeout(Duration::from_secs(2)).unwrap(),
        binder.id().raw()
    );
}

#[test]
fn removed_listener_hears_nothing() {
    let manager = BindingManager::new();
    let (binder, _, _) = name_binding(&manager);
    let (tx, rx) = mpsc::channel::<u64>();
    let id = manager
        .on_exchange(Direction::Pop, move |record: ExchangeRecord| {
            let _ = tx.send(record.binder);
        })
        .unwrap();

    assert!(manager.off_exchange(&id));
    manager.pop(&binder).unwrap();
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
}

#[test]
fn events_can_be_disabled() {
    let manager = BindingManager::with_config(BindingConfig {
        emit_exchange_events: false,
        ..BindingConfig::default()
    });
    assert!(manager
        .on_exchange(Direction::Push, |_: ExchangeRecord| {})
        .is_none());
}
