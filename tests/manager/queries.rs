use bound_rust::{BindingManager, Exchange, Handle, Property, Selector, Value};

use crate::name_binding;
use crate::support::{name_of, text_of, Person, TextView};

#[test]
fn bindings_are_found_by_receiver() {
    let manager = BindingManager::new();
    let (first, view, person) = name_binding(&manager);
    let other_view = Handle::new(TextView::default());
    manager.bind_with(
        Selector::<i64>::new(other_view.clone(), Property::named("Length")),
        Selector::<i64>::new(person.clone(), Property::named("Age")),
    );

    assert_eq!(manager.bindings_by_model(&person).len(), 2);
    let by_view = manager.bindings_by_view(&view);
    assert_eq!(by_view.len(), 1);
    assert_eq!(by_view[0].id(), first.id());
    assert!(manager
        .bindings_by_view(&Handle::new(TextView::default()))
        .is_empty());
}

#[test]
fn push_to_and_pop_to_target_one_receiver() {
    let manager = BindingManager::new();
    let (_, view, person) = name_binding(&manager);
    let (_, other_view, other_person) = name_binding(&manager);

    manager.pop_to(&view).unwrap();
    assert_eq!(text_of(&view), "Ada");
    assert_eq!(text_of(&other_view), "");

    view.write(|v: &mut TextView| v.text = "Grace".into());
    other_view.write(|v: &mut TextView| v.text = "Lin".into());
    manager.push_to(&person).unwrap();
    assert_eq!(name_of(&person), "Grace");
    assert_eq!(name_of(&other_person), "Ada");
}

#[test]
fn tags_select_bindings() {
    let manager = BindingManager::new();
    let (first, _, _) = name_binding(&manager);
    let (second, _, _) = name_binding(&manager);
    first.set_tag(1, "header");
    second.set_tag(1, "footer").set_tag(2, 7i64);

    assert_eq!(manager.bindings_by_tag(1).len(), 2);
    assert_eq!(manager.bindings_by_tag(2).len(), 1);
    let footer = manager.bindings_with_tag(1, &Value::Text("footer".into()));
    assert_eq!(footer.len(), 1);
    assert_eq!(footer[0].id(), second.id());
    assert!(manager.bindings_with_tag(2, &Value::Int(8)).is_empty());
}

#[test]
fn failed_and_successful_bindings_partition_the_scope() {
    let manager = BindingManager::new();
    let (good, _, _) = name_binding(&manager);
    let broken = manager.bind_with(
        Selector::<String>::new(Handle::new(TextView::default()), Property::named("Caption")),
        Selector::<String>::new(Handle::new(Person::new("Ada", 36)), Property::named("Name")),
    );

    manager.pop_all().unwrap();
    let failed = manager.failed_bindings();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].id(), broken.id());
    assert!(!failed[0].is_pop_ok());
    assert_eq!(manager.success_bindings()[0].id(), good.id());
    assert!(manager.binding(broken.id()).is_some());
}

#[test]
fn report_serializes_every_binder() {
    let manager = BindingManager::new();
    let (binder, _, _) = name_binding(&manager);
    binder.set_tag(3, "name");
    manager.bind::<String, String>();

    let report = manager.report();
    assert_eq!(report.len(), 2);
    assert!(report[0].view.as_deref().unwrap().contains("TextView"));
    assert_eq!(report[0].tags.get(&3).map(String::as_str), Some("name"));
    assert_eq!(report[1].view, None);

    let json: serde_json::Value = serde_json::from_str(&manager.report_json().unwrap()).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[0]["id"], binder.id().raw());
    assert_eq!(json[1]["push_ok"], true);
}
