use std::collections::BTreeMap;

use bound_rust::{argument, Bindable, Handle, InvokeError, Members, Notifier, Value, ValueType};

#[derive(Default, Bindable)]
pub struct Person {
    pub name: String,
    pub age: i64,
    pub email: Option<String>,
    pub address: Option<Handle>,
    #[bind(notifier)]
    pub changes: Notifier,
}

impl Person {
    pub fn new(name: &str, age: i64) -> Self {
        Person {
            name: name.to_string(),
            age,
            ..Self::default()
        }
    }

    pub fn living_at(mut self, address: Address) -> Self {
        self.address = Some(Handle::new(address));
        self
    }
}

/// Change a person's name and tell listeners about it.
pub fn rename(person: &Handle, name: &str) {
    let notifier = person
        .write(|p: &mut Person| {
            p.name = name.to_string();
            p.changes.clone()
        })
        .expect("handle holds a Person");
    notifier.notify();
}

#[derive(Default, Bindable)]
pub struct Address {
    pub street: String,
    pub city: String,
}

impl Address {
    pub fn new(street: &str, city: &str) -> Self {
        Address {
            street: street.to_string(),
            city: city.to_string(),
        }
    }
}

/// String map reached through `get(key)` / `put(key, value)`.
#[derive(Default, Bindable)]
#[bind(extend = "settings_members")]
pub struct Settings {
    #[bind(skip)]
    pub values: BTreeMap<String, String>,
}

fn settings_members(members: Members<Settings>) -> Members<Settings> {
    members
        .query("get", &[ValueType::Text], ValueType::Text, |s: &Settings, args| {
            let key: String = argument(args, 0)?;
            Ok(s.values.get(&key).cloned().map(Value::Text).unwrap_or(Value::Null))
        })
        .method("put", &[ValueType::Text, ValueType::Text], |s: &mut Settings, args| {
            let key: String = argument(args, 0)?;
            let value: String = argument(args, 1)?;
            s.values.insert(key, value);
            Ok(())
        })
}

/// Name list reached through `get(index)` / `set(index, value)`.
#[derive(Default, Bindable)]
#[bind(extend = "roster_members")]
pub struct Roster {
    #[bind(skip)]
    pub names: Vec<String>,
}

impl Roster {
    pub fn of(names: &[&str]) -> Self {
        Roster {
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

fn roster_members(members: Members<Roster>) -> Members<Roster> {
    members
        .query("get", &[ValueType::Int], ValueType::Text, |r: &Roster, args| {
            let index: usize = argument(args, 0)?;
            r.names
                .get(index)
                .cloned()
                .map(Value::Text)
                .ok_or_else(|| InvokeError::Failed(format!("no entry at {}", index)))
        })
        .method("set", &[ValueType::Int, ValueType::Text], |r: &mut Roster, args| {
            let index: usize = argument(args, 0)?;
            let name: String = argument(args, 1)?;
            let slot = r
                .names
                .get_mut(index)
                .ok_or_else(|| InvokeError::Failed(format!("no entry at {}", index)))?;
            *slot = name;
            Ok(())
        })
}
