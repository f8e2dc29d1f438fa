use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::value::{Handle, ValueType};

use super::entry::{AccessorEntry, MemberKind};
use super::naming::to_snake_case;

/// Getter prefixes, in priority order. Field and bare-name lookups follow.
const GETTER_PREFIXES: [&str; 4] = ["get_", "has_", "is_", "exceeds_"];
const SETTER_PREFIXES: [&str; 1] = ["set_"];

/// Which side of a property an accessor serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Getter,
    Setter,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Getter => f.write_str("getter"),
            Role::Setter => f.write_str("setter"),
        }
    }
}

/// A resolution request: `resolve(type, explicitName?, namePattern?, arity)`.
#[derive(Debug, Clone, Copy)]
pub struct Lookup<'a> {
    pub role: Role,
    /// Exact member name; wins over `pattern` when present.
    pub explicit: Option<&'a str>,
    /// Name searched under the naming convention (`Text` -> `get_text`, ...).
    pub pattern: Option<&'a str>,
    /// Declared argument types, which also fixes the arity.
    pub args: &'a [ValueType],
}

impl<'a> Lookup<'a> {
    pub fn getter(pattern: &'a str) -> Self {
        Lookup {
            role: Role::Getter,
            explicit: None,
            pattern: Some(pattern),
            args: &[],
        }
    }

    pub fn setter(pattern: &'a str, args: &'a [ValueType]) -> Self {
        Lookup {
            role: Role::Setter,
            explicit: None,
            pattern: Some(pattern),
            args,
        }
    }

    pub fn explicit(role: Role, name: &'a str, args: &'a [ValueType]) -> Self {
        Lookup {
            role,
            explicit: Some(name),
            pattern: None,
            args,
        }
    }

    /// Candidate names in priority order, each optionally restricted to one member kind.
    fn candidates(&self) -> Vec<(String, Option<MemberKind>)> {
        if let Some(name) = self.explicit {
            return vec![(name.to_string(), None)];
        }
        let Some(pattern) = self.pattern else {
            return Vec::new();
        };
        let base = to_snake_case(pattern);
        let prefixes: &[&str] = match self.role {
            Role::Getter => &GETTER_PREFIXES,
            Role::Setter => &SETTER_PREFIXES,
        };
        let mut names: Vec<(String, Option<MemberKind>)> = prefixes
            .iter()
            .map(|prefix| (format!("{}{}", prefix, base), Some(MemberKind::Method)))
            .collect();
        names.push((base.clone(), Some(MemberKind::Field)));
        names.push((base, Some(MemberKind::Method)));
        names
    }
}

/// Resolution miss. A normal outcome, not a failure of the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no {role} on `{type_name}` named {} accepting ({})", .tried.join(" | "), join_types(.args))]
pub struct NotFound {
    pub role: Role,
    pub type_name: &'static str,
    pub tried: Vec<String>,
    pub args: Vec<ValueType>,
}

fn join_types(types: &[ValueType]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// All members of one type, sorted by name then arity.
#[derive(Debug)]
pub struct TypeRegistry {
    type_name: &'static str,
    entries: Vec<AccessorEntry>,
}

impl TypeRegistry {
    pub fn new(type_name: &'static str, mut entries: Vec<AccessorEntry>) -> Self {
        // Stable: overloads of equal arity keep declaration order.
        entries.sort_by(|a, b| a.name().cmp(b.name()).then(a.arity().cmp(&b.arity())));
        TypeRegistry { type_name, entries }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn entries(&self) -> &[AccessorEntry] {
        &self.entries
    }

    /// Every overload named `name`, in ascending arity.
    pub fn overloads(&self, name: &str) -> &[AccessorEntry] {
        let start = self.entries.partition_point(|e| e.name() < name);
        let end = self.entries.partition_point(|e| e.name() <= name);
        &self.entries[start..end]
    }

    /// Resolve `lookup` against this registry only.
    pub fn resolve(&self, lookup: &Lookup<'_>) -> Result<AccessorEntry, NotFound> {
        let candidates = lookup.candidates();
        for (name, kind) in &candidates {
            let hit = self.overloads(name).iter().find(|entry| {
                kind.map_or(true, |kind| entry.kind() == kind)
                    && (lookup.role == Role::Setter || entry.returns().is_some())
                    && entry.matches(lookup.args)
            });
            if let Some(entry) = hit {
                trace!(type_name = self.type_name, accessor = %entry, "resolved {}", lookup.role);
                return Ok(entry.clone());
            }
        }
        Err(NotFound {
            role: lookup.role,
            type_name: self.type_name,
            tried: candidates.into_iter().map(|(name, _)| name).collect(),
            args: lookup.args.to_vec(),
        })
    }
}

/// Process-wide cache of [`TypeRegistry`] values keyed by type.
///
/// Registries are built on first use and never evicted. [`clear`](Self::clear)
/// drops them and bumps the generation so per-property caches re-resolve.
#[derive(Debug, Default)]
pub struct AccessorResolver {
    registries: RwLock<HashMap<TypeId, Arc<TypeRegistry>>>,
    generation: AtomicU64,
}

impl AccessorResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The resolver every [`Property`](crate::Property) uses.
    pub fn global() -> &'static AccessorResolver {
        static GLOBAL: OnceLock<AccessorResolver> = OnceLock::new();
        GLOBAL.get_or_init(AccessorResolver::new)
    }

    /// The registry for the receiver's type, building it on first use.
    pub fn registry(&self, instance: &Handle) -> Arc<TypeRegistry> {
        let key = instance.type_key();
        {
            let registries = self.registries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(registry) = registries.get(&key) {
                return Arc::clone(registry);
            }
        }

        let mut registries = self
            .registries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // Another thread may have built it between the two locks.
        if let Some(registry) = registries.get(&key) {
            return Arc::clone(registry);
        }
        let cell = instance.cell();
        let registry = Arc::new(TypeRegistry::new(cell.type_name(), cell.describe()));
        debug!(
            type_name = registry.type_name(),
            members = registry.entries().len(),
            "registered bindable type"
        );
        registries.insert(key, Arc::clone(&registry));
        registry
    }

    pub fn resolve(&self, instance: &Handle, lookup: &Lookup<'_>) -> Result<AccessorEntry, NotFound> {
        self.registry(instance).resolve(lookup)
    }

    /// Drop every cached registry.
    pub fn clear(&self) {
        let mut registries = self
            .registries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        registries.clear();
        self.generation.fetch_add(1, Ordering::SeqCst);
        debug!("accessor caches dropped");
    }

    /// Increases on every [`clear`](Self::clear).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn cached_types(&self) -> usize {
        self.registries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
