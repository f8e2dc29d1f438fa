use std::collections::BTreeMap;

use serde::Serialize;

/// Diagnostic snapshot of one binder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinderReport {
    pub id: u64,
    /// `Display` of the view selector, `None` when unset.
    pub view: Option<String>,
    pub model: Option<String>,
    pub push_ok: bool,
    pub pop_ok: bool,
    pub ui_confined: bool,
    pub tags: BTreeMap<i32, String>,
}

impl BinderReport {
    pub fn is_failed(&self) -> bool {
        !self.push_ok || !self.pop_ok
    }
}
