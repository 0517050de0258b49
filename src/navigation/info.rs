use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::types::short_type_name;
use crate::view_model::AnyViewModel;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Identity {
    Stable(String),
    Address(&'static str, usize),
}

/// A hashable handle identifying one entry of a navigation stack.
///
/// Entries whose state reports a stable id hash by that id; everything else
/// hashes by state type and view model address. Equality additionally
/// requires the same state type.
#[derive(Clone)]
pub struct NavigatorInfo {
    id: String,
    state_type: TypeId,
    identity: Identity,
    view_model: AnyViewModel,
}

impl NavigatorInfo {
    pub fn new(view_model: AnyViewModel) -> Self {
        let identity = match view_model.stable_id() {
            Some(id) => Identity::Stable(id),
            None => Identity::Address(view_model.state_type_name(), view_model.addr()),
        };
        Self {
            id: view_model.id(),
            state_type: view_model.state_type_id(),
            identity,
            view_model,
        }
    }

    /// Id of the wrapped view model when the entry was created. Cleanups are
    /// keyed by it.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn view_model(&self) -> &AnyViewModel {
        &self.view_model
    }

    pub fn description(&self) -> String {
        format!(
            "{} at {:#x}",
            short_type_name(self.view_model.state_type_name()),
            self.view_model.addr()
        )
    }
}

impl PartialEq for NavigatorInfo {
    fn eq(&self, other: &Self) -> bool {
        self.state_type == other.state_type && self.identity == other.identity
    }
}

impl Eq for NavigatorInfo {}

impl Hash for NavigatorInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl fmt::Debug for NavigatorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

impl fmt::Display for NavigatorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}
